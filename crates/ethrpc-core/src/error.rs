//! Normalized error taxonomy for every dispatched call.

use thiserror::Error;

use crate::request::{JsonRpcError, JsonRpcResponse};

/// Boxed error returned by an HTTP primitive.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of the HTTP exchange itself.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request never produced a response (connect, DNS, timeout, ...).
    #[error(transparent)]
    Request(BoxError),

    /// The server answered with a status other than 200.
    #[error("status: {0}")]
    Status(u16),
}

impl HttpError {
    pub fn request(err: impl Into<BoxError>) -> Self {
        Self::Request(err.into())
    }

    /// The HTTP status, when the failure is a non-200 answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Request(_) => None,
        }
    }
}

/// Coarse classification of an [`RpcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TransportFailure,
    ProtocolFailure,
    ApplicationError,
    AggregateFailure,
    InvalidInput,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransportFailure => write!(f, "transport failure"),
            Self::ProtocolFailure => write!(f, "protocol failure"),
            Self::ApplicationError => write!(f, "application error"),
            Self::AggregateFailure => write!(f, "aggregate failure"),
            Self::InvalidInput => write!(f, "invalid input"),
        }
    }
}

/// Errors surfaced by a dispatched call.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Network error or non-200 HTTP status.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        cause: HttpError,
    },

    /// The body was not the JSON we expected.
    #[error("{message}")]
    Protocol {
        message: String,
        #[source]
        cause: serde_json::Error,
    },

    /// Batch responses could not be matched to their requests.
    #[error("{message}")]
    Correlation { message: String },

    /// The node answered with an error object, or with no usable result.
    #[error("{message}")]
    Application {
        message: String,
        payload: JsonRpcError,
    },

    /// At least one batch item failed; the whole decoded batch is attached.
    #[error("batch call failed: {} of {} responses carried an error or no result", failed_count(.responses), .responses.len())]
    Aggregate { responses: Vec<JsonRpcResponse> },

    /// The call was rejected before any I/O.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

fn failed_count(responses: &[JsonRpcResponse]) -> usize {
    responses.iter().filter(|r| !r.is_ok()).count()
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::TransportFailure,
            Self::Protocol { .. } | Self::Correlation { .. } => ErrorKind::ProtocolFailure,
            Self::Application { .. } => ErrorKind::ApplicationError,
            Self::Aggregate { .. } => ErrorKind::AggregateFailure,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Returns `true` for transport failures; a higher layer may retry these.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` if the node itself reported the failure.
    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. } | Self::Aggregate { .. })
    }

    /// The JSON-RPC error payload of an application error.
    pub fn payload(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Application { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// The decoded batch of an aggregate failure.
    pub fn responses(&self) -> Option<&[JsonRpcResponse]> {
        match self {
            Self::Aggregate { responses } => Some(responses),
            _ => None,
        }
    }

    /// The HTTP status of a transport failure caused by a non-200 answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { cause, .. } => cause.status(),
            _ => None,
        }
    }
}
