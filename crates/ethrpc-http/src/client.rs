//! HTTP POST primitive backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;

use ethrpc_core::error::HttpError;
use ethrpc_core::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// [`HttpTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: HttpClientConfig) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(HttpError::request)?;
        Ok(Self { http })
    }

    /// Wrap an already configured client.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.http.post(&req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder
            .body(req.body)
            .send()
            .await
            .map_err(HttpError::request)?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(HttpError::request)?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
