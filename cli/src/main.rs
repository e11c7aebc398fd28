//! ethrpc CLI — send JSON-RPC calls to a node from the terminal.
//!
//! Usage:
//! ```bash
//! # Single call
//! ethrpc call --url https://cloudflare-eth.com --method eth_blockNumber
//!
//! # Call with params, throttled to 2 requests/second
//! ethrpc call --url https://cloudflare-eth.com --method eth_getBalance \
//!     --params '["0x0000000000000000000000000000000000000000", "latest"]' --rps 2
//!
//! # Batch call, results re-aligned by id
//! ethrpc batch --url https://cloudflare-eth.com --by-id \
//!     --calls '[{"method":"eth_chainId"},{"method":"eth_gasPrice"}]'
//! ```
//!
//! Set `RUST_LOG=ethrpc_http=debug` to see every request.

use std::env;
use std::process;

use anyhow::{anyhow, Context};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use ethrpc_core::{CallDescriptor, RequestArguments, RpcError};
use ethrpc_http::{BatchOrdering, HttpProvider, ProviderOptions};

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "call" => cmd_call(&args[2..]).await,
        "batch" => cmd_batch(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("ethrpc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("ethrpc {}", env!("CARGO_PKG_VERSION"));
    println!("Send JSON-RPC 2.0 calls to a blockchain node over HTTP\n");
    println!("USAGE:");
    println!("    ethrpc <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    call       Send a single JSON-RPC call");
    println!("    batch      Send several calls as one HTTP batch");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>          RPC endpoint URL  [required]");
    println!("    --method <METHOD>    Method name (call)");
    println!("    --params <JSON>      Params array (call)");
    println!("    --calls <JSON>       Array of {{method, params}} (batch)");
    println!("    --rps <N>            Throttle to N requests per second");
    println!("    --timeout-ms <MS>    Request timeout (default 30000)");
    println!("    --by-id              Re-align batch results by response id");
}

fn provider_from(args: &[String]) -> anyhow::Result<HttpProvider> {
    let url = parse_flag(args, "--url").ok_or_else(|| anyhow!("--url is required"))?;
    let mut options = ProviderOptions::default();
    if let Some(rps) = parse_flag(args, "--rps") {
        options.requests_per_second = Some(rps.parse().context("--rps must be a number")?);
    }
    if let Some(ms) = parse_flag(args, "--timeout-ms") {
        options.request_timeout_ms = ms.parse().context("--timeout-ms must be an integer")?;
    }
    if args.iter().any(|a| a == "--by-id") {
        options.batch_ordering = BatchOrdering::ById;
    }
    Ok(HttpProvider::new(url, options)?)
}

async fn cmd_call(args: &[String]) -> anyhow::Result<()> {
    let method = parse_flag(args, "--method").ok_or_else(|| anyhow!("--method is required"))?;
    let params = match parse_flag(args, "--params") {
        Some(raw) => Some(serde_json::from_str::<Value>(&raw).context("--params is not valid JSON")?),
        None => None,
    };
    let provider = provider_from(args)?;

    let result = provider
        .request(RequestArguments::new(method, params))
        .await
        .map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_batch(args: &[String]) -> anyhow::Result<()> {
    let raw = parse_flag(args, "--calls").ok_or_else(|| anyhow!("--calls is required"))?;
    let calls: Vec<CallDescriptor> =
        serde_json::from_str(&raw).context("--calls must be a JSON array of {method, params}")?;
    let provider = provider_from(args)?;

    let results = provider.batch(calls).await.map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Aggregate failures print every item so the failing ones can be spotted.
fn explain(err: RpcError) -> anyhow::Error {
    if let Some(responses) = err.responses() {
        match serde_json::to_string_pretty(responses) {
            Ok(dump) => return anyhow!("{err}\n{dump}"),
            Err(e) => tracing::warn!(error = %e, "could not render batch responses"),
        }
    }
    match err.payload().and_then(|p| p.data.as_ref()) {
        Some(data) => anyhow!("{err} (data: {data})"),
        None => anyhow!(err),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
