//! Command line configuration and logging setup.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "sas_lsp=info";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "sas-lsp",
    author,
    version,
    about = "Language server for SAS programs",
    long_about = None
)]
pub struct Args {
    /// Log filter, e.g. "debug" or "sas_lsp_core=trace" (falls back to RUST_LOG)
    #[arg(long, env = "SAS_LSP_LOG")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "SAS_LSP_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Serve a single client over TCP instead of stdio
    #[arg(long, env = "SAS_LSP_LISTEN")]
    pub listen: Option<SocketAddr>,
}

impl Args {
    /// Filter from the flag, then RUST_LOG, then the default.
    pub fn env_filter(&self) -> EnvFilter {
        self.log_level
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Logs never go to stdout, which carries
/// the protocol in stdio mode.
///
/// The returned guard flushes the log file when dropped.
pub fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(args.env_filter())
        .with_ansi(false);

    match &args.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_writer(writer).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}
