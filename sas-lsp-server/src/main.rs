use anyhow::{Context, Result};
use clap::Parser;
use sas_lsp_server::{build_service, config, Args};
use tokio::io::{stdin, stdout};
use tokio::net::TcpListener;
use tower_lsp::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // Held until exit so buffered log lines reach the file
    let _log_guard = config::init_logging(&args)?;

    info!("Starting SAS Language Server {}", env!("CARGO_PKG_VERSION"));

    let (service, socket) = build_service();

    match args.listen {
        Some(addr) => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("cannot listen on {}", addr))?;
            info!("Waiting for a client on {}", listener.local_addr()?);

            let (stream, peer) = listener.accept().await?;
            info!("Client connected from {}", peer);
            let (read, write) = tokio::io::split(stream);
            Server::new(read, write, socket).serve(service).await;
        }
        None => {
            Server::new(stdin(), stdout(), socket).serve(service).await;
        }
    }

    info!("SAS Language Server stopped");
    Ok(())
}
