use anyhow::Result;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tx_message_reader::application::app;
use tx_message_reader::infrastructure::memory::InMemoryDatabase;
use tx_message_reader::service;

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Reads and decrypts transaction messages over a REST API"
)]
struct ReaderProgram {
    /// Listen address REST API
    #[arg(short = 'a', long, default_value = "0.0.0.0")]
    listen_address: IpAddr,

    /// Listen port REST API
    #[arg(short, long, default_value_t = 3000)]
    listen_port: u16,

    /// JSON file with transactions and accounts to serve
    #[arg(short, long)]
    seed_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = ReaderProgram::parse();

    let database = Arc::new(InMemoryDatabase::default());
    if let Some(seed_file) = &args.seed_file {
        tracing::info!("Loading seed file {}", seed_file.display());
        database.load_seed_file(seed_file)?;
    }

    // Create a shutdown channel
    let (shutdown_sender, _) = broadcast::channel(1);

    // Start the API server
    let app = Arc::new(app::App::new(database));
    let address = SocketAddr::new(args.listen_address, args.listen_port);
    let server_handle = tokio::spawn(service::api::start_server(
        shutdown_sender.clone(),
        app,
        address,
    ));

    // Wait for shutdown signal
    signal::ctrl_c().await?;
    tracing::warn!("Received Ctrl+C, shutting down...");

    let _ = shutdown_sender.send(());

    // Wait for the server to stop
    match server_handle.await {
        Ok(Err(e)) => tracing::error!("API server error: {:?}", e),
        Err(e) => tracing::error!("API server task failed: {:?}", e),
        Ok(Ok(())) => {}
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
