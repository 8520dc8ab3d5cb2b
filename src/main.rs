//! respkv server entry point.
//!
//! Reads the configuration, sets up logging, the shared store and clock, and
//! serves clients until Ctrl+C.

use anyhow::Context;
use clap::Parser;
use respkv::clock::SystemClock;
use respkv::commands::CommandHandler;
use respkv::config::ServerConfig;
use respkv::connection::{handle_connection, ConnectionStats};
use respkv::protocol::RespParser;
use respkv::storage::StorageEngine;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    config.validate().context("invalid configuration")?;

    // RUST_LOG takes precedence over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log filter '{}'", config.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!(version = respkv::VERSION, "respkv starting");

    // Shared across all connections
    let storage = Arc::new(StorageEngine::new());
    let clock = Arc::new(SystemClock::new());
    let handler = CommandHandler::new(storage.clone(), clock)
        .with_parser(RespParser::with_max_bulk_size(config.max_bulk_size()));
    info!("Storage engine initialized with 64 shards");

    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!(address = %config.bind_address(), "Listening");

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        _ = accept_loop(listener, handler, Arc::clone(&stats), config.max_buffer_size) => {}
        _ = shutdown => {}
    }

    let store_stats = storage.stats();
    info!(
        keys = store_stats.keys,
        gets = store_stats.get_ops,
        sets = store_stats.set_ops,
        expired = store_stats.expired,
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    handler: CommandHandler,
    stats: Arc<ConnectionStats>,
    max_buffer_size: usize,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = handler.clone();
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats, max_buffer_size).await;
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
            }
        }
    }
}
