//! # chatbuzzd — chatbuzz daemon
//!
//! Composition root that wires the adapters around the engine loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Preload persisted triggers and the authorized-sender restriction
//! - Construct the Intiface websocket client behind the device port
//! - Feed stdin lines into the dispatcher, replies onto stdout
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use chatbuzz_adapter_intiface::WebsocketClient;
use chatbuzz_adapter_stdio::StdoutReplySink;
use chatbuzz_app::commands::CommandProcessor;
use chatbuzz_app::dispatcher::{self, InputEvent};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Replies own stdout, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.logging.filter.clone()))
        .with_writer(std::io::stderr)
        .init();

    let mut processor = CommandProcessor::new(WebsocketClient::new());
    processor.set_default_target(config.target());
    processor.set_authorized_user(config.authorization.user.clone());
    if let Some(path) = config.triggers.file.as_deref() {
        preload_triggers(&mut processor, path).await?;
    }

    let (events_tx, events_rx) = mpsc::channel(64);

    tokio::spawn(chatbuzz_adapter_stdio::forward_stdin(events_tx.clone()));

    let shutdown_tx = events_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(InputEvent::Shutdown).await;
        }
    });
    drop(events_tx);

    tracing::info!(target = %config.target(), "chatbuzzd ready");
    dispatcher::run(events_rx, processor, StdoutReplySink::new()).await;
    Ok(())
}

/// Merge the configured trigger file into the processor. A missing file is
/// not an error; the engine just starts empty.
async fn preload_triggers(
    processor: &mut CommandProcessor<WebsocketClient>,
    path: &str,
) -> Result<(), std::io::Error> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let report = processor.merge_triggers(&text);
            tracing::info!(
                path,
                added = report.added,
                duplicates = report.duplicates.len(),
                skipped = report.skipped,
                "preloaded triggers"
            );
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "trigger file not found, starting empty");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
