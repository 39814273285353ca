//! Interactive terminal client for the parley messaging backend.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the default backend (or $PARLEY_SERVER_URL)
//! parley-chat
//!
//! # Pick a backend and refresh every second
//! parley-chat --server http://chat.example.com:4040/ --poll-interval-ms 1000
//!
//! # Keep the terminal clean: send logs to a file, metrics too on exit
//! PARLEY_LOG=debug parley-chat --log-file parley.log --metrics-file parley.metrics
//! ```
//!
//! Inside a chat, type a message and press Enter to send it.  `/exit`, Ctrl+C
//! or Ctrl+D leave the chat and return to the menu.  At the menu, `q`, Ctrl+C
//! or Ctrl+D quit.  SIGTERM quits from anywhere.

use std::fs::File;
use std::sync::{Arc, Mutex};

use arrrg::CommandLine;
use biometrics::Collector;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use parley::chat::{ChatArgs, ChatConfig, Input, LineEditor, Shell};
use parley::observability::{emit_biometrics, register_biometrics};
use parley::{Console, Messenger, PlainTextRenderer};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PARLEY_LOG";

fn init_logging(config: &ChatConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match &config.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| -> Box<dyn std::error::Error> { e })?;
        }
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| -> Box<dyn std::error::Error> { e })?,
    }
    Ok(())
}

async fn run(config: ChatConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    ctrlc::set_handler(move || {
        on_signal.cancel();
    })?;

    let backend = Arc::new(Messenger::from_config(&config)?);
    tracing::info!(server = %backend.base_url(), "starting parley-chat");
    let console = Console::new(PlainTextRenderer::with_color(config.use_color));
    let input = Input::new(LineEditor::new()?);

    let mut shell = Shell::new(backend, console, input, config, shutdown);
    shell.run().await?;
    Ok(())
}

/// Main entry point for the parley-chat application.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("parley-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    config.validate()?;
    init_logging(&config)?;

    let collector = Collector::new();
    register_biometrics(&collector);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(config.clone()));
    // A terminal read abandoned by a signal never returns; don't wait for it.
    runtime.shutdown_background();

    if let Some(path) = &config.metrics_file {
        emit_biometrics(&collector, path)?;
    }
    result?;
    println!("Goodbye!");
    Ok(())
}
