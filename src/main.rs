//! hkm-chat — chat client entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse flags, load config
//!   3. Pick the front-end (terminal UI or console)
//!   4. Init logger once, to a target the front-end can live with
//!   5. Build the HTTP client
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run the front-end until it quits

use hkm_chat::cli::{self, CliAction};
use hkm_chat::client::HttpChatClient;
use hkm_chat::config;
use hkm_chat::error::AppError;
use hkm_chat::frontend::Frontend;
use hkm_chat::logger::{self, LogTarget};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = match cli::parse(std::env::args().skip(1)).map_err(AppError::Config)? {
        CliAction::Run(args) => args,
        CliAction::Help => {
            print!("{}", cli::usage("hkm-chat"));
            return Ok(());
        }
    };

    let config = config::load(args.config_path.as_deref())?;

    let frontend = Frontend::select(args.console);
    let log_file = config.log.file.as_deref();
    let target = match frontend {
        Frontend::Console => LogTarget::for_console(log_file),
        #[cfg(feature = "tui")]
        Frontend::Tui => LogTarget::for_tui(log_file),
    };

    let effective_log_level = args.log_level.unwrap_or(config.log.level.as_str());
    logger::init(effective_log_level, args.log_level.is_some(), &target)?;

    info!(
        endpoint = %config.client.endpoint,
        timeout_seconds = ?config.client.timeout_seconds,
        frontend = frontend.name(),
        log_level = %effective_log_level,
        "config loaded"
    );

    let client = HttpChatClient::from_config(&config.client)?;

    // Ctrl-C cancels the token; the front-end shuts down.
    // In the terminal UI raw mode swallows Ctrl-C as a key instead.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    frontend.run(client, shutdown).await
}
