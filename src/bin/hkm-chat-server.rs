//! hkm-chat-server — the `POST /chat` endpoint the client talks to.
//!
//! Startup sequence:
//!   1. Load .env (if present; `LLM_API_KEY` usually lives there)
//!   2. Parse flags, load config
//!   3. Init logger
//!   4. Build the LLM provider
//!   5. Serve until Ctrl-C

use hkm_chat::cli::{self, CliAction};
use hkm_chat::config;
use hkm_chat::error::AppError;
use hkm_chat::llm::providers;
use hkm_chat::logger::{self, LogTarget};
use hkm_chat::server;
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
    let _ = dotenvy::dotenv();

    let args = match cli::parse(std::env::args().skip(1)).map_err(AppError::Config)? {
        CliAction::Run(args) => args,
        CliAction::Help => {
            print!("{}", cli::usage("hkm-chat-server"));
            return Ok(());
        }
    };

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log.level.as_str());
    logger::init(
        effective_log_level,
        args.log_level.is_some(),
        &LogTarget::for_console(config.log.file.as_deref()),
    )?;

    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Config(e.to_string()))?;

    info!(
        bind = %config.server.bind,
        provider = provider.name(),
        api_key = config.llm_api_key.is_some(),
        "config loaded"
    );

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    server::serve(&config.server.bind, provider, shutdown).await
}
