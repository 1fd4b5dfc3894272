//! Line-oriented console: each input line is one submission.
//!
//! Used when stdin/stdout are not terminals (pipes, scripts) or when
//! `--console` is given. Blank lines hit the submission guard and are
//! skipped. Runs until stdin closes or `shutdown` is cancelled (Ctrl-C).

use std::io::{IsTerminal, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::HttpChatClient;
use crate::error::AppError;
use crate::session::ChatSession;

pub async fn run(client: HttpChatClient, shutdown: CancellationToken) -> Result<(), AppError> {
    let interactive = std::io::stdin().is_terminal();
    if interactive {
        println!("─────────────────────────────────");
        println!(" HKM-AI console  (Ctrl-C to quit)");
        println!(" endpoint: {}", client.endpoint());
        println!("─────────────────────────────────");
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_with(stdin, &mut stdout, &client, interactive, shutdown).await
}

/// Drive a session from `input`, writing one block of output per submission.
pub async fn run_with<R, W>(
    input: R,
    out: &mut W,
    client: &HttpChatClient,
    show_prompt: bool,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!(endpoint = %client.endpoint(), "console started");

    let mut session = ChatSession::new();
    let mut lines = input.lines();

    loop {
        if show_prompt {
            write!(out, "> ")?;
            out.flush()?;
        }

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => line,
        };

        let input = match line {
            Err(e) => {
                warn!("console read error: {e}");
                break;
            }
            Ok(None) => {
                debug!("console input closed");
                break;
            }
            Ok(Some(input)) => input,
        };

        session.edit_draft(input);
        let Some(submission) = session.begin_submit() else {
            continue;
        };

        let outcome = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("console shutting down with a request in flight");
                break;
            }

            outcome = client.send(&submission) => outcome,
        };
        session.complete(outcome);

        let snapshot = session.snapshot();
        if let Some(response) = snapshot.response {
            writeln!(out, "{response}")?;
        } else if let Some(error) = snapshot.error {
            writeln!(out, "error: {error}")?;
        }
        out.flush()?;
    }

    Ok(())
}
