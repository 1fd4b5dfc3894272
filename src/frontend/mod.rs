//! Front-ends — thin views over [`ChatSession`](crate::session::ChatSession).
//!
//! Both front-ends own their session and mutate it only from their own loop.

pub mod console;
#[cfg(feature = "tui")]
pub mod tui;

use std::io::IsTerminal;

use tokio_util::sync::CancellationToken;

use crate::client::HttpChatClient;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Console,
    #[cfg(feature = "tui")]
    Tui,
}

impl Frontend {
    /// Terminal UI when both stdin and stdout are terminals and the caller
    /// did not ask for the console; the console otherwise.
    pub fn select(force_console: bool) -> Self {
        let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
        Self::choose(force_console, interactive)
    }

    #[cfg(feature = "tui")]
    fn choose(force_console: bool, interactive: bool) -> Self {
        if interactive && !force_console { Frontend::Tui } else { Frontend::Console }
    }

    #[cfg(not(feature = "tui"))]
    fn choose(_force_console: bool, _interactive: bool) -> Self {
        Frontend::Console
    }

    pub fn name(&self) -> &'static str {
        match self {
            Frontend::Console => "console",
            #[cfg(feature = "tui")]
            Frontend::Tui => "tui",
        }
    }

    pub async fn run(self, client: HttpChatClient, shutdown: CancellationToken) -> Result<(), AppError> {
        match self {
            Frontend::Console => console::run(client, shutdown).await,
            #[cfg(feature = "tui")]
            Frontend::Tui => tui::run(client, shutdown).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piped_io_uses_console() {
        assert_eq!(Frontend::choose(false, false), Frontend::Console);
        assert_eq!(Frontend::choose(true, false), Frontend::Console);
    }

    #[test]
    fn forced_console_on_terminal() {
        assert_eq!(Frontend::choose(true, true), Frontend::Console);
    }

    #[cfg(feature = "tui")]
    #[test]
    fn terminal_uses_tui() {
        assert_eq!(Frontend::choose(false, true), Frontend::Tui);
    }
}
