//! View state and its transition function.
//!
//! Exactly one of idle / loading / response / error is active at a time, so
//! "only one thing is displayed" holds by construction rather than by keeping
//! independent flags in sync.
//!
//! ```text
//! Idle     --Submitted--> Loading
//! Resolved --Submitted--> Loading
//! Failed   --Submitted--> Loading
//! Loading  --Succeeded--> Resolved
//! Loading  --Failed-----> Failed
//! Failed   --Dismissed--> Idle
//! ```
//!
//! Every other (state, event) pair leaves the state unchanged.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Resolved(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Submitted,
    Succeeded(String),
    Failed(String),
    Dismissed,
}

impl ViewState {
    /// Pure transition.
    pub fn apply(self, event: ViewEvent) -> ViewState {
        match (self, event) {
            // Loading -> Loading is a no-op; the session never sends a second request.
            (_, ViewEvent::Submitted) => ViewState::Loading,
            (ViewState::Loading, ViewEvent::Succeeded(text)) => ViewState::Resolved(text),
            (ViewState::Loading, ViewEvent::Failed(message)) => ViewState::Failed(message),
            (ViewState::Failed(_), ViewEvent::Dismissed) => ViewState::Idle,
            (state, _) => state,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            ViewState::Resolved(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Resolved(_) => "resolved",
            ViewState::Failed(_) => "failed",
        }
    }
}
