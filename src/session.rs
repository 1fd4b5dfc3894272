//! Request lifecycle controller.
//!
//! [`ChatSession`] owns the draft and the [`ViewState`] and is the only place
//! either changes. A submission is split in two so front-ends can run the
//! network call off their event loop:
//!
//! 1. [`ChatSession::begin_submit`]: guard the draft and capture the payload.
//! 2. [`ChatSession::complete`]: install the response or error.
//!
//! [`ChatSession::submit`] runs both halves around one client call for callers
//! that can simply await.
//!
//! At most one request is ever in flight: `begin_submit` refuses while
//! loading. There is no cancellation. An issued request always completes.

use tracing::{debug, info, warn};

use crate::client::{ChatError, ChatReply, HttpChatClient};
use crate::draft::{Draft, Submission};
use crate::view::{ViewEvent, ViewState};

/// What a view needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<'a> {
    pub draft_text: &'a str,
    pub draft_counter: String,
    pub over_budget: bool,
    pub is_loading: bool,
    pub response: Option<&'a str>,
    pub error: Option<&'a str>,
    /// Whether the send action is enabled.
    pub can_submit: bool,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    draft: Draft,
    view: ViewState,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Direct edit access for key-by-key input.
    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.view.is_loading()
    }

    /// Replace the draft. Allowed while loading; the in-flight payload was
    /// already captured and is unaffected.
    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.draft.set_text(text);
    }

    fn transition(&mut self, event: ViewEvent) {
        let from = self.view.label();
        self.view = std::mem::take(&mut self.view).apply(event);
        debug!(from, to = self.view.label(), "view transition");
    }

    /// Guard and enter `Loading`. Returns the payload to send, or `None` when
    /// the draft is blank or a request is already in flight (no state change
    /// in either case).
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.view.is_loading() {
            debug!("submit ignored: request already in flight");
            return None;
        }
        let submission = self.draft.submission()?;
        self.transition(ViewEvent::Submitted);
        info!(prompt_len = submission.as_str().len(), "submission started");
        Some(submission)
    }

    /// Apply the outcome of the in-flight request.
    ///
    /// Success clears the draft; failure keeps it so the user can retry.
    /// Leaving `Loading` and installing the content is one transition.
    pub fn complete(&mut self, outcome: Result<ChatReply, ChatError>) {
        if !self.view.is_loading() {
            warn!("completion arrived with no request in flight; ignored");
            return;
        }
        match outcome {
            Ok(reply) => {
                info!(content_absent = reply.content_absent, "submission resolved");
                self.draft.clear();
                self.transition(ViewEvent::Succeeded(reply.text));
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.transition(ViewEvent::Failed(e.to_string()));
            }
        }
    }

    /// Submit the current draft through `client` and await the outcome.
    /// A no-op when [`begin_submit`](Self::begin_submit) declines.
    pub async fn submit(&mut self, client: &HttpChatClient) {
        let Some(submission) = self.begin_submit() else {
            return;
        };
        let outcome = client.send(&submission).await;
        self.complete(outcome);
    }

    /// Clear a failure back to `Idle`. Harmless in any other state.
    pub fn dismiss_error(&mut self) {
        self.transition(ViewEvent::Dismissed);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            draft_text: self.draft.text(),
            draft_counter: self.draft.counter_label(),
            over_budget: self.draft.over_budget(),
            is_loading: self.view.is_loading(),
            response: self.view.response(),
            error: self.view.error(),
            can_submit: !self.view.is_loading() && self.draft.is_submittable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NO_CONTENT_PLACEHOLDER;

    fn reply(text: &str) -> Result<ChatReply, ChatError> {
        Ok(ChatReply { text: text.to_string(), content_absent: false })
    }

    fn session_with(text: &str) -> ChatSession {
        let mut s = ChatSession::new();
        s.edit_draft(text);
        s
    }

    #[test]
    fn blank_submissions_are_ignored() {
        for text in ["", "   ", "\n\t"] {
            let mut s = session_with(text);
            assert!(s.begin_submit().is_none());
            assert_eq!(s.view(), &ViewState::Idle);
            assert_eq!(s.draft().text(), text);
        }
    }

    #[test]
    fn blank_submission_keeps_previous_response() {
        let mut s = session_with("q");
        s.begin_submit().unwrap();
        s.complete(reply("a"));
        s.edit_draft("  ");
        assert!(s.begin_submit().is_none());
        assert_eq!(s.view(), &ViewState::Resolved("a".into()));
    }

    #[test]
    fn submit_enters_loading_with_trimmed_payload() {
        let mut s = session_with("  capital of France?  ");
        let sub = s.begin_submit().unwrap();
        assert_eq!(sub.as_str(), "capital of France?");
        assert!(s.is_loading());
        // draft is only cleared on success
        assert_eq!(s.draft().text(), "  capital of France?  ");
    }

    #[test]
    fn second_submit_while_loading_is_refused() {
        let mut s = session_with("first");
        assert!(s.begin_submit().is_some());
        s.edit_draft("second");
        assert!(s.begin_submit().is_none());
        assert!(s.is_loading());
        assert_eq!(s.draft().text(), "second");
    }

    #[test]
    fn success_clears_draft() {
        let mut s = session_with("capital of France?");
        s.begin_submit().unwrap();
        s.complete(reply("Paris"));
        assert_eq!(s.view(), &ViewState::Resolved("Paris".into()));
        assert_eq!(s.draft().text(), "");
    }

    #[test]
    fn edit_during_flight_is_cleared_on_success() {
        let mut s = session_with("q");
        s.begin_submit().unwrap();
        s.edit_draft("typed while waiting");
        s.complete(reply("a"));
        assert_eq!(s.draft().text(), "");
    }

    #[test]
    fn placeholder_reply_is_a_success() {
        let mut s = session_with("q");
        s.begin_submit().unwrap();
        s.complete(Ok(ChatReply { text: NO_CONTENT_PLACEHOLDER.into(), content_absent: true }));
        assert_eq!(s.view().response(), Some(NO_CONTENT_PLACEHOLDER));
        assert!(s.view().error().is_none());
    }

    #[test]
    fn failure_keeps_draft_and_surfaces_status() {
        let mut s = session_with("capital of France?");
        s.begin_submit().unwrap();
        s.complete(Err(ChatError::Status(500)));
        let msg = s.view().error().unwrap();
        assert!(msg.contains("500"));
        assert_eq!(s.draft().text(), "capital of France?");
        assert!(!s.is_loading());
    }

    #[test]
    fn retry_after_failure() {
        let mut s = session_with("q");
        s.begin_submit().unwrap();
        s.complete(Err(ChatError::transport("connection refused")));
        assert!(s.begin_submit().is_some());
        assert!(s.view().error().is_none());
        s.complete(reply("ok"));
        assert_eq!(s.view(), &ViewState::Resolved("ok".into()));
    }

    #[test]
    fn stray_completion_is_ignored() {
        let mut s = session_with("q");
        s.complete(reply("late"));
        assert_eq!(s.view(), &ViewState::Idle);
        assert_eq!(s.draft().text(), "q");
    }

    #[test]
    fn dismiss_returns_to_idle() {
        let mut s = session_with("q");
        s.begin_submit().unwrap();
        s.complete(Err(ChatError::transport("x")));
        s.dismiss_error();
        assert_eq!(s.view(), &ViewState::Idle);
        let snap = s.snapshot();
        assert!(snap.response.is_none());
        assert!(snap.error.is_none());
        assert!(!snap.is_loading);
    }

    #[test]
    fn dismiss_without_error_is_noop() {
        let mut s = ChatSession::new();
        s.dismiss_error();
        assert_eq!(s.view(), &ViewState::Idle);

        let mut s = session_with("q");
        s.begin_submit().unwrap();
        s.complete(reply("kept"));
        s.dismiss_error();
        assert_eq!(s.view(), &ViewState::Resolved("kept".into()));
    }

    #[test]
    fn snapshot_disables_send_while_loading_or_blank() {
        let s = ChatSession::new();
        assert!(!s.snapshot().can_submit);

        let mut s = session_with("hello");
        assert!(s.snapshot().can_submit);
        assert_eq!(s.snapshot().draft_counter, "5/1000");
        s.begin_submit().unwrap();
        let snap = s.snapshot();
        assert!(snap.is_loading);
        assert!(!snap.can_submit);
        assert!(snap.response.is_none() && snap.error.is_none());
    }

    #[test]
    fn snapshot_shows_at_most_one_outcome() {
        let mut s = session_with("q");
        let check = |s: &ChatSession| {
            let snap = s.snapshot();
            let shown = [snap.is_loading, snap.response.is_some(), snap.error.is_some()]
                .into_iter()
                .filter(|b| *b)
                .count();
            assert!(shown <= 1);
        };
        check(&s);
        s.begin_submit().unwrap();
        check(&s);
        s.complete(reply("a"));
        check(&s);
        s.edit_draft("again");
        s.begin_submit().unwrap();
        check(&s);
        s.complete(Err(ChatError::Status(503)));
        check(&s);
    }
}
