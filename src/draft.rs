//! Input buffer — the user's in-progress draft.
//!
//! The buffer never truncates: the 1000-character budget is a soft limit that
//! views surface through [`Draft::counter_label`] and [`Draft::over_budget`].
//! Lengths are counted in `char`s, not bytes.

/// Soft length budget shown next to the input box.
pub const DRAFT_BUDGET: usize = 1000;

/// The trimmed snapshot of a draft taken at submission time.
///
/// Only [`Draft::submission`] constructs one, so a `Submission` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission(String);

impl Submission {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, next: impl Into<String>) {
        self.text = next.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_newline(&mut self) {
        self.text.push('\n');
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn over_budget(&self) -> bool {
        self.char_count() > DRAFT_BUDGET
    }

    /// `"<n>/1000"`.
    pub fn counter_label(&self) -> String {
        format!("{}/{}", self.char_count(), DRAFT_BUDGET)
    }

    /// `true` when the trimmed text is non-empty.
    pub fn is_submittable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Submission guard: the trimmed text, or `None` when nothing is left.
    pub fn submission(&self) -> Option<Submission> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Submission(trimmed.to_string()))
        }
    }
}

/// What an Enter keypress means in the input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    Submit,
    Newline,
}

/// Enter submits; Shift+Enter inserts a line break.
pub fn enter_action(shift: bool) -> EnterAction {
    if shift { EnterAction::Newline } else { EnterAction::Submit }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_draft_is_empty() {
        let d = Draft::new();
        assert_eq!(d.text(), "");
        assert_eq!(d.counter_label(), "0/1000");
        assert!(!d.is_submittable());
    }

    #[test]
    fn blank_drafts_are_not_submittable() {
        for text in ["", "   ", "\n\t", " \r\n "] {
            let mut d = Draft::new();
            d.set_text(text);
            assert_eq!(d.submission(), None, "{text:?} should be rejected");
            assert!(!d.is_submittable());
        }
    }

    #[test]
    fn submission_is_trimmed() {
        let mut d = Draft::new();
        d.set_text("  capital of France?\n");
        let s = d.submission().unwrap();
        assert_eq!(s.as_str(), "capital of France?");
        // the buffer itself is untouched
        assert_eq!(d.text(), "  capital of France?\n");
    }

    #[test]
    fn interior_newlines_survive_trimming() {
        let mut d = Draft::new();
        d.set_text("line one\nline two\n\n");
        assert_eq!(d.submission().unwrap().as_str(), "line one\nline two");
    }

    #[test]
    fn budget_is_soft() {
        let mut d = Draft::new();
        d.set_text("x".repeat(DRAFT_BUDGET + 5));
        assert_eq!(d.char_count(), DRAFT_BUDGET + 5);
        assert!(d.over_budget());
        assert_eq!(d.counter_label(), "1005/1000");
        assert!(d.submission().is_some());
    }

    #[test]
    fn budget_counts_chars_not_bytes() {
        let mut d = Draft::new();
        d.set_text("é".repeat(DRAFT_BUDGET));
        assert_eq!(d.char_count(), DRAFT_BUDGET);
        assert!(!d.over_budget());
    }

    #[test]
    fn editing_helpers() {
        let mut d = Draft::new();
        d.push_char('h');
        d.push_char('i');
        d.push_newline();
        d.push_char('!');
        assert_eq!(d.text(), "hi\n!");
        d.backspace();
        d.backspace();
        assert_eq!(d.text(), "hi");
        d.clear();
        assert_eq!(d.text(), "");
        // backspace on empty is harmless
        d.backspace();
        assert_eq!(d.text(), "");
    }

    #[test]
    fn enter_submits_only_without_shift() {
        assert_eq!(enter_action(false), EnterAction::Submit);
        assert_eq!(enter_action(true), EnterAction::Newline);
    }
}
