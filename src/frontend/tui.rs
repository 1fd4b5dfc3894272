//! Terminal UI: render → select → update → loop.
//!
//! The network call runs on a spawned task and reports back over an mpsc
//! channel, so every session mutation happens on this loop. The send key is
//! inert while a request is in flight ([`ChatSession::begin_submit`] refuses).

use std::io::{self, Stdout, Write};
use std::panic;

use crossterm::{
    event::{
        Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::{ChatError, ChatReply, HttpChatClient};
use crate::draft::{EnterAction, enter_action};
use crate::error::AppError;
use crate::session::{ChatSession, Snapshot};

type Outcome = Result<ChatReply, ChatError>;

// ── Input ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputAction {
    Insert(char),
    Newline,
    Backspace,
    Submit,
    DismissError,
    Quit,
}

pub(crate) fn map_key(key: KeyEvent) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Some(InputAction::Quit),
        KeyCode::Enter => {
            // Terminals without keyboard enhancement cannot report Shift+Enter;
            // Alt+Enter is accepted as the same gesture.
            let shift = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
            Some(match enter_action(shift) {
                EnterAction::Submit => InputAction::Submit,
                EnterAction::Newline => InputAction::Newline,
            })
        }
        KeyCode::Esc => Some(InputAction::DismissError),
        KeyCode::Backspace => Some(InputAction::Backspace),
        KeyCode::Char(c) if !ctrl => Some(InputAction::Insert(c)),
        _ => None,
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

struct ChatApp {
    session: ChatSession,
    client: HttpChatClient,
    running: bool,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl ChatApp {
    fn new(client: HttpChatClient) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self { session: ChatSession::new(), client, running: true, outcome_tx, outcome_rx }
    }

    fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::Insert(c) => self.session.draft_mut().push_char(c),
            InputAction::Newline => self.session.draft_mut().push_newline(),
            InputAction::Backspace => self.session.draft_mut().backspace(),
            InputAction::Submit => self.start_request(),
            InputAction::DismissError => self.session.dismiss_error(),
            InputAction::Quit => self.running = false,
        }
    }

    fn start_request(&mut self) {
        let Some(submission) = self.session.begin_submit() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = client.send(&submission).await;
            // A closed receiver means the app already quit.
            let _ = tx.send(outcome);
        });
    }

    async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        shutdown: CancellationToken,
    ) -> Result<(), AppError> {
        let mut events = EventStream::new();

        while self.running {
            terminal
                .draw(|frame| render(frame, &self.session.snapshot(), self.client.endpoint()))
                .map_err(|e| AppError::Terminal(format!("draw failed: {e}")))?;

            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.running = false;
                }
                Some(outcome) = self.outcome_rx.recv() => {
                    self.session.complete(outcome);
                }
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => {
                        if let Some(action) = map_key(key) {
                            self.handle_action(action);
                        }
                    }
                    // Resize and friends only need a redraw.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(AppError::Terminal(format!("input error: {e}"))),
                    None => self.running = false,
                },
            }
        }

        Ok(())
    }
}

// ── Terminal lifecycle ────────────────────────────────────────────────────────

pub async fn run(client: HttpChatClient, shutdown: CancellationToken) -> Result<(), AppError> {
    info!(endpoint = %client.endpoint(), "terminal ui starting");
    setup_panic_hook();

    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    let mut terminal = setup_terminal(enhanced)?;

    let mut app = ChatApp::new(client);
    let result = app.run(&mut terminal, shutdown).await;

    restore_terminal(enhanced);
    terminal
        .show_cursor()
        .map_err(|e| AppError::Terminal(format!("failed to show cursor: {e}")))?;
    info!("terminal ui closed");
    result
}

fn setup_terminal(enhanced: bool) -> Result<Terminal<CrosstermBackend<Stdout>>, AppError> {
    enable_raw_mode().map_err(|e| AppError::Terminal(format!("failed to enable raw mode: {e}")))?;
    // Past raw mode, any failure must hand the shell back before returning.
    undo_on_err(|| enter_screen(io::stdout(), enhanced), || restore_terminal(enhanced))
}

fn undo_on_err<T>(
    step: impl FnOnce() -> Result<T, AppError>,
    undo: impl FnOnce(),
) -> Result<T, AppError> {
    step().inspect_err(|e| {
        debug!(error = %e, "terminal setup failed, restoring");
        undo();
    })
}

fn enter_screen<W: Write>(
    mut stdout: W,
    enhanced: bool,
) -> Result<Terminal<CrosstermBackend<W>>, AppError> {
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| AppError::Terminal(format!("failed to enter alternate screen: {e}")))?;
    if enhanced {
        // Needed for the terminal to report Shift on Enter.
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .map_err(|e| AppError::Terminal(format!("failed to enable keyboard enhancement: {e}")))?;
    }
    debug!(enhanced, "terminal ready");
    Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| AppError::Terminal(format!("failed to create terminal: {e}")))
}

fn restore_terminal(enhanced: bool) {
    let mut stdout = io::stdout();
    if enhanced {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = disable_raw_mode();
    let _ = execute!(stdout, LeaveAlternateScreen, crossterm::cursor::Show);
}

/// Restore the terminal before the default hook prints the panic.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
        original_hook(panic_info);
    }));
}

// ── Rendering ─────────────────────────────────────────────────────────────────

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

pub(crate) fn render(frame: &mut Frame, snap: &Snapshot<'_>, endpoint: &str) {
    let [header, input, output, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(7),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header, endpoint);
    render_input(frame, input, snap);
    render_output(frame, output, snap);
    render_footer(frame, footer, snap);
}

fn render_header(frame: &mut Frame, area: Rect, endpoint: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" HKM-AI ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("Ask anything and get intelligent responses"),
        Span::styled(format!("  ({endpoint})"), Style::default().fg(MUTED)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_input(frame: &mut Frame, area: Rect, snap: &Snapshot<'_>) {
    let counter_style = if snap.over_budget {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Prompt ")
        .title_bottom(Line::from(Span::styled(format!(" {} ", snap.draft_counter), counter_style)).right_aligned());

    let body = if snap.draft_text.is_empty() {
        Text::from(Span::styled("Ask HKM-AI something...", Style::default().fg(MUTED)))
    } else {
        Text::from(snap.draft_text)
    };

    // Keep the tail of a long draft in view. Rows are counted after wrapping.
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2) as usize;
    let paragraph = Paragraph::new(body).wrap(Wrap { trim: false });
    let rows = paragraph.line_count(inner_width) + usize::from(snap.draft_text.ends_with('\n'));
    let scroll = u16::try_from(rows.saturating_sub(inner_height)).unwrap_or(u16::MAX);

    frame.render_widget(paragraph.block(block).scroll((scroll, 0)), area);
}

fn render_output(frame: &mut Frame, area: Rect, snap: &Snapshot<'_>) {
    let widget = if snap.is_loading {
        Paragraph::new(vec![
            Line::raw(""),
            Line::from(Span::styled(
                "HKM-AI is thinking...",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
    } else if let Some(error) = snap.error {
        Paragraph::new(vec![
            Line::from(Span::styled(error, Style::default().fg(Color::Red))),
            Line::raw(""),
            Line::from(Span::styled("Esc to dismiss", Style::default().fg(MUTED))),
        ])
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error occurred "),
        )
    } else if let Some(response) = snap.response {
        Paragraph::new(Text::from(response))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" HKM-AI Response "))
    } else {
        Paragraph::new(vec![
            Line::raw(""),
            Line::from(Span::styled("Ready to chat!", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                "Type your question above and press Enter to get a response from HKM-AI.",
                Style::default().fg(MUTED),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL))
    };
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, area: Rect, snap: &Snapshot<'_>) {
    let key = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    let send = if snap.is_loading {
        vec![Span::styled(" Thinking... ", Style::default().fg(MUTED))]
    } else if snap.can_submit {
        vec![Span::styled(" Enter ", key), Span::raw("send ")]
    } else {
        vec![Span::styled(" Enter send ", Style::default().fg(MUTED))]
    };

    let mut spans = send;
    spans.extend([
        Span::styled(" Shift+Enter ", key),
        Span::raw("newline "),
        Span::styled(" Esc ", key),
        Span::raw("dismiss "),
        Span::styled(" Ctrl+C ", key),
        Span::raw("quit"),
    ]);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
