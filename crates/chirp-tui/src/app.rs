// ABOUTME: Central application state for the interactive chat screen.
// ABOUTME: Maps keys to engine commands and renders snapshots published by the engine.

use std::sync::Arc;

use chirp_core::{ChatEngine, ChatSnapshot, KeyValueStore};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};
use tokio::sync::watch;
use tokio_stream::StreamExt;

use crate::error::Result;
use crate::theme::{save_preference, toggled, Theme};
use crate::tui::event::TuiEvent;
use crate::tui::Tui;
use crate::widgets::chat::ChatView;
use crate::widgets::header::Header;
use crate::widgets::input::InputBar;
use crate::widgets::typing::TypingIndicator;

const MAX_INPUT_LINES: u16 = 5;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Send,
    Newline,
    Stop,
    Retry,
    ToggleTheme,
    PageUp,
    PageDown,
    /// Anything else goes to the input box
    Edit,
}

pub fn action_for(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('s') if ctrl => Action::Stop,
        KeyCode::Char('r') if ctrl => Action::Retry,
        KeyCode::Char('t') if ctrl => Action::ToggleTheme,
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            Action::Newline
        }
        KeyCode::Enter => Action::Send,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::Edit,
    }
}

/// Hints for the bottom row; stop and retry only appear when they apply
pub fn key_hints(snapshot: &ChatSnapshot, can_send: bool) -> Vec<&'static str> {
    let mut hints = Vec::new();
    if can_send {
        hints.push("Enter send");
    }
    if snapshot.streaming().is_some() {
        hints.push("^S stop");
    }
    if snapshot.latest_failed().is_some() {
        hints.push("^R retry");
    }
    hints.extend(["PgUp/PgDn scroll", "^C quit"]);
    hints
}

pub struct App {
    engine: ChatEngine,
    snapshots: watch::Receiver<ChatSnapshot>,
    store: Arc<dyn KeyValueStore>,
    theme: &'static Theme,
    chat: ChatView,
    input: InputBar<'static>,
    typing: TypingIndicator,
    snapshot: ChatSnapshot,
    should_quit: bool,
}

impl App {
    pub fn new(engine: ChatEngine, store: Arc<dyn KeyValueStore>, theme: &'static Theme) -> Self {
        let snapshots = engine.subscribe();
        let snapshot = snapshots.borrow().clone();
        let mut input = InputBar::new();
        input.apply_theme(theme);

        let mut app = Self {
            engine,
            snapshots,
            store,
            theme,
            chat: ChatView::new(theme),
            input,
            typing: TypingIndicator::new(),
            snapshot: ChatSnapshot::default(),
            should_quit: false,
        };
        app.show(snapshot);
        app
    }

    pub fn theme(&self) -> &'static Theme {
        self.theme
    }

    pub fn snapshot(&self) -> &ChatSnapshot {
        &self.snapshot
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn input_mut(&mut self) -> &mut InputBar<'static> {
        &mut self.input
    }

    /// Main loop: redraw, then wait for either a snapshot or a terminal event.
    /// Shuts the engine down on exit so pending changes are saved.
    pub async fn run(mut self, tui: &mut Tui) -> Result<()> {
        let mut events = tui.event_stream();

        loop {
            tui.terminal_mut().draw(|frame| self.render(frame))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        tracing::warn!("Chat engine stopped unexpectedly");
                        break;
                    }
                    self.sync();
                }
                event = events.next() => match event {
                    Some(event) => self.handle_event(event).await?,
                    None => break,
                },
            }
        }

        self.engine.shutdown().await?;
        Ok(())
    }

    /// Pull the latest snapshot from the engine
    pub fn sync(&mut self) {
        let snapshot = self.snapshots.borrow_and_update().clone();
        self.show(snapshot);
    }

    fn show(&mut self, snapshot: ChatSnapshot) {
        self.chat.set_messages(snapshot.messages.clone());
        self.snapshot = snapshot;
    }

    pub async fn handle_event(&mut self, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key) => self.handle_key(key).await?,
            TuiEvent::Paste(text) => self.input.insert_str(&text),
            TuiEvent::Tick => {
                self.typing.tick();
                self.chat.tick_cursor();
            }
            TuiEvent::Resize(_, _) => {}
        }
        Ok(())
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match action_for(&key) {
            Action::Quit => self.should_quit = true,
            Action::Send => {
                if let Some(text) = self.input.take() {
                    self.engine.send(text)?;
                }
            }
            Action::Newline => self.input.insert_newline(),
            Action::Stop => {
                if let Some(message) = self.snapshot.streaming() {
                    self.engine.stop(message.id.clone())?;
                }
            }
            Action::Retry => {
                if let Some(message) = self.snapshot.latest_failed() {
                    self.engine.retry(message.id.clone())?;
                }
            }
            Action::ToggleTheme => self.toggle_theme().await,
            Action::PageUp => self.chat.page_up(),
            Action::PageDown => self.chat.page_down(),
            Action::Edit => self.input.input(key),
        }
        Ok(())
    }

    async fn toggle_theme(&mut self) {
        self.theme = toggled(self.theme);
        self.chat.set_theme(self.theme);
        self.input.apply_theme(self.theme);
        save_preference(self.store.as_ref(), self.theme).await;
        tracing::debug!(theme = self.theme.name, "Theme toggled");
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.background)),
            area,
        );

        let input_lines = (self.input.textarea().lines().len() as u16).clamp(1, MAX_INPUT_LINES);
        let [header_area, chat_area, typing_area, input_area, hints_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(input_lines + 1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(&Header::new(self.theme), header_area);
        self.chat.render_and_update_viewport(chat_area, frame.buffer_mut());
        if self.snapshot.typing {
            frame.render_widget(Paragraph::new(self.typing.line(self.theme)), typing_area);
        }
        frame.render_widget(self.input.textarea(), input_area);

        let hints = key_hints(&self.snapshot, self.input.can_send()).join("  ·  ");
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", hints),
                Style::default().fg(self.theme.text_dim),
            ))
            .style(Style::default().bg(self.theme.surface)),
            hints_area,
        );
    }
}
