// ABOUTME: Input bar wrapping tui-textarea.
// ABOUTME: Themed message box that hands back trimmed-nonempty text on send.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders};
use tui_textarea::{Input, TextArea};

use crate::theme::Theme;

const PLACEHOLDER: &str = "Message";

pub struct InputBar<'a> {
    textarea: TextArea<'a>,
}

impl Default for InputBar<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> InputBar<'a> {
    pub fn new() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(PLACEHOLDER);
        Self { textarea }
    }

    /// Restyle for a palette
    pub fn apply_theme(&mut self, theme: &Theme) {
        self.textarea
            .set_style(Style::default().fg(theme.text).bg(theme.input_bg));
        self.textarea
            .set_placeholder_style(Style::default().fg(theme.text_dim));
        self.textarea.set_cursor_line_style(Style::default());
        self.textarea.set_block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.border))
                .style(Style::default().bg(theme.surface)),
        );
    }

    pub fn textarea(&self) -> &TextArea<'a> {
        &self.textarea
    }

    /// Forward a key to the editor
    pub fn input(&mut self, input: impl Into<Input>) {
        self.textarea.input(input);
    }

    pub fn insert_str(&mut self, text: &str) {
        self.textarea.insert_str(text);
    }

    pub fn insert_newline(&mut self) {
        self.textarea.insert_newline();
    }

    pub fn content(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Send is only offered for text with non-whitespace content
    pub fn can_send(&self) -> bool {
        !self.content().trim().is_empty()
    }

    /// Take the text for sending and clear the box; `None` leaves blank text in place
    pub fn take(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }
        let content = self.content();
        self.textarea.select_all();
        self.textarea.cut();
        Some(content)
    }
}
