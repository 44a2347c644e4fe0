// ABOUTME: Header bar with the app title and theme toggle hint.
// ABOUTME: Title centered on the surface color, toggle label on the right.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::theme::{toggled, Theme};

pub const TITLE: &str = "chirp";

pub struct Header {
    theme: &'static Theme,
}

impl Header {
    pub fn new(theme: &'static Theme) -> Self {
        Self { theme }
    }

    /// Label naming the palette Ctrl+T switches to
    pub fn toggle_label(&self) -> String {
        let next = toggled(self.theme).name;
        let mut chars = next.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!(" ^T {} ", capitalized)
    }
}

impl Widget for &Header {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.surface));
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(Line::from(Span::styled(
            TITLE,
            Style::default().fg(self.theme.text).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(inner, buf);

        Paragraph::new(Line::from(Span::styled(
            self.toggle_label(),
            Style::default().fg(self.theme.text_dim).bg(self.theme.surface_alt),
        )))
        .alignment(Alignment::Right)
        .render(inner, buf);
    }
}
