// ABOUTME: Animated three-dot typing indicator.
// ABOUTME: One dot is highlighted per frame, cycling left to right.

use ratatui::prelude::*;

use crate::theme::Theme;

const DOT: &str = "●";
const DOT_COUNT: usize = 3;

#[derive(Debug, Default)]
pub struct TypingIndicator {
    frame: usize,
}

impl TypingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Index of the highlighted dot
    pub fn active_dot(&self) -> usize {
        self.frame % DOT_COUNT
    }

    pub fn line(&self, theme: &Theme) -> Line<'static> {
        let mut spans = vec![Span::raw("  ")];
        for i in 0..DOT_COUNT {
            let style = if i == self.active_dot() {
                Style::default().fg(theme.text)
            } else {
                Style::default().fg(theme.text_dim).add_modifier(Modifier::DIM)
            };
            spans.push(Span::styled(DOT, style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}
