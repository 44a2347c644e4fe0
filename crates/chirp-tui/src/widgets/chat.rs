// ABOUTME: Chat display widget rendering grouped messages as bubbles.
// ABOUTME: User bubbles on the right, bot bubbles on the left with avatar and timestamps.

use chirp_core::{GroupedMessage, Role};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::theme::Theme;

/// Glyph drawn after the revealed text of a streaming message
const STREAM_CURSOR: char = '▍';

/// Avatar column shown beside the last bot bubble of a group
const AVATAR: &str = " B ";

/// Bubble width as a share of the chat width
const BUBBLE_PERCENT: usize = 78;

const RETRY_HINT: &str = "Ctrl+R to retry";

pub struct ChatView {
    messages: Vec<GroupedMessage>,
    scroll_offset: u16,
    viewport_height: u16,
    cursor_visible: bool,
    theme: &'static Theme,
}

impl ChatView {
    pub fn new(theme: &'static Theme) -> Self {
        Self {
            messages: Vec::new(),
            scroll_offset: 0,
            viewport_height: 0,
            cursor_visible: true,
            theme,
        }
    }

    pub fn set_theme(&mut self, theme: &'static Theme) {
        self.theme = theme;
    }

    /// Replace the displayed messages; a new message snaps back to the bottom
    pub fn set_messages(&mut self, messages: Vec<GroupedMessage>) {
        if messages.len() != self.messages.len() {
            self.scroll_offset = 0;
        }
        self.messages = messages;
    }

    pub fn messages(&self) -> &[GroupedMessage] {
        &self.messages
    }

    /// Blink the streaming cursor
    pub fn tick_cursor(&mut self) {
        self.cursor_visible = !self.cursor_visible;
    }

    pub fn page_up(&mut self) {
        let page_size = self.viewport_height.saturating_sub(2).max(1);
        self.scroll_offset = self.scroll_offset.saturating_add(page_size);
    }

    pub fn page_down(&mut self) {
        let page_size = self.viewport_height.saturating_sub(2).max(1);
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
    }

    /// Wrap text to fit within the given width, preserving words where possible.
    fn wrap_text(text: &str, width: usize) -> Vec<String> {
        if width == 0 {
            return vec![];
        }

        let mut lines = Vec::new();
        for line in text.lines() {
            let mut current = String::new();
            let mut current_chars = 0usize;
            for word in line.split_whitespace() {
                let word_chars = word.chars().count();
                if current_chars > 0 && current_chars + 1 + word_chars <= width {
                    current.push(' ');
                    current.push_str(word);
                    current_chars += 1 + word_chars;
                    continue;
                }
                if current_chars > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_chars = 0;
                }
                if word_chars > width {
                    let mut chars = word.chars().peekable();
                    while chars.peek().is_some() {
                        let chunk: String = chars.by_ref().take(width).collect();
                        current_chars = chunk.chars().count();
                        current = chunk;
                        if current_chars == width {
                            lines.push(std::mem::take(&mut current));
                            current_chars = 0;
                        }
                    }
                } else {
                    current.push_str(word);
                    current_chars = word_chars;
                }
            }
            if current_chars > 0 || line.trim().is_empty() {
                lines.push(current);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Render one message (bubble, optional timestamp, group spacing)
    fn render_message(&self, grouped: &GroupedMessage, width: usize) -> Vec<Line<'static>> {
        let msg = &grouped.message;
        let is_user = msg.role == Role::User;
        let avatar_width = if is_user { 0 } else { AVATAR.chars().count() + 1 };
        let bubble_width = (width * BUBBLE_PERCENT / 100).max(4);
        let text_width = bubble_width.saturating_sub(2).max(1);

        let mut body = msg.content.clone();
        if msg.streaming && self.cursor_visible {
            body.push(STREAM_CURSOR);
        }
        let wrapped = Self::wrap_text(&body, text_width);
        let inner = wrapped.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let (bg, fg) = match (is_user, msg.failed) {
            (true, _) => (self.theme.bubble_user, self.theme.primary_text),
            (false, true) => (self.theme.bubble_bot, self.theme.danger),
            (false, false) => (self.theme.bubble_bot, self.theme.text),
        };
        let bubble_style = Style::default().bg(bg).fg(fg);

        let mut lines = Vec::with_capacity(wrapped.len() + 3);
        let last = wrapped.len().saturating_sub(1);
        for (i, text) in wrapped.into_iter().enumerate() {
            let padded = format!(" {:<inner$} ", text, inner = inner);
            if is_user {
                lines.push(
                    Line::from(Span::styled(padded, bubble_style)).alignment(Alignment::Right),
                );
            } else {
                let avatar = if grouped.show_avatar && i == last {
                    Span::styled(
                        AVATAR,
                        Style::default()
                            .bg(self.theme.surface_alt)
                            .fg(self.theme.text)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw(" ".repeat(AVATAR.chars().count()))
                };
                lines.push(Line::from(vec![
                    avatar,
                    Span::raw(" "),
                    Span::styled(padded, bubble_style),
                ]));
            }
        }

        if msg.failed {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(avatar_width + 1)),
                Span::styled(
                    RETRY_HINT,
                    Style::default()
                        .fg(self.theme.text_dim)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]));
        }

        if grouped.show_timestamp {
            let stamp = Span::styled(msg.format_time(), Style::default().fg(self.theme.text_dim));
            if is_user {
                lines.push(Line::from(stamp).alignment(Alignment::Right));
            } else {
                lines.push(Line::from(vec![Span::raw(" ".repeat(avatar_width + 1)), stamp]));
            }
        }

        if grouped.last_in_group {
            lines.push(Line::from(""));
        }

        lines
    }
}

impl Widget for &ChatView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.theme.background));

        if area.width < 3 || area.height < 1 {
            return;
        }

        let mut all_lines = self.all_lines(area.width);

        // scroll_offset counts lines up from the bottom
        let end_line = all_lines.len().saturating_sub(self.scroll_offset as usize);
        let start_line = end_line.saturating_sub(area.height as usize);
        let visible: Vec<Line<'static>> = all_lines.drain(start_line..end_line).collect();

        let inner = Rect {
            x: area.x + 1,
            width: area.width.saturating_sub(2),
            ..area
        };
        Paragraph::new(visible).render(inner, buf);
    }
}

impl ChatView {
    fn all_lines(&self, area_width: u16) -> Vec<Line<'static>> {
        let width = area_width.saturating_sub(2) as usize;
        self.messages
            .iter()
            .flat_map(|g| self.render_message(g, width))
            .collect()
    }

    /// Render, remembering the viewport and pinning the scroll at the oldest line
    pub fn render_and_update_viewport(&mut self, area: Rect, buf: &mut Buffer) {
        self.viewport_height = area.height;
        let total = self.all_lines(area.width).len();
        let max_scroll = total.saturating_sub(area.height as usize);
        self.scroll_offset = self
            .scroll_offset
            .min(u16::try_from(max_scroll).unwrap_or(u16::MAX));
        (&*self).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{DARK_THEME, LIGHT_THEME};
    use chirp_core::{group_messages, Message, TimestampPolicy};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn grouped(messages: &[Message]) -> Vec<GroupedMessage> {
        group_messages(messages, TimestampPolicy::LastInGroup)
    }

    #[test]
    fn test_set_messages_resets_scroll_on_new_message() {
        let mut view = ChatView::new(&DARK_THEME);
        view.viewport_height = 20;
        view.page_up();
        assert_eq!(view.scroll_offset, 18);

        view.set_messages(grouped(&[Message::user("hi", 0)]));
        assert_eq!(view.scroll_offset, 0);

        view.page_up();
        view.set_messages(grouped(&[Message::user("hi", 0)]));
        assert_eq!(view.scroll_offset, 18);
    }

    #[test]
    fn test_page_operations() {
        let mut view = ChatView::new(&DARK_THEME);
        view.viewport_height = 1;
        view.page_up();
        assert_eq!(view.scroll_offset, 1);
        view.page_down();
        view.page_down();
        assert_eq!(view.scroll_offset, 0);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(ChatView::wrap_text("Hello", 20), vec!["Hello"]);
        assert_eq!(
            ChatView::wrap_text("Hello world how are you", 10),
            vec!["Hello", "world how", "are you"]
        );
        assert_eq!(ChatView::wrap_text("", 20), vec![""]);
        assert_eq!(ChatView::wrap_text("Line one\nLine two", 20), vec!["Line one", "Line two"]);
        assert_eq!(ChatView::wrap_text("abcdefghij", 5), vec!["abcde", "fghij"]);
        assert_eq!(ChatView::wrap_text("abcdefg hi", 5), vec!["abcde", "fg hi"]);
    }

    #[test]
    fn test_wrap_text_counts_chars_not_bytes() {
        assert_eq!(ChatView::wrap_text("日日日日日", 3), vec!["日日日", "日日"]);
        assert_eq!(ChatView::wrap_text("日日 月月", 5), vec!["日日 月月"]);
    }

    #[test]
    fn test_user_bubble_is_right_aligned_without_avatar() {
        let view = ChatView::new(&DARK_THEME);
        let g = grouped(&[Message::user("hello", 0)]);
        let lines = view.render_message(&g[0], 40);

        assert_eq!(lines[0].alignment, Some(Alignment::Right));
        assert_eq!(line_text(&lines[0]), " hello ");
        assert_eq!(lines[0].spans[0].style.bg, Some(DARK_THEME.bubble_user));
        // bubble, timestamp, group spacer
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_bot_avatar_only_on_last_of_group() {
        let view = ChatView::new(&DARK_THEME);
        let mut first = Message::bot_streaming(0);
        first.streaming = false;
        first.content = "one".to_string();
        let mut second = first.clone();
        second.id = "other".to_string();
        second.content = "two".to_string();
        let g = grouped(&[first, second]);

        let top = view.render_message(&g[0], 40);
        assert!(line_text(&top[0]).starts_with("    "));
        assert_eq!(top.len(), 1);

        let bottom = view.render_message(&g[1], 40);
        assert!(line_text(&bottom[0]).starts_with(AVATAR));
    }

    #[test]
    fn test_streaming_message_shows_cursor() {
        let mut view = ChatView::new(&DARK_THEME);
        let mut msg = Message::bot_streaming(0);
        msg.content = "Hel".to_string();
        let g = grouped(&[msg]);

        let lines = view.render_message(&g[0], 40);
        assert!(line_text(&lines[0]).contains("Hel▍"));

        view.tick_cursor();
        let lines = view.render_message(&g[0], 40);
        assert!(!line_text(&lines[0]).contains('▍'));
    }

    #[test]
    fn test_failed_message_uses_danger_and_hint() {
        let view = ChatView::new(&LIGHT_THEME);
        let g = grouped(&[Message::bot_failed(0)]);
        let lines = view.render_message(&g[0], 60);

        let bubble = lines[0].spans.last().unwrap();
        assert_eq!(bubble.style.fg, Some(LIGHT_THEME.danger));
        assert!(lines.iter().any(|l| line_text(l).contains(RETRY_HINT)));
    }

    #[test]
    fn test_render_into_buffer_shows_latest_lines() {
        let mut view = ChatView::new(&DARK_THEME);
        view.set_messages(grouped(&[Message::user("first", 0), Message::user("second", 0)]));
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        view.render_and_update_viewport(area, &mut buf);

        let rows: Vec<String> = (0..3)
            .map(|y| (0..30).map(|x| buf[(x, y)].symbol().to_string()).collect())
            .collect();
        assert!(rows.iter().any(|r| r.contains("second")));
        assert!(!rows.iter().any(|r| r.contains("first")));
        assert_eq!(view.viewport_height, 3);
    }

    #[test]
    fn test_paging_past_top_keeps_oldest_lines_visible() {
        let mut view = ChatView::new(&DARK_THEME);
        view.set_messages(grouped(&[Message::user("first", 0), Message::user("second", 0)]));
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        view.render_and_update_viewport(area, &mut buf);

        for _ in 0..10 {
            view.page_up();
        }
        let mut buf = Buffer::empty(area);
        view.render_and_update_viewport(area, &mut buf);

        let total = view.all_lines(area.width).len() as u16;
        assert_eq!(view.scroll_offset, total - 3);
        let rows: Vec<String> = (0..3)
            .map(|y| (0..30).map(|x| buf[(x, y)].symbol().to_string()).collect())
            .collect();
        assert!(rows.iter().any(|r| r.contains("first")));

        view.page_down();
        assert_eq!(view.scroll_offset, (total - 3).saturating_sub(1));
    }
}
