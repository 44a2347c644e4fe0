// ABOUTME: TUI event types and event stream.
// ABOUTME: Bridges blocking crossterm polling into a tokio stream.

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
    Tick,
}

/// Translate a raw crossterm event; key releases and unhandled events are dropped
pub fn translate(evt: Event) -> Option<TuiEvent> {
    match evt {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(TuiEvent::Key(key)),
        Event::Paste(text) => Some(TuiEvent::Paste(text)),
        Event::Resize(w, h) => Some(TuiEvent::Resize(w, h)),
        _ => None,
    }
}

pub struct EventStream {
    rx: UnboundedReceiverStream<TuiEvent>,
}

impl EventStream {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        // crossterm polling blocks, so it gets its own thread
        tokio::task::spawn_blocking(move || loop {
            let next = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(evt) => translate(evt),
                    Err(_) => None,
                }
            } else {
                Some(TuiEvent::Tick)
            };

            if let Some(e) = next {
                if tx.send(e).is_err() {
                    break;
                }
            }
        });

        Self {
            rx: UnboundedReceiverStream::new(rx),
        }
    }
}

impl Stream for EventStream {
    type Item = TuiEvent;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        std::pin::Pin::new(&mut self.rx).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_translate_keeps_presses_drops_releases() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Some(TuiEvent::Key(_))));
        assert!(translate(key(KeyEventKind::Release)).is_none());
    }

    #[test]
    fn test_translate_paste_and_resize() {
        assert!(matches!(
            translate(Event::Paste("hi".to_string())),
            Some(TuiEvent::Paste(text)) if text == "hi"
        ));
        assert!(matches!(translate(Event::Resize(80, 24)), Some(TuiEvent::Resize(80, 24))));
        assert!(translate(Event::FocusGained).is_none());
    }
}
