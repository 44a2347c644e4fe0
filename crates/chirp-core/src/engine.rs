// ABOUTME: Async chat engine owning the conversation inside a single tokio task.
// ABOUTME: Schedules reply delays, drives the reveal ticker, debounces saves, publishes snapshots.

use crate::context::{uniform_delay, EngineContext};
use crate::conversation::{ChatSnapshot, ChatState, Delivery, PendingReply, TickOutcome};
use crate::error::{ChirpError, Result};
use crate::message::{decode_conversation, encode_conversation};
use crate::store::MESSAGES_KEY;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;

enum Command {
    Send(String),
    Stop(String),
    Retry(String),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running chat engine.
///
/// All state lives in a background task; this handle only queues commands
/// and reads published snapshots. Dropping it cancels the task without
/// flushing, so call [`ChatEngine::shutdown`] to persist pending changes.
pub struct ChatEngine {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ChatSnapshot>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl ChatEngine {
    /// Start the engine on the current tokio runtime. Stored history is
    /// loaded first; commands sent meanwhile are applied once it finishes.
    pub fn spawn(ctx: EngineContext) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(ChatSnapshot::default());
        let cancel = CancellationToken::new();

        let worker = Worker {
            state: ChatState::new(),
            ctx,
            snapshots: snapshot_tx,
            delays: DelayQueue::new(),
            ticker: None,
            save_at: None,
        };
        let handle = tokio::spawn(worker.run(command_rx, cancel.clone()));

        Self {
            commands,
            snapshots,
            cancel,
            worker: Some(handle),
        }
    }

    /// Submit user text. Blank text is ignored by the engine.
    pub fn send(&self, text: impl Into<String>) -> Result<()> {
        self.command(Command::Send(text.into()))
    }

    /// Stop revealing `message_id` if it is the active stream
    pub fn stop(&self, message_id: impl Into<String>) -> Result<()> {
        self.command(Command::Stop(message_id.into()))
    }

    /// Regenerate a failed bot message
    pub fn retry(&self, message_id: impl Into<String>) -> Result<()> {
        self.command(Command::Retry(message_id.into()))
    }

    /// Latest published state
    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every settled mutation
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshots.clone()
    }

    /// Flush any pending save and stop the engine
    pub async fn shutdown(mut self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!("Chat engine task ended abnormally: {}", e);
            }
        }
        Ok(())
    }

    fn command(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ChirpError::EngineClosed)
    }
}

impl Drop for ChatEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Worker {
    state: ChatState,
    ctx: EngineContext,
    snapshots: watch::Sender<ChatSnapshot>,
    delays: DelayQueue<PendingReply>,
    ticker: Option<Interval>,
    save_at: Option<Instant>,
}

impl Worker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        cancel: CancellationToken,
    ) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = self.hydrate() => {}
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Chat engine cancelled");
                    break;
                }
                command = commands.recv() => match command {
                    Some(Command::Shutdown(ack)) => {
                        self.flush().await;
                        let _ = ack.send(());
                        break;
                    }
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(expired) = self.delays.next(), if !self.delays.is_empty() => {
                    self.deliver(expired.into_inner());
                }
                _ = next_tick(&mut self.ticker) => self.advance(),
                _ = save_due(self.save_at) => {
                    self.save_at = None;
                    self.persist().await;
                }
            }
        }
    }

    async fn hydrate(&mut self) {
        match self.ctx.store.load(MESSAGES_KEY).await {
            Ok(Some(raw)) => match decode_conversation(&raw) {
                Ok(messages) => {
                    tracing::debug!(count = messages.len(), "Loaded stored conversation");
                    self.state.hydrate(messages);
                }
                Err(e) => tracing::warn!("Ignoring unreadable stored conversation: {}", e),
            },
            Ok(None) => tracing::debug!("No stored conversation"),
            Err(e) => tracing::warn!("Failed to load conversation: {}", e),
        }
        self.publish();
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Send(text) => {
                let now = self.ctx.clock.now_millis();
                let Some(pending) = self.state.submit(&text, now) else {
                    tracing::debug!("Ignoring blank message");
                    return;
                };
                let (min, max) = self.ctx.config.send_delay();
                let delay = uniform_delay(self.ctx.entropy.as_mut(), min, max);
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Reply scheduled");
                self.delays.insert(pending, delay);
                self.changed();
            }
            Command::Stop(id) => {
                if self.state.stop(&id) {
                    tracing::debug!(id = %id, "Stream stopped");
                    self.ticker = None;
                    self.changed();
                }
            }
            Command::Retry(id) => {
                let Some(pending) = self.state.request_retry(&id) else {
                    tracing::debug!(id = %id, "Retry ignored, message is not failed");
                    return;
                };
                let (min, max) = self.ctx.config.retry_delay();
                let delay = uniform_delay(self.ctx.entropy.as_mut(), min, max);
                self.delays.insert(pending, delay);
                self.publish();
            }
            // Handled by the run loop
            Command::Shutdown(_) => {}
        }
    }

    fn deliver(&mut self, pending: PendingReply) {
        let now = self.ctx.clock.now_millis();
        let delivery = self.state.fire(
            pending,
            now,
            self.ctx.replies.as_ref(),
            self.ctx.entropy.as_mut(),
            self.ctx.config.failure_probability,
        );
        match delivery {
            Delivery::Streaming(id) => {
                tracing::debug!(id = %id, "Streaming reply");
                self.start_ticker();
                self.changed();
            }
            Delivery::Failed(id) => {
                tracing::debug!(id = %id, "Simulated generation failure");
                self.changed();
            }
            Delivery::Dropped => self.publish(),
        }
    }

    fn advance(&mut self) {
        match self.state.tick() {
            TickOutcome::Idle => self.ticker = None,
            TickOutcome::Revealed => self.changed(),
            TickOutcome::Completed => {
                self.ticker = None;
                self.changed();
            }
        }
    }

    fn start_ticker(&mut self) {
        let period = self.ctx.config.tick();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
    }

    /// Conversation changed: restart the save debounce and publish
    fn changed(&mut self) {
        self.save_at = Some(Instant::now() + self.ctx.config.save_debounce());
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self
            .state
            .snapshot(self.ctx.config.timestamp_policy, true);
        self.snapshots.send_replace(snapshot);
    }

    async fn flush(&mut self) {
        if self.save_at.take().is_some() {
            self.persist().await;
        }
    }

    async fn persist(&mut self) {
        let raw = match encode_conversation(self.state.messages()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to encode conversation: {}", e);
                return;
            }
        };
        match self.ctx.store.save(MESSAGES_KEY, &raw).await {
            Ok(()) => tracing::debug!(count = self.state.messages().len(), "Saved conversation"),
            Err(e) => tracing::warn!("Failed to save conversation: {}", e),
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn save_due(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScriptedEntropy;
    use crate::reply::ReplyBook;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn engine() -> ChatEngine {
        let ctx = EngineContext::new(Arc::new(MemoryStore::new()), Arc::new(ReplyBook::builtin()))
            .with_entropy(ScriptedEntropy::new([]).with_fallback(0.5));
        ChatEngine::spawn(ctx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_hydrates_immediately_with_empty_store() {
        let engine = engine();
        let mut rx = engine.subscribe();
        let snapshot = rx.wait_for(|s| s.hydrated).await.unwrap().clone();
        assert!(snapshot.messages.is_empty());
        assert!(!snapshot.typing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_after_shutdown_fail() {
        let engine = engine();
        let sender = engine.commands.clone();
        engine.shutdown().await.unwrap();
        assert!(sender.send(Command::Send("late".to_string())).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after_worker_exit_reports_closed() {
        let engine = engine();
        engine.cancel.cancel();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(matches!(engine.send("hi"), Err(ChirpError::EngineClosed)));
    }
}
