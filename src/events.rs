use std::time::Duration;

use tokio::sync::broadcast;

/// Signals fanned out to every live subscriber. The dashboard re-fetches the
/// task list when it sees `TasksChanged`; the chat sideband publishes it after
/// the agent reports task-mutating tool calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    TasksChanged,
}

/// Explicit cross-component refresh channel. Replaces the ambient
/// document-level custom event the original frontend used: the bus is
/// constructed once and handed to each component, so every subscription is
/// visible at construction time.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TaskEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.tx.subscribe()
    }

    /// Delivery is best effort: with no live subscribers the event is dropped.
    pub fn publish(&self, event: TaskEvent) {
        let _ = self.tx.send(event);
    }

    pub fn publish_after(&self, event: TaskEvent, delay: Duration) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
    }
}
