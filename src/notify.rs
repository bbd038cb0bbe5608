//! Notification bus shared by the widgets and handlers that report to the
//! user.
//!
//! Publishers and subscribers receive the bus explicitly (usually as an
//! `Arc<NotificationBus>`). The bus fans messages out over a broadcast
//! channel and keeps the most recent ones for late readers.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// How many notifications the history keeps.
pub const HISTORY_LIMIT: usize = 10;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub icon: String,
    pub text: String,
}

#[derive(Debug)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
    history: Mutex<VecDeque<Notification>>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_LIMIT)),
        }
    }

    pub fn publish(&self, icon: impl Into<String>, text: impl Into<String>) {
        let notification = Notification {
            icon: icon.into(),
            text: text.into(),
        };
        debug!(icon = %notification.icon, text = %notification.text, "notification");

        if let Ok(mut history) = self.history.lock() {
            history.push_front(notification.clone());
            history.truncate(HISTORY_LIMIT);
        }
        // nobody listening is fine
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Recent notifications, newest first.
    pub fn recent(&self) -> Vec<Notification> {
        self.history
            .lock()
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }
}
