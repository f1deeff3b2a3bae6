//! Notification queue for toasts and alerts

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Notification, NotificationKind};

use super::lock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationMutation {
    Add(Notification),
    Dismiss(String),
    Clear,
}

impl NotificationMutation {
    fn apply(self, state: &mut NotificationState) {
        match self {
            NotificationMutation::Add(notification) => state.notifications.push(notification),
            NotificationMutation::Dismiss(id) => state.notifications.retain(|n| n.id != id),
            NotificationMutation::Clear => state.notifications.clear(),
        }
    }
}

#[derive(Default)]
pub struct NotificationStore {
    state: Mutex<NotificationState>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&self, mutation: NotificationMutation) {
        mutation.apply(&mut lock(&self.state));
    }

    /// Queue a notification and return its id.
    pub fn show_notification(&self, kind: NotificationKind, message: impl Into<String>) -> String {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        };
        let id = notification.id.clone();
        self.commit(NotificationMutation::Add(notification));
        id
    }

    pub fn dismiss_notification(&self, id: &str) {
        self.commit(NotificationMutation::Dismiss(id.to_string()));
    }

    pub fn clear(&self) {
        self.commit(NotificationMutation::Clear);
    }

    pub fn active_notifications(&self) -> Vec<Notification> {
        lock(&self.state).notifications.clone()
    }

    pub fn has_notifications(&self) -> bool {
        !lock(&self.state).notifications.is_empty()
    }
}
