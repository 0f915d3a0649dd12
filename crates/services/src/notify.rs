//! User-facing notifications (toasts) raised by the checkout and admin flows.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How prominently a notification should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification as delivered to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// Fire-and-forget delivery of notifications to the user.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// Emits every notification as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::error!(%title, %message, "Notification"),
            Severity::Info | Severity::Success => {
                tracing::info!(%title, %message, %severity, "Notification")
            }
        }
    }
}

/// Keeps every notification in memory so tests can assert on them.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationSink {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything received so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns only the error notifications.
    pub fn errors(&self) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.severity == Severity::Error)
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(&self, title: &str, message: &str, severity: Severity) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                title: title.to_string(),
                message: message.to_string(),
                severity,
            });
    }
}
