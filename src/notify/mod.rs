use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushKind {
    OrderWarning,
    OrderOvertime,
    StatusUpdate,
}

impl PushKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushKind::OrderWarning => "order_warning",
            PushKind::OrderOvertime => "order_overtime",
            PushKind::StatusUpdate => "status_update",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub order_id: Uuid,
    pub kind: PushKind,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("push transport failed: {0}")]
    Transport(String),
}

/// Push transport the monitor and watcher depend on. Injected at
/// construction so tests can substitute a recording double.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError>;
}

/// Broadcast to websocket subscribers for every dispatched notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub order_id: Uuid,
    pub kind: PushKind,
    pub title: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Default transport: logs each message and publishes a
/// `NotificationEvent` for observers. Stands in for the real push backend.
pub struct LogNotifier {
    events_tx: broadcast::Sender<NotificationEvent>,
}

impl LogNotifier {
    pub fn new(events_tx: broadcast::Sender<NotificationEvent>) -> Self {
        Self { events_tx }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
        info!(
            order_id = %message.order_id,
            kind = message.kind.as_str(),
            title = %message.title,
            "push notification dispatched"
        );

        let _ = self.events_tx.send(NotificationEvent {
            order_id: message.order_id,
            kind: message.kind,
            title: message.title.clone(),
            body: message.body.clone(),
            sent_at: Utc::now(),
        });

        Ok(())
    }
}

/// Attempts one send. An absent or empty token is a silent skip, not an
/// error; a transport failure is logged and swallowed so sibling sends and
/// store writes proceed regardless.
pub async fn send_if_token(
    state: &AppState,
    token: Option<&String>,
    title: &str,
    body: String,
    order_id: Uuid,
    kind: PushKind,
) {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        debug!(order_id = %order_id, kind = kind.as_str(), "no token; skipping notification");
        return;
    };

    let message = PushMessage {
        token: token.clone(),
        title: title.to_string(),
        body,
        order_id,
        kind,
    };

    match state.notifier.send(&message).await {
        Ok(()) => {
            state
                .metrics
                .notifications_total
                .with_label_values(&[kind.as_str(), "success"])
                .inc();
        }
        Err(err) => {
            state
                .metrics
                .notifications_total
                .with_label_values(&[kind.as_str(), "error"])
                .inc();
            warn!(order_id = %order_id, error = %err, "failed to send push notification");
        }
    }
}
