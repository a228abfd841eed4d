use std::sync::Arc;

use tokio::sync::broadcast;

use crate::notify::{LogNotifier, NotificationEvent, Notifier};
use crate::observability::metrics::Metrics;
use crate::store::{OrderChange, OrderStore};

pub struct AppState {
    pub store: OrderStore,
    pub notifier: Arc<dyn Notifier>,
    pub notification_events_tx: broadcast::Sender<NotificationEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> (Self, broadcast::Receiver<OrderChange>) {
        let (notification_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let notifier = Arc::new(LogNotifier::new(notification_events_tx.clone()));
        Self::with_notifier(event_buffer_size, notifier, notification_events_tx)
    }

    /// Construction point for substituting the push transport in tests.
    pub fn with_notifier(
        event_buffer_size: usize,
        notifier: Arc<dyn Notifier>,
        notification_events_tx: broadcast::Sender<NotificationEvent>,
    ) -> (Self, broadcast::Receiver<OrderChange>) {
        let store = OrderStore::new(event_buffer_size);
        let change_rx = store.subscribe();

        (
            Self {
                store,
                notifier,
                notification_events_tx,
                metrics: Metrics::new(),
            },
            change_rx,
        )
    }
}
