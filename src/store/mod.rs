use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus, Warning};

/// Emitted for every status update so the transition watcher can inspect
/// the before/after pair.
#[derive(Debug, Clone)]
pub struct OrderChange {
    pub id: Uuid,
    pub before: Order,
    pub after: Order,
}

/// In-memory order collection. The monitor writes warning flags and the
/// penalty through narrowly-scoped methods; only status updates emit change
/// events, so monitor writes never re-trigger the watcher.
pub struct OrderStore {
    orders: DashMap<Uuid, Order>,
    change_tx: broadcast::Sender<OrderChange>,
}

impl OrderStore {
    pub fn new(event_buffer_size: usize) -> Self {
        let (change_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        Self {
            orders: DashMap::new(),
            change_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderChange> {
        self.change_tx.subscribe()
    }

    pub fn insert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, id: &Uuid) -> Option<Order> {
        self.orders.get(id).map(|entry| entry.value().clone())
    }

    pub fn all(&self) -> Vec<Order> {
        self.orders.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn preparing(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| entry.value().status == OrderStatus::Preparing)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Sets `sent` and `sent_at` for one warning flag together.
    pub fn mark_warning_sent(
        &self,
        id: Uuid,
        warning: Warning,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut order = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

        let flag = order.notifications.flag_mut(warning);
        flag.sent = true;
        flag.sent_at = Some(now);
        Ok(())
    }

    pub fn set_penalty(&self, id: Uuid, amount: u32) -> Result<(), AppError> {
        let mut order = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

        order.penalty = amount;
        Ok(())
    }

    /// Applies a status update and broadcasts the `{before, after}` pair.
    /// Entering `preparing` stamps `preparing_start_time`.
    pub fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, AppError> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

        let before = entry.value().clone();
        entry.status = status;
        if status == OrderStatus::Preparing && before.status != OrderStatus::Preparing {
            entry.preparing_start_time = Some(now);
        }
        entry.updated_at = now;
        let after = entry.value().clone();
        drop(entry);

        let _ = self.change_tx.send(OrderChange {
            id,
            before,
            after: after.clone(),
        });

        Ok(after)
    }
}
