use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::models::order::OrderStatus;
use crate::notify::{PushKind, send_if_token};
use crate::state::AppState;
use crate::store::OrderChange;

/// Consumes order change events and fans out transition notifications.
/// Runs until the change channel closes.
pub async fn run_status_watcher(
    state: Arc<AppState>,
    mut change_rx: broadcast::Receiver<OrderChange>,
) {
    info!("status watcher started");

    loop {
        match change_rx.recv().await {
            Ok(change) => handle_change(&state, &change).await,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "status watcher lagged; change events dropped");
            }
            Err(RecvError::Closed) => {
                warn!("status watcher stopped: change channel closed");
                break;
            }
        }
    }
}

fn entered(change: &OrderChange, status: OrderStatus) -> bool {
    change.before.status != status && change.after.status == status
}

/// Inspects one before/after pair. Only three edges are actionable; any
/// other change, including a same-status update, is a no-op.
pub async fn handle_change(state: &AppState, change: &OrderChange) {
    let after = &change.after;
    let short_id = after.short_id();

    if entered(change, OrderStatus::Ready) {
        send_if_token(
            state,
            after.driver_fcm_token.as_ref(),
            "Order ready for pickup",
            format!(
                "The shop at {} has finished preparing, waiting for pickup",
                after.shop_address
            ),
            after.id,
            PushKind::StatusUpdate,
        )
        .await;
    }

    if entered(change, OrderStatus::Delivering) {
        let body = match after.estimated_delivery_time {
            Some(minutes) => {
                format!("The driver is on the way, arriving in about {minutes} minutes")
            }
            None => "The driver is on the way with your order".to_string(),
        };
        send_if_token(
            state,
            after.customer_fcm_token.as_ref(),
            "Your order is being delivered",
            body,
            after.id,
            PushKind::StatusUpdate,
        )
        .await;
    }

    if entered(change, OrderStatus::Delivered) {
        // Shop and customer notifications run concurrently; either failing
        // or skipping does not affect the other.
        tokio::join!(
            send_if_token(
                state,
                after.shop_fcm_token.as_ref(),
                "Delivery completed",
                format!("Order #{short_id} was delivered to the customer"),
                after.id,
                PushKind::StatusUpdate,
            ),
            send_if_token(
                state,
                after.customer_fcm_token.as_ref(),
                "Order received",
                "Thank you for ordering, please rate and review".to_string(),
                after.id,
                PushKind::StatusUpdate,
            ),
        );
    }
}
