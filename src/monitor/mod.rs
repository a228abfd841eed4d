pub mod penalty;

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{error, info};

use crate::error::AppError;
use crate::models::order::{Order, Warning};
use crate::monitor::penalty::penalty_for_overtime;
use crate::notify::{PushKind, send_if_token};
use crate::state::AppState;

const FIRST_WARNING_MINUTES: f64 = 5.0;
const SECOND_WARNING_MINUTES: f64 = 7.5;
const PREPARATION_BUDGET_MINUTES: f64 = 10.0;

/// Recurring SLA scan over all preparing orders. Never returns an error to
/// the scheduler; per-order failures are logged inside the tick.
pub async fn run_sla_monitor(state: Arc<AppState>, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "sla monitor started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let start = Instant::now();
        run_tick(&state, Utc::now()).await;
        state
            .metrics
            .sla_tick_duration_seconds
            .observe(start.elapsed().as_secs_f64());
    }
}

/// One monitor pass. `now` is explicit so tests control the clock. Orders
/// are evaluated concurrently and every outcome is joined before returning.
pub async fn run_tick(state: &AppState, now: DateTime<Utc>) {
    let preparing = state.store.preparing();
    state.metrics.orders_preparing.set(preparing.len() as i64);

    let count = preparing.len();
    let results = join_all(preparing.into_iter().map(|order| {
        let id = order.id;
        async move { (id, evaluate_order(state, order, now).await) }
    }))
    .await;

    for (id, result) in results {
        if let Err(err) = result {
            error!(order_id = %id, error = %err, "failed to process preparing order");
        }
    }

    info!(orders = count, "processed preparing orders");
}

/// Applies the threshold checks to one order. The checks are independent:
/// each send is gated by its own one-shot flag, and the flag is marked sent
/// right after the attempt regardless of dispatch outcome, so a threshold
/// fires at most once per order.
async fn evaluate_order(state: &AppState, order: Order, now: DateTime<Utc>) -> Result<(), AppError> {
    let Some(started) = order.preparing_start_time else {
        return Ok(());
    };
    let elapsed_minutes = (now - started).num_milliseconds() as f64 / 60_000.0;
    let short_id = order.short_id();

    if elapsed_minutes >= FIRST_WARNING_MINUTES && !order.notifications.first_warning.sent {
        send_if_token(
            state,
            order.shop_fcm_token.as_ref(),
            "Order preparation reminder",
            format!("Order #{short_id} has been preparing for 5 minutes, 5 minutes left"),
            order.id,
            PushKind::OrderWarning,
        )
        .await;
        state.store.mark_warning_sent(order.id, Warning::First, now)?;
        state
            .metrics
            .sla_warnings_total
            .with_label_values(&[Warning::First.as_str()])
            .inc();
    }

    if elapsed_minutes >= SECOND_WARNING_MINUTES && !order.notifications.second_warning.sent {
        send_if_token(
            state,
            order.shop_fcm_token.as_ref(),
            "Order preparation reminder (urgent)",
            format!("Order #{short_id} has been preparing for 7.5 minutes, 2.5 minutes left"),
            order.id,
            PushKind::OrderWarning,
        )
        .await;
        state.store.mark_warning_sent(order.id, Warning::Second, now)?;
        state
            .metrics
            .sla_warnings_total
            .with_label_values(&[Warning::Second.as_str()])
            .inc();
    }

    if elapsed_minutes >= PREPARATION_BUDGET_MINUTES && !order.notifications.final_warning.sent {
        let overtime = elapsed_minutes - PREPARATION_BUDGET_MINUTES;
        let amount = penalty_for_overtime(overtime);

        send_if_token(
            state,
            order.shop_fcm_token.as_ref(),
            "Order preparation overtime!",
            format!("Order #{short_id} is {overtime:.1} minutes over the limit, penalty {amount}"),
            order.id,
            PushKind::OrderOvertime,
        )
        .await;
        state.store.mark_warning_sent(order.id, Warning::Final, now)?;
        state.store.set_penalty(order.id, amount)?;
        state
            .metrics
            .sla_warnings_total
            .with_label_values(&[Warning::Final.as_str()])
            .inc();
    }

    // Keeps the penalty synced to ongoing overtime on every tick, even after
    // the final warning already fired. Pure recompute, safe to repeat.
    if elapsed_minutes > PREPARATION_BUDGET_MINUTES {
        let amount = penalty_for_overtime(elapsed_minutes - PREPARATION_BUDGET_MINUTES);
        state.store.set_penalty(order.id, amount)?;
    }

    Ok(())
}
