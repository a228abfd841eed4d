use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{estimate_delivery_minutes, haversine_m, point_in_range};
use crate::models::order::{GeoPoint, Notifications, Order, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub shop_address: String,
    pub shop_location: GeoPoint,
    pub customer_location: GeoPoint,
    pub shop_fcm_token: Option<String>,
    pub driver_fcm_token: Option<String>,
    pub customer_fcm_token: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.shop_address.trim().is_empty() {
        return Err(AppError::BadRequest("shop_address cannot be empty".to_string()));
    }

    for point in [&payload.shop_location, &payload.customer_location] {
        if !point_in_range(point) {
            return Err(AppError::BadRequest("coordinates out of range".to_string()));
        }
    }

    let distance = haversine_m(&payload.shop_location, &payload.customer_location);
    let now = Utc::now();

    let order = Order {
        id: Uuid::new_v4(),
        status: OrderStatus::Pending,
        shop_address: payload.shop_address,
        preparing_start_time: None,
        notifications: Notifications::default(),
        penalty: 0,
        shop_fcm_token: payload.shop_fcm_token,
        driver_fcm_token: payload.driver_fcm_token,
        customer_fcm_token: payload.customer_fcm_token,
        estimated_delivery_time: Some(estimate_delivery_minutes(distance)),
        created_at: now,
        updated_at: now,
    };

    state.store.insert(order.clone());
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.store.all())
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state.store.update_status(id, payload.status, Utc::now())?;
    Ok(Json(order))
}
