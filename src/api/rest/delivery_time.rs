use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::{estimate_delivery_minutes, haversine_m, point_in_range};
use crate::models::order::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/delivery-time", post(estimate))
}

#[derive(Deserialize)]
pub struct EstimateRequest {
    pub shop_location: GeoPoint,
    pub customer_location: GeoPoint,
}

#[derive(Serialize)]
pub struct EstimateResponse {
    /// Straight-line distance in meters.
    pub distance: f64,
    /// Minutes, rounded up.
    pub estimated_delivery_time: u32,
}

async fn estimate(
    State(_state): State<Arc<AppState>>,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    for point in [&payload.shop_location, &payload.customer_location] {
        if !point_in_range(point) {
            // Estimation failures surface as a generic internal error, the
            // only error this endpoint exposes.
            return Err(AppError::Internal("delivery time estimation failed".to_string()));
        }
    }

    let distance = haversine_m(&payload.shop_location, &payload.customer_location);

    Ok(Json(EstimateResponse {
        distance,
        estimated_delivery_time: estimate_delivery_minutes(distance),
    }))
}
