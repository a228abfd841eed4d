use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Delivering,
    Delivered,
    Cancelled,
}

/// One-shot marker for a threshold notification. Once `sent` flips to true
/// it is never reset for the lifetime of the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarningState {
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notifications {
    #[serde(default)]
    pub first_warning: WarningState,
    #[serde(default)]
    pub second_warning: WarningState,
    #[serde(default)]
    pub final_warning: WarningState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    First,
    Second,
    Final,
}

impl Warning {
    pub fn as_str(&self) -> &'static str {
        match self {
            Warning::First => "first",
            Warning::Second => "second",
            Warning::Final => "final",
        }
    }
}

impl Notifications {
    pub fn flag(&self, warning: Warning) -> &WarningState {
        match warning {
            Warning::First => &self.first_warning,
            Warning::Second => &self.second_warning,
            Warning::Final => &self.final_warning,
        }
    }

    pub fn flag_mut(&mut self, warning: Warning) -> &mut WarningState {
        match warning {
            Warning::First => &mut self.first_warning,
            Warning::Second => &mut self.second_warning,
            Warning::Final => &mut self.final_warning,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub shop_address: String,
    pub preparing_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notifications: Notifications,
    /// Penalty in currency units; recomputed from elapsed overtime on every
    /// monitor tick past the preparation budget, never incremented.
    pub penalty: u32,
    pub shop_fcm_token: Option<String>,
    pub driver_fcm_token: Option<String>,
    pub customer_fcm_token: Option<String>,
    /// Estimated delivery time in minutes, used only in message bodies.
    pub estimated_delivery_time: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// First eight characters of the order id, used in notification bodies.
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }
}
