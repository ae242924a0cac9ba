//! Shipment records and the three-state delivery lifecycle.

use serde::{Deserialize, Serialize};

use crate::constants::{DELIVERED_AT, OUT_FOR_DELIVERY_AT};
use crate::error::TrackingError;
use crate::route::Waypoint;

/// Delivery lifecycle. Declaration order is lifecycle order, so `Ord`
/// compares how far along a shipment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentStatus {
    InTransit,
    OutForDelivery,
    Delivered,
}

impl ShipmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InTransit => "in-transit",
            Self::OutForDelivery => "out-for-delivery",
            Self::Delivered => "delivered",
        }
    }

    /// Terminal state. No further transitions; progress is frozen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Status implied by a progress value under the lifecycle thresholds.
    pub fn for_progress(progress: f64) -> Self {
        if progress >= DELIVERED_AT {
            Self::Delivered
        } else if progress >= OUT_FOR_DELIVERY_AT {
            Self::OutForDelivery
        } else {
            Self::InTransit
        }
    }

    /// Lowest progress consistent with this status. Used to reconcile
    /// shipments that start the session past in-transit.
    pub fn initial_progress(self) -> f64 {
        match self {
            Self::InTransit => 0.0,
            Self::OutForDelivery => OUT_FOR_DELIVERY_AT,
            Self::Delivered => DELIVERED_AT,
        }
    }

}

impl std::str::FromStr for ShipmentStatus {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-transit" => Ok(Self::InTransit),
            "out-for-delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            other => Err(TrackingError::UnknownStatus(other.to_owned())),
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Express,
    Standard,
}

/// Sender or receiver of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub city: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Stable key for progress and observer signals.
    pub id: String,
    pub tracking_code: String,
    pub sender: Party,
    pub receiver: Party,
    /// Driver id, resolved through [`Fleet::driver`](crate::fleet::Fleet::driver).
    pub assigned_driver: Option<String>,
    pub status: ShipmentStatus,
    /// ISO-8601 timestamp, kept as text.
    pub estimated_arrival: String,
    pub weight_kg: f64,
    pub priority: Priority,
    pub waypoints: Vec<Waypoint>,
}

impl Shipment {
    /// Whether the route has enough points to place a marker.
    pub fn is_routable(&self) -> bool {
        self.waypoints.len() >= 2
    }

    /// "Mumbai → Pune" style route label.
    pub fn route_label(&self) -> String {
        format!("{} → {}", self.sender.city, self.receiver.city)
    }

    /// Whether either end of the route is in `city` (exact match).
    pub fn touches_city(&self, city: &str) -> bool {
        self.sender.city == city || self.receiver.city == city
    }
}
