//! Lifecycle thresholds and default tuning values.
//!
//! The tuning defaults can be overridden through
//! [`TrackingConfig`](crate::config::TrackingConfig); the thresholds cannot.

/// Progress at which an in-transit shipment goes out for delivery.
pub const OUT_FOR_DELIVERY_AT: f64 = 0.8;

/// Progress at which a shipment counts as delivered (end of route).
pub const DELIVERED_AT: f64 = 1.0;

/// Default progress added per tick.
pub const DEFAULT_PROGRESS_STEP: f64 = 0.01;

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
