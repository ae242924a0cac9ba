//! Pure shipment tracking logic for LC360.
//!
//! This crate contains all tracking logic that is independent of any timer,
//! renderer, or runtime. Functions take plain data and return results, making
//! them unit-testable and portable between the live tick loop and the
//! headless simulation harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Tick period, progress step, initial seeding policy |
//! | [`constants`] | Lifecycle thresholds and tuning defaults |
//! | [`error`] | Errors from loading, configuration, and selection |
//! | [`filter`] | Search / status / city filtering of the shipment list |
//! | [`fleet`] | Embedded mock data: shipments, drivers, vehicles |
//! | [`observer`] | Notification and refresh subscribers |
//! | [`progress`] | Per-shipment progress tracker |
//! | [`route`] | Waypoints and marker interpolation along a polyline |
//! | [`shipment`] | Shipment records and the delivery lifecycle |
//! | [`simulation`] | One synchronous tick over the active shipments |
//! | [`status`] | Threshold-driven status transitions |

pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod fleet;
pub mod observer;
pub mod progress;
pub mod route;
pub mod shipment;
pub mod simulation;
pub mod status;

pub use config::TrackingConfig;
pub use error::TrackingError;
pub use simulation::TrackingSimulation;
