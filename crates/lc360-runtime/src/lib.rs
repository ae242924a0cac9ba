//! Timer-driven tick loop for the LC360 tracking simulation.
//!
//! [`TrackingService`] owns a [`TrackingSimulation`] behind a mutex and runs
//! one tokio task that calls [`TrackingSimulation::tick`] once per period.
//! Each tick runs to completion under the lock before the next one can
//! start. Starting again cancels the running loop first, and dropping the
//! service cancels it too.
//!
//! ```rust,no_run
//! use lc360_logic::{TrackingConfig, TrackingSimulation};
//! use lc360_runtime::TrackingService;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let sim = TrackingSimulation::with_default_fleet(TrackingConfig::default())?;
//! let mut service = TrackingService::new(sim);
//! service.start()?;
//! // ... later, e.g. when the tracking view closes
//! service.stop();
//! # Ok(())
//! # }
//! ```

mod error;
mod service;

pub use error::TickerError;
pub use service::{SharedSimulation, TrackingService};

pub use lc360_logic::TrackingSimulation;
