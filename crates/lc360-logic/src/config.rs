//! Simulation tuning: tick period, progress step, initial seeding.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! { "tick_interval_ms": 250, "progress_step": 0.05 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PROGRESS_STEP, DEFAULT_TICK_INTERVAL_MS, DELIVERED_AT};

/// Above this many ticks the count is estimated instead of summed.
const MAX_SUMMED_TICKS: f64 = 1e7;
use crate::error::TrackingError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackingConfig {
    /// Period between ticks of the live loop.
    pub tick_interval_ms: u64,
    /// Progress added to each active shipment per tick.
    pub progress_step: f64,
    /// Seed out-for-delivery shipments at 0.8 and delivered ones at 1.0
    /// instead of 0, so the marker agrees with the status from the start.
    pub seed_progress_from_status: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            progress_step: DEFAULT_PROGRESS_STEP,
            seed_progress_from_status: true,
        }
    }
}

impl TrackingConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TrackingError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackingError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.tick_interval_ms == 0 {
            return Err(TrackingError::InvalidConfig(
                "tick_interval_ms must be at least 1".into(),
            ));
        }
        if !self.progress_step.is_finite() || self.progress_step <= 0.0 {
            return Err(TrackingError::InvalidConfig(format!(
                "progress_step must be a positive number, got {}",
                self.progress_step
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Ticks an in-transit shipment starting at 0 needs to reach the end.
    ///
    /// Progress accumulates by repeated `f64` addition, so `1 / step` can
    /// undercount (ten steps of 0.1 sum to just under 1.0). The step is
    /// summed here the same way the tracker sums it.
    pub fn ticks_to_deliver(&self) -> u64 {
        let estimate = (DELIVERED_AT / self.progress_step).ceil();
        if !estimate.is_finite() || estimate > MAX_SUMMED_TICKS {
            return estimate as u64;
        }
        let mut progress = 0.0;
        let mut ticks = 0;
        while progress < DELIVERED_AT {
            progress += self.progress_step;
            ticks += 1;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let c = TrackingConfig::default();
        assert_eq!(c.tick_interval(), Duration::from_secs(1));
        assert!((c.progress_step - 0.01).abs() < 1e-12);
        assert!(c.seed_progress_from_status);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_object_uses_defaults() {
        let c = TrackingConfig::from_json_str("{}").unwrap();
        assert_eq!(c, TrackingConfig::default());
    }

    #[test]
    fn partial_override() {
        let c = TrackingConfig::from_json_str(r#"{"tick_interval_ms": 50, "progress_step": 0.25}"#)
            .unwrap();
        assert_eq!(c.tick_interval_ms, 50);
        assert_eq!(c.ticks_to_deliver(), 4);
        assert!(c.seed_progress_from_status);
    }

    #[test]
    fn ticks_to_deliver_follows_accumulated_progress() {
        let config = |step| TrackingConfig {
            progress_step: step,
            ..Default::default()
        };
        // 0.1 * 10 sums to 0.9999999999999999
        assert_eq!(config(0.1).ticks_to_deliver(), 11);
        assert_eq!(config(0.01).ticks_to_deliver(), 100);
        assert_eq!(config(0.5).ticks_to_deliver(), 2);
        assert_eq!(config(1.5).ticks_to_deliver(), 1);
    }

    #[test]
    fn rejects_zero_interval() {
        let err = TrackingConfig::from_json_str(r#"{"tick_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, TrackingError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_positive_step() {
        for json in [r#"{"progress_step": 0.0}"#, r#"{"progress_step": -0.1}"#] {
            let err = TrackingConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, TrackingError::InvalidConfig(_)), "{json}");
        }
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = TrackingConfig::from_json_str(r#"{"tick_ms": 10}"#).unwrap_err();
        assert!(matches!(err, TrackingError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TrackingConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TrackingError::Io(_)));
    }
}
