//! Per-shipment progress along its route.
//!
//! Progress starts at 0 and only ever grows by one fixed step per tick.
//! Values past 1.0 are allowed; the interpolator treats them as arrived.
//! Entries are keyed by shipment id, never by list position, so the active
//! set can be rebuilt freely without losing or duplicating state.

use std::collections::HashMap;

use crate::constants::DEFAULT_PROGRESS_STEP;
use crate::shipment::Shipment;

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    step: f64,
    progress: HashMap<String, f64>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_STEP)
    }
}

impl ProgressTracker {
    pub fn new(step: f64) -> Self {
        Self {
            step,
            progress: HashMap::new(),
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Current progress, seeding 0 for an unseen id.
    pub fn seed(&mut self, id: &str) -> f64 {
        self.seed_with(id, 0.0)
    }

    /// Current progress, seeding `initial` for an unseen id. An existing
    /// value is never replaced.
    pub fn seed_with(&mut self, id: &str, initial: f64) -> f64 {
        if let Some(&p) = self.progress.get(id) {
            return p;
        }
        self.progress.insert(id.to_owned(), initial);
        initial
    }

    /// Current progress without seeding.
    pub fn progress(&self, id: &str) -> Option<f64> {
        self.progress.get(id).copied()
    }

    /// Add one step to `id` and return the new value.
    pub fn advance(&mut self, id: &str) -> f64 {
        let step = self.step;
        let p = self.progress.entry(id.to_owned()).or_insert(0.0);
        *p += step;
        *p
    }

    /// Advance every shipment that is not yet delivered. Returns the ids
    /// that moved, in iteration order.
    pub fn tick<'a, I>(&mut self, shipments: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a Shipment>,
    {
        let mut advanced = Vec::new();
        for shipment in shipments {
            if shipment.status.is_terminal() {
                continue;
            }
            self.advance(&shipment.id);
            advanced.push(shipment.id.as_str());
        }
        advanced
    }

    pub fn len(&self) -> usize {
        self.progress.len()
    }

    pub fn is_empty(&self) -> bool {
        self.progress.is_empty()
    }

    /// Override a value directly. Used to stage scenarios in tests and the
    /// simulation harness.
    pub fn set(&mut self, id: &str, progress: f64) {
        self.progress.insert(id.to_owned(), progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Waypoint;
    use crate::shipment::{Party, Priority, ShipmentStatus};

    fn shipment(id: &str, status: ShipmentStatus) -> Shipment {
        let party = Party {
            name: "Test".into(),
            city: "Mumbai".into(),
            address: "1 Road".into(),
        };
        Shipment {
            id: id.into(),
            tracking_code: format!("LC360-TEST-{id}"),
            sender: party.clone(),
            receiver: party,
            assigned_driver: None,
            status,
            estimated_arrival: "2025-11-09T14:30:00Z".into(),
            weight_kg: 10.0,
            priority: Priority::Standard,
            waypoints: vec![Waypoint::new(0.0, 0.0), Waypoint::new(10.0, 0.0)],
        }
    }

    #[test]
    fn seeding_is_idempotent() {
        let mut t = ProgressTracker::default();
        assert_eq!(t.progress("A"), None);
        assert_eq!(t.seed("A"), 0.0);
        assert_eq!(t.seed("A"), 0.0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn seed_never_resets_existing_value() {
        let mut t = ProgressTracker::default();
        t.set("A", 0.42);
        assert_eq!(t.seed("A"), 0.42);
        assert_eq!(t.seed_with("A", 1.0), 0.42);
    }

    #[test]
    fn seed_with_uses_initial_for_new_ids() {
        let mut t = ProgressTracker::default();
        assert_eq!(t.seed_with("B", 0.8), 0.8);
        assert_eq!(t.progress("B"), Some(0.8));
    }

    #[test]
    fn advance_seeds_then_steps() {
        let mut t = ProgressTracker::new(0.25);
        assert_eq!(t.advance("A"), 0.25);
        assert_eq!(t.advance("A"), 0.5);
    }

    #[test]
    fn tick_skips_delivered() {
        let mut t = ProgressTracker::default();
        let moving = shipment("A", ShipmentStatus::InTransit);
        let near = shipment("B", ShipmentStatus::OutForDelivery);
        let done = shipment("C", ShipmentStatus::Delivered);
        t.set("C", 1.0);

        let advanced = t.tick([&moving, &near, &done]);
        assert_eq!(advanced, vec!["A", "B"]);
        assert!((t.progress("A").unwrap() - 0.01).abs() < 1e-12);
        assert_eq!(t.progress("C"), Some(1.0));
    }

    #[test]
    fn tick_on_empty_set_is_noop() {
        let mut t = ProgressTracker::default();
        let advanced = t.tick(std::iter::empty());
        assert!(advanced.is_empty());
        assert!(t.is_empty());
    }

    #[test]
    fn repeated_ticks_never_decrease() {
        let mut t = ProgressTracker::default();
        let s = shipment("A", ShipmentStatus::InTransit);
        let mut last = t.seed("A");
        for _ in 0..250 {
            t.tick([&s]);
            let now = t.progress("A").unwrap();
            assert!(now > last);
            last = now;
        }
    }
}
