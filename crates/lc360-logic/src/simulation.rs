//! Tracking simulation: one synchronous tick over the active shipments.
//!
//! Per tick, for every active shipment that is not delivered:
//! 1. The progress tracker adds one step
//! 2. The transition engine checks both thresholds against the new value
//! 3. Each transition updates the status and notifies observers
//! 4. The interpolator places the marker (skipped for unroutable shipments)
//! 5. Observers get one refresh for the shipment
//!
//! The simulation owns all mutable tracking state. The live loop in
//! `lc360-runtime` calls [`TrackingSimulation::tick`] on a timer; tests call
//! it directly.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::TrackingConfig;
use crate::error::TrackingError;
use crate::filter::ShipmentFilter;
use crate::fleet::Fleet;
use crate::observer::{ObserverId, ObserverRegistry, TrackingObserver};
use crate::progress::ProgressTracker;
use crate::route::{self, Waypoint};
use crate::shipment::{Shipment, ShipmentStatus};
use crate::status::{self, Transition};

/// A status change applied during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub shipment_id: String,
    pub transition: Transition,
    pub progress: f64,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: u64,
    pub advanced: Vec<String>,
    pub changes: Vec<StatusChange>,
    /// Advanced shipments whose route is too short to place a marker.
    pub unpositioned: Vec<String>,
}

impl TickReport {
    /// Nothing moved: every active shipment is delivered or none are active.
    pub fn is_idle(&self) -> bool {
        self.advanced.is_empty()
    }
}

/// Presentation view of one active shipment's marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub shipment_id: String,
    pub tracking_code: String,
    pub status: ShipmentStatus,
    pub progress: f64,
    /// `None` when the route has fewer than two waypoints.
    pub position: Option<Waypoint>,
    pub selected: bool,
}

#[derive(Debug)]
pub struct TrackingSimulation {
    config: TrackingConfig,
    fleet: Fleet,
    index: HashMap<String, usize>,
    tracker: ProgressTracker,
    /// Indices into `fleet.shipments`, in list order.
    active: Vec<usize>,
    filter: ShipmentFilter,
    selected: Option<String>,
    observers: ObserverRegistry,
    tick_count: u64,
    warned_unroutable: HashSet<String>,
}

impl TrackingSimulation {
    pub fn new(fleet: Fleet, config: TrackingConfig) -> Result<Self, TrackingError> {
        config.validate()?;

        let mut index = HashMap::with_capacity(fleet.shipments.len());
        for (i, shipment) in fleet.shipments.iter().enumerate() {
            if index.insert(shipment.id.clone(), i).is_some() {
                return Err(TrackingError::DuplicateShipment(shipment.id.clone()));
            }
        }

        let mut sim = Self {
            tracker: ProgressTracker::new(config.progress_step),
            config,
            fleet,
            index,
            active: Vec::new(),
            filter: ShipmentFilter::all(),
            selected: None,
            observers: ObserverRegistry::new(),
            tick_count: 0,
            warned_unroutable: HashSet::new(),
        };
        sim.rebuild_active();

        log::info!(
            "Tracking {} shipments (step {}, every {} ms)",
            sim.fleet.shipments.len(),
            sim.config.progress_step,
            sim.config.tick_interval_ms
        );
        Ok(sim)
    }

    /// Simulation over the embedded demo fleet.
    pub fn with_default_fleet(config: TrackingConfig) -> Result<Self, TrackingError> {
        Self::new(Fleet::load_default()?, config)
    }

    // ── Observers ──────────────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: Box<dyn TrackingObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ── Tick ───────────────────────────────────────────────────────────

    pub fn tick(&mut self) -> TickReport {
        self.tick_count += 1;
        let mut report = TickReport {
            tick: self.tick_count,
            ..Default::default()
        };

        let shipments = &self.fleet.shipments;
        let advanced: Vec<String> = self
            .tracker
            .tick(self.active.iter().map(|&i| &shipments[i]))
            .into_iter()
            .map(str::to_owned)
            .collect();

        for id in advanced {
            let Some(&idx) = self.index.get(&id) else {
                continue;
            };
            let progress = self.tracker.progress(&id).unwrap_or(0.0);
            let shipment = &mut self.fleet.shipments[idx];

            for transition in status::reconcile(shipment.status, progress) {
                shipment.status = transition.to;
                log::info!(
                    "Shipment {} {} -> {} at progress {:.2}",
                    shipment.tracking_code,
                    transition.from,
                    transition.to,
                    progress
                );
                self.observers.notify(
                    &transition.message(&shipment.tracking_code),
                    transition.severity(),
                );
                report.changes.push(StatusChange {
                    shipment_id: id.clone(),
                    transition,
                    progress,
                });
            }

            if route::position(&shipment.waypoints, progress).is_none() {
                if self.warned_unroutable.insert(id.clone()) {
                    log::warn!(
                        "Shipment {} has {} waypoint(s); skipping marker",
                        shipment.tracking_code,
                        shipment.waypoints.len()
                    );
                }
                report.unpositioned.push(id.clone());
            }

            let status_changed = report.changes.iter().any(|c| c.shipment_id == id);
            let moved = shipment.is_routable();
            if status_changed || moved {
                self.observers.refresh(&id);
            }
            report.advanced.push(id);
        }

        log::debug!(
            "tick {}: {} advanced, {} status change(s)",
            report.tick,
            report.advanced.len(),
            report.changes.len()
        );
        report
    }

    /// Tick until no active shipment moves or `max_ticks` is reached.
    /// Returns the number of ticks that advanced something.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> u64 {
        let mut productive = 0;
        for _ in 0..max_ticks {
            if self.tick().is_idle() {
                break;
            }
            productive += 1;
        }
        productive
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Filtering & selection ──────────────────────────────────────────

    /// Replace the filter and rebuild the active set. Progress for
    /// shipments that stay active is untouched; newly visible shipments are
    /// seeded only if they were never seen before. Returns the active ids.
    pub fn apply_filter(&mut self, filter: ShipmentFilter) -> Vec<&str> {
        self.filter = filter;
        self.rebuild_active();
        self.active_ids()
    }

    pub fn filter(&self) -> &ShipmentFilter {
        &self.filter
    }

    fn rebuild_active(&mut self) {
        let filter = &self.filter;
        self.active = self
            .fleet
            .shipments
            .iter()
            .enumerate()
            .filter(|(_, s)| filter.matches(s))
            .map(|(i, _)| i)
            .collect();

        let seed_from_status = self.config.seed_progress_from_status;
        for &i in &self.active {
            let shipment = &self.fleet.shipments[i];
            let initial = if seed_from_status {
                shipment.status.initial_progress()
            } else {
                0.0
            };
            self.tracker.seed_with(&shipment.id, initial);
        }
    }

    pub fn select(&mut self, id: &str) -> Result<(), TrackingError> {
        if !self.index.contains_key(id) {
            log::warn!("Cannot select unknown shipment {}", id);
            return Err(TrackingError::UnknownShipment(id.to_owned()));
        }
        let previous = self.selected.replace(id.to_owned());
        if let Some(prev) = previous.as_deref().filter(|prev| *prev != id) {
            self.observers.refresh(prev);
        }
        self.observers.refresh(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if let Some(prev) = self.selected.take() {
            self.observers.refresh(&prev);
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn shipment(&self, id: &str) -> Option<&Shipment> {
        self.index.get(id).map(|&i| &self.fleet.shipments[i])
    }

    pub fn active_ids(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|&i| self.fleet.shipments[i].id.as_str())
            .collect()
    }

    pub fn active_shipments(&self) -> impl Iterator<Item = &Shipment> {
        self.active.iter().map(move |&i| &self.fleet.shipments[i])
    }

    /// Progress without seeding; `None` for shipments never made active.
    pub fn progress(&self, id: &str) -> Option<f64> {
        self.tracker.progress(id)
    }

    /// Marker position for a shipment that has been seeded.
    pub fn marker_position(&self, id: &str) -> Option<Waypoint> {
        let shipment = self.shipment(id)?;
        let progress = self.tracker.progress(id)?;
        route::position(&shipment.waypoints, progress)
    }

    /// Markers for every active shipment, in list order.
    pub fn markers(&self) -> Vec<MarkerView> {
        self.active_shipments()
            .map(|s| {
                let progress = self.tracker.progress(&s.id).unwrap_or(0.0);
                MarkerView {
                    shipment_id: s.id.clone(),
                    tracking_code: s.tracking_code.clone(),
                    status: s.status,
                    progress,
                    position: route::position(&s.waypoints, progress),
                    selected: self.selected.as_deref() == Some(s.id.as_str()),
                }
            })
            .collect()
    }

    pub fn all_delivered(&self) -> bool {
        self.fleet
            .shipments
            .iter()
            .all(|s| s.status == ShipmentStatus::Delivered)
    }

    /// Stage a progress value directly (scenario setup in tests and the
    /// simulation harness). Does not run the transition engine.
    pub fn set_progress(&mut self, id: &str, progress: f64) -> Result<(), TrackingError> {
        if !self.index.contains_key(id) {
            return Err(TrackingError::UnknownShipment(id.to_owned()));
        }
        self.tracker.set(id, progress);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{EventLog, Severity};

    fn setup(config: TrackingConfig) -> (TrackingSimulation, EventLog) {
        let mut sim = TrackingSimulation::with_default_fleet(config).unwrap();
        let log = EventLog::new();
        sim.subscribe(Box::new(log.clone()));
        (sim, log)
    }

    fn legacy() -> TrackingConfig {
        TrackingConfig {
            seed_progress_from_status: false,
            ..Default::default()
        }
    }

    #[test]
    fn everything_active_at_start() {
        let (sim, _) = setup(TrackingConfig::default());
        assert_eq!(sim.active_ids(), vec!["SHP001", "SHP002", "SHP003"]);
        assert_eq!(sim.progress("SHP001"), Some(0.0));
    }

    #[test]
    fn seeding_from_status() {
        let (sim, _) = setup(TrackingConfig::default());
        assert_eq!(sim.progress("SHP002"), Some(0.8));
        let (legacy_sim, _) = sim_legacy();
        assert_eq!(legacy_sim.progress("SHP002"), Some(0.0));
    }

    fn sim_legacy() -> (TrackingSimulation, EventLog) {
        setup(legacy())
    }

    #[test]
    fn tick_advances_and_refreshes() {
        let (mut sim, log) = setup(TrackingConfig::default());
        let report = sim.tick();
        assert_eq!(report.tick, 1);
        assert_eq!(report.advanced.len(), 3);
        assert!(report.changes.is_empty());
        assert!((sim.progress("SHP001").unwrap() - 0.01).abs() < 1e-12);
        assert_eq!(log.refresh_count("SHP001"), 1);
        assert_eq!(log.refresh_count("SHP003"), 1);
    }

    #[test]
    fn select_refreshes_old_and_new() {
        let (mut sim, log) = setup(TrackingConfig::default());
        sim.select("SHP001").unwrap();
        sim.select("SHP002").unwrap();
        assert_eq!(sim.selected(), Some("SHP002"));
        assert_eq!(log.refresh_count("SHP001"), 2);
        assert_eq!(log.refresh_count("SHP002"), 1);

        let err = sim.select("SHP404").unwrap_err();
        assert!(matches!(err, TrackingError::UnknownShipment(_)));
        assert_eq!(sim.selected(), Some("SHP002"));

        sim.clear_selection();
        assert_eq!(sim.selected(), None);
        assert_eq!(log.refresh_count("SHP002"), 2);
    }

    #[test]
    fn markers_report_selection_and_position() {
        let (mut sim, _) = setup(TrackingConfig::default());
        sim.select("SHP003").unwrap();
        let markers = sim.markers();
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].position, Some(Waypoint::new(150.0, 450.0)));
        assert!(markers[2].selected);
        assert!(!markers[0].selected);
    }

    #[test]
    fn run_until_idle_delivers_everything() {
        let (mut sim, log) = setup(TrackingConfig::default());
        let ticks = sim.run_until_idle(1_000);
        assert!(sim.all_delivered());
        assert!((100..=101).contains(&ticks), "ticks={ticks}");
        // SHP001 and SHP003 go out for delivery; SHP002 starts there.
        assert_eq!(log.notifications(Severity::Info).len(), 2);
        assert_eq!(log.notifications(Severity::Success).len(), 3);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut fleet = Fleet::load_default().unwrap();
        fleet.shipments.push(fleet.shipments[1].clone());
        let err = TrackingSimulation::new(fleet, TrackingConfig::default()).unwrap_err();
        assert!(matches!(err, TrackingError::DuplicateShipment(_)));
    }

    #[test]
    fn unroutable_warned_once_but_reported_every_tick() {
        let mut fleet = Fleet::load_default().unwrap();
        fleet.shipments[0].waypoints.truncate(1);
        let mut sim = TrackingSimulation::new(fleet, TrackingConfig::default()).unwrap();

        for _ in 0..5 {
            let report = sim.tick();
            assert_eq!(report.unpositioned, vec!["SHP001"]);
            assert!(report.advanced.iter().any(|id| id == "SHP001"));
        }
        assert_eq!(sim.warned_unroutable.len(), 1);
        assert!(sim.warned_unroutable.contains("SHP001"));
        assert!(sim.progress("SHP001").unwrap() > 0.04);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = TrackingConfig {
            progress_step: 0.0,
            ..Default::default()
        };
        assert!(TrackingSimulation::with_default_fleet(config).is_err());
    }
}
