//! Observer registration for notifications and presentation refreshes.
//!
//! The simulation never touches rendering state. Anything that draws cards,
//! markers or toasts subscribes a [`TrackingObserver`] and redraws on
//! `refresh`.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Receiver of simulation output. Both methods are fire-and-forget and
/// default to doing nothing.
pub trait TrackingObserver: Send {
    /// Transient user-facing message.
    fn notify(&mut self, _message: &str, _severity: Severity) {}

    /// A shipment's status or marker position changed.
    fn refresh(&mut self, _shipment_id: &str) {}
}

/// Handle returned by [`ObserverRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn TrackingObserver>)>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn TrackingObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&mut self, message: &str, severity: Severity) {
        for (_, observer) in &mut self.observers {
            observer.notify(message, severity);
        }
    }

    pub fn refresh(&mut self, shipment_id: &str) {
        for (_, observer) in &mut self.observers {
            observer.refresh(shipment_id);
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ============================================================================
// PROVIDED OBSERVERS
// ============================================================================

/// Something an observer was told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingEvent {
    Notified { message: String, severity: Severity },
    Refreshed { shipment_id: String },
}

/// In-memory event recorder. Clones share the same buffer, so one clone can
/// be subscribed while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TrackingEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: TrackingEvent) {
        // A poisoned buffer only means another clone panicked mid-push.
        let mut events = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event);
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Notifications with the given severity, messages only.
    pub fn notifications(&self, severity: Severity) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TrackingEvent::Notified { message, severity: s } if s == severity => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn refresh_count(&self, shipment_id: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TrackingEvent::Refreshed { shipment_id: id } if id == shipment_id))
            .count()
    }

    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut guard) => guard.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl TrackingObserver for EventLog {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.push(TrackingEvent::Notified {
            message: message.to_owned(),
            severity,
        });
    }

    fn refresh(&mut self, shipment_id: &str) {
        self.push(TrackingEvent::Refreshed {
            shipment_id: shipment_id.to_owned(),
        });
    }
}

/// Forwards notifications to the `log` facade. Refreshes go to trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl TrackingObserver for LogObserver {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => log::info!("[{}] {}", severity.as_str(), message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Error => log::error!("{}", message),
        }
    }

    fn refresh(&mut self, shipment_id: &str) {
        log::trace!("refresh {}", shipment_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_fans_out_to_every_observer() {
        let a = EventLog::new();
        let b = EventLog::new();
        let mut registry = ObserverRegistry::new();
        registry.subscribe(Box::new(a.clone()));
        registry.subscribe(Box::new(b.clone()));

        registry.notify("hello", Severity::Warning);
        registry.refresh("SHP001");

        for log in [&a, &b] {
            assert_eq!(log.notifications(Severity::Warning), vec!["hello".to_string()]);
            assert_eq!(log.refresh_count("SHP001"), 1);
        }
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let log = EventLog::new();
        let mut registry = ObserverRegistry::new();
        let id = registry.subscribe(Box::new(log.clone()));
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert!(registry.is_empty());

        registry.notify("ignored", Severity::Info);
        assert!(log.events().is_empty());
    }

    #[test]
    fn observer_ids_are_unique() {
        let mut registry = ObserverRegistry::new();
        let a = registry.subscribe(Box::new(LogObserver));
        let b = registry.subscribe(Box::new(LogObserver));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn default_methods_are_noops() {
        struct Silent;
        impl TrackingObserver for Silent {}
        let mut registry = ObserverRegistry::new();
        registry.subscribe(Box::new(Silent));
        registry.notify("x", Severity::Error);
        registry.refresh("y");
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new();
        log.notify("a", Severity::Info);
        log.clear();
        assert!(log.events().is_empty());
    }
}
