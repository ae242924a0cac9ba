//! Status transitions driven by progress thresholds.
//!
//! Both threshold checks run against the same progress value, so one large
//! step can carry a shipment from in-transit straight through to delivered.
//! Transitions only move forward.

use crate::constants::{DELIVERED_AT, OUT_FOR_DELIVERY_AT};
use crate::observer::Severity;
use crate::shipment::ShipmentStatus;

/// One forward move in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ShipmentStatus,
    pub to: ShipmentStatus,
}

impl Transition {
    /// Severity of the notification this transition raises.
    pub fn severity(&self) -> Severity {
        match self.to {
            ShipmentStatus::Delivered => Severity::Success,
            _ => Severity::Info,
        }
    }

    pub fn message(&self, tracking_code: &str) -> String {
        match self.to {
            ShipmentStatus::OutForDelivery => {
                format!("Shipment {} is out for delivery!", tracking_code)
            }
            ShipmentStatus::Delivered => format!("Shipment {} has been delivered!", tracking_code),
            ShipmentStatus::InTransit => format!("Shipment {} is in transit", tracking_code),
        }
    }
}

/// Transitions that `progress` triggers from `status`, in the order they
/// apply. Empty when nothing changes. At most two entries.
pub fn reconcile(status: ShipmentStatus, progress: f64) -> Vec<Transition> {
    let mut transitions = Vec::with_capacity(2);
    let mut current = status;

    if progress >= OUT_FOR_DELIVERY_AT && current == ShipmentStatus::InTransit {
        transitions.push(Transition {
            from: current,
            to: ShipmentStatus::OutForDelivery,
        });
        current = ShipmentStatus::OutForDelivery;
    }

    if progress >= DELIVERED_AT && current != ShipmentStatus::Delivered {
        transitions.push(Transition {
            from: current,
            to: ShipmentStatus::Delivered,
        });
    }

    transitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_no_change() {
        assert!(reconcile(ShipmentStatus::InTransit, 0.0).is_empty());
        assert!(reconcile(ShipmentStatus::InTransit, 0.79).is_empty());
        assert!(reconcile(ShipmentStatus::OutForDelivery, 0.99).is_empty());
    }

    #[test]
    fn crossing_out_for_delivery() {
        let t = reconcile(ShipmentStatus::InTransit, 0.8);
        assert_eq!(
            t,
            vec![Transition {
                from: ShipmentStatus::InTransit,
                to: ShipmentStatus::OutForDelivery,
            }]
        );
        assert_eq!(t[0].severity(), Severity::Info);
        assert_eq!(
            t[0].message("LC360-2025-001"),
            "Shipment LC360-2025-001 is out for delivery!"
        );
    }

    #[test]
    fn crossing_delivered() {
        let t = reconcile(ShipmentStatus::OutForDelivery, 1.0);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].to, ShipmentStatus::Delivered);
        assert_eq!(t[0].severity(), Severity::Success);
        assert_eq!(
            t[0].message("LC360-2025-002"),
            "Shipment LC360-2025-002 has been delivered!"
        );
    }

    #[test]
    fn large_step_lands_on_delivered() {
        let t = reconcile(ShipmentStatus::InTransit, 1.2);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].to, ShipmentStatus::OutForDelivery);
        assert_eq!(t[1].from, ShipmentStatus::OutForDelivery);
        assert_eq!(t[1].to, ShipmentStatus::Delivered);
    }

    #[test]
    fn delivered_is_terminal() {
        assert!(reconcile(ShipmentStatus::Delivered, 5.0).is_empty());
    }

    #[test]
    fn out_for_delivery_never_regresses() {
        // Out-for-delivery with low progress (legacy seeding) stays put
        assert!(reconcile(ShipmentStatus::OutForDelivery, 0.1).is_empty());
    }
}
