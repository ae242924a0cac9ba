//! Mock data store: shipments and the drivers and vehicles they reference.
//!
//! The default fleet is embedded from `data/mock_fleet.json` at compile time
//! and is read-only from the tracking core's point of view.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TrackingError;
use crate::shipment::Shipment;

const MOCK_FLEET_JSON: &str = include_str!("../../../data/mock_fleet.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Truck,
    Van,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub registration_number: String,
    pub kind: VehicleKind,
    /// Kilometres per litre.
    pub fuel_efficiency: f64,
    pub eco_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub on_time_percent: f64,
    pub total_deliveries: u32,
    #[serde(default)]
    pub vehicle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub shipments: Vec<Shipment>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
}

impl Fleet {
    /// The embedded demo fleet.
    pub fn load_default() -> Result<Self, TrackingError> {
        Self::from_json(MOCK_FLEET_JSON)
    }

    /// Parse and check a fleet document. Duplicate shipment ids are
    /// rejected; unroutable shipments are kept but logged.
    pub fn from_json(json: &str) -> Result<Self, TrackingError> {
        let fleet: Fleet = serde_json::from_str(json)?;
        fleet.check()?;
        Ok(fleet)
    }

    pub fn from_shipments(shipments: Vec<Shipment>) -> Result<Self, TrackingError> {
        let fleet = Fleet {
            shipments,
            ..Default::default()
        };
        fleet.check()?;
        Ok(fleet)
    }

    fn check(&self) -> Result<(), TrackingError> {
        let mut seen = HashSet::new();
        for shipment in &self.shipments {
            if !seen.insert(shipment.id.as_str()) {
                return Err(TrackingError::DuplicateShipment(shipment.id.clone()));
            }
            if !shipment.is_routable() {
                log::warn!(
                    "Shipment {} has {} waypoint(s); its marker will not be placed",
                    shipment.id,
                    shipment.waypoints.len()
                );
            }
            if let Some(driver) = &shipment.assigned_driver {
                if !self.drivers.is_empty() && self.driver(driver).is_none() {
                    log::warn!("Shipment {} references unknown driver {}", shipment.id, driver);
                }
            }
        }
        Ok(())
    }

    pub fn shipment(&self, id: &str) -> Option<&Shipment> {
        self.shipments.iter().find(|s| s.id == id)
    }

    pub fn driver(&self, id: &str) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == id)
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Driver assigned to a shipment, if any and known.
    pub fn driver_for(&self, shipment: &Shipment) -> Option<&Driver> {
        shipment
            .assigned_driver
            .as_deref()
            .and_then(|id| self.driver(id))
    }

    /// Distinct sender/receiver cities, sorted. Feeds the city filter.
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self
            .shipments
            .iter()
            .flat_map(|s| [s.sender.city.clone(), s.receiver.city.clone()])
            .collect();
        cities.sort();
        cities.dedup();
        cities
    }
}
