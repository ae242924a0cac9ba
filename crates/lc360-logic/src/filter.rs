//! Search, status and city filtering over the shipment list.

use crate::shipment::{Shipment, ShipmentStatus};

/// Which shipments are visible (and therefore active in the simulation).
/// The default filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentFilter {
    /// Case-insensitive substring of tracking code, sender city or
    /// receiver city. Empty matches all.
    pub query: String,
    pub status: Option<ShipmentStatus>,
    /// Exact sender or receiver city.
    pub city: Option<String>,
}

impl ShipmentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_status(mut self, status: ShipmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.query.is_empty() && self.status.is_none() && self.city.is_none()
    }

    pub fn matches(&self, shipment: &Shipment) -> bool {
        self.matches_query(shipment)
            && self.status.map_or(true, |s| shipment.status == s)
            && self
                .city
                .as_deref()
                .map_or(true, |city| shipment.touches_city(city))
    }

    fn matches_query(&self, shipment: &Shipment) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let q = self.query.to_lowercase();
        shipment.tracking_code.to_lowercase().contains(&q)
            || shipment.sender.city.to_lowercase().contains(&q)
            || shipment.receiver.city.to_lowercase().contains(&q)
    }

    /// Ids of matching shipments, in list order.
    pub fn apply<'a>(&self, shipments: &'a [Shipment]) -> Vec<&'a str> {
        shipments
            .iter()
            .filter(|s| self.matches(s))
            .map(|s| s.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::Fleet;

    fn shipments() -> Vec<Shipment> {
        Fleet::load_default().unwrap().shipments
    }

    #[test]
    fn default_matches_everything() {
        let list = shipments();
        let f = ShipmentFilter::all();
        assert!(f.is_unfiltered());
        assert_eq!(f.apply(&list), vec!["SHP001", "SHP002", "SHP003"]);
    }

    #[test]
    fn query_is_case_insensitive() {
        let list = shipments();
        assert_eq!(
            ShipmentFilter::all().with_query("PUNE").apply(&list),
            vec!["SHP001"]
        );
        assert_eq!(
            ShipmentFilter::all().with_query("lc360-2025-003").apply(&list),
            vec!["SHP003"]
        );
        assert!(ShipmentFilter::all().with_query("chennai").apply(&list).is_empty());
    }

    #[test]
    fn status_filter() {
        let list = shipments();
        let f = ShipmentFilter::all().with_status(ShipmentStatus::InTransit);
        assert_eq!(f.apply(&list), vec!["SHP001", "SHP003"]);
    }

    #[test]
    fn city_filter_matches_either_end() {
        let list = shipments();
        let f = ShipmentFilter::all().with_city("Delhi");
        assert_eq!(f.apply(&list), vec!["SHP002", "SHP003"]);
        // Exact match only
        assert!(ShipmentFilter::all().with_city("delhi").apply(&list).is_empty());
    }

    #[test]
    fn filters_combine() {
        let list = shipments();
        let f = ShipmentFilter::all()
            .with_query("mumbai")
            .with_city("Delhi")
            .with_status(ShipmentStatus::InTransit);
        assert!(!f.is_unfiltered());
        assert_eq!(f.apply(&list), vec!["SHP003"]);
    }
}
