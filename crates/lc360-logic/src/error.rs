//! Error type shared by data loading, configuration, and selection.
//!
//! Nothing inside a tick returns an error; these only surface from the
//! operations that run before or between ticks.

/// Errors produced outside the tick path.
#[derive(Debug)]
pub enum TrackingError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Two shipment records share the same id.
    DuplicateShipment(String),
    InvalidConfig(String),
    UnknownShipment(String),
    UnknownStatus(String),
}

impl From<std::io::Error> for TrackingError {
    fn from(e: std::io::Error) -> Self {
        TrackingError::Io(e)
    }
}

impl From<serde_json::Error> for TrackingError {
    fn from(e: serde_json::Error) -> Self {
        TrackingError::Json(e)
    }
}

impl std::fmt::Display for TrackingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingError::Io(e) => write!(f, "IO error: {}", e),
            TrackingError::Json(e) => write!(f, "JSON error: {}", e),
            TrackingError::DuplicateShipment(id) => write!(f, "Duplicate shipment id: {}", id),
            TrackingError::InvalidConfig(reason) => write!(f, "Invalid config: {}", reason),
            TrackingError::UnknownShipment(id) => write!(f, "Unknown shipment: {}", id),
            TrackingError::UnknownStatus(s) => write!(f, "Unknown shipment status: {:?}", s),
        }
    }
}

impl std::error::Error for TrackingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackingError::Io(e) => Some(e),
            TrackingError::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_id() {
        let e = TrackingError::DuplicateShipment("SHP001".into());
        assert_eq!(e.to_string(), "Duplicate shipment id: SHP001");
        let e = TrackingError::UnknownShipment("SHP999".into());
        assert_eq!(e.to_string(), "Unknown shipment: SHP999");
    }

    #[test]
    fn json_errors_convert_and_keep_source() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let e: TrackingError = parse.unwrap_err().into();
        assert!(matches!(e, TrackingError::Json(_)));
        assert!(std::error::Error::source(&e).is_some());
    }
}
