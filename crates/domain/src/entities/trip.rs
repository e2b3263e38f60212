//! Trip search and trip history entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// An origin/destination pair typed into the destination picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSearchQuery {
    /// Where the passenger boards
    pub origin_label: String,
    /// Where the passenger wants to go
    pub destination_label: String,
}

impl TripSearchQuery {
    /// Build a query from raw input, trimming both labels
    ///
    /// # Errors
    ///
    /// Returns a validation error when either label is blank.
    pub fn new(origin: &str, destination: &str) -> Result<Self, DomainError> {
        let origin_label = origin.trim();
        let destination_label = destination.trim();
        if origin_label.is_empty() {
            return Err(DomainError::validation("origin must not be empty"));
        }
        if destination_label.is_empty() {
            return Err(DomainError::validation("destination must not be empty"));
        }
        Ok(Self {
            origin_label: origin_label.to_string(),
            destination_label: destination_label.to_string(),
        })
    }
}

/// One past trip of the signed-in passenger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// 1-based position in the backend listing
    pub sequence: usize,
    /// Line number, "Inconnu" when missing
    pub bus_type: String,
    /// "primus - terminus"
    pub route_label: String,
    /// Registration plate
    pub plate: String,
    /// Fare paid in Ariary
    pub fare: u32,
    /// When the passenger boarded
    pub date: DateTime<Utc>,
    /// Trip length in kilometers, when known
    pub distance_km: Option<f64>,
}

impl TripRecord {
    /// Whether the route label or plate contains the search term (case-insensitive)
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.route_label.to_lowercase().contains(&term) || self.plate.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TripRecord {
        TripRecord {
            sequence: 1,
            bus_type: "40".to_string(),
            route_label: "Antanifotsy - Ankofafa".to_string(),
            plate: "3456 TBA".to_string(),
            fare: 1500,
            date: Utc::now(),
            distance_km: Some(1.5),
        }
    }

    #[test]
    fn query_trims_labels() {
        let query = TripSearchQuery::new("  Anosy ", "Tsianolondroa").unwrap();
        assert_eq!(query.origin_label, "Anosy");
        assert_eq!(query.destination_label, "Tsianolondroa");
    }

    #[test]
    fn query_rejects_blank_labels() {
        assert!(TripSearchQuery::new("   ", "C").is_err());
        assert!(TripSearchQuery::new("A", "").is_err());
    }

    #[test]
    fn search_matches_route_or_plate() {
        let trip = record();
        assert!(trip.matches_search("ankofafa"));
        assert!(trip.matches_search("TBA"));
        assert!(trip.matches_search(""));
        assert!(!trip.matches_search("Anosy"));
    }
}
