//! Live vehicle and stop positions
//!
//! Both are ephemeral: every poll tick replaces the whole set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{BusId, GeoLocation};

/// A bus currently reporting its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    /// Backend bus identifier, when provided
    pub bus_id: Option<BusId>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Name of the driver on duty
    pub driver_name: String,
    /// Line description, e.g. "Antanifotsy - Ankofafa"
    pub route_label: String,
    /// Registration plate
    pub plate: String,
    /// Fare in Ariary
    pub fare: Option<u32>,
    /// Distance from the query center in kilometers
    pub distance_from_viewer: Option<f64>,
}

impl VehiclePosition {
    /// Marker position
    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        GeoLocation::new_unchecked(self.latitude, self.longitude)
    }
}

/// A bus stop near the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopPosition {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Stop name
    pub name: String,
    /// Distance from the query center in kilometers
    pub distance_from_viewer: Option<f64>,
}

impl StopPosition {
    /// Marker position
    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        GeoLocation::new_unchecked(self.latitude, self.longitude)
    }
}

/// Result of one poll tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Vehicles within the radius
    pub vehicles: Vec<VehiclePosition>,
    /// Stops within the radius
    pub stops: Vec<StopPosition>,
    /// When the tick completed
    pub fetched_at: DateTime<Utc>,
    /// The request failed and the lists were defaulted to empty
    pub degraded: bool,
}

impl PositionSnapshot {
    /// A successful snapshot
    #[must_use]
    pub fn new(vehicles: Vec<VehiclePosition>, stops: Vec<StopPosition>) -> Self {
        Self {
            vehicles,
            stops,
            fetched_at: Utc::now(),
            degraded: false,
        }
    }

    /// An empty snapshot standing in for a failed tick
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            vehicles: Vec::new(),
            stops: Vec::new(),
            fetched_at: Utc::now(),
            degraded: true,
        }
    }

    /// Snapshot before the first tick has completed
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Whether there is nothing to draw
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty() && self.stops.is_empty()
    }
}

impl Default for PositionSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_snapshot_is_empty_and_flagged() {
        let snapshot = PositionSnapshot::degraded();
        assert!(snapshot.is_empty());
        assert!(snapshot.degraded);
        assert!(!PositionSnapshot::empty().degraded);
    }

    #[test]
    fn stop_location() {
        let stop = StopPosition {
            latitude: -21.45,
            longitude: 47.08,
            name: "Anjoma".to_string(),
            distance_from_viewer: None,
        };
        assert_eq!(stop.location(), GeoLocation::new_unchecked(-21.45, 47.08));
    }
}
