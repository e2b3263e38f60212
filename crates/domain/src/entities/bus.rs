//! Bus entities returned by the trip search and driver endpoints

use serde::{Deserialize, Serialize};

use crate::value_objects::BusId;

/// Label used when the backend leaves a field out
pub const UNKNOWN_LABEL: &str = "Inconnu";

/// Format a line as "primus - terminus", filling gaps with [`UNKNOWN_LABEL`]
#[must_use]
pub fn route_label(primus: Option<&str>, terminus: Option<&str>) -> String {
    format!(
        "{} - {}",
        primus.unwrap_or(UNKNOWN_LABEL),
        terminus.unwrap_or(UNKNOWN_LABEL)
    )
}

/// A bus serving both ends of a searched trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusCandidate {
    /// Identifier used to enroll on the bus
    pub bus_id: BusId,
    /// Registration plate
    pub plate: String,
    /// Line description
    pub route_label: String,
    /// Fare in Ariary
    pub fare: Option<u32>,
    /// Line number, e.g. "40"
    pub bus_type: String,
}

/// The bus assigned to a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedBus {
    /// Registration plate
    pub plate: String,
    /// First stop of the line
    pub primus: String,
    /// Last stop of the line
    pub terminus: String,
    /// Line number
    pub bus_type: String,
}

impl AssignedBus {
    /// Line description
    #[must_use]
    pub fn route_label(&self) -> String {
        route_label(Some(&self.primus), Some(&self.terminus))
    }
}
