//! Geographic bounding box for the service area

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::GeoLocation;

/// Axis-aligned latitude/longitude box
///
/// Containment is strict: a point lying exactly on an edge is outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge in degrees
    pub min_latitude: f64,
    /// Northern edge in degrees
    pub max_latitude: f64,
    /// Western edge in degrees
    pub min_longitude: f64,
    /// Eastern edge in degrees
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Create a bounding box, checking that the edges are ordered
    ///
    /// # Errors
    ///
    /// Returns a validation error if a minimum is not below its maximum.
    pub fn new(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Result<Self, DomainError> {
        let bbox = Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check that the edges are ordered and within coordinate ranges
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first broken constraint.
    pub fn validate(&self) -> Result<(), DomainError> {
        GeoLocation::new(self.min_latitude, self.min_longitude)?;
        GeoLocation::new(self.max_latitude, self.max_longitude)?;
        if self.min_latitude >= self.max_latitude {
            return Err(DomainError::validation(
                "bounding box min_latitude must be below max_latitude",
            ));
        }
        if self.min_longitude >= self.max_longitude {
            return Err(DomainError::validation(
                "bounding box min_longitude must be below max_longitude",
            ));
        }
        Ok(())
    }

    /// Whether the point lies strictly inside the box
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude > self.min_latitude
            && latitude < self.max_latitude
            && longitude > self.min_longitude
            && longitude < self.max_longitude
    }

    /// Whether the location lies strictly inside the box
    #[must_use]
    pub fn contains_location(&self, location: &GeoLocation) -> bool {
        self.contains(location.latitude(), location.longitude())
    }

    /// Center of the box
    #[must_use]
    pub fn center(&self) -> GeoLocation {
        GeoLocation::new_unchecked(
            f64::midpoint(self.min_latitude, self.max_latitude),
            f64::midpoint(self.min_longitude, self.max_longitude),
        )
    }

    /// The Fianarantsoa service area
    #[must_use]
    pub const fn fianarantsoa() -> Self {
        Self {
            min_latitude: -21.50,
            max_latitude: -21.40,
            min_longitude: 47.04,
            max_longitude: 47.13,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::fianarantsoa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_city_center() {
        let bbox = BoundingBox::fianarantsoa();
        assert!(bbox.contains_location(&GeoLocation::fianarantsoa()));
    }

    #[test]
    fn edges_are_excluded() {
        let bbox = BoundingBox::fianarantsoa();
        assert!(!bbox.contains(-21.50, 47.08));
        assert!(!bbox.contains(-21.40, 47.08));
        assert!(!bbox.contains(-21.45, 47.04));
        assert!(!bbox.contains(-21.45, 47.13));
    }

    #[test]
    fn outside_points_rejected() {
        let bbox = BoundingBox::fianarantsoa();
        // Antananarivo
        assert!(!bbox.contains(-18.8792, 47.5079));
    }

    #[test]
    fn new_rejects_unordered_edges() {
        assert!(BoundingBox::new(-21.40, -21.50, 47.04, 47.13).is_err());
        assert!(BoundingBox::new(-21.50, -21.40, 47.13, 47.04).is_err());
        assert!(BoundingBox::new(-21.50, -21.40, 47.04, 47.13).is_ok());
    }

    #[test]
    fn new_rejects_invalid_coordinates() {
        assert!(BoundingBox::new(-95.0, -21.40, 47.04, 47.13).is_err());
    }

    #[test]
    fn center_is_midpoint() {
        let center = BoundingBox::fianarantsoa().center();
        assert!((center.latitude() + 21.45).abs() < 1e-9);
        assert!((center.longitude() - 47.085).abs() < 1e-9);
    }
}
