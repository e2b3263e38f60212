//! Map region value object

use serde::{Deserialize, Serialize};

use crate::value_objects::{BoundingBox, GeoLocation};

/// The visible part of the map: a center and the span in each axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center latitude in degrees
    pub center_latitude: f64,
    /// Center longitude in degrees
    pub center_longitude: f64,
    /// Visible latitude range in degrees
    pub latitude_span: f64,
    /// Visible longitude range in degrees
    pub longitude_span: f64,
}

impl Region {
    /// Create a region from its four components
    #[must_use]
    pub const fn new(
        center_latitude: f64,
        center_longitude: f64,
        latitude_span: f64,
        longitude_span: f64,
    ) -> Self {
        Self {
            center_latitude,
            center_longitude,
            latitude_span,
            longitude_span,
        }
    }

    /// Square region of the given span centered on a location
    #[must_use]
    pub const fn centered_on(center: GeoLocation, span: f64) -> Self {
        Self::new(center.latitude(), center.longitude(), span, span)
    }

    /// Region center
    #[must_use]
    pub const fn center(&self) -> GeoLocation {
        GeoLocation::new_unchecked(self.center_latitude, self.center_longitude)
    }

    /// Whether the region's center lies strictly inside the box
    #[must_use]
    pub fn is_within(&self, bounds: &BoundingBox) -> bool {
        bounds.contains(self.center_latitude, self.center_longitude)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::centered_on(GeoLocation::fianarantsoa(), 0.05)
    }
}
