//! Viewport controller
//!
//! Keeps the visible map region inside the service area. Drags that would
//! move the center out of the bounding box are silently undone.

use std::time::Duration;

use domain::{BoundingBox, GeoLocation, Region};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApplicationError;

/// Map behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    /// Area the viewport center must stay in
    #[serde(default)]
    pub bounds: BoundingBox,

    /// Center of the initial region
    #[serde(default = "default_initial_center")]
    pub initial_center: GeoLocation,

    /// Span of the initial region in degrees
    #[serde(default = "default_initial_span")]
    pub initial_span: f64,

    /// Span used when focusing on a marker
    #[serde(default = "default_focus_span")]
    pub focus_span: f64,

    /// Radius of the nearby-positions query in kilometers
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Seconds between two poll ticks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

const fn default_initial_center() -> GeoLocation {
    GeoLocation::fianarantsoa()
}

const fn default_initial_span() -> f64 {
    0.05
}

const fn default_focus_span() -> f64 {
    0.01
}

const fn default_radius_km() -> f64 {
    3.0
}

const fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::default(),
            initial_center: default_initial_center(),
            initial_span: default_initial_span(),
            focus_span: default_focus_span(),
            radius_km: default_radius_km(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl MapSettings {
    /// Region shown before any interaction
    #[must_use]
    pub const fn initial_region(&self) -> Region {
        Region::centered_on(self.initial_center, self.initial_span)
    }

    /// Interval between poll ticks
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate the settings
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are malformed, the initial center is
    /// outside them, or a span/radius/interval is not positive.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.bounds.validate()?;

        if !self.bounds.contains_location(&self.initial_center) {
            return Err(ApplicationError::Configuration(
                "initial_center must lie inside bounds".to_string(),
            ));
        }
        if self.initial_span <= 0.0 || self.focus_span <= 0.0 {
            return Err(ApplicationError::Configuration(
                "map spans must be greater than 0".to_string(),
            ));
        }
        if self.radius_km <= 0.0 {
            return Err(ApplicationError::Configuration(
                "radius_km must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ApplicationError::Configuration(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Owns the accepted map region
#[derive(Debug, Clone)]
pub struct ViewportController {
    bounds: BoundingBox,
    initial: Region,
    focus_span: f64,
    accepted: Region,
}

impl ViewportController {
    /// Create a controller showing the initial region
    #[must_use]
    pub const fn new(settings: &MapSettings) -> Self {
        let initial = settings.initial_region();
        Self {
            bounds: settings.bounds,
            initial,
            focus_span: settings.focus_span,
            accepted: initial,
        }
    }

    /// Offer a region produced by a user gesture
    ///
    /// Returns the candidate when its center is strictly inside the bounds,
    /// otherwise the previously accepted region, unchanged.
    pub fn propose_region(&mut self, candidate: Region) -> Region {
        if candidate.is_within(&self.bounds) {
            self.accepted = candidate;
        } else {
            debug!(
                latitude = candidate.center_latitude,
                longitude = candidate.center_longitude,
                "Region outside service area, keeping previous"
            );
        }
        self.accepted
    }

    /// Zoom onto a point, skipping the bounds check
    pub fn focus(&mut self, latitude: f64, longitude: f64) -> Region {
        self.accepted = Region::new(latitude, longitude, self.focus_span, self.focus_span);
        self.accepted
    }

    /// The accepted region
    #[must_use]
    pub const fn current(&self) -> Region {
        self.accepted
    }

    /// Go back to the initial region
    pub fn reset(&mut self) -> Region {
        self.accepted = self.initial;
        self.accepted
    }

    /// The service area
    #[must_use]
    pub const fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn controller() -> ViewportController {
        ViewportController::new(&MapSettings::default())
    }

    #[test]
    fn starts_on_initial_region() {
        let viewport = controller();
        assert_eq!(viewport.current(), MapSettings::default().initial_region());
    }

    #[test]
    fn accepts_region_inside_bounds() {
        let mut viewport = controller();
        let candidate = Region::new(-21.46, 47.10, 0.02, 0.02);
        assert_eq!(viewport.propose_region(candidate), candidate);
        assert_eq!(viewport.current(), candidate);
    }

    #[test]
    fn rejects_region_outside_bounds() {
        let mut viewport = controller();
        let inside = Region::new(-21.46, 47.10, 0.02, 0.02);
        viewport.propose_region(inside);

        let outside = Region::new(-21.60, 47.10, 0.02, 0.02);
        assert_eq!(viewport.propose_region(outside), inside);
        assert_eq!(viewport.current(), inside);
    }

    #[test]
    fn rejects_region_centered_on_edge() {
        let mut viewport = controller();
        let before = viewport.current();
        let edge = Region::new(-21.40, 47.10, 0.02, 0.02);
        assert_eq!(viewport.propose_region(edge), before);
    }

    #[test]
    fn focus_bypasses_bounds_and_uses_tight_span() {
        let mut viewport = controller();
        let focused = viewport.focus(-18.9, 47.5);
        assert!((focused.center_latitude + 18.9).abs() < f64::EPSILON);
        assert!((focused.latitude_span - 0.01).abs() < f64::EPSILON);
        assert_eq!(viewport.current(), focused);
    }

    #[test]
    fn reset_restores_initial_region() {
        let mut viewport = controller();
        viewport.focus(-21.45, 47.09);
        assert_eq!(viewport.reset(), MapSettings::default().initial_region());
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(MapSettings::default().validate().is_ok());
    }

    #[test]
    fn settings_reject_center_outside_bounds() {
        let settings = MapSettings {
            initial_center: GeoLocation::new_unchecked(-18.9, 47.5),
            ..MapSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn settings_reject_zero_interval() {
        let settings = MapSettings {
            poll_interval_secs: 0,
            ..MapSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: MapSettings = serde_json::from_str(r#"{ "radius_km": 5.0 }"#).unwrap();
        assert!((settings.radius_km - 5.0).abs() < f64::EPSILON);
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.bounds, BoundingBox::fianarantsoa());
    }

    proptest! {
        #[test]
        fn out_of_bounds_candidates_leave_region_unchanged(
            lat in prop_oneof![-90.0f64..=-21.50f64, -21.40f64..=90.0f64],
            lon in -180.0f64..=180.0f64,
            span in 0.001f64..1.0f64,
            prior_lat in -21.49f64..-21.41f64,
            prior_lon in 47.05f64..47.12f64
        ) {
            let mut viewport = controller();
            let prior = Region::new(prior_lat, prior_lon, 0.05, 0.05);
            prop_assert_eq!(viewport.propose_region(prior), prior);

            let result = viewport.propose_region(Region::new(lat, lon, span, span));
            prop_assert_eq!(result, prior);
            prop_assert_eq!(viewport.current(), prior);
        }
    }
}
