//! Map markers and marker selection

use domain::{GeoLocation, PositionSnapshot, StopPosition, VehiclePosition};
use serde::Serialize;

/// What a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// A bus reporting its position
    Vehicle,
    /// A bus stop
    Stop,
}

impl MarkerKind {
    /// Pin color
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Vehicle => "green",
            Self::Stop => "blue",
        }
    }
}

/// The entity behind a marker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MarkerPayload {
    Vehicle(VehiclePosition),
    Stop(StopPosition),
}

impl MarkerPayload {
    /// Where the entity is
    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        match self {
            Self::Vehicle(v) => v.location(),
            Self::Stop(s) => s.location(),
        }
    }
}

/// The entity behind the tapped marker
pub type SelectedMarker = MarkerPayload;

/// A pin on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Stable key within one snapshot (`bus-{i}` / `arret-{i}`)
    pub key: String,
    pub kind: MarkerKind,
    pub location: GeoLocation,
    /// Callout title
    pub title: String,
    pub payload: MarkerPayload,
}

/// Turn a snapshot into map pins, vehicles first
#[must_use]
pub fn render_markers(snapshot: &PositionSnapshot) -> Vec<Marker> {
    let vehicles = snapshot.vehicles.iter().enumerate().map(|(i, v)| Marker {
        key: format!("bus-{i}"),
        kind: MarkerKind::Vehicle,
        location: v.location(),
        title: format!("Bus: {}", v.driver_name),
        payload: MarkerPayload::Vehicle(v.clone()),
    });
    let stops = snapshot.stops.iter().enumerate().map(|(i, s)| Marker {
        key: format!("arret-{i}"),
        kind: MarkerKind::Stop,
        location: s.location(),
        title: format!("Arrêt: {}", s.name),
        payload: MarkerPayload::Stop(s.clone()),
    });
    vehicles.chain(stops).collect()
}

fn format_distance(distance_km: Option<f64>) -> String {
    distance_km.map_or_else(|| "Distance: inconnue".to_string(), |d| format!("Distance: {d:.2} km"))
}

/// The marker whose details are shown in the overlay
#[derive(Debug, Clone, Default)]
pub struct MarkerSelection {
    selected: Option<SelectedMarker>,
}

impl MarkerSelection {
    /// Create an empty selection
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Select a marker; returns the point the viewport should focus on
    pub fn select(&mut self, marker: &Marker) -> GeoLocation {
        self.selected = Some(marker.payload.clone());
        marker.location
    }

    /// Hide the overlay
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// The selected entity
    #[must_use]
    pub const fn selected(&self) -> Option<&SelectedMarker> {
        self.selected.as_ref()
    }

    /// Overlay text for the selected entity, empty when nothing is selected
    #[must_use]
    pub fn info_lines(&self) -> Vec<String> {
        match &self.selected {
            None => Vec::new(),
            Some(MarkerPayload::Vehicle(v)) => {
                let fare = v
                    .fare
                    .map_or_else(|| "Frais: inconnu".to_string(), |f| format!("Frais: {f} Ar"));
                vec![
                    format!("Chauffeur: {}", v.driver_name),
                    format!("Trajet: {}", v.route_label),
                    format!("Matricule: {}", v.plate),
                    fare,
                    format_distance(v.distance_from_viewer),
                ]
            },
            Some(MarkerPayload::Stop(s)) => {
                vec![format!("Arrêt: {}", s.name), format_distance(s.distance_from_viewer)]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(name: &str) -> VehiclePosition {
        VehiclePosition {
            bus_id: None,
            latitude: -21.451,
            longitude: 47.088,
            driver_name: name.to_string(),
            route_label: "Anosy - Ankofafa".to_string(),
            plate: "1234 TBA".to_string(),
            fare: Some(600),
            distance_from_viewer: Some(0.257),
        }
    }

    fn stop(name: &str) -> StopPosition {
        StopPosition {
            latitude: -21.455,
            longitude: 47.091,
            name: name.to_string(),
            distance_from_viewer: None,
        }
    }

    #[test]
    fn empty_snapshot_renders_nothing() {
        assert!(render_markers(&PositionSnapshot::empty()).is_empty());
        assert!(render_markers(&PositionSnapshot::degraded()).is_empty());
    }

    #[test]
    fn one_marker_per_entity() {
        let snapshot = PositionSnapshot::new(
            vec![vehicle("Jean"), vehicle("Paul")],
            vec![stop("Anjoma")],
        );
        let markers = render_markers(&snapshot);

        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].key, "bus-0");
        assert_eq!(markers[1].key, "bus-1");
        assert_eq!(markers[2].key, "arret-0");
        assert_eq!(markers[0].title, "Bus: Jean");
        assert_eq!(markers[2].title, "Arrêt: Anjoma");
        assert_eq!(markers[0].kind.color(), "green");
        assert_eq!(markers[2].kind.color(), "blue");
    }

    #[test]
    fn selecting_returns_focus_target() {
        let markers = render_markers(&PositionSnapshot::new(vec![vehicle("Jean")], vec![]));
        let mut selection = MarkerSelection::new();

        let target = selection.select(&markers[0]);
        assert_eq!(target, GeoLocation::new_unchecked(-21.451, 47.088));
        assert!(matches!(selection.selected(), Some(MarkerPayload::Vehicle(_))));

        selection.clear();
        assert!(selection.selected().is_none());
        assert!(selection.info_lines().is_empty());
    }

    #[test]
    fn vehicle_info_lines() {
        let markers = render_markers(&PositionSnapshot::new(vec![vehicle("Jean")], vec![]));
        let mut selection = MarkerSelection::new();
        selection.select(&markers[0]);

        assert_eq!(
            selection.info_lines(),
            vec![
                "Chauffeur: Jean",
                "Trajet: Anosy - Ankofafa",
                "Matricule: 1234 TBA",
                "Frais: 600 Ar",
                "Distance: 0.26 km",
            ]
        );
    }

    #[test]
    fn stop_info_lines_without_distance() {
        let markers = render_markers(&PositionSnapshot::new(vec![], vec![stop("Anjoma")]));
        let mut selection = MarkerSelection::new();
        selection.select(&markers[0]);

        assert_eq!(
            selection.info_lines(),
            vec!["Arrêt: Anjoma", "Distance: inconnue"]
        );
    }
}
