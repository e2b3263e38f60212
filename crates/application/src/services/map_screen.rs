//! Map screen composition
//!
//! Wires the viewport, the marker overlay and the destination picker
//! together, and publishes the accepted region for the poller.

use domain::{PositionSnapshot, Region};
use tokio::sync::watch;

use super::destination_picker::DestinationPicker;
use super::markers::{Marker, MarkerSelection, render_markers};
use super::viewport::{MapSettings, ViewportController};

/// State behind the main map screen
#[derive(Debug)]
pub struct MapScreen {
    viewport: ViewportController,
    selection: MarkerSelection,
    picker: DestinationPicker,
    regions: watch::Sender<Region>,
    markers: Vec<Marker>,
    degraded: bool,
}

impl MapScreen {
    pub fn new(settings: &MapSettings, picker: DestinationPicker) -> Self {
        let viewport = ViewportController::new(settings);
        let (regions, _) = watch::channel(viewport.current());
        Self {
            viewport,
            selection: MarkerSelection::new(),
            picker,
            regions,
            markers: Vec::new(),
            degraded: false,
        }
    }

    /// Receiver of accepted regions, to feed the poller
    #[must_use]
    pub fn region_updates(&self) -> watch::Receiver<Region> {
        self.regions.subscribe()
    }

    fn publish(&self, region: Region) {
        self.regions.send_if_modified(|current| {
            if *current == region {
                false
            } else {
                *current = region;
                true
            }
        });
    }

    /// The user dragged or zoomed the map
    pub fn handle_region_change(&mut self, candidate: Region) -> Region {
        let accepted = self.viewport.propose_region(candidate);
        self.publish(accepted);
        accepted
    }

    /// Replace the pins with a fresh snapshot
    pub fn apply_snapshot(&mut self, snapshot: &PositionSnapshot) {
        self.markers = render_markers(snapshot);
        self.degraded = snapshot.degraded;
    }

    /// The user tapped a pin; returns the focused region
    pub fn handle_marker_tap(&mut self, key: &str) -> Option<Region> {
        let marker = self.markers.iter().find(|m| m.key == key)?;
        let target = self.selection.select(marker);
        let region = self.viewport.focus(target.latitude(), target.longitude());
        self.publish(region);
        Some(region)
    }

    /// The user tapped the map background
    pub fn handle_map_tap(&mut self) {
        self.selection.clear();
        self.picker.close();
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// The last snapshot came from a failed request
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    #[must_use]
    pub const fn selection(&self) -> &MarkerSelection {
        &self.selection
    }

    #[must_use]
    pub const fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    #[must_use]
    pub const fn picker(&self) -> &DestinationPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut DestinationPicker {
        &mut self.picker
    }
}
