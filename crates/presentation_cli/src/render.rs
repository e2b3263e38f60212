//! Plain-text rendering of screen state

use application::{Marker, PickerState};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use domain::{AssignedBus, BusCandidate, TripRecord};

fn fare_text(fare: Option<u32>) -> String {
    fare.map_or_else(|| "inconnu".to_string(), |f| format!("{f} Ar"))
}

pub fn marker_line(marker: &Marker) -> String {
    format!(
        "{:<9} {:<5} {} ({:.5}, {:.5})",
        marker.key,
        marker.kind.color(),
        marker.title,
        marker.location.latitude(),
        marker.location.longitude()
    )
}

/// `position` is 1-based, as typed after `--choose`
pub fn candidate_line(position: usize, candidate: &BusCandidate) -> String {
    format!(
        "{position}. {} | {} | {} | ligne {}",
        candidate.plate,
        candidate.route_label,
        fare_text(candidate.fare),
        candidate.bus_type
    )
}

pub fn picker_lines(state: &PickerState) -> Vec<String> {
    match state {
        PickerState::Hidden => Vec::new(),
        PickerState::Visible => vec!["Où allez-vous ?".to_string()],
        PickerState::Searching => vec!["Recherche en cours...".to_string()],
        PickerState::Results(candidates) => candidates
            .iter()
            .enumerate()
            .map(|(i, c)| candidate_line(i + 1, c))
            .collect(),
        PickerState::Enrolling(candidate) => {
            vec![format!("Inscription sur le bus {}...", candidate.plate)]
        },
        PickerState::EnrollFailed {
            candidate,
            retry_available,
        } => {
            let mut lines = vec![format!("Inscription sur le bus {} échouée", candidate.plate)];
            if *retry_available {
                lines.push("Relancez avec --retry pour réessayer".to_string());
            }
            lines
        },
    }
}

/// One history card, dates shown in `tz`
pub fn trip_line(record: &TripRecord, tz: Tz) -> String {
    let distance = record
        .distance_km
        .map_or_else(|| "0".to_string(), |d| format!("{d:.1}"));
    format!(
        "#{} {} | Bus {} | {} | {} | {} Ar | {distance} km",
        record.sequence,
        record.date.with_timezone(&tz).format("%d/%m/%Y %H:%M"),
        record.bus_type,
        record.route_label,
        record.plate,
        record.fare
    )
}

pub fn assigned_bus_lines(bus: &AssignedBus) -> Vec<String> {
    vec![
        format!("Bus: {}", bus.plate),
        format!("Ligne: {}", bus.bus_type),
        format!("Trajet: {}", bus.route_label()),
    ]
}

/// Clock time a shift started, `HH:MM` in `tz`
pub fn shift_start(started_at: DateTime<Utc>, tz: Tz) -> String {
    started_at.with_timezone(&tz).format("%H:%M").to_string()
}
