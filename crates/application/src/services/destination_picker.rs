//! Destination picker
//!
//! A slide-up panel where the passenger types an origin and a destination,
//! picks one of the matching buses, and gets enrolled on it.
//!
//! ```text
//! Hidden -> Visible -> Searching -> Results -> Enrolling -> Hidden
//!                                                 |
//!                                                 v
//!                                            EnrollFailed -> (retry once) | Visible
//! ```

use std::sync::Arc;
use std::time::Duration;

use domain::{BusCandidate, TripSearchQuery};
use tracing::{info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::TripPort;
use crate::session::SessionContext;

/// Distance the panel travels, in pixels
pub const SLIDE_DISTANCE_PX: f64 = 300.0;

/// Duration of the slide animation
pub const SLIDE_DURATION: Duration = Duration::from_millis(300);

/// Linear slide between two vertical offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSlide {
    from: f64,
    to: f64,
}

impl PanelSlide {
    /// Panel fully off screen, not moving
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            from: SLIDE_DISTANCE_PX,
            to: SLIDE_DISTANCE_PX,
        }
    }

    /// Start a slide from `from` toward the resting offset for `visible`
    #[must_use]
    pub const fn toward(from: f64, visible: bool) -> Self {
        let to = if visible { 0.0 } else { SLIDE_DISTANCE_PX };
        Self { from, to }
    }

    /// Offset after `elapsed` time, clamped to the end position
    #[must_use]
    pub fn offset_at(&self, elapsed: Duration) -> f64 {
        let progress = (elapsed.as_secs_f64() / SLIDE_DURATION.as_secs_f64()).clamp(0.0, 1.0);
        (self.to - self.from).mul_add(progress, self.from)
    }

    /// Where the slide ends
    #[must_use]
    pub const fn target(&self) -> f64 {
        self.to
    }
}

/// Current step of the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerState {
    Hidden,
    Visible,
    Searching,
    Results(Vec<BusCandidate>),
    Enrolling(BusCandidate),
    EnrollFailed {
        candidate: BusCandidate,
        retry_available: bool,
    },
}

impl PickerState {
    /// Whether the panel is on screen
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// A dismissible message shown over the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// The failed action can be attempted once more
    pub retry_available: bool,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry_available: false,
        }
    }
}

/// Drives the search and enroll flow
pub struct DestinationPicker {
    trips: Arc<dyn TripPort>,
    session: SessionContext,
    state: PickerState,
    notice: Option<Notice>,
    slide: PanelSlide,
}

impl std::fmt::Debug for DestinationPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationPicker")
            .field("state", &self.state)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

impl DestinationPicker {
    /// Create a hidden picker
    pub fn new(trips: Arc<dyn TripPort>, session: SessionContext) -> Self {
        Self {
            trips,
            session,
            state: PickerState::Hidden,
            notice: None,
            slide: PanelSlide::hidden(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &PickerState {
        &self.state
    }

    /// Pending notice, if any
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Slide animation for the latest visibility change
    #[must_use]
    pub const fn slide(&self) -> PanelSlide {
        self.slide
    }

    /// Slide the panel in
    pub fn open(&mut self) {
        if !self.state.is_visible() {
            self.slide = PanelSlide::toward(self.slide.target(), true);
            self.state = PickerState::Visible;
        }
    }

    /// Slide the panel out, dropping any results
    pub fn close(&mut self) {
        if self.state.is_visible() {
            self.slide = PanelSlide::toward(self.slide.target(), false);
            self.state = PickerState::Hidden;
        }
    }

    /// Hide the notice
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Look up buses serving both places
    ///
    /// Opens the panel if needed. No match, blank input or a backend
    /// failure posts a notice and leaves the panel in `Visible`.
    #[instrument(skip(self))]
    pub async fn search(&mut self, origin: &str, destination: &str) -> &PickerState {
        self.open();
        self.notice = None;

        let query = match TripSearchQuery::new(origin, destination) {
            Ok(query) => query,
            Err(e) => {
                self.notice = Some(Notice::info(format!("Recherche invalide: {e}")));
                self.state = PickerState::Visible;
                return &self.state;
            },
        };

        self.state = PickerState::Searching;
        match self.trips.search_buses(&query).await {
            Ok(candidates) if candidates.is_empty() => {
                self.notice = Some(Notice::info("Aucun bus ne dessert ce trajet"));
                self.state = PickerState::Visible;
            },
            Ok(candidates) => {
                info!(count = candidates.len(), "Matching buses found");
                self.state = PickerState::Results(candidates);
            },
            Err(e) => {
                warn!(error = %e, "Bus search failed");
                self.notice = Some(Notice::info("La recherche a échoué"));
                self.state = PickerState::Visible;
            },
        }
        &self.state
    }

    /// Enroll on the candidate at `index` of the current results
    ///
    /// # Errors
    ///
    /// `InvalidInput` when there are no results or the index is out of range,
    /// `NotAuthorized` when nobody is signed in. Backend failures are not
    /// errors: they move the picker to `EnrollFailed`.
    pub async fn choose(&mut self, index: usize) -> Result<&PickerState, ApplicationError> {
        let PickerState::Results(candidates) = &self.state else {
            return Err(ApplicationError::InvalidInput(
                "no search results to choose from".to_string(),
            ));
        };
        let candidate = candidates.get(index).cloned().ok_or_else(|| {
            ApplicationError::InvalidInput(format!("no result at position {index}"))
        })?;

        self.enroll(candidate, true).await?;
        Ok(&self.state)
    }

    /// Try the failed enroll call one more time
    ///
    /// # Errors
    ///
    /// `InvalidInput` unless the picker is in `EnrollFailed` with a retry
    /// still available.
    pub async fn retry_enroll(&mut self) -> Result<&PickerState, ApplicationError> {
        let PickerState::EnrollFailed {
            candidate,
            retry_available: true,
        } = &self.state
        else {
            return Err(ApplicationError::InvalidInput(
                "no enrollment to retry".to_string(),
            ));
        };
        let candidate = candidate.clone();

        self.enroll(candidate, false).await?;
        Ok(&self.state)
    }

    /// Give up on a failed enroll and go back to the search form
    pub fn cancel_enroll(&mut self) {
        if matches!(self.state, PickerState::EnrollFailed { .. }) {
            self.notice = None;
            self.state = PickerState::Visible;
        }
    }

    #[instrument(skip(self, candidate), fields(bus_id = %candidate.bus_id))]
    async fn enroll(
        &mut self,
        candidate: BusCandidate,
        allow_retry: bool,
    ) -> Result<(), ApplicationError> {
        let user = self.session.require()?;
        self.notice = None;
        self.state = PickerState::Enrolling(candidate.clone());

        match self.trips.enroll(candidate.bus_id, user.id).await {
            Ok(()) => {
                info!(user_id = %user.id, "Passenger enrolled");
                self.notice = Some(Notice::info(format!(
                    "Vous êtes inscrit sur le bus {}",
                    candidate.plate
                )));
                self.close();
            },
            Err(e) => {
                warn!(error = %e, "Enrollment failed");
                self.notice = Some(Notice {
                    message: "L'inscription a échoué".to_string(),
                    retry_available: allow_retry,
                });
                self.state = PickerState::EnrollFailed {
                    candidate,
                    retry_available: allow_retry,
                };
            },
        }
        Ok(())
    }
}
