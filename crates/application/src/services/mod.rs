//! Application services - client-side use cases and state machines

mod account_service;
mod destination_picker;
mod driver_session;
mod history_service;
mod map_screen;
mod markers;
mod position_poller;
mod viewport;

pub use account_service::{AccountService, MIN_PASSWORD_LEN, SignUpForm};
pub use destination_picker::{
    DestinationPicker, Notice, PanelSlide, PickerState, SLIDE_DISTANCE_PX, SLIDE_DURATION,
};
pub use driver_session::{DriverSession, DutyStatus, ThresholdGate};
pub use history_service::HistoryService;
pub use map_screen::MapScreen;
pub use markers::{
    Marker, MarkerKind, MarkerPayload, MarkerSelection, SelectedMarker, render_markers,
};
pub use position_poller::{PollerHandle, PositionPoller};
pub use viewport::{MapSettings, ViewportController};
