//! Domain entities - Objects with identity and lifecycle

mod bus;
mod history_filter;
mod positions;
mod session_user;
mod trip;

pub use bus::{AssignedBus, BusCandidate, UNKNOWN_LABEL, route_label};
pub use history_filter::HistoryFilter;
pub use positions::{PositionSnapshot, StopPosition, VehiclePosition};
pub use session_user::SessionUser;
pub use trip::{TripRecord, TripSearchQuery};
