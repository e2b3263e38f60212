//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod account_port;
mod driver_port;
mod location_port;
mod positions_port;
mod trip_port;

#[cfg(test)]
pub use account_port::MockAccountPort;
pub use account_port::{AccountPort, NewAccount};
#[cfg(test)]
pub use driver_port::MockDriverPort;
pub use driver_port::DriverPort;
#[cfg(test)]
pub use location_port::MockLocationProvider;
pub use location_port::{LocationProvider, LocationSubscription, PermissionStatus, WatchOptions};
#[cfg(test)]
pub use positions_port::MockPositionsPort;
pub use positions_port::PositionsPort;
#[cfg(test)]
pub use trip_port::MockTripPort;
pub use trip_port::TripPort;
