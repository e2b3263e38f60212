//! Betax backend integration
//!
//! Typed HTTP access to the Betax bus-tracking backend. Every endpoint answers
//! with a JSON envelope `{status, result, description, data}`; the client
//! unwraps it and maps non-200 statuses to [`BetaxError`].
//!
//! # Architecture
//!
//! [`BetaxClient`] defines the operations the app needs and
//! [`HttpBetaxClient`] implements them with `reqwest`. Path parameters are
//! percent-encoded segment by segment, so labels with spaces or slashes and
//! email addresses are sent safely.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_betax::{BetaxClient, BetaxConfig, HttpBetaxClient};
//!
//! let client = HttpBetaxClient::new(&BetaxConfig::default())?;
//! let nearby = client.nearby_positions(-21.45803, 47.10305, 3.0).await?;
//! println!("{} buses", nearby.buses.len());
//! ```

mod client;
mod config;
mod error;
mod models;

pub use client::{BetaxClient, HttpBetaxClient};
pub use config::BetaxConfig;
pub use error::BetaxError;
pub use models::{
    BusPosition, BusStop, DriverBus, Envelope, MatchingBus, NearbyPositions, NewPassenger,
    Passenger, TripBus, TripEntry,
};
