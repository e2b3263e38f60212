//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod betax_adapter;
mod replay_location;

pub use betax_adapter::BetaxAdapter;
pub use replay_location::{RecordedFix, ReplayLocationProvider};
