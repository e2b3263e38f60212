//! Application layer - Use cases and orchestration
//!
//! Contains the client-side state machines (viewport, poller, picker, driver
//! session) and the port definitions the infrastructure layer implements.

pub mod error;
pub mod ports;
pub mod services;
pub mod session;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
pub use session::SessionContext;
