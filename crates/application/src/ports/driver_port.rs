//! Driver port
//!
//! Position pushes while on duty and the bus assigned to a driver.

use async_trait::async_trait;
use domain::{AssignedBus, GeoLocation, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for driver operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DriverPort: Send + Sync {
    /// Report the driver's current position
    async fn push_position(
        &self,
        driver_id: UserId,
        location: &GeoLocation,
    ) -> Result<(), ApplicationError>;

    /// The bus assigned to the driver, if any
    async fn assigned_bus(&self, driver_id: UserId)
    -> Result<Option<AssignedBus>, ApplicationError>;
}
