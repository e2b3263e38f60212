//! Live positions port
//!
//! Defines how the poller fetches the vehicles and stops around a point.

use async_trait::async_trait;
use domain::{GeoLocation, PositionSnapshot};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the nearby-positions query
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PositionsPort: Send + Sync {
    /// Fetch every vehicle and stop within `radius_km` of `center`
    async fn nearby_positions(
        &self,
        center: &GeoLocation,
        radius_km: f64,
    ) -> Result<PositionSnapshot, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn PositionsPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn PositionsPort>();
    }
}
