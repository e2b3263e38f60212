//! Trip port
//!
//! Matching buses for a trip, enrolling a passenger, and trip history.

use async_trait::async_trait;
use domain::{BusCandidate, BusId, TripRecord, TripSearchQuery, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for passenger trip operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TripPort: Send + Sync {
    /// Buses serving both the origin and the destination
    async fn search_buses(
        &self,
        query: &TripSearchQuery,
    ) -> Result<Vec<BusCandidate>, ApplicationError>;

    /// Record that the passenger boards the bus
    async fn enroll(&self, bus_id: BusId, passenger_id: UserId) -> Result<(), ApplicationError>;

    /// Past trips of a passenger, most recent first as returned by the backend
    async fn trip_history(&self, passenger_id: UserId)
    -> Result<Vec<TripRecord>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn TripPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn TripPort>();
    }
}
