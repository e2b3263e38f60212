//! Trip history of the signed-in passenger

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use domain::{HistoryFilter, TripRecord};
use tracing::{debug, error, instrument};

use crate::error::ApplicationError;
use crate::ports::TripPort;
use crate::session::SessionContext;

/// Loads and filters past trips
pub struct HistoryService {
    trips: Arc<dyn TripPort>,
    session: SessionContext,
    timezone: Tz,
}

impl std::fmt::Debug for HistoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryService")
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl HistoryService {
    /// `timezone` decides where weeks and months begin
    pub fn new(trips: Arc<dyn TripPort>, session: SessionContext, timezone: Tz) -> Self {
        Self {
            trips,
            session,
            timezone,
        }
    }

    /// Fetch the trips of the signed-in passenger
    ///
    /// A backend failure is logged and yields an empty list.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` when nobody is signed in.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<TripRecord>, ApplicationError> {
        let user = self.session.require()?;
        match self.trips.trip_history(user.id).await {
            Ok(records) => {
                debug!(count = records.len(), "Trip history loaded");
                Ok(records)
            },
            Err(e) => {
                error!(error = %e, user_id = %user.id, "Could not load trip history");
                Ok(Vec::new())
            },
        }
    }

    /// Keep the records matching `search` and falling in `filter`'s period
    #[must_use]
    pub fn filter<'a>(
        &self,
        records: &'a [TripRecord],
        search: &str,
        filter: HistoryFilter,
        now: DateTime<Utc>,
    ) -> Vec<&'a TripRecord> {
        filter.apply(records, search, now, self.timezone)
    }

    /// Timezone used for period boundaries
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }
}
