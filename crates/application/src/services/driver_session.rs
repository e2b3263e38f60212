//! Driver on-duty session
//!
//! While on duty, every fix from the device location service is pushed to
//! the backend so passengers see the bus move. Unsent fixes are never
//! buffered: a failed push is logged and the next fix replaces it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{AssignedBus, GeoLocation, UserId};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, instrument};

use crate::error::ApplicationError;
use crate::ports::{DriverPort, LocationProvider, LocationSubscription, WatchOptions};
use crate::session::SessionContext;

/// Whether the driver is sharing their position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DutyStatus {
    #[default]
    OffDuty,
    OnDuty {
        started_at: DateTime<Utc>,
    },
}

impl DutyStatus {
    #[must_use]
    pub const fn is_on_duty(&self) -> bool {
        matches!(self, Self::OnDuty { .. })
    }
}

/// Decides which raw fixes a watcher delivers
///
/// A fix passes when it is the first one, when the device moved at least
/// `distance_interval_m` since the last passed fix, or when `time_interval`
/// elapsed since then.
#[derive(Debug, Clone)]
pub struct ThresholdGate {
    options: WatchOptions,
    last: Option<(GeoLocation, Instant)>,
}

impl ThresholdGate {
    #[must_use]
    pub const fn new(options: WatchOptions) -> Self {
        Self {
            options,
            last: None,
        }
    }

    /// Returns true and remembers the fix if it should be delivered
    pub fn admit(&mut self, fix: GeoLocation, at: Instant) -> bool {
        let pass = self.last.is_none_or(|(previous, since)| {
            previous.distance_m(&fix) >= self.options.distance_interval_m
                || at.saturating_duration_since(since) >= self.options.time_interval
        });
        if pass {
            self.last = Some((fix, at));
        }
        pass
    }
}

/// Toggle between off duty and on duty for the signed-in driver
pub struct DriverSession {
    location: Arc<dyn LocationProvider>,
    driver: Arc<dyn DriverPort>,
    session: SessionContext,
    options: WatchOptions,
    status: DutyStatus,
    forwarder: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for DriverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverSession")
            .field("status", &self.status)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DriverSession {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        driver: Arc<dyn DriverPort>,
        session: SessionContext,
        options: WatchOptions,
    ) -> Self {
        Self {
            location,
            driver,
            session,
            options,
            status: DutyStatus::OffDuty,
            forwarder: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> DutyStatus {
        self.status
    }

    #[must_use]
    pub const fn is_on_duty(&self) -> bool {
        self.status.is_on_duty()
    }

    /// Flip the duty status
    ///
    /// Going on duty asks for location permission first. A refusal leaves
    /// the session off duty without an error and without a subscription.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` when no driver is signed in, or any error from the
    /// location service other than a refused permission.
    #[instrument(skip(self))]
    pub async fn toggle(&mut self) -> Result<DutyStatus, ApplicationError> {
        if self.is_on_duty() {
            self.stop();
        } else {
            self.start().await?;
        }
        Ok(self.status)
    }

    async fn start(&mut self) -> Result<(), ApplicationError> {
        let driver_id = self.session.require()?.id;

        let granted = match self.location.request_foreground_permission().await {
            Ok(status) => status.is_granted(),
            Err(ApplicationError::PermissionDenied(_)) => false,
            Err(e) => return Err(e),
        };
        if !granted {
            info!("Location permission denied, staying off duty");
            return Ok(());
        }

        let subscription = self.location.watch_position(self.options).await?;
        let driver = Arc::clone(&self.driver);
        self.forwarder = Some(tokio::spawn(forward_fixes(
            subscription,
            driver,
            driver_id,
        )));
        self.status = DutyStatus::OnDuty {
            started_at: Utc::now(),
        };
        info!(driver_id = %driver_id, "Driver on duty");
        Ok(())
    }

    /// Stop sharing the position and release the subscription
    pub fn stop(&mut self) {
        if let Some(task) = self.forwarder.take() {
            task.abort();
        }
        if self.status.is_on_duty() {
            info!("Driver off duty");
        }
        self.status = DutyStatus::OffDuty;
    }

    /// The bus assigned to the signed-in driver
    pub async fn assigned_bus(&self) -> Result<Option<AssignedBus>, ApplicationError> {
        let driver_id = self.session.require()?.id;
        self.driver.assigned_bus(driver_id).await
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        if let Some(task) = self.forwarder.take() {
            task.abort();
        }
    }
}

async fn forward_fixes(
    mut subscription: LocationSubscription,
    driver: Arc<dyn DriverPort>,
    driver_id: UserId,
) {
    while let Some(fix) = subscription.next().await {
        if let Err(e) = driver.push_position(driver_id, &fix).await {
            error!(error = %e, %fix, "Position push failed, dropping fix");
        }
    }
    info!("Location updates ended");
}
