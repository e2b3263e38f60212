//! Live position poller
//!
//! Periodically asks the backend for the vehicles and stops around the
//! viewport center. A tick is skipped while the previous one is still in
//! flight, so a slow backend never piles up requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use domain::{GeoLocation, PositionSnapshot, Region};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use crate::ports::PositionsPort;

/// Clears the busy flag when the tick finishes, however it finishes
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fetches position snapshots, one request at a time
#[derive(Clone)]
pub struct PositionPoller {
    port: Arc<dyn PositionsPort>,
    busy: Arc<AtomicBool>,
}

impl std::fmt::Debug for PositionPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionPoller")
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl PositionPoller {
    /// Create a poller over the given port
    pub fn new(port: Arc<dyn PositionsPort>) -> Self {
        Self {
            port,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a tick is currently waiting on the backend
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.busy)))
    }

    /// Run one poll
    ///
    /// Returns `None` without touching the network when a previous tick has
    /// not completed. A failed request yields an empty snapshot flagged as
    /// degraded.
    #[instrument(skip(self), fields(lat = center.latitude(), lon = center.longitude()))]
    pub async fn tick(&self, center: &GeoLocation, radius_km: f64) -> Option<PositionSnapshot> {
        let Some(_guard) = self.try_acquire() else {
            debug!("Previous tick still in flight, skipping");
            return None;
        };

        match self.port.nearby_positions(center, radius_km).await {
            Ok(snapshot) => {
                debug!(
                    vehicles = snapshot.vehicles.len(),
                    stops = snapshot.stops.len(),
                    "Positions refreshed"
                );
                Some(snapshot)
            },
            Err(e) => {
                warn!(error = %e, "Position request failed, showing empty map");
                Some(PositionSnapshot::degraded())
            },
        }
    }

    /// Start polling in the background
    ///
    /// The first tick fires immediately, then one every `interval`. The
    /// center is read from `centers` at each tick. Dropping the returned
    /// handle stops the loop and any tick still running.
    pub fn spawn(
        &self,
        interval: Duration,
        radius_km: f64,
        centers: watch::Receiver<Region>,
    ) -> PollerHandle {
        let (tx, rx) = watch::channel(PositionSnapshot::empty());
        let tx = Arc::new(tx);
        let poller = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let center = centers.borrow().center();
                        let poller = poller.clone();
                        let tx = Arc::clone(&tx);
                        ticks.spawn(async move {
                            if let Some(snapshot) = poller.tick(&center, radius_km).await {
                                tx.send_replace(snapshot);
                            }
                        });
                    }
                    Some(result) = ticks.join_next(), if !ticks.is_empty() => {
                        if let Err(e) = result {
                            warn!(error = %e, "Poll tick task failed");
                        }
                    }
                }
            }
        });

        PollerHandle {
            task,
            snapshots: rx,
        }
    }
}

/// Owner of a running poll loop
///
/// The loop is aborted when the handle is dropped.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
    snapshots: watch::Receiver<PositionSnapshot>,
}

impl PollerHandle {
    /// A receiver notified on every published snapshot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PositionSnapshot> {
        self.snapshots.clone()
    }

    /// The most recent snapshot
    #[must_use]
    pub fn latest(&self) -> PositionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop polling now
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
