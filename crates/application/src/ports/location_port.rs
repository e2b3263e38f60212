//! Device location port
//!
//! Abstracts the platform location service: a foreground permission prompt
//! and a subscription that delivers position fixes.

use std::time::Duration;

use async_trait::async_trait;
use domain::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ApplicationError;

/// Answer to a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// The user allowed location access
    Granted,
    /// The user refused location access
    Denied,
}

impl PermissionStatus {
    /// Whether access was allowed
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// When the provider should deliver a new fix
///
/// A fix is delivered once the device moved `distance_interval_m` meters or
/// `time_interval` elapsed since the last delivered fix, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Maximum time between two fixes
    pub time_interval: Duration,
    /// Minimum movement that triggers a fix
    pub distance_interval_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            time_interval: Duration::from_secs(5),
            distance_interval_m: 30.0,
        }
    }
}

/// A live stream of position fixes
///
/// Dropping the subscription closes the channel, which tells the provider to
/// stop watching.
#[derive(Debug)]
pub struct LocationSubscription {
    receiver: mpsc::Receiver<GeoLocation>,
}

impl LocationSubscription {
    /// Wrap the receiving end of a provider channel
    #[must_use]
    pub const fn new(receiver: mpsc::Receiver<GeoLocation>) -> Self {
        Self { receiver }
    }

    /// Next fix, `None` once the provider stopped
    pub async fn next(&mut self) -> Option<GeoLocation> {
        self.receiver.recv().await
    }
}

/// Port for the device location service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Ask for foreground location access
    async fn request_foreground_permission(&self) -> Result<PermissionStatus, ApplicationError>;

    /// Start delivering fixes according to `options`
    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<LocationSubscription, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_watch_options() {
        let options = WatchOptions::default();
        assert_eq!(options.time_interval, Duration::from_secs(5));
        assert!((options.distance_interval_m - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn subscription_ends_when_provider_drops_sender() {
        let (tx, rx) = mpsc::channel(4);
        let mut subscription = LocationSubscription::new(rx);
        tx.send(GeoLocation::fianarantsoa()).await.unwrap();
        drop(tx);
        assert_eq!(subscription.next().await, Some(GeoLocation::fianarantsoa()));
        assert_eq!(subscription.next().await, None);
    }
}
