//! Replay location provider - Implements LocationProvider from recorded fixes
//!
//! Reads a track of `latitude,longitude[,seconds]` lines and plays it back
//! on the tokio clock. The seconds column is the offset from the start of
//! the replay; when omitted the fix comes one second after the previous one.
//! Blank lines and lines starting with `#` are ignored.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::{LocationProvider, LocationSubscription, PermissionStatus, WatchOptions};
use application::services::ThresholdGate;
use async_trait::async_trait;
use domain::GeoLocation;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, trace};

const CHANNEL_CAPACITY: usize = 16;
const DEFAULT_STEP: Duration = Duration::from_secs(1);

/// A fix and its offset from the start of the replay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedFix {
    pub offset: Duration,
    pub location: GeoLocation,
}

/// Location provider that plays back a recorded track
#[derive(Debug, Clone)]
pub struct ReplayLocationProvider {
    fixes: Arc<[RecordedFix]>,
    permission: PermissionStatus,
}

impl ReplayLocationProvider {
    /// Create a provider over already parsed fixes
    pub fn new(fixes: Vec<RecordedFix>) -> Self {
        Self {
            fixes: fixes.into(),
            permission: PermissionStatus::Granted,
        }
    }

    /// Parse a track
    ///
    /// # Errors
    ///
    /// `InvalidInput` naming the first malformed line, including offsets that
    /// go backwards and coordinates out of range.
    pub fn parse(input: &str) -> Result<Self, ApplicationError> {
        let mut fixes = Vec::new();
        let mut previous: Option<Duration> = None;

        for (index, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = index + 1;
            let invalid = |msg: &str| ApplicationError::InvalidInput(format!("line {line_no}: {msg}"));

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if !(2..=3).contains(&fields.len()) {
                return Err(invalid("expected latitude,longitude[,seconds]"));
            }
            let latitude: f64 = fields[0].parse().map_err(|_| invalid("bad latitude"))?;
            let longitude: f64 = fields[1].parse().map_err(|_| invalid("bad longitude"))?;
            let location =
                GeoLocation::new(latitude, longitude).map_err(|e| invalid(&e.to_string()))?;

            let offset = match fields.get(2) {
                Some(secs) => {
                    let secs: f64 = secs.parse().map_err(|_| invalid("bad offset"))?;
                    Duration::try_from_secs_f64(secs).map_err(|_| invalid("bad offset"))?
                },
                None => previous.map_or(Duration::ZERO, |p| p + DEFAULT_STEP),
            };
            if previous.is_some_and(|p| offset < p) {
                return Err(invalid("offset goes backwards"));
            }

            previous = Some(offset);
            fixes.push(RecordedFix { offset, location });
        }

        Ok(Self::new(fixes))
    }

    /// Read and parse a track file
    pub async fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ApplicationError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    /// Answer permission requests with `permission`
    #[must_use]
    pub const fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    pub fn fixes(&self) -> &[RecordedFix] {
        &self.fixes
    }

    /// Offset of the last fix
    pub fn duration(&self) -> Duration {
        self.fixes.last().map_or(Duration::ZERO, |fix| fix.offset)
    }
}

#[async_trait]
impl LocationProvider for ReplayLocationProvider {
    async fn request_foreground_permission(&self) -> Result<PermissionStatus, ApplicationError> {
        Ok(self.permission)
    }

    #[instrument(skip(self))]
    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<LocationSubscription, ApplicationError> {
        if !self.permission.is_granted() {
            return Err(ApplicationError::PermissionDenied(
                "location permission not granted".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let fixes = Arc::clone(&self.fixes);
        info!(fixes = fixes.len(), "Starting location replay");

        tokio::spawn(async move {
            let start = Instant::now();
            let mut gate = ThresholdGate::new(options);

            for fix in fixes.iter() {
                tokio::select! {
                    () = tx.closed() => {
                        debug!("Location subscriber dropped, stopping replay");
                        return;
                    },
                    () = sleep_until(start + fix.offset) => {},
                }

                if !gate.admit(fix.location, Instant::now()) {
                    trace!(location = %fix.location, "Fix below thresholds");
                    continue;
                }
                if tx.send(fix.location).await.is_err() {
                    debug!("Location subscriber dropped, stopping replay");
                    return;
                }
            }
            debug!("Location replay finished");
        });

        Ok(LocationSubscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: &str = "\
# depot
-21.4500,47.0800,0
-21.45002,47.0800,1
-21.45004,47.0800,6
-21.4510,47.0800,7
";

    fn options() -> WatchOptions {
        WatchOptions {
            time_interval: Duration::from_secs(5),
            distance_interval_m: 30.0,
        }
    }

    #[test]
    fn parse_track_with_comments() {
        let provider = ReplayLocationProvider::parse(TRACK).unwrap();
        assert_eq!(provider.fixes().len(), 4);
        assert_eq!(provider.fixes()[2].offset, Duration::from_secs(6));
        assert_eq!(provider.duration(), Duration::from_secs(7));
    }

    #[test]
    fn missing_offsets_step_one_second() {
        let provider = ReplayLocationProvider::parse("-21.45,47.08\n\n-21.46,47.09\n").unwrap();
        assert_eq!(provider.fixes()[0].offset, Duration::ZERO);
        assert_eq!(provider.fixes()[1].offset, Duration::from_secs(1));
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = ReplayLocationProvider::parse("-21.45,47.08\nabc,47.08\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = ReplayLocationProvider::parse("-21.45,47.08,5\n-21.45,47.08,2\n").unwrap_err();
        assert!(err.to_string().contains("backwards"));

        assert!(ReplayLocationProvider::parse("95.0,47.08\n").is_err());
        assert!(ReplayLocationProvider::parse("-21.45\n").is_err());
    }

    #[tokio::test]
    async fn from_file_reads_track() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.csv");
        tokio::fs::write(&path, TRACK).await.unwrap();

        let provider = ReplayLocationProvider::from_file(&path).await.unwrap();
        assert_eq!(provider.fixes().len(), 4);

        let missing = dir.path().join("absent.csv");
        assert!(matches!(
            ReplayLocationProvider::from_file(&missing).await,
            Err(ApplicationError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn denied_permission_refuses_watch() {
        let provider = ReplayLocationProvider::parse(TRACK)
            .unwrap()
            .with_permission(PermissionStatus::Denied);

        assert_eq!(
            provider.request_foreground_permission().await.unwrap(),
            PermissionStatus::Denied
        );
        assert!(matches!(
            provider.watch_position(options()).await,
            Err(ApplicationError::PermissionDenied(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn replay_applies_thresholds() {
        let provider = ReplayLocationProvider::parse(TRACK).unwrap();
        let mut subscription = provider.watch_position(options()).await.unwrap();

        let mut delivered = Vec::new();
        while let Some(fix) = subscription.next().await {
            delivered.push(fix);
        }

        // The 1 s fix moved ~2 m and is held back; the 6 s fix passes on time.
        assert_eq!(delivered.len(), 3);
        assert!((delivered[1].latitude() + 21.45004).abs() < 1e-9);
        assert!((delivered[2].latitude() + 21.4510).abs() < 1e-9);
    }
}
