//! Betax adapter - Implements the backend ports using integration_betax

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{AccountPort, DriverPort, NewAccount, PositionsPort, TripPort};
use async_trait::async_trait;
use domain::{
    AssignedBus, BusCandidate, BusId, GeoLocation, PositionSnapshot, SessionUser,
    StopPosition, TripRecord, TripSearchQuery, UNKNOWN_LABEL, UserId, VehiclePosition,
    route_label,
};
use integration_betax::{
    BetaxClient, BetaxConfig, BetaxError, BusPosition, BusStop, DriverBus, HttpBetaxClient,
    MatchingBus, NewPassenger, TripEntry,
};
use tracing::{debug, instrument, warn};

/// Adapter for the Betax REST backend
pub struct BetaxAdapter {
    client: Arc<dyn BetaxClient>,
}

impl std::fmt::Debug for BetaxAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BetaxAdapter")
            .field("client", &"BetaxClient")
            .finish()
    }
}

impl BetaxAdapter {
    /// Wrap an existing client
    pub fn new(client: Arc<dyn BetaxClient>) -> Self {
        Self { client }
    }

    /// Build an adapter over the HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// fails to initialize.
    pub fn from_config(config: &BetaxConfig) -> Result<Self, ApplicationError> {
        let client = HttpBetaxClient::new(config).map_err(|e| map_error(e, "client setup"))?;
        Ok(Self::new(Arc::new(client)))
    }
}

fn map_error(err: BetaxError, operation: &str) -> ApplicationError {
    match err {
        BetaxError::NotFound(what) => ApplicationError::NotFound(what),
        BetaxError::InvalidInput(msg) => ApplicationError::InvalidInput(msg),
        BetaxError::ConfigurationError(msg) => ApplicationError::Configuration(msg),
        other => ApplicationError::ExternalService(format!("Betax {operation} failed: {other}")),
    }
}

fn label(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

fn vehicle_from(bus: BusPosition, viewer: &GeoLocation) -> VehiclePosition {
    let location = GeoLocation::new_unchecked(bus.latitude, bus.longitude);
    VehiclePosition {
        bus_id: bus.bus_id.map(BusId::new),
        latitude: bus.latitude,
        longitude: bus.longitude,
        driver_name: label(bus.driver_name),
        route_label: route_label(bus.primus.as_deref(), bus.terminus.as_deref()),
        plate: label(bus.plate),
        fare: bus.fare,
        distance_from_viewer: bus
            .distance_km
            .or_else(|| Some(viewer.distance_km(&location))),
    }
}

fn stop_from(stop: BusStop, viewer: &GeoLocation) -> StopPosition {
    let location = GeoLocation::new_unchecked(stop.latitude, stop.longitude);
    StopPosition {
        latitude: stop.latitude,
        longitude: stop.longitude,
        name: label(stop.name),
        distance_from_viewer: stop
            .distance_km
            .or_else(|| Some(viewer.distance_km(&location))),
    }
}

fn candidate_from(bus: MatchingBus) -> BusCandidate {
    BusCandidate {
        bus_id: BusId::new(bus.bus_id),
        route_label: route_label(bus.primus.as_deref(), bus.terminus.as_deref()),
        plate: label(bus.plate),
        fare: bus.fare,
        bus_type: label(bus.bus_type),
    }
}

/// Sequence numbers follow the backend order, counted before undated
/// entries are dropped.
fn trip_records(entries: Vec<TripEntry>) -> Vec<TripRecord> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let sequence = index + 1;
            let Some(date) = entry.date else {
                warn!(sequence, "Dropping history entry without a date");
                return None;
            };
            let bus = entry.bus.unwrap_or_default();
            Some(TripRecord {
                sequence,
                bus_type: label(bus.bus_type),
                route_label: route_label(bus.primus.as_deref(), bus.terminus.as_deref()),
                plate: label(bus.plate),
                fare: bus.fare.unwrap_or(0),
                date,
                distance_km: entry.distance_km,
            })
        })
        .collect()
}

fn assigned_from(bus: DriverBus) -> AssignedBus {
    AssignedBus {
        plate: label(bus.plate),
        primus: label(bus.primus),
        terminus: label(bus.terminus),
        bus_type: label(bus.bus_type),
    }
}

#[async_trait]
impl PositionsPort for BetaxAdapter {
    #[instrument(skip(self, center), fields(center = %center))]
    async fn nearby_positions(
        &self,
        center: &GeoLocation,
        radius_km: f64,
    ) -> Result<PositionSnapshot, ApplicationError> {
        let nearby = self
            .client
            .nearby_positions(center.latitude(), center.longitude(), radius_km)
            .await
            .map_err(|e| map_error(e, "nearby positions"))?;

        let vehicles: Vec<_> = nearby
            .buses
            .into_iter()
            .map(|bus| vehicle_from(bus, center))
            .collect();
        let stops: Vec<_> = nearby
            .stops
            .into_iter()
            .map(|stop| stop_from(stop, center))
            .collect();

        debug!(
            vehicles = vehicles.len(),
            stops = stops.len(),
            "Fetched nearby positions"
        );
        Ok(PositionSnapshot::new(vehicles, stops))
    }
}

#[async_trait]
impl TripPort for BetaxAdapter {
    #[instrument(skip(self))]
    async fn search_buses(
        &self,
        query: &TripSearchQuery,
    ) -> Result<Vec<BusCandidate>, ApplicationError> {
        let buses = self
            .client
            .search_buses(&query.origin_label, &query.destination_label)
            .await
            .map_err(|e| map_error(e, "bus search"))?;

        Ok(buses.into_iter().map(candidate_from).collect())
    }

    #[instrument(skip(self))]
    async fn enroll(&self, bus_id: BusId, passenger_id: UserId) -> Result<(), ApplicationError> {
        self.client
            .enroll(bus_id.as_i64(), passenger_id.as_i64())
            .await
            .map_err(|e| map_error(e, "enrollment"))
    }

    #[instrument(skip(self))]
    async fn trip_history(
        &self,
        passenger_id: UserId,
    ) -> Result<Vec<TripRecord>, ApplicationError> {
        let entries = self
            .client
            .trip_history(passenger_id.as_i64())
            .await
            .map_err(|e| map_error(e, "trip history"))?;

        Ok(trip_records(entries))
    }
}

#[async_trait]
impl AccountPort for BetaxAdapter {
    #[instrument(skip(self, email, password), fields(email = %email))]
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApplicationError> {
        let passenger = self
            .client
            .login(email, password)
            .await
            .map_err(|e| map_error(e, "login"))?;

        Ok(SessionUser::new(
            UserId::new(passenger.id),
            passenger.name.unwrap_or_default(),
            passenger
                .email
                .unwrap_or_else(|| email.to_string()),
        ))
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn register(&self, account: &NewAccount) -> Result<(), ApplicationError> {
        let passenger = NewPassenger {
            name: account.name.clone(),
            email: account.email.as_str().to_string(),
            password: account.password.clone(),
            latitude: account.location.latitude(),
            longitude: account.location.longitude(),
        };

        self.client
            .register(&passenger)
            .await
            .map_err(|e| map_error(e, "registration"))
    }
}

#[async_trait]
impl DriverPort for BetaxAdapter {
    #[instrument(skip(self, location), fields(location = %location))]
    async fn push_position(
        &self,
        driver_id: UserId,
        location: &GeoLocation,
    ) -> Result<(), ApplicationError> {
        self.client
            .push_position(driver_id.as_i64(), location.latitude(), location.longitude())
            .await
            .map_err(|e| map_error(e, "position push"))
    }

    #[instrument(skip(self))]
    async fn assigned_bus(
        &self,
        driver_id: UserId,
    ) -> Result<Option<AssignedBus>, ApplicationError> {
        let bus = self
            .client
            .assigned_bus(driver_id.as_i64())
            .await
            .map_err(|e| map_error(e, "assigned bus lookup"))?;

        Ok(bus.map(assigned_from))
    }
}
