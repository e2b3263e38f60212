//! Betax HTTP client
//!
//! One method per backend endpoint. Responses are unwrapped from the JSON
//! envelope; HTTP and envelope statuses are checked the same way.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::BetaxConfig;
use crate::error::BetaxError;
use crate::models::{
    DriverBus, EnrollRequest, Envelope, MatchingBus, NearbyPositions, NewPassenger, OneOrMany,
    Passenger, PositionUpdate, TripEntry,
};

/// Trait for Betax backend clients
#[async_trait]
pub trait BetaxClient: Send + Sync {
    /// Look up a passenger by credentials
    async fn login(&self, email: &str, password: &str) -> Result<Passenger, BetaxError>;

    /// Create a passenger account
    async fn register(&self, passenger: &NewPassenger) -> Result<(), BetaxError>;

    /// Buses and stops within `radius_km` of a point
    async fn nearby_positions(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<NearbyPositions, BetaxError>;

    /// Report a driver's position
    async fn push_position(
        &self,
        driver_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), BetaxError>;

    /// Buses stopping at both places; empty when none match
    async fn search_buses(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<MatchingBus>, BetaxError>;

    /// Enroll a passenger on a bus
    async fn enroll(&self, bus_id: i64, passenger_id: i64) -> Result<(), BetaxError>;

    /// Trips taken by a passenger
    async fn trip_history(&self, passenger_id: i64) -> Result<Vec<TripEntry>, BetaxError>;

    /// The bus assigned to a driver, if any
    async fn assigned_bus(&self, driver_id: i64) -> Result<Option<DriverBus>, BetaxError>;
}

/// `reqwest`-based client for the Betax backend
#[derive(Debug)]
pub struct HttpBetaxClient {
    client: Client,
    base_url: Url,
    config: BetaxConfig,
}

impl HttpBetaxClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &BetaxConfig) -> Result<Self, BetaxError> {
        config.validate().map_err(BetaxError::ConfigurationError)?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BetaxError::ConfigurationError(e.to_string()))?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BetaxError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BetaxError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BetaxError::ConfigurationError("base_url cannot take a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn coordinate(value: f64, name: &str) -> Result<String, BetaxError> {
        if value.is_finite() {
            Ok(value.to_string())
        } else {
            Err(BetaxError::InvalidInput(format!("{name} must be a finite number")))
        }
    }

    fn transport_error(&self, e: &reqwest::Error) -> BetaxError {
        if e.is_timeout() {
            BetaxError::Timeout {
                timeout_secs: self.config.timeout_secs.unwrap_or_default(),
            }
        } else {
            BetaxError::ConnectionFailed(e.to_string())
        }
    }

    /// Send a request and return the status and raw body
    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), BetaxError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BetaxError::RequestFailed(e.to_string()))?;
        Ok((status, body))
    }

    /// Check statuses and extract `data` from an envelope
    ///
    /// An empty body on success yields `None`.
    fn decode<T: DeserializeOwned>(
        status: StatusCode,
        body: &str,
        what: &str,
    ) -> Result<Option<T>, BetaxError> {
        if !status.is_success() {
            let description = serde_json::from_str::<Envelope<IgnoredAny>>(body)
                .ok()
                .and_then(|e| e.description);
            return Err(status_error(status.as_u16(), description, what));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Envelope<T> =
            serde_json::from_str(body).map_err(|e| BetaxError::ParseError(e.to_string()))?;

        if let Some(code) = envelope.status {
            if !(200..300).contains(&code) {
                return Err(status_error(code, envelope.description, what));
            }
        }

        Ok(envelope.data)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<Option<T>, BetaxError> {
        let (status, body) = self.execute(self.client.get(url)).await?;
        Self::decode(status, &body, what)
    }
}

fn status_error(status: u16, description: Option<String>, what: &str) -> BetaxError {
    if status == 404 {
        BetaxError::NotFound(description.unwrap_or_else(|| what.to_string()))
    } else {
        BetaxError::UnexpectedStatus {
            status,
            description,
        }
    }
}

#[async_trait]
impl BetaxClient for HttpBetaxClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<Passenger, BetaxError> {
        let url = self.endpoint(&["voyageur", "login", "email", email, "mdp", password])?;
        debug!("Checking passenger credentials");

        let data: Option<OneOrMany<Passenger>> = self.get(url, "voyageur").await?;
        data.and_then(OneOrMany::into_first)
            .ok_or_else(|| BetaxError::NotFound("voyageur".to_string()))
    }

    #[instrument(skip(self, passenger), fields(email = %passenger.email))]
    async fn register(&self, passenger: &NewPassenger) -> Result<(), BetaxError> {
        let url = self.endpoint(&["voyageur"])?;
        debug!(%url, "Registering passenger");

        let (status, body) = self.execute(self.client.post(url).json(passenger)).await?;
        Self::decode::<IgnoredAny>(status, &body, "voyageur")?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn nearby_positions(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<NearbyPositions, BetaxError> {
        let url = self.endpoint(&[
            "chauffeur",
            "getAllPositionInARadius",
            "latitude",
            &Self::coordinate(latitude, "latitude")?,
            "longitude",
            &Self::coordinate(longitude, "longitude")?,
            "radius",
            &Self::coordinate(radius_km, "radius")?,
        ])?;
        debug!(%url, "Fetching nearby positions");

        let data: Option<NearbyPositions> = self.get(url, "positions").await?;
        let data = data.unwrap_or_default();
        debug!(
            buses = data.buses.len(),
            stops = data.stops.len(),
            "Nearby positions received"
        );
        Ok(data)
    }

    #[instrument(skip(self))]
    async fn push_position(
        &self,
        driver_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), BetaxError> {
        Self::coordinate(latitude, "latitude")?;
        Self::coordinate(longitude, "longitude")?;
        let url = self.endpoint(&["chauffeur", &driver_id.to_string()])?;
        debug!(%url, "Pushing driver position");

        let body = PositionUpdate {
            latitude,
            longitude,
        };
        let (status, body) = self.execute(self.client.put(url).json(&body)).await?;
        Self::decode::<IgnoredAny>(status, &body, "chauffeur")?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search_buses(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<MatchingBus>, BetaxError> {
        let url = self.endpoint(&["sarreter", "bus", "dest1", origin, "dest2", destination])?;
        debug!(%url, "Searching buses");

        match self.get::<Vec<MatchingBus>>(url, "bus").await {
            Ok(buses) => Ok(buses.unwrap_or_default()),
            Err(BetaxError::NotFound(_)) => {
                debug!("No bus serves both stops");
                Ok(Vec::new())
            },
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn enroll(&self, bus_id: i64, passenger_id: i64) -> Result<(), BetaxError> {
        let url = self.endpoint(&["prendre"])?;
        debug!(%url, "Enrolling passenger");

        let body = EnrollRequest {
            id_bus: bus_id,
            id_voyageur: passenger_id,
        };
        let (status, body) = self.execute(self.client.post(url).json(&body)).await?;
        Self::decode::<IgnoredAny>(status, &body, "prendre")?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn trip_history(&self, passenger_id: i64) -> Result<Vec<TripEntry>, BetaxError> {
        let url = self.endpoint(&["prendre", "voyageur", &passenger_id.to_string()])?;
        debug!(%url, "Fetching trip history");

        let entries: Vec<TripEntry> = self.get(url, "prendre").await?.unwrap_or_default();
        if entries.iter().any(|e| e.date.is_none()) {
            warn!("Some history entries have no readable date");
        }
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn assigned_bus(&self, driver_id: i64) -> Result<Option<DriverBus>, BetaxError> {
        let url = self.endpoint(&["bus", "idChauffeur", &driver_id.to_string()])?;
        debug!(%url, "Fetching assigned bus");

        match self.get::<OneOrMany<DriverBus>>(url, "bus").await {
            Ok(data) => Ok(data.and_then(OneOrMany::into_first)),
            Err(BetaxError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
