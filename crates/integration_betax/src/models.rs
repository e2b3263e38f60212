//! Betax wire models
//!
//! The backend is loose about JSON types: coordinates, fares and line numbers
//! arrive as numbers or as strings (sometimes with a decimal comma), and
//! optional fields may be missing or `null`. The deserializers below accept
//! all of these.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Response wrapper used by every endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Status mirrored from HTTP; a non-200 value means failure
    #[serde(default)]
    pub status: Option<u16>,
    /// Success flag
    #[serde(default)]
    pub result: Option<bool>,
    /// Human-readable message, usually set on failures
    #[serde(default)]
    pub description: Option<String>,
    /// Payload
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// `data` of the nearby-positions endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NearbyPositions {
    /// Buses on duty within the radius
    #[serde(default, rename = "bus", deserialize_with = "null_as_empty")]
    pub buses: Vec<BusPosition>,
    /// Stops within the radius
    #[serde(default, rename = "arret", deserialize_with = "null_as_empty")]
    pub stops: Vec<BusStop>,
}

/// A bus reporting its position
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusPosition {
    #[serde(default, alias = "idBus", alias = "id_bus", deserialize_with = "opt_i64")]
    pub bus_id: Option<i64>,
    #[serde(deserialize_with = "req_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "req_f64")]
    pub longitude: f64,
    /// Driver name
    #[serde(default, rename = "nom", deserialize_with = "opt_label")]
    pub driver_name: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub primus: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub terminus: Option<String>,
    /// Registration plate
    #[serde(default, rename = "matriculation", deserialize_with = "opt_label")]
    pub plate: Option<String>,
    /// Fare in Ariary
    #[serde(default, rename = "frais", deserialize_with = "opt_u32")]
    pub fare: Option<u32>,
    /// Distance from the query center in kilometers
    #[serde(default, rename = "distance", deserialize_with = "opt_f64")]
    pub distance_km: Option<f64>,
}

/// A bus stop
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusStop {
    #[serde(deserialize_with = "req_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "req_f64")]
    pub longitude: f64,
    #[serde(default, rename = "nom", deserialize_with = "opt_label")]
    pub name: Option<String>,
    #[serde(default, rename = "distance", deserialize_with = "opt_f64")]
    pub distance_km: Option<f64>,
}

/// A passenger account as returned by login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Passenger {
    #[serde(alias = "idVoyageur", alias = "id_voyageur", deserialize_with = "req_i64")]
    pub id: i64,
    #[serde(default, rename = "nom", deserialize_with = "opt_label")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub email: Option<String>,
}

/// Body of the sign-up request
#[derive(Clone, PartialEq, Serialize)]
pub struct NewPassenger {
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "mot_de_passe")]
    pub password: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl std::fmt::Debug for NewPassenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewPassenger")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .finish()
    }
}

/// Body of the driver position push
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct PositionUpdate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of the enroll request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollRequest {
    pub id_bus: i64,
    pub id_voyageur: i64,
}

/// A bus serving both searched stops
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchingBus {
    #[serde(alias = "idBus", alias = "id_bus", deserialize_with = "req_i64")]
    pub bus_id: i64,
    #[serde(default, rename = "matriculation", deserialize_with = "opt_label")]
    pub plate: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub primus: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub terminus: Option<String>,
    #[serde(default, rename = "frais", deserialize_with = "opt_u32")]
    pub fare: Option<u32>,
    /// Line number
    #[serde(default, rename = "type", deserialize_with = "opt_label")]
    pub bus_type: Option<String>,
}

/// One entry of a passenger's trip history
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripEntry {
    #[serde(default, deserialize_with = "opt_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bus: Option<TripBus>,
    #[serde(default, rename = "distance", deserialize_with = "opt_f64")]
    pub distance_km: Option<f64>,
}

/// The bus of a history entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TripBus {
    #[serde(default, rename = "type", deserialize_with = "opt_label")]
    pub bus_type: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub primus: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub terminus: Option<String>,
    #[serde(default, rename = "matriculation", deserialize_with = "opt_label")]
    pub plate: Option<String>,
    #[serde(default, rename = "frais", deserialize_with = "opt_u32")]
    pub fare: Option<u32>,
}

/// The bus assigned to a driver
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriverBus {
    #[serde(default, rename = "matriculation", deserialize_with = "opt_label")]
    pub plate: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub primus: Option<String>,
    #[serde(default, deserialize_with = "opt_label")]
    pub terminus: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "opt_label")]
    pub bus_type: Option<String>,
}

/// Some endpoints wrap a single object in an array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_first(self) -> Option<T> {
        match self {
            Self::Many(items) => items.into_iter().next(),
            Self::One(item) => Some(item),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok()
}

fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) => Some(n),
        Some(Loose::Text(s)) => parse_decimal(&s),
        _ => None,
    })
}

fn req_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    opt_f64(deserializer)?.ok_or_else(|| de::Error::custom("expected a number"))
}

#[allow(clippy::cast_possible_truncation)] // ids fit in i64
fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) if n.fract().abs() < f64::EPSILON => Some(n as i64),
        Some(Loose::Text(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn req_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    opt_i64(deserializer)?.ok_or_else(|| de::Error::custom("expected an integer id"))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to u32 range
fn opt_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = opt_f64(deserializer)?;
    Ok(value
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.round().min(f64::from(u32::MAX)) as u32))
}

/// Text stays text, numbers are printed without a trailing `.0`
fn opt_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Text(s)) => Some(s),
        Some(Loose::Number(n)) => Some(n.to_string()),
        Some(Loose::Other(serde_json::Value::Bool(b))) => Some(b.to_string()),
        _ => None,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse RFC 3339 or the `YYYY-MM-DD HH:MM:SS` form SQL backends emit (taken as UTC)
pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn opt_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .as_deref()
        .and_then(parse_datetime))
}
