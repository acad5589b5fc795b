//! Geographic point codec.
//!
//! Reports store their location as a PostGIS `geography(Point, 4326)`. On the
//! wire to Postgres the point travels as (E)WKT text, which always lists the
//! longitude first: `POINT(<lon> <lat>)`. Everything in Rust land takes
//! `(lat, lon)`, so this module is the single place where the order flips.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};
use thiserror::Error;
use utoipa::ToSchema;

/// Spatial reference id for WGS 84 lat/lon
pub const SRID_WGS84: i32 = 4326;

/// Earth's radius in meters (for Haversine formula)
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("Latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),

    #[error("Coordinates must be finite numbers")]
    NotFinite,

    #[error("Invalid WKT point: {0}")]
    InvalidWkt(String),

    #[error("Unsupported SRID {0}, expected 4326")]
    UnsupportedSrid(i32),
}

/// A WGS 84 point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// `POINT(<lon> <lat>)`
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }

    /// `SRID=4326;POINT(<lon> <lat>)`, accepted by `ST_GeogFromText`
    pub fn to_ewkt(&self) -> String {
        format!("SRID={};{}", SRID_WGS84, self.to_wkt())
    }

    /// Parse `POINT(lon lat)` with an optional `SRID=4326;` prefix
    pub fn from_wkt(input: &str) -> Result<Self, GeoError> {
        let invalid = || GeoError::InvalidWkt(input.to_string());
        let mut body = input.trim();

        if let Some((prefix, rest)) = body.split_once(';') {
            let srid = prefix
                .trim()
                .strip_prefix("SRID=")
                .and_then(|s| s.parse::<i32>().ok())
                .ok_or_else(invalid)?;
            if srid != SRID_WGS84 {
                return Err(GeoError::UnsupportedSrid(srid));
            }
            body = rest.trim();
        }

        let rest = body
            .get(..5)
            .filter(|head| head.eq_ignore_ascii_case("POINT"))
            .map(|_| &body[5..])
            .ok_or_else(invalid)?;

        let coords = rest
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let mut parts = coords.split_whitespace();
        let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let longitude = lon.parse::<f64>().map_err(|_| invalid())?;
        let latitude = lat.parse::<f64>().map_err(|_| invalid())?;

        Self::new(latitude, longitude)
    }

    /// Haversine distance between two points in meters
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_METERS * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl FromStr for GeoPoint {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wkt(s)
    }
}

// Postgres binding: points are exchanged as text. Queries read with
// `ST_AsText(location)` and write with `ST_GeogFromText($n)`.

impl Type<Postgres> for GeoPoint {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl Encode<'_, Postgres> for GeoPoint {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <String as Encode<Postgres>>::encode_by_ref(&self.to_ewkt(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for GeoPoint {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = <&str as Decode<Postgres>>::decode(value)?;
        Ok(GeoPoint::from_wkt(text)?)
    }
}
