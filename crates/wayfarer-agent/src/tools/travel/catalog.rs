//! Travel data sources.
//!
//! The search tools only see the [`FlightSource`] / [`HotelSource`] traits.
//! [`Catalog`] is the bundled implementation: a JSON file of offers loaded
//! once at startup from `tools.catalogPath`.
//!
//! ```json
//! {
//!   "flights": [{ "id": "f1", "airline": "China Eastern", "flightNumber": "MU5131", ... }],
//!   "hotels":  [{ "id": "h1", "name": "Lakeside Inn", "city": "Hangzhou", ... }]
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

// ─────────────────────────────────────────────
// Offers and queries
// ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub departure_time: String,
    pub arrival_time: String,
    /// Price per adult, CNY.
    pub price: f64,
    pub duration_minutes: u32,
    #[serde(default)]
    pub stops: u32,
    #[serde(default)]
    pub free_baggage: bool,
    #[serde(default)]
    pub baggage_info: String,
    #[serde(default = "default_travel_class")]
    pub travel_class: String,
}

fn default_travel_class() -> String {
    "ECONOMY".to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub adults: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOffer {
    pub id: String,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub address: String,
    pub star_rating: u8,
    /// Guest rating out of 5.
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    /// CNY per room per night.
    pub price_per_night: f64,
    #[serde(default = "default_hotel_type")]
    pub hotel_type: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_metro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

fn default_hotel_type() -> String {
    "hotel".to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct HotelQuery {
    pub city: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub guests: u32,
    pub rooms: u32,
}

// ─────────────────────────────────────────────
// Source traits
// ─────────────────────────────────────────────

/// Anything that can list flight offers for a route and date.
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn search_flights(&self, query: &FlightQuery) -> anyhow::Result<Vec<FlightOffer>>;
}

/// Anything that can list hotel offers in a city.
#[async_trait]
pub trait HotelSource: Send + Sync {
    async fn search_hotels(&self, query: &HotelQuery) -> anyhow::Result<Vec<HotelOffer>>;
}

// ─────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub flights: Vec<FlightOffer>,
    pub hotels: Vec<HotelOffer>,
}

impl Catalog {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid travel catalog JSON")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read travel catalog {}", path.display()))?;
        let catalog = Self::from_json(&raw)
            .with_context(|| format!("failed to parse travel catalog {}", path.display()))?;
        info!(
            path = %path.display(),
            flights = catalog.flights.len(),
            hotels = catalog.hotels.len(),
            "loaded travel catalog"
        );
        Ok(catalog)
    }
}

fn same_place(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[async_trait]
impl FlightSource for Catalog {
    async fn search_flights(&self, query: &FlightQuery) -> anyhow::Result<Vec<FlightOffer>> {
        Ok(self
            .flights
            .iter()
            .filter(|f| {
                same_place(&f.origin, &query.origin)
                    && same_place(&f.destination, &query.destination)
                    && f.departure_date == query.date
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HotelSource for Catalog {
    async fn search_hotels(&self, query: &HotelQuery) -> anyhow::Result<Vec<HotelOffer>> {
        Ok(self
            .hotels
            .iter()
            .filter(|h| same_place(&h.city, &query.city))
            .cloned()
            .collect())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
