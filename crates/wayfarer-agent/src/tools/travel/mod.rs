//! Travel search tools and the data sources behind them.

pub mod catalog;
pub mod flight;
pub mod hotel;

pub use catalog::{Catalog, FlightOffer, FlightQuery, FlightSource, HotelOffer, HotelQuery, HotelSource};
pub use flight::FlightSearchTool;
pub use hotel::HotelSearchTool;

use chrono::NaiveDate;

use wayfarer_core::error::ArgumentError;
use wayfarer_core::value::{Arguments, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` argument, describing the problem on failure.
fn parse_date(key: &str, raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid {key} '{raw}': expected YYYY-MM-DD"))
}

/// Boolean flag that models sometimes send as `"true"` / `"false"`.
fn optional_flag(args: &Arguments, key: &str) -> Result<Option<bool>, ArgumentError> {
    match args.get(key) {
        Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ArgumentError::Invalid {
                key: key.to_string(),
                expected: "bool",
                found: "string",
            }),
        },
        _ => args.optional_bool(key),
    }
}

/// Positive count with a default, e.g. adults or rooms.
fn optional_count(args: &Arguments, key: &str, default: u32) -> Result<u32, String> {
    match args.optional_i64(key).map_err(|e| e.to_string())? {
        None => Ok(default),
        Some(n) if n >= 1 => u32::try_from(n).map_err(|_| format!("Parameter `{key}` is too large")),
        Some(n) => Err(format!("Parameter `{key}` must be at least 1, got {n}")),
    }
}

const NO_SOURCE: &str = "No travel data source is configured. Set tools.catalogPath in \
                         ~/.wayfarer/config.json to a JSON catalog of flights and hotels.";
