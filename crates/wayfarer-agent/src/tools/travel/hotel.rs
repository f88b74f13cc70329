//! Hotel search: filters and sorts offers from a [`HotelSource`].

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use wayfarer_core::value::{Arguments, Value};

use super::catalog::{HotelOffer, HotelQuery, HotelSource};
use super::{optional_count, parse_date, NO_SOURCE};
use crate::tools::base::{Tool, ToolResult};

const DEFAULT_MAX_RESULTS: usize = 10;

// ─────────────────────────────────────────────
// Filtering and sorting
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Rating,
    Price,
    Distance,
    Popularity,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rating" => Ok(SortBy::Rating),
            "price" => Ok(SortBy::Price),
            "distance" => Ok(SortBy::Distance),
            "popularity" => Ok(SortBy::Popularity),
            other => Err(format!(
                "Invalid sort_by '{other}': expected rating, price, distance or popularity"
            )),
        }
    }
}

/// Every criterion is optional; an empty filter keeps everything.
#[derive(Clone, Debug, Default)]
pub struct HotelFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum star rating.
    pub star_rating: Option<u8>,
    /// Each must appear (case-insensitively) in the hotel's amenity list.
    pub amenities: Vec<String>,
    /// `None` means any type.
    pub hotel_type: Option<String>,
}

impl HotelFilter {
    pub fn matches(&self, hotel: &HotelOffer) -> bool {
        if self.min_price.is_some_and(|min| hotel.price_per_night < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| hotel.price_per_night > max) {
            return false;
        }
        if self.star_rating.is_some_and(|stars| hotel.star_rating < stars) {
            return false;
        }
        if let Some(kind) = &self.hotel_type {
            if !hotel.hotel_type.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        self.amenities.iter().all(|wanted| {
            let wanted = wanted.to_lowercase();
            hotel
                .amenities
                .iter()
                .any(|have| have.to_lowercase().contains(&wanted))
        })
    }
}

pub fn sort_hotels(hotels: &mut [HotelOffer], sort_by: SortBy) {
    let desc = |a: f64, b: f64| b.partial_cmp(&a).unwrap_or(Ordering::Equal);
    match sort_by {
        SortBy::Rating => hotels.sort_by(|a, b| desc(a.rating, b.rating)),
        SortBy::Price => hotels.sort_by(|a, b| desc(b.price_per_night, a.price_per_night)),
        SortBy::Distance => hotels.sort_by(|a, b| {
            let da = a.distance_km.unwrap_or(f64::MAX);
            let db = b.distance_km.unwrap_or(f64::MAX);
            desc(db, da)
        }),
        SortBy::Popularity => hotels.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
    }
}

fn format_hotels(query: &HotelQuery, nights: i64, hotels: &[HotelOffer]) -> String {
    let mut out = format!(
        "🏨 Hotels in {}\n📅 {} → {} ({nights} night(s), {} room(s), {} guest(s))\n",
        query.city, query.checkin, query.checkout, query.rooms, query.guests
    );
    if hotels.is_empty() {
        out.push_str("No hotels matched the search criteria.\n");
        return out;
    }
    out.push_str(&format!("🔍 {} hotel(s) found\n\n", hotels.len()));

    for (i, h) in hotels.iter().enumerate() {
        let total = h.price_per_night * nights as f64 * f64::from(query.rooms);
        out.push_str(&format!("[Hotel {}] {}★ {}\n", i + 1, h.star_rating, h.name));
        if !h.address.is_empty() {
            out.push_str(&format!("📍 {}\n", h.address));
        }
        out.push_str(&format!(
            "💰 ¥{:.0}/night, ¥{:.0} total\n",
            h.price_per_night, total
        ));
        out.push_str(&format!("⭐ {:.1} ({} reviews)\n", h.rating, h.review_count));
        if let Some(metro) = &h.nearest_metro {
            out.push_str(&format!("🚇 {metro}\n"));
        }
        if let Some(km) = h.distance_km {
            out.push_str(&format!("📏 {km:.1} km from center\n"));
        }
        if !h.amenities.is_empty() {
            out.push_str(&format!("🎯 {}\n", h.amenities.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// `star_rating` may arrive as a number, a numeric string or `"any"`.
fn star_rating(args: &Arguments) -> Result<Option<u8>, String> {
    let stars = match args.get("star_rating") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("any") => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => args.optional_i64("star_rating").ok().flatten(),
    };
    match stars {
        Some(n @ 1..=5) => Ok(Some(n as u8)),
        _ => Err("Invalid star_rating: expected 1-5 or 'any'".to_string()),
    }
}

// ─────────────────────────────────────────────
// HotelSearchTool
// ─────────────────────────────────────────────

pub struct HotelSearchTool {
    source: Option<Arc<dyn HotelSource>>,
}

impl HotelSearchTool {
    pub fn new(source: Option<Arc<dyn HotelSource>>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for HotelSearchTool {
    fn name(&self) -> &str {
        "hotel_search"
    }

    fn description(&self) -> &str {
        "Search hotels in a city for given dates. Filter by price, stars, amenities \
         and type; sort by rating, price, distance or popularity."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "description": "City name" },
                "checkin_date": { "type": "string", "description": "Check-in date (YYYY-MM-DD)" },
                "checkout_date": { "type": "string", "description": "Check-out date (YYYY-MM-DD)" },
                "guests": { "type": "integer", "description": "Number of guests (default 2)" },
                "rooms": { "type": "integer", "description": "Number of rooms (default 1)" },
                "min_price": { "type": "number", "description": "Minimum price per night in CNY" },
                "max_price": { "type": "number", "description": "Maximum price per night in CNY" },
                "star_rating": {
                    "type": "string",
                    "enum": ["1", "2", "3", "4", "5", "any"],
                    "description": "Minimum star rating"
                },
                "amenities": {
                    "type": "string",
                    "description": "Required amenities, comma separated (wifi,pool,gym,breakfast,parking)"
                },
                "hotel_type": {
                    "type": "string",
                    "enum": ["hotel", "resort", "apartment", "hostel", "guesthouse", "any"],
                    "description": "Property type (default any)"
                },
                "sort_by": {
                    "type": "string",
                    "enum": ["rating", "price", "distance", "popularity"],
                    "description": "Sort order (default rating)"
                },
                "max_results": { "type": "integer", "description": "Maximum results (default 10)" }
            },
            "required": ["city", "checkin_date", "checkout_date"]
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let city = args.require_str("city")?;
        let checkin_raw = args.require_str("checkin_date")?;
        let checkout_raw = args.require_str("checkout_date")?;
        let min_price = args.optional_f64("min_price")?;
        let max_price = args.optional_f64("max_price")?;
        let amenities: Vec<String> = args
            .optional_str("amenities")?
            .unwrap_or_default()
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        let hotel_type = args
            .optional_str("hotel_type")?
            .filter(|t| !t.eq_ignore_ascii_case("any"))
            .map(str::to_string);

        let Some(source) = &self.source else {
            return Ok(ToolResult::error(NO_SOURCE));
        };

        let validated = (|| -> Result<_, String> {
            let checkin = parse_date("checkin_date", checkin_raw)?;
            let checkout = parse_date("checkout_date", checkout_raw)?;
            if checkin >= checkout {
                return Err("checkout_date must be after checkin_date".to_string());
            }
            let guests = optional_count(args, "guests", 2)?;
            let rooms = optional_count(args, "rooms", 1)?;
            let max_results = optional_count(args, "max_results", DEFAULT_MAX_RESULTS as u32)?;
            let sort_by = args
                .optional_str("sort_by")
                .map_err(|e| e.to_string())?
                .map(str::parse::<SortBy>)
                .transpose()?
                .unwrap_or_default();
            let stars = star_rating(args)?;
            Ok((checkin, checkout, guests, rooms, max_results, sort_by, stars))
        })();
        let (checkin, checkout, guests, rooms, max_results, sort_by, stars) = match validated {
            Ok(v) => v,
            Err(e) => return Ok(ToolResult::error(e)),
        };

        let query = HotelQuery {
            city: city.to_string(),
            checkin,
            checkout,
            guests,
            rooms,
        };
        let found = match source.search_hotels(&query).await {
            Ok(found) => found,
            Err(e) => return Ok(ToolResult::error(format!("Hotel search failed: {e}"))),
        };
        let total_found = found.len();

        let filter = HotelFilter {
            min_price,
            max_price,
            star_rating: stars,
            amenities,
            hotel_type,
        };
        let mut hotels: Vec<HotelOffer> = found.into_iter().filter(|h| filter.matches(h)).collect();
        let after_filtering = hotels.len();
        sort_hotels(&mut hotels, sort_by);
        hotels.truncate(max_results as usize);
        debug!(city, total_found, after_filtering, returned = hotels.len(), "hotel search");

        let nights = (checkout - checkin).num_days();
        Ok(ToolResult::success(format_hotels(&query, nights, &hotels))
            .with_metadata("total_found", total_found)
            .with_metadata("after_filtering", after_filtering)
            .with_metadata("returned", hotels.len())
            .with_metadata("nights", nights))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
