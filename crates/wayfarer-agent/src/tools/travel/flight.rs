//! Flight search: filters and ranks offers from a [`FlightSource`].
//!
//! Ranking: when free baggage is preferred, offers that include it come
//! first; within that, offers are ordered by a weighted score of price
//! (40%), duration (20%), stops (20%) and baggage (20%). Ten results at most.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use wayfarer_core::value::Arguments;

use super::catalog::{FlightOffer, FlightQuery, FlightSource};
use super::{optional_count, optional_flag, parse_date, NO_SOURCE};
use crate::tools::base::{Tool, ToolResult};

const TRAVEL_CLASSES: [&str; 4] = ["ECONOMY", "PREMIUM_ECONOMY", "BUSINESS", "FIRST"];
const MAX_RESULTS: usize = 10;

// ─────────────────────────────────────────────
// Ranking
// ─────────────────────────────────────────────

/// Weighted desirability in `[0, 1]`; higher is better.
pub fn flight_score(flight: &FlightOffer) -> f64 {
    let price = (1000.0 - flight.price).max(0.0) / 1000.0;
    let hours = f64::from(flight.duration_minutes) / 60.0;
    let duration = (24.0 - hours).max(0.0) / 24.0;
    let stops = if flight.stops == 0 {
        1.0
    } else {
        1.0 / f64::from(flight.stops + 1)
    };
    let baggage = if flight.free_baggage { 1.0 } else { 0.5 };

    price * 0.4 + duration * 0.2 + stops * 0.2 + baggage * 0.2
}

/// Drop offers over `max_price` or in another cabin, then rank.
pub fn rank_flights(
    flights: Vec<FlightOffer>,
    travel_class: &str,
    max_price: Option<f64>,
    prefer_free_baggage: bool,
) -> Vec<FlightOffer> {
    let mut ranked: Vec<FlightOffer> = flights
        .into_iter()
        .filter(|f| f.travel_class.eq_ignore_ascii_case(travel_class))
        .filter(|f| max_price.map_or(true, |max| f.price <= max))
        .collect();

    ranked.sort_by(|a, b| {
        if prefer_free_baggage && a.free_baggage != b.free_baggage {
            return b.free_baggage.cmp(&a.free_baggage);
        }
        flight_score(b)
            .partial_cmp(&flight_score(a))
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(MAX_RESULTS);
    ranked
}

fn format_duration(minutes: u32) -> String {
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

fn format_flights(heading: &str, flights: &[FlightOffer], adults: u32) -> String {
    if flights.is_empty() {
        return format!("{heading}\nNo flights matched the search criteria.\n");
    }

    let mut out = format!("{heading}\n\n");
    for (i, f) in flights.iter().enumerate() {
        out.push_str(&format!(
            "[Option {}] score {:.1}\n",
            i + 1,
            flight_score(f) * 100.0
        ));
        out.push_str(&format!("✈️ {} {}\n", f.airline, f.flight_number));
        out.push_str(&format!("📍 {} → {}\n", f.origin, f.destination));
        out.push_str(&format!(
            "⏰ {} {} → {}\n",
            f.departure_date, f.departure_time, f.arrival_time
        ));
        if adults > 1 {
            out.push_str(&format!(
                "💰 ¥{:.0} per adult, ¥{:.0} for {adults}\n",
                f.price,
                f.price * f64::from(adults)
            ));
        } else {
            out.push_str(&format!("💰 ¥{:.0}\n", f.price));
        }
        out.push_str(&format!("⏱️ {}\n", format_duration(f.duration_minutes)));
        if f.stops == 0 {
            out.push_str("🔄 Nonstop\n");
        } else {
            out.push_str(&format!("🔄 {} stop(s)\n", f.stops));
        }
        let baggage: &str = if f.baggage_info.is_empty() { "not specified" } else { &f.baggage_info };
        if f.free_baggage {
            out.push_str(&format!("🧳 {baggage} (free baggage ✅)\n"));
        } else {
            out.push_str(&format!("🧳 {baggage}\n"));
        }
        out.push('\n');
    }
    out
}

// ─────────────────────────────────────────────
// FlightSearchTool
// ─────────────────────────────────────────────

pub struct FlightSearchTool {
    source: Option<Arc<dyn FlightSource>>,
}

impl FlightSearchTool {
    pub fn new(source: Option<Arc<dyn FlightSource>>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for FlightSearchTool {
    fn name(&self) -> &str {
        "flight_search"
    }

    fn description(&self) -> &str {
        "Search flights between two airports or cities and rank them by price, \
         duration, stops and free baggage allowance."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "origin": { "type": "string", "description": "Departure airport code or city" },
                "destination": { "type": "string", "description": "Arrival airport code or city" },
                "departure_date": { "type": "string", "description": "Departure date (YYYY-MM-DD)" },
                "return_date": { "type": "string", "description": "Return date (YYYY-MM-DD), omit for one-way" },
                "adults": { "type": "integer", "description": "Number of adults (default 1)" },
                "travel_class": {
                    "type": "string",
                    "enum": TRAVEL_CLASSES,
                    "description": "Cabin class (default ECONOMY)"
                },
                "max_price": { "type": "number", "description": "Maximum price per adult in CNY" },
                "prefer_free_baggage": {
                    "type": "boolean",
                    "description": "Rank flights with free checked baggage first (default true)"
                }
            },
            "required": ["origin", "destination", "departure_date"]
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let origin = args.require_str("origin")?;
        let destination = args.require_str("destination")?;
        let departure_raw = args.require_str("departure_date")?;
        let return_raw = args.optional_str("return_date")?;
        let travel_class = args
            .optional_str("travel_class")?
            .unwrap_or("ECONOMY")
            .to_ascii_uppercase();
        let max_price = args.optional_f64("max_price")?;
        let prefer_free_baggage = optional_flag(args, "prefer_free_baggage")?.unwrap_or(true);

        let Some(source) = &self.source else {
            return Ok(ToolResult::error(NO_SOURCE));
        };

        let departure = match parse_date("departure_date", departure_raw) {
            Ok(date) => date,
            Err(e) => return Ok(ToolResult::error(e)),
        };
        let return_date = match return_raw.map(|raw| parse_date("return_date", raw)).transpose() {
            Ok(date) => date,
            Err(e) => return Ok(ToolResult::error(e)),
        };
        if return_date.is_some_and(|r| r < departure) {
            return Ok(ToolResult::error("return_date must not be before departure_date"));
        }
        let adults = match optional_count(args, "adults", 1) {
            Ok(n) => n,
            Err(e) => return Ok(ToolResult::error(e)),
        };
        if !TRAVEL_CLASSES.contains(&travel_class.as_str()) {
            return Ok(ToolResult::error(format!(
                "Invalid travel_class '{travel_class}': expected one of {}",
                TRAVEL_CLASSES.join(", ")
            )));
        }

        let outbound_query = FlightQuery {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date: departure,
            adults,
        };
        let outbound = match source.search_flights(&outbound_query).await {
            Ok(found) => rank_flights(found, &travel_class, max_price, prefer_free_baggage),
            Err(e) => return Ok(ToolResult::error(format!("Flight search failed: {e}"))),
        };
        debug!(origin, destination, results = outbound.len(), "flight search");

        let mut count = outbound.len();
        let mut output = format_flights(
            &format!("🛫 {origin} → {destination} on {departure}: {} option(s)", outbound.len()),
            &outbound,
            adults,
        );

        if let Some(return_date) = return_date {
            let return_query = FlightQuery {
                origin: destination.to_string(),
                destination: origin.to_string(),
                date: return_date,
                adults,
            };
            let inbound = match source.search_flights(&return_query).await {
                Ok(found) => rank_flights(found, &travel_class, max_price, prefer_free_baggage),
                Err(e) => return Ok(ToolResult::error(format!("Flight search failed: {e}"))),
            };
            count += inbound.len();
            output.push('\n');
            output.push_str(&format_flights(
                &format!("🛬 {destination} → {origin} on {return_date}: {} option(s)", inbound.len()),
                &inbound,
                adults,
            ));
        }

        Ok(ToolResult::success(output)
            .with_metadata("count", count)
            .with_metadata("currency", "CNY"))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::travel::catalog::tests::sample;
    use chrono::NaiveDate;
    use wayfarer_core::value::Value;

    fn offer(id: &str, price: f64, minutes: u32, stops: u32, free_baggage: bool) -> FlightOffer {
        FlightOffer {
            id: id.into(),
            airline: "Test Air".into(),
            flight_number: id.to_uppercase(),
            origin: "SHA".into(),
            destination: "HGH".into(),
            departure_date: NaiveDate::from_ymd_opt(2026, 11, 7).unwrap(),
            departure_time: "08:00".into(),
            arrival_time: "10:00".into(),
            price,
            duration_minutes: minutes,
            stops,
            free_baggage,
            baggage_info: String::new(),
            travel_class: "ECONOMY".into(),
        }
    }

    fn tool() -> FlightSearchTool {
        FlightSearchTool::new(Some(Arc::new(sample())))
    }

    #[test]
    fn test_score_formula() {
        // price 0.4*0.5 + duration 0.2*(22/24) + stops 0.2*1 + baggage 0.2*1
        let score = flight_score(&offer("a", 500.0, 120, 0, true));
        let expected = 0.2 + 0.2 * (22.0 / 24.0) + 0.2 + 0.2;
        assert!((score - expected).abs() < 1e-9);

        // Expensive, long, two stops, no baggage: only stop + baggage terms remain
        let score = flight_score(&offer("b", 1500.0, 1500, 2, false));
        assert!((score - (0.2 / 3.0 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_free_baggage_ranked_first_when_preferred() {
        let cheap_no_bag = offer("cheap", 100.0, 60, 0, false);
        let pricey_bag = offer("pricey", 900.0, 60, 0, true);

        let ranked = rank_flights(vec![cheap_no_bag.clone(), pricey_bag.clone()], "ECONOMY", None, true);
        assert_eq!(ranked[0].id, "pricey");

        let ranked = rank_flights(vec![pricey_bag, cheap_no_bag], "ECONOMY", None, false);
        assert_eq!(ranked[0].id, "cheap");
    }

    #[test]
    fn test_filters_price_and_class_and_truncates() {
        let mut flights: Vec<FlightOffer> = (0..15).map(|i| offer(&format!("f{i}"), 100.0 + i as f64, 60, 0, true)).collect();
        flights.push(FlightOffer {
            travel_class: "BUSINESS".into(),
            ..offer("biz", 50.0, 60, 0, true)
        });

        let ranked = rank_flights(flights.clone(), "ECONOMY", None, true);
        assert_eq!(ranked.len(), MAX_RESULTS);
        assert_eq!(ranked[0].id, "f0");
        assert!(ranked.iter().all(|f| f.id != "biz"));

        let capped = rank_flights(flights, "economy", Some(102.0), true);
        assert_eq!(capped.len(), 3);
    }

    #[tokio::test]
    async fn test_search_from_catalog() {
        let result = tool()
            .execute(
                &Arguments::new()
                    .with("origin", "SHA")
                    .with("destination", "HGH")
                    .with("departure_date", "2026-11-07"),
            )
            .await
            .unwrap();
        let out = result.output.unwrap();
        // f1 (free baggage) beats the cheaper f2; f3 is business class
        assert!(out.find("MU5131").unwrap() < out.find("9C8801").unwrap());
        assert!(!out.contains("CA1701"));
        assert_eq!(result.metadata["count"], Value::Number(2.0));
    }

    #[tokio::test]
    async fn test_round_trip_search() {
        let result = tool()
            .execute(
                &Arguments::new()
                    .with("origin", "SHA")
                    .with("destination", "HGH")
                    .with("departure_date", "2026-11-07")
                    .with("return_date", "2026-11-09")
                    .with("adults", 2i64),
            )
            .await
            .unwrap();
        let out = result.output.unwrap();
        assert!(out.contains("MU5132"));
        assert!(out.contains("¥960 for 2"));
        assert_eq!(result.metadata["count"], Value::Number(3.0));
    }

    #[tokio::test]
    async fn test_bad_dates_are_error_results() {
        let bad = tool()
            .execute(
                &Arguments::new()
                    .with("origin", "SHA")
                    .with("destination", "HGH")
                    .with("departure_date", "next friday"),
            )
            .await
            .unwrap();
        assert!(bad.error.unwrap().contains("expected YYYY-MM-DD"));

        let backwards = tool()
            .execute(
                &Arguments::new()
                    .with("origin", "SHA")
                    .with("destination", "HGH")
                    .with("departure_date", "2026-11-07")
                    .with("return_date", "2026-11-01"),
            )
            .await
            .unwrap();
        assert!(backwards.is_error());
    }

    #[tokio::test]
    async fn test_missing_source() {
        let result = FlightSearchTool::new(None)
            .execute(
                &Arguments::new()
                    .with("origin", "SHA")
                    .with("destination", "HGH")
                    .with("departure_date", "2026-11-07"),
            )
            .await
            .unwrap();
        assert!(result.error.unwrap().contains("No travel data source"));
    }

    #[tokio::test]
    async fn test_missing_origin_is_argument_error() {
        let err = tool()
            .execute(&Arguments::new().with("destination", "HGH"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: origin");
    }
}
