//! Flight leg aggregation.
//!
//! Turns the per-leg segments of a booking into one timing summary per
//! direction (outbound and return).

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::round_div;

const MINUTE_MS: i64 = 60_000;

/// One point-to-point flight within a possibly multi-stop journey.
///
/// Timestamps stay raw strings so that a malformed leg never rejects the
/// request carrying it; they are only interpreted during aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightLeg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_airport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_airport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_airport_timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_airport_timezone: Option<String>,
    #[serde(default, alias = "isReturnLeg")]
    pub is_return: bool,
    /// Anything else the client attached to the leg (airline, flight number...).
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),
}

/// Timing summary for one direction of travel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegSummary {
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    /// First departure to last arrival.
    pub gross_duration_min: i64,
    /// Time actually spent in the air, summed over legs.
    pub net_flight_min: i64,
    pub stopover_min: i64,
    pub stop_airports: Vec<String>,
    /// Ground time at each connection, not clamped: out-of-order legs show
    /// up here as negative values.
    pub layovers_min: Vec<i64>,
    pub legs: usize,
    pub stops: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Aggregate {
    pub outbound: Option<LegSummary>,
    #[serde(rename = "return")]
    pub inbound: Option<LegSummary>,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.outbound.is_none() && self.inbound.is_none()
    }
}

/// Summarizes outbound and return legs independently. A direction without
/// legs has no summary.
pub fn aggregate(legs: &[FlightLeg]) -> Result<Aggregate, SegmentError> {
    let (inbound, outbound): (Vec<&FlightLeg>, Vec<&FlightLeg>) =
        legs.iter().partition(|leg| leg.is_return);

    Ok(Aggregate {
        outbound: summarize(&outbound)?,
        inbound: summarize(&inbound)?,
    })
}

/// Whole minutes from `from` to `to`, halves rounded up. May be negative.
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    round_div((to - from).num_milliseconds(), MINUTE_MS)
}

struct ResolvedLeg<'a> {
    sort_key: DateTime<Utc>,
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    to_airport: &'a str,
}

fn summarize(group: &[&FlightLeg]) -> Result<Option<LegSummary>, SegmentError> {
    if group.is_empty() {
        return Ok(None);
    }

    let mut legs = group
        .iter()
        .map(|leg| {
            Ok(ResolvedLeg {
                sort_key: parse_stamp(required(&leg.departure_date)?)?.instant,
                departure: resolve(required(&leg.departure_date)?, leg.from_airport_timezone.as_deref())?,
                arrival: resolve(required(&leg.arrival_date)?, leg.to_airport_timezone.as_deref())?,
                to_airport: leg.to_airport.as_deref().unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, SegmentError>>()?;

    // Ties are broken on the remaining fields so the input order never matters.
    legs.sort_by(|a, b| {
        a.sort_key
            .cmp(&b.sort_key)
            .then(a.arrival.cmp(&b.arrival))
            .then(a.to_airport.cmp(b.to_airport))
    });

    let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
        return Ok(None);
    };

    let gross_duration_min = minutes_between(first.departure, last.arrival).max(0);
    let net_flight_min = legs
        .iter()
        .map(|leg| minutes_between(leg.departure, leg.arrival).max(0))
        .sum::<i64>();
    let stopover_min = (gross_duration_min - net_flight_min).max(0);

    let stop_airports = legs[..legs.len() - 1]
        .iter()
        .map(|leg| leg.to_airport)
        .filter(|airport| !airport.is_empty())
        .map(str::to_string)
        .collect();

    let layovers_min = legs
        .windows(2)
        .map(|pair| minutes_between(pair[0].arrival, pair[1].departure))
        .collect();

    Ok(Some(LegSummary {
        departure: first.departure,
        arrival: last.arrival,
        gross_duration_min,
        net_flight_min,
        stopover_min,
        stop_airports,
        layovers_min,
        legs: legs.len(),
        stops: legs.len() - 1,
    }))
}

/// A leg timestamp that was left out or sent as `null` is unusable.
fn required(raw: &Option<String>) -> Result<&str, SegmentError> {
    raw.as_deref()
        .ok_or_else(|| SegmentError::InvalidTimestamp(String::new()))
}

/// A parsed timestamp: what the clock on the wall read, and the instant the
/// string denotes when taken at face value.
struct Stamp {
    wall: NaiveDateTime,
    instant: DateTime<Utc>,
}

fn parse_stamp(raw: &str) -> Result<Stamp, SegmentError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Stamp {
            wall: parsed.naive_local(),
            instant: parsed.with_timezone(&Utc),
        });
    }
    // Offset-less input (e.g. from a datetime-local form field) is UTC.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Stamp {
                wall: naive,
                instant: naive.and_utc(),
            });
        }
    }
    Err(SegmentError::InvalidTimestamp(raw.to_string()))
}

/// Resolves a leg endpoint to an absolute instant. With a zone, the
/// timestamp's wall-clock reading is local time at that airport.
fn resolve(raw: &str, timezone: Option<&str>) -> Result<DateTime<Utc>, SegmentError> {
    let stamp = parse_stamp(raw)?;
    let Some(name) = timezone
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "UTC")
    else {
        return Ok(stamp.instant);
    };
    let zone: Tz = name
        .parse()
        .map_err(|_| SegmentError::UnknownTimezone(name.to_string()))?;
    Ok(localize(zone, stamp.wall))
}

fn localize(zone: Tz, wall: NaiveDateTime) -> DateTime<Utc> {
    match zone.from_local_datetime(&wall) {
        LocalResult::Single(local) => local.with_timezone(&Utc),
        // Clocks went back: take the first occurrence.
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Clocks went forward over this reading: apply the offset in force
        // at the same reading taken as UTC.
        LocalResult::None => {
            let offset = zone.offset_from_utc_datetime(&wall).fix();
            (wall - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(from: &str, to: &str, departure: &str, arrival: &str) -> FlightLeg {
        FlightLeg {
            from_airport: Some(from.to_string()),
            to_airport: Some(to.to_string()),
            departure_date: Some(departure.to_string()),
            arrival_date: Some(arrival.to_string()),
            ..Default::default()
        }
    }

    fn return_leg(from: &str, to: &str, departure: &str, arrival: &str) -> FlightLeg {
        FlightLeg {
            is_return: true,
            ..leg(from, to, departure, arrival)
        }
    }

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn frankfurt_to_new_york() -> Vec<FlightLeg> {
        vec![
            leg("FRA", "LHR", "2024-12-08T10:00:00Z", "2024-12-08T11:00:00Z"),
            leg("LHR", "JFK", "2024-12-08T13:00:00Z", "2024-12-08T16:00:00Z"),
        ]
    }

    #[test]
    fn two_leg_outbound_journey() {
        let result = aggregate(&frankfurt_to_new_york()).unwrap();
        let outbound = result.outbound.unwrap();

        assert_eq!(outbound.gross_duration_min, 360);
        assert_eq!(outbound.net_flight_min, 240);
        assert_eq!(outbound.stopover_min, 120);
        assert_eq!(outbound.stops, 1);
        assert_eq!(outbound.legs, 2);
        assert_eq!(outbound.stop_airports, vec!["LHR".to_string()]);
        assert_eq!(outbound.layovers_min, vec![120]);
        assert_eq!(outbound.departure, utc("2024-12-08T10:00:00Z"));
        assert_eq!(outbound.arrival, utc("2024-12-08T16:00:00Z"));
        assert!(result.inbound.is_none());
    }

    #[test]
    fn single_leg_has_no_stopover() {
        let legs = vec![leg("JFK", "LAX", "2024-12-05T10:00:00.000Z", "2024-12-05T13:00:00.000Z")];
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();

        assert_eq!(outbound.gross_duration_min, 180);
        assert_eq!(outbound.gross_duration_min, outbound.net_flight_min);
        assert_eq!(outbound.stopover_min, 0);
        assert_eq!(outbound.stops, 0);
        assert!(outbound.stop_airports.is_empty());
        assert!(outbound.layovers_min.is_empty());
    }

    #[test]
    fn empty_input_yields_no_summaries() {
        let result = aggregate(&[]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn directions_are_aggregated_independently() {
        let mut legs = frankfurt_to_new_york();
        legs.push(return_leg("JFK", "FRA", "2024-12-15T18:00:00Z", "2024-12-16T02:00:00Z"));

        let result = aggregate(&legs).unwrap();
        let inbound = result.inbound.unwrap();

        assert_eq!(result.outbound.unwrap().legs, 2);
        assert_eq!(inbound.legs, 1);
        assert_eq!(inbound.gross_duration_min, 480);
        assert_eq!(inbound.stopover_min, 0);
    }

    #[test]
    fn return_only_journey_has_no_outbound() {
        let legs = vec![return_leg("JFK", "FRA", "2024-12-15T18:00:00Z", "2024-12-16T02:00:00Z")];
        let result = aggregate(&legs).unwrap();

        assert!(result.outbound.is_none());
        assert!(result.inbound.is_some());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let legs = frankfurt_to_new_york();
        assert_eq!(aggregate(&legs).unwrap(), aggregate(&legs).unwrap());
    }

    #[test]
    fn input_order_does_not_matter() {
        let legs = frankfurt_to_new_york();
        let reversed: Vec<FlightLeg> = legs.iter().rev().cloned().collect();
        assert_eq!(aggregate(&legs).unwrap(), aggregate(&reversed).unwrap());
    }

    #[test]
    fn empty_stop_airports_are_dropped() {
        let legs = vec![
            leg("FRA", "", "2024-12-08T10:00:00Z", "2024-12-08T11:00:00Z"),
            leg("", "JFK", "2024-12-08T13:00:00Z", "2024-12-08T16:00:00Z"),
        ];
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();

        assert!(outbound.stop_airports.is_empty());
        assert_eq!(outbound.stops, 1);
    }

    #[test]
    fn overlapping_legs_surface_negative_layover() {
        // The second leg leaves before the first one lands.
        let legs = vec![
            leg("FRA", "LHR", "2024-12-08T10:00:00Z", "2024-12-08T12:00:00Z"),
            leg("LHR", "JFK", "2024-12-08T11:00:00Z", "2024-12-08T14:00:00Z"),
        ];
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();

        assert_eq!(outbound.gross_duration_min, 240);
        assert_eq!(outbound.net_flight_min, 300);
        assert_eq!(outbound.stopover_min, 0);
        assert_eq!(outbound.layovers_min, vec![-60]);
    }

    #[test]
    fn durations_round_to_nearest_minute() {
        let legs = vec![leg("FRA", "LHR", "2024-12-08T10:00:00Z", "2024-12-08T11:00:30Z")];
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();
        assert_eq!(outbound.net_flight_min, 61);
    }

    #[test]
    fn timezones_reinterpret_wall_clock_time() {
        // 10:00 in Berlin (UTC+2 in July) to 11:00 in London (UTC+1).
        let legs = vec![FlightLeg {
            from_airport_timezone: Some("Europe/Berlin".to_string()),
            to_airport_timezone: Some("Europe/London".to_string()),
            ..leg("TXL", "LHR", "2024-07-01T10:00:00Z", "2024-07-01T11:00:00Z")
        }];
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();

        assert_eq!(outbound.departure, utc("2024-07-01T08:00:00Z"));
        assert_eq!(outbound.arrival, utc("2024-07-01T10:00:00Z"));
        assert_eq!(outbound.net_flight_min, 120);
    }

    #[test]
    fn utc_timezone_is_taken_at_face_value() {
        let legs = vec![FlightLeg {
            from_airport_timezone: Some("UTC".to_string()),
            ..leg("FRA", "LHR", "2024-12-08T10:00:00Z", "2024-12-08T11:00:00Z")
        }];
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();
        assert_eq!(outbound.departure, utc("2024-12-08T10:00:00Z"));
    }

    #[test]
    fn offset_less_timestamps_are_utc() {
        let legs = vec![leg("FRA", "LHR", "2024-12-08T10:00", "2024-12-08T11:15")];
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();

        assert_eq!(outbound.departure, utc("2024-12-08T10:00:00Z"));
        assert_eq!(outbound.net_flight_min, 75);
    }

    #[test]
    fn ambiguous_local_time_takes_first_occurrence() {
        // 02:30 happens twice in Berlin on 2024-10-27.
        assert_eq!(
            resolve("2024-10-27T02:30:00Z", Some("Europe/Berlin")).unwrap(),
            utc("2024-10-27T00:30:00Z")
        );
    }

    #[test]
    fn skipped_local_time_uses_offset_at_reading() {
        // 02:30 never happens in Berlin on 2024-03-31.
        assert_eq!(
            resolve("2024-03-31T02:30:00Z", Some("Europe/Berlin")).unwrap(),
            utc("2024-03-31T00:30:00Z")
        );
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        let legs = vec![FlightLeg {
            from_airport_timezone: Some("Mars/Olympus".to_string()),
            ..leg("FRA", "LHR", "2024-12-08T10:00:00Z", "2024-12-08T11:00:00Z")
        }];
        assert_eq!(
            aggregate(&legs),
            Err(SegmentError::UnknownTimezone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn unparseable_timestamp_is_an_error() {
        let legs = vec![leg("FRA", "LHR", "tomorrow", "2024-12-08T11:00:00Z")];
        assert_eq!(
            aggregate(&legs),
            Err(SegmentError::InvalidTimestamp("tomorrow".to_string()))
        );
    }

    #[test]
    fn missing_timestamp_is_an_error() {
        let legs = vec![FlightLeg {
            arrival_date: None,
            ..leg("FRA", "LHR", "2024-12-08T10:00:00Z", "")
        }];
        assert_eq!(aggregate(&legs), Err(SegmentError::InvalidTimestamp(String::new())));
    }

    #[test]
    fn incomplete_legs_still_deserialize() {
        let json = r#"[{"fromAirport":"FRA","toAirport":null,"departureDate":"2024-12-08T10:00:00Z"},{}]"#;
        let parsed: Vec<FlightLeg> = serde_json::from_str(json).unwrap();

        assert_eq!(parsed[0].to_airport, None);
        assert_eq!(parsed[0].arrival_date, None);
        assert_eq!(parsed[1], FlightLeg::default());
    }

    #[test]
    fn missing_stop_airport_is_left_out() {
        let mut legs = frankfurt_to_new_york();
        legs[0].to_airport = None;
        let outbound = aggregate(&legs).unwrap().outbound.unwrap();

        assert!(outbound.stop_airports.is_empty());
        assert_eq!(outbound.stops, 1);
    }

    #[test]
    fn legs_keep_unknown_fields() {
        let json = r#"{"fromAirport":"FRA","toAirport":"LHR","departureDate":"2024-12-08T10:00:00Z","arrivalDate":"2024-12-08T11:00:00Z","isReturn":false,"flightNumber":"LH900"}"#;
        let parsed: FlightLeg = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.details.get("flightNumber"), Some(&Value::from("LH900")));
        let round_tripped = serde_json::to_value(&parsed).unwrap();
        assert_eq!(round_tripped["flightNumber"], "LH900");
    }
}
