//! Writes aggregated segment timing back onto a flight booking.

use tracing::warn;
use uuid::Uuid;

use super::segments::{aggregate, minutes_between, Aggregate, FlightLeg};
use crate::{
    error::Error,
    types::{non_blank, to_json_text, CreateFlight, Flight, FlightUpdate},
};

/// Builds a new flight for `trip_id`, deriving timings from its segments
/// when it has any.
pub fn build_flight(trip_id: Uuid, request: CreateFlight) -> Result<Flight, Error> {
    let mut missing = Vec::new();
    let airline = non_blank(request.airline);
    let from_airport = non_blank(request.from_airport);
    let to_airport = non_blank(request.to_airport);
    let travel_class = non_blank(request.travel_class);
    if airline.is_none() {
        missing.push("airline");
    }
    if from_airport.is_none() {
        missing.push("fromAirport");
    }
    if to_airport.is_none() {
        missing.push("toAirport");
    }
    if travel_class.is_none() {
        missing.push("travelClass");
    }
    if request.currency_id.is_none() {
        missing.push("currencyId");
    }
    if !missing.is_empty() {
        return Err(Error::BadRequest(format!("Missing fields: {}", missing.join(", "))));
    }

    let mut flight = Flight {
        id: Uuid::new_v4(),
        trip_id,
        trip_option_id: request.trip_option_id,
        airline: airline.unwrap_or_default(),
        flight_number: request.flight_number,
        from_airport: from_airport.unwrap_or_default(),
        to_airport: to_airport.unwrap_or_default(),
        departure_date: request.departure_date,
        arrival_date: request.arrival_date,
        travel_class: travel_class.unwrap_or_default(),
        base_fare: request.base_fare.unwrap_or(0.0),
        extras: request.extras.as_ref().and_then(to_json_text),
        currency_id: request.currency_id.unwrap_or_default(),
        total_cost_eur: request.total_cost_eur.unwrap_or(0.0),
        booking_url: request.booking_url,
        airline_logo_url: request.airline_logo_url,
        notes: request.notes,
        stops: request.stops.unwrap_or(0),
        is_round_trip: request.is_round_trip.unwrap_or(false),
        return_departure_date: request.return_departure_date,
        return_arrival_date: request.return_arrival_date,
        ..Default::default()
    };
    recompute_duration(&mut flight);

    if let Some(legs) = request.segments.filter(|legs| !legs.is_empty()) {
        let derived = derive_from_segments(&mut flight, &legs, request.is_round_trip.unwrap_or(false));
        flight.segments = serde_json::to_string(&legs).ok();
        if derived.is_none() {
            warn!(flight_id = %flight.id, "kept entered timings after segment calculation failed");
        }
    }
    Ok(flight)
}

/// Merges a partial update into `flight`.
///
/// Non-empty segments take precedence over explicitly entered dates for
/// whichever direction they cover. A failed segment calculation is logged
/// and leaves the derived fields alone.
pub fn apply_update(flight: &mut Flight, update: FlightUpdate) {
    if let Some(airline) = update.airline {
        flight.airline = airline;
    }
    if let Some(flight_number) = update.flight_number {
        flight.flight_number = flight_number;
    }
    if let Some(from_airport) = update.from_airport {
        flight.from_airport = from_airport;
    }
    if let Some(to_airport) = update.to_airport {
        flight.to_airport = to_airport;
    }
    if let Some(travel_class) = update.travel_class {
        flight.travel_class = travel_class;
    }
    if let Some(stops) = update.stops {
        flight.stops = stops;
    }
    if let Some(base_fare) = update.base_fare {
        flight.base_fare = base_fare;
    }
    if let Some(extras) = update.extras {
        flight.extras = extras.as_ref().and_then(to_json_text);
    }
    if let Some(currency_id) = update.currency_id {
        flight.currency_id = currency_id;
    }
    if let Some(total) = update.total_cost_eur {
        flight.total_cost_eur = total;
    }
    if let Some(booking_url) = update.booking_url {
        flight.booking_url = booking_url;
    }
    if let Some(logo) = update.airline_logo_url {
        flight.airline_logo_url = logo;
    }
    if let Some(notes) = update.notes {
        flight.notes = notes;
    }
    if let Some(minutes) = update.stop_over_duration_minutes {
        flight.stop_over_duration_minutes = minutes;
    }
    if let Some(airports) = update.stop_over_airports {
        flight.stop_over_airports = airports.and_then(|airports| serde_json::to_string(&airports).ok());
    }
    if let Some(segments) = &update.segments {
        flight.segments = segments
            .as_ref()
            .and_then(|legs| serde_json::to_string(legs).ok());
    }

    let derived = match update.segments.flatten().filter(|legs| !legs.is_empty()) {
        Some(legs) => derive_from_segments(flight, &legs, update.is_round_trip.unwrap_or(false)),
        None => None,
    }
    .unwrap_or_default();

    if derived.outbound.is_none() {
        if let Some(departure) = update.departure_date {
            flight.departure_date = departure;
        }
        if let Some(arrival) = update.arrival_date {
            flight.arrival_date = arrival;
        }
        if update.departure_date.is_some() || update.arrival_date.is_some() {
            recompute_duration(flight);
        }
    }
    if derived.inbound.is_none() {
        if let Some(departure) = update.return_departure_date {
            flight.return_departure_date = departure;
        }
        if let Some(arrival) = update.return_arrival_date {
            flight.return_arrival_date = arrival;
        }
    }
    // Derived segments already folded the requested flag into the return summary.
    if derived.is_empty() {
        if let Some(round_trip) = update.is_round_trip {
            flight.is_round_trip = round_trip;
        }
    }
}

/// Aggregates `legs` and applies the result. Returns `None` when the legs
/// could not be interpreted.
fn derive_from_segments(flight: &mut Flight, legs: &[FlightLeg], round_trip: bool) -> Option<Aggregate> {
    match aggregate(legs) {
        Ok(derived) => {
            apply_aggregate(flight, &derived, round_trip);
            Some(derived)
        }
        Err(e) => {
            warn!(flight_id = %flight.id, "segment calculation failed: {e}");
            None
        }
    }
}

/// Copies per-direction timing from `derived` onto the flight.
pub fn apply_aggregate(flight: &mut Flight, derived: &Aggregate, round_trip: bool) {
    flight.is_round_trip = round_trip || derived.inbound.is_some();

    if let Some(outbound) = &derived.outbound {
        flight.departure_date = Some(outbound.departure);
        flight.arrival_date = Some(outbound.arrival);
        flight.stops = i32::try_from(outbound.stops).unwrap_or(i32::MAX);
        flight.duration_min = Some(outbound.gross_duration_min);
        flight.outbound_duration_min = Some(outbound.gross_duration_min);
        flight.outbound_net_duration_min = Some(outbound.net_flight_min);
        flight.outbound_stopover_min = Some(outbound.stopover_min);
    }
    if let Some(inbound) = &derived.inbound {
        flight.return_departure_date = Some(inbound.departure);
        flight.return_arrival_date = Some(inbound.arrival);
        flight.return_duration_min = Some(inbound.gross_duration_min);
        flight.return_net_duration_min = Some(inbound.net_flight_min);
        flight.return_stopover_min = Some(inbound.stopover_min);
    }

    let directions = || derived.outbound.iter().chain(derived.inbound.iter());
    let stopover: i64 = directions().map(|summary| summary.stopover_min).sum();
    flight.stop_over_duration_minutes = (stopover != 0).then_some(stopover);
    let airports: Vec<&String> = directions()
        .flat_map(|summary| summary.stop_airports.iter())
        .collect();
    flight.stop_over_airports = serde_json::to_string(&airports).ok();
}

/// Sets the outbound duration from the entered departure and arrival, or
/// clears it when either is missing.
pub fn recompute_duration(flight: &mut Flight) {
    let minutes = match (flight.departure_date, flight.arrival_date) {
        (Some(departure), Some(arrival)) => Some(minutes_between(departure, arrival).max(0)),
        _ => None,
    };
    flight.duration_min = minutes;
    flight.outbound_duration_min = minutes;
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn stored_flight() -> Flight {
        Flight {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            airline: "Lufthansa".to_string(),
            from_airport: "FRA".to_string(),
            to_airport: "JFK".to_string(),
            travel_class: "Economy".to_string(),
            departure_date: Some(utc("2024-12-08T10:00:00Z")),
            arrival_date: Some(utc("2024-12-08T18:00:00Z")),
            duration_min: Some(480),
            ..Default::default()
        }
    }

    fn update(json: &str) -> FlightUpdate {
        serde_json::from_str(json).unwrap()
    }

    const ROUND_TRIP_SEGMENTS: &str = r#"{"segments":[
        {"fromAirport":"LHR","toAirport":"JFK","departureDate":"2024-12-08T13:00:00Z","arrivalDate":"2024-12-08T16:00:00Z"},
        {"fromAirport":"FRA","toAirport":"LHR","departureDate":"2024-12-08T10:00:00Z","arrivalDate":"2024-12-08T11:00:00Z"},
        {"fromAirport":"JFK","toAirport":"KEF","departureDate":"2024-12-15T18:00:00Z","arrivalDate":"2024-12-16T00:00:00Z","isReturn":true},
        {"fromAirport":"KEF","toAirport":"FRA","departureDate":"2024-12-16T01:30:00Z","arrivalDate":"2024-12-16T05:00:00Z","isReturn":true}
    ]}"#;

    #[test]
    fn segments_drive_both_directions() {
        let mut flight = stored_flight();
        apply_update(&mut flight, update(ROUND_TRIP_SEGMENTS));

        assert!(flight.is_round_trip);
        assert_eq!(flight.departure_date, Some(utc("2024-12-08T10:00:00Z")));
        assert_eq!(flight.arrival_date, Some(utc("2024-12-08T16:00:00Z")));
        assert_eq!(flight.stops, 1);
        assert_eq!(flight.duration_min, Some(360));
        assert_eq!(flight.outbound_net_duration_min, Some(240));
        assert_eq!(flight.outbound_stopover_min, Some(120));

        assert_eq!(flight.return_departure_date, Some(utc("2024-12-15T18:00:00Z")));
        assert_eq!(flight.return_arrival_date, Some(utc("2024-12-16T05:00:00Z")));
        assert_eq!(flight.return_duration_min, Some(660));
        assert_eq!(flight.return_net_duration_min, Some(570));
        assert_eq!(flight.return_stopover_min, Some(90));

        assert_eq!(flight.stop_over_duration_minutes, Some(210));
        assert_eq!(flight.stop_over_airports.as_deref(), Some(r#"["LHR","KEF"]"#));
        assert!(flight.segments.is_some());
    }

    #[test]
    fn segments_win_over_entered_outbound_dates() {
        let mut flight = stored_flight();
        let mut request = update(ROUND_TRIP_SEGMENTS);
        request.departure_date = Some(Some(utc("2030-01-01T00:00:00Z")));
        apply_update(&mut flight, request);

        assert_eq!(flight.departure_date, Some(utc("2024-12-08T10:00:00Z")));
    }

    #[test]
    fn return_legs_keep_round_trip_despite_false_flag() {
        let mut flight = stored_flight();
        let mut request = update(ROUND_TRIP_SEGMENTS);
        request.is_round_trip = Some(false);
        apply_update(&mut flight, request);

        assert!(flight.is_round_trip);
        assert_eq!(flight.return_departure_date, Some(utc("2024-12-15T18:00:00Z")));
    }

    #[test]
    fn round_trip_flag_applies_without_segments() {
        let mut flight = stored_flight();
        apply_update(&mut flight, update(r#"{"isRoundTrip":true}"#));
        assert!(flight.is_round_trip);

        apply_update(&mut flight, update(r#"{"isRoundTrip":false}"#));
        assert!(!flight.is_round_trip);
    }

    #[test]
    fn requested_round_trip_survives_outbound_only_segments() {
        let mut flight = stored_flight();
        apply_update(
            &mut flight,
            update(r#"{"isRoundTrip":true,"segments":[{"fromAirport":"FRA","toAirport":"JFK","departureDate":"2024-12-08T10:00:00Z","arrivalDate":"2024-12-08T18:30:00Z"}]}"#),
        );
        assert!(flight.is_round_trip);
    }

    #[test]
    fn incomplete_legs_do_not_reject_the_update() {
        let mut flight = stored_flight();
        apply_update(
            &mut flight,
            update(r#"{"notes":"exit row","segments":[
                {"fromAirport":"FRA","toAirport":null,"departureDate":"2024-12-08T10:00:00Z"},
                {"fromAirport":null,"departureDate":null,"arrivalDate":"2024-12-08T18:00:00Z"}
            ]}"#),
        );

        assert_eq!(flight.notes.as_deref(), Some("exit row"));
        assert_eq!(flight.duration_min, Some(480));
        assert_eq!(flight.departure_date, Some(utc("2024-12-08T10:00:00Z")));
        assert!(flight.segments.is_some());
    }

    #[test]
    fn null_stop_airport_is_dropped() {
        let mut flight = stored_flight();
        apply_update(
            &mut flight,
            update(r#"{"segments":[
                {"fromAirport":"FRA","toAirport":null,"departureDate":"2024-12-08T10:00:00Z","arrivalDate":"2024-12-08T11:00:00Z"},
                {"toAirport":"JFK","departureDate":"2024-12-08T13:00:00Z","arrivalDate":"2024-12-08T16:00:00Z"}
            ]}"#),
        );

        assert_eq!(flight.stops, 1);
        assert_eq!(flight.stop_over_duration_minutes, Some(120));
        assert_eq!(flight.stop_over_airports.as_deref(), Some("[]"));
    }

    #[test]
    fn direct_flight_clears_stopover_total() {
        let mut flight = stored_flight();
        flight.stop_over_duration_minutes = Some(45);
        apply_update(
            &mut flight,
            update(r#"{"segments":[{"fromAirport":"FRA","toAirport":"JFK","departureDate":"2024-12-08T10:00:00Z","arrivalDate":"2024-12-08T18:30:00Z"}]}"#),
        );

        assert_eq!(flight.stop_over_duration_minutes, None);
        assert_eq!(flight.stop_over_airports.as_deref(), Some("[]"));
        assert_eq!(flight.duration_min, Some(510));
        assert!(!flight.is_round_trip);
    }

    #[test]
    fn bad_segments_leave_derived_fields_untouched() {
        let mut flight = stored_flight();
        apply_update(
            &mut flight,
            update(r#"{"airline":"Condor","segments":[{"fromAirport":"FRA","toAirport":"JFK","departureDate":"soon","arrivalDate":"later"}]}"#),
        );

        assert_eq!(flight.airline, "Condor");
        assert_eq!(flight.duration_min, Some(480));
        assert_eq!(flight.departure_date, Some(utc("2024-12-08T10:00:00Z")));
        assert!(flight.segments.is_some());
    }

    #[test]
    fn entered_dates_recompute_duration() {
        let mut flight = stored_flight();
        apply_update(&mut flight, update(r#"{"arrivalDate":"2024-12-08T12:30:00Z"}"#));

        assert_eq!(flight.duration_min, Some(150));
        assert_eq!(flight.outbound_duration_min, Some(150));

        apply_update(&mut flight, update(r#"{"departureDate":null}"#));
        assert_eq!(flight.departure_date, None);
        assert_eq!(flight.duration_min, None);
    }

    #[test]
    fn arrival_before_departure_floors_at_zero() {
        let mut flight = stored_flight();
        apply_update(&mut flight, update(r#"{"arrivalDate":"2024-12-08T09:00:00Z"}"#));
        assert_eq!(flight.duration_min, Some(0));
    }

    #[test]
    fn untouched_fields_survive_update() {
        let mut flight = stored_flight();
        flight.notes = Some("window".to_string());
        apply_update(&mut flight, update(r#"{"baseFare":99.5}"#));

        assert_eq!(flight.base_fare, 99.5);
        assert_eq!(flight.notes.as_deref(), Some("window"));
        assert_eq!(flight.duration_min, Some(480));
    }

    #[test]
    fn build_requires_core_fields() {
        let error = build_flight(Uuid::new_v4(), CreateFlight::default()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Missing fields: airline, fromAirport, toAirport, travelClass, currencyId"
        );
    }

    #[test]
    fn build_keeps_entered_timings_when_legs_are_incomplete() {
        let request: CreateFlight = serde_json::from_str(
            r#"{"airline":"Condor","fromAirport":"FRA","toAirport":"PUJ","travelClass":"Economy",
                "departureDate":"2024-12-05T10:00:00Z","arrivalDate":"2024-12-05T20:00:00Z",
                "currencyId":"6f1f3d62-4f5e-4a8e-9f0a-2b9f6a1d7c11",
                "segments":[{"fromAirport":"FRA","toAirport":null}]}"#,
        )
        .unwrap();
        let flight = build_flight(Uuid::new_v4(), request).unwrap();

        assert_eq!(flight.airline, "Condor");
        assert_eq!(flight.duration_min, Some(600));
        assert_eq!(flight.segments.as_deref(), Some(r#"[{"fromAirport":"FRA","isReturn":false}]"#));
    }

    #[test]
    fn build_derives_duration_and_segments() {
        let request: CreateFlight = serde_json::from_str(
            r#"{"airline":"American Airlines","fromAirport":"JFK","toAirport":"LAX",
                "departureDate":"2024-12-05T10:00:00.000Z","arrivalDate":"2024-12-05T13:00:00.000Z",
                "travelClass":"Economy","baseFare":450,"currencyId":"6f1f3d62-4f5e-4a8e-9f0a-2b9f6a1d7c11",
                "extras":{"checkedBaggage":40}}"#,
        )
        .unwrap();
        let flight = build_flight(Uuid::new_v4(), request).unwrap();

        assert_eq!(flight.duration_min, Some(180));
        assert_eq!(flight.outbound_duration_min, Some(180));
        assert_eq!(flight.extras.as_deref(), Some(r#"{"checkedBaggage":40}"#));
        assert_eq!(flight.segments, None);
    }
}
