use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::types::{StopType, Trip, TripStop};

pub const START_HUB_ORDER: i32 = 0;
pub const END_HUB_ORDER: i32 = 999_999;

/// A HUB stop as it should exist for a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct HubStop {
    pub name: String,
    pub date: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub order: i32,
}

impl HubStop {
    pub fn into_stop(self, trip_id: Uuid) -> TripStop {
        TripStop {
            id: Uuid::new_v4(),
            trip_id,
            name: self.name,
            start_date: self.date,
            end_date: self.date,
            lat: self.lat,
            lng: self.lng,
            stop_type: StopType::Hub,
            order: self.order,
            selected_accommodation_id: None,
        }
    }
}

/// The start and end HUBs bracketing `trip`. A side without a date has no HUB.
pub fn hub_stops(trip: &Trip) -> Vec<HubStop> {
    let start = trip.start_date.map(|date| HubStop {
        name: location_name(trip.start_location_name.as_deref(), "Start"),
        date,
        lat: trip.start_lat,
        lng: trip.start_lng,
        order: START_HUB_ORDER,
    });
    let end = trip.end_date.map(|date| HubStop {
        name: location_name(trip.end_location_name.as_deref(), "End"),
        date,
        lat: trip.end_lat,
        lng: trip.end_lng,
        order: END_HUB_ORDER,
    });
    start.into_iter().chain(end).collect()
}

fn location_name(name: Option<&str>, fallback: &str) -> String {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Order for a newly added stop: one past the highest existing order, or 0.
/// The end HUB is ignored so new stops land before it.
pub fn next_stop_order(orders: &[i32]) -> i32 {
    orders
        .iter()
        .copied()
        .filter(|order| *order < END_HUB_ORDER)
        .max()
        .map_or(0, |max| max + 1)
}

fn itinerary_order(a: &TripStop, b: &TripStop) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.start_date.cmp(&b.start_date))
        .then_with(|| a.stop_type.cmp(&b.stop_type))
}

/// Sorts stops by order, then start date, with HUBs ahead of STOPs on ties.
pub fn sort_itinerary<T: AsRef<TripStop>>(stops: &mut [T]) {
    stops.sort_by(|a, b| itinerary_order(a.as_ref(), b.as_ref()));
}

/// Checks that every id in a reorder request belongs to the trip.
pub fn check_reorder<'a>(trip_stops: &[TripStop], ids: impl IntoIterator<Item = &'a Uuid>) -> Result<(), Error> {
    let known: HashSet<Uuid> = trip_stops.iter().map(|stop| stop.id).collect();
    match ids.into_iter().find(|id| !known.contains(id)) {
        Some(id) => Err(Error::NotFound(format!("Stop {id} not found in trip"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn stop(name: &str, stop_type: StopType, order: i32, day: u32) -> TripStop {
        TripStop {
            id: Uuid::new_v4(),
            trip_id: Uuid::nil(),
            name: name.to_string(),
            start_date: at(day),
            end_date: at(day),
            lat: None,
            lng: None,
            stop_type,
            order,
            selected_accommodation_id: None,
        }
    }

    fn trip() -> Trip {
        Trip {
            id: Uuid::new_v4(),
            title: "Costa Rica".to_string(),
            start_date: Some(at(1)),
            end_date: Some(at(15)),
            people: 2,
            total_cost_eur: 0.0,
            image_url: None,
            currency_id: Uuid::nil(),
            start_location_name: Some("Frankfurt".to_string()),
            start_lat: Some(50.1),
            start_lng: Some(8.7),
            end_location_name: Some("  ".to_string()),
            end_lat: None,
            end_lng: None,
            split_flight_cost: false,
            split_car_rental_cost: true,
            split_accommodation_cost: true,
            selected_flight_id: None,
            selected_car_rental_id: None,
            created_at: at(1),
        }
    }

    #[test]
    fn hubs_bracket_the_trip() {
        let hubs = hub_stops(&trip());

        assert_eq!(hubs.len(), 2);
        assert_eq!(hubs[0].name, "Frankfurt");
        assert_eq!(hubs[0].order, START_HUB_ORDER);
        assert_eq!(hubs[0].date, at(1));
        assert_eq!(hubs[1].name, "End");
        assert_eq!(hubs[1].order, END_HUB_ORDER);
        assert_eq!(hubs[1].date, at(15));

        let stop = hubs[0].clone().into_stop(Uuid::nil());
        assert_eq!(stop.stop_type, StopType::Hub);
        assert_eq!(stop.start_date, stop.end_date);
    }

    #[test]
    fn missing_dates_skip_hubs() {
        let trip = Trip {
            end_date: None,
            start_location_name: None,
            ..trip()
        };
        let hubs = hub_stops(&trip);
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].name, "Start");
    }

    #[test]
    fn next_order_skips_end_hub() {
        assert_eq!(next_stop_order(&[]), 0);
        assert_eq!(next_stop_order(&[0, 1, 2]), 3);
        assert_eq!(next_stop_order(&[0, END_HUB_ORDER]), 1);
        assert_eq!(next_stop_order(&[END_HUB_ORDER]), 0);
    }

    #[test]
    fn itinerary_sorts_by_order_date_and_type() {
        let mut stops = vec![
            stop("end", StopType::Hub, END_HUB_ORDER, 15),
            stop("tamarindo", StopType::Stop, 2, 9),
            stop("arenal", StopType::Stop, 1, 5),
            stop("start", StopType::Hub, 0, 1),
            stop("same-day stop", StopType::Stop, 0, 1),
            stop("monteverde", StopType::Stop, 1, 3),
        ];
        sort_itinerary(&mut stops);

        let names: Vec<&str> = stops.iter().map(|stop| stop.name.as_str()).collect();
        assert_eq!(names, ["start", "same-day stop", "monteverde", "arenal", "tamarindo", "end"]);
    }

    #[test]
    fn reorder_rejects_foreign_stops() {
        let stops = vec![stop("a", StopType::Stop, 1, 2), stop("b", StopType::Stop, 2, 3)];
        assert!(check_reorder(&stops, [&stops[1].id, &stops[0].id]).is_ok());

        let stranger = Uuid::new_v4();
        let error = check_reorder(&stops, [&stops[0].id, &stranger]).unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }
}
