use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ceil_div, round_div};
use crate::types::{Accommodation, CarRental, Flight, Trip};
use crate::utils::format_money;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub fn to_eur(amount: f64, rate_to_eur: f64) -> f64 {
    amount * rate_to_eur
}

/// Billable rental days: whole days rounded, at least one. Zero when either
/// date is unknown.
pub fn rental_days(pickup: Option<DateTime<Utc>>, dropoff: Option<DateTime<Utc>>) -> i64 {
    match (pickup, dropoff) {
        (Some(pickup), Some(dropoff)) => {
            let span = (dropoff - pickup).num_milliseconds();
            round_div(span, DAY_MS).max(1)
        }
        _ => 0,
    }
}

/// Rental price in the rental's own currency.
pub fn rental_total(rental: &CarRental) -> f64 {
    let days = rental_days(rental.pickup_date, rental.dropoff_date);
    rental.base_rate + rental.fees + rental.insurance_per_day * days as f64
}

pub fn price_rental(rental: &mut CarRental, rate_to_eur: f64) {
    rental.total_cost_eur = to_eur(rental_total(rental), rate_to_eur);
}

pub fn accommodation_nights(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    ceil_div((end - start).num_milliseconds(), DAY_MS).max(0)
}

/// EUR total of a stay. An explicit EUR figure is kept as given; otherwise
/// the total price, or the nightly rate times `nights`, is converted.
pub fn accommodation_cost_eur(
    explicit_eur: Option<f64>,
    total_price: Option<f64>,
    nightly_rate: Option<f64>,
    nights: i64,
    rate_to_eur: f64,
) -> Option<f64> {
    let given = |value: Option<f64>| value.filter(|value| *value != 0.0);

    if let Some(eur) = given(explicit_eur) {
        return Some(eur);
    }
    if let Some(price) = given(total_price) {
        return Some(to_eur(price, rate_to_eur));
    }
    given(nightly_rate).map(|rate| to_eur(rate * nights as f64, rate_to_eur))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CostCategory {
    Flight,
    CarRental,
    Accommodation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub category: CostCategory,
    pub id: Uuid,
    pub label: String,
    #[serde(rename = "costEUR")]
    pub cost_eur: f64,
    pub split: bool,
    #[serde(rename = "groupTotalEUR")]
    pub group_total_eur: f64,
    #[serde(rename = "perPersonEUR")]
    pub per_person_eur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCostSummary {
    pub trip_id: Uuid,
    pub people: i32,
    pub lines: Vec<CostLine>,
    #[serde(rename = "totalCostEUR")]
    pub total_cost_eur: f64,
    #[serde(rename = "perPersonEUR")]
    pub per_person_eur: f64,
    pub formatted_total: String,
    pub formatted_per_person: String,
}

/// A stop's selected accommodation, labelled with the stop it belongs to.
pub struct Stay<'a> {
    pub stop_name: &'a str,
    pub accommodation: &'a Accommodation,
}

fn line(category: CostCategory, id: Uuid, label: String, cost_eur: f64, split: bool, people: i32) -> CostLine {
    let people = people.max(1) as f64;
    let group_total_eur = if split { cost_eur } else { cost_eur * people };
    CostLine {
        category,
        id,
        label,
        cost_eur,
        split,
        group_total_eur,
        per_person_eur: group_total_eur / people,
    }
}

/// Totals the trip's final selections. A split category is shared by the
/// party; an unsplit one is paid by every traveller.
pub fn summarize(
    trip: &Trip,
    flight: Option<&Flight>,
    rental: Option<&CarRental>,
    stays: &[Stay<'_>],
) -> TripCostSummary {
    let mut lines = Vec::new();

    if let Some(flight) = flight {
        let label = format!("{} {} → {}", flight.airline, flight.from_airport, flight.to_airport);
        lines.push(line(
            CostCategory::Flight,
            flight.id,
            label,
            flight.total_cost_eur,
            trip.split_flight_cost,
            trip.people,
        ));
    }
    if let Some(rental) = rental {
        lines.push(line(
            CostCategory::CarRental,
            rental.id,
            rental.provider.clone(),
            rental.total_cost_eur,
            trip.split_car_rental_cost,
            trip.people,
        ));
    }
    for stay in stays {
        lines.push(line(
            CostCategory::Accommodation,
            stay.accommodation.id,
            format!("{} ({})", stay.accommodation.name, stay.stop_name),
            stay.accommodation.total_cost_eur.unwrap_or(0.0),
            trip.split_accommodation_cost,
            trip.people,
        ));
    }

    let total_cost_eur: f64 = lines.iter().map(|line| line.group_total_eur).sum();
    let per_person_eur = total_cost_eur / trip.people.max(1) as f64;

    TripCostSummary {
        trip_id: trip.id,
        people: trip.people,
        lines,
        total_cost_eur,
        per_person_eur,
        formatted_total: format_money(total_cost_eur),
        formatted_per_person: format_money(per_person_eur),
    }
}
