pub mod costs;
pub mod derivation;
pub mod segments;
pub mod stops;

pub use segments::FlightLeg;

/// Divides `value` by `unit`, rounding halves towards positive infinity.
pub(crate) fn round_div(value: i64, unit: i64) -> i64 {
    (value + unit / 2).div_euclid(unit)
}

/// Divides `value` by `unit`, rounding up.
pub(crate) fn ceil_div(value: i64, unit: i64) -> i64 {
    (value + unit - 1).div_euclid(unit)
}
