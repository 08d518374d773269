mod frankfurter;

pub use frankfurter::RatesApi;
