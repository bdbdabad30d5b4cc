pub mod geocode;
pub mod locate;
pub mod open_meteo;
pub mod openweathermap;
pub mod provider;
pub mod weatherapi;

use std::time::Duration;

use reqwest::Client;

pub(crate) fn http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("reqwest client")
}

/// Element `idx` of an Open-Meteo style column, `None` when short or null.
pub(crate) fn column<T: Copy>(values: &[Option<T>], idx: usize) -> Option<T> {
    values.get(idx).copied().flatten()
}
