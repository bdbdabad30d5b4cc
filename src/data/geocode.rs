use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http_client;
use crate::domain::weather::{GeocodeCandidate, GeocodeResolution};

pub const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const RESULT_COUNT: &str = "5";
const AMBIGUITY_POPULATION_RATIO: f64 = 1.10;

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeClient {
    pub fn new() -> Self {
        Self::with_base_url(GEOCODE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(8),
            base_url: base_url.into(),
        }
    }

    /// Candidates in ranked order. Blank queries never hit the network.
    pub async fn search(
        &self,
        city: &str,
        country_code: Option<&str>,
    ) -> Result<Vec<GeocodeCandidate>> {
        Ok(self
            .fetch_ranked(city, country_code)
            .await?
            .into_iter()
            .map(|scored| scored.candidate)
            .collect())
    }

    /// Picks a single candidate when the ranking is decisive.
    pub async fn resolve(
        &self,
        city: &str,
        country_code: Option<&str>,
    ) -> Result<GeocodeResolution> {
        let mut ranked = self.fetch_ranked(city, country_code).await?;
        if ranked.is_empty() {
            return Ok(GeocodeResolution::NotFound(city.trim().to_string()));
        }

        let top = ranked.remove(0);

        if let Some(second) = ranked.first()
            && is_ambiguous(&top, second)
        {
            let mut options = vec![top.candidate];
            options.extend(ranked.into_iter().map(|s| s.candidate).take(4));
            return Ok(GeocodeResolution::NeedsDisambiguation(options));
        }

        Ok(GeocodeResolution::Selected(top.candidate))
    }

    async fn fetch_ranked(
        &self,
        city: &str,
        country_code: Option<&str>,
    ) -> Result<Vec<ScoredCandidate>> {
        let query = city.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.client.get(&self.base_url).query(&[
            ("name", query),
            ("count", RESULT_COUNT),
            ("language", "en"),
            ("format", "json"),
        ]);

        if let Some(code) = country_code {
            request = request.query(&[("countryCode", code)]);
        }

        let response = request
            .send()
            .await
            .context("geocoding request failed")?
            .error_for_status()
            .context("geocoding request returned non-success status")?;

        let payload: GeocodeResponse = response
            .json()
            .await
            .context("failed to decode geocoding response")?;

        let results = payload.results.unwrap_or_default();
        debug!(query, hits = results.len(), "geocoding search");

        Ok(rank_candidates(results, query, country_code))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
    population: Option<u64>,
}

#[derive(Debug, Clone)]
struct ScoredCandidate {
    candidate: GeocodeCandidate,
    exact_name_match: bool,
    country_match: bool,
    population: u64,
    api_order: usize,
}

fn rank_candidates(
    results: Vec<GeocodeResult>,
    city: &str,
    country_code: Option<&str>,
) -> Vec<ScoredCandidate> {
    let normalized_city = normalize(city);

    let mut scored: Vec<ScoredCandidate> = results
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let exact_name_match = normalize(&entry.name) == normalized_city;
            let country_match = country_code.is_some_and(|cc| {
                entry
                    .country_code
                    .as_deref()
                    .is_some_and(|country| country.eq_ignore_ascii_case(cc))
            });

            ScoredCandidate {
                population: entry.population.unwrap_or_default(),
                candidate: GeocodeCandidate {
                    name: entry.name,
                    latitude: entry.latitude,
                    longitude: entry.longitude,
                    country: entry.country,
                    country_code: entry.country_code,
                    admin1: entry.admin1,
                    population: entry.population,
                },
                exact_name_match,
                country_match,
                api_order: idx,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.exact_name_match
            .cmp(&a.exact_name_match)
            .then_with(|| b.country_match.cmp(&a.country_match))
            .then_with(|| b.population.cmp(&a.population))
            .then_with(|| a.api_order.cmp(&b.api_order))
    });

    scored
}

fn is_ambiguous(top: &ScoredCandidate, second: &ScoredCandidate) -> bool {
    if top.exact_name_match != second.exact_name_match {
        return false;
    }
    if top.country_match != second.country_match {
        return false;
    }

    let p1 = top.population.max(1) as f64;
    let p2 = second.population.max(1) as f64;
    let ratio = if p1 >= p2 { p1 / p2 } else { p2 / p1 };
    ratio <= AMBIGUITY_POPULATION_RATIO
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
