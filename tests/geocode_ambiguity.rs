mod common;

use common::geocode_results;
use weather_lens::{data::geocode::GeocodeClient, domain::weather::GeocodeResolution};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn geocoder(body: serde_json::Value) -> (MockServer, GeocodeClient) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    let client = GeocodeClient::with_base_url(format!("{}/v1/search", server.uri()));
    (server, client)
}

#[tokio::test]
async fn ambiguous_candidates_trigger_selector_resolution() {
    let (_server, client) = geocoder(geocode_results(&[
        ("Springfield", "Illinois", "US", 115_000),
        ("Springfield", "Oregon", "US", 112_000),
    ]))
    .await;

    match client.resolve("Springfield", Some("US")).await.expect("resolve") {
        GeocodeResolution::NeedsDisambiguation(options) => {
            assert_eq!(options.len(), 2);
            assert_eq!(options[0].detail_line(), "Springfield, Illinois, United States");
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[tokio::test]
async fn clear_population_lead_selects_directly() {
    let (_server, client) = geocoder(geocode_results(&[
        ("Springfield", "Oregon", "US", 62_000),
        ("Springfield", "Missouri", "US", 169_000),
    ]))
    .await;

    match client.resolve("springfield", None).await.expect("resolve") {
        GeocodeResolution::Selected(candidate) => {
            assert_eq!(candidate.admin1.as_deref(), Some("Missouri"));
            assert_eq!(candidate.to_location().display_name, "Springfield, United States");
        }
        other => panic!("expected a selection, got {other:?}"),
    }
}

#[tokio::test]
async fn search_lists_candidates_in_ranked_order() {
    let (_server, client) = geocoder(geocode_results(&[
        ("Paris Township", "Ohio", "US", 900_000),
        ("Paris", "Texas", "US", 25_000),
        ("Paris", "Tennessee", "US", 10_000),
    ]))
    .await;

    let candidates = client.search("Paris", None).await.expect("search");
    let regions: Vec<_> = candidates
        .iter()
        .map(|candidate| candidate.admin1.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(regions, vec!["Texas", "Tennessee", "Ohio"]);
}

#[tokio::test]
async fn empty_results_are_not_found() {
    let (_server, client) = geocoder(serde_json::json!({})).await;

    match client.resolve("Atlantis", None).await.expect("resolve") {
        GeocodeResolution::NotFound(query) => assert_eq!(query, "Atlantis"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_queries_skip_the_network() {
    let client = GeocodeClient::with_base_url("http://127.0.0.1:9/v1/search");
    let candidates = client.search("   ", None).await.expect("search");
    assert!(candidates.is_empty());
}
