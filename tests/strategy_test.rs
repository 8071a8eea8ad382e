/// Strategy tests - both reference strategies against a canned backend
///
/// Tests cover:
/// - Pagination and limits
/// - Per-region failure tolerance
/// - Cancellation checkpoints
/// - Connection probes
/// - A full job over the registry strategy
mod utils;

use school_finder_lib::modules::provider::{
    PlacesStrategy, RegistryStrategy, ScrapeProgress, ScrapeRequest, ScrapingStrategy,
};
use school_finder_lib::modules::school::SchoolRepository;
use school_finder_lib::shared::utils::ProxyRotator;
use school_finder_lib::{AppError, JobStatus, ScrapingJobRequest};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use utils::canned_server::{CannedResponse, CannedServer};
use utils::helpers::{build_orchestrator, fast_client, wait_for_terminal};

fn institution(number: u64, name: &str, city: &str) -> Value {
    json!({
        "numerRspo": number,
        "nazwa": name,
        "typ": {"id": 3, "nazwa": "Szkoła podstawowa"},
        "miejscowosc": city,
        "ulica": "ul. Szkolna",
        "numerBudynku": number.to_string(),
        "kodPocztowy": "00-001",
        "telefon": "22 123 45 67",
        "email": format!("sekretariat{}@szkola.edu.pl", number),
        "geolokalizacja": {"latitude": 52.23, "longitude": 21.01}
    })
}

fn listing(members: Vec<Value>) -> CannedResponse {
    let total = members.len();
    CannedResponse::json(json!({"hydra:member": members, "hydra:totalItems": total}))
}

/// mazowieckie: two pages; pomorskie: always 500; slaskie: one page, then 500
async fn registry_server() -> CannedServer {
    CannedServer::start(|line| {
        if line.contains("wojewodztwo_nazwa=mazowieckie") {
            if line.contains("page=1&") {
                listing(vec![
                    institution(101, "SP nr 1", "Warszawa"),
                    institution(102, "SP nr 2", "Warszawa"),
                ])
            } else if line.contains("page=2&") {
                listing(vec![institution(103, "LO nr 3", "Radom")])
            } else {
                listing(Vec::new())
            }
        } else if line.contains("wojewodztwo_nazwa=pomorskie") {
            CannedResponse::status(500)
        } else if line.contains("wojewodztwo_nazwa=slaskie") {
            if line.contains("page=1&") {
                listing(vec![institution(201, "SP nr 7", "Katowice")])
            } else {
                CannedResponse::status(500)
            }
        } else {
            listing(Vec::new())
        }
    })
    .await
}

fn registry(server: &CannedServer) -> RegistryStrategy {
    RegistryStrategy::new(fast_client(Arc::new(ProxyRotator::disabled()), 2), &server.url)
}

fn regions(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn recording_callback() -> (Arc<Mutex<Vec<u8>>>, Arc<dyn Fn(ScrapeProgress) + Send + Sync>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (
        seen,
        Arc::new(move |progress: ScrapeProgress| sink.lock().unwrap().push(progress.percentage)),
    )
}

#[tokio::test]
async fn registry_keeps_records_from_regions_that_succeed() {
    let server = registry_server().await;
    let (seen, on_progress) = recording_callback();
    let request = ScrapeRequest::new(regions(&["mazowieckie", "pomorskie", "slaskie"]), 0);

    let records = registry(&server).scrape(&request, on_progress).await.unwrap();

    let ids: Vec<_> = records
        .iter()
        .map(|r| r.external_id.clone().unwrap())
        .collect();
    assert_eq!(ids, vec!["rspo:101", "rspo:102", "rspo:103", "rspo:201"]);
    assert_eq!(records[0].address, "ul. Szkolna 101, 00-001 Warszawa");
    assert_eq!(
        records[0].contact.as_ref().unwrap().email.as_deref(),
        Some("sekretariat101@szkola.edu.pl")
    );
    assert!(records[0].coordinates.is_some());

    let seen = seen.lock().unwrap().clone();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test]
async fn registry_stops_paging_at_the_limit() {
    let server = registry_server().await;
    let request = ScrapeRequest::new(regions(&["mazowieckie"]), 2);

    let records = registry(&server)
        .scrape(&request, Arc::new(|_| {}))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn registry_honours_cancellation_before_fetching() {
    let server = registry_server().await;
    let request = ScrapeRequest::new(regions(&["mazowieckie", "slaskie"]), 0);
    request.cancellation.cancel();

    let records = registry(&server)
        .scrape(&request, Arc::new(|_| {}))
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn registry_connection_probe() {
    let healthy = registry_server().await;
    assert!(registry(&healthy).test_connection().await.unwrap());

    let broken = CannedServer::sequence(vec![CannedResponse::status(503)]).await;
    assert!(matches!(
        registry(&broken).test_connection().await,
        Err(AppError::FetchFailed { attempts: 1, .. })
    ));
}

fn place(id: &str, name: &str, rating: f64) -> Value {
    json!({
        "place_id": id,
        "name": name,
        "formatted_address": "ul. Polna 1, 00-950 Warszawa",
        "geometry": {"location": {"lat": 52.2, "lng": 21.0}},
        "rating": rating,
        "user_ratings_total": 40,
        "types": ["primary_school", "school"]
    })
}

async fn places_server() -> CannedServer {
    CannedServer::start(|line| {
        if line.contains("/findplacefromtext/json") {
            CannedResponse::json(json!({"status": "OK", "candidates": []}))
        } else if line.contains("pagetoken=tok-2") {
            CannedResponse::json(json!({
                "status": "OK",
                "results": [place("place-c", "SP nr 3", 3.9)]
            }))
        } else if line.contains("mazowieckie") {
            CannedResponse::json(json!({
                "status": "OK",
                "results": [place("place-a", "SP nr 1", 4.5), place("place-b", "SP nr 2", 4.1)],
                "next_page_token": "tok-2"
            }))
        } else {
            CannedResponse::json(json!({"status": "REQUEST_DENIED", "error_message": "bad key"}))
        }
    })
    .await
}

fn places(server: &CannedServer, api_key: Option<&str>) -> PlacesStrategy {
    PlacesStrategy::new(
        fast_client(Arc::new(ProxyRotator::disabled()), 2),
        api_key.map(String::from),
        &server.url,
    )
}

#[tokio::test]
async fn places_follows_page_tokens_and_skips_denied_regions() {
    let server = places_server().await;
    let request = ScrapeRequest::new(regions(&["mazowieckie", "pomorskie"]), 0);

    let records = places(&server, Some("test-key"))
        .scrape(&request, Arc::new(|_| {}))
        .await
        .unwrap();

    let ids: Vec<_> = records
        .iter()
        .map(|r| r.external_id.clone().unwrap())
        .collect();
    assert_eq!(ids, vec!["place-a", "place-b", "place-c"]);
    assert_eq!(records[0].rating, Some(4.5));
    assert_eq!(records[0].institution_type.as_deref(), Some("szkoła podstawowa"));

    let requests = server.requests();
    assert!(requests.iter().all(|line| line.contains("key=test-key")));
    assert!(requests[0].contains("language=pl"));
}

#[tokio::test]
async fn places_keeps_earlier_pages_when_a_later_page_fails() {
    let server = CannedServer::start(|line| {
        if line.contains("pagetoken=tok-2") {
            CannedResponse::status(500)
        } else {
            CannedResponse::json(json!({
                "status": "OK",
                "results": [place("place-a", "SP nr 1", 4.5), place("place-b", "SP nr 2", 4.1)],
                "next_page_token": "tok-2"
            }))
        }
    })
    .await;
    let request = ScrapeRequest::new(regions(&["mazowieckie"]), 0);

    let records = places(&server, Some("test-key"))
        .scrape(&request, Arc::new(|_| {}))
        .await
        .unwrap();

    let ids: Vec<_> = records
        .iter()
        .map(|r| r.external_id.clone().unwrap())
        .collect();
    assert_eq!(ids, vec!["place-a", "place-b"]);
    // First page once, then the failing page on both attempts
    assert_eq!(server.request_count(), 3);
}

#[tokio::test]
async fn places_without_key_fails_fast_and_probes_false() {
    let server = places_server().await;
    let strategy = places(&server, None);
    let request = ScrapeRequest::new(regions(&["mazowieckie"]), 0);

    assert!(matches!(
        strategy.scrape(&request, Arc::new(|_| {})).await,
        Err(AppError::ConfigurationError(_))
    ));
    assert!(!strategy.test_connection().await.unwrap());
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn places_connection_probe_with_key() {
    let server = places_server().await;
    assert!(places(&server, Some("test-key")).test_connection().await.unwrap());
    assert!(server.requests()[0].contains("inputtype=textquery"));
}

#[tokio::test]
async fn job_completes_despite_a_failing_region_and_reruns_idempotently() {
    let server = registry_server().await;
    let test = build_orchestrator(vec![Arc::new(registry(&server))]);
    let request =
        ScrapingJobRequest::new("registry", &["mazowieckie", "pomorskie", "slaskie"], 0);

    let first = test.orchestrator.start_job(request.clone()).await.unwrap();
    let job = wait_for_terminal(&test.orchestrator, &first).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.schools_processed, 4);
    assert_eq!(test.repository.count().await.unwrap(), 4);

    let second = test.orchestrator.start_job(request).await.unwrap();
    wait_for_terminal(&test.orchestrator, &second).await;
    assert_eq!(test.repository.count().await.unwrap(), 4);

    let school = test
        .repository
        .find_by_external_id("rspo:103")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(school.name, "LO nr 3");
    assert_eq!(school.address, "ul. Szkolna 103, 00-001 Radom");
}
