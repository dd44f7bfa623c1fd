use std::sync::Arc;
use std::time::Duration;

use scout_core::{ApiError, SearchKey};
use scout_engine::{ApiSettings, EngineEvent, Poller, ReqwestTransport};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn key(keyword: &str) -> SearchKey {
    SearchKey::parse(keyword, "Austin").unwrap()
}

fn status_body(keyword: &str, found: u64) -> serde_json::Value {
    json!({
        "data": {
            "keyword": keyword,
            "location": "Austin",
            "totalFound": found,
            "progress": { "processed": found, "total": 12 }
        }
    })
}

fn poller_for(
    server: &MockServer,
    interval: Duration,
) -> (Poller, mpsc::UnboundedReceiver<EngineEvent>) {
    let transport = ReqwestTransport::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("transport");
    let (tx, rx) = mpsc::unbounded_channel();
    (Poller::new(Arc::new(transport), interval, tx), rx)
}

async fn drain_for(rx: &mut mpsc::UnboundedReceiver<EngineEvent>, window: Duration) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn first_check_is_immediate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scraper/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("coffee", 5)))
        .mount(&server)
        .await;

    // An hour-long interval: only the immediate tick can arrive in time.
    let (poller, mut rx) = poller_for(&server, Duration::from_secs(3600));
    poller.start_observing(key("coffee"), 1);

    let event = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("tick in time")
        .expect("channel open");
    match event {
        EngineEvent::StatusChecked {
            key: k,
            generation,
            seq,
            result,
        } => {
            assert_eq!(k, key("coffee"));
            assert_eq!((generation, seq), (1, 1));
            assert_eq!(result.expect("snapshot").total_found, 5);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(poller.observing(), Some((key("coffee"), 1)));
}

#[tokio::test]
async fn stop_discards_in_flight_tick() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scraper/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(status_body("coffee", 5)),
        )
        .mount(&server)
        .await;

    let (poller, mut rx) = poller_for(&server, Duration::from_secs(3600));
    poller.start_observing(key("coffee"), 1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    poller.stop_observing();

    let events = drain_for(&mut rx, Duration::from_millis(600)).await;
    assert!(events.is_empty(), "got {events:?}");
    assert_eq!(poller.observing(), None);
}

#[tokio::test]
async fn retarget_drops_ticks_of_previous_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scraper/status"))
        .and(query_param("keyword", "coffee"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(status_body("coffee", 9)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/scraper/status"))
        .and(query_param("keyword", "bakery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("bakery", 1)))
        .mount(&server)
        .await;

    let (poller, mut rx) = poller_for(&server, Duration::from_secs(3600));
    poller.start_observing(key("coffee"), 1);
    tokio::time::sleep(Duration::from_millis(20)).await;
    poller.start_observing(key("bakery"), 2);

    let events = drain_for(&mut rx, Duration::from_millis(600)).await;
    assert_eq!(events.len(), 1, "got {events:?}");
    assert!(matches!(
        &events[0],
        EngineEvent::StatusChecked { key: k, generation: 2, .. } if *k == key("bakery")
    ));
}

#[tokio::test]
async fn failures_do_not_stop_the_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scraper/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (poller, mut rx) = poller_for(&server, Duration::from_millis(50));
    poller.start_observing(key("coffee"), 7);

    let events = drain_for(&mut rx, Duration::from_millis(400)).await;
    poller.stop_observing();

    assert!(events.len() >= 2, "got {events:?}");
    let mut seqs = Vec::new();
    for event in events {
        match event {
            EngineEvent::StatusChecked {
                generation,
                seq,
                result,
                ..
            } => {
                assert_eq!(generation, 7);
                assert_eq!(result, Err(ApiError::HttpStatus { status: 500 }));
                seqs.push(seq);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    // Every tick is reported exactly once.
    let count = seqs.len();
    seqs.sort_unstable();
    seqs.dedup();
    assert_eq!(seqs.len(), count);
}
