//! End-to-end tests against a running server.

use std::time::{Duration, Instant};

use serde_json::Value;
use whoami_server::PlacementInfo;

mod common;

#[tokio::test]
async fn test_text_response_layout() {
    let (addr, shutdown) = common::start_server(common::test_config(), PlacementInfo::unknown()).await;

    let res = common::client()
        .get(format!("http://{}/some/path?x=1", addr))
        .header("X-Test", "a")
        .send()
        .await
        .expect("Server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");
    let body = res.text().await.unwrap();

    let mut lines = body.lines();
    assert!(lines.next().unwrap().starts_with("Hostname: "));
    let mut line = lines.next().unwrap();
    while line.starts_with("IP: ") {
        line = lines.next().unwrap();
    }
    assert!(line.starts_with("RemoteAddr: 127.0.0.1:"));
    assert_eq!(lines.next(), Some("GET /some/path?x=1 HTTP/1.1"));
    assert_eq!(lines.next(), Some(format!("Host: {}", addr).as_str()));
    assert!(body.contains("X-Test: a\r\n"));
    assert!(body.ends_with("\r\n\r\n"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_api_document() {
    let placement = PlacementInfo::new(Some("us-west-2".into()), Some("us-west-2c".into()));
    let (addr, shutdown) = common::start_server(common::test_config(), placement).await;

    let res = common::client()
        .get(format!("http://{}/api", addr))
        .header("X-Test", "a")
        .header("X-Test", "b")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    let doc: Value = res.json().await.unwrap();

    assert_eq!(doc["method"], "GET");
    assert_eq!(doc["host"], addr.to_string());
    assert_eq!(doc["url"], "/api");
    assert_eq!(doc["region"], "us-west-2");
    assert_eq!(doc["az"], "us-west-2c");
    assert_eq!(doc["headers"]["X-Test"], serde_json::json!(["a", "b"]));
    assert!(doc["headers"].get("Host").is_none());
    assert!(doc["ip"].is_array());
    assert!(doc["time"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_api_without_placement() {
    let (addr, shutdown) = common::start_server(common::test_config(), PlacementInfo::unknown()).await;

    let doc: Value = common::client()
        .get(format!("http://{}/api", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let object = doc.as_object().unwrap();
    assert!(!object.contains_key("region"));
    assert!(!object.contains_key("az"));
    assert!(object["ip"].is_array());
    assert!(object.contains_key("time"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_wait_delays_only_its_own_request() {
    let (addr, shutdown) = common::start_server(common::test_config(), PlacementInfo::unknown()).await;
    let client = common::client();

    let slow = {
        let client = client.clone();
        tokio::spawn(async move {
            let start = Instant::now();
            let res = client
                .get(format!("http://{}/?wait=250ms", addr))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), 200);
            start.elapsed()
        })
    };

    // Give the slow request a head start so it is sleeping when we ask.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let start = Instant::now();
    let res = client.get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let fast = start.elapsed();

    let slow = slow.await.unwrap();
    assert!(slow >= Duration::from_millis(250), "slow request took {:?}", slow);
    assert!(fast < Duration::from_millis(200), "fast request took {:?}", fast);

    shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_wait_is_ignored() {
    let (addr, shutdown) = common::start_server(common::test_config(), PlacementInfo::unknown()).await;

    let start = Instant::now();
    let res = common::client()
        .get(format!("http://{}/?wait=not-a-duration", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(start.elapsed() < Duration::from_millis(200));
    let body = res.text().await.unwrap();
    assert!(body.contains("GET /?wait=not-a-duration HTTP/1.1\r\n"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_post_body_is_echoed() {
    let (addr, shutdown) = common::start_server(common::test_config(), PlacementInfo::unknown()).await;

    let res = common::client()
        .post(format!("http://{}/submit", addr))
        .body("ping=pong")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body = res.text().await.unwrap();
    assert!(body.contains("POST /submit HTTP/1.1\r\n"));
    assert!(body.contains("Content-Length: 9\r\n"));
    assert!(body.ends_with("\r\n\r\nping=pong"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_returns_500() {
    let mut config = common::test_config();
    config.limits.max_echo_body_bytes = 8;
    let (addr, shutdown) = common::start_server(config, PlacementInfo::unknown()).await;

    let res = common::client()
        .post(format!("http://{}/", addr))
        .body("this body is longer than eight bytes")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert!(body.starts_with("failed to read request body"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_drains_short_waits() {
    let mut config = common::test_config();
    config.limits.shutdown_grace_secs = 5;
    let (addr, shutdown, server) = common::spawn_server(config, PlacementInfo::unknown()).await;

    let request = tokio::spawn(async move {
        common::client()
            .get(format!("http://{}/?wait=300ms", addr))
            .send()
            .await
            .map(|res| res.status())
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();

    let status = request.await.unwrap().expect("Request dropped during drain");
    assert_eq!(status, 200);
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("Server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_abandons_long_waits_after_grace() {
    let mut config = common::test_config();
    config.limits.shutdown_grace_secs = 1;
    let (addr, shutdown, server) = common::spawn_server(config, PlacementInfo::unknown()).await;

    let _request = tokio::spawn(async move {
        let _ = common::client()
            .get(format!("http://{}/?wait=8760h", addr))
            .send()
            .await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let start = Instant::now();
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("Server kept waiting on an hour-long request")
        .unwrap()
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(900));
}
