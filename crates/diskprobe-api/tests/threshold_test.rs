//! Threshold endpoint integration tests.
//!
//! Run with: `cargo test -p diskprobe-api --test threshold_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{seeded_status, test_config, test_server, TEST_PATH, TEST_THRESHOLD};

#[tokio::test]
async fn test_not_cached_returns_503() {
    let server = test_server(test_config(false), seeded_status(&[]).await);

    let response = server.get("/").expect_failure().await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.text(), "Disk status not cached yet");
}

#[tokio::test]
async fn test_other_paths_do_not_count() {
    let status = seeded_status(&[("/some/other/path", 42)]).await;
    let server = test_server(test_config(false), status);

    let response = server.get("/").expect_failure().await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_over_threshold_returns_500_with_both_values() {
    let status = seeded_status(&[(TEST_PATH, TEST_THRESHOLD + 1)]).await;
    let server = test_server(test_config(false), status);

    let response = server.get("/").expect_failure().await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text();
    assert!(body.contains(&(TEST_THRESHOLD + 1).to_string()));
    assert!(body.contains(&TEST_THRESHOLD.to_string()));
    assert_eq!(body, "ERROR: Bytes exceed threshold (1000001/1000000)");
}

#[tokio::test]
async fn test_under_threshold_returns_200() {
    let status = seeded_status(&[(TEST_PATH, TEST_THRESHOLD - 1)]).await;
    let server = test_server(test_config(false), status);

    let response = server.get("/").expect_success().await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.text(),
        "OK: /mnt/storage is 999999 bytes; override set to false\n"
    );
}

#[tokio::test]
async fn test_override_returns_200_over_threshold() {
    let status = seeded_status(&[(TEST_PATH, TEST_THRESHOLD + 1)]).await;
    let server = test_server(test_config(true), status);

    let response = server.get("/").expect_success().await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("override set to true"));
}

#[tokio::test]
async fn test_latest_measurement_is_served() {
    let status = seeded_status(&[
        (TEST_PATH, TEST_THRESHOLD + 5),
        (TEST_PATH, 10),
    ])
    .await;
    let server = test_server(test_config(false), status);

    let response = server.get("/").expect_success().await;
    assert!(response.text().contains("is 10 bytes"));
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let status = seeded_status(&[(TEST_PATH, 12_345)]).await;
    let server = test_server(test_config(false), status);

    let first = server.get("/").await;
    let second = server.get("/").await;

    assert_eq!(first.status_code(), second.status_code());
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests() {
    let status = seeded_status(&[(TEST_PATH, 777)]).await;
    let server = test_server(test_config(false), status);

    let requests = (0..64).map(|_| async { server.get("/").await });
    let responses = futures::future::join_all(requests).await;

    for response in responses {
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.text(),
            "OK: /mnt/storage is 777 bytes; override set to false\n"
        );
    }
}
