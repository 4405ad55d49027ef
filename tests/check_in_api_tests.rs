// SPDX-License-Identifier: MIT

//! Check-in submission endpoint tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use gym_pulse::models::Coordinates;
use gym_pulse::services::GeolocationError;
use tower::ServiceExt;

mod common;

fn check_in_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/check-ins")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_check_in_accepted_at_the_gym() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(check_in_request(
            r#"{"gym_id":"mtl-anytime-1","user_id":"user-1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["accepted"], true);
    assert_eq!(body["check_in"]["gym_id"], "mtl-anytime-1");
    assert_eq!(body["check_in"]["distance_meters"], 0);

    // The accepted check-in is persisted in the session
    assert_eq!(state.session.snapshot().len(), 1);
}

#[tokio::test]
async fn test_check_in_defaults_to_session_user() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(check_in_request(r#"{"gym_id":"mtl-anytime-1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["accepted"], true);
    assert_eq!(
        body["check_in"]["user_id"].as_str().unwrap(),
        state.session.user_id()
    );
}

#[tokio::test]
async fn test_check_in_rejected_outside_geofence() {
    // ~1.1 km north of the gym
    let (app, state) = common::TestAppBuilder::new()
        .position(Coordinates {
            lat: common::DOWNTOWN_GYM.lat + 0.01,
            lng: common::DOWNTOWN_GYM.lng,
        })
        .build();

    let response = app
        .oneshot(check_in_request(
            r#"{"gym_id":"mtl-anytime-1","user_id":"user-1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["accepted"], false);
    assert_eq!(body["reason"], "out_of_range");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("m away"), "got {}", message);

    assert!(state.session.snapshot().is_empty(), "nothing persisted");
}

#[tokio::test]
async fn test_check_in_rate_limited_with_minutes_remaining() {
    // Same user checked into the same gym 10 minutes ago
    let (app, _state) = common::TestAppBuilder::new()
        .check_ins(vec![common::check_in_ago(
            "mtl-anytime-1",
            "user-1",
            10 * 60_000,
        )])
        .build();

    let response = app
        .oneshot(check_in_request(
            r#"{"gym_id":"mtl-anytime-1","user_id":"user-1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["accepted"], false);
    assert_eq!(body["reason"], "rate_limited");
    assert!(
        body["message"].as_str().unwrap().contains("50 minute"),
        "got {}",
        body["message"]
    );
}

#[tokio::test]
async fn test_check_in_allowed_after_rate_limit_expires() {
    let (app, _state) = common::TestAppBuilder::new()
        .check_ins(vec![common::check_in_ago(
            "mtl-anytime-1",
            "user-1",
            61 * 60_000,
        )])
        .build();

    let response = app
        .oneshot(check_in_request(
            r#"{"gym_id":"mtl-anytime-1","user_id":"user-1"}"#,
        ))
        .await
        .unwrap();

    let body = common::body_json(response).await;
    assert_eq!(body["accepted"], true);
}

#[tokio::test]
async fn test_check_in_geolocation_failure_reason() {
    let (app, _state) = common::TestAppBuilder::new()
        .geolocation_failure(GeolocationError::PermissionDenied)
        .build();

    let response = app
        .oneshot(check_in_request(
            r#"{"gym_id":"mtl-anytime-1","user_id":"user-1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;

    assert_eq!(body["accepted"], false);
    assert_eq!(body["reason"], "geolocation");
    assert_eq!(body["message"], "Location permission was denied");
}

#[tokio::test]
async fn test_check_in_unknown_gym_is_404() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(check_in_request(
            r#"{"gym_id":"ghost-gym","user_id":"user-1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check_in_empty_gym_id_is_400() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(check_in_request(r#"{"gym_id":"","user_id":"user-1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
