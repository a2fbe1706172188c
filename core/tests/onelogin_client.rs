// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OneLogin client behavior against a mock token and user-search endpoint.

use idsync::OneLoginClient;
use idsync::OneLoginConfig;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

fn discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

fn config(server: &MockServer) -> OneLoginConfig {
    OneLoginConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        base_url: server.uri(),
    }
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/oauth2/v2/token"))
        .and(body_partial_json(json!({
            "grant_type": "client_credentials",
            "client_id": "client-id",
            "client_secret": "client-secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ol-token",
            "token_type": "bearer",
            "expires_in": 36000
        })))
        .mount(server)
        .await;
}

#[test]
fn test_connect_exchanges_client_credentials_once() {
    let rt = Runtime::new().unwrap();

    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        server
    });

    OneLoginClient::connect(&config(&server), &discard_logger()).unwrap();
}

#[test]
fn test_failed_token_exchange_is_fatal() {
    let rt = Runtime::new().unwrap();

    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/oauth2/v2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": {
                    "error": true,
                    "message": "Authentication Failure"
                }
            })))
            .mount(&server)
            .await;
        server
    });

    let err = OneLoginClient::connect(&config(&server), &discard_logger())
        .unwrap_err();
    assert!(format!("{err:#}").contains("401"));
}

#[test]
fn test_find_user_sends_the_legacy_bearer_header() {
    let rt = Runtime::new().unwrap();

    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/1/users"))
            .and(query_param("email", "dschrute@dundermifflin.com"))
            .and(header("Authorization", "bearer:ol-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": { "code": 200 },
                "data": [{
                    "id": 29918,
                    "username": "dschrute",
                    "firstname": "Dwight",
                    "lastname": "Schrute",
                    "email": "dschrute@dundermifflin.com"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client =
        OneLoginClient::connect(&config(&server), &discard_logger()).unwrap();

    let user = client
        .find_user("dschrute@dundermifflin.com")
        .unwrap()
        .expect("profile should be found");

    let record = user.into_record("member");
    assert_eq!(record.user_name, "dschrute");
    assert_eq!(record.external_id, "29918");
}

#[test]
fn test_find_user_with_no_match_returns_none() {
    let rt = Runtime::new().unwrap();

    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": { "code": 200 },
                "data": []
            })))
            .mount(&server)
            .await;
        server
    });

    let client =
        OneLoginClient::connect(&config(&server), &discard_logger()).unwrap();

    assert!(client.find_user("nobody@dundermifflin.com").unwrap().is_none());
}
