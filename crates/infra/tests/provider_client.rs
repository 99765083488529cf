//! Integration tests for the partner API client
//!
//! **Purpose**: Check the full client path: OAuth token exchange, credential
//! cache, request formatting and answer classification against a mock
//! partner API.
//!
//! **Coverage:**
//! - Identity search: success, business rejection, empty identity id
//! - Status update: success, business rejection, request body shape
//! - Transport failures: rate limit, server error, garbage body, missing
//!   exit code, token endpoint failure
//! - A 401 drops the cached token so the next call fetches a new one

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::time::Duration;

use passiae_core::{IdentitySearch, PassIaeUpdate, PeApiClient};
use passiae_domain::{ProviderOutcome, TransportFailureKind};
use serde_json::json;
use support::{
    api_client, api_client_with_timeout, date, search_answer, token_mock, update_answer,
    SEARCH_PATH, TOKEN_PATH, UPDATE_PATH,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search() -> IdentitySearch {
    IdentitySearch {
        first_name: "Jean Pierre".into(),
        last_name: "Dupré".into(),
        birthdate: date(1990, 5, 4),
        nir: "190057512345678".into(),
    }
}

fn update() -> PassIaeUpdate {
    PassIaeUpdate {
        number: "XXXXX0000001".into(),
        start_at: date(2024, 1, 15),
        end_at: date(2026, 1, 14),
        id_national: "OBF-1001".into(),
        siret: "12345678900012".into(),
        type_siae: 836,
        origine_candidature: "PRES".into(),
        typologie_prescripteur: Some("ML".into()),
    }
}

fn transport_kind<T: std::fmt::Debug>(outcome: ProviderOutcome<T>) -> TransportFailureKind {
    match outcome {
        ProviderOutcome::TransportFailure(failure) => failure.kind,
        other => panic!("expected a transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn identity_search_success_returns_identity_id() {
    let server = MockServer::start().await;
    token_mock().expect(1).mount(&server).await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .and(header("authorization", "Bearer abc"))
        .and(body_json(json!({
            "nirCertifie": "1900575123456",
            "nomNaissance": "DUPRE",
            "prenom": "JEAN-PIERRE",
            "dateNaissance": "1990-05-04",
        })))
        .respond_with(search_answer("S001", "OBF-1001"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = api_client(&server).recherche_individu_certifie(&search()).await.unwrap();

    assert_eq!(outcome, ProviderOutcome::Success("OBF-1001".to_string()));
}

#[tokio::test]
async fn identity_search_multiple_matches_is_a_business_rejection() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(search_answer("S002", ""))
        .mount(&server)
        .await;

    let outcome = api_client(&server).recherche_individu_certifie(&search()).await.unwrap();

    assert_eq!(outcome, ProviderOutcome::BusinessRejection("S002".to_string()));
}

#[tokio::test]
async fn identity_search_success_without_identity_id_is_rejected() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(search_answer("S001", ""))
        .mount(&server)
        .await;

    let outcome = api_client(&server).recherche_individu_certifie(&search()).await.unwrap();

    assert_eq!(outcome, ProviderOutcome::BusinessRejection("empty_nir".to_string()));
}

#[tokio::test]
async fn status_update_sends_formatted_body_and_accepts_s000() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .and(header("authorization", "Bearer abc"))
        .and(body_json(json!({
            "dateDebutPassIAE": "2024-01-15",
            "dateFinPassIAE": "2026-01-14",
            "idNational": "OBF-1001",
            "numPassIAE": "XXXXX0000001",
            "numSIRETsiae": "12345678900012",
            "origineCandidature": "PRES",
            "statutReponsePassIAE": "A",
            "typeSIAE": 836,
            "typologiePrescripteur": "ML",
        })))
        .respond_with(update_answer("S000"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = api_client(&server).mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(outcome, ProviderOutcome::Success(()));
}

#[tokio::test]
async fn status_update_rejection_carries_the_exit_code() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(update_answer("S022"))
        .mount(&server)
        .await;

    let outcome = api_client(&server).mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(outcome, ProviderOutcome::BusinessRejection("S022".to_string()));
}

#[tokio::test]
async fn partial_content_answer_still_carries_an_exit_code() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(206).set_body_json(json!({"codeSortie": "S031"})))
        .mount(&server)
        .await;

    let outcome = api_client(&server).mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(outcome, ProviderOutcome::BusinessRejection("S031".to_string()));
}

#[tokio::test]
async fn rate_limit_is_a_transport_failure() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let outcome = api_client(&server).mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(transport_kind(outcome), TransportFailureKind::RateLimited);
}

#[tokio::test]
async fn server_error_is_a_transport_failure() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = api_client(&server).recherche_individu_certifie(&search()).await.unwrap();

    assert_eq!(transport_kind(outcome), TransportFailureKind::HttpStatus(500));
}

#[tokio::test]
async fn garbage_body_is_a_malformed_response() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let outcome = api_client(&server).recherche_individu_certifie(&search()).await.unwrap();

    assert_eq!(transport_kind(outcome), TransportFailureKind::MalformedResponse);
}

#[tokio::test]
async fn answer_without_exit_code_is_a_malformed_response() {
    let server = MockServer::start().await;
    token_mock().mount(&server).await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let outcome = api_client(&server).mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(transport_kind(outcome), TransportFailureKind::MalformedResponse);
}

#[tokio::test]
async fn unauthorized_answer_drops_the_cached_token() {
    let server = MockServer::start().await;
    token_mock().expect(2).mount(&server).await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(update_answer("S000"))
        .mount(&server)
        .await;
    let client = api_client(&server);

    let first = client.mise_a_jour_pass_iae(&update()).await.unwrap();
    let second = client.mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(transport_kind(first), TransportFailureKind::Unauthorized);
    assert_eq!(second, ProviderOutcome::Success(()));
}

#[tokio::test]
async fn token_is_reused_across_calls() {
    let server = MockServer::start().await;
    token_mock().expect(1).mount(&server).await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(search_answer("S001", "OBF-1001"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(update_answer("S000"))
        .mount(&server)
        .await;
    let client = api_client(&server);

    client.recherche_individu_certifie(&search()).await.unwrap();
    client.mise_a_jour_pass_iae(&update()).await.unwrap();
}

#[tokio::test]
async fn token_endpoint_failure_stops_before_the_api_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(update_answer("S000"))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = api_client(&server).mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(transport_kind(outcome), TransportFailureKind::Unauthorized);
}

#[tokio::test]
async fn token_endpoint_timeout_stops_before_the_api_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "token_type": "Bearer",
                    "access_token": "abc",
                    "expires_in": 1200,
                }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(update_answer("S000"))
        .expect(0)
        .mount(&server)
        .await;
    let client = api_client_with_timeout(&server, Duration::from_millis(200));

    let outcome = client.mise_a_jour_pass_iae(&update()).await.unwrap();

    assert_eq!(transport_kind(outcome), TransportFailureKind::Timeout);
}
