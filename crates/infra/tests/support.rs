use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use passiae_core::testing::MockClock;
use passiae_domain::{
    ApprovalKind, ApprovalRecord, HiringContext, JobSeekerIdentity, NotificationState,
    ProviderConfig, SenderKind,
};
use passiae_infra::database::{DbManager, SqliteApprovalRepository};
use passiae_infra::http::HttpClient;
use passiae_infra::provider::{CredentialCache, OAuthTokenEndpoint, PeApiHttpClient};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/connexion/oauth2/access_token";
pub const SEARCH_PATH: &str = "/rechercheindividucertifie/v1/rechercheIndividuCertifie";
pub const UPDATE_PATH: &str = "/maj-pass-iae/v1/passIAE/miseAjour";

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new migrated temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn repository(&self) -> SqliteApprovalRepository {
        SqliteApprovalRepository::new(Arc::clone(&self.manager))
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Provider config pointing both the API and the OAuth server at `server`.
pub fn provider_config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        base_url: server.uri(),
        auth_base_url: server.uri(),
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        timeout_secs: 5,
    }
}

/// Partner API client talking to `server`, with its own credential cache.
pub fn api_client(server: &MockServer) -> PeApiHttpClient {
    let config = provider_config(server);
    let endpoint = OAuthTokenEndpoint::new(&config).expect("token endpoint should build");
    let credentials = CredentialCache::new(Arc::new(endpoint), Arc::new(MockClock::at(now())));
    let http = HttpClient::builder().build().expect("http client should build");
    PeApiHttpClient::new(http, &server.uri(), Arc::new(credentials))
}

/// Like [`api_client`], but every request, token exchange included, gives
/// up after `timeout`.
pub fn api_client_with_timeout(server: &MockServer, timeout: Duration) -> PeApiHttpClient {
    let config = provider_config(server);
    let token_http = HttpClient::builder().timeout(timeout).build().expect("http client should build");
    let endpoint = OAuthTokenEndpoint::with_client(token_http, &config);
    let credentials = CredentialCache::new(Arc::new(endpoint), Arc::new(MockClock::at(now())));
    let http = HttpClient::builder().timeout(timeout).build().expect("http client should build");
    PeApiHttpClient::new(http, &server.uri(), Arc::new(credentials))
}

/// Token endpoint answering with bearer `abc`, valid for 20 minutes.
pub fn token_mock() -> Mock {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(query_param("realm", "/partenaire"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "abc",
            "expires_in": 1200,
        })))
}

pub fn search_answer(code: &str, id_national: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "codeSortie": code,
        "idNationalDE": id_national,
        "certifDE": true,
    }))
}

pub fn update_answer(code: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "codeSortie": code,
        "idNational": "ID-NATIONAL",
        "message": "",
    }))
}

/// Ready-to-send approval whose job seeker is `1000 + id`.
pub fn sample_record(kind: ApprovalKind, id: i64) -> ApprovalRecord {
    ApprovalRecord {
        id,
        kind,
        number: format!("XXXXX{id:07}"),
        start_at: date(2024, 1, 15),
        end_at: date(2026, 1, 14),
        job_seeker: JobSeekerIdentity {
            job_seeker_id: 1000 + id,
            first_name: "Jean Pierre".into(),
            last_name: "Dupré".into(),
            birthdate: Some(date(1990, 5, 4)),
            nir: Some("190057512345678".into()),
            obfuscated_nir: None,
        },
        hiring: Some(HiringContext {
            siae_siret: "12345678900012".into(),
            siae_kind: "ACI".into(),
            sender_kind: SenderKind::Prescriber,
            prescriber_kind: Some("ML".into()),
        }),
        notification: NotificationState::pending(),
    }
}
