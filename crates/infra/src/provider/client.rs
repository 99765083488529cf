//! HTTP implementation of the partner API port

use std::sync::Arc;

use async_trait::async_trait;
use passiae_core::{Clock, IdentitySearch, PassIaeUpdate, PeApiClient};
use passiae_domain::constants::{
    EMPTY_ID_NATIONAL_CODE, MAJ_PASS_SUCCESS, NOTIFICATION_SCOPES, RECHERCHE_INDIVIDU_SUCCESS,
};
use passiae_domain::{
    ProviderConfig, ProviderOutcome, Result, TransportFailure, TransportFailureKind,
};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::auth::{CredentialCache, OAuthTokenEndpoint};
use super::errors::{from_reqwest, from_status, has_exit_code};
use super::payloads::{
    MiseAJourRequest, MiseAJourResponse, RechercheIndividuRequest, RechercheIndividuResponse,
};
use crate::http::HttpClient;

const RECHERCHE_INDIVIDU_PATH: &str = "/rechercheindividucertifie/v1/rechercheIndividuCertifie";
const MAJ_PASS_PATH: &str = "/maj-pass-iae/v1/passIAE/miseAjour";

/// France Travail partner API client
pub struct PeApiHttpClient {
    http: HttpClient,
    base_url: String,
    credentials: Arc<CredentialCache>,
}

impl PeApiHttpClient {
    /// Client with its own credential cache and OAuth endpoint.
    pub fn from_config(config: &ProviderConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let endpoint = Arc::new(OAuthTokenEndpoint::new(config)?);
        let credentials = Arc::new(CredentialCache::new(endpoint, clock));
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        Ok(Self::new(http, config.base_url.as_str(), credentials))
    }

    /// Client for the API under `base_url`.
    pub fn new(http: HttpClient, base_url: &str, credentials: Arc<CredentialCache>) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string(), credentials }
    }

    /// POST `body` and decode the answer.
    ///
    /// Any failure to obtain a decoded body is a transport failure. A 401
    /// also drops the cached token so the next call fetches a new one.
    async fn post<B, R>(&self, path: &str, body: &B) -> std::result::Result<R, TransportFailure>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let token = self.credentials.get_token(&NOTIFICATION_SCOPES).await?;
        let request = self
            .http
            .request(Method::POST, format!("{}{path}", self.base_url))
            .header(AUTHORIZATION, token.header_value())
            .json(body);

        let response = self.http.send(request).await.map_err(|err| from_reqwest(&err))?;
        let status = response.status();
        if !has_exit_code(status) {
            let failure = from_status(status);
            warn!(%status, path, "provider answered without an exit code");
            if failure.kind == TransportFailureKind::Unauthorized {
                self.credentials.invalidate().await;
            }
            return Err(failure);
        }

        let bytes = response.bytes().await.map_err(|err| from_reqwest(&err))?;
        serde_json::from_slice(&bytes).map_err(|err| {
            TransportFailure::malformed(format!("undecodable provider answer: {err}"))
        })
    }
}

fn missing_exit_code<T>() -> ProviderOutcome<T> {
    ProviderOutcome::TransportFailure(TransportFailure::malformed("answer without codeSortie"))
}

#[async_trait]
impl PeApiClient for PeApiHttpClient {
    #[instrument(skip_all)]
    async fn recherche_individu_certifie(
        &self,
        search: &IdentitySearch,
    ) -> Result<ProviderOutcome<String>> {
        let body = RechercheIndividuRequest::from(search);
        let response: RechercheIndividuResponse =
            match self.post(RECHERCHE_INDIVIDU_PATH, &body).await {
                Ok(response) => response,
                Err(failure) => return Ok(ProviderOutcome::TransportFailure(failure)),
            };

        let Some(code) = response.code_sortie else {
            return Ok(missing_exit_code());
        };
        debug!(code = %code, certified = ?response.certif_de, "identity search answered");
        if code != RECHERCHE_INDIVIDU_SUCCESS {
            return Ok(ProviderOutcome::BusinessRejection(code));
        }
        match response.id_national_de.filter(|id| !id.trim().is_empty()) {
            Some(id) => Ok(ProviderOutcome::Success(id)),
            None => Ok(ProviderOutcome::BusinessRejection(EMPTY_ID_NATIONAL_CODE.to_string())),
        }
    }

    #[instrument(skip_all, fields(approval = %update.number))]
    async fn mise_a_jour_pass_iae(&self, update: &PassIaeUpdate) -> Result<ProviderOutcome<()>> {
        let body = MiseAJourRequest::from(update);
        let response: MiseAJourResponse = match self.post(MAJ_PASS_PATH, &body).await {
            Ok(response) => response,
            Err(failure) => return Ok(ProviderOutcome::TransportFailure(failure)),
        };

        let Some(code) = response.code_sortie else {
            return Ok(missing_exit_code());
        };
        debug!(code = %code, message = ?response.message, "status update answered");
        if code == MAJ_PASS_SUCCESS {
            Ok(ProviderOutcome::Success(()))
        } else {
            Ok(ProviderOutcome::BusinessRejection(code))
        }
    }
}
