//! E-way bill protocol client.
//!
//! One long-lived client owns one authority session: authenticate once,
//! then issue encrypted generate / fetch / update-vehicle / cancel calls,
//! re-authenticating lazily when the cached token lapses. Session state
//! lives on the client instance, so sandbox and production clients can
//! coexist in one process.

use crate::config::EwbConfig;
use crate::models::{
    CancelEwbRequest, CancelEwbResponse, EwbDetail, GenerateEwbRequest, GenerateEwbResponse,
    UpdateVehicleRequest, UpdateVehicleResponse,
};
use crate::services::crypto;
use crate::services::session::EwbSession;
use compliance_core::retry::{retry_call, RetryConfig};
use compliance_core::{AuthorityError, ComplianceError};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

const ACTION_ACCESS_TOKEN: &str = "ACCESSTOKEN";
const ACTION_GENERATE: &str = "GENEWAYBILL";
const ACTION_UPDATE_VEHICLE: &str = "UPDATEVEHICLE";
const ACTION_CANCEL: &str = "CANEWB";

/// `{action, data}` envelope for authenticated operations.
#[derive(Serialize)]
struct ActionEnvelope<'a> {
    action: &'a str,
    data: String,
}

/// Handshake body; credentials are RSA-encrypted with the authority key.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    action: &'a str,
    username: &'a str,
    password: String,
    app_key: String,
}

/// Every response arrives as `{status, data | error}`.
#[derive(Debug, Deserialize)]
struct WireResponse {
    status: Value,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl WireResponse {
    fn is_success(&self) -> bool {
        self.status.as_i64() == Some(1) || self.status.as_str() == Some("1")
    }
}

/// Decrypted handshake payload.
#[derive(Debug, Deserialize)]
struct AuthPayload {
    #[serde(rename = "authtoken")]
    auth_token: String,
    sek: String,
}

pub struct EwbClient {
    http: Client,
    config: EwbConfig,
    retry: RetryConfig,
    session: Arc<Mutex<Option<EwbSession>>>,
}

impl EwbClient {
    pub fn new(config: EwbConfig) -> Result<Self, ComplianceError> {
        Self::with_retry(config, RetryConfig::default())
    }

    pub fn with_retry(config: EwbConfig, retry: RetryConfig) -> Result<Self, ComplianceError> {
        if config.base_url.is_empty() {
            return Err(ComplianceError::Config("e-way bill base URL is empty".into()));
        }
        compliance_core::validate::validate_gstin(&config.gstin)?;
        if let Some(app_key) = &config.app_key {
            if app_key.expose_secret().len() != crypto::KEY_LEN {
                return Err(ComplianceError::Config(format!(
                    "app key must be {} characters",
                    crypto::KEY_LEN
                )));
            }
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ComplianceError::Internal(anyhow::Error::new(e)))?;

        Ok(Self {
            http,
            config,
            retry,
            session: Arc::new(Mutex::new(None)),
        })
    }

    /// Force a fresh handshake, replacing any cached session.
    #[instrument(skip(self), fields(gstin = %self.config.gstin))]
    pub async fn authenticate(&self) -> Result<(), ComplianceError> {
        let mut guard = self.session.lock().await;
        let session = self.handshake().await?;
        *guard = Some(session);
        Ok(())
    }

    /// Generate a bill. Local validation runs before any network call:
    /// the authority rejects over-distance requests opaquely, so the
    /// limit is enforced here.
    #[instrument(skip(self, request), fields(doc_no = %request.doc_no))]
    pub async fn generate(
        &self,
        request: &GenerateEwbRequest,
    ) -> Result<GenerateEwbResponse, ComplianceError> {
        request.validate()?;
        let response: GenerateEwbResponse = self.post_action(ACTION_GENERATE, request).await?;
        info!(ewb_no = response.eway_bill_no, "e-way bill generated");
        Ok(response)
    }

    /// Fetch the full record of an issued bill.
    #[instrument(skip(self))]
    pub async fn fetch(&self, ewb_no: u64) -> Result<EwbDetail, ComplianceError> {
        match self.fetch_once(ewb_no).await {
            Err(ComplianceError::Crypto(msg)) => {
                warn!(error = %msg, "response decryption failed, forcing one re-authentication");
                self.invalidate_session().await;
                self.fetch_once(ewb_no).await
            }
            other => other,
        }
    }

    /// Update the vehicle ("Part B") on an issued bill.
    #[instrument(skip(self, request), fields(ewb_no = request.ewb_no))]
    pub async fn update_vehicle(
        &self,
        request: &UpdateVehicleRequest,
    ) -> Result<UpdateVehicleResponse, ComplianceError> {
        request.validate()?;
        let response: UpdateVehicleResponse =
            self.post_action(ACTION_UPDATE_VEHICLE, request).await?;
        info!(ewb_no = request.ewb_no, "vehicle updated");
        Ok(response)
    }

    /// Cancel an issued bill. The post-grace-period cutoff is enforced by
    /// the authority; its rejection is surfaced, not pre-validated.
    #[instrument(skip(self, request), fields(ewb_no = request.ewb_no))]
    pub async fn cancel(
        &self,
        request: &CancelEwbRequest,
    ) -> Result<CancelEwbResponse, ComplianceError> {
        let response: CancelEwbResponse = self.post_action(ACTION_CANCEL, request).await?;
        info!(ewb_no = request.ewb_no, "e-way bill cancelled");
        Ok(response)
    }

    /// Current session for callers that need the raw token (diagnostics).
    pub async fn session(&self) -> Option<EwbSession> {
        self.session.lock().await.clone()
    }

    async fn invalidate_session(&self) {
        *self.session.lock().await = None;
    }

    /// Return a live session, re-authenticating when the cached one is
    /// missing or expired. The mutex is held across the handshake, so
    /// concurrent callers coalesce on one in-flight authentication and
    /// all observe its result.
    async fn ensure_session(&self) -> Result<EwbSession, ComplianceError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            if !session.is_expired() {
                return Ok(session.clone());
            }
            debug!("cached token expired, re-authenticating");
        }
        let session = self.handshake().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn handshake(&self) -> Result<EwbSession, ComplianceError> {
        let app_key = match &self.config.app_key {
            Some(key) => key.expose_secret().clone(),
            None => crypto::generate_app_key(),
        };

        let body = AuthRequest {
            action: ACTION_ACCESS_TOKEN,
            username: &self.config.username,
            password: crypto::rsa_encrypt_b64(
                &self.config.public_key_pem,
                self.config.password.expose_secret().as_bytes(),
            )?,
            app_key: crypto::rsa_encrypt_b64(&self.config.public_key_pem, app_key.as_bytes())?,
        };

        let url = format!("{}/auth", self.config.base_url);
        let raw = retry_call(&self.retry, ACTION_ACCESS_TOKEN, || async {
            self.send_json(self.http.post(&url).json(&body)).await
        })
        .await?;

        let response: WireResponse = serde_json::from_str(&raw)
            .map_err(|e| ComplianceError::Internal(anyhow::anyhow!("malformed auth response: {}", e)))?;

        if !response.is_success() {
            let error = authority_error(response.error);
            warn!(error = %error, "authority rejected authentication");
            return Err(ComplianceError::AuthRejected(error.to_string()));
        }

        let data = response.data.ok_or_else(|| {
            ComplianceError::Internal(anyhow::anyhow!("auth response missing data"))
        })?;
        let payload = crypto::open_payload(app_key.as_bytes(), &data)?;
        let auth: AuthPayload = serde_json::from_slice(&payload)
            .map_err(|e| ComplianceError::Crypto(format!("auth payload unreadable: {}", e)))?;
        let session_key = crypto::open_session_key(app_key.as_bytes(), &auth.sek)?;

        info!("authenticated with tax authority");
        Ok(EwbSession::new(auth.auth_token, session_key))
    }

    /// POST one encrypted action. A crypto failure on the response forces
    /// exactly one re-authentication and resend, then fails.
    async fn post_action<T: DeserializeOwned>(
        &self,
        action: &str,
        payload: &impl Serialize,
    ) -> Result<T, ComplianceError> {
        match self.post_action_once(action, payload).await {
            Err(ComplianceError::Crypto(msg)) => {
                warn!(action, error = %msg, "response decryption failed, forcing one re-authentication");
                self.invalidate_session().await;
                self.post_action_once(action, payload).await
            }
            other => other,
        }
    }

    async fn post_action_once<T: DeserializeOwned>(
        &self,
        action: &str,
        payload: &impl Serialize,
    ) -> Result<T, ComplianceError> {
        let session = self.ensure_session().await?;

        let plaintext = serde_json::to_vec(payload)?;
        let envelope = ActionEnvelope {
            action,
            data: crypto::seal_payload(&session.session_key, &plaintext)?,
        };

        let url = format!("{}/ewayapi", self.config.base_url);
        let raw = retry_call(&self.retry, action, || async {
            self.send_json(
                self.http
                    .post(&url)
                    .header("authtoken", &session.token)
                    .json(&envelope),
            )
            .await
        })
        .await?;

        self.open_response(&session, &raw)
    }

    async fn fetch_once(&self, ewb_no: u64) -> Result<EwbDetail, ComplianceError> {
        let session = self.ensure_session().await?;

        let url = format!("{}/ewayapi/GetEwayBill", self.config.base_url);
        let raw = retry_call(&self.retry, "GETEWAYBILL", || async {
            self.send_json(
                self.http
                    .get(&url)
                    .query(&[("ewbNo", ewb_no.to_string())])
                    .header("authtoken", &session.token),
            )
            .await
        })
        .await?;

        self.open_response(&session, &raw)
    }

    /// Decrypt and parse a `{status, data | error}` response body.
    fn open_response<T: DeserializeOwned>(
        &self,
        session: &EwbSession,
        raw: &str,
    ) -> Result<T, ComplianceError> {
        let response: WireResponse = serde_json::from_str(raw)
            .map_err(|e| ComplianceError::Internal(anyhow::anyhow!("malformed response: {}", e)))?;

        if !response.is_success() {
            let error = authority_error(response.error);
            warn!(error = %error, "authority rejected request");
            return Err(ComplianceError::Rejected(error));
        }

        let data = response
            .data
            .ok_or_else(|| ComplianceError::Internal(anyhow::anyhow!("response missing data")))?;
        let payload = crypto::open_payload(&session.session_key, &data)?;
        serde_json::from_slice(&payload)
            .map_err(|e| ComplianceError::Crypto(format!("response payload unreadable: {}", e)))
    }

    /// Send one request with the standard client headers and map
    /// transport-level failures: network errors and 5xx are transient,
    /// everything else is surfaced as-is for the caller.
    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<String, ComplianceError> {
        let response = request
            .header("client-id", self.config.client_id.expose_secret())
            .header("client-secret", self.config.client_secret.expose_secret())
            .header("gstin", &self.config.gstin)
            .send()
            .await
            .map_err(|e| ComplianceError::Unavailable(anyhow::Error::new(e)))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ComplianceError::Unavailable(anyhow::anyhow!(
                "authority returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ComplianceError::Unavailable(anyhow::Error::new(e)))?;

        if !status.is_success() {
            return Err(ComplianceError::Internal(anyhow::anyhow!(
                "unexpected HTTP {}: {}",
                status,
                body
            )));
        }
        Ok(body)
    }
}

/// The authority's failure detail arrives either structured or as an
/// opaque string; both surface verbatim.
fn authority_error(error: Option<Value>) -> AuthorityError {
    match error {
        Some(Value::String(message)) => AuthorityError {
            code: None,
            message,
        },
        Some(Value::Object(map)) => {
            let code = map
                .get("errorCodes")
                .or_else(|| map.get("errorCode"))
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string());
            AuthorityError { code, message }
        }
        Some(other) => AuthorityError {
            code: None,
            message: other.to_string(),
        },
        None => AuthorityError {
            code: None,
            message: "authority returned failure without detail".into(),
        },
    }
}
