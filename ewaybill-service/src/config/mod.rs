use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use std::env;

/// Connection settings for one authority endpoint. Owning the full set
/// per client instance lets sandbox and production sessions coexist.
#[derive(Clone, Debug)]
pub struct EwbConfig {
    /// Base URL of the authority's e-way bill API.
    pub base_url: String,
    /// GSP client id header.
    pub client_id: Secret<String>,
    /// GSP client secret header.
    pub client_secret: Secret<String>,
    /// The registrant's GSTIN.
    pub gstin: String,
    /// API credentials issued to the registrant.
    pub username: String,
    pub password: Secret<String>,
    /// Fixed 32-character app key; generated per session when absent.
    pub app_key: Option<Secret<String>>,
    /// The authority's published RSA public key, PEM.
    pub public_key_pem: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl EwbConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let gstin = env::var("EWB_GSTIN")?;
        compliance_core::validate::validate_gstin(&gstin)
            .map_err(|e| anyhow::anyhow!("EWB_GSTIN: {}", e))?;

        Ok(Self {
            base_url: env::var("EWB_BASE_URL")?,
            client_id: Secret::new(env::var("EWB_CLIENT_ID")?),
            client_secret: Secret::new(env::var("EWB_CLIENT_SECRET")?),
            gstin,
            username: env::var("EWB_USERNAME")?,
            password: Secret::new(env::var("EWB_PASSWORD")?),
            app_key: env::var("EWB_APP_KEY").ok().map(Secret::new),
            public_key_pem: env::var("EWB_PUBLIC_KEY_PEM")?,
            timeout_secs: env::var("EWB_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        })
    }
}
