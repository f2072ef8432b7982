use anyhow::Result;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;

/// Filing configuration for the registrant.
#[derive(Clone, Debug)]
pub struct GstConfig {
    /// The registrant's GSTIN, stamped on every filing.
    pub gstin: String,
    /// Grand-total threshold above which a no-GSTIN inter-state invoice
    /// is reported as B2C-Large.
    pub b2cl_threshold: Decimal,
}

impl GstConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let gstin = env::var("GST_GSTIN")?;
        compliance_core::validate::validate_gstin(&gstin)
            .map_err(|e| anyhow::anyhow!("GST_GSTIN: {}", e))?;

        let b2cl_threshold = env::var("GST_B2CL_THRESHOLD")
            .ok()
            .map(|v| v.parse::<Decimal>())
            .transpose()?
            .unwrap_or_else(|| Decimal::from(250_000));

        Ok(Self {
            gstin,
            b2cl_threshold,
        })
    }
}
