//! Second-factor management endpoints (for an already authenticated user).

use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::gateway::{ApiClient, Envelope};

/// Result of generating a new second-factor secret.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorSetup {
    /// otpauth:// provisioning URI to render as a QR code.
    pub uri: String,
    /// One-shot recovery codes; shown to the user exactly once.
    pub recovery_codes: Vec<String>,
}

impl ApiClient {
    /// `GET /auth/2fa/status`.
    pub async fn two_factor_status(&self) -> Result<bool> {
        let envelope: Envelope<serde_json::Value> = self.get("/auth/2fa/status").await?;
        Ok(envelope.message.as_deref() == Some("Enabled"))
    }

    /// `GET /auth/2fa/generate`.  Creates a fresh secret and recovery codes;
    /// 2FA is not active until [`ApiClient::enable_two_factor`] confirms a
    /// code.
    pub async fn generate_two_factor(&self) -> Result<TwoFactorSetup> {
        let envelope: Envelope<TwoFactorSetup> = self.get("/auth/2fa/generate").await?;
        envelope.into_details()
    }

    /// `POST /auth/2fa/enable`.
    pub async fn enable_two_factor(&self, code: &str) -> Result<()> {
        let _: Envelope<serde_json::Value> =
            self.post("/auth/2fa/enable", json!({ "code": code })).await?;
        Ok(())
    }

    /// `POST /auth/2fa/verify`.  Checks a code without changing state.
    pub async fn verify_two_factor(&self, code: &str) -> Result<()> {
        let _: Envelope<serde_json::Value> =
            self.post("/auth/2fa/verify", json!({ "code": code })).await?;
        Ok(())
    }

    /// `DELETE /auth/2fa/disable`.
    pub async fn disable_two_factor(&self) -> Result<()> {
        let _: Envelope<serde_json::Value> = self.delete("/auth/2fa/disable").await?;
        Ok(())
    }
}
