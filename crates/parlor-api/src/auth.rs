//! Authentication endpoints: primary login, second-factor verification,
//! logout, registration, and password reset.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use parlor_shared::constants::{CODE_LOGIN_NEEDS_2FA, CODE_UNAUTHORIZED};
use parlor_shared::UserProfile;

use crate::error::{GatewayError, Result};
use crate::gateway::{ApiClient, Envelope};

/// A pending second-factor challenge returned by the login endpoint.
///
/// The token is opaque and single-use; it binds the completed password check
/// to the follow-up code submission.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FactorChallenge {
    pub token: String,
    /// Which second factor the server expects ("totp", "email", ...).
    #[serde(default)]
    pub provider: Option<String>,
}

/// How the server classified a successful primary-credential check.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Session established, profile returned.
    Authenticated(UserProfile),
    /// No session yet; a second factor must be submitted.
    SecondFactorRequired(FactorChallenge),
}

impl ApiClient {
    /// `POST /auth/login`.
    ///
    /// A `LOGIN_NEEDS_2FA` envelope is a success at the HTTP level but does
    /// not establish a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let envelope: Envelope<serde_json::Value> = self
            .post(
                "/auth/login",
                json!({ "email": email, "password": password }),
            )
            .await?;

        if envelope.code == CODE_LOGIN_NEEDS_2FA {
            let challenge: FactorChallenge = serde_json::from_value(envelope.into_details()?)?;
            info!("Login requires a second factor");
            return Ok(LoginOutcome::SecondFactorRequired(challenge));
        }

        let user: UserProfile = serde_json::from_value(envelope.into_details()?)?;
        info!(user_id = %user.id, "Login succeeded");
        Ok(LoginOutcome::Authenticated(user))
    }

    /// `POST /auth/login-2fa`.  Consumes the factor token on success.
    ///
    /// Older server versions do not echo the profile back, so `details` may
    /// be absent; callers fall back to [`ApiClient::current_user`].
    pub async fn verify_second_factor(
        &self,
        token: &str,
        code: &str,
    ) -> Result<Option<UserProfile>> {
        let envelope: Envelope<UserProfile> = self
            .post("/auth/login-2fa", json!({ "token": token, "code": code }))
            .await?;
        Ok(envelope.details)
    }

    /// `POST /auth/logout`.  Invalidates the server-side session.
    pub async fn logout(&self) -> Result<()> {
        let _: Envelope<serde_json::Value> = self.post_empty("/auth/logout").await?;
        Ok(())
    }

    /// `GET /auth/is-authenticated`.
    ///
    /// `Ok(false)` means the server explicitly rejected the session; any
    /// other failure propagates so callers can fail closed.
    pub async fn is_authenticated(&self) -> Result<bool> {
        let result: Result<Envelope<serde_json::Value>> =
            self.get("/auth/is-authenticated").await;
        match result {
            Ok(_) => Ok(true),
            Err(GatewayError::Rejection { ref code, .. }) if code == CODE_UNAUTHORIZED => {
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// `POST /auth/register`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<()> {
        let _: Envelope<serde_json::Value> = self
            .post(
                "/auth/register",
                json!({
                    "username": username,
                    "email": email,
                    "password": password,
                    "passwordConfirmation": password_confirmation,
                }),
            )
            .await?;
        Ok(())
    }

    /// `POST /auth/confirm-email`.
    pub async fn confirm_email(&self, token: &str) -> Result<()> {
        let _: Envelope<serde_json::Value> = self
            .post("/auth/confirm-email", json!({ "token": token }))
            .await?;
        Ok(())
    }

    /// `POST /auth/send-password-reset`.
    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        let _: Envelope<serde_json::Value> = self
            .post("/auth/send-password-reset", json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// `POST /auth/verify-password-reset-token`.
    pub async fn verify_password_reset_token(&self, token: &str) -> Result<()> {
        let _: Envelope<serde_json::Value> = self
            .post("/auth/verify-password-reset-token", json!({ "token": token }))
            .await?;
        Ok(())
    }

    /// `POST /auth/password-reset`.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<()> {
        let _: Envelope<serde_json::Value> = self
            .post(
                "/auth/password-reset",
                json!({
                    "token": token,
                    "password": password,
                    "passwordConfirmation": password_confirmation,
                }),
            )
            .await?;
        Ok(())
    }
}
