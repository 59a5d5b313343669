//! The authentication state machine.
//!
//! Session state is a tagged union: the second-factor token only exists in
//! the [`Session::SecondFactorPending`] variant, so an expired or consumed
//! challenge cannot linger next to an authenticated profile.  All transitions
//! go through [`SessionManager`], which validates input shapes locally before
//! spending a round-trip.

use thiserror::Error;
use tracing::{info, warn};

use parlor_api::{ApiClient, GatewayError, LoginOutcome};
use parlor_shared::constants::{
    CODE_BAD_CREDENTIALS, CODE_INVALID_TWO_FACTOR_CODE, RECOVERY_CODE_LEN, TOTP_CODE_LEN,
};
use parlor_shared::{Presence, UserId, UserProfile};

use crate::store::Store;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Authentication state.  Exactly one variant holds at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// No session; only public routes are reachable.
    Anonymous,
    /// Primary credentials accepted, second factor outstanding.  The token
    /// is single-use and consumed by a successful verification.
    SecondFactorPending { token: String },
    /// Fully signed in.
    Authenticated { user: UserProfile },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Session::Authenticated { user } => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired second-factor code")]
    InvalidOrExpiredCode,
    #[error("no second-factor challenge is pending")]
    NoPendingChallenge,
    #[error("OAuth callback is missing the `{0}` parameter")]
    IncompleteCallback(&'static str),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Identity fields carried on an OAuth provider redirect.
///
/// Each field is optional at the wire level; [`SessionManager::complete_oauth_callback`]
/// rejects the callback naming the first missing one.
#[derive(Debug, Clone, Default)]
pub struct OAuthCallbackParams {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Drives [`Session`] transitions against the API gateway.
pub struct SessionManager {
    api: ApiClient,
    state: Store<Session>,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Store::new(Session::Anonymous),
        }
    }

    pub fn current(&self) -> &Session {
        self.state.get()
    }

    /// The state store, for subscribing to session transitions.
    pub fn store(&mut self) -> &mut Store<Session> {
        &mut self.state
    }

    /// Submit primary credentials.
    ///
    /// Obviously malformed input is rejected locally as
    /// [`AuthError::InvalidCredentials`] without a network round-trip, the
    /// same error the server returns for a wrong password.
    pub async fn submit_credentials(&mut self, email: &str, password: &str) -> Result<()> {
        if !is_well_formed_email(email) || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        match self.api.login(email, password).await {
            Ok(LoginOutcome::Authenticated(user)) => {
                info!(user_id = %user.id, "Session established");
                self.state.set(Session::Authenticated { user });
                Ok(())
            }
            Ok(LoginOutcome::SecondFactorRequired(challenge)) => {
                self.state.set(Session::SecondFactorPending {
                    token: challenge.token,
                });
                Ok(())
            }
            Err(GatewayError::Rejection { ref code, .. }) if code == CODE_BAD_CREDENTIALS => {
                Err(AuthError::InvalidCredentials)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Submit a second-factor code against the pending challenge.
    ///
    /// Codes with the wrong shape (not 6 digits, or not an 8-character
    /// alphanumeric recovery code) fail locally with the same error the
    /// server would return, saving the round-trip.  On success the pending
    /// token is consumed; on failure it stays pending so a fresh code can be
    /// tried.
    pub async fn submit_second_factor(&mut self, code: &str, is_recovery: bool) -> Result<()> {
        let token = match self.state.get() {
            Session::SecondFactorPending { token } => token.clone(),
            _ => return Err(AuthError::NoPendingChallenge),
        };
        if !is_plausible_code(code, is_recovery) {
            return Err(AuthError::InvalidOrExpiredCode);
        }

        match self.api.verify_second_factor(&token, code).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Second factor accepted");
                self.state.set(Session::Authenticated { user });
                Ok(())
            }
            Ok(None) => {
                // Server variants that do not echo the profile.
                let user = self.api.current_user().await?;
                info!(user_id = %user.id, "Second factor accepted");
                self.state.set(Session::Authenticated { user });
                Ok(())
            }
            Err(GatewayError::Rejection { ref code, .. })
                if code == CODE_INVALID_TWO_FACTOR_CODE =>
            {
                Err(AuthError::InvalidOrExpiredCode)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Complete an OAuth provider redirect that established a session
    /// server-side.  The profile arrives in the redirect parameters; every
    /// identity field must be present.
    pub fn complete_oauth_callback(&mut self, params: OAuthCallbackParams) -> Result<()> {
        let id = params.id.ok_or(AuthError::IncompleteCallback("id"))?;
        let username = params
            .username
            .ok_or(AuthError::IncompleteCallback("username"))?;
        let email = params.email.ok_or(AuthError::IncompleteCallback("email"))?;

        let user = UserProfile {
            id: UserId(id),
            username,
            email,
            avatar: params.avatar.unwrap_or_default(),
            status: Presence::Online,
        };
        info!(user_id = %user.id, "OAuth session established");
        self.state.set(Session::Authenticated { user });
        Ok(())
    }

    /// Complete an OAuth redirect for an account with 2FA enabled: no
    /// session exists yet, only a factor token to carry into
    /// [`SessionManager::submit_second_factor`].
    pub fn complete_oauth_two_factor(&mut self, token: Option<&str>) -> Result<()> {
        match token {
            Some(token) if !token.is_empty() => {
                self.state.set(Session::SecondFactorPending {
                    token: token.to_string(),
                });
                Ok(())
            }
            _ => Err(AuthError::IncompleteCallback("token")),
        }
    }

    /// Refresh the cached profile from the server.
    pub async fn refresh_profile(&mut self) -> Result<()> {
        let user = self.api.current_user().await?;
        self.state.set(Session::Authenticated { user });
        Ok(())
    }

    /// Sign out.  The server call is best-effort; local state is reset
    /// unconditionally so a dead server cannot pin a stale session.
    pub async fn logout(&mut self) {
        if let Err(error) = self.api.logout().await {
            warn!(%error, "Server-side logout failed, clearing local session anyway");
        }
        self.state.set(Session::Anonymous);
    }
}

// ---------------------------------------------------------------------------
// Local validation
// ---------------------------------------------------------------------------

fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_plausible_code(code: &str, is_recovery: bool) -> bool {
    if is_recovery {
        code.len() == RECOVERY_CODE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
    } else {
        code.len() == TOTP_CODE_LEN && code.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_well_formed_email("alice@example.com"));
        assert!(!is_well_formed_email("alice"));
        assert!(!is_well_formed_email("@example.com"));
        assert!(!is_well_formed_email("alice@com"));
        assert!(!is_well_formed_email("alice@.com"));
    }

    #[test]
    fn test_code_shape() {
        assert!(is_plausible_code("123456", false));
        assert!(!is_plausible_code("12345", false));
        assert!(!is_plausible_code("12345a", false));
        assert!(is_plausible_code("a1b2c3d4", true));
        assert!(!is_plausible_code("a1b2c3d", true));
        assert!(!is_plausible_code("a1b2c3d!", true));
    }
}
