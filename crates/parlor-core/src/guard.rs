//! Route guard: decide whether a navigation target is reachable in the
//! current authentication state.
//!
//! Fails closed: any doubt about the session resolves to a login redirect.

use tracing::{debug, warn};

use parlor_api::ApiClient;

/// Outcome of a guarded navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
}

/// Public paths never require a session: the landing page and the whole
/// auth flow (login, register, reset, OAuth callbacks).
pub fn is_public_path(path: &str) -> bool {
    path == "/" || path.starts_with("/auth")
}

/// Guard a navigation to `path`.
///
/// Protected paths require a session cookie and a server-side confirmation
/// that the session is still live.  A missing cookie skips the round-trip;
/// a revalidation failure of any kind redirects rather than allowing a
/// possibly dead session through.
pub async fn check_navigation(api: &ApiClient, path: &str) -> RouteDecision {
    if is_public_path(path) {
        return RouteDecision::Allow;
    }

    if !api.has_session_cookie() {
        debug!(path, "No session cookie, redirecting to login");
        return RouteDecision::RedirectToLogin;
    }

    match api.is_authenticated().await {
        Ok(true) => RouteDecision::Allow,
        Ok(false) => {
            debug!(path, "Session rejected by server, redirecting to login");
            RouteDecision::RedirectToLogin
        }
        Err(error) => {
            warn!(path, %error, "Session revalidation failed, failing closed");
            RouteDecision::RedirectToLogin
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/"));
        assert!(is_public_path("/auth/login"));
        assert!(is_public_path("/auth/oauth-callback"));
        assert!(!is_public_path("/chat"));
        assert!(!is_public_path("/settings/security"));
    }

    #[tokio::test]
    async fn test_missing_cookie_redirects_without_network() {
        // The api points at a closed port; a round-trip would error loudly,
        // but the cookie check short-circuits first.
        let api = ApiClient::new("http://127.0.0.1:1").unwrap();
        assert_eq!(
            check_navigation(&api, "/chat").await,
            RouteDecision::RedirectToLogin
        );
    }

    #[tokio::test]
    async fn test_public_path_allowed_without_session() {
        let api = ApiClient::new("http://127.0.0.1:1").unwrap();
        assert_eq!(check_navigation(&api, "/").await, RouteDecision::Allow);
    }
}
