// ABOUTME: Authorization flow route handlers for both deployment modes
// ABOUTME: Issues the Fitbit redirect, validates callbacks, and handles logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Authorization routes
//!
//! `GET /auth/fitbit` starts an authorization attempt and 302-redirects to
//! Fitbit. `GET /auth/callback` validates the returned code/state pair and
//! completes the exchange: session mode bounces back to the frontend with
//! `?logged_in=1` or `?error=<reason>`, public mode renders the refresh
//! token for the operator to copy into deployment configuration.
//! `POST /auth/logout` exists only in session mode.

use crate::config::RelayMode;
use crate::errors::RelayError;
use crate::routes::{session_owner, SESSION_COOKIE};
use crate::server::ServerResources;
use crate::store::{Credential, OwnerId, TokenStore};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Query parameters delivered to the OAuth callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code, absent when the user denied access
    pub code: Option<String>,
    /// CSRF state echoed back by the authorization server
    pub state: Option<String>,
}

/// Authorization flow routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the auth routes for the configured deployment mode
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let mut router = Router::new()
            .route("/auth/fitbit", get(Self::handle_authorize))
            .route("/auth/callback", get(Self::handle_callback));

        // Logout only makes sense when credentials are per-session
        if resources.config.mode == RelayMode::Session {
            router = router.route("/auth/logout", post(Self::handle_logout));
        }

        router.with_state(resources)
    }

    /// Start an authorization attempt and redirect to Fitbit
    async fn handle_authorize(
        State(resources): State<Arc<ServerResources>>,
        jar: CookieJar,
    ) -> Result<Response, RelayError> {
        match resources.config.mode {
            RelayMode::Public => {
                let url = resources.oauth.begin_authorization(OwnerId::Public).await?;
                Ok(redirect_found(&url))
            }
            RelayMode::Session => {
                let (jar, session_id) = ensure_session(jar, resources.config.is_secure());
                let url = resources
                    .oauth
                    .begin_authorization(OwnerId::Session(session_id))
                    .await?;
                Ok((jar, redirect_found(&url)).into_response())
            }
        }
    }

    /// Validate the callback and complete the token exchange
    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        jar: CookieJar,
        Query(params): Query<CallbackParams>,
    ) -> Response {
        let code = params.code.as_deref();
        let state = params.state.as_deref();

        match resources.config.mode {
            RelayMode::Public => {
                match resources
                    .oauth
                    .handle_callback(&OwnerId::Public, code, state)
                    .await
                {
                    Ok(credential) => Html(setup_complete_page(&credential)).into_response(),
                    Err(e) => (e.http_status(), e.to_string()).into_response(),
                }
            }
            RelayMode::Session => {
                let frontend = &resources.config.frontend_origin;
                let Some(owner) = session_owner(&jar) else {
                    warn!("callback without a session cookie");
                    return redirect_found(&frontend_redirect(frontend, "error", "auth_failed"));
                };

                match resources.oauth.handle_callback(&owner, code, state).await {
                    // The credential is in the store before this redirect is
                    // produced; a crash in between is never observable as
                    // "logged in"
                    Ok(_) => redirect_found(&format!("{frontend}?logged_in=1")),
                    Err(e) => {
                        redirect_found(&frontend_redirect(frontend, "error", &redirect_reason(&e)))
                    }
                }
            }
        }
    }

    /// Clear the caller's credential and session cookie
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        jar: CookieJar,
    ) -> Response {
        if let Some(owner) = session_owner(&jar) {
            resources.token_store.clear(&owner).await;
        }

        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        let jar = jar.remove(removal);

        (jar, Json(json!({ "ok": true }))).into_response()
    }
}

/// Reuse the caller's session cookie or mint a fresh one
fn ensure_session(jar: CookieJar, secure: bool) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value().to_owned();
        return (jar, id);
    }

    let id = Uuid::new_v4().simple().to_string();
    let mut cookie = Cookie::new(SESSION_COOKIE, id.clone());
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_secure(secure);
    // Cross-site cookie: the frontend lives on a different origin
    cookie.set_same_site(if secure { SameSite::None } else { SameSite::Lax });
    (jar.add(cookie), id)
}

/// Explicit 302; `axum::response::Redirect` would emit 303/307
fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_owned())],
    )
        .into_response()
}

/// Frontend redirect carrying a single percent-encoded query parameter
fn frontend_redirect(origin: &str, key: &str, value: &str) -> String {
    format!("{origin}?{key}={}", urlencoding::encode(value))
}

/// Short machine-readable reason for the frontend's `?error=` parameter
fn redirect_reason(error: &RelayError) -> String {
    match error {
        RelayError::InvalidCallback(_) => "auth_failed".into(),
        RelayError::ExchangeFailed(reason) => reason.clone(),
        other => other.to_string(),
    }
}

/// Operator page shown once after public-mode setup; the refresh token is
/// copied into deployment configuration by hand
fn setup_complete_page(credential: &Credential) -> String {
    let token = html_escape::encode_text(&credential.refresh_token);
    let user = credential
        .user_id
        .as_deref()
        .map_or_else(String::new, |id| {
            format!(
                "<p>Authorized Fitbit user: <strong>{}</strong></p>",
                html_escape::encode_text(id)
            )
        });

    format!(
        r"<!DOCTYPE html>
<html>
<head><title>Setup complete</title></head>
<body>
<h1>Shared account authorized</h1>
{user}
<p>Set this refresh token in your deployment configuration as
<code>FITBIT_PUBLIC_REFRESH_TOKEN</code>, then redeploy:</p>
<pre><code>{token}</code></pre>
<p>The token above is held in memory until the process restarts.</p>
</body>
</html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_reason_mapping() {
        assert_eq!(
            redirect_reason(&RelayError::InvalidCallback("state mismatch".into())),
            "auth_failed"
        );
        assert_eq!(
            redirect_reason(&RelayError::ExchangeFailed("Authorization code invalid".into())),
            "Authorization code invalid"
        );
    }

    #[test]
    fn test_frontend_redirect_encodes_value() {
        assert_eq!(
            frontend_redirect("https://user.github.io/app", "error", "code expired / reused"),
            "https://user.github.io/app?error=code%20expired%20%2F%20reused"
        );
    }

    #[test]
    fn test_setup_page_escapes_token() {
        let credential = Credential {
            access_token: "a".into(),
            refresh_token: "<script>alert(1)</script>".into(),
            expires_at: chrono::Utc::now(),
            user_id: Some("ABC<123>".into()),
        };
        let page = setup_complete_page(&credential);
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("ABC&lt;123&gt;"));
    }
}
