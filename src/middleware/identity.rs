use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{cookie_value, verify_session, SESSION_COOKIE};
use crate::config::{AppConfig, AuthMode};
use crate::error::ApiError;

/// Owner key resolved for the request. `None` means owner scoping is off
/// for this deployment; handlers then operate over all records.
#[derive(Clone, Debug)]
pub struct Owner(pub Option<String>);

/// Resolves the caller's identity per the configured strategy. Produces
/// the owner key or `Unauthorized`; the caller decides whether that turns
/// into a 401 (API routes) or a redirect to the login page (page routes).
pub fn resolve_owner(config: &AppConfig, headers: &HeaderMap) -> Result<Owner, ApiError> {
    match config.auth {
        AuthMode::Disabled => Ok(Owner(None)),
        AuthMode::Header => {
            // Presence alone is trust; the value is an opaque external token.
            let value = headers
                .get(config.identity_header.as_str())
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty());
            match value {
                Some(token) => Ok(Owner(Some(token.to_string()))),
                None => Err(ApiError::unauthorized("Authentication required")),
            }
        }
        AuthMode::Session => {
            let session = config
                .session
                .as_ref()
                .ok_or_else(|| ApiError::internal_server_error("Session auth not configured"))?;
            let token = cookie_value(headers, SESSION_COOKIE)
                .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
            let claims = verify_session(&token, &session.secret).map_err(|err| {
                tracing::debug!("rejected session cookie: {}", err);
                ApiError::unauthorized("Authentication required")
            })?;
            Ok(Owner(Some(claims.sub.to_string())))
        }
    }
}

/// Identity middleware for `/api/*` routes. Rejects with a 401 JSON body
/// before any handler touches the store; on success the resolved owner is
/// injected into request extensions.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let owner = resolve_owner(&state.config, request.headers())?;
    request.extensions_mut().insert(owner);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_session;
    use crate::config::SessionConfig;

    fn config(auth: AuthMode) -> AppConfig {
        AppConfig {
            port: 0,
            database_url: String::new(),
            maps_api_key: None,
            auth,
            identity_header: "X-Firebase-UserId".to_string(),
            session: Some(SessionConfig {
                secret: "test-secret".to_string(),
                ttl_hours: 1,
            }),
            oauth: None,
        }
    }

    #[test]
    fn disabled_mode_resolves_without_scoping() {
        let owner = resolve_owner(&config(AuthMode::Disabled), &HeaderMap::new()).unwrap();
        assert!(owner.0.is_none());
    }

    #[test]
    fn header_mode_passes_the_literal_header_through() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Firebase-UserId", "firebase-uid-1".parse().unwrap());
        let owner = resolve_owner(&config(AuthMode::Header), &headers).unwrap();
        assert_eq!(owner.0.as_deref(), Some("firebase-uid-1"));
    }

    #[test]
    fn header_mode_rejects_absent_or_empty_header() {
        let cfg = config(AuthMode::Header);
        assert!(resolve_owner(&cfg, &HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("X-Firebase-UserId", "".parse().unwrap());
        assert!(resolve_owner(&cfg, &headers).is_err());
    }

    #[test]
    fn session_mode_resolves_the_bound_user_id() {
        let cfg = config(AuthMode::Session);
        let token = issue_session(42, cfg.session.as_ref().unwrap()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            format!("polymap_session={token}").parse().unwrap(),
        );
        let owner = resolve_owner(&cfg, &headers).unwrap();
        assert_eq!(owner.0.as_deref(), Some("42"));
    }

    #[test]
    fn session_mode_rejects_missing_or_tampered_cookies() {
        let cfg = config(AuthMode::Session);
        assert!(resolve_owner(&cfg, &HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "polymap_session=not.a.token".parse().unwrap(),
        );
        assert!(resolve_owner(&cfg, &headers).is_err());
    }
}
