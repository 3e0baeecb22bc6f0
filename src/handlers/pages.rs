use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{
    clear_session_cookie, clear_state_cookie, cookie_value, issue_session, session_cookie,
    state_cookie, STATE_COOKIE,
};
use crate::config::AuthMode;
use crate::database::models::user::{NewUser, User};
use crate::error::ApiError;
use crate::middleware::{resolve_owner, Owner};

/// GET / - Rendered map page. 500 when the map-provider key is missing;
/// in session mode an anonymous caller is redirected to the login entry
/// point instead of receiving a JSON error.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(maps_api_key) = state.config.maps_api_key.clone() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Maps API key is not configured",
        )
            .into_response();
    };

    let mut user = None;
    if state.config.auth == AuthMode::Session {
        match resolve_owner(&state.config, &headers) {
            Ok(Owner(Some(owner_key))) => {
                // Best effort: the page renders without the banner if the
                // user row cannot be loaded.
                if let Ok(user_id) = owner_key.parse::<i32>() {
                    user = state.users.find_by_id(user_id).await.ok().flatten();
                }
            }
            Ok(Owner(None)) => {}
            Err(ApiError::Unauthorized(_)) => return found("/login"),
            Err(err) => return err.into_response(),
        }
    }

    Html(render_index(&maps_api_key, user.as_ref())).into_response()
}

/// GET /login - Redirect to the provider with a server-chosen callback
/// URL and a fresh state parameter.
pub async fn login(State(state): State<AppState>) -> Response {
    let Some(oauth) = &state.oauth else {
        return ApiError::internal_server_error("OAuth is not configured").into_response();
    };

    let state_param = Uuid::new_v4().simple().to_string();
    match oauth.authorize_url(&state_param) {
        Ok(url) => with_cookie(found(&url), &state_cookie(&state_param)),
        Err(err) => {
            tracing::error!("failed to build authorize URL: {}", err);
            ApiError::internal_server_error("OAuth is not configured").into_response()
        }
    }
}

/// GET /logout - Clear the session and return to the map page.
pub async fn logout() -> Response {
    with_cookie(found("/"), &clear_session_cookie())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// GET /oauth-callback - Exchange the authorization code for identity
/// claims, lazily create the User, and establish the session. Any failure
/// routes back to the login entry point with nothing persisted.
pub async fn oauth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let (Some(oauth), Some(session_config)) = (&state.oauth, &state.config.session) else {
        return ApiError::internal_server_error("OAuth is not configured").into_response();
    };

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("oauth callback missing code or state");
        return back_to_login();
    };

    if cookie_value(&headers, STATE_COOKIE).as_deref() != Some(returned_state.as_str()) {
        tracing::warn!("oauth callback state mismatch");
        return back_to_login();
    }

    let claims = match oauth.exchange_code(&code).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!("oauth exchange failed: {}", err);
            return back_to_login();
        }
    };

    let user = match state.users.find_or_create(&NewUser::from(claims)).await {
        Ok(user) => user,
        Err(err) => {
            tracing::error!("failed to resolve user: {}", err);
            return back_to_login();
        }
    };

    let token = match issue_session(user.id, session_config) {
        Ok(token) => token,
        Err(err) => {
            tracing::error!("failed to issue session: {}", err);
            return back_to_login();
        }
    };

    tracing::info!(user_id = user.id, "established session");
    let response = with_cookie(found("/"), &session_cookie(&token, session_config.ttl_hours));
    with_cookie(response, &clear_state_cookie())
}

/// GET /health - Liveness probe that pings the store.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.polygons.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "ok" }
            })),
        ),
        Err(err) => {
            // Log the real error; the body stays generic, as with the 500 class.
            tracing::error!("health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "data": { "status": "degraded", "timestamp": now, "store": "unavailable" }
                })),
            )
        }
    }
}

/// Failed callback: back to the login entry point, dropping the state
/// cookie so it does not linger for its full lifetime.
fn back_to_login() -> Response {
    with_cookie(found("/login"), &clear_state_cookie())
}

/// 302 Found. Axum's `Redirect` answers 303/307/308, and browsers landing
/// here expect the classic 302.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
            response
        }
        Err(err) => {
            tracing::error!("invalid cookie value: {}", err);
            ApiError::internal_server_error("Failed to set cookie").into_response()
        }
    }
}

fn render_index(maps_api_key: &str, user: Option<&User>) -> String {
    let banner = user
        .map(|u| {
            format!(
                r#"<div id="user">Signed in as {} &mdash; <a href="/logout">Log out</a></div>"#,
                u.name
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Polygon Map</title>
  <style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
  {banner}
  <div id="map"></div>
  <script src="/static/js/map.js"></script>
  <script async
    src="https://maps.googleapis.com/maps/api/js?key={maps_api_key}&libraries=drawing,geometry&callback=initMap">
  </script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_page_embeds_the_maps_key() {
        let page = render_index("test-key", None);
        assert!(page.contains("key=test-key"));
        assert!(!page.contains("Signed in as"));
    }

    #[test]
    fn index_page_shows_signed_in_user() {
        let user = User {
            id: 1,
            external_id: "sub".to_string(),
            email: "a@example.com".to_string(),
            name: "Alice".to_string(),
        };
        let page = render_index("test-key", Some(&user));
        assert!(page.contains("Signed in as Alice"));
        assert!(page.contains(r#"href="/logout""#));
    }
}
