use std::env;

use thiserror::Error;

/// Errors raised while assembling configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Identity strategy for the deployment. The strategies are mutually
/// exclusive; a deployment picks exactly one via `AUTH_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No owner scoping; every caller sees every polygon.
    Disabled,
    /// Owner key is the literal value of the identity header. The value is
    /// trusted as-is; no signature or revocation check is performed.
    Header,
    /// Owner key is the User id bound to a signed session cookie
    /// established by the OAuth login flow.
    Session,
}

impl AuthMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "disabled" => Some(AuthMode::Disabled),
            "header" => Some(AuthMode::Header),
            "session" | "oauth" => Some(AuthMode::Session),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC secret for signing session cookies.
    pub secret: String,
    pub ttl_hours: u64,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Server-chosen callback URL registered with the provider.
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Map-provider API key injected into the rendered page. The index
    /// route answers 500 when this is absent.
    pub maps_api_key: Option<String>,
    pub auth: AuthMode,
    /// Header consulted by the header strategy.
    pub identity_header: String,
    /// Present when `auth` is `Session`.
    pub session: Option<SessionConfig>,
    /// Present when `auth` is `Session`.
    pub oauth: Option<OAuthConfig>,
}

impl AppConfig {
    /// Builds configuration from the process environment. Session-strategy
    /// deployments must supply the session secret and the full OAuth
    /// endpoint set; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth = match env::var("AUTH_MODE") {
            Ok(value) => AuthMode::parse(&value).ok_or(ConfigError::Invalid {
                key: "AUTH_MODE",
                value,
            })?,
            Err(_) => AuthMode::Disabled,
        };

        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value,
            })?,
            Err(_) => 3000,
        };

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let (session, oauth) = if auth == AuthMode::Session {
            let secret =
                env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;
            let ttl_hours = match env::var("SESSION_TTL_HOURS") {
                Ok(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    key: "SESSION_TTL_HOURS",
                    value,
                })?,
                Err(_) => 24 * 7,
            };

            let oauth = OAuthConfig {
                client_id: env::var("OAUTH_CLIENT_ID")
                    .map_err(|_| ConfigError::Missing("OAUTH_CLIENT_ID"))?,
                client_secret: env::var("OAUTH_CLIENT_SECRET")
                    .map_err(|_| ConfigError::Missing("OAUTH_CLIENT_SECRET"))?,
                auth_url: env::var("OAUTH_AUTH_URL")
                    .map_err(|_| ConfigError::Missing("OAUTH_AUTH_URL"))?,
                token_url: env::var("OAUTH_TOKEN_URL")
                    .map_err(|_| ConfigError::Missing("OAUTH_TOKEN_URL"))?,
                userinfo_url: env::var("OAUTH_USERINFO_URL")
                    .map_err(|_| ConfigError::Missing("OAUTH_USERINFO_URL"))?,
                redirect_url: env::var("OAUTH_REDIRECT_URL")
                    .map_err(|_| ConfigError::Missing("OAUTH_REDIRECT_URL"))?,
            };

            (Some(SessionConfig { secret, ttl_hours }), Some(oauth))
        } else {
            (None, None)
        };

        Ok(Self {
            port,
            database_url,
            maps_api_key: env::var("MAPS_API_KEY").ok(),
            auth,
            identity_header: env::var("IDENTITY_HEADER")
                .unwrap_or_else(|_| "X-Firebase-UserId".to_string()),
            session,
            oauth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_auth_modes() {
        assert_eq!(AuthMode::parse("none"), Some(AuthMode::Disabled));
        assert_eq!(AuthMode::parse(""), Some(AuthMode::Disabled));
        assert_eq!(AuthMode::parse("header"), Some(AuthMode::Header));
        assert_eq!(AuthMode::parse("HEADER"), Some(AuthMode::Header));
        assert_eq!(AuthMode::parse("session"), Some(AuthMode::Session));
        assert_eq!(AuthMode::parse("oauth"), Some(AuthMode::Session));
        assert_eq!(AuthMode::parse("jwt"), None);
    }
}
