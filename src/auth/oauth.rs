use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::OAuthConfig;
use crate::database::models::user::NewUser;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("invalid authorize URL: {0}")]
    InvalidAuthorizeUrl(#[from] url::ParseError),

    #[error("provider exchange failed: {0}")]
    Exchange(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Identity claims returned by the provider's userinfo endpoint.
#[derive(Debug, Deserialize)]
pub struct ProviderClaims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl From<ProviderClaims> for NewUser {
    fn from(claims: ProviderClaims) -> Self {
        Self {
            external_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Client for the provider's authorization-code flow. The provider itself
/// is opaque to this system; only the three endpoint URLs matter.
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Provider authorize URL the login route redirects to.
    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let mut url = Url::parse(&self.config.auth_url)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("scope", "openid email profile")
            .append_pair("state", state);
        Ok(url.into())
    }

    /// Exchanges an authorization code for identity claims: code → access
    /// token at the token endpoint, then claims from the userinfo endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<ProviderClaims, OAuthError> {
        let token: TokenResponse = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_url),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let claims = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(claims)
    }
}
