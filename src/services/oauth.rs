// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authorization-code flow for obtaining an access token.
//!
//! The user opens the authorize URL, approves the application and is
//! redirected to a localhost address that does not need to exist. The pasted
//! redirect URL carries the authorization code, which is exchanged for tokens.

use crate::config::OAuthConfig;
use crate::error::AppError;
use crate::services::strava::check_response_json;
use serde::Deserialize;

/// Scopes requested from the athlete.
pub const REQUESTED_SCOPES: &str = "activity:write,activity:read,activity:read_all";

/// Scope needed to see private activities.
const READ_ALL_SCOPE: &str = "activity:read_all";

/// Strava OAuth client.
#[derive(Clone)]
pub struct StravaOAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl StravaOAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// URL the athlete opens to authorize the application.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/authorize?client_id={}&redirect_uri={}&response_type=code&approval_prompt=force&scope={}",
            self.config.oauth_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            REQUESTED_SCOPES,
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let url = format!("{}/token", self.config.oauth_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token exchange failed: {}", e)))?;

        check_response_json(response).await
    }
}

/// Token exchange response from Strava OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: Option<TokenAthlete>,
}

/// Athlete summary included in the token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAthlete {
    pub id: i64,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

/// Query parameters of the redirect the athlete pastes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRedirect {
    pub code: String,
    /// Granted scopes, comma separated, when Strava included them
    pub scope: Option<String>,
}

impl AuthorizationRedirect {
    /// Parse the pasted redirect URL (or bare query string).
    pub fn parse(url: &str) -> Result<Self, AppError> {
        let query = match url.trim().split_once('?') {
            Some((_, q)) => q,
            None => url.trim(),
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut code = None;
        let mut scope = None;
        let mut error = None;

        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            match key {
                "code" if !value.is_empty() => code = Some(value),
                "scope" => scope = Some(value),
                "error" => error = Some(value),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Err(AppError::BadRequest(format!(
                "Authorization was not granted: {}",
                error
            )));
        }

        let code = code.ok_or_else(|| {
            AppError::BadRequest("Unable to find auth code in provided URL".to_string())
        })?;

        Ok(Self { code, scope })
    }

    /// Whether the granted scopes allow reading private activities.
    /// Unknown (no `scope` parameter) counts as granted.
    pub fn grants_read_all(&self) -> bool {
        match &self.scope {
            Some(scope) => scope.split(',').any(|s| s.trim() == READ_ALL_SCOPE),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "1234".to_string(),
            client_secret: "secret".to_string(),
            oauth_url: "https://www.strava.com/oauth/".to_string(),
            redirect_uri: "http://localhost/exchange_token".to_string(),
        }
    }

    #[test]
    fn test_authorize_url() {
        let client = StravaOAuthClient::new(config());
        assert_eq!(
            client.authorize_url(),
            "https://www.strava.com/oauth/authorize?client_id=1234\
             &redirect_uri=http%3A%2F%2Flocalhost%2Fexchange_token\
             &response_type=code&approval_prompt=force\
             &scope=activity:write,activity:read,activity:read_all"
        );
    }

    #[test]
    fn test_parse_redirect_extracts_code_and_scope() {
        let redirect = AuthorizationRedirect::parse(
            "http://localhost/exchange_token?state=&code=abc123&scope=read,activity:write,activity:read,activity:read_all",
        )
        .unwrap();
        assert_eq!(redirect.code, "abc123");
        assert!(redirect.grants_read_all());
    }

    #[test]
    fn test_parse_redirect_percent_encoded_scope() {
        let redirect = AuthorizationRedirect::parse(
            "http://localhost/exchange_token?code=abc&scope=read%2Cactivity%3Aread",
        )
        .unwrap();
        assert_eq!(redirect.scope.as_deref(), Some("read,activity:read"));
        assert!(!redirect.grants_read_all());
    }

    #[test]
    fn test_parse_redirect_without_scope() {
        let redirect = AuthorizationRedirect::parse("code=xyz").unwrap();
        assert_eq!(redirect.code, "xyz");
        assert_eq!(redirect.scope, None);
        assert!(redirect.grants_read_all());
    }

    #[test]
    fn test_parse_redirect_missing_code() {
        let err = AuthorizationRedirect::parse("http://localhost/exchange_token?state=").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = AuthorizationRedirect::parse("http://localhost/exchange_token?code=").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_parse_redirect_access_denied() {
        let err = AuthorizationRedirect::parse(
            "http://localhost/exchange_token?state=&error=access_denied",
        )
        .unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }
}
