// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for listing activities.
//!
//! Handles:
//! - Paginated activity listing for ingestion
//! - Rate limit (429) and expired token (401) detection

use crate::error::AppError;
use crate::models::Activity;
use serde::Deserialize;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
}

impl StravaClient {
    /// Create a client against the given API base URL
    /// (normally `https://www.strava.com/api/v3`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List the authenticated athlete's activities, one page at a time.
    ///
    /// Pages are 1-indexed; an empty page means there are no more activities.
    pub async fn list_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Activity>, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
pub(crate) async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
        }

        if status.as_u16() == 401 {
            return Err(AppError::StravaApi(
                AppError::STRAVA_TOKEN_ERROR.to_string(),
            ));
        }

        return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
}
