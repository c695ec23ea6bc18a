// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Access token refresh from a long-lived refresh token
//! - Paginated activity listing
//! - Rate limit detection (logged; there is no retry)

use crate::config::{Config, StravaCredentials};
use crate::error::PipelineError;
use crate::models::RawActivity;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
}

impl StravaClient {
    /// Create a client for the given API and token endpoints.
    pub fn new(base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token_url: token_url.into(),
        }
    }

    /// Create a client using the endpoints from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.strava_api_url.clone(), config.strava_token_url.clone())
    }

    /// Exchange the refresh token for a short-lived access token.
    pub async fn refresh_access_token(
        &self,
        credentials: &StravaCredentials,
    ) -> Result<String, PipelineError> {
        let response = self
            .http
            .post(&self.token_url)
            .timeout(REQUEST_TIMEOUT)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        let token: TokenRefreshResponse = self.check_response_json(response).await?;
        Ok(token.access_token)
    }

    /// List one page of the athlete's activities.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: Option<i64>, // Unix timestamp
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawActivity>, PipelineError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| PipelineError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PipelineError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(PipelineError::StravaApi(format!(
                    "{}: HTTP {}",
                    PipelineError::STRAVA_RATE_LIMIT,
                    status
                )));
            }

            return Err(PipelineError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
}
