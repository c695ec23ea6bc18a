// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ingestion: fetch activities from Strava and persist them as a bronze batch.
//!
//! Handles the workflow:
//! 1. Resolve credentials (fails before any network call if one is missing)
//! 2. Exchange the refresh token for an access token
//! 3. Fetch pages in order until an empty page or `max_pages`
//! 4. Write the raw batch, plus a columnar snapshot when non-empty

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, StravaCredentials};
use crate::db::{BatchId, BronzeStore};
use crate::error::{PipelineError, Result};
use crate::models::RawActivity;
use crate::services::StravaClient;

/// Fetches every page of activities for one ingestion run.
pub struct ActivityFetcher {
    client: StravaClient,
    credentials: StravaCredentials,
    page_delay: Duration,
}

impl ActivityFetcher {
    pub fn new(client: StravaClient, credentials: StravaCredentials, page_delay: Duration) -> Self {
        Self {
            client,
            credentials,
            page_delay,
        }
    }

    /// Build a fetcher from configuration.
    ///
    /// Returns a configuration error if any Strava secret is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = config.credentials()?;
        Ok(Self::new(
            StravaClient::from_config(config),
            credentials,
            config.page_delay,
        ))
    }

    /// Fetch activities, page by page.
    ///
    /// Stops at the first empty page. Any failing page aborts the whole
    /// fetch and nothing fetched so far is returned.
    pub async fn fetch(
        &self,
        after_epoch: Option<i64>,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Vec<RawActivity>> {
        let access_token = self.client.refresh_access_token(&self.credentials).await?;
        let mut activities = Vec::new();

        for page in 1..=max_pages {
            let batch = self
                .client
                .list_activities(&access_token, after_epoch, page, page_size)
                .await
                .map_err(|e| PipelineError::FetchPage {
                    page,
                    source: Box::new(e),
                })?;

            if batch.is_empty() {
                tracing::debug!(page, "Empty page, end of activities");
                break;
            }

            tracing::debug!(page, count = batch.len(), "Fetched activities page");
            activities.extend(batch);

            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(activities)
    }
}

/// Result of writing one bronze batch.
#[derive(Debug, Clone)]
pub struct BronzeBatch {
    pub batch_id: BatchId,
    pub records: usize,
    pub raw_path: PathBuf,
    /// `None` when the batch was empty
    pub columnar_path: Option<PathBuf>,
}

/// Persists fetched records as a new, never-overwritten bronze batch.
pub struct BronzeWriter {
    store: BronzeStore,
}

impl BronzeWriter {
    pub fn new(store: BronzeStore) -> Self {
        Self { store }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(BronzeStore::new(&config.bronze_dir))
    }

    /// Save a batch stamped with the current time.
    pub fn save(&self, records: &[RawActivity]) -> Result<BronzeBatch> {
        self.save_at(records, Utc::now())
    }

    /// Save a batch stamped with `now`.
    pub fn save_at(&self, records: &[RawActivity], now: DateTime<Utc>) -> Result<BronzeBatch> {
        let batch_id = self.store.allocate_batch_id(now);
        let raw_path = self.store.write_raw(&batch_id, records)?;

        // An empty batch has nothing to type columns from.
        let columnar_path = if records.is_empty() {
            None
        } else {
            Some(self.store.write_columnar(&batch_id, records)?)
        };

        tracing::info!(
            batch = %batch_id,
            records = records.len(),
            raw = %raw_path.display(),
            "Bronze batch written"
        );

        Ok(BronzeBatch {
            batch_id,
            records: records.len(),
            raw_path,
            columnar_path,
        })
    }
}

/// Fetch with the configured paging and persist as a bronze batch.
pub async fn ingest(config: &Config) -> Result<BronzeBatch> {
    let fetcher = ActivityFetcher::from_config(config)?;
    let activities = fetcher
        .fetch(config.after_epoch, config.per_page, config.max_pages)
        .await?;
    tracing::info!(count = activities.len(), "Fetched activities from Strava");

    BronzeWriter::from_config(config).save(&activities)
}
