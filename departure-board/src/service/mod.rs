//! Departure service: fetches, caches and selects.
//!
//! Ties a [`DepartureSource`] to the selector. Each poll captures `now`
//! once, makes sure the upstream marker is known, fetches raw departures
//! (through a short-lived cache) and runs selection. The result feeds a
//! [`FreshnessTracker`] that decides when the marker should be looked up
//! again.

mod cache;
mod freshness;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::domain::DepartureDetail;
use crate::select::{SelectionCriteria, select_details};
use crate::source::{DepartureSource, SourceError};

pub use cache::{BoardEntry, CacheConfig, ResponseCache};
pub use freshness::{FreshnessPolicy, FreshnessTracker};

/// Default number of raw departures requested upstream.
pub const DEFAULT_FETCH_LIMIT: u32 = 20;

/// Tunables for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub fetch_limit: u32,
    pub cache: CacheConfig,
    pub freshness: FreshnessPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
            cache: CacheConfig::default(),
            freshness: FreshnessPolicy::default(),
        }
    }
}

/// Fetches departures from a source and selects the ones worth showing.
pub struct DepartureService {
    source: Arc<dyn DepartureSource>,
    criteria: SelectionCriteria,
    fetch_limit: u32,
    clock: Arc<dyn Clock>,
    cache: ResponseCache,
    tracker: Mutex<FreshnessTracker>,
}

impl DepartureService {
    pub fn new(
        source: Arc<dyn DepartureSource>,
        criteria: SelectionCriteria,
        config: ServiceConfig,
    ) -> Self {
        let policy = config
            .freshness
            .clamped_to(criteria.max_results().get());

        Self {
            source,
            criteria,
            fetch_limit: config.fetch_limit.max(1),
            clock: Arc::new(SystemClock),
            cache: ResponseCache::new(&config.cache),
            tracker: Mutex::new(FreshnessTracker::new(policy)),
        }
    }

    /// Use a different clock (for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Current selection as structured details.
    pub async fn details(&self) -> Result<Vec<DepartureDetail>, SourceError> {
        let now = self.clock.now();
        let marker = self.current_marker().await?;
        let raw = self.fetch(&marker).await?;

        let details = select_details(&raw, &self.criteria, now);
        tracing::debug!(
            marker = %marker,
            fetched = raw.len(),
            selected = details.len(),
            "selected departures"
        );

        let mut tracker = self.tracker.lock().await;
        if tracker.observe(&details, now) {
            tracing::info!(
                marker = %marker,
                selected = details.len(),
                "departure board looks stale, will re-resolve marker"
            );
        }

        Ok(details)
    }

    /// Current selection as `"<line> <destination> <time>"` strings.
    pub async fn summaries(&self) -> Result<Vec<String>, SourceError> {
        Ok(self
            .details()
            .await?
            .iter()
            .map(DepartureDetail::summary)
            .collect())
    }

    /// The marker to fetch with, resolving it when missing or stale.
    ///
    /// A failed re-resolution falls back to the previous marker. The tracker
    /// lock is held while resolving, so concurrent callers wait for that
    /// resolution instead of issuing their own.
    async fn current_marker(&self) -> Result<String, SourceError> {
        let mut tracker = self.tracker.lock().await;
        if !tracker.needs_marker()
            && let Some(marker) = tracker.marker()
        {
            return Ok(marker.to_string());
        }

        match self.source.resolve_marker().await {
            Ok(marker) => {
                let refreshing = tracker.refresh_pending();
                let changed = tracker.set_marker(marker.clone());
                if refreshing || changed {
                    self.cache.invalidate_all();
                }
                tracing::info!(
                    source = self.source.name(),
                    marker = %marker,
                    changed,
                    "resolved upstream marker"
                );
                Ok(marker)
            }
            Err(e) => match tracker.marker() {
                Some(previous) => {
                    tracing::warn!(
                        error = %e,
                        marker = %previous,
                        "marker refresh failed, keeping previous marker"
                    );
                    Ok(previous.to_string())
                }
                None => Err(e),
            },
        }
    }

    async fn fetch(&self, marker: &str) -> Result<BoardEntry, SourceError> {
        if let Some(cached) = self.cache.get(marker).await {
            return Ok(cached);
        }

        let raw = self.source.fetch(marker, self.fetch_limit).await?;
        tracing::debug!(
            source = self.source.name(),
            marker = %marker,
            count = raw.len(),
            "fetched departures"
        );

        let entry = Arc::new(raw);
        self.cache.insert(marker.to_string(), entry.clone()).await;
        tracing::debug!(cached_boards = self.cache.entry_count(), "cached departures");
        Ok(entry)
    }
}
