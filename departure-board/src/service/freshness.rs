//! Upstream freshness tracking.
//!
//! Stop and site ids occasionally go stale upstream: a board that quietly
//! stops listing departures usually means the stop was renumbered. The
//! tracker watches what selection produces and asks for the marker to be
//! looked up again once the board has looked thin for long enough.

use chrono::{DateTime, Duration, Utc};

use crate::domain::DepartureDetail;

/// When a board counts as thin, and for how long that is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// Fewer selected departures than this is thin.
    pub min_departures: usize,
    /// A nearest departure further away than this is thin.
    pub max_lead: Duration,
    /// How long a thin board is tolerated before refreshing.
    pub stale_after: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            min_departures: 2,
            max_lead: Duration::minutes(30),
            stale_after: Duration::minutes(5),
        }
    }
}

impl FreshnessPolicy {
    /// Never expect more departures than selection is allowed to return.
    pub fn clamped_to(mut self, max_results: usize) -> Self {
        self.min_departures = self.min_departures.min(max_results);
        self
    }
}

/// Identity marker plus the state of the thin-board timer.
#[derive(Debug, Clone)]
pub struct FreshnessTracker {
    policy: FreshnessPolicy,
    marker: Option<String>,
    refresh_pending: bool,
    low_since: Option<DateTime<Utc>>,
}

impl FreshnessTracker {
    pub fn new(policy: FreshnessPolicy) -> Self {
        Self {
            policy,
            marker: None,
            refresh_pending: false,
            low_since: None,
        }
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    pub fn low_since(&self) -> Option<DateTime<Utc>> {
        self.low_since
    }

    /// Whether the marker has to be (re)resolved before the next fetch.
    pub fn needs_marker(&self) -> bool {
        self.marker.is_none() || self.refresh_pending
    }

    /// Record a freshly resolved marker. Returns whether it changed.
    pub fn set_marker(&mut self, marker: String) -> bool {
        let changed = self.marker.as_deref() != Some(marker.as_str());
        self.marker = Some(marker);
        self.refresh_pending = false;
        self.low_since = None;
        changed
    }

    /// Feed one selection result.
    ///
    /// Returns `true` when this observation flags a refresh.
    pub fn observe(&mut self, details: &[DepartureDetail], now: DateTime<Utc>) -> bool {
        if !self.is_thin(details, now) {
            self.low_since = None;
            return false;
        }

        let since = *self.low_since.get_or_insert(now);
        if self.refresh_pending || now - since < self.policy.stale_after {
            return false;
        }

        self.refresh_pending = true;
        true
    }

    fn is_thin(&self, details: &[DepartureDetail], now: DateTime<Utc>) -> bool {
        if details.len() < self.policy.min_departures {
            return true;
        }
        details
            .first()
            .is_some_and(|nearest| nearest.departure_time - now > self.policy.max_lead)
    }
}
