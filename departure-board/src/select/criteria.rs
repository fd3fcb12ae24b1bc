//! Selection criteria and the policy switches that shape the pipeline.

use std::num::NonZeroUsize;
use std::str::FromStr;

use chrono_tz::Tz;

/// The platform designation that the platform rule is tested against.
pub const PLATFORM_MARKER: &str = "B";

/// Zone used for upstream timestamps that carry no offset.
pub const DEFAULT_ZONE: Tz = chrono_tz::Europe::Stockholm;

/// Error returned when selection criteria are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    /// The result limit must be at least one
    #[error("maximum results must be positive, got {0}")]
    NonPositiveLimit(i64),

    /// An empty target would match every destination
    #[error("target destination must not be empty")]
    EmptyDestination,
}

/// Error returned when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownPolicy {
    kind: &'static str,
    value: String,
}

/// How the platform marker affects selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformRule {
    /// Drop departures from the marked platform.
    #[default]
    Exclude,
    /// Keep only departures from the marked platform.
    Only,
    /// Ignore platforms entirely.
    Any,
}

impl PlatformRule {
    /// Whether a departure with this platform designation passes the rule.
    ///
    /// Only an exact match counts as the marked platform; a missing
    /// designation never does.
    pub fn admits(self, platform: Option<&str>) -> bool {
        let marked = platform == Some(PLATFORM_MARKER);
        match self {
            PlatformRule::Exclude => !marked,
            PlatformRule::Only => marked,
            PlatformRule::Any => true,
        }
    }
}

impl FromStr for PlatformRule {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(PlatformRule::Exclude),
            "only" | "include-only" => Ok(PlatformRule::Only),
            "any" | "all" => Ok(PlatformRule::Any),
            _ => Err(UnknownPolicy {
                kind: "platform rule",
                value: s.to_string(),
            }),
        }
    }
}

/// How the display time of a departure is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimePolicy {
    /// Compute `"Nu"` / `"<N> min"` from the resolved instant.
    #[default]
    RelativeMinutes,
    /// Use the display string the source already formatted.
    PassThrough,
}

impl FromStr for TimePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative" | "relative-minutes" => Ok(TimePolicy::RelativeMinutes),
            "passthrough" | "pass-through" => Ok(TimePolicy::PassThrough),
            _ => Err(UnknownPolicy {
                kind: "time policy",
                value: s.to_string(),
            }),
        }
    }
}

/// What to do with a departure that has no line designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLinePolicy {
    /// Show it with `"N/A"` as the line.
    Fallback,
    /// Leave it out.
    Drop,
}

impl FromStr for MissingLinePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(MissingLinePolicy::Fallback),
            "drop" => Ok(MissingLinePolicy::Drop),
            _ => Err(UnknownPolicy {
                kind: "missing-line policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Validated parameters for departure selection.
///
/// Construction rejects criteria that would make selection meaningless, so
/// the selector itself never has to fail.
///
/// # Examples
///
/// ```
/// use departure_board::select::{CriteriaError, PlatformRule, SelectionCriteria};
///
/// let criteria = SelectionCriteria::new("Östberghöjden", 3)
///     .unwrap()
///     .with_line("134")
///     .with_platform_rule(PlatformRule::Any);
/// assert_eq!(criteria.max_results().get(), 3);
///
/// assert_eq!(
///     SelectionCriteria::new("Östberghöjden", 0).unwrap_err(),
///     CriteriaError::NonPositiveLimit(0)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    destination: String,
    line: Option<String>,
    platform_rule: PlatformRule,
    max_results: NonZeroUsize,
    time_policy: TimePolicy,
    missing_line: Option<MissingLinePolicy>,
    dedup_journeys: Option<bool>,
    zone: Tz,
}

impl SelectionCriteria {
    /// Create criteria with the default policies.
    pub fn new(destination: impl Into<String>, max_results: i64) -> Result<Self, CriteriaError> {
        let destination = destination.into();
        if destination.is_empty() {
            return Err(CriteriaError::EmptyDestination);
        }

        let max_results = usize::try_from(max_results)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(CriteriaError::NonPositiveLimit(max_results))?;

        Ok(Self {
            destination,
            line: None,
            platform_rule: PlatformRule::default(),
            max_results,
            time_policy: TimePolicy::default(),
            missing_line: None,
            dedup_journeys: None,
            zone: DEFAULT_ZONE,
        })
    }

    /// Only keep departures on this exact line.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    pub fn with_platform_rule(mut self, rule: PlatformRule) -> Self {
        self.platform_rule = rule;
        self
    }

    pub fn with_time_policy(mut self, policy: TimePolicy) -> Self {
        self.time_policy = policy;
        self
    }

    /// Override the missing-line policy implied by the time policy.
    pub fn with_missing_line(mut self, policy: MissingLinePolicy) -> Self {
        self.missing_line = Some(policy);
        self
    }

    /// Override the journey dedup default implied by the time policy.
    pub fn with_dedup_journeys(mut self, dedup: bool) -> Self {
        self.dedup_journeys = Some(dedup);
        self
    }

    pub fn with_zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    pub fn platform_rule(&self) -> PlatformRule {
        self.platform_rule
    }

    pub fn max_results(&self) -> NonZeroUsize {
        self.max_results
    }

    pub fn time_policy(&self) -> TimePolicy {
        self.time_policy
    }

    /// The effective missing-line policy.
    ///
    /// Unless overridden, relative-minute rendering falls back to `"N/A"`
    /// and pass-through rendering drops the departure.
    pub fn missing_line(&self) -> MissingLinePolicy {
        self.missing_line.unwrap_or(match self.time_policy {
            TimePolicy::RelativeMinutes => MissingLinePolicy::Fallback,
            TimePolicy::PassThrough => MissingLinePolicy::Drop,
        })
    }

    /// Whether site records are deduplicated by journey id.
    ///
    /// Unless overridden, only relative-minute rendering deduplicates.
    pub fn dedup_journeys(&self) -> bool {
        self.dedup_journeys
            .unwrap_or(self.time_policy == TimePolicy::RelativeMinutes)
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}
