//! Departure selection.
//!
//! Turns a list of raw upstream records into a short, ordered list of
//! departures worth showing. Selection is a pure function of its inputs: the
//! caller captures `now` once and passes it in, so the same records,
//! criteria and `now` always produce the same output.
//!
//! Malformed records (no destination, unparseable time, ...) are dropped
//! silently. Invalid criteria are impossible to construct, so selection
//! never fails.

mod criteria;

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{DepartureDetail, RawDeparture};

pub use criteria::{
    CriteriaError, DEFAULT_ZONE, MissingLinePolicy, PLATFORM_MARKER, PlatformRule,
    SelectionCriteria, TimePolicy, UnknownPolicy,
};

/// Departures this close to `now` (or closer) are considered gone.
pub const NOW_GUARD_MS: i64 = 30_000;

/// Display time for a departure less than a minute away.
pub const DEPARTING_NOW: &str = "Nu";

/// Line label used when a departure has no line designation.
pub const MISSING_LINE_LABEL: &str = "N/A";

/// A record that survived filtering, with everything resolved.
struct Candidate<'a> {
    line: String,
    destination: &'a str,
    instant: DateTime<Utc>,
    display: String,
    carries_journey: bool,
    journey_id: Option<&'a str>,
}

impl Candidate<'_> {
    fn into_detail(self) -> DepartureDetail {
        DepartureDetail {
            line_designation: self.line,
            destination: self.destination.to_string(),
            departure_time: self.instant,
            display_time: self.display,
        }
    }
}

/// Select departures as structured details.
///
/// Output is sorted by departure instant (ties keep input order), holds at
/// most `criteria.max_results()` entries, and only contains departures whose
/// destination contains the target.
pub fn select_details(
    raw: &[RawDeparture],
    criteria: &SelectionCriteria,
    now: DateTime<Utc>,
) -> Vec<DepartureDetail> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<Candidate<'_>> = raw
        .iter()
        .filter_map(|record| normalize(record, criteria, now))
        .collect();

    // Stable, so equal instants keep their input order
    candidates.sort_by_key(|c| c.instant);

    if criteria.dedup_journeys() {
        candidates = dedup_by_journey(candidates);
    }

    candidates.truncate(criteria.max_results().get());

    candidates.into_iter().map(Candidate::into_detail).collect()
}

/// Select departures as display lines (`"<line> <destination> <time>"`).
pub fn select_summaries(
    raw: &[RawDeparture],
    criteria: &SelectionCriteria,
    now: DateTime<Utc>,
) -> Vec<String> {
    select_details(raw, criteria, now)
        .iter()
        .map(DepartureDetail::summary)
        .collect()
}

/// Render the time until departure as `"Nu"` or `"<N> min"`.
///
/// Returns `None` for departures at most [`NOW_GUARD_MS`] away, which
/// includes everything in the past.
pub fn relative_display(instant: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let diff_ms = (instant - now).num_milliseconds();
    if diff_ms <= NOW_GUARD_MS {
        return None;
    }

    match diff_ms / 60_000 {
        0 => Some(DEPARTING_NOW.to_string()),
        minutes => Some(format!("{minutes} min")),
    }
}

/// Apply the per-record filters and resolve time, display and line.
fn normalize<'a>(
    record: &'a RawDeparture,
    criteria: &SelectionCriteria,
    now: DateTime<Utc>,
) -> Option<Candidate<'a>> {
    let destination = record.destination()?;
    if !destination.contains(criteria.destination()) {
        return None;
    }

    if !criteria.platform_rule().admits(record.platform()) {
        return None;
    }

    let line = record.line();
    if let Some(target) = criteria.line()
        && line != Some(target)
    {
        return None;
    }

    let instant = record.resolve_instant(criteria.zone())?;

    let display = match criteria.time_policy() {
        TimePolicy::RelativeMinutes => relative_display(instant, now)?,
        TimePolicy::PassThrough => {
            if instant < now {
                return None;
            }
            record.display()?.to_string()
        }
    };

    let line = match (line, criteria.missing_line()) {
        (Some(line), _) => line.to_string(),
        (None, MissingLinePolicy::Fallback) => MISSING_LINE_LABEL.to_string(),
        (None, MissingLinePolicy::Drop) => return None,
    };

    Some(Candidate {
        line,
        destination,
        instant,
        display,
        carries_journey: record.carries_journey_id(),
        journey_id: record.journey_id(),
    })
}

/// Keep the first (earliest) site record per journey; drop site records
/// with no id. Timetable records pass unchanged.
///
/// Expects candidates already sorted by instant.
fn dedup_by_journey(candidates: Vec<Candidate<'_>>) -> Vec<Candidate<'_>> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.carries_journey || c.journey_id.is_some_and(|id| seen.insert(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SiteDeparture, TimetableDeparture};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    fn at(offset: Duration) -> String {
        (now() + offset).to_rfc3339()
    }

    fn site(dest: &str, line: Option<&str>, offset: Duration, journey: Option<&str>) -> RawDeparture {
        RawDeparture::Site(SiteDeparture {
            destination: Some(dest.to_string()),
            line: line.map(str::to_string),
            platform: Some("A".to_string()),
            expected: Some(at(offset)),
            scheduled: None,
            journey_id: journey.map(str::to_string),
            display: None,
        })
    }

    fn criteria() -> SelectionCriteria {
        SelectionCriteria::new("Östberghöjden", 3).unwrap()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(select_details(&[], &criteria(), now()).is_empty());
        assert!(select_summaries(&[], &criteria(), now()).is_empty());
    }

    #[test]
    fn inside_guard_window_is_dropped() {
        let raw = vec![site("Östberghöjden", Some("134"), Duration::seconds(29), Some("j1"))];
        assert!(select_summaries(&raw, &criteria(), now()).is_empty());
    }

    #[test]
    fn exactly_at_guard_is_dropped() {
        let raw = vec![site("Östberghöjden", Some("134"), Duration::milliseconds(30_000), Some("j1"))];
        assert!(select_summaries(&raw, &criteria(), now()).is_empty());
    }

    #[test]
    fn just_past_guard_is_departing_now() {
        let raw = vec![site("Östberghöjden", Some("134"), Duration::milliseconds(30_001), Some("j1"))];
        assert_eq!(select_summaries(&raw, &criteria(), now()), vec!["134 Östberghöjden Nu"]);

        let raw = vec![site("Östberghöjden", Some("134"), Duration::seconds(31), Some("j1"))];
        assert_eq!(select_summaries(&raw, &criteria(), now()), vec!["134 Östberghöjden Nu"]);
    }

    #[test]
    fn minutes_are_floored() {
        let raw = vec![site("Östberghöjden", Some("134"), Duration::seconds(179), Some("j1"))];
        assert_eq!(select_summaries(&raw, &criteria(), now()), vec!["134 Östberghöjden 2 min"]);
    }

    #[test]
    fn past_departures_are_dropped() {
        let raw = vec![site("Östberghöjden", Some("134"), Duration::minutes(-2), Some("j1"))];
        assert!(select_details(&raw, &criteria(), now()).is_empty());
    }

    #[test]
    fn destination_substring_filter_keeps_order() {
        let raw = vec![
            site("Östberghöjden", Some("134"), Duration::minutes(4), Some("j1")),
            site("Fruängen", Some("134"), Duration::minutes(5), Some("j2")),
            site("Östberghöjden via Stuvsta", Some("134"), Duration::minutes(9), Some("j3")),
        ];
        let out = select_summaries(&raw, &criteria(), now());
        assert_eq!(
            out,
            vec![
                "134 Östberghöjden 4 min",
                "134 Östberghöjden via Stuvsta 9 min"
            ]
        );
    }

    #[test]
    fn destination_match_is_case_sensitive() {
        let raw = vec![site("östberghöjden", Some("134"), Duration::minutes(4), Some("j1"))];
        assert!(select_details(&raw, &criteria(), now()).is_empty());
    }

    #[test]
    fn missing_destination_is_dropped() {
        let raw = vec![RawDeparture::Site(SiteDeparture {
            line: Some("134".into()),
            expected: Some(at(Duration::minutes(5))),
            journey_id: Some("j1".into()),
            ..Default::default()
        })];
        assert!(select_details(&raw, &criteria(), now()).is_empty());
    }

    #[test]
    fn output_sorted_by_instant_not_input_order() {
        let raw = vec![
            site("Östberghöjden", Some("134"), Duration::minutes(12), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(3), Some("j2")),
            site("Östberghöjden", Some("134"), Duration::minutes(7), Some("j3")),
        ];
        let out = select_summaries(&raw, &criteria(), now());
        assert_eq!(
            out,
            vec![
                "134 Östberghöjden 3 min",
                "134 Östberghöjden 7 min",
                "134 Östberghöjden 12 min"
            ]
        );
    }

    #[test]
    fn same_journey_keeps_earliest() {
        let raw = vec![
            site("Östberghöjden", Some("134"), Duration::minutes(16), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(15), Some("j1")),
        ];
        let out = select_details(&raw, &criteria(), now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].departure_time, now() + Duration::minutes(15));
        assert_eq!(out[0].display_time, "15 min");
    }

    #[test]
    fn dedup_drops_records_without_journey() {
        let raw = vec![site("Östberghöjden", Some("134"), Duration::minutes(5), None)];
        assert!(select_details(&raw, &criteria(), now()).is_empty());

        let no_dedup = criteria().with_dedup_journeys(false);
        assert_eq!(select_details(&raw, &no_dedup, now()).len(), 1);
    }

    #[test]
    fn repeats_shown_without_dedup() {
        let raw = vec![
            site("Östberghöjden", Some("134"), Duration::minutes(15), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(16), Some("j1")),
        ];
        let c = criteria().with_dedup_journeys(false);
        assert_eq!(select_details(&raw, &c, now()).len(), 2);
    }

    #[test]
    fn platform_b_is_excluded() {
        let raw = vec![RawDeparture::Site(SiteDeparture {
            destination: Some("Östberghöjden".into()),
            line: Some("134".into()),
            platform: Some("B".into()),
            expected: Some(at(Duration::minutes(5))),
            journey_id: Some("j1".into()),
            ..Default::default()
        })];
        assert!(select_summaries(&raw, &criteria(), now()).is_empty());

        let only_b = criteria().with_platform_rule(PlatformRule::Only);
        assert_eq!(
            select_summaries(&raw, &only_b, now()),
            vec!["134 Östberghöjden 5 min"]
        );
    }

    #[test]
    fn missing_platform_is_not_excluded() {
        let raw = vec![RawDeparture::Site(SiteDeparture {
            destination: Some("Östberghöjden".into()),
            line: Some("134".into()),
            expected: Some(at(Duration::minutes(5))),
            journey_id: Some("j1".into()),
            ..Default::default()
        })];
        assert_eq!(select_details(&raw, &criteria(), now()).len(), 1);
    }

    #[test]
    fn missing_line_falls_back_to_na() {
        let raw = vec![site("Östberghöjden", None, Duration::minutes(5), Some("j1"))];
        assert_eq!(
            select_summaries(&raw, &criteria(), now()),
            vec!["N/A Östberghöjden 5 min"]
        );
    }

    #[test]
    fn missing_line_dropped_when_configured() {
        let raw = vec![site("Östberghöjden", None, Duration::minutes(5), Some("j1"))];
        let c = criteria().with_missing_line(MissingLinePolicy::Drop);
        assert!(select_details(&raw, &c, now()).is_empty());
    }

    #[test]
    fn line_filter_is_exact_and_drops_missing() {
        let raw = vec![
            site("Östberghöjden", Some("134"), Duration::minutes(5), Some("j1")),
            site("Östberghöjden", Some("1345"), Duration::minutes(6), Some("j2")),
            site("Östberghöjden", None, Duration::minutes(7), Some("j3")),
        ];
        let c = criteria().with_line("134");
        assert_eq!(
            select_summaries(&raw, &c, now()),
            vec!["134 Östberghöjden 5 min"]
        );
    }

    #[test]
    fn limit_applied_after_dedup() {
        let raw = vec![
            site("Östberghöjden", Some("134"), Duration::minutes(2), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(3), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(4), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(5), Some("j2")),
            site("Östberghöjden", Some("134"), Duration::minutes(6), Some("j3")),
            site("Östberghöjden", Some("134"), Duration::minutes(7), Some("j4")),
        ];
        let out = select_summaries(&raw, &criteria(), now());
        assert_eq!(
            out,
            vec![
                "134 Östberghöjden 2 min",
                "134 Östberghöjden 5 min",
                "134 Östberghöjden 6 min"
            ]
        );
    }

    #[test]
    fn pass_through_uses_source_display() {
        let raw = vec![RawDeparture::Site(SiteDeparture {
            destination: Some("Östberghöjden".into()),
            line: Some("134".into()),
            expected: Some(at(Duration::seconds(10))),
            display: Some("Nu".into()),
            ..Default::default()
        })];
        let c = criteria().with_time_policy(TimePolicy::PassThrough);

        // No guard window under pass-through
        assert_eq!(select_summaries(&raw, &c, now()), vec!["134 Östberghöjden Nu"]);
    }

    #[test]
    fn pass_through_drops_missing_display_and_missing_line() {
        let c = criteria().with_time_policy(TimePolicy::PassThrough);

        let no_display = vec![site("Östberghöjden", Some("134"), Duration::minutes(5), None)];
        assert!(select_details(&no_display, &c, now()).is_empty());

        let no_line = vec![RawDeparture::Site(SiteDeparture {
            destination: Some("Östberghöjden".into()),
            expected: Some(at(Duration::minutes(5))),
            display: Some("5 min".into()),
            ..Default::default()
        })];
        assert!(select_details(&no_line, &c, now()).is_empty());
    }

    #[test]
    fn pass_through_still_drops_past() {
        let raw = vec![RawDeparture::Site(SiteDeparture {
            destination: Some("Östberghöjden".into()),
            line: Some("134".into()),
            expected: Some(at(Duration::seconds(-1))),
            display: Some("Nu".into()),
            ..Default::default()
        })];
        let c = criteria().with_time_policy(TimePolicy::PassThrough);
        assert!(select_details(&raw, &c, now()).is_empty());
    }

    #[test]
    fn timetable_records_are_selected() {
        let local = (now() + Duration::minutes(8)).with_timezone(&DEFAULT_ZONE);
        let raw = vec![
            RawDeparture::Timetable(TimetableDeparture {
                direction: Some("Östberghöjden (Stockholm kn)".into()),
                line_number: Some("134".into()),
                track: Some("A".into()),
                date: Some(local.format("%Y-%m-%d").to_string()),
                time: Some(local.format("%H:%M:%S").to_string()),
                ..Default::default()
            }),
            RawDeparture::Timetable(TimetableDeparture {
                direction: Some("Östberghöjden (Stockholm kn)".into()),
                line_number: Some("134".into()),
                track: Some("B".into()),
                date: Some(local.format("%Y-%m-%d").to_string()),
                time: Some(local.format("%H:%M:%S").to_string()),
                ..Default::default()
            }),
        ];
        // Default criteria dedup, but timetable records carry no journey ids
        let c = criteria().with_line("134");
        assert!(c.dedup_journeys());
        assert_eq!(
            select_summaries(&raw, &c, now()),
            vec!["134 Östberghöjden (Stockholm kn) 8 min"]
        );
    }

    #[test]
    fn pass_through_keeps_records_without_journey() {
        let raw = vec![
            RawDeparture::Site(SiteDeparture {
                destination: Some("Östberghöjden".into()),
                line: Some("134".into()),
                expected: Some(at(Duration::minutes(5))),
                display: Some("5 min".into()),
                ..Default::default()
            }),
            RawDeparture::Site(SiteDeparture {
                destination: Some("Östberghöjden".into()),
                line: Some("134".into()),
                expected: Some(at(Duration::minutes(5))),
                display: Some("5 min".into()),
                ..Default::default()
            }),
        ];
        let c = criteria().with_time_policy(TimePolicy::PassThrough);

        // Repeats are shown as the source sent them
        assert_eq!(
            select_summaries(&raw, &c, now()),
            vec!["134 Östberghöjden 5 min", "134 Östberghöjden 5 min"]
        );
    }

    #[test]
    fn mixed_board_dedups_only_site_records() {
        let local = (now() + Duration::minutes(8)).with_timezone(&DEFAULT_ZONE);
        let raw = vec![
            site("Östberghöjden", Some("134"), Duration::minutes(2), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(4), Some("j1")),
            site("Östberghöjden", Some("134"), Duration::minutes(6), None),
            RawDeparture::Timetable(TimetableDeparture {
                direction: Some("Östberghöjden".into()),
                line_number: Some("144".into()),
                date: Some(local.format("%Y-%m-%d").to_string()),
                time: Some(local.format("%H:%M:%S").to_string()),
                ..Default::default()
            }),
        ];
        assert_eq!(
            select_summaries(&raw, &criteria(), now()),
            vec!["134 Östberghöjden 2 min", "144 Östberghöjden 8 min"]
        );
    }

    #[test]
    fn unparseable_time_is_dropped() {
        let raw = vec![RawDeparture::Site(SiteDeparture {
            destination: Some("Östberghöjden".into()),
            line: Some("134".into()),
            expected: Some("tomorrow-ish".into()),
            journey_id: Some("j1".into()),
            ..Default::default()
        })];
        assert!(select_details(&raw, &criteria(), now()).is_empty());
    }

    #[test]
    fn relative_display_values() {
        assert_eq!(relative_display(now() + Duration::seconds(59), now()).as_deref(), Some("Nu"));
        assert_eq!(relative_display(now() + Duration::seconds(60), now()).as_deref(), Some("1 min"));
        assert_eq!(relative_display(now() + Duration::minutes(42), now()).as_deref(), Some("42 min"));
        assert_eq!(relative_display(now(), now()), None);
        assert_eq!(relative_display(now() - Duration::minutes(1), now()), None);
    }
}
