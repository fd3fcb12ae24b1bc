//! Conversion from SL DTOs to raw departures.
//!
//! No filtering happens here: every record is passed on and selection
//! decides what survives.

use serde_json::Value;

use crate::domain::{RawDeparture, SiteDeparture};

use super::types::{SiteDeparturesResponse, SlDeparture, SlSite};

/// Convert a departures response; a missing list is an empty board.
pub fn convert_departures(response: &SiteDeparturesResponse) -> Vec<RawDeparture> {
    response
        .departures
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(convert_departure)
        .collect()
}

/// Convert a single SL departure.
pub fn convert_departure(dep: &SlDeparture) -> RawDeparture {
    RawDeparture::Site(SiteDeparture {
        destination: dep.destination.clone().or_else(|| dep.direction.clone()),
        line: dep.line.as_ref().and_then(|l| l.designation.clone()),
        platform: dep.stop_point.as_ref().and_then(|p| p.designation.clone()),
        expected: dep.expected.clone(),
        scheduled: dep.scheduled.clone(),
        journey_id: dep
            .journey
            .as_ref()
            .and_then(|j| j.id.as_ref())
            .and_then(journey_id),
        display: dep.display.clone(),
    })
}

/// Normalize an opaque journey id (number or string) to a string.
fn journey_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Find a site by name.
///
/// An exact (case-insensitive) match wins; otherwise the first site whose
/// name contains the query.
pub fn find_site<'a>(sites: &'a [SlSite], name: &str) -> Option<&'a SlSite> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    sites
        .iter()
        .find(|s| s.name.to_lowercase() == wanted)
        .or_else(|| sites.iter().find(|s| s.name.to_lowercase().contains(&wanted)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"{
        "departures": [
            {
                "destination": "Östberghöjden",
                "direction_code": 2,
                "direction": "Östberghöjden",
                "state": "EXPECTED",
                "display": "3 min",
                "scheduled": "2024-03-15T10:02:00",
                "expected": "2024-03-15T10:03:12",
                "journey": { "id": 2024031500134, "state": "EXPECTED" },
                "stop_point": { "id": 70123, "name": "Älvsjö station", "designation": "A" },
                "line": { "id": 134, "designation": "134", "transport_mode": "BUS" }
            },
            {
                "direction": "Fruängen",
                "display": "10:20",
                "scheduled": "2024-03-15T10:20:00",
                "journey": { "id": "abc" }
            }
        ]
    }"#;

    fn board() -> SiteDeparturesResponse {
        serde_json::from_str(BOARD).unwrap()
    }

    #[test]
    fn converts_full_record() {
        let raw = convert_departures(&board());
        assert_eq!(raw.len(), 2);

        let RawDeparture::Site(first) = &raw[0] else {
            panic!("expected site record");
        };
        assert_eq!(first.destination.as_deref(), Some("Östberghöjden"));
        assert_eq!(first.line.as_deref(), Some("134"));
        assert_eq!(first.platform.as_deref(), Some("A"));
        assert_eq!(first.expected.as_deref(), Some("2024-03-15T10:03:12"));
        assert_eq!(first.journey_id.as_deref(), Some("2024031500134"));
        assert_eq!(first.display.as_deref(), Some("3 min"));
    }

    #[test]
    fn sparse_record_uses_direction_and_string_journey() {
        let raw = convert_departures(&board());
        let RawDeparture::Site(second) = &raw[1] else {
            panic!("expected site record");
        };
        assert_eq!(second.destination.as_deref(), Some("Fruängen"));
        assert_eq!(second.line, None);
        assert_eq!(second.platform, None);
        assert_eq!(second.expected, None);
        assert_eq!(second.journey_id.as_deref(), Some("abc"));
    }

    #[test]
    fn null_departures_is_empty() {
        let response: SiteDeparturesResponse =
            serde_json::from_str(r#"{"departures": null}"#).unwrap();
        assert!(convert_departures(&response).is_empty());

        let response: SiteDeparturesResponse = serde_json::from_str("{}").unwrap();
        assert!(convert_departures(&response).is_empty());
    }

    #[test]
    fn odd_journey_ids_are_ignored() {
        assert_eq!(journey_id(&Value::Null), None);
        assert_eq!(journey_id(&Value::String(String::new())), None);
        assert_eq!(journey_id(&serde_json::json!(42)), Some("42".to_string()));
    }

    #[test]
    fn site_lookup_prefers_exact() {
        let sites = vec![
            SlSite {
                id: 1,
                name: "Älvsjö station".into(),
                abbreviation: None,
            },
            SlSite {
                id: 2,
                name: "Älvsjö".into(),
                abbreviation: None,
            },
        ];
        assert_eq!(find_site(&sites, "älvsjö").map(|s| s.id), Some(2));
        assert_eq!(find_site(&sites, "station").map(|s| s.id), Some(1));
        assert!(find_site(&sites, "Slussen").is_none());
        assert!(find_site(&sites, "  ").is_none());
    }
}
