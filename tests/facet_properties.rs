use serde_json::json;
use venue_facets::config::Config;
use venue_facets::dates::{canonicalize, parse_timestamp, CanonicalDate, DateFormat};
use venue_facets::domain::RawRecord;
use venue_facets::facets::{self, dedupe, matches, Facet, FilterState, MatchRules};
use venue_facets::normalize::{normalize, NormalizedRecord};
use venue_facets::tags::split_tags;

fn snapshot() -> Vec<NormalizedRecord> {
    let rows = json!([
        { "venue_id": 1, "name": "Soho Garden", "area": "Meydan", "category": "Nightlife",
          "vibe": ["Party|Late Night"], "genre": ["Techno|Deep House"], "date": "2025-09-17T23:00:00+04:00" },
        // Same venue, different event night
        { "venue_id": 1, "name": "Soho Garden", "area": "Meydan", "category": "Nightlife",
          "vibe": ["Rooftop"], "genre": ["House"], "date": "2025-09-18T20:00:00+00:00" },
        { "venue_id": 2, "name": "Zero Gravity", "area": "Jumeirah Beach Residence", "category": "Music Events",
          "vibe": ["Beach|Sunset"], "genre": ["Techno"], "date": "2025-09-17T16:00:00+00:00" },
        { "venue_id": 3, "name": "Blue Bar", "area": "Downtown Dubai", "category": "Music Events",
          "vibe": ["Lounge"], "genre": ["Jazz|Soul"], "date": "2025-09-19" },
        { "venue_id": 4, "name": "Mystery Spot", "area": "Al Quoz", "category": null,
          "vibe": null, "genre": ["Polka"], "date": "soon" },
        { "venue_id": 5, "name": "Barasti", "area": "Dubai Marina", "category": "Food & Dining",
          "vibe": ["Beach"], "genre": null, "date": null }
    ]);
    let raw: Vec<RawRecord> = serde_json::from_value(rows).unwrap();
    raw.into_iter().map(normalize).collect()
}

fn ids(records: &[NormalizedRecord], state: &FilterState) -> Vec<i64> {
    facets::apply(records, state, &MatchRules::default())
        .iter()
        .map(|v| v.venue_id)
        .collect()
}

fn sample_states() -> Vec<FilterState> {
    vec![
        FilterState::all_areas(),
        FilterState {
            selected_areas: vec!["JBR".into(), "Meydan".into()],
            ..FilterState::default()
        },
        FilterState {
            active_genres: vec!["Techno".into()],
            active_dates: vec!["17/September/2025".into()],
            ..FilterState::default()
        },
        FilterState {
            selected_areas: vec!["Marina".into()],
            active_vibes: vec!["Outdoor".into()],
            active_genres: vec!["Electronic".into()],
            active_dates: vec!["18 Sept 25".into(), "19 Sept 25".into()],
            search_query: "bar".into(),
        },
    ]
}

#[test]
fn test_options_ignore_own_facet_selection() {
    let records = snapshot();
    let rules = MatchRules::default();

    for state in sample_states() {
        for facet in Facet::ALL {
            let with_selection = facets::options_for(facet, &records, &state, &rules, DateFormat::Long);
            let without_selection =
                facets::options_for(facet, &records, &state.without(facet), &rules, DateFormat::Long);
            assert_eq!(with_selection, without_selection, "facet {facet} under {state:?}");
        }
    }
}

#[test]
fn test_literal_shapes_canonicalize_equal() {
    let expected = CanonicalDate::from_ymd(2025, 9, 17);
    assert_eq!(canonicalize("17/September/2025"), expected);
    assert_eq!(canonicalize("17 Sept 25"), expected);
}

#[test]
fn test_record_timestamp_compares_by_utc_day() {
    // 23:00 at +04:00 is 19:00 UTC on 17 September
    assert_eq!(
        parse_timestamp("2025-09-17T23:00:00+04:00"),
        canonicalize("17/September/2025")
    );
    assert_eq!(
        canonicalize("2025-09-17T23:00:00+04:00"),
        canonicalize("17/September/2025")
    );
}

#[test]
fn test_split_tags_examples() {
    assert_eq!(split_tags("Techno|Deep House"), vec!["Techno", "Deep House"]);
    assert_eq!(split_tags("Techno"), vec!["Techno"]);
}

#[test]
fn test_filtering_is_idempotent() {
    let records = snapshot();
    let rules = MatchRules::default();

    for state in sample_states() {
        let once: Vec<NormalizedRecord> = records
            .iter()
            .filter(|r| matches(r, &state, &rules))
            .cloned()
            .collect();
        let twice: Vec<NormalizedRecord> = once
            .iter()
            .filter(|r| matches(r, &state, &rules))
            .cloned()
            .collect();
        let once_ids: Vec<i64> = once.iter().map(|r| r.venue_id()).collect();
        let twice_ids: Vec<i64> = twice.iter().map(|r| r.venue_id()).collect();
        assert_eq!(once_ids, twice_ids);
    }
}

#[test]
fn test_dedupe_keeps_first_of_each_identity() {
    let raw: Vec<RawRecord> = serde_json::from_value(json!([
        { "venue_id": 1, "name": "first" },
        { "venue_id": 1, "name": "second" },
        { "venue_id": 2, "name": "third" }
    ]))
    .unwrap();
    let unique = dedupe(raw);
    let ids: Vec<i64> = unique.iter().map(|r| r.venue_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(unique[0].name, "first");
}

#[test]
fn test_dedupe_runs_after_matching() {
    // Only venue 1's second row is tagged House; it must still be found
    let state = FilterState {
        active_genres: vec!["House".into()],
        ..FilterState::default()
    };
    assert_eq!(ids(&snapshot(), &state), vec![1]);
}

#[test]
fn test_multi_genre_uses_and_semantics() {
    let records = snapshot();
    let state = FilterState {
        active_genres: vec!["Techno".into(), "House".into()],
        ..FilterState::default()
    };
    // Venue 2 is tagged only Techno; venue 1's first row has Techno + Deep House, not House
    assert!(ids(&records, &state).is_empty());

    let either_row = FilterState {
        active_genres: vec!["Techno".into(), "Deep House".into()],
        ..FilterState::default()
    };
    assert_eq!(ids(&records, &either_row), vec![1]);
}

#[test]
fn test_jbr_alias_matches_official_name() {
    let state = FilterState {
        selected_areas: vec!["JBR".into()],
        ..FilterState::default()
    };
    assert_eq!(ids(&snapshot(), &state), vec![2]);
}

#[test]
fn test_jbr_alias_survives_extra_configured_aliases() {
    let config = Config::from_toml(
        "[filters.area_aliases]\nDIFC = [\"Dubai International Financial Centre\"]\n",
    )
    .unwrap();
    let rules = MatchRules::from(&config.filters);
    let state = FilterState {
        selected_areas: vec!["JBR".into()],
        ..FilterState::default()
    };
    let venues: Vec<i64> = facets::apply(&snapshot(), &state, &rules)
        .iter()
        .map(|v| v.venue_id)
        .collect();
    assert_eq!(venues, vec![2]);
}

#[test]
fn test_default_state_returns_every_venue() {
    let state = FilterState {
        selected_areas: vec!["All".into()],
        ..FilterState::default()
    };
    assert_eq!(ids(&snapshot(), &state), vec![1, 2, 3, 4, 5]);
    assert_eq!(ids(&snapshot(), &FilterState::all_areas()), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_combined_filters() {
    let records = snapshot();

    let dated = FilterState {
        active_dates: vec!["17 Sept 25".into()],
        ..FilterState::all_areas()
    };
    assert_eq!(ids(&records, &dated), vec![1, 2]);

    let outdoor_electronic = FilterState {
        active_vibes: vec!["Outdoor".into()],
        active_genres: vec!["Electronic".into()],
        ..FilterState::all_areas()
    };
    assert_eq!(ids(&records, &outdoor_electronic), vec![1, 2]);

    let search = FilterState {
        search_query: "MUSIC".into(),
        ..FilterState::all_areas()
    };
    assert_eq!(ids(&records, &search), vec![2, 3]);
}

#[test]
fn test_options_under_selection() {
    let records = snapshot();
    let state = FilterState {
        active_genres: vec!["Techno".into()],
        ..FilterState::all_areas()
    };
    let options = facets::options(&records, &state, &MatchRules::default(), DateFormat::Long);

    assert_eq!(options.areas, vec!["Jumeirah Beach Residence", "Meydan"]);
    assert_eq!(options.dates, vec!["17/September/2025"]);
    assert!(options.genres.contains(&"Polka".to_string()));
    assert!(options.vibes.contains(&"Party".to_string()));
    assert!(!options.vibes.contains(&"Lounge".to_string()));
}
