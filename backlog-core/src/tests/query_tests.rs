use super::*;
use crate::types::OTHER_CATEGORY;

fn record(id: &str, name: &str, score: f64, category: &str, date: &str) -> GameRecord {
    let mut r = GameRecord::new(id, name);
    r.score = score;
    r.category = category.to_string();
    r.record_date = date.to_string();
    r
}

fn sample() -> Vec<GameRecord> {
    vec![
        record("a", "Chrono Trigger", 9.5, "RPG", "2024-05-01T10:00"),
        record("b", "Doom", 8.0, "ACT", "2023-11-20T22:15"),
        record("c", "Myst", 6.5, "ADV", "not a date"),
        record("d", "chrono cross", 7.0, "RPG", "2024-01-03T09:00"),
    ]
}

fn ids(records: &[GameRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn empty_search_returns_everything_in_order() {
    let records = sample();
    let registry = CategoryRegistry::with_defaults();
    let found = search(&records, "", &SearchFilters::default(), &registry);
    assert_eq!(found, records);

    let found = search(&records, "   ", &SearchFilters::default(), &registry);
    assert_eq!(ids(&found), ["a", "b", "c", "d"]);
}

#[test]
fn text_search_is_case_insensitive_substring() {
    let registry = CategoryRegistry::with_defaults();
    let found = search(&sample(), "CHRONO", &SearchFilters::default(), &registry);
    assert_eq!(ids(&found), ["a", "d"]);
}

#[test]
fn year_and_month_filters_skip_invalid_dates() {
    let registry = CategoryRegistry::with_defaults();
    let filters = SearchFilters {
        year: Some(2024),
        ..Default::default()
    };
    assert_eq!(ids(&search(&sample(), "", &filters, &registry)), ["a", "d"]);

    let filters = SearchFilters {
        year: Some(2024),
        month: Some(5),
        ..Default::default()
    };
    assert_eq!(ids(&search(&sample(), "", &filters, &registry)), ["a"]);

    let filters = SearchFilters {
        month: Some(11),
        ..Default::default()
    };
    assert_eq!(ids(&search(&sample(), "", &filters, &registry)), ["b"]);
}

#[test]
fn category_filter_is_normalized() {
    let registry = CategoryRegistry::with_defaults();
    let mut records = sample();
    records.push(record("e", "Tetris", 9.0, OTHER_CATEGORY, "2022-02-02T02:02"));

    let filters = SearchFilters {
        category: Some("RPG".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&search(&records, "", &filters, &registry)), ["a", "d"]);

    let filters = SearchFilters {
        category: Some("PUZZLE".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&search(&records, "", &filters, &registry)), ["e"]);

    let filters = SearchFilters {
        category: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(search(&records, "", &filters, &registry).len(), 5);
}

#[test]
fn filters_compose_with_and() {
    let registry = CategoryRegistry::with_defaults();
    let filters = SearchFilters {
        year: Some(2024),
        category: Some("RPG".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(&search(&sample(), "cross", &filters, &registry)), ["d"]);
}

#[test]
fn invalid_dates_sort_last_in_both_directions() {
    let records = sample();
    assert_eq!(ids(&sort(&records, SortOrder::DateDesc)), ["a", "d", "b", "c"]);
    assert_eq!(ids(&sort(&records, SortOrder::DateAsc)), ["b", "d", "a", "c"]);
}

#[test]
fn score_and_name_orders() {
    let records = sample();
    assert_eq!(ids(&sort(&records, SortOrder::ScoreDesc)), ["a", "b", "d", "c"]);
    assert_eq!(ids(&sort(&records, SortOrder::ScoreAsc)), ["c", "d", "b", "a"]);
    assert_eq!(ids(&sort(&records, SortOrder::NameAsc)), ["d", "a", "b", "c"]);
    assert_eq!(ids(&sort(&records, SortOrder::NameDesc)), ["c", "b", "a", "d"]);
}

#[test]
fn sort_is_stable_for_ties() {
    let records = vec![
        record("x", "A", 5.0, "RPG", "2024-01-01T00:00"),
        record("y", "B", 5.0, "RPG", "2024-01-01T00:00"),
        record("z", "C", 5.0, "RPG", "bad"),
        record("w", "D", 5.0, "RPG", "also bad"),
    ];
    assert_eq!(ids(&sort(&records, SortOrder::ScoreDesc)), ["x", "y", "z", "w"]);
    assert_eq!(ids(&sort(&records, SortOrder::DateDesc)), ["x", "y", "z", "w"]);
}

#[test]
fn unknown_order_falls_back_to_date_desc() {
    assert_eq!(SortOrder::from_str_loose("sideways"), SortOrder::DateDesc);
    assert_eq!(SortOrder::from_str_loose("Name-Desc"), SortOrder::NameDesc);
    for order in SortOrder::ALL {
        assert_eq!(SortOrder::from_str_loose(order.as_str()), order);
    }
}

#[test]
fn statistics_of_empty_list() {
    let stats = statistics(&[]);
    assert_eq!(stats.total_games, 0);
    assert_eq!(stats.average_score, 0.0);
    assert_eq!(stats.total_play_time, 0.0);
    assert!(stats.category_stats.is_empty());
    assert!(stats.year_stats.is_empty());
}

#[test]
fn statistics_aggregates() {
    let mut records = sample();
    records[0].play_time = Some(20.5);
    records[1].play_time = Some(4.0);

    let stats = statistics(&records);
    assert_eq!(stats.total_games, 4);
    // (9.5 + 8.0 + 6.5 + 7.0) / 4 = 7.75
    assert_eq!(stats.average_score, 7.8);
    assert_eq!(stats.total_play_time, 24.5);
    assert_eq!(stats.category_stats.get("RPG"), Some(&2));
    assert_eq!(stats.category_stats.get("ADV"), Some(&1));
    assert_eq!(stats.year_stats.get(&2024), Some(&2));
    assert_eq!(stats.year_stats.get(&2023), Some(&1));
    assert_eq!(stats.year_stats.values().sum::<usize>(), 3);
}

#[test]
fn statistics_serializes_camel_case() {
    let value = serde_json::to_value(statistics(&sample())).unwrap();
    assert!(value.get("totalGames").is_some());
    assert!(value.get("averageScore").is_some());
    assert!(value.get("yearStats").is_some());
}

#[test]
fn years_are_distinct_and_descending() {
    let mut records = sample();
    records.push(record("e", "Tetris", 9.0, "OTHER", "2022-02-02T02:02"));
    assert_eq!(available_years(&records), [2024, 2023, 2022]);
    assert!(available_years(&[]).is_empty());
}

#[test]
fn repair_rewrites_only_invalid_dates() {
    let mut records = sample();
    let repaired = repair_invalid_dates_with(&mut records, "2025-01-01T00:00");
    assert_eq!(repaired, 1);
    assert_eq!(records[2].record_date, "2025-01-01T00:00");
    assert_eq!(records[0].record_date, "2024-05-01T10:00");

    assert_eq!(repair_invalid_dates(&mut records), 0);
}
