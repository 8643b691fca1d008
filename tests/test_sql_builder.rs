//! Unit tests for the SqlBuilder query construction.

use campaign_qa::SqlBuilder;

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("raw_records").build();
    assert_eq!(sql, "SELECT *\nFROM raw_records");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("raw_records")
        .select(&["date", "spend"])
        .build();
    assert!(sql.starts_with("SELECT date, spend\n"));
}

#[test]
fn range_conditions_are_parameterized() {
    let (sql, params) = SqlBuilder::new("raw_records")
        .where_gte("date", "2024-06-01")
        .where_lte("date", "2024-06-30")
        .build();
    assert!(sql.contains("WHERE date >= ? AND date <= ?"));
    assert_eq!(params, vec!["2024-06-01", "2024-06-30"]);
}

#[test]
fn where_in_trimmed_normalizes_values() {
    let (sql, params) = SqlBuilder::new("raw_records")
        .where_in_trimmed("platform", &[" Meta ", "AMAZON"])
        .build();
    assert!(sql.contains("LOWER(TRIM(platform)) IN (?, ?)"));
    assert_eq!(params, vec!["meta", "amazon"]);
}

#[test]
fn where_in_trimmed_with_no_values_matches_nothing() {
    let (sql, params) = SqlBuilder::new("raw_records")
        .where_in_trimmed("platform", &[])
        .build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

#[test]
fn order_and_limit_come_last() {
    let (sql, _) = SqlBuilder::new("raw_records")
        .where_gte("spend", "0")
        .order_by(&["rowid"])
        .limit(5)
        .build();
    assert!(sql.ends_with("\nWHERE spend >= ?\nORDER BY rowid\nLIMIT 5"));
}

#[test]
fn injection_stays_in_params() {
    let evil = "x'; DROP TABLE raw_records; --";
    let (sql, params) = SqlBuilder::new("raw_records")
        .where_gte("date", evil)
        .build();
    assert!(!sql.contains("DROP"));
    assert_eq!(params, vec![evil]);
}
