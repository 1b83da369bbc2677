//! Tests for the slicing module

use super::*;
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn utc(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn all(slicer: &dyn Slicer, stream_state: &serde_json::Value) -> Vec<StreamSlice> {
    slicer.slices(stream_state).unwrap().collect()
}

#[test]
fn test_single_slicer() {
    let slices = all(&SingleSlicer, &json!(null));
    assert_eq!(slices, vec![StreamSlice::new()]);
    assert!(slices[0].is_empty());
}

#[test]
fn test_list_slicer() {
    let slicer = ListSlicer::new(["C1", "C2"], "channel");
    let slices = all(&slicer, &json!({}));

    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].get_str("channel"), Some("C1"));
    assert_eq!(slices[1].get_str("channel"), Some("C2"));
}

#[test]
fn test_datetime_slicer_windows() {
    let slicer = DatetimeSlicer::new(utc(2024, 1, 1), Duration::days(2)).with_end(utc(2024, 1, 6));
    let slices = all(&slicer, &json!(null));

    let windows: Vec<(&str, &str)> = slices
        .iter()
        .map(|s| (s.get_str("start").unwrap(), s.get_str("end").unwrap()))
        .collect();
    assert_eq!(
        windows,
        vec![
            ("2024-01-01T00:00:00+00:00", "2024-01-03T00:00:00+00:00"),
            ("2024-01-03T00:00:00+00:00", "2024-01-05T00:00:00+00:00"),
            ("2024-01-05T00:00:00+00:00", "2024-01-06T00:00:00+00:00"),
        ]
    );
}

#[test]
fn test_datetime_slicer_resumes_from_state() {
    let slicer = DatetimeSlicer::new(utc(2024, 1, 1), Duration::days(1))
        .with_end(utc(2024, 1, 10))
        .with_cursor_field("updated_at")
        .with_format(DatetimeFormat::Pattern("%Y-%m-%d".into()));

    let slices = all(&slicer, &json!({"updated_at": "2024-01-08T00:00:00Z"}));

    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].get_str("start"), Some("2024-01-08"));
    assert_eq!(slices[1].get_str("end"), Some("2024-01-10"));
}

#[test]
fn test_datetime_slicer_state_before_start_is_ignored() {
    let slicer = DatetimeSlicer::new(utc(2024, 1, 5), Duration::days(10))
        .with_end(utc(2024, 1, 6))
        .with_cursor_field("ts");

    let slices = all(&slicer, &json!({"ts": "2020-01-01"}));
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].get_str("start"), Some("2024-01-05T00:00:00+00:00"));
}

#[test]
fn test_datetime_slicer_future_state_yields_nothing() {
    let slicer = DatetimeSlicer::new(utc(2024, 1, 1), Duration::days(1))
        .with_cursor_field("ts")
        .with_keys("oldest", "latest")
        .with_format(DatetimeFormat::EpochSeconds);

    // epoch seconds far in the future, as Slack writes them
    let slices = all(&slicer, &json!({"ts": "32503680000.000100"}));
    assert!(slices.is_empty());
}

#[test]
fn test_datetime_slicer_epoch_keys() {
    let slicer = DatetimeSlicer::new(utc(1970, 1, 1), Duration::hours(12))
        .with_end(utc(1970, 1, 2))
        .with_keys("oldest", "latest")
        .with_format(DatetimeFormat::EpochSeconds);

    let slices = all(&slicer, &json!(null));
    assert_eq!(slices[0].get("oldest"), Some(&json!(0)));
    assert_eq!(slices[0].get("latest"), Some(&json!(43200)));
    assert_eq!(slices[1].get("latest"), Some(&json!(86400)));
}

#[test]
fn test_datetime_slicer_rejects_non_positive_step() {
    let slicer = DatetimeSlicer::new(utc(2024, 1, 1), Duration::zero());
    assert!(slicer.slices(&json!(null)).err().unwrap().is_config());
}

#[test]
fn test_datetime_slicer_is_lazy() {
    // one-second windows over ~8000 years; only pulled slices are built
    let slicer = DatetimeSlicer::new(utc(2015, 1, 1), Duration::seconds(1))
        .with_end(utc(9999, 1, 1))
        .with_format(DatetimeFormat::EpochSeconds);

    let mut slices = slicer.slices(&json!(null)).unwrap();

    let first = slices.next().unwrap();
    assert_eq!(first.get("start"), Some(&json!(1_420_070_400)));
    assert_eq!(first.get("end"), Some(&json!(1_420_070_401)));
    let second = slices.next().unwrap();
    assert_eq!(second.get("start"), Some(&json!(1_420_070_401)));
}

#[test]
fn test_datetime_slicer_step_past_max_date_clamps_to_end() {
    let slicer = DatetimeSlicer::from_strings("2024-01-01", "1000000000w")
        .unwrap()
        .with_end(utc(2025, 1, 1));

    let slices = all(&slicer, &json!(null));

    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].get_str("end"), Some("2025-01-01T00:00:00+00:00"));
}

#[test]
fn test_from_strings() {
    let slicer = DatetimeSlicer::from_strings("2024-01-01", "7d")
        .unwrap()
        .with_end(utc(2024, 1, 15));
    assert_eq!(all(&slicer, &json!(null)).len(), 2);

    assert!(DatetimeSlicer::from_strings("yesterday", "1d").is_err());
}

#[test_case("2024-01-15T10:30:00Z", utc(2024, 1, 15) + Duration::minutes(630) ; "rfc3339")]
#[test_case("2024-01-15 10:30:00", utc(2024, 1, 15) + Duration::minutes(630) ; "space separated")]
#[test_case("2024-01-15", utc(2024, 1, 15) ; "date only")]
#[test_case("2024/01/15", utc(2024, 1, 15) ; "slashes")]
fn test_parse_datetime(input: &str, expected: chrono::DateTime<Utc>) {
    assert_eq!(parse_datetime(input).unwrap(), expected);
}

#[test_case("1d", Duration::days(1))]
#[test_case("2h", Duration::hours(2))]
#[test_case("30m", Duration::minutes(30))]
#[test_case("45s", Duration::seconds(45))]
#[test_case("1w", Duration::weeks(1))]
#[test_case("3", Duration::days(3) ; "bare number is days")]
fn test_parse_duration(input: &str, expected: Duration) {
    assert_eq!(parse_duration(input).unwrap(), expected);
}

#[test]
fn test_parse_duration_invalid() {
    assert!(parse_duration("xd").is_err());
    assert!(parse_duration("5y").is_err());
}

#[test_case("99999999999999d" ; "days")]
#[test_case("99999999999999w" ; "weeks")]
#[test_case("9223372036854775807s" ; "seconds")]
fn test_parse_duration_out_of_range(input: &str) {
    assert!(parse_duration(input).unwrap_err().is_config());
}

#[test]
fn test_datetime_from_value() {
    assert_eq!(datetime_from_value(&json!(86400)), Some(utc(1970, 1, 2)));
    assert_eq!(
        datetime_from_value(&json!("86400.000200")),
        Some(utc(1970, 1, 2))
    );
    assert_eq!(datetime_from_value(&json!("1970-01-02")), Some(utc(1970, 1, 2)));
    assert_eq!(datetime_from_value(&json!(true)), None);
    assert_eq!(datetime_from_value(&json!("soon")), None);
}
