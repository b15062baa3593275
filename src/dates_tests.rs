use super::{format_cycle, parse_cycle_name, parse_date, DateRange};
use chrono::{NaiveDate, NaiveDateTime};

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid test date")
}

#[test]
fn parses_the_spellings_experiments_use() {
    let expected = at(2020, 1, 5, 12);
    for text in [
        "2020010512",
        "2020-01-05T12",
        "2020-01-05T12:00:00",
        "2020-01-05 12:00",
        "2020-01-05T12:00:00Z",
        "2020-01-05T12:00:00+00:00",
        "Sun Jan  5 12:00:00 UTC 2020",
        "  2020010512\n",
    ] {
        assert_eq!(parse_date(text).expect(text), expected, "{text}");
    }
    assert_eq!(parse_date("20200105").unwrap(), at(2020, 1, 5, 0));
    assert_eq!(parse_date("2020-01-05").unwrap(), at(2020, 1, 5, 0));
}

#[test]
fn rejects_garbage_dates() {
    for text in ["", "tomorrow", "2020-13-01", "202001", "2020010525"] {
        assert!(parse_date(text).is_err(), "{text:?} should not parse");
    }
}

#[test]
fn cycle_names_round_trip_only_for_ten_digits() {
    let time = parse_cycle_name("2021063018").expect("cycle name");
    assert_eq!(time, at(2021, 6, 30, 18));
    assert_eq!(format_cycle(&time), "2021063018");
    assert!(parse_cycle_name("20210630").is_none());
    assert!(parse_cycle_name("2021063018x").is_none());
    assert!(parse_cycle_name("ctrl").is_none());
}

#[test]
fn range_bounds_are_inclusive_for_binning_and_half_open_for_merging() {
    let range = DateRange::from_args(Some("2020010100"), Some("2020010300")).unwrap();
    assert!(range.contains(&at(2020, 1, 1, 0)));
    assert!(range.contains(&at(2020, 1, 3, 0)));
    assert!(!range.contains(&at(2020, 1, 3, 6)));
    assert!(!range.contains(&at(2019, 12, 31, 18)));

    assert!(range.contains_half_open(&at(2020, 1, 1, 0)));
    assert!(!range.contains_half_open(&at(2020, 1, 3, 0)));
}

#[test]
fn open_range_admits_everything_and_inverted_range_fails() {
    let open = DateRange::from_args(None, None).unwrap();
    assert!(open.contains(&at(1, 1, 1, 0)));
    assert!(open.contains(&at(9999, 1, 1, 0)));

    let err = DateRange::from_args(Some("2020-02-01"), Some("2020-01-01")).unwrap_err();
    assert!(err.to_string().contains("after end date"));

    let err = DateRange::from_args(Some("not a date"), None).unwrap_err();
    assert!(err.to_string().contains("invalid start date"));
}
