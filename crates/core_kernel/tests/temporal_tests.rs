//! Unit tests for the business calendar helpers

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{Month, Timezone, TemporalError};

mod month {
    use super::*;

    #[test]
    fn test_rejects_invalid_month_number() {
        assert!(matches!(Month::new(2024, 0), Err(TemporalError::InvalidMonth(_))));
        assert!(matches!(Month::new(2024, 13), Err(TemporalError::InvalidMonth(_))));
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let month: Month = "2024-07".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 7);
        assert_eq!(month.to_string(), "2024-07");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2024".parse::<Month>().is_err());
        assert!("2024-xx".parse::<Month>().is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut months = vec![
            Month::new(2025, 1).unwrap(),
            Month::new(2024, 12).unwrap(),
            Month::new(2024, 2).unwrap(),
        ];
        months.sort();
        let labels: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["2024-02", "2024-12", "2025-01"]);
    }

    #[test]
    fn test_date_range_is_half_open() {
        let (from, before) = Month::new(2024, 2).unwrap().date_range().unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(before, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_minus_months_across_years() {
        let month = Month::new(2024, 3).unwrap();
        assert_eq!(month.minus_months(3), Month::new(2023, 12).unwrap());
        assert_eq!(month.minus_months(0), month);
        assert_eq!(month.minus_months(24), Month::new(2022, 3).unwrap());
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&Month::new(2024, 11).unwrap()).unwrap();
        assert_eq!(json, "\"2024-11\"");
    }
}

mod timezone {
    use super::*;

    #[test]
    fn test_default_is_seoul() {
        assert_eq!(Timezone::default().0.name(), "Asia/Seoul");
    }

    #[test]
    fn test_parse_timezone() {
        let tz: Timezone = "UTC".parse().unwrap();
        assert_eq!(tz.0.name(), "UTC");
        assert!("Mars/Olympus".parse::<Timezone>().is_err());
    }

    #[test]
    fn test_start_of_day_in_seoul() {
        let tz = Timezone::default();
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let start = tz.start_of_day(date).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 9, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_timezone_serde() {
        let tz: Timezone = serde_json::from_str("\"Asia/Seoul\"").unwrap();
        assert_eq!(serde_json::to_string(&tz).unwrap(), "\"Asia/Seoul\"");
    }
}
