use chrono::NaiveDate;
use demand_forecast::calendar::{future_weeks, month_cycle, week_start, CalendarFeatures};
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[rstest]
#[case(date(2022, 11, 2), date(2022, 10, 31))] // Wednesday
#[case(date(2022, 10, 31), date(2022, 10, 31))] // Monday maps to itself
#[case(date(2022, 11, 6), date(2022, 10, 31))] // Sunday closes the week
#[case(date(2023, 1, 1), date(2022, 12, 26))] // year boundary
fn test_week_start_is_monday_aligned(#[case] input: NaiveDate, #[case] expected: NaiveDate) {
    assert_eq!(week_start(input), expected);
}

#[test]
fn test_month_cycle_wraps_around_the_year() {
    // Month 13 is month 1 again on the circle
    let (sin1, cos1) = month_cycle(1);
    let (sin13, cos13) = month_cycle(13);
    assert!((sin1 - sin13).abs() < 1e-9);
    assert!((cos1 - cos13).abs() < 1e-9);
}

#[test]
fn test_month_cycle_distinguishes_june_from_december() {
    let (sin6, cos6) = month_cycle(6);
    let (sin12, cos12) = month_cycle(12);
    let distance = (sin6 - sin12).abs() + (cos6 - cos12).abs();
    assert!(distance > 1.0);
}

#[test]
fn test_calendar_features_for_week() {
    let features = CalendarFeatures::for_week(date(2023, 1, 2));
    assert_eq!(features.month, 1);
    assert_eq!(features.year, 2023);
    assert_eq!(features.iso_week, 1);
    assert!((features.month_sin - month_cycle(1).0).abs() < 1e-12);
    assert!((features.month_cos - month_cycle(1).1).abs() < 1e-12);

    let late = CalendarFeatures::for_week(date(2022, 12, 26));
    assert_eq!(late.month, 12);
    assert_eq!(late.iso_week, 52);
}

#[test]
fn test_future_weeks_are_consecutive_mondays() {
    let weeks = future_weeks(date(2022, 12, 26), 5);
    assert_eq!(
        weeks,
        vec![
            date(2023, 1, 2),
            date(2023, 1, 9),
            date(2023, 1, 16),
            date(2023, 1, 23),
            date(2023, 1, 30),
        ]
    );
}
