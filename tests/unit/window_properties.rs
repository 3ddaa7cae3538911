/// Window calculator tests against the public API
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use habit_streak_engine::*;

fn references() -> Vec<DateTime<Utc>> {
    let base = Utc.with_ymd_and_hms(2024, 2, 26, 0, 0, 0).unwrap();
    // Two weeks of instants at odd hours, crossing the leap day
    (0..14 * 5).map(|i| base + Duration::hours(i * 5 + 1)).collect()
}

fn patterns() -> Vec<RecurrencePattern> {
    ["daily", "every 3 days", "weekdays", "weekly on sun", "4 times per week"]
        .iter()
        .map(|raw| pattern::parse(raw).unwrap())
        .collect()
}

#[test]
fn test_windows_are_deterministic_and_well_formed() {
    let calculator = WindowCalculator::new(FixedOffset::east_opt(9 * 3600).unwrap());

    for pattern in patterns() {
        for reference in references() {
            for level in [0, 1, 2, 3, 4, 8] {
                let first = calculator.next_window(&pattern, level, reference).unwrap();
                let second = calculator.next_window(&pattern, level, reference).unwrap();
                assert_eq!(first, second);
                assert!(first.start_date < first.end_date);
                assert_eq!(first.resolved_level, level);
                assert!(first.streak_delta <= 1);
                if level == 0 {
                    assert_eq!(first.streak_delta, 0);
                }
            }
        }
    }
}

#[test]
fn test_checkin_window_never_ends_before_reference() {
    for pattern in patterns() {
        for reference in references() {
            let window = next_window(&pattern, 1, reference).unwrap();
            assert!(window.end_date > reference, "{} at {}", pattern, reference);
        }
    }
}

#[test]
fn test_activation_window_contains_reference_for_daily() {
    for reference in references() {
        let window = next_window(&RecurrencePattern::Daily, 0, reference).unwrap();
        assert!(window.contains(reference));
        assert_eq!(window.end_date - window.start_date, Duration::days(1));
    }
}

#[test]
fn test_daily_checkin_scenario() {
    // lastLevel = 2, streak = 2 -> check-in computes level 3
    let reference = Utc.with_ymd_and_hms(2024, 2, 28, 18, 45, 0).unwrap();
    let window = next_window(&RecurrencePattern::Daily, 3, reference).unwrap();

    assert_eq!(window.resolved_level, 3);
    assert_eq!(window.streak_delta, 1);
    // Leap year: the next day is the 29th
    assert_eq!(window.start_date, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    assert_eq!(window.end_date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
}
