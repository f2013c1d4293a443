use chrono::{DateTime, Utc};

/// Short relative label for a commit date, as shown in the carousel
///
/// Unparseable dates are returned unchanged. Dates in the future count as
/// today.
pub fn format_relative(date: &str, now: DateTime<Utc>) -> String {
    let parsed = match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => parsed,
        Err(_) => return date.to_string(),
    };

    let days = (now - parsed.with_timezone(&Utc)).num_days().max(0);
    match days {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        7..=29 => plural(days / 7, "week"),
        30..=364 => plural(days / 30, "month"),
        _ => parsed.format("%Y-%m-%d").to_string(),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s ago", n, unit)
    } else {
        format!("{} {} ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(d: Duration) -> String {
        (now() - d).to_rfc3339()
    }

    #[test]
    fn test_buckets() {
        assert_eq!(format_relative(&ago(Duration::hours(3)), now()), "today");
        assert_eq!(format_relative(&ago(Duration::hours(30)), now()), "yesterday");
        assert_eq!(format_relative(&ago(Duration::days(4)), now()), "4 days ago");
        assert_eq!(format_relative(&ago(Duration::days(7)), now()), "1 week ago");
        assert_eq!(format_relative(&ago(Duration::days(20)), now()), "2 weeks ago");
        assert_eq!(format_relative(&ago(Duration::days(45)), now()), "1 month ago");
        assert_eq!(format_relative(&ago(Duration::days(200)), now()), "6 months ago");
        assert_eq!(
            format_relative("2021-03-04T05:06:07+02:00", now()),
            "2021-03-04"
        );
    }

    #[test]
    fn test_offsets_and_fractions() {
        assert_eq!(
            format_relative("2024-06-15T10:00:00.000+01:00", now()),
            "today"
        );
    }

    #[test]
    fn test_future_and_garbage() {
        assert_eq!(format_relative(&ago(-Duration::days(2)), now()), "today");
        assert_eq!(format_relative("last tuesday", now()), "last tuesday");
    }
}
