//! File age formatting.

use std::time::{Duration, SystemTime};

const DAY: u64 = 24 * 60 * 60;

/// Age of a file modified at `modified`, measured from `now`.
///
/// Files dated in the future have age zero.
pub fn age_of(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Format an age as "N years ago", "N months ago" or "N days ago".
///
/// Years and months are counted as 365 and 30 days and only used once the
/// age strictly exceeds one of them.
pub fn format_age(age: Duration) -> String {
    let days = age.as_secs() / DAY;
    if days > 365 {
        let years = days / 365;
        format!("{years} year{} ago", plural(years))
    } else if days > 30 {
        let months = days / 30;
        format!("{months} month{} ago", plural(months))
    } else {
        format!("{days} days ago")
    }
}

fn plural(n: u64) -> &'static str {
    if n > 1 { "s" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(n: u64) -> Duration {
        Duration::from_secs(n * DAY)
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_secs(30)), "0 days ago");
        assert_eq!(format_age(days(30)), "30 days ago");
        assert_eq!(format_age(days(31)), "1 month ago");
        assert_eq!(format_age(days(200)), "6 months ago");
        assert_eq!(format_age(days(365)), "12 months ago");
        assert_eq!(format_age(days(366)), "1 year ago");
        assert_eq!(format_age(days(800)), "2 years ago");
    }

    #[test]
    fn test_future_mtime_is_zero_age() {
        let now = SystemTime::UNIX_EPOCH + days(10);
        assert_eq!(age_of(now + days(1), now), Duration::ZERO);
        assert_eq!(age_of(now - days(3), now), days(3));
    }
}
