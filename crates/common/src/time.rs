//! Human-readable durations for reports and notifications

/// Format a duration in seconds as `"Xh Ym Zs"`.
///
/// Hours and minutes are omitted while zero, except that the minute segment
/// is always shown once the duration reaches an hour. Seconds are always
/// present, so zero renders as `"0s"`.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if minutes > 0 || hours > 0 {
        out.push_str(&format!("{}m ", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, "0s")]
    #[test_case(59, "59s")]
    #[test_case(60, "1m 0s")]
    #[test_case(125, "2m 5s")]
    #[test_case(3600, "1h 0m 0s")]
    #[test_case(3661, "1h 1m 1s")]
    #[test_case(4534, "1h 15m 34s")]
    #[test_case(7325, "2h 2m 5s")]
    fn formats_duration(secs: u64, expected: &str) {
        assert_eq!(format_duration(secs), expected);
    }
}
