//! Formatting helpers for report output.
//!
//! Pure functions only, no I/O.

/// Format a signed bytes-per-second rate with K/M/G suffixes.
///
/// `"1.5M/s"`, `"512B/s"`, `"-2.0K/s"` for counter regressions, `"0"` for
/// zero.
pub fn format_bytes_rate(rate: i64) -> String {
    if rate == 0 {
        return "0".to_string();
    }
    let sign = if rate < 0 { "-" } else { "" };
    let abs = rate.unsigned_abs() as f64;
    if abs >= 1024.0 * 1024.0 * 1024.0 {
        format!("{}{:.1}G/s", sign, abs / (1024.0 * 1024.0 * 1024.0))
    } else if abs >= 1024.0 * 1024.0 {
        format!("{}{:.1}M/s", sign, abs / (1024.0 * 1024.0))
    } else if abs >= 1024.0 {
        format!("{}{:.1}K/s", sign, abs / 1024.0)
    } else {
        format!("{}{:.0}B/s", sign, abs)
    }
}

/// Format a rate as a right-aligned table column, 10 chars wide.
///
/// Fancy mode uses the suffixed form, raw mode prints the plain integer.
pub fn format_rate_col(rate: i64, fancy: bool) -> String {
    if fancy {
        format!("{:>10}", format_bytes_rate(rate))
    } else {
        format!("{:>10}", rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_rate_suffixes() {
        assert_eq!(format_bytes_rate(0), "0");
        assert_eq!(format_bytes_rate(512), "512B/s");
        assert_eq!(format_bytes_rate(2048), "2.0K/s");
        assert_eq!(format_bytes_rate(3 * 1024 * 1024), "3.0M/s");
        assert_eq!(format_bytes_rate(5 * 1024 * 1024 * 1024), "5.0G/s");
    }

    #[test]
    fn bytes_rate_negative_keeps_sign() {
        assert_eq!(format_bytes_rate(-2048), "-2.0K/s");
        assert_eq!(format_bytes_rate(-10), "-10B/s");
    }

    #[test]
    fn rate_col_is_right_aligned() {
        assert_eq!(format_rate_col(512, true), "    512B/s");
        assert_eq!(format_rate_col(512, false), "       512");
        assert_eq!(format_rate_col(-600, false), "      -600");
    }
}
