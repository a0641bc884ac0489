//! UTC datetime without timezone dependencies.
//!
//! Used for the archive creation timestamp: the `{period}` of the output
//! file name, the `Date` metadata entry and the manifest's `created` field.
//!
//! ```ignore
//! let dt = DateTimeUtc::from_unix(1_718_461_845); // 2024-06-15T14:30:45Z
//! assert_eq!(dt.period(), "2024-06");
//! assert_eq!(dt.to_date(), "2024-06-15");
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Current system time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix(secs)
    }

    /// Convert seconds since the Unix epoch (civil-from-days).
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn from_unix(secs: u64) -> Self {
        let days = (secs / 86_400) as i64;
        let rem = secs % 86_400;

        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
        let year = (yoe + era * 400 + i64::from(month <= 2)) as u16;

        Self::new(
            year,
            month,
            day,
            (rem / 3600) as u8,
            ((rem % 3600) / 60) as u8,
            (rem % 60) as u8,
        )
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_rfc3339(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// `YYYY-MM-DD`
    pub fn to_date(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `YYYY-MM`, the period stamped into output file names.
    pub fn period(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unix_epoch_and_known_dates() {
        assert_eq!(DateTimeUtc::from_unix(0), DateTimeUtc::from_ymd(1970, 1, 1));
        // 2000-02-29T12:00:00Z
        assert_eq!(
            DateTimeUtc::from_unix(951_825_600),
            DateTimeUtc::new(2000, 2, 29, 12, 0, 0)
        );
        // 2024-06-15T14:30:45Z
        assert_eq!(
            DateTimeUtc::from_unix(1_718_461_845),
            DateTimeUtc::new(2024, 6, 15, 14, 30, 45)
        );
    }

    #[test]
    fn test_now_is_after_2024() {
        let now = DateTimeUtc::now();
        assert!(now.year >= 2024);
        assert!((1..=12).contains(&now.month));
    }

    #[test]
    fn test_formats() {
        let dt = DateTimeUtc::new(2024, 6, 5, 4, 3, 2);
        assert_eq!(dt.to_rfc3339(), "2024-06-05T04:03:02Z");
        assert_eq!(dt.to_date(), "2024-06-05");
        assert_eq!(dt.period(), "2024-06");
    }
}
