use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A second-resolution timestamp with a UTC offset.
///
/// Text form: `D:YYYYMMDDHHmmSS` followed by `Z` or `+HH'mm'` / `-HH'mm'`.
/// Parsing accepts every truncation the format allows, from `D:YYYY` up to
/// the full form; missing fields default to the start of their range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Date(DateTime<FixedOffset>);

impl Date {
    /// Wrap a chrono timestamp, truncating to whole seconds.
    pub fn from_datetime(value: DateTime<FixedOffset>) -> Self {
        Self(value.with_nanosecond(0).unwrap_or(value))
    }

    /// The current wall-clock time in UTC.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now().fixed_offset())
    }

    /// The Unix epoch in UTC; the zero value for absent dates.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH.fixed_offset())
    }

    /// The wrapped chrono timestamp.
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Render as `D:YYYYMMDDHHmmSS<offset>`.
    pub fn to_pdf_string(&self) -> String {
        let mut text = self.0.format("D:%Y%m%d%H%M%S").to_string();
        let seconds = self.0.offset().fix().local_minus_utc();
        if seconds == 0 {
            text.push('Z');
        } else {
            let sign = if seconds < 0 { '-' } else { '+' };
            let minutes = seconds.abs() / 60;
            text.push_str(&format!("{sign}{:02}'{:02}'", minutes / 60, minutes % 60));
        }
        text
    }

    /// Parse the text form (the `D:` prefix is optional).
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidDate(text.to_string());
        let body = text.trim().strip_prefix("D:").unwrap_or(text.trim());
        let bytes = body.as_bytes();

        let digits_end = bytes
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(bytes.len());
        if digits_end < 4 || digits_end % 2 != 0 || digits_end > 14 {
            return Err(invalid());
        }
        let field = |start: usize, default: u32| -> u32 {
            if start + 2 <= digits_end {
                body[start..start + 2].parse().unwrap_or(default)
            } else {
                default
            }
        };
        let year: i32 = body[0..4].parse().map_err(|_| invalid())?;
        let month = field(4, 1);
        let day = field(6, 1);
        let hour = field(8, 0);
        let minute = field(10, 0);
        let second = field(12, 0);

        let offset = parse_offset(&body[digits_end..]).ok_or_else(invalid)?;
        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or_else(invalid)?;
        let value = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(invalid)?;
        Ok(Self(value))
    }
}

/// Parse the trailing `Z`, `+HH'mm'`, or `-HH'mm'` part. Empty means UTC.
fn parse_offset(rest: &str) -> Option<FixedOffset> {
    let mut chars = rest.chars();
    let sign = match chars.next() {
        None | Some('Z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };
    let digits: String = chars.filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(0..2).map_or(Some(0), |h| h.parse().ok())?;
    let minutes: i32 = digits.get(2..4).map_or(Some(0), |m| m.parse().ok())?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl Default for Date {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({})", self.to_pdf_string())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pdf_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_form_roundtrip() {
        let date = Date::parse("D:20240315103045+02'00'").unwrap();
        assert_eq!(date.to_pdf_string(), "D:20240315103045+02'00'");
        assert_eq!(Date::parse(&date.to_pdf_string()).unwrap(), date);
    }

    #[test]
    fn utc_is_written_as_z() {
        let date = Date::parse("D:19991231235959Z").unwrap();
        assert_eq!(date.to_pdf_string(), "D:19991231235959Z");
    }

    #[test]
    fn negative_offset() {
        let date = Date::parse("D:20200101000000-05'30'").unwrap();
        assert_eq!(date.as_datetime().offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn truncated_forms_default_missing_fields() {
        let date = Date::parse("D:2023").unwrap();
        assert_eq!(date.to_pdf_string(), "D:20230101000000Z");
        let date = Date::parse("20230704").unwrap();
        assert_eq!(date.to_pdf_string(), "D:20230704000000Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Date::parse("D:12").is_err());
        assert!(Date::parse("yesterday").is_err());
        assert!(Date::parse("D:20231301").is_err());
        assert!(Date::parse("D:20230101000000X").is_err());
    }

    #[test]
    fn now_has_second_resolution() {
        let now = Date::now();
        assert_eq!(now.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn default_is_epoch() {
        assert_eq!(Date::default().to_pdf_string(), "D:19700101000000Z");
    }
}
