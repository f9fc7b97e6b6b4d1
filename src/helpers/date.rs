//! Date helper functions

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use std::fmt::Write;

/// Format a timestamp using a Moment.js-compatible format string
///
/// Formats that cannot be applied to a timestamp without an offset fall back
/// to [`date_xml`].
///
/// # Examples
/// ```ignore
/// format_timestamp(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_timestamp(date: &NaiveDateTime, format: &str) -> String {
    try_format_timestamp(date, format).unwrap_or_else(|| date_xml(date))
}

/// Format a timestamp, or `None` if the format is invalid or needs an offset
pub fn try_format_timestamp(date: &NaiveDateTime, format: &str) -> Option<String> {
    let chrono_format = moment_to_chrono_format(format);
    let items: Vec<Item<'_>> = StrftimeItems::new(&chrono_format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut output = String::new();
    write!(output, "{}", date.format_with_items(items.iter())).ok()?;
    Some(output)
}

/// Format a timestamp for the `datetime` attribute of a `<time>` element
pub fn date_xml(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each unit
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month (uppercase M)
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        // Day of month (uppercase D)
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("D", "%-d"),
        // Hour 24h
        ("HH", "%H"),
        // Hour 12h
        ("hh", "%I"),
        // Minute (after MM)
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&sample(), "YYYY-MM-DD"), "2024-01-05");
        assert_eq!(format_timestamp(&sample(), "MMMM D, YYYY"), "January 5, 2024");
        assert_eq!(format_timestamp(&sample(), "HH:mm"), "10:30");
    }

    #[test]
    fn test_format_without_offset_does_not_panic() {
        // Offsets are unknown for naive timestamps, so the token stays literal
        assert_eq!(
            format_timestamp(&sample(), "YYYY-MM-DD HH:mm ZZ"),
            "2024-01-05 10:30 ZZ"
        );
        assert!(try_format_timestamp(&sample(), "%z").is_none());
        assert!(try_format_timestamp(&sample(), "YYYY %Q").is_none());
        assert_eq!(format_timestamp(&sample(), "%z"), "2024-01-05T10:30:00");
    }

    #[test]
    fn test_date_xml() {
        assert_eq!(date_xml(&sample()), "2024-01-05T10:30:00");
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
        assert_eq!(moment_to_chrono_format("MMM D"), "%b %-d");
    }
}
