use super::schema::InvalidCell;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NULL_MARKERS: &[&str] = &["nan", "null", "none", "na", "n/a", "-"];

fn is_null(value: &str) -> bool {
    value.is_empty() || NULL_MARKERS.iter().any(|marker| value.eq_ignore_ascii_case(marker))
}

/// Reads a counter cell; nulls count as zero.
pub(crate) fn parse_count(column: &str, row: usize, raw: &str) -> Result<u64, InvalidCell> {
    let trimmed = raw.trim();
    if is_null(trimmed) {
        return Ok(0);
    }

    let invalid = || InvalidCell {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    };

    let mut digits: String = trimmed
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '\u{a0}' | '\u{202f}' | '\''))
        .collect();
    if digits.contains(',') {
        let integer = digits.split_once('.').map_or(digits.as_str(), |(int, _)| int);
        digits = if is_comma_grouped(integer) {
            digits.replace(',', "")
        } else if !digits.contains('.') && digits.matches(',').count() == 1 {
            // Decimal comma; counts must still be whole.
            let decimal = digits.replace(',', ".");
            match decimal.parse::<f64>() {
                Ok(value) if value.fract() == 0.0 => decimal,
                _ => return Err(invalid()),
            }
        } else {
            return Err(invalid());
        };
    }

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 => {
            Ok(value.round() as u64)
        }
        _ => Err(invalid()),
    }
}

/// `12,500` or `1,234,567`: one to three leading digits, then groups of three.
fn is_comma_grouped(value: &str) -> bool {
    let all_digits = |group: &str| group.bytes().all(|byte| byte.is_ascii_digit());
    let mut groups = value.split(',');
    let leading_ok = groups
        .next()
        .is_some_and(|head| (1..=3).contains(&head.len()) && all_digits(head));
    let mut trailing = 0;
    let rest_ok = groups.all(|group| {
        trailing += 1;
        group.len() == 3 && all_digits(group)
    });
    leading_ok && rest_ok && trailing > 0
}

/// Reads a yes/no column such as the per-article `new` marker.
pub(crate) fn parse_flag(column: &str, row: usize, raw: &str) -> Result<u64, InvalidCell> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "vrai" | "yes" | "oui" | "y" | "x" => Ok(1),
        "false" | "faux" | "no" | "non" | "n" => Ok(0),
        _ => parse_count(column, row, raw),
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}
