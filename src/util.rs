// Parsing, rounding and formatting helpers.
//
// Everything that touches raw CSV strings lives here so the engine can
// assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`"NaN"` included).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Parse a year from the leading four characters of a field, so that
/// FAOSTAT ranges such as `"2019-2021"` resolve to their first year.
pub fn parse_year_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    let head = s.get(..4)?;
    head.parse::<i32>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // Dates are `YYYY-MM-DD`, optionally followed by a time component.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Round half away from zero to a fixed number of decimal places.
pub fn round_to(n: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (n * factor).round() / factor
}

/// Relative change `(curr - prev) / prev * 100`.
///
/// `None` when there is no previous value or it is exactly zero.
pub fn percent_change(curr: f64, prev: Option<f64>) -> Option<f64> {
    match prev {
        Some(p) if p != 0.0 => {
            let change = (curr - p) / p * 100.0;
            change.is_finite().then_some(change)
        }
        _ => None,
    }
}

/// Direction of a change, used to pick a color for the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            Trend::Up
        } else if change < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

/// `+1.23%` / `-1.23%`, or an empty string when there is nothing to compare.
pub fn format_signed_pct(change: Option<f64>) -> String {
    match change {
        Some(c) if c > 0.0 => format!("+{:.2}%", c),
        Some(c) => format!("{:.2}%", c),
        None => String::new(),
    }
}

/// Year-over-year growth text for a single country card.
pub fn format_yoy(change: Option<f64>) -> String {
    match change {
        Some(c) => format!("{:.2}%", c),
        None => "N/A".to_string(),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_with_separators() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn year_comes_from_leading_digits() {
        assert_eq!(parse_year_safe(Some("2019-2021")), Some(2019));
        assert_eq!(parse_year_safe(Some("2020")), Some(2020));
        assert_eq!(parse_year_safe(Some("20")), None);
    }

    #[test]
    fn dates_accept_trailing_time() {
        let d = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!(parse_date_safe(Some("2021-03-15")), Some(d));
        assert_eq!(parse_date_safe(Some("2021-03-15 00:00:00")), Some(d));
        assert_eq!(parse_date_safe(Some("15/03/2021")), None);
    }

    #[test]
    fn rounds_to_three_decimals() {
        assert_eq!(round_to(average(&[1.0001, 1.0002]), 3), 1.0);
        assert_eq!(round_to(2.34567, 3), 2.346);
        assert_eq!(format!("{}", round_to(1.00015, 3)), "1");
    }

    #[test]
    fn percent_change_guards_zero_and_missing() {
        assert_eq!(percent_change(10.0, Some(0.0)), None);
        assert_eq!(percent_change(10.0, None), None);
        assert_eq!(percent_change(15.0, Some(10.0)), Some(50.0));
        assert_eq!(format_yoy(percent_change(10.0, Some(0.0))), "N/A");
    }

    #[test]
    fn formats_signed_changes() {
        assert_eq!(format_signed_pct(Some(1.234)), "+1.23%");
        assert_eq!(format_signed_pct(Some(-0.5)), "-0.50%");
        assert_eq!(format_signed_pct(None), "");
        assert_eq!(Trend::of(-0.5), Trend::Down);
    }

    #[test]
    fn formats_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_int(9855), "9,855");
    }
}
