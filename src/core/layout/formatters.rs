//! Value formatters for the field layout
//!
//! Staging columns carry dates, quantities and prices in several loose
//! shapes. These functions normalize them for the fixed-layout files and
//! never fail: anything they cannot interpret is returned unchanged.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default century pivot for two-digit years
pub const DEFAULT_YEAR_PIVOT: u8 = 70;

/// How the year is rendered in `MM/DD/..` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum YearDisplay {
    /// `MM/DD/YY`, the last two digits of the resolved year
    #[default]
    TwoDigit,
    /// `MM/DD/YYYY`, two-digit input years expanded with the pivot
    FourDigit,
}

impl FromStr for YearDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "two_digit" | "two-digit" | "yy" => Ok(YearDisplay::TwoDigit),
            "four_digit" | "four-digit" | "yyyy" => Ok(YearDisplay::FourDigit),
            _ => Err(format!(
                "Invalid date year display '{s}'. Must be one of: two_digit, four_digit"
            )),
        }
    }
}

/// Date formatting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    /// Year rendering
    pub year: YearDisplay,
    /// Two-digit years at or above the pivot belong to the 1900s
    pub pivot: u8,
}

impl DateFormat {
    /// `MM/DD/YY` output
    pub const fn two_digit_year() -> Self {
        Self {
            year: YearDisplay::TwoDigit,
            pivot: DEFAULT_YEAR_PIVOT,
        }
    }

    /// `MM/DD/YYYY` output with the given century pivot
    pub const fn four_digit_year(pivot: u8) -> Self {
        Self {
            year: YearDisplay::FourDigit,
            pivot,
        }
    }

    fn render(&self, month: &str, day: &str, year: &str) -> String {
        match self.year {
            YearDisplay::TwoDigit => {
                let short = &year[year.len().saturating_sub(2)..];
                format!("{month}/{day}/{short}")
            }
            YearDisplay::FourDigit => {
                format!("{month}/{day}/{}", normalize_year(year, self.pivot))
            }
        }
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::two_digit_year()
    }
}

/// Formatter attached to a layout field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormatter {
    /// Date normalization, see [`format_date`]
    Date(DateFormat),
    /// Numeric normalization, see [`format_quantity`]
    Quantity,
    /// Four-decimal price, see [`format_price`]
    Price,
}

impl ValueFormatter {
    /// Applies the formatter to a raw column value
    pub fn apply(&self, raw: Option<&str>) -> String {
        match self {
            ValueFormatter::Date(format) => format_date(raw, format),
            ValueFormatter::Quantity => format_quantity(raw),
            ValueFormatter::Price => format_price(raw),
        }
    }
}

/// Expands a two-digit year with the century pivot
///
/// `yy >= pivot` becomes `19yy`, anything lower `20yy`. Other inputs are
/// returned unchanged.
///
/// ```
/// use order_export::core::layout::formatters::normalize_year;
///
/// assert_eq!(normalize_year("69", 70), "2069");
/// assert_eq!(normalize_year("70", 70), "1970");
/// assert_eq!(normalize_year("2023", 70), "2023");
/// ```
pub fn normalize_year(year: &str, pivot: u8) -> String {
    if year.len() == 2 && is_digits(year) {
        // two ASCII digits always parse
        let yy: u8 = year.parse().unwrap_or(0);
        let century = if yy >= pivot { "19" } else { "20" };
        return format!("{century}{year}");
    }
    year.to_string()
}

/// Normalizes a staged date to `MM/DD/YY` or `MM/DD/YYYY`
///
/// Accepts 8-digit dates (`MMDDYYYY`, or `YYYYMMDD` when the leading pair
/// exceeds 12), ISO `YYYY-MM-DD`, and in four-digit mode also `MMDDYY` and
/// `MM/DD/YY`. All-zero dates become empty; unrecognized text passes through.
pub fn format_date(raw: Option<&str>, format: &DateFormat) -> String {
    let value = raw.unwrap_or("").trim();
    if value.is_empty() || is_zero_date(iso_date_part(value)) {
        return String::new();
    }

    if value.len() == 8 && is_digits(value) {
        let leading: u32 = value[0..2].parse().unwrap_or(0);
        return if leading > 12 {
            format.render(&value[4..6], &value[6..8], &value[0..4])
        } else {
            format.render(&value[0..2], &value[2..4], &value[4..8])
        };
    }

    if let Some((year, month, day)) = split_iso_date(iso_date_part(value)) {
        return format.render(month, day, year);
    }

    if format.year == YearDisplay::FourDigit {
        if value.len() == 6 && is_digits(value) {
            return format.render(&value[0..2], &value[2..4], &value[4..6]);
        }
        if let Some((month, day, year)) = split_short_us_date(value) {
            return format.render(month, day, year);
        }
    }

    value.to_string()
}

/// Normalizes a quantity
///
/// Empty stays empty, non-numeric text is returned as is, integral values
/// lose their decimal point.
///
/// ```
/// use order_export::core::layout::formatters::format_quantity;
///
/// assert_eq!(format_quantity(Some("5.00")), "5");
/// assert_eq!(format_quantity(Some("2.5")), "2.5");
/// assert_eq!(format_quantity(Some("EA")), "EA");
/// ```
pub fn format_quantity(raw: Option<&str>) -> String {
    let Some(value) = raw else {
        return String::new();
    };
    if value.trim().is_empty() {
        return String::new();
    }
    match parse_number(value) {
        Some(n) if n == 0.0 => "0".to_string(),
        Some(n) => format!("{n}"),
        None => value.to_string(),
    }
}

/// Normalizes a price to at most four decimals without trailing zeros
///
/// ```
/// use order_export::core::layout::formatters::format_price;
///
/// assert_eq!(format_price(Some("12.340000")), "12.34");
/// assert_eq!(format_price(Some("0.00000")), "0");
/// assert_eq!(format_price(None), "");
/// ```
pub fn format_price(raw: Option<&str>) -> String {
    let Some(value) = raw else {
        return String::new();
    };
    if value.trim().is_empty() {
        return String::new();
    }
    let Some(n) = parse_number(value) else {
        return value.to_string();
    };

    let n = if n == 0.0 { 0.0 } else { n };
    let fixed = format!("{n:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("nan") || trimmed.to_lowercase().contains("inf") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_zero_date(value: &str) -> bool {
    value == "00000000" || value == "0000-00-00"
}

/// Date part of an ISO timestamp (`2023-06-15T00:00:00` or `2023-06-15 00:00:00`)
fn iso_date_part(value: &str) -> &str {
    match value.as_bytes().get(10) {
        Some(b'T' | b' ') => &value[..10],
        _ => value,
    }
}

fn split_iso_date(value: &str) -> Option<(&str, &str, &str)> {
    let mut parts = value.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let shaped = year.len() == 4 && month.len() == 2 && day.len() == 2;
    (shaped && is_digits(year) && is_digits(month) && is_digits(day)).then_some((year, month, day))
}

fn split_short_us_date(value: &str) -> Option<(&str, &str, &str)> {
    let mut parts = value.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let shaped = month.len() == 2 && day.len() == 2 && year.len() == 2;
    (shaped && is_digits(month) && is_digits(day) && is_digits(year)).then_some((month, day, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SHORT: DateFormat = DateFormat::two_digit_year();
    const LONG: DateFormat = DateFormat::four_digit_year(DEFAULT_YEAR_PIVOT);

    #[test_case("06151990", "06/15/90" ; "month first")]
    #[test_case("20230615", "06/15/23" ; "year first")]
    #[test_case("15062023", "20/23/06" ; "leading pair above twelve is a year")]
    #[test_case("12312024", "12/31/24" ; "december is month first")]
    #[test_case("2023-06-15", "06/15/23" ; "iso")]
    #[test_case("00000000", "" ; "zero compact")]
    #[test_case("0000-00-00", "" ; "zero iso")]
    #[test_case("  ", "" ; "blank")]
    #[test_case("06/15/23", "06/15/23" ; "already formatted")]
    #[test_case("ASAP", "ASAP" ; "free text")]
    #[test_case("2023-6-15", "2023-6-15" ; "unpadded iso passes through")]
    #[test_case("2023-06-15T00:00:00", "06/15/23" ; "iso timestamp")]
    #[test_case("2023-06-15 08:30:00", "06/15/23" ; "sql timestamp")]
    #[test_case("1900-01-01", "01/01/00" ; "sentinel date is not zero")]
    fn test_format_date_two_digit(input: &str, expected: &str) {
        assert_eq!(format_date(Some(input), &SHORT), expected);
    }

    #[test_case("06151990", "06/15/1990" ; "month first")]
    #[test_case("20230615", "06/15/2023" ; "year first")]
    #[test_case("2023-06-15", "06/15/2023" ; "iso")]
    #[test_case("061569", "06/15/2069" ; "compact short year below pivot")]
    #[test_case("06/15/70", "06/15/1970" ; "slashed short year at pivot")]
    #[test_case("00000000", "" ; "zero")]
    #[test_case("next week", "next week" ; "free text")]
    fn test_format_date_four_digit(input: &str, expected: &str) {
        assert_eq!(format_date(Some(input), &LONG), expected);
    }

    #[test]
    fn test_format_date_null() {
        assert_eq!(format_date(None, &SHORT), "");
        assert_eq!(format_date(None, &LONG), "");
    }

    #[test]
    fn test_two_digit_mode_leaves_short_dates_alone() {
        assert_eq!(format_date(Some("061569"), &SHORT), "061569");
    }

    #[test]
    fn test_custom_pivot() {
        let format = DateFormat::four_digit_year(30);
        assert_eq!(format_date(Some("01/02/29"), &format), "01/02/2029");
        assert_eq!(format_date(Some("01/02/30"), &format), "01/02/1930");
    }

    #[test_case("69", "2069")]
    #[test_case("70", "1970")]
    #[test_case("00", "2000")]
    #[test_case("99", "1999")]
    #[test_case("1999", "1999")]
    #[test_case("7", "7")]
    fn test_normalize_year(input: &str, expected: &str) {
        assert_eq!(normalize_year(input, DEFAULT_YEAR_PIVOT), expected);
    }

    #[test_case(Some("5"), "5")]
    #[test_case(Some("5.00"), "5")]
    #[test_case(Some(" 12 "), "12")]
    #[test_case(Some("2.5"), "2.5")]
    #[test_case(Some("-3"), "-3")]
    #[test_case(Some("-0.0"), "0")]
    #[test_case(Some("EA"), "EA")]
    #[test_case(Some("Infinity"), "Infinity")]
    #[test_case(Some(""), "")]
    #[test_case(None, "")]
    fn test_format_quantity(input: Option<&str>, expected: &str) {
        assert_eq!(format_quantity(input), expected);
    }

    #[test_case(Some("12.340000"), "12.34")]
    #[test_case(Some("0.00000"), "0")]
    #[test_case(Some("10"), "10")]
    #[test_case(Some("10.5"), "10.5")]
    #[test_case(Some("1.23456"), "1.2346")]
    #[test_case(Some("0.00001"), "0")]
    #[test_case(Some("-2.50"), "-2.5")]
    #[test_case(Some("call"), "call")]
    #[test_case(Some(""), "")]
    #[test_case(None, "")]
    fn test_format_price(input: Option<&str>, expected: &str) {
        assert_eq!(format_price(input), expected);
    }

    #[test]
    fn test_value_formatter_dispatch() {
        assert_eq!(
            ValueFormatter::Date(SHORT).apply(Some("2024-01-31")),
            "01/31/24"
        );
        assert_eq!(ValueFormatter::Quantity.apply(Some("3.0")), "3");
        assert_eq!(ValueFormatter::Price.apply(Some("4.10")), "4.1");
    }

    #[test]
    fn test_year_display_from_str() {
        assert_eq!(YearDisplay::from_str("two_digit").unwrap(), YearDisplay::TwoDigit);
        assert_eq!(YearDisplay::from_str("FOUR_DIGIT").unwrap(), YearDisplay::FourDigit);
        assert!(YearDisplay::from_str("three").is_err());
    }
}
