//! Normalization and validation helpers shared by the entities.
//!
//! Every helper returns the normalized value so callers store exactly what is
//! sent on the wire.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::ApiError;

static NL_POSTCODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}[A-Z]{2}$").unwrap());
static FOUR_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());
static FIVE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}$").unwrap());
static GENERIC_POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9-]{2,10}$").unwrap());
static COUNTRY_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());
static BARCODE_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Z]{2}$").unwrap());
static DOMESTIC_BARCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Z]{2}[A-Z]{1,4}\d{6,11}$").unwrap());
static S10_BARCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}\d{9}[A-Z]{2}$").unwrap());
static HOUSE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,5}$").unwrap());

const DATE_FORMAT: &str = "%d-%m-%Y";
const DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Upper-cases and strips whitespace, then checks the country's postcode shape.
pub fn normalize_postcode(postcode: &str, country: &str) -> Result<String, ApiError> {
    let normalized: String = postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    let pattern: &Regex = match country.trim().to_uppercase().as_str() {
        "NL" => &*NL_POSTCODE,
        "BE" | "LU" | "DK" | "AT" | "CH" => &*FOUR_DIGITS,
        "DE" | "FR" | "IT" | "ES" => &*FIVE_DIGITS,
        _ => &*GENERIC_POSTCODE,
    };
    if pattern.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ApiError::invalid(
            "postcode",
            format!("'{postcode}' is not a valid postcode for {country}"),
        ))
    }
}

pub fn normalize_country_code(code: &str) -> Result<String, ApiError> {
    let normalized = code.trim().to_uppercase();
    if COUNTRY_CODE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ApiError::invalid(
            "country code",
            format!("'{code}' is not an ISO 3166-1 alpha-2 code"),
        ))
    }
}

pub fn validate_barcode_type(barcode_type: &str) -> Result<String, ApiError> {
    let normalized = barcode_type.trim().to_uppercase();
    if BARCODE_TYPE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ApiError::invalid(
            "barcode type",
            format!("'{barcode_type}' must be two alphanumeric characters"),
        ))
    }
}

/// Accepts domestic (`3SDEVC123456789`) and UPU S10 (`CD123456785NL`) barcodes.
pub fn validate_barcode(barcode: &str) -> Result<String, ApiError> {
    let normalized = barcode.trim().to_uppercase();
    if DOMESTIC_BARCODE.is_match(&normalized) || S10_BARCODE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ApiError::invalid("barcode", format!("'{barcode}' is not a valid barcode")))
    }
}

pub fn validate_house_number(number: &str) -> Result<String, ApiError> {
    let trimmed = number.trim();
    if HOUSE_NUMBER.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ApiError::invalid(
            "house number",
            format!("'{number}' must be 1 to 5 digits"),
        ))
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    let trimmed = raw.trim();
    // A trailing time part is ignored.
    let date_part = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);
    ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| ApiError::invalid("date", format!("'{raw}' is not a recognised date")))
}

pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, ApiError> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    let parsed = [
        "%d-%m-%Y %H:%M:%S",
        "%d-%m-%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok());
    if let Some(dt) = parsed {
        return Ok(dt);
    }
    if !trimmed.contains(':') {
        if let Ok(date) = parse_date(trimmed) {
            return Ok(date.and_time(NaiveTime::default()));
        }
    }
    Err(ApiError::invalid(
        "datetime",
        format!("'{raw}' is not a recognised date and time"),
    ))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ApiError> {
    let trimmed = raw.trim();
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ApiError::invalid("time", format!("'{raw}' is not a recognised time")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dutch_postcode_is_normalized() {
        assert_eq!(normalize_postcode("2132 wt", "NL").unwrap(), "2132WT");
        assert_eq!(normalize_postcode(" 1234AB ", "nl").unwrap(), "1234AB");
    }

    #[test]
    fn dutch_postcode_rejects_bad_shape() {
        let err = normalize_postcode("21 32", "NL").unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { field: "postcode", .. }));
    }

    #[test]
    fn belgian_and_german_postcodes() {
        assert_eq!(normalize_postcode("2000", "BE").unwrap(), "2000");
        assert!(normalize_postcode("20000", "BE").is_err());
        assert_eq!(normalize_postcode("10115", "DE").unwrap(), "10115");
    }

    #[test]
    fn foreign_postcode_falls_back_to_generic_rule() {
        assert_eq!(normalize_postcode("sw1a 1aa", "GB").unwrap(), "SW1A1AA");
        assert!(normalize_postcode("x", "GB").is_err());
    }

    #[test]
    fn country_code_is_upper_cased() {
        assert_eq!(normalize_country_code(" be ").unwrap(), "BE");
        assert!(normalize_country_code("BEL").is_err());
    }

    #[test]
    fn barcode_shapes() {
        assert_eq!(validate_barcode("3sdevc816223392").unwrap(), "3SDEVC816223392");
        assert!(validate_barcode("CD123456785NL").is_ok());
        assert!(validate_barcode("not-a-barcode").is_err());
    }

    #[test]
    fn barcode_type_is_two_characters() {
        assert_eq!(validate_barcode_type("3s").unwrap(), "3S");
        assert!(validate_barcode_type("3SX").is_err());
    }

    #[test]
    fn house_number_must_be_digits() {
        assert_eq!(validate_house_number(" 42 ").unwrap(), "42");
        assert!(validate_house_number("42a").is_err());
    }

    #[test]
    fn dates_parse_in_several_formats() {
        let expected = NaiveDate::from_ymd_opt(2016, 6, 30).unwrap();
        assert_eq!(parse_date("30-06-2016").unwrap(), expected);
        assert_eq!(parse_date("2016-06-30").unwrap(), expected);
        assert_eq!(parse_date("30/06/2016").unwrap(), expected);
        assert_eq!(parse_date("30-06-2016 14:00:00").unwrap(), expected);
        assert!(parse_date("june 30").is_err());
    }

    #[test]
    fn datetimes_parse_and_format() {
        let dt = parse_datetime("29-06-2016 14:00:00").unwrap();
        assert_eq!(format_datetime(dt), "29-06-2016 14:00:00");
        let iso = parse_datetime("2018-11-27T09:45:00+01:00").unwrap();
        assert_eq!(format_datetime(iso), "27-11-2018 09:45:00");
        let midnight = parse_datetime("30-06-2016").unwrap();
        assert_eq!(format_datetime(midnight), "30-06-2016 00:00:00");
    }

    #[test]
    fn times_accept_optional_seconds() {
        assert_eq!(format_time(parse_time("17:00").unwrap()), "17:00:00");
        assert_eq!(format_time(parse_time("09:30:15").unwrap()), "09:30:15");
        assert!(parse_time("25:00").is_err());
    }
}
