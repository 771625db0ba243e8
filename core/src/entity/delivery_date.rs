//! Delivery date service entities.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::common::{CountryCode, Message};
use crate::de::{self, StringList};
use crate::error::ApiError;
use crate::validate;

/// Day code used by cut-off times: `00` applies to every day, `01` is Monday
/// through `07` for Sunday.
pub const EVERY_DAY: &str = "00";

/// Latest time a parcel can be handed in on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CutOffTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    pub day: String,
    #[serde(with = "de::time")]
    pub time: NaiveTime,
}

impl CutOffTime {
    pub fn new(day: &str, time: &str, available: bool) -> Result<Self, ApiError> {
        let valid_day = day.len() == 2 && matches!(day.parse::<u8>(), Ok(0..=7));
        if !valid_day {
            return Err(ApiError::invalid("cut-off day", format!("'{day}' must be 00 through 07")));
        }
        Ok(Self {
            available: Some(available),
            day: day.to_string(),
            time: validate::parse_time(time)?,
        })
    }

    /// English weekday name for `01`..`07`, `None` for the every-day code.
    pub fn day_name(&self) -> Option<&'static str> {
        match self.day.as_str() {
            "01" => Some("Monday"),
            "02" => Some("Tuesday"),
            "03" => Some("Wednesday"),
            "04" => Some("Thursday"),
            "05" => Some("Friday"),
            "06" => Some("Saturday"),
            "07" => Some("Sunday"),
            _ => None,
        }
    }
}

/// Address and hand-in moment to calculate the expected delivery date for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDeliveryDate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sunday_sorting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country_code: CountryCode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cut_off_times: Vec<CutOffTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_nr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_nr_ext: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_country_code: Option<CountryCode>,
    pub postal_code: String,
    #[serde(with = "de::datetime")]
    pub shipping_date: NaiveDateTime,
    pub shipping_duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl GetDeliveryDate {
    pub fn new(postal_code: &str, country: &str, shipping_date: NaiveDateTime) -> Result<Self, ApiError> {
        let country_code = CountryCode::new(country)?;
        Ok(Self {
            allow_sunday_sorting: None,
            city: None,
            postal_code: validate::normalize_postcode(postal_code, country_code.as_str())?,
            country_code,
            cut_off_times: Vec::new(),
            house_nr: None,
            house_nr_ext: None,
            options: vec!["Daytime".to_string()],
            original_country_code: None,
            shipping_date,
            shipping_duration: 1,
            street: None,
        })
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_cut_off_time(mut self, cut_off: CutOffTime) -> Self {
        self.cut_off_times.push(cut_off);
        self
    }

    pub fn with_shipping_duration(mut self, days: u32) -> Self {
        self.shipping_duration = days;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDeliveryDateRequest {
    pub get_delivery_date: GetDeliveryDate,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDeliveryDateResponse {
    #[serde(with = "de::date")]
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub options: StringList,
}

/// Address and desired delivery date to calculate the latest hand-in date for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetSentDate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sunday_sorting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country_code: CountryCode,
    #[serde(with = "de::date")]
    pub delivery_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_nr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_nr_ext: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub postal_code: String,
    pub shipping_duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl GetSentDate {
    pub fn new(postal_code: &str, country: &str, delivery_date: NaiveDate) -> Result<Self, ApiError> {
        let country_code = CountryCode::new(country)?;
        Ok(Self {
            allow_sunday_sorting: None,
            city: None,
            postal_code: validate::normalize_postcode(postal_code, country_code.as_str())?,
            country_code,
            delivery_date,
            house_nr: None,
            house_nr_ext: None,
            options: Vec::new(),
            shipping_duration: 1,
            street: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetSentDateRequest {
    pub get_sent_date: GetSentDate,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetSentDateResponse {
    #[serde(with = "de::date")]
    pub sent_date: NaiveDate,
    #[serde(default)]
    pub options: StringList,
}
