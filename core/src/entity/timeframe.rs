//! Timeframe service entities.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::common::{CountryCode, Message};
use crate::de::{self, StringList};
use crate::error::ApiError;
use crate::validate;

/// Address and date range to list delivery timeframes for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Timeframe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country_code: CountryCode,
    #[serde(with = "de::date")]
    pub end_date: NaiveDate,
    pub house_nr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_nr_ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub postal_code: String,
    #[serde(with = "de::date")]
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    pub sunday_sorting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe_range: Option<String>,
}

impl Timeframe {
    pub fn new(
        postal_code: &str,
        house_nr: &str,
        country: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, ApiError> {
        if end_date < start_date {
            return Err(ApiError::invalid("end date", "must not be before the start date"));
        }
        let country_code = CountryCode::new(country)?;
        Ok(Self {
            city: None,
            postal_code: validate::normalize_postcode(postal_code, country_code.as_str())?,
            country_code,
            end_date,
            house_nr: validate::validate_house_number(house_nr)?,
            house_nr_ext: None,
            interval: None,
            options: vec!["Daytime".to_string()],
            start_date,
            street: None,
            sunday_sorting: false,
            timeframe_range: None,
        })
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_sunday_sorting(mut self, allowed: bool) -> Self {
        self.sunday_sorting = allowed;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTimeframes {
    pub message: Message,
    pub timeframe: Timeframe,
}

/// One delivery window on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeframeTimeFrame {
    #[serde(with = "de::time")]
    pub from: NaiveTime,
    #[serde(with = "de::time")]
    pub to: NaiveTime,
    #[serde(default)]
    pub options: StringList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimeframeSlots {
    #[serde(rename = "TimeframeTimeFrame", default, deserialize_with = "de::one_or_many")]
    pub slots: Vec<TimeframeTimeFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeframeDay {
    #[serde(with = "de::date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub timeframes: Option<TimeframeSlots>,
}

impl TimeframeDay {
    pub fn slots(&self) -> &[TimeframeTimeFrame] {
        self.timeframes.as_ref().map(|t| t.slots.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimeframeDays {
    #[serde(rename = "Timeframe", default, deserialize_with = "de::one_or_many")]
    pub days: Vec<TimeframeDay>,
}

/// Why no timeframe is offered on a date (e.g. no Sunday delivery).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReasonNoTimeframe {
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub code: Option<String>,
    #[serde(default, with = "de::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: StringList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReasonNoTimeframes {
    #[serde(rename = "ReasonNoTimeframe", default, deserialize_with = "de::one_or_many")]
    pub reasons: Vec<ReasonNoTimeframe>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTimeframesResponse {
    #[serde(default)]
    pub reason_no_timeframes: Option<ReasonNoTimeframes>,
    #[serde(default)]
    pub timeframes: Option<TimeframeDays>,
}

impl GetTimeframesResponse {
    pub fn days(&self) -> &[TimeframeDay] {
        self.timeframes.as_ref().map(|t| t.days.as_slice()).unwrap_or(&[])
    }

    pub fn reasons(&self) -> &[ReasonNoTimeframe] {
        self.reason_no_timeframes
            .as_ref()
            .map(|r| r.reasons.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_nested_wrappers() {
        let parsed: GetTimeframesResponse = serde_json::from_str(
            r#"{
                "ReasonNoTimeframes":{"ReasonNoTimeframe":{"Code":"01","Date":"03-07-2016","Description":"Dag uitgesloten van tijdvak","Options":{"string":"Daytime"}}},
                "Timeframes":{"Timeframe":[
                    {"Date":"30-06-2016","Timeframes":{"TimeframeTimeFrame":[
                        {"From":"14:30:00","To":"17:00:00","Options":{"string":"Daytime"}},
                        {"From":"18:00:00","To":"22:00:00","Options":{"string":"Evening"}}
                    ]}},
                    {"Date":"01-07-2016","Timeframes":{"TimeframeTimeFrame":{"From":"09:00:00","To":"12:00:00","Options":{"string":"Morning"}}}}
                ]}
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.days().len(), 2);
        assert_eq!(parsed.days()[0].slots().len(), 2);
        assert_eq!(parsed.days()[1].slots()[0].options.0, vec!["Morning"]);
        assert_eq!(parsed.reasons()[0].code.as_deref(), Some("01"));
    }

    #[test]
    fn timeframe_rejects_reversed_range() {
        let start = NaiveDate::from_ymd_opt(2016, 7, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2016, 7, 1).unwrap();
        let err = Timeframe::new("2132WT", "42", "NL", start, end).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { field: "end date", .. }));
    }
}
