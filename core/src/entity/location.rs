//! Location service entities.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::common::{Address, Coordinates, CountryCode, Message};
use crate::de::{self, StringList};
use crate::error::ApiError;
use crate::validate;

/// Search criteria for pickup points.
///
/// A nearest-location search needs a postal code or `latitude`/`longitude`;
/// an area search needs both corner coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sunday_sorting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates_north_west: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates_south_east: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none", with = "de::opt_date")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delivery_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_nr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_nr_ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "de::opt_time")]
    pub opening_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postalcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl Location {
    /// Nearest pickup points around a postal code (`PG` delivery option).
    pub fn near_postcode(postcode: &str, country: &str) -> Result<Self, ApiError> {
        Ok(Self {
            postalcode: Some(validate::normalize_postcode(postcode, country)?),
            delivery_options: vec!["PG".to_string()],
            ..Self::default()
        })
    }

    pub fn near_coordinates(coordinates: Coordinates) -> Self {
        Self {
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
            delivery_options: vec!["PG".to_string()],
            ..Self::default()
        }
    }

    pub fn in_area(north_west: Coordinates, south_east: Coordinates) -> Self {
        Self {
            coordinates_north_west: Some(north_west),
            coordinates_south_east: Some(south_east),
            delivery_options: vec!["PG".to_string()],
            ..Self::default()
        }
    }

    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    pub fn with_opening_time(mut self, time: NaiveTime) -> Self {
        self.opening_time = Some(time);
        self
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetNearestLocations {
    pub countrycode: CountryCode,
    pub location: Location,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetLocationsInArea {
    pub countrycode: CountryCode,
    pub location: Location,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetLocation {
    pub location_code: String,
    pub message: Message,
    #[serde(rename = "RetailNetworkID")]
    pub retail_network_id: String,
}

/// Opening hours per weekday, each a list of `HH:MM-HH:MM` ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpeningHours {
    #[serde(default)]
    pub monday: StringList,
    #[serde(default)]
    pub tuesday: StringList,
    #[serde(default)]
    pub wednesday: StringList,
    #[serde(default)]
    pub thursday: StringList,
    #[serde(default)]
    pub friday: StringList,
    #[serde(default)]
    pub saturday: StringList,
    #[serde(default)]
    pub sunday: StringList,
}

/// A pickup point returned by the location service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseLocation {
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub delivery_options: StringList,
    #[serde(default, deserialize_with = "de::opt_u32_lenient")]
    pub distance: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub location_code: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub partner_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(rename = "RetailNetworkID", default)]
    pub retail_network_id: Option<String>,
    #[serde(default)]
    pub saleschannel: Option<String>,
    #[serde(default)]
    pub terminal_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GetLocationsResult {
    #[serde(rename = "ResponseLocation", default, deserialize_with = "de::one_or_many")]
    pub response_locations: Vec<ResponseLocation>,
}

/// Body shared by the nearest, area and lookup responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GetLocationsResponse {
    #[serde(rename = "GetLocationsResult", default)]
    pub result: Option<GetLocationsResult>,
}

impl GetLocationsResponse {
    pub fn into_locations(self) -> Vec<ResponseLocation> {
        self.result.map(|r| r.response_locations).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_single_location_with_string_numbers() {
        let parsed: GetLocationsResponse = serde_json::from_str(
            r#"{"GetLocationsResult":{"ResponseLocation":{
                "Address":{"City":"Hoofddorp","Countrycode":"NL","HouseNr":42,"Street":"Siriusdreef","Zipcode":"2132WT"},
                "DeliveryOptions":{"string":["DO","PG"]},
                "Distance":"312",
                "Latitude":"52.2864669",
                "Longitude":4.6830518,
                "LocationCode":161503,
                "Name":"Primera Sanders",
                "OpeningHours":{"Monday":{"string":"09:00-18:00"},"Sunday":null},
                "RetailNetworkID":"PNPNL-01"
            }}}"#,
        )
        .unwrap();
        let locations = parsed.into_locations();
        assert_eq!(locations.len(), 1);
        let location = &locations[0];
        assert_eq!(location.distance, Some(312));
        assert_eq!(location.latitude, Some(52.2864669));
        assert_eq!(location.location_code.as_deref(), Some("161503"));
        assert!(location.delivery_options.contains("PG"));
        let hours = location.opening_hours.as_ref().unwrap();
        assert_eq!(hours.monday.0, vec!["09:00-18:00"]);
        assert!(hours.sunday.is_empty());
        assert_eq!(location.address.as_ref().unwrap().house_nr.as_deref(), Some("42"));
    }

    #[test]
    fn empty_result_yields_no_locations() {
        let parsed: GetLocationsResponse = serde_json::from_str(r#"{"GetLocationsResult":null}"#).unwrap();
        assert!(parsed.into_locations().is_empty());
    }

    #[test]
    fn near_postcode_validates() {
        assert!(Location::near_postcode("2132WT", "NL").is_ok());
        assert!(Location::near_postcode("ABCDEF", "NL").is_err());
    }
}
