//! National address check entities.

use serde::{Deserialize, Serialize};

use crate::de::{self, StringList};
use crate::error::ApiError;
use crate::validate;

/// A Dutch address to validate; street and city are optional hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub house_number: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl AddressCheck {
    pub fn new(postal_code: &str, house_number: &str, addition: Option<&str>) -> Result<Self, ApiError> {
        Ok(Self {
            addition: addition.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
            city: None,
            house_number: validate::validate_house_number(house_number)?,
            postal_code: validate::normalize_postcode(postal_code, "NL")?,
            street: None,
        })
    }
}

/// One matching address as known by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidatedAddress {
    #[serde(default)]
    pub addition: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub formatted_address: StringList,
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub house_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
}
