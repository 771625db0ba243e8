//! Shipping status service entities.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::common::{Address, Amount, Customer, Dimension, Group, ProductOption, Warning};
use crate::de;
use crate::error::ApiError;
use crate::validate;

/// Latest status of a shipment, looked up by barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentStatus {
    pub barcode: String,
    pub language: String,
}

impl CurrentStatus {
    pub fn new(barcode: &str) -> Result<Self, ApiError> {
        Ok(Self {
            barcode: validate::validate_barcode(barcode)?,
            language: "NL".to_string(),
        })
    }
}

/// Latest status of a shipment, looked up by the customer's own reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentStatusByReference {
    pub reference: String,
    pub customer: Customer,
    pub language: String,
}

impl CurrentStatusByReference {
    pub fn new(reference: &str, customer: Customer) -> Result<Self, ApiError> {
        if reference.trim().is_empty() {
            return Err(ApiError::invalid("reference", "must not be empty"));
        }
        customer.require_code()?;
        customer.require_number()?;
        Ok(Self {
            reference: reference.trim().to_string(),
            customer,
            language: "NL".to_string(),
        })
    }
}

/// Full status history (events and old statuses) by barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteStatus {
    pub barcode: String,
    pub language: String,
}

impl CompleteStatus {
    pub fn new(barcode: &str) -> Result<Self, ApiError> {
        Ok(Self {
            barcode: validate::validate_barcode(barcode)?,
            language: "NL".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSignature {
    pub barcode: String,
}

impl GetSignature {
    pub fn new(barcode: &str) -> Result<Self, ApiError> {
        Ok(Self {
            barcode: validate::validate_barcode(barcode)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub phase_code: Option<String>,
    #[serde(default)]
    pub phase_description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status_description: Option<String>,
    #[serde(default, with = "de::opt_datetime")]
    pub time_stamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusEvent {
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub destination_location_code: Option<String>,
    #[serde(default)]
    pub location_code: Option<String>,
    #[serde(default)]
    pub route_code: Option<String>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default, with = "de::opt_datetime")]
    pub time_stamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OldStatus {
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub phase_code: Option<String>,
    #[serde(default)]
    pub phase_description: Option<String>,
    #[serde(default, with = "de::opt_datetime")]
    pub time_stamp: Option<NaiveDateTime>,
}

/// Expected time of arrival window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Expectation {
    #[serde(rename = "ETAFrom", default, with = "de::opt_datetime")]
    pub eta_from: Option<NaiveDateTime>,
    #[serde(rename = "ETATo", default, with = "de::opt_datetime")]
    pub eta_to: Option<NaiveDateTime>,
}

/// A shipment as reported by the status service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusShipment {
    #[serde(rename = "Address", default, deserialize_with = "de::one_or_many")]
    pub addresses: Vec<Address>,
    #[serde(rename = "Amount", default, deserialize_with = "de::one_or_many")]
    pub amounts: Vec<Amount>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default, with = "de::opt_datetime")]
    pub delivery_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub dimension: Option<Dimension>,
    #[serde(rename = "Event", default, deserialize_with = "de::one_or_many")]
    pub events: Vec<StatusEvent>,
    #[serde(default)]
    pub expectation: Option<Expectation>,
    #[serde(rename = "Groups", default, deserialize_with = "de::one_or_many")]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub main_barcode: Option<String>,
    #[serde(rename = "OldStatus", default, deserialize_with = "de::one_or_many")]
    pub old_statuses: Vec<OldStatus>,
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub product_code: Option<String>,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub product_options: Vec<ProductOption>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusResult {
    #[serde(rename = "Shipment", default, deserialize_with = "de::one_or_many")]
    pub shipments: Vec<StatusShipment>,
}

/// Body of a status-by-barcode or status-by-reference response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "CurrentStatus", alias = "CompleteStatus", default)]
    pub result: Option<StatusResult>,
    #[serde(rename = "Warnings", default, deserialize_with = "de::one_or_many")]
    pub warnings: Vec<Warning>,
}

/// Proof of delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Signature {
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, with = "de::opt_datetime")]
    pub signature_date: Option<NaiveDateTime>,
    /// Base64-encoded image as delivered by the provider.
    #[serde(default)]
    pub signature_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignatureResponse {
    #[serde(rename = "Signature", default)]
    pub signature: Option<Signature>,
    #[serde(rename = "Warnings", default, deserialize_with = "de::one_or_many")]
    pub warnings: Vec<Warning>,
}

impl StatusShipment {
    /// Delivery day, when the shipment reports one.
    pub fn delivered_on(&self) -> Option<NaiveDate> {
        self.delivery_date.map(|dt| dt.date())
    }
}
