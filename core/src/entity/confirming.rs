//! Shipment and confirming service entities.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::common::{Address, Amount, Contact, Customer, Customs, Dimension, Group, Message, ProductOption, Warning};
use crate::de;
use crate::error::ApiError;
use crate::validate;

/// A single shipment as announced to the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shipment {
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "de::one_or_many")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "de::one_or_many")]
    pub amounts: Vec<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "de::opt_datetime")]
    pub collection_time_stamp_end: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "de::opt_datetime")]
    pub collection_time_stamp_start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "de::one_or_many")]
    pub contacts: Vec<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customs: Option<Customs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "de::opt_datetime")]
    pub delivery_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    #[serde(rename = "DownPartnerBarcode", default, skip_serializing_if = "Option::is_none")]
    pub down_partner_barcode: Option<String>,
    #[serde(rename = "DownPartnerID", default, skip_serializing_if = "Option::is_none")]
    pub down_partner_id: Option<String>,
    #[serde(rename = "DownPartnerLocation", default, skip_serializing_if = "Option::is_none")]
    pub down_partner_location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "de::one_or_many")]
    pub groups: Vec<Group>,
    #[serde(rename = "IDExpiration", default, skip_serializing_if = "Option::is_none", with = "de::opt_date")]
    pub id_expiration: Option<NaiveDate>,
    #[serde(rename = "IDNumber", default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(rename = "IDType", default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code_collect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "de::one_or_many")]
    pub product_options: Vec<ProductOption>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "de::opt_date")]
    pub receiver_date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_collect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_reference: Option<String>,
}

impl Shipment {
    /// Standard domestic parcel (product code 3085) to `receiver`.
    pub fn new(receiver: Address) -> Self {
        Self {
            addresses: vec![receiver],
            product_code_delivery: Some("3085".to_string()),
            ..Self::default()
        }
    }

    pub fn with_barcode(mut self, barcode: &str) -> Result<Self, ApiError> {
        self.barcode = Some(validate::validate_barcode(barcode)?);
        Ok(self)
    }

    pub fn with_weight(mut self, grams: u32) -> Self {
        self.dimension = Some(Dimension::weight(grams));
        self
    }

    pub fn with_product_code(mut self, code: &str) -> Self {
        self.product_code_delivery = Some(code.to_string());
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.push(contact);
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    /// The receiver (`01`) address, if present.
    pub fn receiver(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| a.address_type.as_deref() == Some(Address::RECEIVER))
    }

    /// Checks the fields the provider rejects a confirmation without.
    pub fn validate_for_confirm(&self) -> Result<(), ApiError> {
        if self.barcode.is_none() {
            return Err(ApiError::invalid("barcode", "a confirmed shipment needs a barcode"));
        }
        if self.receiver().is_none() {
            return Err(ApiError::invalid("addresses", "a receiver address (type 01) is required"));
        }
        if self.product_code_delivery.is_none() {
            return Err(ApiError::invalid("product code", "a delivery product code is required"));
        }
        Ok(())
    }
}

/// Confirming request: announce shipments whose labels were printed locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Confirming {
    pub customer: Customer,
    pub message: Message,
    pub shipments: Vec<Shipment>,
}

impl Confirming {
    pub fn new(customer: Customer, message: Message, shipments: Vec<Shipment>) -> Self {
        Self {
            customer,
            message,
            shipments,
        }
    }
}

/// Per-shipment confirmation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfirmingResponseShipment {
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfirmingResponse {
    #[serde(
        rename = "ResponseShipments",
        alias = "ConfirmingResponseShipments",
        default,
        deserialize_with = "de::one_or_many"
    )]
    pub response_shipments: Vec<ConfirmingResponseShipment>,
}
