//! Value objects shared by several services.

use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::de;
use crate::error::ApiError;
use crate::validate;

/// ISO 3166-1 alpha-2 country code, upper-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: &str) -> Result<Self, ApiError> {
        validate::normalize_country_code(code).map(CountryCode)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CountryCode::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two-character barcode type such as `3S` or a GlobalPack type like `CD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BarcodeType(String);

impl BarcodeType {
    pub fn new(barcode_type: &str) -> Result<Self, ApiError> {
        validate::validate_barcode_type(barcode_type).map(BarcodeType)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BarcodeType {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BarcodeType::new(&value)
    }
}

impl From<BarcodeType> for String {
    fn from(barcode_type: BarcodeType) -> Self {
        barcode_type.0
    }
}

impl fmt::Display for BarcodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Postal address. `AddressType` distinguishes receiver (`01`), sender (`02`)
/// and the other roles an address can play on a shipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildingname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countrycode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doorcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string_lenient")]
    pub house_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_nr_ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_house_nr_ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

impl Address {
    pub const RECEIVER: &'static str = "01";
    pub const SENDER: &'static str = "02";
    pub const ALTERNATIVE_SENDER: &'static str = "03";
    pub const COLLECTION: &'static str = "04";
    pub const RETURN: &'static str = "08";
    pub const DELIVERY: &'static str = "09";

    pub fn of_type(address_type: &str) -> Self {
        Self {
            address_type: Some(address_type.to_string()),
            ..Self::default()
        }
    }

    pub fn receiver() -> Self {
        Self::of_type(Self::RECEIVER)
    }

    pub fn sender() -> Self {
        Self::of_type(Self::SENDER)
    }

    pub fn alternative_sender() -> Self {
        Self::of_type(Self::ALTERNATIVE_SENDER)
    }

    pub fn collection() -> Self {
        Self::of_type(Self::COLLECTION)
    }

    /// Where undeliverable parcels go back to.
    pub fn return_address() -> Self {
        Self::of_type(Self::RETURN)
    }

    pub fn delivery() -> Self {
        Self::of_type(Self::DELIVERY)
    }

    pub fn with_name(mut self, first_name: Option<&str>, name: &str) -> Self {
        self.first_name = first_name.map(str::to_string);
        self.name = Some(name.to_string());
        self
    }

    pub fn with_company(mut self, company: &str) -> Self {
        self.company_name = Some(company.to_string());
        self
    }

    pub fn with_street(mut self, street: &str, house_nr: &str, house_nr_ext: Option<&str>) -> Result<Self, ApiError> {
        self.street = Some(street.to_string());
        self.house_nr = Some(validate::validate_house_number(house_nr)?);
        self.house_nr_ext = house_nr_ext.map(str::to_string);
        Ok(self)
    }

    /// Sets city, country and the postcode normalized for that country.
    pub fn with_locality(mut self, zipcode: &str, city: &str, country: &str) -> Result<Self, ApiError> {
        self.countrycode = Some(validate::normalize_country_code(country)?);
        self.city = Some(city.to_string());
        self.with_zipcode(zipcode)
    }

    /// Sets the postcode, validated against the address country (NL when unset).
    pub fn with_zipcode(mut self, zipcode: &str) -> Result<Self, ApiError> {
        let country = self.countrycode.as_deref().unwrap_or("NL");
        self.zipcode = Some(validate::normalize_postcode(zipcode, country)?);
        Ok(self)
    }
}

/// The customer account a request is made on behalf of.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Customer {
    pub fn new(customer_code: &str, customer_number: &str) -> Self {
        Self {
            customer_code: Some(customer_code.to_string()),
            customer_number: Some(customer_number.to_string()),
            ..Self::default()
        }
    }

    /// Customer code, or `InvalidConfiguration` when it was never set.
    pub fn require_code(&self) -> Result<&str, ApiError> {
        self.customer_code
            .as_deref()
            .ok_or_else(|| ApiError::InvalidConfiguration("customer code is not set".to_string()))
    }

    pub fn require_number(&self) -> Result<&str, ApiError> {
        self.customer_number
            .as_deref()
            .ok_or_else(|| ApiError::InvalidConfiguration("customer number is not set".to_string()))
    }

    /// Only the identifying fields, as sent by barcode and status requests.
    pub fn identity(&self) -> Self {
        Self {
            customer_code: self.customer_code.clone(),
            customer_number: self.customer_number.clone(),
            ..Self::default()
        }
    }
}

/// Parcel dimensions in grams and millimetres.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub volume: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub width: Option<u32>,
}

impl Dimension {
    pub fn weight(grams: u32) -> Self {
        Self {
            weight: Some(grams),
            ..Self::default()
        }
    }
}

/// Monetary amount attached to a shipment (COD, insured value, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Amount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_type: Option<String>,
    #[serde(rename = "BIC", default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(rename = "IBAN", default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string_lenient")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "SMSNr", default, skip_serializing_if = "Option::is_none")]
    pub sms_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel_nr: Option<String>,
}

impl Contact {
    pub const RECEIVER: &'static str = "01";

    pub fn receiver(email: Option<&str>, phone: Option<&str>) -> Self {
        Self {
            contact_type: Some(Self::RECEIVER.to_string()),
            email: email.map(str::to_string),
            sms_nr: None,
            tel_nr: phone.map(str::to_string),
        }
    }
}

/// Product characteristic/option pair, e.g. `118`/`006` for evening delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductOption {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string_lenient")]
    pub characteristic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string_lenient")]
    pub option: Option<String>,
}

impl ProductOption {
    pub fn new(characteristic: &str, option: &str) -> Self {
        Self {
            characteristic: Some(characteristic.to_string()),
            option: Some(option.to_string()),
        }
    }
}

/// Multi-collo grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub group_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub group_sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_barcode: Option<String>,
}

/// Customs declaration for shipments leaving the EU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "de::one_or_many")]
    pub content: Vec<CustomsContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_as_non_deliverable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomsContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "HSTariffNr", default, skip_serializing_if = "Option::is_none")]
    pub hs_tariff_nr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_string_lenient")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::opt_u32_lenient")]
    pub weight: Option<u32>,
}

/// Envelope metadata sent with every SOAP request and most REST bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "MessageID")]
    pub message_id: String,
    #[serde(rename = "MessageTimeStamp")]
    pub message_time_stamp: String,
    #[serde(rename = "Printertype", default, skip_serializing_if = "Option::is_none")]
    pub printer_type: Option<String>,
}

impl Message {
    pub const DEFAULT_PRINTER_TYPE: &'static str = "GraphicFile|PDF";

    /// Random id and the current local time.
    pub fn new() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            message_id: id[..12].to_string(),
            message_time_stamp: validate::format_datetime(Local::now().naive_local()),
            printer_type: None,
        }
    }

    pub fn with_id(message_id: &str, message_time_stamp: &str) -> Self {
        Self {
            message_id: message_id.to_string(),
            message_time_stamp: message_time_stamp.to_string(),
            printer_type: None,
        }
    }

    pub fn with_printer_type(mut self, printer_type: &str) -> Self {
        self.printer_type = Some(printer_type.to_string());
        self
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-fatal remark attached to a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Warning {
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    pub code: Option<String>,
    #[serde(default, alias = "Message")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ApiError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ApiError::invalid("latitude", format!("{latitude} is out of range")));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ApiError::invalid("longitude", format!("{longitude} is out of range")));
        }
        Ok(Self { latitude, longitude })
    }
}
