//! Barcode service entities.

use serde::{Deserialize, Serialize};

use super::common::{BarcodeType, Customer, Message};

/// Which barcode to generate: type, customer range and number serie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barcode {
    #[serde(rename = "Range")]
    pub range: String,
    #[serde(rename = "Serie")]
    pub serie: String,
    #[serde(rename = "Type")]
    pub barcode_type: BarcodeType,
}

impl Barcode {
    pub fn new(barcode_type: BarcodeType, range: &str, serie: &str) -> Self {
        Self {
            range: range.to_string(),
            serie: serie.to_string(),
            barcode_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerateBarcode {
    pub barcode: Barcode,
    pub customer: Customer,
    pub message: Message,
}

impl GenerateBarcode {
    pub fn new(barcode: Barcode, customer: Customer, message: Message) -> Self {
        Self {
            barcode,
            customer,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateBarcodeResponse {
    #[serde(rename = "Barcode")]
    pub barcode: String,
}
