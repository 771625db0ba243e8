//! Shipment confirmation: announces shipments whose labels were printed
//! outside the provider's labelling service.

use serde_json::Value;

use super::Connection;
use crate::config::{ApiMode, ClientConfig};
use crate::entity::{Confirming, ConfirmingResponse, ConfirmingResponseShipment};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::rest;
use crate::soap;
use crate::xml::{ListField, SoapSchema};

pub const REST_PATH: &str = "/shipment/v2/confirm";

pub const SOAP_SCHEMA: SoapSchema = SoapSchema {
    service: "ConfirmingWebService",
    endpoint: "/shipment/v2/confirm/soap.asmx",
    lists: &[
        ListField::domain("Shipments", "Shipment"),
        ListField::domain("Addresses", "Address"),
        ListField::domain("Amounts", "Amount"),
        ListField::domain("Contacts", "Contact"),
        ListField::domain("Content", "CustomsContent"),
        ListField::domain("Groups", "Group"),
        ListField::domain("ProductOptions", "ProductOption"),
        ListField::domain("ConfirmingResponseShipments", "ConfirmingResponseShipment"),
        ListField::domain("Warnings", "Warning"),
    ],
};

const OPERATION: &str = "Confirming";

#[derive(Debug, Clone)]
pub struct ConfirmingService {
    connection: Connection,
}

impl ConfirmingService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::from_config(config),
        }
    }

    pub fn build_confirm(&self, request: &Confirming) -> Result<HttpRequest, ApiError> {
        if request.shipments.is_empty() {
            return Err(ApiError::invalid("shipments", "at least one shipment is required"));
        }
        for shipment in &request.shipments {
            shipment.validate_for_confirm()?;
        }
        match self.connection.mode {
            ApiMode::Rest => rest::post_json(&self.connection.endpoint, REST_PATH, &self.connection.api_key, request),
            ApiMode::Soap => soap::request(
                &SOAP_SCHEMA,
                &self.connection.endpoint,
                &self.connection.api_key,
                OPERATION,
                request,
            ),
        }
    }

    /// One result per confirmed shipment, in request order.
    pub fn parse_confirm(&self, response: HttpResponse) -> Result<Vec<ConfirmingResponseShipment>, ApiError> {
        match self.connection.mode {
            ApiMode::Rest => {
                let parsed: ConfirmingResponse = rest::parse(&response)?;
                Ok(parsed.response_shipments)
            }
            ApiMode::Soap => {
                let value = soap::response_value(&SOAP_SCHEMA, &response, "ConfirmingResponseShipments")?;
                // An empty list element reads back as null.
                let value = if value.is_null() { Value::Array(Vec::new()) } else { value };
                serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
            }
        }
    }
}
