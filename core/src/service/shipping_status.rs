//! Shipment tracking: current or complete status by barcode or reference,
//! and proof-of-delivery signatures. REST only.

use tracing::debug;
use url::form_urlencoded;

use super::Connection;
use crate::config::ClientConfig;
use crate::entity::{
    CompleteStatus, CurrentStatus, CurrentStatusByReference, GetSignature, Signature, SignatureResponse,
    StatusResponse, StatusShipment, Warning,
};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, QueryParams};
use crate::rest;

pub const REST_PATH: &str = "/shipment/v2/status";

/// Percent-encodes a single path segment (spaces as `%20`, not `+`).
fn path_segment(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// The most specific reason a status response carried no shipment.
fn missing(warnings: &[Warning], what: &str) -> ApiError {
    let reason = warnings
        .iter()
        .find_map(|w| w.description.clone().or_else(|| w.code.clone()))
        .unwrap_or_else(|| format!("no {what} found"));
    ApiError::NotFound(reason)
}

#[derive(Debug, Clone)]
pub struct ShippingStatusService {
    connection: Connection,
}

impl ShippingStatusService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::from_config(config),
        }
    }

    fn get(&self, path: String, query: &QueryParams) -> HttpRequest {
        rest::get(&self.connection.endpoint, &path, &self.connection.api_key, query)
    }

    pub fn build_current_status(&self, request: &CurrentStatus) -> HttpRequest {
        let mut query = QueryParams::new();
        query.push("detail", "false").push("language", &request.language);
        self.get(format!("{REST_PATH}/barcode/{}", path_segment(&request.barcode)), &query)
    }

    pub fn build_complete_status(&self, request: &CompleteStatus) -> HttpRequest {
        let mut query = QueryParams::new();
        query.push("detail", "true").push("language", &request.language);
        self.get(format!("{REST_PATH}/barcode/{}", path_segment(&request.barcode)), &query)
    }

    pub fn build_current_status_by_reference(
        &self,
        request: &CurrentStatusByReference,
        detail: bool,
    ) -> Result<HttpRequest, ApiError> {
        let mut query = QueryParams::new();
        query
            .push("customerCode", request.customer.require_code()?)
            .push("customerNumber", request.customer.require_number()?)
            .push("detail", detail.to_string())
            .push("language", &request.language);
        Ok(self.get(format!("{REST_PATH}/reference/{}", path_segment(&request.reference)), &query))
    }

    pub fn build_get_signature(&self, request: &GetSignature) -> HttpRequest {
        self.get(
            format!("{REST_PATH}/signature/{}", path_segment(&request.barcode)),
            &QueryParams::new(),
        )
    }

    /// Shipments in a status response; never empty.
    ///
    /// A response holding only warnings ("no shipment found") is `NotFound`.
    pub fn parse_status(&self, response: HttpResponse) -> Result<Vec<StatusShipment>, ApiError> {
        let parsed: StatusResponse = rest::parse(&response)?;
        let shipments = parsed.result.map(|r| r.shipments).unwrap_or_default();
        if shipments.is_empty() {
            return Err(missing(&parsed.warnings, "shipment"));
        }
        debug!(count = shipments.len(), "parsed shipment status");
        Ok(shipments)
    }

    pub fn parse_get_signature(&self, response: HttpResponse) -> Result<Signature, ApiError> {
        let parsed: SignatureResponse = rest::parse(&response)?;
        parsed.signature.ok_or_else(|| missing(&parsed.warnings, "signature"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiMode;
    use crate::entity::Customer;
    use crate::service::testing;

    fn service() -> ShippingStatusService {
        ShippingStatusService::new(&testing::config(ApiMode::Rest))
    }

    #[test]
    fn barcode_requests() {
        let current = service().build_current_status(&CurrentStatus::new("3SDEVC201611210").unwrap());
        assert_eq!(
            current.url,
            "https://api.postnl.test/shipment/v2/status/barcode/3SDEVC201611210?detail=false&language=NL"
        );
        let complete = service().build_complete_status(&CompleteStatus::new("3SDEVC201611210").unwrap());
        assert!(complete.url.ends_with("?detail=true&language=NL"));
        let signature = service().build_get_signature(&GetSignature::new("3SDEVC201611210").unwrap());
        assert_eq!(signature.url, "https://api.postnl.test/shipment/v2/status/signature/3SDEVC201611210");
    }

    #[test]
    fn reference_is_path_encoded() {
        let request = CurrentStatusByReference::new("order 1/2", Customer::new("DEVC", "11223344")).unwrap();
        let req = service().build_current_status_by_reference(&request, false).unwrap();
        assert_eq!(
            req.url,
            "https://api.postnl.test/shipment/v2/status/reference/order%201%2F2\
             ?customerCode=DEVC&customerNumber=11223344&detail=false&language=NL"
        );
    }

    #[test]
    fn warnings_without_shipment_are_not_found() {
        let err = service()
            .parse_status(HttpResponse::new(
                200,
                r#"{"Warnings":[{"Code":"No shipment found","Message":"Geen zending gevonden"}]}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "Geen zending gevonden"));
    }

    #[test]
    fn parses_current_status() {
        let shipments = service()
            .parse_status(HttpResponse::new(
                200,
                r#"{"CurrentStatus":{"Shipment":{"Barcode":"3SDEVC201611210","ProductCode":"003085",
                    "Status":{"PhaseCode":"4","StatusCode":"11","TimeStamp":"30-06-2016 12:00:00"}}}}"#,
            ))
            .unwrap();
        assert_eq!(shipments[0].barcode.as_deref(), Some("3SDEVC201611210"));
        assert_eq!(shipments[0].product_code.as_deref(), Some("003085"));
    }

    #[test]
    fn parses_signature() {
        let signature = service()
            .parse_get_signature(HttpResponse::new(
                200,
                r#"{"Signature":{"Barcode":"3SDEVC201611210","SignatureDate":"30-06-2016 12:00:00","SignatureImage":"iVBORw0K"}}"#,
            ))
            .unwrap();
        assert_eq!(signature.signature_image.as_deref(), Some("iVBORw0K"));
        assert!(matches!(
            service().parse_get_signature(HttpResponse::new(200, "{}")).unwrap_err(),
            ApiError::NotFound(_)
        ));
    }
}
