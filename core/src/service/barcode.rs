//! Barcode generation.
//!
//! A barcode is `<type><range><serial>`; the serial is drawn by the provider
//! from the requested serie. Which type, range and serie apply depends on the
//! destination country: domestic and European (EPS) parcels use `3S` with the
//! customer code as range, everything else ships as GlobalPack with its own
//! contract-specific type and range.

use tracing::debug;

use super::Connection;
use crate::config::{ApiMode, ClientConfig};
use crate::entity::{Barcode, BarcodeType, CountryCode, Customer, GenerateBarcode, GenerateBarcodeResponse};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, QueryParams};
use crate::rest;
use crate::soap;
use crate::xml::SoapSchema;

pub const REST_PATH: &str = "/shipment/v1_1/barcode";

pub const SOAP_SCHEMA: SoapSchema = SoapSchema {
    service: "BarcodeWebService",
    endpoint: "/shipment/v1_1/barcode/soap.asmx",
    lists: &[],
};

const OPERATION: &str = "GenerateBarcode";

/// Destinations served by the European Parcel Service.
pub const EPS_COUNTRIES: &[&str] = &[
    "AD", "AL", "AT", "BA", "BE", "BG", "BY", "CH", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FO", "FR", "GB",
    "GG", "GI", "GL", "GR", "HR", "HU", "IC", "IE", "IT", "JE", "LI", "LT", "LU", "LV", "MC", "MD", "ME", "MK",
    "NO", "PL", "PT", "RO", "RS", "SE", "SI", "SK", "SM", "TR", "UA", "VA",
];

pub fn is_eps_country(country: &str) -> bool {
    EPS_COUNTRIES.contains(&country)
}

/// Number serie for a barcode type and customer range.
///
/// `eps` selects the European series for `3S` barcodes; any type other than
/// `2S`/`3S` is a GlobalPack type.
pub fn find_barcode_serie(barcode_type: &str, range: &str, eps: bool) -> Result<&'static str, ApiError> {
    match barcode_type {
        "2S" => Ok("0000000-9999999"),
        "3S" if eps => match range.len() {
            4 => Ok("0000000-9999999"),
            3 => Ok("10000000-20000000"),
            1 => Ok("5200000000-5299999999"),
            _ => Err(ApiError::InvalidBarcode(format!(
                "no EPS serie for range '{range}' of length {}",
                range.len()
            ))),
        },
        "3S" if range.len() == 4 => Ok("987000000-987600000"),
        "3S" => Ok("0000000-9999999"),
        _ => Ok("0000-9999"),
    }
}

#[derive(Debug, Clone)]
pub struct BarcodeService {
    connection: Connection,
    customer: Customer,
    globalpack_type: Option<String>,
    globalpack_customer_code: Option<String>,
}

impl BarcodeService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::from_config(config),
            customer: config.customer.clone(),
            globalpack_type: config.globalpack_barcode_type.clone(),
            globalpack_customer_code: config.globalpack_customer_code.clone(),
        }
    }

    /// Barcode definition to request for a parcel to `country`.
    pub fn barcode_for_country(&self, country: &str) -> Result<Barcode, ApiError> {
        let country = CountryCode::new(country)?;
        let (barcode_type, range, eps) = match country.as_str() {
            "NL" => ("3S".to_string(), self.customer.require_code()?.to_string(), false),
            code if is_eps_country(code) => ("3S".to_string(), self.customer.require_code()?.to_string(), true),
            code => {
                let barcode_type = self.globalpack_type.clone().ok_or_else(|| {
                    ApiError::InvalidConfiguration(format!("GlobalPack barcode type is required for {code}"))
                })?;
                let range = self.globalpack_customer_code.clone().ok_or_else(|| {
                    ApiError::InvalidConfiguration(format!("GlobalPack customer code is required for {code}"))
                })?;
                (barcode_type, range, false)
            }
        };
        let serie = find_barcode_serie(&barcode_type, &range, eps)?;
        debug!(country = %country, %barcode_type, %range, serie, "selected barcode serie");
        Ok(Barcode::new(BarcodeType::new(&barcode_type)?, &range, serie))
    }

    pub fn build_generate_barcode(&self, request: &GenerateBarcode) -> Result<HttpRequest, ApiError> {
        match self.connection.mode {
            ApiMode::Rest => {
                let customer = &request.customer;
                let mut query = QueryParams::new();
                query
                    .push("CustomerCode", customer.require_code()?)
                    .push("CustomerNumber", customer.require_number()?)
                    .push("Type", request.barcode.barcode_type.as_str())
                    .push("Serie", &request.barcode.serie)
                    .push("Range", &request.barcode.range);
                Ok(rest::get(&self.connection.endpoint, REST_PATH, &self.connection.api_key, &query))
            }
            ApiMode::Soap => soap::request(
                &SOAP_SCHEMA,
                &self.connection.endpoint,
                &self.connection.api_key,
                OPERATION,
                request,
            ),
        }
    }

    /// The generated barcode.
    pub fn parse_generate_barcode(&self, response: HttpResponse) -> Result<String, ApiError> {
        let parsed: GenerateBarcodeResponse = match self.connection.mode {
            ApiMode::Rest => rest::parse(&response)?,
            ApiMode::Soap => soap::parse(&SOAP_SCHEMA, &response, "GenerateBarcodeResponse")?,
        };
        if parsed.barcode.trim().is_empty() {
            return Err(ApiError::DeserializationError("empty barcode in response".to_string()));
        }
        Ok(parsed.barcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Message;
    use crate::service::testing;

    fn request(service: &BarcodeService) -> GenerateBarcode {
        GenerateBarcode::new(
            service.barcode_for_country("NL").unwrap(),
            Customer::new("DEVC", "11223344"),
            Message::with_id("1", "01-01-2024 12:00:00"),
        )
    }

    #[test]
    fn serie_selection() {
        assert_eq!(find_barcode_serie("2S", "DEVC", false).unwrap(), "0000000-9999999");
        assert_eq!(find_barcode_serie("3S", "DEVC", false).unwrap(), "987000000-987600000");
        assert_eq!(find_barcode_serie("3S", "DEV", false).unwrap(), "0000000-9999999");
        assert_eq!(find_barcode_serie("3S", "DEVC", true).unwrap(), "0000000-9999999");
        assert_eq!(find_barcode_serie("3S", "DEV", true).unwrap(), "10000000-20000000");
        assert_eq!(find_barcode_serie("3S", "D", true).unwrap(), "5200000000-5299999999");
        assert_eq!(find_barcode_serie("CD", "1234", false).unwrap(), "0000-9999");
        assert!(matches!(
            find_barcode_serie("3S", "DEVCX", true).unwrap_err(),
            ApiError::InvalidBarcode(_)
        ));
    }

    #[test]
    fn barcode_for_country_picks_type_and_range() {
        let config = testing::config(ApiMode::Rest).with_globalpack("CD", "1234");
        let service = BarcodeService::new(&config);

        let nl = service.barcode_for_country("NL").unwrap();
        assert_eq!((nl.barcode_type.as_str(), nl.range.as_str()), ("3S", "DEVC"));
        assert_eq!(nl.serie, "987000000-987600000");

        let be = service.barcode_for_country("be").unwrap();
        assert_eq!(be.serie, "0000000-9999999");

        let us = service.barcode_for_country("US").unwrap();
        assert_eq!((us.barcode_type.as_str(), us.range.as_str()), ("CD", "1234"));
        assert_eq!(us.serie, "0000-9999");
    }

    #[test]
    fn globalpack_without_configuration_is_rejected() {
        let service = BarcodeService::new(&testing::config(ApiMode::Rest));
        let err = service.barcode_for_country("US").unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfiguration(_)));
    }

    #[test]
    fn rest_request_uses_query_string() {
        let service = BarcodeService::new(&testing::config(ApiMode::Rest));
        let req = service.build_generate_barcode(&request(&service)).unwrap();
        assert_eq!(
            req.url,
            "https://api.postnl.test/shipment/v1_1/barcode?CustomerCode=DEVC&CustomerNumber=11223344&Type=3S&Serie=987000000-987600000&Range=DEVC"
        );
        assert_eq!(req.header("apikey"), Some("test-key"));
    }

    #[test]
    fn soap_request_carries_barcode_and_customer() {
        let service = BarcodeService::new(&testing::config(ApiMode::Soap));
        let req = service.build_generate_barcode(&request(&service)).unwrap();
        assert_eq!(req.url, "https://api.postnl.test/shipment/v1_1/barcode/soap.asmx");
        let body = req.body.unwrap();
        assert!(body.contains(
            "<services:GenerateBarcode><domain:Barcode><domain:Range>DEVC</domain:Range>\
             <domain:Serie>987000000-987600000</domain:Serie><domain:Type>3S</domain:Type></domain:Barcode>\
             <domain:Customer><domain:CustomerCode>DEVC</domain:CustomerCode>\
             <domain:CustomerNumber>11223344</domain:CustomerNumber></domain:Customer>\
             <domain:Message><domain:MessageID>1</domain:MessageID>\
             <domain:MessageTimeStamp>01-01-2024 12:00:00</domain:MessageTimeStamp></domain:Message>\
             </services:GenerateBarcode>"
        ));
    }

    #[test]
    fn parses_both_protocols() {
        let rest = BarcodeService::new(&testing::config(ApiMode::Rest));
        let barcode = rest
            .parse_generate_barcode(HttpResponse::new(200, r#"{"Barcode":"3SDEVC816223392"}"#))
            .unwrap();
        assert_eq!(barcode, "3SDEVC816223392");

        let soap = BarcodeService::new(&testing::config(ApiMode::Soap));
        let body = testing::soap_body(
            r#"<GenerateBarcodeResponse xmlns="http://postnl.nl/cif/services/BarcodeWebService/"><Barcode>3SDEVC816223392</Barcode></GenerateBarcodeResponse>"#,
        );
        assert_eq!(soap.parse_generate_barcode(HttpResponse::new(200, &body)).unwrap(), "3SDEVC816223392");
    }

    #[test]
    fn empty_barcode_is_an_error() {
        let service = BarcodeService::new(&testing::config(ApiMode::Rest));
        let err = service
            .parse_generate_barcode(HttpResponse::new(200, r#"{"Barcode":""}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
