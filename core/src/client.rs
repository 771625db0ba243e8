//! The `PostNlClient` facade.
//!
//! # Design
//! The facade owns one instance of every service plus a host-supplied
//! [`Transport`]. Each convenience method builds the request entity (stamping
//! a fresh [`Message`]), lets the service build the [`HttpRequest`], hands it
//! to the transport and lets the service parse the [`HttpResponse`]. Errors
//! propagate as-is; there is no retry and no response cache.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ClientConfig;
use crate::entity::{
    AddressCheck, Barcode, BarcodeType, CompleteStatus, Confirming, ConfirmingResponseShipment, CountryCode,
    CurrentStatus, CurrentStatusByReference, GenerateBarcode, GetDeliveryDate, GetDeliveryDateRequest,
    GetDeliveryDateResponse, GetLocation, GetLocationsInArea, GetNearestLocations, GetSentDate, GetSentDateRequest,
    GetSentDateResponse, GetSignature, GetTimeframes, GetTimeframesResponse, Location, Message, ResponseLocation,
    Shipment, Signature, StatusShipment, Timeframe, ValidatedAddress,
};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::service::{
    barcode, AddressCheckService, BarcodeService, ConfirmingService, DeliveryDateService, LocationService,
    ShippingStatusService, TimeframeService,
};

/// Executes one HTTP exchange on behalf of the client.
///
/// Implementations map network failures to [`ApiError::Transport`] and return
/// every HTTP response, successful or not, as an [`HttpResponse`].
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

pub struct PostNlClient<T: Transport> {
    config: ClientConfig,
    transport: T,
    barcode: BarcodeService,
    confirming: ConfirmingService,
    delivery_date: DeliveryDateService,
    location: LocationService,
    timeframe: TimeframeService,
    shipping_status: ShippingStatusService,
    address_check: AddressCheckService,
}

impl<T: Transport> PostNlClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            barcode: BarcodeService::new(&config),
            confirming: ConfirmingService::new(&config),
            delivery_date: DeliveryDateService::new(&config),
            location: LocationService::new(&config),
            timeframe: TimeframeService::new(&config),
            shipping_status: ShippingStatusService::new(&config),
            address_check: AddressCheckService::new(&config),
            config,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn barcode_service(&self) -> &BarcodeService {
        &self.barcode
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let url = request.url.clone();
        let response = self.transport.execute(request)?;
        debug!(method, %url, status = response.status, "exchange completed");
        Ok(response)
    }

    /// Generates one barcode.
    ///
    /// `range` defaults to the configured customer code and `serie` to the
    /// standard serie for the type and range.
    pub fn generate_barcode(
        &self,
        barcode_type: &str,
        range: Option<&str>,
        serie: Option<&str>,
        eps: bool,
    ) -> Result<String, ApiError> {
        let barcode_type = BarcodeType::new(barcode_type)?;
        let range = match range {
            Some(range) => range.to_string(),
            None => self.config.customer.require_code()?.to_string(),
        };
        let serie = match serie {
            Some(serie) => serie.to_string(),
            None => barcode::find_barcode_serie(barcode_type.as_str(), &range, eps)?.to_string(),
        };
        self.generate(Barcode::new(barcode_type, &range, &serie))
    }

    fn generate(&self, barcode: Barcode) -> Result<String, ApiError> {
        let request = GenerateBarcode::new(barcode, self.config.customer.identity(), Message::new());
        let response = self.execute(self.barcode.build_generate_barcode(&request)?)?;
        self.barcode.parse_generate_barcode(response)
    }

    /// Generates a barcode suitable for a parcel to `country`.
    pub fn generate_barcode_by_country_code(&self, country: &str) -> Result<String, ApiError> {
        self.generate(self.barcode.barcode_for_country(country)?)
    }

    /// Generates `count` barcodes per country, one request at a time.
    ///
    /// Results are keyed by the normalized country code.
    pub fn generate_barcodes_by_country_codes(
        &self,
        counts: &[(&str, usize)],
    ) -> Result<BTreeMap<String, Vec<String>>, ApiError> {
        let mut barcodes: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for &(country, count) in counts {
            let country = CountryCode::new(country)?;
            let definition = self.barcode.barcode_for_country(country.as_str())?;
            let entry = barcodes.entry(country.to_string()).or_default();
            for _ in 0..count {
                entry.push(self.generate(definition.clone())?);
            }
        }
        Ok(barcodes)
    }

    pub fn confirm_shipment(&self, shipment: Shipment) -> Result<ConfirmingResponseShipment, ApiError> {
        self.confirm_shipments(vec![shipment])?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::DeserializationError("confirmation response has no shipments".to_string()))
    }

    pub fn confirm_shipments(&self, shipments: Vec<Shipment>) -> Result<Vec<ConfirmingResponseShipment>, ApiError> {
        let request = Confirming::new(self.config.customer.clone(), Message::new(), shipments);
        let response = self.execute(self.confirming.build_confirm(&request)?)?;
        self.confirming.parse_confirm(response)
    }

    pub fn get_delivery_date(&self, delivery_date: GetDeliveryDate) -> Result<GetDeliveryDateResponse, ApiError> {
        let request = GetDeliveryDateRequest {
            get_delivery_date: delivery_date,
            message: Message::new(),
        };
        let response = self.execute(self.delivery_date.build_get_delivery_date(&request)?)?;
        self.delivery_date.parse_get_delivery_date(response)
    }

    pub fn get_sent_date(&self, sent_date: GetSentDate) -> Result<GetSentDateResponse, ApiError> {
        let request = GetSentDateRequest {
            get_sent_date: sent_date,
            message: Message::new(),
        };
        let response = self.execute(self.delivery_date.build_get_sent_date(&request)?)?;
        self.delivery_date.parse_get_sent_date(response)
    }

    pub fn get_nearest_locations(&self, country: &str, location: Location) -> Result<Vec<ResponseLocation>, ApiError> {
        let request = GetNearestLocations {
            countrycode: CountryCode::new(country)?,
            location,
            message: Message::new(),
        };
        let response = self.execute(self.location.build_get_nearest_locations(&request)?)?;
        self.location.parse_get_nearest_locations(response)
    }

    pub fn get_locations_in_area(&self, country: &str, location: Location) -> Result<Vec<ResponseLocation>, ApiError> {
        let request = GetLocationsInArea {
            countrycode: CountryCode::new(country)?,
            location,
            message: Message::new(),
        };
        let response = self.execute(self.location.build_get_locations_in_area(&request)?)?;
        self.location.parse_get_locations_in_area(response)
    }

    pub fn get_location(&self, location_code: &str, retail_network_id: &str) -> Result<ResponseLocation, ApiError> {
        let request = GetLocation {
            location_code: location_code.to_string(),
            message: Message::new(),
            retail_network_id: retail_network_id.to_string(),
        };
        let response = self.execute(self.location.build_get_location(&request)?)?;
        self.location.parse_get_location(response)
    }

    pub fn get_timeframes(&self, timeframe: Timeframe) -> Result<GetTimeframesResponse, ApiError> {
        let request = GetTimeframes {
            message: Message::new(),
            timeframe,
        };
        let response = self.execute(self.timeframe.build_get_timeframes(&request)?)?;
        self.timeframe.parse_get_timeframes(response)
    }

    pub fn get_current_status(&self, barcode: &str) -> Result<StatusShipment, ApiError> {
        let request = self.shipping_status.build_current_status(&CurrentStatus::new(barcode)?);
        first_shipment(self.shipping_status.parse_status(self.execute(request)?)?)
    }

    /// All shipments the configured customer registered under `reference`.
    pub fn get_current_status_by_reference(&self, reference: &str) -> Result<Vec<StatusShipment>, ApiError> {
        let lookup = CurrentStatusByReference::new(reference, self.config.customer.identity())?;
        let request = self.shipping_status.build_current_status_by_reference(&lookup, false)?;
        self.shipping_status.parse_status(self.execute(request)?)
    }

    pub fn get_complete_status(&self, barcode: &str) -> Result<StatusShipment, ApiError> {
        let request = self.shipping_status.build_complete_status(&CompleteStatus::new(barcode)?);
        first_shipment(self.shipping_status.parse_status(self.execute(request)?)?)
    }

    pub fn get_signature(&self, barcode: &str) -> Result<Signature, ApiError> {
        let request = self.shipping_status.build_get_signature(&GetSignature::new(barcode)?);
        self.shipping_status.parse_get_signature(self.execute(request)?)
    }

    pub fn validate_address(&self, address: &AddressCheck) -> Result<Vec<ValidatedAddress>, ApiError> {
        let response = self.execute(self.address_check.build_validate_address(address)?)?;
        self.address_check.parse_validate_address(response)
    }
}

fn first_shipment(shipments: Vec<StatusShipment>) -> Result<StatusShipment, ApiError> {
    shipments
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("no shipment found".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use super::*;
    use crate::config::ApiMode;
    use crate::entity::{Address, Coordinates, Customer};
    use crate::http::HttpMethod;

    fn config() -> ClientConfig {
        ClientConfig::new("test-key", Customer::new("DEVC", "11223344")).with_base_url("http://mock")
    }

    type Seen = Arc<Mutex<Vec<HttpRequest>>>;

    /// Records every request and answers with `body`.
    fn recording(status: u16, body: &'static str) -> (impl Transport, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let transport = move |request: HttpRequest| -> Result<HttpResponse, ApiError> {
            log.lock().unwrap().push(request);
            Ok(HttpResponse::new(status, body))
        };
        (transport, seen)
    }

    #[test]
    fn generate_barcode_defaults_range_and_serie() {
        let (transport, seen) = recording(200, r#"{"Barcode":"3SDEVC816223392"}"#);
        let client = PostNlClient::new(config(), transport);
        assert_eq!(client.generate_barcode("3S", None, None, false).unwrap(), "3SDEVC816223392");
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert!(seen[0].url.ends_with("&Type=3S&Serie=987000000-987600000&Range=DEVC"));
    }

    #[test]
    fn barcodes_by_country_issue_one_request_each() {
        let (transport, seen) = recording(200, r#"{"Barcode":"3SDEVC816223392"}"#);
        let client = PostNlClient::new(config(), transport);
        let barcodes = client
            .generate_barcodes_by_country_codes(&[("nl", 2), ("BE", 1)])
            .unwrap();
        assert_eq!(barcodes["NL"].len(), 2);
        assert_eq!(barcodes["BE"].len(), 1);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn transport_errors_propagate() {
        let client = PostNlClient::new(config(), |_request: HttpRequest| -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        });
        assert!(matches!(
            client.get_current_status("3SDEVC201611210").unwrap_err(),
            ApiError::Transport(_)
        ));
    }

    #[test]
    fn invalid_input_never_reaches_the_transport() {
        let (transport, seen) = recording(200, "{}");
        let client = PostNlClient::new(config(), transport);
        assert!(client.get_signature("not a barcode").is_err());
        assert!(client.generate_barcode("3", None, None, false).is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn confirm_shipment_returns_the_single_result() {
        let (transport, seen) = recording(200, r#"{"ResponseShipments":[{"Barcode":"3SDEVC201611210"}]}"#);
        let client = PostNlClient::new(config().with_mode(ApiMode::Rest), transport);
        let receiver = Address::receiver()
            .with_name(None, "Peeters")
            .with_locality("2132WT", "Hoofddorp", "NL")
            .unwrap();
        let shipment = Shipment::new(receiver).with_barcode("3SDEVC201611210").unwrap();
        let confirmed = client.confirm_shipment(shipment).unwrap();
        assert_eq!(confirmed.barcode.as_deref(), Some("3SDEVC201611210"));
        assert_eq!(seen.lock().unwrap()[0].method, HttpMethod::Post);
    }

    #[test]
    fn get_sent_date_queries_shipping_endpoint() {
        let (transport, seen) = recording(200, r#"{"SentDate":"29-06-2016","Options":{"string":["Daytime"]}}"#);
        let client = PostNlClient::new(config(), transport);
        let delivery = NaiveDate::from_ymd_opt(2016, 6, 30).unwrap();
        let sent = client
            .get_sent_date(GetSentDate::new("2132 wt", "NL", delivery).unwrap())
            .unwrap();
        assert_eq!(sent.sent_date, NaiveDate::from_ymd_opt(2016, 6, 29).unwrap());
        assert_eq!(sent.options.0, vec!["Daytime"]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(
            seen[0].url,
            "http://mock/shipment/v2_2/calculate/date/shipping?ShippingDuration=1&DeliveryDate=30-06-2016\
             &CountryCode=NL&PostalCode=2132WT"
        );
    }

    #[test]
    fn get_nearest_locations_returns_every_location() {
        let (transport, seen) = recording(
            200,
            r#"{"GetLocationsResult":{"ResponseLocation":[
                {"LocationCode":"161503","Name":"Primera Sanders","Distance":312},
                {"LocationCode":"170921","Name":"Albert Heijn"}
            ]}}"#,
        );
        let client = PostNlClient::new(config(), transport);
        let locations = client
            .get_nearest_locations("nl", Location::near_postcode("2132WT", "NL").unwrap())
            .unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].distance, Some(312));
        assert_eq!(locations[1].name.as_deref(), Some("Albert Heijn"));
        assert_eq!(
            seen.lock().unwrap()[0].url,
            "http://mock/shipment/v2_1/locations/nearest?CountryCode=NL&PostalCode=2132WT&DeliveryOptions=PG"
        );
    }

    #[test]
    fn get_locations_in_area_sends_both_corners() {
        let (transport, seen) = recording(
            200,
            r#"{"GetLocationsResult":{"ResponseLocation":{"LocationCode":"161503","Name":"Primera Sanders"}}}"#,
        );
        let client = PostNlClient::new(config(), transport);
        let area = Location::in_area(
            Coordinates::new(52.156439, 5.015643).unwrap(),
            Coordinates::new(52.017473, 5.065254).unwrap(),
        );
        let locations = client.get_locations_in_area("NL", area).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].location_code.as_deref(), Some("161503"));
        assert_eq!(
            seen.lock().unwrap()[0].url,
            "http://mock/shipment/v2_1/locations/area?LatitudeNorth=52.156439&LongitudeWest=5.015643\
             &LatitudeSouth=52.017473&LongitudeEast=5.065254&CountryCode=NL&DeliveryOptions=PG"
        );
    }

    #[test]
    fn get_location_looks_up_by_code() {
        let (transport, seen) = recording(
            200,
            r#"{"GetLocationsResult":{"ResponseLocation":{"LocationCode":161503,"RetailNetworkID":"PNPNL-01"}}}"#,
        );
        let client = PostNlClient::new(config(), transport);
        let location = client.get_location("161503", "PNPNL-01").unwrap();
        assert_eq!(location.location_code.as_deref(), Some("161503"));
        assert_eq!(location.retail_network_id.as_deref(), Some("PNPNL-01"));
        assert_eq!(
            seen.lock().unwrap()[0].url,
            "http://mock/shipment/v2_1/locations/lookup?LocationCode=161503&RetailNetworkID=PNPNL-01"
        );
    }

    #[test]
    fn status_by_reference_uses_configured_customer() {
        let (transport, seen) = recording(
            200,
            r#"{"CurrentStatus":{"Shipment":[
                {"Barcode":"3SDEVC201611210","Reference":"order-1"},
                {"Barcode":"3SDEVC201611211","Reference":"order-1"}
            ]}}"#,
        );
        let client = PostNlClient::new(config(), transport);
        let shipments = client.get_current_status_by_reference("order-1").unwrap();
        assert_eq!(shipments.len(), 2);
        assert_eq!(shipments[1].barcode.as_deref(), Some("3SDEVC201611211"));
        assert_eq!(
            seen.lock().unwrap()[0].url,
            "http://mock/shipment/v2/status/reference/order-1\
             ?customerCode=DEVC&customerNumber=11223344&detail=false&language=NL"
        );
    }

    #[test]
    fn get_signature_returns_the_image() {
        let (transport, seen) = recording(
            200,
            r#"{"Signature":{"Barcode":"3SDEVC201611210","SignatureDate":"30-06-2016 12:00:00","SignatureImage":"iVBORw0K"}}"#,
        );
        let client = PostNlClient::new(config(), transport);
        let signature = client.get_signature("3SDEVC201611210").unwrap();
        assert_eq!(signature.barcode.as_deref(), Some("3SDEVC201611210"));
        assert_eq!(signature.signature_image.as_deref(), Some("iVBORw0K"));
        assert!(signature.signature_date.is_some());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "http://mock/shipment/v2/status/signature/3SDEVC201611210");
    }
}
