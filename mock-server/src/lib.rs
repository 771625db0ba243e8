//! In-memory emulation of a subset of the PostNL API.
//!
//! Covers REST and SOAP barcode generation, shipment confirmation, status by
//! barcode (backed by the confirmed shipments), delivery date calculation,
//! timeframes and the national address check. Every route requires the
//! `apikey` header to equal [`API_KEY`]; anything else gets the gateway's 401
//! fault body.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, Weekday};
use quick_xml::{escape::escape, events::Event, Reader};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const API_KEY: &str = "mock-api-key";

const DATE_FORMAT: &str = "%d-%m-%Y";
const DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Longest date range the timeframe route answers for.
const MAX_TIMEFRAME_DAYS: u64 = 31;

/// Largest `ShippingDuration` the delivery date route accepts.
const MAX_SHIPPING_DURATION: u32 = 14;

#[derive(Debug, Default)]
pub struct MockState {
    next_serial: u64,
    /// Confirmed shipments by barcode, as received.
    shipments: HashMap<String, Value>,
}

impl MockState {
    fn next_barcode(&mut self, barcode_type: &str, range: &str) -> String {
        self.next_serial += 1;
        format!("{barcode_type}{range}{:09}", self.next_serial)
    }
}

pub type Db = Arc<RwLock<MockState>>;

type Params = Vec<(String, String)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(MockState::default()));
    Router::new()
        .route("/shipment/v1_1/barcode", get(rest_barcode))
        .route("/shipment/v1_1/barcode/soap.asmx", post(soap_barcode))
        .route("/shipment/v2/confirm", post(confirm))
        .route("/shipment/v2/status/barcode/{barcode}", get(status_by_barcode))
        .route("/shipment/v2_2/calculate/date/delivery", get(delivery_date))
        .route("/shipment/v2_1/calculate/timeframes", get(timeframes))
        .route("/address/national/v1/validate", post(validate_address))
        .layer(middleware::from_fn(require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let key = request.headers().get("apikey").and_then(|v| v.to_str().ok());
    if key == Some(API_KEY) {
        return next.run(request).await;
    }
    warn!(path = %request.uri().path(), "rejected request with invalid API key");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "fault": {
                "faultstring": "Invalid ApiKey",
                "detail": {"errorcode": "oauth.v2.InvalidApiKey"}
            }
        })),
    )
        .into_response()
}

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

fn params_all<'a>(params: &'a Params, name: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .collect()
}

/// CIF-style error body.
fn cif_error(status: StatusCode, number: u32, message: &str) -> Response {
    (
        status,
        Json(json!({"Errors": [{"ErrorMsg": message, "ErrorNumber": number}]})),
    )
        .into_response()
}

fn now() -> String {
    Local::now().naive_local().format(DATETIME_FORMAT).to_string()
}

async fn rest_barcode(State(db): State<Db>, Query(params): Query<Params>) -> Response {
    for required in ["CustomerCode", "CustomerNumber", "Type", "Range"] {
        if param(&params, required).is_none() {
            return cif_error(StatusCode::BAD_REQUEST, 1, &format!("{required} is required"));
        }
    }
    let (Some(barcode_type), Some(range)) = (param(&params, "Type"), param(&params, "Range")) else {
        return cif_error(StatusCode::BAD_REQUEST, 1, "Type and Range are required");
    };
    let barcode = db.write().await.next_barcode(barcode_type, range);
    info!(%barcode, "generated barcode");
    Json(json!({"Barcode": barcode})).into_response()
}

/// Unescaped text of every text-bearing element, keyed by local name.
/// The first occurrence of a name wins.
fn element_texts(xml: &str) -> Result<HashMap<String, String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut open: Vec<String> = Vec::new();
    let mut texts = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(start) => open.push(String::from_utf8_lossy(start.local_name().as_ref()).into_owned()),
            Event::End(_) => {
                open.pop();
            }
            Event::Text(text) => {
                if let Some(name) = open.last() {
                    let value = text.unescape()?.into_owned();
                    texts.entry(name.clone()).or_insert(value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(texts)
}

fn soap_client_fault(message: &str) -> Response {
    soap_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!(
            "<s:Fault><faultcode>s:Client</faultcode><faultstring>{}</faultstring></s:Fault>",
            escape(message)
        ),
    )
}

fn soap_response(status: StatusCode, body: &str) -> Response {
    let envelope = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>{body}</s:Body></s:Envelope>"#
    );
    (status, [(header::CONTENT_TYPE, "text/xml; charset=utf-8")], envelope).into_response()
}

async fn soap_barcode(State(db): State<Db>, headers: HeaderMap, body: String) -> Response {
    let action = headers.get("soapaction").and_then(|v| v.to_str().ok()).unwrap_or_default();
    if !action.ends_with("/GenerateBarcode\"") {
        return soap_client_fault("Unknown SOAPAction");
    }
    let fields = match element_texts(&body) {
        Ok(fields) => fields,
        Err(e) => {
            warn!(error = %e, "malformed SOAP envelope");
            return soap_client_fault(&format!("Malformed envelope: {e}"));
        }
    };
    let (Some(barcode_type), Some(range)) = (fields.get("Type"), fields.get("Range")) else {
        return soap_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<s:Fault><faultcode>s:Client</faultcode><faultstring>Check failed</faultstring>\
             <detail><CifException xmlns=\"http://postnl.nl/cif/services/common/\"><Errors><ExceptionData>\
             <Description>Barcode type and range are required</Description>\
             <ErrorMsg>Barcode type and range are required</ErrorMsg><ErrorNumber>1</ErrorNumber>\
             </ExceptionData></Errors></CifException></detail></s:Fault>",
        );
    };
    let barcode = db.write().await.next_barcode(barcode_type, range);
    info!(%barcode, "generated barcode over SOAP");
    soap_response(
        StatusCode::OK,
        &format!(
            "<GenerateBarcodeResponse xmlns=\"http://postnl.nl/cif/services/BarcodeWebService/\"><Barcode>{}</Barcode></GenerateBarcodeResponse>",
            escape(&barcode)
        ),
    )
}

async fn confirm(State(db): State<Db>, Json(body): Json<Value>) -> Response {
    let Some(shipments) = body.get("Shipments").and_then(Value::as_array) else {
        return cif_error(StatusCode::BAD_REQUEST, 2, "Shipments are required");
    };
    let mut confirmed = Vec::with_capacity(shipments.len());
    for shipment in shipments {
        let Some(barcode) = shipment.get("Barcode").and_then(Value::as_str) else {
            return cif_error(StatusCode::BAD_REQUEST, 3, "Barcode is required");
        };
        confirmed.push((barcode.to_string(), shipment.clone()));
    }
    let mut state = db.write().await;
    let response: Vec<Value> = confirmed
        .into_iter()
        .map(|(barcode, shipment)| {
            info!(%barcode, "confirmed shipment");
            state.shipments.insert(barcode.clone(), shipment);
            json!({"Barcode": barcode, "Warnings": null})
        })
        .collect();
    Json(json!({"ResponseShipments": response})).into_response()
}

fn status_shipment(barcode: &str, shipment: &Value, complete: bool) -> Value {
    let timestamp = now();
    let mut out = json!({
        "Barcode": barcode,
        "Address": shipment.get("Addresses").cloned().unwrap_or(Value::Null),
        "ProductCode": shipment.get("ProductCodeDelivery").cloned().unwrap_or(Value::Null),
        "Reference": shipment.get("Reference").cloned().unwrap_or(Value::Null),
        "Status": {
            "PhaseCode": "1",
            "PhaseDescription": "Collectie",
            "StatusCode": "1",
            "StatusDescription": "Zending is voorgemeld",
            "TimeStamp": timestamp
        }
    });
    if complete {
        out["Event"] = json!([{"Code": "A01", "Description": "Zending is voorgemeld", "TimeStamp": timestamp}]);
        out["OldStatus"] = json!([{
            "Code": "1",
            "Description": "Zending is voorgemeld",
            "PhaseCode": "1",
            "PhaseDescription": "Collectie",
            "TimeStamp": timestamp
        }]);
    }
    out
}

async fn status_by_barcode(
    State(db): State<Db>,
    Path(barcode): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    let complete = param(&params, "detail") == Some("true");
    let state = db.read().await;
    let Some(shipment) = state.shipments.get(&barcode) else {
        return Json(json!({
            "Warnings": [{"Code": "No shipment found", "Message": "Geen zending gevonden"}]
        }))
        .into_response();
    };
    let key = if complete { "CompleteStatus" } else { "CurrentStatus" };
    Json(json!({ key: {"Shipment": status_shipment(&barcode, shipment, complete)} })).into_response()
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

/// `days` delivery days after `date`; the network does not deliver on Sunday.
fn add_delivery_days(mut date: NaiveDate, days: u32) -> Option<NaiveDate> {
    let mut remaining = days;
    while remaining > 0 {
        date = next_day(date)?;
        if date.weekday() != Weekday::Sun {
            remaining -= 1;
        }
    }
    Some(date)
}

const KNOWN_OPTIONS: &[&str] = &["Daytime", "Evening", "Morning", "Noon", "Sunday", "Sameday", "Afternoon"];

fn unknown_option<'a>(options: &[&'a str]) -> Option<&'a str> {
    options.iter().copied().find(|o| !KNOWN_OPTIONS.contains(o))
}

async fn delivery_date(Query(params): Query<Params>) -> Response {
    let shipping = param(&params, "ShippingDate")
        .and_then(|raw| NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).ok());
    let Some(shipping) = shipping else {
        return cif_error(StatusCode::BAD_REQUEST, 10, "ShippingDate is required as dd-mm-yyyy hh:mm:ss");
    };
    let mut options = params_all(&params, "Options");
    if let Some(option) = unknown_option(&options) {
        return cif_error(
            StatusCode::BAD_REQUEST,
            26,
            &format!("Unknown option GetDeliveryDate.Options='{option}' specified"),
        );
    }
    if options.is_empty() {
        options.push("Daytime");
    }
    let duration = match param(&params, "ShippingDuration").map(str::parse::<u32>) {
        None => 1,
        Some(Ok(days)) if (1..=MAX_SHIPPING_DURATION).contains(&days) => days,
        Some(_) => {
            return cif_error(
                StatusCode::BAD_REQUEST,
                12,
                &format!("ShippingDuration must be between 1 and {MAX_SHIPPING_DURATION}"),
            )
        }
    };
    let Some(delivery) = add_delivery_days(shipping.date(), duration) else {
        return cif_error(StatusCode::BAD_REQUEST, 10, "ShippingDate is out of range");
    };
    Json(json!({
        "DeliveryDate": delivery.format(DATE_FORMAT).to_string(),
        "Options": {"string": options}
    }))
    .into_response()
}

fn slot(option: &str) -> Option<Value> {
    let (from, to) = match option {
        "Morning" => ("08:00:00", "12:00:00"),
        "Daytime" => ("14:30:00", "17:00:00"),
        "Evening" => ("18:00:00", "22:00:00"),
        _ => return None,
    };
    Some(json!({"From": from, "To": to, "Options": {"string": option}}))
}

async fn timeframes(Query(params): Query<Params>) -> Response {
    let date = |name: &str| param(&params, name).and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok());
    let (Some(start), Some(end)) = (date("StartDate"), date("EndDate")) else {
        return cif_error(StatusCode::BAD_REQUEST, 10, "StartDate and EndDate are required as dd-mm-yyyy");
    };
    if end < start || (end - start).num_days() as u64 > MAX_TIMEFRAME_DAYS {
        return cif_error(StatusCode::BAD_REQUEST, 11, "EndDate must be within 31 days after StartDate");
    }
    let mut options = params_all(&params, "Options");
    if options.is_empty() {
        options.push("Daytime");
    }
    let slots: Vec<Value> = options.iter().filter_map(|o| slot(o)).collect();

    let mut days = Vec::new();
    let mut reasons = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current.filter(|d| *d <= end) {
        let formatted = day.format(DATE_FORMAT).to_string();
        if day.weekday() == Weekday::Sun {
            reasons.push(json!({
                "Code": "01",
                "Date": formatted,
                "Description": "Dag uitgesloten van tijdvak",
                "Options": {"string": options}
            }));
        } else {
            days.push(json!({"Date": formatted, "Timeframes": {"TimeframeTimeFrame": slots}}));
        }
        current = next_day(day);
    }
    Json(json!({
        "ReasonNoTimeframes": {"ReasonNoTimeframe": reasons},
        "Timeframes": {"Timeframe": days}
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressCheckRequest {
    pub postal_code: String,
    pub house_number: String,
    #[serde(default)]
    pub addition: Option<String>,
}

/// Addresses the mock knows: postal code, house number, street, city.
const KNOWN_ADDRESSES: &[(&str, &str, &str, &str)] = &[
    ("2132WT", "42", "Siriusdreef", "HOOFDDORP"),
    ("3521AZ", "1", "Prinses Beatrixlaan", "UTRECHT"),
];

async fn validate_address(Json(request): Json<AddressCheckRequest>) -> Response {
    let postal_code = request.postal_code.replace(' ', "").to_ascii_uppercase();
    let matches: Vec<Value> = KNOWN_ADDRESSES
        .iter()
        .filter(|(code, number, _, _)| *code == postal_code && *number == request.house_number)
        .map(|(code, number, street, city)| {
            json!({
                "Addition": request.addition,
                "City": city,
                "FormattedAddress": [format!("{street} {number}"), format!("{} {} {city}", &code[..4], &code[4..])],
                "HouseNumber": number.parse::<u32>().unwrap_or_default(),
                "PostalCode": code,
                "Street": street
            })
        })
        .collect();
    Json(Value::Array(matches)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_texts_strip_prefixes() {
        let xml = "<domain:Barcode><domain:Range>DEVC</domain:Range><domain:Type>3S</domain:Type></domain:Barcode>";
        let texts = element_texts(xml).unwrap();
        assert_eq!(texts.get("Type").map(String::as_str), Some("3S"));
        assert_eq!(texts.get("Range").map(String::as_str), Some("DEVC"));
        assert!(!texts.contains_key("Serie"));
        assert_eq!(element_texts("<Type>2S</Type>").unwrap()["Type"], "2S");
    }

    #[test]
    fn element_texts_read_attributed_tags_and_unescape() {
        let xml = r#"<d:Barcode xmlns:d="x"><d:Type xmlns:d="x">3S</d:Type><d:Range>A&amp;B</d:Range></d:Barcode>"#;
        let texts = element_texts(xml).unwrap();
        assert_eq!(texts["Type"], "3S");
        assert_eq!(texts["Range"], "A&B");
    }

    #[test]
    fn element_texts_reject_mismatched_tags() {
        assert!(element_texts("<a:Type>3S</a:Range>").is_err());
    }

    #[test]
    fn delivery_days_skip_sunday() {
        let saturday = NaiveDate::from_ymd_opt(2016, 7, 2).unwrap();
        assert_eq!(add_delivery_days(saturday, 1), NaiveDate::from_ymd_opt(2016, 7, 4));
        let wednesday = NaiveDate::from_ymd_opt(2016, 6, 29).unwrap();
        assert_eq!(add_delivery_days(wednesday, 1), NaiveDate::from_ymd_opt(2016, 6, 30));
    }

    #[test]
    fn barcodes_are_sequential() {
        let mut state = MockState::default();
        assert_eq!(state.next_barcode("3S", "DEVC"), "3SDEVC000000001");
        assert_eq!(state.next_barcode("3S", "DEVC"), "3SDEVC000000002");
    }

    #[test]
    fn unknown_options_are_detected() {
        assert_eq!(unknown_option(&["Daytime", "Foo"]), Some("Foo"));
        assert_eq!(unknown_option(&["Evening"]), None);
    }
}
