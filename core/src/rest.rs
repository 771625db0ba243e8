//! REST request assembly and response decoding shared by all services.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::de;
use crate::error::{ApiError, CifErrorDetail};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, QueryParams};

fn base_headers(api_key: &str) -> Vec<(String, String)> {
    vec![
        ("apikey".to_string(), api_key.to_string()),
        ("accept".to_string(), "application/json".to_string()),
    ]
}

pub(crate) fn get(endpoint: &str, path: &str, api_key: &str, query: &QueryParams) -> HttpRequest {
    let url = if query.is_empty() {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}{path}?{}", query.encode())
    };
    debug!(%url, "built REST GET request");
    HttpRequest {
        method: HttpMethod::Get,
        url,
        headers: base_headers(api_key),
        body: None,
    }
}

pub(crate) fn post_json<T: Serialize>(
    endpoint: &str,
    path: &str,
    api_key: &str,
    payload: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let mut headers = base_headers(api_key);
    headers.push(("content-type".to_string(), "application/json".to_string()));
    let url = format!("{endpoint}{path}");
    debug!(%url, bytes = body.len(), "built REST POST request");
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url,
        headers,
        body: Some(body),
    })
}

#[derive(Deserialize)]
struct GatewayFault {
    #[serde(default)]
    faultstring: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    #[serde(rename = "Error", alias = "Item", default, deserialize_with = "de::one_or_many")]
    errors: Vec<CifErrorDetail>,
}

/// Error entries in any of the shapes the REST endpoints use.
fn cif_errors(body: &Value) -> Option<Vec<CifErrorDetail>> {
    let raw = body.get("Errors").or_else(|| body.get("Array"))?;
    if raw.is_null() {
        return None;
    }
    let errors = match raw {
        Value::Array(_) => serde_json::from_value::<Vec<CifErrorDetail>>(raw.clone()).ok()?,
        Value::Object(map) if map.contains_key("Error") || map.contains_key("Item") => {
            serde_json::from_value::<ErrorWrapper>(raw.clone()).ok()?.errors
        }
        Value::Object(_) => vec![serde_json::from_value::<CifErrorDetail>(raw.clone()).ok()?],
        _ => return None,
    };
    (!errors.is_empty()).then_some(errors)
}

/// Maps an error-carrying response to the most specific `ApiError`.
///
/// Returns `None` for a 2xx response without an error payload.
pub(crate) fn response_error(response: &HttpResponse) -> Option<ApiError> {
    let body: Option<Value> = serde_json::from_str(&response.body).ok();

    if let Some(fault) = body.as_ref().and_then(|b| b.get("fault")) {
        let message = serde_json::from_value::<GatewayFault>(fault.clone())
            .ok()
            .and_then(|f| f.faultstring)
            .unwrap_or_else(|| "request rejected by gateway".to_string());
        warn!(status = response.status, %message, "API gateway fault");
        return Some(ApiError::NotAuthorized(message));
    }
    if matches!(response.status, 401 | 403) {
        return Some(ApiError::NotAuthorized(response.body.clone()));
    }
    if let Some(errors) = body.as_ref().and_then(cif_errors) {
        warn!(status = response.status, count = errors.len(), "API reported errors");
        return Some(ApiError::Cif(errors));
    }
    if response.status == 404 {
        return Some(ApiError::NotFound(response.body.clone()));
    }
    if !response.is_success() {
        return Some(ApiError::HttpError {
            status: response.status,
            body: response.body.clone(),
        });
    }
    None
}

/// Checks for errors, then decodes the JSON body into `T`.
pub(crate) fn parse<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    if let Some(err) = response_error(response) {
        return Err(err);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Barcode {
        #[serde(rename = "Barcode")]
        barcode: String,
    }

    #[test]
    fn get_appends_encoded_query_and_auth_headers() {
        let mut query = QueryParams::new();
        query.push("Type", "3S").push("Range", "DEVC");
        let req = get("https://api.postnl.nl", "/shipment/v1_1/barcode", "key", &query);
        assert_eq!(req.url, "https://api.postnl.nl/shipment/v1_1/barcode?Type=3S&Range=DEVC");
        assert_eq!(req.header("apikey"), Some("key"));
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.body.is_none());
    }

    #[test]
    fn post_json_sets_content_type() {
        let req = post_json("http://x", "/p", "key", &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn gateway_fault_is_not_authorized() {
        let response = HttpResponse::new(
            401,
            r#"{"fault":{"faultstring":"Invalid ApiKey","detail":{"errorcode":"oauth.v2.InvalidApiKey"}}}"#,
        );
        let err = parse::<Barcode>(&response).unwrap_err();
        assert!(matches!(err, ApiError::NotAuthorized(msg) if msg == "Invalid ApiKey"));
    }

    #[test]
    fn errors_array_is_cif() {
        let response = HttpResponse::new(400, r#"{"Errors":[{"Code":"1","Description":"Barcode is required"}]}"#);
        let err = parse::<Barcode>(&response).unwrap_err();
        match err {
            ApiError::Cif(details) => assert_eq!(details[0].text(), "Barcode is required"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn array_item_shape_is_cif() {
        let response = HttpResponse::new(
            400,
            r#"{"Array":{"Item":{"ErrorMsg":"Unknown option GetDeliveryDate.Options='Foo' specified","ErrorNumber":26}}}"#,
        );
        let err = parse::<Barcode>(&response).unwrap_err();
        assert!(matches!(&err, ApiError::Cif(d) if d[0].code.as_deref() == Some("26")));
    }

    #[test]
    fn wrapped_error_object_is_cif() {
        let response = HttpResponse::new(
            200,
            r#"{"Errors":{"Error":{"ErrorMsg":"Check failed","ErrorNumber":"13"}}}"#,
        );
        assert!(matches!(parse::<Barcode>(&response).unwrap_err(), ApiError::Cif(_)));
    }

    #[test]
    fn entry_with_both_code_spellings_is_cif() {
        let response = HttpResponse::new(
            400,
            r#"{"Errors":[{"Code":"13","ErrorNumber":"13","ErrorMsg":"Check failed"}]}"#,
        );
        match parse::<Barcode>(&response).unwrap_err() {
            ApiError::Cif(details) => {
                assert_eq!(details[0].code.as_deref(), Some("13"));
                assert_eq!(details[0].text(), "Check failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn plain_statuses_map_to_not_found_and_http_error() {
        assert!(matches!(
            parse::<Barcode>(&HttpResponse::new(404, "")).unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            parse::<Barcode>(&HttpResponse::new(503, "upstream down")).unwrap_err(),
            ApiError::HttpError { status: 503, .. }
        ));
    }

    #[test]
    fn success_decodes_and_bad_json_is_deserialization_error() {
        let ok = parse::<Barcode>(&HttpResponse::new(200, r#"{"Barcode":"3SDEVC816223392"}"#)).unwrap();
        assert_eq!(ok.barcode, "3SDEVC816223392");
        assert!(matches!(
            parse::<Barcode>(&HttpResponse::new(200, "not json")).unwrap_err(),
            ApiError::DeserializationError(_)
        ));
    }

    #[test]
    fn null_errors_field_is_ignored() {
        let ok = parse::<Barcode>(&HttpResponse::new(200, r#"{"Barcode":"3SDEVC816223392","Errors":null}"#));
        assert!(ok.is_ok());
    }
}
