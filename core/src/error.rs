//! Error types for the PostNL API client.
//!
//! # Design
//! Input problems (`InvalidArgument`, `InvalidBarcode`, `InvalidConfiguration`)
//! are raised before anything is sent. Everything else describes what came
//! back: errors reported by the remote API land in `Cif` with the provider's
//! own codes, while responses that could not be understood at all keep the raw
//! status code and body for debugging.

use serde::Deserialize;
use thiserror::Error;

use crate::de;

/// One error entry as reported by the provider ("CIF" exception data).
///
/// REST endpoints report `{"Code", "Description"}` or
/// `{"ErrorMsg", "ErrorNumber"}`; SOAP faults carry all three of
/// `Description`, `ErrorMsg` and `ErrorNumber`. Entries may carry both
/// spellings at once, in which case `ErrorNumber` and `ErrorMsg` win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCifErrorDetail")]
pub struct CifErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCifErrorDetail {
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    error_number: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_lenient")]
    code: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawCifErrorDetail> for CifErrorDetail {
    fn from(raw: RawCifErrorDetail) -> Self {
        Self {
            code: raw.error_number.or(raw.code),
            message: raw.error_msg.or(raw.message),
            description: raw.description,
        }
    }
}

impl CifErrorDetail {
    /// The most specific human readable text available.
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("unknown error")
    }
}

/// Errors returned by request builders, response parsers and the facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request field failed validation before the request was built.
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// No barcode serie exists for the requested type/range combination.
    #[error("invalid barcode request: {0}")]
    InvalidBarcode(String),

    /// The client configuration lacks something the operation needs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The API key was rejected.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The requested shipment, location or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote API reported one or more errors.
    #[error("remote API error: {}", join_details(.0))]
    Cif(Vec<CifErrorDetail>),

    /// A SOAP fault without CIF exception details.
    #[error("SOAP fault {code}: {message}")]
    SoapFault { code: String, message: String },

    /// The server returned a non-2xx status that carried no known error shape.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The host transport failed to complete the exchange.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ApiError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

fn join_details(details: &[CifErrorDetail]) -> String {
    if details.is_empty() {
        return "no details".to_string();
    }
    details
        .iter()
        .map(|d| match &d.code {
            Some(code) => format!("[{code}] {}", d.text()),
            None => d.text().to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cif_error_display_joins_details() {
        let err = ApiError::Cif(vec![
            CifErrorDetail {
                code: Some("13".to_string()),
                message: Some("Check failed".to_string()),
                description: None,
            },
            CifErrorDetail {
                code: None,
                message: None,
                description: Some("Invalid zipcode".to_string()),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "remote API error: [13] Check failed; Invalid zipcode"
        );
    }

    #[test]
    fn cif_detail_accepts_numeric_error_number() {
        let detail: CifErrorDetail =
            serde_json::from_str(r#"{"ErrorMsg":"Unknown option","ErrorNumber":26}"#).unwrap();
        assert_eq!(detail.code.as_deref(), Some("26"));
        assert_eq!(detail.text(), "Unknown option");
    }

    #[test]
    fn cif_detail_accepts_rest_code_description() {
        let detail: CifErrorDetail =
            serde_json::from_str(r#"{"Code":"1","Description":"Barcode is required"}"#).unwrap();
        assert_eq!(detail.code.as_deref(), Some("1"));
        assert_eq!(detail.text(), "Barcode is required");
    }

    #[test]
    fn cif_detail_merges_both_spellings() {
        let detail: CifErrorDetail = serde_json::from_str(
            r#"{"Code":"13","ErrorNumber":"13","ErrorMsg":"Check failed","Message":"ignored"}"#,
        )
        .unwrap();
        assert_eq!(detail.code.as_deref(), Some("13"));
        assert_eq!(detail.text(), "Check failed");
    }
}
