//! Client configuration.
//!
//! Values come either from a deserialized document (any serde format the host
//! prefers) or from `POSTNL_*` environment variables via
//! [`ClientConfig::from_env`].

use serde::Deserialize;

use crate::entity::Customer;
use crate::error::ApiError;

pub const PRODUCTION_URL: &str = "https://api.postnl.nl";
pub const SANDBOX_URL: &str = "https://api-sandbox.postnl.nl";

/// Which wire protocol services use where the provider offers both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    #[default]
    Rest,
    Soap,
}

impl std::str::FromStr for ApiMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(ApiMode::Rest),
            "soap" => Ok(ApiMode::Soap),
            other => Err(ApiError::InvalidConfiguration(format!(
                "unknown API mode '{other}', expected 'rest' or 'soap'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default)]
    pub mode: ApiMode,
    /// Overrides the production/sandbox host, e.g. for a local mock server.
    #[serde(default)]
    pub base_url: Option<String>,
    pub customer: Customer,
    #[serde(default)]
    pub globalpack_barcode_type: Option<String>,
    #[serde(default)]
    pub globalpack_customer_code: Option<String>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, customer: Customer) -> Self {
        Self {
            api_key: api_key.into(),
            sandbox: false,
            mode: ApiMode::Rest,
            base_url: None,
            customer,
            globalpack_barcode_type: None,
            globalpack_customer_code: None,
        }
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_mode(mut self, mode: ApiMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn with_globalpack(mut self, barcode_type: &str, customer_code: &str) -> Self {
        self.globalpack_barcode_type = Some(barcode_type.to_string());
        self.globalpack_customer_code = Some(customer_code.to_string());
        self
    }

    /// Host all endpoint paths are appended to, without a trailing slash.
    pub fn endpoint(&self) -> String {
        let base = match &self.base_url {
            Some(url) => url.as_str(),
            None if self.sandbox => SANDBOX_URL,
            None => PRODUCTION_URL,
        };
        base.trim_end_matches('/').to_string()
    }

    /// Reads `POSTNL_API_KEY` (required) and the optional `POSTNL_*` settings.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("POSTNL_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidConfiguration("POSTNL_API_KEY is not set".to_string()))?;

        let mut customer = Customer::default();
        customer.customer_code = lookup("POSTNL_CUSTOMER_CODE");
        customer.customer_number = lookup("POSTNL_CUSTOMER_NUMBER");
        customer.collection_location = lookup("POSTNL_COLLECTION_LOCATION");

        let mode = match lookup("POSTNL_MODE") {
            Some(raw) => raw.parse()?,
            None => ApiMode::default(),
        };
        let sandbox = lookup("POSTNL_SANDBOX")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            api_key,
            sandbox,
            mode,
            base_url: lookup("POSTNL_BASE_URL"),
            customer,
            globalpack_barcode_type: lookup("POSTNL_GLOBALPACK_BARCODE_TYPE"),
            globalpack_customer_code: lookup("POSTNL_GLOBALPACK_CUSTOMER_CODE"),
        })
    }
}
