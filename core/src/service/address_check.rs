//! National (Dutch) address validation. REST only.

use super::Connection;
use crate::config::ClientConfig;
use crate::entity::{AddressCheck, ValidatedAddress};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::rest;

pub const REST_PATH: &str = "/address/national/v1/validate";

#[derive(Debug, Clone)]
pub struct AddressCheckService {
    connection: Connection,
}

impl AddressCheckService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::from_config(config),
        }
    }

    pub fn build_validate_address(&self, request: &AddressCheck) -> Result<HttpRequest, ApiError> {
        rest::post_json(&self.connection.endpoint, REST_PATH, &self.connection.api_key, request)
    }

    /// Matching addresses; empty when the address is unknown.
    pub fn parse_validate_address(&self, response: HttpResponse) -> Result<Vec<ValidatedAddress>, ApiError> {
        rest::parse(&response)
    }
}
