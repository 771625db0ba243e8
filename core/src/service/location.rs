//! Pickup point lookup: nearest to an address or coordinate, inside an area,
//! or a single location by code.

use super::Connection;
use crate::config::{ApiMode, ClientConfig};
use crate::entity::{GetLocation, GetLocationsInArea, GetLocationsResponse, GetNearestLocations, Location, ResponseLocation};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, QueryParams};
use crate::rest;
use crate::soap;
use crate::validate;
use crate::xml::{ListField, SoapSchema};

pub const NEAREST_PATH: &str = "/shipment/v2_1/locations/nearest";
pub const NEAREST_GEOCODE_PATH: &str = "/shipment/v2_1/locations/nearest/geocode";
pub const AREA_PATH: &str = "/shipment/v2_1/locations/area";
pub const LOOKUP_PATH: &str = "/shipment/v2_1/locations/lookup";

pub const SOAP_SCHEMA: SoapSchema = SoapSchema {
    service: "LocationWebService",
    endpoint: "/shipment/v2_1/locations/soap.asmx",
    lists: &[ListField::strings("DeliveryOptions"), ListField::strings("Options")],
};

/// Date, opening time and delivery options shared by the search queries.
fn push_filters(query: &mut QueryParams, location: &Location) {
    query
        .push_opt("DeliveryDate", location.delivery_date.map(validate::format_date))
        .push_opt("OpeningTime", location.opening_time.map(validate::format_time))
        .push_all("DeliveryOptions", &location.delivery_options);
}

#[derive(Debug, Clone)]
pub struct LocationService {
    connection: Connection,
}

impl LocationService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::from_config(config),
        }
    }

    fn soap<T: serde::Serialize>(&self, operation: &str, request: &T) -> Result<HttpRequest, ApiError> {
        soap::request(
            &SOAP_SCHEMA,
            &self.connection.endpoint,
            &self.connection.api_key,
            operation,
            request,
        )
    }

    fn parse(&self, response: HttpResponse, response_element: &str) -> Result<Vec<ResponseLocation>, ApiError> {
        let parsed: GetLocationsResponse = match self.connection.mode {
            ApiMode::Rest => rest::parse(&response)?,
            ApiMode::Soap => soap::parse(&SOAP_SCHEMA, &response, response_element)?,
        };
        Ok(parsed.into_locations())
    }

    pub fn build_get_nearest_locations(&self, request: &GetNearestLocations) -> Result<HttpRequest, ApiError> {
        let location = &request.location;
        if location.postalcode.is_none() && location.coordinates().is_none() {
            return Err(ApiError::invalid("location", "a postal code or coordinates are required"));
        }
        if self.connection.mode == ApiMode::Soap {
            return self.soap("GetNearestLocations", request);
        }
        let mut query = QueryParams::new();
        query.push("CountryCode", request.countrycode.as_str());
        let path = match location.coordinates() {
            Some(coordinates) => {
                query
                    .push("Latitude", coordinates.latitude.to_string())
                    .push("Longitude", coordinates.longitude.to_string());
                NEAREST_GEOCODE_PATH
            }
            None => {
                query
                    .push_opt("PostalCode", location.postalcode.as_deref())
                    .push_opt("City", location.city.as_deref())
                    .push_opt("Street", location.street.as_deref())
                    .push_opt("HouseNumber", location.house_nr.as_deref())
                    .push_opt("HouseNumberExtension", location.house_nr_ext.as_deref());
                NEAREST_PATH
            }
        };
        push_filters(&mut query, location);
        Ok(rest::get(&self.connection.endpoint, path, &self.connection.api_key, &query))
    }

    pub fn parse_get_nearest_locations(&self, response: HttpResponse) -> Result<Vec<ResponseLocation>, ApiError> {
        self.parse(response, "GetNearestLocationsResponse")
    }

    pub fn build_get_locations_in_area(&self, request: &GetLocationsInArea) -> Result<HttpRequest, ApiError> {
        let location = &request.location;
        let (Some(north_west), Some(south_east)) = (location.coordinates_north_west, location.coordinates_south_east)
        else {
            return Err(ApiError::invalid("location", "both area corners are required"));
        };
        if north_west.latitude < south_east.latitude || north_west.longitude > south_east.longitude {
            return Err(ApiError::invalid("location", "north-west corner must lie north-west of the south-east corner"));
        }
        if self.connection.mode == ApiMode::Soap {
            return self.soap("GetLocationsInArea", request);
        }
        let mut query = QueryParams::new();
        query
            .push("LatitudeNorth", north_west.latitude.to_string())
            .push("LongitudeWest", north_west.longitude.to_string())
            .push("LatitudeSouth", south_east.latitude.to_string())
            .push("LongitudeEast", south_east.longitude.to_string())
            .push("CountryCode", request.countrycode.as_str());
        push_filters(&mut query, location);
        Ok(rest::get(&self.connection.endpoint, AREA_PATH, &self.connection.api_key, &query))
    }

    pub fn parse_get_locations_in_area(&self, response: HttpResponse) -> Result<Vec<ResponseLocation>, ApiError> {
        self.parse(response, "GetLocationsInAreaResponse")
    }

    pub fn build_get_location(&self, request: &GetLocation) -> Result<HttpRequest, ApiError> {
        if request.location_code.trim().is_empty() {
            return Err(ApiError::invalid("location code", "must not be empty"));
        }
        if self.connection.mode == ApiMode::Soap {
            return self.soap("GetLocation", request);
        }
        let mut query = QueryParams::new();
        query
            .push("LocationCode", &request.location_code)
            .push("RetailNetworkID", &request.retail_network_id);
        Ok(rest::get(&self.connection.endpoint, LOOKUP_PATH, &self.connection.api_key, &query))
    }

    /// The single location, `NotFound` when the provider returned none.
    pub fn parse_get_location(&self, response: HttpResponse) -> Result<ResponseLocation, ApiError> {
        self.parse(response, "GetLocationResponse")?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("no location with that code".to_string()))
    }
}
