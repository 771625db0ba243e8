//! Delivery date and sent (shipping) date calculation.

use super::Connection;
use crate::config::{ApiMode, ClientConfig};
use crate::entity::{
    CutOffTime, GetDeliveryDate, GetDeliveryDateRequest, GetDeliveryDateResponse, GetSentDateRequest,
    GetSentDateResponse,
};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, QueryParams};
use crate::rest;
use crate::soap;
use crate::validate;
use crate::xml::{ListField, SoapSchema};

pub const DELIVERY_PATH: &str = "/shipment/v2_2/calculate/date/delivery";
pub const SHIPPING_PATH: &str = "/shipment/v2_2/calculate/date/shipping";

pub const SOAP_SCHEMA: SoapSchema = SoapSchema {
    service: "DeliveryDateWebService",
    endpoint: "/shipment/v2_2/calculate/date/soap.asmx",
    lists: &[ListField::strings("Options"), ListField::domain("CutOffTimes", "CutOffTime")],
};

fn push_cut_off_times(query: &mut QueryParams, cut_off_times: &[CutOffTime]) {
    for cut_off in cut_off_times {
        let time = validate::format_time(cut_off.time);
        match cut_off.day_name() {
            None => {
                query.push("CutOffTime", time);
            }
            Some(day) => {
                query.push(format!("CutOffTime{day}"), time);
                if let Some(available) = cut_off.available {
                    query.push(format!("Available{day}"), available.to_string());
                }
            }
        }
    }
}

fn delivery_query(request: &GetDeliveryDate) -> QueryParams {
    let mut query = QueryParams::new();
    query
        .push("ShippingDate", validate::format_datetime(request.shipping_date))
        .push("ShippingDuration", request.shipping_duration.to_string());
    push_cut_off_times(&mut query, &request.cut_off_times);
    query
        .push_opt("AllowSundaySorting", request.allow_sunday_sorting.map(|b| b.to_string()))
        .push("CountryCode", request.country_code.as_str())
        .push_opt(
            "OriginCountryCode",
            request.original_country_code.as_ref().map(|c| c.as_str()),
        )
        .push_opt("City", request.city.as_deref())
        .push("PostalCode", &request.postal_code)
        .push_opt("Street", request.street.as_deref())
        .push_opt("HouseNumber", request.house_nr.as_deref())
        .push_opt("HouseNrExt", request.house_nr_ext.as_deref())
        .push_all("Options", &request.options);
    query
}

#[derive(Debug, Clone)]
pub struct DeliveryDateService {
    connection: Connection,
}

impl DeliveryDateService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::from_config(config),
        }
    }

    pub fn build_get_delivery_date(&self, request: &GetDeliveryDateRequest) -> Result<HttpRequest, ApiError> {
        match self.connection.mode {
            ApiMode::Rest => Ok(rest::get(
                &self.connection.endpoint,
                DELIVERY_PATH,
                &self.connection.api_key,
                &delivery_query(&request.get_delivery_date),
            )),
            ApiMode::Soap => soap::request(
                &SOAP_SCHEMA,
                &self.connection.endpoint,
                &self.connection.api_key,
                "GetDeliveryDate",
                request,
            ),
        }
    }

    pub fn parse_get_delivery_date(&self, response: HttpResponse) -> Result<GetDeliveryDateResponse, ApiError> {
        match self.connection.mode {
            ApiMode::Rest => rest::parse(&response),
            ApiMode::Soap => soap::parse(&SOAP_SCHEMA, &response, "GetDeliveryDateResponse"),
        }
    }

    pub fn build_get_sent_date(&self, request: &GetSentDateRequest) -> Result<HttpRequest, ApiError> {
        match self.connection.mode {
            ApiMode::Rest => {
                let sent = &request.get_sent_date;
                let mut query = QueryParams::new();
                query
                    .push("ShippingDuration", sent.shipping_duration.to_string())
                    .push("DeliveryDate", validate::format_date(sent.delivery_date))
                    .push_opt("AllowSundaySorting", sent.allow_sunday_sorting.map(|b| b.to_string()))
                    .push("CountryCode", sent.country_code.as_str())
                    .push_opt("City", sent.city.as_deref())
                    .push("PostalCode", &sent.postal_code)
                    .push_opt("Street", sent.street.as_deref())
                    .push_opt("HouseNumber", sent.house_nr.as_deref())
                    .push_opt("HouseNrExt", sent.house_nr_ext.as_deref())
                    .push_all("Options", &sent.options);
                Ok(rest::get(&self.connection.endpoint, SHIPPING_PATH, &self.connection.api_key, &query))
            }
            ApiMode::Soap => soap::request(
                &SOAP_SCHEMA,
                &self.connection.endpoint,
                &self.connection.api_key,
                "GetSentDate",
                request,
            ),
        }
    }

    pub fn parse_get_sent_date(&self, response: HttpResponse) -> Result<GetSentDateResponse, ApiError> {
        match self.connection.mode {
            ApiMode::Rest => rest::parse(&response),
            ApiMode::Soap => soap::parse(&SOAP_SCHEMA, &response, "GetSentDateResponse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::entity::{GetSentDate, Message};
    use crate::service::testing;

    fn delivery_request() -> GetDeliveryDateRequest {
        let shipping = validate::parse_datetime("29-06-2016 14:00:00").unwrap();
        GetDeliveryDateRequest {
            get_delivery_date: GetDeliveryDate::new("2132WT", "NL", shipping)
                .unwrap()
                .with_options(&["Daytime", "Evening"])
                .with_cut_off_time(CutOffTime::new("00", "16:00:00", true).unwrap())
                .with_cut_off_time(CutOffTime::new("06", "14:00:00", false).unwrap()),
            message: Message::with_id("1", "29-06-2016 12:00:00"),
        }
    }

    #[test]
    fn rest_delivery_date_query() {
        let service = DeliveryDateService::new(&testing::config(ApiMode::Rest));
        let req = service.build_get_delivery_date(&delivery_request()).unwrap();
        assert_eq!(
            req.url,
            "https://api.postnl.test/shipment/v2_2/calculate/date/delivery?ShippingDate=29-06-2016+14%3A00%3A00\
             &ShippingDuration=1&CutOffTime=16%3A00%3A00&CutOffTimeSaturday=14%3A00%3A00&AvailableSaturday=false\
             &CountryCode=NL&PostalCode=2132WT&Options=Daytime&Options=Evening"
        );
    }

    #[test]
    fn soap_delivery_date_lists() {
        let service = DeliveryDateService::new(&testing::config(ApiMode::Soap));
        let body = service.build_get_delivery_date(&delivery_request()).unwrap().body.unwrap();
        assert!(body.contains(
            "<domain:CutOffTimes><domain:CutOffTime><domain:Available>true</domain:Available>\
             <domain:Day>00</domain:Day><domain:Time>16:00:00</domain:Time></domain:CutOffTime>"
        ));
        assert!(body.contains(
            "<domain:Options><arr:string>Daytime</arr:string><arr:string>Evening</arr:string></domain:Options>"
        ));
        assert!(body.contains("<domain:ShippingDate>29-06-2016 14:00:00</domain:ShippingDate>"));
    }

    #[test]
    fn rest_sent_date_query() {
        let service = DeliveryDateService::new(&testing::config(ApiMode::Rest));
        let request = GetSentDateRequest {
            get_sent_date: GetSentDate::new("2132WT", "NL", NaiveDate::from_ymd_opt(2016, 6, 30).unwrap()).unwrap(),
            message: Message::with_id("1", "29-06-2016 12:00:00"),
        };
        let req = service.build_get_sent_date(&request).unwrap();
        assert_eq!(
            req.url,
            "https://api.postnl.test/shipment/v2_2/calculate/date/shipping?ShippingDuration=1&DeliveryDate=30-06-2016\
             &CountryCode=NL&PostalCode=2132WT"
        );
    }

    #[test]
    fn soap_sent_date_request() {
        let service = DeliveryDateService::new(&testing::config(ApiMode::Soap));
        let request = GetSentDateRequest {
            get_sent_date: GetSentDate::new("2132WT", "NL", NaiveDate::from_ymd_opt(2016, 6, 30).unwrap()).unwrap(),
            message: Message::with_id("1", "29-06-2016 12:00:00"),
        };
        let req = service.build_get_sent_date(&request).unwrap();
        assert_eq!(req.url, "https://api.postnl.test/shipment/v2_2/calculate/date/soap.asmx");
        assert_eq!(
            req.header("soapaction"),
            Some("\"http://postnl.nl/cif/services/DeliveryDateWebService/IDeliveryDateWebService/GetSentDate\"")
        );
        let body = req.body.unwrap();
        assert!(body.contains(
            "<services:GetSentDate><domain:GetSentDate><domain:CountryCode>NL</domain:CountryCode>\
             <domain:DeliveryDate>30-06-2016</domain:DeliveryDate><domain:PostalCode>2132WT</domain:PostalCode>\
             <domain:ShippingDuration>1</domain:ShippingDuration></domain:GetSentDate><domain:Message>"
        ));
        assert!(body.contains("<domain:MessageID>1</domain:MessageID>"));
    }

    #[test]
    fn parses_soap_responses() {
        let service = DeliveryDateService::new(&testing::config(ApiMode::Soap));
        let body = testing::soap_body(
            "<GetDeliveryDateResponse xmlns=\"http://postnl.nl/cif/services/DeliveryDateWebService/\">\
             <DeliveryDate>30-06-2016</DeliveryDate><Options><string>Daytime</string></Options>\
             </GetDeliveryDateResponse>",
        );
        let parsed = service.parse_get_delivery_date(HttpResponse::new(200, body)).unwrap();
        assert_eq!(parsed.delivery_date, NaiveDate::from_ymd_opt(2016, 6, 30).unwrap());
        assert!(parsed.options.contains("Daytime"));

        let body = testing::soap_body("<GetSentDateResponse><SentDate>29-06-2016</SentDate></GetSentDateResponse>");
        let parsed = service.parse_get_sent_date(HttpResponse::new(200, body)).unwrap();
        assert_eq!(parsed.sent_date, NaiveDate::from_ymd_opt(2016, 6, 29).unwrap());
    }

    #[test]
    fn rest_error_array_is_reported() {
        let service = DeliveryDateService::new(&testing::config(ApiMode::Rest));
        let err = service
            .parse_get_delivery_date(HttpResponse::new(
                400,
                r#"{"Errors":[{"ErrorNumber":"26","ErrorMsg":"Unknown option"}]}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::Cif(_)));
    }
}
