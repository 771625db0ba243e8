//! Delivery timeframes for an address over a date range.

use super::Connection;
use crate::config::{ApiMode, ClientConfig};
use crate::entity::{GetTimeframes, GetTimeframesResponse};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, QueryParams};
use crate::rest;
use crate::soap;
use crate::validate;
use crate::xml::{ListField, SoapSchema};

pub const REST_PATH: &str = "/shipment/v2_1/calculate/timeframes";

pub const SOAP_SCHEMA: SoapSchema = SoapSchema {
    service: "TimeframeWebService",
    endpoint: "/shipment/v2_1/calculate/timeframes/soap.asmx",
    lists: &[ListField::strings("Options")],
};

#[derive(Debug, Clone)]
pub struct TimeframeService {
    connection: Connection,
}

impl TimeframeService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connection: Connection::from_config(config),
        }
    }

    pub fn build_get_timeframes(&self, request: &GetTimeframes) -> Result<HttpRequest, ApiError> {
        if self.connection.mode == ApiMode::Soap {
            return soap::request(
                &SOAP_SCHEMA,
                &self.connection.endpoint,
                &self.connection.api_key,
                "GetTimeframes",
                request,
            );
        }
        let timeframe = &request.timeframe;
        let mut query = QueryParams::new();
        query
            .push("AllowSundaySorting", timeframe.sunday_sorting.to_string())
            .push("StartDate", validate::format_date(timeframe.start_date))
            .push("EndDate", validate::format_date(timeframe.end_date))
            .push("PostalCode", &timeframe.postal_code)
            .push("HouseNumber", &timeframe.house_nr)
            .push_opt("HouseNrExt", timeframe.house_nr_ext.as_deref())
            .push_opt("City", timeframe.city.as_deref())
            .push_opt("Street", timeframe.street.as_deref())
            .push("CountryCode", timeframe.country_code.as_str())
            .push_opt("Interval", timeframe.interval.map(|i| i.to_string()))
            .push_opt("TimeframeRange", timeframe.timeframe_range.as_deref())
            .push_all("Options", &timeframe.options);
        Ok(rest::get(&self.connection.endpoint, REST_PATH, &self.connection.api_key, &query))
    }

    pub fn parse_get_timeframes(&self, response: HttpResponse) -> Result<GetTimeframesResponse, ApiError> {
        match self.connection.mode {
            ApiMode::Rest => rest::parse(&response),
            ApiMode::Soap => soap::parse(&SOAP_SCHEMA, &response, "GetTimeframesResponse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::entity::{Message, Timeframe};
    use crate::service::testing;

    fn request() -> GetTimeframes {
        let start = NaiveDate::from_ymd_opt(2016, 6, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2016, 7, 2).unwrap();
        GetTimeframes {
            message: Message::with_id("1", "29-06-2016 12:00:00"),
            timeframe: Timeframe::new("2132WT", "42", "NL", start, end)
                .unwrap()
                .with_options(&["Daytime", "Evening"]),
        }
    }

    #[test]
    fn rest_query() {
        let service = TimeframeService::new(&testing::config(ApiMode::Rest));
        assert_eq!(
            service.build_get_timeframes(&request()).unwrap().url,
            "https://api.postnl.test/shipment/v2_1/calculate/timeframes?AllowSundaySorting=false&StartDate=30-06-2016\
             &EndDate=02-07-2016&PostalCode=2132WT&HouseNumber=42&CountryCode=NL&Options=Daytime&Options=Evening"
        );
    }

    #[test]
    fn soap_body_orders_properties() {
        let service = TimeframeService::new(&testing::config(ApiMode::Soap));
        let body = service.build_get_timeframes(&request()).unwrap().body.unwrap();
        assert!(body.contains(
            "<domain:Timeframe><domain:CountryCode>NL</domain:CountryCode><domain:EndDate>02-07-2016</domain:EndDate>\
             <domain:HouseNr>42</domain:HouseNr>\
             <domain:Options><arr:string>Daytime</arr:string><arr:string>Evening</arr:string></domain:Options>\
             <domain:PostalCode>2132WT</domain:PostalCode><domain:StartDate>30-06-2016</domain:StartDate>\
             <domain:SundaySorting>false</domain:SundaySorting></domain:Timeframe>"
        ));
    }

    #[test]
    fn soap_response_days_and_slots() {
        let service = TimeframeService::new(&testing::config(ApiMode::Soap));
        let body = testing::soap_body(
            "<GetTimeframesResponse><ReasonNoTimeframes><ReasonNoTimeframe><Code>01</Code>\
             <Date>02-07-2016</Date><Description>Dag uitgesloten van tijdvak</Description>\
             <Options><string>Daytime</string></Options></ReasonNoTimeframe></ReasonNoTimeframes>\
             <Timeframes><Timeframe><Date>30-06-2016</Date><Timeframes>\
             <TimeframeTimeFrame><From>14:30:00</From><Options><string>Daytime</string></Options><To>17:00:00</To></TimeframeTimeFrame>\
             <TimeframeTimeFrame><From>18:00:00</From><Options><string>Evening</string></Options><To>22:00:00</To></TimeframeTimeFrame>\
             </Timeframes></Timeframe></Timeframes></GetTimeframesResponse>",
        );
        let parsed = service.parse_get_timeframes(HttpResponse::new(200, body)).unwrap();
        assert_eq!(parsed.days().len(), 1);
        let slots = parsed.days()[0].slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].from, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert!(slots[1].options.contains("Evening"));
        assert_eq!(parsed.reasons()[0].date, NaiveDate::from_ymd_opt(2016, 7, 2));
    }
}
