//! One service per provider API domain.
//!
//! # Design
//! A service holds only what it needs from [`ClientConfig`] (host, API key,
//! protocol mode) and carries no mutable state. Every operation is split into
//! a `build_*` method producing an [`crate::HttpRequest`] and a `parse_*`
//! method consuming an [`crate::HttpResponse`]; the facade in
//! [`crate::client`] glues the two together through a transport.
//!
//! Services that the provider offers over both protocols dispatch on
//! [`ApiMode`]; the REST-only ones (shipping status, address check) ignore it.

use crate::config::{ApiMode, ClientConfig};

pub mod address_check;
pub mod barcode;
pub mod confirming;
pub mod delivery_date;
pub mod location;
pub mod shipping_status;
pub mod timeframe;

pub use address_check::AddressCheckService;
pub use barcode::BarcodeService;
pub use confirming::ConfirmingService;
pub use delivery_date::DeliveryDateService;
pub use location::LocationService;
pub use shipping_status::ShippingStatusService;
pub use timeframe::TimeframeService;

/// Connection settings shared by every service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Connection {
    pub(crate) endpoint: String,
    pub(crate) api_key: String,
    pub(crate) mode: ApiMode,
}

impl Connection {
    pub(crate) fn from_config(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            mode: config.mode,
        }
    }
}
