//! Synchronous client core for the PostNL shipping API family.
//!
//! # Overview
//! Covers barcode generation, shipment confirmation, delivery and sent date
//! calculation, pickup location lookup, timeframes, shipment status and
//! national address validation. Every service builds `HttpRequest` values and
//! parses `HttpResponse` values without touching the network (host-does-IO
//! pattern); [`PostNlClient`] ties them to a host-supplied [`Transport`].
//!
//! # Design
//! - Entities mirror the provider's PascalCase field names and serialize to
//!   the REST JSON shape with serde.
//! - The legacy SOAP protocol is derived from that same serialization through a
//!   per-service [`xml::SoapSchema`], so no entity is mapped to XML by hand.
//! - SOAP responses are converted back into JSON values and decoded by the
//!   same entities as REST responses.
//! - Invalid input is rejected while building requests, before anything is
//!   sent.

pub mod client;
pub mod config;
pub mod de;
pub mod entity;
pub mod error;
pub mod http;
mod rest;
pub mod service;
pub mod soap;
pub mod validate;
pub mod xml;

pub use client::{PostNlClient, Transport};
pub use config::{ApiMode, ClientConfig};
pub use error::{ApiError, CifErrorDetail};
pub use http::{HttpMethod, HttpRequest, HttpResponse, QueryParams};
