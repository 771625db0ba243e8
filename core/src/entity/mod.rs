//! Request and response entities mirroring the provider's field names.
//!
//! Request entities serialize to the REST JSON shape; the SOAP layer derives
//! its XML from that same serialization. Response entities decode both REST
//! JSON and SOAP bodies converted by [`crate::xml`].

pub mod address_check;
pub mod barcode;
pub mod common;
pub mod confirming;
pub mod delivery_date;
pub mod location;
pub mod status;
pub mod timeframe;

pub use address_check::{AddressCheck, ValidatedAddress};
pub use barcode::{Barcode, GenerateBarcode, GenerateBarcodeResponse};
pub use common::{
    Address, Amount, BarcodeType, Contact, Coordinates, CountryCode, Customer, Customs, CustomsContent,
    Dimension, Group, Message, ProductOption, Warning,
};
pub use confirming::{Confirming, ConfirmingResponse, ConfirmingResponseShipment, Shipment};
pub use delivery_date::{
    CutOffTime, GetDeliveryDate, GetDeliveryDateRequest, GetDeliveryDateResponse, GetSentDate,
    GetSentDateRequest, GetSentDateResponse,
};
pub use location::{
    GetLocation, GetLocationsInArea, GetLocationsResponse, GetNearestLocations, Location, OpeningHours,
    ResponseLocation,
};
pub use status::{
    CompleteStatus, CurrentStatus, CurrentStatusByReference, Expectation, GetSignature, OldStatus,
    Signature, SignatureResponse, Status, StatusEvent, StatusResponse, StatusShipment,
};
pub use timeframe::{
    GetTimeframes, GetTimeframesResponse, ReasonNoTimeframe, Timeframe, TimeframeDay, TimeframeTimeFrame,
};
