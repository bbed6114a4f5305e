pub mod client;
pub mod error;
pub mod models;
pub mod parser;

pub use client::PanosApiClient;
pub use error::{DetailValue, Details, ErrorKind, PanosApiError};
pub use models::{
    AddressObject, AddressType, PolicyAction, SecurityPolicy, SecurityZone, SystemInfo, ZoneType,
};
