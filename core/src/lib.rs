//! Synchronous client SDK for the shipping provider's JSON API.
//!
//! # Overview
//! Covers authentication, price calculation, order creation and management,
//! cargo marking, order search/history and label printing. Every call is a
//! single blocking HTTP POST; there is no background work and no retry.
//!
//! # Design
//! - `GenericContainer` gives typed, explicitly-coerced access to decoded
//!   JSON objects.
//! - `Instantiator` builds response entities from JSON according to a
//!   `TypeDescriptor` (`Single<T>` or `ArrayOf<D>`), recursively.
//! - Requests implement `RequestEntity::to_raw`; responses implement
//!   `ResponseEntity::from_raw`.
//! - `ApiClient` splits each call into `build_post` and `parse_response`
//!   around a pluggable `Transport`, so the mapping layer stays free of I/O.
//! - Endpoint facades (`client.orders().search(..)`) relabel vendor errors
//!   with the endpoint they came from.
//!
//! ```no_run
//! use shipping_core::{ApiClient, CalculationRequest, CargoPlace, ClientConfig};
//!
//! fn main() -> shipping_core::Result<()> {
//!     let config = ClientConfig::new("https://api.example-shipping.test").with_app_key("app-key");
//!     let client = ApiClient::new(config)?.authenticate("login", "password")?;
//!
//!     let mut request = CalculationRequest::new("Moscow", "Kazan");
//!     request.add_place(CargoPlace::new(2.5, 30, 20, 10));
//!     let quote = client.calculations().calculate(&request)?;
//!     println!("{} in {} days", quote.price(), quote.delivery_term());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod container;
pub mod endpoints;
pub mod entity;
pub mod error;
pub mod http;
pub mod instantiator;
pub mod types;

pub use client::{ApiClient, CallMode};
pub use config::ClientConfig;
pub use container::{FromValue, GenericContainer, RawMap};
pub use entity::{Body, RequestEntity};
pub use error::{ApiError, BadRequest, Endpoint, MappingError, Result, TransportError, VendorError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use instantiator::{array_of, single, ArrayOf, DescriptorKind, Instantiator, ResponseEntity, Single, TypeDescriptor};
pub use types::*;
