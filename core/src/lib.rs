//! Typed client core for the Lognex (МойСклад) JSON API.
//!
//! # Overview
//! Requests are built as plain `HttpRequest` values by a fluent
//! `RequestExecutor` and handed to a `Transport`; responses come back as
//! `HttpResponse` and are classified into success, API error or network
//! error before any decoding happens.
//!
//! # Design
//! - `ApiClient` holds configuration and transport only; every call starts
//!   from a fresh executor, so nothing leaks between requests.
//! - Endpoint clients are compositions of capability traits (`endpoints`)
//!   with default implementations; a client picks the ones it supports.
//! - Polymorphic payloads decode through an explicit tag registry
//!   (`decode::VariantFamily`) keyed by `meta.type`.
//! - Entities are owned trees, so a deep copy is `Clone`; `copy::assign`
//!   checks shapes at runtime for type-erased entities.

pub mod client;
pub mod config;
pub mod copy;
pub mod decode;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod http;
pub mod request;
pub mod resources;
pub mod responses;

pub use client::ApiClient;
pub use config::{ApiConfig, QueryCharset};
pub use copy::{assign, copy, Entity};
pub use decode::VariantFamily;
pub use endpoints::{
    DeleteByIdEndpoint, Direction, Endpoint, EntityEndpoint, FilterOp, GetByIdEndpoint,
    GetListEndpoint, ListParams, MetadataAttributeEndpoint, MetadataEndpoint, PostEndpoint,
    PutByIdEndpoint,
};
pub use error::{ApiFailure, Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use request::{RawResponse, RequestExecutor, MAX_EXPAND_DEPTH};
pub use responses::{ErrorResponse, ListEntity};
