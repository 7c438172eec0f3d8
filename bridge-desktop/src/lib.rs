//! # Desktop Bridge Implementations
//!
//! Native implementations of the bridge traits.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`, with retry and backoff
//! - `RecordClient` over HTTP ([`HttpRecordClient`]) for hosted projects
//! - `RecordClient` in memory ([`MemoryRecordClient`]) for demos and tests
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HttpRecordClient, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http = Arc::new(ReqwestHttpClient::new()?);
//! let records = HttpRecordClient::new(http, "https://records.example.com", "project", "public-key")?;
//! ```

mod http;
mod memory;
mod records;

pub use http::ReqwestHttpClient;
pub use memory::MemoryRecordClient;
pub use records::HttpRecordClient;
