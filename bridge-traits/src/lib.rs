//! # Host Bridge Traits
//!
//! Capability traits the core needs from its host but cannot implement itself.
//!
//! ## Traits
//!
//! - [`RecordClient`](records::RecordClient) - The managed record backend that stores
//!   songs, playlists, artists and genres. All persistence goes through it.
//! - [`HttpClient`](http::HttpClient) - Async HTTP used by the HTTP record adapter.
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging.
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits report transport-level failures as
//! [`BridgeError`](error::BridgeError). A backend that answers but rejects a
//! call is *not* a bridge error: the rejection travels inside the
//! [`Envelope`](records::Envelope) so services can decide between swallowing
//! and raising it.
//!
//! ## Thread Safety
//!
//! On native targets every trait requires `Send + Sync` (see
//! [`PlatformSendSync`](platform::PlatformSendSync)); on `wasm32` the bound is
//! dropped so browser handles can be wrapped directly.

pub mod error;
pub mod http;
pub mod log;
pub mod platform;
pub mod records;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use records::{
    BatchResult, Condition, DeleteRequest, Envelope, GroupCondition, Record, RecordBatch,
    RecordClient, RecordQuery, SortType, WhereGroup, ID_FIELD,
};
