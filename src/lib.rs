//! Workspace façade crate.
//!
//! Host applications depend on `vibestream-workspace` and pick a feature
//! instead of wiring each workspace crate individually:
//!
//! - `desktop-shims` (default): `core-service` with the reqwest-backed record
//!   client, so `CoreService::connect` is available.
//! - `headless`: `core-service` without native adapters; the host injects its
//!   own `RecordClient`.

#[cfg(any(feature = "desktop-shims", feature = "headless"))]
pub use core_service::*;
