//! # Core Runtime
//!
//! Shared infrastructure for the VibeStream core crates:
//! - [`config`]: validated [`CoreConfig`](config::CoreConfig) with env loading
//! - [`logging`]: `tracing-subscriber` setup and host log forwarding
//! - [`events`]: broadcast [`EventBus`](events::EventBus) for auth, library and playback events

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
