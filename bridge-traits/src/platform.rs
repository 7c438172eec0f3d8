//! Thread-safety bounds that follow the target.
//!
//! Native hosts share adapters across tokio tasks and need `Send + Sync`.
//! Browser builds run on one thread and wrap `web_sys` handles that satisfy
//! neither bound, so the marker collapses to nothing on `wasm32`.

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}
