//! Seam to the external authentication provider.
//!
//! Sign-in UI and session cookies live outside the core. The core only asks
//! the provider to end the session; clearing local state is the caller's job.

use async_trait::async_trait;
use bridge_traits::platform::PlatformSendSync;

use crate::error::Result;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SessionProvider: PlatformSendSync {
    /// End the provider session.
    async fn logout(&self) -> Result<()>;
}

/// Provider for hosts without a remote session, e.g. demos and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSession;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SessionProvider for LocalSession {
    async fn logout(&self) -> Result<()> {
        Ok(())
    }
}
