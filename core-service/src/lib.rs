//! Core service façade and bootstrap helpers.
//!
//! [`CoreService`] wires a record client into the entity services, the user
//! store, the event bus, the play queue and the router. Desktop hosts enable
//! the `desktop-shims` feature and call [`CoreService::connect`], which talks
//! to the hosted backend over `bridge-desktop`'s reqwest client. Headless
//! hosts and tests hand in their own [`RecordClient`] through
//! [`CoreService::new`].

pub mod context;
pub mod error;
pub mod playback;
pub mod router;
pub mod views;

pub use context::{Catalog, PageContext};
pub use error::{CoreError, Result};
pub use playback::PlaybackQueue;
pub use router::{Access, AuthScreen, NavigationOutcome, Page, Rendered, RouteMatch, Router};
pub use views::{
    CreatePlaylistForm, EditForm, Feedback, FollowingPage, HomePage, LikedSongsPage, LoadState,
    Navigation, Notice, NoticeLevel, PageScope, PlaylistDetailPage, PlaylistsPage, ProfileMenu,
};

use bridge_traits::records::RecordClient;
use core_auth::{SessionProvider, UserStore};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    records: Arc<dyn RecordClient>,
    events: EventBus,
    context: PageContext,
    router: Router,
}

impl CoreService {
    /// Build the service graph over an existing record client.
    pub fn new(
        config: CoreConfig,
        records: Arc<dyn RecordClient>,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);
        let catalog = Catalog::new(Arc::clone(&records), &config, Some(events.clone()));
        let context = PageContext {
            catalog,
            store: UserStore::new().with_event_bus(events.clone()),
            playback: PlaybackQueue::new().with_event_bus(events.clone()),
            session,
            limits: config.limits,
        };

        info!(
            backend = config.backend.is_some(),
            event_buffer = config.event_buffer_size,
            "Core service initialised"
        );

        Ok(Self {
            config: Arc::new(config),
            records,
            events,
            context,
            router: Router::default(),
        })
    }

    /// Connect to the hosted backend named in `config`.
    ///
    /// ```no_run
    /// # async fn example() -> core_service::Result<()> {
    /// use core_runtime::config::CoreConfig;
    ///
    /// let core = core_service::CoreService::connect(CoreConfig::from_env()?)?;
    /// let charts = core.catalog().songs.get_top_charts(10).await;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
    pub fn connect(config: CoreConfig) -> Result<Self> {
        use bridge_desktop::{HttpRecordClient, ReqwestHttpClient};
        use core_auth::LocalSession;

        let backend = config.require_backend()?;
        let http = ReqwestHttpClient::with_timeout(config.request_timeout)?;
        let records = HttpRecordClient::new(
            Arc::new(http),
            backend.base_url.as_str(),
            backend.project_id.clone(),
            backend.public_key.clone(),
        )?
        .with_timeout(config.request_timeout);

        Self::new(config, Arc::new(records), Arc::new(LocalSession))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn record_client(&self) -> Arc<dyn RecordClient> {
        Arc::clone(&self.records)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.context.catalog
    }

    pub fn store(&self) -> &UserStore {
        &self.context.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn playback(&self) -> &PlaybackQueue {
        &self.context.playback
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Replace the route table, e.g. to add host-specific pages.
    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn context(&self) -> PageContext {
        self.context.clone()
    }

    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        self.router.navigate(&self.context, path).await
    }

    pub fn create_playlist_form(&self) -> CreatePlaylistForm {
        CreatePlaylistForm::new(self.context())
    }

    pub fn profile_menu(&self) -> ProfileMenu {
        ProfileMenu::new(self.context())
    }
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("config", &self.config)
            .field("store", &self.context.store)
            .field("playback", &self.context.playback)
            .field("router", &self.router)
            .finish()
    }
}
