//! Shared handles every page and route factory receives.

use bridge_traits::records::RecordClient;
use core_auth::{SessionProvider, UserStore};
use core_library::{
    ArtistService, GenreService, PlaylistService, RecordRepository, SongService,
};
use core_runtime::config::{CoreConfig, ListLimits};
use core_runtime::events::EventBus;
use std::sync::Arc;

use crate::playback::PlaybackQueue;

/// The four entity services over one record client.
#[derive(Clone)]
pub struct Catalog {
    pub songs: SongService,
    pub playlists: PlaylistService,
    pub artists: ArtistService,
    pub genres: GenreService,
}

impl Catalog {
    /// Mutations are announced on `events` when given.
    pub fn new(client: Arc<dyn RecordClient>, config: &CoreConfig, events: Option<EventBus>) -> Self {
        Self {
            songs: SongService::new(repository(&client, &events))
                .with_preview_url_template(config.preview_url_template.clone()),
            playlists: PlaylistService::new(repository(&client, &events)),
            artists: ArtistService::new(repository(&client, &events)),
            genres: GenreService::new(repository(&client, &events)),
        }
    }
}

fn repository<E: core_library::Entity>(
    client: &Arc<dyn RecordClient>,
    events: &Option<EventBus>,
) -> RecordRepository<E> {
    let repo = RecordRepository::new(Arc::clone(client));
    match events {
        Some(bus) => repo.with_event_bus(bus.clone()),
        None => repo,
    }
}

#[derive(Clone)]
pub struct PageContext {
    pub catalog: Catalog,
    pub store: UserStore,
    pub playback: PlaybackQueue,
    pub session: Arc<dyn SessionProvider>,
    pub limits: ListLimits,
}

impl PageContext {
    /// Id of the signed-in user. Pages scoped to a user do nothing without it.
    pub fn current_user_id(&self) -> Option<i64> {
        self.store.state().user_id()
    }
}
