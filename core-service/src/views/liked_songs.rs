use core_library::Song;
use tracing::{error, instrument};

use super::{load_into, Feedback, LoadState, Notice, PageScope};
use crate::context::PageContext;

const LOAD_FAILED: &str = "Failed to load liked songs";

pub struct LikedSongsPage {
    ctx: PageContext,
    scope: PageScope,
    state: LoadState<Vec<Song>>,
}

impl LikedSongsPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            state: LoadState::Idle,
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Option<Notice> {
        let user_id = self.ctx.current_user_id()?;
        let songs = &self.ctx.catalog.songs;

        load_into(
            &self.scope,
            &mut self.state,
            LOAD_FAILED,
            songs.get_liked_songs(user_id),
        )
        .await
    }

    pub async fn retry(&mut self) -> Option<Notice> {
        self.load().await
    }

    pub fn unmount(&self) {
        self.scope.cancel();
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState<Vec<Song>> {
        &self.state
    }

    pub fn play(&self, song: Song) {
        self.ctx.playback.play_song(song);
    }

    pub fn is_song_playing(&self, song_id: i64) -> bool {
        self.ctx.playback.is_song_playing(song_id)
    }

    /// Every listed song is liked, so toggling removes it.
    pub async fn unlike(&mut self, song: &Song) -> Feedback {
        let Some(user_id) = self.ctx.current_user_id() else {
            return Feedback::none();
        };

        match self.ctx.catalog.songs.toggle_like(song.id, user_id).await {
            Ok(_) => {
                self.load().await;
                Feedback::notice(Notice::success("Removed from Liked Songs"))
            }
            Err(e) => {
                error!(song_id = song.id, error = %e, "Failed to update liked songs");
                Feedback::notice(Notice::error("Failed to update liked songs"))
            }
        }
    }
}
