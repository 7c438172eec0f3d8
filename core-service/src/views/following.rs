use core_library::Artist;
use tracing::{error, instrument};

use super::{load_into, Feedback, LoadState, Notice, PageScope};
use crate::context::PageContext;

const LOAD_FAILED: &str = "Failed to load followed artists";

pub struct FollowingPage {
    ctx: PageContext,
    scope: PageScope,
    state: LoadState<Vec<Artist>>,
}

impl FollowingPage {
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
        let artists = &self.ctx.catalog.artists;

        load_into(
            &self.scope,
            &mut self.state,
            LOAD_FAILED,
            artists.get_followed_artists(user_id),
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

    pub fn state(&self) -> &LoadState<Vec<Artist>> {
        &self.state
    }

    /// Artist pages do not exist yet.
    pub fn view_artist(&self, artist: &Artist) -> Notice {
        Notice::info(format!("Artist page for {} coming soon!", artist.name))
    }

    pub async fn unfollow(&mut self, artist: &Artist) -> Feedback {
        let Some(user_id) = self.ctx.current_user_id() else {
            return Feedback::none();
        };

        match self.ctx.catalog.artists.toggle_follow(artist.id, user_id).await {
            Ok(_) => {
                self.load().await;
                Feedback::notice(Notice::success(format!("Unfollowed {}", artist.name)))
            }
            Err(e) => {
                error!(artist_id = artist.id, error = %e, "Failed to update following");
                Feedback::notice(Notice::error("Failed to update following"))
            }
        }
    }
}
