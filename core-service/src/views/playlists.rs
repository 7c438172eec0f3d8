use core_library::Playlist;
use tracing::{error, info, instrument};

use super::{load_into, Feedback, LoadState, Navigation, Notice, PageScope};
use crate::context::PageContext;

const LOAD_FAILED: &str = "Failed to load playlists";

/// "Your Playlists": the signed-in user's playlists.
pub struct PlaylistsPage {
    ctx: PageContext,
    scope: PageScope,
    state: LoadState<Vec<Playlist>>,
    deleting_id: Option<i64>,
}

impl PlaylistsPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            state: LoadState::Idle,
            deleting_id: None,
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Option<Notice> {
        let user_id = self.ctx.current_user_id()?;
        let playlists = &self.ctx.catalog.playlists;

        load_into(&self.scope, &mut self.state, LOAD_FAILED, async {
            Ok::<_, std::convert::Infallible>(playlists.get_user_playlists(user_id).await)
        })
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

    pub fn state(&self) -> &LoadState<Vec<Playlist>> {
        &self.state
    }

    /// Id of the playlist whose deletion is in flight.
    pub fn deleting_id(&self) -> Option<i64> {
        self.deleting_id
    }

    /// Question the host shows before calling [`Self::delete_playlist`].
    pub fn delete_prompt(playlist: &Playlist) -> String {
        format!("Are you sure you want to delete \"{}\"?", playlist.name)
    }

    pub fn view_playlist(&self, playlist: &Playlist) -> Navigation {
        Navigation::to(format!("/playlists/{}", playlist.id))
    }

    pub fn edit_playlist(&self, playlist: &Playlist) -> Navigation {
        self.view_playlist(playlist)
    }

    /// Does nothing unless the user confirmed.
    pub async fn delete_playlist(&mut self, playlist: &Playlist, confirmed: bool) -> Feedback {
        if !confirmed {
            return Feedback::none();
        }

        self.deleting_id = Some(playlist.id);
        let outcome = self.ctx.catalog.playlists.delete(playlist.id).await;
        let feedback = match outcome {
            Ok(_) => {
                info!(playlist_id = playlist.id, "Playlist deleted");
                self.load().await;
                Feedback::notice(Notice::success("Playlist deleted successfully"))
            }
            Err(e) => {
                error!(playlist_id = playlist.id, error = %e, "Failed to delete playlist");
                Feedback::notice(Notice::error("Failed to delete playlist"))
            }
        };
        self.deleting_id = None;
        feedback
    }

    /// The create dialog closed; pick up anything it created.
    pub async fn on_create_closed(&mut self) -> Option<Notice> {
        self.load().await
    }
}
