use core_library::{Playlist, PlaylistUpdate, Song};
use tracing::{debug, error, info, instrument};

use super::{Feedback, LoadState, Notice, PageScope};
use crate::context::PageContext;

const NOT_FOUND: &str = "Playlist not found";

/// Fields of the inline edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub name: String,
    pub description: String,
}

impl EditForm {
    fn from_playlist(playlist: &Playlist) -> Self {
        Self {
            name: playlist.name.clone(),
            description: playlist.description.clone(),
        }
    }
}

/// One playlist addressed by the `:id` route parameter.
pub struct PlaylistDetailPage {
    ctx: PageContext,
    scope: PageScope,
    playlist_id: String,
    state: LoadState<Playlist>,
    editing: bool,
    edit_form: EditForm,
}

impl PlaylistDetailPage {
    pub fn new(ctx: PageContext, playlist_id: impl Into<String>) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            playlist_id: playlist_id.into(),
            state: LoadState::Idle,
            editing: false,
            edit_form: EditForm::default(),
        }
    }

    /// A missing or unparsable id and a backend failure all end in
    /// `NotFound`; the lookup does not tell them apart.
    #[instrument(skip(self), fields(playlist_id = %self.playlist_id))]
    pub async fn load(&mut self) -> Option<Notice> {
        if self.playlist_id.is_empty() || !self.scope.is_active() {
            return None;
        }

        self.state = LoadState::Loading;
        let lookup = self.ctx.catalog.playlists.get_by_id(self.playlist_id.as_str());
        let Some(found) = self.scope.run(lookup).await else {
            debug!("Page unmounted, dropping playlist");
            return None;
        };

        match found {
            Some(playlist) => {
                self.edit_form = EditForm::from_playlist(&playlist);
                self.state = LoadState::Loaded(playlist);
            }
            None => self.state = LoadState::NotFound(NOT_FOUND.to_string()),
        }
        None
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

    pub fn state(&self) -> &LoadState<Playlist> {
        &self.state
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.state.data()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn edit_form(&self) -> &EditForm {
        &self.edit_form
    }

    pub fn start_edit(&mut self) {
        if self.playlist().is_some() {
            self.editing = true;
        }
    }

    pub fn set_edit_name(&mut self, name: impl Into<String>) {
        self.edit_form.name = name.into();
    }

    pub fn set_edit_description(&mut self, description: impl Into<String>) {
        self.edit_form.description = description.into();
    }

    /// Leave edit mode and restore the stored values.
    pub fn cancel_edit(&mut self) {
        self.editing = false;
        if let Some(playlist) = self.state.data() {
            self.edit_form = EditForm::from_playlist(playlist);
        }
    }

    pub async fn save_edit(&mut self) -> Feedback {
        let Some(playlist_id) = self.playlist().map(|p| p.id) else {
            return Feedback::none();
        };

        let patch = PlaylistUpdate {
            name: Some(self.edit_form.name.clone()),
            description: Some(self.edit_form.description.clone()),
            cover_image: None,
        };
        match self.ctx.catalog.playlists.update(playlist_id, &patch).await {
            Ok(_) => {
                self.editing = false;
                self.load().await;
                Feedback::notice(Notice::success("Playlist updated successfully"))
            }
            Err(e) => {
                error!(playlist_id, error = %e, "Failed to update playlist");
                Feedback::notice(Notice::error("Failed to update playlist"))
            }
        }
    }

    pub fn delete_prompt(&self) -> Option<String> {
        self.playlist()
            .map(|p| format!("Are you sure you want to delete \"{}\"?", p.name))
    }

    /// On success the host is sent back to the playlist list.
    pub async fn delete(&mut self, confirmed: bool) -> Feedback {
        let Some(playlist_id) = self.playlist().map(|p| p.id) else {
            return Feedback::none();
        };
        if !confirmed {
            return Feedback::none();
        }

        match self.ctx.catalog.playlists.delete(playlist_id).await {
            Ok(_) => {
                info!(playlist_id, "Playlist deleted");
                Feedback::notice(Notice::success("Playlist deleted successfully"))
                    .and_navigate("/playlists")
            }
            Err(e) => {
                error!(playlist_id, error = %e, "Failed to delete playlist");
                Feedback::notice(Notice::error("Failed to delete playlist"))
            }
        }
    }

    pub async fn remove_song(&mut self, song_id: i64) -> Feedback {
        let Some(playlist_id) = self.playlist().map(|p| p.id) else {
            return Feedback::none();
        };

        match self
            .ctx
            .catalog
            .playlists
            .remove_song(playlist_id, song_id)
            .await
        {
            Ok(_) => {
                self.load().await;
                Feedback::notice(Notice::success("Song removed from playlist"))
            }
            Err(e) => {
                error!(playlist_id, song_id, error = %e, "Failed to remove song");
                Feedback::notice(Notice::error("Failed to remove song"))
            }
        }
    }

    /// Signed-out users get no feedback.
    pub async fn like_song(&self, song_id: i64) -> Feedback {
        let Some(user_id) = self.ctx.current_user_id() else {
            return Feedback::none();
        };

        match self.ctx.catalog.songs.toggle_like(song_id, user_id).await {
            Ok(true) => Feedback::notice(Notice::success("Added to Liked Songs")),
            Ok(false) => Feedback::notice(Notice::success("Removed from Liked Songs")),
            Err(e) => {
                error!(song_id, error = %e, "Failed to update liked songs");
                Feedback::notice(Notice::error("Failed to update liked songs"))
            }
        }
    }

    pub fn play_song(&self, song: Song) {
        self.ctx.playback.play_song(song);
    }

    /// Queue every expanded song in playlist order.
    pub fn play_all(&self) -> bool {
        let songs = self
            .playlist()
            .map(Playlist::expanded_songs)
            .unwrap_or_default();
        self.ctx.playback.play_all(songs)
    }

    pub fn is_song_playing(&self, song_id: i64) -> bool {
        self.ctx.playback.is_song_playing(song_id)
    }
}
