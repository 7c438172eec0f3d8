use core_auth::initials_avatar_url;
use core_library::{NewPlaylist, Playlist};
use tracing::{error, info, instrument, warn};

use super::Notice;
use crate::context::PageContext;

const COVER_SIZE: u32 = 400;
const CREATE_FAILED: &str = "Failed to create playlist";
const UNKNOWN_ACCOUNT: &str = "Unable to identify your account. Please sign in again.";

/// "Create Playlist" dialog.
pub struct CreatePlaylistForm {
    ctx: PageContext,
    open: bool,
    submitting: bool,
    name: String,
    description: String,
    cover_image: Option<String>,
}

impl CreatePlaylistForm {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            open: false,
            submitting: false,
            name: String::new(),
            description: String::new(),
            cover_image: None,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close and discard the draft.
    pub fn close(&mut self) {
        self.reset();
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Chosen cover, typically a data URL of the uploaded image.
    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_cover_image(&mut self, image: impl Into<String>) {
        self.cover_image = Some(image.into());
    }

    pub fn remove_cover_image(&mut self) {
        self.cover_image = None;
    }

    /// Validate and create. On success the form resets and closes, and the
    /// created playlist is returned alongside the notice.
    #[instrument(skip(self), fields(name = %self.name))]
    pub async fn submit(&mut self) -> (Notice, Option<Playlist>) {
        if self.name.trim().is_empty() {
            return (Notice::error("Please enter a playlist name"), None);
        }
        if self.ctx.store.current_user().is_none() {
            return (
                Notice::error("You must be logged in to create a playlist"),
                None,
            );
        }
        let Some(user_id) = self.ctx.current_user_id() else {
            warn!("Signed-in profile has no Id");
            return (Notice::error(UNKNOWN_ACCOUNT), None);
        };

        let cover_image = match self.cover_image.as_deref() {
            Some(image) if !image.is_empty() => image.to_string(),
            _ => initials_avatar_url(&self.name, Some(COVER_SIZE)),
        };
        let draft = NewPlaylist::new(self.name.clone(), user_id)
            .with_description(self.description.clone())
            .with_cover_image(cover_image);

        self.submitting = true;
        let outcome = self.ctx.catalog.playlists.create(draft).await;
        self.submitting = false;

        match outcome {
            Ok(created) => {
                info!(playlist_id = ?created.as_ref().map(|p| p.id), "Playlist created");
                self.close();
                (Notice::success("Playlist created successfully!"), created)
            }
            Err(e) => {
                error!(error = %e, "Failed to create playlist");
                (Notice::error(CREATE_FAILED), None)
            }
        }
    }

    fn reset(&mut self) {
        self.name.clear();
        self.description.clear();
        self.cover_image = None;
    }
}
