//! Playlist queries and mutations.

use bridge_traits::records::Condition;
use rand::seq::SliceRandom;
use tracing::{instrument, warn};

use crate::error::{LibraryError, Result};
use crate::ids::IntoRecordId;
use crate::models::{NewPlaylist, Playlist, PlaylistUpdate};
use crate::repositories::RecordRepository;

#[derive(Clone)]
pub struct PlaylistService {
    repo: RecordRepository<Playlist>,
}

impl PlaylistService {
    pub fn new(repo: RecordRepository<Playlist>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> Result<Vec<Playlist>> {
        self.repo.fetch_all(self.repo.query()).await
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Option<Playlist> {
        self.repo.find_by_id(id).await
    }

    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn get_user_playlists(&self, user_id: impl IntoRecordId) -> Vec<Playlist> {
        let Some(user_id) = user_id.into_record_id() else {
            warn!("Ignoring playlist owner filter with a non-numeric id");
            return Vec::new();
        };

        let query = self
            .repo
            .query()
            .filter(Condition::equal_to("userId_c", user_id));
        self.repo.fetch_or_empty(query).await
    }

    /// First `limit` playlists in random order.
    pub async fn get_trending(&self, limit: u32) -> Vec<Playlist> {
        let mut playlists = self.repo.fetch_or_empty(self.repo.query().page(limit, 0)).await;
        playlists.shuffle(&mut rand::thread_rng());
        playlists
    }

    /// Missing description and cover image are stored as empty strings.
    pub async fn create(&self, playlist: NewPlaylist) -> Result<Option<Playlist>> {
        let draft = NewPlaylist {
            description: Some(playlist.description.unwrap_or_default()),
            cover_image: Some(playlist.cover_image.unwrap_or_default()),
            ..playlist
        };
        self.repo.create(&draft).await
    }

    pub async fn update(
        &self,
        id: impl IntoRecordId,
        patch: &PlaylistUpdate,
    ) -> Result<Option<Playlist>> {
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool> {
        self.repo.delete(id).await
    }

    /// Not available: playlist membership cannot be edited through the backend yet.
    pub async fn add_song(
        &self,
        _playlist_id: impl IntoRecordId,
        _song_id: impl IntoRecordId,
    ) -> Result<bool> {
        Err(LibraryError::Unsupported {
            operation: "add_song",
        })
    }

    /// Not available: playlist membership cannot be edited through the backend yet.
    pub async fn remove_song(
        &self,
        _playlist_id: impl IntoRecordId,
        _song_id: impl IntoRecordId,
    ) -> Result<bool> {
        Err(LibraryError::Unsupported {
            operation: "remove_song",
        })
    }

    /// Not available: playlist membership cannot be edited through the backend yet.
    pub async fn reorder_songs(
        &self,
        _playlist_id: impl IntoRecordId,
        _song_ids: &[i64],
    ) -> Result<bool> {
        Err(LibraryError::Unsupported {
            operation: "reorder_songs",
        })
    }
}
