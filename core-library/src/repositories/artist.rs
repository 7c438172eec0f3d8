//! Artist queries.

use bridge_traits::records::SortType;

use crate::error::{LibraryError, Result};
use crate::ids::IntoRecordId;
use crate::models::{Artist, ArtistUpdate, NewArtist};
use crate::repositories::RecordRepository;

#[derive(Clone)]
pub struct ArtistService {
    repo: RecordRepository<Artist>,
}

impl ArtistService {
    pub fn new(repo: RecordRepository<Artist>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> Result<Vec<Artist>> {
        self.repo.fetch_all(self.repo.query()).await
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Option<Artist> {
        self.repo.find_by_id(id).await
    }

    /// Artists with the most followers first.
    pub async fn get_featured(&self, limit: u32) -> Vec<Artist> {
        let query = self
            .repo
            .query()
            .order_by("followerCount_c", SortType::Desc)
            .page(limit, 0);
        self.repo.fetch_or_empty(query).await
    }

    pub async fn create(&self, artist: &NewArtist) -> Result<Option<Artist>> {
        self.repo.create(artist).await
    }

    pub async fn update(&self, id: impl IntoRecordId, patch: &ArtistUpdate) -> Result<Option<Artist>> {
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool> {
        self.repo.delete(id).await
    }

    /// Not available: there is no follow relation in the backend yet.
    pub async fn toggle_follow(
        &self,
        _artist_id: impl IntoRecordId,
        _user_id: impl IntoRecordId,
    ) -> Result<bool> {
        Err(LibraryError::Unsupported {
            operation: "toggle_follow",
        })
    }

    /// Not available: there is no follow relation in the backend yet.
    pub async fn get_followed_artists(&self, _user_id: impl IntoRecordId) -> Result<Vec<Artist>> {
        Err(LibraryError::Unsupported {
            operation: "get_followed_artists",
        })
    }

    /// Not available: there is no follow relation in the backend yet.
    pub async fn is_following(
        &self,
        _artist_id: impl IntoRecordId,
        _user_id: impl IntoRecordId,
    ) -> Result<bool> {
        Err(LibraryError::Unsupported {
            operation: "is_following",
        })
    }
}
