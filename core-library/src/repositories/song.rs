//! Song catalog queries.

use bridge_traits::records::{Condition, GroupCondition, SortType, WhereGroup};
use core_runtime::config::{DEFAULT_PREVIEW_URL_TEMPLATE, PREVIEW_ID_PLACEHOLDER};
use tracing::{debug, instrument, warn};

use crate::error::{LibraryError, Result};
use crate::ids::IntoRecordId;
use crate::models::{ChartEntry, NewSong, Song, SongUpdate};
use crate::repositories::RecordRepository;

const SEARCHABLE_FIELDS: &[&str] = &["title_c", "artist_c", "album_c"];

#[derive(Clone)]
pub struct SongService {
    repo: RecordRepository<Song>,
    preview_url_template: String,
}

impl SongService {
    pub fn new(repo: RecordRepository<Song>) -> Self {
        Self {
            repo,
            preview_url_template: DEFAULT_PREVIEW_URL_TEMPLATE.to_string(),
        }
    }

    /// Template for songs without an audio URL; `{id}` is replaced by the song id.
    pub fn with_preview_url_template(mut self, template: impl Into<String>) -> Self {
        self.preview_url_template = template.into();
        self
    }

    pub async fn get_all(&self) -> Result<Vec<Song>> {
        self.repo.fetch_all(self.repo.query()).await
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Option<Song> {
        self.repo.find_by_id(id).await
    }

    #[instrument(skip(self, genre_id), fields(genre_id = %genre_id))]
    pub async fn get_by_genre(&self, genre_id: impl IntoRecordId) -> Vec<Song> {
        let Some(genre_id) = genre_id.into_record_id() else {
            warn!("Ignoring genre filter with a non-numeric id");
            return Vec::new();
        };

        let query = self
            .repo
            .query()
            .filter(Condition::equal_to("genre_c", genre_id));
        self.repo.fetch_or_empty(query).await
    }

    /// Case handling is left to the backend's `Contains`. Blank input never
    /// reaches the backend.
    pub async fn search(&self, query: &str) -> Vec<Song> {
        if query.trim().is_empty() {
            debug!("Skipping blank song search");
            return Vec::new();
        }

        let group = WhereGroup::any_of(
            SEARCHABLE_FIELDS
                .iter()
                .map(|field| GroupCondition::contains(*field, query)),
        );
        self.repo.fetch_or_empty(self.repo.query().group(group)).await
    }

    /// Most played songs, ranked from 1 in the order the backend returns them.
    pub async fn get_top_charts(&self, limit: u32) -> Vec<ChartEntry> {
        let query = self
            .repo
            .query()
            .order_by("playCount_c", SortType::Desc)
            .page(limit, 0);

        self.repo
            .fetch_or_empty(query)
            .await
            .into_iter()
            .zip(1u32..)
            .map(|(song, rank)| ChartEntry {
                rank,
                song,
                previous_rank: None,
            })
            .collect()
    }

    /// The song's own audio URL, or the preview template when it has none or
    /// cannot be fetched.
    pub async fn get_preview_url(&self, id: impl IntoRecordId) -> Result<String> {
        let song_id = id
            .into_record_id()
            .ok_or_else(|| LibraryError::invalid_id("songId", &id))?;

        let audio_url = self
            .repo
            .find_by_id(song_id)
            .await
            .and_then(|song| song.audio_url);

        Ok(audio_url.unwrap_or_else(|| {
            self.preview_url_template
                .replace(PREVIEW_ID_PLACEHOLDER, &song_id.to_string())
        }))
    }

    pub async fn create(&self, song: &NewSong) -> Result<Option<Song>> {
        self.repo.create(song).await
    }

    pub async fn update(&self, id: impl IntoRecordId, patch: &SongUpdate) -> Result<Option<Song>> {
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool> {
        self.repo.delete(id).await
    }

    /// Not available: there is no liked-songs relation in the backend yet.
    pub async fn toggle_like(
        &self,
        _song_id: impl IntoRecordId,
        _user_id: impl IntoRecordId,
    ) -> Result<bool> {
        Err(LibraryError::Unsupported {
            operation: "toggle_like",
        })
    }

    /// Not available: there is no liked-songs relation in the backend yet.
    pub async fn get_liked_songs(&self, _user_id: impl IntoRecordId) -> Result<Vec<Song>> {
        Err(LibraryError::Unsupported {
            operation: "get_liked_songs",
        })
    }

    /// Not available: there is no liked-songs relation in the backend yet.
    pub async fn is_liked(
        &self,
        _song_id: impl IntoRecordId,
        _user_id: impl IntoRecordId,
    ) -> Result<bool> {
        Err(LibraryError::Unsupported {
            operation: "is_liked",
        })
    }
}
