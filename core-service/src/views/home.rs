use core_library::{Artist, ChartEntry, Genre, Playlist, Song};
use tracing::{error, instrument};

use super::{LoadState, Notice, PageScope};
use crate::context::PageContext;

const GENRES_FAILED: &str = "Failed to load genres";

/// Landing page. Sections load concurrently and fail independently.
pub struct HomePage {
    ctx: PageContext,
    scope: PageScope,
    featured_artists: LoadState<Vec<Artist>>,
    trending_playlists: LoadState<Vec<Playlist>>,
    top_charts: LoadState<Vec<ChartEntry>>,
    genres: LoadState<Vec<Genre>>,
}

impl HomePage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            scope: PageScope::new(),
            featured_artists: LoadState::Idle,
            trending_playlists: LoadState::Idle,
            top_charts: LoadState::Idle,
            genres: LoadState::Idle,
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Option<Notice> {
        if !self.scope.is_active() {
            return None;
        }

        self.featured_artists = LoadState::Loading;
        self.trending_playlists = LoadState::Loading;
        self.top_charts = LoadState::Loading;
        self.genres = LoadState::Loading;

        let catalog = &self.ctx.catalog;
        let limits = self.ctx.limits;
        let sections = self
            .scope
            .run(async {
                tokio::join!(
                    catalog.artists.get_featured(limits.featured_artists),
                    catalog.playlists.get_trending(limits.trending_playlists),
                    catalog.songs.get_top_charts(limits.top_charts),
                    catalog.genres.get_all(),
                )
            })
            .await;

        let (artists, playlists, charts, genres) = sections?;
        self.featured_artists = LoadState::Loaded(artists);
        self.trending_playlists = LoadState::Loaded(playlists);
        self.top_charts = LoadState::Loaded(charts);

        match genres {
            Ok(genres) => {
                self.genres = LoadState::Loaded(genres);
                None
            }
            Err(e) => {
                error!(error = %e, "{}", GENRES_FAILED);
                self.genres = LoadState::Failed(GENRES_FAILED.to_string());
                Some(Notice::error(GENRES_FAILED))
            }
        }
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

    pub fn featured_artists(&self) -> &LoadState<Vec<Artist>> {
        &self.featured_artists
    }

    pub fn trending_playlists(&self) -> &LoadState<Vec<Playlist>> {
        &self.trending_playlists
    }

    pub fn top_charts(&self) -> &LoadState<Vec<ChartEntry>> {
        &self.top_charts
    }

    pub fn genres(&self) -> &LoadState<Vec<Genre>> {
        &self.genres
    }

    pub fn play_chart_entry(&self, entry: &ChartEntry) {
        self.ctx.playback.play_song(entry.song.clone());
    }

    /// Queue the whole chart, starting at rank 1.
    pub fn play_charts(&self) -> bool {
        let songs: Vec<Song> = self
            .top_charts
            .data()
            .map(|entries| entries.iter().map(|entry| entry.song.clone()).collect())
            .unwrap_or_default();
        self.ctx.playback.play_all(songs)
    }
}
