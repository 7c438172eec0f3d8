//! # Catalog Library
//!
//! Typed access to the VibeStream catalog stored in the record backend.
//!
//! ```ignore
//! use core_library::{RecordRepository, SongService};
//!
//! let songs = SongService::new(RecordRepository::new(record_client));
//! let hits = songs.search("daft").await;
//! let charts = songs.get_top_charts(10).await;
//! ```

pub mod error;
pub mod ids;
pub mod models;
pub mod repositories;

pub use error::{LibraryError, Result};
pub use ids::{IntoRecordId, RecordId};
pub use models::{
    Artist, ArtistUpdate, ChartEntry, Entity, Genre, GenreUpdate, LookupRef, NewArtist, NewGenre,
    NewPlaylist, NewSong, Playlist, PlaylistUpdate, Song, SongRef, SongUpdate,
};
pub use repositories::{ArtistService, GenreService, PlaylistService, RecordRepository, SongService};
