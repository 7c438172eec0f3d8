//! # Entity Services
//!
//! One generic [`RecordRepository`] does the envelope work; each service is
//! configuration on top of it (table, projection, domain filters).
//!
//! | Service | Table | Domain queries |
//! |---|---|---|
//! | [`SongService`] | `songs_c` | search, by genre, top charts, preview URL |
//! | [`PlaylistService`] | `playlists_c` | by owner, trending |
//! | [`ArtistService`] | `artists_c` | featured |
//! | [`GenreService`] | `genres_c` | none |
//!
//! Domain list queries swallow failures into `[]`; `get_all` and mutations
//! return errors; `get_by_id` returns `None` on any failure.

pub mod artist;
pub mod genre;
pub mod playlist;
pub mod record;
pub mod song;

pub use artist::ArtistService;
pub use genre::GenreService;
pub use playlist::PlaylistService;
pub use record::RecordRepository;
pub use song::SongService;
