//! Catalog entities as stored in the record backend.
//!
//! Column names carry the backend's `_c` suffix on the wire; the Rust side
//! uses plain names. Rows coming back from the backend are decoded leniently:
//! `null` becomes the field default, numbers may arrive as numeric strings,
//! and lookup columns accept either a bare id or an `{Id, Name}` object.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{parse_leading_int, RecordId};

/// A table-backed entity.
pub trait Entity: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Projection sent with every read.
    const FIELDS: &'static [&'static str];
    /// Human-readable name used in logs.
    const LABEL: &'static str;

    fn id(&self) -> RecordId;
}

pub const SONG_FIELDS: &[&str] = &[
    "Id",
    "title_c",
    "artist_c",
    "album_c",
    "albumArt_c",
    "duration_c",
    "playCount_c",
    "audioUrl_c",
    "genre_c",
];

pub const PLAYLIST_FIELDS: &[&str] = &[
    "Id",
    "name_c",
    "description_c",
    "coverImage_c",
    "userId_c",
    "songs_c",
];

pub const ARTIST_FIELDS: &[&str] = &[
    "Id",
    "name_c",
    "bio_c",
    "profileImage_c",
    "followerCount_c",
    "topSongs_c",
];

pub const GENRE_FIELDS: &[&str] = &["Id", "name_c", "icon_c"];

/// Reference to a row in another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRef {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LookupRef {
    pub fn new(id: RecordId) -> Self {
        Self { id, name: None }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                id: map.get("Id").and_then(value_as_i64)?,
                name: map.get("Name").and_then(Value::as_str).map(str::to_string),
            }),
            other => value_as_i64(other).map(Self::new),
        }
    }
}

impl<'de> Deserialize<'de> for LookupRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        LookupRef::from_value(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid lookup value: {}", value)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "Id", deserialize_with = "required_i64")]
    pub id: RecordId,
    #[serde(rename = "title_c", default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(rename = "artist_c", default, deserialize_with = "null_default")]
    pub artist: String,
    #[serde(rename = "album_c", default, deserialize_with = "null_default")]
    pub album: String,
    #[serde(rename = "albumArt_c", default, deserialize_with = "blank_as_none")]
    pub album_art: Option<String>,
    /// Seconds.
    #[serde(rename = "duration_c", default, deserialize_with = "lenient_i64")]
    pub duration: i64,
    #[serde(rename = "playCount_c", default, deserialize_with = "lenient_i64")]
    pub play_count: i64,
    #[serde(rename = "audioUrl_c", default, deserialize_with = "blank_as_none")]
    pub audio_url: Option<String>,
    #[serde(rename = "genre_c", default, deserialize_with = "optional_lookup")]
    pub genre: Option<LookupRef>,
}

impl Entity for Song {
    const TABLE: &'static str = "songs_c";
    const FIELDS: &'static [&'static str] = SONG_FIELDS;
    const LABEL: &'static str = "song";

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Entry of an ordered song list: a full row when the backend expands the
/// lookup, otherwise just the reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SongRef {
    Song(Box<Song>),
    Lookup(LookupRef),
}

impl SongRef {
    pub fn id(&self) -> RecordId {
        match self {
            SongRef::Song(song) => song.id,
            SongRef::Lookup(lookup) => lookup.id,
        }
    }

    pub fn song(&self) -> Option<&Song> {
        match self {
            SongRef::Song(song) => Some(song),
            SongRef::Lookup(_) => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            SongRef::Song(song) => Some(song.title.as_str()),
            SongRef::Lookup(lookup) => lookup.name.as_deref(),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match &value {
            Value::Object(map) if map.contains_key("title_c") => serde_json::from_value(value)
                .ok()
                .map(|song| SongRef::Song(Box::new(song))),
            _ => LookupRef::from_value(&value).map(SongRef::Lookup),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "Id", deserialize_with = "required_i64")]
    pub id: RecordId,
    #[serde(rename = "name_c", default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "description_c", default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(rename = "coverImage_c", default, deserialize_with = "blank_as_none")]
    pub cover_image: Option<String>,
    #[serde(rename = "userId_c", default, deserialize_with = "optional_lookup")]
    pub user_id: Option<LookupRef>,
    /// Playback and display order.
    #[serde(rename = "songs_c", default, deserialize_with = "song_list")]
    pub songs: Vec<SongRef>,
}

impl Playlist {
    /// Songs whose rows were expanded by the backend, in playlist order.
    pub fn expanded_songs(&self) -> Vec<Song> {
        self.songs
            .iter()
            .filter_map(SongRef::song)
            .cloned()
            .collect()
    }

    pub fn owner_id(&self) -> Option<RecordId> {
        self.user_id.as_ref().map(|owner| owner.id)
    }
}

impl Entity for Playlist {
    const TABLE: &'static str = "playlists_c";
    const FIELDS: &'static [&'static str] = PLAYLIST_FIELDS;
    const LABEL: &'static str = "playlist";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(rename = "Id", deserialize_with = "required_i64")]
    pub id: RecordId,
    #[serde(rename = "name_c", default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "bio_c", default, deserialize_with = "null_default")]
    pub bio: String,
    #[serde(rename = "profileImage_c", default, deserialize_with = "blank_as_none")]
    pub profile_image: Option<String>,
    #[serde(rename = "followerCount_c", default, deserialize_with = "lenient_i64")]
    pub follower_count: i64,
    #[serde(rename = "topSongs_c", default, deserialize_with = "song_list")]
    pub top_songs: Vec<SongRef>,
}

impl Entity for Artist {
    const TABLE: &'static str = "artists_c";
    const FIELDS: &'static [&'static str] = ARTIST_FIELDS;
    const LABEL: &'static str = "artist";

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "Id", deserialize_with = "required_i64")]
    pub id: RecordId,
    #[serde(rename = "name_c", default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(rename = "icon_c", default, deserialize_with = "blank_as_none")]
    pub icon: Option<String>,
}

impl Entity for Genre {
    const TABLE: &'static str = "genres_c";
    const FIELDS: &'static [&'static str] = GENRE_FIELDS;
    const LABEL: &'static str = "genre";

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Top-charts row. `previous_rank` stays empty until the backend keeps
/// chart history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    pub rank: u32,
    pub song: Song,
    pub previous_rank: Option<u32>,
}

// Drafts. `None` fields are never sent.

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewSong {
    #[serde(rename = "title_c")]
    pub title: String,
    #[serde(rename = "artist_c")]
    pub artist: String,
    #[serde(rename = "album_c", skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(rename = "albumArt_c", skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(rename = "duration_c", skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(rename = "playCount_c", skip_serializing_if = "Option::is_none")]
    pub play_count: Option<i64>,
    #[serde(rename = "audioUrl_c", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(rename = "genre_c", skip_serializing_if = "Option::is_none")]
    pub genre: Option<RecordId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SongUpdate {
    #[serde(rename = "title_c", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "artist_c", skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(rename = "album_c", skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(rename = "albumArt_c", skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(rename = "duration_c", skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(rename = "playCount_c", skip_serializing_if = "Option::is_none")]
    pub play_count: Option<i64>,
    #[serde(rename = "audioUrl_c", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(rename = "genre_c", skip_serializing_if = "Option::is_none")]
    pub genre: Option<RecordId>,
}

/// Playlist to create. Missing description and cover are stored as `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewPlaylist {
    #[serde(rename = "name_c")]
    pub name: String,
    #[serde(rename = "description_c")]
    pub description: Option<String>,
    #[serde(rename = "coverImage_c")]
    pub cover_image: Option<String>,
    #[serde(rename = "userId_c")]
    pub user_id: Option<RecordId>,
}

impl NewPlaylist {
    pub fn new(name: impl Into<String>, user_id: RecordId) -> Self {
        Self {
            name: name.into(),
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cover_image(mut self, cover_image: impl Into<String>) -> Self {
        self.cover_image = Some(cover_image.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaylistUpdate {
    #[serde(rename = "name_c", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "description_c", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "coverImage_c", skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl PlaylistUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.cover_image.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewArtist {
    #[serde(rename = "name_c")]
    pub name: String,
    #[serde(rename = "bio_c", skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "profileImage_c", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(rename = "followerCount_c", skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtistUpdate {
    #[serde(rename = "name_c", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "bio_c", skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "profileImage_c", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(rename = "followerCount_c", skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewGenre {
    #[serde(rename = "name_c")]
    pub name: String,
    #[serde(rename = "icon_c", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenreUpdate {
    #[serde(rename = "name_c", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "icon_c", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_i64(&value).unwrap_or_default())
}

fn required_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_i64(&value).ok_or_else(|| de::Error::custom(format!("invalid record id: {}", value)))
}

fn optional_lookup<'de, D>(deserializer: D) -> Result<Option<LookupRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(LookupRef::from_value(&value))
}

/// Accepts `null`, an array of rows/ids/lookups, or a comma separated id string.
fn song_list<'de, D>(deserializer: D) -> Result<Vec<SongRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().filter_map(SongRef::from_value).collect(),
        Value::String(joined) => joined
            .split(',')
            .filter_map(parse_leading_int)
            .map(|id| SongRef::Lookup(LookupRef::new(id)))
            .collect(),
        Value::Null => Vec::new(),
        other => SongRef::from_value(other).into_iter().collect(),
    })
}
