//! # Page Controllers
//!
//! Framework-free controllers for the client's pages and widgets. A host UI
//! renders their state and forwards user intents; toasts come back as
//! [`Notice`] values and route changes as [`Navigation`] values.
//!
//! ## Load contract
//!
//! - User-scoped pages do nothing while nobody is signed in.
//! - A load moves the page to [`LoadState::Loading`], then to `Loaded` or
//!   `Failed` with a fixed user-facing message. Details go to the log only.
//! - Every load races the page's [`PageScope`]. After `unmount()` results are
//!   dropped and the state is left alone.
//! - Mutations reload the page only on success.

mod create_playlist;
mod following;
mod home;
mod liked_songs;
mod playlist_detail;
mod playlists;
mod profile_menu;

pub use create_playlist::CreatePlaylistForm;
pub use following::FollowingPage;
pub use home::HomePage;
pub use liked_songs::LikedSongsPage;
pub use playlist_detail::{EditForm, PlaylistDetailPage};
pub use playlists::PlaylistsPage;
pub use profile_menu::ProfileMenu;

use serde::Serialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// Transient message for the host to show as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Route change requested by a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub path: String,
}

impl Navigation {
    pub fn to(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// What a user intent produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub notice: Option<Notice>,
    pub navigation: Option<Navigation>,
}

impl Feedback {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            navigation: None,
        }
    }

    pub fn navigate(path: impl Into<String>) -> Self {
        Self {
            notice: None,
            navigation: Some(Navigation::to(path)),
        }
    }

    pub fn and_navigate(mut self, path: impl Into<String>) -> Self {
        self.navigation = Some(Navigation::to(path));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.notice.is_none() && self.navigation.is_none()
    }
}

impl From<Notice> for Feedback {
    fn from(notice: Notice) -> Self {
        Feedback::notice(notice)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
    /// The requested record does not exist. Not an error.
    NotFound(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Message to show in place of the content.
    pub fn message(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) | LoadState::NotFound(message) => Some(message),
            _ => None,
        }
    }
}

/// Lifetime of a mounted page. Cancelling it aborts in-flight loads.
#[derive(Debug, Clone, Default)]
pub struct PageScope {
    token: CancellationToken,
}

impl PageScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for hosts that unmount from another task.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Drive `future` unless the scope is cancelled first.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = future => Some(output),
        }
    }
}

/// Shared body of every list load.
pub(crate) async fn load_into<T, E, F>(
    scope: &PageScope,
    state: &mut LoadState<T>,
    failure: &str,
    future: F,
) -> Option<Notice>
where
    E: std::fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    if !scope.is_active() {
        return None;
    }

    *state = LoadState::Loading;
    match scope.run(future).await {
        None => {
            debug!("Page unmounted, dropping load result");
            None
        }
        Some(Ok(data)) => {
            *state = LoadState::Loaded(data);
            None
        }
        Some(Err(e)) => {
            error!(error = %e, "{}", failure);
            *state = LoadState::Failed(failure.to_string());
            Some(Notice::error(failure))
        }
    }
}
