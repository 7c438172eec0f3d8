//! # Core Configuration
//!
//! [`CoreConfig`] carries everything the VibeStream core needs to talk to the
//! record backend plus a few presentation defaults (list sizes, preview URL).
//!
//! The builder validates eagerly so a misconfigured host fails at startup
//! with an actionable message instead of on the first request.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .backend_url("https://records.example.com")
//!     .project_id("vibestream")
//!     .public_key("pk_live_123")
//!     .build()?;
//! ```
//!
//! Hosts that inject their own `RecordClient` may omit the backend settings
//! entirely; only the HTTP adapter requires them.
//!
//! ## Environment
//!
//! [`CoreConfig::from_env`] reads:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `VIBESTREAM_BACKEND_URL` | Record backend base URL |
//! | `VIBESTREAM_PROJECT_ID` | Backend project identifier |
//! | `VIBESTREAM_PUBLIC_KEY` | Project public key |
//! | `VIBESTREAM_REQUEST_TIMEOUT_SECS` | Per-request timeout (optional) |
//! | `VIBESTREAM_PREVIEW_URL_TEMPLATE` | Preview URL template (optional) |

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Placeholder substituted with the song id in [`CoreConfig::preview_url_template`].
pub const PREVIEW_ID_PLACEHOLDER: &str = "{id}";

pub const DEFAULT_PREVIEW_URL_TEMPLATE: &str =
    "https://cdn.vibestream.io/previews/song-{id}-preview.mp3";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_EVENT_BUFFER: usize = 256;
const MAX_LIST_LIMIT: u32 = 500;

/// Connection settings for the hosted record backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: Url,
    pub project_id: String,
    pub public_key: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .field("public_key", &"[REDACTED]")
            .finish()
    }
}

/// Default sizes for the home page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    pub featured_artists: u32,
    pub trending_playlists: u32,
    pub top_charts: u32,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            featured_artists: 6,
            trending_playlists: 8,
            top_charts: 10,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// `None` when the host supplies its own record client.
    pub backend: Option<BackendConfig>,
    pub request_timeout: Duration,
    pub limits: ListLimits,
    /// Used for songs without an `audioUrl_c`; must contain `{id}`.
    pub preview_url_template: String,
    pub event_buffer_size: usize,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("backend", &self.backend)
            .field("request_timeout", &self.request_timeout)
            .field("limits", &self.limits)
            .field("preview_url_template", &self.preview_url_template)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            backend: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            limits: ListLimits::default(),
            preview_url_template: DEFAULT_PREVIEW_URL_TEMPLATE.to_string(),
            event_buffer_size: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Build from `VIBESTREAM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = CoreConfig::builder();

        if let Some(url) = get("VIBESTREAM_BACKEND_URL") {
            builder = builder.backend_url(url);
        }
        if let Some(project) = get("VIBESTREAM_PROJECT_ID") {
            builder = builder.project_id(project);
        }
        if let Some(key) = get("VIBESTREAM_PUBLIC_KEY") {
            builder = builder.public_key(key);
        }
        if let Some(raw) = get("VIBESTREAM_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "VIBESTREAM_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(template) = get("VIBESTREAM_PREVIEW_URL_TEMPLATE") {
            builder = builder.preview_url_template(template);
        }

        builder.build()
    }

    /// Backend settings, or a capability error for hosts that must provide them.
    pub fn require_backend(&self) -> Result<&BackendConfig> {
        self.backend.as_ref().ok_or_else(|| Error::CapabilityMissing {
            capability: "RecordClient".to_string(),
            message: "No backend configured. Set backend_url, project_id and public_key, \
                      or inject a RecordClient implementation."
                .to_string(),
        })
    }

    /// Preview URL for a song id using the configured template.
    pub fn preview_url_for(&self, song_id: i64) -> String {
        self.preview_url_template
            .replace(PREVIEW_ID_PLACEHOLDER, &song_id.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(backend) = &self.backend {
            if backend.project_id.trim().is_empty() {
                return Err(Error::Config("Project id cannot be empty".to_string()));
            }
            if backend.public_key.trim().is_empty() {
                return Err(Error::Config("Public key cannot be empty".to_string()));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        for (name, value) in [
            ("featured artists", self.limits.featured_artists),
            ("trending playlists", self.limits.trending_playlists),
            ("top charts", self.limits.top_charts),
        ] {
            if value == 0 || value > MAX_LIST_LIMIT {
                return Err(Error::Config(format!(
                    "List limit for {} must be between 1 and {}, got {}",
                    name, MAX_LIST_LIMIT, value
                )));
            }
        }

        if !self.preview_url_template.contains(PREVIEW_ID_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "Preview URL template must contain '{}'",
                PREVIEW_ID_PLACEHOLDER
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`CoreConfig`].
///
/// Backend settings are all-or-nothing: providing any of `backend_url`,
/// `project_id` or `public_key` requires the other two.
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    backend_url: Option<String>,
    project_id: Option<String>,
    public_key: Option<String>,
    request_timeout: Option<Duration>,
    limits: Option<ListLimits>,
    preview_url_template: Option<String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn limits(mut self, limits: ListLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn preview_url_template(mut self, template: impl Into<String>) -> Self {
        self.preview_url_template = Some(template.into());
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn build(self) -> Result<CoreConfig> {
        let backend = match (self.backend_url, self.project_id, self.public_key) {
            (None, None, None) => None,
            (Some(url), Some(project_id), Some(public_key)) => Some(BackendConfig {
                base_url: parse_backend_url(&url)?,
                project_id,
                public_key,
            }),
            (url, project, key) => {
                let missing: Vec<&str> = [
                    ("backend_url", url.is_none()),
                    ("project_id", project.is_none()),
                    ("public_key", key.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                return Err(Error::Config(format!(
                    "Incomplete backend configuration, missing: {}",
                    missing.join(", ")
                )));
            }
        };

        let defaults = CoreConfig::default();
        let config = CoreConfig {
            backend,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            limits: self.limits.unwrap_or(defaults.limits),
            preview_url_template: self
                .preview_url_template
                .unwrap_or(defaults.preview_url_template),
            event_buffer_size: self.event_buffer_size.unwrap_or(defaults.event_buffer_size),
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_backend_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid backend URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Backend URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(url)
}
