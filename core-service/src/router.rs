//! # Route Table
//!
//! Paths resolve against an explicit table of patterns. Each entry carries an
//! access rule and an async factory that builds the page and finishes its
//! first load before the host renders it.
//!
//! | Pattern | Page | Access |
//! |---|---|---|
//! | `""` | Home | authenticated |
//! | `playlists` | Playlists | authenticated |
//! | `playlists/:id` | Playlist detail | authenticated |
//! | `liked-songs` | Liked songs | authenticated |
//! | `following` | Following | authenticated |
//! | `*` | Not found | authenticated |
//! | `login`, `signup`, `callback`, `error` | Auth screens (host-rendered) | public |

use core_auth::encode_uri_component;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::context::PageContext;
use crate::views::{
    FollowingPage, HomePage, LikedSongsPage, Navigation, Notice, PlaylistDetailPage,
    PlaylistsPage,
};

const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Requires a signed-in user.
    Authenticated,
    Public,
}

/// Screens owned by the external auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Signup,
    Callback,
    Error,
}

pub enum Page {
    Home(HomePage),
    Playlists(PlaylistsPage),
    PlaylistDetail(PlaylistDetailPage),
    LikedSongs(LikedSongsPage),
    Following(FollowingPage),
    NotFound,
    Auth(AuthScreen),
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Home(_) => "home",
            Page::Playlists(_) => "playlists",
            Page::PlaylistDetail(_) => "playlist-detail",
            Page::LikedSongs(_) => "liked-songs",
            Page::Following(_) => "following",
            Page::NotFound => "not-found",
            Page::Auth(AuthScreen::Login) => "login",
            Page::Auth(AuthScreen::Signup) => "signup",
            Page::Auth(AuthScreen::Callback) => "callback",
            Page::Auth(AuthScreen::Error) => "error",
        }
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Page").field(&self.name()).finish()
    }
}

/// Page plus whatever its first load reported.
#[derive(Debug)]
pub struct Rendered {
    pub page: Page,
    pub notice: Option<Notice>,
}

impl Rendered {
    fn plain(page: Page) -> Self {
        Self { page, notice: None }
    }
}

/// Named segments captured by a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

pub type PageFactory = Arc<dyn Fn(PageContext, RouteParams) -> BoxFuture<'static, Rendered> + Send + Sync>;

#[derive(Clone)]
pub struct Route {
    pub pattern: &'static str,
    pub access: Access,
    factory: PageFactory,
}

impl Route {
    pub fn new<F>(pattern: &'static str, access: Access, factory: F) -> Self
    where
        F: Fn(PageContext, RouteParams) -> BoxFuture<'static, Rendered> + Send + Sync + 'static,
    {
        Self {
            pattern,
            access,
            factory: Arc::new(factory),
        }
    }

    fn is_fallback(&self) -> bool {
        self.pattern == "*"
    }

    fn capture(&self, segments: &[&str]) -> Option<RouteParams> {
        let pattern: Vec<&str> = split_segments(self.pattern);
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, actual) in pattern.iter().zip(segments) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), (*actual).to_string());
                }
                None if expected == actual => {}
                None => return None,
            }
        }
        Some(RouteParams(params))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("access", &self.access)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub pattern: &'static str,
    pub access: Access,
    pub params: RouteParams,
}

#[derive(Debug)]
pub enum NavigationOutcome {
    Rendered(Rendered),
    /// The route needs a signed-in user.
    Redirect(Navigation),
}

#[derive(Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Match `path`, ignoring any query string and surrounding slashes.
    /// Literal patterns win over the `*` fallback.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        self.find(path).map(|(route, params)| RouteMatch {
            pattern: route.pattern,
            access: route.access,
            params,
        })
    }

    /// Authorise against the signed-in state, then build and load the page.
    #[instrument(skip(self, ctx))]
    pub async fn navigate(&self, ctx: &PageContext, path: &str) -> NavigationOutcome {
        let Some((route, params)) = self.find(path) else {
            debug!("No route matched");
            return NavigationOutcome::Rendered(Rendered::plain(Page::NotFound));
        };

        if route.access == Access::Authenticated && !ctx.store.is_authenticated() {
            debug!(pattern = route.pattern, "Redirecting to login");
            return NavigationOutcome::Redirect(login_redirect(path));
        }

        NavigationOutcome::Rendered((route.factory)(ctx.clone(), params).await)
    }

    fn find(&self, path: &str) -> Option<(&Route, RouteParams)> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = split_segments(path);

        self.routes
            .iter()
            .filter(|route| !route.is_fallback())
            .find_map(|route| route.capture(&segments).map(|params| (route, params)))
            .or_else(|| {
                self.routes
                    .iter()
                    .find(|route| route.is_fallback())
                    .map(|route| (route, RouteParams::default()))
            })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(default_routes())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.routes).finish()
    }
}

/// `/login?redirect=<path>` with the path percent-encoded.
pub fn login_redirect(path: &str) -> Navigation {
    Navigation::to(format!("{}?redirect={}", LOGIN_PATH, encode_uri_component(path)))
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn auth_route(pattern: &'static str, screen: AuthScreen) -> Route {
    Route::new(pattern, Access::Public, move |_, _| {
        async move { Rendered::plain(Page::Auth(screen)) }.boxed()
    })
}

pub fn default_routes() -> Vec<Route> {
    vec![
        Route::new("", Access::Authenticated, |ctx, _| {
            async move {
                let mut page = HomePage::new(ctx);
                let notice = page.load().await;
                Rendered {
                    page: Page::Home(page),
                    notice,
                }
            }
            .boxed()
        }),
        Route::new("playlists", Access::Authenticated, |ctx, _| {
            async move {
                let mut page = PlaylistsPage::new(ctx);
                let notice = page.load().await;
                Rendered {
                    page: Page::Playlists(page),
                    notice,
                }
            }
            .boxed()
        }),
        Route::new("playlists/:id", Access::Authenticated, |ctx, params| {
            async move {
                let id = params.get("id").unwrap_or_default().to_string();
                let mut page = PlaylistDetailPage::new(ctx, id);
                let notice = page.load().await;
                Rendered {
                    page: Page::PlaylistDetail(page),
                    notice,
                }
            }
            .boxed()
        }),
        Route::new("liked-songs", Access::Authenticated, |ctx, _| {
            async move {
                let mut page = LikedSongsPage::new(ctx);
                let notice = page.load().await;
                Rendered {
                    page: Page::LikedSongs(page),
                    notice,
                }
            }
            .boxed()
        }),
        Route::new("following", Access::Authenticated, |ctx, _| {
            async move {
                let mut page = FollowingPage::new(ctx);
                let notice = page.load().await;
                Rendered {
                    page: Page::Following(page),
                    notice,
                }
            }
            .boxed()
        }),
        Route::new("*", Access::Authenticated, |_, _| {
            async { Rendered::plain(Page::NotFound) }.boxed()
        }),
        auth_route("login", AuthScreen::Login),
        auth_route("signup", AuthScreen::Signup),
        auth_route("callback", AuthScreen::Callback),
        auth_route("error", AuthScreen::Error),
    ]
}
