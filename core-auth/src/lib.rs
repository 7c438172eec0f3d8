//! # Session State
//!
//! Client-side record of who is signed in.
//!
//! - [`UserProfile`] / [`ProfilePatch`]: the profile handed over by the auth provider
//! - [`UserState`], [`UserAction`], [`reduce`]: pure state transitions
//! - [`UserStore`]: injectable, observable container for the state
//! - [`SessionProvider`]: how the core asks the provider to end a session

pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use error::{AuthError, Result};
pub use session::{LocalSession, SessionProvider};
pub use store::{reduce, UserAction, UserState, UserStore};
pub use types::{encode_uri_component, initials_avatar_url, ProfilePatch, UserProfile};
