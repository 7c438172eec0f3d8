//! User session store.
//!
//! State transitions are a pure function ([`reduce`]) over an immutable
//! snapshot; [`UserStore`] wraps it in a `tokio::sync::watch` channel so views
//! can read the latest state or await changes.

use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::types::{ProfilePatch, UserProfile};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub profile: Option<UserProfile>,
    pub is_authenticated: bool,
    pub is_initialized: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl UserState {
    /// Id of the signed-in user, if the profile carries one.
    pub fn user_id(&self) -> Option<i64> {
        self.profile.as_ref().and_then(|profile| profile.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Replace the profile. `None` behaves like signing out but keeps
    /// `is_initialized`.
    SetProfile(Option<UserProfile>),
    UpdateProfile(ProfilePatch),
    ClearProfile,
    SetInitialized(bool),
    SetLoading(bool),
    /// Also forces `loading` off.
    SetError(Option<String>),
}

/// Compute the next state. Never mutates `state`.
pub fn reduce(state: &UserState, action: UserAction) -> UserState {
    let mut next = state.clone();

    match action {
        UserAction::SetProfile(profile) => {
            next.is_authenticated = profile.is_some();
            next.profile = profile;
            next.loading = false;
            next.error = None;
        }
        UserAction::UpdateProfile(patch) => {
            let base = next.profile.take().unwrap_or_default();
            next.profile = Some(patch.apply_to(base));
        }
        UserAction::ClearProfile => {
            next.profile = None;
            next.is_authenticated = false;
            next.loading = false;
            next.error = None;
        }
        UserAction::SetInitialized(initialized) => next.is_initialized = initialized,
        UserAction::SetLoading(loading) => next.loading = loading,
        UserAction::SetError(error) => {
            next.error = error;
            next.loading = false;
        }
    }

    next
}

/// Cloneable handle to the session state. Clones share the same state.
#[derive(Clone)]
pub struct UserStore {
    sender: Arc<watch::Sender<UserState>>,
    event_bus: Option<EventBus>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::with_state(UserState::default())
    }

    pub fn with_state(initial: UserState) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
            event_bus: None,
        }
    }

    /// Announce sign-in, sign-out and profile updates on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Apply `action` and return the resulting snapshot.
    pub fn dispatch(&self, action: UserAction) -> UserState {
        let event = self.event_bus.as_ref().and_then(|_| event_for(&action));

        let mut snapshot = UserState::default();
        self.sender.send_modify(|state| {
            *state = reduce(state, action);
            snapshot = state.clone();
        });

        debug!(
            authenticated = snapshot.is_authenticated,
            loading = snapshot.loading,
            "User state updated"
        );

        if let (Some(bus), Some(event)) = (self.event_bus.as_ref(), event) {
            let event = match event {
                AuthEvent::ProfileUpdated { .. } => AuthEvent::ProfileUpdated {
                    user_id: snapshot.user_id(),
                },
                other => other,
            };
            if bus.emit(CoreEvent::Auth(event)).is_err() {
                debug!("No subscribers for auth event");
            }
        }

        snapshot
    }

    pub fn state(&self) -> UserState {
        self.sender.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.sender.borrow().profile.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_authenticated
    }

    /// Receiver that observes every dispatched change.
    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.sender.subscribe()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.sender.borrow();
        f.debug_struct("UserStore")
            .field("is_authenticated", &state.is_authenticated)
            .field("is_initialized", &state.is_initialized)
            .field("has_event_bus", &self.event_bus.is_some())
            .finish()
    }
}

fn event_for(action: &UserAction) -> Option<AuthEvent> {
    match action {
        UserAction::SetProfile(Some(profile)) => Some(AuthEvent::SignedIn {
            user_id: profile.id,
        }),
        UserAction::SetProfile(None) | UserAction::ClearProfile => Some(AuthEvent::SignedOut),
        UserAction::UpdateProfile(_) => Some(AuthEvent::ProfileUpdated { user_id: None }),
        UserAction::SetError(Some(message)) => {
            warn!(error = %message, "Session error recorded");
            Some(AuthEvent::SessionError {
                message: message.clone(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, last: &str) -> UserProfile {
        UserProfile {
            id: Some(7),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_profile_authenticates_and_clears_error() {
        let state = UserState {
            loading: true,
            error: Some("boom".into()),
            ..Default::default()
        };

        let next = reduce(&state, UserAction::SetProfile(Some(profile("A", "B"))));

        assert!(next.is_authenticated);
        assert!(!next.loading);
        assert_eq!(next.error, None);
        assert_eq!(next.user_id(), Some(7));
        assert!(state.profile.is_none());
    }

    #[test]
    fn test_set_profile_none_is_unauthenticated() {
        let signed_in = reduce(&UserState::default(), UserAction::SetProfile(Some(profile("A", "B"))));
        let next = reduce(&signed_in, UserAction::SetProfile(None));

        assert!(!next.is_authenticated);
        assert!(next.profile.is_none());
    }

    #[test]
    fn test_set_then_clear_returns_initial_state() {
        let state = reduce(&UserState::default(), UserAction::SetProfile(Some(profile("A", "B"))));
        let state = reduce(&state, UserAction::ClearProfile);

        assert_eq!(state, UserState::default());
    }

    #[test]
    fn test_clear_keeps_initialized_flag() {
        let state = reduce(&UserState::default(), UserAction::SetInitialized(true));
        let state = reduce(&state, UserAction::ClearProfile);

        assert!(state.is_initialized);
    }

    #[test]
    fn test_update_profile_merges() {
        let state = reduce(&UserState::default(), UserAction::SetProfile(Some(profile("A", "B"))));
        let state = reduce(
            &state,
            UserAction::UpdateProfile(ProfilePatch::default().first_name("X")),
        );

        let updated = state.profile.unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("X"));
        assert_eq!(updated.last_name.as_deref(), Some("B"));
    }

    #[test]
    fn test_update_profile_without_profile_starts_empty() {
        let state = reduce(
            &UserState::default(),
            UserAction::UpdateProfile(ProfilePatch::default().last_name("Only")),
        );

        let profile = state.profile.unwrap();
        assert_eq!(profile.first_name, None);
        assert_eq!(profile.last_name.as_deref(), Some("Only"));
        assert!(!state.is_authenticated);
    }

    #[test]
    fn test_set_error_stops_loading() {
        let state = reduce(&UserState::default(), UserAction::SetLoading(true));
        assert!(state.loading);

        let state = reduce(&state, UserAction::SetError(Some("Session expired".into())));
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Session expired"));
    }

    #[tokio::test]
    async fn test_store_notifies_watchers() {
        let store = UserStore::new();
        let mut watcher = store.subscribe();
        let handle = store.clone();

        handle.dispatch(UserAction::SetProfile(Some(profile("A", "B"))));

        watcher.changed().await.unwrap();
        assert!(watcher.borrow().is_authenticated);
        assert!(store.is_authenticated());
        assert_eq!(store.current_user().unwrap().display_name(), "A B");
    }

    #[tokio::test]
    async fn test_store_emits_auth_events() {
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let store = UserStore::new().with_event_bus(bus);

        store.dispatch(UserAction::SetProfile(Some(profile("A", "B"))));
        store.dispatch(UserAction::UpdateProfile(ProfilePatch::default().first_name("C")));
        store.dispatch(UserAction::SetLoading(true));
        store.dispatch(UserAction::ClearProfile);

        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SignedIn { user_id: Some(7) })
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::ProfileUpdated { user_id: Some(7) })
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SignedOut)
        );
    }
}
