//! End-to-end session flow: provider hands over a profile, the user edits it,
//! then signs out through the session provider.

use async_trait::async_trait;
use core_auth::{
    AuthError, LocalSession, ProfilePatch, SessionProvider, UserAction, UserProfile, UserState,
    UserStore,
};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus, EventStream};
use mockall::mock;

mock! {
    Session {}

    #[async_trait]
    impl SessionProvider for Session {
        async fn logout(&self) -> core_auth::Result<()>;
    }
}

fn provider_profile() -> UserProfile {
    serde_json::from_value(serde_json::json!({
        "Id": 42,
        "firstName": "Ana",
        "lastName": "Lima",
        "emailAddress": "ana@vibestream.io",
        "timezone": "UTC"
    }))
    .unwrap()
}

async fn sign_out(store: &UserStore, session: &dyn SessionProvider) -> core_auth::Result<()> {
    session.logout().await?;
    store.dispatch(UserAction::ClearProfile);
    Ok(())
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let bus = EventBus::new(16);
    let mut auth_events =
        EventStream::new(bus.subscribe()).filter(|event| matches!(event, CoreEvent::Auth(_)));
    let store = UserStore::new().with_event_bus(bus);

    store.dispatch(UserAction::SetInitialized(true));
    store.dispatch(UserAction::SetLoading(true));
    let state = store.dispatch(UserAction::SetProfile(Some(provider_profile())));
    assert!(state.is_authenticated);
    assert!(!state.loading);
    assert_eq!(state.user_id(), Some(42));

    let state = store.dispatch(UserAction::UpdateProfile(
        ProfilePatch::default().profile_picture("https://img.example.com/ana.png"),
    ));
    let profile = state.profile.unwrap();
    assert_eq!(profile.avatar_url(), "https://img.example.com/ana.png");
    assert_eq!(profile.extra["timezone"], "UTC");

    let mut session = MockSession::new();
    session.expect_logout().times(1).returning(|| Ok(()));
    sign_out(&store, &session).await.unwrap();

    assert_eq!(
        store.state(),
        UserState {
            is_initialized: true,
            ..UserState::default()
        }
    );

    assert_eq!(
        auth_events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::SignedIn { user_id: Some(42) })
    );
    assert_eq!(
        auth_events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::ProfileUpdated { user_id: Some(42) })
    );
    assert_eq!(
        auth_events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::SignedOut)
    );
}

#[tokio::test]
async fn test_failed_logout_keeps_session() {
    let store = UserStore::new();
    store.dispatch(UserAction::SetProfile(Some(provider_profile())));

    let mut session = MockSession::new();
    session
        .expect_logout()
        .returning(|| Err(AuthError::Provider("network down".into())));

    assert!(sign_out(&store, &session).await.is_err());
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn test_local_session_always_succeeds() {
    let store = UserStore::new();
    store.dispatch(UserAction::SetProfile(Some(provider_profile())));

    sign_out(&store, &LocalSession).await.unwrap();
    assert!(!store.is_authenticated());
}
