use bridge_desktop::MemoryRecordClient;
use core_auth::{LocalSession, UserAction, UserProfile};
use core_runtime::config::CoreConfig;
use core_runtime::events::{AuthEvent, CoreEvent, LibraryEvent};
use core_service::{AuthScreen, CoreService, NavigationOutcome, Page};
use serde_json::json;
use std::sync::Arc;

fn service() -> CoreService {
    let records = MemoryRecordClient::new().with_table(
        "playlists_c",
        vec![json!({"name_c": "Evening", "userId_c": 7})],
    );
    CoreService::new(CoreConfig::default(), Arc::new(records), Arc::new(LocalSession)).unwrap()
}

fn sign_in(core: &CoreService) {
    core.store().dispatch(UserAction::SetProfile(Some(UserProfile {
        id: Some(7),
        ..Default::default()
    })));
}

#[tokio::test]
async fn test_protected_route_redirects_to_login() {
    let core = service();

    match core.navigate("/playlists/1").await {
        NavigationOutcome::Redirect(nav) => {
            assert_eq!(nav.path, "/login?redirect=%2Fplaylists%2F1")
        }
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_public_route_renders_without_session() {
    let core = service();

    match core.navigate("/login").await {
        NavigationOutcome::Rendered(rendered) => {
            assert!(matches!(rendered.page, Page::Auth(AuthScreen::Login)))
        }
        other => panic!("expected login screen, got {:?}", other),
    }
}

#[tokio::test]
async fn test_navigation_loads_page_before_render() {
    let core = service();
    sign_in(&core);

    let NavigationOutcome::Rendered(rendered) = core.navigate("/playlists/1").await else {
        panic!("expected rendered page");
    };
    let Page::PlaylistDetail(page) = rendered.page else {
        panic!("expected playlist detail");
    };

    assert!(rendered.notice.is_none());
    assert_eq!(page.playlist().unwrap().name, "Evening");
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_when_signed_in() {
    let core = service();
    sign_in(&core);

    let NavigationOutcome::Rendered(rendered) = core.navigate("/settings").await else {
        panic!("expected rendered page");
    };
    assert!(matches!(rendered.page, Page::NotFound));
}

#[tokio::test]
async fn test_facade_shares_one_event_bus() {
    let core = service();
    let mut events = core.events().subscribe();

    sign_in(&core);
    core.catalog().playlists.delete(1).await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::SignedIn { user_id: Some(7) })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::RecordDeleted {
            table: "playlists_c".into(),
            id: 1,
        })
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = CoreConfig {
        request_timeout: std::time::Duration::ZERO,
        ..CoreConfig::default()
    };

    let result = CoreService::new(
        config,
        Arc::new(MemoryRecordClient::new()),
        Arc::new(LocalSession),
    );
    assert!(result.is_err());
}

#[cfg(feature = "desktop-shims")]
#[test]
fn test_connect_requires_backend() {
    let err = CoreService::connect(CoreConfig::default()).unwrap_err();
    assert!(err.to_string().contains("RecordClient"));
}
