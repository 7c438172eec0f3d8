use async_trait::async_trait;
use bridge_desktop::MemoryRecordClient;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::records::{DeleteRequest, Envelope, RecordBatch, RecordClient, RecordQuery};
use core_auth::{AuthError, SessionProvider, UserAction, UserProfile};
use core_runtime::config::CoreConfig;
use core_service::{CoreService, LoadState, Notice, NoticeLevel, PlaylistDetailPage, PlaylistsPage};
use mockall::mock;
use serde_json::json;
use std::sync::Arc;

mock! {
    Session {}

    #[async_trait]
    impl SessionProvider for Session {
        async fn logout(&self) -> core_auth::Result<()>;
    }
}

mock! {
    Records {}

    #[async_trait]
    impl RecordClient for Records {
        async fn fetch_records(&self, table: &str, query: &RecordQuery) -> BridgeResult<Envelope>;
        async fn get_record_by_id(&self, table: &str, id: i64, query: &RecordQuery) -> BridgeResult<Envelope>;
        async fn create_record(&self, table: &str, payload: &RecordBatch) -> BridgeResult<Envelope>;
        async fn update_record(&self, table: &str, payload: &RecordBatch) -> BridgeResult<Envelope>;
        async fn delete_record(&self, table: &str, payload: &DeleteRequest) -> BridgeResult<Envelope>;
    }
}

fn backend() -> Arc<MemoryRecordClient> {
    Arc::new(
        MemoryRecordClient::new()
            .with_table(
                "songs_c",
                vec![
                    json!({"title_c": "Intro", "artist_c": "The xx", "playCount_c": 10}),
                    json!({"title_c": "Crystalised", "artist_c": "The xx", "playCount_c": 30}),
                ],
            )
            .with_table(
                "playlists_c",
                vec![
                    json!({"name_c": "Evening", "description_c": "Wind down", "userId_c": 7, "songs_c": [
                        {"Id": 2, "title_c": "Crystalised"},
                        {"Id": 1, "title_c": "Intro"}
                    ]}),
                    json!({"name_c": "Someone else's", "userId_c": 8}),
                ],
            )
            .with_table("artists_c", vec![json!({"name_c": "The xx", "followerCount_c": 40})])
            .with_table("genres_c", vec![json!({"name_c": "Indie"})]),
    )
}

fn core_with(records: Arc<MemoryRecordClient>, session: MockSession) -> CoreService {
    CoreService::new(CoreConfig::default(), records, Arc::new(session)).unwrap()
}

fn core(records: Arc<MemoryRecordClient>) -> CoreService {
    core_with(records, MockSession::new())
}

fn sign_in(core: &CoreService) {
    core.store().dispatch(UserAction::SetProfile(Some(UserProfile {
        id: Some(7),
        first_name: Some("Ana".into()),
        last_name: Some("Lima".into()),
        ..Default::default()
    })));
}

#[tokio::test]
async fn test_playlists_page_waits_for_user() {
    let records = backend();
    let core = core(records.clone());
    let mut page = PlaylistsPage::new(core.context());

    assert!(page.load().await.is_none());
    assert_eq!(page.state(), &LoadState::Idle);
    assert_eq!(records.call_count(), 0);

    sign_in(&core);
    page.load().await;
    let names: Vec<_> = page.state().data().unwrap().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Evening"]);
}

#[tokio::test]
async fn test_playlists_page_delete_flow() {
    let records = backend();
    let core = core(records.clone());
    sign_in(&core);
    let mut page = PlaylistsPage::new(core.context());
    page.load().await;
    let playlist = page.state().data().unwrap()[0].clone();

    assert_eq!(
        PlaylistsPage::delete_prompt(&playlist),
        "Are you sure you want to delete \"Evening\"?"
    );
    assert!(page.delete_playlist(&playlist, false).await.is_empty());

    let feedback = page.delete_playlist(&playlist, true).await;
    assert_eq!(feedback.notice, Some(Notice::success("Playlist deleted successfully")));
    assert_eq!(page.deleting_id(), None);
    assert!(page.state().data().unwrap().is_empty());

    let again = page.delete_playlist(&playlist, true).await;
    assert_eq!(again.notice, Some(Notice::error("Failed to delete playlist")));
}

#[tokio::test]
async fn test_view_playlist_navigates_to_detail() {
    let core = core(backend());
    sign_in(&core);
    let mut page = PlaylistsPage::new(core.context());
    page.load().await;

    let playlist = &page.state().data().unwrap()[0];
    assert_eq!(page.view_playlist(playlist).path, "/playlists/1");
}

#[tokio::test]
async fn test_detail_distinguishes_not_found() {
    let core = core(backend());
    let mut missing = PlaylistDetailPage::new(core.context(), "99");
    missing.load().await;
    assert_eq!(missing.state(), &LoadState::NotFound("Playlist not found".into()));

    let mut found = PlaylistDetailPage::new(core.context(), "1");
    found.load().await;
    assert_eq!(found.playlist().unwrap().name, "Evening");
    assert_eq!(found.edit_form().description, "Wind down");
}

#[tokio::test]
async fn test_detail_edit_save_and_cancel() {
    let records = backend();
    let core = core(records.clone());
    let mut page = PlaylistDetailPage::new(core.context(), "1");
    page.load().await;

    page.start_edit();
    page.set_edit_name("Scratch");
    page.cancel_edit();
    assert!(!page.is_editing());
    assert_eq!(page.edit_form().name, "Evening");

    page.start_edit();
    page.set_edit_name("Late Evening");
    let feedback = page.save_edit().await;

    assert_eq!(feedback.notice, Some(Notice::success("Playlist updated successfully")));
    assert!(!page.is_editing());
    assert_eq!(page.playlist().unwrap().name, "Late Evening");
    assert_eq!(records.rows("playlists_c")[0]["name_c"], json!("Late Evening"));
}

#[tokio::test]
async fn test_detail_delete_navigates_back() {
    let core = core(backend());
    let mut page = PlaylistDetailPage::new(core.context(), "1");
    page.load().await;

    let feedback = page.delete(true).await;
    assert_eq!(feedback.notice.unwrap().level, NoticeLevel::Success);
    assert_eq!(feedback.navigation.unwrap().path, "/playlists");
}

#[tokio::test]
async fn test_detail_relation_actions_report_failure() {
    let core = core(backend());
    sign_in(&core);
    let mut page = PlaylistDetailPage::new(core.context(), "1");
    page.load().await;

    assert_eq!(
        page.remove_song(2).await.notice,
        Some(Notice::error("Failed to remove song"))
    );
    assert_eq!(
        page.like_song(2).await.notice,
        Some(Notice::error("Failed to update liked songs"))
    );
    assert_eq!(page.playlist().unwrap().songs.len(), 2);
}

#[tokio::test]
async fn test_detail_play_all_keeps_playlist_order() {
    let core = core(backend());
    let mut page = PlaylistDetailPage::new(core.context(), "1");
    page.load().await;

    assert!(page.play_all());
    let queued: Vec<_> = core.playback().queue().into_iter().map(|s| s.id).collect();
    assert_eq!(queued, vec![2, 1]);
    assert!(page.is_song_playing(2));
}

#[tokio::test]
async fn test_unsupported_pages_show_static_errors() {
    let core = core(backend());
    sign_in(&core);

    let mut liked = core_service::LikedSongsPage::new(core.context());
    assert_eq!(liked.load().await, Some(Notice::error("Failed to load liked songs")));
    assert_eq!(liked.state().message(), Some("Failed to load liked songs"));

    let mut following = core_service::FollowingPage::new(core.context());
    assert_eq!(
        following.retry().await,
        Some(Notice::error("Failed to load followed artists"))
    );
}

#[tokio::test]
async fn test_unmounted_page_ignores_loads() {
    let records = backend();
    let core = core(records.clone());
    sign_in(&core);
    let mut page = PlaylistsPage::new(core.context());

    page.unmount();
    assert!(page.load().await.is_none());
    assert_eq!(page.state(), &LoadState::Idle);
    assert_eq!(records.call_count(), 0);
}

#[tokio::test]
async fn test_home_sections_load_independently() {
    let core = core(backend());
    let mut home = core_service::HomePage::new(core.context());

    assert!(home.load().await.is_none());
    assert_eq!(home.featured_artists().data().unwrap().len(), 1);
    assert_eq!(home.trending_playlists().data().unwrap().len(), 2);
    let ranks: Vec<_> = home
        .top_charts()
        .data()
        .unwrap()
        .iter()
        .map(|entry| (entry.rank, entry.song.id))
        .collect();
    assert_eq!(ranks, vec![(1, 2), (2, 1)]);
    assert_eq!(home.genres().data().unwrap()[0].name, "Indie");
}

#[tokio::test]
async fn test_home_reports_genre_failure_only() {
    let records = backend();
    records.fail_with("Project paused");
    let core = core(records);
    let mut home = core_service::HomePage::new(core.context());

    assert_eq!(home.load().await, Some(Notice::error("Failed to load genres")));
    assert_eq!(home.top_charts(), &LoadState::Loaded(Vec::new()));
}

#[tokio::test]
async fn test_create_playlist_validation() {
    let core = core(backend());
    let mut form = core.create_playlist_form();
    form.open();

    form.set_name("   ");
    let (notice, _) = form.submit().await;
    assert_eq!(notice, Notice::error("Please enter a playlist name"));

    form.set_name("Gym");
    let (notice, _) = form.submit().await;
    assert_eq!(notice, Notice::error("You must be logged in to create a playlist"));
    assert!(form.is_open());
}

#[tokio::test]
async fn test_create_playlist_defaults_cover_and_resets() {
    let records = backend();
    let core = core(records.clone());
    sign_in(&core);
    let mut form = core.create_playlist_form();
    form.open();
    form.set_name("Road Trip");

    let (notice, created) = form.submit().await;

    assert_eq!(notice, Notice::success("Playlist created successfully!"));
    assert_eq!(created.unwrap().owner_id(), Some(7));
    assert!(!form.is_open());
    assert_eq!(form.name(), "");

    let stored = records.rows("playlists_c").pop().unwrap();
    assert_eq!(
        stored["coverImage_c"],
        json!("https://ui-avatars.com/api/?name=Road%20Trip&background=1DB954&color=fff&size=400")
    );
    assert_eq!(stored["description_c"], json!(""));
}

#[tokio::test]
async fn test_create_playlist_failure_keeps_draft() {
    let records = backend();
    let core = core(records.clone());
    sign_in(&core);
    records.fail_with("Quota exceeded");
    let mut form = core.create_playlist_form();
    form.open();
    form.set_name("Gym");
    form.set_cover_image("data:image/png;base64,AAAA");

    let (notice, created) = form.submit().await;

    assert_eq!(notice, Notice::error("Failed to create playlist"));
    assert!(created.is_none());
    assert!(form.is_open());
    assert_eq!(form.cover_image(), Some("data:image/png;base64,AAAA"));
}

#[tokio::test]
async fn test_create_playlist_hides_backend_message() {
    let mut records = MockRecords::new();
    records
        .expect_create_record()
        .times(1)
        .returning(|_, _| {
            Ok(serde_json::from_value::<Envelope>(json!({
                "success": true,
                "results": [{"success": false, "message": "name_c exceeds 255 characters"}]
            }))
            .unwrap())
        });
    let core = CoreService::new(
        CoreConfig::default(),
        Arc::new(records),
        Arc::new(MockSession::new()),
    )
    .unwrap();
    sign_in(&core);
    let mut form = core.create_playlist_form();
    form.open();
    form.set_name("Gym");

    let (notice, created) = form.submit().await;

    assert_eq!(notice, Notice::error("Failed to create playlist"));
    assert!(created.is_none());
    assert!(form.is_open());
    assert_eq!(form.name(), "Gym");
}

#[tokio::test]
async fn test_create_playlist_profile_without_id() {
    let records = backend();
    let core = core(records.clone());
    core.store().dispatch(UserAction::SetProfile(Some(UserProfile {
        first_name: Some("Ana".into()),
        ..Default::default()
    })));
    let mut form = core.create_playlist_form();
    form.open();
    form.set_name("Gym");
    let calls = records.call_count();

    let (notice, created) = form.submit().await;

    assert_eq!(
        notice,
        Notice::error("Unable to identify your account. Please sign in again.")
    );
    assert!(created.is_none());
    assert_eq!(records.call_count(), calls);
    assert_eq!(records.rows("playlists_c").len(), 2);
}

#[tokio::test]
async fn test_profile_menu_logout() {
    let mut session = MockSession::new();
    session.expect_logout().times(1).returning(|| Ok(()));
    let core = core_with(backend(), session);
    sign_in(&core);
    let mut menu = core.profile_menu();

    assert_eq!(menu.display_name().as_deref(), Some("Ana Lima"));
    assert_eq!(
        menu.avatar_url().as_deref(),
        Some("https://ui-avatars.com/api/?name=Ana%20Lima&background=1DB954&color=fff")
    );

    menu.toggle();
    let feedback = menu.logout().await;

    assert_eq!(feedback.notice, Some(Notice::success("Logged out successfully")));
    assert!(!menu.is_open());
    assert!(!core.store().is_authenticated());
    assert!(menu.user().is_none());
}

#[tokio::test]
async fn test_profile_menu_logout_failure_keeps_session() {
    let mut session = MockSession::new();
    session
        .expect_logout()
        .returning(|| Err(AuthError::Provider("network down".into())));
    let core = core_with(backend(), session);
    sign_in(&core);
    let mut menu = core.profile_menu();
    menu.toggle();

    let feedback = menu.logout().await;

    assert_eq!(feedback.notice, Some(Notice::error("Failed to logout")));
    assert!(!menu.is_open());
    assert!(core.store().is_authenticated());
}

#[tokio::test]
async fn test_profile_menu_links_close_menu() {
    let core = core(backend());
    let mut menu = core.profile_menu();

    menu.toggle();
    assert_eq!(menu.go_to_settings().path, "/settings");
    assert!(!menu.is_open());

    menu.toggle();
    assert_eq!(menu.go_to_profile().path, "/profile");
    assert!(!menu.is_open());
}
