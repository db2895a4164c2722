mod common;

use std::sync::Arc;

use common::TestApp;
use weeblist::client::{create_client, ApiClient};
use weeblist::gateway::RecordGateway;
use weeblist::models::{EntryType, NewWork, Work};
use weeblist::progress::ProgressChange;
use weeblist::session::{AuthEvent, AuthGate, Screen, SessionHolder};
use weeblist::view_model::{ListViewModel, SortKey, TypeFilter};
use weeblist::Error;

async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn signed_in_client() -> (TestApp, ApiClient) {
    let app = TestApp::new().await;
    let url = serve(&app).await;
    let client = ApiClient::new(create_client().unwrap(), &url, Arc::new(SessionHolder::new()));
    client.sign_in("owner@localhost", &app.token).await.unwrap();
    (app, client)
}

#[tokio::test]
async fn test_sign_in_opens_the_gate() {
    let app = TestApp::new().await;
    let url = serve(&app).await;
    let session = Arc::new(SessionHolder::new());
    let client = ApiClient::new(create_client().unwrap(), &url, session.clone());
    let mut gate = AuthGate::new(&session);
    assert_eq!(gate.screen(), Screen::Login);

    // Wrong key keeps the login screen
    let err = client.sign_in("owner@localhost", "not-the-key").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert_eq!(gate.poll(), Screen::Login);

    client.sign_in("owner@localhost", &app.token).await.unwrap();
    assert_eq!(gate.next().await, Some(Screen::Collection));
    assert!(client.current_user().await.unwrap().id.is_nil());

    client.sign_out().await.unwrap();
    assert_eq!(gate.next().await, Some(Screen::Login));
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_view_model_over_http() {
    let (_app, client) = signed_in_client().await;
    let mut vm = ListViewModel::new(client.collection());
    vm.refresh().await.unwrap();
    assert!(vm.entries().is_empty());

    let naruto = vm.add("  Naruto ", EntryType::Anime, None).await.unwrap();
    assert_eq!(naruto.title, "Naruto");
    let frieren = vm
        .add("Frieren", EntryType::Simulcast, Some("2024-01-01".into()))
        .await
        .unwrap();
    vm.add("Berserk", EntryType::Manga, None).await.unwrap();

    // Mark an episode of the simulcast as watched
    let watched = vm.mark_watched(frieren.id).await.unwrap();
    assert_eq!(watched.progress, 1);
    assert_eq!(watched.date_simulcast.as_deref(), Some("2024-01-08"));

    vm.adjust_progress(naruto.id, ProgressChange::Increment(150)).await.unwrap();
    assert_eq!(vm.entry(naruto.id).unwrap().progress, 100);

    vm.set_sort_key(SortKey::Progress);
    let titles: Vec<String> = vm.displayed().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["Naruto", "Frieren", "Berserk"]);

    vm.set_type_filter(TypeFilter::Only(EntryType::Manga));
    assert_eq!(vm.displayed().len(), 1);
    vm.set_type_filter(TypeFilter::All);
    vm.set_search_query("ERE");
    assert_eq!(vm.displayed()[0].id, frieren.id);

    // Local list and server agree after a refresh
    let before = vm.entries().to_vec();
    vm.refresh().await.unwrap();
    assert_eq!(vm.entries(), before.as_slice());

    vm.remove(naruto.id, |_| true).await.unwrap();
    assert!(vm.entry(naruto.id).is_none());
    assert!(matches!(client.collection().get_by_id(naruto.id).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_failures_leave_the_list_intact() {
    let (_app, client) = signed_in_client().await;
    let mut vm = ListViewModel::new(client.collection());
    let kept = vm.add("Monster", EntryType::Manga, None).await.unwrap();

    // Deleting an id the server does not know
    let err = vm.remove(kept.id + 100, |_| true).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(vm.entries().len(), 1);
    assert!(vm.error().is_some());

    // Out of range progress is rejected by the server
    let err = vm
        .update(kept.id, weeblist::models::EntryPatch::progress(250))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(vm.entry(kept.id).unwrap().progress, 0);
}

#[tokio::test]
async fn test_unauthorized_response_clears_the_session() {
    let (_app, client) = signed_in_client().await;
    let works = client.works();
    works
        .create(NewWork {
            title: "Akira".into(),
            work_type: "film".into(),
            total_episodes: None,
            total_chapters: None,
            total_volumes: None,
        })
        .await
        .unwrap();

    // Swap in a token the server no longer accepts
    let mut stale = client.session().current().unwrap();
    stale.access_token = "stale-token".into();
    client.session().emit(AuthEvent::TokenRefreshed, Some(stale));

    let mut gate = AuthGate::new(client.session());
    assert_eq!(gate.screen(), Screen::Collection);

    let result: Result<Vec<Work>, Error> = works.get_all().await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
    assert_eq!(gate.next().await, Some(Screen::Login));
    assert!(client.session().current().is_none());
}
