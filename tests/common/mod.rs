#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use uuid::Uuid;
use weeblist::auth::key_manager::{KeyManager, KeyPolicy};
use weeblist::auth::LocalKeyAuth;
use weeblist::config::Config;
use weeblist::models::{Caller, User};
use weeblist::state::AppState;
use weeblist::store::SqliteStore;

/// Local backend over an in-memory database. The key directory must
/// outlive the test, hence the returned `TempDir`.
pub struct TestApp {
    pub state: AppState,
    pub store: SqliteStore,
    pub token: String,
    _keys_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let keys_dir = tempfile::tempdir().unwrap();
        let keys = KeyManager::open(keys_dir.path().join("key.pub"), KeyPolicy::default()).unwrap();
        let token = keys.refresh_key().unwrap();

        let store = SqliteStore::in_memory().await.unwrap();
        let config = Config::from_lookup(|key| match key {
            "WEEBLIST_BACKEND" => Some("local".to_string()),
            "SITE_URL" => Some("http://weeblist.test".to_string()),
            _ => None,
        })
        .unwrap();

        let state = AppState {
            store: Arc::new(store.clone()),
            auth: Arc::new(LocalKeyAuth::new(Arc::new(keys))),
            config: Arc::new(config),
        };

        Self {
            state,
            store,
            token,
            _keys_dir: keys_dir,
        }
    }

    pub fn router(&self) -> Router {
        weeblist::app::router(self.state.clone())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn caller(id: Uuid) -> Caller {
    Caller::new(
        User {
            id,
            email: Some(format!("{}@example.com", id.simple())),
        },
        "test-token",
    )
}
