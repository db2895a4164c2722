use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::config::Config;
use crate::gateway::{Entity, Gateway};
use crate::models::Caller;
use crate::store::RemoteStore;

/// Shared handles, built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RemoteStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn gateway<E: Entity>(&self, caller: Caller) -> Gateway<E> {
        Gateway::new(self.store.clone(), caller)
    }
}
