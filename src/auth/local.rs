use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::auth::key_manager::KeyManager;
use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::models::{Session, User};

/// Single-owner auth for the self-hosted backend: the API key is both the
/// password and the bearer token.
pub struct LocalKeyAuth {
    keys: Arc<KeyManager>,
}

impl LocalKeyAuth {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }

    pub fn owner() -> User {
        User {
            id: Uuid::nil(),
            email: None,
        }
    }

    fn unsupported(operation: &str) -> Error {
        Error::Unsupported(format!("{} is not available with the local key backend", operation))
    }
}

#[async_trait]
impl AuthProvider for LocalKeyAuth {
    async fn get_user(&self, access_token: &str) -> Result<User> {
        if self.keys.validate_token(access_token) {
            Ok(Self::owner())
        } else {
            Err(Error::Unauthorized("Invalid API key".into()))
        }
    }

    async fn sign_in_with_password(&self, _email: &str, password: &str) -> Result<Session> {
        if !self.keys.validate_token(password) {
            warn!("Rejected local sign-in attempt");
            return Err(Error::Unauthorized("Invalid login credentials".into()));
        }
        Ok(Session {
            access_token: password.to_string(),
            refresh_token: None,
            expires_in: None,
            user: Self::owner(),
        })
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<()> {
        Err(Self::unsupported("Sign-up"))
    }

    async fn send_magic_link(&self, _email: &str) -> Result<()> {
        Err(Self::unsupported("Magic link sign-in"))
    }

    async fn reset_password_for_email(&self, _email: &str, _redirect_to: &str) -> Result<()> {
        Err(Self::unsupported("Password recovery"))
    }

    async fn update_password(&self, _access_token: &str, _password: &str) -> Result<()> {
        Err(Self::unsupported("Password change"))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        // The key stays valid; signing out only ends the client's session.
        self.get_user(access_token).await.map(|_| ())
    }
}
