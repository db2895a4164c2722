pub mod gotrue;
pub mod key_manager;
pub mod local;
pub mod middleware;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Session, User};

pub use gotrue::GoTrueAuth;
pub use local::LocalKeyAuth;

/// Authentication half of the remote store. Session lifecycle belongs to
/// the provider; this application only forwards calls and checks tokens.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves a bearer token to its user, or fails with `Unauthorized`.
    async fn get_user(&self, access_token: &str) -> Result<User>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    async fn send_magic_link(&self, email: &str) -> Result<()>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<()>;

    async fn update_password(&self, access_token: &str, password: &str) -> Result<()>;

    async fn sign_out(&self, access_token: &str) -> Result<()>;
}
