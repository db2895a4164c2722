use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::models::{Session, User};

/// Hosted auth service (`{url}/auth/v1`).
#[derive(Clone)]
pub struct GoTrueAuth {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GoTrueError {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GoTrueError {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

impl GoTrueAuth {
    pub fn new(client: Client, project_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, path))
            .header("apikey", &self.api_key)
    }

    /// Token-bearing endpoints answer 400/401/403 for bad credentials.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoTrueError>(&body)
            .ok()
            .and_then(GoTrueError::into_message)
            .unwrap_or_else(|| format!("Auth service responded {}", status));

        warn!(status = status.as_u16(), "Auth request failed: {}", message);

        Err(match status.as_u16() {
            400 | 401 | 403 => Error::Unauthorized(message),
            422 => Error::Validation(message),
            _ => Error::Store(message),
        })
    }
}

#[async_trait]
impl AuthProvider for GoTrueAuth {
    async fn get_user(&self, access_token: &str) -> Result<User> {
        let response = self
            .request(Method::GET, "user")
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<User>().await?)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .request(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session = Self::check(response).await?.json::<Session>().await?;
        info!(user = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::check(response).await.map_err(|e| match e {
            // Sign-up failures are about the input, never about a session.
            Error::Unauthorized(m) => Error::Validation(m),
            other => other,
        })?;
        Ok(())
    }

    async fn send_magic_link(&self, email: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "otp")
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<()> {
        let response = self
            .request(Method::PUT, "user")
            .bearer_auth(access_token)
            .json(&json!({ "password": password }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .request(Method::POST, "logout")
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
