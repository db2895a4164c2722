//! HTTP client for this service's own API, used by front-ends and the
//! end-to-end tests. The bearer token comes from the shared
//! [`SessionHolder`]; a 401 from any call clears it.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, Result};
use crate::gateway::{Entity, RecordGateway};
use crate::models::{CollectionEntry, CollectionWork, Session, User, Work};
use crate::session::SessionHolder;
use crate::utils::response::ErrorBody;

/// No request timeout is set: a hung call waits until the server answers.
pub fn create_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("weeblist/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Local(format!("Failed to create HTTP client: {}", e)))
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionHolder>,
}

impl ApiClient {
    pub fn new(http: Client, base_url: &str, session: Arc<SessionHolder>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionHolder> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match self.session.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        warn!(%status, "API call failed: {}", message);

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                self.session.clear();
                Error::Unauthorized(message)
            }
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(message),
            StatusCode::NOT_IMPLEMENTED => Error::Unsupported(message),
            _ => Error::Store(message),
        })
    }

    /// Signs in and hands the new session to the holder.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let request = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let session: Session = self.send(request).await?.json().await?;
        self.session.set(session.clone());
        Ok(session)
    }

    /// The local session is dropped even when the server call fails.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.send(self.http.post(self.url("/api/auth/logout"))).await;
        self.session.clear();
        result.map(|_| ())
    }

    pub async fn current_user(&self) -> Result<User> {
        Ok(self.send(self.http.get(self.url("/api/auth/user"))).await?.json().await?)
    }

    pub fn collection(&self) -> HttpCollectionGateway {
        HttpGateway::new(self.clone(), "/api/collection")
    }

    pub fn works(&self) -> HttpGateway<Work> {
        HttpGateway::new(self.clone(), "/api/work")
    }

    pub fn collection_works(&self) -> HttpGateway<CollectionWork> {
        HttpGateway::new(self.clone(), "/api/collection-work")
    }
}

/// Record gateway that goes through the HTTP API instead of the store.
pub struct HttpGateway<E> {
    client: ApiClient,
    path: &'static str,
    _entity: PhantomData<fn() -> E>,
}

pub type HttpCollectionGateway = HttpGateway<CollectionEntry>;

impl<E> HttpGateway<E> {
    fn new(client: ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _entity: PhantomData,
        }
    }

    fn item_url(&self, id: impl std::fmt::Display) -> String {
        self.client.url(&format!("{}/{}", self.path, id))
    }

    async fn read<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        Ok(self.client.send(request).await?.json().await?)
    }
}

#[async_trait]
impl<E: Entity> RecordGateway<E> for HttpGateway<E> {
    async fn get_all(&self) -> Result<Vec<E>> {
        self.read(self.client.http.get(self.client.url(self.path))).await
    }

    async fn get_by_id(&self, id: E::Id) -> Result<E> {
        self.read(self.client.http.get(self.item_url(id))).await
    }

    async fn create(&self, new: E::New) -> Result<E> {
        self.read(self.client.http.post(self.client.url(self.path)).json(&new))
            .await
    }

    async fn update(&self, id: E::Id, patch: E::Patch) -> Result<E> {
        self.read(self.client.http.put(self.item_url(id)).json(&patch))
            .await
    }

    async fn delete(&self, id: E::Id) -> Result<()> {
        self.client.send(self.client.http.delete(self.item_url(id))).await?;
        Ok(())
    }
}
