use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Caller;
use crate::store::{Filter, Query, RemoteStore, Row, Table};

/// Hosted table store speaking the PostgREST dialect
/// (`{url}/rest/v1/{table}`). Ownership is the service's row-level policy.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl PostgrestStore {
    pub fn new(client: Client, project_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: Method, caller: &Caller, table: &Table) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, table.name))
            .header("apikey", &self.api_key)
            .bearer_auth(&caller.access_token)
            .header("Prefer", "return=representation")
    }

    async fn rows(response: Response) -> Result<Vec<Row>> {
        let response = Self::check(response).await?;
        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<PostgrestError> = serde_json::from_str(&body).ok();
        let code = parsed.as_ref().and_then(|e| e.code.clone()).unwrap_or_default();
        let message = parsed
            .as_ref()
            .and_then(|e| e.message.clone().or_else(|| e.details.clone()))
            .unwrap_or_else(|| format!("Remote store responded {}", status));

        warn!(status = status.as_u16(), code = %code, "PostgREST request failed: {}", message);

        Err(match status.as_u16() {
            401 | 403 => Error::Unauthorized(message),
            _ if code.starts_with("23") => Error::Validation(message),
            400 | 422 => Error::Validation(message),
            _ => Error::Store(message),
        })
    }
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), format!("eq.{}", filter_value(&f.value))))
        .collect()
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn select(&self, caller: &Caller, table: &Table, query: &Query) -> Result<Vec<Row>> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filter_params(&query.filters));
        if let Some(order) = query.order {
            params.push((
                "order".to_string(),
                format!("{}.{}", order.column, if order.descending { "desc" } else { "asc" }),
            ));
        }
        debug!(table = table.name, "postgrest select");

        let response = self
            .request(Method::GET, caller, table)
            .query(&params)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn insert(&self, caller: &Caller, table: &Table, row: Row) -> Result<Row> {
        debug!(table = table.name, "postgrest insert");
        let response = self
            .request(Method::POST, caller, table)
            .query(&[("select", "*")])
            .json(&vec![row])
            .send()
            .await?;

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Store("Insert returned no row".into()))
    }

    async fn update(&self, caller: &Caller, table: &Table, filters: &[Filter], patch: Row) -> Result<Vec<Row>> {
        if filters.is_empty() {
            return Err(Error::Validation("Refusing to update without a filter".into()));
        }
        debug!(table = table.name, "postgrest update");
        let response = self
            .request(Method::PATCH, caller, table)
            .query(&filter_params(filters))
            .json(&patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, caller: &Caller, table: &Table, filters: &[Filter]) -> Result<Vec<Row>> {
        if filters.is_empty() {
            return Err(Error::Validation("Refusing to delete without a filter".into()));
        }
        debug!(table = table.name, "postgrest delete");
        let response = self
            .request(Method::DELETE, caller, table)
            .query(&filter_params(filters))
            .send()
            .await?;
        Self::rows(response).await
    }
}
