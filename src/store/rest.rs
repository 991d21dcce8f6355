//! HTTP client for the hosted `workout_entries` table.
//!
//! Speaks the PostgREST dialect used by hosted backends: equality filters as
//! `column=eq.value`, ordering as `order=column.direction`, and
//! `Prefer: return=representation` so an update or delete reports which rows
//! it touched.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Serialize;

use super::{EntryStore, StoreError};
use crate::models::{EntryChanges, NewWorkoutEntry, UserId, WorkoutEntry};

const TABLE: &str = "workout_entries";

/// Entry store backed by a remote REST endpoint.
#[derive(Debug, Clone)]
pub struct RestEntryStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

#[derive(Serialize)]
struct InsertRow<'a> {
    user_id: &'a UserId,
    date: &'a str,
    exercise: &'a str,
    weight: f64,
    reps: u32,
    set_number: u32,
}

impl RestEntryStore {
    /// Creates a client for the project at `base_url` using the public API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
        }
    }

    /// Sends the signed-in user's token instead of the API key as bearer.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, filters: &[(&str, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, TABLE);
        let mut separator = '?';
        for (column, value) in filters {
            url.push(separator);
            url.push_str(column);
            url.push('=');
            url.push_str(value);
            separator = '&';
        }
        url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    /// Sends a filtered update/delete and fails when no row came back.
    async fn mutate_one(
        &self,
        request: reqwest::RequestBuilder,
        id: &str,
    ) -> Result<(), StoreError> {
        let response = request
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = check(response).await?.json().await?;

        if rows.is_empty() {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

/// Turns a non-success response into a [`StoreError`].
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unauthorized(message)),
        _ => Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        }),
    }
}

#[async_trait]
impl EntryStore for RestEntryStore {
    async fn fetch_by_user(
        &self,
        user_id: &UserId,
        date: Option<&str>,
    ) -> Result<Vec<WorkoutEntry>, StoreError> {
        let mut filters = vec![
            ("select", "*".to_string()),
            ("user_id", eq(user_id.as_str())),
        ];
        match date {
            Some(date) => {
                filters.push(("date", eq(date)));
                filters.push(("order", "set_number.asc".to_string()));
            }
            None => filters.push(("order", "date.desc".to_string())),
        }

        let url = self.table_url(&filters);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let entries: Vec<WorkoutEntry> = check(response).await?.json().await?;
        Ok(entries)
    }

    async fn create(&self, user_id: &UserId, entry: &NewWorkoutEntry) -> Result<(), StoreError> {
        let row = InsertRow {
            user_id,
            date: &entry.date,
            exercise: &entry.exercise,
            weight: entry.weight,
            reps: entry.reps,
            set_number: entry.set_number,
        };

        let url = self.table_url(&[]);
        let response = self
            .request(reqwest::Method::POST, &url)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        changes: &EntryChanges,
    ) -> Result<(), StoreError> {
        let url = self.table_url(&[("id", eq(id)), ("user_id", eq(user_id.as_str()))]);
        let request = self.request(reqwest::Method::PATCH, &url).json(changes);
        self.mutate_one(request, id).await
    }

    async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), StoreError> {
        let url = self.table_url(&[("id", eq(id)), ("user_id", eq(user_id.as_str()))]);
        let request = self.request(reqwest::Method::DELETE, &url);
        self.mutate_one(request, id).await
    }
}
