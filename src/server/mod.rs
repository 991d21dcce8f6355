//! JSON HTTP API over the entry store.
//!
//! # Config File Format
//!
//! ```yaml
//! api_keys:
//!   - key: "your-secret-key-here"
//!     user_id: "7d5c0f9e-0b6a-4c52-9d35-2f0e8a1c4b77"
//!     email: "lifter@example.com"
//! ```
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint (no auth required)
//! - `GET /today?date=YYYY-MM-DD`: One day's sets and total volume
//! - `GET /history`: Daily summaries (newest first) and the volume chart
//! - `POST /entries`: Log a set from form fields
//! - `PATCH /entries/{id}`: Change fields of a set
//! - `DELETE /entries/{id}`: Remove a set

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::Arc;

use crate::form::{EntryForm, ValidationError};
use crate::models::{DailySummary, EntryChanges, UserId, VolumePoint, WorkoutEntry};
use crate::store::{EntryStore, StoreError};
use crate::views::{HistoryView, TodayView, ViewError};

// ============================================================================
// Authentication
// ============================================================================

/// API key entry in config
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyEntry {
    pub key: String,
    pub user_id: String,
    pub email: String,
}

/// Config file structure
#[derive(Debug, Clone, Deserialize, Default)]
struct ServerConfigFile {
    #[serde(default)]
    api_keys: Vec<ApiKeyEntry>,
}

/// Authenticated user info, added to request extensions after auth
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
}

/// API key store - maps key -> AuthUser
#[derive(Debug, Clone, Default)]
pub struct ApiKeyStore {
    keys: HashMap<String, AuthUser>,
}

impl ApiKeyStore {
    pub fn from_entries(entries: Vec<ApiKeyEntry>) -> Self {
        let keys = entries
            .into_iter()
            .map(|entry| {
                (
                    entry.key,
                    AuthUser {
                        user_id: UserId::new(entry.user_id),
                        email: entry.email,
                    },
                )
            })
            .collect();
        Self { keys }
    }

    /// Load API keys from config file
    pub fn load(config_path: &FsPath) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match serde_yaml::from_str::<ServerConfigFile>(&contents) {
                Ok(config) => {
                    let store = Self::from_entries(config.api_keys);
                    tracing::info!("Loaded {} API key(s)", store.len());
                    store
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
                tracing::warn!("No API keys loaded - all authenticated requests will fail");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validate an API key and return the associated user
    pub fn validate(&self, key: &str) -> Option<AuthUser> {
        self.keys.get(key).cloned()
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub api_keys: Arc<ApiKeyStore>,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

fn error_response(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error,
            message: message.into(),
        }),
    )
        .into_response()
}

/// Authentication middleware
async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let api_key = match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(key) => key,
            None => {
                return error_response(
                    StatusCode::UNAUTHORIZED,
                    "invalid_auth",
                    "Authorization header must use Bearer scheme",
                )
            }
        },
        None => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authorization header required",
            )
        }
    };

    // Validate API key
    match state.api_keys.validate(api_key) {
        Some(user) => {
            // Add user info to request extensions
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => error_response(StatusCode::UNAUTHORIZED, "invalid_key", "Invalid API key"),
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Handler failure, rendered as a JSON error body
#[derive(Debug)]
pub enum ApiError {
    BadDate(String),
    View(ViewError),
}

impl From<ViewError> for ApiError {
    fn from(e: ViewError) -> Self {
        ApiError::View(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::View(ViewError::Store(e))
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::View(ViewError::Validation(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadDate(date) => error_response(
                StatusCode::BAD_REQUEST,
                "invalid_date",
                format!("Invalid date '{}'. Use YYYY-MM-DD.", date),
            ),
            ApiError::View(ViewError::Validation(e)) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, "invalid_entry", e.to_string())
            }
            ApiError::View(ViewError::UnknownEntry(id))
            | ApiError::View(ViewError::Store(StoreError::NotFound { id })) => error_response(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("No entry with id {}", id),
            ),
            ApiError::View(ViewError::Store(e)) => {
                error_response(StatusCode::BAD_GATEWAY, "store_error", e.to_string())
            }
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
struct DayQuery {
    date: Option<String>,
}

/// One day's sets with their combined volume
#[derive(Debug, Serialize)]
struct DayResponse {
    date: String,
    entries: Vec<WorkoutEntry>,
    total_volume: f64,
}

impl From<&TodayView<'_>> for DayResponse {
    fn from(view: &TodayView<'_>) -> Self {
        Self {
            date: view.date().to_string(),
            entries: view.entries().to_vec(),
            total_volume: view.running_total(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    summaries: Vec<DailySummary>,
    chart: Vec<VolumePoint>,
}

/// Fields of a set that a PATCH may change; omitted fields keep their value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EntryPatch {
    exercise: Option<String>,
    weight: Option<f64>,
    reps: Option<u32>,
    set_number: Option<u32>,
}

impl EntryPatch {
    fn merge(self, current: EntryChanges) -> EntryChanges {
        EntryChanges {
            exercise: self
                .exercise
                .filter(|e| !e.trim().is_empty())
                .unwrap_or(current.exercise),
            weight: self.weight.unwrap_or(current.weight),
            reps: self.reps.unwrap_or(current.reps),
            set_number: self.set_number.unwrap_or(current.set_number),
        }
    }
}

/// Normalizes a `YYYY-MM-DD` date; stored dates must sort as strings.
fn parse_date(date: &str) -> Result<String, ApiError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|parsed| parsed.format("%Y-%m-%d").to_string())
        .map_err(|_| ApiError::BadDate(date.to_string()))
}

async fn today(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayResponse>, ApiError> {
    let date = match query.date {
        Some(d) => parse_date(&d)?,
        None => Local::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let view = TodayView::load(state.store.as_ref(), user.user_id, date).await?;
    Ok(Json(DayResponse::from(&view)))
}

async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let view = HistoryView::load(state.store.as_ref(), user.user_id).await?;
    Ok(Json(HistoryResponse {
        summaries: view.summaries(),
        chart: view.chart(),
    }))
}

/// Logs a set and returns the day it was logged on
async fn create_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut form): Json<EntryForm>,
) -> Result<(StatusCode, Json<DayResponse>), ApiError> {
    let entry = form.validate()?;
    let date = parse_date(&entry.date)?;
    form.date = Some(date.clone());

    let mut view = TodayView::load(state.store.as_ref(), user.user_id, date).await?;
    view.add(&form).await?;
    tracing::info!(user = %user.email, date = view.date(), "logged set");

    Ok((StatusCode::CREATED, Json(DayResponse::from(&view))))
}

async fn update_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(patch): Json<EntryPatch>,
) -> Result<StatusCode, ApiError> {
    // The store has no single-row read; the owner-scoped list supplies the
    // current values for omitted fields and turns foreign ids into 404.
    let mut view = HistoryView::load(state.store.as_ref(), user.user_id).await?;
    let current = view
        .entry(&id)
        .map(EntryChanges::from)
        .ok_or_else(|| ViewError::UnknownEntry(id.clone()))?;

    view.edit(&id, patch.merge(current)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&user.user_id, &id).await.map_err(|e| {
        if !matches!(e, StoreError::NotFound { .. }) {
            tracing::error!("Failed to delete workout entry: {}", e);
        }
        e
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// Builds the application router. Tracing layers are added by the caller.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new().route("/health", get(health));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/today", get(today))
        .route("/history", get(history))
        .route("/entries", post(create_entry))
        .route("/entries/{id}", patch(update_entry).delete(delete_entry))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
