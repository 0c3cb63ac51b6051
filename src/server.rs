use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::data::query::{PaginatedResponse, UserFilter};
use crate::data::record::{parse_date, UserRecord};
use crate::data::DataEngine;
use crate::error::Result;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_PAGE_SIZE: usize = 10;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DataEngine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQueryParams {
    page: Option<i64>,
    page_size: Option<i64>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    comments: Option<String>,
    title: Option<String>,
    gender: Option<String>,
    country: Option<String>,
    registration_date_from: Option<String>,
    registration_date_to: Option<String>,
    birth_date_from: Option<String>,
    birth_date_to: Option<String>,
    min_salary: Option<f64>,
    max_salary: Option<f64>,
}

type ApiError = (StatusCode, String);

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, message.into())
}

/// Parse an optional date-bound parameter, rejecting unparsable values.
fn parse_date_param(
    value: Option<&str>,
    name: &str,
) -> std::result::Result<Option<chrono::DateTime<chrono::Utc>>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| bad_request(format!("Invalid date for '{}': {}", name, raw))),
    }
}

/// Validate page/pageSize and bind the filter criteria.
///
/// The query engine assumes positive page numbers and sizes, so malformed
/// values are rejected here at the boundary.
fn bind_request(params: UserQueryParams) -> std::result::Result<(UserFilter, usize, usize), ApiError> {
    let page = match params.page {
        None => DEFAULT_PAGE,
        Some(p) if p >= 1 => p as usize,
        Some(p) => return Err(bad_request(format!("page must be >= 1, got {}", p))),
    };

    let page_size = match params.page_size {
        None => DEFAULT_PAGE_SIZE,
        Some(s) if s >= 1 => s as usize,
        Some(s) => return Err(bad_request(format!("pageSize must be >= 1, got {}", s))),
    };

    let filter = UserFilter {
        first_name: params.first_name,
        last_name: params.last_name,
        email: params.email,
        comments: params.comments,
        title: params.title,
        gender: params.gender,
        country: params.country,
        registration_date_from: parse_date_param(
            params.registration_date_from.as_deref(),
            "registrationDateFrom",
        )?,
        registration_date_to: parse_date_param(
            params.registration_date_to.as_deref(),
            "registrationDateTo",
        )?,
        birth_date_from: parse_date_param(params.birth_date_from.as_deref(), "birthDateFrom")?,
        birth_date_to: parse_date_param(params.birth_date_to.as_deref(), "birthDateTo")?,
        min_salary: params.min_salary,
        max_salary: params.max_salary,
    };

    Ok((filter, page, page_size))
}

/// Build the router. Split out from [`start`] so tests can drive it
/// directly with `tower::ServiceExt::oneshot`.
pub fn create_app(config: &Config) -> Result<Router> {
    let engine = Arc::new(DataEngine::new(config)?);
    let state = AppState { engine };

    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/api/userdata", get(get_users))
        .layer(CorsLayer::permissive())
        .with_state(state))
}

pub async fn start(config: Config) -> Result<()> {
    let app = create_app(&config)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Roster server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<HashMap<String, String>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(status)
}

async fn get_users(
    State(state): State<AppState>,
    Query(params): Query<UserQueryParams>,
) -> std::result::Result<Json<PaginatedResponse<UserRecord>>, ApiError> {
    let (filter, page, page_size) = bind_request(params)?;

    match state.engine.query_users(&filter, page, page_size).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            // Log the real failure; the client only sees a generic message.
            error!("User query failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ))
        }
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
