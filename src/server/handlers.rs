//! Route handlers: parse query parameters, call the query layer, map typed
//! failures to HTTP status codes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api;
use crate::error::GitViewError;

use super::AppState;

// ─── Error mapping ───────────────────────────────────────────────────

pub(super) enum ApiError {
    BadRequest(String),
    Git(GitViewError),
}

impl From<GitViewError> for ApiError {
    fn from(err: GitViewError) -> Self {
        ApiError::Git(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Git(err) => {
                let status = match &err {
                    GitViewError::PathNotFound(_) | GitViewError::RefNotFound(_) => {
                        StatusCode::NOT_FOUND
                    }
                    GitViewError::UnsupportedCommand(_) => StatusCode::FORBIDDEN,
                    GitViewError::BlameUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    GitViewError::RefreshInProgress => StatusCode::CONFLICT,
                    GitViewError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn ok<T: serde::Serialize>(payload: &T) -> ApiResult {
    serde_json::to_value(payload)
        .map(Json)
        .map_err(|e| ApiError::Git(GitViewError::ParseError(e.to_string())))
}

fn require(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing ?{name}=")))
}

// ─── Landing page ────────────────────────────────────────────────────

pub(super) async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>gitview</title>
  <style>
    body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif;
           max-width: 640px; margin: 48px auto; padding: 0 20px;
           background: #0d1117; color: #e6edf3; }
    h1 { color: #58a6ff; }
    code { background: #161b22; padding: 2px 6px; border-radius: 4px; }
    li { margin: 6px 0; }
  </style>
</head>
<body>
  <h1>gitview</h1>
  <p>Local read-only git repository viewer. JSON API endpoints:</p>
  <ul>
    <li><code>/api/data</code> — full snapshot bundle</li>
    <li><code>/api/commit?hash=&amp;context=</code> — one commit's diff + detail</li>
    <li><code>/api/commits?branch=&amp;limit=&amp;offset=&amp;author=&amp;search=</code></li>
    <li><code>/api/range-diff?base=&amp;compare=</code></li>
    <li><code>/api/staged</code> · <code>/api/unstaged</code> · <code>/api/stash?ref=</code></li>
    <li><code>/api/file?path=&amp;ref=</code> · <code>/api/file-log?path=</code> · <code>/api/blame?path=&amp;ref=</code></li>
    <li><code>/api/activity?days=</code> · <code>/api/langs</code></li>
    <li><code>/api/refresh</code> — rebuild the snapshot</li>
    <li><code>/api/git?cmd=</code> — allowlisted read-only passthrough</li>
  </ul>
</body>
</html>"#,
    )
}

// ─── Snapshot bundle ─────────────────────────────────────────────────

pub(super) async fn data(State(state): State<AppState>) -> ApiResult {
    ok(&*state.store.current())
}

pub(super) async fn refresh(State(state): State<AppState>) -> ApiResult {
    let snapshot = state.store.refresh().await?;
    Ok(Json(json!({ "status": "ok", "collected_at": snapshot.collected_at })))
}

// ─── Commits ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct CommitParams {
    hash: Option<String>,
    context: Option<u32>,
}

pub(super) async fn commit(
    State(state): State<AppState>,
    Query(params): Query<CommitParams>,
) -> ApiResult {
    let hash = require(params.hash, "hash")?;
    let context = params.context.unwrap_or(state.default_context);
    ok(&api::commit_diff(state.store.repo_root(), &hash, context).await?)
}

#[derive(Deserialize)]
pub(super) struct CommitsParams {
    branch: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    author: Option<String>,
    search: Option<String>,
}

pub(super) async fn commits(
    State(state): State<AppState>,
    Query(params): Query<CommitsParams>,
) -> ApiResult {
    let query = api::HistoryQuery {
        branch: params.branch.filter(|b| !b.is_empty()),
        author: params.author,
        search: params.search,
        path: None,
        limit: params.limit.unwrap_or(100),
        offset: params.offset.unwrap_or(0),
    };
    ok(&api::commit_history(state.store.repo_root(), &query).await?)
}

// ─── Diffs ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RangeParams {
    base: Option<String>,
    compare: Option<String>,
    context: Option<u32>,
}

pub(super) async fn range_diff(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> ApiResult {
    let base = require(params.base, "base")?;
    let compare = require(params.compare, "compare")?;
    let context = params.context.unwrap_or(state.default_context);
    ok(&api::range_diff(state.store.repo_root(), &base, &compare, context).await?)
}

#[derive(Deserialize)]
pub(super) struct ContextParams {
    context: Option<u32>,
}

pub(super) async fn staged(
    State(state): State<AppState>,
    Query(params): Query<ContextParams>,
) -> ApiResult {
    let context = params.context.unwrap_or(state.default_context);
    ok(&api::staged_diff(state.store.repo_root(), context).await?)
}

pub(super) async fn unstaged(
    State(state): State<AppState>,
    Query(params): Query<ContextParams>,
) -> ApiResult {
    let context = params.context.unwrap_or(state.default_context);
    ok(&api::unstaged_diff(state.store.repo_root(), context).await?)
}

#[derive(Deserialize)]
pub(super) struct StashParams {
    #[serde(rename = "ref")]
    reference: Option<String>,
    context: Option<u32>,
}

pub(super) async fn stash(
    State(state): State<AppState>,
    Query(params): Query<StashParams>,
) -> ApiResult {
    let reference = params.reference.unwrap_or_else(|| "stash@{0}".to_string());
    let context = params.context.unwrap_or(state.default_context);
    ok(&api::stash_diff(state.store.repo_root(), &reference, context).await?)
}

// ─── Files ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct FileParams {
    path: Option<String>,
    #[serde(rename = "ref")]
    reference: Option<String>,
    limit: Option<usize>,
}

pub(super) async fn file(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> ApiResult {
    let path = require(params.path, "path")?;
    let reference = params.reference.unwrap_or_else(|| "HEAD".to_string());
    ok(&api::file_content(state.store.repo_root(), &path, &reference).await?)
}

pub(super) async fn file_log(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> ApiResult {
    let path = require(params.path, "path")?;
    let limit = params.limit.unwrap_or(50);
    let commits = api::file_log(state.store.repo_root(), &path, limit).await?;
    Ok(Json(json!({ "commits": commits })))
}

pub(super) async fn blame(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> ApiResult {
    let path = require(params.path, "path")?;
    let reference = params.reference.unwrap_or_else(|| "HEAD".to_string());
    let entries = api::blame_file(state.store.repo_root(), &path, &reference).await?;
    Ok(Json(json!({ "blame": entries })))
}

// ─── Statistics & passthrough ────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ActivityParams {
    days: Option<u32>,
}

pub(super) async fn activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> ApiResult {
    let days = params.days.unwrap_or(crate::SNAPSHOT_ACTIVITY_DAYS);
    let histogram = api::activity(state.store.repo_root(), days).await?;
    Ok(Json(json!({ "data": histogram })))
}

pub(super) async fn langs(State(state): State<AppState>) -> ApiResult {
    let stats = api::language_breakdown(state.store.repo_root(), "HEAD").await?;
    Ok(Json(json!({ "data": stats })))
}

#[derive(Deserialize)]
pub(super) struct GitParams {
    cmd: Option<String>,
}

pub(super) async fn raw_git(
    State(state): State<AppState>,
    Query(params): Query<GitParams>,
) -> ApiResult {
    let cmd = require(params.cmd, "cmd")?;
    let output = api::raw_query(state.store.repo_root(), &cmd).await?;
    Ok(Json(json!({ "output": output })))
}
