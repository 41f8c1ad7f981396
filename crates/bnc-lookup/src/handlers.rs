use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bnc_db::Corpus;
use bnc_morph::normalize;
use bnc_types::BucketRangeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lookup::{DEFAULT_SAMPLE_SIZE, Lookup};

pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<Lookup<Corpus>>,
    pub max_page_size: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub word: Option<String>,
    pub length: Option<i64>,
    pub rounded: Option<bool>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct SampleQuery {
    pub n: Option<usize>,
}

#[derive(Serialize)]
pub struct LookupResponse {
    word: String,
    normalized: String,
    exists: bool,
    bucket: Option<u8>,
    bucket_via: Option<&'static str>,
    relative_frequency: Option<f64>,
    frequency_via: Option<&'static str>,
    expected_count: Option<ExpectedCount>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ExpectedCount {
    Exact(f64),
    Rounded(i64),
}

#[derive(Serialize)]
pub struct BucketWordsResponse {
    bucket: u8,
    page: usize,
    page_size: usize,
    total: usize,
    has_more: bool,
    items: Vec<String>,
}

#[derive(Serialize)]
pub struct SampleResponse {
    bucket: u8,
    items: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/lookup", get(lookup))
        .route("/v1/buckets/{bucket}", get(bucket_words))
        .route("/v1/buckets/{bucket}/sample", get(bucket_sample))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, ApiError> {
    let word = params
        .word
        .filter(|w| !w.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("word is required"))?;

    let lookup = &state.lookup;
    let bucket = lookup.bucket_estimate(&word);
    let frequency = lookup.relative_frequency_estimate(&word);
    let expected_count = params.length.and_then(|length| {
        if params.rounded.unwrap_or(false) {
            lookup
                .expected_count_rounded(&word, length)
                .map(ExpectedCount::Rounded)
        } else {
            lookup
                .expected_count(&word, length)
                .map(ExpectedCount::Exact)
        }
    });

    let response = LookupResponse {
        normalized: normalize(&word).into_string(),
        exists: lookup.exists(&word),
        bucket: bucket.map(|e| e.value.get()),
        bucket_via: bucket.map(|e| e.via.as_str()),
        relative_frequency: frequency.map(|e| e.value),
        frequency_via: frequency.map(|e| e.via.as_str()),
        expected_count,
        word,
    };
    Ok(cached(&state, "public, max-age=3600", Json(response)))
}

async fn bucket_words(
    State(state): State<AppState>,
    bucket: Result<Path<i64>, PathRejection>,
    Query(params): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let Path(bucket) = bucket?;
    let words = state.lookup.words(bucket)?;

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("page must be >= 1"));
    }
    let mut page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ApiError::bad_request("page_size must be >= 1"));
    }
    if page_size > state.max_page_size {
        page_size = state.max_page_size;
    }

    let offset = (page - 1).saturating_mul(page_size);
    let items: Vec<String> = words
        .iter()
        .skip(offset)
        .take(page_size)
        .map(str::to_string)
        .collect();
    let response = BucketWordsResponse {
        bucket: bucket as u8,
        page,
        page_size,
        total: words.len(),
        has_more: offset.saturating_add(items.len()) < words.len(),
        items,
    };
    Ok(cached(&state, "public, max-age=86400", Json(response)))
}

async fn bucket_sample(
    State(state): State<AppState>,
    bucket: Result<Path<i64>, PathRejection>,
    Query(params): Query<SampleQuery>,
) -> Result<Response, ApiError> {
    let Path(bucket) = bucket?;
    let n = params.n.unwrap_or(DEFAULT_SAMPLE_SIZE);
    if n == 0 {
        return Err(ApiError::bad_request("n must be >= 1"));
    }
    let items = state.lookup.sample(bucket, n.min(state.max_page_size))?;
    // Random per request, so never cacheable.
    Ok(Json(SampleResponse {
        bucket: bucket as u8,
        items,
    })
    .into_response())
}

fn cached(state: &AppState, policy: &'static str, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static(policy))],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<BucketRangeError> for ApiError {
    fn from(err: BucketRangeError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::bad_request("bucket must be an integer")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
