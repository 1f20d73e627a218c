//! Collector API - Prices, Venues and Runs
//!
//! JSON handlers over `CollectorService`. Status codes:
//! - `POST /venues`: 201 created, 409 duplicate pool, 400 rejected
//!   input or failed dry-run, 500 persistence failure
//! - `POST /runs`: 200 report, 202 skipped (run already active),
//!   500 run could not execute
//! - `GET /prices/latest`: 404 when nothing matches

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, instrument};

use crate::domain::{RegistrationError, StoreError, VenueCandidate};
use crate::ports::PriceQuery;
use crate::service::CollectorService;
use crate::usecases::{RunError, RunOutcome};

/// JSON error response `{"error": kind, "message": text}`.
#[derive(Debug)]
pub struct ApiError {
  status: StatusCode,
  kind: &'static str,
  message: String,
}

impl ApiError {
  fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
    Self {
      status,
      kind,
      message: message.into(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = Json(json!({ "error": self.kind, "message": self.message }));
    (self.status, body).into_response()
  }
}

impl From<StoreError> for ApiError {
  fn from(err: StoreError) -> Self {
    error!(error = %err, "Store read failed");
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
  }
}

impl From<RegistrationError> for ApiError {
  fn from(err: RegistrationError) -> Self {
    let (status, kind) = match &err {
      RegistrationError::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
      RegistrationError::UnknownAdapterKind(_) => (StatusCode::BAD_REQUEST, "unknown_adapter_kind"),
      RegistrationError::ValidationFailed { .. } => (StatusCode::BAD_REQUEST, "validation_failed"),
      RegistrationError::DuplicateVenue(_) => (StatusCode::CONFLICT, "duplicate_venue"),
      RegistrationError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
    };
    Self::new(status, kind, err.to_string())
  }
}

impl From<RunError> for ApiError {
  fn from(err: RunError) -> Self {
    let kind = match &err {
      RunError::RegistryUnavailable(_) => "registry_unavailable",
      RunError::StoreUnavailable { .. } => "store_unavailable",
    };
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, kind, err.to_string())
  }
}

/// Query string of `GET /prices/latest`.
#[derive(Debug, Default, Deserialize)]
pub struct LatestParams {
  pub dex_name: Option<String>,
}

/// `GET /prices?dex_name=&limit=`
pub async fn list_prices(
  State(service): State<Arc<CollectorService>>,
  Query(query): Query<PriceQuery>,
) -> Result<impl IntoResponse, ApiError> {
  let records = service.query_prices(&query).await?;
  Ok(Json(records))
}

/// `GET /prices/latest?dex_name=`
pub async fn latest_price(
  State(service): State<Arc<CollectorService>>,
  Query(params): Query<LatestParams>,
) -> Result<impl IntoResponse, ApiError> {
  let mut records = service
    .query_prices(&PriceQuery::latest(params.dex_name))
    .await?;

  match records.pop() {
    Some(record) => Ok(Json(record)),
    None => Err(ApiError::new(
      StatusCode::NOT_FOUND,
      "not_found",
      "no price records",
    )),
  }
}

/// `POST /venues`
#[instrument(skip_all)]
pub async fn register_venue(
  State(service): State<Arc<CollectorService>>,
  body: Result<Json<VenueCandidate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(candidate) =
    body.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))?;

  let registration = service.register(candidate).await?;
  Ok((StatusCode::CREATED, Json(registration)))
}

/// `GET /venues`
pub async fn list_venues(
  State(service): State<Arc<CollectorService>>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(service.venues().await?))
}

/// `POST /runs`
#[instrument(skip_all)]
pub async fn trigger_run(State(service): State<Arc<CollectorService>>) -> Result<Response, ApiError> {
  match service.trigger_run().await? {
    RunOutcome::Completed(report) => Ok((StatusCode::OK, Json(report)).into_response()),
    RunOutcome::Skipped => Ok((StatusCode::ACCEPTED, Json(json!({ "status": "skipped" }))).into_response()),
  }
}
