//! FILENAME: server/src/handler.rs
//! PURPOSE: The /api/calc request pipeline and error translation.
//! CONTEXT: validate -> map -> lease an engine instance -> run the cycle on
//! a blocking task -> serialize to CSV. Validation failures short-circuit
//! before any engine interaction; engine failures release the instance and
//! surface as a generic classification, with the detail logged server-side.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use engine_bridge::AcquireError;
use scenario::{Scenario, ValidationError};

use crate::csv;
use crate::AppState;
use crate::{log_debug, log_enter_info, log_error, log_exit_info, log_warn};

// ============================================================================
// ERROR TRANSLATION
// ============================================================================

/// Client-visible failure of a calculation request.
#[derive(Debug)]
pub enum ApiError {
    /// The request body failed schema validation.
    Validation(ValidationError),
    /// No engine instance became available within the bounded wait.
    Busy,
    /// The engine stage failed; detail stays in the server log.
    Computation,
}

/// JSON error body: machine-readable kind plus human-readable detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    kind: "validation",
                    field: err.field(),
                    detail: err.to_string(),
                },
            ),
            ApiError::Busy => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    kind: "busy",
                    field: None,
                    detail: "no calculation engine instance available; retry later".to_string(),
                },
            ),
            ApiError::Computation => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    kind: "computationFailed",
                    field: None,
                    detail: "the calculation engine failed to produce the output table"
                        .to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// REQUEST PIPELINE
// ============================================================================

/// Runs one calculation request end to end, returning the CSV body.
pub async fn process_request(state: &AppState, raw: Value) -> Result<String, ApiError> {
    let scenario = Scenario::from_json(&raw).map_err(|err| {
        log_warn!("CALC", "rejected request: {}", err);
        ApiError::Validation(err)
    })?;

    let writes = scenario.slot_writes();
    log_debug!("CALC", "mapped scenario to {} slot writes", writes.len());

    let mut lease = state.pool.acquire().await.map_err(|err| match err {
        AcquireError::Exhausted { waited_ms } => {
            log_warn!("ENGINE", "pool exhausted after {} ms", waited_ms);
            ApiError::Busy
        }
        AcquireError::Engine(engine_err) => {
            log_error!("ENGINE", "failed to open instance: {}", engine_err);
            ApiError::Computation
        }
    })?;

    // The cycle runs on a blocking task that owns the lease: a caller that
    // disconnects mid-recalculation does not abort it, so the instance is
    // never left half-written for the next request.
    let region = state.output_region.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let result = lease.recalculate(&writes, &region);
        drop(lease);
        result
    })
    .await;

    let table = match outcome {
        Ok(Ok(table)) => table,
        Ok(Err(engine_err)) => {
            log_error!("ENGINE", "cycle failed: {}", engine_err);
            return Err(ApiError::Computation);
        }
        Err(join_err) => {
            log_error!("ENGINE", "cycle task died: {}", join_err);
            return Err(ApiError::Computation);
        }
    };

    Ok(csv::to_csv(&table))
}

/// POST /api/calc - scenario in, CSV table out.
pub async fn calc(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Result<Response, ApiError> {
    log_enter_info!("CALC", "calc");
    let body = process_request(&state, raw).await?;
    log_exit_info!("CALC", "calc", "{} bytes", body.len());
    Ok(([(header::CONTENT_TYPE, "text/csv")], body).into_response())
}
