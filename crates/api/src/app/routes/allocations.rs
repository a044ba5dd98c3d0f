use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use roadworks_core::ComplaintId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `PUT /complaints/:id/allocate`
///
/// Runs on the blocking pool: the coordinator may sleep between claim retries.
pub async fn allocate(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AllocateRequest>,
) -> axum::response::Response {
    let complaint_id: ComplaintId = match errors::parse_id(&id, "complaint") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let coordinator = services.coordinator.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        coordinator.allocate(complaint_id, body.allocated_by, &body.bundle)
    })
    .await;

    match outcome {
        Ok(Ok(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(Err(e)) => errors::allocation_error_to_response(e),
        Err(join) => {
            tracing::error!("allocation task failed: {join}");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "allocation task failed")
        }
    }
}

/// `GET /complaints/:id/allocation` (zero or one record)
pub async fn get_allocation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let complaint_id: ComplaintId = match errors::parse_id(&id, "complaint") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.coordinator.ledger_for_complaint(complaint_id) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "allocation_not_found",
            format!("no allocation recorded for complaint {complaint_id}"),
        ),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

/// `GET /resource-requests`
pub async fn list_pending_requests(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.coordinator.pending_requests() {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

/// `GET /allocations`
pub async fn list_allocations(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.coordinator.allocations() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}
