use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use roadworks_allocation::AllocationError;
use roadworks_complaints::ComplaintError;
use roadworks_core::DomainError;
use roadworks_inventory::InventoryError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    json_error_with(status, code, message, Value::Null)
}

/// Like [`json_error`], with extra top-level fields merged into the body.
pub fn json_error_with(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    details: Value,
) -> axum::response::Response {
    let mut body = json!({
        "error": code,
        "message": message.into(),
    });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), details) {
        body.extend(extra);
    }
    (status, axum::Json(body)).into_response()
}

pub fn allocation_error_to_response(err: AllocationError) -> axum::response::Response {
    let code = err.code();
    let message = err.to_string();
    match err {
        AllocationError::InvalidState { status: None, complaint_id } => json_error_with(
            StatusCode::NOT_FOUND,
            code,
            message,
            json!({ "complaint_id": complaint_id }),
        ),
        AllocationError::InvalidState {
            complaint_id,
            status: Some(status),
        } => json_error_with(
            StatusCode::CONFLICT,
            code,
            message,
            json!({ "complaint_id": complaint_id, "status": status }),
        ),
        AllocationError::ResourceNotFound(resource_id) => json_error_with(
            StatusCode::NOT_FOUND,
            code,
            message,
            json!({ "resource_id": resource_id }),
        ),
        AllocationError::InsufficientQuantity {
            resource_id,
            requested,
            available,
            ..
        } => json_error_with(
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            message,
            json!({ "resource_id": resource_id, "requested": requested, "available": available }),
        ),
        AllocationError::MachineUnavailable { resource_id, .. } => json_error_with(
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            message,
            json!({ "resource_id": resource_id }),
        ),
        AllocationError::IncompleteAllocation(category) => json_error_with(
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            message,
            json!({ "category": category }),
        ),
        AllocationError::CategoryMismatch {
            resource_id,
            category,
            kind,
        } => json_error_with(
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            message,
            json!({ "resource_id": resource_id, "category": category, "type": kind }),
        ),
        AllocationError::ConcurrencyConflict(_) => json_error(StatusCode::CONFLICT, code, message),
        AllocationError::Validation(_) => json_error(StatusCode::BAD_REQUEST, code, message),
        AllocationError::Store(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, code, message),
    }
}

pub fn inventory_error_to_response(err: InventoryError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        InventoryError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "resource_not_found", message),
        InventoryError::InsufficientQuantity { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_quantity", message)
        }
        InventoryError::AlreadyUnavailable(_) => json_error(StatusCode::CONFLICT, "already_unavailable", message),
        InventoryError::Domain(e) => domain_error_to_response(e),
        InventoryError::Poisoned => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message),
    }
}

pub fn complaint_error_to_response(err: ComplaintError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        ComplaintError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "complaint_not_found", message),
        ComplaintError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", message)
        }
        ComplaintError::StatusMismatch { .. } => json_error(StatusCode::CONFLICT, "status_mismatch", message),
        ComplaintError::ReservedTransition(_) => {
            json_error(StatusCode::FORBIDDEN, "reserved_transition", message)
        }
        ComplaintError::AlreadyAssigned(_) => json_error(StatusCode::CONFLICT, "already_assigned", message),
        ComplaintError::UnknownStatus(_) => json_error(StatusCode::BAD_REQUEST, "unknown_status", message),
        ComplaintError::Domain(e) => domain_error_to_response(e),
        ComplaintError::Poisoned => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        e @ DomainError::InvalidId { .. } => json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

/// Parse a path id, or produce the 400 response.
pub fn parse_id<T>(raw: &str, what: &'static str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr,
{
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
