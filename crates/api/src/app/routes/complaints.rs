use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;

use roadworks_complaints::{Assessment, Complaint, ComplaintError, ComplaintRepository, NewComplaint};
use roadworks_core::ComplaintId;

use crate::app::routes::allocations;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(submit_complaint).get(list_complaints))
        .route("/:id", get(get_complaint))
        .route("/:id/assess", post(assess_complaint))
        .route("/:id/request-resources", post(request_resources))
        .route("/:id/reject-request", post(reject_resource_request))
        .route("/:id/transition", post(transition_complaint))
        .route("/:id/allocate", put(allocations::allocate))
        .route("/:id/allocation", get(allocations::get_allocation))
}

fn complaint_response(status: StatusCode, result: Result<Complaint, ComplaintError>) -> axum::response::Response {
    match result {
        Ok(c) => (status, Json(c)).into_response(),
        Err(e) => errors::complaint_error_to_response(e),
    }
}

pub async fn submit_complaint(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewComplaint>,
) -> axum::response::Response {
    complaint_response(StatusCode::CREATED, services.complaints.insert(body, Utc::now()))
}

pub async fn list_complaints(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.complaints.list() {
        Ok(all) => (StatusCode::OK, Json(all)).into_response(),
        Err(e) => errors::complaint_error_to_response(e),
    }
}

pub async fn get_complaint(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ComplaintId = match errors::parse_id(&id, "complaint") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    complaint_response(StatusCode::OK, services.complaints.get(id))
}

pub async fn assess_complaint(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<Assessment>,
) -> axum::response::Response {
    let id: ComplaintId = match errors::parse_id(&id, "complaint") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    complaint_response(StatusCode::OK, services.complaints.assess(id, body, Utc::now()))
}

pub async fn request_resources(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RequestResourcesRequest>,
) -> axum::response::Response {
    let id: ComplaintId = match errors::parse_id(&id, "complaint") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    complaint_response(
        StatusCode::OK,
        services.complaints.request_resources(id, body.estimates, Utc::now()),
    )
}

pub async fn reject_resource_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RejectRequestRequest>,
) -> axum::response::Response {
    let id: ComplaintId = match errors::parse_id(&id, "complaint") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    complaint_response(
        StatusCode::OK,
        services.complaints.reject_resource_request(id, body.notes, Utc::now()),
    )
}

pub async fn transition_complaint(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::TransitionRequest>,
) -> axum::response::Response {
    let id: ComplaintId = match errors::parse_id(&id, "complaint") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    complaint_response(
        StatusCode::OK,
        services
            .complaints
            .transition(id, body.expected, body.target, Utc::now()),
    )
}
