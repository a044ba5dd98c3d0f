use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use roadworks_core::ResourceId;
use roadworks_inventory::{NewResource, ResourceInventory};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_resource).get(list_resources))
        .route("/:id", get(get_resource).patch(update_resource))
        .route("/:id/restock", post(restock_resource))
}

pub async fn register_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterResourceRequest>,
) -> axum::response::Response {
    let registered = services.inventory.register(NewResource {
        name: body.name,
        kind: body.kind,
        quantity: body.quantity,
        available: body.available,
    });

    match registered {
        Ok(r) => (StatusCode::CREATED, Json(dto::resource_to_json(&r))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn list_resources(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.inventory.list() {
        Ok(all) => {
            let items: Vec<serde_json::Value> = all.iter().map(dto::resource_to_json).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ResourceId = match errors::parse_id(&id, "resource") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.get(id) {
        Ok(r) => (StatusCode::OK, Json(dto::resource_to_json(&r))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn update_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateResourceRequest>,
) -> axum::response::Response {
    let id: ResourceId = match errors::parse_id(&id, "resource") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if body.quantity.is_none() && body.available.is_none() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "provide quantity and/or available",
        );
    }

    let quantity = match body.quantity.map(u64::try_from).transpose() {
        Ok(q) => q,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "quantity must be a non-negative number",
            );
        }
    };

    // Confirm the resource exists before touching anything.
    let mut updated = match services.inventory.get(id) {
        Ok(r) => r,
        Err(e) => return errors::inventory_error_to_response(e),
    };
    if let Some(quantity) = quantity {
        updated = match services.inventory.set_quantity(id, quantity) {
            Ok(r) => r,
            Err(e) => return errors::inventory_error_to_response(e),
        };
    }
    if let Some(available) = body.available {
        updated = match services.inventory.set_available(id, available) {
            Ok(r) => r,
            Err(e) => return errors::inventory_error_to_response(e),
        };
    }

    (StatusCode::OK, Json(dto::resource_to_json(&updated))).into_response()
}

pub async fn restock_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    let id: ResourceId = match errors::parse_id(&id, "resource") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.restock(id, body.amount) {
        Ok(r) => (StatusCode::OK, Json(dto::resource_to_json(&r))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
