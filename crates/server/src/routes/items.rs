use std::time::Instant;

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::types::MessageBody;
use models::item::{fields_from_value, Item};
use serde::Deserialize;
use serde_json::Value;
use service::pagination::Pagination;
use tracing::info;

use crate::errors::JsonApiError;
use crate::observability;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page; enables the paginated envelope
    pub page: Option<u32>,
    /// page size, clamped to 1..=100
    pub limit: Option<u32>,
}

impl ListQuery {
    fn pagination(&self) -> Option<Pagination> {
        if self.page.is_none() && self.limit.is_none() {
            return None;
        }
        let d = Pagination::default();
        Some(Pagination { page: self.page.unwrap_or(d.page), limit: self.limit.unwrap_or(d.limit) })
    }
}

/// Ids are positive integers; anything else cannot name an item.
fn parse_id(raw: &str) -> Result<u64, JsonApiError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| JsonApiError::bad_request(format!("invalid item id: {raw}")))
}

fn body_fields(body: Result<Json<Value>, JsonRejection>) -> Result<models::ItemFields, JsonApiError> {
    let Json(value) = body?;
    fields_from_value(value).map_err(|e| JsonApiError::bad_request(e.to_string()))
}

#[utoipa::path(
    post, path = "/api/items", tag = "Items",
    request_body = crate::openapi::ItemInputDoc,
    responses(
        (status = 201, description = "Item created", body = crate::openapi::ItemDoc),
        (status = 400, description = "Body is not a JSON object"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), JsonApiError> {
    let fields = body_fields(body)?;
    let started = Instant::now();
    let res = state.items.create(fields).await;
    observability::record("create", started, &res);
    let item = res?;
    info!(id = item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get, path = "/api/items", tag = "Items",
    params(ListQuery),
    responses(
        (status = 200, description = "All items, or one page when page/limit is given", body = [crate::openapi::ItemDoc]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, JsonApiError> {
    let Query(query) = query?;
    let started = Instant::now();
    match query.pagination() {
        Some(p) => {
            let res = state.items.list_page(p).await;
            observability::record("list", started, &res);
            Ok(Json(res?).into_response())
        }
        None => {
            let res = state.items.list().await;
            observability::record("list", started, &res);
            Ok(Json(res?).into_response())
        }
    }
}

#[utoipa::path(
    get, path = "/api/items/{id}", tag = "Items",
    params(("id" = u64, Path, description = "item ID")),
    responses(
        (status = 200, description = "Item found", body = crate::openapi::ItemDoc),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, JsonApiError> {
    let id = parse_id(&id)?;
    let started = Instant::now();
    let res = state.items.get(id).await;
    observability::record("get", started, &res);
    Ok(Json(res?))
}

#[utoipa::path(
    put, path = "/api/items/{id}", tag = "Items",
    params(("id" = u64, Path, description = "item ID")),
    request_body = crate::openapi::ItemInputDoc,
    responses(
        (status = 200, description = "Item updated", body = crate::openapi::ItemDoc),
        (status = 400, description = "Body is not a JSON object"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Item>, JsonApiError> {
    let id = parse_id(&id)?;
    let patch = body_fields(body)?;
    let started = Instant::now();
    let res = state.items.update(id, patch).await;
    observability::record("update", started, &res);
    let item = res?;
    info!(id = item.id, "item updated");
    Ok(Json(item))
}

#[utoipa::path(
    delete, path = "/api/items/{id}", tag = "Items",
    params(("id" = u64, Path, description = "item ID")),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, JsonApiError> {
    let id = parse_id(&id)?;
    let started = Instant::now();
    let res = state.items.delete(id).await;
    observability::record("delete", started, &res);
    let removed = res?;
    info!(id = removed.id, "item deleted");
    Ok(Json(MessageBody::new("Item deleted successfully")))
}
