//! Items API endpoints.

use api_types::item::{Item, ItemNew, ItemQuery, ItemUpdate};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{NewItemCmd, UpdateItemCmd};

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Vec<Item>>, ServerError> {
    let items = state.engine.items(query.supplier_id).await?;
    Ok(Json(items.into_iter().map(Item::from).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Item>, ServerError> {
    let item = state.engine.item(id).await?;
    Ok(Json(item.into()))
}

pub async fn item_new(
    State(state): State<ServerState>,
    payload: Result<Json<ItemNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ServerError> {
    let Json(payload) = payload?;
    let item = state
        .engine
        .new_item(NewItemCmd::new(payload.name, payload.price, payload.supplier_id).stock(payload.stock))
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn item_update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    payload: Result<Json<ItemUpdate>, JsonRejection>,
) -> Result<Json<Item>, ServerError> {
    let Json(payload) = payload?;
    let item = state
        .engine
        .update_item(
            id,
            UpdateItemCmd {
                name: payload.name,
                price: payload.price,
                supplier_id: payload.supplier_id,
            },
        )
        .await?;
    Ok(Json(item.into()))
}

pub async fn item_delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
