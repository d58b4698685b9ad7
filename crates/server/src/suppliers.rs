//! Suppliers API endpoints.

use api_types::supplier::{Supplier, SupplierNew};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::SupplierCmd;

use crate::{ServerError, server::ServerState};

fn command(payload: SupplierNew) -> SupplierCmd {
    let cmd = SupplierCmd::new(payload.name, payload.email);
    match payload.address {
        Some(address) => cmd.address(address),
        None => cmd,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Supplier>>, ServerError> {
    let suppliers = state.engine.suppliers().await?;
    Ok(Json(suppliers.into_iter().map(Supplier::from).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Supplier>, ServerError> {
    let supplier = state.engine.supplier(id).await?;
    Ok(Json(supplier.into()))
}

pub async fn supplier_new(
    State(state): State<ServerState>,
    payload: Result<Json<SupplierNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Supplier>), ServerError> {
    let Json(payload) = payload?;
    let supplier = state.engine.new_supplier(command(payload)).await?;
    Ok((StatusCode::CREATED, Json(supplier.into())))
}

pub async fn supplier_update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    payload: Result<Json<SupplierNew>, JsonRejection>,
) -> Result<Json<Supplier>, ServerError> {
    let Json(payload) = payload?;
    let supplier = state.engine.update_supplier(id, command(payload)).await?;
    Ok(Json(supplier.into()))
}

pub async fn supplier_delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_supplier(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
