//! Purchasing transactions API endpoints.

use api_types::purchasing::{PurchasingCreated, PurchasingListResponse, PurchasingNew};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, StatusCode},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as HeaderError, Header},
};
use engine::{CreatePurchasingCmd, PurchaseLine, PurchasingRecord};

use crate::{ServerError, auth::AuthUser, server::ServerState};

static WEBHOOK_URL_HEADER: HeaderName = HeaderName::from_static("x-webhook-url");

/// `X-Webhook-URL`: per-request notification endpoint.
#[derive(Debug)]
pub struct WebhookUrl(String);

impl Header for WebhookUrl {
    fn name() -> &'static HeaderName {
        &WEBHOOK_URL_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };
        Ok(WebhookUrl(value.trim().to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-webhook-url header"),
        }
    }
}

fn response(message: &str, record: &PurchasingRecord) -> PurchasingCreated {
    let (purchasing, details) = record.views();
    PurchasingCreated {
        message: message.to_string(),
        purchasing,
        details,
    }
}

pub async fn purchasing_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    webhook: Option<TypedHeader<WebhookUrl>>,
    payload: Result<Json<PurchasingNew>, JsonRejection>,
) -> Result<(StatusCode, Json<PurchasingCreated>), ServerError> {
    let Json(payload) = payload?;

    let mut cmd = CreatePurchasingCmd::new(payload.supplier_id, user.id).lines(
        payload
            .details
            .iter()
            .map(|line| PurchaseLine::new(line.item_id, line.qty)),
    );
    if let Some(TypedHeader(WebhookUrl(url))) = webhook {
        cmd = cmd.webhook_url(url);
    }

    let record = state.engine.create_purchasing(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(response("Purchasing transaction created successfully", &record)),
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<PurchasingCreated>, ServerError> {
    let record = state.engine.purchasing(id).await?;
    Ok(Json(response(
        "Purchasing transaction retrieved successfully",
        &record,
    )))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<PurchasingListResponse>, ServerError> {
    let purchasings = state.engine.purchasings().await?;
    Ok(Json(PurchasingListResponse {
        purchasings: purchasings.into_iter().map(Into::into).collect(),
    }))
}
