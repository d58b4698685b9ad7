//! Bearer token authentication.
//!
//! `POST /auth/login` trades a username/password pair for an HS256 token;
//! every protected route goes through [`require_auth`], which puts the
//! [`AuthUser`] of a valid token in the request extensions.

use std::time::Duration;

use api_types::user::{LoginResponse, LoginUser, RegisterUser, Role, User};
use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ServerError, server::ServerState};

const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("cannot issue token: {0}")]
    TokenCreation(String),
}

/// Settings for issuing and checking tokens.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller of a protected route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: config.token_ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AuthError::TokenCreation("token ttl too large".to_string()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: now,
            exp: now.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AuthError::TokenCreation(err.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|err| {
                tracing::debug!("rejected token: {err}");
                AuthError::InvalidToken
            })?
            .claims;
        let id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthUser {
            id,
            username: claims.username,
            role: claims.role,
        })
    }
}

pub(crate) async fn require_auth(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| AuthError::MissingToken)?;
    let user = state.keys.verify(bearer.token())?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let Json(payload) = payload?;
    let user = state
        .engine
        .register_user(&payload.username, &payload.password, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginUser>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServerError> {
    let Json(payload) = payload?;
    let user: User = state
        .engine
        .verify_credentials(&payload.username, &payload.password)
        .await?
        .into();
    let token = state.keys.issue(&user)?;
    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse { token, user }))
}
