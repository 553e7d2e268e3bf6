use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::config::AuthConfig;
use crate::error::ApiError;

// Demo accounts; there is no user management
const DEMO_USERS: &[(&str, &str)] = &[("demo", "demo"), ("admin", "admin")];

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn check_credentials(username: &str, password: &str) -> bool {
    DEMO_USERS.iter().any(|(user, pass)| *user == username && *pass == password)
}

pub fn issue_token(auth: &AuthConfig, username: &str) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let exp = i64::try_from(auth.token_ttl_secs)
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
        .ok_or(ApiError::TokenLifetime(auth.token_ttl_secs))?;
    let claims = Claims { sub: username.to_string(), iat: now, exp };
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.jwt_secret.as_bytes()))?)
}

pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    if !check_credentials(&payload.username, &payload.password) {
        tracing::warn!("🔒 Failed login attempt for '{}'", payload.username);
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = issue_token(&state.auth, &payload.username)?;
    tracing::info!("🔑 Issued access token for '{}'", payload.username);
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.auth.token_ttl_secs,
    }))
}

// Guards the network routes when `require_auth` is on; a no-op otherwise.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth.require_auth {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;
    let claims = verify_token(&state.auth, token.trim()).map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        ApiError::Unauthorized
    })?;

    tracing::debug!("Authenticated request from '{}'", claims.sub);
    Ok(next.run(request).await)
}
