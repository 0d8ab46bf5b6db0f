use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    response::{ApiReply, ApiResult},
    services::auth_service::{AuthService, TokenBundle},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
}

fn service(state: &AppState) -> AuthService {
    AuthService::new(&state.db, state.jwt.clone())
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<TokenBundle> {
    let bundle = service(&state).register(&body.email, &body.password).await?;
    ApiReply::created(bundle)
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> ApiResult<TokenBundle> {
    let bundle = service(&state).login(&body.email, &body.password).await?;
    ApiReply::ok(bundle)
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenBundle> {
    let bundle = service(&state).refresh(&body.refresh_token).await?;
    ApiReply::ok(bundle)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<Value> {
    service(&state).logout(&body.refresh_token).await?;
    ApiReply::ok_with_message("Logged out", Value::Null)
}
