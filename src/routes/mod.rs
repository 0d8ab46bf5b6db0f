use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod chat;
pub mod public;
pub mod tasks;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(auth::router(state.clone()))
        .merge(tasks::router(state.clone()))
        .merge(chat::router(state))
}
