use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::jwt::JwtKeys, config::AppConfig, services::assistant::AgentBackend};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jwt: JwtKeys,
    pub db: DatabaseConnection,
    pub agent: Arc<dyn AgentBackend>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        agent: Arc<dyn AgentBackend>,
    ) -> Arc<Self> {
        let jwt = JwtKeys::from_secret(config.jwt_secret.as_bytes());
        Arc::new(Self {
            config,
            jwt,
            db,
            agent,
        })
    }
}
