use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    routes::router,
    services::assistant::{AgentBackend, AgentCall, AgentError, AgentReply, AgentTurn},
    state::AppState,
};

pub fn test_config(secret: &[u8]) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_min_idle: 1,
        jwt_secret: String::from_utf8_lossy(secret).into_owned(),
        log_level: "info".to_string(),
        agent_url: "http://localhost:8100/api/agent".to_string(),
        agent_api_key: None,
    }
}

pub fn test_router(secret: &[u8]) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    test_router_with_db(secret, db)
}

pub fn test_router_with_db(secret: &[u8], db: DatabaseConnection) -> Router {
    let state = AppState::new(test_config(secret), db, Arc::new(StubAgent::replying("ok")));
    router(Arc::clone(&state))
}

/// Canned agent backend for tests: replies with a fixed message or fails
/// with a fixed upstream status.
#[derive(Clone)]
pub struct StubAgent {
    reply: String,
    calls: Vec<AgentCall>,
    failure: Option<(u16, String)>,
}

impl StubAgent {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Vec::new(),
            failure: None,
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            reply: String::new(),
            calls: Vec::new(),
            failure: Some((status, body.to_string())),
        }
    }

    pub fn with_call(mut self, name: &str) -> Self {
        self.calls.push(AgentCall {
            name: name.to_string(),
            arguments: serde_json::Value::Null,
        });
        self
    }
}

#[async_trait]
impl AgentBackend for StubAgent {
    async fn complete(
        &self,
        _user_id: &Uuid,
        _message: &str,
        _history: &[AgentTurn],
    ) -> Result<AgentReply, AgentError> {
        if let Some((status, body)) = &self.failure {
            return Err(AgentError::Status {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(AgentReply {
            response: self.reply.clone(),
            function_calls: self.calls.clone(),
        })
    }
}
