use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    client::session::SessionContext,
    response::ApiEnvelope,
    routes::{chat::ChatRequest, tasks::TaskListData},
    services::chat_service::ChatOutcome,
    tasks::{NewTask, Task, TaskPatch},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The server rejected our token. Distinct from the generic HTTP case so
    /// callers can drop the session instead of showing an error toast.
    #[error("not authenticated")]
    Unauthorized,
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Task operations the dashboard needs, as a seam so tests can run against
/// a canned backend.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiClientError>;
    async fn create_task(&self, draft: &NewTask) -> Result<Task, ApiClientError>;
    async fn update_task(&self, id: &Uuid, patch: &TaskPatch) -> Result<Task, ApiClientError>;
    async fn delete_task(&self, id: &Uuid) -> Result<(), ApiClientError>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionContext>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiClientError::Unauthorized);
        }
        if !status.is_success() {
            let message = response
                .json::<ApiEnvelope<serde_json::Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(ApiClientError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<ApiEnvelope<T>>().await?.data)
    }

    pub async fn send_chat(
        &self,
        user_id: &Uuid,
        conversation_id: Option<Uuid>,
        message: &str,
    ) -> Result<ChatOutcome, ApiClientError> {
        let request = self
            .authorize(self.http.post(self.url(&format!("/api/{user_id}/chat"))))
            .json(&ChatRequest {
                conversation_id,
                message: message.to_string(),
            });
        Self::unwrap_envelope(request.send().await?).await
    }
}

#[async_trait]
impl TaskApi for ApiClient {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiClientError> {
        let request = self.authorize(self.http.get(self.url("/api/tasks")));
        let data: TaskListData = Self::unwrap_envelope(request.send().await?).await?;
        Ok(data.tasks)
    }

    async fn create_task(&self, draft: &NewTask) -> Result<Task, ApiClientError> {
        let request = self
            .authorize(self.http.post(self.url("/api/tasks")))
            .json(draft);
        Self::unwrap_envelope(request.send().await?).await
    }

    async fn update_task(&self, id: &Uuid, patch: &TaskPatch) -> Result<Task, ApiClientError> {
        let request = self
            .authorize(self.http.put(self.url(&format!("/api/tasks/{id}"))))
            .json(patch);
        Self::unwrap_envelope(request.send().await?).await
    }

    async fn delete_task(&self, id: &Uuid) -> Result<(), ApiClientError> {
        let request = self.authorize(self.http.delete(self.url(&format!("/api/tasks/{id}"))));
        let _: serde_json::Value = Self::unwrap_envelope(request.send().await?).await?;
        Ok(())
    }
}
