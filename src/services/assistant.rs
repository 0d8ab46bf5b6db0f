use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One prior turn of the conversation, relayed to the agent for context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTurn {
    pub role: String,
    pub content: String,
}

/// A tool call the agent reports having made while answering. The dashboard
/// treats any call as a hint that the task list may have changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCall {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentReply {
    pub response: String,
    #[serde(default)]
    pub function_calls: Vec<AgentCall>,
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("agent returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Seam between the chat service and the external agent, so tests can swap
/// in a canned backend.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn complete(
        &self,
        user_id: &Uuid,
        message: &str,
        history: &[AgentTurn],
    ) -> Result<AgentReply, AgentError>;
}

pub struct HttpAgent {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct AgentRequest<'a> {
    user_id: &'a Uuid,
    message: &'a str,
    history: &'a [AgentTurn],
}

impl HttpAgent {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl AgentBackend for HttpAgent {
    async fn complete(
        &self,
        user_id: &Uuid,
        message: &str,
        history: &[AgentTurn],
    ) -> Result<AgentReply, AgentError> {
        let mut request = self.http.post(&self.endpoint).json(&AgentRequest {
            user_id,
            message,
            history,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<AgentReply>().await?)
    }
}
