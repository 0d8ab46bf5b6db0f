use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    client::api::{ApiClient, ApiClientError},
    events::{EventBus, TaskEvent},
    services::chat_service::ChatOutcome,
};

/// How long the sideband waits before telling the dashboard to re-fetch,
/// giving the agent's own writes time to land.
pub const REFRESH_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Seam over the chat endpoint so the sideband can be driven in tests.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(
        &self,
        user_id: &Uuid,
        conversation_id: Option<Uuid>,
        message: &str,
    ) -> Result<ChatOutcome, ApiClientError>;
}

#[async_trait]
impl ChatTransport for ApiClient {
    async fn send_chat(
        &self,
        user_id: &Uuid,
        conversation_id: Option<Uuid>,
        message: &str,
    ) -> Result<ChatOutcome, ApiClientError> {
        ApiClient::send_chat(self, user_id, conversation_id, message).await
    }
}

/// Chat panel state. Runs beside the dashboard and only ever talks to it
/// through the event bus: when the assistant appears to have changed tasks,
/// a delayed `TasksChanged` is published and the dashboard re-fetches.
pub struct ChatSideband {
    transcript: Vec<ChatTurn>,
    conversation_id: Option<Uuid>,
    bus: EventBus,
    refresh_delay: Duration,
}

impl ChatSideband {
    pub fn new(bus: EventBus) -> Self {
        Self::with_refresh_delay(bus, REFRESH_DELAY)
    }

    pub fn with_refresh_delay(bus: EventBus, refresh_delay: Duration) -> Self {
        Self {
            transcript: Vec::new(),
            conversation_id: None,
            bus,
            refresh_delay,
        }
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn conversation_id(&self) -> Option<Uuid> {
        self.conversation_id
    }

    pub async fn send(&mut self, transport: &dyn ChatTransport, user_id: &Uuid, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.transcript.push(ChatTurn {
            role: ChatRole::User,
            text: text.to_string(),
        });

        match transport
            .send_chat(user_id, self.conversation_id, text)
            .await
        {
            Ok(outcome) => {
                // The server may have opened a fresh thread; adopt whatever
                // id it answered with.
                self.conversation_id = Some(outcome.conversation_id);
                if !outcome.actions.is_empty() || reply_suggests_mutation(&outcome.response) {
                    self.bus
                        .publish_after(TaskEvent::TasksChanged, self.refresh_delay);
                }
                self.transcript.push(ChatTurn {
                    role: ChatRole::Model,
                    text: outcome.response,
                });
            }
            Err(err) => {
                self.transcript.push(ChatTurn {
                    role: ChatRole::Model,
                    text: friendly_error(&err),
                });
            }
        }
    }
}

/// Fallback heuristic for agents that mutate tasks without reporting tool
/// calls: a reply that says it "created" or "added" something probably did.
fn reply_suggests_mutation(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    lower.contains("created") || lower.contains("added")
}

fn friendly_error(err: &ApiClientError) -> String {
    match err {
        ApiClientError::Unauthorized => {
            "Your session has expired. Please log in again.".to_string()
        }
        ApiClientError::Http { message, .. } if is_credit_exhaustion(message) => {
            "The assistant is out of credits right now. Please try again later.".to_string()
        }
        _ => "Sorry, something went wrong. Please try again.".to_string(),
    }
}

fn is_credit_exhaustion(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("resource_exhausted") || lower.contains("quota") || lower.contains("credit")
}
