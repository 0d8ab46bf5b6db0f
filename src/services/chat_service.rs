use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::chat_repo,
    error::AppError,
    services::assistant::{AgentBackend, AgentError, AgentTurn},
};

/// How many prior turns are relayed to the agent for context.
const HISTORY_TURNS: u64 = 10;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub conversation_id: Uuid,
    pub response: String,
    pub actions: Vec<String>,
}

pub async fn send_message(
    db: &DatabaseConnection,
    agent: &dyn AgentBackend,
    user_id: &Uuid,
    conversation_id: Option<Uuid>,
    message: &str,
) -> Result<ChatOutcome, AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::bad_request("Message required"));
    }

    // A stale or foreign conversation id silently starts a fresh thread
    // rather than failing the send.
    let conversation = match conversation_id {
        Some(id) => match chat_repo::find_conversation(db, user_id, &id)
            .await
            .map_err(|err| AppError::from_db(err, "Conversation fetch failed"))?
        {
            Some(existing) => existing,
            None => create_conversation(db, user_id).await?,
        },
        None => create_conversation(db, user_id).await?,
    };

    let mut history: Vec<AgentTurn> =
        chat_repo::recent_messages(db, &conversation.id, HISTORY_TURNS)
            .await
            .map_err(|err| AppError::from_db(err, "History fetch failed"))?
            .into_iter()
            .map(|m| AgentTurn {
                role: m.role,
                content: m.content,
            })
            .collect();
    history.reverse();

    let reply = agent
        .complete(user_id, message, &history)
        .await
        .map_err(|err| match err {
            AgentError::Transport(_) => AppError::bad_gateway("Assistant unreachable"),
            // The agent's own error text is relayed so the client can show
            // quota and credit failures verbatim.
            AgentError::Status { body, .. } => {
                AppError::bad_gateway(format!("Assistant request failed: {body}"))
            }
        })?;

    chat_repo::append_message(db, &conversation.id, user_id, ROLE_USER, message)
        .await
        .map_err(|err| AppError::from_db(err, "Message store failed"))?;
    chat_repo::append_message(db, &conversation.id, user_id, ROLE_ASSISTANT, &reply.response)
        .await
        .map_err(|err| AppError::from_db(err, "Message store failed"))?;

    Ok(ChatOutcome {
        conversation_id: conversation.id,
        response: reply.response,
        actions: reply.function_calls.into_iter().map(|c| c.name).collect(),
    })
}

async fn create_conversation(
    db: &DatabaseConnection,
    user_id: &Uuid,
) -> Result<crate::db::entities::conversation::Model, AppError> {
    chat_repo::create_conversation(db, user_id)
        .await
        .map_err(|err| AppError::from_db(err, "Conversation create failed"))
}
