use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::{
    conversation::{self, Entity as Conversation},
    message::{self, Entity as Message},
};

pub async fn find_conversation(
    db: &DatabaseConnection,
    user_id: &Uuid,
    conversation_id: &Uuid,
) -> Result<Option<conversation::Model>, sea_orm::DbErr> {
    Conversation::find()
        .filter(conversation::Column::Id.eq(*conversation_id))
        .filter(conversation::Column::UserId.eq(*user_id))
        .one(db)
        .await
}

pub async fn create_conversation(
    db: &DatabaseConnection,
    user_id: &Uuid,
) -> Result<conversation::Model, sea_orm::DbErr> {
    let model = conversation::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(*user_id),
        ..Default::default()
    };
    model.insert(db).await
}

/// Most recent messages first; callers reverse for chronological order.
pub async fn recent_messages(
    db: &DatabaseConnection,
    conversation_id: &Uuid,
    limit: u64,
) -> Result<Vec<message::Model>, sea_orm::DbErr> {
    Message::find()
        .filter(message::Column::ConversationId.eq(*conversation_id))
        .order_by_desc(message::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
}

pub async fn append_message(
    db: &DatabaseConnection,
    conversation_id: &Uuid,
    user_id: &Uuid,
    role: &str,
    content: &str,
) -> Result<message::Model, sea_orm::DbErr> {
    let model = message::ActiveModel {
        id: Set(Uuid::new_v4()),
        conversation_id: Set(*conversation_id),
        user_id: Set(*user_id),
        role: Set(role.to_string()),
        content: Set(content.to_string()),
        ..Default::default()
    };
    model.insert(db).await
}
