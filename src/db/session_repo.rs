use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::session::{self, Entity as Session};

const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

pub async fn create_session(
    db: &DatabaseConnection,
    user_id: &Uuid,
    ttl_days: Option<i64>,
) -> Result<session::Model, sea_orm::DbErr> {
    let expires_at =
        Utc::now().fixed_offset() + Duration::days(ttl_days.unwrap_or(DEFAULT_SESSION_TTL_DAYS));
    let model = session::ActiveModel {
        id: Set(Uuid::new_v4()),
        token: Set(Uuid::new_v4().to_string()),
        user_id: Set(*user_id),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now().fixed_offset()),
        revoked: Set(false),
    };
    model.insert(db).await
}

pub async fn find_active_by_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<session::Model>, sea_orm::DbErr> {
    Session::find()
        .filter(session::Column::Token.eq(token))
        .filter(session::Column::Revoked.eq(false))
        .one(db)
        .await
}

pub async fn revoke_token(db: &DatabaseConnection, token: &str) -> Result<(), sea_orm::DbErr> {
    Session::update_many()
        .col_expr(
            session::Column::Revoked,
            sea_orm::sea_query::Expr::value(true),
        )
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}
