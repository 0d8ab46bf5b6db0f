use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        jwt::{JwtKeys, encode_token, make_access_claims},
        password::{hash_password, verify_password},
    },
    db::{entities, session_repo, user_repo},
    error::AppError,
};

const ACCESS_TTL_SECS: usize = 15 * 60; // 15 minutes
const REFRESH_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: usize,
}

#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    jwt: JwtKeys,
}

impl AuthService {
    pub fn new(db: &DatabaseConnection, jwt: JwtKeys) -> Self {
        Self {
            db: db.clone(),
            jwt,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<TokenBundle, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::bad_request("Email required"));
        }

        if user_repo::find_by_email(&self.db, email)
            .await
            .map_err(|err| AppError::from_db(err, "DB error"))?
            .is_some()
        {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = hash_password(password)?;
        let user = user_repo::create_user(&self.db, email, &password_hash)
            .await
            .map_err(|err| AppError::from_db(err, "Create user failed"))?;

        self.issue_tokens(&user).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenBundle, AppError> {
        let user = user_repo::find_by_email(&self.db, email)
            .await
            .map_err(|err| AppError::from_db(err, "DB error"))?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        let password_ok = verify_password(password, &user.password_hash)?;
        if !password_ok {
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let now = chrono::Utc::now().fixed_offset();
        user_repo::set_last_login(&self.db, &user.id, &now)
            .await
            .map_err(|err| AppError::from_db(err, "Failed to update last login"))?;

        self.issue_tokens(&user).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let session = session_repo::find_active_by_token(&self.db, refresh_token)
            .await
            .map_err(|err| AppError::from_db(err, "DB error"))?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if session.expires_at < chrono::Utc::now().fixed_offset() || session.revoked {
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        let user = user_repo::find_by_id(&self.db, &session.user_id)
            .await
            .map_err(|err| AppError::from_db(err, "DB error"))?
            .ok_or_else(|| AppError::unauthorized("User missing"))?;

        // Rotation: the presented token is dead once a new bundle is issued.
        session_repo::revoke_token(&self.db, refresh_token)
            .await
            .map_err(|err| AppError::from_db(err, "Token revoke failed"))?;

        self.issue_tokens(&user).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        session_repo::revoke_token(&self.db, refresh_token)
            .await
            .map_err(|err| AppError::from_db(err, "Token revoke failed"))
    }

    async fn issue_tokens(&self, user: &entities::user::Model) -> Result<TokenBundle, AppError> {
        let claims = make_access_claims(&user.id, ACCESS_TTL_SECS);
        let access_token = encode_token(&self.jwt, &claims)?;

        let session = session_repo::create_session(&self.db, &user.id, Some(REFRESH_TTL_DAYS))
            .await
            .map_err(|err| AppError::from_db(err, "Session issue failed"))?;

        Ok(TokenBundle {
            access_token,
            refresh_token: session.token,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TTL_SECS,
        })
    }
}
