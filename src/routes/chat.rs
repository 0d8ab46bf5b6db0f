use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{Claims, jwt::jwt_auth},
    error::AppError,
    response::{ApiReply, ApiResult},
    services::chat_service::{self, ChatOutcome},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    pub message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/{user_id}/chat", post(send_chat))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state)
}

async fn send_chat(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ChatRequest>,
) -> ApiResult<ChatOutcome> {
    // The path names a user, the token names a user; they must agree.
    if claims.user_id()? != user_id {
        return Err(AppError::forbidden("Cannot chat on behalf of another user"));
    }

    let outcome = chat_service::send_message(
        &state.db,
        state.agent.as_ref(),
        &user_id,
        body.conversation_id,
        &body.message,
    )
    .await?;
    ApiReply::ok(outcome)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        auth::jwt::{JwtKeys, encode_token, make_access_claims},
        test_helpers::test_router,
    };

    const SECRET: &[u8] = b"chat-routes-secret";

    fn bearer(user_id: &Uuid) -> String {
        let claims = make_access_claims(user_id, 3600);
        let token = encode_token(&JwtKeys::from_secret(SECRET), &claims).expect("encode token");
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn chatting_as_another_user_is_forbidden() {
        let token_user = Uuid::new_v4();
        let path_user = Uuid::new_v4();

        let response = test_router(SECRET)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/{path_user}/chat"))
                    .header("authorization", bearer(&token_user))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "message": "hi" }).to_string()))
                    .unwrap(),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn empty_message_is_a_bad_request() {
        let user_id = Uuid::new_v4();

        let response = test_router(SECRET)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/{user_id}/chat"))
                    .header("authorization", bearer(&user_id))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "message": "  " }).to_string()))
                    .unwrap(),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("body should be json");
        assert_eq!(json["message"], "Message required");
    }
}
