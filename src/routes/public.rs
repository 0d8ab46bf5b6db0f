use axum::{Router, routing::get};
use serde_json::{Value, json};

use crate::response::{ApiReply, ApiResult};

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> ApiResult<Value> {
    ApiReply::ok(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::router;

    #[tokio::test]
    async fn health_reports_ok_inside_the_envelope() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("body should be json");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
    }
}
