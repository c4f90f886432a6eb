//! User API Handlers

use axum::Json;
use serde_json::{Value, json};

use crate::api::auth::CurrentUser;

/// GET /api/users/me
/// Identity the gateway forwarded for this request
pub async fn current_user(CurrentUser(user_id): CurrentUser) -> Json<Value> {
    Json(json!({ "id": user_id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_user_echoes_identity() {
        let Json(body) = current_user(CurrentUser(42)).await;
        assert_eq!(body, json!({ "id": 42 }));
    }
}
