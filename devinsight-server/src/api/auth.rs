//! Caller Identity
//!
//! Authentication happens upstream: the gateway validates the user's token
//! and forwards the user ID in the `X-User-Id` header.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, request::Parts},
};

use crate::api::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// ID of the authenticated user making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_user_id(parts.headers.get(USER_ID_HEADER)).map(CurrentUser)
    }
}

fn parse_user_id(value: Option<&HeaderValue>) -> Result<i64, ApiError> {
    let value = value.ok_or_else(|| ApiError::Unauthorized("Missing user identity".to_string()))?;

    value
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::Unauthorized("Invalid user identity".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        let header = HeaderValue::from_static("42");
        assert_eq!(parse_user_id(Some(&header)).unwrap(), 42);

        assert!(matches!(parse_user_id(None), Err(ApiError::Unauthorized(_))));

        for bad in ["abc", "-1", "0", ""] {
            let header = HeaderValue::from_static(bad);
            assert!(matches!(
                parse_user_id(Some(&header)),
                Err(ApiError::Unauthorized(_))
            ));
        }
    }
}
