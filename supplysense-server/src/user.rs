use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use supplysense_core::UserContext;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";

/// The caller's [`UserContext`], taken from the `x-user-id` header.
pub struct CurrentUser(pub UserContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        Ok(Self(UserContext::new(user_id)?))
    }
}
