//! Request extractors.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tessera_core::Actor;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Actor a request acts on behalf of.
///
/// Taken from the `x-user-id` header; a missing, blank or non-UTF-8 value
/// yields the anonymous actor. Identity is not verified here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorExtractor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for ActorExtractor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Actor::new)
            .unwrap_or_default();
        Ok(ActorExtractor(actor))
    }
}
