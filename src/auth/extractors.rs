use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;

use super::jwt::JwtKeys;
use super::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
///
/// The scheme check is case sensitive: `Token xyz` and `bearer xyz` are both
/// rejected as malformed.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::MissingCredential)?;
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::MalformedCredential)
}

/// Resolved identity of the caller. Every protected route takes this
/// extractor, so a request only reaches its handler after the token has
/// been verified and the subject re-fetched from the database.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = JwtKeys::from_ref(state).verify(token)?;

        // Tokens can outlive their user, so the subject is resolved fresh
        // on every request rather than trusted from the claims alone.
        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                ApiError::UserNotFound
            })?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with_auth(value: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(value).unwrap(),
        );
        headers
    }

    #[test]
    fn missing_header_is_missing_credential() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::MissingCredential)
        ));
    }

    #[test]
    fn wrong_scheme_is_malformed() {
        let headers = headers_with_auth(b"Token abc123");
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::MalformedCredential)
        ));
    }

    #[test]
    fn lowercase_scheme_is_malformed() {
        let headers = headers_with_auth(b"bearer abc123");
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::MalformedCredential)
        ));
    }

    #[test]
    fn non_utf8_header_is_malformed() {
        let headers = headers_with_auth(b"Bearer \xff\xfe");
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::MalformedCredential)
        ));
    }

    #[test]
    fn bearer_token_is_extracted() {
        let headers = headers_with_auth(b"Bearer ey.ab.cd");
        assert_eq!(bearer_token(&headers).unwrap(), "ey.ab.cd");
    }
}
