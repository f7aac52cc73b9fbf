use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest, SignupResponse, TokenResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    // Friendly pre-check; the UNIQUE constraint in User::create still
    // catches the race where two signups for one email interleave.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.name,
        &payload.email,
        &hash,
        payload.phone.as_deref(),
        &payload.language,
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully",
            id: user.id,
        }),
    ))
}

/// Decide a login attempt. Unknown email and wrong password both come back
/// as `InvalidCredentials` so the endpoint does not confirm which addresses
/// are registered; the two causes are only told apart in the logs.
fn check_credentials(user: Option<User>, email: &str, password: &str) -> Result<User, ApiError> {
    let Some(user) = user else {
        warn!(%email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login wrong password");
        return Err(ApiError::InvalidCredentials);
    }
    Ok(user)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = check_credentials(
        User::find_by_email(&state.db, &payload.email).await?,
        &payload.email,
        &payload.password,
    )?;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("ravi.kumar+farm@mail.co.in"));
        assert!(is_valid_email("Asha@Example.COM"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    fn user_with_password(password: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: hash_password(password).expect("hash"),
            phone: None,
            language: "hi".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn correct_password_passes_the_credential_check() {
        let user = user_with_password("right-horse");
        let ok = check_credentials(Some(user), "asha@example.com", "right-horse")
            .expect("valid credentials");
        assert_eq!(ok.email, "asha@example.com");
    }

    #[test]
    fn unknown_email_and_wrong_password_fail_identically() {
        let user = user_with_password("right-horse");

        let unknown = check_credentials(None, "ghost@example.com", "right-horse").unwrap_err();
        let wrong = check_credentials(Some(user), "asha@example.com", "wrong-horse").unwrap_err();

        assert!(matches!(unknown, ApiError::InvalidCredentials));
        assert!(matches!(wrong, ApiError::InvalidCredentials));
        assert_eq!(unknown.kind(), wrong.kind());
        assert_eq!(unknown.status(), wrong.status());
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_misses_render_one_wire_response() {
        // The two miss paths must be byte-identical on the wire.
        let user = user_with_password("right-horse");

        let unknown = check_credentials(None, "ghost@example.com", "right-horse")
            .unwrap_err()
            .into_response();
        let wrong = check_credentials(Some(user), "asha@example.com", "wrong-horse")
            .unwrap_err()
            .into_response();

        assert_eq!(unknown.status(), wrong.status());
        let unknown_body = axum::body::to_bytes(unknown.into_body(), usize::MAX)
            .await
            .unwrap();
        let wrong_body = axum::body::to_bytes(wrong.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(unknown_body, wrong_body);
    }
}
