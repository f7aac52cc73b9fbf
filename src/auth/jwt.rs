use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Signing and verification keys, derived once per use from config.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            ttl: Duration::from_secs(config.ttl_minutes.max(0) as u64 * 60),
        }
    }

    /// Sign a token for `user_id` with the configured lifetime.
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_ttl(user_id, TimeDuration::seconds(self.ttl.as_secs() as i64))
    }

    /// Sign a token with an explicit lifetime. Negative lifetimes produce an
    /// already-expired token, which the expiry tests rely on.
    pub fn sign_with_ttl(&self, user_id: Uuid, ttl: TimeDuration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Validate signature, expiry and claim shape. Every rejection collapses
    /// into `InvalidToken` so callers cannot tell a forged token from an
    /// expired one; the distinction only reaches the logs.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(self.algorithm);
        // No grace window once past exp.
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(user_id = %data.claims.sub, "jwt verified");
                Ok(data.claims)
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => debug!("token expired"),
                    _ => warn!(error = %e, "token rejected"),
                }
                Err(ApiError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_config(&AppConfig::for_tests().jwt)
    }

    fn keys_with_secret(secret: &str) -> JwtKeys {
        let mut config = AppConfig::for_tests().jwt;
        config.secret = secret.into();
        JwtKeys::from_config(&config)
    }

    #[test]
    fn sign_and_verify_returns_subject() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = make_keys();
        let token = keys
            .sign_with_ttl(Uuid::new_v4(), TimeDuration::seconds(-60))
            .expect("sign");
        assert!(matches!(keys.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn no_grace_window_after_expiry() {
        let keys = make_keys();
        // One second past expiry. The crate's default 60s leeway would still
        // accept this token; zero leeway must not.
        let token = keys
            .sign_with_ttl(Uuid::new_v4(), TimeDuration::seconds(-1))
            .expect("sign");
        assert!(matches!(keys.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4()).expect("sign");

        let (head, sig) = token.rsplit_once('.').expect("jwt has three segments");
        let mut chars: Vec<char> = sig.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{head}.{}", chars.into_iter().collect::<String>());

        assert_ne!(token, tampered);
        assert!(matches!(
            keys.verify(&tampered),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4()).expect("sign");

        let parts: Vec<&str> = token.split('.').collect();
        let other = keys.sign(Uuid::new_v4()).expect("sign");
        let other_payload: Vec<&str> = other.split('.').collect();
        // Splice a different subject under the first token's signature.
        let spliced = format!("{}.{}.{}", parts[0], other_payload[1], parts[2]);

        assert!(matches!(keys.verify(&spliced), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let keys = make_keys();
        assert!(matches!(keys.verify("garbage"), Err(ApiError::InvalidToken)));
        assert!(matches!(keys.verify(""), Err(ApiError::InvalidToken)));
        assert!(matches!(
            keys.verify("a.b.c"),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let ours = keys_with_secret("secret-one");
        let theirs = keys_with_secret("secret-two");
        let token = theirs.sign(Uuid::new_v4()).expect("sign");
        assert!(matches!(ours.verify(&token), Err(ApiError::InvalidToken)));
    }
}
