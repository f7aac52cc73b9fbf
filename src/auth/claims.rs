use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload. The signature binds `sub` and `exp` to the server secret;
/// nothing else is needed for a stateless session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user ID the token vouches for
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}
