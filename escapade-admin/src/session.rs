//! Signed session tokens carried by the `session` cookie.
//!
//! A token is an HS256 JWT whose claims hold the [Principal] and the time it
//! was issued. Nothing is stored server side, so a session lives until the
//! token expires or the cookie is overwritten.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PrimaryKey, Role, UserData};

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "session";
/// Seven days
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// The authenticated identity embedded in a session token.
///
/// It is copied from the user at login and not checked against the
/// database again until a new token is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrimaryKey,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&UserData> for Principal {
    fn from(user: &UserData) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionClaims {
    user: Principal,
    /// Milliseconds since the epoch
    created_at: i64,
    /// Seconds since the epoch
    exp: i64,
}

#[derive(Debug, Error)]
#[error("Could not issue session token: {0}")]
pub struct SessionError(#[from] jsonwebtoken::errors::Error);

/// Issues and reads session tokens with a server-held key
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issues a token for the principal, valid for [SESSION_MAX_AGE_SECS]
    pub fn encode(&self, principal: &Principal) -> Result<String, SessionError> {
        self.encode_at(principal, Utc::now())
    }

    pub fn encode_at(
        &self,
        principal: &Principal,
        issued_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let expires_at = issued_at + Duration::seconds(SESSION_MAX_AGE_SECS);

        let claims = SessionClaims {
            user: principal.clone(),
            created_at: issued_at.timestamp_millis(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Returns the principal of a token, or `None` if the token is
    /// malformed, tampered with, or expired.
    pub fn decode(&self, token: &str) -> Option<Principal> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| data.claims.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn round_trips() {
        let codec = SessionCodec::new(b"secret");
        let token = codec.encode(&principal()).unwrap();

        assert_eq!(codec.decode(&token), Some(principal()));
    }

    #[test]
    fn garbage_is_no_session() {
        let codec = SessionCodec::new(b"secret");

        assert_eq!(codec.decode(""), None);
        assert_eq!(codec.decode("not a token"), None);
        assert_eq!(codec.decode("%7B%22user%22%3A%7B%7D%7D"), None);
    }

    #[test]
    fn tokens_from_another_key_are_rejected() {
        let token = SessionCodec::new(b"other").encode(&principal()).unwrap();

        assert_eq!(SessionCodec::new(b"secret").decode(&token), None);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = SessionCodec::new(b"secret");
        let user = Principal {
            role: Role::User,
            ..principal()
        };
        let token = codec.encode(&user).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let forged = SessionCodec::new(b"forger").encode(&principal()).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();

        assert_eq!(codec.decode(&parts.join(".")), None);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let codec = SessionCodec::new(b"secret");
        let issued_at = Utc::now() - Duration::days(8);
        let token = codec.encode_at(&principal(), issued_at).unwrap();

        assert_eq!(codec.decode(&token), None);
    }
}
