//! Bearer token authentication.
//!
//! Requests to protected routes carry `Authorization: Bearer <token>`, where the token is an
//! HS256 JSON Web Token whose subject is the user's ID.

use std::fmt::Debug;

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID};

/// How long a token is valid for after it is issued.
pub const TOKEN_DURATION: Duration = Duration::days(30);

const ISSUER: &str = "wallet_rs";

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// The expiry time of the token as a Unix timestamp.
    pub exp: i64,
    /// The time the token was issued as a Unix timestamp.
    pub iat: i64,
    /// Who issued the token.
    pub iss: String,
}

/// The keys used to sign and verify tokens, derived from one shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create the signing and verification keys from `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtKeys(********)")
    }
}

/// Create a token for `user_id` that expires after [TOKEN_DURATION].
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn encode_token(user_id: UserID, keys: &JwtKeys) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + TOKEN_DURATION).unix_timestamp(),
        iat: now.unix_timestamp(),
        iss: ISSUER.to_owned(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify `token` and return the ID of the user it was issued to.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the signature, expiry, issuer or subject is invalid.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<UserID, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);

    let token_data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|error| {
        tracing::debug!("rejected token: {error}");
        Error::InvalidToken
    })?;

    token_data
        .claims
        .sub
        .parse()
        .map(UserID::new)
        .map_err(|_| Error::InvalidToken)
}

/// The authenticated user making a request.
///
/// Extracting this from a request fails with [Error::MissingToken] or [Error::InvalidToken],
/// which are reported as `401 Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserID);

impl<S> FromRequestParts<S> for AuthUser
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    Error::MissingToken
                } else {
                    Error::InvalidToken
                }
            })?;

        let keys = JwtKeys::from_ref(state);

        decode_token(bearer.token(), &keys).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use time::OffsetDateTime;

    use crate::{
        Error, UserID,
        auth::{AuthUser, Claims, JwtKeys, decode_token, encode_token},
    };

    #[test]
    fn decode_token_gives_user_id() {
        let keys = JwtKeys::new("foobar");

        let token = encode_token(UserID::new(7), &keys).unwrap();

        assert_eq!(decode_token(&token, &keys), Ok(UserID::new(7)));
    }

    #[test]
    fn decode_token_fails_with_other_secret() {
        let token = encode_token(UserID::new(7), &JwtKeys::new("foobar")).unwrap();

        assert_eq!(
            decode_token(&token, &JwtKeys::new("barbaz")),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn decode_token_fails_when_expired() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "7".to_owned(),
            exp: now - 3600,
            iat: now - 7200,
            iss: "wallet_rs".to_owned(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"foobar"),
        )
        .unwrap();

        assert_eq!(
            decode_token(&token, &JwtKeys::new("foobar")),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn decode_token_fails_with_non_numeric_subject() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "jane".to_owned(),
            exp: now + 3600,
            iat: now,
            iss: "wallet_rs".to_owned(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"foobar"),
        )
        .unwrap();

        assert_eq!(
            decode_token(&token, &JwtKeys::new("foobar")),
            Err(Error::InvalidToken)
        );
    }

    async fn whoami(AuthUser(user_id): AuthUser) -> String {
        user_id.to_string()
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/whoami", get(whoami))
            .with_state(JwtKeys::new("foobar"));

        TestServer::new(app)
    }

    #[tokio::test]
    async fn extractor_accepts_valid_token() {
        let server = get_test_server();
        let token = encode_token(UserID::new(3), &JwtKeys::new("foobar")).unwrap();

        let response = server
            .get("/whoami")
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_text("3");
    }

    #[tokio::test]
    async fn extractor_rejects_missing_token() {
        let server = get_test_server();

        let response = server.get("/whoami").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<serde_json::Value>()["error"]["message"], "missing token");
    }

    #[tokio::test]
    async fn extractor_rejects_invalid_token() {
        let server = get_test_server();

        let response = server
            .get("/whoami")
            .authorization_bearer("not-a-token")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<serde_json::Value>()["error"]["message"], "invalid token");
    }
}
