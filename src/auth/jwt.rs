//! JWT Token Service
//!
//! Issues HS256 bearer tokens for authenticated users and verifies them on
//! incoming requests. Tokens are stateless: nothing is stored server-side and
//! a token stops working only when it expires. There is no revocation or key
//! rotation; anyone holding the signing secret can mint valid tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{errors::AuthError, models::AuthUser};
use crate::database::UserStore;

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User unique identifier
    pub sub: Uuid,
    /// Username at the time of issue
    pub username: String,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issuer
    pub iss: String,
}

/// A freshly signed token and its expiry (unix seconds)
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service signing with `secret`
    pub fn new(secret: &str, issuer: &str, ttl: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: issuer.to_string(),
            ttl,
        }
    }

    /// Generate a token for `user`, valid from now
    pub fn issue(&self, user: &AuthUser) -> Result<IssuedToken, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Generate a token as if issued at `now`
    pub fn issue_at(&self, user: &AuthUser, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expiration = now + self.ttl;

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to encode JWT: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::BadSignature,
            })
    }

    /// Verify `token` and re-resolve its subject against the store.
    pub async fn resolve(&self, token: &str, store: &dyn UserStore) -> Result<AuthUser, AuthError> {
        let claims = self.decode(token)?;
        match store.find_by_id(claims.sub).await? {
            Some(user) => Ok(AuthUser::from(user)),
            None => Err(AuthError::IdentityNotFound),
        }
    }
}
