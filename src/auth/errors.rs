//! Authentication error types.

use axum::http::StatusCode;

/// Failures produced by the auth core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password at login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected route.
    #[error("missing bearer token")]
    Unauthenticated,

    /// Token signature does not verify or the token is malformed.
    #[error("bad token signature")]
    BadSignature,

    /// Token signature is intact but `exp` has passed.
    #[error("token expired")]
    Expired,

    /// The token's subject no longer resolves to a stored user.
    #[error("token subject not found")]
    IdentityNotFound,

    /// Authenticated, but not the owner of the addressed record.
    #[error("permission denied")]
    PermissionDenied,

    /// The credential store could not be reached.
    #[error("credential store unavailable: {0}")]
    StorageUnavailable(String),

    /// Hashing or signing failed.
    #[error("internal auth failure: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::IdentityNotFound => StatusCode::UNAUTHORIZED,
            // Kept at 400 for compatibility with existing clients.
            AuthError::PermissionDenied => StatusCode::BAD_REQUEST,
            AuthError::StorageUnavailable(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Incorrect username or password.",
            AuthError::Unauthenticated
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::IdentityNotFound => "Unauthorized",
            AuthError::PermissionDenied => "Permission denied",
            AuthError::StorageUnavailable(_) | AuthError::Internal(_) => "Internal server error",
        }
    }
}

impl From<crate::database::StoreError> for AuthError {
    fn from(err: crate::database::StoreError) -> Self {
        AuthError::StorageUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_share_status_and_message() {
        for err in [
            AuthError::Unauthenticated,
            AuthError::BadSignature,
            AuthError::Expired,
            AuthError::IdentityNotFound,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.public_message(), "Unauthorized");
        }
    }

    #[test]
    fn test_permission_denied_is_bad_request() {
        assert_eq!(AuthError::PermissionDenied.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_failure_is_not_a_credential_failure() {
        let err = AuthError::StorageUnavailable("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("connection refused"));
        assert_ne!(err.public_message(), AuthError::InvalidCredentials.public_message());
    }
}
