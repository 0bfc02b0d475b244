//! Authentication Middleware
//!
//! Axum middleware for bearer token validation and the ownership gate on
//! routes that modify a specific user's record.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

use crate::auth::{errors::AuthError, models::AuthUser};
use crate::errors::ApiError;
use crate::server::AppState;

/// Name of the path parameter that holds the owning username
#[derive(Debug, Clone, Copy)]
pub struct OwnerParam(pub &'static str);

/// Authentication middleware that validates bearer tokens and injects the user
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Reject the request unless it carries a valid token for an existing user.
    pub async fn validate_token(
        State(state): State<AppState>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let token = match bearer_token(req.headers()) {
            Some(token) => token,
            None => {
                tracing::warn!("[AuthMiddleware] Missing bearer token: {} {}", req.method(), req.uri());
                return Err(AuthError::Unauthenticated.into());
            }
        };

        let auth_user = match state.jwt_service.resolve(token, state.users.as_ref()).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("[AuthMiddleware] Token rejected for {} {}: {}", req.method(), req.uri(), e);
                return Err(e.into());
            }
        };
        tracing::debug!("[AuthMiddleware] Authenticated {} ({})", auth_user.username, auth_user.id);

        req.extensions_mut().insert(auth_user);

        Ok(next.run(req).await)
    }

    /// Only let the request through when the authenticated user owns the
    /// record addressed by the configured path parameter. Must run after
    /// [`AuthMiddleware::validate_token`].
    pub async fn require_owner(
        State(OwnerParam(param)): State<OwnerParam>,
        Path(params): Path<HashMap<String, String>>,
        req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let user = req.require_auth()?;
        let target = params
            .get(param)
            .ok_or_else(|| ApiError::Internal(format!("route has no `{}` path parameter", param)))?;

        if let Err(e) = check_ownership(user, target) {
            tracing::warn!("[AuthMiddleware] {} may not modify {}", user.username, target);
            return Err(e.into());
        }

        Ok(next.run(req).await)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

/// The acting user may only modify their own record.
pub fn check_ownership(user: &AuthUser, target_username: &str) -> Result<(), AuthError> {
    if user.username == target_username {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

/// Extension trait for extracting AuthUser from request
pub trait RequestAuthExt {
    fn auth_user(&self) -> Option<&AuthUser>;
    fn require_auth(&self) -> Result<&AuthUser, AuthError>;
}

impl RequestAuthExt for Request {
    fn auth_user(&self) -> Option<&AuthUser> {
        self.extensions().get::<AuthUser>()
    }

    fn require_auth(&self) -> Result<&AuthUser, AuthError> {
        self.auth_user().ok_or(AuthError::Unauthenticated)
    }
}
