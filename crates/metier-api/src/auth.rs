//! Admin authentication.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use sha2::{Digest, Sha256};
use tracing::warn;

use metier_core::logging;

use crate::{ApiError, AppState};

/// SHA-256 digest of a bearer token.
pub fn token_digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Extractor that requires the admin bearer token.
///
/// Both the configured secret and the presented token are hashed before
/// comparison. When no token is configured every request is rejected.
///
/// ```ignore
/// async fn admin_only(_admin: RequireAdmin) -> impl IntoResponse { /* ... */ }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token_digest.as_ref() else {
            warn!(
                subsystem = logging::SUBSYSTEM_API,
                component = logging::COMPONENT_AUTH,
                "Admin route called but no admin token is configured"
            );
            return Err(ApiError::Unauthorized(
                "Admin access is not configured".to_string(),
            ));
        };

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        if token_digest(token) != *expected {
            warn!(subsystem = logging::SUBSYSTEM_API, component = logging::COMPONENT_AUTH, "Rejected invalid admin token");
            return Err(ApiError::Unauthorized("Invalid admin token".to_string()));
        }

        Ok(RequireAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_distinct() {
        assert_eq!(token_digest("secret"), token_digest("secret"));
        assert_ne!(token_digest("secret"), token_digest("Secret"));
    }
}
