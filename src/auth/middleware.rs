//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Paths that never require a token: everything outside `/api/` (health
/// routes live at `/health` and fall through to a plain 404 when unknown)
/// plus the login endpoint itself.
fn is_public_path(path: &str) -> bool {
    !path.starts_with("/api/") || path == "/api/auth/login"
}

/// Authentication middleware - require a logged-in user
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`.
/// On success, injects [`CurrentUser`] into request extensions.
///
/// # Requests that skip authentication
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (includes `/health` and `/health/detailed`)
/// - `/api/auth/login`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if is_public_path(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "Missing authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(target: "security", error = %e, uri = %req.uri(), "Authentication failed");

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_skip_authentication() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/health/detailed"));
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/nonexistent"));
    }

    #[test]
    fn api_paths_require_authentication() {
        assert!(!is_public_path("/api/orders"));
        assert!(!is_public_path("/api/dashboard"));
        assert!(!is_public_path("/api/cash-closing"));
        assert!(!is_public_path("/api/auth/me"));
        assert!(!is_public_path("/api/auth/login/extra"));
    }
}
