//! Authentication middleware
//!
//! JWT authentication and role-based access control middleware

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::models::Role;
use uuid::Uuid;

use crate::error::{AppError, AppResult, ErrorResponse};
use crate::services::auth::decode_token;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Fail with 403 unless the role passes `allowed`
    pub fn require(&self, allowed: fn(&Role) -> bool) -> AppResult<()> {
        if allowed(&self.role) {
            Ok(())
        } else {
            tracing::warn!(user = %self.username, role = %self.role, "Permission denied");
            Err(AppError::InsufficientPermissions)
        }
    }

    /// Owner or admin
    pub fn require_manager(&self) -> AppResult<()> {
        self.require(Role::is_manager)
    }

    pub fn require_kitchen(&self) -> AppResult<()> {
        self.require(Role::is_kitchen)
    }

    pub fn require_cashier(&self) -> AppResult<()> {
        self.require(Role::is_cashier)
    }
}

/// Authentication middleware that validates bearer JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token.trim(),
        None => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match authenticate(token, &state.config.jwt.secret) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Turn a raw token into an `AuthUser`
pub fn authenticate(token: &str, secret: &str) -> AppResult<AuthUser> {
    let claims = decode_token(token, secret)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
    let role = claims
        .role
        .parse::<Role>()
        .map_err(|_| AppError::InsufficientPermissions)?;

    Ok(AuthUser {
        user_id,
        username: claims.username,
        role,
    })
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse::new("UNAUTHORIZED", message, "Chưa đăng nhập hoặc token không hợp lệ");
    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse::new(
                    "UNAUTHORIZED",
                    "Authentication required",
                    "Vui lòng đăng nhập",
                );
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
