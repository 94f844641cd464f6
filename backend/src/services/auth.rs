//! Authentication service for login, profile lookup and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::Role;
use shared::validation::validate_password;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Public part of the logged-in account
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
}

/// Result of a successful login
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: SessionUser,
    pub allowed_routes: Vec<String>,
    pub default_route: String,
}

/// Profile returned by `/auth/me`
#[derive(Debug, Serialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub role_display: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub allowed_routes: Vec<String>,
    pub default_route: String,
}

/// User info from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    is_active: bool,
    full_name: Option<String>,
    phone: Option<String>,
    position: Option<String>,
}

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.password_hash, u.role, u.is_active,
           e.full_name, e.phone, e.position
    FROM users u
    LEFT JOIN employees e ON e.user_id = u.id
"#;

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Authenticate user with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResult> {
        let user = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.username = $1", USER_SELECT))
            .bind(username.trim())
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::info!(username = %user.username, "Failed login attempt");
            return Err(AppError::InvalidCredentials);
        }

        // Unknown roles in the table lock the account out rather than guessing
        let role = user
            .role
            .parse::<Role>()
            .map_err(|_| AppError::InsufficientPermissions)?;

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let token = self.generate_token(user.id, &user.username, role)?;

        tracing::info!(username = %user.username, role = %role, "User logged in");

        Ok(LoginResult {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user: SessionUser {
                id: user.id,
                email: format!("{}@restaurant.com", user.username),
                full_name: user.full_name.unwrap_or_else(|| user.username.clone()),
                username: user.username,
                role,
            },
            allowed_routes: route_list(role),
            default_route: role.default_route().to_string(),
        })
    }

    /// Current profile; the account must still exist and be active
    pub async fn profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let user = self.find_user(user_id).await?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let role = user
            .role
            .parse::<Role>()
            .map_err(|_| AppError::InsufficientPermissions)?;

        Ok(Profile {
            user_id: user.id,
            username: user.username,
            role,
            role_display: role.display_name().to_string(),
            full_name: user.full_name,
            phone: user.phone,
            position: user.position,
            is_active: user.is_active,
            allowed_routes: route_list(role),
            default_route: role.default_route().to_string(),
        })
    }

    /// Change own password after checking the old one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        validate_password(new_password).map_err(|msg| {
            AppError::validation("new_password", msg, "Mật khẩu mới phải có ít nhất 6 ký tự")
        })?;

        let user = self.find_user(user_id).await?;

        let valid = verify(old_password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::bad_request(
                "Old password is incorrect",
                "Mật khẩu cũ không đúng",
            ));
        }

        let password_hash = hash_password(new_password)?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> AppResult<UserRow> {
        sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = $1", USER_SELECT))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized {
                message: "User no longer exists".to_string(),
                message_vi: "Người dùng không tồn tại".to_string(),
            })
    }

    /// Generate a signed access token
    fn generate_token(&self, user_id: Uuid, username: &str, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

/// Decode and validate a JWT access token
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// bcrypt hash with the default cost
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn route_list(role: Role) -> Vec<String> {
    role.allowed_routes().iter().map(|r| r.to_string()).collect()
}
