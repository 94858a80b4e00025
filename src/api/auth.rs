use super::{get_connection, ApiError, AppState};
use crate::tables::{NewUser, User};
use crate::AUTH_API;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user row. The password hash is deliberately not
/// representable here, so it cannot leak into any response.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub nickname: String,
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let nickname = user.nickname.unwrap_or_else(|| user.username.clone());
        Self {
            id: user.id,
            username: user.username,
            nickname,
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(format!("/{AUTH_API}/register").as_str(), post(register))
        .route(format!("/{AUTH_API}/login").as_str(), post(login))
}

/// Hash a plaintext password using Argon2id with a random salt, producing a
/// PHC-formatted string (algorithm, params, and salt embedded).
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err),
    }
}

fn require(field: Option<String>) -> Result<String, ApiError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Validation("username and password are required".to_string()))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    use crate::schema::users;

    let username = require(payload.username)?;
    let password = require(payload.password)?;
    info!("POST register {username}");

    let mut conn = get_connection(&state)?;

    let taken = users::table
        .filter(users::username.eq(&username))
        .select(users::id)
        .first::<i32>(&mut conn)
        .optional()?;
    if taken.is_some() {
        return Err(ApiError::Conflict("username already taken"));
    }

    let password_hash = hash_password(&password).map_err(|err| {
        error!("password hashing failed: {err}");
        ApiError::Internal
    })?;
    let nickname = payload
        .nickname
        .filter(|nick| !nick.is_empty())
        .unwrap_or_else(|| username.clone());

    let user: User = diesel::insert_into(users::table)
        .values(&NewUser {
            username: &username,
            password_hash: &password_hash,
            nickname: &nickname,
        })
        .get_result(&mut conn)
        .map_err(|err| match err {
            // Lost a race with a concurrent register for the same name.
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ApiError::Conflict("username already taken"),
            other => ApiError::Database(other),
        })?;

    Ok(Json(AuthResponse {
        success: true,
        user: user.into(),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    use crate::schema::users;

    let username = require(payload.username)?;
    let password = require(payload.password)?;
    info!("POST login {username}");

    let mut conn = get_connection(&state)?;

    // Unknown user and wrong password are indistinguishable to the caller.
    let user = users::table
        .filter(users::username.eq(&username))
        .select(User::as_select())
        .first::<User>(&mut conn)
        .optional()?
        .ok_or(ApiError::Unauthorized)?;

    let matches = verify_password(&password, &user.password_hash).map_err(|err| {
        error!("password verification failed: {err}");
        ApiError::Internal
    })?;
    if !matches {
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(AuthResponse {
        success: true,
        user: user.into(),
    }))
}
