use crate::database::Database;
use crate::models::{AuthResponse, LoginRequest, Role, SignupRequest, User, UserResponse};
use crate::services::user_service;
use crate::utils::error::AppError;
use crate::utils::validation;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// JWT Claims (RFC 7519)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub iss: String,
    pub sub: String, // user id
    pub aud: String,
    pub exp: usize,
    pub nbf: usize,
    pub iat: usize,
    pub jti: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "your-super-secret-jwt-key-here".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mentor-mentee-app".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mentor-mentee-users".to_string())
}

// Generate JWT token (expira em 1 hora)
pub fn generate_jwt(user: &User) -> Result<String, String> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::hours(1)).timestamp() as usize;
    let jti = format!("{}-{}-{}", user.id, iat, Uuid::new_v4());

    let claims = Claims {
        iss: get_jwt_issuer(),
        sub: user.id.to_string(),
        aud: get_jwt_audience(),
        exp,
        nbf: iat,
        iat,
        jti,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid or expired token: {}", e))
}

// User signup
pub async fn signup(db: &Database, request: &SignupRequest) -> Result<AuthResponse, AppError> {
    if !request.email.contains('@') {
        return Err(AppError::InvalidRequest("Valid email is required".to_string()));
    }
    validation::validate_password(&request.password)?;
    validation::validate_name(&request.name)?;
    if let Some(bio) = &request.bio {
        validation::validate_bio(bio)?;
    }
    if let Some(skills) = &request.skills {
        validation::validate_skills(skills)?;
    }

    // Email já cadastrado?
    if user_service::find_by_email(db.pool(), &request.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let profile_image = match &request.profile_image {
        Some(data_url) => Some(validation::validate_profile_image(data_url)?),
        None => None,
    };

    let password_hash = hash(&request.password, DEFAULT_COST)
        .map_err(|e| AppError::DatabaseError(format!("Failed to hash password: {}", e)))?;

    let skills_json = match &request.skills {
        Some(skills) => Some(
            serde_json::to_string(skills)
                .map_err(|e| AppError::InvalidRequest(format!("Invalid skills: {}", e)))?,
        ),
        None => None,
    };

    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, name, role, bio, profile_image, skills, is_matched)
         VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
    )
    .bind(&request.email)
    .bind(&password_hash)
    .bind(request.name.trim())
    .bind(request.role)
    .bind(&request.bio)
    .bind(&profile_image)
    .bind(&skills_json)
    .execute(db.pool())
    .await?;

    let user = user_service::find_by_id(db.pool(), result.last_insert_rowid())
        .await?
        .ok_or_else(|| AppError::DatabaseError("Failed to create user".to_string()))?;

    let token = generate_jwt(&user).map_err(AppError::DatabaseError)?;

    log::info!("✅ User registered: {} ({})", user.email, user.role);

    Ok(AuthResponse {
        success: true,
        token,
        user: UserResponse::from(user),
    })
}

// User login
pub async fn login(db: &Database, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let user = user_service::find_by_email(db.pool(), &request.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify(&request.password, &user.password_hash)
        .map_err(|e| AppError::DatabaseError(format!("Password verification error: {}", e)))?;

    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = generate_jwt(&user).map_err(AppError::DatabaseError)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserResponse::from(user),
    })
}

// Get current user (/api/me)
pub async fn current_user(db: &Database, user_id: i64) -> Result<UserResponse, AppError> {
    let user = user_service::find_by_id(db.pool(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(UserResponse::from(user))
}
