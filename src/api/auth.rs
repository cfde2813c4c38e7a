use actix_web::{web, HttpResponse, ResponseError};

use crate::database::Database;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
use crate::services::auth_service;

#[utoipa::path(
    post,
    path = "/api/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn signup(
    db: web::Data<Database>,
    request: web::Json<SignupRequest>,
) -> HttpResponse {
    log::info!("📝 POST /api/signup - email: {}, role: {}", request.email, request.role);

    match auth_service::signup(&db, &request).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => {
            log::warn!("❌ Signup failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    db: web::Data<Database>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /api/login - email: {}", request.email);

    match auth_service::login(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user information", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
) -> HttpResponse {
    match auth_service::current_user(&db, user.id).await {
        Ok(current) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": current
        })),
        Err(e) => {
            log::warn!("❌ GET /api/me failed for user {}: {}", user.id, e);
            e.error_response()
        }
    }
}
