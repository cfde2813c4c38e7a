use actix_web::{web, HttpResponse, ResponseError};

use crate::database::Database;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{UpdateProfileRequest, UserResponse};
use crate::services::user_service;
use crate::utils::error::AppError;

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
) -> HttpResponse {
    match user_service::find_by_id(db.pool(), user.id).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": UserResponse::from(profile)
        })),
        Ok(None) => AppError::NotFound("User".to_string()).error_response(),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<UpdateProfileRequest>,
) -> HttpResponse {
    log::info!("✏️ PUT /api/profile - user: {}", user.id);

    match user_service::update_profile(&db, user.id, &request).await {
        Ok(updated) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": UserResponse::from(updated)
        })),
        Err(e) => {
            log::warn!("❌ Profile update failed for user {}: {}", user.id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/profile",
    tag = "Users",
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_profile(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/profile - user: {}", user.id);

    match user_service::delete_user(&db, user.id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "User deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
