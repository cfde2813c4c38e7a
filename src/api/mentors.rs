use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::database::Database;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{Role, UserResponse};
use crate::services::user_service;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MentorListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Lista de skills separadas por vírgula
    pub skills: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/mentors",
    tag = "Mentors",
    params(MentorListQuery),
    responses(
        (status = 200, description = "Mentors retrieved successfully"),
        (status = 403, description = "Only mentees can view mentor list")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_mentors(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    query: web::Query<MentorListQuery>,
) -> HttpResponse {
    if user.role != Role::Mentee {
        return AppError::Forbidden("Only mentees can view mentor list".to_string())
            .error_response();
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let skills: Vec<String> = query
        .skills
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    match user_service::find_mentors(&db, page, limit, &skills).await {
        Ok(mentors) => {
            let mentors: Vec<UserResponse> =
                mentors.into_iter().map(UserResponse::from).collect();

            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "mentors": mentors,
                "pagination": {
                    "page": page,
                    "limit": limit,
                    "total": mentors.len()
                }
            }))
        }
        Err(e) => {
            log::warn!("❌ Mentor listing failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/mentors/{id}",
    tag = "Mentors",
    params(("id" = i64, Path, description = "Mentor id")),
    responses(
        (status = 200, description = "Mentor details retrieved successfully", body = UserResponse),
        (status = 403, description = "Only mentees can view mentor details"),
        (status = 404, description = "Mentor not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_mentor(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<i64>,
) -> HttpResponse {
    if user.role != Role::Mentee {
        return AppError::Forbidden("Only mentees can view mentor details".to_string())
            .error_response();
    }

    let mentor_id = path.into_inner();

    match user_service::find_by_id(db.pool(), mentor_id).await {
        Ok(Some(mentor)) if mentor.role == Role::Mentor => {
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "mentor": UserResponse::from(mentor)
            }))
        }
        // Usuário existe mas não é mentor: para o cliente é o mesmo que não existir
        Ok(_) => AppError::NotFound("Mentor".to_string()).error_response(),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/mentor/status",
    tag = "Mentors",
    responses(
        (status = 200, description = "Mentor status retrieved successfully"),
        (status = 403, description = "Only mentors can access this endpoint")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_mentor_status(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
) -> HttpResponse {
    if user.role != Role::Mentor {
        return AppError::Forbidden("Only mentors can access this endpoint".to_string())
            .error_response();
    }

    match user_service::find_by_id(db.pool(), user.id).await {
        Ok(Some(mentor)) => {
            let mentor = UserResponse::from(mentor);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "status": {
                    "isMatched": mentor.is_matched,
                    "name": mentor.name,
                    "email": mentor.email,
                    "bio": mentor.bio,
                    "skills": mentor.skills
                }
            }))
        }
        Ok(None) => AppError::NotFound("Mentor".to_string()).error_response(),
        Err(e) => e.error_response(),
    }
}
