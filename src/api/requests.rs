use actix_web::{web, HttpResponse, ResponseError};

use crate::database::Database;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreateMatchRequestRequest, MatchRequest, RequestListQuery, Role};
use crate::services::matching_service;
use crate::utils::error::AppError;
use crate::utils::validation;

#[utoipa::path(
    post,
    path = "/api/match-requests",
    tag = "MatchRequests",
    request_body = CreateMatchRequestRequest,
    responses(
        (status = 201, description = "Match request created successfully", body = MatchRequest),
        (status = 400, description = "Domain rule violated (already matched, duplicate pending, self request...)"),
        (status = 403, description = "Only mentees can create match requests"),
        (status = 404, description = "Mentor not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_match_request(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<CreateMatchRequestRequest>,
) -> HttpResponse {
    log::info!(
        "📨 POST /api/match-requests - mentee: {}, mentor: {}",
        user.id,
        request.mentor_id
    );

    let message = request
        .message
        .clone()
        .unwrap_or_else(|| matching_service::DEFAULT_MESSAGE.to_string());

    if let Err(e) = validation::validate_message(&message) {
        return e.error_response();
    }

    match matching_service::create(&db, user.id, user.role, request.mentor_id, message.trim())
        .await
    {
        Ok(created) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "request": created
        })),
        Err(e) => {
            log::warn!("❌ Match request creation failed (mentee {}): {}", user.id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/match-requests/incoming",
    tag = "MatchRequests",
    responses(
        (status = 200, description = "Incoming requests, newest first"),
        (status = 403, description = "Only mentors can access incoming requests")
    ),
    security(("bearer_auth" = []))
)]
pub async fn incoming_requests(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
) -> HttpResponse {
    if user.role != Role::Mentor {
        return AppError::Forbidden("Only mentors can access incoming requests".to_string())
            .error_response();
    }

    match matching_service::incoming(&db, user.id).await {
        Ok(requests) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "requests": requests
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/match-requests/outgoing",
    tag = "MatchRequests",
    responses(
        (status = 200, description = "Outgoing requests, newest first"),
        (status = 403, description = "Only mentees can access outgoing requests")
    ),
    security(("bearer_auth" = []))
)]
pub async fn outgoing_requests(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
) -> HttpResponse {
    if user.role != Role::Mentee {
        return AppError::Forbidden("Only mentees can access outgoing requests".to_string())
            .error_response();
    }

    match matching_service::outgoing(&db, user.id).await {
        Ok(requests) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "requests": requests
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/match-requests/{id}/accept",
    tag = "MatchRequests",
    params(("id" = i64, Path, description = "Match request id")),
    responses(
        (status = 200, description = "Request accepted; both parties matched, competing requests auto-rejected", body = MatchRequest),
        (status = 400, description = "Request is not pending or a party is already matched"),
        (status = 403, description = "Not the addressed mentor"),
        (status = 404, description = "Match request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn accept_request(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<i64>,
) -> HttpResponse {
    if user.role != Role::Mentor {
        return AppError::Forbidden("Only mentors can accept match requests".to_string())
            .error_response();
    }

    let request_id = path.into_inner();
    log::info!("🤝 PUT /api/match-requests/{}/accept - mentor: {}", request_id, user.id);

    match matching_service::accept(&db, request_id, user.id).await {
        Ok(accepted) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "request": accepted
        })),
        Err(e) => {
            log::warn!("❌ Accept failed for request {}: {}", request_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/match-requests/{id}/reject",
    tag = "MatchRequests",
    params(("id" = i64, Path, description = "Match request id")),
    responses(
        (status = 200, description = "Request rejected", body = MatchRequest),
        (status = 400, description = "Request is not pending"),
        (status = 403, description = "Not the addressed mentor"),
        (status = 404, description = "Match request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_request(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<i64>,
) -> HttpResponse {
    if user.role != Role::Mentor {
        return AppError::Forbidden("Only mentors can reject match requests".to_string())
            .error_response();
    }

    let request_id = path.into_inner();
    log::info!("🚫 PUT /api/match-requests/{}/reject - mentor: {}", request_id, user.id);

    match matching_service::reject(&db, request_id, user.id).await {
        Ok(rejected) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "request": rejected
        })),
        Err(e) => {
            log::warn!("❌ Reject failed for request {}: {}", request_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/match-requests/{id}",
    tag = "MatchRequests",
    params(("id" = i64, Path, description = "Match request id")),
    responses(
        (status = 200, description = "Match request deleted successfully"),
        (status = 400, description = "Request is not pending"),
        (status = 403, description = "Not the owning mentee"),
        (status = 404, description = "Match request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_request(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<i64>,
) -> HttpResponse {
    if user.role != Role::Mentee {
        return AppError::Forbidden("Only mentees can delete match requests".to_string())
            .error_response();
    }

    let request_id = path.into_inner();
    log::info!("🗑️ DELETE /api/match-requests/{} - mentee: {}", request_id, user.id);

    match matching_service::cancel(&db, request_id, user.id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Match request deleted successfully"
        })),
        Err(e) => {
            log::warn!("❌ Cancel failed for request {}: {}", request_id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "MatchRequests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Requests for the caller (incoming for mentors, outgoing for mentees)")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_requests(
    db: web::Data<Database>,
    user: web::ReqData<AuthenticatedUser>,
    query: web::Query<RequestListQuery>,
) -> HttpResponse {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    match matching_service::list_for(&db, user.id, user.role, query.status, page, limit).await {
        Ok(requests) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "requests": requests,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": requests.len()
            }
        })),
        Err(e) => e.error_response(),
    }
}
