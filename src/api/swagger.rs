use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mentor-Mentee API",
        version = "1.0.0",
        description = "REST API for the mentor/mentee matching service. \n\n**Authentication:** All endpoints except signup/login/health require a JWT Bearer token.\n\n**Features:**\n- Signup/login with mentor or mentee role\n- Profile management (bio, skills, profile image)\n- Mentor browsing with skill filters\n- Match requests with a pending/accepted/rejected lifecycle and automatic rejection of competing requests on accept"
    ),
    paths(
        // Auth
        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::get_me,

        // Users
        crate::api::users::get_profile,
        crate::api::users::update_profile,
        crate::api::users::delete_profile,

        // Mentors
        crate::api::mentors::get_mentors,
        crate::api::mentors::get_mentor,
        crate::api::mentors::get_mentor_status,

        // Match requests
        crate::api::requests::create_match_request,
        crate::api::requests::incoming_requests,
        crate::api::requests::outgoing_requests,
        crate::api::requests::accept_request,
        crate::api::requests::reject_request,
        crate::api::requests::cancel_request,
        crate::api::requests::list_requests,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::user::Role,
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            crate::models::user::UpdateProfileRequest,
            crate::models::user::UserResponse,
            crate::models::user::AuthResponse,
            crate::models::match_request::MatchStatus,
            crate::models::match_request::MatchRequest,
            crate::models::match_request::CreateMatchRequestRequest,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Signup, login and current-user endpoints."),
        (name = "Users", description = "Profile management for the authenticated user."),
        (name = "Mentors", description = "Mentor browsing for mentees and matching status for mentors."),
        (name = "MatchRequests", description = "Match request lifecycle: create, accept, reject, cancel and listings."),
        (name = "Health", description = "Health check endpoint for monitoring."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
