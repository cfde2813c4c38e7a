mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://database.sqlite".to_string());
    let cors_origin =
        env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    log::info!("🚀 Starting Mentoring Service...");
    log::info!("📊 Database: {}", database_url);

    // Initialize SQLite connection pool (creates schema on first run)
    let db = database::Database::new(&database_url)
        .await
        .expect("Failed to open database");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ Database connected successfully");
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            // Payload JSON até 2MB (imagens de perfil em base64)
            .app_data(web::JsonConfig::default().limit(2 * 1024 * 1024))
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/api/health", web::get().to(api::health::health_check))
            // Public auth endpoints
            .route("/api/signup", web::post().to(api::auth::signup))
            .route("/api/login", web::post().to(api::auth::login))
            // Protected API (JWT required)
            .service(
                web::scope("/api")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/me", web::get().to(api::auth::get_me))
                    // Profile
                    .route("/profile", web::get().to(api::users::get_profile))
                    .route("/profile", web::put().to(api::users::update_profile))
                    .route("/profile", web::delete().to(api::users::delete_profile))
                    // Mentors
                    .route("/mentors", web::get().to(api::mentors::get_mentors))
                    .route("/mentors/{id}", web::get().to(api::mentors::get_mentor))
                    .route("/mentor/status", web::get().to(api::mentors::get_mentor_status))
                    // Match requests
                    .route(
                        "/match-requests",
                        web::post().to(api::requests::create_match_request),
                    )
                    .route(
                        "/match-requests/incoming",
                        web::get().to(api::requests::incoming_requests),
                    )
                    .route(
                        "/match-requests/outgoing",
                        web::get().to(api::requests::outgoing_requests),
                    )
                    .route(
                        "/match-requests/{id}/accept",
                        web::put().to(api::requests::accept_request),
                    )
                    .route(
                        "/match-requests/{id}/reject",
                        web::put().to(api::requests::reject_request),
                    )
                    .route(
                        "/match-requests/{id}",
                        web::delete().to(api::requests::cancel_request),
                    )
                    .route("/requests", web::get().to(api::requests::list_requests)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
