pub mod auth_service;
pub mod matching_service;
pub mod user_service;
