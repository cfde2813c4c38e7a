pub mod auth;
pub mod health;
pub mod mentors;
pub mod requests;
pub mod swagger;
pub mod users;
