pub mod match_request;
pub mod user;

pub use match_request::*;
pub use user::*;
