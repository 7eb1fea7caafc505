pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, StaffId};
pub use cors::create_cors;
