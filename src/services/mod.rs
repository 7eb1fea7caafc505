pub mod auth_service;
pub mod check_in_service;
pub mod client_membership_service;
pub mod client_service;
pub mod listing;
pub mod membership_plan_service;
pub mod membership_state;
pub mod payment_service;
pub mod report_service;
pub mod trainer_service;

pub use auth_service::*;
pub use check_in_service::*;
pub use client_membership_service::*;
pub use client_service::*;
pub use membership_plan_service::*;
pub use membership_state::*;
pub use payment_service::*;
pub use report_service::*;
pub use trainer_service::*;
