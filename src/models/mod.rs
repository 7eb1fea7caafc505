pub mod auth;
pub mod check_in;
pub mod client;
pub mod client_membership;
pub mod common;
pub mod membership_plan;
pub mod pagination;
pub mod payment;
pub mod report;
pub mod trainer;

pub use auth::*;
pub use check_in::*;
pub use client::*;
pub use client_membership::*;
pub use common::*;
pub use membership_plan::*;
pub use pagination::*;
pub use payment::*;
pub use report::*;
pub use trainer::*;
