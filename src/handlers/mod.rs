pub mod auth;
pub mod check_in;
pub mod client;
pub mod client_membership;
pub mod membership_plan;
pub mod payment;
pub mod report;
pub mod trainer;

pub use auth::auth_config;
pub use check_in::check_in_config;
pub use client::client_config;
pub use client_membership::client_membership_config;
pub use membership_plan::membership_plan_config;
pub use payment::payment_config;
pub use report::report_config;
pub use trainer::trainer_config;

/// Every API route, mounted under `/api/v1`
pub fn api_config(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.configure(auth_config)
        .configure(trainer_config)
        .configure(membership_plan_config)
        .configure(client_config)
        .configure(client_membership_config)
        .configure(payment_config)
        .configure(check_in_config)
        .configure(report_config);
}
