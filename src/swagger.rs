use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{Gender, MembershipStatus, PaymentMethod, PlanKind};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::trainer::list_trainers,
        handlers::trainer::get_trainer,
        handlers::trainer::create_trainer,
        handlers::trainer::update_trainer,
        handlers::trainer::delete_trainer,
        handlers::membership_plan::list_plans,
        handlers::membership_plan::get_plan,
        handlers::membership_plan::create_plan,
        handlers::membership_plan::update_plan,
        handlers::membership_plan::delete_plan,
        handlers::client::list_clients,
        handlers::client::get_client,
        handlers::client::create_client,
        handlers::client::update_client,
        handlers::client::delete_client,
        handlers::client::client_memberships,
        handlers::client_membership::list_client_memberships,
        handlers::client_membership::get_client_membership,
        handlers::client_membership::create_client_membership,
        handlers::client_membership::update_client_membership,
        handlers::client_membership::delete_client_membership,
        handlers::payment::list_payments,
        handlers::payment::get_payment,
        handlers::payment::create_payment,
        handlers::check_in::list_check_ins,
        handlers::check_in::get_check_in,
        handlers::check_in::create_check_in,
        handlers::check_in::quick_check_in,
        handlers::report::summary,
    ),
    components(
        schemas(
            LoginRequest,
            RefreshTokenRequest,
            StaffResponse,
            AuthResponse,
            TrainerRequest,
            TrainerResponse,
            PlanKind,
            MembershipPlanRequest,
            MembershipPlanResponse,
            Gender,
            ClientRequest,
            ClientResponse,
            MembershipStatus,
            ClientMembershipRequest,
            ClientMembershipResponse,
            PaymentMethod,
            CreatePaymentRequest,
            PaymentResponse,
            CheckInRequest,
            QuickCheckInRequest,
            CheckInResponse,
            QuickCheckInResponse,
            ReportSummary,
            ListQuery,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Staff authentication"),
        (name = "trainer", description = "Trainers"),
        (name = "membership", description = "Membership plans"),
        (name = "client", description = "Clients"),
        (name = "client_membership", description = "Purchased memberships"),
        (name = "payment", description = "Payments and enrollment"),
        (name = "checkin", description = "Check-in at the front desk"),
        (name = "report", description = "Dashboard figures"),
    ),
    info(
        title = "Gym Desk API",
        version = "1.0.0",
        description = "Front-desk REST API: clients, memberships, payments and check-ins"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/clients/{id}/memberships",
            "/checkins/quick",
            "/reports/summary",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
