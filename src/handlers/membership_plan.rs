use crate::models::*;
use crate::services::MembershipPlanService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/memberships",
    tag = "membership",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of membership plans", body = [MembershipPlanResponse])
    )
)]
pub async fn list_plans(
    plan_service: web::Data<MembershipPlanService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match plan_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/memberships/{id}",
    tag = "membership",
    params(("id" = i64, Path, description = "Membership plan id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Membership plan", body = MembershipPlanResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn get_plan(
    plan_service: web::Data<MembershipPlanService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match plan_service.get(path.into_inner()).await {
        Ok(plan) => Ok(HttpResponse::Ok().json(ApiResponse::success(plan))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/memberships",
    tag = "membership",
    request_body = MembershipPlanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Membership plan created", body = MembershipPlanResponse),
        (status = 400, description = "Fields do not match the plan kind", body = ApiError)
    )
)]
pub async fn create_plan(
    plan_service: web::Data<MembershipPlanService>,
    request: web::Json<MembershipPlanRequest>,
) -> Result<HttpResponse> {
    match plan_service.create(request.into_inner()).await {
        Ok(plan) => Ok(HttpResponse::Created().json(ApiResponse::success(plan))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/memberships/{id}",
    tag = "membership",
    params(("id" = i64, Path, description = "Membership plan id")),
    request_body = MembershipPlanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Membership plan updated", body = MembershipPlanResponse),
        (status = 400, description = "Fields do not match the plan kind", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn update_plan(
    plan_service: web::Data<MembershipPlanService>,
    path: web::Path<i64>,
    request: web::Json<MembershipPlanRequest>,
) -> Result<HttpResponse> {
    match plan_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(plan) => Ok(HttpResponse::Ok().json(ApiResponse::success(plan))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/memberships/{id}",
    tag = "membership",
    params(("id" = i64, Path, description = "Membership plan id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Membership plan deleted"),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Plan still referenced by client memberships", body = ApiError)
    )
)]
pub async fn delete_plan(
    plan_service: web::Data<MembershipPlanService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match plan_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn membership_plan_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/memberships")
            .route("", web::get().to(list_plans))
            .route("", web::post().to(create_plan))
            .route("/{id}", web::get().to(get_plan))
            .route("/{id}", web::put().to(update_plan))
            .route("/{id}", web::delete().to(delete_plan)),
    );
}
