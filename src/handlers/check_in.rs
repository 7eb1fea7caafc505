use crate::models::*;
use crate::services::CheckInService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/checkins",
    tag = "checkin",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of check-ins", body = [CheckInResponse])
    )
)]
pub async fn list_check_ins(
    check_in_service: web::Data<CheckInService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match check_in_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/checkins/{id}",
    tag = "checkin",
    params(("id" = i64, Path, description = "Check-in id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Check-in", body = CheckInResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn get_check_in(
    check_in_service: web::Data<CheckInService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match check_in_service.get(path.into_inner()).await {
        Ok(check_in) => Ok(HttpResponse::Ok().json(ApiResponse::success(check_in))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/checkins",
    tag = "checkin",
    request_body = CheckInRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Client admitted", body = CheckInResponse),
        (status = 400, description = "client_id missing", body = ApiError),
        (status = 403, description = "Membership expired or absent", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    )
)]
pub async fn create_check_in(
    check_in_service: web::Data<CheckInService>,
    request: web::Json<CheckInRequest>,
) -> Result<HttpResponse> {
    match check_in_service
        .check_in(request.into_inner(), Utc::now())
        .await
    {
        Ok(check_in) => Ok(HttpResponse::Created().json(ApiResponse::success(check_in))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Check in by card number or phone
#[utoipa::path(
    post,
    path = "/checkins/quick",
    tag = "checkin",
    request_body = QuickCheckInRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Client admitted", body = QuickCheckInResponse),
        (status = 400, description = "Neither card_number nor phone given", body = ApiError),
        (status = 403, description = "Membership expired or absent", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    )
)]
pub async fn quick_check_in(
    check_in_service: web::Data<CheckInService>,
    request: web::Json<QuickCheckInRequest>,
) -> Result<HttpResponse> {
    match check_in_service
        .check_in_quick(request.into_inner(), Utc::now())
        .await
    {
        Ok(res) => Ok(HttpResponse::Created().json(ApiResponse::success(res))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn check_in_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkins")
            .route("", web::get().to(list_check_ins))
            .route("", web::post().to(create_check_in))
            .route("/quick", web::post().to(quick_check_in))
            .route("/{id}", web::get().to(get_check_in)),
    );
}
