use crate::models::*;
use crate::services::ClientMembershipService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/client-memberships",
    tag = "client_membership",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of client memberships", body = [ClientMembershipResponse])
    )
)]
pub async fn list_client_memberships(
    membership_service: web::Data<ClientMembershipService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match membership_service
        .list(&query, Utc::now().date_naive())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/client-memberships/{id}",
    tag = "client_membership",
    params(("id" = i64, Path, description = "Client membership id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Client membership", body = ClientMembershipResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn get_client_membership(
    membership_service: web::Data<ClientMembershipService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match membership_service
        .get(path.into_inner(), Utc::now().date_naive())
        .await
    {
        Ok(grant) => Ok(HttpResponse::Ok().json(ApiResponse::success(grant))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/client-memberships",
    tag = "client_membership",
    request_body = ClientMembershipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Client membership created", body = ClientMembershipResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 404, description = "Client or plan not found", body = ApiError)
    )
)]
pub async fn create_client_membership(
    membership_service: web::Data<ClientMembershipService>,
    request: web::Json<ClientMembershipRequest>,
) -> Result<HttpResponse> {
    match membership_service
        .create(request.into_inner(), Utc::now())
        .await
    {
        Ok(grant) => Ok(HttpResponse::Created().json(ApiResponse::success(grant))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/client-memberships/{id}",
    tag = "client_membership",
    params(("id" = i64, Path, description = "Client membership id")),
    request_body = ClientMembershipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Client membership updated", body = ClientMembershipResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn update_client_membership(
    membership_service: web::Data<ClientMembershipService>,
    path: web::Path<i64>,
    request: web::Json<ClientMembershipRequest>,
) -> Result<HttpResponse> {
    match membership_service
        .update(
            path.into_inner(),
            request.into_inner(),
            Utc::now().date_naive(),
        )
        .await
    {
        Ok(grant) => Ok(HttpResponse::Ok().json(ApiResponse::success(grant))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/client-memberships/{id}",
    tag = "client_membership",
    params(("id" = i64, Path, description = "Client membership id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Client membership deleted"),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn delete_client_membership(
    membership_service: web::Data<ClientMembershipService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match membership_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn client_membership_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/client-memberships")
            .route("", web::get().to(list_client_memberships))
            .route("", web::post().to(create_client_membership))
            .route("/{id}", web::get().to(get_client_membership))
            .route("/{id}", web::put().to(update_client_membership))
            .route("/{id}", web::delete().to(delete_client_membership)),
    );
}
