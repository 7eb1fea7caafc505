use crate::models::*;
use crate::services::{ClientMembershipService, ClientService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/clients",
    tag = "client",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of clients with their active membership", body = [ClientResponse])
    )
)]
pub async fn list_clients(
    client_service: web::Data<ClientService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match client_service.list(&query, Utc::now()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/clients/{id}",
    tag = "client",
    params(("id" = i64, Path, description = "Client id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Client", body = ClientResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn get_client(
    client_service: web::Data<ClientService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match client_service.get(path.into_inner(), Utc::now()).await {
        Ok(client) => Ok(HttpResponse::Ok().json(ApiResponse::success(client))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/clients",
    tag = "client",
    request_body = ClientRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Client registered", body = ClientResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 409, description = "Card number already assigned", body = ApiError)
    )
)]
pub async fn create_client(
    client_service: web::Data<ClientService>,
    request: web::Json<ClientRequest>,
) -> Result<HttpResponse> {
    match client_service.create(request.into_inner(), Utc::now()).await {
        Ok(client) => Ok(HttpResponse::Created().json(ApiResponse::success(client))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/clients/{id}",
    tag = "client",
    params(("id" = i64, Path, description = "Client id")),
    request_body = ClientRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Card number already assigned", body = ApiError)
    )
)]
pub async fn update_client(
    client_service: web::Data<ClientService>,
    path: web::Path<i64>,
    request: web::Json<ClientRequest>,
) -> Result<HttpResponse> {
    match client_service
        .update(path.into_inner(), request.into_inner(), Utc::now())
        .await
    {
        Ok(client) => Ok(HttpResponse::Ok().json(ApiResponse::success(client))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/clients/{id}",
    tag = "client",
    params(("id" = i64, Path, description = "Client id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Client and their history deleted"),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn delete_client(
    client_service: web::Data<ClientService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match client_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/clients/{id}/memberships",
    tag = "client",
    params(("id" = i64, Path, description = "Client id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All memberships of the client, newest first", body = [ClientMembershipResponse]),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn client_memberships(
    membership_service: web::Data<ClientMembershipService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let today = Utc::now().date_naive();
    match membership_service
        .list_for_client(path.into_inner(), today)
        .await
    {
        Ok(grants) => Ok(HttpResponse::Ok().json(ApiResponse::success(grants))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn client_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/clients")
            .route("", web::get().to(list_clients))
            .route("", web::post().to(create_client))
            .route("/{id}", web::get().to(get_client))
            .route("/{id}", web::put().to(update_client))
            .route("/{id}", web::delete().to(delete_client))
            .route("/{id}/memberships", web::get().to(client_memberships)),
    );
}
