use crate::models::*;
use crate::services::TrainerService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/trainers",
    tag = "trainer",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of trainers", body = [TrainerResponse]),
        (status = 401, description = "Unauthorized", body = ApiError)
    )
)]
pub async fn list_trainers(
    trainer_service: web::Data<TrainerService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match trainer_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/trainers/{id}",
    tag = "trainer",
    params(("id" = i64, Path, description = "Trainer id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Trainer", body = TrainerResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn get_trainer(
    trainer_service: web::Data<TrainerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match trainer_service.get(path.into_inner()).await {
        Ok(trainer) => Ok(HttpResponse::Ok().json(ApiResponse::success(trainer))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/trainers",
    tag = "trainer",
    request_body = TrainerRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Trainer created", body = TrainerResponse),
        (status = 400, description = "Invalid input", body = ApiError)
    )
)]
pub async fn create_trainer(
    trainer_service: web::Data<TrainerService>,
    request: web::Json<TrainerRequest>,
) -> Result<HttpResponse> {
    match trainer_service.create(request.into_inner()).await {
        Ok(trainer) => Ok(HttpResponse::Created().json(ApiResponse::success(trainer))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/trainers/{id}",
    tag = "trainer",
    params(("id" = i64, Path, description = "Trainer id")),
    request_body = TrainerRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Trainer updated", body = TrainerResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn update_trainer(
    trainer_service: web::Data<TrainerService>,
    path: web::Path<i64>,
    request: web::Json<TrainerRequest>,
) -> Result<HttpResponse> {
    match trainer_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(trainer) => Ok(HttpResponse::Ok().json(ApiResponse::success(trainer))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/trainers/{id}",
    tag = "trainer",
    params(("id" = i64, Path, description = "Trainer id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Trainer deleted, payments keep their history"),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn delete_trainer(
    trainer_service: web::Data<TrainerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match trainer_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn trainer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/trainers")
            .route("", web::get().to(list_trainers))
            .route("", web::post().to(create_trainer))
            .route("/{id}", web::get().to(get_trainer))
            .route("/{id}", web::put().to(update_trainer))
            .route("/{id}", web::delete().to(delete_trainer)),
    );
}
