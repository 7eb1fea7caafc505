use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payment",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Page of payments", body = [PaymentResponse])
    )
)]
pub async fn list_payments(
    payment_service: web::Data<PaymentService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match payment_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "payment",
    params(("id" = i64, Path, description = "Payment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment", body = PaymentResponse),
        (status = 404, description = "Not found", body = ApiError)
    )
)]
pub async fn get_payment(
    payment_service: web::Data<PaymentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match payment_service.get(path.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Ok().json(ApiResponse::success(payment))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Take a payment and enroll the client in the purchased plan
#[utoipa::path(
    post,
    path = "/payments",
    tag = "payment",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Payment recorded and membership granted", body = PaymentResponse),
        (status = 400, description = "Invalid purchase", body = ApiError),
        (status = 404, description = "Client, plan or trainer not found", body = ApiError)
    )
)]
pub async fn create_payment(
    payment_service: web::Data<PaymentService>,
    request: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .purchase(request.into_inner(), Utc::now())
        .await
    {
        Ok(payment) => Ok(HttpResponse::Created().json(ApiResponse::success(payment))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::get().to(list_payments))
            .route("", web::post().to(create_payment))
            .route("/{id}", web::get().to(get_payment)),
    );
}
