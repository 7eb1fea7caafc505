use crate::models::*;
use crate::services::ReportService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/reports/summary",
    tag = "report",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Today's income, check-ins and membership counts", body = ReportSummary)
    )
)]
pub async fn summary(report_service: web::Data<ReportService>) -> Result<HttpResponse> {
    match report_service.summary(Utc::now().date_naive()).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn report_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/reports").route("/summary", web::get().to(summary)));
}
