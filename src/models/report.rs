use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    #[schema(value_type = String, example = "2024-01-15")]
    pub today: NaiveDate,
    #[schema(value_type = String, example = "80.00")]
    pub today_income: Decimal,
    #[schema(value_type = String, example = "1240.00")]
    pub month_income: Decimal,
    pub today_checkins: i64,
    /// Stored-active grants that pass the activity predicate today
    pub active_memberships: i64,
    /// Stored-active grants that no longer pass it
    pub expired_memberships: i64,
}
