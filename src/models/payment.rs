use crate::entities::{PaymentMethod, payment_entity as payments};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Purchase request; dates are `YYYY-MM-DD` strings and unparseable dates
/// count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub client_id: Option<i64>,
    pub membership_id: Option<i64>,
    pub trainer_id: Option<i64>,
    #[schema(example = "cash")]
    pub method: Option<String>,
    #[schema(example = "2024-01-01")]
    pub fixed_start: Option<String>,
    #[schema(example = "2024-01-31")]
    pub fixed_end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub membership_id: Option<i64>,
    pub membership_name: Option<String>,
    pub trainer_id: Option<i64>,
    pub trainer_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub fixed_start: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub fixed_end: Option<NaiveDate>,
    #[schema(value_type = String, example = "80.00")]
    pub membership_amount: Decimal,
    #[schema(value_type = String, example = "25.00")]
    pub trainer_fee: Decimal,
    #[schema(value_type = String, example = "105.00")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl PaymentResponse {
    pub fn new(
        m: payments::Model,
        client_name: String,
        membership_name: Option<String>,
        trainer_name: Option<String>,
    ) -> Self {
        Self {
            id: m.id,
            client_id: m.client_id,
            client_name,
            membership_id: m.plan_id,
            membership_name,
            trainer_id: m.trainer_id,
            trainer_name,
            fixed_start: m.fixed_start,
            fixed_end: m.fixed_end,
            membership_amount: m.membership_amount,
            trainer_fee: m.trainer_fee,
            amount: m.amount,
            method: m.method,
            created_at: m.created_at,
        }
    }
}
