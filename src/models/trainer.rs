use crate::entities::trainer_entity as trainers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrainerRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub specialization: String,
    #[schema(value_type = String, example = "25.00")]
    pub fee: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrainerResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub specialization: String,
    #[schema(value_type = String, example = "25.00")]
    pub fee: Decimal,
}

impl From<trainers::Model> for TrainerResponse {
    fn from(m: trainers::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            phone: m.phone,
            specialization: m.specialization,
            fee: m.fee,
        }
    }
}
