use crate::entities::{PlanKind, membership_plan_entity as plans};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipPlanRequest {
    pub name: String,
    pub kind: PlanKind,
    #[schema(value_type = String, example = "80.00")]
    pub price: Decimal,
    pub duration_days: Option<i32>,
    pub visit_count: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MembershipPlanResponse {
    pub id: i64,
    pub name: String,
    /// Absent when the stored kind is not recognized
    pub kind: Option<PlanKind>,
    #[schema(value_type = String, example = "80.00")]
    pub price: Decimal,
    pub duration_days: Option<i32>,
    pub visit_count: Option<i32>,
}

impl From<plans::Model> for MembershipPlanResponse {
    fn from(m: plans::Model) -> Self {
        Self {
            kind: m.plan_kind(),
            id: m.id,
            name: m.name,
            price: m.price,
            duration_days: m.duration_days,
            visit_count: m.visit_count,
        }
    }
}
