use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveEnum, DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a plan bounds entry: by days from purchase, by visit count, or by an
/// explicit date window chosen at purchase time.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    #[sea_orm(string_value = "unlimited")]
    Unlimited,
    #[sea_orm(string_value = "limited")]
    Limited,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanKind::Unlimited => write!(f, "unlimited"),
            PlanKind::Limited => write!(f, "limited"),
            PlanKind::Fixed => write!(f, "fixed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "membership_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Raw stored kind; see [`Model::plan_kind`]
    pub kind: String,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub price: Decimal,
    /// Required for unlimited plans
    pub duration_days: Option<i32>,
    /// Required for limited plans
    pub visit_count: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_memberships::Entity")]
    ClientMemberships,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::client_memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientMemberships.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Model {
    /// Decoded plan kind, `None` for a value outside the known set.
    pub fn plan_kind(&self) -> Option<PlanKind> {
        PlanKind::try_from_value(&self.kind).ok()
    }
}

impl ActiveModelBehavior for ActiveModel {}
