use crate::entities::{
    MembershipStatus, PlanKind, client_entity as clients, client_membership_entity as cm,
    membership_plan_entity as plans,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Manual grant create/replace, used by staff to correct bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientMembershipRequest {
    pub client_id: i64,
    pub membership_id: i64,
    #[schema(value_type = Option<String>, example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "2024-01-31")]
    pub end_date: Option<NaiveDate>,
    pub remaining_visits: Option<i32>,
    pub status: Option<MembershipStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientMembershipResponse {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub membership_id: i64,
    pub membership_name: String,
    pub membership_type: Option<PlanKind>,
    #[schema(value_type = String)]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    pub remaining_visits: Option<i32>,
    pub status: MembershipStatus,
    /// Activity predicate evaluated for today
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ClientMembershipResponse {
    pub fn new(
        grant: cm::Model,
        plan: &plans::Model,
        client: &clients::Model,
        today: NaiveDate,
    ) -> Self {
        let membership_type = plan.plan_kind();
        let is_active = crate::services::is_grant_active(&grant, membership_type, today);
        Self {
            id: grant.id,
            client_id: grant.client_id,
            client_name: client.full_name(),
            membership_id: plan.id,
            membership_name: plan.name.clone(),
            membership_type,
            start_date: grant.start_date,
            end_date: grant.end_date,
            remaining_visits: grant.remaining_visits,
            status: grant.status,
            is_active,
            created_at: grant.created_at,
        }
    }
}
