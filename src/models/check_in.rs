use crate::entities::check_in_entity as check_ins;
use crate::models::{ClientMembershipResponse, ClientResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CheckInRequest {
    pub client_id: Option<i64>,
}

/// Card number wins when both are supplied
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QuickCheckInRequest {
    pub card_number: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckInResponse {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
}

impl CheckInResponse {
    pub fn new(m: check_ins::Model, client_name: String) -> Self {
        Self {
            id: m.id,
            client_id: m.client_id,
            client_name,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuickCheckInResponse {
    pub checkin: CheckInResponse,
    pub client: ClientResponse,
    pub client_membership: ClientMembershipResponse,
}
