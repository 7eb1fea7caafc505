use crate::entities::{Gender, client_entity as clients};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientRequest {
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = Option<String>, example = "1990-01-01")]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub organization: String,
    pub card_number: Option<String>,
    pub photo_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = Option<String>)]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: String,
    pub email: String,
    pub organization: String,
    pub card_number: Option<String>,
    pub photo_path: Option<String>,
    /// Grant that currently authorizes entry, if any
    pub active_membership_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ClientResponse {
    pub fn new(m: clients::Model, active_membership_id: Option<i64>) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            birth_date: m.birth_date,
            gender: m.gender,
            phone: m.phone,
            email: m.email,
            organization: m.organization,
            card_number: m.card_number,
            photo_path: m.photo_path,
            active_membership_id,
            is_active: active_membership_id.is_some(),
            created_at: m.created_at,
        }
    }
}
