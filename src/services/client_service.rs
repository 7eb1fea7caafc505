use crate::entities::{
    check_in_entity as check_ins, client_entity as clients, client_membership_entity as cm,
    payment_entity as payments,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::client_membership_service::{load_active_grant, load_active_grants};
use crate::services::listing::{apply_ordering, apply_search};
use crate::utils::normalize_phone;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    IntoSimpleExpr, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct ClientService {
    pool: DatabaseConnection,
}

impl ClientService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &ListQuery,
        now: DateTime<Utc>,
    ) -> AppResult<PaginatedResponse<ClientResponse>> {
        let select = apply_search(
            clients::Entity::find(),
            query,
            vec![
                clients::Column::FirstName.into_simple_expr(),
                clients::Column::LastName.into_simple_expr(),
                clients::Column::Phone.into_simple_expr(),
                clients::Column::Email.into_simple_expr(),
                clients::Column::Organization.into_simple_expr(),
                clients::Column::CardNumber.into_simple_expr(),
            ],
        );

        let total = select.clone().count(&self.pool).await? as i64;

        let models = apply_ordering(
            select,
            query,
            |field| match field {
                "id" => Some(clients::Column::Id.into_simple_expr()),
                "created_at" => Some(clients::Column::CreatedAt.into_simple_expr()),
                "first_name" => Some(clients::Column::FirstName.into_simple_expr()),
                "last_name" => Some(clients::Column::LastName.into_simple_expr()),
                _ => None,
            },
            clients::Column::Id.into_simple_expr(),
        )
        .limit(query.get_limit() as u64)
        .offset(query.get_offset() as u64)
        .all(&self.pool)
        .await?;

        let ids: Vec<i64> = models.iter().map(|c| c.id).collect();
        let active = load_active_grants(&self.pool, &ids, now.date_naive()).await?;

        let items = models
            .into_iter()
            .map(|c| {
                let active_id = active.get(&c.id).map(|g| g.record.id);
                ClientResponse::new(c, active_id)
            })
            .collect();
        Ok(PaginatedResponse::from_query(items, query, total))
    }

    pub async fn get(&self, id: i64, now: DateTime<Utc>) -> AppResult<ClientResponse> {
        let client = self.find(id).await?;
        self.respond(client, now).await
    }

    pub async fn create(
        &self,
        req: ClientRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ClientResponse> {
        let req = validate_client(req)?;
        self.ensure_card_free(req.card_number.as_deref(), None).await?;

        let model = clients::ActiveModel {
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            birth_date: Set(req.birth_date),
            gender: Set(req.gender),
            phone: Set(req.phone),
            email: Set(req.email),
            organization: Set(req.organization),
            card_number: Set(req.card_number),
            photo_path: Set(req.photo_path),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Client {} registered", model.id);
        // A brand new client has no grants yet.
        Ok(ClientResponse::new(model, None))
    }

    pub async fn update(
        &self,
        id: i64,
        req: ClientRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ClientResponse> {
        let req = validate_client(req)?;
        let existing = self.find(id).await?;
        self.ensure_card_free(req.card_number.as_deref(), Some(existing.id)).await?;

        let mut am = existing.into_active_model();
        am.first_name = Set(req.first_name);
        am.last_name = Set(req.last_name);
        am.birth_date = Set(req.birth_date);
        am.gender = Set(req.gender);
        am.phone = Set(req.phone);
        am.email = Set(req.email);
        am.organization = Set(req.organization);
        am.card_number = Set(req.card_number);
        am.photo_path = Set(req.photo_path);
        let model = am.update(&self.pool).await?;

        self.respond(model, now).await
    }

    /// Delete a client together with their grants, payments and check-ins.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let client = self.find(id).await?;

        let txn = self.pool.begin().await?;
        check_ins::Entity::delete_many()
            .filter(check_ins::Column::ClientId.eq(client.id))
            .exec(&txn)
            .await?;
        payments::Entity::delete_many()
            .filter(payments::Column::ClientId.eq(client.id))
            .exec(&txn)
            .await?;
        cm::Entity::delete_many()
            .filter(cm::Column::ClientId.eq(client.id))
            .exec(&txn)
            .await?;
        clients::Entity::delete_by_id(client.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!("Client {} deleted with history", client.id);
        Ok(())
    }

    async fn find(&self, id: i64) -> AppResult<clients::Model> {
        clients::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
    }

    async fn respond(
        &self,
        client: clients::Model,
        now: DateTime<Utc>,
    ) -> AppResult<ClientResponse> {
        let active = load_active_grant(&self.pool, client.id, now.date_naive()).await?;
        Ok(ClientResponse::new(client, active.map(|g| g.record.id)))
    }

    async fn ensure_card_free(
        &self,
        card_number: Option<&str>,
        owner: Option<i64>,
    ) -> AppResult<()> {
        let Some(card_number) = card_number else {
            return Ok(());
        };

        let holder = clients::Entity::find()
            .filter(clients::Column::CardNumber.eq(card_number))
            .one(&self.pool)
            .await?;
        match holder {
            Some(holder) if Some(holder.id) != owner => Err(AppError::Conflict(format!(
                "Card number {card_number} is already assigned"
            ))),
            _ => Ok(()),
        }
    }
}

fn validate_client(mut req: ClientRequest) -> AppResult<ClientRequest> {
    req.first_name = req.first_name.trim().to_string();
    req.last_name = req.last_name.trim().to_string();
    if req.first_name.is_empty() {
        return Err(AppError::field("first_name", "is required"));
    }
    if req.last_name.is_empty() {
        return Err(AppError::field("last_name", "is required"));
    }
    req.phone = normalize_phone(&req.phone)?;

    req.email = req.email.trim().to_string();
    if !req.email.is_empty() && !req.email.contains('@') {
        return Err(AppError::field("email", "is not a valid address"));
    }
    req.organization = req.organization.trim().to_string();
    req.card_number = req
        .card_number
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    req.photo_path = req.photo_path.filter(|p| !p.trim().is_empty());
    Ok(req)
}
