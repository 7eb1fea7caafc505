use crate::entities::{
    MembershipStatus, PlanKind, client_entity as clients, client_membership_entity as cm,
    membership_plan_entity as plans,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::listing::{apply_ordering, apply_search};
use crate::services::membership_state::{Grant, select_active_grant};
use chrono::{DateTime, Days, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, IntoSimpleExpr, JoinType, PaginatorTrait, QueryFilter, QuerySelect,
    RelationTrait, Set,
};
use std::collections::HashMap;

/// The grant currently authorizing entry for a client, if any.
///
/// Generic over the connection so the check-in path can call it inside its
/// transaction.
pub async fn load_active_grant<C>(
    conn: &C,
    client_id: i64,
    today: NaiveDate,
) -> AppResult<Option<Grant>>
where
    C: ConnectionTrait,
{
    let rows = cm::Entity::find()
        .filter(cm::Column::ClientId.eq(client_id))
        .filter(cm::Column::Status.eq(MembershipStatus::Active))
        .find_also_related(plans::Entity)
        .all(conn)
        .await?;

    let grants = rows
        .into_iter()
        .filter_map(|(record, plan)| plan.map(|plan| Grant::new(record, plan)));
    Ok(select_active_grant(grants, today))
}

/// Active grant per client for a batch of clients
pub async fn load_active_grants<C>(
    conn: &C,
    client_ids: &[i64],
    today: NaiveDate,
) -> AppResult<HashMap<i64, Grant>>
where
    C: ConnectionTrait,
{
    if client_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = cm::Entity::find()
        .filter(cm::Column::ClientId.is_in(client_ids.iter().copied()))
        .filter(cm::Column::Status.eq(MembershipStatus::Active))
        .find_also_related(plans::Entity)
        .all(conn)
        .await?;

    let mut by_client: HashMap<i64, Vec<Grant>> = HashMap::new();
    for (record, plan) in rows {
        if let Some(plan) = plan {
            by_client
                .entry(record.client_id)
                .or_default()
                .push(Grant::new(record, plan));
        }
    }

    Ok(by_client
        .into_iter()
        .filter_map(|(client_id, grants)| {
            select_active_grant(grants, today).map(|grant| (client_id, grant))
        })
        .collect())
}

#[derive(Clone)]
pub struct ClientMembershipService {
    pool: DatabaseConnection,
}

impl ClientMembershipService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &ListQuery,
        today: NaiveDate,
    ) -> AppResult<PaginatedResponse<ClientMembershipResponse>> {
        let select = cm::Entity::find()
            .join(JoinType::InnerJoin, cm::Relation::Client.def())
            .join(JoinType::InnerJoin, cm::Relation::Plan.def());
        let select = apply_search(
            select,
            query,
            vec![
                clients::Column::FirstName.into_simple_expr(),
                clients::Column::LastName.into_simple_expr(),
                plans::Column::Name.into_simple_expr(),
                cm::Column::Status.into_simple_expr(),
            ],
        );

        let total = select.clone().count(&self.pool).await? as i64;

        let models = apply_ordering(
            select,
            query,
            |field| match field {
                "id" => Some(cm::Column::Id.into_simple_expr()),
                "created_at" => Some(cm::Column::CreatedAt.into_simple_expr()),
                "start_date" => Some(cm::Column::StartDate.into_simple_expr()),
                "end_date" => Some(cm::Column::EndDate.into_simple_expr()),
                _ => None,
            },
            cm::Column::CreatedAt.into_simple_expr(),
        )
        .limit(query.get_limit() as u64)
        .offset(query.get_offset() as u64)
        .all(&self.pool)
        .await?;

        let items = self.hydrate(models, today).await?;
        Ok(PaginatedResponse::from_query(items, query, total))
    }

    /// All grants of one client, newest first
    pub async fn list_for_client(
        &self,
        client_id: i64,
        today: NaiveDate,
    ) -> AppResult<Vec<ClientMembershipResponse>> {
        let client = self.find_client(client_id).await?;
        let rows = cm::Entity::find()
            .filter(cm::Column::ClientId.eq(client.id))
            .find_also_related(plans::Entity)
            .all(&self.pool)
            .await?;

        let mut items: Vec<_> = rows
            .into_iter()
            .filter_map(|(grant, plan)| {
                plan.map(|plan| ClientMembershipResponse::new(grant, &plan, &client, today))
            })
            .collect();
        items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(items)
    }

    pub async fn get(&self, id: i64, today: NaiveDate) -> AppResult<ClientMembershipResponse> {
        let grant = self.find(id).await?;
        self.respond(grant, today).await
    }

    pub async fn create(
        &self,
        req: ClientMembershipRequest,
        now: DateTime<Utc>,
    ) -> AppResult<ClientMembershipResponse> {
        let today = now.date_naive();
        let (client, plan) = self.resolve_refs(&req).await?;
        let fields = validate_grant(&req, &plan)?;

        let model = cm::ActiveModel {
            client_id: Set(client.id),
            plan_id: Set(plan.id),
            start_date: Set(fields.start_date),
            end_date: Set(fields.end_date),
            remaining_visits: Set(fields.remaining_visits),
            status: Set(fields.status),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Client membership {} created manually for client {}",
            model.id,
            client.id
        );
        Ok(ClientMembershipResponse::new(model, &plan, &client, today))
    }

    pub async fn update(
        &self,
        id: i64,
        req: ClientMembershipRequest,
        today: NaiveDate,
    ) -> AppResult<ClientMembershipResponse> {
        let existing = self.find(id).await?;
        let (client, plan) = self.resolve_refs(&req).await?;
        let fields = validate_grant(&req, &plan)?;

        let mut am = existing.into_active_model();
        am.client_id = Set(client.id);
        am.plan_id = Set(plan.id);
        am.start_date = Set(fields.start_date);
        am.end_date = Set(fields.end_date);
        am.remaining_visits = Set(fields.remaining_visits);
        am.status = Set(fields.status);
        let model = am.update(&self.pool).await?;

        log::info!("Client membership {} updated", model.id);
        Ok(ClientMembershipResponse::new(model, &plan, &client, today))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let grant = self.find(id).await?;
        cm::Entity::delete_by_id(grant.id).exec(&self.pool).await?;
        log::info!("Client membership {} deleted", grant.id);
        Ok(())
    }

    async fn find(&self, id: i64) -> AppResult<cm::Model> {
        cm::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Client membership not found".to_string()))
    }

    async fn find_client(&self, id: i64) -> AppResult<clients::Model> {
        clients::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
    }

    async fn resolve_refs(
        &self,
        req: &ClientMembershipRequest,
    ) -> AppResult<(clients::Model, plans::Model)> {
        let client = self.find_client(req.client_id).await?;
        let plan = plans::Entity::find_by_id(req.membership_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership plan not found".to_string()))?;
        Ok((client, plan))
    }

    async fn respond(
        &self,
        grant: cm::Model,
        today: NaiveDate,
    ) -> AppResult<ClientMembershipResponse> {
        let mut items = self.hydrate(vec![grant], today).await?;
        items
            .pop()
            .ok_or_else(|| AppError::InternalError("Client membership lost its references".into()))
    }

    async fn hydrate(
        &self,
        grants: Vec<cm::Model>,
        today: NaiveDate,
    ) -> AppResult<Vec<ClientMembershipResponse>> {
        let client_ids: Vec<i64> = grants.iter().map(|g| g.client_id).collect();
        let plan_ids: Vec<i64> = grants.iter().map(|g| g.plan_id).collect();

        let clients: HashMap<i64, clients::Model> = clients::Entity::find()
            .filter(clients::Column::Id.is_in(client_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let plans: HashMap<i64, plans::Model> = plans::Entity::find()
            .filter(plans::Column::Id.is_in(plan_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(grants
            .into_iter()
            .filter_map(|grant| {
                let client = clients.get(&grant.client_id)?;
                let plan = plans.get(&grant.plan_id)?;
                Some(ClientMembershipResponse::new(grant, plan, client, today))
            })
            .collect())
    }
}

struct GrantFields {
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    remaining_visits: Option<i32>,
    status: MembershipStatus,
}

/// Staff-entered grant bookkeeping, checked against the plan kind.
///
/// An unlimited grant entered without an end date runs for the plan's
/// duration from its start date.
fn validate_grant(req: &ClientMembershipRequest, plan: &plans::Model) -> AppResult<GrantFields> {
    let start_date = req
        .start_date
        .ok_or_else(|| AppError::field("start_date", "is required"))?;
    if req.remaining_visits.is_some_and(|v| v < 0) {
        return Err(AppError::field("remaining_visits", "must not be negative"));
    }
    if req.end_date.is_some_and(|end| end < start_date) {
        return Err(AppError::field("end_date", "must not precede start_date"));
    }

    let Some(kind) = plan.plan_kind() else {
        return Err(AppError::field("membership_id", "plan kind is not recognized"));
    };

    let end_date = match kind {
        PlanKind::Fixed => Some(
            req.end_date
                .ok_or_else(|| AppError::field("end_date", "is required for fixed plans"))?,
        ),
        PlanKind::Limited => {
            if req.remaining_visits.is_none() {
                return Err(AppError::field(
                    "remaining_visits",
                    "is required for limited plans",
                ));
            }
            req.end_date
        }
        PlanKind::Unlimited => match (req.end_date, plan.duration_days) {
            (Some(end), _) => Some(end),
            (None, Some(days)) if days > 0 => Some(
                start_date
                    .checked_add_days(Days::new(days as u64))
                    .ok_or_else(|| AppError::field("start_date", "is out of range"))?,
            ),
            (None, _) => {
                return Err(AppError::field(
                    "end_date",
                    "is required when the plan has no duration",
                ));
            }
        },
    };

    Ok(GrantFields {
        start_date,
        end_date,
        remaining_visits: req.remaining_visits,
        status: req.status.unwrap_or(MembershipStatus::Active),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use sea_orm::ActiveEnum;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn seed(pool: &DatabaseConnection, kind: PlanKind) -> (clients::Model, plans::Model) {
        let client = clients::ActiveModel {
            first_name: Set("Levan".into()),
            last_name: Set("Gelashvili".into()),
            phone: Set("555200300".into()),
            email: Set(String::new()),
            organization: Set(String::new()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(pool)
        .await
        .unwrap();
        let plan = plans::ActiveModel {
            name: Set(format!("{kind} plan")),
            kind: Set(kind.to_value()),
            price: Set(dec!(60.00)),
            duration_days: Set(Some(30)),
            visit_count: Set(Some(10)),
            ..Default::default()
        }
        .insert(pool)
        .await
        .unwrap();
        (client, plan)
    }

    fn request(client_id: i64, membership_id: i64) -> ClientMembershipRequest {
        ClientMembershipRequest {
            client_id,
            membership_id,
            start_date: Some(date("2024-01-01")),
            end_date: None,
            remaining_visits: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_validates_per_kind() {
        let pool = test_pool().await;
        let service = ClientMembershipService::new(pool.clone());
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();

        let (client, fixed) = seed(&pool, PlanKind::Fixed).await;
        let err = service
            .create(request(client.id, fixed.id), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mut req = request(client.id, fixed.id);
        req.end_date = Some(date("2024-01-20"));
        let grant = service.create(req, now).await.unwrap();
        assert!(grant.is_active);
        assert_eq!(grant.membership_type, Some(PlanKind::Fixed));
        assert_eq!(grant.client_name, "Levan Gelashvili");

        let mut missing_start = request(client.id, fixed.id);
        missing_start.start_date = None;
        assert!(service.create(missing_start, now).await.is_err());

        assert!(matches!(
            service.create(request(client.id, 999), now).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unlimited_without_end_uses_plan_duration() {
        let pool = test_pool().await;
        let service = ClientMembershipService::new(pool.clone());
        let (client, plan) = seed(&pool, PlanKind::Unlimited).await;

        let grant = service
            .create(
                request(client.id, plan.id),
                Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(grant.end_date, Some(date("2024-01-31")));
    }

    #[tokio::test]
    async fn test_unlimited_end_date_out_of_range_is_rejected() {
        let pool = test_pool().await;
        let service = ClientMembershipService::new(pool.clone());
        let (client, plan) = seed(&pool, PlanKind::Unlimited).await;

        let mut req = request(client.id, plan.id);
        req.start_date = Some(NaiveDate::MAX);
        let err = service.create(req, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref msg) if msg.starts_with("start_date")));
        assert_eq!(cm::Entity::find().count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_plan_kind_is_inactive_and_not_grantable() {
        let pool = test_pool().await;
        let service = ClientMembershipService::new(pool.clone());
        let (client, plan) = seed(&pool, PlanKind::Unlimited).await;
        let today = date("2024-01-10");

        cm::ActiveModel {
            client_id: Set(client.id),
            plan_id: Set(plan.id),
            start_date: Set(date("2024-01-01")),
            end_date: Set(Some(date("2024-12-31"))),
            status: Set(MembershipStatus::Active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();
        let mut legacy = plan.into_active_model();
        legacy.kind = Set("weekly".to_string());
        let legacy = legacy.update(&pool).await.unwrap();

        assert!(load_active_grant(&pool, client.id, today).await.unwrap().is_none());
        let listed = service.list_for_client(client.id, today).await.unwrap();
        assert_eq!(listed[0].membership_type, None);
        assert!(!listed[0].is_active);

        let mut req = request(client.id, legacy.id);
        req.end_date = Some(date("2024-02-01"));
        assert!(matches!(
            service.create(req, Utc::now()).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_active_grant_prefers_latest() {
        let pool = test_pool().await;
        let (client, plan) = seed(&pool, PlanKind::Limited).await;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();

        let mut ids = Vec::new();
        for (offset, visits) in [(0, 5), (1, 3), (2, 0)] {
            let grant = cm::ActiveModel {
                client_id: Set(client.id),
                plan_id: Set(plan.id),
                start_date: Set(date("2024-01-01")),
                remaining_visits: Set(Some(visits)),
                status: Set(MembershipStatus::Active),
                created_at: Set(base + Duration::hours(offset)),
                ..Default::default()
            }
            .insert(&pool)
            .await
            .unwrap();
            ids.push(grant.id);
        }

        let active = load_active_grant(&pool, client.id, date("2024-01-10"))
            .await
            .unwrap()
            .unwrap();
        // The newest grant has no visits left, so the one before it wins.
        assert_eq!(active.record.id, ids[1]);

        let batch = load_active_grants(&pool, &[client.id], date("2024-01-10"))
            .await
            .unwrap();
        assert_eq!(batch.get(&client.id).map(|g| g.record.id), Some(ids[1]));
    }
}
