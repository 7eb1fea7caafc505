use crate::entities::{
    PlanKind, check_in_entity as check_ins, client_entity as clients,
    client_membership_entity as cm,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::client_membership_service::load_active_grant;
use crate::services::listing::{apply_ordering, apply_search};
use crate::services::membership_state::{Grant, VisitConsumption, apply_visit_consumption};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoSimpleExpr, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use std::collections::HashMap;

/// Attempts at the conditional visit decrement before giving up
const MAX_CONSUME_ATTEMPTS: usize = 3;

const DENIED: &str = "membership expired or absent";

/// Consume one visit from a limited grant as read earlier.
///
/// The update only applies while the row still holds the status and balance
/// of `grant`; `None` means another writer changed it first.
async fn consume_visit<C>(conn: &C, grant: &cm::Model) -> AppResult<Option<VisitConsumption>>
where
    C: ConnectionTrait,
{
    let next = apply_visit_consumption(grant);
    let result = cm::Entity::update_many()
        .col_expr(cm::Column::RemainingVisits, Expr::value(next.remaining_visits))
        .col_expr(cm::Column::Status, Expr::value(next.status))
        .filter(cm::Column::Id.eq(grant.id))
        .filter(cm::Column::Status.eq(grant.status))
        .filter(cm::Column::RemainingVisits.eq(grant.remaining_visits))
        .exec(conn)
        .await?;

    Ok((result.rows_affected > 0).then_some(next))
}

#[derive(Clone)]
pub struct CheckInService {
    pool: DatabaseConnection,
}

impl CheckInService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Admit a client identified by id
    pub async fn check_in(
        &self,
        req: CheckInRequest,
        now: DateTime<Utc>,
    ) -> AppResult<CheckInResponse> {
        let client_id = req
            .client_id
            .ok_or_else(|| AppError::field("client_id", "is required"))?;
        let client = clients::Entity::find_by_id(client_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let (check_in, _) = self.admit(&client, now).await?;
        Ok(CheckInResponse::new(check_in, client.full_name()))
    }

    /// Admit a client located by card number, or by phone when no card is
    /// given. The lowest id wins if several clients match.
    pub async fn check_in_quick(
        &self,
        req: QuickCheckInRequest,
        now: DateTime<Utc>,
    ) -> AppResult<QuickCheckInResponse> {
        let card = req.card_number.as_deref().map(str::trim).unwrap_or_default();
        let phone = req.phone.as_deref().map(str::trim).unwrap_or_default();

        let filter = if !card.is_empty() {
            clients::Column::CardNumber.eq(card)
        } else if !phone.is_empty() {
            clients::Column::Phone.eq(phone)
        } else {
            return Err(AppError::field(
                "card_number",
                "card_number or phone is required",
            ));
        };

        let client = clients::Entity::find()
            .filter(filter)
            .order_by_asc(clients::Column::Id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let (check_in, grant) = self.admit(&client, now).await?;

        let today = now.date_naive();
        let still_active = load_active_grant(&self.pool, client.id, today).await?;
        let client_name = client.full_name();
        let membership = ClientMembershipResponse::new(grant.record, &grant.plan, &client, today);

        Ok(QuickCheckInResponse {
            checkin: CheckInResponse::new(check_in, client_name),
            client: ClientResponse::new(client, still_active.map(|g| g.record.id)),
            client_membership: membership,
        })
    }

    /// Shared admission path: select the active grant, consume a visit from
    /// limited grants and record the check-in, all in one transaction.
    ///
    /// The decrement is a conditional update on the previously read balance;
    /// losing a race re-runs the selection.
    async fn admit(
        &self,
        client: &clients::Model,
        now: DateTime<Utc>,
    ) -> AppResult<(check_ins::Model, Grant)> {
        let today = now.date_naive();

        for attempt in 1..=MAX_CONSUME_ATTEMPTS {
            let txn = self.pool.begin().await?;

            let Some(mut grant) = load_active_grant(&txn, client.id, today).await? else {
                txn.rollback().await?;
                log::info!("Check-in denied for client {}: {}", client.id, DENIED);
                return Err(AppError::Forbidden(DENIED.to_string()));
            };

            if grant.plan.plan_kind() == Some(PlanKind::Limited) {
                let Some(next) = consume_visit(&txn, &grant.record).await? else {
                    txn.rollback().await?;
                    log::warn!(
                        "Visit consumption race on membership {} (attempt {}/{})",
                        grant.record.id,
                        attempt,
                        MAX_CONSUME_ATTEMPTS
                    );
                    continue;
                };

                grant.record.remaining_visits = Some(next.remaining_visits);
                grant.record.status = next.status;
            }

            let check_in = check_ins::ActiveModel {
                client_id: Set(client.id),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            txn.commit().await?;

            log::info!(
                "Check-in {} granted for client {} on membership {} ({})",
                check_in.id,
                client.id,
                grant.record.id,
                grant.plan.kind
            );
            return Ok((check_in, grant));
        }

        Err(AppError::Conflict(
            "Membership was updated concurrently, please retry".to_string(),
        ))
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<PaginatedResponse<CheckInResponse>> {
        let select = check_ins::Entity::find()
            .join(JoinType::InnerJoin, check_ins::Relation::Client.def());
        let select = apply_search(
            select,
            query,
            vec![
                clients::Column::FirstName.into_simple_expr(),
                clients::Column::LastName.into_simple_expr(),
                clients::Column::Phone.into_simple_expr(),
                clients::Column::CardNumber.into_simple_expr(),
            ],
        );

        let total = select.clone().count(&self.pool).await? as i64;

        let models = apply_ordering(
            select,
            query,
            |field| match field {
                "id" => Some(check_ins::Column::Id.into_simple_expr()),
                "created_at" => Some(check_ins::Column::CreatedAt.into_simple_expr()),
                _ => None,
            },
            check_ins::Column::Id.into_simple_expr(),
        )
        .limit(query.get_limit() as u64)
        .offset(query.get_offset() as u64)
        .all(&self.pool)
        .await?;

        let ids: Vec<i64> = models.iter().map(|c| c.client_id).collect();
        let names: HashMap<i64, String> = clients::Entity::find()
            .filter(clients::Column::Id.is_in(ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c.full_name()))
            .collect();

        let items = models
            .into_iter()
            .map(|c| {
                let name = names.get(&c.client_id).cloned().unwrap_or_default();
                CheckInResponse::new(c, name)
            })
            .collect();
        Ok(PaginatedResponse::from_query(items, query, total))
    }

    pub async fn get(&self, id: i64) -> AppResult<CheckInResponse> {
        let (check_in, client) = check_ins::Entity::find_by_id(id)
            .find_also_related(clients::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Check-in not found".to_string()))?;
        let name = client.map(|c| c.full_name()).unwrap_or_default();
        Ok(CheckInResponse::new(check_in, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::entities::{MembershipStatus, membership_plan_entity as plans};
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveEnum, IntoActiveModel};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap()
    }

    async fn client(
        pool: &DatabaseConnection,
        first_name: &str,
        phone: &str,
        card: Option<&str>,
    ) -> clients::Model {
        clients::ActiveModel {
            first_name: Set(first_name.into()),
            last_name: Set("Janelidze".into()),
            phone: Set(phone.into()),
            email: Set(String::new()),
            organization: Set(String::new()),
            card_number: Set(card.map(str::to_string)),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(pool)
        .await
        .unwrap()
    }

    async fn grant(
        pool: &DatabaseConnection,
        client_id: i64,
        kind: PlanKind,
        end_date: Option<NaiveDate>,
        remaining_visits: Option<i32>,
    ) -> cm::Model {
        let plan = plans::ActiveModel {
            name: Set(format!("{kind} plan")),
            kind: Set(kind.to_value()),
            price: Set(dec!(50.00)),
            duration_days: Set(Some(30)),
            visit_count: Set(Some(10)),
            ..Default::default()
        }
        .insert(pool)
        .await
        .unwrap();
        cm::ActiveModel {
            client_id: Set(client_id),
            plan_id: Set(plan.id),
            start_date: Set(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            end_date: Set(end_date),
            remaining_visits: Set(remaining_visits),
            status: Set(MembershipStatus::Active),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(pool)
        .await
        .unwrap()
    }

    async fn reload(pool: &DatabaseConnection, id: i64) -> cm::Model {
        cm::Entity::find_by_id(id).one(pool).await.unwrap().unwrap()
    }

    fn by_id(client_id: i64) -> CheckInRequest {
        CheckInRequest {
            client_id: Some(client_id),
        }
    }

    #[tokio::test]
    async fn test_limited_grant_runs_down_to_expiry() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let client = client(&pool, "Sandro", "555111222", None).await;
        let g = grant(&pool, client.id, PlanKind::Limited, None, Some(10)).await;

        for _ in 0..3 {
            service.check_in(by_id(client.id), now()).await.unwrap();
        }
        let after_three = reload(&pool, g.id).await;
        assert_eq!(after_three.remaining_visits, Some(7));
        assert_eq!(after_three.status, MembershipStatus::Active);

        for _ in 0..7 {
            service.check_in(by_id(client.id), now()).await.unwrap();
        }
        let exhausted = reload(&pool, g.id).await;
        assert_eq!(exhausted.remaining_visits, Some(0));
        assert_eq!(exhausted.status, MembershipStatus::Expired);

        assert!(matches!(
            service.check_in(by_id(client.id), now()).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(check_ins::Entity::find().count(&pool).await.unwrap(), 10);
    }

    async fn set_visits(pool: &DatabaseConnection, id: i64, visits: i32, status: MembershipStatus) {
        let mut am = reload(pool, id).await.into_active_model();
        am.remaining_visits = Set(Some(visits));
        am.status = Set(status);
        am.update(pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_decrement_is_skipped_and_reselected() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let client = client(&pool, "Sandro", "555111222", None).await;
        let g = grant(&pool, client.id, PlanKind::Limited, None, Some(5)).await;

        let stale = reload(&pool, g.id).await;
        set_visits(&pool, g.id, 4, MembershipStatus::Active).await;

        assert_eq!(consume_visit(&pool, &stale).await.unwrap(), None);
        assert_eq!(reload(&pool, g.id).await.remaining_visits, Some(4));

        let fresh = reload(&pool, g.id).await;
        let next = consume_visit(&pool, &fresh).await.unwrap().unwrap();
        assert_eq!(next.remaining_visits, 3);
        assert_eq!(reload(&pool, g.id).await.remaining_visits, Some(3));

        service.check_in(by_id(client.id), now()).await.unwrap();
        assert_eq!(reload(&pool, g.id).await.remaining_visits, Some(2));
    }

    #[tokio::test]
    async fn test_lost_race_on_last_visit_never_goes_negative() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let client = client(&pool, "Sandro", "555111222", None).await;
        let g = grant(&pool, client.id, PlanKind::Limited, None, Some(1)).await;

        let stale = reload(&pool, g.id).await;
        set_visits(&pool, g.id, 0, MembershipStatus::Expired).await;

        assert_eq!(consume_visit(&pool, &stale).await.unwrap(), None);
        let after = reload(&pool, g.id).await;
        assert_eq!(after.remaining_visits, Some(0));
        assert_eq!(after.status, MembershipStatus::Expired);

        let err = service.check_in(by_id(client.id), now()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_) | AppError::Conflict(_)));
        assert_eq!(reload(&pool, g.id).await.remaining_visits, Some(0));
        assert_eq!(check_ins::Entity::find().count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_plan_kind_denies_entry() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let client = client(&pool, "Sandro", "555111222", None).await;
        let g = grant(&pool, client.id, PlanKind::Limited, None, Some(5)).await;

        let mut plan = plans::Entity::find_by_id(g.plan_id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap()
            .into_active_model();
        plan.kind = Set("weekly".to_string());
        plan.update(&pool).await.unwrap();

        assert!(matches!(
            service.check_in(by_id(client.id), now()).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(reload(&pool, g.id).await.remaining_visits, Some(5));
    }

    #[tokio::test]
    async fn test_unlimited_grant_is_not_decremented() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let client = client(&pool, "Sandro", "555111222", None).await;
        let end = NaiveDate::from_ymd_opt(2024, 1, 31);
        let g = grant(&pool, client.id, PlanKind::Unlimited, end, None).await;

        let check_in = service.check_in(by_id(client.id), now()).await.unwrap();
        assert_eq!(check_in.client_name, "Sandro Janelidze");
        let after = reload(&pool, g.id).await;
        assert_eq!(after.remaining_visits, None);
        assert_eq!(after.status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn test_denied_without_grant() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let client = client(&pool, "Sandro", "555111222", None).await;

        assert!(matches!(
            service.check_in(by_id(client.id), now()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.check_in(by_id(client.id + 100), now()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.check_in(CheckInRequest::default(), now()).await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(check_ins::Entity::find().count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quick_card_wins_over_phone() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let by_card = client(&pool, "Card", "555000001", Some("C-7")).await;
        let by_phone = client(&pool, "Phone", "555000002", None).await;
        grant(&pool, by_card.id, PlanKind::Limited, None, Some(5)).await;
        grant(&pool, by_phone.id, PlanKind::Limited, None, Some(5)).await;

        let res = service
            .check_in_quick(
                QuickCheckInRequest {
                    card_number: Some(" C-7 ".into()),
                    phone: Some("555000002".into()),
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(res.client.id, by_card.id);
        assert_eq!(res.checkin.client_id, by_card.id);
        assert_eq!(res.client_membership.remaining_visits, Some(4));
        assert!(res.client.is_active);

        let res = service
            .check_in_quick(
                QuickCheckInRequest {
                    card_number: Some("".into()),
                    phone: Some("555000002".into()),
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(res.client.id, by_phone.id);
    }

    #[tokio::test]
    async fn test_quick_requires_a_locator() {
        let service = CheckInService::new(test_pool().await);
        assert!(matches!(
            service
                .check_in_quick(QuickCheckInRequest::default(), now())
                .await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service
                .check_in_quick(
                    QuickCheckInRequest {
                        card_number: Some("missing".into()),
                        phone: None,
                    },
                    now(),
                )
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_last_visit_reports_inactive_client() {
        let pool = test_pool().await;
        let service = CheckInService::new(pool.clone());
        let client = client(&pool, "Sandro", "555111222", Some("LAST")).await;
        grant(&pool, client.id, PlanKind::Limited, None, Some(1)).await;

        let res = service
            .check_in_quick(
                QuickCheckInRequest {
                    card_number: Some("LAST".into()),
                    phone: None,
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(res.client_membership.remaining_visits, Some(0));
        assert_eq!(res.client_membership.status, MembershipStatus::Expired);
        assert!(!res.client_membership.is_active);
        assert!(!res.client.is_active);
    }
}
