use crate::entities::{
    MembershipStatus, PaymentMethod, PlanKind, client_entity as clients,
    client_membership_entity as cm, membership_plan_entity as plans, payment_entity as payments,
    trainer_entity as trainers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::listing::{apply_ordering, apply_search};
use crate::services::membership_state::{grant_terms_for_purchase, validate_fixed_window};
use crate::utils::{parse_date_or_none, validate_amount};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoSimpleExpr, JoinType,
    PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::collections::HashMap;

/// A purchase request after every precondition has been checked
#[derive(Debug)]
struct ValidatedPurchase {
    client: clients::Model,
    plan: Option<plans::Model>,
    trainer: Option<trainers::Model>,
    method: PaymentMethod,
    fixed_start: Option<NaiveDate>,
    fixed_end: Option<NaiveDate>,
}

impl ValidatedPurchase {
    fn membership_amount(&self) -> Decimal {
        self.plan.as_ref().map_or(Decimal::ZERO, |p| p.price)
    }

    fn trainer_fee(&self) -> Decimal {
        self.trainer.as_ref().map_or(Decimal::ZERO, |t| t.fee)
    }
}

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Record a payment and enroll the client in the purchased plan.
    ///
    /// The payment and the derived grant are written in one transaction: if
    /// the grant cannot be derived the payment is rolled back too.
    pub async fn purchase(
        &self,
        req: CreatePaymentRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PaymentResponse> {
        let purchase = self.validate(req).await?;
        let today = now.date_naive();

        let membership_amount = purchase.membership_amount();
        let trainer_fee = purchase.trainer_fee();
        let amount = membership_amount + trainer_fee;
        validate_amount("amount", amount)?;

        let txn = self.pool.begin().await?;

        let payment = payments::ActiveModel {
            client_id: Set(purchase.client.id),
            plan_id: Set(purchase.plan.as_ref().map(|p| p.id)),
            trainer_id: Set(purchase.trainer.as_ref().map(|t| t.id)),
            fixed_start: Set(purchase.fixed_start),
            fixed_end: Set(purchase.fixed_end),
            membership_amount: Set(membership_amount),
            trainer_fee: Set(trainer_fee),
            amount: Set(amount),
            method: Set(purchase.method),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(plan) = &purchase.plan {
            let terms = match grant_terms_for_purchase(
                plan,
                today,
                purchase.fixed_start,
                purchase.fixed_end,
            ) {
                Ok(terms) => terms,
                Err(e) => {
                    txn.rollback().await?;
                    log::warn!(
                        "Purchase for client {} rolled back, plan {} unusable: {}",
                        purchase.client.id,
                        plan.id,
                        e
                    );
                    return Err(e);
                }
            };

            let grant = cm::ActiveModel {
                client_id: Set(purchase.client.id),
                plan_id: Set(plan.id),
                start_date: Set(terms.start_date),
                end_date: Set(terms.end_date),
                remaining_visits: Set(terms.remaining_visits),
                status: Set(MembershipStatus::Active),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            log::info!(
                "Client {} enrolled in plan {} as membership {}",
                purchase.client.id,
                plan.id,
                grant.id
            );
        }

        txn.commit().await?;

        log::info!(
            "Payment {} recorded: client={} amount={} method={}",
            payment.id,
            purchase.client.id,
            payment.amount,
            payment.method
        );

        Ok(PaymentResponse::new(
            payment,
            purchase.client.full_name(),
            purchase.plan.map(|p| p.name),
            purchase.trainer.map(|t| t.full_name()),
        ))
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<PaginatedResponse<PaymentResponse>> {
        let select = payments::Entity::find()
            .join(JoinType::InnerJoin, payments::Relation::Client.def());
        let select = apply_search(
            select,
            query,
            vec![
                clients::Column::FirstName.into_simple_expr(),
                clients::Column::LastName.into_simple_expr(),
                payments::Column::Method.into_simple_expr(),
            ],
        );

        let total = select.clone().count(&self.pool).await? as i64;

        let models = apply_ordering(
            select,
            query,
            |field| match field {
                "id" => Some(payments::Column::Id.into_simple_expr()),
                "created_at" => Some(payments::Column::CreatedAt.into_simple_expr()),
                "amount" => Some(payments::Column::Amount.into_simple_expr()),
                _ => None,
            },
            payments::Column::Id.into_simple_expr(),
        )
        .limit(query.get_limit() as u64)
        .offset(query.get_offset() as u64)
        .all(&self.pool)
        .await?;

        let items = self.hydrate(models).await?;
        Ok(PaginatedResponse::from_query(items, query, total))
    }

    pub async fn get(&self, id: i64) -> AppResult<PaymentResponse> {
        let payment = payments::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        self.hydrate(vec![payment])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Payment lost its client".to_string()))
    }

    /// Preconditions in order; the first failure wins.
    async fn validate(&self, req: CreatePaymentRequest) -> AppResult<ValidatedPurchase> {
        let client_id = req
            .client_id
            .ok_or_else(|| AppError::field("client_id", "is required"))?;
        let method = req
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| AppError::field("method", "is required"))?
            .parse::<PaymentMethod>()
            .map_err(|e| AppError::field("method", e))?;

        let client = clients::Entity::find_by_id(client_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let plan = match req.membership_id {
            Some(id) => Some(
                plans::Entity::find_by_id(id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Membership plan not found".to_string()))?,
            ),
            None => None,
        };

        let trainer = match req.trainer_id {
            Some(id) => Some(
                trainers::Entity::find_by_id(id)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Trainer not found".to_string()))?,
            ),
            None => None,
        };

        let fixed_start = req.fixed_start.as_deref().and_then(parse_date_or_none);
        let fixed_end = req.fixed_end.as_deref().and_then(parse_date_or_none);
        if plan.as_ref().is_some_and(|p| p.plan_kind() == Some(PlanKind::Fixed)) {
            validate_fixed_window(fixed_start, fixed_end)?;
        }

        Ok(ValidatedPurchase {
            client,
            plan,
            trainer,
            method,
            fixed_start,
            fixed_end,
        })
    }

    async fn hydrate(&self, models: Vec<payments::Model>) -> AppResult<Vec<PaymentResponse>> {
        let client_ids: Vec<i64> = models.iter().map(|p| p.client_id).collect();
        let plan_ids: Vec<i64> = models.iter().filter_map(|p| p.plan_id).collect();
        let trainer_ids: Vec<i64> = models.iter().filter_map(|p| p.trainer_id).collect();

        let client_names: HashMap<i64, String> = clients::Entity::find()
            .filter(clients::Column::Id.is_in(client_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c.full_name()))
            .collect();
        let plan_names: HashMap<i64, String> = plans::Entity::find()
            .filter(plans::Column::Id.is_in(plan_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let trainer_names: HashMap<i64, String> = trainers::Entity::find()
            .filter(trainers::Column::Id.is_in(trainer_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|t| (t.id, t.full_name()))
            .collect();

        Ok(models
            .into_iter()
            .filter_map(|p| {
                let client_name = client_names.get(&p.client_id)?.clone();
                let membership_name = p.plan_id.and_then(|id| plan_names.get(&id).cloned());
                let trainer_name = p.trainer_id.and_then(|id| trainer_names.get(&id).cloned());
                Some(PaymentResponse::new(
                    p,
                    client_name,
                    membership_name,
                    trainer_name,
                ))
            })
            .collect())
    }
}
