use crate::entities::{
    PlanKind, client_membership_entity as cm, membership_plan_entity as plans,
    payment_entity as payments,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::listing::{apply_ordering, apply_search};
use crate::utils::validate_amount;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    IntoSimpleExpr, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct MembershipPlanService {
    pool: DatabaseConnection,
}

impl MembershipPlanService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<MembershipPlanResponse>> {
        let select = apply_search(
            plans::Entity::find(),
            query,
            vec![
                plans::Column::Name.into_simple_expr(),
                plans::Column::Kind.into_simple_expr(),
            ],
        );

        let total = select.clone().count(&self.pool).await? as i64;

        let models = apply_ordering(
            select,
            query,
            |field| match field {
                "id" => Some(plans::Column::Id.into_simple_expr()),
                "price" => Some(plans::Column::Price.into_simple_expr()),
                _ => None,
            },
            plans::Column::Id.into_simple_expr(),
        )
        .limit(query.get_limit() as u64)
        .offset(query.get_offset() as u64)
        .all(&self.pool)
        .await?;

        let items = models.into_iter().map(MembershipPlanResponse::from).collect();
        Ok(PaginatedResponse::from_query(items, query, total))
    }

    pub async fn get(&self, id: i64) -> AppResult<MembershipPlanResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn create(&self, req: MembershipPlanRequest) -> AppResult<MembershipPlanResponse> {
        let req = validate_plan(req)?;
        let model = plans::ActiveModel {
            name: Set(req.name),
            kind: Set(req.kind.to_value()),
            price: Set(req.price),
            duration_days: Set(req.duration_days),
            visit_count: Set(req.visit_count),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Membership plan {} ({}) created", model.id, model.kind);
        Ok(model.into())
    }

    /// Replace a plan. Existing grants keep their own bookkeeping; only future
    /// purchases see the new terms.
    pub async fn update(
        &self,
        id: i64,
        req: MembershipPlanRequest,
    ) -> AppResult<MembershipPlanResponse> {
        let req = validate_plan(req)?;
        let mut am = self.find(id).await?.into_active_model();
        am.name = Set(req.name);
        am.kind = Set(req.kind.to_value());
        am.price = Set(req.price);
        am.duration_days = Set(req.duration_days);
        am.visit_count = Set(req.visit_count);
        let model = am.update(&self.pool).await?;
        Ok(model.into())
    }

    /// Delete a plan that no grant references; payments lose the reference.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let plan = self.find(id).await?;

        let txn = self.pool.begin().await?;
        let grants = cm::Entity::find()
            .filter(cm::Column::PlanId.eq(plan.id))
            .count(&txn)
            .await?;
        if grants > 0 {
            return Err(AppError::Conflict(format!(
                "Membership plan is referenced by {grants} client memberships"
            )));
        }
        payments::Entity::update_many()
            .col_expr(payments::Column::PlanId, Expr::value(Option::<i64>::None))
            .filter(payments::Column::PlanId.eq(plan.id))
            .exec(&txn)
            .await?;
        plans::Entity::delete_by_id(plan.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!("Membership plan {} deleted", plan.id);
        Ok(())
    }

    async fn find(&self, id: i64) -> AppResult<plans::Model> {
        plans::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership plan not found".to_string()))
    }
}

/// The kind decides which of duration_days / visit_count must be set.
pub fn validate_plan(mut req: MembershipPlanRequest) -> AppResult<MembershipPlanRequest> {
    req.name = req.name.trim().to_string();
    if req.name.is_empty() {
        return Err(AppError::field("name", "is required"));
    }
    validate_amount("price", req.price)?;
    if req.duration_days.is_some_and(|d| d <= 0) {
        return Err(AppError::field("duration_days", "must be positive"));
    }
    if req.visit_count.is_some_and(|v| v <= 0) {
        return Err(AppError::field("visit_count", "must be positive"));
    }
    match req.kind {
        PlanKind::Unlimited if req.duration_days.is_none() => Err(AppError::field(
            "duration_days",
            "is required for unlimited plans",
        )),
        PlanKind::Limited if req.visit_count.is_none() => Err(AppError::field(
            "visit_count",
            "is required for limited plans",
        )),
        _ => Ok(req),
    }
}
