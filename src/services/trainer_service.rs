use crate::entities::{payment_entity as payments, trainer_entity as trainers};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::listing::{apply_ordering, apply_search};
use crate::utils::{normalize_phone, validate_amount};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    IntoSimpleExpr, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct TrainerService {
    pool: DatabaseConnection,
}

impl TrainerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<PaginatedResponse<TrainerResponse>> {
        let select = apply_search(
            trainers::Entity::find(),
            query,
            vec![
                trainers::Column::FirstName.into_simple_expr(),
                trainers::Column::LastName.into_simple_expr(),
                trainers::Column::Phone.into_simple_expr(),
                trainers::Column::Specialization.into_simple_expr(),
            ],
        );

        let total = select.clone().count(&self.pool).await? as i64;

        let models = apply_ordering(
            select,
            query,
            |field| match field {
                "id" => Some(trainers::Column::Id.into_simple_expr()),
                "first_name" => Some(trainers::Column::FirstName.into_simple_expr()),
                "last_name" => Some(trainers::Column::LastName.into_simple_expr()),
                _ => None,
            },
            trainers::Column::Id.into_simple_expr(),
        )
        .limit(query.get_limit() as u64)
        .offset(query.get_offset() as u64)
        .all(&self.pool)
        .await?;

        let items = models.into_iter().map(TrainerResponse::from).collect();
        Ok(PaginatedResponse::from_query(items, query, total))
    }

    pub async fn get(&self, id: i64) -> AppResult<TrainerResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn create(&self, req: TrainerRequest) -> AppResult<TrainerResponse> {
        let req = validate_trainer(req)?;
        let model = trainers::ActiveModel {
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            phone: Set(req.phone),
            specialization: Set(req.specialization),
            fee: Set(req.fee.unwrap_or(Decimal::ZERO)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Trainer {} created", model.id);
        Ok(model.into())
    }

    pub async fn update(&self, id: i64, req: TrainerRequest) -> AppResult<TrainerResponse> {
        let req = validate_trainer(req)?;
        let mut am = self.find(id).await?.into_active_model();
        am.first_name = Set(req.first_name);
        am.last_name = Set(req.last_name);
        am.phone = Set(req.phone);
        am.specialization = Set(req.specialization);
        am.fee = Set(req.fee.unwrap_or(Decimal::ZERO));
        let model = am.update(&self.pool).await?;
        Ok(model.into())
    }

    /// Delete a trainer; past payments keep their fee but lose the reference.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let trainer = self.find(id).await?;

        let txn = self.pool.begin().await?;
        let detached = payments::Entity::update_many()
            .col_expr(payments::Column::TrainerId, Expr::value(Option::<i64>::None))
            .filter(payments::Column::TrainerId.eq(trainer.id))
            .exec(&txn)
            .await?;
        trainers::Entity::delete_by_id(trainer.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Trainer {} deleted, {} payments detached",
            trainer.id,
            detached.rows_affected
        );
        Ok(())
    }

    async fn find(&self, id: i64) -> AppResult<trainers::Model> {
        trainers::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Trainer not found".to_string()))
    }
}

fn validate_trainer(mut req: TrainerRequest) -> AppResult<TrainerRequest> {
    req.first_name = req.first_name.trim().to_string();
    req.last_name = req.last_name.trim().to_string();
    req.specialization = req.specialization.trim().to_string();
    if req.first_name.is_empty() {
        return Err(AppError::field("first_name", "is required"));
    }
    if req.last_name.is_empty() {
        return Err(AppError::field("last_name", "is required"));
    }
    req.phone = normalize_phone(&req.phone)?;
    if let Some(fee) = req.fee {
        validate_amount("fee", fee)?;
    }
    Ok(req)
}
