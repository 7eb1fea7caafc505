use crate::entities::{
    MembershipStatus, check_in_entity as check_ins, client_membership_entity as cm,
    membership_plan_entity as plans, payment_entity as payments,
};
use crate::error::AppResult;
use crate::models::ReportSummary;
use crate::services::membership_state::is_grant_active;
use crate::utils::{day_bounds, first_of_month, start_of_day};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

#[derive(Clone)]
pub struct ReportService {
    pool: DatabaseConnection,
}

impl ReportService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Front-desk dashboard figures for `today` (UTC days).
    pub async fn summary(&self, today: NaiveDate) -> AppResult<ReportSummary> {
        let (day_start, day_end) = day_bounds(today);
        let month_start = start_of_day(first_of_month(today));

        let today_income = self.income_between(day_start, day_end).await?;
        let month_income = self.income_between(month_start, day_end).await?;

        let today_checkins = check_ins::Entity::find()
            .filter(check_ins::Column::CreatedAt.gte(day_start))
            .filter(check_ins::Column::CreatedAt.lt(day_end))
            .count(&self.pool)
            .await? as i64;

        let stored_active = cm::Entity::find()
            .filter(cm::Column::Status.eq(MembershipStatus::Active))
            .find_also_related(plans::Entity)
            .all(&self.pool)
            .await?;
        let (active, expired): (Vec<_>, Vec<_>) = stored_active
            .iter()
            .filter_map(|(grant, plan)| plan.as_ref().map(|plan| (grant, plan)))
            .partition(|(grant, plan)| is_grant_active(grant, plan.plan_kind(), today));

        Ok(ReportSummary {
            today,
            today_income,
            month_income,
            today_checkins,
            active_memberships: active.len() as i64,
            expired_memberships: expired.len() as i64,
        })
    }

    /// Sum of payment amounts in `[from, to)`, computed in exact decimals
    async fn income_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Decimal> {
        let rows = payments::Entity::find()
            .filter(payments::Column::CreatedAt.gte(from))
            .filter(payments::Column::CreatedAt.lt(to))
            .all(&self.pool)
            .await?;
        Ok(rows.iter().map(|p| p.amount).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::entities::{PaymentMethod, PlanKind, client_entity as clients};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveEnum, ActiveModelTrait, Set};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    async fn seed_client(pool: &DatabaseConnection) -> clients::Model {
        clients::ActiveModel {
            first_name: Set("Irakli".into()),
            last_name: Set("Abashidze".into()),
            phone: Set("555777888".into()),
            email: Set(String::new()),
            organization: Set(String::new()),
            created_at: Set(at(1, 8)),
            ..Default::default()
        }
        .insert(pool)
        .await
        .unwrap()
    }

    async fn pay(pool: &DatabaseConnection, client_id: i64, amount: Decimal, when: DateTime<Utc>) {
        payments::ActiveModel {
            client_id: Set(client_id),
            membership_amount: Set(amount),
            trainer_fee: Set(Decimal::ZERO),
            amount: Set(amount),
            method: Set(PaymentMethod::Cash),
            created_at: Set(when),
            ..Default::default()
        }
        .insert(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_summary_sums_today_and_month() {
        let pool = test_pool().await;
        let service = ReportService::new(pool.clone());
        let client = seed_client(&pool).await;

        pay(&pool, client.id, dec!(50.00), at(15, 9)).await;
        pay(&pool, client.id, dec!(30.00), at(15, 18)).await;
        pay(&pool, client.id, dec!(20.00), at(3, 12)).await;
        pay(&pool, client.id, dec!(99.00), at(16, 7)).await;

        check_ins::ActiveModel {
            client_id: Set(client.id),
            created_at: Set(at(15, 10)),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();

        let summary = service
            .summary(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(summary.today_income, dec!(80.00));
        assert_eq!(summary.month_income, dec!(100.00));
        assert_eq!(summary.today_checkins, 1);
    }

    #[tokio::test]
    async fn test_empty_day_is_zero() {
        let service = ReportService::new(test_pool().await);
        let summary = service
            .summary(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(summary.today_income, Decimal::ZERO);
        assert_eq!(summary.month_income, Decimal::ZERO);
        assert_eq!(summary.today_checkins, 0);
        assert_eq!(summary.active_memberships, 0);
    }

    #[tokio::test]
    async fn test_partitions_only_stored_active_grants() {
        let pool = test_pool().await;
        let service = ReportService::new(pool.clone());
        let client = seed_client(&pool).await;
        let plan = plans::ActiveModel {
            name: Set("Month".into()),
            kind: Set(PlanKind::Unlimited.to_value()),
            price: Set(dec!(80.00)),
            duration_days: Set(Some(30)),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();

        let ends = [
            (Some("2024-01-31"), MembershipStatus::Active),
            (Some("2024-01-05"), MembershipStatus::Active),
            (Some("2024-01-31"), MembershipStatus::Paused),
            (Some("2024-01-02"), MembershipStatus::Expired),
        ];
        for (end, status) in ends {
            cm::ActiveModel {
                client_id: Set(client.id),
                plan_id: Set(plan.id),
                start_date: Set(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                end_date: Set(end.and_then(|e| NaiveDate::parse_from_str(e, "%Y-%m-%d").ok())),
                status: Set(status),
                created_at: Set(at(1, 9)),
                ..Default::default()
            }
            .insert(&pool)
            .await
            .unwrap();
        }

        let summary = service
            .summary(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(summary.active_memberships, 1);
        assert_eq!(summary.expired_memberships, 1);
    }

    #[tokio::test]
    async fn test_unknown_plan_kind_counts_as_expired() {
        let pool = test_pool().await;
        let service = ReportService::new(pool.clone());
        let client = seed_client(&pool).await;
        let plan = plans::ActiveModel {
            name: Set("Legacy".into()),
            kind: Set("weekly".into()),
            price: Set(dec!(20.00)),
            duration_days: Set(Some(7)),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();
        cm::ActiveModel {
            client_id: Set(client.id),
            plan_id: Set(plan.id),
            start_date: Set(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            end_date: Set(NaiveDate::from_ymd_opt(2024, 12, 31)),
            status: Set(MembershipStatus::Active),
            created_at: Set(at(1, 9)),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .unwrap();

        let summary = service
            .summary(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .await
            .unwrap();
        assert_eq!(summary.active_memberships, 0);
        assert_eq!(summary.expired_memberships, 1);
    }
}
