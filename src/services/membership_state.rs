//! Membership lifecycle rules.
//!
//! Pure functions over grant records: whether a grant authorizes entry on a
//! given day, which of a client's grants is the current one, and how a visit
//! is consumed from a limited grant. Persistence lives in the services that
//! call these.

use crate::entities::{
    MembershipStatus, PlanKind, client_membership_entity as cm, membership_plan_entity as plans,
};
use crate::error::{AppError, AppResult};
use chrono::{Days, NaiveDate};

/// A grant together with the plan it was bought from
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub record: cm::Model,
    pub plan: plans::Model,
}

impl Grant {
    pub fn new(record: cm::Model, plan: plans::Model) -> Self {
        Self { record, plan }
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        is_grant_active(&self.record, self.plan.plan_kind(), today)
    }
}

/// Activity predicate for a single grant.
///
/// Only stored-active grants can authorize entry; the plan kind decides which
/// bookkeeping field bounds it. An unrecognized kind never authorizes entry.
pub fn is_grant_active(grant: &cm::Model, kind: Option<PlanKind>, today: NaiveDate) -> bool {
    if grant.status != MembershipStatus::Active {
        return false;
    }

    match kind {
        Some(PlanKind::Limited) => grant.remaining_visits.unwrap_or(0) > 0,
        Some(PlanKind::Unlimited) => grant.end_date.is_some_and(|end| end >= today),
        Some(PlanKind::Fixed) => grant
            .end_date
            .is_some_and(|end| grant.start_date <= today && today <= end),
        None => false,
    }
}

/// The grant that currently authorizes entry: the most recently created
/// active grant, ties broken by the higher id.
pub fn select_active_grant<I>(grants: I, today: NaiveDate) -> Option<Grant>
where
    I: IntoIterator<Item = Grant>,
{
    grants
        .into_iter()
        .filter(|g| g.is_active(today))
        .max_by_key(|g| (g.record.created_at, g.record.id))
}

/// Bookkeeping after one visit is consumed from a limited grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitConsumption {
    pub remaining_visits: i32,
    pub status: MembershipStatus,
}

/// Decrement the visit balance, flooring at zero; an exhausted grant expires.
pub fn apply_visit_consumption(grant: &cm::Model) -> VisitConsumption {
    let remaining_visits = (grant.remaining_visits.unwrap_or(0) - 1).max(0);
    let status = if remaining_visits == 0 {
        MembershipStatus::Expired
    } else {
        grant.status
    };
    VisitConsumption {
        remaining_visits,
        status,
    }
}

/// Bookkeeping fields of a grant derived from a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantTerms {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub remaining_visits: Option<i32>,
}

/// Derive a new grant's dates and visit balance from the plan bought today.
///
/// Unlimited grants run `duration_days` calendar days from today, so a 30 day
/// plan bought on 2024-01-01 ends on 2024-01-31.
pub fn grant_terms_for_purchase(
    plan: &plans::Model,
    today: NaiveDate,
    fixed_start: Option<NaiveDate>,
    fixed_end: Option<NaiveDate>,
) -> AppResult<GrantTerms> {
    let Some(kind) = plan.plan_kind() else {
        return Err(AppError::field("kind", "is not a known plan kind"));
    };

    match kind {
        PlanKind::Unlimited => {
            let days = plan
                .duration_days
                .filter(|d| *d > 0)
                .ok_or_else(|| AppError::field("duration_days", "is empty on the plan"))?;
            let end_date = today
                .checked_add_days(Days::new(days as u64))
                .ok_or_else(|| AppError::field("duration_days", "is out of range"))?;
            Ok(GrantTerms {
                start_date: today,
                end_date: Some(end_date),
                remaining_visits: None,
            })
        }
        PlanKind::Limited => {
            let visits = plan
                .visit_count
                .filter(|v| *v > 0)
                .ok_or_else(|| AppError::field("visit_count", "is empty on the plan"))?;
            Ok(GrantTerms {
                start_date: today,
                end_date: None,
                remaining_visits: Some(visits),
            })
        }
        PlanKind::Fixed => {
            let (start_date, end_date) = validate_fixed_window(fixed_start, fixed_end)?;
            Ok(GrantTerms {
                start_date,
                end_date: Some(end_date),
                remaining_visits: None,
            })
        }
    }
}

/// Both bounds present and in order
pub fn validate_fixed_window(
    fixed_start: Option<NaiveDate>,
    fixed_end: Option<NaiveDate>,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let (Some(start), Some(end)) = (fixed_start, fixed_end) else {
        return Err(AppError::field(
            "fixed_start",
            "fixed_start and fixed_end are required for fixed plans",
        ));
    };
    if end < start {
        return Err(AppError::field("fixed_end", "must not precede fixed_start"));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use sea_orm::ActiveEnum;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn grant(
        id: i64,
        start: &str,
        end: Option<&str>,
        remaining: Option<i32>,
        status: MembershipStatus,
    ) -> cm::Model {
        cm::Model {
            id,
            client_id: 1,
            plan_id: 1,
            start_date: date(start),
            end_date: end.map(date),
            remaining_visits: remaining,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        }
    }

    fn plan(kind: PlanKind) -> plans::Model {
        plans::Model {
            id: 1,
            name: kind.to_string(),
            kind: kind.to_value(),
            price: Decimal::new(5000, 2),
            duration_days: Some(30),
            visit_count: Some(10),
        }
    }

    #[test]
    fn test_limited_active_iff_visits_left() {
        let today = date("2024-03-01");
        let g = grant(1, "2024-01-01", None, Some(1), MembershipStatus::Active);
        assert!(is_grant_active(&g, Some(PlanKind::Limited), today));

        let g = grant(1, "2024-01-01", None, Some(0), MembershipStatus::Active);
        assert!(!is_grant_active(&g, Some(PlanKind::Limited), today));

        let g = grant(1, "2024-01-01", None, None, MembershipStatus::Active);
        assert!(!is_grant_active(&g, Some(PlanKind::Limited), today));

        let g = grant(1, "2024-01-01", None, Some(5), MembershipStatus::Paused);
        assert!(!is_grant_active(&g, Some(PlanKind::Limited), today));
    }

    #[test]
    fn test_unlimited_active_through_end_date() {
        let g = grant(
            1,
            "2024-01-01",
            Some("2024-01-31"),
            None,
            MembershipStatus::Active,
        );
        assert!(is_grant_active(&g, Some(PlanKind::Unlimited), date("2024-01-15")));
        assert!(is_grant_active(&g, Some(PlanKind::Unlimited), date("2024-01-31")));
        assert!(!is_grant_active(&g, Some(PlanKind::Unlimited), date("2024-02-01")));

        let no_end = grant(1, "2024-01-01", None, None, MembershipStatus::Active);
        assert!(!is_grant_active(&no_end, Some(PlanKind::Unlimited), date("2024-01-02")));

        let expired = grant(
            1,
            "2024-01-01",
            Some("2024-01-31"),
            None,
            MembershipStatus::Expired,
        );
        assert!(!is_grant_active(&expired, Some(PlanKind::Unlimited), date("2024-01-15")));
    }

    #[test]
    fn test_fixed_active_inside_window_only() {
        let g = grant(
            1,
            "2024-02-10",
            Some("2024-02-20"),
            None,
            MembershipStatus::Active,
        );
        assert!(!is_grant_active(&g, Some(PlanKind::Fixed), date("2024-02-09")));
        assert!(is_grant_active(&g, Some(PlanKind::Fixed), date("2024-02-10")));
        assert!(is_grant_active(&g, Some(PlanKind::Fixed), date("2024-02-20")));
        assert!(!is_grant_active(&g, Some(PlanKind::Fixed), date("2024-02-21")));

        let no_end = grant(1, "2024-02-10", None, None, MembershipStatus::Active);
        assert!(!is_grant_active(&no_end, Some(PlanKind::Fixed), date("2024-02-10")));
    }

    #[test]
    fn test_unknown_kind_is_never_active() {
        let today = date("2024-01-10");
        let g = grant(
            1,
            "2024-01-01",
            Some("2024-12-31"),
            Some(10),
            MembershipStatus::Active,
        );
        assert!(!is_grant_active(&g, None, today));

        let mut weekly = plan(PlanKind::Unlimited);
        weekly.kind = "weekly".to_string();
        assert_eq!(weekly.plan_kind(), None);
        assert!(!Grant::new(g, weekly.clone()).is_active(today));
        assert!(matches!(
            grant_terms_for_purchase(&weekly, today, None, None),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_visit_consumption_floors_at_zero() {
        let g = grant(1, "2024-01-01", None, Some(3), MembershipStatus::Active);
        assert_eq!(
            apply_visit_consumption(&g),
            VisitConsumption {
                remaining_visits: 2,
                status: MembershipStatus::Active
            }
        );

        let g = grant(1, "2024-01-01", None, Some(1), MembershipStatus::Active);
        let once = apply_visit_consumption(&g);
        assert_eq!(once.remaining_visits, 0);
        assert_eq!(once.status, MembershipStatus::Expired);

        let g = grant(
            1,
            "2024-01-01",
            None,
            Some(once.remaining_visits),
            once.status,
        );
        let twice = apply_visit_consumption(&g);
        assert_eq!(twice.remaining_visits, 0);
        assert_eq!(twice.status, MembershipStatus::Expired);
    }

    #[test]
    fn test_select_prefers_latest_created() {
        let today = date("2024-01-10");
        let mut older = grant(
            1,
            "2024-01-01",
            Some("2024-01-31"),
            None,
            MembershipStatus::Active,
        );
        older.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut newer = grant(
            2,
            "2024-01-05",
            Some("2024-02-05"),
            None,
            MembershipStatus::Active,
        );
        newer.created_at = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();

        let selected = select_active_grant(
            vec![
                Grant::new(newer.clone(), plan(PlanKind::Unlimited)),
                Grant::new(older.clone(), plan(PlanKind::Unlimited)),
            ],
            today,
        )
        .unwrap();
        assert_eq!(selected.record.id, 2);
    }

    #[test]
    fn test_select_skips_inactive_and_breaks_ties_by_id() {
        let today = date("2024-01-10");
        let lapsed = grant(
            9,
            "2023-01-01",
            Some("2023-01-31"),
            None,
            MembershipStatus::Active,
        );
        let a = grant(3, "2024-01-01", None, Some(4), MembershipStatus::Active);
        let b = grant(4, "2024-01-01", None, Some(4), MembershipStatus::Active);

        let selected = select_active_grant(
            vec![
                Grant::new(lapsed, plan(PlanKind::Unlimited)),
                Grant::new(a, plan(PlanKind::Limited)),
                Grant::new(b, plan(PlanKind::Limited)),
            ],
            today,
        )
        .unwrap();
        assert_eq!(selected.record.id, 4);

        let none = select_active_grant(
            vec![Grant::new(
                grant(5, "2024-01-01", None, Some(0), MembershipStatus::Active),
                plan(PlanKind::Limited),
            )],
            today,
        );
        assert!(none.is_none());
    }

    #[test]
    fn test_unlimited_terms_add_calendar_days() {
        let terms =
            grant_terms_for_purchase(&plan(PlanKind::Unlimited), date("2024-01-01"), None, None)
                .unwrap();
        assert_eq!(
            terms,
            GrantTerms {
                start_date: date("2024-01-01"),
                end_date: Some(date("2024-01-31")),
                remaining_visits: None,
            }
        );
    }

    #[test]
    fn test_limited_terms_copy_visit_count() {
        let terms =
            grant_terms_for_purchase(&plan(PlanKind::Limited), date("2024-01-01"), None, None)
                .unwrap();
        assert_eq!(terms.remaining_visits, Some(10));
        assert_eq!(terms.end_date, None);
        assert_eq!(terms.start_date, date("2024-01-01"));
    }

    #[test]
    fn test_terms_require_plan_fields() {
        let mut unlimited = plan(PlanKind::Unlimited);
        unlimited.duration_days = None;
        assert!(matches!(
            grant_terms_for_purchase(&unlimited, date("2024-01-01"), None, None),
            Err(AppError::ValidationError(_))
        ));

        let mut limited = plan(PlanKind::Limited);
        limited.visit_count = Some(0);
        assert!(matches!(
            grant_terms_for_purchase(&limited, date("2024-01-01"), None, None),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_fixed_terms_use_purchase_window() {
        let terms = grant_terms_for_purchase(
            &plan(PlanKind::Fixed),
            date("2024-01-01"),
            Some(date("2024-02-01")),
            Some(date("2024-02-29")),
        )
        .unwrap();
        assert_eq!(terms.start_date, date("2024-02-01"));
        assert_eq!(terms.end_date, Some(date("2024-02-29")));
        assert_eq!(terms.remaining_visits, None);

        assert!(validate_fixed_window(Some(date("2024-02-02")), Some(date("2024-02-01"))).is_err());
        assert!(validate_fixed_window(Some(date("2024-02-02")), None).is_err());
        assert!(validate_fixed_window(Some(date("2024-02-02")), Some(date("2024-02-02"))).is_ok());
    }
}
