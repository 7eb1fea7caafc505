//! Search and ordering helpers for the collection endpoints

use crate::models::ListQuery;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{Condition, IntoSimpleExpr, Order, QueryFilter, QueryOrder};

/// Case-insensitive substring match on a column (joined tables included)
pub fn icontains<C: IntoSimpleExpr>(col: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(col.into_simple_expr())).like(format!("%{}%", term.to_lowercase()))
}

/// Filter rows where any of `columns` contains the search term
pub fn apply_search<S>(select: S, query: &ListQuery, columns: Vec<SimpleExpr>) -> S
where
    S: QueryFilter,
{
    match query.search_term() {
        Some(term) => {
            let condition = columns
                .into_iter()
                .fold(Condition::any(), |cond, col| cond.add(icontains(col, term)));
            select.filter(condition)
        }
        None => select,
    }
}

/// Apply the requested ordering; `resolve` maps an allowed field name to its
/// column and unknown names are skipped. Falls back to `default` descending.
pub fn apply_ordering<S, F>(select: S, query: &ListQuery, resolve: F, default: SimpleExpr) -> S
where
    S: QueryOrder,
    F: Fn(&str) -> Option<SimpleExpr>,
{
    let mut select = select;
    let mut ordered = false;
    for term in query.order_terms() {
        if let Some(col) = resolve(&term.field) {
            let order = if term.descending {
                Order::Desc
            } else {
                Order::Asc
            };
            select = select.order_by(col, order);
            ordered = true;
        }
    }
    if ordered {
        select
    } else {
        select.order_by(default, Order::Desc)
    }
}
