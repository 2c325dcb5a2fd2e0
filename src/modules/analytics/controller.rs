use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::{
    crud::AnalyticsCrud,
    interface::Result,
    schema::{
        count_change, percentage_change, DashboardResponse, InProgressStat, IncomeStat, OrdersStat, ProductsStat,
        SalesQuery, SalesResponse, Window,
    },
};
use crate::services::auth::AuthUser;
use crate::AppState;

const WEEK: i64 = 7;
const MONTH: i64 = 30;
const YEAR: i64 = 365;

pub async fn dashboard(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<Json<DashboardResponse>> {
    let crud = AnalyticsCrud::new(state.db.clone());
    let now = Utc::now();

    let (week, prev_week) = Window::trailing(now, WEEK);
    let income = crud.income(&user.id, week).await?;
    let prev_income = crud.income(&user.id, prev_week).await?;

    let (month, prev_month) = Window::trailing(now, MONTH);
    let products = crud.product_count(&user.id, None).await?;
    let new_products = crud.product_count(&user.id, Some(month)).await?;
    let prev_new_products = crud.product_count(&user.id, Some(prev_month)).await?;

    let (year, prev_year) = Window::trailing(now, YEAR);
    let orders = crud.order_count(&user.id, None).await?;
    let year_orders = crud.order_count(&user.id, Some(year)).await?;
    let prev_year_orders = crud.order_count(&user.id, Some(prev_year)).await?;

    let in_progress = crud.in_progress_count(&user.id, week).await?;
    let prev_in_progress = crud.in_progress_count(&user.id, prev_week).await?;

    Ok(Json(DashboardResponse {
        total_income: IncomeStat {
            total: income,
            change: percentage_change(income, prev_income),
        },
        active_products: ProductsStat {
            total: products,
            this_month: new_products,
            change: count_change(new_products, prev_new_products),
        },
        orders_total: OrdersStat {
            total: orders,
            this_year: year_orders,
            change: count_change(year_orders, prev_year_orders),
        },
        orders_in_progress: InProgressStat {
            total: in_progress,
            change: count_change(in_progress, prev_in_progress),
        },
    }))
}

pub async fn sales(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesResponse>> {
    let (year, month) = query.parse()?;
    let rows = match Window::month(year, month) {
        Some(window) => AnalyticsCrud::new(state.db.clone()).daily_sales(&user.id, window).await?,
        None => Vec::new(),
    };

    tracing::debug!(account_id = %user.id, year, month, days_with_sales = rows.len(), "sales report");
    Ok(Json(SalesResponse::new(year, month, rows)))
}
