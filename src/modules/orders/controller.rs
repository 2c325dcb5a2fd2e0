use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::{
    crud::{MethodKind, OrderCrud},
    interface::{OrderError, Result},
    model::{LineItemStatus, Order, OrderLineItem},
    schema::{
        CreateOrderRequest, DeliveryMethodsResponse, LineItemResponse, MethodResponse, MyOrdersQuery, OrderResponse,
        PaymentMethodsResponse, StatusUpdateRequest, StatusUpdateResponse, SupplierOrdersQuery,
    },
};
use crate::modules::accounts::crud::AccountCrud;
use crate::modules::catalog::{controller::hydrate, crud::CatalogCrud, schema::ProductResponse};
use crate::services::auth::AuthUser;
use crate::services::notify::{line_item_status_sms, sms_best_effort};
use crate::services::pagination::{PageQuery, Paginated};
use crate::AppState;

async fn products_for(
    state: &AppState,
    items: &[OrderLineItem],
    viewer: &str,
) -> Result<HashMap<i64, ProductResponse>> {
    let mut ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let rows = CatalogCrud::new(state.db.clone()).products_by_ids(&ids).await?;
    let products = hydrate(state, rows, Some(viewer)).await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

fn line_item_response(item: OrderLineItem, products: &HashMap<i64, ProductResponse>) -> Option<LineItemResponse> {
    let product = products.get(&item.product_id)?.clone();
    Some(LineItemResponse {
        id: item.id,
        product,
        quantity: item.quantity,
        price: item.price,
        status: item.status,
    })
}

/// Assembles full order views. With `supplier`, each order only shows that supplier's lines.
async fn build_orders(
    state: &AppState,
    orders: Vec<Order>,
    supplier: Option<&str>,
    viewer: &str,
) -> Result<Vec<OrderResponse>> {
    let crud = OrderCrud::new(state.db.clone());
    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = crud.line_items(&order_ids, supplier).await?;
    let products = products_for(state, &items, viewer).await?;

    let mut by_order: HashMap<i64, Vec<LineItemResponse>> = HashMap::new();
    for item in items {
        let order_id = item.order_id;
        if let Some(line) = line_item_response(item, &products) {
            by_order.entry(order_id).or_default().push(line);
        }
    }

    let delivery: HashMap<i64, MethodResponse> = crud
        .methods(MethodKind::Delivery)
        .await?
        .into_iter()
        .map(|m| (m.id, m.into()))
        .collect();
    let payment: HashMap<i64, MethodResponse> = crud
        .methods(MethodKind::Payment)
        .await?
        .into_iter()
        .map(|m| (m.id, m.into()))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| {
            let d = order.delivery_method_id.and_then(|id| delivery.get(&id).cloned());
            let p = order.payment_method_id.and_then(|id| payment.get(&id).cloned());
            let lines = by_order.remove(&order.id).unwrap_or_default();
            OrderResponse::new(order, d, p, lines)
        })
        .collect())
}

async fn single_order(state: &AppState, order: Order, supplier: Option<&str>, viewer: &str) -> Result<OrderResponse> {
    build_orders(state, vec![order], supplier, viewer)
        .await?
        .pop()
        .ok_or(OrderError::NotFound)
}

// =============================================================================
// LOOKUPS
// =============================================================================

pub async fn delivery_methods(State(state): State<Arc<AppState>>) -> Result<Json<DeliveryMethodsResponse>> {
    let methods = OrderCrud::new(state.db.clone()).methods(MethodKind::Delivery).await?;
    Ok(Json(DeliveryMethodsResponse {
        delivery_methods: methods.into_iter().map(Into::into).collect(),
    }))
}

pub async fn payment_methods(State(state): State<Arc<AppState>>) -> Result<Json<PaymentMethodsResponse>> {
    let methods = OrderCrud::new(state.db.clone()).methods(MethodKind::Payment).await?;
    Ok(Json(PaymentMethodsResponse {
        payment_methods: methods.into_iter().map(Into::into).collect(),
    }))
}

// =============================================================================
// BUYER
// =============================================================================

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    req.validate()?;
    if let Some(id) = req.duplicate_product() {
        return Err(OrderError::DuplicateProduct(id));
    }

    let crud = OrderCrud::new(state.db.clone());
    let mut delivery_name = None;
    if let Some(id) = req.delivery_method {
        let method = crud
            .find_method(MethodKind::Delivery, id)
            .await?
            .ok_or(OrderError::DeliveryMethodNotFound)?;
        delivery_name = Some(method.name);
    }
    if let Some(id) = req.payment_method {
        crud.find_method(MethodKind::Payment, id)
            .await?
            .ok_or(OrderError::PaymentMethodNotFound)?;
    }

    let order_id = crud.create(&user.id, &req).await?;
    tracing::info!(
        order_id,
        account_id = %user.id,
        items = req.product_list.len(),
        total = %req.total_price,
        "order created"
    );
    state
        .metrics
        .record_order_created(delivery_name.as_deref(), req.total_price);

    let order = crud.find_order(order_id, &user.id).await?.ok_or(OrderError::NotFound)?;
    let response = single_order(&state, order, None, &user.id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn my_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<MyOrdersQuery>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Paginated<OrderResponse>>> {
    let page = paging.page();
    let (orders, count) = OrderCrud::new(state.db.clone())
        .list_for_buyer(&user.id, &query.parse(), page)
        .await?;

    let results = build_orders(&state, orders, None, &user.id).await?;
    Ok(Json(Paginated::new(results, count, page)))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>> {
    let order = OrderCrud::new(state.db.clone())
        .find_order(id, &user.id)
        .await?
        .ok_or(OrderError::NotFound)?;

    Ok(Json(single_order(&state, order, None, &user.id).await?))
}

// =============================================================================
// SUPPLIER
// =============================================================================

pub async fn supplier_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<SupplierOrdersQuery>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Paginated<OrderResponse>>> {
    let status = query.status().map_err(OrderError::InvalidStatus)?;
    let page = paging.page();
    let (orders, count) = OrderCrud::new(state.db.clone())
        .list_for_supplier(&user.id, status, page)
        .await?;

    let results = build_orders(&state, orders, Some(&user.id), &user.id).await?;
    Ok(Json(Paginated::new(results, count, page)))
}

pub async fn supplier_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>> {
    let order = OrderCrud::new(state.db.clone())
        .supplier_order(id, &user.id)
        .await?
        .ok_or(OrderError::NotFound)?;

    Ok(Json(single_order(&state, order, Some(&user.id), &user.id).await?))
}

pub async fn update_line_item_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((order_id, line_item_id)): Path<(i64, i64)>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateResponse>> {
    let crud = OrderCrud::new(state.db.clone());
    let mut item = crud
        .find_supplier_line_item(order_id, line_item_id, &user.id)
        .await?
        .ok_or(OrderError::LineItemNotFound)?;
    let status = LineItemStatus::parse(&req.status).ok_or_else(|| OrderError::InvalidStatus(req.status.clone()))?;

    // Loaded before the write so a failed lookup leaves the status untouched
    let products = products_for(&state, std::slice::from_ref(&item), &user.id).await?;

    let changed = item.status != status;
    if changed {
        crud.set_status(item.id, status).await?;
        tracing::info!(
            order_id,
            line_item_id,
            from = item.status.as_str(),
            to = status.as_str(),
            "line item status changed"
        );
        state.metrics.record_status_change(status.as_str());
        item.status = status;
        notify_buyer(&state, &item, &products).await;
    }

    let order_product = line_item_response(item, &products).ok_or(OrderError::LineItemNotFound)?;
    Ok(Json(StatusUpdateResponse {
        message: "Status updated",
        order_product,
    }))
}

/// Texts the buyer about a status change. The status is already saved, so nothing here fails the request.
async fn notify_buyer(state: &AppState, item: &OrderLineItem, products: &HashMap<i64, ProductResponse>) {
    let order = match OrderCrud::new(state.db.clone()).order_by_id(item.order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(order_id = item.order_id, error = %e, "order lookup failed, skipping status sms");
            state.metrics.record_notification_failure("sms");
            return;
        }
    };
    let buyer = match AccountCrud::new(state.db.clone()).find_by_id(&order.account_id).await {
        Ok(buyer) => buyer,
        Err(e) => {
            tracing::warn!(order_id = order.id, error = %e, "buyer lookup failed, skipping status sms");
            state.metrics.record_notification_failure("sms");
            return;
        }
    };
    let Some(buyer) = buyer.filter(|b| !b.phone.is_empty()) else {
        tracing::warn!(order_id = order.id, "buyer has no phone, skipping status sms");
        return;
    };

    let product_name = products.get(&item.product_id).map(|p| p.name.as_str()).unwrap_or_default();
    let body = line_item_status_sms(
        &buyer.first_name,
        order.id,
        product_name,
        item.quantity,
        item.status.as_str(),
        &order.total_price.to_string(),
    );
    sms_best_effort(state.notifier.as_ref(), &state.metrics, &buyer.phone, &body).await;
}
