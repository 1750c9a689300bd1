//! Customer and order handlers.
//!
//! Each handler checks its input's `validator` rules, calls the CRM client
//! and maps a classified failure through `ApiError`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::crm::types::{
    Created, CustomerFilter, CustomerOrdersQuery, CustomersPage, NewCustomer, NewOrder,
    NewPayment, OrdersPage, PageParams,
};
use crate::http::error::ApiError;
use crate::http::server::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({"health": "OK"}))
}

/// Runs the upstream probe so operators can check credentials and reachability.
pub async fn upstream_health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.crm.probe().await?;
    Ok(Json(json!({"upstream": "OK"})))
}

pub async fn list_clients(
    State(state): State<AppState>,
    filter: Result<Query<CustomerFilter>, QueryRejection>,
) -> Result<Json<CustomersPage>, ApiError> {
    let Query(filter) = filter?;
    filter.validate()?;
    Ok(Json(state.crm.list_customers(&filter).await?))
}

pub async fn create_client(
    State(state): State<AppState>,
    customer: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(customer) = customer?;
    customer.validate()?;
    Ok(Json(state.crm.create_customer(&customer).await?))
}

pub async fn list_client_orders(
    State(state): State<AppState>,
    client_id: Result<Path<u64>, PathRejection>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<OrdersPage>, ApiError> {
    let Path(client_id) = client_id?;
    let Query(page) = page?;
    page.validate()?;

    let query = CustomerOrdersQuery { client_id, page };
    Ok(Json(state.crm.list_customer_orders(&query).await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    order: Result<Json<NewOrder>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(order) = order?;
    order.validate()?;
    Ok(Json(state.crm.create_order(&order).await?))
}

pub async fn attach_payment(
    State(state): State<AppState>,
    payment: Result<Json<NewPayment>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(payment) = payment?;
    Ok(Json(state.crm.create_payment(&payment).await?))
}
