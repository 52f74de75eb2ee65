//! JSON REST handlers for orders.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::id::{CustomerId, OrderId, ProductId};
use minishop_domain::order::Order;

use super::{ApiResponse, SearchParams};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for placing an order.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub product_id: String,
    pub quantity: u32,
}

/// `GET /api/orders?q=`
///
/// Without `q` every order is listed, newest first. With `q` the order whose
/// id is exactly `q`, if any.
pub async fn list<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Query(params): Query<SearchParams>,
) -> Result<ApiResponse<Vec<Order>>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let orders = match params.q.as_deref() {
        Some(q) => state.order_service.search_orders(Some(q)).await?,
        None => state.order_service.list_orders().await?,
    };
    Ok(ApiResponse::Ok(Json(orders)))
}

/// `GET /api/orders/{id}`
pub async fn get<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Order>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = OrderId::parse(&id)?;
    let order = state.order_service.get_order(id).await?;
    Ok(ApiResponse::Ok(Json(order)))
}

/// `POST /api/orders`: `409` when the product stock is too low.
pub async fn place<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<ApiResponse<Order>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customer_id = CustomerId::parse(&req.customer_id)?;
    let product_id = ProductId::parse(&req.product_id)?;
    let order = state
        .order_service
        .place_order(customer_id, product_id, req.quantity)
        .await?;
    Ok(ApiResponse::Created(Json(order)))
}

/// `DELETE /api/orders/{id}`
pub async fn delete<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = OrderId::parse(&id)?;
    state.order_service.delete_order(id).await?;
    Ok(ApiResponse::NoContent)
}
