//! JSON REST handlers for customers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::customer::Customer;
use minishop_domain::id::CustomerId;
use minishop_domain::order::Order;

use super::{ApiResponse, SearchParams};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or replacing a customer.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
}

impl CustomerRequest {
    fn into_customer(self, id: Option<CustomerId>) -> Result<Customer, ApiError> {
        let mut builder = Customer::builder()
            .name(self.name)
            .address(self.address)
            .phone_number(self.phone_number)
            .email(self.email);
        if let Some(id) = id {
            builder = builder.id(id);
        }
        Ok(builder.build()?)
    }
}

/// `GET /api/customers?q=`
///
/// Without `q` every customer is listed; with `q` only names containing it.
pub async fn list<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Query(params): Query<SearchParams>,
) -> Result<ApiResponse<Vec<Customer>>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customers = match params.q.as_deref() {
        Some(q) => state.customer_service.search_customers(Some(q)).await?,
        None => state.customer_service.list_customers().await?,
    };
    Ok(ApiResponse::Ok(Json(customers)))
}

/// `GET /api/customers/{id}`
pub async fn get<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Customer>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = CustomerId::parse(&id)?;
    let customer = state.customer_service.get_customer(id).await?;
    Ok(ApiResponse::Ok(Json(customer)))
}

/// `POST /api/customers`
pub async fn create<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Json(req): Json<CustomerRequest>,
) -> Result<ApiResponse<Customer>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customer = req.into_customer(None)?;
    let created = state.customer_service.create_customer(customer).await?;
    Ok(ApiResponse::Created(Json(created)))
}

/// `PUT /api/customers/{id}`
pub async fn update<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
    Json(req): Json<CustomerRequest>,
) -> Result<ApiResponse<Customer>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = CustomerId::parse(&id)?;
    let customer = req.into_customer(Some(id))?;
    let updated = state.customer_service.update_customer(customer).await?;
    Ok(ApiResponse::Ok(Json(updated)))
}

/// `DELETE /api/customers/{id}`: also removes the customer's orders.
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
    let id = CustomerId::parse(&id)?;
    state.customer_service.delete_customer(id).await?;
    Ok(ApiResponse::NoContent)
}

/// `GET /api/customers/{id}/orders`
pub async fn orders<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Order>>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = CustomerId::parse(&id)?;
    let orders = state.order_service.list_customer_orders(id).await?;
    Ok(ApiResponse::Ok(Json(orders)))
}
