//! Order pages: list, search by id, place and delete.

use std::collections::HashMap;

use askama::Template;
use axum::extract::{Form, Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use tower_sessions::Session;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::customer::Customer;
use minishop_domain::error::MiniShopError;
use minishop_domain::id::{CustomerId, OrderId, ProductId};
use minishop_domain::order::Order;

use super::{Layout, error_page, fail, parse_number, render, succeed};
use crate::api::SearchParams;
use crate::state::AppState;

/// One line of an order table.
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub product_model: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
    pub ordered_at: String,
}

impl OrderRow {
    fn new(order: &Order, customer_name: &str) -> Self {
        Self {
            id: order.id.to_string(),
            customer_id: order.customer_id.to_string(),
            customer_name: customer_name.to_string(),
            product_model: order.product_model.clone(),
            quantity: order.quantity,
            unit_price: order.unit_price.to_string(),
            total_price: order.total_price.to_string(),
            ordered_at: order.ordered_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    /// Rows for `orders`, naming each customer from `customers`.
    pub fn build(orders: &[Order], customers: &[Customer]) -> Vec<Self> {
        let names: HashMap<CustomerId, &str> = customers
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();
        orders
            .iter()
            .map(|order| {
                let name = names.get(&order.customer_id).copied().unwrap_or("?");
                Self::new(order, name)
            })
            .collect()
    }
}

/// Entry of a `<select>` list.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "orders.html")]
pub struct OrderListTemplate {
    layout: Layout,
    query: String,
    searching: bool,
    orders: Vec<OrderRow>,
}

#[derive(Template)]
#[template(path = "order_form.html")]
pub struct OrderFormTemplate {
    layout: Layout,
    customers: Vec<SelectOption>,
    products: Vec<SelectOption>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewOrderParams {
    pub customer_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    pub customer_id: String,
    pub product_id: String,
    pub quantity: String,
}

/// `GET /orders?q=`: all orders, or the order whose id is `q`.
pub async fn list<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let orders = match params.q.as_deref() {
        Some(q) => state.order_service.search_orders(Some(q)).await,
        None => state.order_service.list_orders().await,
    };
    let orders = match orders {
        Ok(orders) => orders,
        Err(err @ MiniShopError::Validation(_)) => return fail(&session, &err, "/orders").await,
        Err(err) => return error_page(&session, &err).await,
    };
    let customers = match state.customer_service.list_customers().await {
        Ok(customers) => customers,
        Err(err) => return error_page(&session, &err).await,
    };

    render(&OrderListTemplate {
        layout: Layout::load(&session).await,
        searching: params.q.is_some(),
        query: params.q.unwrap_or_default(),
        orders: OrderRow::build(&orders, &customers),
    })
}

/// `GET /orders/new?customer_id=`: order form, optionally preselecting a
/// customer. Only products in stock are offered.
pub async fn new<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Query(params): Query<NewOrderParams>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customers = match state.customer_service.list_customers().await {
        Ok(customers) => customers,
        Err(err) => return error_page(&session, &err).await,
    };
    let products = match state.product_service.list_products().await {
        Ok(products) => products,
        Err(err) => return error_page(&session, &err).await,
    };
    let preselected = params.customer_id.unwrap_or_default();

    render(&OrderFormTemplate {
        layout: Layout::load(&session).await,
        customers: customers
            .iter()
            .map(|c| {
                let value = c.id.to_string();
                SelectOption {
                    selected: value == preselected,
                    label: c.name.clone(),
                    value,
                }
            })
            .collect(),
        products: products
            .iter()
            .filter(|p| p.stock_number > 0)
            .map(|p| SelectOption {
                value: p.id.to_string(),
                label: format!(
                    "{} {} ({}, {} in stock)",
                    p.brand, p.model, p.price, p.stock_number
                ),
                selected: false,
            })
            .collect(),
    })
}

/// `POST /orders`: place the order (PRG).
pub async fn place<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<OrderForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    match place_order(&state, &form).await {
        Ok(order) => {
            succeed(
                &session,
                format!(
                    "Order placed: {} x {} for {}",
                    order.quantity, order.product_model, order.total_price
                ),
                "/orders",
            )
            .await
        }
        Err(err) => {
            let back = format!("/orders/new?customer_id={}", form.customer_id.trim());
            fail(&session, &err, &back).await
        }
    }
}

async fn place_order<CR, PR, OR, UR, M>(
    state: &AppState<CR, PR, OR, UR, M>,
    form: &OrderForm,
) -> Result<Order, MiniShopError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customer_id = CustomerId::parse(form.customer_id.trim())?;
    let product_id = ProductId::parse(form.product_id.trim())?;
    let quantity = parse_number("quantity", &form.quantity)?;
    state
        .order_service
        .place_order(customer_id, product_id, quantity)
        .await
}

/// `POST /orders/{id}/delete`: remove the order; stock is not returned.
pub async fn delete<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Path(id): Path<String>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let result = match OrderId::parse(&id) {
        Ok(id) => state.order_service.delete_order(id).await,
        Err(err) => Err(err.into()),
    };
    match result {
        Ok(order) => succeed(&session, format!("Order {} deleted", order.id), "/orders").await,
        Err(err) => fail(&session, &err, "/orders").await,
    }
}
