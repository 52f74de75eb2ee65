//! Dashboard landing page.

use askama::Template;
use axum::extract::State;
use axum::response::{Redirect, Response};
use tower_sessions::Session;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::error::MiniShopError;
use minishop_domain::product::{Category, Product};

use super::orders::OrderRow;
use super::{Layout, error_page, render};
use crate::session::HOME_PATH;
use crate::state::AppState;

/// How many orders the dashboard lists.
const RECENT_ORDERS: usize = 5;

/// Products at or below this stock level are flagged.
const LOW_STOCK: u32 = 3;

/// A product running out of stock.
pub struct LowStockRow {
    pub id: String,
    pub category: &'static str,
    pub brand: String,
    pub model: String,
    pub stock_number: u32,
}

impl From<&Product> for LowStockRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            category: product.category().as_str(),
            brand: product.brand.clone(),
            model: product.model.clone(),
            stock_number: product.stock_number,
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    layout: Layout,
    customer_count: usize,
    laptop_count: usize,
    phone_count: usize,
    order_count: usize,
    low_stock: Vec<LowStockRow>,
    recent_orders: Vec<OrderRow>,
}

/// `GET /`: redirects to the dashboard.
pub async fn root() -> Redirect {
    Redirect::to(HOME_PATH)
}

/// `GET /dashboard`: catalog and order overview.
pub async fn index<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    match load(&state, session.clone()).await {
        Ok(template) => render(&template),
        Err(err) => error_page(&session, &err).await,
    }
}

async fn load<CR, PR, OR, UR, M>(
    state: &AppState<CR, PR, OR, UR, M>,
    session: Session,
) -> Result<DashboardTemplate, MiniShopError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customers = state.customer_service.list_customers().await?;
    let products = state.product_service.list_products().await?;
    let orders = state.order_service.list_orders().await?;

    let laptop_count = products
        .iter()
        .filter(|p| p.category() == Category::Laptop)
        .count();
    let low_stock = products
        .iter()
        .filter(|p| p.stock_number <= LOW_STOCK)
        .map(LowStockRow::from)
        .collect();
    let order_count = orders.len();
    let recent: Vec<_> = orders.into_iter().take(RECENT_ORDERS).collect();

    Ok(DashboardTemplate {
        layout: Layout::load(&session).await,
        customer_count: customers.len(),
        laptop_count,
        phone_count: products.len() - laptop_count,
        order_count,
        low_stock,
        recent_orders: OrderRow::build(&recent, &customers),
    })
}
