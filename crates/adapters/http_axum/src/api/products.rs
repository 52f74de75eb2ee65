//! JSON REST handlers for the laptop and phone catalog.

use axum::Json;
use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::id::ProductId;
use minishop_domain::product::{Category, Product, ProductKind};

use super::{ApiResponse, SearchParams};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or replacing a product.
///
/// `kind` carries the category and its attributes, e.g.
/// `{"type": "phone", "sim_type": "eSIM", ...}`. On `PUT` the category must
/// match the stored one and `stock_number` is ignored.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub display_size: f64,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub operating_system: String,
    #[serde(default)]
    pub camera: String,
    #[serde(default)]
    pub wifi: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock_number: u32,
    pub kind: ProductKind,
}

impl ProductRequest {
    fn into_product(self, id: Option<ProductId>) -> Result<Product, ApiError> {
        let mut builder = match self.kind {
            ProductKind::Laptop(spec) => Product::laptop(spec),
            ProductKind::Phone(spec) => Product::phone(spec),
        }
        .brand(self.brand)
        .model(self.model)
        .display_size(self.display_size)
        .weight(self.weight)
        .operating_system(self.operating_system)
        .camera(self.camera)
        .wifi(self.wifi)
        .price(self.price)
        .description(self.description)
        .stock_number(self.stock_number);
        if let Some(id) = id {
            builder = builder.id(id);
        }
        Ok(builder.build()?)
    }
}

/// Request body for `POST /api/products/{id}/restock`.
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub amount: u32,
}

/// `GET /api/products`
pub async fn list<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
) -> Result<ApiResponse<Vec<Product>>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let products = state.product_service.list_products().await?;
    Ok(ApiResponse::Ok(Json(products)))
}

async fn list_category<CR, PR, OR, UR, M>(
    state: &AppState<CR, PR, OR, UR, M>,
    category: Category,
    params: SearchParams,
) -> Result<ApiResponse<Vec<Product>>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let products = state
        .product_service
        .search_category(category, params.q.as_deref())
        .await?;
    Ok(ApiResponse::Ok(Json(products)))
}

/// `GET /api/laptops?q=`: laptops whose model contains `q`, or all laptops.
pub async fn laptops<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Query(params): Query<SearchParams>,
) -> Result<ApiResponse<Vec<Product>>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    list_category(&state, Category::Laptop, params).await
}

/// `GET /api/phones?q=`: phones whose model contains `q`, or all phones.
pub async fn phones<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Query(params): Query<SearchParams>,
) -> Result<ApiResponse<Vec<Product>>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    list_category(&state, Category::Phone, params).await
}

/// `GET /api/products/{id}`
pub async fn get<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = ProductId::parse(&id)?;
    let product = state.product_service.get_product(id).await?;
    Ok(ApiResponse::Ok(Json(product)))
}

/// `POST /api/products`
pub async fn create<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Json(req): Json<ProductRequest>,
) -> Result<ApiResponse<Product>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let product = req.into_product(None)?;
    let created = state.product_service.create_product(product).await?;
    Ok(ApiResponse::Created(Json(created)))
}

/// `PUT /api/products/{id}`: the stock level is left as stored, use
/// `restock` to add units.
pub async fn update<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<ApiResponse<Product>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = ProductId::parse(&id)?;
    let product = req.into_product(Some(id))?;
    let updated = state.product_service.update_product(product).await?;
    Ok(ApiResponse::Ok(Json(updated)))
}

/// `POST /api/products/{id}/restock`
pub async fn restock<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> Result<ApiResponse<Product>, ApiError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = ProductId::parse(&id)?;
    let product = state.product_service.restock(id, req.amount).await?;
    Ok(ApiResponse::Ok(Json(product)))
}

/// `DELETE /api/products/{id}`: refused with `409` while orders reference it.
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
    let id = ProductId::parse(&id)?;
    state.product_service.delete_product(id).await?;
    Ok(ApiResponse::NoContent)
}
