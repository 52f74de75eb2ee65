//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod auth;
#[allow(clippy::missing_errors_doc)]
pub mod customers;
#[allow(clippy::missing_errors_doc)]
pub mod orders;
#[allow(clippy::missing_errors_doc)]
pub mod products;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};

use crate::state::AppState;

/// `?q=` search parameter shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Successful API responses.
pub enum ApiResponse<T> {
    Ok(Json<T>),
    Created(Json<T>),
    Accepted,
    NoContent,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Build the `/api` sub-router.
pub fn routes<CR, PR, OR, UR, M>() -> Router<AppState<CR, PR, OR, UR, M>>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    Router::new()
        // Auth
        .route("/auth/register", post(auth::register::<CR, PR, OR, UR, M>))
        .route("/auth/verify", post(auth::verify::<CR, PR, OR, UR, M>))
        .route("/auth/login", post(auth::login::<CR, PR, OR, UR, M>))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/recover", post(auth::recover::<CR, PR, OR, UR, M>))
        .route("/auth/reset", post(auth::reset::<CR, PR, OR, UR, M>))
        .route("/auth/me", get(auth::me))
        // Customers
        .route(
            "/customers",
            get(customers::list::<CR, PR, OR, UR, M>).post(customers::create::<CR, PR, OR, UR, M>),
        )
        .route(
            "/customers/{id}",
            get(customers::get::<CR, PR, OR, UR, M>)
                .put(customers::update::<CR, PR, OR, UR, M>)
                .delete(customers::delete::<CR, PR, OR, UR, M>),
        )
        .route(
            "/customers/{id}/orders",
            get(customers::orders::<CR, PR, OR, UR, M>),
        )
        // Products
        .route(
            "/products",
            get(products::list::<CR, PR, OR, UR, M>).post(products::create::<CR, PR, OR, UR, M>),
        )
        .route("/laptops", get(products::laptops::<CR, PR, OR, UR, M>))
        .route("/phones", get(products::phones::<CR, PR, OR, UR, M>))
        .route(
            "/products/{id}",
            get(products::get::<CR, PR, OR, UR, M>)
                .put(products::update::<CR, PR, OR, UR, M>)
                .delete(products::delete::<CR, PR, OR, UR, M>),
        )
        .route(
            "/products/{id}/restock",
            post(products::restock::<CR, PR, OR, UR, M>),
        )
        // Orders
        .route(
            "/orders",
            get(orders::list::<CR, PR, OR, UR, M>).post(orders::place::<CR, PR, OR, UR, M>),
        )
        .route(
            "/orders/{id}",
            get(orders::get::<CR, PR, OR, UR, M>).delete(orders::delete::<CR, PR, OR, UR, M>),
        )
}
