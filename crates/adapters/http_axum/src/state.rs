//! Shared application state for axum handlers.

use std::sync::Arc;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_app::services::auth_service::AuthService;
use minishop_app::services::customer_service::CustomerService;
use minishop_app::services::order_service::OrderService;
use minishop_app::services::product_service::ProductService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types and the mailer to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`: only the `Arc` wrappers are cloned.
pub struct AppState<CR, PR, OR, UR, M> {
    /// Customer CRUD and search.
    pub customer_service: Arc<CustomerService<CR>>,
    /// Laptop and phone catalog.
    pub product_service: Arc<ProductService<PR>>,
    /// Order placement against stock.
    pub order_service: Arc<OrderService<OR, CR, PR>>,
    /// Registration, verification, login and recovery.
    pub auth_service: Arc<AuthService<UR, M>>,
}

impl<CR, PR, OR, UR, M> Clone for AppState<CR, PR, OR, UR, M> {
    fn clone(&self) -> Self {
        Self {
            customer_service: Arc::clone(&self.customer_service),
            product_service: Arc::clone(&self.product_service),
            order_service: Arc::clone(&self.order_service),
            auth_service: Arc::clone(&self.auth_service),
        }
    }
}

impl<CR, PR, OR, UR, M> AppState<CR, PR, OR, UR, M>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        customer_service: CustomerService<CR>,
        product_service: ProductService<PR>,
        order_service: OrderService<OR, CR, PR>,
        auth_service: AuthService<UR, M>,
    ) -> Self {
        Self {
            customer_service: Arc::new(customer_service),
            product_service: Arc::new(product_service),
            order_service: Arc::new(order_service),
            auth_service: Arc::new(auth_service),
        }
    }
}
