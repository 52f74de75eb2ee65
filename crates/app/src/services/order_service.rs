//! Order service: placing orders against product stock.

use minishop_domain::error::{MiniShopError, NotFoundError};
use minishop_domain::id::{CustomerId, OrderId, ProductId};
use minishop_domain::order::Order;

use crate::ports::{CustomerRepository, OrderRepository, ProductRepository};

/// Application service for orders.
///
/// Needs read access to customers and products to validate references and
/// snapshot the product at placement time.
pub struct OrderService<OR, CR, PR> {
    orders: OR,
    customers: CR,
    products: PR,
}

impl<OR, CR, PR> OrderService<OR, CR, PR>
where
    OR: OrderRepository,
    CR: CustomerRepository,
    PR: ProductRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(orders: OR, customers: CR, products: PR) -> Self {
        Self {
            orders,
            customers,
            products,
        }
    }

    /// Place an order of `quantity` units of a product for a customer.
    ///
    /// [`OrderRepository::place`] re-checks stock atomically with the decrement.
    ///
    /// # Errors
    ///
    /// - [`MiniShopError::NotFound`] when the customer or product is unknown
    /// - [`MiniShopError::Validation`] when `quantity` is zero
    /// - [`MiniShopError::Conflict`] when stock is insufficient
    /// - a storage error from the repositories
    #[tracing::instrument(skip(self))]
    pub async fn place_order(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Order, MiniShopError> {
        let customer = self
            .customers
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Customer",
                id: customer_id.to_string(),
            })?;
        let product = self
            .products
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Product",
                id: product_id.to_string(),
            })?;

        let order = Order::for_product(&customer, &product, quantity)?;
        if let Err(err) = product.ensure_available(quantity) {
            tracing::warn!(%err, "order rejected");
            return Err(err.into());
        }

        let placed = self.orders.place(order).await?;
        tracing::info!(order_id = %placed.id, total = %placed.total_price, "order placed");
        Ok(placed)
    }

    /// Look up an order by id.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when no order with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, MiniShopError> {
        self.orders.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Order",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_orders(&self) -> Result<Vec<Order>, MiniShopError> {
        self.orders.get_all().await
    }

    /// Search orders by exact id.
    ///
    /// Blank input and unknown ids both yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] when the input is not an order
    /// id, or a storage error from the repository.
    pub async fn search_orders(&self, query: Option<&str>) -> Result<Vec<Order>, MiniShopError> {
        let Some(text) = query.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(Vec::new());
        };
        let id = OrderId::parse(text)?;
        Ok(self.orders.get_by_id(id).await?.into_iter().collect())
    }

    /// Orders placed by one customer.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when the customer does not exist,
    /// or a storage error from the repositories.
    pub async fn list_customer_orders(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, MiniShopError> {
        if self.customers.get_by_id(customer_id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Customer",
                id: customer_id.to_string(),
            }
            .into());
        }
        self.orders.find_by_customer(customer_id).await
    }

    /// Delete an order. The product stock is not replenished.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when the order does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<Order, MiniShopError> {
        let order = self.get_order(id).await?;
        self.orders.delete(id).await?;
        Ok(order)
    }
}
