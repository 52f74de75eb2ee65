//! Storage port: repository traits for persistence.
//!
//! Implementations own their transaction boundaries: every method is atomic
//! on its own, and [`OrderRepository::place`] covers both the stock
//! decrement and the order insert.

use std::future::Future;

use minishop_domain::customer::Customer;
use minishop_domain::error::MiniShopError;
use minishop_domain::id::{CustomerId, OrderId, ProductId, UserId};
use minishop_domain::order::Order;
use minishop_domain::product::{Category, Product};
use minishop_domain::search::SearchTerm;
use minishop_domain::user::User;

/// Repository for persisting and querying [`Customer`]s.
pub trait CustomerRepository {
    /// Create a new customer in storage.
    fn create(
        &self,
        customer: Customer,
    ) -> impl Future<Output = Result<Customer, MiniShopError>> + Send;

    /// Get a customer by its unique identifier.
    fn get_by_id(
        &self,
        id: CustomerId,
    ) -> impl Future<Output = Result<Option<Customer>, MiniShopError>> + Send;

    /// Get all customers, ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Customer>, MiniShopError>> + Send;

    /// Customers whose name contains `term`, case-insensitively.
    fn search_by_name(
        &self,
        term: &SearchTerm,
    ) -> impl Future<Output = Result<Vec<Customer>, MiniShopError>> + Send;

    /// Update an existing customer.
    ///
    /// Returns [`MiniShopError::NotFound`] when the customer does not exist.
    fn update(
        &self,
        customer: Customer,
    ) -> impl Future<Output = Result<Customer, MiniShopError>> + Send;

    /// Delete a customer and, with it, their orders.
    fn delete(&self, id: CustomerId) -> impl Future<Output = Result<(), MiniShopError>> + Send;
}

/// Repository for the product catalog.
pub trait ProductRepository {
    /// Create a new product in storage.
    fn create(&self, product: Product)
    -> impl Future<Output = Result<Product, MiniShopError>> + Send;

    /// Get a product by its unique identifier.
    fn get_by_id(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, MiniShopError>> + Send;

    /// Get all products, optionally restricted to one category.
    fn get_all(
        &self,
        category: Option<Category>,
    ) -> impl Future<Output = Result<Vec<Product>, MiniShopError>> + Send;

    /// Products whose model contains `term`, case-insensitively.
    fn search_by_model(
        &self,
        category: Option<Category>,
        term: &SearchTerm,
    ) -> impl Future<Output = Result<Vec<Product>, MiniShopError>> + Send;

    /// Update an existing product, including its category attributes.
    ///
    /// Returns [`MiniShopError::NotFound`] when the product does not exist.
    fn update(&self, product: Product)
    -> impl Future<Output = Result<Product, MiniShopError>> + Send;

    /// Atomically add `amount` units to stock and return the product.
    fn restock(
        &self,
        id: ProductId,
        amount: u32,
    ) -> impl Future<Output = Result<Product, MiniShopError>> + Send;

    /// Delete a product.
    ///
    /// Returns [`ConflictError::InUse`](minishop_domain::error::ConflictError::InUse)
    /// while orders still reference it.
    fn delete(&self, id: ProductId) -> impl Future<Output = Result<(), MiniShopError>> + Send;
}

/// Repository for orders.
pub trait OrderRepository {
    /// Take `order.quantity` units from the product stock and store the order,
    /// as a single transaction.
    ///
    /// Returns [`ConflictError::InsufficientStock`](minishop_domain::error::ConflictError::InsufficientStock)
    /// without touching anything when the stock is too low at commit time.
    fn place(&self, order: Order) -> impl Future<Output = Result<Order, MiniShopError>> + Send;

    /// Get an order by its unique identifier.
    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, MiniShopError>> + Send;

    /// Get all orders, most recent first.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Order>, MiniShopError>> + Send;

    /// Orders of one customer, most recent first.
    fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<Order>, MiniShopError>> + Send;

    /// Delete an order. Stock is not given back.
    fn delete(&self, id: OrderId) -> impl Future<Output = Result<(), MiniShopError>> + Send;
}

/// Repository for back-office accounts.
pub trait UserRepository {
    /// Create a new account.
    ///
    /// Returns [`ConflictError::Duplicate`](minishop_domain::error::ConflictError::Duplicate)
    /// when the email or username is taken.
    fn create(&self, user: User) -> impl Future<Output = Result<User, MiniShopError>> + Send;

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send;

    /// Look up an account by normalized email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send;

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send;

    /// Persist changes to verification state, codes or password.
    fn update(&self, user: User) -> impl Future<Output = Result<User, MiniShopError>> + Send;
}
