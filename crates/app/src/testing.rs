//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use minishop_domain::customer::Customer;
use minishop_domain::error::{ConflictError, MiniShopError, NotFoundError};
use minishop_domain::id::{CustomerId, OrderId, ProductId, UserId};
use minishop_domain::order::Order;
use minishop_domain::product::{Category, Product};
use minishop_domain::search::SearchTerm;
use minishop_domain::user::User;

use crate::ports::{CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository};

/// Shared tables so that order placement can see product stock.
#[derive(Default)]
pub struct Tables {
    pub customers: Mutex<HashMap<CustomerId, Customer>>,
    pub products: Mutex<HashMap<ProductId, Product>>,
    pub orders: Mutex<HashMap<OrderId, Order>>,
    pub users: Mutex<HashMap<UserId, User>>,
}

#[derive(Clone, Default)]
pub struct InMemoryCustomerRepo(pub Arc<Tables>);

#[derive(Clone, Default)]
pub struct InMemoryProductRepo(pub Arc<Tables>);

#[derive(Clone, Default)]
pub struct InMemoryOrderRepo(pub Arc<Tables>);

#[derive(Clone, Default)]
pub struct InMemoryUserRepo(pub Arc<Tables>);

fn not_found(entity: &'static str, id: impl ToString) -> MiniShopError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
    .into()
}

impl CustomerRepository for InMemoryCustomerRepo {
    fn create(
        &self,
        customer: Customer,
    ) -> impl Future<Output = Result<Customer, MiniShopError>> + Send {
        let mut store = self.0.customers.lock().unwrap();
        store.insert(customer.id, customer.clone());
        async { Ok(customer) }
    }

    fn get_by_id(
        &self,
        id: CustomerId,
    ) -> impl Future<Output = Result<Option<Customer>, MiniShopError>> + Send {
        let result = self.0.customers.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Customer>, MiniShopError>> + Send {
        let mut result: Vec<Customer> = self.0.customers.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }

    fn search_by_name(
        &self,
        term: &SearchTerm,
    ) -> impl Future<Output = Result<Vec<Customer>, MiniShopError>> + Send {
        let result: Vec<Customer> = self
            .0
            .customers
            .lock()
            .unwrap()
            .values()
            .filter(|c| term.matches(&c.name))
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        customer: Customer,
    ) -> impl Future<Output = Result<Customer, MiniShopError>> + Send {
        let mut store = self.0.customers.lock().unwrap();
        let result = if store.contains_key(&customer.id) {
            store.insert(customer.id, customer.clone());
            Ok(customer)
        } else {
            Err(not_found("Customer", customer.id))
        };
        async { result }
    }

    fn delete(&self, id: CustomerId) -> impl Future<Output = Result<(), MiniShopError>> + Send {
        self.0.customers.lock().unwrap().remove(&id);
        self.0
            .orders
            .lock()
            .unwrap()
            .retain(|_, order| order.customer_id != id);
        async { Ok(()) }
    }
}

impl ProductRepository for InMemoryProductRepo {
    fn create(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Product, MiniShopError>> + Send {
        self.0
            .products
            .lock()
            .unwrap()
            .insert(product.id, product.clone());
        async { Ok(product) }
    }

    fn get_by_id(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, MiniShopError>> + Send {
        let result = self.0.products.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(
        &self,
        category: Option<Category>,
    ) -> impl Future<Output = Result<Vec<Product>, MiniShopError>> + Send {
        let result: Vec<Product> = self
            .0
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| category.is_none_or(|c| p.category() == c))
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn search_by_model(
        &self,
        category: Option<Category>,
        term: &SearchTerm,
    ) -> impl Future<Output = Result<Vec<Product>, MiniShopError>> + Send {
        let result: Vec<Product> = self
            .0
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| category.is_none_or(|c| p.category() == c) && term.matches(&p.model))
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Product, MiniShopError>> + Send {
        let mut store = self.0.products.lock().unwrap();
        let result = match store.get_mut(&product.id) {
            Some(stored) if stored.category() == product.category() => {
                let stock_number = stored.stock_number;
                *stored = Product {
                    stock_number,
                    ..product
                };
                Ok(stored.clone())
            }
            _ => Err(not_found("Product", product.id)),
        };
        async { result }
    }

    fn restock(
        &self,
        id: ProductId,
        amount: u32,
    ) -> impl Future<Output = Result<Product, MiniShopError>> + Send {
        let mut store = self.0.products.lock().unwrap();
        let result = match store.get_mut(&id) {
            Some(product) => {
                product.restock(amount);
                Ok(product.clone())
            }
            None => Err(not_found("Product", id)),
        };
        async { result }
    }

    fn delete(&self, id: ProductId) -> impl Future<Output = Result<(), MiniShopError>> + Send {
        let in_use = self
            .0
            .orders
            .lock()
            .unwrap()
            .values()
            .any(|order| order.product_id == id);
        let result = if in_use {
            Err(ConflictError::InUse {
                entity: "Product",
                id: id.to_string(),
            }
            .into())
        } else {
            self.0.products.lock().unwrap().remove(&id);
            Ok(())
        };
        async { result }
    }
}

impl OrderRepository for InMemoryOrderRepo {
    fn place(&self, order: Order) -> impl Future<Output = Result<Order, MiniShopError>> + Send {
        let mut products = self.0.products.lock().unwrap();
        let result = match products.get_mut(&order.product_id) {
            Some(product) => product.reserve(order.quantity).map(|()| {
                self.0
                    .orders
                    .lock()
                    .unwrap()
                    .insert(order.id, order.clone());
                order
            }),
            None => Err(not_found("Product", order.product_id)),
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, MiniShopError>> + Send {
        let result = self.0.orders.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Order>, MiniShopError>> + Send {
        let mut result: Vec<Order> = self.0.orders.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        async { Ok(result) }
    }

    fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<Order>, MiniShopError>> + Send {
        let result: Vec<Order> = self
            .0
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn delete(&self, id: OrderId) -> impl Future<Output = Result<(), MiniShopError>> + Send {
        self.0.orders.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

impl UserRepository for InMemoryUserRepo {
    fn create(&self, user: User) -> impl Future<Output = Result<User, MiniShopError>> + Send {
        let mut store = self.0.users.lock().unwrap();
        let duplicate = store.values().find_map(|existing| {
            if existing.email == user.email {
                Some("email")
            } else if existing.username == user.username {
                Some("username")
            } else {
                None
            }
        });
        let result = match duplicate {
            Some(field) => Err(ConflictError::Duplicate {
                entity: "User",
                field,
            }
            .into()),
            None => {
                store.insert(user.id, user.clone());
                Ok(user)
            }
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send {
        let result = self.0.users.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send {
        let result = self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned();
        async { Ok(result) }
    }

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, MiniShopError>> + Send {
        let result = self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned();
        async { Ok(result) }
    }

    fn update(&self, user: User) -> impl Future<Output = Result<User, MiniShopError>> + Send {
        self.0.users.lock().unwrap().insert(user.id, user.clone());
        async { Ok(user) }
    }
}

/// Mailer that records every message as `(kind, email, code)`.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<(&'static str, String, String)>>>,
}

impl RecordingMailer {
    /// Last code sent to `email` for the given message kind.
    pub fn last_code(&self, kind: &str, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, to, _)| *k == kind && to == email)
            .map(|(_, _, code)| code.clone())
    }
}

impl Mailer for RecordingMailer {
    fn send_verification_code(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), MiniShopError>> + Send {
        self.sent
            .lock()
            .unwrap()
            .push(("verification", email.to_string(), code.to_string()));
        async { Ok(()) }
    }

    fn send_recovery_code(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), MiniShopError>> + Send {
        self.sent
            .lock()
            .unwrap()
            .push(("recovery", email.to_string(), code.to_string()));
        async { Ok(()) }
    }
}
