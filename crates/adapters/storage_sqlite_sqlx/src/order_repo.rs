//! `SQLite` implementation of [`OrderRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use minishop_app::ports::OrderRepository;
use minishop_domain::error::{ConflictError, MiniShopError, NotFoundError};
use minishop_domain::id::{CustomerId, OrderId};
use minishop_domain::order::Order;

use crate::error::StorageError;
use crate::row::{format_timestamp, parse, parse_decimal, parse_timestamp, to_u32};

/// Wrapper for converting database rows into domain [`Order`].
struct Wrapper(Order);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Order> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let customer_id: String = row.try_get("customer_id")?;
        let product_id: String = row.try_get("product_id")?;
        let unit_price: String = row.try_get("unit_price")?;
        let quantity: i64 = row.try_get("quantity")?;
        let total_price: String = row.try_get("total_price")?;
        let ordered_at: String = row.try_get("ordered_at")?;

        Ok(Self(Order {
            id: parse(&id)?,
            customer_id: parse(&customer_id)?,
            product_id: parse(&product_id)?,
            product_model: row.try_get("product_model")?,
            unit_price: parse_decimal(&unit_price)?,
            quantity: to_u32(quantity)?,
            total_price: parse_decimal(&total_price)?,
            ordered_at: parse_timestamp(&ordered_at)?,
        }))
    }
}

const TAKE_STOCK: &str =
    "UPDATE products SET stock_number = stock_number - ? WHERE id = ? AND stock_number >= ?";
const SELECT_STOCK: &str = "SELECT model, stock_number FROM products WHERE id = ?";
const INSERT: &str = r"
    INSERT INTO orders (id, customer_id, product_id, product_model, unit_price, quantity,
        total_price, ordered_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM orders WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM orders ORDER BY ordered_at DESC";
const SELECT_BY_CUSTOMER: &str =
    "SELECT * FROM orders WHERE customer_id = ? ORDER BY ordered_at DESC";
const DELETE_BY_ID: &str = "DELETE FROM orders WHERE id = ?";

/// `SQLite`-backed order repository.
#[derive(Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for SqliteOrderRepository {
    fn place(&self, order: Order) -> impl Future<Output = Result<Order, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let product_id = order.product_id.to_string();
            let quantity = i64::from(order.quantity);
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            let taken = sqlx::query(TAKE_STOCK)
                .bind(quantity)
                .bind(&product_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            if taken.rows_affected() == 0 {
                let stock: Option<(String, i64)> = sqlx::query_as(SELECT_STOCK)
                    .bind(&product_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
                return Err(match stock {
                    Some((model, available)) => ConflictError::InsufficientStock {
                        model,
                        requested: order.quantity,
                        available: u32::try_from(available).unwrap_or_default(),
                    }
                    .into(),
                    None => NotFoundError {
                        entity: "Product",
                        id: product_id,
                    }
                    .into(),
                });
            }

            let inserted = sqlx::query(INSERT)
                .bind(order.id.to_string())
                .bind(order.customer_id.to_string())
                .bind(&product_id)
                .bind(&order.product_model)
                .bind(order.unit_price.to_string())
                .bind(quantity)
                .bind(order.total_price.to_string())
                .bind(format_timestamp(&order.ordered_at))
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from);
            if let Err(err) = inserted {
                if err.is_foreign_key_violation() {
                    return Err(NotFoundError {
                        entity: "Customer",
                        id: order.customer_id.to_string(),
                    }
                    .into());
                }
                return Err(err.into());
            }

            tx.commit().await.map_err(StorageError::from)?;
            Ok(order)
        }
    }

    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Order>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<Order>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_CUSTOMER)
                .bind(customer_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn delete(&self, id: OrderId) -> impl Future<Output = Result<(), MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use minishop_app::ports::{CustomerRepository, ProductRepository};
    use minishop_domain::customer::Customer;
    use minishop_domain::id::ProductId;
    use minishop_domain::product::{LaptopSpec, Product};

    use super::*;
    use crate::customer_repo::SqliteCustomerRepository;
    use crate::pool::Config;
    use crate::product_repo::SqliteProductRepository;

    struct Fixture {
        orders: SqliteOrderRepository,
        customers: SqliteCustomerRepository,
        products: SqliteProductRepository,
        customer: Customer,
        product: Product,
    }

    async fn setup(stock: u32) -> Fixture {
        setup_at("sqlite::memory:", stock).await
    }

    async fn setup_at(database_url: &str, stock: u32) -> Fixture {
        let db = Config {
            database_url: database_url.to_string(),
        }
        .build()
        .await
        .unwrap();
        let customers = SqliteCustomerRepository::new(db.pool().clone());
        let products = SqliteProductRepository::new(db.pool().clone());
        let orders = SqliteOrderRepository::new(db.pool().clone());

        let customer = customers
            .create(Customer::builder().name("Alice").build().unwrap())
            .await
            .unwrap();
        let product = products
            .create(
                Product::laptop(LaptopSpec::default())
                    .model("XPS 13")
                    .price(Decimal::new(99_950, 2))
                    .stock_number(stock)
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();

        Fixture {
            orders,
            customers,
            products,
            customer,
            product,
        }
    }

    impl Fixture {
        fn order(&self, quantity: u32) -> Order {
            Order::for_product(&self.customer, &self.product, quantity).unwrap()
        }

        async fn stock(&self) -> u32 {
            self.products
                .get_by_id(self.product.id)
                .await
                .unwrap()
                .unwrap()
                .stock_number
        }
    }

    #[tokio::test]
    async fn should_take_stock_and_store_order() {
        let fx = setup(5).await;

        let placed = fx.orders.place(fx.order(3)).await.unwrap();

        assert_eq!(fx.stock().await, 2);
        let fetched = fx.orders.get_by_id(placed.id).await.unwrap().unwrap();
        assert_eq!(fetched.quantity, 3);
        assert_eq!(fetched.product_model, "XPS 13");
        assert_eq!(fetched.unit_price, Decimal::new(99_950, 2));
        assert_eq!(fetched.total_price, Decimal::new(299_850, 2));
        assert_eq!(fetched.ordered_at.timestamp(), placed.ordered_at.timestamp());
    }

    #[tokio::test]
    async fn should_leave_stock_untouched_when_insufficient() {
        let fx = setup(2).await;

        let result = fx.orders.place(fx.order(3)).await;

        assert!(matches!(
            result,
            Err(MiniShopError::Conflict(ConflictError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }))
        ));
        assert_eq!(fx.stock().await, 2);
        assert!(fx.orders.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_never_oversell_when_orders_race_for_the_last_units() {
        let path = std::env::temp_dir().join(format!("minishop-race-{}.db", ProductId::new()));
        let fx = setup_at(&format!("sqlite:{}", path.display()), 5).await;

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..20 {
            let orders = fx.orders.clone();
            let order = fx.order(1);
            tasks.spawn(async move { orders.place(order).await });
        }

        let (mut placed, mut refused) = (0, 0);
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => placed += 1,
                Err(MiniShopError::Conflict(ConflictError::InsufficientStock { .. })) => {
                    refused += 1;
                }
                Err(err) => panic!("unexpected error: {err:?}"),
            }
        }
        let stock = fx.stock().await;
        let stored = fx.orders.get_all().await.unwrap().len();

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
        assert_eq!((placed, refused), (5, 15));
        assert_eq!(stock, 0);
        assert_eq!(stored, 5);
    }

    #[tokio::test]
    async fn should_return_not_found_when_product_is_gone() {
        let fx = setup(2).await;
        let mut order = fx.order(1);
        order.product_id = ProductId::new();

        let result = fx.orders.place(order).await;
        assert!(matches!(
            result,
            Err(MiniShopError::NotFound(NotFoundError { entity: "Product", .. }))
        ));
    }

    #[tokio::test]
    async fn should_roll_back_stock_when_customer_is_gone() {
        let fx = setup(2).await;
        let mut order = fx.order(1);
        order.customer_id = CustomerId::new();

        let result = fx.orders.place(order).await;
        assert!(matches!(
            result,
            Err(MiniShopError::NotFound(NotFoundError { entity: "Customer", .. }))
        ));
        assert_eq!(fx.stock().await, 2);
    }

    #[tokio::test]
    async fn should_list_orders_newest_first() {
        let fx = setup(10).await;
        let mut first = fx.order(1);
        first.ordered_at -= chrono::Duration::minutes(5);
        let first = fx.orders.place(first).await.unwrap();
        let second = fx.orders.place(fx.order(2)).await.unwrap();

        let ids: Vec<OrderId> = fx
            .orders
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, [second.id, first.id]);
    }

    #[tokio::test]
    async fn should_find_orders_of_customer() {
        let fx = setup(10).await;
        fx.orders.place(fx.order(1)).await.unwrap();

        let other = fx
            .customers
            .create(Customer::builder().name("Bob").build().unwrap())
            .await
            .unwrap();

        assert_eq!(
            fx.orders
                .find_by_customer(fx.customer.id)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(fx.orders.find_by_customer(other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_delete_orders_with_their_customer() {
        let fx = setup(10).await;
        let placed = fx.orders.place(fx.order(1)).await.unwrap();

        fx.customers.delete(fx.customer.id).await.unwrap();

        assert!(fx.orders.get_by_id(placed.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_refuse_deleting_ordered_product() {
        let fx = setup(10).await;
        fx.orders.place(fx.order(1)).await.unwrap();

        let result = fx.products.delete(fx.product.id).await;
        assert!(matches!(
            result,
            Err(MiniShopError::Conflict(ConflictError::InUse { .. }))
        ));
    }

    #[tokio::test]
    async fn should_delete_order_without_restocking() {
        let fx = setup(10).await;
        let placed = fx.orders.place(fx.order(4)).await.unwrap();

        fx.orders.delete(placed.id).await.unwrap();

        assert!(fx.orders.get_by_id(placed.id).await.unwrap().is_none());
        assert_eq!(fx.stock().await, 6);
    }
}
