//! `SQLite` implementation of [`ProductRepository`].
//!
//! Products use joined-table inheritance: common columns live in `products`,
//! category attributes in `laptops` or `phones`, keyed by product id.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, Sqlite, SqliteExecutor, SqlitePool, Transaction};

use minishop_app::ports::ProductRepository;
use minishop_domain::error::{ConflictError, MiniShopError, NotFoundError, ValidationError};
use minishop_domain::id::ProductId;
use minishop_domain::product::{Category, LaptopSpec, PhoneSpec, Product, ProductKind};
use minishop_domain::search::SearchTerm;

use crate::error::StorageError;
use crate::row::{decode_err, parse, parse_decimal, to_u32};

/// Wrapper for converting joined rows into domain [`Product`].
struct Wrapper(Product);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Product> {
        value.map(|w| w.0)
    }
}

fn text(row: &SqliteRow, column: &str) -> Result<String, sqlx::Error> {
    let value: Option<String> = row.try_get(column)?;
    Ok(value.unwrap_or_default())
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let kind: String = row.try_get("kind")?;
        let price: String = row.try_get("price")?;
        let weight: i64 = row.try_get("weight")?;
        let stock_number: i64 = row.try_get("stock_number")?;

        let kind = match kind.parse::<Category>().map_err(decode_err)? {
            Category::Laptop => ProductKind::Laptop(LaptopSpec {
                network_interface: text(row, "network_interface")?,
                hard_drive: text(row, "hard_drive")?,
                ports: text(row, "ports")?,
            }),
            Category::Phone => ProductKind::Phone(PhoneSpec {
                sim_type: text(row, "sim_type")?,
                cellular_connectivity: text(row, "cellular_connectivity")?,
                location_features: text(row, "location_features")?,
            }),
        };

        Ok(Self(Product {
            id: parse(&id)?,
            brand: row.try_get("brand")?,
            model: row.try_get("model")?,
            display_size: row.try_get("display_size")?,
            weight: to_u32(weight)?,
            operating_system: row.try_get("operating_system")?,
            camera: row.try_get("camera")?,
            wifi: row.try_get("wifi")?,
            price: parse_decimal(&price)?,
            description: row.try_get("description")?,
            stock_number: to_u32(stock_number)?,
            kind,
        }))
    }
}

const SELECT_JOINED: &str = r"
    SELECT p.*,
        l.network_interface, l.hard_drive, l.ports,
        ph.sim_type, ph.cellular_connectivity, ph.location_features
    FROM products p
    LEFT JOIN laptops l ON l.product_id = p.id
    LEFT JOIN phones ph ON ph.product_id = p.id
";

const INSERT: &str = r"
    INSERT INTO products (id, kind, brand, model, display_size, weight, operating_system,
        camera, wifi, price, description, stock_number)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";
const INSERT_LAPTOP: &str =
    "INSERT INTO laptops (product_id, network_interface, hard_drive, ports) VALUES (?, ?, ?, ?)";
const INSERT_PHONE: &str = "INSERT INTO phones (product_id, sim_type, cellular_connectivity, location_features) VALUES (?, ?, ?, ?)";
const UPDATE: &str = r"
    UPDATE products SET brand = ?, model = ?, display_size = ?, weight = ?,
        operating_system = ?, camera = ?, wifi = ?, price = ?, description = ?
    WHERE id = ? AND kind = ?
";
const DELETE_LAPTOP: &str = "DELETE FROM laptops WHERE product_id = ?";
const DELETE_PHONE: &str = "DELETE FROM phones WHERE product_id = ?";
const RESTOCK: &str =
    "UPDATE products SET stock_number = MIN(stock_number + ?, 4294967295) WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM products WHERE id = ?";

/// `SQLite`-backed product repository.
#[derive(Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn select_query(category: Option<Category>, search: bool) -> String {
    let mut clauses = Vec::new();
    if category.is_some() {
        clauses.push("p.kind = ?");
    }
    if search {
        clauses.push(r"LOWER(p.model) LIKE ? ESCAPE '\'");
    }
    let mut query = SELECT_JOINED.to_string();
    if !clauses.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&clauses.join(" AND "));
    }
    query.push_str(" ORDER BY p.brand, p.model");
    query
}

async fn fetch_one<'e>(
    executor: impl SqliteExecutor<'e>,
    id: ProductId,
) -> Result<Option<Product>, StorageError> {
    let query = format!("{SELECT_JOINED} WHERE p.id = ?");
    let row: Option<Wrapper> = sqlx::query_as(&query)
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;
    Ok(Wrapper::maybe(row))
}

async fn insert_kind(
    tx: &mut Transaction<'_, Sqlite>,
    product: &Product,
) -> Result<(), StorageError> {
    let id = product.id.to_string();
    match &product.kind {
        ProductKind::Laptop(spec) => {
            sqlx::query(INSERT_LAPTOP)
                .bind(id)
                .bind(&spec.network_interface)
                .bind(&spec.hard_drive)
                .bind(&spec.ports)
                .execute(&mut **tx)
                .await?;
        }
        ProductKind::Phone(spec) => {
            sqlx::query(INSERT_PHONE)
                .bind(id)
                .bind(&spec.sim_type)
                .bind(&spec.cellular_connectivity)
                .bind(&spec.location_features)
                .execute(&mut **tx)
                .await?;
        }
    }
    Ok(())
}

impl ProductRepository for SqliteProductRepository {
    fn create(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Product, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            sqlx::query(INSERT)
                .bind(product.id.to_string())
                .bind(product.category().as_str())
                .bind(&product.brand)
                .bind(&product.model)
                .bind(product.display_size)
                .bind(i64::from(product.weight))
                .bind(&product.operating_system)
                .bind(&product.camera)
                .bind(&product.wifi)
                .bind(product.price.to_string())
                .bind(&product.description)
                .bind(i64::from(product.stock_number))
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            insert_kind(&mut tx, &product).await?;

            tx.commit().await.map_err(StorageError::from)?;
            Ok(product)
        }
    }

    fn get_by_id(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(fetch_one(&pool, id).await?) }
    }

    fn get_all(
        &self,
        category: Option<Category>,
    ) -> impl Future<Output = Result<Vec<Product>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let query = select_query(category, false);
            let mut q = sqlx::query_as::<_, Wrapper>(&query);
            if let Some(category) = category {
                q = q.bind(category.as_str());
            }
            let rows = q.fetch_all(&pool).await.map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn search_by_model(
        &self,
        category: Option<Category>,
        term: &SearchTerm,
    ) -> impl Future<Output = Result<Vec<Product>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        let pattern = term.like_pattern();
        async move {
            let query = select_query(category, true);
            let mut q = sqlx::query_as::<_, Wrapper>(&query);
            if let Some(category) = category {
                q = q.bind(category.as_str());
            }
            let rows = q
                .bind(pattern)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Product, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let id = product.id.to_string();
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            // stock_number is owned by order placement and restocking
            let result = sqlx::query(UPDATE)
                .bind(&product.brand)
                .bind(&product.model)
                .bind(product.display_size)
                .bind(i64::from(product.weight))
                .bind(&product.operating_system)
                .bind(&product.camera)
                .bind(&product.wifi)
                .bind(product.price.to_string())
                .bind(&product.description)
                .bind(&id)
                .bind(product.category().as_str())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            if result.rows_affected() == 0 {
                return Err(match fetch_one(&mut *tx, product.id).await? {
                    Some(stored) => ValidationError::CategoryChange {
                        from: stored.category(),
                        to: product.category(),
                    }
                    .into(),
                    None => NotFoundError {
                        entity: "Product",
                        id,
                    }
                    .into(),
                });
            }

            for statement in [DELETE_LAPTOP, DELETE_PHONE] {
                sqlx::query(statement)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
            }
            insert_kind(&mut tx, &product).await?;
            let stored = fetch_one(&mut *tx, product.id).await?;

            tx.commit().await.map_err(StorageError::from)?;
            stored.ok_or_else(|| {
                NotFoundError {
                    entity: "Product",
                    id,
                }
                .into()
            })
        }
    }

    fn restock(
        &self,
        id: ProductId,
        amount: u32,
    ) -> impl Future<Output = Result<Product, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(RESTOCK)
                .bind(i64::from(amount))
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            fetch_one(&pool, id).await?.ok_or_else(|| {
                NotFoundError {
                    entity: "Product",
                    id: id.to_string(),
                }
                .into()
            })
        }
    }

    fn delete(&self, id: ProductId) -> impl Future<Output = Result<(), MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from);

            match result {
                Ok(_) => Ok(()),
                Err(err) if err.is_foreign_key_violation() => Err(ConflictError::InUse {
                    entity: "Product",
                    id: id.to_string(),
                }
                .into()),
                Err(err) => Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use minishop_app::ports::{CustomerRepository, OrderRepository};
    use minishop_domain::customer::Customer;
    use minishop_domain::order::Order;

    use super::*;
    use crate::pool::Config;
    use crate::{SqliteCustomerRepository, SqliteOrderRepository};

    async fn setup() -> SqliteProductRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteProductRepository::new(db.pool().clone())
    }

    fn laptop(model: &str) -> Product {
        Product::laptop(LaptopSpec {
            network_interface: "Wi-Fi 6E".to_string(),
            hard_drive: "1 TB SSD".to_string(),
            ports: "2x USB-C".to_string(),
        })
        .brand("Dell")
        .model(model)
        .display_size(13.4)
        .weight(1190)
        .price(Decimal::new(149_999, 2))
        .stock_number(3)
        .build()
        .unwrap()
    }

    fn phone(model: &str) -> Product {
        Product::phone(PhoneSpec {
            sim_type: "eSIM".to_string(),
            cellular_connectivity: "5G".to_string(),
            location_features: "GPS, Galileo".to_string(),
        })
        .brand("Google")
        .model(model)
        .price(Decimal::new(79_900, 2))
        .stock_number(10)
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_laptop_with_its_attributes() {
        let repo = setup().await;
        let created = repo.create(laptop("XPS 13")).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.price.to_string(), "1499.99");
    }

    #[tokio::test]
    async fn should_create_and_retrieve_phone_with_its_attributes() {
        let repo = setup().await;
        let created = repo.create(phone("Pixel 9")).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn should_filter_listing_by_category() {
        let repo = setup().await;
        repo.create(laptop("XPS 13")).await.unwrap();
        repo.create(phone("Pixel 9")).await.unwrap();
        repo.create(phone("Pixel 9 Pro")).await.unwrap();

        assert_eq!(repo.get_all(None).await.unwrap().len(), 3);
        assert_eq!(repo.get_all(Some(Category::Laptop)).await.unwrap().len(), 1);
        assert_eq!(repo.get_all(Some(Category::Phone)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_search_model_within_category() {
        let repo = setup().await;
        repo.create(laptop("Pixelbook Go")).await.unwrap();
        repo.create(phone("Pixel 9")).await.unwrap();

        let term = SearchTerm::parse(Some("pixel")).unwrap();
        let phones = repo
            .search_by_model(Some(Category::Phone), &term)
            .await
            .unwrap();
        assert_eq!(phones.len(), 1);
        assert_eq!(phones[0].model, "Pixel 9");

        let all = repo.search_by_model(None, &term).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn should_update_common_and_category_attributes() {
        let repo = setup().await;
        let mut product = repo.create(laptop("XPS 13")).await.unwrap();

        product.price = Decimal::new(129_900, 2);
        product.kind = ProductKind::Laptop(LaptopSpec {
            network_interface: "Wi-Fi 7".to_string(),
            hard_drive: "2 TB SSD".to_string(),
            ports: "3x USB-C".to_string(),
        });
        repo.update(product.clone()).await.unwrap();

        let fetched = repo.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn should_keep_stock_taken_by_orders_when_saving_a_stale_copy() {
        let repo = setup().await;
        let mut product = laptop("XPS 13");
        product.stock_number = 5;
        let stale = repo.create(product).await.unwrap();

        let customer = SqliteCustomerRepository::new(repo.pool.clone())
            .create(Customer::builder().name("Ada Lovelace").build().unwrap())
            .await
            .unwrap();
        SqliteOrderRepository::new(repo.pool.clone())
            .place(Order::for_product(&customer, &stale, 3).unwrap())
            .await
            .unwrap();

        let mut edited = stale.clone();
        edited.description = "Now with a backlit keyboard".to_string();
        let saved = repo.update(edited).await.unwrap();

        assert_eq!(saved.stock_number, 2);
        let fetched = repo.get_by_id(stale.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock_number, 2);
        assert_eq!(fetched.description, "Now with a backlit keyboard");
    }

    #[tokio::test]
    async fn should_refuse_turning_a_laptop_into_a_phone() {
        let repo = setup().await;
        let created = repo.create(laptop("XPS 13")).await.unwrap();

        let mut turned = phone("XPS 13");
        turned.id = created.id;
        let result = repo.update(turned).await;

        assert!(matches!(
            result,
            Err(MiniShopError::Validation(ValidationError::CategoryChange {
                from: Category::Laptop,
                to: Category::Phone,
            }))
        ));
        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        let (phones,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM phones")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(phones, 0);
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_product() {
        let repo = setup().await;
        let result = repo.update(phone("Ghost")).await;
        assert!(matches!(result, Err(MiniShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_add_stock_when_restocking() {
        let repo = setup().await;
        let product = repo.create(laptop("XPS 13")).await.unwrap();

        let restocked = repo.restock(product.id, 4).await.unwrap();
        assert_eq!(restocked.stock_number, 7);

        let missing = repo.restock(ProductId::new(), 1).await;
        assert!(matches!(missing, Err(MiniShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_product_and_its_attributes() {
        let repo = setup().await;
        let product = repo.create(phone("Pixel 9")).await.unwrap();

        repo.delete(product.id).await.unwrap();

        assert!(repo.get_by_id(product.id).await.unwrap().is_none());
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM phones")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
