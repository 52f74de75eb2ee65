//! `SQLite` implementation of [`CustomerRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use minishop_app::ports::CustomerRepository;
use minishop_domain::customer::Customer;
use minishop_domain::error::{MiniShopError, NotFoundError};
use minishop_domain::id::CustomerId;
use minishop_domain::search::SearchTerm;

use crate::error::StorageError;
use crate::row::parse;

/// Wrapper for converting database rows into domain [`Customer`].
struct Wrapper(Customer);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Customer> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;

        Ok(Self(Customer {
            id: parse(&id)?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            phone_number: row.try_get("phone_number")?,
            email: row.try_get("email")?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO customers (id, name, address, phone_number, email) VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM customers WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM customers ORDER BY name";
const SEARCH_BY_NAME: &str =
    r"SELECT * FROM customers WHERE LOWER(name) LIKE ? ESCAPE '\' ORDER BY name";
const UPDATE: &str =
    "UPDATE customers SET name = ?, address = ?, phone_number = ?, email = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM customers WHERE id = ?";

/// `SQLite`-backed customer repository.
#[derive(Clone)]
pub struct SqliteCustomerRepository {
    pool: SqlitePool,
}

impl SqliteCustomerRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CustomerRepository for SqliteCustomerRepository {
    fn create(
        &self,
        customer: Customer,
    ) -> impl Future<Output = Result<Customer, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(customer.id.to_string())
                .bind(&customer.name)
                .bind(&customer.address)
                .bind(&customer.phone_number)
                .bind(&customer.email)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(customer)
        }
    }

    fn get_by_id(
        &self,
        id: CustomerId,
    ) -> impl Future<Output = Result<Option<Customer>, MiniShopError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Customer>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn search_by_name(
        &self,
        term: &SearchTerm,
    ) -> impl Future<Output = Result<Vec<Customer>, MiniShopError>> + Send {
        let pool = self.pool.clone();
        let pattern = term.like_pattern();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SEARCH_BY_NAME)
                .bind(pattern)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        customer: Customer,
    ) -> impl Future<Output = Result<Customer, MiniShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE)
                .bind(&customer.name)
                .bind(&customer.address)
                .bind(&customer.phone_number)
                .bind(&customer.email)
                .bind(customer.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Customer",
                    id: customer.id.to_string(),
                }
                .into());
            }
            Ok(customer)
        }
    }

    fn delete(&self, id: CustomerId) -> impl Future<Output = Result<(), MiniShopError>> + Send {
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
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteCustomerRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteCustomerRepository::new(db.pool().clone())
    }

    fn customer(name: &str) -> Customer {
        Customer::builder()
            .name(name)
            .address("12 rue de la Paix")
            .phone_number("+33 1 23 45 67 89")
            .email("someone@example.com")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_customer() {
        let repo = setup().await;
        let created = repo.create(customer("Alice Martin")).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn should_return_none_when_customer_not_found() {
        let repo = setup().await;
        assert!(repo.get_by_id(CustomerId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_customers_sorted_by_name() {
        let repo = setup().await;
        repo.create(customer("Zoe")).await.unwrap();
        repo.create(customer("Alice")).await.unwrap();

        let names: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Alice", "Zoe"]);
    }

    #[tokio::test]
    async fn should_search_by_partial_name_ignoring_case() {
        let repo = setup().await;
        repo.create(customer("Alice Martin")).await.unwrap();
        repo.create(customer("Bob Martinez")).await.unwrap();
        repo.create(customer("Carol Stone")).await.unwrap();

        let term = SearchTerm::parse(Some("MARTIN")).unwrap();
        let found = repo.search_by_name(&term).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn should_agree_with_in_memory_matching_on_accented_names() {
        let repo = setup().await;
        repo.create(customer("Élodie Durand")).await.unwrap();

        for query in ["élodie", "ÉLODIE", "élodie durand"] {
            let term = SearchTerm::parse(Some(query)).unwrap();
            let found = repo.search_by_name(&term).await.unwrap();
            assert_eq!(
                found.len(),
                usize::from(term.matches("Élodie Durand")),
                "query {query:?}"
            );
        }
    }

    #[tokio::test]
    async fn should_treat_like_wildcards_literally() {
        let repo = setup().await;
        repo.create(customer("100% Cotton Ltd")).await.unwrap();
        repo.create(customer("Plain Ltd")).await.unwrap();

        let term = SearchTerm::parse(Some("%")).unwrap();
        let found = repo.search_by_name(&term).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "100% Cotton Ltd");
    }

    #[tokio::test]
    async fn should_update_customer_when_exists() {
        let repo = setup().await;
        let mut created = repo.create(customer("Alice")).await.unwrap();

        created.email = "alice@example.org".to_string();
        repo.update(created.clone()).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.org");
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_customer() {
        let repo = setup().await;
        let result = repo.update(customer("Ghost")).await;
        assert!(matches!(result, Err(MiniShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_customer_when_exists() {
        let repo = setup().await;
        let created = repo.create(customer("Alice")).await.unwrap();

        repo.delete(created.id).await.unwrap();

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
