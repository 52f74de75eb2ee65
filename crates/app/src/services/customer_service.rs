//! Customer service: use-cases for managing customer records.

use minishop_domain::customer::Customer;
use minishop_domain::error::{MiniShopError, NotFoundError};
use minishop_domain::id::CustomerId;
use minishop_domain::search::SearchTerm;

use crate::ports::CustomerRepository;

/// Application service for customer CRUD operations.
pub struct CustomerService<R> {
    repo: R,
}

impl<R: CustomerRepository> CustomerService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new customer after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, customer), fields(customer_name = %customer.name))]
    pub async fn create_customer(&self, customer: Customer) -> Result<Customer, MiniShopError> {
        customer.validate()?;
        let created = self.repo.create(customer).await?;
        tracing::info!(customer_id = %created.id, "customer created");
        Ok(created)
    }

    /// Look up a customer by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when no customer with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, MiniShopError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Customer",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all customers.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, MiniShopError> {
        self.repo.get_all().await
    }

    /// Customers whose name contains `query`. A blank query matches nobody.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn search_customers(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<Customer>, MiniShopError> {
        match SearchTerm::parse(query) {
            Some(term) => self.repo.search_by_name(&term).await,
            None => Ok(Vec::new()),
        }
    }

    /// Update an existing customer.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] if invariants fail,
    /// [`MiniShopError::NotFound`] if the customer is gone, or a storage error.
    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id))]
    pub async fn update_customer(&self, customer: Customer) -> Result<Customer, MiniShopError> {
        customer.validate()?;
        self.repo.update(customer).await
    }

    /// Delete a customer together with their orders.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when the customer does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), MiniShopError> {
        self.get_customer(id).await?;
        self.repo.delete(id).await
    }
}
