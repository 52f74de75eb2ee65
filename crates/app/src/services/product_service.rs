//! Product service: use-cases for the laptop and phone catalog.

use minishop_domain::error::{MiniShopError, NotFoundError, ValidationError};
use minishop_domain::id::ProductId;
use minishop_domain::product::{Category, Product};
use minishop_domain::search::SearchTerm;

use crate::ports::ProductRepository;

/// Application service for catalog and stock operations.
pub struct ProductService<R> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, product), fields(model = %product.model, category = %product.category()))]
    pub async fn create_product(&self, product: Product) -> Result<Product, MiniShopError> {
        product.validate()?;
        let created = self.repo.create(product).await?;
        tracing::info!(product_id = %created.id, stock = created.stock_number, "product created");
        Ok(created)
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when no product with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, MiniShopError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Product",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List every product regardless of category.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_products(&self) -> Result<Vec<Product>, MiniShopError> {
        self.repo.get_all(None).await
    }

    /// List the products of one category.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_category(&self, category: Category) -> Result<Vec<Product>, MiniShopError> {
        self.repo.get_all(Some(category)).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_laptops(&self) -> Result<Vec<Product>, MiniShopError> {
        self.list_category(Category::Laptop).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_phones(&self) -> Result<Vec<Product>, MiniShopError> {
        self.list_category(Category::Phone).await
    }

    /// Products of `category` whose model contains `query`.
    ///
    /// A blank query lists the whole category.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn search_category(
        &self,
        category: Category,
        query: Option<&str>,
    ) -> Result<Vec<Product>, MiniShopError> {
        match SearchTerm::parse(query) {
            Some(term) => self.repo.search_by_model(Some(category), &term).await,
            None => self.list_category(category).await,
        }
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn search_laptops(&self, query: Option<&str>) -> Result<Vec<Product>, MiniShopError> {
        self.search_category(Category::Laptop, query).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn search_phones(&self, query: Option<&str>) -> Result<Vec<Product>, MiniShopError> {
        self.search_category(Category::Phone, query).await
    }

    /// Replace a product's details.
    ///
    /// The stored stock level is kept: stock moves only through orders and
    /// [`restock`](Self::restock). A laptop stays a laptop.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] if invariants fail or the
    /// category differs from the stored one, [`MiniShopError::NotFound`] if
    /// the product is gone, or a storage error.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update_product(&self, product: Product) -> Result<Product, MiniShopError> {
        product.validate()?;
        let existing = self.get_product(product.id).await?;
        if existing.category() != product.category() {
            return Err(ValidationError::CategoryChange {
                from: existing.category(),
                to: product.category(),
            }
            .into());
        }
        self.repo.update(product).await
    }

    /// Add `amount` units to a product's stock.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when the product does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn restock(&self, id: ProductId, amount: u32) -> Result<Product, MiniShopError> {
        let product = self.repo.restock(id, amount).await?;
        tracing::info!(stock = product.stock_number, "product restocked");
        Ok(product)
    }

    /// Remove a product from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::NotFound`] when the product does not exist,
    /// [`MiniShopError::Conflict`] while orders reference it, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), MiniShopError> {
        self.get_product(id).await?;
        self.repo.delete(id).await
    }
}
