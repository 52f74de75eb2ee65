//! Customer: a person or company that places orders.

use serde::{Deserialize, Serialize};

use crate::error::{MiniShopError, ValidationError};
use crate::id::CustomerId;

/// A customer record with contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

impl Customer {
    /// Create a builder for constructing a [`Customer`].
    #[must_use]
    pub fn builder() -> CustomerBuilder {
        CustomerBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] when `name` is blank or when a
    /// non-empty `email` has no `@`.
    pub fn validate(&self) -> Result<(), MiniShopError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.email.is_empty() && !is_plausible_email(&self.email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        Ok(())
    }
}

/// Loose email shape check: something on each side of a single `@`.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Step-by-step builder for [`Customer`].
#[derive(Debug, Default)]
pub struct CustomerBuilder {
    id: Option<CustomerId>,
    name: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
    email: Option<String>,
}

impl CustomerBuilder {
    #[must_use]
    pub fn id(mut self, id: CustomerId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Consume the builder, validate, and return a [`Customer`].
    ///
    /// Text fields are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] if `name` is missing or blank,
    /// or if `email` is malformed.
    pub fn build(self) -> Result<Customer, MiniShopError> {
        let customer = Customer {
            id: self.id.unwrap_or_default(),
            name: trimmed(self.name),
            address: trimmed(self.address),
            phone_number: trimmed(self.phone_number),
            email: trimmed(self.email),
        };
        customer.validate()?;
        Ok(customer)
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
