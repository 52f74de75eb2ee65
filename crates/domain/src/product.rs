//! Product: a catalog entry that is either a laptop or a phone.
//!
//! All products share the same commercial and hardware fields; the
//! category-specific ones live in [`ProductKind`]. Storage maps this to one
//! common table plus one table per category.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConflictError, MiniShopError, ValidationError};
use crate::id::ProductId;

/// Laptop-specific attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaptopSpec {
    pub network_interface: String,
    pub hard_drive: String,
    pub ports: String,
}

/// Phone-specific attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneSpec {
    pub sim_type: String,
    pub cellular_connectivity: String,
    pub location_features: String,
}

/// The concrete category of a product with its extra attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    Laptop(LaptopSpec),
    Phone(PhoneSpec),
}

impl ProductKind {
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Laptop(_) => Category::Laptop,
            Self::Phone(_) => Category::Phone,
        }
    }
}

/// Product category without attributes, used to filter listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Laptop,
    Phone,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Laptop => "laptop",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, thiserror::Error)]
#[error("unknown product category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "laptop" => Ok(Self::Laptop),
            "phone" => Ok(Self::Phone),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// A sellable product with its current stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub brand: String,
    pub model: String,
    /// Screen diagonal in inches.
    pub display_size: f64,
    /// Weight in grams.
    pub weight: u32,
    pub operating_system: String,
    pub camera: String,
    pub wifi: String,
    pub price: Decimal,
    pub description: String,
    pub stock_number: u32,
    pub kind: ProductKind,
}

impl Product {
    /// Start building a laptop.
    #[must_use]
    pub fn laptop(spec: LaptopSpec) -> ProductBuilder {
        ProductBuilder::new(ProductKind::Laptop(spec))
    }

    /// Start building a phone.
    #[must_use]
    pub fn phone(spec: PhoneSpec) -> ProductBuilder {
        ProductBuilder::new(ProductKind::Phone(spec))
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] when `model` is blank, or when
    /// `price` or `display_size` is negative.
    pub fn validate(&self) -> Result<(), MiniShopError> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::EmptyModel.into());
        }
        if self.price < Decimal::ZERO {
            return Err(ValidationError::NegativePrice.into());
        }
        if self.display_size < 0.0 || self.display_size.is_nan() {
            return Err(ValidationError::NegativeDisplaySize.into());
        }
        Ok(())
    }

    /// Check that `quantity` units can be taken from stock.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InsufficientStock`] when the stock is lower
    /// than `quantity`.
    pub fn ensure_available(&self, quantity: u32) -> Result<(), ConflictError> {
        if self.stock_number < quantity {
            return Err(ConflictError::InsufficientStock {
                model: self.model.clone(),
                requested: quantity,
                available: self.stock_number,
            });
        }
        Ok(())
    }

    /// Take `quantity` units out of stock.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroQuantity`] for a zero quantity and
    /// [`ConflictError::InsufficientStock`] when stock would go negative.
    /// Stock is left untouched on error.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), MiniShopError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }
        self.ensure_available(quantity)?;
        self.stock_number -= quantity;
        Ok(())
    }

    /// Add `amount` units to stock.
    pub fn restock(&mut self, amount: u32) {
        self.stock_number = self.stock_number.saturating_add(amount);
    }
}

/// Step-by-step builder for [`Product`].
#[derive(Debug)]
pub struct ProductBuilder {
    id: Option<ProductId>,
    brand: String,
    model: String,
    display_size: f64,
    weight: u32,
    operating_system: String,
    camera: String,
    wifi: String,
    price: Decimal,
    description: String,
    stock_number: u32,
    kind: ProductKind,
}

impl ProductBuilder {
    fn new(kind: ProductKind) -> Self {
        Self {
            id: None,
            brand: String::new(),
            model: String::new(),
            display_size: 0.0,
            weight: 0,
            operating_system: String::new(),
            camera: String::new(),
            wifi: String::new(),
            price: Decimal::ZERO,
            description: String::new(),
            stock_number: 0,
            kind,
        }
    }

    #[must_use]
    pub fn id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn display_size(mut self, display_size: f64) -> Self {
        self.display_size = display_size;
        self
    }

    #[must_use]
    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn operating_system(mut self, operating_system: impl Into<String>) -> Self {
        self.operating_system = operating_system.into();
        self
    }

    #[must_use]
    pub fn camera(mut self, camera: impl Into<String>) -> Self {
        self.camera = camera.into();
        self
    }

    #[must_use]
    pub fn wifi(mut self, wifi: impl Into<String>) -> Self {
        self.wifi = wifi.into();
        self
    }

    #[must_use]
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn stock_number(mut self, stock_number: u32) -> Self {
        self.stock_number = stock_number;
        self
    }

    /// Consume the builder, validate, and return a [`Product`].
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] if any invariant fails.
    pub fn build(self) -> Result<Product, MiniShopError> {
        let product = Product {
            id: self.id.unwrap_or_default(),
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            display_size: self.display_size,
            weight: self.weight,
            operating_system: self.operating_system,
            camera: self.camera,
            wifi: self.wifi,
            price: self.price,
            description: self.description,
            stock_number: self.stock_number,
            kind: self.kind,
        };
        product.validate()?;
        Ok(product)
    }
}
