//! Catalog products and their input forms.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::types::{Price, ProductId, ProductStatus};
use crate::validation::{ValidationErrors, required_text};

const NAME_REQUIRED: &str = "Product name is required";
const CATEGORY_REQUIRED: &str = "Category is required";
const PRICE_INVALID: &str = "Valid price required";
const STOCK_INVALID: &str = "Valid stock required";
const STATUS_INVALID: &str = "Status required";

/// A catalog product as persisted in the `products` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    pub status: ProductStatus,
}

/// Validated fields for a product that has not been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    pub status: ProductStatus,
}

/// A partial product update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<u32>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.status.is_none()
    }
}

impl Entity for Product {
    type Id = ProductId;
    type New = NewProduct;
    type Patch = ProductPatch;

    const SLOT: &'static str = "products";
    const KIND: &'static str = "product";

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn generate_id() -> ProductId {
        ProductId::generate()
    }

    fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            category: new.category,
            price: new.price,
            stock: new.stock,
            status: new.status,
        }
    }

    fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.category.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Raw product input, as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: String,
    pub status: String,
}

impl ProductForm {
    /// Check every field. Empty when the form can be submitted.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        self.parse().err().unwrap_or_default()
    }

    /// Validate and convert into [`NewProduct`].
    ///
    /// # Errors
    ///
    /// Returns the full set of field errors if any rule fails.
    pub fn parse(&self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.check("name", required_text(&self.name, NAME_REQUIRED));
        let category = errors.check("category", required_text(&self.category, CATEGORY_REQUIRED));
        let price = errors.check("price", parse_price(&self.price));
        let stock = errors.check("stock", parse_stock(&self.stock));
        let status = errors.check("status", parse_status(&self.status));

        match (name, category, price, stock, status) {
            (Some(name), Some(category), Some(price), Some(stock), Some(status))
                if errors.is_empty() =>
            {
                Ok(NewProduct {
                    name,
                    category,
                    price,
                    stock,
                    status,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            status: product.status.to_string(),
        }
    }
}

/// Raw input for a partial update; only present fields are checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatchForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub status: Option<String>,
}

impl ProductPatchForm {
    /// Check the fields that are present.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        self.parse().err().unwrap_or_default()
    }

    /// Validate and convert into [`ProductPatch`].
    ///
    /// # Errors
    ///
    /// Returns the field errors for any present field that fails its rule.
    pub fn parse(&self) -> Result<ProductPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let patch = ProductPatch {
            name: self
                .name
                .as_deref()
                .and_then(|v| errors.check("name", required_text(v, NAME_REQUIRED))),
            category: self
                .category
                .as_deref()
                .and_then(|v| errors.check("category", required_text(v, CATEGORY_REQUIRED))),
            price: self
                .price
                .as_deref()
                .and_then(|v| errors.check("price", parse_price(v))),
            stock: self
                .stock
                .as_deref()
                .and_then(|v| errors.check("stock", parse_stock(v))),
            status: self
                .status
                .as_deref()
                .and_then(|v| errors.check("status", parse_status(v))),
        };
        if errors.is_empty() { Ok(patch) } else { Err(errors) }
    }
}

/// Validate a complete product form.
#[must_use]
pub fn validate_product(form: &ProductForm) -> ValidationErrors {
    form.validate()
}

fn parse_price(value: &str) -> Result<Price, &'static str> {
    Price::parse(value).map_err(|_| PRICE_INVALID)
}

fn parse_stock(value: &str) -> Result<u32, &'static str> {
    value.trim().parse::<u32>().map_err(|_| STOCK_INVALID)
}

fn parse_status(value: &str) -> Result<ProductStatus, &'static str> {
    value.parse().map_err(|_| STATUS_INVALID)
}
