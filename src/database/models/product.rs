use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::FieldErrors;

pub const NAME_MIN_CHARS: usize = 4;
pub const NAME_MAX_CHARS: usize = 20;

/// Stored product row, also the JSON representation served by `/api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

/// Validated product input. `id` is `None` for a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub id: Option<i64>,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64, quantity: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Checks the field constraints that both storage backends rely on.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let name_chars = self.name.chars().count();
        if name_chars == 0 {
            errors.insert("name".to_string(), "Name is required".to_string());
        } else if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_chars) {
            errors.insert(
                "name".to_string(),
                format!("Name must be between {} and {} characters", NAME_MIN_CHARS, NAME_MAX_CHARS),
            );
        }

        if !self.price.is_finite() {
            errors.insert("price".to_string(), "Price must be a number".to_string());
        } else if self.price < 0.0 {
            errors.insert("price".to_string(), "Price must be at least 0".to_string());
        }

        if self.quantity < 0 {
            errors.insert("quantity".to_string(), "Quantity must be at least 0".to_string());
        }

        errors
    }

    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// Raw create/edit form submission. Numbers arrive as text so that bad input
/// becomes a field error instead of a rejected request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub quantity: String,
}

impl ProductForm {
    pub fn validate(&self) -> Result<ProductDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let id = match self.id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.insert("id".to_string(), format!("Invalid product id: {}", raw));
                    None
                }
            },
        };

        let price = match self.price.trim() {
            "" => {
                errors.insert("price".to_string(), "Price is required".to_string());
                0.0
            }
            raw => raw.parse::<f64>().unwrap_or_else(|_| {
                errors.insert("price".to_string(), "Price must be a number".to_string());
                0.0
            }),
        };

        let quantity = match self.quantity.trim() {
            "" => {
                errors.insert("quantity".to_string(), "Quantity is required".to_string());
                0
            }
            raw => raw.parse::<i32>().unwrap_or_else(|_| {
                errors.insert("quantity".to_string(), "Quantity must be a whole number".to_string());
                0
            }),
        };

        let draft = ProductDraft {
            id,
            name: self.name.clone(),
            price,
            quantity,
        };

        // Parse failures take precedence over range checks on the same field
        for (field, message) in draft.field_errors() {
            errors.entry(field).or_insert(message);
        }

        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(errors)
        }
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.to_string()),
            name: product.name.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
        }
    }
}
