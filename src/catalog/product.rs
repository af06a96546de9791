//! Product records and JSON catalog ingestion.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VitrinaError};
use crate::util::read_to_string_limited;

/// Stable, unique product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! impl_numeric_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ProductId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

impl_numeric_id!(i32, i64, u32, u64);

/// A catalog product as seen by search.
///
/// Text fields are always present; a missing field is the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
        }
    }

    /// Build a product from a loosely-typed JSON record.
    ///
    /// Returns `None` when the record has no usable identifier. Text fields
    /// that are missing, null or structured become `""`; numbers and booleans
    /// are stringified.
    pub fn from_value(record: &Value) -> Option<Self> {
        let id = match record.get("id")? {
            Value::String(s) if !s.trim().is_empty() => ProductId::new(s.trim()),
            Value::Number(n) => ProductId::new(n.to_string()),
            _ => return None,
        };

        Some(Self {
            id,
            name: text_field(record, "name"),
            description: text_field(record, "description"),
            category: text_field(record, "category"),
        })
    }
}

fn text_field(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// An immutable, ordered product snapshot with unique identifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, keeping the first product for each identifier.
    pub fn new(products: Vec<Product>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(products.len());
        for product in products {
            if seen.insert(product.id.clone()) {
                kept.push(product);
            } else {
                tracing::warn!(id = %product.id, "duplicate product id, keeping first record");
            }
        }
        Self { products: kept }
    }

    /// Parse a JSON catalog.
    ///
    /// Accepts a top-level array of records or an object with a `products`
    /// array. Records without an identifier are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        let records = match &root {
            Value::Array(records) => records,
            Value::Object(map) => match map.get("products") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(VitrinaError::catalog(
                        "expected an array or an object with a \"products\" array",
                    ))
                }
            },
            _ => {
                return Err(VitrinaError::catalog(
                    "expected an array or an object with a \"products\" array",
                ))
            }
        };

        let mut products = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            match Product::from_value(record) {
                Some(product) => products.push(product),
                None => tracing::warn!(position, "skipping catalog record without an id"),
            }
        }

        Ok(Self::new(products))
    }

    /// Load a JSON catalog from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string_limited(path)?;
        let catalog = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), products = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}
