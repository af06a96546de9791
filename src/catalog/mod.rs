//! Product catalog snapshot consumed by the search engine.
//!
//! The catalog is owned by an external collaborator; this module only
//! ingests it. Records are normalized at this boundary so the matcher can
//! rely on every text field being present.

pub mod product;

pub use product::{Catalog, Product, ProductId};
