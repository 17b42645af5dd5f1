//! Catalog module - catalog items, marketplace variants, and size matching.

mod catalog_model;
mod catalog_traits;
mod size_normalizer;

pub use catalog_model::{normalize_sku, normalize_style_code, CatalogItem, Variant};
pub use catalog_traits::CatalogRepositoryTrait;
pub use size_normalizer::{normalize_size_label, size_keys_match};
