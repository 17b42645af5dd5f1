mod model;
mod repository;

pub(crate) use model::parse_marketplace;
pub use model::{CatalogItemDB, VariantDB};
pub use repository::CatalogRepository;
