//! Catalog Repositories

mod categories;
mod products;
mod variants;

pub(crate) use categories::PgCategoriesRepository;
pub(crate) use products::PgProductsRepository;
pub(crate) use variants::PgVariantsRepository;
