//! Orders

pub(crate) mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;
