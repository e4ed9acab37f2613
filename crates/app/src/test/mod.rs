//! Service test support.

mod db;
mod helpers;

pub(crate) use context::TestContext;
pub(crate) use helpers::TestCatalog;
