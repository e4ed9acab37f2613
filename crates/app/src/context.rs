//! App Context

use std::sync::Arc;

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    database::{self, Db, RoleCheckError},
    domain::{
        addresses::{AddressesService, PgAddressesService},
        carts::{CartsService, PgCartsService},
        catalog::{CatalogService, PgCatalogService},
        coupons::{CouponsService, PgCouponsService},
        orders::{OrdersService, PgOrdersService},
        reviews::{PgReviewsService, ReviewsService},
        users::{PgUsersService, UsersService},
        wishlists::{PgWishlistsService, WishlistsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error(transparent)]
    Role(#[from] RoleCheckError),
}

#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UsersService>,
    pub catalog: Arc<dyn CatalogService>,
    pub coupons: Arc<dyn CouponsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub reviews: Arc<dyn ReviewsService>,
    pub wishlists: Arc<dyn WishlistsService>,
    pub addresses: Arc<dyn AddressesService>,
}

impl AppContext {
    /// Build application context from a database URL, pricing in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails, or when the connected
    /// role would bypass row-level security.
    pub async fn from_database_url(
        url: &str,
        currency: &'static Currency,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::ensure_rls_enforced_role(&pool).await?;

        Ok(Self::from_db(&Db::new(pool), currency))
    }

    /// Build application context over an existing connection pool.
    #[must_use]
    pub fn from_db(db: &Db, currency: &'static Currency) -> Self {
        Self {
            users: Arc::new(PgUsersService::new(db.clone())),
            catalog: Arc::new(PgCatalogService::new(db.clone(), currency)),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone(), currency)),
            orders: Arc::new(PgOrdersService::new(db.clone())),
            reviews: Arc::new(PgReviewsService::new(db.clone())),
            wishlists: Arc::new(PgWishlistsService::new(db.clone(), currency)),
            addresses: Arc::new(PgAddressesService::new(db.clone())),
        }
    }
}
