//! Orders service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let mut orders = self.repository.list_orders(&mut tx, user).await?;

        self.repository.attach_items(&mut tx, &mut orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let mut order = self.repository.get_order(&mut tx, order).await?;

        self.repository
            .attach_items(&mut tx, std::slice::from_mut(&mut order))
            .await?;

        tx.commit().await?;

        Ok(order)
    }
}

#[automock]
#[async_trait]
/// Order history. Orders are written by checkout.
pub trait OrdersService: Send + Sync {
    /// The user's orders, newest first, with their items.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Retrieve a single order with its items.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
