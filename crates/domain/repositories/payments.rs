use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::payments::{PaymentEntity, UpdatePaymentEntity},
    value_objects::payments::CreatePaymentParams,
};

/// Payment store. Lookups report absence as `None`, never as an error.
#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn create(&self, params: CreatePaymentParams) -> Result<PaymentEntity>;

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentEntity>>;

    async fn find_by_order_id(&self, order_id: i64) -> Result<Option<PaymentEntity>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentEntity>>;

    async fn update_status(
        &self,
        transaction_id: &str,
        status: &str,
    ) -> Result<Option<PaymentEntity>>;

    async fn update(
        &self,
        transaction_id: &str,
        changes: UpdatePaymentEntity,
    ) -> Result<Option<PaymentEntity>>;

    /// Newest first.
    async fn find_all(&self) -> Result<Vec<PaymentEntity>>;

    async fn delete(&self, transaction_id: &str) -> Result<bool>;
}
