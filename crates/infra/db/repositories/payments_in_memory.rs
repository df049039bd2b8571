use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity, UpdatePaymentEntity},
    repositories::payments::PaymentRepository,
    value_objects::payments::CreatePaymentParams,
};

/// Process-local payment store. Same contract as the Postgres store; writes
/// to the same transaction are not coordinated, so the last writer wins.
#[derive(Default)]
pub struct PaymentInMemory {
    rows: RwLock<Vec<PaymentEntity>>,
    next_id: AtomicI64,
}

impl PaymentInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for PaymentInMemory {
    async fn create(&self, params: CreatePaymentParams) -> Result<PaymentEntity> {
        let insert_payment_entity = InsertPaymentEntity::from_params(params, Utc::now())?;

        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|row| row.transaction_id == insert_payment_entity.transaction_id)
        {
            bail!(
                "payment with transaction id {} already exists",
                insert_payment_entity.transaction_id
            );
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let entity = insert_payment_entity.into_entity(id);
        rows.push(entity.clone());

        Ok(entity)
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentEntity>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|row| row.transaction_id == transaction_id)
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: i64) -> Result<Option<PaymentEntity>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| row.order_id == order_id)
            .max_by_key(|row| row.created_at)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentEntity>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn update_status(
        &self,
        transaction_id: &str,
        status: &str,
    ) -> Result<Option<PaymentEntity>> {
        let changes = UpdatePaymentEntity {
            status: Some(status.to_string()),
            ..Default::default()
        };
        self.update(transaction_id, changes).await
    }

    async fn update(
        &self,
        transaction_id: &str,
        changes: UpdatePaymentEntity,
    ) -> Result<Option<PaymentEntity>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows
            .iter_mut()
            .find(|row| row.transaction_id == transaction_id)
        else {
            return Ok(None);
        };

        changes.apply_to(row);
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn find_all(&self) -> Result<Vec<PaymentEntity>> {
        let rows = self.rows.read().await;
        let mut all = rows.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn delete(&self, transaction_id: &str) -> Result<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.transaction_id != transaction_id);
        Ok(rows.len() < before)
    }
}
