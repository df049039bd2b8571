use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

use crate::domain::{
    entities::payments::PaymentEntity,
    value_objects::payments::{
        CancelPayment, CheckPaymentStatus, CreatePaymentRequest, ExternalReference,
        PaymentCallbackStatus, PaymentRecord, UpdatePaymentStatus,
    },
};

/// Provider-facing port. Implementations pair each outbound call with the
/// matching write to the payment store.
#[async_trait]
#[automock]
pub trait PaymentGateway {
    async fn create_payment(&self, request: CreatePaymentRequest) -> Result<PaymentRecord>;

    async fn check_payment_status(
        &self,
        query: CheckPaymentStatus,
    ) -> Result<Option<PaymentRecord>>;

    /// Returns the provider's raw response body.
    async fn cancel_payment(&self, command: CancelPayment) -> Result<Value>;

    async fn process_payment_callback(&self, payload: Value) -> Result<PaymentCallbackStatus>;

    async fn get_external_reference(
        &self,
        transaction_id: String,
    ) -> Result<Option<ExternalReference>>;

    async fn update_status(&self, command: UpdatePaymentStatus) -> Result<Option<PaymentEntity>>;
}
