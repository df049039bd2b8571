use std::sync::Arc;

use crates::domain::{
    errors::{AppError, AppResult},
    repositories::payment_gateway::PaymentGateway,
    value_objects::{
        enums::payment_statuses::{PaymentStatus, map_to_domain_payment_status},
        payments::{
            CancelPayment, CheckPaymentStatus, CreatePaymentRequest, PaymentRecord,
            PaymentStatusChange, PaymentStatusView, UpdatePaymentStatus,
        },
    },
};
use serde_json::Value;
use tracing::{error, info, warn};

/// Payment lifecycle orchestration on top of the provider gateway.
pub struct PaymentUseCase<G>
where
    G: PaymentGateway + Send + Sync + 'static,
{
    payment_gateway: Arc<G>,
}

impl<G> PaymentUseCase<G>
where
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(payment_gateway: Arc<G>) -> Self {
        Self { payment_gateway }
    }

    pub async fn create_payment(&self, request: CreatePaymentRequest) -> AppResult<PaymentRecord> {
        info!(order_id = ?request.order_id, amount = request.amount, "payments: creating payment");

        if request.order_id.is_none_or(|order_id| order_id == 0) {
            warn!("payments: create rejected, missing order id");
            return Err(AppError::bad_request("Order ID is required"));
        }

        if request.amount.is_nan() || request.amount <= 0.0 {
            warn!(amount = request.amount, "payments: create rejected, invalid amount");
            return Err(AppError::bad_request("Valid amount is required"));
        }

        self.payment_gateway
            .create_payment(request)
            .await
            .map_err(|err| {
                error!(error = %err, "payments: failed to create payment");
                AppError::classify(err, "Error creating payment")
            })
    }

    pub async fn get_payment_status(&self, transaction_id: &str) -> AppResult<PaymentStatusView> {
        require_transaction_id(transaction_id)?;
        info!(%transaction_id, "payments: checking payment status");

        let payment = self
            .check_status(transaction_id, "Error getting payment status")
            .await?
            .ok_or_else(|| AppError::not_found("Payment not found for this transaction ID"))?;

        Ok(PaymentStatusView::from(&payment))
    }

    /// Cancels a pending or paid payment and returns the provider's raw answer.
    pub async fn cancel_payment(
        &self,
        transaction_id: &str,
        reason: Option<String>,
    ) -> AppResult<Value> {
        require_transaction_id(transaction_id)?;
        info!(%transaction_id, "payments: cancelling payment");

        let payment = self
            .check_status(transaction_id, "Error cancelling payment")
            .await?
            .ok_or_else(|| AppError::not_found("Payment not found for this transaction ID"))?;

        if !payment.status.is_cancelable() {
            warn!(
                %transaction_id,
                status = %payment.status,
                "payments: cancel rejected for current status"
            );
            return Err(AppError::bad_request(
                "Payment cannot be canceled in its current state",
            ));
        }

        let result = self
            .payment_gateway
            .cancel_payment(CancelPayment {
                transaction_id: transaction_id.to_string(),
                reason,
            })
            .await
            .map_err(|err| {
                error!(%transaction_id, error = %err, "payments: provider cancel failed");
                AppError::classify(err, "Error cancelling payment")
            })?;

        self.update_status(
            transaction_id,
            PaymentStatus::Canceled.as_str(),
            "Error cancelling payment",
        )
        .await?;

        Ok(result)
    }

    /// Relays a provider notification and syncs the stored status when it changed.
    pub async fn process_payment_webhook(&self, payload: Value) -> AppResult<PaymentStatusChange> {
        info!("payments: processing payment webhook");

        let callback = self
            .payment_gateway
            .process_payment_callback(payload)
            .await
            .map_err(|err| {
                error!(error = %err, "payments: webhook relay failed");
                AppError::classify(err, "Error processing payment webhook")
            })?;

        let Some(reported_transaction_id) = callback.transaction_id.filter(|id| !id.is_empty())
        else {
            warn!("payments: webhook answer without transaction id");
            return Err(AppError::bad_request("Transaction ID is required"));
        };
        let Some(reported_status) = callback.status.filter(|status| !status.is_empty()) else {
            warn!(transaction_id = %reported_transaction_id, "payments: webhook answer without status");
            return Err(AppError::bad_request("Payment status is required"));
        };

        let payment = self
            .check_status(&reported_transaction_id, "Error processing payment webhook")
            .await?
            .ok_or_else(|| AppError::not_found("Order not found for this transaction ID"))?;

        if reported_status != payment.status.as_str() {
            info!(
                transaction_id = %payment.transaction_id,
                from = %payment.status,
                to = %reported_status,
                "payments: webhook changed payment status"
            );
            self.update_status(
                &payment.transaction_id,
                &reported_status,
                "Error processing payment webhook",
            )
            .await?;
        }

        Ok(PaymentStatusChange {
            transaction_id: payment.transaction_id,
            status: reported_status,
        })
    }

    /// Re-reads the provider status and persists its mapping. The returned
    /// status is the one reported before mapping.
    pub async fn update_payment_status_with_transaction_id(
        &self,
        transaction_id: &str,
    ) -> AppResult<PaymentStatusChange> {
        require_transaction_id(transaction_id)?;
        info!(%transaction_id, "payments: refreshing payment status");

        let payment = self
            .check_status(transaction_id, "Error updating payment status")
            .await?
            .ok_or_else(|| AppError::not_found("Payment not found for this transaction ID"))?;

        let reported_status = payment.status.to_string();
        let mapped_status = map_to_domain_payment_status(&reported_status);

        self.update_status(
            transaction_id,
            mapped_status.as_str(),
            "Error updating payment status",
        )
        .await?;

        Ok(PaymentStatusChange {
            transaction_id: transaction_id.to_string(),
            status: reported_status,
        })
    }

    pub async fn get_external_reference_by_transaction(&self, transaction_id: &str) -> AppResult<i64> {
        require_transaction_id(transaction_id)?;

        let reference = self
            .payment_gateway
            .get_external_reference(transaction_id.to_string())
            .await
            .map_err(|err| {
                error!(%transaction_id, error = %err, "payments: external reference lookup failed");
                AppError::classify(err, "Error getting external reference")
            })?;

        match reference {
            Some(reference) if reference.order_id != 0 => Ok(reference.order_id),
            _ => Err(AppError::not_found(
                "Order ID not found for the given transaction ID",
            )),
        }
    }

    async fn check_status(
        &self,
        transaction_id: &str,
        failure_message: &str,
    ) -> AppResult<Option<PaymentRecord>> {
        self.payment_gateway
            .check_payment_status(CheckPaymentStatus {
                transaction_id: transaction_id.to_string(),
            })
            .await
            .map_err(|err| {
                error!(%transaction_id, error = %err, "payments: status check failed");
                AppError::classify(err, failure_message)
            })
    }

    async fn update_status(
        &self,
        transaction_id: &str,
        status: &str,
        failure_message: &str,
    ) -> AppResult<()> {
        self.payment_gateway
            .update_status(UpdatePaymentStatus {
                transaction_id: transaction_id.to_string(),
                status: status.to_string(),
            })
            .await
            .map(|_| ())
            .map_err(|err| {
                error!(%transaction_id, %status, error = %err, "payments: status update failed");
                AppError::classify(err, failure_message)
            })
    }
}

fn require_transaction_id(transaction_id: &str) -> AppResult<()> {
    if transaction_id.trim().is_empty() {
        warn!("payments: request rejected, missing transaction id");
        return Err(AppError::bad_request("Transaction ID is required"));
    }
    Ok(())
}
