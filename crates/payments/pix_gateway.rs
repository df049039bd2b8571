use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    domain::{
        entities::payments::PaymentEntity,
        errors::AppError,
        repositories::{payment_gateway::PaymentGateway, payments::PaymentRepository},
        value_objects::{
            enums::payment_statuses::ProviderPaymentStatus,
            payments::{
                CancelPayment, CheckPaymentStatus, CreatePaymentParams, CreatePaymentRequest,
                ExternalReference, PaymentCallbackStatus, PaymentRecord, UpdatePaymentStatus,
            },
        },
    },
    payments::{
        mapper::{self, parse_order_reference},
        provider_models::{ProviderCancelRequest, ProviderPaymentResponse},
    },
};

const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";
const UNEXPECTED_PROVIDER_FAILURE: &str = "An unexpected error occurred";

#[derive(Debug, Clone)]
pub struct PixGatewayConfig {
    pub base_url: String,
    pub access_token: String,
    pub webhook_url: String,
}

/// Non-2xx answer from the provider.
#[derive(Debug, Error)]
#[error("payment provider responded with status {status}")]
pub struct ProviderError {
    pub status: u16,
    pub body: Value,
}

impl ProviderError {
    pub fn provider_message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

/// Describes a gateway failure for the `details` of an Internal error.
pub fn describe_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ProviderError>() {
        Some(provider_error) => provider_error
            .provider_message()
            .unwrap_or(UNEXPECTED_PROVIDER_FAILURE)
            .to_string(),
        None => err.to_string(),
    }
}

fn wrap_failure(err: anyhow::Error, message: &str) -> anyhow::Error {
    AppError::classify_with(err, message, describe_failure).into()
}

/// PIX provider client. Every provider call is followed by the matching
/// write to the payment store.
pub struct PixPaymentGateway<R>
where
    R: PaymentRepository + Send + Sync + 'static,
{
    http: reqwest::Client,
    config: PixGatewayConfig,
    payment_repository: Arc<R>,
}

impl<R> PixPaymentGateway<R>
where
    R: PaymentRepository + Send + Sync + 'static,
{
    pub fn new(config: PixGatewayConfig, payment_repository: Arc<R>) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            bail!("payment provider base URL is not configured");
        }
        if config.access_token.trim().is_empty() {
            bail!("payment provider access token is not configured");
        }

        let config = PixGatewayConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };

        Ok(Self {
            http: reqwest::Client::new(),
            config,
            payment_repository,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn read_body(resp: reqwest::Response) -> Value {
        match resp.text().await {
            Ok(text) if text.trim().is_empty() => Value::Null,
            Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            Err(err) => Value::String(format!("<failed to read response body: {err}>")),
        }
    }

    async fn expect_status(
        resp: reqwest::Response,
        expected: StatusCode,
        context: &str,
    ) -> Result<Value> {
        let status = resp.status();
        let body = Self::read_body(resp).await;

        if status == expected {
            return Ok(body);
        }

        error!(
            status = %status,
            expected = %expected,
            response_body = %body,
            context = %context,
            "pix_gateway: provider request failed"
        );

        if status.is_success() {
            return Err(AppError::internal(context, Some(body)).into());
        }

        Err(ProviderError {
            status: status.as_u16(),
            body,
        }
        .into())
    }

    async fn fetch_provider_payment(&self, transaction_id: &str, context: &str) -> Result<Option<Value>> {
        let resp = self
            .http
            .get(self.url(&format!("/payments/{transaction_id}")))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            warn!(%transaction_id, "pix_gateway: payment not found at provider");
            return Ok(None);
        }

        Self::expect_status(resp, StatusCode::OK, context).await.map(Some)
    }

    async fn try_create_payment(&self, request: CreatePaymentRequest) -> Result<PaymentRecord> {
        let payload = mapper::to_external_service(&request, &self.config.webhook_url);

        let resp = self
            .http
            .post(self.url("/payments"))
            .bearer_auth(&self.config.access_token)
            .header(IDEMPOTENCY_HEADER, mapper::generate_idempotency_key())
            .json(&payload)
            .send()
            .await?;

        let body = Self::expect_status(resp, StatusCode::CREATED, "Error generating payment").await?;
        let provider_payment: ProviderPaymentResponse = serde_json::from_value(body)?;
        let payment = mapper::to_domain(&provider_payment)?;

        self.payment_repository
            .create(CreatePaymentParams {
                transaction_id: payment.transaction_id.clone(),
                qr_code_base64: Some(payment.qr_code_base64.clone()),
                qr_code_string: Some(payment.qr_code_string.clone()),
                url_payment: payment.url_payment.clone(),
                amount: payment.amount,
                description: request.description,
                expiration_date: payment.expiration_date,
                client: request.client,
                status: payment.status.to_string(),
                order_id: request.order_id.unwrap_or(payment.id),
                items: request.items.unwrap_or_default(),
                callback_url: request.callback_url,
            })
            .await?;

        info!(
            transaction_id = %payment.transaction_id,
            order_id = ?payment.order_id,
            "pix_gateway: payment created"
        );

        Ok(payment)
    }

    async fn try_check_payment_status(
        &self,
        query: CheckPaymentStatus,
    ) -> Result<Option<PaymentRecord>> {
        let Some(body) = self
            .fetch_provider_payment(&query.transaction_id, "Error checking payment status")
            .await?
        else {
            return Ok(None);
        };

        let provider_payment: ProviderPaymentResponse = serde_json::from_value(body)?;

        // The store keeps the provider's own status string.
        self.payment_repository
            .update_status(&query.transaction_id, &provider_payment.status)
            .await?;

        Ok(Some(mapper::to_domain(&provider_payment)?))
    }

    async fn try_cancel_payment(&self, command: CancelPayment) -> Result<Value> {
        let payload = ProviderCancelRequest {
            status: ProviderPaymentStatus::Cancelled.to_string(),
            cancellation_reason: command.reason.filter(|reason| !reason.is_empty()),
        };

        let resp = self
            .http
            .put(self.url(&format!("/payments/{}", command.transaction_id)))
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await?;

        let body = Self::expect_status(resp, StatusCode::OK, "Error canceling payment").await?;

        self.payment_repository
            .update_status(
                &command.transaction_id,
                ProviderPaymentStatus::Cancelled.as_str(),
            )
            .await?;

        info!(transaction_id = %command.transaction_id, "pix_gateway: payment cancelled");

        Ok(body)
    }

    async fn try_process_payment_callback(&self, payload: Value) -> Result<PaymentCallbackStatus> {
        let resp = self
            .http
            .post(self.url("/notifications"))
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await?;

        let body =
            Self::expect_status(resp, StatusCode::OK, "Error processing payment callback").await?;
        let callback: PaymentCallbackStatus = serde_json::from_value(body)?;

        if let (Some(transaction_id), Some(status)) = (&callback.transaction_id, &callback.status) {
            self.payment_repository
                .update_status(transaction_id, status)
                .await?;
        }

        Ok(callback)
    }

    async fn try_get_external_reference(
        &self,
        transaction_id: String,
    ) -> Result<Option<ExternalReference>> {
        let stored = self
            .payment_repository
            .find_by_transaction_id(&transaction_id)
            .await?;

        if let Some(stored) = stored.filter(|payment| payment.order_id != 0) {
            return Ok(Some(ExternalReference {
                order_id: stored.order_id,
                transaction_id,
            }));
        }

        let Some(body) = self
            .fetch_provider_payment(&transaction_id, "Error getting external reference")
            .await?
        else {
            return Ok(None);
        };

        let reference = match body.get("external_reference") {
            Some(Value::String(reference)) => Some(reference.clone()),
            Some(Value::Number(reference)) => Some(reference.to_string()),
            _ => None,
        };

        let order_id = match parse_order_reference(reference.as_deref()) {
            Ok(Some(order_id)) => order_id,
            Ok(None) => {
                return Err(AppError::internal(
                    "external_reference missing or invalid on payment",
                    None,
                )
                .into());
            }
            Err(err) => {
                warn!(%transaction_id, error = %err, "pix_gateway: unusable external reference");
                return Err(
                    AppError::internal("external_reference is not a valid order ID", None).into(),
                );
            }
        };

        Ok(Some(ExternalReference {
            order_id,
            transaction_id,
        }))
    }
}

#[async_trait]
impl<R> PaymentGateway for PixPaymentGateway<R>
where
    R: PaymentRepository + Send + Sync + 'static,
{
    async fn create_payment(&self, request: CreatePaymentRequest) -> Result<PaymentRecord> {
        self.try_create_payment(request)
            .await
            .map_err(|err| wrap_failure(err, "Failed to generate payment"))
    }

    async fn check_payment_status(
        &self,
        query: CheckPaymentStatus,
    ) -> Result<Option<PaymentRecord>> {
        self.try_check_payment_status(query)
            .await
            .map_err(|err| wrap_failure(err, "Failed to check payment status"))
    }

    async fn cancel_payment(&self, command: CancelPayment) -> Result<Value> {
        self.try_cancel_payment(command)
            .await
            .map_err(|err| wrap_failure(err, "Failed to cancel payment"))
    }

    async fn process_payment_callback(&self, payload: Value) -> Result<PaymentCallbackStatus> {
        self.try_process_payment_callback(payload)
            .await
            .map_err(|err| wrap_failure(err, "Failed to process payment callback"))
    }

    async fn get_external_reference(
        &self,
        transaction_id: String,
    ) -> Result<Option<ExternalReference>> {
        self.try_get_external_reference(transaction_id)
            .await
            .map_err(|err| wrap_failure(err, "Failed to get external reference"))
    }

    async fn update_status(&self, command: UpdatePaymentStatus) -> Result<Option<PaymentEntity>> {
        self.payment_repository
            .update_status(&command.transaction_id, &command.status)
            .await
            .map_err(|err| wrap_failure(err, "Failed to update payment status"))
    }
}
