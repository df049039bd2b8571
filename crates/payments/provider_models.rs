use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::payments::{PaymentClient, PaymentItem};

/// Payment resource as returned by the provider's `/payments` endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderPaymentResponse {
    pub id: i64,
    #[serde(rename = "orderId", default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub transaction_amount: f64,
    #[serde(default)]
    pub date_of_expiration: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub date_last_updated: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub point_of_interaction: Option<ProviderPointOfInteraction>,
    #[serde(default)]
    pub additional_info: Option<ProviderResponseAdditionalInfo>,
    #[serde(default)]
    pub items: Option<Vec<PaymentItem>>,
    #[serde(default)]
    pub client: Option<PaymentClient>,
}

impl ProviderPaymentResponse {
    pub fn last_updated(&self) -> Option<&str> {
        self.date_updated
            .as_deref()
            .or(self.date_last_updated.as_deref())
            .filter(|value| !value.is_empty())
    }

    pub fn line_items(&self) -> Option<Vec<PaymentItem>> {
        self.items.clone().or_else(|| {
            self.additional_info
                .as_ref()
                .and_then(|info| info.items.clone())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderPointOfInteraction {
    #[serde(default)]
    pub transaction_data: Option<ProviderTransactionData>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderTransactionData {
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_base64: Option<String>,
    #[serde(default)]
    pub ticket_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderResponseAdditionalInfo {
    #[serde(default)]
    pub items: Option<Vec<PaymentItem>>,
    #[serde(default)]
    pub payer: Option<Value>,
}

/// Body of `POST {base}/payments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPaymentRequest {
    pub transaction_amount: f64,
    pub description: String,
    pub payment_method_id: String,
    pub payer: ProviderPayer,
    pub external_reference: String,
    pub additional_info: ProviderAdditionalInfo,
    pub notification_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPayer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub identification: ProviderIdentification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderIdentification {
    #[serde(rename = "type")]
    pub id_type: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderAdditionalInfo {
    pub items: Vec<PaymentItem>,
}

/// Body of `PUT {base}/payments/{id}` when cancelling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCancelRequest {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}
