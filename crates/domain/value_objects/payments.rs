use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentClient {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Line item, shared between the API, the provider payload and the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentItem {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_price: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<bool>,
}

// The provider echoes numeric item fields back as strings.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + DeserializeOwned,
    T::Err: std::fmt::Display,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(number @ Value::Number(_)) => serde_json::from_value(number)
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, got {other}"
        ))),
    }
}

// Provider ids arrive as numbers or strings depending on the endpoint.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(raw)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// Body of `POST /payment/create`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub client: Option<PaymentClient>,
    #[serde(default)]
    pub items: Option<Vec<PaymentItem>>,
}

/// A payment as reported by the provider, translated into the service vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: Option<i64>,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub amount: f64,
    pub url_payment: String,
    pub qr_code_string: String,
    pub qr_code_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PaymentItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<PaymentClient>,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fixed four-field projection returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusView {
    pub order_id: Option<i64>,
    pub amount: f64,
    pub status: PaymentStatus,
    pub transaction_id: String,
}

impl From<&PaymentRecord> for PaymentStatusView {
    fn from(payment: &PaymentRecord) -> Self {
        Self {
            order_id: payment.order_id,
            amount: payment.amount,
            status: payment.status,
            transaction_id: payment.transaction_id.clone(),
        }
    }
}

/// Status reported back by the provider's notification endpoint.
///
/// `status` is kept as the raw string the provider sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallbackStatus {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// `{transactionId, status}` pair returned by the status-changing use-cases.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusChange {
    pub transaction_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckPaymentStatus {
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancelPayment {
    pub transaction_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePaymentStatus {
    pub transaction_id: String,
    pub status: String,
}

/// Correlation between a provider transaction and the caller's order.
/// An `order_id` of zero means no order is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReference {
    pub order_id: i64,
    pub transaction_id: String,
}

/// Fields supplied when persisting a new payment; timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePaymentParams {
    pub transaction_id: String,
    pub qr_code_base64: Option<String>,
    pub qr_code_string: Option<String>,
    pub url_payment: String,
    pub amount: f64,
    pub description: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub client: Option<PaymentClient>,
    pub status: String,
    pub order_id: i64,
    pub items: Vec<PaymentItem>,
    pub callback_url: Option<String>,
}
