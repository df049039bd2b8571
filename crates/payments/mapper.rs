use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        enums::payment_statuses::map_to_domain_payment_status,
        payments::{CreatePaymentRequest, PaymentRecord},
    },
    payments::provider_models::{
        ProviderAdditionalInfo, ProviderIdentification, ProviderPayer, ProviderPaymentRequest,
        ProviderPaymentResponse,
    },
};

pub const PIX_PAYMENT_METHOD: &str = "pix";
pub const DOCUMENT_TYPE: &str = "CPF";
pub const DOCUMENT_MASK: &str = "999.999.999-99";

const MOCK_PAYER_EMAIL: &str = "payer.teste@gmail.com";
const MOCK_PAYER_NAME: &str = "Payer Random";
const MOCK_PAYER_DOCUMENT: &str = "330.731.328-21";

#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("external_reference is not a valid order id: {0}")]
    InvalidExternalReference(String),
    #[error("payment {0} has no creation date")]
    MissingCreationDate(i64),
    #[error("invalid {field} timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerName {
    pub first_name: String,
    pub last_name: String,
}

/// Translates a provider payment into the service's payment shape.
///
/// `order_id` comes from the explicit field when present, otherwise from
/// `external_reference`. `updated_at` is only set when the provider reported a
/// last-update timestamp.
pub fn to_domain(response: &ProviderPaymentResponse) -> Result<PaymentRecord, MappingError> {
    let order_id = match response.order_id {
        Some(order_id) => Some(order_id),
        None => parse_order_reference(response.external_reference.as_deref())?,
    };

    let transaction_data = response
        .point_of_interaction
        .as_ref()
        .and_then(|poi| poi.transaction_data.as_ref());
    let url_payment = transaction_data
        .and_then(|data| data.ticket_url.clone())
        .unwrap_or_default();
    let qr_code_string = transaction_data
        .and_then(|data| data.qr_code.clone())
        .unwrap_or_default();
    let qr_code_base64 = transaction_data
        .and_then(|data| data.qr_code_base64.clone())
        .unwrap_or_default();

    let created_at = match response.date_created.as_deref() {
        Some(value) => parse_timestamp("date_created", value)?,
        None => return Err(MappingError::MissingCreationDate(response.id)),
    };

    let expiration_date = response
        .date_of_expiration
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(|value| parse_timestamp("date_of_expiration", value))
        .transpose()?;

    let updated_at = response
        .last_updated()
        .map(|value| parse_timestamp("date_updated", value))
        .transpose()?;

    Ok(PaymentRecord {
        id: response.id,
        order_id,
        transaction_id: response.id.to_string(),
        status: map_to_domain_payment_status(&response.status),
        amount: response.transaction_amount,
        url_payment,
        qr_code_string,
        qr_code_base64,
        items: response.line_items(),
        expiration_date,
        client: response.client.clone(),
        created_at,
        updated_at,
    })
}

/// Builds the provider payload for a PIX charge. A missing client is
/// replaced by a fixed test payer.
pub fn to_external_service(request: &CreatePaymentRequest, webhook_url: &str) -> ProviderPaymentRequest {
    let (email, name, document) = match &request.client {
        Some(client) => (
            client.email.clone().unwrap_or_default(),
            client.name.clone(),
            client.document.clone().unwrap_or_default(),
        ),
        None => (
            MOCK_PAYER_EMAIL.to_string(),
            MOCK_PAYER_NAME.to_string(),
            MOCK_PAYER_DOCUMENT.to_string(),
        ),
    };
    let PayerName {
        first_name,
        last_name,
    } = split_name(&name);

    let order_reference = request
        .order_id
        .map(|order_id| order_id.to_string())
        .unwrap_or_default();

    let description = request
        .description
        .clone()
        .filter(|description| !description.is_empty())
        .unwrap_or_else(|| format!("Payment for order #{order_reference}"));

    ProviderPaymentRequest {
        transaction_amount: request.amount,
        description,
        payment_method_id: PIX_PAYMENT_METHOD.to_string(),
        payer: ProviderPayer {
            email,
            first_name,
            last_name,
            identification: ProviderIdentification {
                id_type: DOCUMENT_TYPE.to_string(),
                number: remove_mask(&document, DOCUMENT_MASK),
            },
        },
        external_reference: order_reference,
        additional_info: ProviderAdditionalInfo {
            items: request.items.clone().unwrap_or_default(),
        },
        notification_url: webhook_url.to_string(),
    }
}

/// Splits on the first space after trimming; the remainder is kept verbatim.
pub fn split_name(full_name: &str) -> PayerName {
    let trimmed = full_name.trim();
    let (first_name, last_name) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

    PayerName {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

/// Strips the literal mask characters from every match of `mask` in `value`.
/// `9` and `X` in the mask stand for a digit.
pub fn remove_mask(value: &str, mask: &str) -> String {
    let pattern = regex::escape(mask).replace(['9', 'X'], r"\d");
    let Ok(regex) = Regex::new(&pattern) else {
        return value.to_string();
    };

    regex
        .replace_all(value, |caps: &regex::Captures| {
            caps[0]
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
        })
        .into_owned()
}

pub fn generate_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

/// Strict order-id parse: absent or blank is `None`, anything non-numeric fails.
pub fn parse_order_reference(reference: Option<&str>) -> Result<Option<i64>, MappingError> {
    match reference.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| MappingError::InvalidExternalReference(value.to_string())),
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, MappingError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| MappingError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}
