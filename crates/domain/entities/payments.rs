use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::domain::value_objects::payments::CreatePaymentParams;
use crate::infra::db::postgres::schema::payments;

#[derive(Debug, Clone, PartialEq, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntity {
    pub id: i64,
    pub transaction_id: String,
    pub order_id: i64,
    pub amount: f64,
    pub status: String,
    pub url_payment: String,
    pub qr_code_base64: Option<String>,
    pub qr_code_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub client: Option<Value>,
    pub items: Value,
    pub callback_url: Option<String>,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub transaction_id: String,
    pub order_id: i64,
    pub amount: f64,
    pub status: String,
    pub url_payment: String,
    pub qr_code_base64: Option<String>,
    pub qr_code_string: Option<String>,
    pub description: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub client: Option<Value>,
    pub items: Value,
    pub callback_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsertPaymentEntity {
    /// Stamps both timestamps with `now`. An empty description is stored as NULL.
    pub fn from_params(params: CreatePaymentParams, now: DateTime<Utc>) -> Result<Self> {
        let client = params.client.map(serde_json::to_value).transpose()?;
        let items = serde_json::to_value(&params.items)?;
        let description = params.description.filter(|d| !d.is_empty());

        Ok(Self {
            transaction_id: params.transaction_id,
            order_id: params.order_id,
            amount: params.amount,
            status: params.status,
            url_payment: params.url_payment,
            qr_code_base64: params.qr_code_base64,
            qr_code_string: params.qr_code_string,
            description,
            expiration_date: params.expiration_date,
            client,
            items,
            callback_url: params.callback_url,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn into_entity(self, id: i64) -> PaymentEntity {
        PaymentEntity {
            id,
            transaction_id: self.transaction_id,
            order_id: self.order_id,
            amount: self.amount,
            status: self.status,
            url_payment: self.url_payment,
            qr_code_base64: self.qr_code_base64,
            qr_code_string: self.qr_code_string,
            description: self.description,
            expiration_date: self.expiration_date,
            client: self.client,
            items: self.items,
            callback_url: self.callback_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = payments)]
pub struct UpdatePaymentEntity {
    pub order_id: Option<i64>,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub url_payment: Option<String>,
    pub qr_code_base64: Option<String>,
    pub qr_code_string: Option<String>,
    pub description: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub client: Option<Value>,
    pub items: Option<Value>,
    pub callback_url: Option<String>,
}

impl UpdatePaymentEntity {
    pub fn apply_to(self, entity: &mut PaymentEntity) {
        if let Some(order_id) = self.order_id {
            entity.order_id = order_id;
        }
        if let Some(amount) = self.amount {
            entity.amount = amount;
        }
        if let Some(status) = self.status {
            entity.status = status;
        }
        if let Some(url_payment) = self.url_payment {
            entity.url_payment = url_payment;
        }
        if self.qr_code_base64.is_some() {
            entity.qr_code_base64 = self.qr_code_base64;
        }
        if self.qr_code_string.is_some() {
            entity.qr_code_string = self.qr_code_string;
        }
        if self.description.is_some() {
            entity.description = self.description;
        }
        if self.expiration_date.is_some() {
            entity.expiration_date = self.expiration_date;
        }
        if self.client.is_some() {
            entity.client = self.client;
        }
        if let Some(items) = self.items {
            entity.items = items;
        }
        if self.callback_url.is_some() {
            entity.callback_url = self.callback_url;
        }
    }
}
