use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Status vocabulary exposed by this service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Canceled,
    Expired,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Canceled => "CANCELED",
            PaymentStatus::Expired => "EXPIRED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    /// Only pending and paid payments may be canceled.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Paid)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status vocabulary used by the PIX provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPaymentStatus {
    Approved,
    Cancelled,
    Rejected,
    Expired,
    Pending,
}

impl ProviderPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderPaymentStatus::Approved => "approved",
            ProviderPaymentStatus::Cancelled => "cancelled",
            ProviderPaymentStatus::Rejected => "rejected",
            ProviderPaymentStatus::Expired => "expired",
            ProviderPaymentStatus::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(ProviderPaymentStatus::Approved),
            "cancelled" => Some(ProviderPaymentStatus::Cancelled),
            "rejected" => Some(ProviderPaymentStatus::Rejected),
            "expired" => Some(ProviderPaymentStatus::Expired),
            "pending" => Some(ProviderPaymentStatus::Pending),
            _ => None,
        }
    }
}

impl Display for ProviderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a provider status onto the service vocabulary.
///
/// Unrecognised values (including domain values such as `PAID`) map to
/// [`PaymentStatus::Pending`].
pub fn map_to_domain_payment_status(status: &str) -> PaymentStatus {
    match ProviderPaymentStatus::parse(status) {
        Some(ProviderPaymentStatus::Approved) => PaymentStatus::Paid,
        Some(ProviderPaymentStatus::Cancelled) => PaymentStatus::Canceled,
        Some(ProviderPaymentStatus::Rejected) => PaymentStatus::Failed,
        Some(ProviderPaymentStatus::Expired) => PaymentStatus::Expired,
        Some(ProviderPaymentStatus::Pending) | None => PaymentStatus::Pending,
    }
}
