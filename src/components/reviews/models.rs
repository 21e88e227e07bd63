use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating
pub const MAX_RATING: u8 = 5;

/// A customer's review of a completed appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub appointment_id: String,
    #[serde(alias = "employeeId")]
    pub provider_id: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub customer_name: String,
    /// 1-5
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    /// The provider's answer to the review
    #[serde(
        default,
        alias = "employeeResponse",
        skip_serializing_if = "Option::is_none"
    )]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A new review as submitted by a customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub appointment_id: String,
    pub rating: u8,
    pub comment: String,
}

/// Changes to an existing review; None keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}
