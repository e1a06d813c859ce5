use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized food-delivery order, supplied by the external order store.
/// The analytics core treats the whole set as a read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub restaurant: String,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    /// Total order amount; non-negative.
    pub total: f64,
    /// Customer rating, 1-5, when present.
    pub rating: Option<u8>,
    /// Comma-joined "qty x name" tokens, when present.
    pub items: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Completed,
    Rejected,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "completed" | "delivered" => OrderStatus::Completed,
            "rejected" => OrderStatus::Rejected,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Rejected => write!(f, "Rejected"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
            OrderStatus::Other(raw) => write!(f, "{raw}"),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        OrderStatus::parse(&raw)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}
