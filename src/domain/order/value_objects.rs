use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

/// One product + quantity entry within an order. Name and unit price are
/// snapshotted at placement time and never re-read from the product.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineItem {
    #[serde(rename = "product")]
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Destination address attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Confirmation record returned by the external payment provider.
/// Field names follow the provider payload, which is why this struct is
/// not camel-cased like the rest of the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}

/// Placement input: line items plus the client-computed totals, stored as
/// submitted (totals are not recomputed server-side).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub order_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<ShippingAddress>,
    pub payment_method: String,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub shipping_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub total_amount: f64,
}

/// Administrative status overwrite. Applies the status unconditionally and
/// the tracking fields only when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// ============================================================================
// Unit Tests
// ============================================================================
