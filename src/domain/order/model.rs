use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{
    LineItem, OrderDraft, OrderStatus, PaymentConfirmation, ShippingAddress, StatusUpdate,
};
use crate::store::Document;

// ============================================================================
// Order - Domain Logic
// ============================================================================
//
// Orders are created once at placement and then mutated by payment
// confirmation, delivery confirmation or cancellation; they are never
// deleted. Every transition validates the current status before touching
// any field, with one deliberate exception: `overwrite_status` applies an
// administrative status change without consulting the state machine.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub user_id: Uuid,

    #[serde(rename = "orderItems")]
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub billing_address: Option<ShippingAddress>,
    pub payment_method: String,

    // Client-computed totals, stored as submitted
    pub subtotal: f64,
    pub tax_amount: f64,
    pub shipping_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,

    pub status: OrderStatus,

    // Payment
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentConfirmation>,

    // Delivery
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,

    // Cancellation
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancellation_reason: Option<String>,

    // Tracking metadata
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a new order from a validated draft. Line items keep the
    /// name and price exactly as submitted.
    pub fn place(user_id: Uuid, draft: OrderDraft) -> Result<Self, OrderError> {
        Self::validate_items(&draft.order_items)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            items: draft.order_items,
            shipping_address: draft.shipping_address,
            billing_address: draft.billing_address,
            payment_method: draft.payment_method,
            subtotal: draft.subtotal,
            tax_amount: draft.tax_amount,
            shipping_amount: draft.shipping_amount,
            discount_amount: draft.discount_amount,
            total_amount: draft.total_amount,
            status: OrderStatus::Placed,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            tracking_number: None,
            estimated_delivery: None,
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate business rules for a line-item sequence
    pub fn validate_items(items: &[LineItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for item in items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
        }

        Ok(())
    }

    /// Attach the payment confirmation and flag the order paid.
    pub fn mark_paid(&mut self, confirmation: PaymentConfirmation) -> Result<(), OrderError> {
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::InvalidStatusTransition(self.status));
        }
        if self.is_paid {
            return Err(OrderError::AlreadyPaid);
        }

        self.is_paid = true;
        self.paid_at = Some(Utc::now());
        self.payment_result = Some(confirmation);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flag the order delivered and move the status to `delivered`.
    pub fn mark_delivered(&mut self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::InvalidStatusTransition(self.status));
        }
        if self.is_delivered {
            return Err(OrderError::AlreadyDelivered);
        }

        self.is_delivered = true;
        self.delivered_at = Some(Utc::now());
        self.status = OrderStatus::Delivered;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancel the order, recording when, by whom and why. Shipped and
    /// delivered orders can never be cancelled.
    pub fn cancel(&mut self, cancelled_by: Uuid, reason: Option<String>) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Cancelled => return Err(OrderError::AlreadyCancelled),
            OrderStatus::Shipped | OrderStatus::Delivered => {
                return Err(OrderError::CannotCancel(self.status))
            }
            OrderStatus::Placed | OrderStatus::Processing => {}
        }

        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(Utc::now());
        self.cancelled_by = Some(cancelled_by);
        self.cancellation_reason = reason;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Administrative overwrite: applies the status with NO transition
    /// validation and sets tracking fields when supplied.
    pub fn overwrite_status(&mut self, change: StatusUpdate) {
        self.status = change.status;

        if let Some(tracking_number) = change.tracking_number {
            self.tracking_number = Some(tracking_number);
        }
        if let Some(estimated_delivery) = change.estimated_delivery {
            self.estimated_delivery = Some(estimated_delivery);
        }
        if let Some(notes) = change.notes {
            self.notes = Some(notes);
        }

        self.updated_at = Utc::now();
    }
}

impl Document for Order {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
