use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::store::Store;

use super::errors::OrderError;
use super::model::Order;
use super::value_objects::{LineItem, OrderDraft, PaymentConfirmation, StatusUpdate};

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: Draft → Validation → Stock Reservation → Document Store
//
// Stock is claimed in one serialized batch per placement: every line item
// is checked before any decrement, and the whole batch commits or nothing
// does. Two concurrent placements racing for the last units queue on the
// products write guard, so stock can never go negative.
//
// ============================================================================

#[derive(Clone)]
pub struct OrderService {
    store: Arc<Store>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(store: Arc<Store>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Place an order: validate the draft, claim stock for every line
    /// item, then persist with status `placed`.
    pub async fn place(&self, user_id: Uuid, draft: OrderDraft) -> Result<Order, OrderError> {
        let started = Instant::now();
        let order = Order::place(user_id, draft)?;

        if let Err(e) = self.reserve_stock(&order.items).await {
            if matches!(e, OrderError::InsufficientStock { .. }) {
                self.metrics.record_stock_rejection();
            }
            return Err(e);
        }

        let order = self.store.orders.insert(order).await;
        self.metrics
            .record_order_placed(started.elapsed().as_secs_f64());

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            item_count = order.items.len(),
            total = order.total_amount,
            "✅ Order placed"
        );

        Ok(order)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.store
            .orders
            .get(order_id)
            .await
            .ok_or(OrderError::NotFound)
    }

    /// Orders owned by one user, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Vec<Order> {
        let mut orders = self.store.orders.find(|o| o.user_id == user_id).await;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Every order in the store, newest first.
    pub async fn list_all(&self) -> Vec<Order> {
        let mut orders = self.store.orders.find(|_| true).await;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Attach a payment confirmation to the order.
    pub async fn mark_paid(
        &self,
        order_id: Uuid,
        confirmation: PaymentConfirmation,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .orders
            .try_update(order_id, |order| order.mark_paid(confirmation))
            .await
            .ok_or(OrderError::NotFound)??;

        self.metrics.record_status_change("paid");
        tracing::info!(order_id = %order.id, "💰 Order marked paid");
        Ok(order)
    }

    /// Flag the order delivered (administrative).
    pub async fn mark_delivered(&self, order_id: Uuid) -> Result<Order, OrderError> {
        let order = self
            .store
            .orders
            .try_update(order_id, |order| order.mark_delivered())
            .await
            .ok_or(OrderError::NotFound)??;

        self.metrics.record_status_change("delivered");
        tracing::info!(order_id = %order.id, "📦 Order delivered");
        Ok(order)
    }

    /// Cancel the order and restore stock for every line item.
    pub async fn cancel(
        &self,
        order_id: Uuid,
        cancelled_by: Uuid,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .orders
            .try_update(order_id, |order| order.cancel(cancelled_by, reason))
            .await
            .ok_or(OrderError::NotFound)??;

        // Stock goes back only after the cancellation committed, so a
        // lost cancel race can never restock twice.
        self.restore_stock(&order.items).await;
        self.metrics.record_order_cancelled();

        tracing::info!(
            order_id = %order.id,
            cancelled_by = %cancelled_by,
            "🚫 Order cancelled, stock restored"
        );

        Ok(order)
    }

    /// Administrative status overwrite, no transition validation.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        change: StatusUpdate,
    ) -> Result<Order, OrderError> {
        let status = change.status;
        let order = self
            .store
            .orders
            .update(order_id, |order| order.overwrite_status(change))
            .await
            .ok_or(OrderError::NotFound)?;

        self.metrics.record_status_change(status.as_str());
        tracing::info!(
            order_id = %order.id,
            status = status.as_str(),
            "📝 Order status overwritten"
        );

        Ok(order)
    }

    /// Claim stock for every line item under a single write guard: all
    /// checks run before any decrement, so the batch applies atomically
    /// or not at all.
    async fn reserve_stock(&self, items: &[LineItem]) -> Result<(), OrderError> {
        self.store
            .products
            .with_rows_mut(|rows| {
                for item in items {
                    let product = rows
                        .get(&item.product_id)
                        .ok_or_else(|| OrderError::ProductNotFound(item.name.clone()))?;

                    if product.stock < item.quantity {
                        return Err(OrderError::InsufficientStock {
                            name: item.name.clone(),
                            available: product.stock,
                        });
                    }
                }

                for item in items {
                    if let Some(product) = rows.get_mut(&item.product_id) {
                        product.stock -= item.quantity;
                        product.updated_at = Utc::now();
                    }
                }

                Ok(())
            })
            .await
    }

    /// Put stock back after a cancellation. Products removed since
    /// placement are skipped.
    async fn restore_stock(&self, items: &[LineItem]) {
        self.store
            .products
            .with_rows_mut(|rows| {
                for item in items {
                    match rows.get_mut(&item.product_id) {
                        Some(product) => {
                            product.stock += item.quantity;
                            product.updated_at = Utc::now();
                        }
                        None => {
                            tracing::debug!(
                                product_id = %item.product_id,
                                "Product gone, skipping restock"
                            );
                        }
                    }
                }
            })
            .await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::value_objects::{OrderStatus, ShippingAddress};
    use crate::domain::product::{NewProduct, Product};
    use futures_util::future::join_all;

    fn create_test_service() -> (Arc<Store>, OrderService) {
        let store = Arc::new(Store::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let service = OrderService::new(store.clone(), metrics);
        (store, service)
    }

    async fn seed_product(store: &Store, name: &str, stock: u32, price: f64) -> Product {
        let product = Product::new(NewProduct {
            name: name.to_string(),
            description: format!("{} description", name),
            price,
            category: "gadgets".to_string(),
            brand: None,
            images: vec![],
            stock,
            features: vec![],
            tags: vec![],
            discount_percentage: None,
        });
        store.products.insert(product).await
    }

    fn draft_for(items: &[(&Product, u32)]) -> OrderDraft {
        let order_items: Vec<LineItem> = items
            .iter()
            .map(|(product, quantity)| LineItem {
                product_id: product.id,
                name: product.name.clone(),
                quantity: *quantity,
                price: product.price,
            })
            .collect();

        let subtotal: f64 = order_items
            .iter()
            .map(|i| i.price * i.quantity as f64)
            .sum();

        OrderDraft {
            order_items,
            shipping_address: ShippingAddress {
                address: "123 Main St".to_string(),
                city: "Anytown".to_string(),
                postal_code: "12345".to_string(),
                country: "USA".to_string(),
            },
            billing_address: None,
            payment_method: "paypal".to_string(),
            subtotal,
            tax_amount: 0.0,
            shipping_amount: 0.0,
            discount_amount: 0.0,
            total_amount: subtotal,
        }
    }

    fn create_test_confirmation() -> PaymentConfirmation {
        PaymentConfirmation {
            id: "PAYID-1".to_string(),
            status: "COMPLETED".to_string(),
            update_time: "2024-01-15T10:00:00Z".to_string(),
            email_address: "buyer@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_place_decrements_stock_and_persists() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 10, 4.0).await;
        let gadget = seed_product(&store, "Gadget", 5, 12.0).await;

        let draft = draft_for(&[(&widget, 2), (&gadget, 1)]);
        let order = service.place(Uuid::new_v4(), draft.clone()).await.unwrap();

        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.items, draft.order_items);
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 8);
        assert_eq!(store.products.get(gadget.id).await.unwrap().stock, 4);
        assert!(store.orders.get(order.id).await.is_some());
    }

    #[tokio::test]
    async fn test_place_rejects_empty_items() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 10, 4.0).await;

        let mut draft = draft_for(&[(&widget, 1)]);
        draft.order_items.clear();

        let result = service.place(Uuid::new_v4(), draft).await;
        assert!(matches!(result.unwrap_err(), OrderError::EmptyItems));
        assert_eq!(store.orders.count().await, 0);
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn test_place_rejects_unknown_product() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 10, 4.0).await;

        let mut draft = draft_for(&[(&widget, 1)]);
        draft.order_items.push(LineItem {
            product_id: Uuid::new_v4(),
            name: "Ghost".to_string(),
            quantity: 1,
            price: 1.0,
        });

        let result = service.place(Uuid::new_v4(), draft).await;
        let err = result.unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(ref name) if name == "Ghost"));
        assert_eq!(err.to_string(), "Product Ghost not found");

        // Nothing was decremented, no order was created
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 10);
        assert_eq!(store.orders.count().await, 0);
    }

    #[tokio::test]
    async fn test_place_with_any_short_item_changes_nothing() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 10, 4.0).await;
        let gadget = seed_product(&store, "Gadget", 1, 12.0).await;

        let draft = draft_for(&[(&widget, 2), (&gadget, 3)]);
        let result = service.place(Uuid::new_v4(), draft).await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InsufficientStock { ref name, available: 1 } if name == "Gadget"
        ));
        assert_eq!(err.to_string(), "Insufficient stock for Gadget. Available: 1");

        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 10);
        assert_eq!(store.products.get(gadget.id).await.unwrap().stock, 1);
        assert_eq!(store.orders.count().await, 0);
    }

    #[tokio::test]
    async fn test_cancel_restores_stock() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 10, 4.0).await;
        let user_id = Uuid::new_v4();

        let order = service
            .place(user_id, draft_for(&[(&widget, 4)]))
            .await
            .unwrap();
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 6);

        let cancelled = service
            .cancel(order.id, user_id, Some("Too slow".to_string()))
            .await
            .unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancelled_by, Some(user_id));
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Too slow"));
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn test_cancel_shipped_order_leaves_stock_and_status() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 10, 4.0).await;
        let user_id = Uuid::new_v4();

        let order = service
            .place(user_id, draft_for(&[(&widget, 4)]))
            .await
            .unwrap();
        service
            .update_status(
                order.id,
                StatusUpdate {
                    status: OrderStatus::Shipped,
                    tracking_number: Some("TRACK-1".to_string()),
                    estimated_delivery: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let result = service.cancel(order.id, user_id, None).await;
        assert!(matches!(result.unwrap_err(), OrderError::CannotCancel(_)));

        let stored = store.orders.get(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Shipped);
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 6);
    }

    #[tokio::test]
    async fn test_cancel_twice_does_not_restock_twice() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 5, 4.0).await;
        let user_id = Uuid::new_v4();

        let order = service
            .place(user_id, draft_for(&[(&widget, 2)]))
            .await
            .unwrap();
        service.cancel(order.id, user_id, None).await.unwrap();
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 5);

        let result = service.cancel(order.id, user_id, None).await;
        assert!(matches!(result.unwrap_err(), OrderError::AlreadyCancelled));
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_cancel_skips_products_removed_since_placement() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 5, 4.0).await;
        let gadget = seed_product(&store, "Gadget", 5, 9.0).await;
        let user_id = Uuid::new_v4();

        let order = service
            .place(user_id, draft_for(&[(&widget, 1), (&gadget, 1)]))
            .await
            .unwrap();
        store.products.remove(gadget.id).await.unwrap();

        let cancelled = service.cancel(order.id, user_id, None).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 5);
        assert!(store.products.get(gadget.id).await.is_none());
    }

    #[tokio::test]
    async fn test_mark_paid_persists_confirmation() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 5, 4.0).await;
        let user_id = Uuid::new_v4();

        let order = service
            .place(user_id, draft_for(&[(&widget, 1)]))
            .await
            .unwrap();
        service
            .mark_paid(order.id, create_test_confirmation())
            .await
            .unwrap();

        let stored = store.orders.get(order.id).await.unwrap();
        assert!(stored.is_paid);
        assert_eq!(stored.payment_result.unwrap().id, "PAYID-1");
    }

    #[tokio::test]
    async fn test_mark_delivered_persists() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 5, 4.0).await;

        let order = service
            .place(Uuid::new_v4(), draft_for(&[(&widget, 1)]))
            .await
            .unwrap();
        service.mark_delivered(order.id).await.unwrap();

        let stored = store.orders.get(order.id).await.unwrap();
        assert!(stored.is_delivered);
        assert_eq!(stored.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_operations_on_missing_order_fail() {
        let (_store, service) = create_test_service();
        let missing = Uuid::new_v4();

        assert!(matches!(
            service.get(missing).await.unwrap_err(),
            OrderError::NotFound
        ));
        assert!(matches!(
            service
                .mark_paid(missing, create_test_confirmation())
                .await
                .unwrap_err(),
            OrderError::NotFound
        ));
        assert!(matches!(
            service.mark_delivered(missing).await.unwrap_err(),
            OrderError::NotFound
        ));
        assert!(matches!(
            service.cancel(missing, Uuid::new_v4(), None).await.unwrap_err(),
            OrderError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_list_for_user_is_scoped_and_newest_first() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 100, 4.0).await;
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = service.place(alice, draft_for(&[(&widget, 1)])).await.unwrap();
        service.place(bob, draft_for(&[(&widget, 1)])).await.unwrap();
        let second = service.place(alice, draft_for(&[(&widget, 1)])).await.unwrap();

        let orders = service.list_for_user(alice).await;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);

        assert_eq!(service.list_all().await.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_placements_cannot_oversell() {
        let (store, service) = create_test_service();
        let widget = seed_product(&store, "Widget", 3, 4.0).await;

        // Two concurrent placements for 2 units each against 3 in stock:
        // exactly one can win the reservation.
        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let service = service.clone();
                let draft = draft_for(&[(&widget, 2)]);
                tokio::spawn(async move { service.place(Uuid::new_v4(), draft).await })
            })
            .collect();

        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let failure = outcomes.into_iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            failure.unwrap_err(),
            OrderError::InsufficientStock { available: 1, .. }
        ));

        assert_eq!(store.products.get(widget.id).await.unwrap().stock, 1);
        assert_eq!(store.orders.count().await, 1);
    }
}
