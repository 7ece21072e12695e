use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::store::Store;

use super::errors::ProductError;
use super::model::Product;
use super::value_objects::{CatalogFilter, NewProduct, NewReview, ProductUpdate, Review};

// ============================================================================
// Catalog Service
// ============================================================================
//
// Catalog reads serve active products only; the administrative surface
// (create/update/delete, unfiltered list) sees everything. Review appends
// go through the guarded update so the duplicate check and the aggregate
// recompute commit together.
//
// ============================================================================

pub const TOP_PRODUCTS_LIMIT: usize = 5;
pub const FEATURED_PRODUCTS_LIMIT: usize = 8;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<Store>,
    metrics: Arc<Metrics>,
}

impl CatalogService {
    pub fn new(store: Arc<Store>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub async fn create(&self, input: NewProduct) -> Product {
        let product = self.store.products.insert(Product::new(input)).await;

        tracing::info!(
            product_id = %product.id,
            name = %product.name,
            stock = product.stock,
            "✅ Product created"
        );

        product
    }

    pub async fn update(
        &self,
        product_id: Uuid,
        changes: ProductUpdate,
    ) -> Result<Product, ProductError> {
        self.store
            .products
            .update(product_id, |product| product.apply_update(changes))
            .await
            .ok_or(ProductError::NotFound)
    }

    pub async fn delete(&self, product_id: Uuid) -> Result<(), ProductError> {
        self.store
            .products
            .remove(product_id)
            .await
            .ok_or(ProductError::NotFound)?;

        tracing::info!(product_id = %product_id, "Product removed");
        Ok(())
    }

    /// Fetch one active product. Inactive products behave as missing.
    pub async fn get(&self, product_id: Uuid) -> Result<Product, ProductError> {
        self.store
            .products
            .get(product_id)
            .await
            .filter(|p| p.is_active)
            .ok_or(ProductError::NotFound)
    }

    /// Active products matching the filter, newest first.
    pub async fn search(&self, filter: &CatalogFilter) -> Vec<Product> {
        let mut products = self
            .store
            .products
            .find(|p| p.is_active && p.matches(filter))
            .await;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products
    }

    /// Best-rated active products.
    pub async fn top_rated(&self) -> Vec<Product> {
        let mut products = self.store.products.find(|p| p.is_active).await;
        products.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
        products.truncate(TOP_PRODUCTS_LIMIT);
        products
    }

    /// Featured active products, newest first.
    pub async fn featured(&self) -> Vec<Product> {
        let mut products = self
            .store
            .products
            .find(|p| p.is_active && p.is_featured)
            .await;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(FEATURED_PRODUCTS_LIMIT);
        products
    }

    /// Every product regardless of visibility (administrative).
    pub async fn list_all(&self) -> Vec<Product> {
        let mut products = self.store.products.find(|_| true).await;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products
    }

    /// Append a review on behalf of a user, snapshotting their display name.
    pub async fn add_review(
        &self,
        product_id: Uuid,
        reviewer_id: Uuid,
        reviewer_name: &str,
        input: NewReview,
    ) -> Result<Product, ProductError> {
        let review = Review {
            id: Uuid::new_v4(),
            user_id: reviewer_id,
            name: reviewer_name.to_string(),
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
        };

        let product = self
            .store
            .products
            .try_update(product_id, |product| product.add_review(review))
            .await
            .ok_or(ProductError::NotFound)??;

        self.metrics.record_review_added();
        tracing::info!(
            product_id = %product.id,
            rating = product.rating,
            num_reviews = product.num_reviews,
            "⭐ Review added"
        );

        Ok(product)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
