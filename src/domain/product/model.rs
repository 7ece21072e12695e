use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ProductError;
use super::value_objects::{CatalogFilter, NewProduct, ProductUpdate, Review};
use crate::store::Document;

// ============================================================================
// Product - Domain Logic
// ============================================================================
//
// `rating` and `num_reviews` are derived from the review list and
// recomputed on every append; nothing sets them directly. Stock arithmetic
// lives with the order placement path, which batches it under the products
// write guard; here the only stock rule is the type itself (u32, so a
// committed value can never be negative).
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    // Identity
    pub id: Uuid,

    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub brand: Option<String>,
    pub images: Vec<String>,

    pub stock: u32,

    // Derived from reviews
    pub rating: f64,
    pub num_reviews: u32,
    pub reviews: Vec<Review>,

    pub is_active: bool,
    pub is_featured: bool,
    pub features: Vec<String>,
    pub tags: Vec<String>,
    pub discount_percentage: Option<f64>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            brand: input.brand,
            images: input.images,
            stock: input.stock,
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            is_active: true,
            is_featured: false,
            features: input.features,
            tags: input.tags,
            discount_percentage: input.discount_percentage,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; absent fields keep their current values.
    pub fn apply_update(&mut self, changes: ProductUpdate) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(brand) = changes.brand {
            self.brand = Some(brand);
        }
        if let Some(images) = changes.images {
            self.images = images;
        }
        if let Some(stock) = changes.stock {
            self.stock = stock;
        }
        if let Some(features) = changes.features {
            self.features = features;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(discount_percentage) = changes.discount_percentage {
            self.discount_percentage = Some(discount_percentage);
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        if let Some(is_featured) = changes.is_featured {
            self.is_featured = is_featured;
        }

        self.updated_at = Utc::now();
    }

    /// Append a review and recompute the aggregates. Rejects a second
    /// review from the same user.
    pub fn add_review(&mut self, review: Review) -> Result<(), ProductError> {
        if !(1..=5).contains(&review.rating) {
            return Err(ProductError::InvalidRating(review.rating));
        }
        if self.reviews.iter().any(|r| r.user_id == review.user_id) {
            return Err(ProductError::AlreadyReviewed);
        }

        self.reviews.push(review);
        self.num_reviews = self.reviews.len() as u32;
        self.rating =
            self.reviews.iter().map(|r| r.rating as f64).sum::<f64>() / self.reviews.len() as f64;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Catalog filter match: keyword is a case-insensitive substring over
    /// name/description/category, category is an exact match, prices are
    /// inclusive bounds.
    pub fn matches(&self, filter: &CatalogFilter) -> bool {
        if let Some(keyword) = &filter.keyword {
            let needle = keyword.to_lowercase();
            let hit = self.name.to_lowercase().contains(&needle)
                || self.description.to_lowercase().contains(&needle)
                || self.category.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(category) = &filter.category {
            if &self.category != category {
                return false;
            }
        }

        if let Some(min_price) = filter.min_price {
            if self.price < min_price {
                return false;
            }
        }

        if let Some(max_price) = filter.max_price {
            if self.price > max_price {
                return false;
            }
        }

        if let Some(featured) = filter.featured {
            if self.is_featured != featured {
                return false;
            }
        }

        true
    }
}

impl Document for Product {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
