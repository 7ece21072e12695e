use actix_web::{web, HttpResponse, Responder};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order placement (throughput, latency)
// - Stock rejections at placement
// - Order status changes and cancellations
// - Product reviews
//
// All metrics are registered with Prometheus and scraped via /metrics on the
// main HTTP server, which also serves /health for liveness probes.
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub orders_placed: IntCounter,
    pub orders_cancelled: IntCounter,
    pub order_status_changes: IntCounterVec,
    pub placement_duration: Histogram,
    pub stock_rejections: IntCounter,

    // Catalog Metrics
    pub reviews_added: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Metrics
        let orders_placed = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let orders_cancelled =
            IntCounter::new("orders_cancelled_total", "Total orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let order_status_changes = IntCounterVec::new(
            Opts::new("order_status_changes_total", "Order status changes"),
            &["status"],
        )?;
        registry.register(Box::new(order_status_changes.clone()))?;

        let placement_duration = Histogram::with_opts(
            HistogramOpts::new("order_placement_duration_seconds", "Order placement duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(placement_duration.clone()))?;

        let stock_rejections = IntCounter::new(
            "stock_rejections_total",
            "Placements rejected for insufficient stock",
        )?;
        registry.register(Box::new(stock_rejections.clone()))?;

        // Catalog Metrics
        let reviews_added =
            IntCounter::new("product_reviews_added_total", "Total product reviews added")?;
        registry.register(Box::new(reviews_added.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            orders_cancelled,
            order_status_changes,
            placement_duration,
            stock_rejections,
            reviews_added,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a successful placement
    pub fn record_order_placed(&self, duration_secs: f64) {
        self.orders_placed.inc();
        self.placement_duration.observe(duration_secs);
    }

    /// Helper to record a cancellation
    pub fn record_order_cancelled(&self) {
        self.orders_cancelled.inc();
        self.order_status_changes
            .with_label_values(&["cancelled"])
            .inc();
    }

    /// Helper to record a status change
    pub fn record_status_change(&self, status: &str) {
        self.order_status_changes.with_label_values(&[status]).inc();
    }

    /// Helper to record a placement rejected for stock
    pub fn record_stock_rejection(&self) {
        self.stock_rejections.inc();
    }

    /// Helper to record a product review
    pub fn record_review_added(&self) {
        self.reviews_added.inc();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

/// Register the operational endpoints on the main HTTP server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler));
}

async fn metrics_handler(metrics: web::Data<Metrics>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry().gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "storefront-api"
    }))
}
