use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// Generic Document Collection
// ============================================================================
//
// This is a GENERIC collection that works with ANY document type.
//
// Type Parameter:
// - `D`: The document type (must implement the Document trait)
//
// Responsibilities:
// 1. Insert, replace and remove documents keyed by their id
// 2. Point lookups and predicate scans
// 3. Guarded in-place updates (rule checks run before anything is committed)
// 4. Batch mutation under a single write guard, so multi-document updates
//    within one collection are all-or-nothing with respect to readers
//
// ============================================================================

/// A document that can be stored in a [`Collection`].
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

pub struct Collection<D: Document> {
    name: &'static str,
    rows: RwLock<HashMap<Uuid, D>>,
}

impl<D: Document> Collection<D> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new document, returning the stored copy.
    pub async fn insert(&self, doc: D) -> D {
        let mut rows = self.rows.write().await;
        rows.insert(doc.id(), doc.clone());

        tracing::debug!(
            collection = self.name,
            document_id = %doc.id(),
            "Document inserted"
        );

        doc
    }

    pub async fn get(&self, id: Uuid) -> Option<D> {
        let rows = self.rows.read().await;
        rows.get(&id).cloned()
    }

    /// Replace the stored document wholesale (insert-or-replace).
    pub async fn save(&self, doc: D) -> D {
        let mut rows = self.rows.write().await;
        rows.insert(doc.id(), doc.clone());
        doc
    }

    /// Apply an infallible mutation to the document, returning the updated
    /// copy. `None` if the document does not exist.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Option<D>
    where
        F: FnOnce(&mut D),
    {
        let mut rows = self.rows.write().await;
        let doc = rows.get_mut(&id)?;
        f(doc);
        Some(doc.clone())
    }

    /// Apply a fallible mutation. The mutation runs against a working copy
    /// and only commits when it returns `Ok`, so a rejected rule change
    /// never leaves a half-updated document behind.
    ///
    /// `None` if the document does not exist; `Some(Err(_))` if the
    /// mutation was rejected.
    pub async fn try_update<F, E>(&self, id: Uuid, f: F) -> Option<Result<D, E>>
    where
        F: FnOnce(&mut D) -> Result<(), E>,
    {
        let mut rows = self.rows.write().await;
        let current = rows.get(&id)?;

        let mut updated = current.clone();
        match f(&mut updated) {
            Ok(()) => {
                rows.insert(id, updated.clone());
                Some(Ok(updated))
            }
            Err(e) => Some(Err(e)),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Option<D> {
        let mut rows = self.rows.write().await;
        let removed = rows.remove(&id);

        if removed.is_some() {
            tracing::debug!(
                collection = self.name,
                document_id = %id,
                "Document removed"
            );
        }

        removed
    }

    /// Collect every document matching the predicate. Results carry no
    /// ordering guarantee; callers sort.
    pub async fn find<P>(&self, pred: P) -> Vec<D>
    where
        P: Fn(&D) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values().filter(|d| pred(d)).cloned().collect()
    }

    pub async fn find_one<P>(&self, pred: P) -> Option<D>
    where
        P: Fn(&D) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values().find(|d| pred(d)).cloned()
    }

    pub async fn count(&self) -> usize {
        let rows = self.rows.read().await;
        rows.len()
    }

    /// Run `f` against the raw row map under a single write guard.
    ///
    /// This is the escape hatch for conditional multi-document updates
    /// (stock reservation claims every line item or nothing at all).
    /// Concurrent callers serialize here, which is what makes the
    /// check-and-decrement free of the oversell race.
    pub(crate) async fn with_rows_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<Uuid, D>) -> R,
    {
        let mut rows = self.rows.write().await;
        f(&mut rows)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
