use serde::Deserialize;

// ============================================================================
// Pagination
// ============================================================================

/// Query-string pagination. Pages are 1-based; anything below 1 is
/// treated as page 1.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "pageNumber")]
    pub page_number: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page_number.unwrap_or(1).max(1)
    }
}

/// One page of a result list plus the bookkeeping the frontend renders.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub pages: u32,
    pub total: usize,
}

/// Slice a sorted result set into one page. A page past the end comes
/// back empty with the counts intact.
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: usize) -> Page<T> {
    let total = items.len();
    let pages = total.div_ceil(page_size) as u32;

    let items = items
        .into_iter()
        .skip((page as usize - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        pages,
        total,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
