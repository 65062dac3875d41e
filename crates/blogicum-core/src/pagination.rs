//! Fixed-size page splitting for ordered listings.

use serde::Serialize;

/// Default number of posts per listing page.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Splits a result set of known size into 1-indexed pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    /// A paginator with `per_page` items per page (at least one).
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages for `total` items. An empty set still has one page.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `page` query value to a valid page number.
    ///
    /// Missing or non-numeric values give the first page, `"last"` gives the
    /// last page, and out-of-range numbers clamp to the nearest valid page.
    pub fn page_number(&self, total: u64, requested: Option<&str>) -> u64 {
        let num_pages = self.num_pages(total);
        let Some(raw) = requested.map(str::trim) else {
            return 1;
        };
        if raw == "last" {
            return num_pages;
        }
        match raw.parse::<i64>() {
            Ok(n) if n < 1 => 1,
            Ok(n) => (n as u64).min(num_pages),
            Err(_) => 1,
        }
    }

    /// Describe the page selected by `requested` out of `total` items.
    pub fn page(&self, total: u64, requested: Option<&str>) -> PageInfo {
        PageInfo {
            number: self.page_number(total, requested),
            num_pages: self.num_pages(total),
            per_page: self.per_page,
            total,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// Position of one page within a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PageInfo {
    /// Number of items to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    /// Maximum number of items on this page.
    pub fn limit(&self) -> u64 {
        self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Slice an already ordered, unpaginated collection down to this page.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}

/// One page of items plus its position.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, info: PageInfo) -> Self {
        Self { items, info }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
