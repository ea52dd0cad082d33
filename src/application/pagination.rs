//! Page-number pagination helpers.
//!
//! Out-of-band values follow the forgiving coercion the listing pages rely
//! on: a missing or non-numeric `page` parameter selects the first page and
//! an overflowing one selects the last, so stale links keep working.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total_items: u64,
    page_size: u64,
}

/// A resolved page: which slice of the result set to fetch and how the
/// navigation around it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn previous_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }
}

impl Paginator {
    pub fn new(total_items: u64, page_size: u64) -> Self {
        Self {
            total_items,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.total_items == 0 {
            1
        } else {
            self.total_items.div_ceil(self.page_size)
        }
    }

    /// Resolve a raw `page` query parameter into a concrete page.
    pub fn get_page(&self, raw: Option<&str>) -> Page {
        let requested = raw
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(1)
            .max(1);

        let total_pages = self.total_pages();
        let number = requested.min(total_pages);

        Page {
            number,
            total_pages,
            total_items: self.total_items,
            offset: (number - 1) * self.page_size,
            limit: self.page_size,
        }
    }
}
