use serde::Serialize;

/// One page of an ordered collection, plus what a pager needs to render itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagedCollection<T> {
    items: Vec<T>,
    page_number: usize,
    page_size: usize,
    total_items: usize,
    total_pages: usize,
}

impl<T: Clone> PagedCollection<T> {
    /// Cut page `page_number` (1-indexed) of `page_size` items out of `all`
    ///
    /// A page past the end is empty but still reports the totals. Returns `None` if
    /// `page_size` or `page_number` is zero.
    #[must_use]
    pub fn paginate(all: &[T], page_size: usize, page_number: usize) -> Option<Self> {
        if page_size == 0 || page_number == 0 {
            return None;
        }

        let items = all
            .iter()
            .skip(page_size.saturating_mul(page_number - 1))
            .take(page_size)
            .cloned()
            .collect();

        Some(Self {
            items,
            page_number,
            page_size,
            total_items: all.len(),
            total_pages: all.len().div_ceil(page_size),
        })
    }
}

impl<T> PagedCollection<T> {
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub const fn page_number(&self) -> usize {
        self.page_number
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.total_items
    }

    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Whether a page precedes this one
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    /// Whether a page follows this one
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }
}
