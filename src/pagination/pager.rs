// Page slicing and navigation metadata

use serde::Serialize;

/// The visible window of a state's item list.
///
/// `offset >= items.len()` yields the empty slice; callers must tolerate an
/// empty page without raising.
pub fn slice_page<T>(items: &[T], offset: usize, page_size: usize) -> &[T] {
    if offset >= items.len() {
        return &[];
    }
    let end = offset.saturating_add(page_size).min(items.len());
    &items[offset..end]
}

/// Everything a consumer needs to render previous/next/jump controls and
/// compute new offsets client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Navigator {
    pub count: usize,
    pub offset: usize,
    pub page_size: usize,
}

impl Navigator {
    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset.saturating_add(self.page_size) < self.count
    }
}
