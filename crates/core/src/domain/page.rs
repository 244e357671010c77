/// 1-based page request. Page numbers below 1 clamp to the first page; page
/// numbers whose row offset would not fit a signed 64-bit SQL `OFFSET` clamp
/// to the last representable page, which simply reads back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u64 = 10;

    pub fn new(page: Option<i64>, per_page: u64) -> Self {
        let per_page = per_page.clamp(1, i64::MAX as u64);
        let last = (i64::MAX as u64 / per_page).max(1);
        let page = page.filter(|p| *p >= 1).unwrap_or(1) as u64;
        Self {
            page: page.min(last),
            per_page,
        }
    }

    pub fn first(per_page: u64) -> Self {
        Self::new(None, per_page)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Zero-based index, as expected by paginating query builders.
    pub fn index(&self) -> u64 {
        self.page - 1
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        self.index() * self.per_page
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_below_one_clamps_to_first() {
        assert_eq!(PageRequest::new(Some(0), 10).page(), 1);
        assert_eq!(PageRequest::new(Some(-3), 10).page(), 1);
        assert_eq!(PageRequest::new(None, 10).index(), 0);
        assert_eq!(PageRequest::new(Some(3), 10).index(), 2);
    }

    #[test]
    fn huge_page_keeps_offset_in_range() {
        let request = PageRequest::new(Some(i64::MAX), 10);

        assert!(request.index().checked_mul(request.per_page()).is_some());
        assert!(request.offset() <= i64::MAX as u64);
        assert_eq!(request.page(), i64::MAX as u64 / 10);

        let single = PageRequest::new(Some(i64::MAX), 1);
        assert_eq!(single.offset(), i64::MAX as u64 - 1);
    }

    #[test]
    fn page_past_the_end_has_no_next() {
        let page = Page::<u8>::new(Vec::new(), PageRequest::new(Some(i64::MAX), 10), 7);

        assert!(page.has_prev());
        assert!(!page.has_next());
        assert!(page.items.is_empty());
    }

    #[test]
    fn page_navigation_uses_total() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(Some(2), 3), 7);

        assert_eq!(page.total_pages(), 3);
        assert!(page.has_prev());
        assert!(page.has_next());

        let last = Page::new(vec![7], PageRequest::new(Some(3), 3), 7);
        assert!(!last.has_next());
    }
}
