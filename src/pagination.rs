/// 1-based page cursor plus the counters the last list response reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            total: 0,
            total_pages: 0,
        }
    }

    pub fn update(&mut self, total: u64, total_pages: u32) {
        self.total = total;
        self.total_pages = total_pages;
    }

    fn last_page(&self) -> u32 {
        self.total_pages.max(1)
    }

    /// Jump to `page` before any totals are known. The server decides
    /// whether it exists.
    pub fn seek(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Move to `page`, clamped to the known range. Returns whether it changed.
    pub fn go_to(&mut self, page: u32) -> bool {
        let target = page.clamp(1, self.last_page());
        if target == self.page {
            return false;
        }
        self.page = target;
        true
    }

    pub fn next_page(&self) -> u32 {
        self.page.saturating_add(1)
    }

    pub fn prev_page(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    pub fn summary(&self) -> String {
        format!("Page {} of {} ({} total)", self.page, self.last_page(), self.total)
    }
}
