use crate::models::{Talent, TalentFilters};
use crate::pagination::Pagination;

use super::{LoadOutcome, Page, PageContext};

/// Filter fields the user controls; pagination is tracked separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TalentSearch {
    pub name: Option<String>,
    pub education_level: Option<String>,
    pub screening_status: Option<String>,
}

pub struct TalentsPage {
    items: Vec<Talent>,
    pagination: Pagination,
    search: TalentSearch,
    detail: Option<Talent>,
    selected: usize,
}

impl TalentsPage {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(page_size),
            search: TalentSearch::default(),
            detail: None,
            selected: 0,
        }
    }

    pub fn items(&self) -> &[Talent] {
        &self.items
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn search(&self) -> &TalentSearch {
        &self.search
    }

    pub fn detail(&self) -> Option<&Talent> {
        self.detail.as_ref()
    }

    pub fn selected(&self) -> Option<&Talent> {
        self.items.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn filters(&self) -> TalentFilters {
        TalentFilters {
            name: self.search.name.clone(),
            education_level: self.search.education_level.clone(),
            screening_status: self.search.screening_status.clone(),
            page: self.pagination.page,
            page_size: self.pagination.page_size,
        }
    }

    pub fn load_data(&mut self, ctx: &mut PageContext<'_>) -> LoadOutcome {
        match ctx.api.list_talents(&self.filters()) {
            Ok(page) => {
                self.items = page.items;
                self.pagination.update(page.total, page.total_pages);
                if self.selected >= self.items.len() {
                    self.selected = self.items.len().saturating_sub(1);
                }
                LoadOutcome::Loaded
            }
            Err(err) => {
                ctx.report("Failed to load talents", &err);
                LoadOutcome::Failed
            }
        }
    }

    /// Apply new filters and start again from page 1. Blank values clear a filter.
    pub fn set_search(&mut self, search: TalentSearch, ctx: &mut PageContext<'_>) -> LoadOutcome {
        self.search_at(search, 1, ctx)
    }

    /// Apply filters and fetch `page` of the result in a single request.
    pub fn search_at(
        &mut self,
        search: TalentSearch,
        page: u32,
        ctx: &mut PageContext<'_>,
    ) -> LoadOutcome {
        self.search = TalentSearch {
            name: clean(search.name),
            education_level: clean(search.education_level),
            screening_status: clean(search.screening_status),
        };
        self.pagination.seek(page);
        self.selected = 0;
        self.load_data(ctx)
    }

    pub fn set_name(&mut self, name: &str, ctx: &mut PageContext<'_>) -> LoadOutcome {
        let search = TalentSearch {
            name: Some(name.to_string()),
            ..self.search.clone()
        };
        self.set_search(search, ctx)
    }

    pub fn go_to_page(&mut self, page: u32, ctx: &mut PageContext<'_>) -> Option<LoadOutcome> {
        let previous = self.pagination.page;
        if !self.pagination.go_to(page) {
            return None;
        }
        self.selected = 0;
        let outcome = self.load_data(ctx);
        if outcome == LoadOutcome::Failed {
            self.pagination.page = previous;
        }
        Some(outcome)
    }

    pub fn show_detail(&mut self, id: i64, ctx: &mut PageContext<'_>) -> bool {
        match ctx.api.talent_detail(id) {
            Ok(talent) => {
                self.detail = Some(talent);
                true
            }
            Err(err) => {
                ctx.report("Failed to load talent details", &err);
                false
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Page for TalentsPage {
    fn title(&self) -> &'static str {
        "Talents"
    }

    fn activate(&mut self, ctx: &mut PageContext<'_>) {
        self.load_data(ctx);
    }

    fn deactivate(&mut self) {
        self.detail = None;
    }
}
