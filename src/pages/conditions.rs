use crate::cache::{Clock, TtlGate};
use crate::form::{ConditionForm, FormError, validate_nlp_input};
use crate::models::{Condition, ConditionQuery};
use crate::notify::Level;
use crate::pagination::Pagination;

use super::{LoadOutcome, Page, PageContext};

/// The fetched list plus the query that produced it. Outlives a single
/// page instance so that returning to the tab within the TTL does not
/// refetch.
#[derive(Debug, Clone)]
pub struct ConditionsCache {
    items: Vec<Condition>,
    pagination: Pagination,
    name_filter: Option<String>,
    gate: TtlGate,
}

impl ConditionsCache {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(page_size),
            name_filter: None,
            gate: TtlGate::conditions(),
        }
    }
}

pub struct ConditionsPage {
    cache: ConditionsCache,
    clock: Box<dyn Clock>,
    form: Option<ConditionForm>,
    selected: usize,
}

impl ConditionsPage {
    pub fn new(page_size: u32, clock: Box<dyn Clock>) -> Self {
        Self::with_cache(ConditionsCache::new(page_size), clock)
    }

    pub fn with_cache(cache: ConditionsCache, clock: Box<dyn Clock>) -> Self {
        Self {
            cache,
            clock,
            form: None,
            selected: 0,
        }
    }

    pub fn into_cache(self) -> ConditionsCache {
        self.cache
    }

    pub fn items(&self) -> &[Condition] {
        &self.cache.items
    }

    pub fn pagination(&self) -> &Pagination {
        &self.cache.pagination
    }

    pub fn name_filter(&self) -> Option<&str> {
        self.cache.name_filter.as_deref()
    }

    pub fn form(&self) -> Option<&ConditionForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ConditionForm> {
        self.form.as_mut()
    }

    pub fn selected(&self) -> Option<&Condition> {
        self.cache.items.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.cache.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Fetch the current page unless a non-empty list was fetched within
    /// the TTL. A cache hit changes nothing.
    pub fn load_data(&mut self, ctx: &mut PageContext<'_>) -> LoadOutcome {
        let now = self.clock.now();
        if self.cache.gate.is_fresh(now) && !self.cache.items.is_empty() {
            tracing::debug!("conditions served from cache");
            return LoadOutcome::Cached;
        }

        let query = ConditionQuery {
            name: self.cache.name_filter.clone(),
            page: self.cache.pagination.page,
            page_size: self.cache.pagination.page_size,
        };
        match ctx.api.list_conditions(&query) {
            Ok(page) => {
                self.cache.items = page.items;
                self.cache.pagination.update(page.total, page.total_pages);
                self.cache.gate.mark(now);
                if self.selected >= self.cache.items.len() {
                    self.selected = self.cache.items.len().saturating_sub(1);
                }
                LoadOutcome::Loaded
            }
            Err(err) => {
                ctx.report("Failed to load conditions", &err);
                LoadOutcome::Failed
            }
        }
    }

    pub fn refresh(&mut self, ctx: &mut PageContext<'_>) -> LoadOutcome {
        self.cache.gate.invalidate();
        self.load_data(ctx)
    }

    pub fn set_name_filter(&mut self, name: &str, ctx: &mut PageContext<'_>) -> LoadOutcome {
        self.open_at(Some(name), 1, ctx)
    }

    /// Set the name filter and fetch `page` of it in a single request.
    pub fn open_at(&mut self, name: Option<&str>, page: u32, ctx: &mut PageContext<'_>) -> LoadOutcome {
        self.cache.name_filter = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self.cache.pagination.seek(page);
        self.selected = 0;
        self.refresh(ctx)
    }

    /// Returns `None` when the requested page is the current one. A failed
    /// fetch stays on the previous page.
    pub fn go_to_page(&mut self, page: u32, ctx: &mut PageContext<'_>) -> Option<LoadOutcome> {
        let previous = self.cache.pagination.page;
        if !self.cache.pagination.go_to(page) {
            return None;
        }
        self.selected = 0;
        let outcome = self.refresh(ctx);
        if outcome == LoadOutcome::Failed {
            self.cache.pagination.page = previous;
        }
        Some(outcome)
    }

    pub fn open_create(&mut self) {
        self.form = Some(ConditionForm::new());
    }

    /// Opens the form for a listed condition; the form is rebuilt from the
    /// condition every time, discarding edits from a previous opening.
    pub fn open_edit(&mut self, id: i64) -> bool {
        match self.cache.items.iter().find(|c| c.id == id) {
            Some(condition) => {
                self.form = Some(ConditionForm::edit(condition));
                true
            }
            None => false,
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Create or update from the open form. On success the form closes and
    /// the list is refetched; on failure the form stays open as it was.
    pub fn submit_form(&mut self, ctx: &mut PageContext<'_>) -> bool {
        let Some(form) = &self.form else {
            return false;
        };
        let payload = match form.to_payload() {
            Ok(payload) => payload,
            Err(FormError::NameRequired) => {
                ctx.notifier.toast(Level::Warning, "Please enter a condition name");
                return false;
            }
            Err(err) => {
                ctx.notifier.toast(Level::Warning, &err.to_string());
                return false;
            }
        };
        let editing_id = form.editing_id;

        ctx.notifier.loading(true);
        let result = match editing_id {
            Some(id) => ctx.api.update_condition(id, &payload),
            None => ctx.api.create_condition(&payload),
        };
        ctx.notifier.loading(false);

        match result {
            Ok(()) => {
                let message = if editing_id.is_some() {
                    "Condition updated"
                } else {
                    "Condition created"
                };
                tracing::info!(name = %payload.name, ?editing_id, "condition saved");
                ctx.notifier.toast(Level::Success, message);
                self.form = None;
                self.refresh(ctx);
                true
            }
            Err(err) => {
                ctx.report("Failed to save condition", &err);
                false
            }
        }
    }

    pub fn delete(&mut self, id: i64, ctx: &mut PageContext<'_>) -> bool {
        match ctx.api.delete_condition(id) {
            Ok(()) => {
                tracing::info!(id, "condition deleted");
                ctx.notifier.toast(Level::Success, "Condition deleted");
                self.refresh(ctx);
                true
            }
            Err(err) => {
                ctx.report("Failed to delete condition", &err);
                false
            }
        }
    }

    /// Ask the service to turn free text into a condition and open the
    /// result in the form for review. Nothing is saved here.
    pub fn parse_natural_language(&mut self, text: &str, ctx: &mut PageContext<'_>) -> bool {
        let text = match validate_nlp_input(text) {
            Ok(text) => text,
            Err(err) => {
                ctx.notifier.toast(Level::Warning, &err.to_string());
                return false;
            }
        };

        ctx.notifier.loading(true);
        let result = ctx.api.parse_natural_language(text);
        ctx.notifier.loading(false);

        match result {
            Ok(parsed) => {
                let mut form = self.form.take().unwrap_or_default();
                form.apply_parsed(&parsed);
                self.form = Some(form);
                ctx.notifier
                    .toast(Level::Info, "Criteria parsed. Review the form and save");
                true
            }
            Err(err) => {
                ctx.report("Failed to parse the description", &err);
                false
            }
        }
    }
}

impl Page for ConditionsPage {
    fn title(&self) -> &'static str {
        "Conditions"
    }

    fn activate(&mut self, ctx: &mut PageContext<'_>) {
        self.load_data(ctx);
    }

    fn deactivate(&mut self) {
        self.form = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, ManualClock, RecordingNotifier, condition};

    fn page_with(clock: &ManualClock) -> ConditionsPage {
        ConditionsPage::new(2, Box::new(clock.clone()))
    }

    fn seeded() -> FakeApi {
        FakeApi::with_conditions(vec![
            condition(1, "Backend"),
            condition(2, "Frontend"),
            condition(3, "Data"),
        ])
    }

    #[test]
    fn test_two_loads_within_ttl_hit_network_once() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);

        assert_eq!(page.load_data(&mut ctx), LoadOutcome::Loaded);
        clock.advance_secs(4 * 60 + 59);
        assert_eq!(page.load_data(&mut ctx), LoadOutcome::Cached);
        assert_eq!(api.call_count("list_conditions"), 1);

        clock.advance_secs(1);
        assert_eq!(page.load_data(&mut ctx), LoadOutcome::Loaded);
        assert_eq!(api.call_count("list_conditions"), 2);
    }

    #[test]
    fn test_empty_list_is_never_served_from_cache() {
        let api = FakeApi::default();
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);

        page.load_data(&mut ctx);
        page.load_data(&mut ctx);
        assert_eq!(api.call_count("list_conditions"), 2);
    }

    #[test]
    fn test_every_explicit_refresh_bypasses_cache() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        page.load_data(&mut ctx);

        assert_eq!(page.go_to_page(2, &mut ctx), Some(LoadOutcome::Loaded));
        assert_eq!(page.set_name_filter("end", &mut ctx), LoadOutcome::Loaded);

        page.open_create();
        page.form_mut().unwrap().name = "Mobile".to_string();
        assert!(page.submit_form(&mut ctx));

        page.open_edit(1);
        page.form_mut().unwrap().name = "Backend Senior".to_string();
        assert!(page.submit_form(&mut ctx));

        assert!(page.delete(2, &mut ctx));

        // initial + page + filter + create + update + delete, no time passing
        assert_eq!(api.call_count("list_conditions"), 6);
    }

    #[test]
    fn test_filter_change_resets_to_first_page() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        page.load_data(&mut ctx);
        page.go_to_page(2, &mut ctx);
        assert_eq!(page.pagination().page, 2);

        page.set_name_filter("  back ", &mut ctx);
        let last = api.condition_queries.borrow().last().cloned().unwrap();
        assert_eq!(last.page, 1);
        assert_eq!(last.name.as_deref(), Some("back"));
        assert_eq!(page.items().len(), 1);

        page.set_name_filter("", &mut ctx);
        assert_eq!(page.name_filter(), None);
    }

    #[test]
    fn test_same_page_is_a_no_op() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        page.load_data(&mut ctx);
        assert_eq!(page.go_to_page(1, &mut ctx), None);
        assert_eq!(api.call_count("list_conditions"), 1);
    }

    #[test]
    fn test_load_failure_keeps_previous_items() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        {
            let mut ctx = PageContext::new(&api, &mut notifier);
            page.load_data(&mut ctx);
            api.fail_with("database unavailable");
            assert_eq!(page.refresh(&mut ctx), LoadOutcome::Failed);
        }
        assert_eq!(page.items().len(), 2);
        assert_eq!(
            notifier.last(),
            Some(&(Level::Error, "database unavailable".to_string()))
        );
    }

    #[test]
    fn test_failed_page_change_stays_on_previous_page() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        let mut ctx = PageContext::new(&api, &mut notifier);
        page.load_data(&mut ctx);
        api.fail_silently.set(true);

        assert_eq!(page.go_to_page(2, &mut ctx), Some(LoadOutcome::Failed));
        assert_eq!(page.pagination().page, 1);
        assert_eq!(page.items()[0].id, 1);
    }

    #[test]
    fn test_open_at_fetches_requested_page_once() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        let mut ctx = PageContext::new(&api, &mut notifier);

        assert_eq!(page.open_at(Some("  "), 2, &mut ctx), LoadOutcome::Loaded);
        assert_eq!(api.call_count("list_conditions"), 1);
        assert_eq!(api.condition_queries.borrow()[0].page, 2);
        assert_eq!(page.name_filter(), None);
        assert_eq!(page.items()[0].name, "Data");
    }

    #[test]
    fn test_blank_name_blocks_submission() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        {
            let mut ctx = PageContext::new(&api, &mut notifier);
            page.open_create();
            assert!(!page.submit_form(&mut ctx));
        }
        assert!(page.form().is_some());
        assert_eq!(api.call_count("create_condition"), 0);
        assert_eq!(notifier.count(Level::Warning), 1);
    }

    #[test]
    fn test_submit_sends_normalized_payload() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);

        page.open_create();
        let form = page.form_mut().unwrap();
        form.name = "Backend Engineer".to_string();
        form.experience_years = "abc".to_string();
        assert!(page.submit_form(&mut ctx));

        let payload = api.payloads.borrow()[0].clone();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "name": "Backend Engineer",
                "is_active": true,
                "config": {"skills": [], "major": []}
            })
        );
        assert!(page.form().is_none());
    }

    #[test]
    fn test_save_failure_uses_server_message_or_fallback() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        {
            let mut ctx = PageContext::new(&api, &mut notifier);
            page.open_create();
            page.form_mut().unwrap().name = "Backend".to_string();
            api.fail_with("Name already exists");
            assert!(!page.submit_form(&mut ctx));
            api.recover();
            api.fail_silently.set(true);
            assert!(!page.submit_form(&mut ctx));
        }
        assert!(page.form().is_some());
        let messages: Vec<&str> = notifier.toasts.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(messages, vec!["Name already exists", "Failed to save condition"]);
        assert_eq!(notifier.loading_changes, vec![true, false, true, false]);
    }

    #[test]
    fn test_edit_rebuilds_tags_from_condition() {
        let mut backend = condition(1, "Backend");
        backend.config.skills = vec!["Rust".to_string()];
        let api = FakeApi::with_conditions(vec![backend]);
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        page.load_data(&mut ctx);

        assert!(page.open_edit(1));
        let skills = &mut page.form_mut().unwrap().skills;
        skills.push_char('G');
        skills.push_char('o');
        skills.commit();
        page.close_form();

        assert!(page.open_edit(1));
        assert_eq!(page.form().unwrap().skills.values(), vec!["Rust"]);
        assert!(!page.open_edit(99));
    }

    #[test]
    fn test_short_nlp_input_is_rejected_locally() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let clock = ManualClock::new();
        let mut page = page_with(&clock);
        {
            let mut ctx = PageContext::new(&api, &mut notifier);
            assert!(!page.parse_natural_language("ok", &mut ctx));
        }
        assert_eq!(api.call_count("parse_natural_language"), 0);
        assert_eq!(notifier.last().map(|(l, _)| *l), Some(Level::Warning));
        assert!(page.form().is_none());
    }

    #[test]
    fn test_nlp_result_opens_prefilled_form() {
        let api = seeded();
        *api.parsed.borrow_mut() = crate::models::ParsedCondition {
            name: Some("Go developer".to_string()),
            description: None,
            config: Some(crate::models::ConditionConfig {
                skills: vec!["Go".to_string()],
                experience_years: Some(3),
                ..Default::default()
            }),
        };
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();
        let mut page = page_with(&clock);

        assert!(page.parse_natural_language("Go developer, 3+ years", &mut ctx));
        let form = page.form().unwrap();
        assert_eq!(form.name, "Go developer");
        assert_eq!(form.experience_years, "3");
        assert!(!form.is_edit());
        assert_eq!(api.call_count("create_condition"), 0);
    }

    #[test]
    fn test_cache_survives_navigation() {
        let api = seeded();
        let mut notifier = RecordingNotifier::default();
        let mut ctx = PageContext::new(&api, &mut notifier);
        let clock = ManualClock::new();

        let mut page = page_with(&clock);
        page.activate(&mut ctx);
        page.deactivate();
        let cache = page.into_cache();

        clock.advance_secs(60);
        let mut page = ConditionsPage::with_cache(cache, Box::new(clock.clone()));
        page.activate(&mut ctx);
        assert_eq!(page.items().len(), 2);
        assert_eq!(api.call_count("list_conditions"), 1);
    }
}
