//! Test doubles shared by the page controller tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::api::{ApiError, ScreeningApi};
use crate::cache::Clock;
use crate::models::{
    Condition, ConditionConfig, ConditionPayload, ConditionQuery, Page, ParsedCondition,
    ScreeningResult, Talent, TalentFilters,
};
use crate::notify::{Level, Notifier};
use crate::upload::SelectedFile;

/// In-memory API that records every call. Set `failure` to make the next
/// calls fail with that server message.
#[derive(Default)]
pub struct FakeApi {
    pub calls: RefCell<Vec<String>>,
    pub conditions: RefCell<Vec<Condition>>,
    pub talents: RefCell<Vec<Talent>>,
    pub parsed: RefCell<ParsedCondition>,
    pub screening: RefCell<Option<ScreeningResult>>,
    pub payloads: RefCell<Vec<ConditionPayload>>,
    pub condition_queries: RefCell<Vec<ConditionQuery>>,
    pub talent_queries: RefCell<Vec<TalentFilters>>,
    pub uploads: RefCell<Vec<(String, Option<i64>)>>,
    pub failure: RefCell<Option<String>>,
    pub fail_silently: Cell<bool>,
}

impl FakeApi {
    pub fn with_conditions(conditions: Vec<Condition>) -> Self {
        let api = Self::default();
        *api.conditions.borrow_mut() = conditions;
        api
    }

    pub fn with_talents(talents: Vec<Talent>) -> Self {
        let api = Self::default();
        *api.talents.borrow_mut() = talents;
        api
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.borrow_mut() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.failure.borrow_mut() = None;
        self.fail_silently.set(false);
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        if self.fail_silently.get() {
            return Err(ApiError::Status {
                status: 502,
                message: None,
            });
        }
        match self.failure.borrow().as_ref() {
            Some(message) => Err(ApiError::Rejected {
                message: Some(message.clone()),
            }),
            None => Ok(()),
        }
    }

    fn page<T: Clone>(items: &[T], page: u32, page_size: u32) -> Page<T> {
        let size = page_size.max(1) as usize;
        let start = (page.saturating_sub(1) as usize) * size;
        Page {
            items: items.iter().skip(start).take(size).cloned().collect(),
            total: items.len() as u64,
            total_pages: items.len().div_ceil(size) as u32,
        }
    }
}

impl ScreeningApi for FakeApi {
    fn list_conditions(&self, query: &ConditionQuery) -> Result<Page<Condition>, ApiError> {
        self.record(format!("list_conditions page={}", query.page))?;
        self.condition_queries.borrow_mut().push(query.clone());
        let all = self.conditions.borrow();
        let matching: Vec<Condition> = all
            .iter()
            .filter(|c| match &query.name {
                Some(name) => c.name.to_lowercase().contains(&name.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(Self::page(&matching, query.page, query.page_size))
    }

    fn create_condition(&self, payload: &ConditionPayload) -> Result<(), ApiError> {
        self.record("create_condition".to_string())?;
        self.payloads.borrow_mut().push(payload.clone());
        let id = self.conditions.borrow().iter().map(|c| c.id).max().unwrap_or(0) + 1;
        self.conditions.borrow_mut().push(Condition {
            id,
            name: payload.name.clone(),
            description: payload.description.clone(),
            is_active: payload.is_active,
            config: payload.config.clone(),
            created_at: None,
        });
        Ok(())
    }

    fn update_condition(&self, id: i64, payload: &ConditionPayload) -> Result<(), ApiError> {
        self.record(format!("update_condition {}", id))?;
        self.payloads.borrow_mut().push(payload.clone());
        if let Some(existing) = self.conditions.borrow_mut().iter_mut().find(|c| c.id == id) {
            existing.name = payload.name.clone();
            existing.description = payload.description.clone();
            existing.is_active = payload.is_active;
            existing.config = payload.config.clone();
        }
        Ok(())
    }

    fn delete_condition(&self, id: i64) -> Result<(), ApiError> {
        self.record(format!("delete_condition {}", id))?;
        self.conditions.borrow_mut().retain(|c| c.id != id);
        Ok(())
    }

    fn parse_natural_language(&self, text: &str) -> Result<ParsedCondition, ApiError> {
        self.record(format!("parse_natural_language {}", text))?;
        Ok(self.parsed.borrow().clone())
    }

    fn list_talents(&self, filters: &TalentFilters) -> Result<Page<Talent>, ApiError> {
        self.record(format!("list_talents page={}", filters.page))?;
        self.talent_queries.borrow_mut().push(filters.clone());
        Ok(Self::page(&self.talents.borrow(), filters.page, filters.page_size))
    }

    fn talent_detail(&self, id: i64) -> Result<Talent, ApiError> {
        self.record(format!("talent_detail {}", id))?;
        self.talents
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: Some("Talent not found".to_string()),
            })
    }

    fn upload_and_screen(
        &self,
        file: &SelectedFile,
        condition_id: Option<i64>,
    ) -> Result<ScreeningResult, ApiError> {
        self.record(format!("upload_and_screen {}", file.name))?;
        self.uploads.borrow_mut().push((file.name.clone(), condition_id));
        self.screening.borrow().clone().ok_or(ApiError::MissingData)
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub toasts: Vec<(Level, String)>,
    pub loading_changes: Vec<bool>,
}

impl RecordingNotifier {
    pub fn last(&self) -> Option<&(Level, String)> {
        self.toasts.last()
    }

    pub fn count(&self, level: Level) -> usize {
        self.toasts.iter().filter(|(l, _)| *l == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&mut self, level: Level, message: &str) {
        self.toasts.push((level, message.to_string()));
    }

    fn loading(&mut self, active: bool) {
        self.loading_changes.push(active);
    }
}

/// Clock whose time only moves when a test advances it. Clones share time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + TimeDelta::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

pub fn condition(id: i64, name: &str) -> Condition {
    Condition {
        id,
        name: name.to_string(),
        description: None,
        is_active: true,
        config: ConditionConfig::default(),
        created_at: Some("2024-05-01T08:00:00".to_string()),
    }
}

pub fn talent(id: i64, name: &str) -> Talent {
    Talent {
        id,
        name: name.to_string(),
        education_level: Some("bachelor".to_string()),
        school: Some("State University".to_string()),
        major: Some("Computer Science".to_string()),
        work_years: Some(4.0),
        skills: vec!["Rust".to_string(), "SQL".to_string()],
        phone: None,
        email: Some(format!("{}@example.com", name.to_lowercase())),
        graduation_date: None,
        screening_status: Some("qualified".to_string()),
        screening_date: None,
        created_at: None,
        updated_at: None,
    }
}
