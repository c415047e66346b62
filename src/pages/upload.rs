use std::path::Path;

use crate::format::format_file_size;
use crate::models::{Condition, ConditionQuery, ScreeningResult};
use crate::notify::Level;
use crate::upload::SelectedFile;

use super::{Page, PageContext};

const CONDITION_PICKER_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Empty,
    FileSelected(SelectedFile),
    Submitting(SelectedFile),
    Resulted {
        file: SelectedFile,
        result: ScreeningResult,
    },
}

pub struct UploadPage {
    state: UploadState,
    conditions: Vec<Condition>,
    condition_id: Option<i64>,
}

impl Default for UploadPage {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadPage {
    pub fn new() -> Self {
        Self {
            state: UploadState::Empty,
            conditions: Vec::new(),
            condition_id: None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        match &self.state {
            UploadState::Empty => None,
            UploadState::FileSelected(file) | UploadState::Submitting(file) => Some(file),
            UploadState::Resulted { file, .. } => Some(file),
        }
    }

    pub fn result(&self) -> Option<&ScreeningResult> {
        match &self.state {
            UploadState::Resulted { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn condition_id(&self) -> Option<i64> {
        self.condition_id
    }

    pub fn selected_condition(&self) -> Option<&Condition> {
        let id = self.condition_id?;
        self.conditions.iter().find(|c| c.id == id)
    }

    pub fn upload_area_visible(&self) -> bool {
        matches!(self.state, UploadState::Empty)
    }

    pub fn file_info_visible(&self) -> bool {
        matches!(
            self.state,
            UploadState::FileSelected(_) | UploadState::Submitting(_)
        )
    }

    pub fn result_visible(&self) -> bool {
        matches!(self.state, UploadState::Resulted { .. })
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, UploadState::FileSelected(_))
    }

    /// Fill the condition picker with active conditions.
    pub fn load_conditions(&mut self, ctx: &mut PageContext<'_>) {
        let query = ConditionQuery {
            name: None,
            page: 1,
            page_size: CONDITION_PICKER_SIZE,
        };
        match ctx.api.list_conditions(&query) {
            Ok(page) => {
                self.conditions = page.items.into_iter().filter(|c| c.is_active).collect();
                if self.selected_condition().is_none() {
                    self.condition_id = None;
                }
            }
            Err(err) => ctx.report("Failed to load screening conditions", &err),
        }
    }

    pub fn select_condition(&mut self, id: Option<i64>) -> bool {
        match id {
            Some(id) if !self.conditions.iter().any(|c| c.id == id) => false,
            _ => {
                self.condition_id = id;
                true
            }
        }
    }

    /// Step through `[none, conditions...]`.
    pub fn cycle_condition(&mut self) {
        let next = match self.condition_id {
            None => self.conditions.first(),
            Some(id) => self
                .conditions
                .iter()
                .skip_while(|c| c.id != id)
                .nth(1),
        };
        self.condition_id = next.map(|c| c.id);
    }

    /// Browse or drop. Invalid files are rejected with a warning and leave
    /// the page as it was.
    pub fn select_file(&mut self, path: &Path, ctx: &mut PageContext<'_>) -> bool {
        if !self.upload_area_visible() {
            return false;
        }
        match SelectedFile::from_path(path) {
            Ok(file) => {
                tracing::debug!(name = %file.name, size = file.size, "resume selected");
                self.state = UploadState::FileSelected(file);
                true
            }
            Err(rejection) => {
                ctx.notifier.toast(Level::Warning, &rejection.to_string());
                false
            }
        }
    }

    pub fn submit(&mut self, ctx: &mut PageContext<'_>) -> bool {
        let file = match &self.state {
            UploadState::FileSelected(file) => file.clone(),
            _ => return false,
        };
        if let Err(rejection) = file.validate() {
            ctx.notifier.toast(Level::Warning, &rejection.to_string());
            return false;
        }

        self.state = UploadState::Submitting(file.clone());
        ctx.notifier.loading(true);
        let response = ctx.api.upload_and_screen(&file, self.condition_id);
        ctx.notifier.loading(false);

        match response {
            Ok(result) => {
                tracing::info!(
                    name = %file.name,
                    qualified = result.is_qualified,
                    talent_id = ?result.talent_id,
                    "resume screened"
                );
                let message = if result.is_qualified {
                    "Screening finished: qualified"
                } else {
                    "Screening finished: not qualified"
                };
                ctx.notifier.toast(Level::Success, message);
                self.state = UploadState::Resulted { file, result };
                true
            }
            Err(err) => {
                ctx.report("Upload failed, please try again", &err);
                self.state = UploadState::FileSelected(file);
                false
            }
        }
    }

    /// Drop the file and any result. Local only.
    pub fn remove_file(&mut self) {
        self.state = UploadState::Empty;
    }

    pub fn continue_screening(&mut self) {
        self.remove_file();
    }

    pub fn file_summary(&self) -> Option<String> {
        self.file()
            .map(|f| format!("{} ({})", f.name, format_file_size(f.size)))
    }
}

impl Page for UploadPage {
    fn title(&self) -> &'static str {
        "Upload"
    }

    fn activate(&mut self, ctx: &mut PageContext<'_>) {
        self.load_conditions(ctx);
    }
}
