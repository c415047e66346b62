use thiserror::Error;

use crate::models::{
    Condition, ConditionConfig, ConditionPayload, EDUCATION_LEVELS, ParsedCondition, SCHOOL_TIERS,
};
use crate::tags::TagInput;

pub const MIN_NLP_INPUT_CHARS: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Condition name is required")]
    NameRequired,

    #[error("Please describe the screening criteria in at least {0} characters")]
    NlpInputTooShort(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Active,
    Education,
    Experience,
    SchoolTier,
    Skills,
    Major,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Name,
        FormField::Description,
        FormField::Active,
        FormField::Education,
        FormField::Experience,
        FormField::SchoolTier,
        FormField::Skills,
        FormField::Major,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Description => "Description",
            FormField::Active => "Active",
            FormField::Education => "Education",
            FormField::Experience => "Experience (years)",
            FormField::SchoolTier => "School tier",
            FormField::Skills => "Skills",
            FormField::Major => "Major",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Editable state of the create/edit condition modal.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionForm {
    pub editing_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub education_level: Option<String>,
    pub experience_years: String,
    pub school_tier: Option<String>,
    pub skills: TagInput,
    pub major: TagInput,
    pub focus: FormField,
}

impl Default for ConditionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionForm {
    pub fn new() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            description: String::new(),
            is_active: true,
            education_level: None,
            experience_years: String::new(),
            school_tier: None,
            skills: TagInput::default(),
            major: TagInput::default(),
            focus: FormField::Name,
        }
    }

    pub fn edit(condition: &Condition) -> Self {
        let mut form = Self::new();
        form.editing_id = Some(condition.id);
        form.name = condition.name.clone();
        form.description = condition.description.clone().unwrap_or_default();
        form.is_active = condition.is_active;
        form.fill_config(&condition.config);
        form
    }

    /// Pre-fill from a natural-language parse. Parts the parser did not
    /// return leave the current values alone.
    pub fn apply_parsed(&mut self, parsed: &ParsedCondition) {
        if let Some(name) = parsed.name.as_deref().filter(|n| !n.trim().is_empty()) {
            self.name = name.to_string();
        }
        if let Some(description) = &parsed.description {
            self.description = description.clone();
        }
        if let Some(config) = &parsed.config {
            self.fill_config(config);
        }
    }

    fn fill_config(&mut self, config: &ConditionConfig) {
        self.education_level = config.education_level.clone();
        self.experience_years = config
            .experience_years
            .map(|y| y.to_string())
            .unwrap_or_default();
        self.school_tier = config.school_tier.clone();
        self.skills = TagInput::from_values(&config.skills);
        self.major = TagInput::from_values(&config.major);
    }

    pub fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn cycle_education(&mut self, forward: bool) {
        self.education_level = cycle_option(self.education_level.as_deref(), EDUCATION_LEVELS, forward);
    }

    pub fn cycle_school_tier(&mut self, forward: bool) {
        self.school_tier = cycle_option(self.school_tier.as_deref(), SCHOOL_TIERS, forward);
    }

    /// Text-entry target for the focused field, if it takes free text.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Experience => Some(&mut self.experience_years),
            _ => None,
        }
    }

    pub fn focused_tags_mut(&mut self) -> Option<&mut TagInput> {
        match self.focus {
            FormField::Skills => Some(&mut self.skills),
            FormField::Major => Some(&mut self.major),
            _ => None,
        }
    }

    pub fn to_payload(&self) -> Result<ConditionPayload, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::NameRequired);
        }
        Ok(ConditionPayload {
            name: name.to_string(),
            description: non_empty(&self.description),
            is_active: self.is_active,
            config: ConditionConfig {
                skills: self.skills.values(),
                major: self.major.values(),
                education_level: self.education_level.as_deref().and_then(non_empty),
                experience_years: parse_years(&self.experience_years),
                school_tier: self.school_tier.as_deref().and_then(non_empty),
            },
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strict: anything but a whole non-negative number is treated as unset.
fn parse_years(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Step through `[unset, options...]`. A value outside the list restarts at unset.
fn cycle_option(current: Option<&str>, options: &[&str], forward: bool) -> Option<String> {
    let slots = options.len() + 1;
    let index = match current {
        None => 0,
        Some(value) => match options.iter().position(|o| *o == value) {
            Some(i) => i + 1,
            None => return None,
        },
    };
    let next = if forward {
        (index + 1) % slots
    } else {
        (index + slots - 1) % slots
    };
    if next == 0 {
        None
    } else {
        Some(options[next - 1].to_string())
    }
}

pub fn validate_nlp_input(text: &str) -> Result<&str, FormError> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_NLP_INPUT_CHARS {
        return Err(FormError::NlpInputTooShort(MIN_NLP_INPUT_CHARS));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition() -> Condition {
        Condition {
            id: 7,
            name: "Data Engineer".to_string(),
            description: Some("Pipelines".to_string()),
            is_active: false,
            config: ConditionConfig {
                skills: vec!["Spark".to_string(), "SQL".to_string()],
                major: vec!["CS".to_string()],
                education_level: Some("master".to_string()),
                experience_years: Some(3),
                school_tier: None,
            },
            created_at: None,
        }
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut form = ConditionForm::new();
        form.name = "   ".to_string();
        assert_eq!(form.to_payload(), Err(FormError::NameRequired));
    }

    #[test]
    fn test_minimal_payload_omits_optionals() {
        let mut form = ConditionForm::new();
        form.name = "Backend Engineer".to_string();
        form.experience_years = "abc".to_string();

        let payload = form.to_payload().unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "name": "Backend Engineer",
                "is_active": true,
                "config": {"skills": [], "major": []}
            })
        );
    }

    #[test]
    fn test_experience_years_parsing() {
        let mut form = ConditionForm::new();
        form.name = "x".to_string();
        for (raw, expected) in [("", None), ("  ", None), ("abc", None), ("3abc", None), ("-1", None), (" 5 ", Some(5))] {
            form.experience_years = raw.to_string();
            assert_eq!(form.to_payload().unwrap().config.experience_years, expected, "input {:?}", raw);
        }
    }

    #[test]
    fn test_edit_round_trips_condition() {
        let form = ConditionForm::edit(&condition());
        assert!(form.is_edit());
        assert_eq!(form.experience_years, "3");
        assert_eq!(form.skills.values(), vec!["Spark", "SQL"]);

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.name, "Data Engineer");
        assert_eq!(payload.description.as_deref(), Some("Pipelines"));
        assert!(!payload.is_active);
        assert_eq!(payload.config, condition().config);
    }

    #[test]
    fn test_apply_parsed_keeps_missing_parts() {
        let mut form = ConditionForm::new();
        form.name = "Draft".to_string();
        form.apply_parsed(&ParsedCondition {
            name: None,
            description: Some("Needs Go".to_string()),
            config: Some(ConditionConfig {
                skills: vec!["Go".to_string()],
                ..ConditionConfig::default()
            }),
        });
        assert_eq!(form.name, "Draft");
        assert_eq!(form.description, "Needs Go");
        assert_eq!(form.skills.values(), vec!["Go"]);
    }

    #[test]
    fn test_cycle_options_wraps_through_unset() {
        let mut form = ConditionForm::new();
        form.cycle_education(true);
        assert_eq!(form.education_level.as_deref(), Some("associate"));
        form.cycle_education(false);
        assert_eq!(form.education_level, None);
        form.cycle_education(false);
        assert_eq!(form.education_level.as_deref(), Some("doctorate"));

        form.school_tier = Some("custom".to_string());
        form.cycle_school_tier(true);
        assert_eq!(form.school_tier, None);
    }

    #[test]
    fn test_focus_wraps() {
        assert_eq!(FormField::Major.next(), FormField::Name);
        assert_eq!(FormField::Name.prev(), FormField::Major);
    }

    #[test]
    fn test_validate_nlp_input() {
        assert_eq!(validate_nlp_input("ok"), Err(FormError::NlpInputTooShort(5)));
        assert_eq!(validate_nlp_input("  abcd  "), Err(FormError::NlpInputTooShort(5)));
        assert_eq!(validate_nlp_input(" 3 yrs Rust "), Ok("3 yrs Rust"));
    }
}
