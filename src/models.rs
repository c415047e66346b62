use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfig {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub major: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_tier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub config: ConditionConfig,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Full-object body for create and update; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub config: ConditionConfig,
}

/// Result of natural-language parsing; every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParsedCondition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Option<ConditionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talent {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub work_years: Option<f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub graduation_date: Option<String>,
    #[serde(default)]
    pub screening_status: Option<String>, // "pending", "qualified", "unqualified"
    #[serde(default)]
    pub screening_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    #[serde(default)]
    pub talent_id: Option<i64>,
    pub is_qualified: bool,
    #[serde(default)]
    pub workflow_status: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>, // seconds
    #[serde(default)]
    pub qualification_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            total_pages: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TalentFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screening_status: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

/// Option lists offered by the condition form and talent filters.
pub const EDUCATION_LEVELS: &[&str] = &["associate", "bachelor", "master", "doctorate"];
pub const SCHOOL_TIERS: &[&str] = &["top", "key", "regular"];
pub const SCREENING_STATUSES: &[&str] = &["pending", "qualified", "unqualified"];
