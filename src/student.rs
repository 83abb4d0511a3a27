use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const GRADE_LEVELS: [&str; 13] = [
    "Kindergarten",
    "Grade 1",
    "Grade 2",
    "Grade 3",
    "Grade 4",
    "Grade 5",
    "Grade 6",
    "Grade 7",
    "Grade 8",
    "Grade 9",
    "Grade 10",
    "Grade 11",
    "Grade 12",
];

pub const DEFAULT_STATUS: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

pub fn is_known_grade_level(s: &str) -> bool {
    GRADE_LEVELS.contains(&s.trim())
}

/// A student as entered by staff or produced by CSV normalization.
///
/// Every attribute except the two names is optional, and absent values are
/// always `None` rather than an empty string. `owner_id` is never taken from
/// caller input; it is stamped from the session right before persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub class_section: Option<String>,
    #[serde(default)]
    pub admission_date: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub parent_email: Option<String>,
    #[serde(default)]
    pub parent_phone: Option<String>,
    #[serde(default, skip_deserializing)]
    pub owner_id: Option<String>,
}

/// A persisted row, with the fields the store assigns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStudent {
    pub id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub record: StudentRecord,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIssue {
    pub field: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl RecordIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok()
}

impl StudentRecord {
    pub fn display_name(&self) -> String {
        let first = non_empty(&self.first_name).unwrap_or("");
        let last = non_empty(&self.last_name).unwrap_or("");
        format!("{first} {last}").trim().to_string()
    }

    /// Missing names are errors; values outside the known vocabularies are
    /// only warnings and are stored as given.
    pub fn validate(&self) -> Vec<RecordIssue> {
        let mut issues = Vec::new();
        if non_empty(&self.first_name).is_none() {
            issues.push(RecordIssue::error("first_name", "first_name is required"));
        }
        if non_empty(&self.last_name).is_none() {
            issues.push(RecordIssue::error("last_name", "last_name is required"));
        }
        if let Some(g) = non_empty(&self.gender) {
            if Gender::parse(g).is_none() {
                issues.push(RecordIssue::warning(
                    "gender",
                    format!("unrecognized gender {g:?}; expected Male, Female or Other"),
                ));
            }
        }
        if let Some(grade) = non_empty(&self.grade_level) {
            if !is_known_grade_level(grade) {
                issues.push(RecordIssue::warning(
                    "grade_level",
                    format!("grade level {grade:?} is not one of Kindergarten, Grade 1..Grade 12"),
                ));
            }
        }
        if let Some(d) = non_empty(&self.date_of_birth) {
            if !is_iso_date(d) {
                issues.push(RecordIssue::warning(
                    "date_of_birth",
                    format!("date_of_birth {d:?} is not YYYY-MM-DD"),
                ));
            }
        }
        if let Some(d) = non_empty(&self.admission_date) {
            if !is_iso_date(d) {
                issues.push(RecordIssue::warning(
                    "admission_date",
                    format!("admission_date {d:?} is not YYYY-MM-DD"),
                ));
            }
        }
        issues
    }

    /// Collapses blank strings from form input to `None` and trims the rest.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.date_of_birth,
            &mut self.gender,
            &mut self.email,
            &mut self.phone,
            &mut self.address,
            &mut self.city,
            &mut self.state,
            &mut self.zip_code,
            &mut self.student_id,
            &mut self.grade_level,
            &mut self.class_section,
            &mut self.admission_date,
            &mut self.roll_number,
            &mut self.parent_name,
            &mut self.parent_email,
            &mut self.parent_phone,
        ] {
            *field = field
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }
        self
    }
}
