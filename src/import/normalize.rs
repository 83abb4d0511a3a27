//! CSV text to `StudentRecord` candidates.
//!
//! The default `plain` dialect is a bare comma split with no quoting: a field
//! containing a comma cannot be expressed. Files that need quoting can opt in
//! to the `quoted` dialect, which goes through the `csv` crate instead. Both
//! dialects share header alias resolution.

use super::error::ImportError;
use crate::student::StudentRecord;
use std::collections::HashMap;

pub const EMPTY_OR_INVALID: &str = "CSV file is empty or invalid";

// Alias lists, checked in order; the first non-empty value wins.
const FIRST_NAME: &[&str] = &["first_name", "firstName"];
const LAST_NAME: &[&str] = &["last_name", "lastName"];
const DATE_OF_BIRTH: &[&str] = &["date_of_birth", "dob"];
const GENDER: &[&str] = &["gender"];
const EMAIL: &[&str] = &["email"];
const PHONE: &[&str] = &["phone"];
const ADDRESS: &[&str] = &["address"];
const CITY: &[&str] = &["city"];
const STATE: &[&str] = &["state"];
const ZIP_CODE: &[&str] = &["zip_code", "zipCode"];
const STUDENT_ID: &[&str] = &["student_id", "studentId"];
const GRADE_LEVEL: &[&str] = &["grade_level", "grade"];
const CLASS_SECTION: &[&str] = &["class_section", "section"];
const ADMISSION_DATE: &[&str] = &["admission_date"];
const ROLL_NUMBER: &[&str] = &["roll_number", "rollNumber"];
const PARENT_NAME: &[&str] = &["parent_name", "parentName"];
const PARENT_EMAIL: &[&str] = &["parent_email", "parentEmail"];
const PARENT_PHONE: &[&str] = &["parent_phone", "parentPhone"];

const ALL_FIELDS: [&[&str]; 18] = [
    FIRST_NAME,
    LAST_NAME,
    DATE_OF_BIRTH,
    GENDER,
    EMAIL,
    PHONE,
    ADDRESS,
    CITY,
    STATE,
    ZIP_CODE,
    STUDENT_ID,
    GRADE_LEVEL,
    CLASS_SECTION,
    ADMISSION_DATE,
    ROLL_NUMBER,
    PARENT_NAME,
    PARENT_EMAIL,
    PARENT_PHONE,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CsvDialect {
    #[default]
    Plain,
    Quoted,
}

impl CsvDialect {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Some(Self::Plain),
            "quoted" => Some(Self::Quoted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Quoted => "quoted",
        }
    }
}

/// A normalized row awaiting confirmation. `line` is the 1-based physical
/// line the row started on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub line: usize,
    pub record: StudentRecord,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedCsv {
    pub headers: Vec<String>,
    pub candidates: Vec<Candidate>,
}

impl NormalizedCsv {
    /// Header tokens that feed no field. Ownership columns land here too:
    /// the owner always comes from the session.
    pub fn unknown_headers(&self) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| !ALL_FIELDS.iter().any(|aliases| aliases.contains(&h.as_str())))
            .cloned()
            .collect()
    }
}

type RawRecord = (usize, Vec<String>);

fn split_plain(text: &str) -> Vec<RawRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.split(',').map(|v| v.trim().to_string()).collect()))
        .collect()
}

fn split_quoted(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut out = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| ImportError::Format(format!("{EMPTY_OR_INVALID}: {e}")))?;
        // Only physically blank lines are skipped; `,,` is still a row.
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        out.push((line, record.iter().map(str::to_string).collect()));
    }
    Ok(out)
}

/// Resolves one data row against the header row. Missing trailing values and
/// empty values are absent; a repeated header takes its last column.
pub fn resolve_record(headers: &[String], values: &[String]) -> StudentRecord {
    let mut raw: HashMap<&str, Option<&str>> = HashMap::new();
    for (i, h) in headers.iter().enumerate() {
        let v = values
            .get(i)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty());
        raw.insert(h.as_str(), v);
    }
    let pick = |aliases: &[&str]| -> Option<String> {
        aliases
            .iter()
            .find_map(|a| raw.get(a).copied().flatten())
            .map(str::to_string)
    };

    StudentRecord {
        first_name: pick(FIRST_NAME),
        last_name: pick(LAST_NAME),
        date_of_birth: pick(DATE_OF_BIRTH),
        gender: pick(GENDER),
        email: pick(EMAIL),
        phone: pick(PHONE),
        address: pick(ADDRESS),
        city: pick(CITY),
        state: pick(STATE),
        zip_code: pick(ZIP_CODE),
        student_id: pick(STUDENT_ID),
        grade_level: pick(GRADE_LEVEL),
        class_section: pick(CLASS_SECTION),
        admission_date: pick(ADMISSION_DATE),
        roll_number: pick(ROLL_NUMBER),
        parent_name: pick(PARENT_NAME),
        parent_email: pick(PARENT_EMAIL),
        parent_phone: pick(PARENT_PHONE),
        owner_id: None,
    }
}

/// Needs a header line plus at least one data line; no row is dropped for
/// content, that is decided at persistence time.
pub fn normalize_csv(text: &str, dialect: CsvDialect) -> Result<NormalizedCsv, ImportError> {
    let records = match dialect {
        CsvDialect::Plain => split_plain(text),
        CsvDialect::Quoted => split_quoted(text)?,
    };
    let mut iter = records.into_iter();
    let (Some((_, headers)), Some(first)) = (iter.next(), iter.next()) else {
        return Err(ImportError::Format(EMPTY_OR_INVALID.to_string()));
    };
    let headers = headers
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let candidates = std::iter::once(first)
        .chain(iter)
        .map(|(line, values)| Candidate {
            line,
            record: resolve_record(&headers, &values),
        })
        .collect();

    Ok(NormalizedCsv {
        headers,
        candidates,
    })
}
