use crate::student::StoredStudent;
use serde::Serialize;

/// In-memory search over an already fetched roster.
#[derive(Clone, Debug, Default)]
pub struct RosterFilter {
    pub search: Option<String>,
    pub grade_level: Option<String>,
}

fn contains_ci(hay: Option<&str>, needle: &str) -> bool {
    hay.map(|h| h.to_lowercase().contains(needle)).unwrap_or(false)
}

impl RosterFilter {
    pub fn new(search: Option<&str>, grade_level: Option<&str>) -> Self {
        let clean = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            search: clean(search),
            grade_level: clean(grade_level),
        }
    }

    pub fn matches(&self, s: &StoredStudent) -> bool {
        let r = &s.record;
        let matches_search = match self.search.as_deref() {
            None => true,
            Some(q) => {
                let q = q.to_lowercase();
                contains_ci(r.first_name.as_deref(), &q)
                    || contains_ci(r.last_name.as_deref(), &q)
                    || contains_ci(r.email.as_deref(), &q)
                    || contains_ci(r.student_id.as_deref(), &q)
            }
        };
        let matches_grade = match self.grade_level.as_deref() {
            None => true,
            Some(g) => r.grade_level.as_deref() == Some(g),
        };
        matches_search && matches_grade
    }

    pub fn apply<'a>(&self, students: &'a [StoredStudent]) -> Vec<&'a StoredStudent> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Distinct grade levels in first-seen order, for the grade filter menu.
pub fn distinct_grades(students: &[StoredStudent]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for g in students.iter().filter_map(|s| s.record.grade_level.as_deref()) {
        if !out.iter().any(|x| x == g) {
            out.push(g.to_string());
        }
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStats {
    pub total: usize,
    pub active: usize,
    pub male: usize,
    pub female: usize,
}

impl RosterStats {
    pub fn from_students(students: &[StoredStudent]) -> Self {
        let mut stats = Self {
            total: students.len(),
            ..Default::default()
        };
        for s in students {
            if s.status == "active" {
                stats.active += 1;
            }
            // Exact spelling only; "male" is stored as given and not counted.
            match s.record.gender.as_deref() {
                Some("Male") => stats.male += 1,
                Some("Female") => stats.female += 1,
                _ => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::StudentRecord;

    fn stored(first: &str, last: &str, grade: Option<&str>, gender: Option<&str>) -> StoredStudent {
        StoredStudent {
            id: format!("{first}-{last}"),
            status: "active".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            record: StudentRecord {
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                grade_level: grade.map(str::to_string),
                gender: gender.map(str::to_string),
                email: Some(format!("{}@student.edu", first.to_lowercase())),
                ..Default::default()
            },
        }
    }

    fn roster() -> Vec<StoredStudent> {
        vec![
            stored("John", "Doe", Some("Grade 6"), Some("Male")),
            stored("Jane", "Smith", Some("Grade 5"), Some("Female")),
            stored("Jim", "Doyle", Some("Grade 6"), None),
        ]
    }

    #[test]
    fn search_is_case_insensitive_over_names_and_email() {
        let students = roster();
        let hits = RosterFilter::new(Some("DO"), None).apply(&students);
        assert_eq!(hits.len(), 2);
        let hits = RosterFilter::new(Some("jane@"), None).apply(&students);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.last_name.as_deref(), Some("Smith"));
    }

    #[test]
    fn grade_filter_is_exact_and_combines_with_search() {
        let students = roster();
        assert_eq!(RosterFilter::new(None, Some("Grade 6")).apply(&students).len(), 2);
        assert_eq!(
            RosterFilter::new(Some("jim"), Some("Grade 6")).apply(&students).len(),
            1
        );
        assert_eq!(RosterFilter::new(Some("  "), Some("")).apply(&students).len(), 3);
    }

    #[test]
    fn grades_and_stats() {
        let students = roster();
        assert_eq!(distinct_grades(&students), vec!["Grade 6", "Grade 5"]);
        let stats = RosterStats::from_students(&students);
        assert_eq!(
            stats,
            RosterStats {
                total: 3,
                active: 3,
                male: 1,
                female: 1
            }
        );
    }

    #[test]
    fn stats_count_exact_gender_spelling_only() {
        let students = vec![
            stored("John", "Doe", None, Some("Male")),
            stored("Jim", "Doyle", None, Some("male")),
            stored("Jane", "Smith", None, Some("FEMALE")),
            stored("Jo", "Park", None, Some("Other")),
        ];
        let stats = RosterStats::from_students(&students);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.male, 1);
        assert_eq!(stats.female, 0);
    }
}
