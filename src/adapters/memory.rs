use crate::domain::model::{
    EnrollmentRecord, GradeDetailRecord, GradeSummaryRecord, ReleasePolicy, StudentId,
    StudentRecord, Term, UserId, UserRecord,
};
use crate::domain::ports::{
    EnrollmentStore, GradeStore, PasswordVerifier, PolicyStore, StoreResult, StudentStore,
    SummaryStore, UserStore,
};
use crate::utils::error::{InquiryError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Every record the stores serve, in the shape of a TOML fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub policies: Vec<ReleasePolicy>,
    #[serde(default)]
    pub summaries: Vec<GradeSummaryRecord>,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentRecord>,
    #[serde(default)]
    pub grades: Vec<GradeDetailRecord>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub students: Vec<StudentRecord>,
}

impl RecordSet {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| InquiryError::ConfigValidationError {
            field: "fixture".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// In-memory backing for all record-store ports. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecords {
    records: Arc<RwLock<RecordSet>>,
}

impl InMemoryRecords {
    pub fn new(records: RecordSet) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn from_fixture_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InquiryError::IoError)?;
        let records = RecordSet::from_toml_str(&content)?;
        tracing::debug!(
            "Loaded fixture {}: {} policies, {} summaries, {} enrollments, {} grades",
            path.as_ref().display(),
            records.policies.len(),
            records.summaries.len(),
            records.enrollments.len(),
            records.grades.len()
        );
        Ok(Self::new(records))
    }

    pub async fn set_policy(&self, term: impl Into<Term>, released: bool) {
        let term = term.into();
        let mut records = self.records.write().await;
        records.policies.retain(|p| p.term != term);
        records.policies.push(ReleasePolicy {
            term,
            released,
            released_at: released.then(chrono::Utc::now),
        });
    }

    pub async fn insert_summary(&self, summary: GradeSummaryRecord) {
        let mut records = self.records.write().await;
        records
            .summaries
            .retain(|s| !(s.student_id == summary.student_id && s.term == summary.term));
        records.summaries.push(summary);
    }

    pub async fn insert_enrollment(&self, enrollment: EnrollmentRecord) {
        self.records.write().await.enrollments.push(enrollment);
    }

    pub async fn insert_grade(&self, grade: GradeDetailRecord) {
        self.records.write().await.grades.push(grade);
    }
}

#[async_trait]
impl PolicyStore for InMemoryRecords {
    async fn find_by_term(&self, term: &Term) -> StoreResult<Option<ReleasePolicy>> {
        let records = self.records.read().await;
        Ok(records.policies.iter().find(|p| &p.term == term).cloned())
    }
}

#[async_trait]
impl SummaryStore for InMemoryRecords {
    async fn find_by_student_and_term(
        &self,
        student_id: StudentId,
        term: &Term,
    ) -> StoreResult<Option<GradeSummaryRecord>> {
        let records = self.records.read().await;
        Ok(records
            .summaries
            .iter()
            .find(|s| s.student_id == student_id && &s.term == term)
            .cloned())
    }

    async fn find_by_student(&self, student_id: StudentId) -> StoreResult<Vec<GradeSummaryRecord>> {
        let records = self.records.read().await;
        Ok(records
            .summaries
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryRecords {
    async fn find_by_student(&self, student_id: StudentId) -> StoreResult<Vec<EnrollmentRecord>> {
        let records = self.records.read().await;
        Ok(records
            .enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GradeStore for InMemoryRecords {
    async fn find_by_student_and_term(
        &self,
        student_id: StudentId,
        term: &Term,
    ) -> StoreResult<Vec<GradeDetailRecord>> {
        let records = self.records.read().await;
        Ok(records
            .grades
            .iter()
            .filter(|g| {
                records.enrollments.iter().any(|e| {
                    e.enrollment_id == g.enrollment_id
                        && e.student_id == student_id
                        && &e.term == term
                })
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for InMemoryRecords {
    async fn find_by_login_id(&self, login_id: &str) -> StoreResult<Option<UserRecord>> {
        let records = self.records.read().await;
        Ok(records.users.iter().find(|u| u.login_id == login_id).cloned())
    }
}

#[async_trait]
impl StudentStore for InMemoryRecords {
    async fn find_by_user_id(&self, user_id: UserId) -> StoreResult<Option<StudentRecord>> {
        let records = self.records.read().await;
        Ok(records.students.iter().find(|s| s.user_id == user_id).cloned())
    }
}

/// Compares the password to the stored value directly; fixtures only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextVerifier;

impl PasswordVerifier for PlainTextVerifier {
    fn verify(&self, plain: &str, hash: &str) -> bool {
        plain == hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CourseRecord;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIXTURE: &str = r#"
[[policies]]
term = "2024-1"
released = true

[[summaries]]
student_id = 1
term = "2024-1"
gpa = 3.5
total_credits = 6

[[enrollments]]
enrollment_id = 10
student_id = 1
term = "2024-1"
course = { course_code = "CS101", course_name = "Intro to CS", credit = 3 }

[[enrollments]]
enrollment_id = 11
student_id = 2
term = "2024-1"
course = { course_code = "CS101", course_name = "Intro to CS", credit = 3 }

[[grades]]
enrollment_id = 10
grade_letter = "A"
score = 95.0
finalized = true

[[grades]]
enrollment_id = 11
grade_letter = "B"
score = 85.0
finalized = false
"#;

    #[tokio::test]
    async fn test_fixture_file_loads_all_tables() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FIXTURE.as_bytes()).unwrap();

        let store = InMemoryRecords::from_fixture_file(temp_file.path()).unwrap();
        let policy = store.find_by_term(&Term::from("2024-1")).await.unwrap();
        assert!(policy.unwrap().released);

        let summaries = SummaryStore::find_by_student(&store, StudentId(1)).await.unwrap();
        assert_eq!(summaries.len(), 1);
    }

    #[tokio::test]
    async fn test_grades_are_scoped_to_student_and_term() {
        let store = InMemoryRecords::new(RecordSet::from_toml_str(FIXTURE).unwrap());

        let grades = GradeStore::find_by_student_and_term(&store, StudentId(1), &Term::from("2024-1"))
            .await
            .unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].grade_letter, "A");

        let none = GradeStore::find_by_student_and_term(&store, StudentId(1), &Term::from("2023-2"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_mutations() {
        let store = InMemoryRecords::default();
        let handle = store.clone();

        handle
            .insert_enrollment(EnrollmentRecord {
                enrollment_id: 1,
                student_id: StudentId(5),
                term: Term::from("2024-2"),
                course: CourseRecord {
                    course_code: "MA201".to_string(),
                    course_name: "Linear Algebra".to_string(),
                    credit: 3,
                },
            })
            .await;
        handle.set_policy("2024-2", true).await;

        let enrollments = EnrollmentStore::find_by_student(&store, StudentId(5)).await.unwrap();
        assert_eq!(enrollments.len(), 1);
        let policy = store.find_by_term(&Term::from("2024-2")).await.unwrap().unwrap();
        assert!(policy.released_at.is_some());
    }

    #[test]
    fn test_malformed_fixture_is_config_error() {
        let err = RecordSet::from_toml_str("[[summaries]]\nstudent_id = \"x\"").unwrap_err();
        assert!(matches!(err, InquiryError::ConfigValidationError { .. }));
    }
}
