use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(StudentId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Academic term identifier such as `2024-1`.
///
/// Terms are ordered by their string value, which is only chronological when
/// every term follows the `YYYY-N` contract (four-digit year, single-digit
/// term number). `is_canonical` reports whether a term honors it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Term(String);

impl Term {
    pub fn new(value: impl Into<String>) -> Self {
        Term(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn is_canonical(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == 6
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[4] == b'-'
            && bytes[5].is_ascii_digit()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::new(value)
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Staff,
    #[serde(untagged)]
    Other(String),
}

/// The authenticated caller as established by a verified login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub student_id: Option<StudentId>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePolicy {
    pub term: Term,
    pub released: bool,
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummaryRecord {
    pub student_id: StudentId,
    pub term: Term,
    pub gpa: f64,
    pub total_credits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_code: String,
    pub course_name: String,
    pub credit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub enrollment_id: i64,
    pub student_id: StudentId,
    pub term: Term,
    pub course: CourseRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDetailRecord {
    pub enrollment_id: i64,
    pub grade_letter: String,
    pub score: f64,
    pub finalized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub login_id: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: StudentId,
    pub user_id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub term: Term,
    pub gpa: f64,
    pub total_credits: u32,
}

impl From<GradeSummaryRecord> for GradeSummary {
    fn from(record: GradeSummaryRecord) -> Self {
        Self {
            term: record.term,
            gpa: record.gpa,
            total_credits: record.total_credits,
        }
    }
}

/// One denormalized row of a term's grade list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDetailRow {
    pub enrollment_id: i64,
    pub course_code: String,
    pub course_name: String,
    pub credit: u32,
    pub grade_letter: String,
    pub score: f64,
    pub finalized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub identity: Identity,
    pub name: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_contract() {
        assert!(Term::from("2024-1").is_canonical());
        assert!(!Term::from("2024-10").is_canonical());
        assert!(!Term::from("24-1").is_canonical());
        assert!(Term::from("   ").is_blank());
    }

    #[test]
    fn test_role_serde() {
        let role: Role = serde_json::from_str("\"STUDENT\"").unwrap();
        assert_eq!(role, Role::Student);
        let role: Role = serde_json::from_str("\"PROFESSOR\"").unwrap();
        assert_eq!(role, Role::Other("PROFESSOR".to_string()));
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"STAFF\"");
    }

    #[test]
    fn test_student_id_parse() {
        assert_eq!("42".parse::<StudentId>().unwrap(), StudentId(42));
        assert_eq!("+42".parse::<StudentId>().unwrap(), StudentId(42));
        assert!("abc".parse::<StudentId>().is_err());
        assert!(" 42".parse::<StudentId>().is_err());
    }
}
