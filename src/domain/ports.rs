use crate::domain::model::{
    EnrollmentRecord, GradeDetailRecord, GradeDetailRow, GradeSummary, GradeSummaryRecord,
    ReleasePolicy, StudentId, StudentRecord, Term, UserId, UserRecord,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub type StoreResult<T> = std::result::Result<T, crate::utils::error::StoreError>;

/// The two identity signals carried by an inbound request.
pub trait CallerSource: Send + Sync {
    fn session_student_id(&self) -> Option<StudentId>;
    fn student_id_header(&self) -> Option<&str>;
}

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn find_by_term(&self, term: &Term) -> StoreResult<Option<ReleasePolicy>>;
}

#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn find_by_student_and_term(
        &self,
        student_id: StudentId,
        term: &Term,
    ) -> StoreResult<Option<GradeSummaryRecord>>;

    async fn find_by_student(&self, student_id: StudentId) -> StoreResult<Vec<GradeSummaryRecord>>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find_by_student(&self, student_id: StudentId) -> StoreResult<Vec<EnrollmentRecord>>;
}

#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn find_by_student_and_term(
        &self,
        student_id: StudentId,
        term: &Term,
    ) -> StoreResult<Vec<GradeDetailRecord>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_login_id(&self, login_id: &str) -> StoreResult<Option<UserRecord>>;
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: UserId) -> StoreResult<Option<StudentRecord>>;
}

/// Credential check delegated to whatever hashing scheme the deployment uses.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// The three grade reads, served either directly from the stores or through a cache.
#[async_trait]
pub trait GradeReads: Send + Sync {
    /// Discovery read: never fails, degrades to whatever the sources return.
    async fn list_available_terms(&self, student_id: StudentId) -> Vec<Term>;

    async fn get_summary(&self, student_id: StudentId, term: &Term) -> Result<GradeSummary>;

    async fn get_detail_list(&self, student_id: StudentId, term: &Term) -> Result<Vec<GradeDetailRow>>;
}
