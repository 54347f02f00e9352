//! Call-counting, failure-injecting store doubles shared by the core tests.

use crate::adapters::memory::InMemoryRecords;
use crate::domain::model::{
    CourseRecord, EnrollmentRecord, GradeDetailRecord, GradeSummaryRecord, ReleasePolicy,
    StudentId, Term,
};
use crate::domain::ports::{EnrollmentStore, GradeStore, PolicyStore, StoreResult, SummaryStore};
use crate::utils::error::StoreError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct Counters {
    pub summary_by_term: AtomicUsize,
    pub summary_by_student: AtomicUsize,
    pub enrollments: AtomicUsize,
    pub grades: AtomicUsize,
    pub policies: AtomicUsize,
}

#[derive(Default)]
pub struct Faults {
    pub summary_down: AtomicBool,
    pub enrollment_down: AtomicBool,
    pub grade_down: AtomicBool,
}

#[derive(Clone, Default)]
pub struct CountingStores {
    pub records: InMemoryRecords,
    pub calls: Arc<Counters>,
    pub faults: Arc<Faults>,
}

impl CountingStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn fail(flag: &AtomicBool, down: bool) {
        flag.store(down, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, store: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::unavailable(store, "injected failure"))
        } else {
            Ok(())
        }
    }
}

pub fn summary(student_id: i64, term: &str, gpa: f64, total_credits: u32) -> GradeSummaryRecord {
    GradeSummaryRecord {
        student_id: StudentId(student_id),
        term: Term::from(term),
        gpa,
        total_credits,
    }
}

pub fn enrollment(enrollment_id: i64, student_id: i64, term: &str, code: &str) -> EnrollmentRecord {
    EnrollmentRecord {
        enrollment_id,
        student_id: StudentId(student_id),
        term: Term::from(term),
        course: CourseRecord {
            course_code: code.to_string(),
            course_name: format!("{} course", code),
            credit: 3,
        },
    }
}

pub fn grade(enrollment_id: i64, letter: &str, score: f64) -> GradeDetailRecord {
    GradeDetailRecord {
        enrollment_id,
        grade_letter: letter.to_string(),
        score,
        finalized: true,
    }
}

#[async_trait]
impl PolicyStore for CountingStores {
    async fn find_by_term(&self, term: &Term) -> StoreResult<Option<ReleasePolicy>> {
        self.calls.policies.fetch_add(1, Ordering::SeqCst);
        self.records.find_by_term(term).await
    }
}

#[async_trait]
impl SummaryStore for CountingStores {
    async fn find_by_student_and_term(
        &self,
        student_id: StudentId,
        term: &Term,
    ) -> StoreResult<Option<GradeSummaryRecord>> {
        self.calls.summary_by_term.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.faults.summary_down, "summary")?;
        SummaryStore::find_by_student_and_term(&self.records, student_id, term).await
    }

    async fn find_by_student(&self, student_id: StudentId) -> StoreResult<Vec<GradeSummaryRecord>> {
        self.calls.summary_by_student.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.faults.summary_down, "summary")?;
        SummaryStore::find_by_student(&self.records, student_id).await
    }
}

#[async_trait]
impl EnrollmentStore for CountingStores {
    async fn find_by_student(&self, student_id: StudentId) -> StoreResult<Vec<EnrollmentRecord>> {
        self.calls.enrollments.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.faults.enrollment_down, "enrollment")?;
        EnrollmentStore::find_by_student(&self.records, student_id).await
    }
}

#[async_trait]
impl GradeStore for CountingStores {
    async fn find_by_student_and_term(
        &self,
        student_id: StudentId,
        term: &Term,
    ) -> StoreResult<Vec<GradeDetailRecord>> {
        self.calls.grades.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.faults.grade_down, "grade")?;
        GradeStore::find_by_student_and_term(&self.records, student_id, term).await
    }
}
