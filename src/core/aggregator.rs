use crate::domain::model::{GradeDetailRow, GradeSummary, StudentId, Term};
use crate::domain::ports::{EnrollmentStore, GradeReads, GradeStore, SummaryStore};
use crate::utils::error::{InquiryError, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Reads grade records straight from the stores, reconciling their term sets.
#[derive(Clone)]
pub struct RecordAggregator {
    summaries: Arc<dyn SummaryStore>,
    enrollments: Arc<dyn EnrollmentStore>,
    grades: Arc<dyn GradeStore>,
}

impl RecordAggregator {
    pub fn new(
        summaries: Arc<dyn SummaryStore>,
        enrollments: Arc<dyn EnrollmentStore>,
        grades: Arc<dyn GradeStore>,
    ) -> Self {
        Self {
            summaries,
            enrollments,
            grades,
        }
    }

    /// Uses one value for all three stores.
    pub fn from_store<S>(store: S) -> Self
    where
        S: SummaryStore + EnrollmentStore + GradeStore + 'static,
    {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store)
    }

    async fn summary_terms(&self, student_id: StudentId) -> Vec<Term> {
        match self.summaries.find_by_student(student_id).await {
            Ok(summaries) => {
                tracing::debug!(
                    "Found {} grade summaries for studentId {}",
                    summaries.len(),
                    student_id
                );
                summaries.into_iter().map(|s| s.term).collect()
            }
            Err(e) => {
                tracing::warn!(
                    "Partial source failure: summary terms unavailable for studentId {}: {}",
                    student_id,
                    e
                );
                Vec::new()
            }
        }
    }

    async fn enrollment_terms(&self, student_id: StudentId) -> Vec<Term> {
        match self.enrollments.find_by_student(student_id).await {
            Ok(enrollments) => {
                tracing::debug!(
                    "Found {} enrollments for studentId {}",
                    enrollments.len(),
                    student_id
                );
                enrollments.into_iter().map(|e| e.term).collect()
            }
            Err(e) => {
                tracing::warn!(
                    "Partial source failure: enrollment terms unavailable for studentId {}: {}",
                    student_id,
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Union of both term lists, blanks dropped, most recent (lexically greatest) first.
pub fn merge_terms(from_summaries: Vec<Term>, from_enrollments: Vec<Term>) -> Vec<Term> {
    let merged: BTreeSet<Term> = from_summaries
        .into_iter()
        .chain(from_enrollments)
        .filter(|term| !term.is_blank())
        .collect();

    for term in merged.iter().filter(|term| !term.is_canonical()) {
        tracing::warn!(
            "Term {:?} does not follow the YYYY-N format; its position in the list may not be chronological",
            term.as_str()
        );
    }

    merged.into_iter().rev().collect()
}

#[async_trait]
impl GradeReads for RecordAggregator {
    async fn list_available_terms(&self, student_id: StudentId) -> Vec<Term> {
        tracing::info!("Listing available terms for studentId {}", student_id);

        let (from_summaries, from_enrollments) = tokio::join!(
            self.summary_terms(student_id),
            self.enrollment_terms(student_id)
        );
        let (summary_count, enrollment_count) = (from_summaries.len(), from_enrollments.len());
        let terms = merge_terms(from_summaries, from_enrollments);

        if terms.is_empty() {
            tracing::warn!("No terms found for studentId {} from any source", student_id);
        } else {
            tracing::info!(
                "Available terms for studentId {}: {:?} (from {} summaries, {} enrollments)",
                student_id,
                terms,
                summary_count,
                enrollment_count
            );
        }
        terms
    }

    async fn get_summary(&self, student_id: StudentId, term: &Term) -> Result<GradeSummary> {
        let record = self
            .summaries
            .find_by_student_and_term(student_id, term)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Summary lookup failed for studentId {} term {}: {}",
                    student_id,
                    term,
                    e
                );
                InquiryError::Unavailable(e)
            })?;

        record
            .map(GradeSummary::from)
            .ok_or_else(|| InquiryError::NotFound {
                student_id: student_id.0,
                term: term.to_string(),
            })
    }

    async fn get_detail_list(&self, student_id: StudentId, term: &Term) -> Result<Vec<GradeDetailRow>> {
        let (enrollments, grades) = tokio::join!(
            self.enrollments.find_by_student(student_id),
            self.grades.find_by_student_and_term(student_id, term)
        );
        let enrollments = enrollments.map_err(|e| {
            tracing::error!("Enrollment lookup failed for studentId {}: {}", student_id, e);
            InquiryError::Unavailable(e)
        })?;
        let grades = grades.map_err(|e| {
            tracing::error!(
                "Grade lookup failed for studentId {} term {}: {}",
                student_id,
                term,
                e
            );
            InquiryError::Unavailable(e)
        })?;

        let mut by_enrollment = HashMap::with_capacity(grades.len());
        for grade in grades {
            by_enrollment.entry(grade.enrollment_id).or_insert(grade);
        }

        let rows: Vec<GradeDetailRow> = enrollments
            .into_iter()
            .filter(|enrollment| &enrollment.term == term)
            .filter_map(|enrollment| {
                let Some(grade) = by_enrollment.remove(&enrollment.enrollment_id) else {
                    tracing::warn!(
                        "Enrollment {} has no grade record, skipping",
                        enrollment.enrollment_id
                    );
                    return None;
                };
                Some(GradeDetailRow {
                    enrollment_id: enrollment.enrollment_id,
                    course_code: enrollment.course.course_code,
                    course_name: enrollment.course.course_name,
                    credit: enrollment.course.credit,
                    grade_letter: grade.grade_letter,
                    score: grade.score,
                    finalized: grade.finalized,
                })
            })
            .collect();

        tracing::debug!(
            "Built {} grade rows for studentId {} term {}",
            rows.len(),
            student_id,
            term
        );
        Ok(rows)
    }
}
