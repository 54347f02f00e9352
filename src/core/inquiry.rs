use crate::core::aggregator::RecordAggregator;
use crate::core::cache::{CacheStore, InquiryCache};
use crate::core::identity::{CallerContext, IdentityResolver};
use crate::core::release::ReleaseGate;
use crate::domain::model::{GradeDetailRow, GradeSummary, Term};
use crate::domain::ports::{CallerSource, EnrollmentStore, GradeReads, GradeStore, PolicyStore, SummaryStore};
use crate::utils::error::Result;
use std::sync::Arc;

/// The grade inquiry access path: identity, then release gate, then the
/// (cached) record reads. Term-scoped reads cannot skip the gate.
#[derive(Clone)]
pub struct GradeInquiryService {
    resolver: IdentityResolver,
    gate: ReleaseGate,
    reads: Arc<dyn GradeReads>,
}

impl GradeInquiryService {
    pub fn new(gate: ReleaseGate, reads: Arc<dyn GradeReads>) -> Self {
        Self {
            resolver: IdentityResolver::new(),
            gate,
            reads,
        }
    }

    /// Wires every component against one store, caching through `cache`.
    pub fn with_cache<S>(store: S, cache: Arc<dyn CacheStore>) -> Self
    where
        S: PolicyStore + SummaryStore + EnrollmentStore + GradeStore + Clone + 'static,
    {
        let gate = ReleaseGate::new(Arc::new(store.clone()));
        let reads = InquiryCache::new(RecordAggregator::from_store(store), cache);
        Self::new(gate, Arc::new(reads))
    }

    pub fn resolve(&self, caller: &dyn CallerSource) -> Result<CallerContext> {
        self.resolver.resolve(caller)
    }

    pub async fn is_released(&self, term: &Term) -> Result<bool> {
        self.gate.is_released(term).await
    }

    /// Discovery read: fails only when the caller cannot be identified.
    pub async fn available_terms(&self, caller: &dyn CallerSource) -> Result<Vec<Term>> {
        let context = self.resolve(caller)?;
        tracing::info!("Using studentId {} for term query", context.student_id);
        Ok(self.reads.list_available_terms(context.student_id).await)
    }

    pub async fn summary(&self, caller: &dyn CallerSource, term: &Term) -> Result<GradeSummary> {
        let context = self.resolve(caller)?;
        self.gate.ensure_released(term).await?;
        self.reads.get_summary(context.student_id, term).await
    }

    pub async fn detail_list(&self, caller: &dyn CallerSource, term: &Term) -> Result<Vec<GradeDetailRow>> {
        let context = self.resolve(caller)?;
        self.gate.ensure_released(term).await?;
        self.reads.get_detail_list(context.student_id, term).await
    }
}
