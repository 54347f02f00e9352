use crate::domain::model::Term;
use crate::domain::ports::PolicyStore;
use crate::utils::error::{InquiryError, Result};
use std::sync::Arc;

/// Answers whether a term's grades are visible. Unknown terms are not.
#[derive(Clone)]
pub struct ReleaseGate {
    policies: Arc<dyn PolicyStore>,
}

impl ReleaseGate {
    pub fn new(policies: Arc<dyn PolicyStore>) -> Self {
        Self { policies }
    }

    pub async fn is_released(&self, term: &Term) -> Result<bool> {
        let policy = self.policies.find_by_term(term).await.map_err(|e| {
            tracing::error!("Release policy lookup failed for term {}: {}", term, e);
            InquiryError::Unavailable(e)
        })?;

        let released = policy.map(|p| p.released).unwrap_or(false);
        tracing::debug!("Term {} released: {}", term, released);
        Ok(released)
    }

    pub async fn ensure_released(&self, term: &Term) -> Result<()> {
        if self.is_released(term).await? {
            Ok(())
        } else {
            Err(InquiryError::PolicyNotReleased {
                term: term.to_string(),
            })
        }
    }
}
