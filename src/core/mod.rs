pub mod aggregator;
pub mod auth;
pub mod cache;
pub mod identity;
pub mod inquiry;
pub mod release;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{GradeDetailRow, GradeSummary, Identity, StudentId, Term};
pub use crate::domain::ports::{
    CallerSource, EnrollmentStore, GradeReads, GradeStore, PolicyStore, SummaryStore,
};
pub use crate::utils::error::Result;
