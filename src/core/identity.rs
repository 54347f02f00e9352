use crate::domain::model::{Identity, StudentId};
use crate::domain::ports::CallerSource;
use crate::utils::error::{InquiryError, Result};
use std::collections::HashMap;

pub const DEFAULT_STUDENT_ID_HEADER: &str = "X-Student-Id";

/// Which signal produced the caller's student id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Session,
    Header,
}

/// The resolved caller, produced once per request and passed down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub student_id: StudentId,
    pub source: IdentitySource,
}

/// An inbound request's identity signals.
///
/// Header names are matched case-insensitively. The student id is read from
/// the header named by `student_id_header`, which comes from configuration.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub session: Option<Identity>,
    student_id_header: String,
    headers: HashMap<String, String>,
}

impl Default for InboundRequest {
    fn default() -> Self {
        Self::new(DEFAULT_STUDENT_ID_HEADER)
    }
}

impl InboundRequest {
    pub fn new(student_id_header: impl Into<String>) -> Self {
        Self {
            session: None,
            student_id_header: student_id_header.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_session(identity: Identity) -> Self {
        Self::default().session(identity)
    }

    /// A request carrying only the default student id header.
    pub fn with_header(value: impl Into<String>) -> Self {
        Self::default().header(DEFAULT_STUDENT_ID_HEADER, value)
    }

    pub fn session(mut self, identity: Identity) -> Self {
        self.session = Some(identity);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn student_id_header_name(&self) -> &str {
        &self.student_id_header
    }
}

impl CallerSource for InboundRequest {
    fn session_student_id(&self) -> Option<StudentId> {
        self.session.as_ref().and_then(|identity| identity.student_id)
    }

    fn student_id_header(&self) -> Option<&str> {
        self.header_value(&self.student_id_header)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl IdentityResolver {
    pub fn new() -> Self {
        Self
    }

    /// Session identity always wins; the header is only consulted without one.
    pub fn resolve(&self, caller: &dyn CallerSource) -> Result<CallerContext> {
        if let Some(student_id) = caller.session_student_id() {
            tracing::debug!("studentId {} resolved from session", student_id);
            return Ok(CallerContext {
                student_id,
                source: IdentitySource::Session,
            });
        }

        let Some(raw) = caller.student_id_header() else {
            tracing::warn!("No session student id and no student id header");
            return Err(InquiryError::unauthenticated("no caller identity"));
        };

        match raw.parse::<StudentId>() {
            Ok(student_id) => {
                tracing::debug!("studentId {} resolved from header", student_id);
                Ok(CallerContext {
                    student_id,
                    source: IdentitySource::Header,
                })
            }
            Err(_) => {
                tracing::warn!("Invalid student id header format: {:?}", raw);
                Err(InquiryError::unauthenticated(format!(
                    "malformed student id header: {:?}",
                    raw
                )))
            }
        }
    }
}
