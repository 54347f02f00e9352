use thiserror::Error;

/// Failure reported by a record-store collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{store} store unavailable: {message}")]
    Unavailable { store: String, message: String },
}

impl StoreError {
    pub fn unavailable(store: &str, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            store: store.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum InquiryError {
    #[error("Unauthenticated: {reason}")]
    Unauthenticated { reason: String },

    #[error("Invalid login id or password")]
    InvalidCredentials,

    #[error("Grades for term {term} are not released")]
    PolicyNotReleased { term: String },

    #[error("No grade summary for student {student_id} in term {term}")]
    NotFound { student_id: i64, term: String },

    #[error("Record store unavailable: {0}")]
    Unavailable(#[from] StoreError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, InquiryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Authorization,
    Lookup,
    Storage,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// How the request-handling layer should answer a failed inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Reject,
    Forbidden,
    EmptySuccess,
    TryLater,
    BadRequest,
    Internal,
}

impl Disposition {
    pub fn status_code(self) -> u16 {
        match self {
            Disposition::Reject => 401,
            Disposition::Forbidden => 403,
            Disposition::EmptySuccess => 200,
            Disposition::TryLater => 503,
            Disposition::BadRequest => 400,
            Disposition::Internal => 500,
        }
    }
}

impl InquiryError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        InquiryError::Unauthenticated {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            InquiryError::Unauthenticated { .. } | InquiryError::InvalidCredentials => {
                ErrorCategory::Authentication
            }
            InquiryError::PolicyNotReleased { .. } => ErrorCategory::Authorization,
            InquiryError::NotFound { .. } => ErrorCategory::Lookup,
            InquiryError::Unavailable(_) | InquiryError::IoError(_) => ErrorCategory::Storage,
            InquiryError::ConfigError { .. }
            | InquiryError::ConfigValidationError { .. }
            | InquiryError::InvalidConfigValueError { .. }
            | InquiryError::MissingConfigError { .. } => ErrorCategory::Configuration,
            InquiryError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Authentication | ErrorCategory::Authorization => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn disposition(&self) -> Disposition {
        match self {
            InquiryError::Unauthenticated { .. } | InquiryError::InvalidCredentials => {
                Disposition::Reject
            }
            InquiryError::PolicyNotReleased { .. } => Disposition::Forbidden,
            InquiryError::NotFound { .. } => Disposition::EmptySuccess,
            InquiryError::Unavailable(_) => Disposition::TryLater,
            InquiryError::ConfigError { .. }
            | InquiryError::ConfigValidationError { .. }
            | InquiryError::InvalidConfigValueError { .. }
            | InquiryError::MissingConfigError { .. } => Disposition::BadRequest,
            InquiryError::IoError(_) | InquiryError::SerializationError(_) => {
                Disposition::Internal
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            InquiryError::Unauthenticated { .. } => "Please sign in to view grades.".to_string(),
            InquiryError::InvalidCredentials => {
                "The login id or password is incorrect.".to_string()
            }
            InquiryError::PolicyNotReleased { term } => {
                format!("Grades for {} have not been released yet.", term)
            }
            InquiryError::NotFound { term, .. } => {
                format!("No grade summary is available for {}.", term)
            }
            InquiryError::Unavailable(_) => {
                "The grade records service is temporarily unavailable. Please try again later."
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            InquiryError::Unauthenticated { .. } => {
                "Provide a session student id or a numeric student id header"
            }
            InquiryError::InvalidCredentials => "Check the login id and password",
            InquiryError::PolicyNotReleased { .. } => "Wait until the term is released",
            InquiryError::NotFound { .. } => "Pick a term returned by the term listing",
            InquiryError::Unavailable(_) => "Retry later or contact the administrator",
            InquiryError::IoError(_) => "Check that the file exists and is readable",
            InquiryError::SerializationError(_) => "Report this as a bug",
            InquiryError::ConfigError { .. }
            | InquiryError::ConfigValidationError { .. }
            | InquiryError::InvalidConfigValueError { .. }
            | InquiryError::MissingConfigError { .. } => "Fix the configuration file and retry",
        }
    }
}
