use thiserror::Error;

/// Result type alias using DirtyError
pub type Result<T> = std::result::Result<T, DirtyError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and testing. Both kinds below are caller programming
/// errors; the panicking tracker operations surface them as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Change state was queried for a record that is not in the registry
    NotTracked,
    /// The record's field-descriptor table does not describe an aggregate
    InvalidRecord,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotTracked => "ERR_NOT_TRACKED",
            ExErrorKind::InvalidRecord => "ERR_INVALID_RECORD",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// log events.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    record_type: Option<String>,
    field: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            record_type: None,
            field: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add record type context
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Add field name context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(record_type) = &self.record_type {
            write!(f, " (record_type: {})", record_type)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for tracking operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirtyError {
    /// Changes were requested for a record that was never tracked, or was forgotten
    #[error("Record not tracked: {record_type} at {address:#x}")]
    NotTracked {
        record_type: &'static str,
        address: usize,
    },

    /// The record's descriptor table is malformed
    #[error("Invalid record {record_type}: {reason}")]
    InvalidRecord {
        record_type: &'static str,
        reason: String,
    },

    /// The descriptor table declares the same field twice
    #[error("Invalid record {record_type}: field `{field}` declared more than once")]
    DuplicateField {
        record_type: &'static str,
        field: &'static str,
    },
}

/// Conversion from DirtyError to ExError
impl From<DirtyError> for ExError {
    fn from(err: DirtyError) -> Self {
        let message = err.to_string();
        match err {
            DirtyError::NotTracked { record_type, .. } => ExError::new(ExErrorKind::NotTracked)
                .with_record_type(record_type)
                .with_message(message),

            DirtyError::InvalidRecord { record_type, .. } => {
                ExError::new(ExErrorKind::InvalidRecord)
                    .with_record_type(record_type)
                    .with_message(message)
            }

            DirtyError::DuplicateField { record_type, field } => {
                ExError::new(ExErrorKind::InvalidRecord)
                    .with_record_type(record_type)
                    .with_field(field)
                    .with_message(message)
            }
        }
    }
}
