//! Error types for grid metadata handling.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Primary error type for grid metadata operations.
#[derive(Debug, Error)]
pub enum GridError {
    // === Validation Errors ===
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("operation requires a {expected} grid, found {found}")]
    GridTypeMismatch { expected: String, found: String },

    #[error("unknown grid type: {0}")]
    UnknownGridType(String),

    #[error("invalid DSS pathname: {0}")]
    InvalidPathname(String),

    // === Precondition Errors ===
    #[error("cannot derive {0} without min_xy or a transform")]
    MissingGeoreference(String),

    // === Data Errors ===
    #[error("empty grid: every cell is nodata")]
    EmptyGrid,

    #[error("malformed word array: {0}")]
    MalformedWords(String),

    // === Store Errors ===
    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("store error: {0}")]
    Store(String),
}

/// Coarse classification of [`GridError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Precondition,
    EmptyData,
    Format,
    Store,
}

impl GridError {
    /// Create an InvalidField error.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a MissingField error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a MalformedWords error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedWords(msg.into())
    }

    /// Create a GridTypeMismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::GridTypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Which part of the error taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::MissingField(_)
            | GridError::InvalidField { .. }
            | GridError::GridTypeMismatch { .. }
            | GridError::UnknownGridType(_)
            | GridError::InvalidPathname(_) => ErrorKind::Validation,

            GridError::MissingGeoreference(_) => ErrorKind::Precondition,
            GridError::EmptyGrid => ErrorKind::EmptyData,
            GridError::MalformedWords(_) => ErrorKind::Format,
            GridError::RecordNotFound(_) | GridError::Store(_) => ErrorKind::Store,
        }
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::invalid_field("json", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(GridError::missing_field("shape").kind(), ErrorKind::Validation);
        assert_eq!(
            GridError::MissingGeoreference("lower_left_cell".into()).kind(),
            ErrorKind::Precondition
        );
        assert_eq!(GridError::EmptyGrid.kind(), ErrorKind::EmptyData);
        assert_eq!(GridError::malformed("short").kind(), ErrorKind::Format);
        assert_eq!(GridError::Store("io".into()).kind(), ErrorKind::Store);
    }

    #[test]
    fn test_error_messages() {
        let err = GridError::invalid_field("tzoffset", "must be within [-24, 24]");
        assert_eq!(
            err.to_string(),
            "invalid value for 'tzoffset': must be within [-24, 24]"
        );
    }
}
