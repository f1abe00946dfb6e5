use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Database(String),
    /// Storage-level constraint rejected a write (duplicate group name,
    /// membership referencing a nonexistent group or account).
    ConstraintViolation(String),
    /// Lookup by a unique external identifier found nothing.
    NotFound(String),
    /// A uniqueness assumption was violated: more than one row matched a
    /// lookup that must return at most one. Indicates corrupted state.
    MultipleResults(String),
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::ConstraintViolation(e) => write!(f, "Constraint violation: {}", e),
            AppError::NotFound(e) => write!(f, "Not found: {}", e),
            AppError::MultipleResults(e) => write!(f, "Multiple results: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Whether this error reports a unique-constraint or foreign-key
    /// rejection from the storage layer.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, AppError::ConstraintViolation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}
