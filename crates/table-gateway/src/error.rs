//! Error types for gateway and record set operations.

use thiserror::Error;

/// Main error type for table gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The underlying database connection could not be established.
    ///
    /// Raised lazily on first use, never at construction.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement preparation or execution failed, a column has no declared
    /// type, or a record to insert already carries an id.
    #[error("Database error: {0}")]
    Database(String),

    /// The database reported an integrity constraint violation (SQLSTATE class 23)
    /// on insert or update.
    #[error("Constraint violation on table {table}: {message}")]
    ConstraintViolation { table: String, message: String },

    /// A caller supplied an id that is not an integer.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `find` matched no row.
    #[error("Record ID {id} not found in table {table}")]
    NotFound { table: String, id: i64 },

    /// A record set operation referenced an id that is not in the set.
    #[error("Record set error: {0}")]
    RecordSet(String),

    /// Configuration error (invalid YAML, unknown table, bad identifier, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Create a ConstraintViolation error.
    pub fn constraint_violation(table: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::ConstraintViolation {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(table: impl Into<String>, id: i64) -> Self {
        GatewayError::NotFound {
            table: table.into(),
            id,
        }
    }

    /// True for generic database errors and their constraint-violation specialization.
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Database(_) | GatewayError::ConstraintViolation { .. }
        )
    }

    /// True if this error is an integrity constraint violation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, GatewayError::ConstraintViolation { .. })
    }

    /// Process exit code for this error, used by the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            GatewayError::Config(_) | GatewayError::Yaml(_) | GatewayError::Json(_) => 1,
            GatewayError::Connection(_) => 2,
            GatewayError::Database(_) => 3,
            GatewayError::ConstraintViolation { .. } => 4,
            GatewayError::NotFound { .. } => 5,
            GatewayError::InvalidArgument(_) => 6,
            GatewayError::Io(_) => 7,
            GatewayError::RecordSet(_) => 8,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
