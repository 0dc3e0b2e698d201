use std::path::PathBuf;
use thiserror::Error;

/// Error type for a failed compilation.
///
/// Every variant is fatal: the compiler stops at the first error and nothing
/// is emitted.
#[derive(Error, Debug)]
pub enum CplError {
    #[error("Row {row} references unknown component '{component}'")]
    UnknownComponent { row: usize, component: String },
    #[error("Component name '{component}' is reserved for the transport section")]
    ReservedComponent { component: String },
    #[error("Cannot derive an offset from '{value}': only integer timestep counts (e.g. '3ts') are supported")]
    UnsupportedOffsetUnit { value: String },
    #[error("Invalid duration '{value}': {details}")]
    InvalidDuration { value: String, details: String },
    #[error("Conflicting definitions for '{id}' in the {registry} registry of component '{component}'")]
    FieldConflict {
        component: String,
        registry: String,
        id: String,
    },
    #[error("Row {row} has an empty value in column '{column}'")]
    EmptyIdentifier { row: usize, column: String },
    #[error("Malformed coupling table at line {line}: {details}")]
    Table { line: usize, details: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to serialise document: {0}")]
    Serialization(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type for `Result<T, CplError>`.
pub type CplResult<T> = Result<T, CplError>;
