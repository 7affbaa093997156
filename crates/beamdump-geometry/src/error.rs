use beamdump_materials::MaterialError;
use thiserror::Error;

/// Errors raised while assembling or writing a geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Unknown constant: {0}")]
    UnknownConstant(String),

    #[error("Unknown {kind} id: {index}")]
    UnknownId { kind: &'static str, index: usize },

    #[error("Invalid solid '{name}': {message}")]
    InvalidSolid { name: String, message: String },

    #[error("Invalid placement '{name}': {message}")]
    InvalidPlacement { name: String, message: String },

    #[error("World volume has not been set")]
    WorldNotSet,

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("Failed to write GDML: {0}")]
    Io(#[from] std::io::Error),
}

pub type GeometryResult<T> = Result<T, GeometryError>;
