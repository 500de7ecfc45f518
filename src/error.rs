use thiserror::Error;

/// Top-level error type for the bevelis kernel.
#[derive(Debug, Error)]
pub enum BevelisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Offset(#[from] OffsetError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length segment between ({x0}, {y0}) and ({x1}, {y1})")]
    ZeroLengthSegment { x0: f64, y0: f64, x1: f64, y1: f64 },
}

/// Errors related to containment classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to offset construction.
#[derive(Debug, Error)]
pub enum OffsetError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("generation not found in chain")]
    GenerationNotFound,
}

/// Errors related to model emission.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`BevelisError`].
pub type Result<T> = std::result::Result<T, BevelisError>;
