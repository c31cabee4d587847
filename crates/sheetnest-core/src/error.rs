use thiserror::Error;

#[derive(Debug, Error)]
pub enum NestError {
    #[error("boolean/offset kernel unavailable")]
    KernelUnavailable,

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("nesting job cancelled")]
    Cancelled,

    #[error("nothing to nest: design has no polygons")]
    Empty,

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NestError>;
