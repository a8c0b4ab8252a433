use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RescaleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// `.ply` and unrecognized extensions. Jobs turn this into a silent skip.
    #[error("unsupported format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("truncated STL header: got {got} of 84 bytes")]
    TruncatedStlHeader { got: usize },

    #[error("numeric parse error: {0:?}")]
    NumericParse(String),

    #[error("scale factor must be finite, got {0}")]
    InvalidScale(f64),

    #[error("rescale worker panicked")]
    WorkerPanicked,
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, RescaleError>;
