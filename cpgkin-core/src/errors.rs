use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionSetError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Error parsing region at line {line}: {reason}")]
    RegionParseError { line: usize, reason: String },

    #[error("Invalid strand symbol: {0:?} (expected '+', '-' or '.')")]
    InvalidStrand(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a single read could not provide a signal window for a region.
///
/// Skips are local to one read: workers count them and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionSkip {
    #[error("region has no orientation")]
    Unoriented,

    #[error("signal window falls outside the reference")]
    WindowOutOfBounds,

    #[error("read is not a mapped primary alignment")]
    Unmapped,

    #[error("read does not span the signal window")]
    NotSpanning,

    #[error("read alignment has a gap or insertion inside the signal window")]
    Gapped,

    #[error("read has no {0} kinetic tag")]
    MissingKinetics(&'static str),

    #[error("malformed read: {0}")]
    Malformed(String),
}
