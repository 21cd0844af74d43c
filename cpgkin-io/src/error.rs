use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for cpgkin-io operations.
#[derive(Error, Debug)]
pub enum BamError {
    /// No read container was given.
    #[error("At least one BAM file is needed")]
    NoContainers,

    #[error("BAM file not found: {0}")]
    MissingFile(PathBuf),

    /// Region queries need a `.bai` or `.csi` index next to the BAM file.
    #[error("BAM file {0} has no index (.bai or .csi)")]
    MissingIndex(PathBuf),

    #[error("Signal window size must be odd and positive, got {0}")]
    InvalidWindow(usize),

    /// IO error occurred while opening or reading a BAM file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for cpgkin-io operations.
pub type Result<T> = std::result::Result<T, BamError>;
