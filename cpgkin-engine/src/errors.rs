use std::io;

use thiserror::Error;

use crate::partition::Slice;

/// A fatal condition inside one worker's slice loop.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("read container error: {0}")]
    Io(#[from] io::Error),

    #[error("accumulator rejected signal: {0}")]
    Accumulator(String),

    #[error("worker panicked: {0}")]
    Panicked(String),

    #[error("worker exited without reporting a result")]
    Vanished,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Worker {index} on slice {slice} failed: {source}")]
    WorkerFailure {
        index: usize,
        slice: Slice,
        #[source]
        source: WorkerError,
    },

    #[error("Failed to merge partial accumulators: {0}")]
    Merge(String),

    #[error("Failed to write results: {0}")]
    Output(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
