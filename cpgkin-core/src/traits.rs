//! The capabilities the region-processing engine is written against.
//!
//! The engine never looks inside a read, a model or a container: it only
//! opens streams, asks for signal, and folds or scores what it gets back.

use std::io;

use crate::errors::{ExtractionSkip, RegionSetError};
use crate::models::{KineticSignal, Region};

/// A finite, restartable sequence of regions.
pub trait RegionSource {
    type Iter: Iterator<Item = Result<Region, RegionSetError>>;

    fn regions(&self) -> Result<Self::Iter, RegionSetError>;
}

/// A set of read containers shared by all workers.
///
/// Every worker opens its own [`RegionStream`]; the containers must tolerate
/// independent concurrent readers.
pub trait ReadContainerSet: Send + Sync {
    type Read: Send;
    type Stream: RegionStream<Read = Self::Read>;

    fn open(&self) -> io::Result<Self::Stream>;
}

/// A worker-owned reader over a [`ReadContainerSet`].
pub trait RegionStream {
    type Read;

    /// All reads overlapping `region`, from every container.
    fn fetch(&mut self, region: &Region) -> io::Result<Vec<Self::Read>>;
}

/// Turns one read into a fixed-length signal window aligned on an oriented region.
pub trait SignalExtractor: Send + Sync {
    type Read;

    /// Length of the windows this extractor produces.
    fn window_size(&self) -> usize;

    fn extract(&self, read: &Self::Read, region: &Region) -> Result<KineticSignal, ExtractionSkip>;
}

/// A mergeable statistical object that collects evidence.
///
/// Two accumulators can be merged only when they share their configuration.
/// Merging is associative and commutative; a one-time bias set at
/// construction is carried by exactly one instance of a run.
pub trait PartialAccumulator: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn ingest(&mut self, signal: &KineticSignal) -> Result<(), Self::Error>;

    fn merge(&mut self, other: &Self) -> Result<(), Self::Error>;

    /// Number of signals ingested so far, merged ones included.
    fn ingested(&self) -> u64;
}

/// Scores one region from the reads overlapping it.
pub trait Classifier: Send + Sync {
    type Read;

    /// Posterior probability of the positive class, in `[0, 1]`.
    fn classify(
        &self,
        region: &Region,
        reads: &[Self::Read],
        prior_positive: f64,
        prior_negative: f64,
    ) -> f64;
}
