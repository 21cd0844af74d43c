use std::ops::AddAssign;

use indicatif::ProgressBar;
use log::{debug, trace, warn};

use cpgkin_core::models::Region;
use cpgkin_core::traits::{
    Classifier, PartialAccumulator, ReadContainerSet, RegionStream, SignalExtractor,
};

use crate::errors::WorkerError;
use crate::partition::Slice;

/// What a training worker saw while going through its slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceStats {
    pub regions: usize,
    pub reads: u64,
    pub ingested: u64,
    pub skipped: u64,
}

impl AddAssign for SliceStats {
    fn add_assign(&mut self, other: Self) {
        self.regions += other.regions;
        self.reads += other.reads;
        self.ingested += other.ingested;
        self.skipped += other.skipped;
    }
}

/// Prior probability of the positive (methylated) class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prior {
    positive: f64,
}

impl Prior {
    pub fn new(positive: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&positive) {
            Some(Prior { positive })
        } else {
            None
        }
    }

    pub fn positive(&self) -> f64 {
        self.positive
    }

    pub fn negative(&self) -> f64 {
        1.0 - self.positive
    }
}

///
/// Fold the signal of every read overlapping the regions of `slice` into
/// `accumulator`.
///
/// Reads the extractor cannot use are skipped and counted. Failing to open or
/// query the containers, or the accumulator refusing a signal, ends the slice
/// with an error.
///
pub fn train_slice<C, E, A>(
    regions: &[Region],
    slice: Slice,
    containers: &C,
    extractor: &E,
    accumulator: &mut A,
    progress: &ProgressBar,
) -> Result<SliceStats, WorkerError>
where
    C: ReadContainerSet,
    E: SignalExtractor<Read = C::Read>,
    A: PartialAccumulator,
{
    let mut stats = SliceStats::default();
    if slice.is_empty() {
        return Ok(stats);
    }

    let mut stream = containers.open()?;

    for region in &regions[slice.range()] {
        let reads = stream.fetch(region)?;
        stats.reads += reads.len() as u64;

        for read in &reads {
            for view in region.oriented_views() {
                match extractor.extract(read, &view) {
                    Ok(signal) => {
                        accumulator
                            .ingest(&signal)
                            .map_err(|err| WorkerError::Accumulator(err.to_string()))?;
                        stats.ingested += 1;
                    }
                    Err(skip) => {
                        trace!("Skipping read over {}: {}", view, skip);
                        stats.skipped += 1;
                    }
                }
            }
        }

        stats.regions += 1;
        progress.inc(1);
    }

    debug!(
        "Slice {} done: {} regions, {} reads, {} signals ingested, {} skipped",
        slice, stats.regions, stats.reads, stats.ingested, stats.skipped
    );

    Ok(stats)
}

///
/// Classify every region of `slice`, in index order, returning one posterior
/// per region.
///
/// `max_reads` caps the working set of a region; reads past the cap are
/// dropped with a warning.
///
pub fn predict_slice<C, K>(
    regions: &[Region],
    slice: Slice,
    containers: &C,
    classifier: &K,
    prior: Prior,
    max_reads: Option<usize>,
    progress: &ProgressBar,
) -> Result<Vec<f64>, WorkerError>
where
    C: ReadContainerSet,
    K: Classifier<Read = C::Read>,
{
    let mut probabilities = Vec::with_capacity(slice.len());
    if slice.is_empty() {
        return Ok(probabilities);
    }

    let mut stream = containers.open()?;

    for region in &regions[slice.range()] {
        let mut reads = stream.fetch(region)?;

        if let Some(cap) = max_reads {
            if reads.len() > cap {
                warn!(
                    "{} has {} overlapping reads, keeping the first {}",
                    region,
                    reads.len(),
                    cap
                );
                reads.truncate(cap);
            }
        }

        let probability =
            classifier.classify(region, &reads, prior.positive(), prior.negative());
        probabilities.push(probability);
        progress.inc(1);
    }

    debug!("Slice {} done: {} regions scored", slice, probabilities.len());

    Ok(probabilities)
}
