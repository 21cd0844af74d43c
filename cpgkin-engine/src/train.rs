use indicatif::ProgressBar;
use log::info;

use cpgkin_core::models::Region;
use cpgkin_core::traits::{PartialAccumulator, ReadContainerSet, SignalExtractor};

use crate::dispatch::{Dispatcher, Job, ThreadDispatcher};
use crate::errors::{EngineError, Result};
use crate::partition::split_range;
use crate::progress::region_progress;
use crate::worker::{SliceStats, train_slice};

/// The merged accumulator of a training run and what the workers saw.
#[derive(Debug)]
pub struct Trained<A> {
    pub accumulator: A,
    pub stats: SliceStats,
}

///
/// Trains one accumulator over a region list with a fixed number of raw
/// worker threads.
///
/// Every worker fills its own accumulator; once all threads are joined the
/// partial accumulators are merged in slice order. The pseudo-count is handed
/// to the accumulator of slice 0 only, so the merged result carries it
/// exactly once whatever the thread count.
///
#[derive(Debug, Clone)]
pub struct Trainer {
    threads: usize,
    pseudocount: f64,
    progress: bool,
}

impl Trainer {
    pub fn new(threads: usize, pseudocount: f64) -> Result<Self> {
        if threads == 0 {
            return Err(EngineError::Configuration(
                "training needs at least one thread".to_string(),
            ));
        }
        if !(pseudocount >= 0.0 && pseudocount.is_finite()) {
            return Err(EngineError::Configuration(format!(
                "pseudo-count must be a non-negative number, got {}",
                pseudocount
            )));
        }

        Ok(Trainer {
            threads,
            pseudocount,
            progress: false,
        })
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn pseudocount(&self) -> f64 {
        self.pseudocount
    }

    ///
    /// Run training.
    ///
    /// # Arguments
    /// - regions: regions to collect evidence over
    /// - containers: shared read containers, opened once per worker
    /// - extractor: turns (read, oriented region) into a signal window
    /// - make_accumulator: builds an empty accumulator carrying the given bias
    ///
    /// Any worker failure aborts the run before merging.
    ///
    pub fn run<C, E, A, F>(
        &self,
        regions: &[Region],
        containers: &C,
        extractor: &E,
        make_accumulator: F,
    ) -> Result<Trained<A>>
    where
        C: ReadContainerSet,
        E: SignalExtractor<Read = C::Read>,
        A: PartialAccumulator,
        F: Fn(f64) -> std::result::Result<A, A::Error>,
    {
        let slices = split_range(regions.len(), self.threads)?;

        let mut accumulators = (0..self.threads)
            .map(|i| make_accumulator(if i == 0 { self.pseudocount } else { 0.0 }))
            .collect::<std::result::Result<Vec<A>, A::Error>>()
            .map_err(|err| {
                EngineError::Configuration(format!("cannot build accumulator: {}", err))
            })?;

        info!(
            "Training on {} regions with {} threads",
            regions.len(),
            self.threads
        );

        let progress = region_progress(regions.len(), self.progress);

        let jobs: Vec<Job<'_, SliceStats>> = accumulators
            .iter_mut()
            .zip(slices)
            .map(|(accumulator, slice)| {
                let progress: &ProgressBar = &progress;
                Job::new(slice, move || {
                    train_slice(regions, slice, containers, extractor, accumulator, progress)
                })
            })
            .collect();

        let handles = ThreadDispatcher.dispatch(jobs);
        progress.finish_and_clear();

        // every worker has been joined; surface the first failure, if any
        let mut stats = SliceStats::default();
        for handle in handles {
            stats += handle.wait()?;
        }

        let mut partials = accumulators.into_iter();
        let mut merged = partials.next().ok_or_else(|| {
            EngineError::Configuration("training produced no accumulator".to_string())
        })?;
        for (i, partial) in partials.enumerate() {
            merged
                .merge(&partial)
                .map_err(|err| EngineError::Merge(format!("accumulator {}: {}", i + 1, err)))?;
        }

        info!(
            "Training done: {} reads, {} signals ingested, {} skipped",
            stats.reads, stats.ingested, stats.skipped
        );

        Ok(Trained {
            accumulator: merged,
            stats,
        })
    }
}
