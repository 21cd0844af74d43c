use std::io;

use indicatif::ProgressBar;
use log::info;

use cpgkin_core::models::Region;
use cpgkin_core::traits::{Classifier, ReadContainerSet};

use crate::dispatch::{Dispatcher, Job, PoolDispatcher};
use crate::errors::{EngineError, Result};
use crate::partition::split_range;
use crate::progress::region_progress;
use crate::worker::{Prior, predict_slice};

///
/// Scores every region with a bounded worker pool and hands the posteriors
/// back in region order.
///
/// The regions are split into one slice per slot; each slice becomes a pool
/// job bound to its own completion handle. Collection waits for the pool to
/// drain, checks every handle, and only then concatenates the slice results
/// in ascending slice order.
///
pub struct Predictor {
    pool: PoolDispatcher,
    prior: Prior,
    max_reads: Option<usize>,
    progress: bool,
}

impl Predictor {
    pub fn new(threads: usize, prior: f64) -> Result<Self> {
        if threads == 0 {
            return Err(EngineError::Configuration(
                "prediction needs at least one thread".to_string(),
            ));
        }
        let prior = Prior::new(prior).ok_or_else(|| {
            EngineError::Configuration(format!(
                "prior probability must be in [0, 1], got {}",
                prior
            ))
        })?;

        Ok(Predictor {
            pool: PoolDispatcher::new(threads)?,
            prior,
            max_reads: None,
            progress: false,
        })
    }

    /// Cap the number of reads looked at per region.
    pub fn with_max_reads(mut self, max_reads: Option<usize>) -> Self {
        self.max_reads = max_reads;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn threads(&self) -> usize {
        self.pool.slots()
    }

    pub fn prior(&self) -> Prior {
        self.prior
    }

    /// One posterior per region, aligned with `regions`.
    pub fn run<C, K>(&self, regions: &[Region], containers: &C, classifier: &K) -> Result<Vec<f64>>
    where
        C: ReadContainerSet,
        K: Classifier<Read = C::Read>,
    {
        let slices = split_range(regions.len(), self.threads())?;

        info!(
            "Predicting {} regions with {} threads",
            regions.len(),
            self.threads()
        );

        let progress = region_progress(regions.len(), self.progress);

        let jobs: Vec<Job<'_, Vec<f64>>> = slices
            .into_iter()
            .map(|slice| {
                let progress: &ProgressBar = &progress;
                let prior = self.prior;
                let max_reads = self.max_reads;
                Job::new(slice, move || {
                    predict_slice(
                        regions, slice, containers, classifier, prior, max_reads, progress,
                    )
                })
            })
            .collect();

        let handles = self.pool.dispatch(jobs);
        progress.finish_and_clear();

        let mut probabilities = Vec::with_capacity(regions.len());
        for handle in handles {
            probabilities.extend(handle.wait()?);
        }

        Ok(probabilities)
    }

    ///
    /// Like [`Predictor::run`], streaming `(region, posterior)` pairs to
    /// `sink` in region order once every slice has completed. Nothing reaches
    /// the sink when any slice failed.
    ///
    pub fn run_with_sink<C, K, S>(
        &self,
        regions: &[Region],
        containers: &C,
        classifier: &K,
        mut sink: S,
    ) -> Result<usize>
    where
        C: ReadContainerSet,
        K: Classifier<Read = C::Read>,
        S: FnMut(&Region, f64) -> io::Result<()>,
    {
        let probabilities = self.run(regions, containers, classifier)?;

        for (region, probability) in regions.iter().zip(&probabilities) {
            sink(region, *probability)?;
        }

        Ok(probabilities.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::errors::WorkerError;
    use crate::testing::{MemoryContainers, ScoreClassifier, TestRead, forward_regions};

    #[fixture]
    fn loaded() -> (Vec<Region>, MemoryContainers) {
        let regions = forward_regions(13);
        let mut containers = MemoryContainers::default();
        for i in 0..regions.len() {
            // region 5 has no reads and falls back to the prior
            if i != 5 {
                containers.insert(i, vec![TestRead::good(i as f64 / 100.0)]);
            }
        }
        (regions, containers)
    }

    fn expected() -> Vec<f64> {
        (0..13)
            .map(|i| if i == 5 { 0.5 } else { i as f64 / 100.0 })
            .collect()
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(7)]
    #[case(13)]
    #[case(20)]
    fn test_output_order_matches_input(
        loaded: (Vec<Region>, MemoryContainers),
        #[case] threads: usize,
    ) {
        let (regions, containers) = loaded;
        let probabilities = Predictor::new(threads, 0.5)
            .unwrap()
            .run(&regions, &containers, &ScoreClassifier)
            .unwrap();

        assert_eq!(probabilities, expected());
    }

    #[rstest]
    fn test_no_regions() {
        let containers = MemoryContainers::default();
        let probabilities = Predictor::new(4, 0.5)
            .unwrap()
            .run(&[], &containers, &ScoreClassifier)
            .unwrap();

        assert!(probabilities.is_empty());
        assert_eq!(containers.opened(), 0);
    }

    #[rstest]
    fn test_single_region() {
        let regions = forward_regions(1);
        let mut containers = MemoryContainers::default();
        containers.insert(0, vec![TestRead::good(0.25), TestRead::good(0.75)]);

        let probabilities = Predictor::new(1, 0.5)
            .unwrap()
            .run(&regions, &containers, &ScoreClassifier)
            .unwrap();

        assert_eq!(probabilities, vec![0.5]);
    }

    #[rstest]
    fn test_sink_sees_regions_in_order(loaded: (Vec<Region>, MemoryContainers)) {
        let (regions, containers) = loaded;
        let mut seen = Vec::new();

        let written = Predictor::new(4, 0.5)
            .unwrap()
            .run_with_sink(&regions, &containers, &ScoreClassifier, |region, p| {
                seen.push((region.start, p));
                Ok(())
            })
            .unwrap();

        assert_eq!(written, 13);
        let starts: Vec<u32> = seen.iter().map(|(start, _)| *start).collect();
        assert_eq!(starts, regions.iter().map(|r| r.start).collect::<Vec<_>>());
        assert_eq!(
            seen.iter().map(|(_, p)| *p).collect::<Vec<_>>(),
            expected()
        );
    }

    #[rstest]
    fn test_one_failed_slice_emits_nothing(loaded: (Vec<Region>, MemoryContainers)) {
        let (regions, mut containers) = loaded;
        containers.break_at(12);
        let mut emitted = 0;

        let result = Predictor::new(3, 0.5).unwrap().run_with_sink(
            &regions,
            &containers,
            &ScoreClassifier,
            |_, _| {
                emitted += 1;
                Ok(())
            },
        );

        match result {
            Err(EngineError::WorkerFailure { index, slice, source }) => {
                assert_eq!(index, 2);
                assert_eq!(slice.range(), 9..13);
                assert!(matches!(source, WorkerError::Io(_)));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(emitted, 0);
    }

    #[rstest]
    fn test_panicking_classifier_is_reported() {
        let regions = forward_regions(3);
        let mut containers = MemoryContainers::default();
        containers.insert(1, vec![TestRead::corrupt()]);

        let result = Predictor::new(2, 0.5)
            .unwrap()
            .run(&regions, &containers, &ScoreClassifier);

        assert!(matches!(
            result,
            Err(EngineError::WorkerFailure {
                index: 0,
                source: WorkerError::Panicked(_),
                ..
            })
        ));
    }

    #[rstest]
    fn test_sink_errors_are_reported() {
        let regions = forward_regions(2);
        let containers = MemoryContainers::default();

        let result = Predictor::new(1, 0.5).unwrap().run_with_sink(
            &regions,
            &containers,
            &ScoreClassifier,
            |_, _| Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")),
        );

        assert!(matches!(result, Err(EngineError::Output(_))));
    }

    #[rstest]
    fn test_coverage_cap_is_applied() {
        let regions = forward_regions(1);
        let mut containers = MemoryContainers::default();
        containers.insert(0, vec![TestRead::good(0.2), TestRead::good(0.8)]);

        let probabilities = Predictor::new(1, 0.5)
            .unwrap()
            .with_max_reads(Some(1))
            .run(&regions, &containers, &ScoreClassifier)
            .unwrap();

        assert_eq!(probabilities, vec![0.2]);
    }

    #[rstest]
    #[case(0, 0.5)]
    #[case(2, -0.1)]
    #[case(2, 1.1)]
    fn test_invalid_configuration(#[case] threads: usize, #[case] prior: f64) {
        assert!(matches!(
            Predictor::new(threads, prior),
            Err(EngineError::Configuration(_))
        ));
    }
}
