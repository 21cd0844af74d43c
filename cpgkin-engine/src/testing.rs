//! In-memory stand-ins for reads, containers, extractors and accumulators.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use cpgkin_core::ExtractionSkip;
use cpgkin_core::models::{KineticSignal, Region, Strand};
use cpgkin_core::traits::{
    Classifier, PartialAccumulator, ReadContainerSet, RegionStream, SignalExtractor,
};

const STEP: u32 = 10;

/// `n` forward-strand regions, region `i` starting at `i * 10`.
pub fn forward_regions(n: usize) -> Vec<Region> {
    (0..n as u32)
        .map(|i| Region::new("chr1", i * STEP, i * STEP + 2, Strand::Forward))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadKind {
    Good,
    Bad,
    Refused,
    Corrupt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestRead {
    pub value: f64,
    pub kind: ReadKind,
}

impl TestRead {
    pub fn good(value: f64) -> Self {
        TestRead {
            value,
            kind: ReadKind::Good,
        }
    }

    /// The extractor skips it.
    pub fn bad() -> Self {
        TestRead {
            value: 0.0,
            kind: ReadKind::Bad,
        }
    }

    /// Extracts fine, the accumulator refuses it.
    pub fn refused() -> Self {
        TestRead {
            value: 0.0,
            kind: ReadKind::Refused,
        }
    }

    /// The extractor panics on it.
    pub fn corrupt() -> Self {
        TestRead {
            value: 0.0,
            kind: ReadKind::Corrupt,
        }
    }
}

/// Reads keyed by the index of the region they overlap.
#[derive(Debug, Default)]
pub struct MemoryContainers {
    reads: HashMap<u32, Vec<TestRead>>,
    unreadable: Option<u32>,
    opened: AtomicUsize,
}

impl MemoryContainers {
    pub fn insert(&mut self, index: usize, reads: Vec<TestRead>) {
        self.reads.insert(index as u32 * STEP, reads);
    }

    /// Fetching the region at `index` fails with an I/O error.
    pub fn break_at(&mut self, index: usize) {
        self.unreadable = Some(index as u32 * STEP);
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

pub struct MemoryStream {
    reads: HashMap<u32, Vec<TestRead>>,
    unreadable: Option<u32>,
}

impl ReadContainerSet for MemoryContainers {
    type Read = TestRead;
    type Stream = MemoryStream;

    fn open(&self) -> io::Result<MemoryStream> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryStream {
            reads: self.reads.clone(),
            unreadable: self.unreadable,
        })
    }
}

impl RegionStream for MemoryStream {
    type Read = TestRead;

    fn fetch(&mut self, region: &Region) -> io::Result<Vec<TestRead>> {
        if self.unreadable == Some(region.start) {
            return Err(io::Error::other(format!("truncated block at {}", region)));
        }
        Ok(self.reads.get(&region.start).cloned().unwrap_or_default())
    }
}

/// Containers that cannot be opened at all.
pub struct FailingContainers;

impl ReadContainerSet for FailingContainers {
    type Read = TestRead;
    type Stream = MemoryStream;

    fn open(&self) -> io::Result<MemoryStream> {
        Err(io::Error::new(io::ErrorKind::NotFound, "missing.bam"))
    }
}

/// One-position windows holding the read value.
pub struct TestExtractor;

impl SignalExtractor for TestExtractor {
    type Read = TestRead;

    fn window_size(&self) -> usize {
        1
    }

    fn extract(&self, read: &TestRead, _region: &Region) -> Result<KineticSignal, ExtractionSkip> {
        match read.kind {
            ReadKind::Good => Ok(KineticSignal::new(vec![read.value], vec![read.value])),
            ReadKind::Refused => Ok(KineticSignal::new(vec![f64::NAN], vec![f64::NAN])),
            ReadKind::Bad => Err(ExtractionSkip::NotSpanning),
            ReadKind::Corrupt => panic!("corrupt read"),
        }
    }
}

#[derive(Error, Debug)]
#[error("cannot ingest NaN")]
pub struct NanSignal;

/// Sums the first IPD value of every signal it sees.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingAccumulator {
    pub bias: f64,
    pub sum: f64,
    pub count: u64,
}

impl CountingAccumulator {
    pub fn new(bias: f64) -> Self {
        CountingAccumulator {
            bias,
            sum: 0.0,
            count: 0,
        }
    }

    pub fn build(bias: f64) -> Result<Self, NanSignal> {
        if bias.is_nan() {
            return Err(NanSignal);
        }
        Ok(CountingAccumulator::new(bias))
    }
}

impl PartialAccumulator for CountingAccumulator {
    type Error = NanSignal;

    fn ingest(&mut self, signal: &KineticSignal) -> Result<(), NanSignal> {
        let value = signal.ipd[0];
        if value.is_nan() {
            return Err(NanSignal);
        }
        self.sum += value;
        self.count += 1;
        Ok(())
    }

    fn merge(&mut self, other: &Self) -> Result<(), NanSignal> {
        self.bias += other.bias;
        self.sum += other.sum;
        self.count += other.count;
        Ok(())
    }

    fn ingested(&self) -> u64 {
        self.count
    }
}

/// Scores a region with the mean value of its usable reads, the prior when
/// there are none.
pub struct ScoreClassifier;

impl Classifier for ScoreClassifier {
    type Read = TestRead;

    fn classify(
        &self,
        region: &Region,
        reads: &[TestRead],
        prior_positive: f64,
        _prior_negative: f64,
    ) -> f64 {
        let values: Vec<f64> = reads
            .iter()
            .filter_map(|read| TestExtractor.extract(read, region).ok())
            .map(|signal| signal.ipd[0])
            .collect();

        if values.is_empty() {
            prior_positive
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }
}
