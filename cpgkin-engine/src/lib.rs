//! # Partitioned region processing
//!
//! The engine takes an ordered list of regions, cuts it into one contiguous
//! slice per worker, and runs every slice against a shared set of read
//! containers.
//!
//! Two modes are provided:
//! - **training** ([`Trainer`]): one raw thread per slice, each filling its own
//!   [`PartialAccumulator`](cpgkin_core::traits::PartialAccumulator). After all
//!   threads are joined the accumulators are merged in slice order.
//! - **prediction** ([`Predictor`]): one pool job per slice on a bounded
//!   rayon pool. Results are collected through completion handles and
//!   concatenated in slice order, so the output lines up with the input.
//!
//! A failure in any worker, including a panic, fails the whole run and is
//! reported together with the slice it happened in.
//!
//! ```rust,ignore
//! use cpgkin_engine::{Predictor, Trainer};
//!
//! let trained = Trainer::new(4, 1.0)?.run(&regions, &bams, &extractor, |bias| {
//!     KineticModel::new(kind, params, bias)
//! })?;
//!
//! let probabilities = Predictor::new(4, 0.5)?.run(&regions, &bams, &classifier)?;
//! ```

pub mod dispatch;
pub mod errors;
pub mod partition;
pub mod predict;
pub mod progress;
pub mod train;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub mod consts {
    pub const DEFAULT_THREADS: usize = 1;
    pub const DEFAULT_PRIOR: f64 = 0.5;
    pub const DEFAULT_PSEUDOCOUNT: f64 = 0.0;
}

pub use dispatch::{CompletionHandle, Dispatcher, Job, PoolDispatcher, ThreadDispatcher};
pub use errors::{EngineError, WorkerError};
pub use partition::{Slice, split_range};
pub use predict::Predictor;
pub use train::{Trained, Trainer};
pub use worker::{Prior, SliceStats};
