//! Kinetic signal models for CpG methylation calling.
//!
//! A [`KineticModel`] collects IPD and PWD histograms over fixed-size signal
//! windows. It implements
//! [`PartialAccumulator`](cpgkin_core::traits::PartialAccumulator), so
//! partial models built by separate workers can be merged. Models are stored
//! as tagged binary files ([`store`]) and can be dumped as text ([`dump`]).
//! [`KineticClassifier`] turns a methylated and an unmethylated model into a
//! per-CpG posterior.

pub mod classifier;
pub mod dump;
pub mod errors;
pub mod histogram;
pub mod kinetic;
pub mod store;

pub use classifier::KineticClassifier;
pub use errors::ModelError;
pub use kinetic::{KineticModel, ModelKind, ModelParams, Scale, position_pairs};
pub use store::{load_model, save_model};
