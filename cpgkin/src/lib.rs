//! CpG methylation calling from PacBio CCS kinetics.
//!
//! Each member crate sits behind a feature of the same name:
//! - `core`: regions, kinetic signal and the traits the other crates meet at
//! - `io`: indexed BAM containers, CCS reads and kinetic window extraction
//! - `models`: histogram kinetic models and the methylation classifier
//! - `engine`: the multi-threaded training and prediction coordinators

#[cfg(feature = "core")]
#[doc(inline)]
pub use cpgkin_core as core;

#[cfg(feature = "io")]
#[doc(inline)]
pub use cpgkin_io as io;

#[cfg(feature = "models")]
#[doc(inline)]
pub use cpgkin_models as models;

#[cfg(feature = "engine")]
#[doc(inline)]
pub use cpgkin_engine as engine;
