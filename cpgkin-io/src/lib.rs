//! # Input/Output for cpgkin.
//!
//! Reading aligned PacBio CCS reads from indexed BAM files, pulling kinetic
//! signal windows out of them, and writing methylation calls as BED.
//!
pub mod bam;
pub mod bed;
pub mod ccs;
pub mod codec;
pub mod error;
pub mod extractor;

// re-expose core functions
pub use bam::{BamContainerSet, BamRegionStream, check_bam_file};
pub use bed::{PredictionWriter, TextOutput, prediction_line};
pub use ccs::{CcsRead, CigarOp, Kinetics};
pub use error::*;
pub use extractor::CcsKineticExtractor;
