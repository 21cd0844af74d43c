//! Core types for cpgkin.
//!
//! Regions and region sets, the kinetic signal extracted from reads, and the
//! capability traits ([`traits`]) that the parallel engine, the BAM readers
//! and the kinetic models meet at.

pub mod errors;
pub mod models;
pub mod traits;
pub mod utils;

pub use errors::{ExtractionSkip, RegionSetError};
