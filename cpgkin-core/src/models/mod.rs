pub mod region;
pub mod region_set;
pub mod signal;

// re-export for cleaner imports
pub use self::region::{Region, Strand};
pub use self::region_set::{BedRegions, BedSource, RegionSet};
pub use self::signal::KineticSignal;
