//! Management of TAD predictions from several Hi-C experiments on one
//! chromosome: forbidden regions, centromere detection and TAD splitting.

pub mod centromere;
pub mod chromosome;
pub mod collections;
pub mod error;
pub mod experiment;
pub mod forbidden;
pub mod io;
pub mod persist;
pub mod split;
pub mod types;

pub use chromosome::{Chromosome, ChromosomeOptions};
pub use collections::{Alignment, AlignmentRegistry, ExperimentList};
pub use error::{Error, Result};
pub use experiment::{AttachRequest, DataSource, Experiment};
pub use forbidden::{ForbiddenReason, ForbiddenRegions};
pub use types::{Centromere, ChromosomeSize, ContactMatrix, RelativeChromosomeSize, Tad, TadSet};
