pub mod aggregator;
pub mod calibration;
pub mod container;
pub mod histogram;
pub mod livetime;
pub mod normalizer;
pub mod pipeline;
pub mod serialization;

mod traits;

pub use pipeline::{SpectraSummary, build_rate_spectra, run_pe_spectra};
pub use traits::{CurveSource, RecordStream, TableSource};
