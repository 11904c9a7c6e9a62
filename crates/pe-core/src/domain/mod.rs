pub mod errors;

pub use errors::{SpectraError, SpectraErrorCategory, SpectraResult};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One detected pulse as stored in the pulse table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseRecord {
    pub baselinerms: f64,
    pub charge: f64,
    pub maxamp: f64,
    pub opchannel: i32,
}

/// One acquisition window as stored in the event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub nsamples: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectraRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl SpectraRequest {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

/// PE range family of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeFamily {
    Low,
    All,
}

impl RangeFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::All => "all",
        }
    }
}

/// Pulse quantity converted to PE units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeQuantity {
    Charge,
    Amplitude,
}

impl PeQuantity {
    pub const fn histogram_prefix(self) -> &'static str {
        match self {
            Self::Charge => "hpe",
            Self::Amplitude => "hpeamp",
        }
    }
}
