//! Run options for the PE spectra pipeline.
//!
//! Options start from the detector defaults, may be replaced field by field
//! from a JSON file, and are then overridden by individual command-line
//! flags. They are validated once and read-only afterwards.

use super::constants::{
    DEFAULT_CHANNEL_COUNT, DEFAULT_MODULE_NAME, DEFAULT_PE_ALL_BINS, DEFAULT_PE_ALL_MAX,
    DEFAULT_PE_LOW_BINS, DEFAULT_PE_LOW_MAX, DEFAULT_RMS_MAX, DEFAULT_SAMPLE_PERIOD,
};
use crate::domain::{RangeFamily, SpectraError, SpectraResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How livetime is derived from the event table when no override is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LivetimeMode {
    /// Sum every acquisition window.
    #[default]
    FullScan,
    /// First window length times the window count; assumes uniform windows.
    Shortcut,
}

/// Fixed binning over `[0, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Binning {
    pub bins: usize,
    pub max: f64,
}

impl Binning {
    pub const fn new(bins: usize, max: f64) -> Self {
        Self { bins, max }
    }

    pub fn bin_width(&self) -> f64 {
        self.max / self.bins as f64
    }

    fn validate(&self, option: &'static str) -> SpectraResult<()> {
        if self.bins == 0 {
            return Err(SpectraError::invalid_option(
                option,
                "bin count must be at least 1",
            ));
        }
        if !(self.max.is_finite() && self.max > 0.0) {
            return Err(SpectraError::invalid_option(
                option,
                format!("range maximum must be positive and finite, got {}", self.max),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub module_name: String,
    pub channel_count: usize,
    pub rms_max: f64,
    pub pe_low: Binning,
    pub pe_all: Binning,
    pub sample_period: f64,
    pub livetime_override: Option<f64>,
    pub livetime_mode: LivetimeMode,
    pub amplitude_spectra: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            channel_count: DEFAULT_CHANNEL_COUNT,
            rms_max: DEFAULT_RMS_MAX,
            pe_low: Binning::new(DEFAULT_PE_LOW_BINS, DEFAULT_PE_LOW_MAX),
            pe_all: Binning::new(DEFAULT_PE_ALL_BINS, DEFAULT_PE_ALL_MAX),
            sample_period: DEFAULT_SAMPLE_PERIOD,
            livetime_override: None,
            livetime_mode: LivetimeMode::FullScan,
            amplitude_spectra: false,
        }
    }
}

impl Options {
    /// Reads options from a JSON file; fields absent from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> SpectraResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| SpectraError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| SpectraError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn binning(&self, family: RangeFamily) -> Binning {
        match family {
            RangeFamily::Low => self.pe_low,
            RangeFamily::All => self.pe_all,
        }
    }

    /// Forced livetime, only when it is set to a positive value.
    pub fn forced_livetime(&self) -> Option<f64> {
        self.livetime_override.filter(|livetime| *livetime > 0.0)
    }

    /// Input object path of a per-channel calibration curve.
    pub fn curve_path(&self, curve: &str, channel: usize) -> String {
        format!("{}/{}{:02}", self.module_name, curve, channel)
    }

    pub fn table_path(&self, table: &str) -> String {
        format!("{}/{}", self.module_name, table)
    }

    pub fn validate(&self) -> SpectraResult<()> {
        if self.module_name.trim().is_empty() {
            return Err(SpectraError::invalid_option(
                "module_name",
                "module name must not be empty",
            ));
        }
        if self.channel_count == 0 {
            return Err(SpectraError::invalid_option(
                "channel_count",
                "at least one channel is required",
            ));
        }
        if !self.rms_max.is_finite() {
            return Err(SpectraError::invalid_option(
                "rms_max",
                format!("cut threshold must be finite, got {}", self.rms_max),
            ));
        }
        if !(self.sample_period.is_finite() && self.sample_period > 0.0) {
            return Err(SpectraError::invalid_option(
                "sample_period",
                format!(
                    "sample period must be positive and finite, got {}",
                    self.sample_period
                ),
            ));
        }
        if let Some(livetime) = self.livetime_override.filter(|value| !value.is_finite()) {
            return Err(SpectraError::invalid_option(
                "livetime_override",
                format!("livetime override must be finite, got {livetime}"),
            ));
        }
        self.pe_low.validate("pe_low")?;
        self.pe_all.validate("pe_all")
    }
}
