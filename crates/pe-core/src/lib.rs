//! Photoelectron rate spectra from SPE calibration and pulse tables.
//!
//! The pipeline loads a per-channel SPE calibration, converts every pulse that
//! passes the baseline-noise cut into PE units, histograms the result and
//! rescales the histograms by the acquisition livetime into kHz rates.

pub mod common;
pub mod domain;
pub mod modules;
