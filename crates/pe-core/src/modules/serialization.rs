//! Output container for the rate histograms.
//!
//! The output file is staged next to its destination while the pipeline runs
//! and only renamed into place once every histogram has been encoded. A run
//! that fails drops the staging file and leaves any previous output untouched.

use super::aggregator::AggregationStats;
use super::histogram::PeHistogram;
use super::normalizer::RateSpectra;
use crate::common::constants::{PE_AXIS_LABEL, RATE_AXIS_LABEL};
use crate::domain::{SpectraError, SpectraResult};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Serialize)]
pub struct HistogramRecord<'a> {
    pub name: &'a str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub bins: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub edges: Vec<f64>,
    pub contents: &'a [f64],
    pub errors: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    pub entries: u64,
}

impl<'a> From<&'a PeHistogram> for HistogramRecord<'a> {
    fn from(histogram: &'a PeHistogram) -> Self {
        let binning = histogram.binning();
        Self {
            name: histogram.name(),
            x_label: PE_AXIS_LABEL,
            y_label: RATE_AXIS_LABEL,
            bins: binning.bins,
            x_min: 0.0,
            x_max: binning.max,
            edges: histogram.bin_edges(),
            contents: histogram.bin_contents(),
            errors: histogram.bin_errors(),
            underflow: histogram.underflow(),
            overflow: histogram.overflow(),
            entries: histogram.entries(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutputDocument<'a> {
    pub livetime_seconds: f64,
    pub livetime_strategy: &'static str,
    pub livetime_windows: Option<usize>,
    pub channel_count: usize,
    pub channel_factor: f64,
    pub total_factor: f64,
    pub stats: AggregationStats,
    pub histograms: Vec<HistogramRecord<'a>>,
}

impl<'a> From<&'a RateSpectra> for OutputDocument<'a> {
    fn from(rates: &'a RateSpectra) -> Self {
        Self {
            livetime_seconds: rates.livetime.seconds,
            livetime_strategy: rates.livetime.strategy.as_str(),
            livetime_windows: rates.livetime.windows,
            channel_count: rates.charge.channel_count(),
            channel_factor: rates.channel_factor,
            total_factor: rates.total_factor,
            stats: rates.stats,
            histograms: rates.histograms().map(HistogramRecord::from).collect(),
        }
    }
}

/// Destination of the rate histograms, staged in a temporary file until committed.
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    staging: NamedTempFile,
}

impl OutputSink {
    /// Reserves a staging file in the destination directory.
    pub fn create(path: &Path) -> SpectraResult<Self> {
        let directory = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let staging = NamedTempFile::new_in(directory).map_err(|source| SpectraError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            staging,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every histogram and replaces the destination. Returns the histogram count.
    pub fn commit(self, rates: &RateSpectra) -> SpectraResult<usize> {
        let Self { path, staging } = self;
        let document = OutputDocument::from(rates);
        let write_error = |source| SpectraError::OutputWrite {
            path: path.clone(),
            source,
        };

        {
            let mut writer = BufWriter::new(staging.as_file());
            serde_json::to_writer_pretty(&mut writer, &document).map_err(|source| {
                SpectraError::OutputEncode {
                    path: path.clone(),
                    source,
                }
            })?;
            writer.write_all(b"\n").map_err(write_error)?;
            writer.flush().map_err(write_error)?;
        }
        staging.as_file().sync_all().map_err(write_error)?;
        staging
            .persist(&path)
            .map_err(|error| write_error(error.error))?;

        tracing::info!(
            path = %path.display(),
            histograms = document.histograms.len(),
            "wrote rate spectra"
        );
        Ok(document.histograms.len())
    }
}
