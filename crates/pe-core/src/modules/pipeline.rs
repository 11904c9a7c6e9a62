//! Loader → aggregator → livetime estimator → normalizer → output.

use super::aggregator::{AggregationStats, PulseAggregator};
use super::calibration::CalibrationTable;
use super::container::ContainerDocument;
use super::livetime::{Livetime, LivetimeEstimator};
use super::normalizer::{RateSpectra, normalize};
use super::serialization::OutputSink;
use super::traits::{CurveSource, TableSource};
use crate::common::config::Options;
use crate::common::constants::{EVENT_TABLE, PULSE_TABLE};
use crate::domain::{PulseRecord, SpectraError, SpectraRequest, SpectraResult};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct SpectraSummary {
    pub output_path: PathBuf,
    pub channels: usize,
    pub stats: AggregationStats,
    pub livetime: Livetime,
    pub histograms_written: usize,
}

/// Builds the rate spectra from an already opened input. Options are validated first.
pub fn build_rate_spectra<S>(source: &S, options: &Options) -> SpectraResult<RateSpectra>
where
    S: CurveSource + TableSource,
{
    options.validate()?;
    let calibration = CalibrationTable::load(source, options)?;

    let pulse_table = options.table_path(PULSE_TABLE);
    let pulses = source
        .records::<PulseRecord>(&pulse_table)
        .ok_or(SpectraError::MissingTable { path: pulse_table })?;
    let filled = PulseAggregator::new(&calibration, options).consume(pulses);

    let livetime = LivetimeEstimator::from_options(options)
        .estimate(source, &options.table_path(EVENT_TABLE))?;
    normalize(filled, livetime)
}

/// Runs the whole pipeline for one input/output pair.
///
/// Both files are acquired before any computation; the output only appears
/// once every stage has succeeded.
pub fn run_pe_spectra(request: &SpectraRequest, options: &Options) -> SpectraResult<SpectraSummary> {
    options.validate()?;

    let input = ContainerDocument::open(&request.input_path)?;
    let sink = OutputSink::create(&request.output_path)?;
    tracing::info!(
        input = %request.input_path.display(),
        output = %sink.path().display(),
        channels = options.channel_count,
        "making PE spectra"
    );

    let rates = build_rate_spectra(&input, options)?;
    let histograms_written = sink.commit(&rates)?;

    Ok(SpectraSummary {
        output_path: request.output_path.clone(),
        channels: rates.charge.channel_count(),
        stats: rates.stats,
        livetime: rates.livetime,
        histograms_written,
    })
}
