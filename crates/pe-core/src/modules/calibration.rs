//! Per-channel SPE calibration.
//!
//! Each channel's average SPE waveform is divided by its normalization
//! waveform; the peak of the result is the single-photoelectron amplitude and
//! its sum the single-photoelectron charge.

use super::container::Curve;
use super::traits::CurveSource;
use crate::common::config::Options;
use crate::common::constants::{SPE_AVERAGE_CURVE, SPE_NORM_CURVE};
use crate::domain::{SpectraError, SpectraResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelCalibration {
    pub spe_amp: f64,
    pub spe_charge: f64,
}

impl ChannelCalibration {
    /// Derives the calibration from a channel's reference curves.
    pub fn from_curves(channel: usize, average: &Curve, norm: &Curve) -> SpectraResult<Self> {
        let normalized = average
            .divided_by(norm)
            .ok_or_else(|| SpectraError::InvalidCalibration {
                channel,
                reason: format!(
                    "average curve ({} bins from {} by {}) and normalization curve ({} bins from {} by {}) do not share an axis",
                    average.len(),
                    average.low_edge,
                    average.bin_width,
                    norm.len(),
                    norm.low_edge,
                    norm.bin_width
                ),
            })?;
        let spe_amp = normalized
            .maximum()
            .ok_or_else(|| SpectraError::InvalidCalibration {
                channel,
                reason: "reference curves have no bins".to_string(),
            })?;
        let spe_charge = normalized.integral();

        if !(spe_amp.is_finite() && spe_amp > 0.0 && spe_charge.is_finite() && spe_charge > 0.0) {
            return Err(SpectraError::InvalidCalibration {
                channel,
                reason: format!(
                    "SPE amplitude {spe_amp} and charge {spe_charge} must both be positive and finite"
                ),
            });
        }

        Ok(Self {
            spe_amp,
            spe_charge,
        })
    }

    pub fn charge_to_pe(&self, charge: f64) -> f64 {
        charge / self.spe_charge
    }

    pub fn amplitude_to_pe(&self, maxamp: f64) -> f64 {
        maxamp / self.spe_amp
    }
}

/// Calibration of every channel, indexed by channel number.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    channels: Vec<ChannelCalibration>,
}

impl CalibrationTable {
    pub fn new(channels: Vec<ChannelCalibration>) -> SpectraResult<Self> {
        if channels.is_empty() {
            return Err(SpectraError::invalid_option(
                "channel_count",
                "calibration table needs at least one channel",
            ));
        }
        Ok(Self { channels })
    }

    /// Loads every channel `0..options.channel_count` from `source`.
    /// Fails on the first channel with a missing or degenerate reference curve.
    pub fn load<S: CurveSource + ?Sized>(source: &S, options: &Options) -> SpectraResult<Self> {
        let channels = (0..options.channel_count)
            .map(|channel| load_channel(source, options, channel))
            .collect::<SpectraResult<Vec<_>>>()?;
        tracing::info!(
            channels = channels.len(),
            module = %options.module_name,
            "loaded SPE calibration"
        );
        Self::new(channels)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Calibration for a raw table channel number; `None` when out of range.
    pub fn get(&self, opchannel: i32) -> Option<&ChannelCalibration> {
        let index = usize::try_from(opchannel).ok()?;
        self.channels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelCalibration> {
        self.channels.iter()
    }
}

fn load_channel<S: CurveSource + ?Sized>(
    source: &S,
    options: &Options,
    channel: usize,
) -> SpectraResult<ChannelCalibration> {
    let average_path = options.curve_path(SPE_AVERAGE_CURVE, channel);
    let norm_path = options.curve_path(SPE_NORM_CURVE, channel);

    let average = source
        .curve(&average_path)
        .ok_or(SpectraError::MissingCalibration {
            channel,
            curve: average_path,
        })?;
    let norm = source
        .curve(&norm_path)
        .ok_or(SpectraError::MissingCalibration {
            channel,
            curve: norm_path,
        })?;

    let calibration = ChannelCalibration::from_curves(channel, average, norm)?;
    tracing::debug!(
        channel,
        spe_amp = calibration.spe_amp,
        spe_charge = calibration.spe_charge,
        "channel calibration"
    );
    Ok(calibration)
}
