//! Pulse-to-PE conversion and histogram accumulation.

use super::calibration::CalibrationTable;
use super::histogram::PeSpectra;
use crate::common::config::Options;
use crate::domain::{PeQuantity, PulseRecord};
use serde::Serialize;

/// What happened to a single pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseDisposition {
    Accepted { channel: usize, pe: f64, pe_amp: f64 },
    ChannelOutOfRange,
    FailedQualityCut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub pulses_read: u64,
    pub accepted: u64,
    pub rejected_channel: u64,
    pub rejected_quality: u64,
}

/// Streams pulses into charge (and optionally amplitude) PE spectra.
pub struct PulseAggregator<'a> {
    calibration: &'a CalibrationTable,
    rms_max: f64,
    charge: PeSpectra,
    amplitude: Option<PeSpectra>,
    stats: AggregationStats,
}

/// Spectra after every pulse has been filled, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledSpectra {
    pub charge: PeSpectra,
    pub amplitude: Option<PeSpectra>,
    pub stats: AggregationStats,
}

impl<'a> PulseAggregator<'a> {
    pub fn new(calibration: &'a CalibrationTable, options: &Options) -> Self {
        Self {
            calibration,
            rms_max: options.rms_max,
            charge: PeSpectra::new(PeQuantity::Charge, options),
            amplitude: options
                .amplitude_spectra
                .then(|| PeSpectra::new(PeQuantity::Amplitude, options)),
            stats: AggregationStats::default(),
        }
    }

    pub fn fill(&mut self, pulse: &PulseRecord) -> PulseDisposition {
        self.stats.pulses_read += 1;

        let channel = usize::try_from(pulse.opchannel).ok();
        let Some((channel, calibration)) = channel
            .filter(|index| *index < self.charge.channel_count())
            .zip(self.calibration.get(pulse.opchannel))
        else {
            self.stats.rejected_channel += 1;
            return PulseDisposition::ChannelOutOfRange;
        };

        if !(pulse.baselinerms < self.rms_max && pulse.charge > 0.0) {
            self.stats.rejected_quality += 1;
            return PulseDisposition::FailedQualityCut;
        }

        let pe = calibration.charge_to_pe(pulse.charge);
        let pe_amp = calibration.amplitude_to_pe(pulse.maxamp);
        self.charge.fill(channel, pe);
        if let Some(amplitude) = self.amplitude.as_mut() {
            amplitude.fill(channel, pe_amp);
        }
        self.stats.accepted += 1;
        PulseDisposition::Accepted {
            channel,
            pe,
            pe_amp,
        }
    }

    /// Fills every pulse in stream order and hands back the spectra.
    pub fn consume<I>(mut self, pulses: I) -> FilledSpectra
    where
        I: IntoIterator<Item = PulseRecord>,
    {
        for pulse in pulses {
            self.fill(&pulse);
        }
        self.finish()
    }

    pub fn finish(self) -> FilledSpectra {
        let stats = self.stats;
        tracing::info!(
            pulses = stats.pulses_read,
            accepted = stats.accepted,
            rejected_channel = stats.rejected_channel,
            rejected_quality = stats.rejected_quality,
            "aggregated pulses"
        );
        FilledSpectra {
            charge: self.charge,
            amplitude: self.amplitude,
            stats,
        }
    }
}
