use super::aggregator::{AggregationStats, FilledSpectra};
use super::histogram::{PeHistogram, PeSpectra};
use super::livetime::Livetime;
use crate::common::constants::RATE_SCALE_KHZ;
use crate::domain::{SpectraError, SpectraResult};

/// Spectra expressed as rates. Built only by [`normalize`], which consumes the
/// filled spectra, so every histogram is scaled exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSpectra {
    pub charge: PeSpectra,
    pub amplitude: Option<PeSpectra>,
    pub stats: AggregationStats,
    pub livetime: Livetime,
    pub channel_factor: f64,
    pub total_factor: f64,
}

impl RateSpectra {
    /// Every histogram, charge family first.
    pub fn histograms(&self) -> impl Iterator<Item = &PeHistogram> {
        self.charge
            .histograms()
            .chain(self.amplitude.iter().flat_map(PeSpectra::histograms))
    }
}

/// Scales per-channel histograms by `1e-3 / livetime` and the channel sums by
/// `1e-3 / (channels * livetime)`.
pub fn normalize(filled: FilledSpectra, livetime: Livetime) -> SpectraResult<RateSpectra> {
    if !(livetime.seconds.is_finite() && livetime.seconds > 0.0) {
        return Err(SpectraError::InvalidLivetime {
            livetime: livetime.seconds,
        });
    }

    let FilledSpectra {
        mut charge,
        mut amplitude,
        stats,
    } = filled;

    let channels = charge.channel_count() as f64;
    let channel_factor = RATE_SCALE_KHZ / livetime.seconds;
    let total_factor = RATE_SCALE_KHZ / (channels * livetime.seconds);

    charge.scale(channel_factor, total_factor);
    if let Some(amplitude) = amplitude.as_mut() {
        amplitude.scale(channel_factor, total_factor);
    }
    tracing::info!(channel_factor, total_factor, "normalized spectra to rates");

    Ok(RateSpectra {
        charge,
        amplitude,
        stats,
        livetime,
        channel_factor,
        total_factor,
    })
}
