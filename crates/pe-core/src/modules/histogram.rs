//! Fixed-binning PE histograms and the per-channel spectrum sets built from them.

use crate::common::config::{Binning, Options};
use crate::domain::{PeQuantity, RangeFamily};

/// One-dimensional histogram over `[0, max)` with under/overflow bins.
///
/// Contents are stored with the underflow at index 0 and the overflow at
/// index `bins + 1`. Squared weights are tracked so bin errors survive scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct PeHistogram {
    name: String,
    binning: Binning,
    contents: Vec<f64>,
    sum_w2: Vec<f64>,
    entries: u64,
}

impl PeHistogram {
    pub fn new(name: impl Into<String>, binning: Binning) -> Self {
        let slots = binning.bins + 2;
        Self {
            name: name.into(),
            binning,
            contents: vec![0.0; slots],
            sum_w2: vec![0.0; slots],
            entries: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binning(&self) -> Binning {
        self.binning
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Slot index for `value`; NaN has no slot. Without in-range bins every
    /// value lands in the underflow or overflow slot.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let bins = self.binning.bins;
        if value < 0.0 {
            return Some(0);
        }
        if bins == 0 || value >= self.binning.max {
            return Some(bins + 1);
        }
        let offset = (bins as f64 * value / self.binning.max) as usize;
        Some(1 + offset.min(bins - 1))
    }

    /// Adds one unit-weight entry. Returns the slot that was filled.
    pub fn fill(&mut self, value: f64) -> Option<usize> {
        let slot = self.find_bin(value)?;
        self.contents[slot] += 1.0;
        self.sum_w2[slot] += 1.0;
        self.entries += 1;
        Some(slot)
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        let factor_sq = factor * factor;
        self.contents.iter_mut().for_each(|content| *content *= factor);
        self.sum_w2.iter_mut().for_each(|w2| *w2 *= factor_sq);
    }

    /// In-range bin contents, excluding under/overflow.
    pub fn bin_contents(&self) -> &[f64] {
        &self.contents[1..=self.binning.bins]
    }

    pub fn bin_errors(&self) -> Vec<f64> {
        self.sum_w2[1..=self.binning.bins]
            .iter()
            .map(|w2| w2.sqrt())
            .collect()
    }

    pub fn underflow(&self) -> f64 {
        self.contents[0]
    }

    pub fn overflow(&self) -> f64 {
        self.contents[self.binning.bins + 1]
    }

    /// Sum of the in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_contents().iter().sum()
    }

    /// Lower edge of every in-range bin plus the upper edge of the last one.
    pub fn bin_edges(&self) -> Vec<f64> {
        let width = self.binning.bin_width();
        (0..=self.binning.bins)
            .map(|index| index as f64 * width)
            .collect()
    }
}

/// The "low" and "all" histograms of one channel or of the channel sum.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePair {
    pub low: PeHistogram,
    pub all: PeHistogram,
}

impl RangePair {
    fn new(quantity: PeQuantity, suffix: &str, options: &Options) -> Self {
        let name = |family: RangeFamily| {
            format!(
                "{}_{}_{}",
                quantity.histogram_prefix(),
                family.as_str(),
                suffix
            )
        };
        Self {
            low: PeHistogram::new(name(RangeFamily::Low), options.binning(RangeFamily::Low)),
            all: PeHistogram::new(name(RangeFamily::All), options.binning(RangeFamily::All)),
        }
    }

    fn fill(&mut self, value: f64) {
        self.low.fill(value);
        self.all.fill(value);
    }

    fn scale(&mut self, factor: f64) {
        self.low.scale(factor);
        self.all.scale(factor);
    }

    pub fn get(&self, family: RangeFamily) -> &PeHistogram {
        match family {
            RangeFamily::Low => &self.low,
            RangeFamily::All => &self.all,
        }
    }
}

/// Per-channel and channel-summed spectra of one PE quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct PeSpectra {
    quantity: PeQuantity,
    channels: Vec<RangePair>,
    total: RangePair,
}

impl PeSpectra {
    pub fn new(quantity: PeQuantity, options: &Options) -> Self {
        let channels = (0..options.channel_count)
            .map(|channel| RangePair::new(quantity, &format!("femch{channel}"), options))
            .collect();
        Self {
            quantity,
            channels,
            total: RangePair::new(quantity, "tot", options),
        }
    }

    pub fn quantity(&self) -> PeQuantity {
        self.quantity
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, channel: usize) -> Option<&RangePair> {
        self.channels.get(channel)
    }

    pub fn total(&self) -> &RangePair {
        &self.total
    }

    /// Fills `value` into the channel's pair and the summed pair.
    /// Does nothing for a channel outside the set.
    pub(crate) fn fill(&mut self, channel: usize, value: f64) {
        if let Some(pair) = self.channels.get_mut(channel) {
            pair.fill(value);
            self.total.fill(value);
        }
    }

    pub(crate) fn scale(&mut self, channel_factor: f64, total_factor: f64) {
        self.channels
            .iter_mut()
            .for_each(|pair| pair.scale(channel_factor));
        self.total.scale(total_factor);
    }

    /// All histograms: per channel low then all, followed by the summed pair.
    pub fn histograms(&self) -> impl Iterator<Item = &PeHistogram> {
        self.channels
            .iter()
            .chain(std::iter::once(&self.total))
            .flat_map(|pair| [&pair.low, &pair.all])
    }
}
