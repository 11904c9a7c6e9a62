//! Livetime estimation from the acquisition-window table.

use super::traits::TableSource;
use crate::common::config::{LivetimeMode, Options};
use crate::domain::{EventRecord, SpectraError, SpectraResult};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LivetimeStrategy {
    /// Fixed livetime in seconds; the event table is not read.
    Override { seconds: f64 },
    FullScan,
    Shortcut,
}

impl LivetimeStrategy {
    /// A positive override wins; otherwise the configured mode decides.
    pub fn from_options(options: &Options) -> Self {
        match (options.forced_livetime(), options.livetime_mode) {
            (Some(seconds), _) => Self::Override { seconds },
            (None, LivetimeMode::FullScan) => Self::FullScan,
            (None, LivetimeMode::Shortcut) => Self::Shortcut,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Override { .. } => "override",
            Self::FullScan => "full-scan",
            Self::Shortcut => "shortcut",
        }
    }
}

impl Display for LivetimeStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Livetime {
    pub seconds: f64,
    pub strategy: LivetimeStrategy,
    /// Acquisition windows accounted for; `None` for an override.
    pub windows: Option<usize>,
}

/// Duration of one acquisition window. Windows shorter than one sample count as empty.
pub fn window_seconds(nsamples: i64, sample_period: f64) -> f64 {
    nsamples.saturating_sub(1).max(0) as f64 * sample_period
}

pub struct LivetimeEstimator {
    strategy: LivetimeStrategy,
    sample_period: f64,
}

impl LivetimeEstimator {
    pub fn new(strategy: LivetimeStrategy, sample_period: f64) -> Self {
        Self {
            strategy,
            sample_period,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(LivetimeStrategy::from_options(options), options.sample_period)
    }

    pub fn strategy(&self) -> LivetimeStrategy {
        self.strategy
    }

    /// Estimates livetime from the event table at `table`.
    pub fn estimate<S: TableSource + ?Sized>(
        &self,
        source: &S,
        table: &str,
    ) -> SpectraResult<Livetime> {
        let livetime = match self.strategy {
            LivetimeStrategy::Override { seconds } => Livetime {
                seconds,
                strategy: self.strategy,
                windows: None,
            },
            LivetimeStrategy::FullScan => {
                let events = source
                    .records::<EventRecord>(table)
                    .ok_or_else(|| missing_table(table))?;
                let (windows, seconds) = events.fold((0_usize, 0.0_f64), |(count, sum), event| {
                    (count + 1, sum + window_seconds(event.nsamples, self.sample_period))
                });
                Livetime {
                    seconds,
                    strategy: self.strategy,
                    windows: Some(windows),
                }
            }
            LivetimeStrategy::Shortcut => {
                let windows = source
                    .entry_count(table)
                    .ok_or_else(|| missing_table(table))?;
                let first = source
                    .records::<EventRecord>(table)
                    .and_then(|mut events| events.next());
                let seconds = first.map_or(0.0, |event| {
                    window_seconds(event.nsamples, self.sample_period) * windows as f64
                });
                Livetime {
                    seconds,
                    strategy: self.strategy,
                    windows: Some(windows),
                }
            }
        };

        tracing::info!(
            strategy = %livetime.strategy,
            seconds = livetime.seconds,
            windows = ?livetime.windows,
            "estimated livetime"
        );
        Ok(livetime)
    }
}

fn missing_table(table: &str) -> SpectraError {
    SpectraError::MissingTable {
        path: table.to_string(),
    }
}
