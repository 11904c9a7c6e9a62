use super::CliError;
use pe_core::common::config::{LivetimeMode, Options};
use pe_core::domain::SpectraRequest;
use pe_core::modules::run_pe_spectra;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct SpectraArgs {
    /// Input container with SPE curves, event table and pulse table
    #[arg(short = 'f', value_name = "input-path")]
    input: PathBuf,

    /// Output container for the rate histograms (overwritten)
    #[arg(short = 'o', value_name = "output-path")]
    output: PathBuf,

    /// JSON options file, applied before the flags below
    #[arg(long, value_name = "path")]
    config: Option<PathBuf>,

    /// Directory holding the calibration curves and tables
    #[arg(long, value_name = "name")]
    module: Option<String>,

    /// Number of readout channels
    #[arg(long, value_name = "n")]
    channels: Option<usize>,

    /// Keep pulses with baseline RMS below this value
    #[arg(long, value_name = "value", allow_negative_numbers = true)]
    rms_max: Option<f64>,

    /// Digitizer sample period in seconds
    #[arg(long, value_name = "seconds")]
    sample_period: Option<f64>,

    /// Forced livetime in seconds; used instead of the event table when positive
    #[arg(long, value_name = "seconds", allow_negative_numbers = true)]
    livetime: Option<f64>,

    /// How livetime is derived from the event table
    #[arg(long, value_enum, value_name = "mode")]
    livetime_mode: Option<LivetimeModeArg>,

    /// Also write amplitude-based PE spectra
    #[arg(long)]
    amplitude_spectra: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum LivetimeModeArg {
    FullScan,
    Shortcut,
}

impl From<LivetimeModeArg> for LivetimeMode {
    fn from(mode: LivetimeModeArg) -> Self {
        match mode {
            LivetimeModeArg::FullScan => Self::FullScan,
            LivetimeModeArg::Shortcut => Self::Shortcut,
        }
    }
}

impl SpectraArgs {
    fn into_run(self) -> Result<(SpectraRequest, Options), CliError> {
        let mut options = match &self.config {
            Some(path) => Options::from_json_file(path)?,
            None => Options::default(),
        };

        if let Some(module) = self.module {
            options.module_name = module;
        }
        if let Some(channels) = self.channels {
            options.channel_count = channels;
        }
        if let Some(rms_max) = self.rms_max {
            options.rms_max = rms_max;
        }
        if let Some(sample_period) = self.sample_period {
            options.sample_period = sample_period;
        }
        if let Some(livetime) = self.livetime {
            options.livetime_override = Some(livetime);
        }
        if let Some(mode) = self.livetime_mode {
            options.livetime_mode = mode.into();
        }
        if self.amplitude_spectra {
            options.amplitude_spectra = true;
        }

        Ok((SpectraRequest::new(self.input, self.output), options))
    }
}

pub(super) fn run_spectra_command(args: SpectraArgs) -> Result<i32, CliError> {
    let (request, options) = args.into_run()?;
    tracing::debug!(?options, "resolved options");

    println!("Make PE Spectrum");
    let summary = run_pe_spectra(&request, &options)?;
    println!(
        "Accepted {} of {} pulses across {} channels.",
        summary.stats.accepted, summary.stats.pulses_read, summary.channels
    );
    println!(
        "Livetime: {:.6e} s ({}).",
        summary.livetime.seconds, summary.livetime.strategy
    );
    println!(
        "Wrote {} histograms to {}",
        summary.histograms_written,
        summary.output_path.display()
    );
    Ok(0)
}
