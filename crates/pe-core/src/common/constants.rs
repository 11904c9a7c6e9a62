//! Detector and naming constants shared by the spectra stages.

pub const DEFAULT_MODULE_NAME: &str = "specalib";
pub const DEFAULT_CHANNEL_COUNT: usize = 32;
pub const DEFAULT_RMS_MAX: f64 = 1.0;
pub const DEFAULT_PE_LOW_BINS: usize = 100;
pub const DEFAULT_PE_LOW_MAX: f64 = 50.0;
pub const DEFAULT_PE_ALL_BINS: usize = 100;
pub const DEFAULT_PE_ALL_MAX: f64 = 500.0;

/// Digitizer tick in seconds (64 MHz sampling).
pub const DEFAULT_SAMPLE_PERIOD: f64 = 15.625e-9;

/// Counts per second to kHz.
pub const RATE_SCALE_KHZ: f64 = 1.0e-3;

pub const EVENT_TABLE: &str = "eventtree";
pub const PULSE_TABLE: &str = "pulsetree";
pub const SPE_AVERAGE_CURVE: &str = "hSPE_ave_femch";
pub const SPE_NORM_CURVE: &str = "hSPE_norm_femch";

pub const PE_AXIS_LABEL: &str = "pe";
pub const RATE_AXIS_LABEL: &str = "rate (kHz)";
