use std::path::PathBuf;

pub type SpectraResult<T> = Result<T, SpectraError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectraErrorCategory {
    ConfigurationError,
    IoSystemError,
    CalibrationError,
    InternalError,
}

impl SpectraErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ConfigurationError => 2,
            Self::IoSystemError => 3,
            Self::CalibrationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationError => "ConfigurationError",
            Self::IoSystemError => "IoSystemError",
            Self::CalibrationError => "CalibrationError",
            Self::InternalError => "InternalError",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpectraError {
    #[error("unrecognized option: {flag}")]
    UnrecognizedOption { flag: String },

    #[error("{0}")]
    Usage(String),

    #[error("invalid value for '{option}': {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("livetime must be positive and finite, got {livetime} s")]
    InvalidLivetime { livetime: f64 },

    #[error("failed to read configuration '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to open input '{}': {source}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse input '{}': {source}", path.display())]
    InputParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("input has no table '{path}'")]
    MissingTable { path: String },

    #[error("failed to write output '{}': {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode output '{}': {source}", path.display())]
    OutputEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing calibration for channel {channel}: curve '{curve}' not found")]
    MissingCalibration { channel: usize, curve: String },

    #[error("invalid calibration for channel {channel}: {reason}")]
    InvalidCalibration { channel: usize, reason: String },

    #[error("{0}")]
    Internal(String),
}

impl SpectraError {
    pub fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            reason: reason.into(),
        }
    }

    pub const fn category(&self) -> SpectraErrorCategory {
        match self {
            Self::UnrecognizedOption { .. }
            | Self::Usage(_)
            | Self::InvalidOption { .. }
            | Self::InvalidLivetime { .. }
            | Self::ConfigParse { .. } => SpectraErrorCategory::ConfigurationError,
            Self::ConfigRead { .. }
            | Self::InputOpen { .. }
            | Self::InputParse { .. }
            | Self::MissingTable { .. }
            | Self::OutputWrite { .. }
            | Self::OutputEncode { .. } => SpectraErrorCategory::IoSystemError,
            Self::MissingCalibration { .. } | Self::InvalidCalibration { .. } => {
                SpectraErrorCategory::CalibrationError
            }
            Self::Internal(_) => SpectraErrorCategory::InternalError,
        }
    }

    /// Short stable identifier printed in diagnostics.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedOption { .. } => "CONFIG.UNRECOGNIZED_OPTION",
            Self::Usage(_) => "CONFIG.USAGE",
            Self::InvalidOption { .. } => "CONFIG.INVALID_OPTION",
            Self::InvalidLivetime { .. } => "CONFIG.INVALID_LIVETIME",
            Self::ConfigRead { .. } => "IO.CONFIG_READ",
            Self::ConfigParse { .. } => "CONFIG.PARSE",
            Self::InputOpen { .. } => "IO.INPUT_OPEN",
            Self::InputParse { .. } => "IO.INPUT_PARSE",
            Self::MissingTable { .. } => "IO.MISSING_TABLE",
            Self::OutputWrite { .. } => "IO.OUTPUT_WRITE",
            Self::OutputEncode { .. } => "IO.OUTPUT_ENCODE",
            Self::MissingCalibration { .. } => "CALIB.MISSING",
            Self::InvalidCalibration { .. } => "CALIB.INVALID",
            Self::Internal(_) => "SYS.INTERNAL",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    /// Channel the error refers to, when it is channel specific.
    pub const fn channel(&self) -> Option<usize> {
        match self {
            Self::MissingCalibration { channel, .. } | Self::InvalidCalibration { channel, .. } => {
                Some(*channel)
            }
            _ => None,
        }
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code(), self)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}
