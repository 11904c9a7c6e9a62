mod commands;

use clap::Parser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use pe_core::domain::SpectraError;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let outcome = init_logging()
        .map_err(CliError::from)
        .and_then(|()| run(std::env::args().skip(1)));

    match outcome {
        Ok(code) => code,
        Err(error) => {
            let error = error.into_spectra_error();
            println!("{}", error.diagnostic_line());
            println!("{}", error.fatal_exit_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("make-pe-spectra".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => commands::run_spectra_command(cli.args),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            ErrorKind::UnknownArgument => Err(CliError::Compute(SpectraError::UnrecognizedOption {
                flag: offending_token(&err),
            })),
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

fn offending_token(err: &clap::Error) -> String {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(token)) => token.clone(),
        Some(other) => other.to_string(),
        None => "<unknown>".to_string(),
    }
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to install log subscriber: {error}"))
}

#[derive(Parser)]
#[command(
    name = "make-pe-spectra",
    about = "Make normalized PE rate spectra from SPE calibration and pulse tables"
)]
struct Cli {
    #[command(flatten)]
    args: commands::SpectraArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Compute(#[from] SpectraError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn into_spectra_error(self) -> SpectraError {
        match self {
            Self::Usage(message) => SpectraError::Usage(message.trim_end().to_string()),
            Self::Compute(error) => error,
            Self::Internal(error) => SpectraError::Internal(format!("{error:#}")),
        }
    }
}
