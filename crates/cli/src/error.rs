use thiserror::Error;

use btc_whatif_core::errors::{CoreError, ErrorKind};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Core(e) => match e.kind() {
                ErrorKind::InvalidInput | ErrorKind::InvalidProjectionWindow => 2,
                ErrorKind::PriceUnavailable => 3,
                ErrorKind::UpstreamFailure => 4,
                ErrorKind::Configuration => 5,
            },
            Self::Serialization(_) => 6,
            Self::Logging(_) => 7,
        }
    }
}
