//! Configuration resolved from CLI arguments.

use crate::cli::Cli;
use crate::session::SessionConfig;
use eyre::{OptionExt, Result};
use std::path::PathBuf;

/// Resolved run configuration.
#[derive(Debug)]
pub struct Config {
    pub session: SessionConfig,
    pub ffmpeg: PathBuf,
}

impl TryFrom<Cli> for Config {
    type Error = eyre::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let output_dir = match cli.output_dir {
            Some(dir) => dir,
            None => dirs::download_dir()
                .ok_or_eyre("no system download directory, pass --output-dir")?,
        };

        Ok(Self {
            session: SessionConfig { output_dir },
            ffmpeg: cli.ffmpeg,
        })
    }
}
