//! CLI argument definitions using clap.

use crate::config::Config;
use crate::prompt::{Lines, Terminal};
use crate::session::{Outcome, Session};
use clap::Parser;
use color_eyre::Section;
use eyre::{Context, Result};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use ytpress_dl::dl::YtDlp;
use ytpress_dl::transcode::Ffmpeg;

#[derive(Debug, Parser)]
#[command(name = "ytpress")]
#[command(about = "Download YouTube videos or audio and recompress them")]
#[command(version)]
pub struct Cli {
    /// Output directory (default: system download directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// ffmpeg executable used for the secondary compression pass
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    let config = Config::try_from(cli)?;
    let output_dir = config.session.output_dir.clone();

    let ffmpeg = Ffmpeg::new(config.ffmpeg);

    // inquire needs a terminal; piped answers are read line by line
    let outcome = if io::stdin().is_terminal() {
        Session::new(config.session, Terminal, YtDlp, ffmpeg).run()
    } else {
        tracing::debug!("stdin is not a terminal, reading answers line by line");
        Session::new(config.session, Lines::stdio(), YtDlp, ffmpeg).run()
    };

    let outcome = outcome
        .wrap_err("an unexpected error ended the session")
        .with_suggestion(|| {
            format!(
                "check that {:?} is writable and that input did not end early",
                output_dir.display()
            )
        })?;

    tracing::debug!(?outcome, "session ended");

    if outcome == Outcome::Cancelled {
        tracing::info!("exiting after cancellation");
    }

    Ok(())
}
