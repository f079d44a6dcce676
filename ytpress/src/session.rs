//! Interactive session loop: ask for a request, download it, ask again.

use crate::prompt::Prompt;
use std::path::PathBuf;
use ytpress_dl::error::InputError;
use ytpress_dl::fetch::{Compression, DownloadRequest, Downloaded, fetch_and_transcode};
use ytpress_dl::quality::{MediaKind, Quality};
use ytpress_dl::traits::{MediaFetcher, MediaTranscoder};
use ytpress_dl::{Error, Result};

pub const BANNER: &str = "=== YouTube Downloader ===";
pub const FAREWELL: &str = "Thank you for using the downloader!";
pub const CANCELLED: &str = "Download cancelled by user";

pub const ASK_URL: &str = "Enter YouTube URL:";
pub const ASK_FILENAME: &str = "Enter the desired filename (without extension):";
pub const ASK_KIND: &str = "What do you want to download? (video/audio):";
pub const ASK_AGAIN: &str = "Do you want to download another? (yes/no):";

pub const HINT_KIND: &str = "Please enter 'video' or 'audio'";
pub const HINT_AGAIN: &str = "Please enter 'yes' or 'no'";

/// Session settings fixed at startup.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Directory receiving every download; created if missing.
    pub output_dir: PathBuf,
}

/// How a session ended without error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The user answered "no" to another download.
    Finished,
    /// The user interrupted a prompt or a running request.
    Cancelled,
}

pub struct Session<P, F, T> {
    config: SessionConfig,
    prompt: P,
    fetcher: F,
    transcoder: T,
}

impl<P, F, T> Session<P, F, T>
where
    P: Prompt,
    F: MediaFetcher,
    T: MediaTranscoder,
{
    pub fn new(config: SessionConfig, prompt: P, fetcher: F, transcoder: T) -> Self {
        Self {
            config,
            prompt,
            fetcher,
            transcoder,
        }
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Run until the user stops or interrupts.
    ///
    /// Download and transcode failures end only the current request. Ctrl-C, at a
    /// prompt or while a request runs, ends the session as [`Outcome::Cancelled`].
    /// Any other error ends the session and is returned.
    pub fn run(&mut self) -> Result<Outcome> {
        self.prompt.say(BANNER);

        match self.run_loop() {
            Ok(()) => {
                self.prompt.say(FAREWELL);
                Ok(Outcome::Finished)
            }
            Err(e) if e.is_cancellation() => {
                tracing::info!("session cancelled");
                self.prompt.say(CANCELLED);
                Ok(Outcome::Cancelled)
            }
            Err(e) => {
                tracing::error!(error = %e, "session aborted");
                Err(e)
            }
        }
    }

    fn run_loop(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        tracing::debug!(output_dir = %self.config.output_dir.display(), "session started");

        loop {
            let request = self.collect_request()?;
            self.dispatch(&request)?;

            if !self.ask_again()? {
                return Ok(());
            }
        }
    }

    /// Ask for URL, filename, media kind and quality, re-asking until kind and quality are valid.
    pub fn collect_request(&mut self) -> Result<DownloadRequest> {
        let url = self.prompt.ask(ASK_URL)?;
        let filename = self.prompt.ask(ASK_FILENAME)?;

        let kind = self.ask_until(ASK_KIND, HINT_KIND, |s| s.parse::<MediaKind>())?;

        let (question, hint) = quality_prompt(kind);
        let quality = self.ask_until(&question, hint, |s| Quality::parse(kind, s))?;

        Ok(DownloadRequest {
            url,
            filename,
            output_dir: self.config.output_dir.clone(),
            quality,
        })
    }

    fn ask_until<V>(
        &mut self,
        question: &str,
        hint: &str,
        parse: impl Fn(&str) -> std::result::Result<V, InputError>,
    ) -> Result<V> {
        loop {
            let answer = self.prompt.ask(question)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::debug!(error = %e, "rejected answer");
                    self.prompt.say(hint);
                }
            }
        }
    }

    /// Run one request, reporting request-level failures instead of returning them.
    fn dispatch(&mut self, request: &DownloadRequest) -> Result<()> {
        self.prompt.say(&format!(
            "Downloading and compressing {} in {}...",
            request.kind(),
            request.quality
        ));

        match fetch_and_transcode(request, &self.fetcher, &self.transcoder) {
            Ok(done) => {
                self.report(&done);
                Ok(())
            }
            Err(e) if e.is_request_failure() => {
                tracing::warn!(url = request.url, error = %e, "request failed");
                self.prompt.say(&format!("An error occurred: {e}"));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn report(&mut self, done: &Downloaded) {
        if let Compression::Failed(e) = &done.compression {
            self.prompt.say(&format!("Additional compression failed: {e}"));
        }

        self.prompt.say(&format!(
            "{} downloaded and compressed successfully as: {}",
            capitalize(&done.kind.to_string()),
            done.file_name()
        ));
    }

    /// `yes` / `no` in any case; anything else asks again.
    fn ask_again(&mut self) -> Result<bool> {
        loop {
            match self.prompt.ask(ASK_AGAIN)?.to_lowercase().as_str() {
                "yes" => return Ok(true),
                "no" => return Ok(false),
                _ => self.prompt.say(HINT_AGAIN),
            }
        }
    }
}

/// Question and retry hint for the quality of `kind`.
fn quality_prompt(kind: MediaKind) -> (String, &'static str) {
    match kind {
        MediaKind::Video => (
            format!("Choose quality ({}):", kind.quality_choices()),
            "Please enter a valid quality option",
        ),
        MediaKind::Audio => (
            format!("Choose audio quality ({}):", kind.quality_choices()),
            "Please enter a valid audio quality option",
        ),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
