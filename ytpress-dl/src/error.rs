//! Error types for ytpress-dl organized by request stage.

use crate::quality::MediaKind;
use pyo3::exceptions::PyKeyboardInterrupt;
use pyo3::{PyErr, Python};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Request error variants organized by stage.
///
/// Rejected prompt answers are not part of it: [`InputError`] only drives re-asking.
#[derive(Debug, Error)]
pub enum Error {
    /// yt-dlp download stage error
    #[error(transparent)]
    Download(DownloadError),

    /// ffmpeg transcode stage error
    #[error(transparent)]
    Transcode(TranscodeError),

    /// Ctrl-C or Esc from the user
    #[error("download cancelled by user")]
    Cancelled,

    /// IO error outside of the download and transcode stages
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error belongs to a single request rather than the whole session.
    pub fn is_request_failure(&self) -> bool {
        match self {
            Error::Download(e) => !e.is_interrupt(),
            Error::Transcode(e) => !e.is_interrupt(),
            _ => false,
        }
    }

    /// Whether the user asked to stop the session.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Download(e) => e.is_interrupt(),
            Error::Transcode(e) => e.is_interrupt(),
            Error::Io(_) => false,
        }
    }
}

/// Rejected answers to the interactive prompts.
#[derive(Debug, Error)]
pub enum InputError {
    /// Neither "video" nor "audio"
    #[error("unknown media kind {0:?}, expected \"video\" or \"audio\"")]
    MediaKind(String),

    /// Not a member of the quality set for the media kind
    #[error("unknown {kind} quality {input:?}, expected one of {expected}")]
    Quality {
        kind: MediaKind,
        input: String,
        expected: String,
    },
}

/// Download failures reported by the fetcher.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Python exception raised inside yt-dlp
    #[error("yt-dlp raised an exception: {0}")]
    Python(#[source] PyErr),

    /// `KeyboardInterrupt` raised while yt-dlp was running
    #[error("download interrupted")]
    Interrupted,

    /// yt-dlp finished with a non-zero return code
    #[error("yt-dlp reported errors for {url} (return code {retcode})")]
    Incomplete { url: String, retcode: i64 },

    /// yt-dlp returned but the expected file is not on disk
    #[error("download finished but {path:?} was not created")]
    MissingOutput { path: PathBuf },
}

/// Secondary compression failures.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Transcoder process could not be started
    #[error("failed to launch {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Transcoder exited unsuccessfully
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Transcoder stopped by Ctrl-C
    #[error("{program} interrupted")]
    Interrupted { program: String },

    /// Compressed output could not replace the original
    #[error("failed to replace {path:?} with the compressed copy")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for ytpress-dl operations.
pub type Result<T> = std::result::Result<T, Error>;

impl DownloadError {
    pub fn is_interrupt(&self) -> bool {
        matches!(self, DownloadError::Interrupted)
    }
}

impl TranscodeError {
    pub fn is_interrupt(&self) -> bool {
        matches!(self, TranscodeError::Interrupted { .. })
    }
}

// SIGINT reaches the embedded interpreter as KeyboardInterrupt
impl From<PyErr> for DownloadError {
    fn from(e: PyErr) -> Self {
        if Python::attach(|py| e.is_instance_of::<PyKeyboardInterrupt>(py)) {
            DownloadError::Interrupted
        } else {
            DownloadError::Python(e)
        }
    }
}

// Interrupts surface as Error::Cancelled, whatever the stage
impl From<DownloadError> for Error {
    fn from(e: DownloadError) -> Self {
        if e.is_interrupt() {
            Error::Cancelled
        } else {
            Error::Download(e)
        }
    }
}

impl From<TranscodeError> for Error {
    fn from(e: TranscodeError) -> Self {
        if e.is_interrupt() {
            Error::Cancelled
        } else {
            Error::Transcode(e)
        }
    }
}

// PyErr → DownloadError → Error
impl From<PyErr> for Error {
    fn from(e: PyErr) -> Self {
        DownloadError::from(e).into()
    }
}
