//! Capability traits for the two external collaborators.

use crate::dl::DownloadOptions;
use crate::error::{DownloadError, TranscodeError};
use crate::transcode::CodecOptions;
use std::path::Path;

/// Fetches a URL to local disk according to yt-dlp options.
///
/// The output location is fixed by `options.outtmpl`; callers check the
/// resulting file themselves.
pub trait MediaFetcher {
    /// Download `url`, blocking until the downloader returns.
    fn fetch(&self, url: &str, options: DownloadOptions) -> Result<(), DownloadError>;
}

/// Re-encodes one media file into another.
pub trait MediaTranscoder {
    /// Transcode `input` into `output`, overwriting `output` if it exists.
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        codec: &CodecOptions,
    ) -> Result<(), TranscodeError>;
}

impl<T: MediaFetcher + ?Sized> MediaFetcher for &T {
    fn fetch(&self, url: &str, options: DownloadOptions) -> Result<(), DownloadError> {
        (**self).fetch(url, options)
    }
}

impl<T: MediaTranscoder + ?Sized> MediaTranscoder for &T {
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        codec: &CodecOptions,
    ) -> Result<(), TranscodeError> {
        (**self).transcode(input, output, codec)
    }
}
