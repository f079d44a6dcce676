//! Fetch-and-transcode: one download request from URL to final file.

use crate::dl::{DownloadOptions, OutputTemplates};
use crate::error::{DownloadError, Result, TranscodeError};
use crate::quality::{MediaKind, Quality};
use crate::traits::{MediaFetcher, MediaTranscoder};
use crate::transcode::{CodecOptions, append_suffix, compress_in_place};
use std::path::{Path, PathBuf};

/// One validated request collected from the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    /// File name without extension, used verbatim.
    pub filename: String,
    pub output_dir: PathBuf,
    pub quality: Quality,
}

impl DownloadRequest {
    pub fn kind(&self) -> MediaKind {
        self.quality.kind()
    }

    /// `<output_dir>/<filename>`
    pub fn stem(&self) -> PathBuf {
        self.output_dir.join(&self.filename)
    }

    /// `<output_dir>/<filename>.mp4` or `.mp3`, depending only on the media kind.
    pub fn output_path(&self) -> PathBuf {
        append_suffix(&self.stem(), &format!(".{}", self.kind().extension()))
    }

    /// yt-dlp options for this request, writing to [`Self::stem`].
    pub fn download_options(&self) -> DownloadOptions {
        let mut opts: DownloadOptions = self.quality.into();
        opts.outtmpl = Some(OutputTemplates::with_stem(&self.stem()));
        opts
    }
}

/// State of the secondary compression pass.
#[derive(Debug)]
pub enum Compression {
    /// Audio downloads are not recompressed.
    Skipped,
    Applied,
    /// The downloaded file was kept as is.
    Failed(TranscodeError),
}

/// A finished request.
#[derive(Debug)]
pub struct Downloaded {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub compression: Compression,
}

impl Downloaded {
    /// File name of the output, for messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Download `request`, check that the output exists, then recompress videos.
///
/// Download failures are returned. A failed recompression is logged and
/// reported in [`Downloaded::compression`]; the downloaded file stays in place.
/// Ctrl-C during either stage returns [`Error::Cancelled`](crate::Error::Cancelled).
pub fn fetch_and_transcode(
    request: &DownloadRequest,
    fetcher: &impl MediaFetcher,
    transcoder: &impl MediaTranscoder,
) -> Result<Downloaded> {
    let kind = request.kind();

    tracing::info!(
        url = request.url,
        kind = %kind,
        quality = %request.quality,
        stem = %request.stem().display(),
        "downloading"
    );

    fetcher.fetch(&request.url, request.download_options())?;

    let path = request.output_path();
    ensure_exists(&path)?;

    let compression = match kind {
        MediaKind::Audio => Compression::Skipped,
        MediaKind::Video => {
            match compress_in_place(&path, transcoder, &CodecOptions::RECOMPRESS_PASS) {
                Ok(()) => Compression::Applied,
                Err(e) if e.is_interrupt() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "recompression failed, keeping download");
                    Compression::Failed(e)
                }
            }
        }
    };

    tracing::info!(path = %path.display(), "request finished");

    Ok(Downloaded {
        path,
        kind,
        compression,
    })
}

fn ensure_exists(path: &Path) -> std::result::Result<(), DownloadError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(DownloadError::MissingOutput {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::quality::{AudioQuality, VideoQuality};
    use std::cell::RefCell;
    use std::fs;
    use std::io;

    /// Records options and writes the file yt-dlp would produce.
    #[derive(Default)]
    struct FakeFetcher {
        calls: RefCell<Vec<DownloadOptions>>,
        skip_write: bool,
        interrupt: bool,
    }

    impl MediaFetcher for FakeFetcher {
        fn fetch(&self, _url: &str, options: DownloadOptions) -> std::result::Result<(), DownloadError> {
            if self.interrupt {
                return Err(DownloadError::Interrupted);
            }
            if !self.skip_write {
                let ext = options.merge_output_format.clone().unwrap_or_else(|| "mp3".to_string());
                let template = &options.outtmpl.as_ref().unwrap().0.as_ref().unwrap()["default"];
                fs::write(template.replace("%(ext)s", &ext), b"downloaded").unwrap();
            }
            self.calls.borrow_mut().push(options);
            Ok(())
        }
    }

    struct FakeTranscoder {
        fail: bool,
    }

    impl MediaTranscoder for FakeTranscoder {
        fn transcode(
            &self,
            _input: &Path,
            output: &Path,
            _codec: &CodecOptions,
        ) -> std::result::Result<(), TranscodeError> {
            if self.fail {
                return Err(TranscodeError::Spawn {
                    program: "ffmpeg".to_string(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            fs::write(output, b"smaller").unwrap();
            Ok(())
        }
    }

    fn request(dir: &Path, quality: Quality) -> DownloadRequest {
        DownloadRequest {
            url: "https://youtu.be/abc".to_string(),
            filename: "clip".to_string(),
            output_dir: dir.to_path_buf(),
            quality,
        }
    }

    #[test]
    fn output_path_extension_follows_kind() {
        let dir = Path::new("/downloads");

        for q in VideoQuality::ALL {
            assert!(request(dir, Quality::Video(q)).output_path().ends_with("clip.mp4"));
        }
        for q in AudioQuality::ALL {
            assert!(request(dir, Quality::Audio(q)).output_path().ends_with("clip.mp3"));
        }
    }

    #[test]
    fn dotted_filename_keeps_its_dots() {
        let mut req = request(Path::new("/downloads"), Quality::Audio(AudioQuality::K128));
        req.filename = "part.1".to_string();

        assert_eq!(req.output_path(), PathBuf::from("/downloads/part.1.mp3"));
    }

    #[test]
    fn video_request_is_downloaded_and_recompressed() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let req = request(dir.path(), Quality::Video(VideoQuality::P720));

        let done = fetch_and_transcode(&req, &fetcher, &FakeTranscoder { fail: false }).unwrap();

        assert_eq!(done.path, dir.path().join("clip.mp4"));
        assert_eq!(done.file_name(), "clip.mp4");
        assert!(matches!(done.compression, Compression::Applied));
        assert_eq!(fs::read(&done.path).unwrap(), b"smaller");
        assert!(!dir.path().join("clip.mp4.temp.mp4").exists());

        let calls = fetcher.calls.borrow();
        assert_eq!(
            calls[0].format.as_deref(),
            Some("bestvideo[height<=720]+bestaudio/best[height<=720]")
        );
    }

    #[test]
    fn audio_request_skips_recompression() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let req = request(dir.path(), Quality::Audio(AudioQuality::K192));

        // a failing transcoder proves it is never called
        let done = fetch_and_transcode(&req, &fetcher, &FakeTranscoder { fail: true }).unwrap();

        assert_eq!(done.path, dir.path().join("clip.mp3"));
        assert!(matches!(done.compression, Compression::Skipped));

        let calls = fetcher.calls.borrow();
        let pp = &calls[0].postprocessors.as_ref().unwrap()[0];
        assert_eq!(pp.preferredquality.as_deref(), Some("192"));
    }

    #[test]
    fn failed_recompression_keeps_download() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), Quality::Video(VideoQuality::Best));

        let done = fetch_and_transcode(&req, &FakeFetcher::default(), &FakeTranscoder { fail: true })
            .unwrap();

        assert!(matches!(done.compression, Compression::Failed(TranscodeError::Spawn { .. })));
        assert_eq!(fs::read(&done.path).unwrap(), b"downloaded");
        assert!(!dir.path().join("clip.mp4.temp.mp4").exists());
    }

    #[test]
    fn missing_output_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher {
            skip_write: true,
            ..Default::default()
        };
        let req = request(dir.path(), Quality::Video(VideoQuality::P360));

        let err = fetch_and_transcode(&req, &fetcher, &FakeTranscoder { fail: false }).unwrap_err();

        assert!(
            matches!(&err, Error::Download(DownloadError::MissingOutput { path }) if path.ends_with("clip.mp4")),
            "unexpected error: {err:?}"
        );
        assert!(err.is_request_failure());
    }

    #[test]
    fn interrupted_download_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher {
            interrupt: true,
            ..Default::default()
        };
        let req = request(dir.path(), Quality::Video(VideoQuality::P720));

        let err = fetch_and_transcode(&req, &fetcher, &FakeTranscoder { fail: false }).unwrap_err();

        assert!(matches!(err, Error::Cancelled), "unexpected error: {err:?}");
        assert!(!err.is_request_failure());
    }

    #[test]
    fn interrupted_recompression_cancels_and_keeps_download() {
        struct Interrupted;

        impl MediaTranscoder for Interrupted {
            fn transcode(
                &self,
                _input: &Path,
                _output: &Path,
                _codec: &CodecOptions,
            ) -> std::result::Result<(), TranscodeError> {
                Err(TranscodeError::Interrupted {
                    program: "ffmpeg".to_string(),
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), Quality::Video(VideoQuality::P1080));

        let err = fetch_and_transcode(&req, &FakeFetcher::default(), &Interrupted).unwrap_err();

        assert!(matches!(err, Error::Cancelled), "unexpected error: {err:?}");
        assert_eq!(fs::read(dir.path().join("clip.mp4")).unwrap(), b"downloaded");
        assert!(!dir.path().join("clip.mp4.temp.mp4").exists());
    }

    #[test]
    fn output_template_binds_stem() {
        let req = request(Path::new("/downloads"), Quality::Video(VideoQuality::P480));
        let opts = req.download_options();

        let OutputTemplates(Some(map)) = opts.outtmpl.unwrap() else {
            panic!("template map missing");
        };
        assert_eq!(map["default"], "/downloads/clip.%(ext)s");
    }
}
