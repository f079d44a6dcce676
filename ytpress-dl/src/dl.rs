//! yt-dlp Python API wrappers.
//!
//! Type-safe bindings to [yt-dlp](https://github.com/yt-dlp/yt-dlp) `YoutubeDL` parameters.
//!
//! ```no_run
//! use ytpress_dl::dl::{DownloadOptions, OutputTemplates, download};
//! use ytpress_dl::quality::VideoQuality;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut opts: DownloadOptions = VideoQuality::P720.into();
//! opts.outtmpl = Some(OutputTemplates::simple("clip.%(ext)s".to_string()));
//! let retcode = download("https://youtu.be/example", opts)?;
//! println!("yt-dlp returned {retcode}");
//! # Ok(())
//! # }
//! ```

use crate::error::DownloadError;
use crate::traits::MediaFetcher;
use pyo3::exceptions::PyKeyboardInterrupt;
use pyo3::ffi::c_str;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// Filename templates using `%(field)s` syntax. Key `default` required.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct OutputTemplates(pub Option<HashMap<String, String>>);

impl OutputTemplates {
    /// Create with a single default template.
    pub fn simple(default: String) -> Self {
        Self(Some(HashMap::from([("default".to_string(), default)])))
    }

    /// Template writing to `<stem>.<ext>` with the extension chosen by yt-dlp.
    ///
    /// `%` in the stem is escaped so it is not read as a template field.
    pub fn with_stem(stem: &Path) -> Self {
        let stem = stem.to_string_lossy().replace('%', "%%");
        Self::simple(format!("{stem}.%(ext)s"))
    }
}

/// Post-download operation: `key` (e.g., `"FFmpegExtractAudio"`), optional codec and quality.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct PostProcessor {
    pub key: String,
    pub preferredcodec: Option<String>,
    pub preferredquality: Option<String>,
}

/// Extra ffmpeg arguments passed to yt-dlp post-processors, keyed by post-processor.
///
/// `ffmpeg` applies to every ffmpeg-based post-processor (including the merger),
/// `extractaudio` only to `FFmpegExtractAudio`.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct PostProcessorArgs {
    pub ffmpeg: Option<Vec<String>>,
    pub extractaudio: Option<Vec<String>>,
}

/// yt-dlp download configuration passed to `YoutubeDL(params)`.
///
/// `None` fields are left out of the params dict.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct DownloadOptions {
    pub format: Option<String>,
    pub outtmpl: Option<OutputTemplates>,
    pub merge_output_format: Option<String>,
    pub postprocessors: Option<Vec<PostProcessor>>,
    pub postprocessor_args: Option<PostProcessorArgs>,
    pub ignoreerrors: Option<bool>,
    pub noplaylist: Option<bool>,
    pub continuedl: Option<bool>,
    pub noprogress: Option<bool>,
    pub concurrent_fragment_downloads: Option<u32>,
    pub quiet: Option<bool>,
    pub no_warnings: Option<bool>,
}

/// Download a single URL and return yt-dlp's return code.
///
/// Runs `YoutubeDL(params).download([url])`; a non-zero code means yt-dlp
/// skipped errors because `ignoreerrors` was set.
pub fn download(url: &str, opts: DownloadOptions) -> Result<i64, PyErr> {
    Python::attach(|py| {
        let module = PyModule::from_code(py, c_str!(include_str!("./dl.py")), c"dl.py", c"dl")?;

        let py_params = opts.into_pyobject(py)?;

        let retcode = module.getattr("download")?.call1((url, py_params))?;

        retcode.extract()
    })
}

/// [`MediaFetcher`] backed by the embedded yt-dlp interpreter.
#[derive(Copy, Clone, Debug, Default)]
pub struct YtDlp;

impl MediaFetcher for YtDlp {
    fn fetch(&self, url: &str, options: DownloadOptions) -> Result<(), DownloadError> {
        match download(url, options)? {
            0 => Ok(()),
            retcode => Err(DownloadError::Incomplete {
                url: url.to_string(),
                retcode,
            }),
        }
    }
}

/// Consume a Ctrl-C the interpreter recorded while no Python code was running.
///
/// Python's SIGINT handler only sets a flag. Left pending, it raises
/// `KeyboardInterrupt` at the start of the next download.
pub fn take_interrupt() -> bool {
    Python::attach(|py| {
        py.check_signals()
            .is_err_and(|e| e.is_instance_of::<PyKeyboardInterrupt>(py))
    })
}
