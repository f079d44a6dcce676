//! Download a YouTube URL with [yt-dlp](https://github.com/yt-dlp/yt-dlp) and shrink the result with ffmpeg.
//!
//! ## Modules
//!
//! - [`dl`] - yt-dlp Python API wrappers
//! - [`presets`] - yt-dlp options per quality tier
//! - [`quality`] - media kinds, quality tiers, format-selector table
//! - [`transcode`] - ffmpeg transcoder and in-place recompression
//! - [`fetch`] - the fetch-and-transcode operation
//! - [`traits`] - [`MediaFetcher`](traits::MediaFetcher) and [`MediaTranscoder`](traits::MediaTranscoder) seams
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytpress_dl::dl::YtDlp;
//! use ytpress_dl::fetch::{DownloadRequest, fetch_and_transcode};
//! use ytpress_dl::quality::{Quality, VideoQuality};
//! use ytpress_dl::transcode::Ffmpeg;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = DownloadRequest {
//!     url: "https://youtu.be/example".to_string(),
//!     filename: "clip".to_string(),
//!     output_dir: "downloads".into(),
//!     quality: Quality::Video(VideoQuality::P720),
//! };
//!
//! let done = fetch_and_transcode(&request, &YtDlp, &Ffmpeg::default())?;
//! println!("saved {}", done.path.display());
//! # Ok(())
//! # }
//! ```

pub mod dl;
pub mod error;
pub mod fetch;
pub mod presets;
pub mod quality;
pub mod traits;
pub mod transcode;

pub use error::{Error, Result};
