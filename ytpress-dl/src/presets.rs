//! yt-dlp presets per quality tier.
//!
//! **Video:** height-limited selector, merged to mp4, re-encoded with [`CodecOptions::DOWNLOAD_PASS`]
//!
//! **Audio:** best audio stream extracted to mp3 at the tier's bitrate
//!
//! ```no_run
//! use ytpress_dl::dl::download;
//! use ytpress_dl::quality::AudioQuality;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! download("https://youtu.be/example", AudioQuality::K192.into())?;
//! # Ok(())
//! # }
//! ```
//!
//! The output template is not part of a preset; bind it per request.

use crate::dl::{DownloadOptions, PostProcessor, PostProcessorArgs};
use crate::quality::{AUDIO_FORMAT, AudioQuality, Quality, VideoQuality};
use crate::transcode::CodecOptions;

/// Segments fetched in parallel by yt-dlp for fragmented formats.
pub const CONCURRENT_FRAGMENTS: u32 = 3;

/// `-compression_level` handed to the mp3 encoder; 8 is the slowest and smallest.
pub const MP3_COMPRESSION_LEVEL: u8 = 8;

/// Options shared by every request: skip failing items, first playlist entry only.
fn base_options() -> DownloadOptions {
    DownloadOptions {
        ignoreerrors: Some(true),
        noplaylist: Some(true),
        continuedl: Some(true),
        noprogress: Some(false),
        concurrent_fragment_downloads: Some(CONCURRENT_FRAGMENTS),
        quiet: Some(false),
        no_warnings: Some(true),
        ..Default::default()
    }
}

impl From<VideoQuality> for DownloadOptions {
    /// Video preset: table selector, mp4 container, libx264 CRF 28 + AAC 128k while merging
    fn from(quality: VideoQuality) -> Self {
        Self {
            format: Some(quality.format_selector().to_string()),
            merge_output_format: Some("mp4".to_string()),
            postprocessor_args: Some(PostProcessorArgs {
                ffmpeg: Some(CodecOptions::DOWNLOAD_PASS.to_args()),
                extractaudio: None,
            }),
            ..base_options()
        }
    }
}

impl From<AudioQuality> for DownloadOptions {
    /// Audio preset: best audio → mp3 at the tier's bitrate, maximum compression effort
    fn from(quality: AudioQuality) -> Self {
        Self {
            format: Some(AUDIO_FORMAT.to_string()),
            postprocessors: Some(vec![PostProcessor {
                key: "FFmpegExtractAudio".to_string(),
                preferredcodec: Some("mp3".to_string()),
                preferredquality: Some(quality.preferred_quality().to_string()),
            }]),
            postprocessor_args: Some(PostProcessorArgs {
                ffmpeg: None,
                extractaudio: Some(vec![
                    "-compression_level".to_string(),
                    MP3_COMPRESSION_LEVEL.to_string(),
                ]),
            }),
            ..base_options()
        }
    }
}

impl From<Quality> for DownloadOptions {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::Video(q) => q.into(),
            Quality::Audio(q) => q.into(),
        }
    }
}
