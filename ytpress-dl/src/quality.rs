//! Media kinds, quality tiers and the video format-selector table.
//!
//! Answers are matched literally: `"video"` is a media kind, `"Video"` is not.

use crate::error::InputError;
use std::fmt;
use std::str::FromStr;

/// yt-dlp selector used when a quality label has no table entry.
pub const FALLBACK_VIDEO_FORMAT: &str = "bestvideo+bestaudio/best";

/// yt-dlp selector for audio downloads.
pub const AUDIO_FORMAT: &str = "bestaudio/best";

/// Video quality label → yt-dlp format selector.
///
/// Height-limited tiers cap both the separate video stream and the combined fallback stream.
pub const VIDEO_FORMATS: &[(&str, &str)] = &[
    ("360p", "bestvideo[height<=360]+bestaudio/best[height<=360]"),
    ("480p", "bestvideo[height<=480]+bestaudio/best[height<=480]"),
    ("720p", "bestvideo[height<=720]+bestaudio/best[height<=720]"),
    ("1080p", "bestvideo[height<=1080]+bestaudio/best[height<=1080]"),
    ("best", "bestvideo+bestaudio/best"),
];

/// Look up the format selector for a video quality label.
pub fn format_selector(label: &str) -> &'static str {
    VIDEO_FORMATS
        .iter()
        .find(|(key, _)| *key == label)
        .map_or(FALLBACK_VIDEO_FORMAT, |(_, format)| format)
}

/// What to keep from the source: the muxed video or the audio track only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Extension of the final output file.
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }

    /// Allowed quality labels joined for prompts and errors, e.g. `360p/480p/...`.
    pub fn quality_choices(self) -> String {
        match self {
            MediaKind::Video => VideoQuality::ALL.map(VideoQuality::label).join("/"),
            MediaKind::Audio => AudioQuality::ALL.map(AudioQuality::label).join("/"),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        })
    }
}

impl FromStr for MediaKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            _ => Err(InputError::MediaKind(s.to_string())),
        }
    }
}

/// Maximum video height, or the best available streams.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VideoQuality {
    P360,
    P480,
    P720,
    P1080,
    Best,
}

impl VideoQuality {
    pub const ALL: [Self; 5] = [Self::P360, Self::P480, Self::P720, Self::P1080, Self::Best];

    pub fn label(self) -> &'static str {
        match self {
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::Best => "best",
        }
    }

    pub fn format_selector(self) -> &'static str {
        format_selector(self.label())
    }
}

/// Target mp3 bitrate in kbps. Labels keep the historical `p` suffix (`192p`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AudioQuality {
    K128,
    K192,
    K256,
    K320,
}

impl AudioQuality {
    pub const ALL: [Self; 4] = [Self::K128, Self::K192, Self::K256, Self::K320];

    pub fn label(self) -> &'static str {
        match self {
            Self::K128 => "128p",
            Self::K192 => "192p",
            Self::K256 => "256p",
            Self::K320 => "320p",
        }
    }

    /// Value for yt-dlp's `preferredquality`: the label without its trailing `p`.
    pub fn preferred_quality(self) -> &'static str {
        let label = self.label();
        label.strip_suffix('p').unwrap_or(label)
    }
}

/// A quality tier; the variant fixes the media kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Quality {
    Video(VideoQuality),
    Audio(AudioQuality),
}

impl Quality {
    /// Parse a quality answer for the given media kind.
    pub fn parse(kind: MediaKind, input: &str) -> Result<Self, InputError> {
        let found = match kind {
            MediaKind::Video => VideoQuality::ALL
                .into_iter()
                .find(|q| q.label() == input)
                .map(Quality::Video),
            MediaKind::Audio => AudioQuality::ALL
                .into_iter()
                .find(|q| q.label() == input)
                .map(Quality::Audio),
        };

        found.ok_or_else(|| InputError::Quality {
            kind,
            input: input.to_string(),
            expected: kind.quality_choices(),
        })
    }

    pub fn kind(self) -> MediaKind {
        match self {
            Quality::Video(_) => MediaKind::Video,
            Quality::Audio(_) => MediaKind::Audio,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Video(q) => q.label(),
            Quality::Audio(q) => q.label(),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
