//! ffmpeg re-encoding and the in-place secondary compression pass.

use crate::dl::take_interrupt;
use crate::error::TranscodeError;
use crate::traits::MediaTranscoder;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Suffix of the sibling file written during [`compress_in_place`].
pub const TEMP_SUFFIX: &str = ".temp.mp4";

/// Bytes of ffmpeg stderr kept in [`TranscodeError::Failed`].
const STDERR_TAIL: usize = 2048;

#[cfg(unix)]
const SIGINT: i32 = 2;

/// H.264 + AAC encoding parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    pub video_codec: &'static str,
    /// Constant rate factor; higher is smaller and worse.
    pub crf: u8,
    pub preset: &'static str,
    pub audio_codec: &'static str,
    pub audio_bitrate_kbps: u32,
}

impl CodecOptions {
    /// Applied by yt-dlp while merging a video download.
    pub const DOWNLOAD_PASS: Self = Self {
        video_codec: "libx264",
        crf: 28,
        preset: "faster",
        audio_codec: "aac",
        audio_bitrate_kbps: 128,
    };

    /// Applied by [`compress_in_place`] after the download.
    pub const RECOMPRESS_PASS: Self = Self {
        video_codec: "libx264",
        crf: 30,
        preset: "faster",
        audio_codec: "aac",
        audio_bitrate_kbps: 96,
    };

    /// FFmpeg args: `-c:v <codec> -crf <n> -preset <p> -c:a <codec> -b:a <n>k`
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.video_codec.to_string(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-preset".to_string(),
            self.preset.to_string(),
            "-c:a".to_string(),
            self.audio_codec.to_string(),
            "-b:a".to_string(),
            format!("{}k", self.audio_bitrate_kbps),
        ]
    }
}

/// [`MediaTranscoder`] running an ffmpeg executable with captured output.
#[derive(Clone, Debug)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build `ffmpeg -hide_banner -y -i <input> <codec args> <output>`.
    pub fn command(&self, input: &Path, output: &Path, codec: &CodecOptions) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-hide_banner", "-y", "-i"])
            .arg(input)
            .args(codec.to_args())
            .arg(output);
        cmd
    }
}

impl MediaTranscoder for Ffmpeg {
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        codec: &CodecOptions,
    ) -> Result<(), TranscodeError> {
        let program = self.program.display().to_string();

        tracing::debug!(
            program,
            input = %input.display(),
            output = %output.display(),
            crf = codec.crf,
            "running ffmpeg"
        );

        let out = self
            .command(input, output, codec)
            .output()
            .map_err(|source| TranscodeError::Spawn {
                program: program.clone(),
                source,
            })?;

        // ffmpeg shares our process group; Ctrl-C reaches both
        if take_interrupt() || killed_by_interrupt(out.status) {
            tracing::info!(program, status = %out.status, "ffmpeg interrupted");
            return Err(TranscodeError::Interrupted { program });
        }

        if out.status.success() {
            return Ok(());
        }

        Err(TranscodeError::Failed {
            program,
            status: out.status,
            stderr: stderr_tail(&out.stderr),
        })
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: ExitStatus) -> bool {
    false
}

/// Last [`STDERR_TAIL`] bytes of process output, lossily decoded and trimmed.
fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}

/// `path` with `suffix` appended to the full file name (`a.mp4` → `a.mp4.temp.mp4`).
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

/// Re-encode `path` with `codec` and replace it with the result.
///
/// Writes to `<path>.temp.mp4` first. On failure the temp file is removed and
/// the original file is left untouched.
pub fn compress_in_place(
    path: &Path,
    transcoder: &impl MediaTranscoder,
    codec: &CodecOptions,
) -> Result<(), TranscodeError> {
    let temp = append_suffix(path, TEMP_SUFFIX);

    tracing::info!(path = %path.display(), crf = codec.crf, "recompressing");

    let result = transcoder.transcode(path, &temp, codec).and_then(|()| {
        fs::rename(&temp, path).map_err(|source| TranscodeError::Replace {
            path: path.to_path_buf(),
            source,
        })
    });

    if result.is_err()
        && temp.exists()
        && let Err(e) = fs::remove_file(&temp)
    {
        tracing::warn!(temp = %temp.display(), error = %e, "failed to remove temp file");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Writes a fixed payload to the output, or a partial payload then fails.
    struct FakeTranscoder {
        fail: bool,
    }

    impl MediaTranscoder for FakeTranscoder {
        fn transcode(
            &self,
            _input: &Path,
            output: &Path,
            _codec: &CodecOptions,
        ) -> Result<(), TranscodeError> {
            if self.fail {
                fs::write(output, b"partial").unwrap();
                return Err(TranscodeError::Spawn {
                    program: "fake".to_string(),
                    source: io::Error::other("boom"),
                });
            }
            fs::write(output, b"compressed").unwrap();
            Ok(())
        }
    }

    #[test]
    fn recompress_pass_args() {
        assert_eq!(
            CodecOptions::RECOMPRESS_PASS.to_args(),
            vec!["-c:v", "libx264", "-crf", "30", "-preset", "faster", "-c:a", "aac", "-b:a", "96k"]
        );
    }

    #[test]
    fn recompress_pass_is_stronger_than_download_pass() {
        let (download, recompress) = (CodecOptions::DOWNLOAD_PASS, CodecOptions::RECOMPRESS_PASS);

        assert!(recompress.crf > download.crf);
        assert!(recompress.audio_bitrate_kbps < download.audio_bitrate_kbps);
    }

    #[test]
    fn ffmpeg_command_layout() {
        let ffmpeg = Ffmpeg::default();
        let cmd = ffmpeg.command(
            Path::new("clip.mp4"),
            Path::new("clip.mp4.temp.mp4"),
            &CodecOptions::RECOMPRESS_PASS,
        );

        assert_eq!(cmd.get_program(), "ffmpeg");

        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(&args[..4], ["-hide_banner", "-y", "-i", "clip.mp4"]);
        assert_eq!(args.last().map(String::as_str), Some("clip.mp4.temp.mp4"));
        assert!(args.windows(2).any(|w| w == ["-crf", "30"]));
    }

    #[test]
    fn missing_ffmpeg_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = Ffmpeg::new(dir.path().join("no-such-ffmpeg"));

        let err = ffmpeg
            .transcode(
                &dir.path().join("in.mp4"),
                &dir.path().join("out.mp4"),
                &CodecOptions::RECOMPRESS_PASS,
            )
            .unwrap_err();

        assert!(matches!(err, TranscodeError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound));
    }

    #[cfg(unix)]
    #[test]
    fn sigint_exit_is_an_interrupt() {
        use std::os::unix::process::ExitStatusExt;

        // raw wait status: low bits carry the terminating signal
        assert!(killed_by_interrupt(ExitStatus::from_raw(SIGINT)));
        assert!(!killed_by_interrupt(ExitStatus::from_raw(0)));
        assert!(!killed_by_interrupt(ExitStatus::from_raw(1 << 8)));
        assert!(!killed_by_interrupt(ExitStatus::from_raw(9)));
    }

    #[test]
    fn interrupted_compress_keeps_original_and_removes_temp() {
        struct Interrupted;

        impl MediaTranscoder for Interrupted {
            fn transcode(
                &self,
                _input: &Path,
                output: &Path,
                _codec: &CodecOptions,
            ) -> Result<(), TranscodeError> {
                fs::write(output, b"partial").unwrap();
                Err(TranscodeError::Interrupted {
                    program: "ffmpeg".to_string(),
                })
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"original").unwrap();

        let err = compress_in_place(&path, &Interrupted, &CodecOptions::RECOMPRESS_PASS).unwrap_err();

        assert!(err.is_interrupt());
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert!(!dir.path().join("clip.mp4.temp.mp4").exists());
    }

    #[test]
    fn temp_path_appends_to_full_name() {
        assert_eq!(
            append_suffix(Path::new("/out/my.clip.mp4"), TEMP_SUFFIX),
            PathBuf::from("/out/my.clip.mp4.temp.mp4")
        );
    }

    #[test]
    fn compress_replaces_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"original").unwrap();

        compress_in_place(&path, &FakeTranscoder { fail: false }, &CodecOptions::RECOMPRESS_PASS)
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"compressed");
        assert!(!dir.path().join("clip.mp4.temp.mp4").exists());
    }

    #[test]
    fn failed_compress_keeps_original_and_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"original").unwrap();

        let err = compress_in_place(&path, &FakeTranscoder { fail: true }, &CodecOptions::RECOMPRESS_PASS)
            .unwrap_err();

        assert!(matches!(err, TranscodeError::Spawn { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert!(!dir.path().join("clip.mp4.temp.mp4").exists());
    }

    #[test]
    fn stderr_tail_keeps_the_end() {
        let long = format!("{}last line\n", "x".repeat(STDERR_TAIL * 2));
        let tail = stderr_tail(long.as_bytes());

        assert!(tail.len() <= STDERR_TAIL);
        assert!(tail.ends_with("last line"));
    }
}
