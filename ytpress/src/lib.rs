//! Interactive YouTube downloader that recompresses what it fetches.
//!
//! The session asks for a URL, a file name, a media kind and a quality, hands
//! the request to [`ytpress_dl::fetch::fetch_and_transcode`], and repeats
//! until the user stops.

pub mod cli;
pub mod config;
pub mod prompt;
pub mod session;
