use std::{
    borrow::Borrow,
    sync::LazyLock,
};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use wrapped_core::ListenData;
use wrapped_derive::IntoPlay;

use crate::de::{
    parse_timestamp,
    ListenVec,
};

pub type SpotifyListenVec = ListenVec<SpotifyListen>;

/// Base names of the streaming history files, in an archive or loose on disk
///
/// Covers `Streaming_History_Audio_2023.json`, `StreamingHistory0.json` and `endsong_0.json`
pub static HISTORY_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Streaming_History_.*|StreamingHistory\w*|endsong_\d+)\.json$").expect("valid regex"));

/// The account or extended data download
pub static ARCHIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^my_spotify_data.*\.zip$").expect("valid regex"));


/// Represents a single song play from a spotify history dump
///
/// Podcast episodes and entries without a usable timestamp are rejected during deserialization.
#[cfg_attr(test, derive(PartialEq, Eq))]
#[derive(Debug, Clone, Deserialize, IntoPlay)]
#[serde(try_from = "RawListen")]
pub struct SpotifyListen {
    time: OffsetDateTime,

    pub track: String,

    /// `None` when the export has no artist for the track
    pub artist: Option<String>,

    #[release]
    pub album: Option<String>,

    pub ms_played: u64,
}

impl SpotifyListen {
    pub fn time(&self) -> OffsetDateTime { self.time }
}

impl ListenData for SpotifyListen {
    #[inline]
    fn listened_at(&self) -> i64 { self.time.unix_timestamp() }

    #[inline]
    fn track_name(&self) -> &str { self.track.borrow() }

    #[inline]
    fn artist_name(&self) -> Option<&str> { self.artist.as_deref() }

    #[inline]
    fn release_name(&self) -> Option<&str> { self.album.as_deref() }

    #[inline]
    fn ms_played(&self) -> u64 { self.ms_played }
}


/// Entry as it appears on disk; both the account data and extended history layouts
#[derive(Debug, Deserialize)]
struct RawListen {
    #[serde(alias = "endTime", alias = "ts")]
    time: Option<String>,

    #[serde(alias = "trackName", alias = "master_metadata_track_name", alias = "track_name")]
    track: Option<String>,

    #[serde(alias = "artistName", alias = "master_metadata_album_artist_name", alias = "artist_name")]
    artist: Option<String>,

    #[serde(alias = "master_metadata_album_album_name")]
    album: Option<String>,

    #[serde(alias = "msPlayed")]
    ms_played: Option<u64>,
}

#[derive(Debug, Error)]
pub enum Rejected {
    #[error("not a song (missing track name)")]
    NotASong,
    #[error("missing timestamp")]
    MissingTime,
    #[error("invalid timestamp: {0}")]
    InvalidTime(#[from] time::error::Parse),
    #[error("missing play duration")]
    MissingDuration,
}

impl TryFrom<RawListen> for SpotifyListen {
    type Error = Rejected;

    fn try_from(raw: RawListen) -> Result<Self, Self::Error> {
        let track = raw
            .track
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(Rejected::NotASong)?
            .to_owned();
        let artist = raw
            .artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_owned);
        let time = parse_timestamp(raw.time.as_deref().ok_or(Rejected::MissingTime)?)?;
        let ms_played = raw.ms_played.ok_or(Rejected::MissingDuration)?;

        Ok(Self {
            time,
            track,
            artist,
            album: raw.album,
            ms_played,
        })
    }
}

#[cfg(test)]
mod tests;
