use serde::Serialize;

/// Common view over a single play event, regardless of which service exported it
pub trait ListenData {
    /// Unix timestamp (seconds) of when the play ended
    fn listened_at(&self) -> i64;

    fn track_name(&self) -> &str;

    /// `None` when the export has no artist for the play
    fn artist_name(&self) -> Option<&str>;

    fn release_name(&self) -> Option<&str> { None }

    fn ms_played(&self) -> u64;
}

/// Implemented by `#[derive(IntoPlay)]`
pub trait IntoPlayDerive: ListenData {}


/// Normalized play record that all aggregation works on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Play {
    pub listened_at: i64,
    pub track: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    pub ms_played: u64,
}

impl ListenData for Play {
    #[inline]
    fn listened_at(&self) -> i64 { self.listened_at }

    #[inline]
    fn track_name(&self) -> &str { &self.track }

    #[inline]
    fn artist_name(&self) -> Option<&str> { self.artist.as_deref() }

    #[inline]
    fn release_name(&self) -> Option<&str> { self.album.as_deref() }

    #[inline]
    fn ms_played(&self) -> u64 { self.ms_played }
}
