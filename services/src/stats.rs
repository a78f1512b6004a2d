//! Aggregation over normalized plays: filtering, per-year selection, summaries and rankings

use std::{
    cmp::Reverse,
    collections::{
        HashMap,
        HashSet,
    },
    fmt,
    str::FromStr,
};

use thiserror::Error;
use time::OffsetDateTime;
use wrapped_core::Play;

/// Plays shorter than this are not counted unless configured otherwise
pub const DEFAULT_MIN_PLAY_MS: u64 = 15_000;

/// Shown in track rankings for plays without an artist
pub const UNKNOWN_ARTIST: &str = "Unknown";


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayFilter {
    pub min_play_ms: u64,
    /// Only keep plays strictly before this unix timestamp
    pub before: Option<i64>,
    /// Only keep plays strictly after this unix timestamp
    pub after: Option<i64>,
}

impl Default for PlayFilter {
    fn default() -> Self {
        Self {
            min_play_ms: DEFAULT_MIN_PLAY_MS,
            before: None,
            after: None,
        }
    }
}

impl PlayFilter {
    pub fn accepts(&self, play: &Play) -> bool {
        play.ms_played >= self.min_play_ms
            && self.before.map_or(true, |ts| play.listened_at < ts)
            && self.after.map_or(true, |ts| ts < play.listened_at)
    }
}

pub fn filter_plays(plays: impl IntoIterator<Item = Play>, filter: &PlayFilter) -> Vec<Play> {
    plays.into_iter().filter(|p| filter.accepts(p)).collect()
}

/// Calendar year (UTC) the play ended in
pub fn play_year(play: &Play) -> i32 {
    OffsetDateTime::from_unix_timestamp(play.listened_at)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .year()
}

/// Distinct years with at least one play, most recent first
pub fn available_years(plays: &[Play]) -> Vec<i32> {
    let mut years: Vec<_> = plays.iter().map(play_year).collect::<HashSet<_>>().into_iter().collect();
    years.sort_unstable_by_key(|&y| Reverse(y));
    years
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    All,
    Year(i32),
}

impl Period {
    pub fn contains(&self, play: &Play) -> bool {
        match *self {
            Period::All => true,
            Period::Year(y) => play_year(play) == y,
        }
    }

    pub fn select<'p>(&self, plays: &'p [Play]) -> Vec<&'p Play> { plays.iter().filter(|p| self.contains(p)).collect() }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => f.write_str("All time"),
            Period::Year(y) => write!(f, "Year {y}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("expected `all` or a year, got `{0}`")]
pub struct ParsePeriodError(String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            Ok(Period::All)
        } else {
            s.parse().map(Period::Year).map_err(|_| ParsePeriodError(s.to_owned()))
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodSummary {
    /// Distinct (track, artist) pairs
    pub unique_tracks: usize,
    /// Plays without an artist are not counted
    pub unique_artists: usize,
    pub total_ms: u64,
}

pub fn summarize<'p>(plays: impl IntoIterator<Item = &'p Play>) -> PeriodSummary {
    let mut tracks = HashSet::new();
    let mut artists = HashSet::new();
    let mut total_ms = 0;
    for play in plays {
        tracks.insert((play.track.as_str(), play.artist.as_deref()));
        if let Some(artist) = play.artist.as_deref() {
            artists.insert(artist);
        }
        total_ms += play.ms_played;
    }
    PeriodSummary {
        unique_tracks: tracks.len(),
        unique_artists: artists.len(),
        total_ms,
    }
}


/// One ranked row; `artist` is only set when ranking tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopEntry {
    pub name: String,
    pub artist: Option<String>,
    pub plays: u64,
    pub ms_played: u64,
}

fn rank<'p, K, F>(plays: impl IntoIterator<Item = &'p Play>, n: usize, key: F) -> Vec<TopEntry>
where
    K: Eq + std::hash::Hash,
    F: Fn(&'p Play) -> Option<K>,
    (K, (u64, u64)): Into<TopEntry>,
{
    let mut groups: HashMap<K, (u64, u64)> = HashMap::new();
    for play in plays {
        let Some(key) = key(play) else { continue };
        let (count, ms) = groups.entry(key).or_default();
        *count += 1;
        *ms += play.ms_played;
    }

    let mut entries: Vec<TopEntry> = groups.into_iter().map(Into::into).collect();
    entries.sort_by(|a, b| {
        b.plays
            .cmp(&a.plays)
            .then(b.ms_played.cmp(&a.ms_played))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.artist.cmp(&b.artist))
    });
    entries.truncate(n);
    entries
}

impl From<((&str, Option<&str>), (u64, u64))> for TopEntry {
    fn from(((track, artist), (plays, ms_played)): ((&str, Option<&str>), (u64, u64))) -> Self {
        Self {
            name: track.to_owned(),
            artist: Some(artist.unwrap_or(UNKNOWN_ARTIST).to_owned()),
            plays,
            ms_played,
        }
    }
}

impl From<(&str, (u64, u64))> for TopEntry {
    fn from((artist, (plays, ms_played)): (&str, (u64, u64))) -> Self {
        Self {
            name: artist.to_owned(),
            artist: None,
            plays,
            ms_played,
        }
    }
}

/// Most played (track, artist) pairs by play count, then total time
pub fn top_tracks<'p>(plays: impl IntoIterator<Item = &'p Play>, n: usize) -> Vec<TopEntry> {
    rank(plays, n, |p: &'p Play| Some((p.track.as_str(), p.artist.as_deref())))
}

/// Most played artists by play count, then total time; plays without an artist are skipped
pub fn top_artists<'p>(plays: impl IntoIterator<Item = &'p Play>, n: usize) -> Vec<TopEntry> {
    rank(plays, n, |p: &'p Play| p.artist.as_deref())
}


/// `"1,234 min (20.6 h)"`; seconds and minutes are truncated before converting to hours
pub fn format_play_time(ms: u64) -> String {
    let minutes = ms / 1000 / 60;
    let hours = minutes as f64 / 60.0;
    format!("{} min ({hours:.1} h)", group_thousands(minutes))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
