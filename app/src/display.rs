//! Console rendering of the aggregated results using [`tabled`]

use tabled::{
    Table,
    Tabled,
};
use wrapped_services::{
    service::Insights,
    stats::{
        format_play_time,
        Period,
        PeriodSummary,
        TopEntry,
    },
};

const MAX_TRACK_CHARS: usize = 30;


#[derive(Debug, Tabled)]
struct TrackRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Track")]
    track: String,
    #[tabled(rename = "Artist")]
    artist: String,
    #[tabled(rename = "Plays")]
    plays: u64,
    #[tabled(rename = "Play time")]
    play_time: String,
}

#[derive(Debug, Tabled)]
struct ArtistRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Artist")]
    artist: String,
    #[tabled(rename = "Plays")]
    plays: u64,
    #[tabled(rename = "Total play time")]
    play_time: String,
}

#[derive(Debug, Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}


/// Cuts long names to 27 characters followed by `...`
pub fn truncate(name: &str) -> String {
    if name.chars().count() > MAX_TRACK_CHARS {
        let mut short: String = name.chars().take(MAX_TRACK_CHARS - 3).collect();
        short.push_str("...");
        short
    } else {
        name.to_owned()
    }
}

fn titled(title: &str, body: String) -> String { format!("{title}\n{}\n{body}", "=".repeat(title.chars().count())) }

pub fn summary(period: Period, summary: &PeriodSummary) -> String {
    format!(
        "{period}: {} unique tracks, {} unique artists, {} listened",
        summary.unique_tracks,
        summary.unique_artists,
        format_play_time(summary.total_ms)
    )
}

/// `top_n` is the requested size, which may exceed the rows available
pub fn top_tracks(period: Period, top_n: usize, entries: &[TopEntry]) -> String {
    let title = format!("Top {top_n} Tracks ({period})");
    if entries.is_empty() {
        return titled(&title, "No plays in this period".to_owned());
    }

    let rows = entries.iter().enumerate().map(|(i, e)| TrackRow {
        rank: i + 1,
        track: truncate(&e.name),
        artist: e.artist.clone().unwrap_or_default(),
        plays: e.plays,
        play_time: format_play_time(e.ms_played),
    });
    titled(&title, Table::new(rows).to_string())
}

pub fn top_artists(period: Period, top_n: usize, entries: &[TopEntry]) -> String {
    let title = format!("Top {top_n} Artists ({period})");
    if entries.is_empty() {
        return titled(&title, "No plays in this period".to_owned());
    }

    let rows = entries.iter().enumerate().map(|(i, e)| ArtistRow {
        rank: i + 1,
        artist: e.name.clone(),
        plays: e.plays,
        play_time: format_play_time(e.ms_played),
    });
    titled(&title, Table::new(rows).to_string())
}

/// One two column table per insight section
pub fn insights(insights: &Insights) -> String {
    insights
        .sections()
        .into_iter()
        .map(|section| {
            let rows = section.rows.into_iter().map(|(metric, value)| MetricRow {
                metric,
                value: value.to_string(),
            });
            titled(section.title, Table::new(rows).to_string())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}


#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, artist: Option<&str>) -> TopEntry {
        TopEntry {
            name: name.to_owned(),
            artist: artist.map(str::to_owned),
            plays: 12,
            ms_played: 3_600_000,
        }
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Short"), "Short");
        assert_eq!(truncate(&"a".repeat(30)), "a".repeat(30));

        let long = truncate("A Very Long Track Name That Keeps Going");
        assert_eq!(long.chars().count(), 30);
        assert_eq!(long, "A Very Long Track Name That...");
    }

    #[test]
    fn track_table() {
        let out = top_tracks(Period::Year(2023), 10, &[entry("Burn Brighter", Some("Lansdowne"))]);
        assert!(out.starts_with("Top 10 Tracks (Year 2023)\n"));
        assert!(out.contains("Play time"));
        assert!(out.contains("Burn Brighter"));
        assert!(out.contains("Lansdowne"));
        assert!(out.contains("60 min (1.0 h)"));
    }

    #[test]
    fn empty_tables() {
        let out = top_artists(Period::All, 5, &[]);
        assert!(out.starts_with("Top 5 Artists (All time)\n"));
        assert!(out.ends_with("No plays in this period"));
    }

    #[test]
    fn summary_line() {
        let line = summary(Period::All, &PeriodSummary {
            unique_tracks: 2,
            unique_artists: 1,
            total_ms: 120_000,
        });
        assert_eq!(line, "All time: 2 unique tracks, 1 unique artists, 2 min (0.0 h) listened");
    }

    #[test]
    fn insight_sections() {
        let out = insights(&Insights::default());
        assert!(out.starts_with("Profile\n======="));
        assert!(out.contains("Videos Watched Count"));
        assert!(out.contains("Settings & Other Data"));
    }
}
