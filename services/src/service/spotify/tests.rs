use time::macros::datetime;
use wrapped_core::Play;

use super::*;

const FULL_SAMPLE: &str = r#"{
    "ts": "2018-07-10T06:58:55Z",
    "username": "0000000000",
    "platform": "iOS 11.4 (iPhone6,1)",
    "ms_played": 60265,
    "conn_country": "US",
    "ip_addr_decrypted": "0.0.0.0",
    "user_agent_decrypted": "unknown",
    "master_metadata_track_name": "Burn Brighter",
    "master_metadata_album_artist_name": "Lansdowne",
    "master_metadata_album_album_name": "No Home but the Road",
    "spotify_track_uri": "spotify:track:6BUMVGOnIeOIE6YetJGGDT",
    "episode_name": null,
    "episode_show_name": null,
    "spotify_episode_uri": null,
    "reason_start": "trackdone",
    "reason_end": "fwdbtn",
    "shuffle": true,
    "skipped": null,
    "offline": true,
    "offline_timestamp": 1531090963961,
    "incognito_mode": false
}"#;

const SIMPLE_SAMPLE: &str = r#"{
    "endTime" : "2018-07-10 06:58",
    "trackName" : "Burn Brighter",
    "artistName" : "Lansdowne",
    "msPlayed" : 60265
}"#;

const PODCAST_SAMPLE: &str = r#"{
    "ts": "2021-03-01T10:00:00Z",
    "ms_played": 1200000,
    "master_metadata_track_name": null,
    "master_metadata_album_artist_name": null,
    "episode_name": "Episode 12",
    "episode_show_name": "Some Show"
}"#;

const EXPECTED_TRACK: &str = "Burn Brighter";
const EXPECTED_ARTIST: &str = "Lansdowne";
const EXPECTED_ALBUM: Option<&str> = Some("No Home but the Road");
const EXPECTED_MS_PLAYED: u64 = 60265;

#[test]
fn test_de_simple() {
    let expected = SpotifyListen {
        time: datetime!(2018-07-10 06:58 UTC),
        track: EXPECTED_TRACK.to_owned(),
        artist: Some(EXPECTED_ARTIST.to_owned()),
        album: None,
        ms_played: EXPECTED_MS_PLAYED,
    };

    let simple: SpotifyListen = serde_json::from_str(SIMPLE_SAMPLE).expect("Failed to parse simple entry");
    assert_eq!(simple, expected);
}

#[test]
fn test_de_full() {
    let expected = SpotifyListen {
        time: datetime!(2018-07-10 06:58:55 UTC),
        track: EXPECTED_TRACK.to_owned(),
        artist: Some(EXPECTED_ARTIST.to_owned()),
        album: EXPECTED_ALBUM.map(str::to_owned),
        ms_played: EXPECTED_MS_PLAYED,
    };

    let full: SpotifyListen = serde_json::from_str(FULL_SAMPLE).expect("Failed to parse full entry");
    assert_eq!(full, expected);
}

#[test]
fn podcasts_are_rejected() {
    let err = serde_json::from_str::<SpotifyListen>(PODCAST_SAMPLE).unwrap_err();
    assert!(err.to_string().contains("not a song"));
}

#[test]
fn names_are_trimmed_and_artist_optional() {
    let listen: SpotifyListen =
        serde_json::from_str(r#"{"ts": "2020-01-01T00:00:00Z", "track_name": "  Intro ", "ms_played": 20000}"#).unwrap();
    assert_eq!(listen.track, "Intro");
    assert_eq!(listen.artist, None);

    let blank: SpotifyListen =
        serde_json::from_str(r#"{"ts": "2020-01-01T00:00:00Z", "trackName": "Intro", "artistName": " ", "msPlayed": 1}"#).unwrap();
    assert_eq!(blank.artist, None);
}

#[test]
fn bad_timestamp_is_rejected() {
    assert!(serde_json::from_str::<SpotifyListen>(r#"{"ts": "yesterday", "trackName": "x", "msPlayed": 1}"#).is_err());
    assert!(serde_json::from_str::<SpotifyListen>(r#"{"trackName": "x", "msPlayed": 1}"#).is_err());
}

#[test]
fn history_file_keeps_good_entries() {
    let file = format!("[{FULL_SAMPLE}, {PODCAST_SAMPLE}, {SIMPLE_SAMPLE}]");
    let listens: SpotifyListenVec = serde_json::from_str(&file).unwrap();
    assert_eq!(listens.len(), 2);
}

#[test]
fn converts_into_play() {
    let full: SpotifyListen = serde_json::from_str(FULL_SAMPLE).unwrap();
    let play = Play::from(full);
    assert_eq!(play, Play {
        listened_at: 1_531_205_935,
        track: EXPECTED_TRACK.to_owned(),
        artist: Some(EXPECTED_ARTIST.to_owned()),
        album: EXPECTED_ALBUM.map(str::to_owned),
        ms_played: EXPECTED_MS_PLAYED,
    });
}

#[test]
fn history_file_names() {
    for name in ["Streaming_History_Audio_2023_4.json", "StreamingHistory0.json", "StreamingHistory.json", "StreamingHistory_music_0.json", "endsong_12.json"] {
        assert!(HISTORY_FILE_REGEX.is_match(name), "{name}");
    }
    for name in ["Streaming_History_Audio_2023.pdf", "endsong.json", "Userdata.json"] {
        assert!(!HISTORY_FILE_REGEX.is_match(name), "{name}");
    }
    assert!(ARCHIVE_REGEX.is_match("my_spotify_data.zip"));
    assert!(ARCHIVE_REGEX.is_match("my_spotify_data (1).zip"));
}
