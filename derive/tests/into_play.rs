use wrapped_core::{
    IntoPlayDerive,
    ListenData,
    Play,
};
use wrapped_derive::IntoPlay;

#[derive(Debug, Clone, IntoPlay)]
struct Tagged {
    #[track]
    title: String,
    #[artist]
    performer: String,
    #[release]
    record: Option<String>,
    ended: i64,
    played: u64,
}

impl ListenData for Tagged {
    fn listened_at(&self) -> i64 { self.ended }

    fn track_name(&self) -> &str { &self.title }

    fn artist_name(&self) -> Option<&str> { Some(&self.performer) }

    fn release_name(&self) -> Option<&str> { self.record.as_deref() }

    fn ms_played(&self) -> u64 { self.played }
}

#[derive(IntoPlay)]
struct AccessorsOnly {
    name: &'static str,
}

impl ListenData for AccessorsOnly {
    fn listened_at(&self) -> i64 { 42 }

    fn track_name(&self) -> &str { self.name }

    fn artist_name(&self) -> Option<&str> { Some("Nobody") }

    fn ms_played(&self) -> u64 { 1000 }
}

fn sample() -> Tagged {
    Tagged {
        title: "Burn Brighter".to_owned(),
        performer: "Lansdowne".to_owned(),
        record: Some("No Home but the Road".to_owned()),
        ended: 1_531_205_935,
        played: 60265,
    }
}

fn expected() -> Play {
    Play {
        listened_at: 1_531_205_935,
        track: "Burn Brighter".to_owned(),
        artist: Some("Lansdowne".to_owned()),
        album: Some("No Home but the Road".to_owned()),
        ms_played: 60265,
    }
}

fn assert_marker<T: IntoPlayDerive>(_: &T) {}

#[test]
fn borrowed_and_moved_conversions_agree() {
    let listen = sample();
    assert_marker(&listen);

    let borrowed = Play::from(&listen);
    let moved = Play::from(listen);
    assert_eq!(borrowed, expected());
    assert_eq!(moved, expected());
}

#[test]
fn accessor_conversion_without_tagged_fields() {
    let play = Play::from(&AccessorsOnly { name: "Interlude" });
    assert_eq!(play.track, "Interlude");
    assert_eq!(play.artist.as_deref(), Some("Nobody"));
    assert_eq!(play.album, None);
    assert_eq!(play.listened_at, 42);
}
