use wrapped_core::{
    ListenData,
    Play,
};
use wrapped_derive::IntoPlay;

#[derive(IntoPlay)]
struct Implicit {
    track: String,
    artist: String,
    album: Option<String>,
    at: i64,
}

impl ListenData for Implicit {
    fn listened_at(&self) -> i64 { self.at }

    fn track_name(&self) -> &str { &self.track }

    fn artist_name(&self) -> Option<&str> { Some(&self.artist) }

    fn ms_played(&self) -> u64 { 0 }
}

fn main() {
    let listen = Implicit {
        track: "t".to_owned(),
        artist: "a".to_owned(),
        album: None,
        at: 0,
    };
    let _borrowed = Play::from(&listen);
    let _moved = Play::from(listen);
}
