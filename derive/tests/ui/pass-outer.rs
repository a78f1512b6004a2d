use wrapped_core::{
    ListenData,
    Play,
};
use wrapped_derive::IntoPlay;

struct Meta {
    name: String,
    by: String,
}

#[derive(IntoPlay)]
#[play(track = meta.name, artist = meta.by)]
struct Nested {
    meta: Meta,
}

impl ListenData for Nested {
    fn listened_at(&self) -> i64 { 1 }

    fn track_name(&self) -> &str { &self.meta.name }

    fn artist_name(&self) -> Option<&str> { Some(&self.meta.by) }

    fn ms_played(&self) -> u64 { 1 }
}

fn main() {
    let _moved = Play::from(Nested {
        meta: Meta {
            name: "t".to_owned(),
            by: "a".to_owned(),
        },
    });
}
