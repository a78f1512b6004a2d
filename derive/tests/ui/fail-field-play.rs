#![allow(dead_code)]

use wrapped_derive::IntoPlay;

#[derive(IntoPlay)]
struct OnField {
    #[play]
    title: String,
}

fn main() {}
