#![allow(dead_code)]

use wrapped_derive::IntoPlay;

#[derive(IntoPlay)]
#[play(title = name)]
struct Outer {
    name: String,
}

fn main() {}
