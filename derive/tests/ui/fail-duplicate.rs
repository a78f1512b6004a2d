#![allow(dead_code)]

use wrapped_derive::IntoPlay;

#[derive(IntoPlay)]
struct Duplicate {
    #[track]
    #[track]
    title: String,
}

fn main() {}
