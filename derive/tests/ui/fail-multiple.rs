#![allow(dead_code)]

use wrapped_derive::IntoPlay;

#[derive(IntoPlay)]
struct Multiple {
    #[track]
    title: String,
    #[track]
    name: String,
}

fn main() {}
