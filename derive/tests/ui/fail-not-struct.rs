#![allow(dead_code)]

use wrapped_derive::IntoPlay;

#[derive(IntoPlay)]
enum Listen {
    Track,
}

fn main() {}
