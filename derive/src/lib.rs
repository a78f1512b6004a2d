extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{
    parse_macro_input,
    DeriveInput,
};

mod play;
use play::derive_play;


/// Generates `From` conversions into `wrapped_core::Play` for a type implementing `ListenData`
///
/// A conversion from a reference is always generated using the trait accessors. When both a
/// track and an artist field can be located, a consuming conversion that moves those fields
/// is generated as well. Fields are located by name (`track`, `artist`, `release`/`album`),
/// by a `#[track]`, `#[artist]` or `#[release]` attribute on the field, or by an outer
/// `#[play(track = some.nested.field)]` attribute.
#[proc_macro_derive(IntoPlay, attributes(track, artist, release, play))]
pub fn derive_into_play(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_play(input).unwrap_or_else(|e| e.to_compile_error()).into()
}
