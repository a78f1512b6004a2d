use std::{
    fmt::Display,
    ops::{
        Index,
        IndexMut,
    },
};

use proc_macro2::{
    Span,
    TokenStream,
};
use quote::{
    quote,
    ToTokens,
};
use syn::{
    spanned::Spanned,
    Data,
    DataStruct,
    DeriveInput,
    Error,
    Fields,
    Result,
};

mod attributes;
mod fields;

pub(super) fn derive_play(input: DeriveInput) -> Result<TokenStream> {
    let fields = match input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => fields.named,
        _ => return Err(syn::Error::new(input.ident.span(), "this derive macro only works on structs with named fields")),
    };
    let target = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let outer_attrs = attributes::parse(&input.attrs)?;
    let tagged = attributes::process(&outer_attrs)?.merge(fields::process(&fields)?);
    let move_impl = if let (Some(track), Some(artist)) = (tagged.track.as_ref(), tagged.artist.as_ref()) {
        let track = track.member;
        let artist = artist.member;
        let album = tagged.release.as_ref().map_or(quote!(::core::option::Option::None), |r| {
            let path = r.member;
            quote!(::core::option::Option::map(listen.#path, ::core::convert::Into::into))
        });
        // `Into` lets the artist field be either `String` or `Option<String>`
        quote! {
            #[automatically_derived]
            impl #impl_generics From<#target #ty_generics> for ::wrapped_core::Play #where_clause {
                fn from(listen: #target #ty_generics) -> Self {
                    ::wrapped_core::Play {
                        listened_at: ::wrapped_core::ListenData::listened_at(&listen),
                        ms_played: ::wrapped_core::ListenData::ms_played(&listen),
                        track: ::core::convert::Into::into(listen.#track),
                        artist: ::core::convert::Into::into(listen.#artist),
                        album: #album,
                    }
                }
            }
        }
    } else {
        Default::default()
    };

    Ok(quote! {
        impl #impl_generics ::wrapped_core::IntoPlayDerive for #target #ty_generics #where_clause { }
        #[automatically_derived]
        impl #impl_generics From<&#target #ty_generics> for ::wrapped_core::Play #where_clause {
            fn from(listen: &#target #ty_generics) -> Self {
                ::wrapped_core::Play {
                    listened_at: ::wrapped_core::ListenData::listened_at(listen),
                    track: ::std::borrow::ToOwned::to_owned(::wrapped_core::ListenData::track_name(listen)),
                    artist: ::wrapped_core::ListenData::artist_name(listen).map(::std::borrow::ToOwned::to_owned),
                    album: ::wrapped_core::ListenData::release_name(listen).map(::std::borrow::ToOwned::to_owned),
                    ms_played: ::wrapped_core::ListenData::ms_played(listen),
                }
            }
        }
        #move_impl
    })
}


/// `Play` fields that can be moved out of a field of the input
#[derive(Clone, Copy, PartialEq, Eq)]
pub(self) enum Slot {
    Track,
    Artist,
    Release,
}

impl Slot {
    /// Field names that are picked up without any attribute
    fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "track" => Some(Self::Track),
            "artist" => Some(Self::Artist),
            "release" | "album" => Some(Self::Release),
            _ => None,
        }
    }
}

pub(self) struct PlayField<'f> {
    pub member: &'f dyn ToTokens,
    pub source: Option<&'f dyn Spanned>,
}

#[derive(Default)]
pub(self) struct PlayFields<'f> {
    pub track: Option<PlayField<'f>>,
    pub artist: Option<PlayField<'f>>,
    pub release: Option<PlayField<'f>>,
}

impl<'f> PlayFields<'f> {
    fn assign(&mut self, slot: Slot, member: &'f dyn ToTokens, source: Option<&'f dyn Spanned>) -> Option<PlayField<'f>> {
        self[slot].replace(PlayField { member, source })
    }

    /// Fails when `slot` was already taken, either by the same member or by another one
    fn try_assign(mut self, slot: Slot, member: &'f dyn ToTokens, source: Option<&'f dyn Spanned>) -> Result<Self> {
        fn same_member(a: &dyn ToTokens, b: &dyn ToTokens) -> bool {
            std::ptr::eq(a as *const dyn ToTokens as *const (), b as *const dyn ToTokens as *const ())
        }

        let Some(prev) = self.assign(slot, member, source) else { return Ok(self) };
        let span = source.map_or_else(Span::call_site, Spanned::span);
        let error = |span, msg: String| Error::new(span, msg);

        let mut e;
        if same_member(member, prev.member) {
            const MSG: &str = "Duplicate attribute";
            e = error(span, MSG.to_owned());
            if let Some(first) = prev.source {
                e.combine(error(first.span(), MSG.to_owned()));
            }
        } else {
            fn msg(other: impl Display) -> String { format!("Not allowed on multiple fields. Also present on '{other}'") }
            e = error(span, msg(prev.member.to_token_stream()));
            if let Some(first) = prev.source {
                e.combine(error(first.span(), msg(member.to_token_stream())));
            }
        }
        Err(e)
    }

    /// Slots set in `other` win
    fn merge(self, other: Self) -> Self {
        Self {
            track: other.track.or(self.track),
            artist: other.artist.or(self.artist),
            release: other.release.or(self.release),
        }
    }
}

impl<'f> Index<Slot> for PlayFields<'f> {
    type Output = Option<PlayField<'f>>;

    fn index(&self, slot: Slot) -> &Self::Output {
        match slot {
            Slot::Track => &self.track,
            Slot::Artist => &self.artist,
            Slot::Release => &self.release,
        }
    }
}

impl IndexMut<Slot> for PlayFields<'_> {
    fn index_mut(&mut self, slot: Slot) -> &mut Self::Output {
        match slot {
            Slot::Track => &mut self.track,
            Slot::Artist => &mut self.artist,
            Slot::Release => &mut self.release,
        }
    }
}
