use std::str::FromStr;

use syn::{
    parse::{
        Parse,
        ParseStream,
    },
    punctuated::Punctuated,
    Attribute,
    Expr,
    Ident,
    Token,
};

use super::{
    PlayFields,
    Slot,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HelperAttr {
    Track,
    Artist,
    Release,
    Play,
}

impl HelperAttr {
    /// The `Play` field a tag fills; `None` for the outer-only `play`
    pub fn slot(self) -> Option<Slot> {
        match self {
            Self::Track => Some(Slot::Track),
            Self::Artist => Some(Slot::Artist),
            Self::Release => Some(Slot::Release),
            Self::Play => None,
        }
    }
}

impl FromStr for HelperAttr {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" => Ok(Self::Track),
            "artist" => Ok(Self::Artist),
            "release" => Ok(Self::Release),
            "play" => Ok(Self::Play),
            _ => Err(()),
        }
    }
}

impl TryFrom<&Ident> for HelperAttr {
    type Error = ();

    fn try_from(value: &Ident) -> Result<Self, Self::Error> { Self::from_str(&value.to_string()) }
}


pub(super) struct PlayAttr {
    slot: Slot,
    id: Ident,
    _eq: Token![=],
    value: Expr,
}

impl Parse for PlayAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let id: Ident = input.parse()?;
        let slot = HelperAttr::try_from(&id)
            .ok()
            .and_then(HelperAttr::slot)
            .ok_or_else(|| syn::Error::new(id.span(), "Invalid field name; expected `track`, `artist`, or `release`"))?;

        Ok(PlayAttr {
            slot,
            id,
            _eq: input.parse()?,
            value: input.parse()?,
        })
    }
}


pub(super) fn parse(attrs: &[Attribute]) -> syn::Result<Vec<PlayAttr>> {
    attrs
        .iter()
        .filter(|a| a.path.is_ident("play"))
        .map(|a| a.parse_args_with(Punctuated::<PlayAttr, Token![,]>::parse_terminated))
        .try_fold(Vec::new(), |mut v, pr| pr.map(|x| v.extend(x)).and(Ok(v)))
}

pub(super) fn process(attrs: &[PlayAttr]) -> syn::Result<PlayFields<'_>> {
    attrs
        .iter()
        .try_fold(PlayFields::default(), |pf, a| pf.try_assign(a.slot, &a.value, Some(&a.id)))
}
