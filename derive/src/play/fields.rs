use syn::{
    punctuated::Punctuated,
    spanned::Spanned,
    token,
    Field,
    Result,
};

use super::{
    attributes::HelperAttr,
    PlayFields,
    Slot,
};

pub(super) fn process(fields: &Punctuated<Field, token::Comma>) -> Result<PlayFields<'_>> {
    let mut named = PlayFields::default();
    fields
        .iter()
        .inspect(|&f| named.assign_implicit(f))
        .flat_map(|f| {
            f.attrs.iter().filter_map(move |a| {
                let tag = a.path.get_ident()?;
                HelperAttr::try_from(tag).ok().map(|ha| (ha, f, tag))
            })
        })
        .try_fold(PlayFields::default(), |tagged, (ha, field, tag)| match (ha.slot(), field.ident.as_ref()) {
            (None, _) => Err(syn::Error::new(tag.span(), "Not allowed on fields. Must be placed on outer struct")),
            (Some(slot), Some(ident)) => tagged.try_assign(slot, ident, Some(tag)),
            (Some(_), None) => Err(syn::Error::new(field.span(), "Only named fields can be tagged")),
        })
        .map(|t| named.merge(t))
}


impl<'f> PlayFields<'f> {
    fn assign_implicit(&mut self, field: &'f Field) {
        if let Some((ident, slot)) = field
            .ident
            .as_ref()
            .and_then(|i| Slot::from_field_name(&i.to_string()).map(|slot| (i, slot)))
        {
            // Explicit tags on other fields take precedence during merge
            if self[slot].is_none() {
                self.assign(slot, ident, None);
            }
        }
    }
}
