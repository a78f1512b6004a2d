use std::{
    fmt,
    marker::PhantomData,
    ops::Deref,
};

use serde::{
    de::{
        DeserializeOwned,
        SeqAccess,
        Visitor,
    },
    Deserialize,
    Deserializer,
};
use serde_json::Value;
use time::{
    format_description::{
        well_known::Rfc3339,
        FormatItem,
    },
    macros::format_description,
    OffsetDateTime,
    PrimitiveDateTime,
};
use tracing::debug;


/// Parses either an RFC 3339 timestamp or the minute precision `YYYY-MM-DD HH:MM` form, which is
/// assumed to be UTC
pub fn parse_timestamp(val: &str) -> Result<OffsetDateTime, time::error::Parse> {
    const SIMPLE_FMT: &[FormatItem] = format_description!("[year]-[month]-[day] [hour]:[minute]");

    OffsetDateTime::parse(val, &Rfc3339).or_else(|_| PrimitiveDateTime::parse(val, &SIMPLE_FMT).map(PrimitiveDateTime::assume_utc))
}


/// A JSON array where elements that fail to deserialize are dropped instead of failing the whole
/// array. Malformed JSON is still an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenVec<T>(Vec<T>);

impl<T> ListenVec<T> {
    pub fn into_inner(self) -> Vec<T> { self.0 }
}

impl<T> Deref for ListenVec<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<T> IntoIterator for ListenVec<T> {
    type IntoIter = std::vec::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ListenVec<T> {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        vec_skip_errors(de).map(Self)
    }
}


struct SkipVisitor<T>(PhantomData<T>);
impl<'de, T: DeserializeOwned> Visitor<'de> for SkipVisitor<T> {
    type Value = Vec<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result { formatter.write_str("a sequence") }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        let mut index = 0usize;
        // Each element is buffered first so a bad record never leaves the outer parser mid-object
        while let Some(raw) = seq.next_element::<Value>()? {
            match T::deserialize(raw) {
                Ok(v) => values.push(v),
                Err(e) => debug!(index, "Skipping record: {e}"),
            }
            index += 1;
        }
        Ok(values)
    }
}

pub fn vec_skip_errors<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    de.deserialize_seq(SkipVisitor(PhantomData))
}
