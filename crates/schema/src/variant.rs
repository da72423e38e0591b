//! Variant dispatch (tagged and untagged unions)
//!
//! A tagged variant picks its body from the value of a discriminant field
//! declared earlier in the same composite. The choice is made per call from
//! the activation frame, so the schema never changes shape and the full set
//! of cases can be listed up front with [`Variant::cases`].
//!
//! An untagged variant has no discriminant. It tries its cases in declared
//! order and commits to the first one that decodes (or encodes) cleanly,
//! even if a later case would also have matched.

use tracing::trace;

use strata_layout_core::{Error, Result, Value};

use crate::field::{Extent, Field};
use crate::frame::Frame;

#[derive(Debug, Clone)]
enum Selector {
    Tagged {
        discriminant: String,
        cases: Vec<(Value, Field)>,
        fallback: Option<Box<Field>>,
    },
    Untagged(Vec<Field>),
}

/// A field body chosen per call from a fixed set of cases
#[derive(Debug, Clone)]
pub struct Variant {
    selector: Selector,
}

impl Variant {
    /// Variant keyed on the value of the sibling field `discriminant`
    pub fn tagged(discriminant: impl Into<String>) -> Self {
        Variant {
            selector: Selector::Tagged {
                discriminant: discriminant.into(),
                cases: Vec::new(),
                fallback: None,
            },
        }
    }

    /// Variant that tries `cases` in order
    pub fn untagged(cases: impl IntoIterator<Item = Field>) -> Self {
        Variant {
            selector: Selector::Untagged(cases.into_iter().collect()),
        }
    }

    /// Add the case selected when the discriminant equals `key`
    ///
    /// Keys compare by value, so `0u8` and `0i64` are the same key. A
    /// duplicate key, or a keyed case on an untagged variant, is a
    /// configuration error.
    pub fn case(mut self, key: impl Into<Value>, field: impl Into<Field>) -> Result<Self> {
        let key = key.into();
        match &mut self.selector {
            Selector::Tagged { cases, .. } => {
                if cases.iter().any(|(existing, _)| *existing == key) {
                    return Err(Error::config(format!("duplicate variant key {:?}", key)));
                }
                cases.push((key, field.into()));
            }
            Selector::Untagged(_) => {
                return Err(Error::config("untagged variants take no keyed cases"));
            }
        }
        Ok(self)
    }

    /// Case used when no key matches the discriminant
    pub fn fallback(mut self, field: impl Into<Field>) -> Result<Self> {
        match &mut self.selector {
            Selector::Tagged { fallback, .. } => *fallback = Some(Box::new(field.into())),
            Selector::Untagged(_) => {
                return Err(Error::config("untagged variants have no fallback"));
            }
        }
        Ok(self)
    }

    /// Name of the discriminant field, for tagged variants
    pub fn discriminant(&self) -> Option<&str> {
        match &self.selector {
            Selector::Tagged { discriminant, .. } => Some(discriminant),
            Selector::Untagged(_) => None,
        }
    }

    /// Every case, in declared order, fallback last
    pub fn cases(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        match &self.selector {
            Selector::Tagged {
                cases, fallback, ..
            } => Box::new(
                cases
                    .iter()
                    .map(|(_, field)| field)
                    .chain(fallback.as_deref()),
            ),
            Selector::Untagged(cases) => Box::new(cases.iter()),
        }
    }

    /// Keys of a tagged variant, in declared order
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        let cases: &[(Value, Field)] = match &self.selector {
            Selector::Tagged { cases, .. } => cases,
            Selector::Untagged(_) => &[],
        };
        cases.iter().map(|(key, _)| key)
    }

    /// Common fixed length of all cases, if they share one
    pub fn fixed_len(&self) -> Option<usize> {
        let mut lens = self.cases().map(Field::fixed_len);
        let first = lens.next()??;
        lens.all(|len| len == Some(first)).then_some(first)
    }

    fn select<'s>(&'s self, frame: &Frame<'_>) -> Result<Candidates<'s>> {
        match &self.selector {
            Selector::Tagged {
                discriminant,
                cases,
                fallback,
            } => {
                let key = frame.sibling(discriminant)?;
                let chosen = cases
                    .iter()
                    .find(|(case_key, _)| case_key == key)
                    .map(|(_, field)| field)
                    .or(fallback.as_deref());
                match chosen {
                    Some(field) => {
                        trace!(target: "strata::layout", discriminant = %discriminant, ?key, "Variant selected");
                        Ok(Candidates::One(field))
                    }
                    None => Err(Error::NoMatch {
                        offset: 0,
                        candidates: cases.len(),
                    }),
                }
            }
            Selector::Untagged(cases) => Ok(Candidates::InOrder(cases)),
        }
    }

    pub(crate) fn decode_case(
        &self,
        data: &[u8],
        extent: Extent,
        frame: Frame<'_>,
    ) -> Result<(Value, usize)> {
        match self.select(&frame)? {
            Candidates::One(field) => field.decode_at(data, 0, frame),
            Candidates::InOrder(cases) => {
                for (idx, case) in cases.iter().enumerate() {
                    let attempt = case.decode_at(data, 0, frame).and_then(|(value, used)| {
                        if extent == Extent::Exact && used != data.len() {
                            return Err(Error::LengthMismatch {
                                declared: Some(data.len()),
                                codec: case.fixed_len(),
                                observed: Some(used),
                            });
                        }
                        Ok((value, used))
                    });
                    match attempt {
                        Ok(decoded) => return Ok(decoded),
                        Err(e) if e.rejects_candidate() => {
                            trace!(target: "strata::layout", case = idx, error = %e, "Variant case rejected");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(Error::NoMatch {
                    offset: 0,
                    candidates: cases.len(),
                })
            }
        }
    }

    pub(crate) fn encode_case(&self, value: &Value, frame: Frame<'_>) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self.select(&frame)? {
            Candidates::One(field) => {
                field.encode_into(value, &mut out, 0, frame)?;
            }
            Candidates::InOrder(cases) => {
                let mut committed = false;
                for (idx, case) in cases.iter().enumerate() {
                    match case.encode_into(value, &mut out, 0, frame) {
                        Ok(_) => {
                            committed = true;
                            break;
                        }
                        Err(e) if e.rejects_candidate() => {
                            out.clear();
                            trace!(target: "strata::layout", case = idx, error = %e, "Variant case rejected");
                        }
                        Err(e) => return Err(e),
                    }
                }
                if !committed {
                    return Err(Error::NoMatch {
                        offset: 0,
                        candidates: cases.len(),
                    });
                }
            }
        }
        Ok(out)
    }
}

enum Candidates<'s> {
    One(&'s Field),
    InOrder(&'s [Field]),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_layout_codecs::{Blob, Int, Literal};
    use strata_layout_core::{ErrorKind, LayoutConfig};

    #[test]
    fn test_duplicate_key_rejected() {
        let err = Variant::tagged("tag")
            .case(0u8, Int::u8())
            .unwrap()
            .case(0i64, Int::u16_be())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_untagged_rejects_keys_and_fallback() {
        assert!(Variant::untagged(vec![]).case(1u8, Int::u8()).is_err());
        assert!(Variant::untagged(vec![]).fallback(Int::u8()).is_err());
    }

    #[test]
    fn test_cases_are_enumerable() {
        let variant = Variant::tagged("tag")
            .case(0u8, Int::u8())
            .unwrap()
            .case(1u8, Int::u16_be())
            .unwrap()
            .fallback(Blob::new())
            .unwrap();
        let names: Vec<&str> = variant.cases().map(Field::describe).collect();
        assert_eq!(names, vec!["u8", "u16be", "blob"]);
        assert_eq!(variant.keys().count(), 2);
        assert_eq!(variant.discriminant(), Some("tag"));
    }

    #[test]
    fn test_fixed_len_only_when_cases_agree() {
        let same = Variant::untagged(vec![Field::new(Int::u16_be()), Field::new(Int::i16_le())]);
        assert_eq!(same.fixed_len(), Some(2));
        let mixed = Variant::untagged(vec![Field::new(Int::u8()), Field::new(Int::u16_be())]);
        assert_eq!(mixed.fixed_len(), None);
        assert_eq!(Variant::untagged(vec![]).fixed_len(), None);
    }

    #[test]
    fn test_untagged_first_match_wins() {
        // both cases accept the input; the first declared one commits
        let variant = Variant::untagged(vec![Field::new(Int::u8()), Field::new(Blob::new())]);
        let config = LayoutConfig::default();
        let (value, used) = variant
            .decode_case(&[7, 8], Extent::Open, Frame::new(&config))
            .unwrap();
        assert_eq!(value, Value::UInt(7));
        assert_eq!(used, 1);
    }

    #[test]
    fn test_untagged_exact_extent_skips_short_matches() {
        let variant = Variant::untagged(vec![Field::new(Int::u8()), Field::new(Blob::new())]);
        let config = LayoutConfig::default();
        let (value, used) = variant
            .decode_case(&[7, 8], Extent::Exact, Frame::new(&config))
            .unwrap();
        assert_eq!(value, Value::from(&[7u8, 8]));
        assert_eq!(used, 2);
    }

    #[test]
    fn test_untagged_no_match() {
        let variant = Variant::untagged(vec![
            Field::new(Literal::new(b"A".to_vec())),
            Field::new(Literal::new(b"B".to_vec())),
        ]);
        let config = LayoutConfig::default();
        let err = variant
            .decode_case(b"C", Extent::Open, Frame::new(&config))
            .unwrap_err();
        assert_eq!(err, Error::NoMatch { offset: 0, candidates: 2 });

        let err = variant
            .encode_case(&Value::from(b"C"), Frame::new(&config))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatch);
    }

    #[test]
    fn test_untagged_encode_picks_first_accepting_case() {
        let variant = Variant::untagged(vec![Field::new(Int::u8()), Field::new(Int::u16_be())]);
        let config = LayoutConfig::default();
        let bytes = variant
            .encode_case(&Value::UInt(300), Frame::new(&config))
            .unwrap();
        assert_eq!(bytes, vec![0x01, 0x2C]);
    }

    #[test]
    fn test_tagged_outside_composite_is_configuration_error() {
        let variant = Variant::tagged("tag").case(0u8, Int::u8()).unwrap();
        let config = LayoutConfig::default();
        let err = variant
            .decode_case(&[1], Extent::Open, Frame::new(&config))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
