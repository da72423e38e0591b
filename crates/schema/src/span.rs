//! Length resolution and byte-range helpers
//!
//! A field's length can come from three places: the length declared on the
//! field (or injected by a length link), the codec's fixed length, and the
//! number of bytes actually observed. Whichever of these are known must
//! agree.

use strata_layout_core::{Error, Result};

/// Merge the declared and codec lengths
///
/// The declared length wins; a codec length that disagrees with it is a
/// mismatch.
pub fn expected(declared: Option<usize>, codec: Option<usize>) -> Result<Option<usize>> {
    match (declared, codec) {
        (Some(d), Some(c)) if d != c => Err(Error::LengthMismatch {
            declared,
            codec,
            observed: None,
        }),
        (d, c) => Ok(d.or(c)),
    }
}

/// Check an observed length against the declared and codec lengths
pub fn verify(declared: Option<usize>, codec: Option<usize>, observed: usize) -> Result<usize> {
    let disagrees = |known: Option<usize>| matches!(known, Some(n) if n != observed);
    if disagrees(declared) || disagrees(codec) {
        return Err(Error::LengthMismatch {
            declared,
            codec,
            observed: Some(observed),
        });
    }
    Ok(observed)
}

/// Bytes of `data` from `offset` to the end
pub fn tail(data: &[u8], offset: usize) -> Result<&[u8]> {
    data.get(offset..).ok_or_else(|| {
        Error::decode(format!(
            "offset {} is past the end of {} bytes of input",
            offset,
            data.len()
        ))
    })
}

/// The first `len` bytes of `avail`, which starts at `offset`
pub fn take(avail: &[u8], len: usize, offset: usize) -> Result<&[u8]> {
    avail.get(..len).ok_or_else(|| {
        Error::decode(format!(
            "truncated input: need {} bytes at offset {}, {} available",
            len,
            offset,
            avail.len()
        ))
    })
}

/// Write `bytes` into `dest` at `offset`
///
/// The destination grows with zero bytes as needed. An offset beyond the
/// current end cannot be reached by writing and is out of range.
pub fn write_at(dest: &mut Vec<u8>, offset: usize, bytes: &[u8]) -> Result<()> {
    if offset > dest.len() {
        return Err(Error::OutOfRange {
            offset,
            len: dest.len(),
        });
    }
    let end = offset + bytes.len();
    if dest.len() < end {
        dest.resize(end, 0);
    }
    dest[offset..end].copy_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_layout_core::ErrorKind;

    #[test]
    fn test_expected_precedence() {
        assert_eq!(expected(Some(4), None).unwrap(), Some(4));
        assert_eq!(expected(None, Some(2)).unwrap(), Some(2));
        assert_eq!(expected(Some(2), Some(2)).unwrap(), Some(2));
        assert_eq!(expected(None, None).unwrap(), None);
        let err = expected(Some(4), Some(2)).unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                declared: Some(4),
                codec: Some(2),
                observed: None
            }
        );
    }

    #[test]
    fn test_verify() {
        assert_eq!(verify(None, None, 7).unwrap(), 7);
        assert_eq!(verify(Some(7), Some(7), 7).unwrap(), 7);
        assert_eq!(
            verify(Some(3), None, 7).unwrap_err().kind(),
            ErrorKind::LengthMismatch
        );
        assert_eq!(
            verify(None, Some(3), 7).unwrap_err().kind(),
            ErrorKind::LengthMismatch
        );
    }

    #[test]
    fn test_tail_and_take() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(tail(&data, 1).unwrap(), &[2, 3, 4]);
        assert!(tail(&data, 4).unwrap().is_empty());
        assert_eq!(tail(&data, 5).unwrap_err().kind(), ErrorKind::Decode);

        let avail = tail(&data, 1).unwrap();
        assert_eq!(take(avail, 2, 1).unwrap(), &[2, 3]);
        assert_eq!(take(avail, 4, 1).unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_write_at_extends_with_zeros() {
        let mut dest = vec![1u8, 2];
        write_at(&mut dest, 2, &[9]).unwrap();
        assert_eq!(dest, vec![1, 2, 9]);

        write_at(&mut dest, 1, &[7, 7, 7]).unwrap();
        assert_eq!(dest, vec![1, 7, 7, 7]);
    }

    #[test]
    fn test_write_at_past_end() {
        let mut dest = vec![0u8; 2];
        let err = write_at(&mut dest, 3, &[1]).unwrap_err();
        assert_eq!(err, Error::OutOfRange { offset: 3, len: 2 });
        assert_eq!(dest.len(), 2);
    }
}
