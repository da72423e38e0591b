//! Raw byte codecs: blobs, padding and the zero-width null codec

use strata_layout_core::{Codec, Error, Result, Value};

/// Raw bytes of fixed or inferred length
///
/// Decodes to `Value::Bytes`. Encoding accepts `Bytes`, and `String` as its
/// UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blob {
    len: Option<usize>,
}

impl Blob {
    /// Blob whose length comes from the field or the data
    pub fn new() -> Self {
        Blob { len: None }
    }

    /// Blob of exactly `len` bytes
    pub fn fixed(len: usize) -> Self {
        Blob { len: Some(len) }
    }

    fn check(&self, actual: usize) -> Option<String> {
        match self.len {
            Some(len) if len != actual => Some(format!(
                "blob of {} bytes does not fit fixed length {}",
                actual, len
            )),
            _ => None,
        }
    }
}

impl Codec for Blob {
    fn name(&self) -> &str {
        "blob"
    }

    fn fixed_len(&self) -> Option<usize> {
        self.len
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        if let Some(detail) = self.check(data.len()) {
            return Err(Error::decode(detail));
        }
        Ok(Value::Bytes(data.to_vec()))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let bytes = match value {
            Value::Bytes(b) => b.as_slice(),
            Value::String(s) => s.as_bytes(),
            other => {
                return Err(Error::encode(format!(
                    "blob cannot represent {}",
                    other.type_name()
                )))
            }
        };
        if let Some(detail) = self.check(bytes.len()) {
            return Err(Error::encode(detail));
        }
        Ok(bytes.to_vec())
    }
}

/// Fixed run of fill bytes that decodes to `Null`
///
/// Encoding ignores the value. Decoding accepts any content unless the codec
/// is strict, in which case every byte must equal the fill byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    len: usize,
    fill: u8,
    strict: bool,
}

impl Padding {
    /// Zero-filled padding of `len` bytes
    pub fn new(len: usize) -> Self {
        Padding {
            len,
            fill: 0,
            strict: false,
        }
    }

    /// Use `fill` instead of zero (builder pattern)
    pub fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Reject padding whose bytes differ from the fill byte (builder pattern)
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl Codec for Padding {
    fn name(&self) -> &str {
        "padding"
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(self.len)
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        if data.len() != self.len {
            return Err(Error::decode(format!(
                "padding needs {} bytes, got {}",
                self.len,
                data.len()
            )));
        }
        if self.strict && data.iter().any(|b| *b != self.fill) {
            return Err(Error::decode(format!(
                "padding contains bytes other than {:#04x}",
                self.fill
            )));
        }
        Ok(Value::Null)
    }

    fn encode(&self, _value: &Value) -> Result<Vec<u8>> {
        Ok(vec![self.fill; self.len])
    }
}

/// Zero-width codec: decodes to `Null`, encodes to nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Null;

impl Codec for Null {
    fn name(&self) -> &str {
        "null"
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(0)
    }

    fn decode(&self, _data: &[u8]) -> Result<Value> {
        Ok(Value::Null)
    }

    fn encode(&self, _value: &Value) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}
