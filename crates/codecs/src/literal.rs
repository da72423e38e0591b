//! Literal tag codec
//!
//! A literal is a constant byte string such as a magic number or a list
//! terminator. In verify mode it must match exactly on decode and the value
//! handed to encode must be the literal (or `Null`). In trust mode decode
//! ignores the bytes and returns `Null`, and encode always writes the literal.

use strata_layout_core::{Codec, Error, Result, Value};

/// Constant byte string codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    content: Vec<u8>,
    verify: bool,
}

impl Literal {
    /// Verified literal
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Literal {
            content: content.into(),
            verify: true,
        }
    }

    /// Trusted literal: content is not checked on decode
    pub fn trusted(content: impl Into<Vec<u8>>) -> Self {
        Literal {
            content: content.into(),
            verify: false,
        }
    }

    /// The literal bytes
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Whether the literal is verified
    pub fn verifies(&self) -> bool {
        self.verify
    }
}

impl Codec for Literal {
    fn name(&self) -> &str {
        "literal"
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(self.content.len())
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        if !self.verify {
            return Ok(Value::Null);
        }
        if data != self.content.as_slice() {
            return Err(Error::decode(format!(
                "mismatched literal: received {:02x?}, expected {:02x?}",
                data, self.content
            )));
        }
        Ok(Value::Bytes(self.content.clone()))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        if self.verify {
            match value {
                Value::Null => {}
                Value::Bytes(b) if *b == self.content => {}
                other => {
                    return Err(Error::encode(format!(
                        "value {:?} does not match literal {:02x?}",
                        other, self.content
                    )))
                }
            }
        }
        Ok(self.content.clone())
    }
}
