//! Text codec with a configurable byte encoding

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use strata_layout_core::{Codec, Error, Result, Value};

/// Byte encoding of a [`Text`] field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// 7-bit ASCII
    Ascii,
    /// ISO-8859-1, one byte per code point up to U+00FF
    Latin1,
    /// UTF-16, big endian, no byte order mark
    Utf16Be,
    /// UTF-16, little endian, no byte order mark
    Utf16Le,
}

impl TextEncoding {
    /// Encoding name as used in codec names and error messages
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Utf16Le => "utf-16le",
        }
    }

    fn decode(self, data: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(data)
                .map(str::to_owned)
                .map_err(|e| Error::decode(format!("invalid utf-8: {}", e))),
            TextEncoding::Ascii => match data.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(Error::decode(format!(
                    "byte {:#04x} at {} is not ascii",
                    data[pos], pos
                ))),
                None => Ok(data.iter().map(|b| char::from(*b)).collect()),
            },
            TextEncoding::Latin1 => Ok(data.iter().map(|b| char::from(*b)).collect()),
            TextEncoding::Utf16Be => utf16_from::<BigEndian>(data),
            TextEncoding::Utf16Le => utf16_from::<LittleEndian>(data),
        }
    }

    fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Ascii => narrow(text, 0x7F, self),
            TextEncoding::Latin1 => narrow(text, 0xFF, self),
            TextEncoding::Utf16Be => Ok(utf16_to::<BigEndian>(text)),
            TextEncoding::Utf16Le => Ok(utf16_to::<LittleEndian>(text)),
        }
    }
}

fn utf16_from<B: ByteOrder>(data: &[u8]) -> Result<String> {
    if data.len() % 2 != 0 {
        return Err(Error::decode(format!(
            "utf-16 data has odd length {}",
            data.len()
        )));
    }
    let units: Vec<u16> = data.chunks_exact(2).map(B::read_u16).collect();
    String::from_utf16(&units).map_err(|e| Error::decode(format!("invalid utf-16: {}", e)))
}

fn utf16_to<B: ByteOrder>(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut out = vec![0u8; units.len() * 2];
    B::write_u16_into(&units, &mut out);
    out
}

fn narrow(text: &str, max: u32, encoding: TextEncoding) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .ok()
                .filter(|b| u32::from(*b) <= max)
                .ok_or_else(|| {
                    Error::encode(format!("{:?} cannot be encoded as {}", c, encoding.label()))
                })
        })
        .collect()
}

/// String codec
///
/// Decodes to `Value::String`. Without a fixed length the field (or the
/// data) determines how many bytes the text occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Text {
    encoding: TextEncoding,
    len: Option<usize>,
}

impl Text {
    /// Text in the given encoding
    pub fn new(encoding: TextEncoding) -> Self {
        Text {
            encoding,
            len: None,
        }
    }

    /// UTF-8 text
    pub fn utf8() -> Self {
        Self::new(TextEncoding::Utf8)
    }

    /// Require exactly `len` encoded bytes (builder pattern)
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = Some(len);
        self
    }

    /// The byte encoding
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }
}

impl Codec for Text {
    fn name(&self) -> &str {
        self.encoding.label()
    }

    fn fixed_len(&self) -> Option<usize> {
        self.len
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        if let Some(len) = self.len.filter(|len| *len != data.len()) {
            return Err(Error::decode(format!(
                "text needs {} bytes, got {}",
                len,
                data.len()
            )));
        }
        self.encoding.decode(data).map(Value::String)
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let text = value.as_str().ok_or_else(|| {
            Error::encode(format!("text cannot represent {}", value.type_name()))
        })?;
        let bytes = self.encoding.encode(text)?;
        if let Some(len) = self.len.filter(|len| *len != bytes.len()) {
            return Err(Error::encode(format!(
                "text encodes to {} bytes, field holds {}",
                bytes.len(),
                len
            )));
        }
        Ok(bytes)
    }
}
