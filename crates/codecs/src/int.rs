//! Fixed-width integer codecs
//!
//! Integers are 1, 2, 4 or 8 bytes wide, signed or unsigned, big or little
//! endian. Unsigned codecs decode to `Value::UInt`, signed ones to
//! `Value::Int`. Encoding accepts either integer kind (and `Bool` as 0/1) as
//! long as the number fits the codec's range.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use strata_layout_core::{Codec, Error, Result, Value};

/// Byte order of a multi-byte number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first (network order)
    Big,
    /// Least significant byte first
    Little,
}

/// Width of an integer codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// 8 bits
    W8,
    /// 16 bits
    W16,
    /// 32 bits
    W32,
    /// 64 bits
    W64,
}

impl IntWidth {
    /// Width in bytes
    pub fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
            IntWidth::W64 => 8,
        }
    }
}

/// Fixed-width integer codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int {
    width: IntWidth,
    signed: bool,
    endian: Endian,
}

macro_rules! int_ctor {
    ($($name:ident => ($width:ident, $signed:expr, $endian:ident)),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($name), "` integer codec")]
            pub fn $name() -> Self {
                Int::new(IntWidth::$width, $signed, Endian::$endian)
            }
        )*
    };
}

impl Int {
    /// Create an integer codec
    pub fn new(width: IntWidth, signed: bool, endian: Endian) -> Self {
        Int {
            width,
            signed,
            endian,
        }
    }

    int_ctor! {
        u8 => (W8, false, Big),
        i8 => (W8, true, Big),
        u16_be => (W16, false, Big),
        u16_le => (W16, false, Little),
        i16_be => (W16, true, Big),
        i16_le => (W16, true, Little),
        u32_be => (W32, false, Big),
        u32_le => (W32, false, Little),
        i32_be => (W32, true, Big),
        i32_le => (W32, true, Little),
        u64_be => (W64, false, Big),
        u64_le => (W64, false, Little),
        i64_be => (W64, true, Big),
        i64_le => (W64, true, Little),
    }

    /// Integer width
    pub fn width(&self) -> IntWidth {
        self.width
    }

    /// Whether the codec is signed
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Byte order
    pub fn endian(&self) -> Endian {
        self.endian
    }

    fn read<B: ByteOrder>(&self, data: &[u8]) -> Value {
        match (self.width, self.signed) {
            (IntWidth::W8, false) => Value::UInt(u64::from(data[0])),
            (IntWidth::W8, true) => Value::Int(i64::from(data[0] as i8)),
            (IntWidth::W16, false) => Value::UInt(u64::from(B::read_u16(data))),
            (IntWidth::W16, true) => Value::Int(i64::from(B::read_i16(data))),
            (IntWidth::W32, false) => Value::UInt(u64::from(B::read_u32(data))),
            (IntWidth::W32, true) => Value::Int(i64::from(B::read_i32(data))),
            (IntWidth::W64, false) => Value::UInt(B::read_u64(data)),
            (IntWidth::W64, true) => Value::Int(B::read_i64(data)),
        }
    }

    fn write<B: ByteOrder>(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.width.bytes()];
        if self.signed {
            let n = integer_of(value)
                .and_then(|v| v.as_i64())
                .ok_or_else(|| self.out_of_domain(value))?;
            match self.width {
                IntWidth::W8 => buf[0] = i8::try_from(n).map_err(|_| self.out_of_domain(value))? as u8,
                IntWidth::W16 => {
                    B::write_i16(&mut buf, i16::try_from(n).map_err(|_| self.out_of_domain(value))?)
                }
                IntWidth::W32 => {
                    B::write_i32(&mut buf, i32::try_from(n).map_err(|_| self.out_of_domain(value))?)
                }
                IntWidth::W64 => B::write_i64(&mut buf, n),
            }
        } else {
            let n = integer_of(value)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| self.out_of_domain(value))?;
            match self.width {
                IntWidth::W8 => buf[0] = u8::try_from(n).map_err(|_| self.out_of_domain(value))?,
                IntWidth::W16 => {
                    B::write_u16(&mut buf, u16::try_from(n).map_err(|_| self.out_of_domain(value))?)
                }
                IntWidth::W32 => {
                    B::write_u32(&mut buf, u32::try_from(n).map_err(|_| self.out_of_domain(value))?)
                }
                IntWidth::W64 => B::write_u64(&mut buf, n),
            }
        }
        Ok(buf)
    }

    fn out_of_domain(&self, value: &Value) -> Error {
        Error::encode(format!("{} cannot represent {:?}", self.name(), value))
    }
}

/// Integers pass through; `Bool` is promoted to 0/1
fn integer_of(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) | Value::UInt(_) => Some(value.clone()),
        Value::Bool(b) => Some(Value::UInt(u64::from(*b))),
        _ => None,
    }
}

impl Codec for Int {
    fn name(&self) -> &str {
        match (self.width, self.signed, self.endian) {
            (IntWidth::W8, false, _) => "u8",
            (IntWidth::W8, true, _) => "i8",
            (IntWidth::W16, false, Endian::Big) => "u16be",
            (IntWidth::W16, false, Endian::Little) => "u16le",
            (IntWidth::W16, true, Endian::Big) => "i16be",
            (IntWidth::W16, true, Endian::Little) => "i16le",
            (IntWidth::W32, false, Endian::Big) => "u32be",
            (IntWidth::W32, false, Endian::Little) => "u32le",
            (IntWidth::W32, true, Endian::Big) => "i32be",
            (IntWidth::W32, true, Endian::Little) => "i32le",
            (IntWidth::W64, false, Endian::Big) => "u64be",
            (IntWidth::W64, false, Endian::Little) => "u64le",
            (IntWidth::W64, true, Endian::Big) => "i64be",
            (IntWidth::W64, true, Endian::Little) => "i64le",
        }
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(self.width.bytes())
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        if data.len() != self.width.bytes() {
            return Err(Error::decode(format!(
                "{} needs {} bytes, got {}",
                self.name(),
                self.width.bytes(),
                data.len()
            )));
        }
        Ok(match self.endian {
            Endian::Big => self.read::<BigEndian>(data),
            Endian::Little => self.read::<LittleEndian>(data),
        })
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match self.endian {
            Endian::Big => self.write::<BigEndian>(value),
            Endian::Little => self.write::<LittleEndian>(value),
        }
    }
}
