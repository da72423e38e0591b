//! Floating-point and byte-boolean codecs

use crate::int::Endian;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use strata_layout_core::{Codec, Error, Result, Value};

/// IEEE-754 float codec, single (4 bytes) or double (8 bytes) precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Float {
    double: bool,
    endian: Endian,
}

impl Float {
    /// 4-byte float
    pub fn single(endian: Endian) -> Self {
        Float {
            double: false,
            endian,
        }
    }

    /// 8-byte float
    pub fn double(endian: Endian) -> Self {
        Float {
            double: true,
            endian,
        }
    }

    fn width(&self) -> usize {
        if self.double {
            8
        } else {
            4
        }
    }

    fn read<B: ByteOrder>(&self, data: &[u8]) -> f64 {
        if self.double {
            B::read_f64(data)
        } else {
            f64::from(B::read_f32(data))
        }
    }

    fn write<B: ByteOrder>(&self, n: f64) -> Vec<u8> {
        let mut buf = vec![0u8; self.width()];
        if self.double {
            B::write_f64(&mut buf, n);
        } else {
            B::write_f32(&mut buf, n as f32);
        }
        buf
    }
}

impl Codec for Float {
    fn name(&self) -> &str {
        match (self.double, self.endian) {
            (false, Endian::Big) => "f32be",
            (false, Endian::Little) => "f32le",
            (true, Endian::Big) => "f64be",
            (true, Endian::Little) => "f64le",
        }
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(self.width())
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        if data.len() != self.width() {
            return Err(Error::decode(format!(
                "{} needs {} bytes, got {}",
                self.name(),
                self.width(),
                data.len()
            )));
        }
        Ok(Value::Float(match self.endian {
            Endian::Big => self.read::<BigEndian>(data),
            Endian::Little => self.read::<LittleEndian>(data),
        }))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let n = match value {
            Value::Float(f) => *f,
            Value::Int(i) => *i as f64,
            Value::UInt(u) => *u as f64,
            other => {
                return Err(Error::encode(format!(
                    "{} cannot represent {:?}",
                    self.name(),
                    other
                )))
            }
        };
        Ok(match self.endian {
            Endian::Big => self.write::<BigEndian>(n),
            Endian::Little => self.write::<LittleEndian>(n),
        })
    }
}

/// One-byte boolean: zero is false, anything else is true
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteBool;

impl Codec for ByteBool {
    fn name(&self) -> &str {
        "bool"
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(1)
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        match data {
            [b] => Ok(Value::Bool(*b != 0)),
            _ => Err(Error::decode(format!(
                "bool needs 1 byte, got {}",
                data.len()
            ))),
        }
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::Bool(b) => Ok(vec![u8::from(*b)]),
            Value::Int(0) | Value::UInt(0) => Ok(vec![0]),
            Value::Int(1) | Value::UInt(1) => Ok(vec![1]),
            other => Err(Error::encode(format!("bool cannot represent {:?}", other))),
        }
    }
}
