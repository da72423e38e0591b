//! Shared schemas for the root integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

pub use strata_layout::{
    Blob, ByteBool, Callback, Composite, Error, ErrorKind, Field, Int, LayoutConfig, Literal,
    Padding, Record, RepeatedSequence, Text, TrailingBytes, Value, Variant,
};

// ============================================================================
// Type-length-value stream
// ============================================================================

/// TLV type carrying UTF-8 text
pub const TLV_TEXT: u8 = 1;
/// TLV type carrying a big-endian u32
pub const TLV_INT: u8 = 2;

/// One TLV item: `type:u8 len:u16be value`, the value shaped by `type`
pub fn tlv_item() -> Composite {
    let value = Variant::tagged("type")
        .case(TLV_TEXT, Text::utf8())
        .unwrap()
        .case(TLV_INT, Int::u32_be())
        .unwrap()
        .fallback(Blob::new())
        .unwrap();

    let mut item = Composite::new();
    item.push("type", Int::u8()).unwrap();
    item.push("len", Int::u16_be()).unwrap();
    item.push("value", Field::variant(value)).unwrap();
    item.link_length("value", "len").unwrap();
    item
}

/// Items back to back until the input ends
pub fn tlv_stream() -> RepeatedSequence {
    RepeatedSequence::new(vec![Field::nested(tlv_item())])
}

pub fn tlv(kind: u8, value: impl Into<Value>) -> Value {
    let record = Record::new(["type", "value"])
        .with("type", kind)
        .unwrap()
        .with("value", value)
        .unwrap();
    Value::Record(record)
}

// ============================================================================
// Chunked file
// ============================================================================

pub const MAGIC: &[u8] = b"\x89CHK";
pub const END: &[u8] = b"\x00\x00\x00\x00END!";

/// `len:u32be kind:[4] data:[len] crc:u32be`
pub fn chunk() -> Composite {
    let mut chunk = Composite::new();
    chunk.push("len", Int::u32_be()).unwrap();
    chunk.push("kind", Blob::fixed(4)).unwrap();
    chunk.push("data", Blob::new()).unwrap();
    chunk.push("crc", Int::u32_be()).unwrap();
    chunk.link_length("data", "len").unwrap();
    chunk
}

/// Magic, then chunks until the end marker
pub fn chunk_file() -> Composite {
    let chunks = RepeatedSequence::new(vec![Field::nested(chunk())])
        .with_terminator(Literal::new(END.to_vec()));

    let mut file = Composite::new();
    file.push("magic", Literal::new(MAGIC.to_vec())).unwrap();
    file.push("chunks", Field::sequence(chunks)).unwrap();
    file
}

/// Chunk record whose CRC covers kind and data
pub fn chunk_record(kind: &[u8; 4], data: &[u8]) -> Value {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    let record = Record::new(["kind", "data", "crc"])
        .with("kind", kind)
        .unwrap()
        .with("data", data)
        .unwrap()
        .with("crc", hasher.finalize())
        .unwrap();
    Value::Record(record)
}

// ============================================================================
// Length-prefixed frame
// ============================================================================

/// `length:u32be body:[length]`
pub fn length_prefixed() -> Composite {
    let mut schema = Composite::new();
    schema.push("length", Int::u32_be()).unwrap();
    schema.push("body", Blob::new()).unwrap();
    schema.link_length("body", "length").unwrap();
    schema
}
