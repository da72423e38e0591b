//! Realistic formats built from the public API

use crate::common::*;

// ============================================================================
// TLV stream
// ============================================================================

#[test]
fn test_tlv_stream_encodes_each_type() {
    let stream = tlv_stream();
    let items = vec![
        tlv(TLV_TEXT, "hi"),
        tlv(TLV_INT, 7u32),
        tlv(9, b"\xAA\xBB".to_vec()),
    ];
    let bytes = stream.encode(&items).unwrap();
    assert_eq!(
        bytes,
        vec![
            1, 0, 2, b'h', b'i', //
            2, 0, 4, 0, 0, 0, 7, //
            9, 0, 2, 0xAA, 0xBB,
        ]
    );
    assert_eq!(stream.decode(&bytes).unwrap(), items);
}

#[test]
fn test_tlv_int_with_wrong_length() {
    // type 2 declares a 3-byte value, but the u32 case is exactly 4 bytes
    let err = tlv_stream().decode(&[2, 0, 3, 0, 0, 7]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatch);
}

#[test]
fn test_tlv_empty_stream() {
    let stream = tlv_stream();
    assert!(stream.encode(&[]).unwrap().is_empty());
    assert!(stream.decode(&[]).unwrap().is_empty());
}

// ============================================================================
// Chunked file
// ============================================================================

fn sample_file(file: &Composite) -> Record {
    let chunks = vec![
        chunk_record(b"HEAD", b"v1"),
        chunk_record(b"DATA", b"payload bytes"),
        chunk_record(b"NOTE", b""),
    ];
    file.record()
        .with("magic", MAGIC)
        .unwrap()
        .with("chunks", chunks)
        .unwrap()
}

#[test]
fn test_chunk_file_roundtrip() {
    let file = chunk_file();
    let record = sample_file(&file);
    let bytes = file.encode(&record).unwrap();

    assert!(bytes.starts_with(MAGIC));
    assert!(bytes.ends_with(END));
    assert_eq!(&bytes[4..12], b"\x00\x00\x00\x02HEAD");
    assert_eq!(file.decode(&bytes).unwrap(), record);
}

#[test]
fn test_chunk_file_bad_magic() {
    let file = chunk_file();
    let mut bytes = file.encode(&sample_file(&file)).unwrap();
    bytes[0] = b'P';

    let err = file.decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.field_path(), "magic");
}

#[test]
fn test_chunk_file_missing_end_marker() {
    let file = chunk_file();
    let bytes = file.encode(&sample_file(&file)).unwrap();
    let truncated = &bytes[..bytes.len() - END.len()];

    let err = file.decode(truncated).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unterminated);
    assert_eq!(err.field_path(), "chunks");
}

#[test]
fn test_chunk_file_trailing_bytes_policy() {
    let file = chunk_file();
    let record = sample_file(&file);
    let mut bytes = file.encode(&record).unwrap();
    bytes.extend_from_slice(b"junk");

    assert_eq!(file.decode(&bytes).unwrap_err().kind(), ErrorKind::Decode);

    let lenient = LayoutConfig::default().with_trailing_bytes(TrailingBytes::Allow);
    assert_eq!(file.decode_with(&bytes, &lenient).unwrap(), record);
}

// ============================================================================
// Fixed layouts
// ============================================================================

#[test]
fn test_padding_is_not_a_value() {
    let mut header = Composite::new();
    header.push("flag", ByteBool).unwrap();
    header.push("pad", Padding::new(3)).unwrap();
    header.push("value", Int::u32_le()).unwrap();
    assert_eq!(header.static_len(), Some(8));

    let record = header
        .record()
        .with("flag", true)
        .unwrap()
        .with("value", 0x0102_0304u32)
        .unwrap();
    let bytes = header.encode(&record).unwrap();
    assert_eq!(bytes, vec![1, 0, 0, 0, 4, 3, 2, 1]);

    let decoded = header.decode(&bytes).unwrap();
    assert!(!decoded.is_set("pad"));
    assert_eq!(decoded, record);
}

#[test]
fn test_fixed_text_field() {
    let mut schema = Composite::new();
    schema.push("name", Text::utf8().with_len(5)).unwrap();
    schema.push("age", Int::u8()).unwrap();

    let record = schema
        .record()
        .with("name", "alice")
        .unwrap()
        .with("age", 30u8)
        .unwrap();
    let bytes = schema.encode(&record).unwrap();
    assert_eq!(bytes, b"alice\x1e".to_vec());
    assert_eq!(schema.decode(&bytes).unwrap(), record);

    let long = record.with("name", "bob").unwrap();
    assert_eq!(schema.encode(&long).unwrap_err().kind(), ErrorKind::Encode);
}

// ============================================================================
// Record-level hooks
// ============================================================================

fn xor(mut bytes: Vec<u8>) -> strata_layout::Result<Vec<u8>> {
    for byte in &mut bytes {
        *byte ^= 0x5A;
    }
    Ok(bytes)
}

#[test]
fn test_obfuscated_envelope() {
    let mut schema = length_prefixed();
    schema
        .register("post_encode", Callback::<[u8]>::replace(xor))
        .unwrap();
    schema
        .register("pre_decode", Callback::<[u8]>::replace(xor))
        .unwrap();
    assert_eq!(schema.static_len(), None);

    let record = schema.record().with("body", b"secret").unwrap();
    let bytes = schema.encode(&record).unwrap();
    assert_eq!(bytes[3], 6 ^ 0x5A);
    assert!(!bytes.windows(6).any(|w| w == b"secret"));
    assert_eq!(schema.decode(&bytes).unwrap(), record);
}

#[test]
fn test_hook_on_wrong_stage_kind() {
    let mut schema = length_prefixed();
    let err = schema
        .register("post_decode", Callback::<[u8]>::replace(xor))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = schema
        .register("unpack", Callback::<[u8]>::replace(xor))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_length_prefixed_truncated_body() {
    let schema = length_prefixed();
    let err = schema.decode(b"\x00\x00\x00\x09short").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.field_path(), "body");
}
