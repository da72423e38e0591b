//! Property-based round trips and robustness checks

use crate::common::*;
use proptest::collection::vec;
use proptest::prelude::*;

fn arb_tlv() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,24}".prop_map(|text| tlv(TLV_TEXT, text)),
        any::<u32>().prop_map(|n| tlv(TLV_INT, n)),
        (3u8..=255, vec(any::<u8>(), 0..32)).prop_map(|(kind, raw)| tlv(kind, raw)),
    ]
}

fn arb_chunk() -> impl Strategy<Value = Value> {
    (prop::array::uniform4(b'A'..=b'Z'), vec(any::<u8>(), 0..64))
        .prop_map(|(kind, data)| chunk_record(&kind, &data))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn length_prefixed_roundtrip(body in vec(any::<u8>(), 0..1024)) {
        let schema = length_prefixed();
        let record = schema.record().with("body", body.clone()).unwrap();
        let bytes = schema.encode(&record).unwrap();

        prop_assert_eq!(bytes.len(), body.len() + 4);
        prop_assert_eq!(&bytes[..4], &(body.len() as u32).to_be_bytes()[..]);
        prop_assert_eq!(schema.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn tlv_stream_roundtrip(items in vec(arb_tlv(), 0..16)) {
        let stream = tlv_stream();
        let bytes = stream.encode(&items).unwrap();
        prop_assert_eq!(stream.decode(&bytes).unwrap(), items);
    }

    #[test]
    fn chunk_file_roundtrip(chunks in vec(arb_chunk(), 0..8)) {
        let file = chunk_file();
        let record = file
            .record()
            .with("magic", MAGIC)
            .unwrap()
            .with("chunks", chunks)
            .unwrap();
        let bytes = file.encode(&record).unwrap();
        prop_assert_eq!(file.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn arbitrary_input_never_panics(data in vec(any::<u8>(), 0..128)) {
        let _ = tlv_stream().decode(&data);
        let _ = chunk_file().decode(&data);
        let _ = length_prefixed().decode(&data);
    }

    #[test]
    fn truncation_is_always_an_error(
        items in vec(arb_tlv(), 1..8),
        cut in any::<prop::sample::Index>(),
    ) {
        let file = chunk_file();
        let record = file
            .record()
            .with("magic", MAGIC)
            .unwrap()
            .with("chunks", vec![chunk_record(b"TLVS", &tlv_stream().encode(&items).unwrap())])
            .unwrap();
        let bytes = file.encode(&record).unwrap();
        let at = cut.index(bytes.len());
        prop_assert!(file.decode(&bytes[..at]).is_err());
    }
}
