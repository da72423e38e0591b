//! One schema, many threads

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const ROUNDS: usize = 250;

#[test]
fn test_shared_stream_schema() {
    let stream = Arc::new(tlv_stream());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let stream = Arc::clone(&stream);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let items = vec![
                        tlv(TLV_TEXT, format!("thread {} round {}", id, round)),
                        tlv(TLV_INT, (id * ROUNDS + round) as u32),
                        tlv(200, vec![id as u8; round % 9]),
                    ];
                    let bytes = stream.encode(&items).unwrap();
                    assert_eq!(stream.decode(&bytes).unwrap(), items);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_failures_do_not_leak_between_threads() {
    let file = Arc::new(chunk_file());
    let record = file
        .record()
        .with("magic", MAGIC)
        .unwrap()
        .with("chunks", vec![chunk_record(b"DATA", b"concurrent")])
        .unwrap();
    let good = Arc::new(file.encode(&record).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let file = Arc::clone(&file);
            let good = Arc::clone(&good);
            let barrier = Arc::clone(&barrier);
            let expected = record.clone();
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    if (id + round) % 2 == 0 {
                        let cut = round % good.len();
                        assert!(file.decode(&good[..cut]).is_err());
                    } else {
                        assert_eq!(file.decode(&good).unwrap(), expected);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
