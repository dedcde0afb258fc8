//! Concurrent generation tests
//!
//! One model and one generator shared by many threads.
//! Run with: cargo test --test concurrent_generation_tests

use persist_token::{
    BASE58_ALPHABET, InMemoryRecordStore, Record, RecordModel, SecureRandomGenerator,
    TokenFieldOptions, TokenGenerator, secure_token_record,
};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

secure_token_record! {
    pub struct Device {
        label: String,
        pairing_code: Option<String>,
    }
}

#[test]
fn test_concurrent_generation_from_shared_generator() {
    let generator = SecureRandomGenerator::shared();
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let generator = Arc::clone(&generator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..200)
                    .map(|i| generator.generate(24 + i % 40).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for (i, token) in handle.join().unwrap().into_iter().enumerate() {
            assert_eq!(token.len(), 24 + i % 40);
            assert!(token.bytes().all(|b| BASE58_ALPHABET.contains(&b)));
            assert!(seen.insert(token), "duplicate token generated");
        }
    }
    assert_eq!(seen.len(), num_threads * 200);
}

#[test]
fn test_concurrent_saves_through_shared_model() {
    let store = Arc::new(InMemoryRecordStore::new());
    let mut devices = RecordModel::<Device>::new(store.clone());
    devices
        .declare_token_field("pairing_code", TokenFieldOptions::new().length(32))
        .unwrap();
    let devices = Arc::new(devices);

    let num_threads = 6;
    let per_thread = 25;
    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let devices = Arc::clone(&devices);
            thread::spawn(move || {
                (0..per_thread)
                    .map(|i| {
                        let mut device = devices.new_record().unwrap();
                        device.set_label(format!("device-{}-{}", thread_id, i));
                        devices.save(&mut device).unwrap();
                        device
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        for device in handle.join().unwrap() {
            let code = device.pairing_code().clone().unwrap();
            assert_eq!(code.len(), 32);

            let stored = devices.find(device.persist_id().unwrap()).unwrap();
            assert_eq!(stored.pairing_code().as_deref(), Some(code.as_str()));
            assert_eq!(stored.label(), device.label());
            codes.insert(code);
        }
    }

    assert_eq!(codes.len(), num_threads * per_thread);
    assert_eq!(store.count("Device").unwrap(), num_threads * per_thread);
}
