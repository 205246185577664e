//! Integration tests for the `.ir` binary format
//!
//! Encodes fixture files covering every node form, then checks exact
//! round trips, tamper detection and header rejection.

mod common;

use flir_engine::codec::{decode, flags, inspect, FORMAT_VERSION, MAGIC};
use flir_engine::ir::FileDecl;
use flir_engine::{read_file_ir, write_file_ir, SerializationError, WriteOptions};

fn encode(file: &FileDecl) -> Vec<u8> {
    write_file_ir(file, &WriteOptions::default()).unwrap()
}

// ===== Round trips =====

#[test]
fn test_kitchen_sink_round_trips_exactly() {
    let file = common::kitchen_sink();
    let bytes = encode(&file);
    let decoded = read_file_ir(&bytes).unwrap();
    assert_eq!(decoded, file);
}

#[test]
fn test_counter_round_trips_exactly() {
    let file = common::counter_file();
    let decoded = read_file_ir(&encode(&file)).unwrap();
    assert_eq!(decoded, file);
}

#[test]
fn test_encoding_is_deterministic() {
    let file = common::kitchen_sink();
    assert_eq!(encode(&file), encode(&file.clone()));
}

#[test]
fn test_reencoding_decoded_file_is_byte_identical() {
    let bytes = encode(&common::kitchen_sink());
    let decoded = read_file_ir(&bytes).unwrap();
    assert_eq!(encode(&decoded), bytes);
}

#[test]
fn test_without_checksum_round_trips() {
    let file = common::kitchen_sink();
    let options = WriteOptions {
        checksum: false,
        debug_info: true,
    };
    let with = encode(&file);
    let without = write_file_ir(&file, &options).unwrap();
    assert_eq!(without.len() + 32, with.len());

    let decoded = decode(&without).unwrap();
    assert!(!decoded.header.has_checksum());
    assert_eq!(decoded.file, file);
}

#[test]
fn test_without_debug_info_drops_positions_and_metadata() {
    let file = common::kitchen_sink();
    let options = WriteOptions {
        checksum: true,
        debug_info: false,
    };
    let slim = write_file_ir(&file, &options).unwrap();
    assert!(slim.len() < encode(&file).len());

    let decoded = read_file_ir(&slim).unwrap();
    assert_eq!(decoded.file_path, file.file_path);
    assert_eq!(decoded.content_hash, file.content_hash);
    assert_eq!(decoded.classes.len(), file.classes.len());
    assert_eq!(decoded.functions.len(), file.functions.len());

    let var = &decoded.variables[0];
    assert!(var.metadata.is_none());
    assert!(!var.location.is_known());
    assert_eq!(var.location.file, file.file_path);
    assert_eq!(
        var.initializer.as_ref().map(|e| &e.kind),
        file.variables[0].initializer.as_ref().map(|e| &e.kind)
    );
}

#[test]
fn test_json_round_trip() {
    let file = common::kitchen_sink();
    let json = serde_json::to_string_pretty(&file).unwrap();
    let back: FileDecl = serde_json::from_str(&json).unwrap();
    assert_eq!(back, file);
    back.check_invariants().unwrap();
}

// ===== Header =====

#[test]
fn test_header_layout() {
    let bytes = encode(&common::counter_file());
    assert_eq!(&bytes[0..4], b"FLIR");
    assert_eq!(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), MAGIC);
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
    assert_eq!(
        u16::from_le_bytes([bytes[6], bytes[7]]),
        flags::CHECKSUM | flags::DEBUG_INFO
    );
}

#[test]
fn test_wrong_magic_rejected() {
    let mut bytes = encode(&common::counter_file());
    bytes[0..4].copy_from_slice(b"DART");
    assert!(matches!(
        read_file_ir(&bytes),
        Err(SerializationError::InvalidMagic { offset: 0, .. })
    ));
}

#[test]
fn test_newer_version_rejected() {
    let mut bytes = encode(&common::counter_file());
    bytes[4..6].copy_from_slice(&2u16.to_le_bytes());
    match read_file_ir(&bytes) {
        Err(SerializationError::UnsupportedVersion {
            found, supported, ..
        }) => {
            assert_eq!(found, 2);
            assert_eq!(supported, FORMAT_VERSION);
        }
        other => panic!("expected UnsupportedVersion, got {:?}", other),
    }
}

#[test]
fn test_compressed_flag_rejected() {
    let mut bytes = encode(&common::counter_file());
    let bits = flags::CHECKSUM | flags::DEBUG_INFO | flags::COMPRESSED;
    bytes[6..8].copy_from_slice(&bits.to_le_bytes());
    assert!(matches!(
        read_file_ir(&bytes),
        Err(SerializationError::UnsupportedFeature { .. })
    ));
}

#[test]
fn test_unknown_flag_rejected() {
    let mut bytes = encode(&common::counter_file());
    let bits = flags::CHECKSUM | flags::DEBUG_INFO | 0x100;
    bytes[6..8].copy_from_slice(&bits.to_le_bytes());
    assert!(matches!(
        read_file_ir(&bytes),
        Err(SerializationError::UnsupportedFeature { .. })
    ));
}

// ===== Corruption =====

#[test]
fn test_every_flipped_body_byte_fails_checksum() {
    let bytes = encode(&common::counter_file());
    for i in 8..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x01;
        match read_file_ir(&tampered) {
            Err(SerializationError::ChecksumMismatch { .. }) => {}
            other => panic!("flip at {} gave {:?}", i, other.map(|f| f.file_path)),
        }
    }
}

#[test]
fn test_flipped_header_bytes_rejected() {
    let bytes = encode(&common::counter_file());
    for i in 0..8 {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x01;
        let err = read_file_ir(&tampered).unwrap_err();
        match i {
            0..=3 => assert!(matches!(err, SerializationError::InvalidMagic { .. }), "{:?}", err),
            4..=5 => assert!(
                matches!(err, SerializationError::UnsupportedVersion { .. }),
                "{:?}",
                err
            ),
            _ => {}
        }
    }
}

#[test]
fn test_cleared_checksum_flag_leaves_trailer_as_trailing_bytes() {
    // The header is outside the digest, so dropping the flag is caught by
    // the 32 unread trailer bytes instead of the checksum.
    let mut bytes = encode(&common::counter_file());
    let bits = flags::DEBUG_INFO;
    bytes[6..8].copy_from_slice(&bits.to_le_bytes());
    match read_file_ir(&bytes) {
        Err(SerializationError::TrailingBytes { count, offset }) => {
            assert_eq!(count, 32);
            assert_eq!(offset, bytes.len() - 32);
        }
        other => panic!("expected TrailingBytes, got {:?}", other.map(|f| f.file_path)),
    }
}

#[test]
fn test_set_checksum_flag_without_trailer_is_mismatch() {
    let options = WriteOptions {
        checksum: false,
        debug_info: true,
    };
    let mut bytes = write_file_ir(&common::counter_file(), &options).unwrap();
    let bits = flags::CHECKSUM | flags::DEBUG_INFO;
    bytes[6..8].copy_from_slice(&bits.to_le_bytes());
    assert!(matches!(
        read_file_ir(&bytes),
        Err(SerializationError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_every_truncation_fails() {
    let bytes = encode(&common::kitchen_sink());
    for len in 0..bytes.len() {
        assert!(
            read_file_ir(&bytes[..len]).is_err(),
            "prefix of {} bytes decoded",
            len
        );
    }
}

#[test]
fn test_truncation_without_checksum_fails() {
    let options = WriteOptions {
        checksum: false,
        debug_info: true,
    };
    let bytes = write_file_ir(&common::kitchen_sink(), &options).unwrap();
    for len in 0..bytes.len() {
        assert!(read_file_ir(&bytes[..len]).is_err(), "prefix of {} bytes", len);
    }
}

#[test]
fn test_trailing_garbage_rejected_without_checksum() {
    let options = WriteOptions {
        checksum: false,
        debug_info: false,
    };
    let mut bytes = write_file_ir(&common::counter_file(), &options).unwrap();
    bytes.extend_from_slice(&[0xAA, 0xBB]);
    match read_file_ir(&bytes) {
        Err(SerializationError::TrailingBytes { count, .. }) => assert_eq!(count, 2),
        other => panic!("expected TrailingBytes, got {:?}", other.map(|f| f.file_path)),
    }
}

#[test]
fn test_errors_carry_offsets() {
    let mut bytes = encode(&common::counter_file());
    bytes[4..6].copy_from_slice(&9u16.to_le_bytes());
    let err = read_file_ir(&bytes).unwrap_err();
    assert_eq!(err.offset(), 4);
    assert!(err.to_string().contains('9'));
}

// ===== Inspection =====

#[test]
fn test_inspect_accounts_for_every_byte() {
    let file = common::kitchen_sink();
    let bytes = encode(&file);
    let stats = inspect(&bytes).unwrap();

    assert_eq!(stats.file_path, file.file_path);
    assert_eq!(stats.total_bytes, bytes.len());
    assert_eq!(
        8 + stats.string_table_bytes + stats.payload_bytes + 32,
        stats.total_bytes
    );
    assert_eq!(stats.nodes.classes, 2);
    assert_eq!(stats.nodes.providers, 1);
    assert_eq!(stats.nodes.constructors, 3);
    assert_eq!(stats.nodes.imports, 2);
    assert!(stats.strings.duplicates > 0);
    assert!(stats.strings.stored < stats.strings.seen as usize);
}
