//! Tests for the Key Encoder
//!
//! These tests verify:
//! - Fixed key sizes for fixed field types
//! - Byte order of encoded keys matches field order
//! - Descending and boolean encodings
//! - Namespace separation between index and value keys
//! - Rejection of components that would break key boundaries

use std::cmp::Ordering;

use ordkv::keys::{value_key, value_prefix, Field, IndexField, IndexKeyBuilder, SEPARATOR};
use ordkv::order::compare;
use ordkv::OrdKvError;

// =============================================================================
// Helper Functions
// =============================================================================

fn created_at_query(value: i64) -> Vec<u8> {
    IndexKeyBuilder::new(b"messages")
        .field(b"local_id", "localId1")
        .field(b"created_at", value)
        .build_query()
        .unwrap()
        .to_vec()
}

const MAGNITUDES: [i64; 8] = [2, 10, 100, 210, 1000, 10000, 100000, 10000000];

// =============================================================================
// Size Stability Tests
// =============================================================================

#[test]
fn test_different_ints_have_same_size() {
    let base = created_at_query(1);
    for value in MAGNITUDES {
        assert_eq!(base.len(), created_at_query(value).len(), "value {}", value);
    }
}

#[test]
fn test_index_keys_same_size_for_same_field_types() {
    let key = |t: i64| {
        IndexKeyBuilder::new(b"messages")
            .field(b"created_at", t)
            .field(b"pinned", t % 2 == 0)
            .build_index(b"id-1")
            .unwrap()
    };
    assert_eq!(key(10).len(), key(10000).len());
    assert_eq!(key(10).len(), key(10000000).len());
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_greater_value_has_greater_index() {
    let base = created_at_query(1);
    for value in MAGNITUDES {
        assert_eq!(compare(&base, &created_at_query(value)), Ordering::Less);
    }
}

#[test]
fn test_smaller_value_has_smaller_index() {
    let base = created_at_query(10000001);
    for value in MAGNITUDES {
        assert_eq!(compare(&base, &created_at_query(value)), Ordering::Greater);
    }
}

#[test]
fn test_equal_fields_give_equal_keys() {
    let a = IndexKeyBuilder::new(b"messages").field(b"created_at", 1i64).build_query().unwrap();
    let b = IndexKeyBuilder::new(b"messages").field(b"created_at", 1i64).build_query().unwrap();
    assert_eq!(compare(&a, &b), Ordering::Equal);
}

#[test]
fn test_descending_field_reverses_order() {
    let key = |t: i64| {
        IndexKeyBuilder::new(b"messages")
            .field(b"created_at", Field::descending(t))
            .build_query()
            .unwrap()
    };
    assert_eq!(compare(&key(5), &key(6)), Ordering::Greater);
    assert_eq!(compare(&key(0), &key(i64::MAX)), Ordering::Greater);
}

#[test]
fn test_true_sorts_before_false() {
    let key = |b: bool| {
        IndexKeyBuilder::new(b"messages")
            .field(b"read", b)
            .build_query()
            .unwrap()
    };
    assert_eq!(compare(&key(true), &key(false)), Ordering::Less);
}

#[test]
fn test_id_breaks_ties() {
    let key = |id: &[u8]| {
        IndexKeyBuilder::new(b"messages")
            .field(b"created_at", 7i64)
            .build_index(id)
            .unwrap()
    };
    assert_eq!(compare(&key(b"a"), &key(b"b")), Ordering::Less);
}

#[test]
fn test_sort_field_dominates_id() {
    let early = IndexKeyBuilder::new(b"m")
        .field(b"t", 1i64)
        .build_index(b"zzz")
        .unwrap();
    let late = IndexKeyBuilder::new(b"m")
        .field(b"t", 2i64)
        .build_index(b"aaa")
        .unwrap();
    assert_eq!(compare(&early, &late), Ordering::Less);
}

// =============================================================================
// Prefix and Namespace Tests
// =============================================================================

#[test]
fn test_query_is_prefix_of_full_index() {
    let query = IndexKeyBuilder::new(b"message")
        .field(b"conversation", "c2")
        .build_query()
        .unwrap();
    let full = IndexKeyBuilder::new(b"message")
        .field(b"conversation", "c2")
        .field(b"created_at", 123i64)
        .build_index(b"m1")
        .unwrap();
    assert!(full.starts_with(&query));
}

#[test]
fn test_group_prefix_does_not_match_longer_group() {
    let c2 = IndexKeyBuilder::new(b"message")
        .field(b"conversation", "c2")
        .build_query()
        .unwrap();
    let c22 = IndexKeyBuilder::new(b"message")
        .field(b"conversation", "c22")
        .field(b"created_at", 1i64)
        .build_index(b"m1")
        .unwrap();
    assert!(!c22.starts_with(&c2));
}

#[test]
fn test_fields_from_slice_match_chained_fields() {
    let fields = vec![
        IndexField::new(b"conversation", "c1"),
        IndexField::new(b"created_at", 99i64),
    ];
    let from_slice = IndexKeyBuilder::new(b"message")
        .fields(&fields)
        .build_index(b"x")
        .unwrap();
    let chained = IndexKeyBuilder::new(b"message")
        .field(b"conversation", "c1")
        .field(b"created_at", 99i64)
        .build_index(b"x")
        .unwrap();
    assert_eq!(from_slice, chained);
}

#[test]
fn test_index_and_value_namespaces_disjoint() {
    let value = value_key(b"message", b"m1").unwrap();
    let index = IndexKeyBuilder::new(b"message").build_index(b"m1").unwrap();
    assert_ne!(value, index);
    assert!(value.starts_with(b"value\x06"));
    assert!(index.starts_with(b"index\x06"));
    assert!(value.starts_with(&value_prefix(b"message").unwrap()));
}

#[test]
fn test_value_key_bit_exact() {
    let key = value_key(b"message", b"abc").unwrap();
    assert_eq!(&key[..], b"value\x06message\x06abc\x06");
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_negative_int_rejected() {
    let err = IndexKeyBuilder::new(b"m")
        .field(b"t", -1i64)
        .build_query()
        .unwrap_err();
    assert!(matches!(err, OrdKvError::InvalidArgument(_)));
}

#[test]
fn test_negative_descending_rejected() {
    let err = IndexKeyBuilder::new(b"m")
        .field(b"t", Field::descending(-1))
        .build_query()
        .unwrap_err();
    assert!(matches!(err, OrdKvError::InvalidArgument(_)));
}

#[test]
fn test_separator_in_components_rejected() {
    let sep = [b'a', SEPARATOR, b'b'];
    assert!(IndexKeyBuilder::new(&sep).build_query().is_err());
    assert!(IndexKeyBuilder::new(b"m").field(&sep, 1i64).build_query().is_err());
    assert!(IndexKeyBuilder::new(b"m").field(b"f", &sep[..]).build_query().is_err());
    assert!(IndexKeyBuilder::new(b"m").build_index(&sep).is_err());
    assert!(value_key(b"m", &sep).is_err());
    assert!(value_key(&sep, b"id").is_err());
}

#[test]
fn test_bytes_below_separator_rejected() {
    for low in 0..SEPARATOR {
        let value = [b'a', b'b', low];
        assert!(IndexKeyBuilder::new(b"m").field(b"f", &value[..]).build_query().is_err());
        assert!(IndexKeyBuilder::new(b"m").build_index(&value).is_err());
        assert!(value_key(b"m", &value).is_err());
    }
}

#[test]
fn test_extended_bytes_sort_after_prefix() {
    let key = |value: &[u8], id: &[u8]| {
        IndexKeyBuilder::new(b"m")
            .field(b"f", value)
            .build_index(id)
            .unwrap()
    };
    assert_eq!(compare(&key(b"ab", b"x"), &key(b"ab\x07", b"x")), Ordering::Less);
    assert_eq!(compare(&key(b"v", b"a"), &key(b"v", b"a\x07")), Ordering::Less);
    assert_eq!(compare(&key(b"v", b"a"), &key(b"v", b"aa")), Ordering::Less);
}

#[test]
fn test_int_containing_separator_byte_is_fine() {
    // 6 encodes with a trailing 0x06 byte; fixed width keeps it unambiguous
    let key = IndexKeyBuilder::new(b"m")
        .field(b"t", 6i64)
        .build_index(b"id")
        .unwrap();
    let prefix = IndexKeyBuilder::new(b"m").field(b"t", 6i64).build_query().unwrap();
    assert!(key.starts_with(&prefix));
}
