//! Byte-order comparator
//!
//! Every key in ordkv is compared as a string of unsigned bytes: byte by
//! byte from the front, and when one key is a prefix of the other the
//! shorter one sorts first. Key encodings and store scans all rely on
//! this single ordering.

use std::cmp::Ordering;

/// Compare two keys as unsigned byte strings.
pub fn compare(left: &[u8], right: &[u8]) -> Ordering {
    for (l, r) in left.iter().zip(right.iter()) {
        match l.cmp(r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    left.len().cmp(&right.len())
}

/// True when `key` begins with `prefix`
pub fn starts_with(key: &[u8], prefix: &[u8]) -> bool {
    key.len() >= prefix.len() && key[..prefix.len()] == *prefix
}
