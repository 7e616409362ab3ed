//! Key layout for the key-value variant
//!
//! - item: `data:<namespace>:<generation>:<relative path>`
//! - lock: `lock:<namespace>:<generation>`
//!
//! Namespaces never contain `:`, so the first three separators are
//! unambiguous and the path keeps any `:` of its own.

use valpop_core::{GenerationId, Namespace, RelativePath, ValpopError};

pub const DATA_PREFIX: &str = "data";
pub const LOCK_PREFIX: &str = "lock";
const SEP: char = ':';

pub fn data_key(namespace: &Namespace, generation: GenerationId, path: &RelativePath) -> String {
    format!("{DATA_PREFIX}{SEP}{namespace}{SEP}{generation}{SEP}{path}")
}

/// Prefix of every item key in `namespace`.
pub fn data_prefix(namespace: &Namespace) -> String {
    format!("{DATA_PREFIX}{SEP}{namespace}{SEP}")
}

/// Prefix of every item key of one generation.
pub fn data_generation_prefix(namespace: &Namespace, generation: GenerationId) -> String {
    format!("{DATA_PREFIX}{SEP}{namespace}{SEP}{generation}{SEP}")
}

pub fn lock_key(namespace: &Namespace, generation: GenerationId) -> String {
    format!("{LOCK_PREFIX}{SEP}{namespace}{SEP}{generation}")
}

pub fn lock_prefix(namespace: &Namespace) -> String {
    format!("{LOCK_PREFIX}{SEP}{namespace}{SEP}")
}

fn malformed(key: &str, reason: &str) -> ValpopError {
    ValpopError::MalformedKey {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub fn parse_data_key(key: &str) -> Result<(Namespace, GenerationId, RelativePath), ValpopError> {
    let mut parts = key.splitn(4, SEP);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(DATA_PREFIX), Some(namespace), Some(generation), Some(path)) => Ok((
            Namespace::new(namespace)?,
            generation.parse()?,
            RelativePath::new(path)?,
        )),
        (Some(DATA_PREFIX), ..) => Err(malformed(key, "expected data:<namespace>:<generation>:<path>")),
        _ => Err(malformed(key, "not an item key")),
    }
}

pub fn parse_lock_key(key: &str) -> Result<(Namespace, GenerationId), ValpopError> {
    let mut parts = key.splitn(3, SEP);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(LOCK_PREFIX), Some(namespace), Some(generation)) => {
            Ok((Namespace::new(namespace)?, generation.parse()?))
        }
        (Some(LOCK_PREFIX), ..) => Err(malformed(key, "expected lock:<namespace>:<generation>")),
        _ => Err(malformed(key, "not a lock key")),
    }
}
