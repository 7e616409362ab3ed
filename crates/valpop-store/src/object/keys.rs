//! Key layout for the object-store variant
//!
//! - item: `data/<namespace>/<relative path>` (one object per path, shared
//!   across generations)
//! - manifest: `manifests/<namespace>/<generation>`

use valpop_core::{GenerationId, Namespace, RelativePath, ValpopError};

pub const DATA_ROOT: &str = "data/";
pub const MANIFEST_ROOT: &str = "manifests/";

pub fn data_key(namespace: &Namespace, path: &RelativePath) -> String {
    format!("{DATA_ROOT}{namespace}/{path}")
}

pub fn manifest_key(namespace: &Namespace, generation: GenerationId) -> String {
    format!("{MANIFEST_ROOT}{namespace}/{generation}")
}

pub fn manifest_prefix(namespace: &Namespace) -> String {
    format!("{MANIFEST_ROOT}{namespace}/")
}

pub fn parse_manifest_key(key: &str) -> Result<(Namespace, GenerationId), ValpopError> {
    let malformed = |reason: &str| ValpopError::MalformedKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let rest = key
        .strip_prefix(MANIFEST_ROOT)
        .ok_or_else(|| malformed("not a manifest key"))?;
    match rest.split_once('/') {
        Some((namespace, generation)) if !generation.contains('/') => {
            Ok((Namespace::new(namespace)?, generation.parse()?))
        }
        _ => Err(malformed("expected manifests/<namespace>/<generation>")),
    }
}
