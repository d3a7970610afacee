use bytes::Bytes;
use serde::Serializer;

/// Serializes [`Bytes`] as a utf8 string so keys and values stay readable in error payloads.
/// Invalid utf8 sequences are replaced instead of failing the whole serialization.
pub fn serialize<S: Serializer>(v: &Bytes, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(v))
}
