//! Byte containers used throughout the upload records.

mod bytes;
pub use self::bytes::{
    deserialize_bytes, serialize_bytes, strip_hex_prefix, Bytes, FixedBytes, Md5Digest,
    ParseBytesError, Selector, B256,
};
