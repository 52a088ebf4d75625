//! Hashing helpers used to derive selectors and bytecode fingerprints.

use crate::types::{Md5Digest, Selector, B256};
use ::md5::{Digest, Md5};
use tiny_keccak::{Hasher, Keccak};

/// Compute the Keccak-256 hash of input bytes.
///
/// Note that strings are interpreted as UTF-8 bytes,
pub fn keccak256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    let mut output = [0u8; 32];

    let mut hasher = Keccak::v256();
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut output);

    output
}

/// Calculate the function selector as per the contract ABI specification. This
/// is defined as the first 4 bytes of the Keccak256 hash of the function
/// signature.
pub fn id<S: AsRef<str>>(signature: S) -> Selector {
    let mut output = [0u8; 4];

    let mut hasher = Keccak::v256();
    hasher.update(signature.as_ref().as_bytes());
    hasher.finalize(&mut output);

    Selector::new(output)
}

/// The event topic of a signature: the full Keccak256 hash.
pub fn topic<S: AsRef<str>>(signature: S) -> B256 {
    B256::new(keccak256(signature.as_ref().as_bytes()))
}

/// MD5 digest of the input, used as the content fingerprint of bytecode.
pub fn md5<T: AsRef<[u8]>>(bytes: T) -> Md5Digest {
    let mut output = [0u8; 16];

    let mut hasher = Md5::new();
    hasher.update(bytes.as_ref());
    output.copy_from_slice(&hasher.finalize());

    Md5Digest::new(output)
}
