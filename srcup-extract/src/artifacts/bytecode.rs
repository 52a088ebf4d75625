//! Runtime bytecode that may still contain library placeholders

use crate::{
    error::{ExtractError, Result},
    utils::{hashed_placeholder, legacy_placeholder, PLACEHOLDER_LEN, RE_LIBRARY_PLACEHOLDER},
};
use serde::{Deserialize, Deserializer, Serialize};
use srcup_core::types::Bytes;

/// Represents the bytecode of a contract that might be not fully linked yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BytecodeObject {
    /// Fully linked bytecode object
    Bytecode(Bytes),
    /// Bytecode as hex string that's not fully linked yet and contains library placeholders
    Unlinked(String),
}

impl BytecodeObject {
    /// Returns the underlying `Bytes` if the object is a valid bytecode, and not empty
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            BytecodeObject::Bytecode(bytes) => Some(bytes),
            BytecodeObject::Unlinked(_) => None,
        }
    }

    /// Returns a reference to the underlying `Bytes` if the object is a valid bytecode
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            BytecodeObject::Bytecode(bytes) => Some(bytes),
            BytecodeObject::Unlinked(_) => None,
        }
    }

    /// Returns the number of bytes of the fully linked bytecode
    ///
    /// Returns `0` if this object is unlinked.
    pub fn bytes_len(&self) -> usize {
        self.as_bytes().map(|b| b.len()).unwrap_or_default()
    }

    /// Returns true if this object is empty, i.e. the contract has no deployed code
    pub fn is_empty(&self) -> bool {
        match self {
            BytecodeObject::Bytecode(bytes) => bytes.is_empty(),
            BytecodeObject::Unlinked(s) => s.is_empty(),
        }
    }

    /// Returns true if the bytecode still contains placeholders
    pub fn is_unlinked(&self) -> bool {
        matches!(self, BytecodeObject::Unlinked(_))
    }

    /// Whether the bytecode contains a matching placeholder for the library in `file`
    pub fn contains_placeholder(&self, file: &str, library: &str) -> bool {
        self.contains_fully_qualified_placeholder(&format!("{file}:{library}"))
    }

    /// Whether the bytecode contains a legacy or hashed placeholder for the given name
    pub fn contains_fully_qualified_placeholder(&self, name: &str) -> bool {
        match self {
            BytecodeObject::Unlinked(unlinked) => {
                unlinked.contains(&legacy_placeholder(name)) ||
                    unlinked.contains(&hashed_placeholder(name))
            }
            BytecodeObject::Bytecode(_) => false,
        }
    }

    /// Links the library `file:library` against the given address
    pub fn link(&mut self, file: &str, library: &str, address: [u8; 20]) -> &mut Self {
        self.link_fully_qualified(&format!("{file}:{library}"), address)
    }

    /// Replaces both placeholder forms of `name` with `address`.
    ///
    /// This is a noop if the bytecode is already linked.
    pub fn link_fully_qualified(&mut self, name: &str, address: [u8; 20]) -> &mut Self {
        if let BytecodeObject::Unlinked(unlinked) = self {
            let address = hex::encode(address);
            *unlinked = unlinked
                .replace(&legacy_placeholder(name), &address)
                .replace(&hashed_placeholder(name), &address);
        }
        self
    }

    /// Links every library in `libraries` to the zero address, then zeroes whatever
    /// placeholder is left.
    pub fn link_zeroed<I, S>(&mut self, libraries: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for library in libraries {
            self.link_fully_qualified(library.as_ref(), [0u8; 20]);
        }
        if let BytecodeObject::Unlinked(unlinked) = self {
            if RE_LIBRARY_PLACEHOLDER.is_match(unlinked) {
                tracing::warn!("zeroing library placeholders not covered by the library list");
                *unlinked = RE_LIBRARY_PLACEHOLDER
                    .replace_all(unlinked, "0".repeat(PLACEHOLDER_LEN).as_str())
                    .into_owned();
            }
        }
        self
    }

    /// Tries to resolve the unlinked string object into a valid bytecode object in place
    ///
    /// Returns the `Bytes` if successful
    pub fn resolve(&mut self) -> Option<&Bytes> {
        if let BytecodeObject::Unlinked(unlinked) = self {
            if let Ok(bytes) = unlinked.parse::<Bytes>() {
                *self = BytecodeObject::Bytecode(bytes);
            }
        }
        self.as_bytes()
    }

    /// Links all libraries to the zero address and returns the resulting bytes.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidBytecode`] if the result is still not valid hex.
    pub fn into_zero_linked_bytes<I, S>(mut self, libraries: I) -> Result<Bytes>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.link_zeroed(libraries).resolve();
        match self {
            BytecodeObject::Bytecode(bytes) => Ok(bytes),
            BytecodeObject::Unlinked(unlinked) => {
                let preview: String = unlinked.chars().take(16).collect();
                Err(ExtractError::bytecode(format!("not valid hex after linking: {preview}...")))
            }
        }
    }
}

impl From<String> for BytecodeObject {
    fn from(s: String) -> Self {
        match s.parse::<Bytes>() {
            Ok(bytes) => BytecodeObject::Bytecode(bytes),
            Err(_) => BytecodeObject::Unlinked(s),
        }
    }
}

impl From<&str> for BytecodeObject {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

impl From<Bytes> for BytecodeObject {
    fn from(bytes: Bytes) -> Self {
        BytecodeObject::Bytecode(bytes)
    }
}

// Returns an empty bytecode object
impl Default for BytecodeObject {
    fn default() -> Self {
        BytecodeObject::Bytecode(Default::default())
    }
}

/// `null` is treated like an empty string, vyper emits it for interfaces.
impl<'de> Deserialize<'de> for BytecodeObject {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map(Into::into).unwrap_or_default())
    }
}

impl AsRef<[u8]> for BytecodeObject {
    fn as_ref(&self) -> &[u8] {
        match self {
            BytecodeObject::Bytecode(code) => code.as_ref(),
            BytecodeObject::Unlinked(code) => code.as_bytes(),
        }
    }
}
