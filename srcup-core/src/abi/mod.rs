//! Contract ABI items reduced to their signatures, and the selectors derived from them.
//!
//! The raw abi json is converted with a strict recursive descent into [`AbiEntry`] values:
//! items that lack a field required for their kind are rejected instead of being coerced.

mod error;
pub use error::{AbiError, Result};

pub mod raw;
pub use raw::{Component, Item};

mod param;
pub use param::{AbiParam, TUPLE};

mod entry;
pub use entry::{entries, AbiEntry, AbiEntryKind, Selectors};
