#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(inline)]
pub use srcup_core as core;

#[doc(inline)]
pub use srcup_core::{abi, types, utils};

#[doc(inline)]
pub use srcup_extract as extract;

/// Easy imports of frequently used type definitions and traits.
#[doc(hidden)]
pub mod prelude {
    pub use super::core::{
        abi::{AbiEntry, AbiEntryKind, AbiError, AbiParam, Selectors},
        types::{Bytes, FixedBytes, Md5Digest, Selector, B256},
        utils::{id, keccak256, md5, topic},
    };

    pub use super::extract::{
        Bundle, BundleBuilder, CompilationUnit, CompiledContract, ContractBytecode,
        ContractSource, ExtraFields, ExtractError, ExtractorConfig, FileId, FileTable,
        SourceFile, SourceMap, SourceUnit, YulIrCode,
    };
}
