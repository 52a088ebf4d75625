#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod artifacts;
pub use artifacts::{
    file_id_from_ast, BytecodeObject, CompilationUnit, CompiledContract, FileTable, Language,
    SourceAst, SourceFile, SourceUnit,
};

pub mod buildinfo;
pub use buildinfo::{ContractExtras, ExtraFields};

mod bundle;
pub use bundle::{
    Bundle, BundleBuilder, ContractBytecode, ContractSource, ExtractedContract, SkippedContract,
    YulIrCode,
};

mod config;
pub use config::{ExtractorConfig, ExtractorConfigBuilder, DEFAULT_ORIGIN};

pub mod error;
pub use error::{ExtractError, Result};

pub mod remap;
pub use remap::FileRemapping;

pub mod sourcemap;
pub use sourcemap::{FileId, RawSourceMap, SourceMap};

pub mod utils;
