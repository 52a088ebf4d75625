use crate::sourcemap::FileId;
use srcup_core::abi::AbiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Various error types
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A source map entry references a file id that the remapping does not cover.
    ///
    /// This means the file table and the source map disagree, the input is corrupt.
    #[error("file id {0} referenced by the source map has no remapping")]
    UnmappedFileId(FileId),
    #[error("invalid runtime bytecode: {0}")]
    InvalidBytecode(String),
    #[error("invalid source unit ast: {0}")]
    InvalidAst(String),
    #[error(transparent)]
    Abi(#[from] AbiError),
    /// Deserialization error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    /// General purpose message
    #[error("{0}")]
    Message(String),
}

impl ExtractError {
    pub(crate) fn bytecode(msg: impl Into<String>) -> Self {
        ExtractError::InvalidBytecode(msg.into())
    }

    pub(crate) fn ast(msg: impl Into<String>) -> Self {
        ExtractError::InvalidAst(msg.into())
    }

    /// Whether this error must abort the whole extraction instead of skipping one contract.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractError::UnmappedFileId(_))
    }
}
