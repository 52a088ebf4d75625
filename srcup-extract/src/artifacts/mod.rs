//! Compiler output as handed over by the compiler driver

use crate::{
    error::{ExtractError, Result},
    sourcemap::{FileId, RawSourceMap},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map, BTreeMap},
    path::PathBuf,
};

mod bytecode;
pub use bytecode::BytecodeObject;

/// The language a compilation unit was written in
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Solidity,
    Vyper,
}

/// A source file of a compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// The global id of this file within its compilation unit
    pub id: FileId,
    /// Path relative to the project root, as displayed to users
    pub path: String,
    pub absolute_path: PathBuf,
    /// Full text of the file
    pub content: String,
}

impl SourceFile {
    /// Creates the file from its compiler ast, which carries the file's global id.
    pub fn from_ast(
        ast: &serde_json::Value,
        language: Language,
        path: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Result<Self> {
        Ok(SourceFile {
            id: file_id_from_ast(ast, language)?,
            path: path.into(),
            absolute_path: absolute_path.into(),
            content: content.into(),
        })
    }
}

/// Returns the global file id recorded in a source unit's ast.
///
/// Solidity stores it in the third field of the root node's `src`, Vyper in the `src` of the
/// first body node. The Vyper ast may be wrapped in an object with an `ast` key.
pub fn file_id_from_ast(ast: &serde_json::Value, language: Language) -> Result<FileId> {
    let src = match language {
        Language::Solidity => ast.get("src"),
        Language::Vyper => ast.pointer("/ast/body/0/src").or_else(|| ast.pointer("/body/0/src")),
    }
    .and_then(serde_json::Value::as_str)
    .ok_or_else(|| ExtractError::ast(format!("{language} ast has no `src` location")))?;

    src.split(':')
        .nth(2)
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| ExtractError::ast(format!("no file id in src location `{src}`")))
}

/// A source unit's ast together with the file it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAst {
    pub ast: serde_json::Value,
    #[serde(default)]
    pub language: Language,
    pub path: String,
    pub absolute_path: PathBuf,
    pub content: String,
}

/// The files of a compilation unit, keyed by their global id.
///
/// Serialized as a list of [`SourceFile`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SourceFile>", into = "Vec<SourceFile>")]
pub struct FileTable(BTreeMap<FileId, SourceFile>);

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from source unit asts, deriving every file id from its ast.
    pub fn from_sources<I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = SourceAst>,
    {
        let mut table = FileTable::new();
        for SourceAst { ast, language, path, absolute_path, content } in sources {
            table.insert(SourceFile::from_ast(&ast, language, path, absolute_path, content)?);
        }
        Ok(table)
    }

    /// Inserts the file, replacing any file with the same id
    pub fn insert(&mut self, file: SourceFile) -> Option<SourceFile> {
        let previous = self.0.insert(file.id, file);
        if let Some(ref previous) = previous {
            tracing::warn!(
                file_id = %previous.id,
                path = %previous.path,
                "replacing file with duplicate id"
            );
        }
        previous
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.0.get(&id)
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all files in ascending id order
    pub fn files(&self) -> btree_map::Values<'_, FileId, SourceFile> {
        self.0.values()
    }
}

impl FromIterator<SourceFile> for FileTable {
    fn from_iter<T: IntoIterator<Item = SourceFile>>(iter: T) -> Self {
        let mut table = FileTable::new();
        for file in iter {
            table.insert(file);
        }
        table
    }
}

impl From<Vec<SourceFile>> for FileTable {
    fn from(files: Vec<SourceFile>) -> Self {
        files.into_iter().collect()
    }
}

impl From<FileTable> for Vec<SourceFile> {
    fn from(table: FileTable) -> Self {
        table.0.into_values().collect()
    }
}

/// A compiled contract
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledContract {
    /// Contract name, without the `<path>:` qualifier
    pub name: String,
    /// Runtime bytecode, empty for interfaces and abstract contracts
    #[serde(default)]
    pub runtime_bytecode: BytecodeObject,
    /// Runtime source map
    #[serde(default)]
    pub source_map: RawSourceMap,
    /// The abi json exactly as the compiler emitted it
    #[serde(default = "empty_abi")]
    pub abi: serde_json::Value,
    /// Fully qualified names of the libraries the runtime bytecode links against
    #[serde(default)]
    pub libraries: Vec<String>,
}

fn empty_abi() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

/// A source file together with the contracts it declares, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    pub path: String,
    pub absolute_path: PathBuf,
    #[serde(default)]
    pub contracts: Vec<CompiledContract>,
}

/// A set of sources compiled together, which share one file numbering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub files: FileTable,
    #[serde(default)]
    pub units: Vec<SourceUnit>,
}

impl CompilationUnit {
    /// Iterates over every contract of every unit, in document order
    pub fn contracts(&self) -> impl Iterator<Item = (&SourceUnit, &CompiledContract)> + '_ {
        self.units.iter().flat_map(|unit| unit.contracts.iter().map(move |c| (unit, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn can_read_solidity_file_id() {
        let ast = json!({"nodeType": "SourceUnit", "src": "0:1423:4", "nodes": []});
        assert_eq!(file_id_from_ast(&ast, Language::Solidity).unwrap(), FileId(4));
    }

    #[test]
    fn can_read_vyper_file_id() {
        let ast = json!({"ast": {"ast_type": "Module", "src": "0:900:0", "body": [
            {"ast_type": "VariableDecl", "src": "12:40:2"}
        ]}});
        assert_eq!(file_id_from_ast(&ast, Language::Vyper).unwrap(), FileId(2));
        assert_eq!(file_id_from_ast(&ast["ast"], Language::Vyper).unwrap(), FileId(2));
    }

    #[test]
    fn rejects_ast_without_file_id() {
        let err = file_id_from_ast(&json!({"src": "0:10"}), Language::Solidity).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidAst(_)));
        let err = file_id_from_ast(&json!({"body": []}), Language::Vyper).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidAst(_)));
    }

    #[test]
    fn can_build_table_from_asts() {
        let table = FileTable::from_sources([
            SourceAst {
                ast: json!({"src": "0:10:1"}),
                language: Language::Solidity,
                path: "contracts/B.sol".to_string(),
                absolute_path: "/project/contracts/B.sol".into(),
                content: "contract B {}".to_string(),
            },
            SourceAst {
                ast: json!({"src": "0:12:0"}),
                language: Language::Solidity,
                path: "contracts/A.sol".to_string(),
                absolute_path: "/project/contracts/A.sol".into(),
                content: "contract A {}".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(FileId(0)).unwrap().path, "contracts/A.sol");
        assert!(table.contains(FileId(1)));
        assert!(!table.contains(FileId(2)));
        assert_eq!(
            table.files().map(|f| f.id).collect::<Vec<_>>(),
            vec![FileId(0), FileId(1)]
        );
    }

    #[test]
    fn can_deserialize_compilation_unit() {
        let unit: CompilationUnit = serde_json::from_value(json!({
            "files": [
                {"id": "0", "path": "src/Token.sol", "absolutePath": "/p/src/Token.sol", "content": "..."}
            ],
            "units": [{
                "path": "src/Token.sol",
                "absolutePath": "/p/src/Token.sol",
                "contracts": [
                    {"name": "IToken", "runtimeBytecode": ""},
                    {"name": "Token", "runtimeBytecode": "0x6080", "sourceMap": "0:10:0", "abi": []}
                ]
            }]
        }))
        .unwrap();
        assert_eq!(unit.files.len(), 1);
        let contracts = unit.contracts().map(|(_, c)| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(contracts, vec!["IToken", "Token"]);
        assert!(unit.units[0].contracts[0].runtime_bytecode.is_empty());
        assert_eq!(unit.units[0].contracts[0].abi, json!([]));
        assert_eq!(unit.units[0].contracts[1].source_map, RawSourceMap::from("0:10:0"));
    }

    #[test]
    fn language_names() {
        assert_eq!(Language::Vyper.to_string(), "vyper");
        assert_eq!("solidity".parse::<Language>().unwrap(), Language::Solidity);
    }
}
