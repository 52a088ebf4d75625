//! Auxiliary per-contract fields read from Hardhat style build-info files

use crate::{artifacts::SourceUnit, error::Result, utils::contract_name};
use serde::Deserialize;
use std::collections::{btree_map, BTreeMap};

/// Opaque auxiliary data of a single contract, passed through to the output records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractExtras {
    /// `evm.deployedBytecode.immutableReferences`
    pub immutable_references: Option<serde_json::Value>,
    /// `evm.deployedBytecode.functionDebugData`
    pub debug_info: Option<serde_json::Value>,
    /// `irOptimizedAst`, or `irOptimized` if the compiler didn't emit the ast
    pub ir: Option<serde_json::Value>,
}

/// The auxiliary fields of all contracts in a set of build-info files, keyed by source path and
/// contract name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields(BTreeMap<String, BTreeMap<String, ContractExtras>>);

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the `output.contracts` section of a build-info json
    pub fn from_build_info(build_info: &serde_json::Value) -> Result<Self> {
        let build_info = BuildInfo::deserialize(build_info)?;
        Ok(build_info.into())
    }

    pub fn from_build_info_str(build_info: &str) -> Result<Self> {
        let build_info: BuildInfo = serde_json::from_str(build_info)?;
        Ok(build_info.into())
    }

    /// Merges `other` into `self`.
    ///
    /// A source file present in both is replaced as a whole, so build-info files must be merged
    /// oldest first.
    pub fn extend(&mut self, other: ExtraFields) {
        self.0.extend(other.0);
    }

    pub fn insert(
        &mut self,
        path: impl Into<String>,
        contract: impl Into<String>,
        extras: ContractExtras,
    ) -> Option<ContractExtras> {
        self.0.entry(path.into()).or_default().insert(contract.into(), extras)
    }

    pub fn get(&self, path: &str, contract: &str) -> Option<&ContractExtras> {
        self.0.get(path)?.get(contract)
    }

    /// Looks up a contract of `unit` by its short path, then by its absolute path
    pub fn lookup(&self, unit: &SourceUnit, contract: &str) -> Option<&ContractExtras> {
        self.get(&unit.path, contract)
            .or_else(|| self.get(&unit.absolute_path.to_string_lossy(), contract))
    }

    /// Number of source files
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn files(&self) -> btree_map::Keys<'_, String, BTreeMap<String, ContractExtras>> {
        self.0.keys()
    }
}

impl FromIterator<ExtraFields> for ExtraFields {
    fn from_iter<T: IntoIterator<Item = ExtraFields>>(iter: T) -> Self {
        let mut fields = ExtraFields::new();
        for other in iter {
            fields.extend(other);
        }
        fields
    }
}

#[derive(Deserialize)]
struct BuildInfo {
    output: BuildInfoOutput,
}

#[derive(Deserialize)]
struct BuildInfoOutput {
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, BuildInfoContract>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfoContract {
    #[serde(default)]
    evm: Option<Evm>,
    #[serde(default)]
    ir_optimized: Option<String>,
    #[serde(default)]
    ir_optimized_ast: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Evm {
    #[serde(default)]
    deployed_bytecode: Option<DeployedBytecode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployedBytecode {
    #[serde(default)]
    immutable_references: Option<serde_json::Value>,
    #[serde(default)]
    function_debug_data: Option<serde_json::Value>,
}

impl From<BuildInfoContract> for ContractExtras {
    fn from(contract: BuildInfoContract) -> Self {
        let BuildInfoContract { evm, ir_optimized, ir_optimized_ast } = contract;
        let deployed = evm.and_then(|evm| evm.deployed_bytecode);
        let (immutable_references, debug_info) = match deployed {
            Some(d) => (d.immutable_references, d.function_debug_data),
            None => (None, None),
        };
        let ir = ir_optimized_ast
            .filter(|ast| !ast.is_null())
            .or_else(|| ir_optimized.filter(|ir| !ir.is_empty()).map(serde_json::Value::String));
        ContractExtras { immutable_references, debug_info, ir }
    }
}

impl From<BuildInfo> for ExtraFields {
    fn from(build_info: BuildInfo) -> Self {
        let mut fields = ExtraFields::new();
        for (path, contracts) in build_info.output.contracts {
            let entry = fields.0.entry(path).or_default();
            for (name, contract) in contracts {
                entry.insert(contract_name(&name).to_string(), contract.into());
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build_info(ir: serde_json::Value) -> serde_json::Value {
        json!({
            "_format": "hh-sol-build-info-1",
            "solcVersion": "0.8.17",
            "output": {
                "sources": {"contracts/Token.sol": {"id": 0}},
                "contracts": {
                    "contracts/Token.sol": {
                        "Token": {
                            "abi": [],
                            "evm": {"deployedBytecode": {
                                "object": "6080",
                                "immutableReferences": {"41": [{"length": 32, "start": 120}]},
                                "functionDebugData": {"@_12": {"entryPoint": null, "id": 12}}
                            }},
                            "irOptimized": "object \"Token\" {}",
                            "irOptimizedAst": ir
                        },
                        "contracts/Token.sol:IToken": {"abi": []}
                    }
                }
            }
        })
    }

    #[test]
    fn can_read_build_info() {
        let fields = ExtraFields::from_build_info(&build_info(json!({"nodeType": "YulObject"})))
            .unwrap();
        assert_eq!(fields.len(), 1);

        let token = fields.get("contracts/Token.sol", "Token").unwrap();
        assert_eq!(
            token.immutable_references,
            Some(json!({"41": [{"length": 32, "start": 120}]}))
        );
        assert!(token.debug_info.is_some());
        assert_eq!(token.ir, Some(json!({"nodeType": "YulObject"})));

        let itoken = fields.get("contracts/Token.sol", "IToken").unwrap();
        assert_eq!(itoken, &ContractExtras::default());
    }

    #[test]
    fn falls_back_to_ir_text() {
        let fields = ExtraFields::from_build_info(&build_info(json!(null))).unwrap();
        let token = fields.get("contracts/Token.sol", "Token").unwrap();
        assert_eq!(token.ir, Some(json!("object \"Token\" {}")));
    }

    #[test]
    fn later_build_info_wins() {
        let mut fields = ExtraFields::from_build_info(&build_info(json!(null))).unwrap();
        let newer = ExtraFields::from_build_info_str(
            r#"{"output": {"contracts": {"contracts/Token.sol": {"Token": {}}}}}"#,
        )
        .unwrap();
        fields.extend(newer);
        assert_eq!(fields.get("contracts/Token.sol", "Token"), Some(&ContractExtras::default()));
        assert!(fields.get("contracts/Token.sol", "IToken").is_none());
    }

    #[test]
    fn output_without_contracts() {
        let fields = ExtraFields::from_build_info_str(r#"{"output": {"errors": []}}"#).unwrap();
        assert!(fields.is_empty());
        assert!(ExtraFields::from_build_info_str(r#"{"input": {}}"#).is_err());
    }
}
