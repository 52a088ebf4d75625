//! Assembly of the per contract upload records

use crate::{
    artifacts::{CompilationUnit, CompiledContract, FileTable, SourceUnit},
    buildinfo::{ContractExtras, ExtraFields},
    config::ExtractorConfig,
    error::Result,
    remap::FileRemapping,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use srcup_core::{
    abi::Selectors,
    types::{Bytes, Md5Digest, Selector, B256},
    utils,
};
use std::collections::HashSet;

/// Everything the source registry stores about one deployed contract.
///
/// `array_source_names[i]` and `array_source_level[i]` describe the file with local id `i` in
/// `source_map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSource {
    pub md5_bytecode: Md5Digest,
    pub contract_name: String,
    pub contract_path: String,
    pub array_source_names: Vec<String>,
    pub array_source_level: Vec<String>,
    pub source_map: String,
    pub json_abi: serde_json::Value,
    pub array_function_selectors: Vec<Selector>,
    pub array_event_selectors: Vec<B256>,
    pub array_error_selectors: Vec<Selector>,
    pub immutable_references: Option<serde_json::Value>,
    pub debug_info: Option<serde_json::Value>,
}

/// The runtime bytecode of a contract, keyed by its md5 fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractBytecode {
    pub md5_bytecode: Md5Digest,
    /// keccak-256 of `bytecode`
    pub codehash: B256,
    pub bytecode: Bytes,
    pub origin: String,
}

/// Optimized Yul IR of a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YulIrCode {
    pub md5_bytecode: Md5Digest,
    pub codehash: B256,
    /// The IR ast as json text, or the IR source if no ast was available
    pub yul_ast: String,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContract {
    pub source: ContractSource,
    pub bytecode: ContractBytecode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ir_code: Option<YulIrCode>,
}

/// A contract left out of the bundle because its compiler output was unusable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedContract {
    pub contract_path: String,
    pub contract_name: String,
    pub reason: String,
}

/// The records of all contracts with runtime code, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub contracts: Vec<ExtractedContract>,
    #[serde(default)]
    pub skipped: Vec<SkippedContract>,
}

impl Bundle {
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = &ContractSource> + '_ {
        self.contracts.iter().map(|c| &c.source)
    }

    pub fn bytecodes(&self) -> impl Iterator<Item = &ContractBytecode> + '_ {
        self.contracts.iter().map(|c| &c.bytecode)
    }

    /// Returns one bytecode record per distinct fingerprint, first occurrence first
    pub fn unique_bytecodes(&self) -> Vec<&ContractBytecode> {
        let mut seen = HashSet::new();
        self.bytecodes().filter(|code| seen.insert(code.md5_bytecode)).collect()
    }

    pub fn ir_codes(&self) -> impl Iterator<Item = &YulIrCode> + '_ {
        self.contracts.iter().filter_map(|c| c.ir_code.as_ref())
    }

    /// Appends the records of `other`
    pub fn extend(&mut self, other: Bundle) {
        self.contracts.extend(other.contracts);
        self.skipped.extend(other.skipped);
    }
}

/// Turns compilation units into a [`Bundle`]
///
/// ```
/// use srcup_extract::{BundleBuilder, CompilationUnit, ExtractorConfig};
///
/// let bundle = BundleBuilder::new(ExtractorConfig::default())
///     .build(&[CompilationUnit::default()])
///     .unwrap();
/// assert!(bundle.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BundleBuilder {
    config: ExtractorConfig,
    extras: ExtraFields,
}

impl BundleBuilder {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config, extras: ExtraFields::default() }
    }

    /// Sets the auxiliary fields to attach to the records
    #[must_use]
    pub fn extras(mut self, extras: ExtraFields) -> Self {
        self.extras = extras;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts all contracts of all `units`.
    ///
    /// Contracts whose bytecode or abi can't be processed are recorded in [`Bundle::skipped`].
    ///
    /// # Errors
    ///
    /// Only if a unit's source maps and file table are inconsistent, see
    /// [`ExtractError::is_fatal`](crate::ExtractError::is_fatal).
    #[tracing::instrument(skip_all, name = "bundle::build", fields(units = units.len()))]
    pub fn build(&self, units: &[CompilationUnit]) -> Result<Bundle> {
        let mut bundle = Bundle::default();
        for unit in units {
            bundle.extend(self.build_unit(unit)?);
        }
        tracing::debug!(
            contracts = bundle.contracts.len(),
            skipped = bundle.skipped.len(),
            "built bundle"
        );
        Ok(bundle)
    }

    #[tracing::instrument(skip_all, name = "bundle::build_unit", fields(files = unit.files.len()))]
    pub fn build_unit(&self, unit: &CompilationUnit) -> Result<Bundle> {
        let contracts = unit.contracts().collect::<Vec<_>>();
        let extract = |(source_unit, contract): &(&SourceUnit, &CompiledContract)| {
            self.extract_contract(&unit.files, source_unit, contract)
        };

        // indexed collect keeps document order
        let outcomes = if self.config.parallel {
            contracts.par_iter().map(extract).collect::<Vec<_>>()
        } else {
            contracts.iter().map(extract).collect::<Vec<_>>()
        };

        let mut bundle = Bundle::default();
        for ((source_unit, contract), outcome) in contracts.iter().zip(outcomes) {
            match outcome {
                Ok(Some(extracted)) => bundle.contracts.push(extracted),
                Ok(None) => {
                    tracing::trace!(contract = %contract.name, "no runtime bytecode, skipping")
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::error!(
                        contract = %contract.name,
                        path = %source_unit.path,
                        "skipping contract: {}",
                        err
                    );
                    bundle.skipped.push(SkippedContract {
                        contract_path: source_unit.path.clone(),
                        contract_name: contract.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(bundle)
    }

    /// Builds the records of a single contract.
    ///
    /// Returns `Ok(None)` if the contract has no runtime bytecode.
    pub fn extract_contract(
        &self,
        files: &FileTable,
        unit: &SourceUnit,
        contract: &CompiledContract,
    ) -> Result<Option<ExtractedContract>> {
        if contract.runtime_bytecode.is_empty() {
            return Ok(None)
        }
        let bytecode =
            contract.runtime_bytecode.clone().into_zero_linked_bytes(&contract.libraries)?;
        if bytecode.is_empty() {
            return Ok(None)
        }

        let source_map = contract.source_map.parse();
        let remapping = FileRemapping::for_table(source_map.referenced_files(), files);
        let source_map = source_map.remap(&remapping)?;
        let sources = remapping.assigned().iter().filter_map(|id| files.get(*id));
        let (array_source_names, array_source_level): (Vec<_>, Vec<_>) =
            sources.map(|file| (file.path.clone(), file.content.clone())).unzip();

        let selectors = Selectors::from_abi(&contract.abi)?;

        let md5_bytecode = utils::md5(&bytecode);
        let codehash = B256::new(utils::keccak256(&bytecode));

        let extras = self.extras.lookup(unit, &contract.name);
        let ir_code = self.ir_code(extras, md5_bytecode, codehash)?;
        let extras = extras.cloned().unwrap_or_default();

        tracing::trace!(
            contract = %contract.name,
            path = %unit.path,
            md5 = %md5_bytecode,
            files = remapping.len(),
            "extracted contract"
        );

        let Selectors { functions, events, errors } = selectors;
        Ok(Some(ExtractedContract {
            source: ContractSource {
                md5_bytecode,
                contract_name: contract.name.clone(),
                contract_path: unit.path.clone(),
                array_source_names,
                array_source_level,
                source_map: source_map.to_string(),
                json_abi: contract.abi.clone(),
                array_function_selectors: functions,
                array_event_selectors: events,
                array_error_selectors: errors,
                immutable_references: extras
                    .immutable_references
                    .filter(|_| self.config.include_immutable_references),
                debug_info: extras.debug_info.filter(|_| self.config.include_debug_info),
            },
            bytecode: ContractBytecode {
                md5_bytecode,
                codehash,
                bytecode,
                origin: self.config.origin.clone(),
            },
            ir_code,
        }))
    }

    fn ir_code(
        &self,
        extras: Option<&ContractExtras>,
        md5_bytecode: Md5Digest,
        codehash: B256,
    ) -> Result<Option<YulIrCode>> {
        if !self.config.include_ir {
            return Ok(None)
        }
        let Some(ir) = extras.and_then(|extras| extras.ir.as_ref()) else { return Ok(None) };
        let yul_ast = match ir {
            serde_json::Value::String(ir) => ir.clone(),
            ast => serde_json::to_string(ast)?,
        };
        Ok(Some(YulIrCode { md5_bytecode, codehash, yul_ast, origin: self.config.origin.clone() }))
    }
}
