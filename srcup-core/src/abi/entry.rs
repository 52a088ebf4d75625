use super::{
    param::write_canonical_list,
    raw::Item,
    AbiError, AbiParam, Result,
};
use crate::{
    types::{Selector, B256},
    utils,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The abi item kinds that carry a selector
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum AbiEntryKind {
    Function,
    Event,
    Error,
}

/// A function, event or error declaration reduced to what its signature depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbiEntry {
    pub kind: AbiEntryKind,
    pub name: String,
    /// Declared inputs, in declaration order
    pub inputs: Vec<AbiParam>,
}

impl AbiEntry {
    /// Converts a raw abi item.
    ///
    /// Returns `Ok(None)` for item kinds that have no selector (`constructor`, `fallback`,
    /// `receive`, ...). A function, event or error without `name` or `inputs` is an error.
    pub fn from_item(item: &Item, position: usize) -> Result<Option<Self>> {
        let Ok(kind) = AbiEntryKind::from_str(&item.type_field) else { return Ok(None) };

        let name = item
            .name
            .clone()
            .ok_or_else(|| AbiError::MissingName { kind: kind.to_string(), position })?;
        let inputs = item
            .inputs
            .as_deref()
            .ok_or_else(|| AbiError::MissingInputs { kind: kind.to_string(), name: name.clone() })?
            .iter()
            .map(AbiParam::from_component)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Self { kind, name, inputs }))
    }

    /// Compute the signature in the standard ABI format: `name(type1,type2,..)`.
    ///
    /// Parameter names, `indexed` flags and outputs are not part of the signature.
    pub fn signature(&self) -> String {
        let mut sig = String::with_capacity(self.name.len() + 2 + self.inputs.len() * 8);
        sig.push_str(&self.name);
        sig.push('(');
        write_canonical_list(&self.inputs, &mut sig);
        sig.push(')');
        sig
    }

    /// The first 4 bytes of the keccak256 hash of the signature.
    pub fn selector(&self) -> Selector {
        utils::id(self.signature())
    }

    /// The full keccak256 hash of the signature, used as `topic0` for events.
    pub fn topic(&self) -> B256 {
        utils::topic(self.signature())
    }
}

/// Selector lists of a contract abi, each in declaration order.
///
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    pub functions: Vec<Selector>,
    pub events: Vec<B256>,
    pub errors: Vec<Selector>,
}

impl Selectors {
    /// Computes the selectors of all functions, events and errors in the abi json.
    ///
    /// Malformed items are skipped and don't affect the remaining ones.
    pub fn from_abi(abi: &serde_json::Value) -> Result<Self> {
        let mut selectors = Selectors::default();
        for entry in entries(abi)? {
            match entry {
                Ok(entry) => selectors.push(&entry),
                Err(err) => {
                    tracing::warn!("skipping malformed abi item: {}", err);
                }
            }
        }
        Ok(selectors)
    }

    fn push(&mut self, entry: &AbiEntry) {
        match entry.kind {
            AbiEntryKind::Function => self.functions.push(entry.selector()),
            AbiEntryKind::Event => self.events.push(entry.topic()),
            AbiEntryKind::Error => self.errors.push(entry.selector()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.events.is_empty() && self.errors.is_empty()
    }
}

/// Returns an iterator over all function, event and error entries of the abi json.
///
/// Fails only if `abi` is not an array, each item is converted independently.
pub fn entries(abi: &serde_json::Value) -> Result<impl Iterator<Item = Result<AbiEntry>> + '_> {
    let items = abi.as_array().ok_or_else(|| AbiError::NotAnArray(json_kind(abi)))?;
    Ok(items.iter().enumerate().filter_map(|(position, value)| {
        let item = match Item::deserialize(value) {
            Ok(item) => item,
            Err(err) => return Some(Err(err.into())),
        };
        AbiEntry::from_item(&item, position).transpose()
    }))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
