//! This is a basic representation of a contract ABI item that does no post processing but
//! keeps track of which fields were actually present in the json.
//!
//! Only `type`, `name`, `inputs` and `components` make up a signature. Every other field is
//! read leniently: a value of an unexpected shape is dropped instead of failing the item.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// A single abi item: a function, event, error, constructor, fallback or receive declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Component>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(rename = "type")]
    pub type_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Component>>,
    // required to satisfy solidity events
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
}

/// Either an input/output or a nested component of an input/output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    #[serde(
        rename = "internalType",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub internal_type: Option<String>,
    /// Empty if absent or not a string
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(rename = "type")]
    pub type_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
    /// Indexed flag. for solidity events
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}
