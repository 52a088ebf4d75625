use super::{raw::Component, AbiError, Result};
use std::fmt;

/// The type tag that marks a parameter as a tuple (solidity struct)
pub const TUPLE: &str = "tuple";

/// A single input parameter of an abi item.
///
/// Tuples carry their ordered components and the array suffix that followed the `tuple` marker
/// in the declared type, e.g. `tuple[2][]` is a `Tuple` with `array_suffix == "[2][]"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiParam {
    /// Any non-tuple type such as `uint256`, `address`, `bytes32[4]`
    Elementary { name: String, ty: String },
    Tuple { name: String, components: Vec<AbiParam>, array_suffix: String },
}

impl AbiParam {
    /// Converts the raw json shape into a param, recursing into tuple components.
    ///
    /// A tuple without `components` or with a suffix that is not a chain of `[]`/`[N]` is
    /// rejected.
    pub fn from_component(component: &Component) -> Result<Self> {
        let Component { name, type_field, components, .. } = component;

        let Some(suffix) = type_field.strip_prefix(TUPLE) else {
            return Ok(AbiParam::Elementary { name: name.clone(), ty: type_field.clone() })
        };

        if !is_array_suffix(suffix) {
            return Err(AbiError::InvalidArraySuffix {
                name: name.clone(),
                suffix: suffix.to_string(),
            })
        }

        let components = components
            .as_ref()
            .ok_or_else(|| AbiError::MissingComponents(name.clone()))?
            .iter()
            .map(AbiParam::from_component)
            .collect::<Result<Vec<_>>>()?;

        Ok(AbiParam::Tuple { name: name.clone(), components, array_suffix: suffix.to_string() })
    }

    pub fn name(&self) -> &str {
        match self {
            AbiParam::Elementary { name, .. } | AbiParam::Tuple { name, .. } => name,
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, AbiParam::Tuple { .. })
    }

    /// Returns the canonical type used in signatures, e.g. `(uint256,address)[]` for a
    /// `tuple[]` with `uint256` and `address` components.
    pub fn canonical_type(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    pub(crate) fn write_canonical(&self, out: &mut String) {
        match self {
            AbiParam::Elementary { ty, .. } => out.push_str(ty),
            AbiParam::Tuple { components, array_suffix, .. } => {
                out.push('(');
                write_canonical_list(components, out);
                out.push(')');
                out.push_str(array_suffix);
            }
        }
    }
}

impl fmt::Display for AbiParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_type())
    }
}

/// Writes the comma separated canonical types of `params`
pub(crate) fn write_canonical_list(params: &[AbiParam], out: &mut String) {
    for (idx, param) in params.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        param.write_canonical(out);
    }
}

/// Returns `true` if `s` is empty or a chain of `[]` / `[<digits>]`
fn is_array_suffix(mut s: &str) -> bool {
    while !s.is_empty() {
        let Some(rest) = s.strip_prefix('[') else { return false };
        let Some(end) = rest.find(']') else { return false };
        if !rest[..end].bytes().all(|b| b.is_ascii_digit()) {
            return false
        }
        s = &rest[end + 1..];
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param(value: serde_json::Value) -> Result<AbiParam> {
        let component: Component = serde_json::from_value(value).unwrap();
        AbiParam::from_component(&component)
    }

    #[test]
    fn elementary_types_are_kept_verbatim() {
        for ty in ["uint256", "address", "bool", "bytes32[4]", "string[][3]", "int8"] {
            let p = param(serde_json::json!({"name": "x", "type": ty})).unwrap();
            assert_eq!(p.canonical_type(), ty);
            assert!(!p.is_tuple());
        }
    }

    #[test]
    fn can_canonicalize_tuple_array() {
        let p = param(serde_json::json!({
            "type": "tuple[]",
            "components": [{"type": "uint256"}, {"type": "address"}]
        }))
        .unwrap();
        assert_eq!(p.canonical_type(), "(uint256,address)[]");
    }

    #[test]
    fn can_canonicalize_nested_tuples() {
        let p = param(serde_json::json!({
            "type": "tuple",
            "components": [{"type": "tuple", "components": [{"type": "bool"}]}]
        }))
        .unwrap();
        assert_eq!(p.canonical_type(), "((bool))");

        let p = param(serde_json::json!({
            "name": "orders",
            "type": "tuple[2][]",
            "components": [
                {"name": "maker", "type": "address"},
                {"name": "legs", "type": "tuple[]", "components": [
                    {"name": "amount", "type": "uint128"},
                    {"name": "flags", "type": "tuple", "components": [{"type": "bool"}, {"type": "bytes"}]}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(p.canonical_type(), "(address,(uint128,(bool,bytes))[])[2][]");
        assert_eq!(p.name(), "orders");
    }

    #[test]
    fn empty_tuple() {
        let p = param(serde_json::json!({"type": "tuple", "components": []})).unwrap();
        assert_eq!(p.canonical_type(), "()");
    }

    #[test]
    fn rejects_tuple_without_components() {
        let err = param(serde_json::json!({"name": "s", "type": "tuple"})).unwrap_err();
        assert!(matches!(err, AbiError::MissingComponents(name) if name == "s"));

        // missing components deep inside
        let err = param(serde_json::json!({
            "type": "tuple",
            "components": [{"type": "tuple[]"}]
        }))
        .unwrap_err();
        assert!(matches!(err, AbiError::MissingComponents(_)));
    }

    #[test]
    fn rejects_bad_array_suffix() {
        let err =
            param(serde_json::json!({"type": "tuplex", "components": []})).unwrap_err();
        assert!(matches!(err, AbiError::InvalidArraySuffix { .. }));
        assert!(!is_array_suffix("[2"));
        assert!(!is_array_suffix("[a]"));
        assert!(is_array_suffix("[][10][]"));
        assert!(is_array_suffix(""));
    }
}
