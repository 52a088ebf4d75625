//! Utility functions

use once_cell::sync::Lazy;
use regex::Regex;
use srcup_core::utils::keccak256;

/// Total length of a library placeholder in the hex encoded bytecode
pub const PLACEHOLDER_LEN: usize = 40;

/// Matches any library placeholder, legacy `__Name___...` as well as hashed `__$...$__`
pub static RE_LIBRARY_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__.{38}").expect("valid placeholder regex"));

/// Returns the placeholder solc < 0.5 emits for a library: `__` followed by the first 36
/// bytes of the (fully qualified) name, padded with `_` to 40 bytes.
///
/// A multi-byte character that would straddle the cut is left out and padded over.
///
/// ```
/// use srcup_extract::utils::legacy_placeholder;
/// assert_eq!(legacy_placeholder("lib2.sol:L"), "__lib2.sol:L____________________________");
/// ```
pub fn legacy_placeholder(name: &str) -> String {
    let mut end = name.len().min(PLACEHOLDER_LEN - 4);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let mut placeholder = String::with_capacity(PLACEHOLDER_LEN);
    placeholder.push_str("__");
    placeholder.push_str(&name[..end]);
    placeholder.extend(std::iter::repeat('_').take(PLACEHOLDER_LEN - placeholder.len()));
    placeholder
}

/// Returns the placeholder solc >= 0.5 emits for a fully qualified library name:
/// `__$` + the first 34 hex characters of `keccak256(name)` + `$__`
///
/// ```
/// use srcup_extract::utils::hashed_placeholder;
/// assert_eq!(hashed_placeholder("lib2.sol:L"), "__$cb901161e812ceb78cfe30ca65050c4337$__");
/// ```
pub fn hashed_placeholder(fully_qualified_name: &str) -> String {
    let hash = hex::encode(keccak256(fully_qualified_name));
    format!("__${}$__", &hash[..34])
}

/// Strips the `<path>:` qualifier from a contract name, if any
pub fn contract_name(qualified: &str) -> &str {
    qualified.rsplit_once(':').map(|(_, name)| name).unwrap_or(qualified)
}
