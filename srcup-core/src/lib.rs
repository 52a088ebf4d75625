#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! Byte types, hashing utilities and ABI signature handling shared by the srcup crates.
//!
//! # Selectors
//!
//! ```rust
//! use srcup_core::abi::Selectors;
//!
//! let abi = serde_json::json!([{
//!     "type": "function",
//!     "name": "transfer",
//!     "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
//!     "outputs": [{"name": "", "type": "bool"}]
//! }]);
//! let selectors = Selectors::from_abi(&abi).unwrap();
//! assert_eq!(selectors.functions[0].to_string(), "0xa9059cbb");
//! ```

pub mod abi;

pub mod types;

/// Various utilities
pub mod utils;
