use crate::*;
use hex_literal::hex;
use pretty_assertions::assert_eq;
use srcup_core::{
    types::{Selector, B256},
    utils,
};
use srcup_extract::{BundleBuilder, ExtractorConfig};

fn build(config: ExtractorConfig) -> srcup_extract::Bundle {
    init_tracing();
    BundleBuilder::new(config).build(&[compilation_unit()]).unwrap()
}

#[test]
fn can_extract_hardhat_project() {
    let bundle = build(ExtractorConfig::default());
    assert!(bundle.skipped.is_empty());

    let names = bundle.sources().map(|s| s.contract_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Token", "Math", "Vault", "TokenCopy"]);

    let token = &bundle.contracts[0].source;
    assert_eq!(token.contract_path, "contracts/Token.sol");
    assert_eq!(
        token.source_map,
        "86:1247:2:-:0;;;;;;;;;;;;;1560:97:0:-:0;;;;;;;;;;:::i;:::-;;;;;;:::o;640:96:1;;;;;;;;:::i;-1:-1:-1;;;;;2166:112:0;;:::o;86:1247:2;"
    );
    assert_eq!(
        token.array_source_names,
        vec![
            "@openzeppelin/contracts/token/ERC20/ERC20.sol",
            "@openzeppelin/contracts/utils/Context.sol",
            "contracts/Token.sol",
        ]
    );
    assert_eq!(token.array_source_level.len(), 3);
    assert!(token.array_source_level[2].contains("contract Token is ERC20"));
    assert_eq!(
        token.array_function_selectors,
        vec![Selector::new(hex!("313ce567")), Selector::new(hex!("a9059cbb"))]
    );
    assert_eq!(
        token.array_event_selectors,
        vec![B256::new(hex!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"))]
    );
    assert_eq!(
        token.array_error_selectors,
        vec![utils::id("InsufficientBalance(uint256,uint256)")]
    );
    assert_eq!(token.json_abi.as_array().unwrap().len(), 4);
}

#[test]
fn vault_is_linked_and_remapped() {
    let bundle = build(ExtractorConfig::default());
    let vault = &bundle.contracts[2];

    assert_eq!(vault.source.source_map, "57:1950:1:-:0;;;301:414:0:-:1;:::i;12:8:-1;10:5;57:1950:1");
    assert_eq!(
        vault.source.array_source_names,
        vec!["contracts/libraries/Math.sol", "contracts/Vault.sol"]
    );
    assert_eq!(
        vault.source.array_function_selectors,
        vec![utils::id("deposit((address,uint256)[])")]
    );

    let code = hex::encode(&vault.bytecode.bytecode);
    assert!(code.contains(&format!("73{}63", "0".repeat(40))));
    assert!(!code.contains("__"));
}

#[test]
fn identical_code_shares_fingerprint() {
    let bundle = build(ExtractorConfig::default());
    let token = &bundle.contracts[0];
    let copy = &bundle.contracts[3];

    assert_eq!(token.source.md5_bytecode, copy.source.md5_bytecode);
    assert_eq!(token.bytecode, copy.bytecode);
    assert_ne!(token.source.md5_bytecode, bundle.contracts[1].source.md5_bytecode);
    assert_eq!(copy.source.array_source_names, vec!["contracts/Vault.sol"]);

    let unique = bundle.unique_bytecodes();
    assert_eq!(unique.len(), 3);
    assert_eq!(unique[0].codehash, B256::new(utils::keccak256(&token.bytecode.bytecode)));
}

#[test]
fn output_is_deterministic() {
    let a = serde_json::to_string(&build(ExtractorConfig::default())).unwrap();
    let b = serde_json::to_string(&build(ExtractorConfig::default())).unwrap();
    let parallel =
        serde_json::to_string(&build(ExtractorConfig::builder().parallel(true).build())).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, parallel);
}

#[test]
fn records_have_uploader_shape() {
    let bundle = build(ExtractorConfig::default());
    let source = serde_json::to_value(&bundle.contracts[0].source).unwrap();
    assert_eq!(source["array_function_selectors"], serde_json::json!(["0x313ce567", "0xa9059cbb"]));
    assert_eq!(source["immutable_references"], serde_json::Value::Null);
    assert_eq!(source["md5_bytecode"].as_str().unwrap().len(), 2 + 32);

    let bytecode = serde_json::to_value(&bundle.contracts[0].bytecode).unwrap();
    assert_eq!(bytecode["codehash"].as_str().unwrap().len(), 2 + 64);
    assert_eq!(bytecode["origin"], "watchdog");
}
