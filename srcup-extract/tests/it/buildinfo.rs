use crate::*;
use serde_json::json;
use srcup_extract::{BundleBuilder, ExtractorConfig};

#[test]
fn can_read_hardhat_build_info() {
    let extras = build_info();
    assert_eq!(
        extras.files().collect::<Vec<_>>(),
        vec!["contracts/Token.sol", "contracts/Vault.sol"]
    );

    let token = extras.get("contracts/Token.sol", "Token").unwrap();
    assert_eq!(token.immutable_references, Some(json!({"1021": [{"length": 32, "start": 412}]})));
    assert_eq!(token.ir.as_ref().unwrap()["nodeType"], "YulObject");

    let vault = extras.get("contracts/Vault.sol", "Vault").unwrap();
    assert_eq!(vault.immutable_references, None);
    assert!(vault.ir.as_ref().unwrap().is_string());
}

#[test]
fn attaches_build_info_fields() {
    init_tracing();
    let config = ExtractorConfig::builder().include_ir(true).origin("ci").build();
    let bundle =
        BundleBuilder::new(config).extras(build_info()).build(&[compilation_unit()]).unwrap();

    let token = &bundle.contracts[0];
    assert_eq!(
        token.source.immutable_references,
        Some(json!({"1021": [{"length": 32, "start": 412}]}))
    );
    assert!(token.source.debug_info.as_ref().unwrap().get("@decimals_211").is_some());

    // no build info for the library
    let math = &bundle.contracts[1];
    assert_eq!(math.source.debug_info, None);
    assert!(math.ir_code.is_none());

    let ir = bundle.ir_codes().collect::<Vec<_>>();
    assert_eq!(ir.len(), 2);
    assert!(ir[0].yul_ast.starts_with('{'));
    assert_eq!(ir[0].md5_bytecode, token.bytecode.md5_bytecode);
    assert!(ir[1].yul_ast.starts_with("object \"Vault_120\""));
    assert!(ir.iter().all(|ir| ir.origin == "ci"));
}

#[test]
fn newer_build_info_replaces_files() {
    let mut extras = build_info();
    extras.extend(
        ExtraFields::from_build_info(&json!({
            "output": {"contracts": {"contracts/Vault.sol": {"Vault": {
                "evm": {"deployedBytecode": {"immutableReferences": {"7": []}}}
            }}}}
        }))
        .unwrap(),
    );
    let vault = extras.get("contracts/Vault.sol", "Vault").unwrap();
    assert_eq!(vault.immutable_references, Some(json!({"7": []})));
    assert_eq!(vault.ir, None);
    assert!(extras.get("contracts/Vault.sol", "TokenCopy").is_none());
    assert!(extras.get("contracts/Token.sol", "Token").is_some());
}
