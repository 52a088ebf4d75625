//! srcup-extract integration tests

use srcup_extract::{CompilationUnit, ExtraFields};
use std::{
    fs,
    path::{Path, PathBuf},
};

mod buildinfo;
mod bundle;
mod sourcemap;

fn test_data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data").join(name)
}

/// The compilation unit of a small hardhat project: an ERC20 token, a library and a vault
/// linking against it
fn compilation_unit() -> CompilationUnit {
    let json = fs::read_to_string(test_data("compilation-unit.json")).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn build_info() -> ExtraFields {
    let json = fs::read_to_string(test_data("build-info.json")).unwrap();
    ExtraFields::from_build_info_str(&json).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
