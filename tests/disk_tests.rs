//! Extraction of packages written to disk.

use apigraph::extract::ExternalSymbolLink;
use apigraph::{ExtractError, SymbolId, extract_package, load_config};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, path: &str, text: &str) {
    let path = dir.join(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn package() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "package.json", r#"{ "name": "@acme/core", "version": "4.2.0" }"#);
    write(
        dir.path(),
        "src/index.ts",
        "/** Core client. */\n\nimport type { Dep } from \"dep\";\nexport interface Client { dep: Dep }\nexport * from \"./util\";\n",
    );
    write(dir.path(), "src/util.ts", "export function helper(x: number): string;\n");
    write(
        dir.path(),
        "node_modules/dep/package.json",
        r#"{ "name": "dep", "version": "1.5.0", "types": "index.d.ts" }"#,
    );
    write(dir.path(), "node_modules/dep/index.d.ts", "export interface Dep { ok: boolean }\n");
    dir
}

#[test]
fn relative_roots_resolve_against_the_config_file() {
    let dir = package();
    write(
        dir.path(),
        "docs/apigraph.json",
        r#"{ "root": "..", "entrypoints": { "@acme/core": "src/index.ts" } }"#,
    );
    let config = load_config(&dir.path().join("docs/apigraph.json")).unwrap();
    assert_eq!(config.root, dir.path().join("docs").join(".."));
    assert!(!config.link_externals);
}

#[test]
fn packages_extract_from_a_config_directory() {
    let dir = package();
    write(
        dir.path(),
        "apigraph.json",
        r#"{ "root": ".", "entrypoints": { "@acme/core": "src/index.ts" }, "linkExternals": true }"#,
    );
    let doc = extract_package(dir.path()).unwrap();

    assert_eq!(doc.package_name, "@acme/core");
    assert_eq!(doc.current_version, "4.2.0");
    assert_eq!(doc.root_symbols, vec![SymbolId::new("src/index.ts:0")]);
    assert_eq!(
        doc.good_identifiers.get(&SymbolId::new("src/util.ts:16")).map(String::as_str),
        Some("@acme/core.helper")
    );
    assert_eq!(
        doc.external_symbols.get(&SymbolId::new("node_modules/dep/index.d.ts:17")),
        Some(&ExternalSymbolLink {
            pkg: "dep".to_string(),
            version: "1.5.0".to_string(),
            id: SymbolId::new("index.d.ts:17"),
        })
    );
    assert_eq!(
        doc.symbol(&SymbolId::new("src/index.ts:0")).and_then(|module| module.docs()),
        Some("Core client.")
    );
}

#[test]
fn malformed_configs_report_the_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "apigraph.json", "{ \"root\": ");
    let error = extract_package(dir.path()).unwrap_err();
    assert!(format!("{error:#}").contains("apigraph.json"), "{error:#}");
}

#[test]
fn missing_entry_files_surface_the_extraction_error() {
    let dir = package();
    write(
        dir.path(),
        "apigraph.json",
        r#"{ "root": ".", "entrypoints": { "@acme/core": "src/missing.ts" } }"#,
    );
    let error = extract_package(dir.path()).unwrap_err();
    assert!(matches!(error.downcast_ref::<ExtractError>(), Some(ExtractError::Program(_))), "{error:#}");
}
