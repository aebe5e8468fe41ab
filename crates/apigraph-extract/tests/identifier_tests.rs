//! Anchor identifier allocation over whole packages.

use apigraph_binder::MemoryHost;
use apigraph_extract::{DocsDocument, ExtractConfig, SymbolId, extract_with_host};
use std::collections::BTreeSet;

fn extract(files: &[(&str, &str)], entrypoints: &[(&str, &str)]) -> DocsDocument {
    let mut host = MemoryHost::new();
    host.add_file("/pkg/package.json", r#"{ "name": "pkg", "version": "2.0.0" }"#);
    for (path, text) in files {
        host.add_file(format!("/pkg/{path}"), *text);
    }
    let config = entrypoints
        .iter()
        .fold(ExtractConfig::new("/pkg"), |config, (specifier, path)| {
            config.with_entrypoint(*specifier, *path)
        });
    extract_with_host(&host, &config).expect("extraction succeeds")
}

fn identifier<'d>(doc: &'d DocsDocument, id: &str) -> &'d str {
    doc.good_identifiers
        .get(&SymbolId::new(id))
        .unwrap_or_else(|| panic!("no identifier for {id}"))
}

fn assert_injective(doc: &DocsDocument) {
    let distinct: BTreeSet<&String> = doc.good_identifiers.values().collect();
    assert_eq!(distinct.len(), doc.good_identifiers.len(), "{:#?}", doc.good_identifiers);
    assert_eq!(doc.good_identifiers.len(), doc.accessible_symbols.len());
}

#[test]
fn entrypoints_use_their_specifiers() {
    let doc = extract(
        &[
            ("index.ts", "export const version = \"2\";\n"),
            ("sub.ts", "export interface Sub { id: string }\n"),
        ],
        &[("pkg", "index.ts"), ("pkg/sub", "sub.ts")],
    );
    assert_eq!(identifier(&doc, "index.ts:0"), "pkg");
    assert_eq!(identifier(&doc, "sub.ts:0"), "pkg/sub");
    assert_eq!(identifier(&doc, "index.ts:13"), "pkg.version");
    assert_eq!(identifier(&doc, "sub.ts:17"), "pkg/sub.Sub");
    assert_injective(&doc);
}

#[test]
fn namespace_exports_nest_under_their_namespace() {
    let doc = extract(
        &[(
            "index.ts",
            "export namespace ns {\n  export interface Inner { ok: boolean }\n}\n",
        )],
        &[("pkg", "index.ts")],
    );
    assert_eq!(identifier(&doc, "index.ts:17"), "pkg.ns");
    assert_eq!(identifier(&doc, "index.ts:41"), "pkg.ns.Inner");
    assert!(doc.symbols_for_inner_bit.is_empty());
}

#[test]
fn colliding_inner_names_get_numeric_suffixes() {
    let doc = extract(
        &[
            (
                "index.ts",
                "import type { Options as AOptions } from \"./a\";\n\
                 import type { Options as BOptions } from \"./b\";\n\
                 export function make(a: AOptions, b: BOptions): void {}\n",
            ),
            ("a.ts", "export interface Options { a: string }\n"),
            ("b.ts", "export interface Options { b: number }\n"),
        ],
        &[("pkg", "index.ts")],
    );
    assert_eq!(identifier(&doc, "a.ts:17"), "pkg.make~Options");
    assert_eq!(identifier(&doc, "b.ts:17"), "pkg.make~Options-1");

    let make = doc
        .symbols_named("make")
        .map(|(id, _)| id.clone())
        .next()
        .expect("make is extracted");
    let inner: BTreeSet<&str> = doc.symbols_for_inner_bit[&make].iter().map(SymbolId::as_str).collect();
    assert_eq!(inner, BTreeSet::from(["a.ts:17", "b.ts:17"]));
    assert!(doc.canonical_export_locations.get(&SymbolId::new("a.ts:17")).is_none());
    assert_injective(&doc);
}

#[test]
fn inner_symbols_extend_their_owners_suffix() {
    let doc = extract(
        &[
            (
                "index.ts",
                "import type { Options as AOptions } from \"./a\";\n\
                 import type { Options as BOptions } from \"./b\";\n\
                 export function make(a: AOptions, b: BOptions): void {}\n",
            ),
            ("a.ts", "interface Inner { a: string }\nexport interface Options { inner: Inner }\n"),
            ("b.ts", "interface Inner { b: number }\nexport interface Options { inner: Inner }\n"),
        ],
        &[("pkg", "index.ts")],
    );
    assert_eq!(identifier(&doc, "a.ts:47"), "pkg.make~Options");
    assert_eq!(identifier(&doc, "b.ts:47"), "pkg.make~Options-1");
    assert_eq!(identifier(&doc, "a.ts:10"), "pkg.make~Options~Inner");
    assert_eq!(identifier(&doc, "b.ts:10"), "pkg.make~Options-1~Inner");
    assert_eq!(doc.symbols_for_inner_bit[&SymbolId::new("b.ts:47")], vec![SymbolId::new("b.ts:10")]);
    assert_injective(&doc);
}

#[test]
fn inner_symbols_chain_through_their_first_referencer() {
    let doc = extract(
        &[(
            "index.ts",
            "interface Retry { times: number }\n\
             interface Config { retry: Retry }\n\
             export function run(config: Config): void {}\n",
        )],
        &[("pkg", "index.ts")],
    );
    let config = SymbolId::new("index.ts:44");
    let retry = SymbolId::new("index.ts:10");
    assert_eq!(identifier(&doc, config.as_str()), "pkg.run~Config");
    assert_eq!(identifier(&doc, retry.as_str()), "pkg.run~Config~Retry");
    assert_eq!(doc.symbols_for_inner_bit[&config], vec![retry.clone()]);
    assert!(
        doc.symbols_for_inner_bit
            .values()
            .filter(|inner| inner.contains(&retry))
            .count()
            == 1
    );
    assert_injective(&doc);
}
