//! End-to-end extraction over in-memory packages.

use apigraph_binder::MemoryHost;
use apigraph_extract::{
    CanonicalExportLocation, DocsDocument, ExternalSymbolLink, ExtractConfig, ExtractError, ObjectMember,
    SerializedSymbol, SerializedType, SymbolId, extract_with_host,
};

const MANIFEST: &str = r#"{ "name": "pkg", "version": "1.0.0" }"#;

fn host(files: &[(&str, &str)]) -> MemoryHost {
    let mut host = MemoryHost::new();
    host.add_file("/pkg/package.json", MANIFEST);
    for (path, text) in files {
        host.add_file(format!("/pkg/{path}"), *text);
    }
    host
}

fn config() -> ExtractConfig {
    ExtractConfig::new("/pkg").with_entrypoint("pkg", "index.ts")
}

fn extract(files: &[(&str, &str)]) -> DocsDocument {
    extract_with_host(&host(files), &config()).expect("extraction succeeds")
}

fn id_of(doc: &DocsDocument, name: &str) -> SymbolId {
    let matches: Vec<SymbolId> = doc.symbols_named(name).map(|(id, _)| id.clone()).collect();
    assert_eq!(matches.len(), 1, "expected one symbol named {name}, found {matches:?}");
    matches[0].clone()
}

fn referencer_names(doc: &DocsDocument, id: &SymbolId) -> Vec<String> {
    doc.symbol_references
        .get(id)
        .map(|referencers| {
            referencers
                .iter()
                .map(|referencer| doc.symbol(referencer).map_or("?", SerializedSymbol::name).to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn extraction_is_deterministic() {
    let files = [
        ("index.ts", "export * from \"./a\";\nexport { B } from \"./b\";\n"),
        ("a.ts", "export interface A { b: import(\"./b\").B }\nexport type Pair = [A, A];\n"),
        ("b.ts", "export class B { a?: import(\"./a\").A }\n"),
    ];
    let first = extract(&files).to_json_pretty().expect("serializes");
    let second = extract(&files).to_json_pretty().expect("serializes");
    assert_eq!(first, second);
    assert!(first.contains("\"accessibleSymbols\""));
    assert!(first.contains("\"goodIdentifiers\""));
}

#[test]
fn self_referential_types_terminate() {
    let doc = extract(&[("index.ts", "export type T = { next: T };\n")]);
    let t = id_of(&doc, "T");

    let Some(SerializedSymbol::TypeAlias { ty, .. }) = doc.symbol(&t) else {
        panic!("T is a type alias");
    };
    let SerializedType::Object { members } = ty else {
        panic!("T is an object type, got {ty:?}");
    };
    match &members[0] {
        ObjectMember::Prop { name, ty, .. } => {
            assert_eq!(name, "next");
            assert_eq!(
                ty,
                &SerializedType::Reference {
                    id: t.clone(),
                    name: "T".to_string(),
                    type_arguments: Vec::new(),
                }
            );
        }
        other => panic!("unexpected member {other:?}"),
    }
    assert_eq!(referencer_names(&doc, &t), vec!["index"]);
}

#[test]
fn three_export_paths_yield_one_canonical_location() {
    let doc = extract(&[
        (
            "index.ts",
            "export { Thing } from \"./lib/thing\";\nexport * as nested from \"./lib/thing\";\nexport { Thing as Alias } from \"./lib/thing\";\n",
        ),
        ("lib/thing.ts", "export interface Thing { a: string }\n"),
    ]);
    let root = doc.root_symbols[0].clone();
    let thing = id_of(&doc, "Thing");

    assert_eq!(
        doc.canonical_export_locations.get(&thing),
        Some(&CanonicalExportLocation {
            export_name: "Thing".to_string(),
            parent: root.clone(),
        })
    );
    assert_eq!(doc.good_identifiers[&thing], "pkg.Thing");
    assert!(!doc.canonical_export_locations.contains_key(&root));
    assert_eq!(doc.good_identifiers[&root], "pkg");

    let nested = SymbolId::new("lib/thing.ts:0");
    assert_eq!(doc.canonical_export_locations[&nested].export_name, "nested");
    assert_eq!(doc.good_identifiers[&nested], "pkg.nested");
}

#[test]
fn a_shared_type_is_serialized_once_for_five_referencers() {
    let doc = extract(&[
        (
            "index.ts",
            "import { Shared } from \"./types\";\n\
             export interface A { s: Shared }\n\
             export interface B { s: Shared }\n\
             export interface C { s: Shared }\n\
             export interface D { s: Shared }\n\
             export interface E { s: Shared[] }\n",
        ),
        ("types.ts", "export interface Shared { x: number }\n"),
    ]);
    let shared = id_of(&doc, "Shared");
    assert_eq!(doc.symbols_named("Shared").count(), 1);
    assert_eq!(referencer_names(&doc, &shared), vec!["A", "B", "C", "D", "E"]);

    let a = id_of(&doc, "A");
    assert_eq!(doc.good_identifiers[&shared], "pkg.A~Shared");
    assert_eq!(doc.symbols_for_inner_bit[&a], vec![shared.clone()]);
    assert!(!doc.canonical_export_locations.contains_key(&shared));
}

#[test]
fn generic_functions_keep_their_type_parameters() {
    let doc = extract(&[(
        "index.ts",
        "export function identity<T>(value: T): T {\n  return value;\n}\n",
    )]);
    let identity = id_of(&doc, "identity");
    let Some(SerializedSymbol::Function { signatures, .. }) = doc.symbol(&identity) else {
        panic!("identity is a function");
    };
    assert_eq!(signatures.len(), 1);
    let signature = &signatures[0];
    assert_eq!(signature.type_params.len(), 1);
    assert_eq!(signature.type_params[0].name, "T");
    let param = SerializedType::TypeParameter { name: "T".to_string() };
    assert_eq!(signature.parameters[0].name, "value");
    assert_eq!(signature.parameters[0].ty, param);
    assert_eq!(*signature.return_type, param);

    assert!(
        doc.symbol_references.keys().all(|id| !id.as_str().starts_with("global:")),
        "type parameters are not globals"
    );
    assert_eq!(doc.good_identifiers[&identity], "pkg.identity");
}

#[test]
fn re_exports_of_an_unlisted_module_are_canonical_at_the_entrypoint() {
    let files = [
        ("src/index.ts", "export { Thing } from \"./b\";\n"),
        ("src/b.ts", "export class Thing {}\n"),
    ];
    let config = ExtractConfig::new("/pkg").with_entrypoint("pkg", "src/index.ts");
    let doc = extract_with_host(&host(&files), &config).expect("extraction succeeds");

    let root = SymbolId::new("src/index.ts:0");
    let thing = SymbolId::new("src/b.ts:13");
    assert_eq!(doc.root_symbols, vec![root.clone()]);
    assert_eq!(doc.symbol(&thing).map(SerializedSymbol::kind_name), Some("class"));
    assert_eq!(
        doc.canonical_export_locations[&thing],
        CanonicalExportLocation {
            export_name: "Thing".to_string(),
            parent: root.clone(),
        }
    );
    assert_eq!(doc.good_identifiers[&thing], "pkg.Thing");

    let Some(SerializedSymbol::Module { exports, .. }) = doc.symbol(&root) else {
        panic!("the entrypoint is a module");
    };
    assert_eq!(exports.get("Thing"), Some(&thing));
    assert!(doc.symbol(&SymbolId::new("src/b.ts:0")).is_none());
}

#[test]
fn named_re_exports_defer_to_the_declaring_entrypoint() {
    let files = [
        ("src/index.ts", "export { Thing } from \"./b\";\n"),
        ("src/b.ts", "export class Thing {}\n"),
    ];
    let config = ExtractConfig::new("/pkg")
        .with_entrypoint("pkg", "src/index.ts")
        .with_entrypoint("pkg/b", "src/b.ts");
    let doc = extract_with_host(&host(&files), &config).expect("extraction succeeds");

    let index = SymbolId::new("src/index.ts:0");
    let b = SymbolId::new("src/b.ts:0");
    let thing = SymbolId::new("src/b.ts:13");
    assert_eq!(doc.root_symbols, vec![index.clone(), b.clone()]);
    assert_eq!(
        doc.canonical_export_locations[&thing],
        CanonicalExportLocation {
            export_name: "Thing".to_string(),
            parent: b.clone(),
        }
    );
    assert_eq!(doc.good_identifiers[&thing], "pkg/b.Thing");
    assert_eq!(doc.good_identifiers[&b], "pkg/b");

    let Some(SerializedSymbol::Module { exports, .. }) = doc.symbol(&index) else {
        panic!("src/index.ts is a module");
    };
    assert_eq!(exports.get("Thing"), Some(&thing));
    let Some(SerializedSymbol::Module { exports, .. }) = doc.symbol(&b) else {
        panic!("src/b.ts is a module");
    };
    assert_eq!(exports.get("Thing"), Some(&thing));
}

#[test]
fn externals_are_recorded_and_linked_but_not_walked() {
    let files = [
        (
            "index.ts",
            "import { Dep } from \"dep\";\n\
             import { Missing } from \"missing-pkg\";\n\
             export interface Local { dep: Dep; later: Promise<string>; missing: Missing }\n",
        ),
        (
            "node_modules/dep/package.json",
            r#"{ "name": "dep", "version": "2.3.0", "types": "index.d.ts" }"#,
        ),
        ("node_modules/dep/index.d.ts", "export interface Dep { x: number }\n"),
    ];
    let mut config = config();
    config.link_externals = true;
    let doc = extract_with_host(&host(&files), &config).expect("extraction succeeds");

    let dep = SymbolId::new("node_modules/dep/index.d.ts:17");
    assert!(doc.symbol(&dep).is_none());
    assert_eq!(referencer_names(&doc, &dep), vec!["Local"]);
    assert_eq!(
        doc.external_symbols.get(&dep),
        Some(&ExternalSymbolLink {
            pkg: "dep".to_string(),
            version: "2.3.0".to_string(),
            id: SymbolId::new("index.d.ts:17"),
        })
    );

    let promise = SymbolId::global("Promise");
    assert_eq!(referencer_names(&doc, &promise), vec!["Local"]);
    assert!(!doc.external_symbols.contains_key(&promise));

    let missing = SymbolId::unresolved("missing-pkg", "Missing");
    assert_eq!(referencer_names(&doc, &missing), vec!["Local"]);
    assert_eq!(doc.package_name, "pkg");
    assert_eq!(doc.current_version, "1.0.0");
}

#[test]
fn externals_stay_unlinked_without_the_switch() {
    let doc = extract(&[
        ("index.ts", "import { Dep } from \"dep\";\nexport type Wrapped = Dep;\n"),
        ("node_modules/dep/index.d.ts", "export interface Dep { x: number }\n"),
    ]);
    assert!(doc.external_symbols.is_empty());
    assert_eq!(
        referencer_names(&doc, &SymbolId::new("node_modules/dep/index.d.ts:17")),
        vec!["Wrapped"]
    );
}

#[test]
fn a_broken_conditional_degrades_to_unknown() {
    let doc = extract(&[(
        "index.ts",
        "export type Broken<T> = T extends string ? number;\nexport type Fine = string;\n",
    )]);
    let broken = id_of(&doc, "Broken");
    match doc.symbol(&broken) {
        Some(SerializedSymbol::Unknown { content, error, .. }) => {
            assert!(content.contains("Broken<T> = T extends string ? number"), "content was {content:?}");
            assert!(error.contains("false branch"), "error was {error:?}");
        }
        other => panic!("expected unknown, got {other:?}"),
    }
    let fine = id_of(&doc, "Fine");
    assert_eq!(doc.symbol(&fine).map(SerializedSymbol::kind_name), Some("type-alias"));
}

#[test]
fn pure_re_export_modules_inherit_documentation() {
    let doc = extract(&[
        ("index.ts", "export * from \"./core\";\n"),
        ("core.ts", "export * from \"./impl\";\n"),
        ("impl.ts", "/** The core API. */\n\nexport const version = \"1\";\n"),
    ]);
    let root = &doc.root_symbols[0];
    assert_eq!(doc.symbol(root).and_then(SerializedSymbol::docs), Some("The core API."));

    let own = extract(&[("index.ts", "/**\n * Own docs.\n * @packageDocumentation\n */\nexport const a = 1;\n")]);
    let root = &own.root_symbols[0];
    assert_eq!(own.symbol(root).and_then(SerializedSymbol::docs), Some("Own docs."));
}

#[test]
fn enum_members_are_placed_under_their_enum() {
    let doc = extract(&[(
        "index.ts",
        "/** Colors. */\nexport enum Color { Red, Green = 5, Blue }\nexport const enum Flag { On = \"on\" }\n",
    )]);
    let color = id_of(&doc, "Color");
    let Some(SerializedSymbol::Enum { members, is_const, docs, .. }) = doc.symbol(&color) else {
        panic!("Color is an enum");
    };
    assert!(!is_const);
    assert_eq!(docs.as_deref(), Some("Colors."));
    assert_eq!(members.len(), 3);

    let values: Vec<String> = members
        .iter()
        .map(|member| match doc.symbol(member) {
            Some(SerializedSymbol::EnumMember { name, value, .. }) => format!("{name}={value:?}"),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(values, vec!["Red=Some(Number(0.0))", "Green=Some(Number(5.0))", "Blue=Some(Number(6.0))"]);
    assert_eq!(doc.good_identifiers[&members[2]], "pkg.Color.Blue");
    assert_eq!(referencer_names(&doc, &members[0]), vec!["Color"]);

    let flag = id_of(&doc, "Flag");
    assert!(matches!(doc.symbol(&flag), Some(SerializedSymbol::Enum { is_const: true, .. })));
}

#[test]
fn namespaces_merged_into_functions_are_discovered() {
    let doc = extract(&[(
        "index.ts",
        "export function make(): void {}\nexport namespace make {\n  export interface Options { a: string }\n}\n",
    )]);
    let make = id_of(&doc, "make");
    assert_eq!(doc.symbol(&make).map(SerializedSymbol::kind_name), Some("function"));

    let options = id_of(&doc, "Options");
    assert_eq!(referencer_names(&doc, &options), vec!["make"]);
    assert_eq!(
        doc.canonical_export_locations[&options],
        CanonicalExportLocation {
            export_name: "Options".to_string(),
            parent: make.clone(),
        }
    );
    assert_eq!(doc.good_identifiers[&options], "pkg.make.Options");
}

#[test]
fn script_entrypoints_are_rejected() {
    let result = extract_with_host(&host(&[("index.ts", "declare const x: number;\n")]), &config());
    assert!(matches!(result, Err(ExtractError::EntrypointNotModule { .. })));
}

#[test]
fn missing_entry_files_are_program_errors() {
    let result = extract_with_host(&host(&[("other.ts", "export {};\n")]), &config());
    assert!(matches!(result, Err(ExtractError::Program(_))));

    let empty = ExtractConfig::new("/pkg");
    assert!(matches!(
        extract_with_host(&host(&[]), &empty),
        Err(ExtractError::NoEntrypoints)
    ));
}
