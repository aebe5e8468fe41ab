//! Tests for program loading, binding and export resolution.

use apigraph_binder::{
    DeclSite, MemoryHost, Program, ProgramError, Resolution, SymbolFlags, SymbolRef, EXPORT_EQUALS,
};
use apigraph_common::diagnostics::diagnostic_codes;
use std::path::Path;

fn host(files: &[(&str, &str)]) -> MemoryHost {
    let mut host = MemoryHost::new();
    for (path, text) in files {
        host.add_file(format!("/pkg/{path}"), *text);
    }
    host
}

fn load_entry(files: &[(&str, &str)], entry: &str) -> Program {
    Program::load(&host(files), Path::new("/pkg"), &[entry.to_string()]).expect("program loads")
}

fn load(files: &[(&str, &str)]) -> Program {
    load_entry(files, "index.ts")
}

fn entry_module(program: &Program) -> SymbolRef {
    program
        .module_symbol(program.entrypoints()[0])
        .expect("entrypoint is a module")
}

fn export_names(program: &Program, module: SymbolRef) -> Vec<String> {
    program.exports_of(module).keys().cloned().collect()
}

fn exported_symbol(program: &Program, module: SymbolRef, name: &str) -> SymbolRef {
    match program.exports_of(module).get(name) {
        Some(Resolution::Symbol(symbol)) => *symbol,
        other => panic!("export {name} resolved to {other:?}"),
    }
}

fn declaring_file(program: &Program, symbol: SymbolRef) -> &str {
    let site = program.symbol(symbol).declarations[0];
    program.relative_path(site.file())
}

fn find_declaration(program: &Program, file: &str, name: &str) -> DeclSite {
    let id = program
        .files()
        .iter()
        .find(|bound| bound.source.file_name == file)
        .map(|bound| bound.id)
        .expect("file is loaded");
    let index = program
        .file(id)
        .source
        .declarations
        .iter()
        .position(|decl| decl.name.text == name)
        .expect("declaration exists");
    DeclSite::Declaration(id, apigraph_syntax::ast::DeclIndex(index as u32))
}

// =============================================================================
// Binding
// =============================================================================

#[test]
fn same_name_declarations_merge() {
    let program = load(&[(
        "index.ts",
        "export interface A { x: string }\nexport interface A { y: number }\nexport function f(): void;\nexport namespace f { export const z = 1; }",
    )]);
    let module = entry_module(&program);
    assert_eq!(export_names(&program, module), vec!["A", "f"]);

    let a = exported_symbol(&program, module, "A");
    assert_eq!(program.symbol(a).declarations.len(), 2);

    let f = exported_symbol(&program, module, "f");
    assert!(program.symbol(f).flags.contains(SymbolFlags::FUNCTION | SymbolFlags::NAMESPACE));
    assert!(matches!(program.member_of(f, "z"), Some(Resolution::Symbol(_))));
}

#[test]
fn enum_members_are_symbols_of_their_enum() {
    let program = load(&[("index.ts", "export enum Color { Red, Green = 4 }")]);
    let color = exported_symbol(&program, entry_module(&program), "Color");
    let Some(Resolution::Symbol(green)) = program.member_of(color, "Green") else {
        panic!("Green is a member of Color");
    };
    let member = program.symbol(green);
    assert!(member.flags.contains(SymbolFlags::ENUM_MEMBER));
    assert_eq!(member.parent, Some(color));
}

#[test]
fn declarations_shadow_imports() {
    let program = load(&[
        ("index.ts", "import { Shape } from \"./shape\";\nexport interface Shape { local: true }\nexport { Shape as Alias };"),
        ("shape.ts", "export interface Shape { remote: true }"),
    ]);
    let module = entry_module(&program);
    let alias = exported_symbol(&program, module, "Alias");
    assert_eq!(declaring_file(&program, alias), "index.ts");
}

// =============================================================================
// Export tables
// =============================================================================

#[test]
fn export_star_keeps_local_names_and_survives_cycles() {
    let program = load(&[
        ("index.ts", "export * from \"./a\";\nexport * from \"./b\";\nexport const shared = 1;"),
        ("a.ts", "export * from \"./index\";\nexport const a = 1;\nexport const shared = \"a\";"),
        ("b.ts", "export const b = 2;\nexport default 3;"),
    ]);
    let module = entry_module(&program);
    assert_eq!(export_names(&program, module), vec!["shared", "a", "b"]);
    let shared = exported_symbol(&program, module, "shared");
    assert_eq!(declaring_file(&program, shared), "index.ts");
}

#[test]
fn re_export_chains_resolve_to_the_declaration() {
    let program = load(&[
        ("index.ts", "export { Widget as Gadget } from \"./re\";"),
        ("re.ts", "import { Widget } from \"./impl\";\nexport { Widget };"),
        ("impl.ts", "export class Widget {}"),
    ]);
    let gadget = exported_symbol(&program, entry_module(&program), "Gadget");
    let symbol = program.symbol(gadget);
    assert_eq!(symbol.name, "Widget");
    assert!(symbol.flags.contains(SymbolFlags::CLASS));
    assert_eq!(declaring_file(&program, gadget), "impl.ts");
}

#[test]
fn export_star_as_binds_the_module() {
    let program = load(&[
        ("index.ts", "export * as utils from \"./utils\";\nexport * as gone from \"./gone\";"),
        ("utils.ts", "export function helper() {}"),
    ]);
    let module = entry_module(&program);
    let utils = exported_symbol(&program, module, "utils");
    assert!(program.symbol(utils).flags.contains(SymbolFlags::SOURCE_FILE));
    assert_eq!(
        program.exports_of(module).get("gone"),
        Some(&Resolution::Unresolved {
            specifier: "./gone".to_string(),
            name: String::new(),
        })
    );
}

#[test]
fn export_equals_is_visible_to_require_and_default_imports() {
    let program = load(&[
        (
            "index.ts",
            "import legacy = require(\"./legacy\");\nimport viaDefault from \"./legacy\";\nexport { legacy, viaDefault };",
        ),
        ("legacy.d.ts", "declare namespace Legacy {\n  function run(): void;\n}\nexport = Legacy;"),
    ]);
    let module = entry_module(&program);
    let legacy = exported_symbol(&program, module, "legacy");
    assert_eq!(program.symbol(legacy).name, "Legacy");
    assert_eq!(exported_symbol(&program, module, "viaDefault"), legacy);

    let legacy_module = program
        .files()
        .iter()
        .find(|file| file.source.file_name == "legacy.d.ts")
        .and_then(|file| file.module_symbol)
        .expect("legacy.d.ts is a module");
    assert_eq!(export_names(&program, legacy_module), vec![EXPORT_EQUALS, "run"]);
}

#[test]
fn declaration_files_export_implicitly_without_an_export_list() {
    let program = load_entry(
        &[
            ("index.d.ts", "import \"./closed\";\ninterface Hidden {}\ndeclare function f(): Hidden;"),
            ("closed.d.ts", "import \"./index\";\ninterface Private {}\nexport {};"),
        ],
        "index.d.ts",
    );
    assert_eq!(export_names(&program, entry_module(&program)), vec!["Hidden", "f"]);

    let closed = program
        .files()
        .iter()
        .find(|file| file.source.file_name == "closed.d.ts")
        .and_then(|file| file.module_symbol)
        .expect("closed.d.ts is a module");
    assert!(program.exports_of(closed).is_empty());
}

#[test]
fn unresolved_imports_are_recorded() {
    let program = load(&[("index.ts", "import { a } from \"./missing\";\nexport { a };")]);
    assert_eq!(
        program.exports_of(entry_module(&program)).get("a"),
        Some(&Resolution::Unresolved {
            specifier: "./missing".to_string(),
            name: "a".to_string(),
        })
    );
    assert!(
        program
            .diagnostics()
            .any(|diagnostic| diagnostic.code == diagnostic_codes::CANNOT_FIND_MODULE)
    );
}

// =============================================================================
// Name resolution
// =============================================================================

#[test]
fn namespace_imports_resolve_qualified_names() {
    let program = load(&[
        (
            "index.ts",
            "import * as ns from \"./lib\";\nimport * as ext from \"missing-pkg\";\nexport type T = ns.Inner.Deep;",
        ),
        ("lib.ts", "export namespace Inner { export interface Deep {} }"),
    ]);
    let scope = DeclSite::SourceFile(program.entrypoints()[0]);

    let Some(Resolution::Symbol(deep)) = program.resolve_entity(scope, &["ns", "Inner", "Deep"]) else {
        panic!("ns.Inner.Deep resolves");
    };
    assert!(program.symbol(deep).flags.contains(SymbolFlags::INTERFACE));

    assert_eq!(
        program.resolve_entity(scope, &["ext", "a", "b"]),
        Some(Resolution::Unresolved {
            specifier: "missing-pkg".to_string(),
            name: "a.b".to_string(),
        })
    );
    assert_eq!(program.resolve_entity(scope, &["ns", "Nope"]), None);
}

#[test]
fn lookup_walks_enclosing_namespaces() {
    let program = load(&[(
        "index.ts",
        "export namespace Outer {\n  export interface Shared {}\n  export namespace Inner {\n    export type Uses = Shared;\n  }\n}",
    )]);
    let uses = find_declaration(&program, "index.ts", "Uses");
    let DeclSite::Declaration(file, index) = uses else {
        unreachable!()
    };
    let scope = program.scope_of(file, index);
    assert!(matches!(scope, DeclSite::Declaration(..)));

    let shared = program.lookup_name(scope, "Shared").expect("Shared is visible");
    let outer = exported_symbol(&program, entry_module(&program), "Outer");
    assert_eq!(program.member_of(outer, "Shared"), Some(Resolution::Symbol(shared)));
}

#[test]
fn ambient_modules_and_globals_are_visible() {
    let program = load(&[
        (
            "index.ts",
            "import \"./types\";\nimport \"./augment\";\nimport { Thing } from \"ambient-lib\";\nexport { Thing };",
        ),
        (
            "types.d.ts",
            "declare module \"ambient-lib\" {\n  export interface Thing { a: string }\n}\ninterface GlobalThing {}",
        ),
        ("augment.ts", "declare global {\n  interface Extra {}\n}\nexport {};"),
    ]);
    let thing = exported_symbol(&program, entry_module(&program), "Thing");
    assert_eq!(declaring_file(&program, thing), "types.d.ts");
    assert!(program.ambient_module("ambient-lib").is_some());

    let global = program.resolve_global("GlobalThing").expect("script declarations are global");
    assert!(program.resolve_global("Extra").is_some());
    let scope = DeclSite::SourceFile(program.entrypoints()[0]);
    assert_eq!(program.lookup_name(scope, "GlobalThing"), Some(global));
}

#[test]
fn node_modules_files_are_external() {
    let program = load(&[
        ("index.ts", "export { Dep } from \"dep\";"),
        ("node_modules/dep/package.json", r#"{ "name": "dep", "types": "lib/index.d.ts" }"#),
        ("node_modules/dep/lib/index.d.ts", "export declare class Dep {}"),
    ]);
    let dep = exported_symbol(&program, entry_module(&program), "Dep");
    let file = program.symbol(dep).declarations[0].file();
    assert!(!program.is_internal(file));
    assert!(program.is_internal(program.entrypoints()[0]));
    assert_eq!(program.relative_path(file), "node_modules/dep/lib/index.d.ts");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn missing_entrypoint_is_an_error() {
    let host = host(&[("index.ts", "export {};")]);
    let err = Program::load(&host, Path::new("/pkg"), &["nope.ts".to_string()]).unwrap_err();
    assert!(matches!(err, ProgramError::EntrypointNotFound { ref entry, .. } if entry == "nope.ts"));

    let err = Program::load(&host, Path::new("/elsewhere"), &["index.ts".to_string()]).unwrap_err();
    assert!(matches!(err, ProgramError::RootNotFound(_)));
}
