//! Tests for statement and declaration parsing.

use apigraph_syntax::SourceFile;
use apigraph_syntax::ast::{
    ClassMemberKind, DeclarationKind, ExpressionKind, ImportEqualsTarget, ModifierFlags,
    ModuleNameKind, PropertyName, Statement, VariableKind,
};
use apigraph_syntax::parse;

fn parse_source(source: &str) -> SourceFile {
    let file = parse("test.ts", source);
    assert!(file.diagnostics.is_empty(), "unexpected diagnostics: {:?}", file.diagnostics);
    file
}

fn declaration_names(file: &SourceFile) -> Vec<&str> {
    file.top_level_declarations()
        .map(|index| file.decl(index).name.text.as_str())
        .collect()
}

// =============================================================================
// Imports and exports
// =============================================================================

#[test]
fn parse_import_forms() {
    let file = parse_source(
        "import Default, { a, b as c, type D } from \"./m\";\nimport * as ns from \"./n\";\nimport type { T } from \"./t\";\nimport \"./side\";\nimport legacy = require(\"./legacy\");",
    );
    assert!(file.is_external_module);
    let imports: Vec<_> = file
        .statements
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::Import(import) => Some(import),
            _ => None,
        })
        .collect();
    assert_eq!(imports.len(), 4);

    let first = imports[0];
    assert_eq!(first.default_binding.as_ref().unwrap().text, "Default");
    let named: Vec<(&str, &str, bool)> = first
        .named
        .iter()
        .map(|spec| (spec.imported.text.as_str(), spec.local.text.as_str(), spec.is_type_only))
        .collect();
    assert_eq!(named, vec![("a", "a", false), ("b", "c", false), ("D", "D", true)]);
    assert_eq!(first.module_specifier, "./m");

    assert_eq!(imports[1].namespace_binding.as_ref().unwrap().text, "ns");
    assert!(imports[2].is_type_only);
    assert!(imports[3].named.is_empty() && imports[3].default_binding.is_none());

    let Some(Statement::ImportEquals(legacy)) = file.statements.last() else {
        panic!("expected import equals");
    };
    assert_eq!(legacy.name.text, "legacy");
    assert!(matches!(&legacy.target, ImportEqualsTarget::External(spec) if spec == "./legacy"));
}

#[test]
fn parse_export_forms() {
    let file = parse_source(
        "export { a, b as c };\nexport { d } from \"./d\";\nexport * from \"./e\";\nexport * as f from \"./f\";\nexport type { G } from \"./g\";",
    );
    let Statement::Export(local) = &file.statements[0] else {
        panic!("expected export list");
    };
    assert!(local.module_specifier.is_none());
    assert_eq!(local.specifiers[1].local.text, "b");
    assert_eq!(local.specifiers[1].exported.text, "c");

    let Statement::Export(reexport) = &file.statements[1] else {
        panic!("expected re-export");
    };
    assert_eq!(reexport.module_specifier.as_deref(), Some("./d"));

    let Statement::ExportAll(star) = &file.statements[2] else {
        panic!("expected export star");
    };
    assert!(star.alias.is_none());
    let Statement::ExportAll(star_as) = &file.statements[3] else {
        panic!("expected export star as");
    };
    assert_eq!(star_as.alias.as_ref().unwrap().text, "f");
    let Statement::Export(type_only) = &file.statements[4] else {
        panic!("expected type-only export");
    };
    assert!(type_only.is_type_only);
}

#[test]
fn parse_export_assignment() {
    let file = parse_source("declare namespace Lib { const v: number; }\nexport = Lib;");
    let Some(Statement::ExportAssignment(assignment)) = file.statements.last() else {
        panic!("expected export assignment");
    };
    assert!(assignment.is_export_equals);
    assert_eq!(assignment.target.text(), "Lib");
}

#[test]
fn parse_export_default_forms() {
    let file = parse_source("export default function () {}");
    let index = file.top_level_declarations().next().unwrap();
    let decl = file.decl(index);
    assert_eq!(decl.name.text, "default");
    assert!(decl.is_default_export());
    assert!(matches!(decl.kind, DeclarationKind::Function(_)));

    let file = parse_source("export default foo.bar;");
    assert!(matches!(
        &file.statements[0],
        Statement::ExportAssignment(assignment) if !assignment.is_export_equals && assignment.target.text() == "foo.bar"
    ));

    let file = parse_source("export default { a: 1 };");
    let decl = file.decl(file.top_level_declarations().next().unwrap());
    let DeclarationKind::Variable(variable) = &decl.kind else {
        panic!("expected synthesized variable");
    };
    assert_eq!(decl.name.text, "default");
    assert!(matches!(
        variable.initializer.as_ref().map(|init| &init.kind),
        Some(ExpressionKind::Object(members)) if members.len() == 1
    ));
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn parse_export_default_keyword_expressions() {
    let file = parse_source("/** Fallback. */\nexport default interface;\nexport const after = 1;");
    assert!(matches!(
        &file.statements[0],
        Statement::ExportAssignment(assignment) if !assignment.is_export_equals && assignment.target.text() == "interface"
    ));
    assert_eq!(declaration_names(&file), vec!["after"]);

    let file = parse_source("/** Built. */\nexport default class {}");
    let decl = file.decl(file.top_level_declarations().next().unwrap());
    assert_eq!(decl.name.text, "default");
    assert_eq!(decl.doc.as_deref(), Some("Built."));
}

#[test]
fn parse_function_overloads_with_docs() {
    let file = parse_source(
        "/** Adds. */\nexport declare function add(a: number, b?: number): number;\nexport declare function add(a: string): string;",
    );
    assert_eq!(declaration_names(&file), vec!["add", "add"]);
    let first = file.decl(file.top_level_declarations().next().unwrap());
    assert_eq!(first.doc.as_deref(), Some("Adds."));
    assert!(first.modifiers.contains(ModifierFlags::EXPORT | ModifierFlags::DECLARE));
    let DeclarationKind::Function(function) = &first.kind else {
        panic!("expected function");
    };
    assert!(function.body.is_none());
    assert!(function.signature.params[1].question);
    assert_eq!(file.doc, None);
}

#[test]
fn parse_class_members() {
    let file = parse_source(
        r#"export class Widget<T> extends Base<T> implements Shape {
  /** The size. */
  size: number = 1;
  private secret: string;
  #hidden = 1;
  static readonly count = 0;
  protected constructor(public readonly name: string, private id?: number) { super(); }
  get area(): number { return 1; }
  set area(value: number) {}
  method<U>(input: U): T;
  [key: string]: unknown;
}"#,
    );
    let decl = file.decl(file.top_level_declarations().next().unwrap());
    let DeclarationKind::Class(class) = &decl.kind else {
        panic!("expected class");
    };
    assert_eq!(class.type_params.len(), 1);
    assert!(class.extends.is_some());
    assert_eq!(class.implements.len(), 1);

    let members = &class.members;
    assert_eq!(members.len(), 9);
    assert_eq!(members[0].doc.as_deref(), Some("The size."));
    assert!(matches!(&members[0].kind, ClassMemberKind::Property { initializer: Some(_), .. }));
    assert!(members[1].modifiers.contains(ModifierFlags::PRIVATE));
    assert!(matches!(members[2].name(), Some(PropertyName::Private(_))));
    assert!(members[3].modifiers.contains(ModifierFlags::STATIC | ModifierFlags::READONLY));

    let ClassMemberKind::Constructor { signature, body } = &members[4].kind else {
        panic!("expected constructor");
    };
    assert!(members[4].modifiers.contains(ModifierFlags::PROTECTED));
    assert!(body.is_some());
    assert_eq!(
        signature.params[0].modifiers,
        ModifierFlags::PUBLIC | ModifierFlags::READONLY
    );
    assert!(signature.params[1].modifiers.contains(ModifierFlags::PRIVATE));
    assert!(signature.params[1].question);

    assert!(matches!(
        &members[5].kind,
        ClassMemberKind::GetAccessor { body: Some(body), .. } if body.has_return_value
    ));
    assert!(matches!(&members[6].kind, ClassMemberKind::SetAccessor { .. }));
    assert!(matches!(&members[7].kind, ClassMemberKind::Method { body: None, .. }));
    assert!(matches!(&members[8].kind, ClassMemberKind::Index { .. }));
}

#[test]
fn parse_const_enum_members() {
    let file = parse_source("export const enum Color { Red, Green = \"g\", Blue = 4 }");
    let enum_index = file.top_level_declarations().next().unwrap();
    let decl = file.decl(enum_index);
    assert!(decl.modifiers.contains(ModifierFlags::CONST));
    let DeclarationKind::Enum(enum_decl) = &decl.kind else {
        panic!("expected enum");
    };
    let names: Vec<&str> = enum_decl
        .members
        .iter()
        .map(|member| file.decl(*member).name.text.as_str())
        .collect();
    assert_eq!(names, vec!["Red", "Green", "Blue"]);
    assert!(
        enum_decl
            .members
            .iter()
            .all(|member| file.decl(*member).parent == Some(enum_index))
    );
}

#[test]
fn parse_namespaces_and_ambient_modules() {
    let file = parse_source(
        "export namespace A.B { export const x = 1; }\ndeclare module \"pkg\" { export interface I {} }\ndeclare global { interface Window {} }",
    );
    assert!(file.is_external_module);
    let mut top = file.top_level_declarations();

    let a_index = top.next().unwrap();
    let DeclarationKind::Module(a) = &file.decl(a_index).kind else {
        panic!("expected namespace");
    };
    let Some([Statement::Declaration(b_index)]) = a.body.as_deref() else {
        panic!("expected nested namespace");
    };
    let b = file.decl(*b_index);
    assert_eq!(b.name.text, "B");
    assert_eq!(b.parent, Some(a_index));
    assert!(b.is_exported());

    let pkg = file.decl(top.next().unwrap());
    assert_eq!(pkg.name.text, "pkg");
    assert!(matches!(
        &pkg.kind,
        DeclarationKind::Module(module) if module.name_kind == ModuleNameKind::String
    ));

    let global = file.decl(top.next().unwrap());
    assert!(matches!(
        &global.kind,
        DeclarationKind::Module(module) if module.name_kind == ModuleNameKind::Global
    ));
}

#[test]
fn parse_variable_declarators() {
    let file = parse_source("export const a = 1, b: string = \"x\";\nlet c;");
    assert_eq!(declaration_names(&file), vec!["a", "b", "c"]);
    let kinds: Vec<VariableKind> = file
        .top_level_declarations()
        .map(|index| match &file.decl(index).kind {
            DeclarationKind::Variable(variable) => variable.variable_kind,
            _ => panic!("expected variable"),
        })
        .collect();
    assert_eq!(kinds, vec![VariableKind::Const, VariableKind::Const, VariableKind::Let]);
    let c = file.decl(file.top_level_declarations().nth(2).unwrap());
    assert!(!c.is_exported());
}

#[test]
fn parse_function_body_return_summary() {
    let file = parse_source(
        "export function f() { const g = () => { return 1; }; }\nexport function h(x: boolean) { if (x) { return 2; } }",
    );
    let bodies: Vec<bool> = file
        .top_level_declarations()
        .map(|index| match &file.decl(index).kind {
            DeclarationKind::Function(function) => function.body.unwrap().has_return_value,
            _ => panic!("expected function"),
        })
        .collect();
    assert_eq!(bodies, vec![false, true]);
}

#[test]
fn parse_file_documentation() {
    let file = parse_source(
        "/**\n * Package docs.\n * @packageDocumentation\n */\n\n/** Item doc. */\nexport const x = 1;",
    );
    assert_eq!(file.doc.as_deref(), Some("Package docs."));
    let x = file.decl(file.top_level_declarations().next().unwrap());
    assert_eq!(x.doc.as_deref(), Some("Item doc."));

    let file = parse_source("/** Only file. */\n\nexport const y = 2;");
    assert_eq!(file.doc.as_deref(), Some("Only file."));
    let y = file.decl(file.top_level_declarations().next().unwrap());
    assert_eq!(y.doc, None);
}

#[test]
fn parse_skips_unmodelled_statements() {
    let file = parse_source("if (ready) { start(); }\nexport interface After { ok: true }");
    assert!(matches!(file.statements[0], Statement::Unknown(_)));
    assert_eq!(declaration_names(&file), vec!["After"]);
}
