//! Type and declaration serialization, observed through extraction.

use apigraph_binder::MemoryHost;
use apigraph_extract::{
    ClassMember, DocsDocument, ExtractConfig, MappedModifierName, ObjectMember, SerializedSignature,
    SerializedSymbol, SerializedTupleElement, SerializedType, SymbolId, TupleElementKind, VariableKindName,
    extract_with_host,
};

fn extract_with(files: &[(&str, &str)], config: ExtractConfig) -> DocsDocument {
    let mut host = MemoryHost::new();
    host.add_file("/pkg/package.json", r#"{ "name": "pkg", "version": "0.1.0" }"#);
    for (path, text) in files {
        host.add_file(format!("/pkg/{path}"), *text);
    }
    extract_with_host(&host, &config).expect("extraction succeeds")
}

fn extract(files: &[(&str, &str)]) -> DocsDocument {
    extract_with(files, ExtractConfig::new("/pkg").with_entrypoint("pkg", "index.ts"))
}

fn symbol<'d>(doc: &'d DocsDocument, name: &str) -> (&'d SymbolId, &'d SerializedSymbol) {
    let mut matches = doc.symbols_named(name);
    let found = matches.next().unwrap_or_else(|| panic!("no symbol named {name}"));
    assert!(matches.next().is_none(), "more than one symbol named {name}");
    found
}

fn alias_type<'d>(doc: &'d DocsDocument, name: &str) -> &'d SerializedType {
    match symbol(doc, name).1 {
        SerializedSymbol::TypeAlias { ty, .. } => ty,
        other => panic!("{name} is not a type alias: {other:?}"),
    }
}

fn variable_type<'d>(doc: &'d DocsDocument, name: &str) -> (&'d VariableKindName, &'d SerializedType) {
    match symbol(doc, name).1 {
        SerializedSymbol::Variable { variable_kind, ty, .. } => (variable_kind, ty),
        other => panic!("{name} is not a variable: {other:?}"),
    }
}

fn prop<'m>(members: &'m [ObjectMember], name: &str) -> (&'m SerializedType, bool, bool) {
    members
        .iter()
        .find_map(|member| match member {
            ObjectMember::Prop {
                name: prop_name,
                ty,
                optional,
                readonly,
                ..
            } if prop_name == name => Some((ty, *optional, *readonly)),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no property {name}"))
}

fn class_member<'m>(members: &'m [ClassMember], name: &str) -> &'m ClassMember {
    members
        .iter()
        .find(|member| {
            matches!(
                &member.member,
                ObjectMember::Prop { name: member_name, .. } | ObjectMember::Method { name: member_name, .. }
                    if member_name == name
            )
        })
        .unwrap_or_else(|| panic!("no member {name}"))
}

fn intrinsic(value: &str) -> SerializedType {
    SerializedType::intrinsic(value)
}

fn type_param(name: &str) -> SerializedType {
    SerializedType::TypeParameter { name: name.to_string() }
}

fn array(readonly: bool, inner: SerializedType) -> SerializedType {
    SerializedType::Array {
        readonly,
        inner: Box::new(inner),
    }
}

fn element(kind: TupleElementKind, label: Option<&str>, ty: SerializedType) -> SerializedTupleElement {
    SerializedTupleElement {
        kind,
        label: label.map(str::to_string),
        ty,
    }
}

#[test]
fn optional_properties_drop_undefined() {
    let doc = extract(&[(
        "index.ts",
        "export interface Opts {\n  a?: string | undefined;\n  b?: string | number | undefined;\n  c: string | undefined;\n  d?: undefined | null;\n}\n",
    )]);
    let SerializedSymbol::Interface { members, .. } = symbol(&doc, "Opts").1 else {
        panic!("Opts is an interface");
    };
    assert_eq!(prop(members, "a"), (&intrinsic("string"), true, false));
    assert_eq!(
        prop(members, "b").0,
        &SerializedType::Union {
            types: vec![intrinsic("string"), intrinsic("number")],
        }
    );
    assert_eq!(
        prop(members, "c").0,
        &SerializedType::Union {
            types: vec![intrinsic("string"), intrinsic("undefined")],
        }
    );
    assert_eq!(prop(members, "d").0, &intrinsic("null"));
}

#[test]
fn library_arrays_flatten() {
    let doc = extract(&[(
        "index.ts",
        "export type A = Array<string>;\nexport type R = ReadonlyArray<number>;\nexport type B = string[];\nexport type C = readonly string[];\n",
    )]);
    assert_eq!(alias_type(&doc, "A"), &array(false, intrinsic("string")));
    assert_eq!(alias_type(&doc, "R"), &array(true, intrinsic("number")));
    assert_eq!(alias_type(&doc, "B"), &array(false, intrinsic("string")));
    assert_eq!(alias_type(&doc, "C"), &array(true, intrinsic("string")));
    assert!(doc.symbol_references.keys().all(|id| id.as_str() != "global:Array"));
}

#[test]
fn a_package_array_declaration_is_a_reference() {
    let doc = extract(&[(
        "index.ts",
        "export interface Array<T> { first: T }\nexport type L = Array<string>;\n",
    )]);
    let (array_id, _) = symbol(&doc, "Array");
    assert_eq!(
        alias_type(&doc, "L"),
        &SerializedType::Reference {
            id: array_id.clone(),
            name: "Array".to_string(),
            type_arguments: vec![intrinsic("string")],
        }
    );
}

#[test]
fn tuple_elements_are_tagged() {
    let doc = extract(&[(
        "index.ts",
        "export type T = [a: string, b?: number, ...rest: boolean[]];\n\
         export type V<U extends unknown[]> = [string, ...U];\n\
         export type RT = readonly [string, ...Array<number>];\n",
    )]);
    assert_eq!(
        alias_type(&doc, "T"),
        &SerializedType::Tuple {
            readonly: false,
            elements: vec![
                element(TupleElementKind::Required, Some("a"), intrinsic("string")),
                element(TupleElementKind::Optional, Some("b"), intrinsic("number")),
                element(TupleElementKind::Rest, Some("rest"), intrinsic("boolean")),
            ],
        }
    );
    assert_eq!(
        alias_type(&doc, "V"),
        &SerializedType::Tuple {
            readonly: false,
            elements: vec![
                element(TupleElementKind::Required, None, intrinsic("string")),
                element(TupleElementKind::Variadic, None, type_param("U")),
            ],
        }
    );
    assert_eq!(
        alias_type(&doc, "RT"),
        &SerializedType::Tuple {
            readonly: true,
            elements: vec![
                element(TupleElementKind::Required, None, intrinsic("string")),
                element(TupleElementKind::Rest, None, intrinsic("number")),
            ],
        }
    );
}

#[test]
fn mapped_types_keep_their_modifiers() {
    let doc = extract(&[(
        "index.ts",
        "export type RO<T> = { readonly [K in keyof T]?: T[K] };\nexport type Mut<T> = { -readonly [K in keyof T]-?: T[K] };\n",
    )]);
    let expected = |readonly: MappedModifierName, optional: MappedModifierName| SerializedType::Mapped {
        param: "K".to_string(),
        constraint: Box::new(SerializedType::Keyof {
            value: Box::new(type_param("T")),
        }),
        name_type: None,
        readonly: Some(readonly),
        optional: Some(optional),
        ty: Some(Box::new(SerializedType::IndexedAccess {
            object: Box::new(type_param("T")),
            index: Box::new(type_param("K")),
        })),
    };
    assert_eq!(
        alias_type(&doc, "RO"),
        &expected(MappedModifierName::Present, MappedModifierName::Present)
    );
    assert_eq!(
        alias_type(&doc, "Mut"),
        &expected(MappedModifierName::Remove, MappedModifierName::Remove)
    );
}

#[test]
fn conditional_types_bind_infer_names_in_the_true_branch() {
    let doc = extract(&[(
        "index.ts",
        "export type Unwrap<T> = T extends Promise<infer U> ? U : T;\n",
    )]);
    assert_eq!(
        alias_type(&doc, "Unwrap"),
        &SerializedType::Conditional {
            check_type: Box::new(type_param("T")),
            extends_type: Box::new(SerializedType::Reference {
                id: SymbolId::global("Promise"),
                name: "Promise".to_string(),
                type_arguments: vec![SerializedType::Infer {
                    name: "U".to_string(),
                    constraint: None,
                }],
            }),
            true_type: Box::new(type_param("U")),
            false_type: Box::new(type_param("T")),
        }
    );
}

#[test]
fn import_types_and_qualified_names_resolve_through_modules() {
    let doc = extract(&[
        (
            "index.ts",
            "import * as lib from \"./lib\";\n\
             export type I = import(\"./lib\").Lib;\n\
             export type Q = typeof import(\"./lib\");\n\
             export type N = lib.Lib;\n",
        ),
        ("lib.ts", "export interface Lib { ok: boolean }\n"),
    ]);
    let (lib_id, _) = symbol(&doc, "Lib");
    assert_eq!(
        alias_type(&doc, "I"),
        &SerializedType::Reference {
            id: lib_id.clone(),
            name: "import(\"./lib\").Lib".to_string(),
            type_arguments: Vec::new(),
        }
    );
    assert_eq!(
        alias_type(&doc, "Q"),
        &SerializedType::Typeof {
            id: SymbolId::new("lib.ts:0"),
            name: "import(\"./lib\")".to_string(),
        }
    );
    assert_eq!(
        alias_type(&doc, "N"),
        &SerializedType::Reference {
            id: lib_id.clone(),
            name: "lib.Lib".to_string(),
            type_arguments: Vec::new(),
        }
    );
    assert_eq!(
        doc.symbol(&SymbolId::new("lib.ts:0")).map(SerializedSymbol::kind_name),
        Some("module")
    );
}

#[test]
fn class_members_respect_visibility_and_accessors() {
    let doc = extract(&[(
        "index.ts",
        "export abstract class Widget<T> {\n\
           static count: number;\n\
           readonly id = 1;\n\
           protected label?: string | undefined;\n\
           private secret: string;\n\
           #hidden = true;\n\
           constructor(name: string);\n\
           constructor(public name: string, private token?: string, readonly size?: number) {}\n\
           get value(): T { return this.current; }\n\
           get both(): number { return 1; }\n\
           set both(next: number) {}\n\
           set onlySet(next: string) {}\n\
           abstract render(): void;\n\
           static create(): Widget<string>;\n\
         }\n",
    )]);
    let (widget_id, widget) = symbol(&doc, "Widget");
    let SerializedSymbol::Class {
        type_params,
        constructors,
        members,
        has_private_members,
        is_abstract,
        ..
    } = widget
    else {
        panic!("Widget is a class");
    };
    assert!(*has_private_members);
    assert!(*is_abstract);
    assert_eq!(type_params[0].name, "T");

    assert_eq!(constructors.len(), 1);
    assert!(constructors[0].is_constructor);
    assert_eq!(constructors[0].parameters.len(), 1);

    let names: Vec<&str> = members
        .iter()
        .map(|member| match &member.member {
            ObjectMember::Prop { name, .. } | ObjectMember::Method { name, .. } => name.as_str(),
            _ => "?",
        })
        .collect();
    assert_eq!(
        names,
        vec!["name", "size", "count", "id", "label", "value", "both", "onlySet", "render", "create"]
    );

    let find = |name: &str| class_member(members, name);
    assert!(find("count").is_static);
    assert!(find("label").is_protected);
    assert!(find("render").is_abstract);
    assert!(find("create").is_static);

    let plain: Vec<ObjectMember> = members.iter().map(|member| member.member.clone()).collect();
    assert_eq!(prop(&plain, "id"), (&SerializedType::NumericLiteral { value: 1.0 }, false, true));
    assert_eq!(prop(&plain, "label"), (&intrinsic("string"), true, false));
    assert_eq!(prop(&plain, "size"), (&intrinsic("number"), true, true));
    assert_eq!(prop(&plain, "value"), (&type_param("T"), false, true));
    assert_eq!(prop(&plain, "both"), (&intrinsic("number"), false, false));
    assert_eq!(prop(&plain, "onlySet"), (&intrinsic("string"), false, false));

    let ObjectMember::Method { signature, .. } = &find("create").member else {
        panic!("create is a method");
    };
    assert_eq!(
        *signature.return_type,
        SerializedType::Reference {
            id: widget_id.clone(),
            name: "Widget".to_string(),
            type_arguments: vec![intrinsic("string")],
        }
    );
    assert!(
        doc.symbol_references
            .get(widget_id)
            .is_none_or(|referencers| !referencers.contains(widget_id))
    );
}

#[test]
fn overloads_drop_the_implementation_signature() {
    let doc = extract(&[(
        "index.ts",
        "export function parse(input: string): number;\n\
         export function parse(input: number): number;\n\
         export function parse(input: any): number {\n  return 0;\n}\n\
         export function single(flag = false) {}\n",
    )]);
    let SerializedSymbol::Function { signatures, .. } = symbol(&doc, "parse").1 else {
        panic!("parse is a function");
    };
    let inputs: Vec<&SerializedType> = signatures.iter().map(|signature| &signature.parameters[0].ty).collect();
    assert_eq!(inputs, vec![&intrinsic("string"), &intrinsic("number")]);

    let SerializedSymbol::Function { signatures, .. } = symbol(&doc, "single").1 else {
        panic!("single is a function");
    };
    let expected = SerializedSignature {
        docs: None,
        type_params: Vec::new(),
        parameters: vec![apigraph_extract::SerializedParameter {
            name: "flag".to_string(),
            ty: intrinsic("boolean"),
            optional: true,
            rest: false,
        }],
        return_type: Box::new(intrinsic("void")),
        is_constructor: false,
    };
    assert_eq!(signatures, &vec![expected]);
}

#[test]
fn unannotated_variables_use_inferred_types() {
    let doc = extract(&[(
        "index.ts",
        "export const answer = 42;\n\
         export let title = \"x\";\n\
         export const list = [1, 2];\n\
         export const settings = { debug: true } as const;\n\
         export const run = async () => 1;\n",
    )]);
    assert_eq!(
        variable_type(&doc, "answer"),
        (&VariableKindName::Const, &SerializedType::NumericLiteral { value: 42.0 })
    );
    assert_eq!(variable_type(&doc, "title"), (&VariableKindName::Let, &intrinsic("string")));
    assert_eq!(variable_type(&doc, "list").1, &array(false, intrinsic("number")));
    assert_eq!(
        variable_type(&doc, "settings").1,
        &SerializedType::Object {
            members: vec![ObjectMember::Prop {
                name: "debug".to_string(),
                docs: None,
                optional: false,
                readonly: true,
                ty: intrinsic("true"),
            }],
        }
    );
    let SerializedType::Signature(signature) = variable_type(&doc, "run").1 else {
        panic!("run is a function value");
    };
    assert_eq!(
        *signature.return_type,
        SerializedType::Reference {
            id: SymbolId::global("Promise"),
            name: "Promise".to_string(),
            type_arguments: vec![intrinsic("number")],
        }
    );
}

#[test]
fn signature_type_parameters_shadow_outer_names() {
    let doc = extract(&[(
        "index.ts",
        "export interface Box<T> {\n  value: T;\n  map<U>(fn: (value: T) => U): Box<U>;\n}\n",
    )]);
    let (box_id, boxed) = symbol(&doc, "Box");
    let SerializedSymbol::Interface { members, .. } = boxed else {
        panic!("Box is an interface");
    };
    let ObjectMember::Method { signature, .. } = &members[1] else {
        panic!("map is a method");
    };
    assert_eq!(signature.type_params[0].name, "U");
    let SerializedType::Signature(callback) = &signature.parameters[0].ty else {
        panic!("fn is a function type");
    };
    assert_eq!(callback.parameters[0].ty, type_param("T"));
    assert_eq!(*callback.return_type, type_param("U"));
    assert_eq!(
        *signature.return_type,
        SerializedType::Reference {
            id: box_id.clone(),
            name: "Box".to_string(),
            type_arguments: vec![type_param("U")],
        }
    );
}

#[test]
fn deep_types_degrade_to_raw_text() {
    let mut config = ExtractConfig::new("/pkg").with_entrypoint("pkg", "index.ts");
    config.max_type_depth = 2;
    let doc = extract_with(
        &[("index.ts", "export type Deep = { a: { b: { c: string } } };\nexport type G = `hi ${string}`;\n")],
        config,
    );

    let mut ty = alias_type(&doc, "Deep");
    for name in ["a", "b", "c"] {
        let SerializedType::Object { members } = ty else {
            panic!("expected an object above {name}, got {ty:?}");
        };
        ty = prop(members, name).0;
    }
    assert_eq!(ty, &SerializedType::Raw { value: "string".to_string() });
    assert_eq!(
        alias_type(&doc, "G"),
        &SerializedType::Raw {
            value: "`hi ${string}`".to_string(),
        }
    );
}
