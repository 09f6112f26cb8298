//! Parser integration tests over declarations: compilation units,
//! usings, namespaces, type declarations and every member form.

use bumpalo::Bump;
use rsharp_ast::node::*;
use rsharp_ast::{Modifiers, TokenKind};

fn parse_ok<'a>(arena: &'a Bump, source: &str) -> CompilationUnit<'a> {
    let (unit, diagnostics) = rsharp_parser::parse(arena, source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:#?}",
        source,
        diagnostics.diagnostics()
    );
    unit
}

fn first_type<'a>(unit: &'a CompilationUnit<'a>) -> &'a TypeDeclaration<'a> {
    match &unit.members[0] {
        NamespaceMember::Type(decl) => decl,
        other => panic!("expected a type declaration, got {:?}", other),
    }
}

fn method<'a>(decl: &'a TypeDeclaration<'a>, index: usize) -> &'a MethodDeclaration<'a> {
    match &decl.members[index] {
        MemberDeclaration::Method(m) => m,
        other => panic!("expected a method, got {:?}", other),
    }
}

#[test]
fn using_and_field() {
    let arena = Bump::new();
    let unit = parse_ok(&arena, "using System; class C { int f; }");

    assert_eq!(unit.usings.len(), 1);
    assert_eq!(unit.usings[0].name, "System");
    assert!(unit.usings[0].alias_of.is_none());

    let decl = first_type(&unit);
    assert_eq!(decl.kind, TypeKind::Class);
    assert_eq!(decl.name, "C");
    assert_eq!(decl.members.len(), 1);
    match &decl.members[0] {
        MemberDeclaration::Field(field) => {
            assert_eq!(field.type_reference.name, "int");
            assert_eq!(field.declarators.len(), 1);
            assert_eq!(field.declarators[0].name, "f");
            assert!(field.declarators[0].initializer.is_none());
        }
        other => panic!("expected a field, got {:?}", other),
    }
}

#[test]
fn using_alias() {
    let arena = Bump::new();
    let unit = parse_ok(&arena, "using Txt = System.Text.StringBuilder;");
    assert_eq!(unit.usings[0].name, "Txt");
    let target = unit.usings[0].alias_of.as_ref().unwrap();
    assert_eq!(target.name, "System.Text.StringBuilder");
}

#[test]
fn generic_class_with_constraints() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class G<T> where T : class, new() { public T M<U>(U u) where U : T { return (T)null; } }",
    );
    let decl = first_type(&unit);
    assert_eq!(decl.name, "G");
    assert_eq!(decl.type_parameters.len(), 1);
    assert_eq!(decl.type_parameters[0].name, "T");

    assert_eq!(decl.constraints.len(), 1);
    let clause = &decl.constraints[0];
    assert_eq!(clause.type_parameter, "T");
    assert!(matches!(clause.constraints[0], Constraint::Class));
    assert!(matches!(clause.constraints[1], Constraint::New));

    let m = method(decl, 0);
    assert_eq!(m.name, "M");
    assert!(m.modifiers.contains(Modifiers::PUBLIC));
    assert_eq!(m.return_type.name, "T");
    assert_eq!(m.type_parameters.len(), 1);
    assert_eq!(m.type_parameters[0].name, "U");
    assert_eq!(m.parameters.len(), 1);
    assert_eq!(m.parameters[0].type_reference.name, "U");
    assert_eq!(m.parameters[0].name, "u");
    assert_eq!(m.constraints.len(), 1);
    assert_eq!(m.constraints[0].type_parameter, "U");
    match &m.constraints[0].constraints[0] {
        Constraint::Type(ty) => assert_eq!(ty.name, "T"),
        other => panic!("expected a type constraint, got {:?}", other),
    }

    let body = m.body.as_ref().unwrap();
    assert_eq!(body.statements.len(), 1);
    match &body.statements[0] {
        Statement::Return(ret) => match ret.expression.unwrap() {
            Expression::Cast(cast) => {
                assert_eq!(cast.target_type.name, "T");
                assert!(matches!(
                    cast.expression,
                    Expression::Primitive(PrimitiveExpression {
                        value: rsharp_ast::types::LiteralValue::Null,
                        ..
                    })
                ));
            }
            other => panic!("expected a cast, got {:?}", other),
        },
        other => panic!("expected return, got {:?}", other),
    }
}

#[test]
fn namespaces_nest_and_hold_usings() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "namespace A.B { using System; namespace C { class D { } } }",
    );
    match &unit.members[0] {
        NamespaceMember::Namespace(outer) => {
            assert_eq!(outer.name, "A.B");
            assert_eq!(outer.usings.len(), 1);
            match &outer.members[0] {
                NamespaceMember::Namespace(inner) => {
                    assert_eq!(inner.name, "C");
                    assert!(matches!(&inner.members[0], NamespaceMember::Type(t) if t.name == "D"));
                }
                other => panic!("expected inner namespace, got {:?}", other),
            }
        }
        other => panic!("expected namespace, got {:?}", other),
    }
}

#[test]
fn enum_with_base_and_initializers() {
    let arena = Bump::new();
    let unit = parse_ok(&arena, "enum Color : byte { Red = 1, Green, Blue, }");
    let decl = first_type(&unit);
    assert_eq!(decl.kind, TypeKind::Enum);
    assert_eq!(decl.base_types[0].name, "byte");
    assert_eq!(decl.members.len(), 3);
    match &decl.members[0] {
        MemberDeclaration::EnumMember(member) => {
            assert_eq!(member.name, "Red");
            assert!(member.initializer.is_some());
        }
        other => panic!("expected enum member, got {:?}", other),
    }
}

#[test]
fn delegate_declaration() {
    let arena = Bump::new();
    let unit = parse_ok(&arena, "public delegate int Folder<T>(T seed, int value);");
    match &unit.members[0] {
        NamespaceMember::Delegate(decl) => {
            assert_eq!(decl.name, "Folder");
            assert_eq!(decl.return_type.name, "int");
            assert_eq!(decl.type_parameters.len(), 1);
            assert_eq!(decl.parameters.len(), 2);
        }
        other => panic!("expected delegate, got {:?}", other),
    }
}

#[test]
fn property_accessors_in_either_order() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class C { int P { set { v = value; } get { return v; } } int v; }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Property(prop) => {
            assert_eq!(prop.name, "P");
            assert!(prop.get_region.is_some());
            assert!(prop.set_region.is_some());
            assert!(prop.get_region.as_ref().unwrap().body.is_some());
        }
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn accessor_modifiers_and_semicolon_bodies() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "abstract class C { public abstract int P { get; protected set; } }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Property(prop) => {
            assert!(prop.get_region.as_ref().unwrap().body.is_none());
            let set = prop.set_region.as_ref().unwrap();
            assert!(set.modifiers.contains(Modifiers::PROTECTED));
        }
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn field_like_and_block_events() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class C { \
           public event EventHandler Changed, Closed; \
           event EventHandler Opened { add { h += value; } remove { h -= value; } } \
         }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Event(ev) => {
            assert_eq!(ev.declarators.len(), 2);
            assert_eq!(ev.declarators[0].name, "Changed");
            assert_eq!(ev.declarators[1].name, "Closed");
            assert!(ev.add_region.is_none());
        }
        other => panic!("expected event, got {:?}", other),
    }
    match &decl.members[1] {
        MemberDeclaration::Event(ev) => {
            assert_eq!(ev.name, "Opened");
            assert!(ev.declarators.is_empty());
            assert!(ev.add_region.is_some());
            assert!(ev.remove_region.is_some());
        }
        other => panic!("expected event, got {:?}", other),
    }
}

#[test]
fn constructors_and_initializers() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class C { C() : this(0) { } C(int x) : base(x, 1) { } static C() { } }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Constructor(c) => {
            let init = c.initializer.as_ref().unwrap();
            assert_eq!(init.kind, ConstructorInitializerKind::This);
            assert_eq!(init.arguments.len(), 1);
        }
        other => panic!("expected constructor, got {:?}", other),
    }
    match &decl.members[1] {
        MemberDeclaration::Constructor(c) => {
            let init = c.initializer.as_ref().unwrap();
            assert_eq!(init.kind, ConstructorInitializerKind::Base);
            assert_eq!(init.arguments.len(), 2);
        }
        other => panic!("expected constructor, got {:?}", other),
    }
    match &decl.members[2] {
        MemberDeclaration::Constructor(c) => {
            assert!(c.modifiers.contains(Modifiers::STATIC));
            assert!(c.initializer.is_none());
        }
        other => panic!("expected static constructor, got {:?}", other),
    }
}

#[test]
fn destructor() {
    let arena = Bump::new();
    let unit = parse_ok(&arena, "class C { ~C() { } }");
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Destructor(d) => {
            assert_eq!(d.name, "C");
            assert!(d.body.is_some());
        }
        other => panic!("expected destructor, got {:?}", other),
    }
}

#[test]
fn conversion_operator() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class MyType { public static implicit operator int(MyType m) { return m.v; } int v; }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Operator(op) => {
            assert_eq!(op.kind, OperatorKind::Implicit);
            assert_eq!(op.return_type.name, "int");
            assert_eq!(op.parameters.len(), 1);
            assert_eq!(op.parameters[0].type_reference.name, "MyType");
            assert_eq!(op.parameters[0].name, "m");
        }
        other => panic!("expected operator, got {:?}", other),
    }
}

#[test]
fn overloaded_operators_including_shift_right() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class V { \
           public static V operator +(V a, V b) { return a; } \
           public static V operator >>(V a, int n) { return a; } \
           public static bool operator true(V a) { return false; } \
           public static bool operator false(V a) { return true; } \
         }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Operator(op) => {
            assert_eq!(op.kind, OperatorKind::Overload(TokenKind::Plus));
        }
        other => panic!("expected operator, got {:?}", other),
    }
    match &decl.members[1] {
        MemberDeclaration::Operator(op) => {
            assert_eq!(op.kind, OperatorKind::OverloadShiftRight);
        }
        other => panic!("expected operator, got {:?}", other),
    }
    match &decl.members[2] {
        MemberDeclaration::Operator(op) => {
            assert_eq!(op.kind, OperatorKind::Overload(TokenKind::True));
        }
        other => panic!("expected operator, got {:?}", other),
    }
}

#[test]
fn indexers_plain_and_explicit_interface() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class C : IList { \
           public int this[int i, int j] { get { return 0; } set { } } \
           object IList.this[int i] { get { return null; } } \
         }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Indexer(ix) => {
            assert!(ix.interface_name.is_none());
            assert_eq!(ix.parameters.len(), 2);
            assert!(ix.get_region.is_some());
            assert!(ix.set_region.is_some());
        }
        other => panic!("expected indexer, got {:?}", other),
    }
    match &decl.members[1] {
        MemberDeclaration::Indexer(ix) => {
            assert_eq!(ix.interface_name.as_deref(), Some("IList"));
            assert!(ix.set_region.is_none());
        }
        other => panic!("expected indexer, got {:?}", other),
    }
}

#[test]
fn interface_members_are_bodiless() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "interface IService { \
           void Start(); \
           int Status { get; } \
           event EventHandler Stopped; \
           string this[int i] { get; set; } \
           new T Make<T>(int n) where T : class; \
         }",
    );
    let decl = first_type(&unit);
    assert_eq!(decl.kind, TypeKind::Interface);
    assert_eq!(decl.members.len(), 5);
    match &decl.members[0] {
        MemberDeclaration::Method(m) => {
            assert_eq!(m.return_type.name, "void");
            assert!(m.body.is_none());
        }
        other => panic!("expected method, got {:?}", other),
    }
    match &decl.members[4] {
        MemberDeclaration::Method(m) => {
            assert!(m.modifiers.contains(Modifiers::NEW));
            assert_eq!(m.type_parameters.len(), 1);
            assert_eq!(m.constraints.len(), 1);
        }
        other => panic!("expected method, got {:?}", other),
    }
}

#[test]
fn explicit_interface_method_and_property() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class C : IFoo { void IFoo.Run() { } int IFoo.Count { get { return 0; } } }",
    );
    let decl = first_type(&unit);
    let m = method(decl, 0);
    assert_eq!(m.name, "IFoo.Run");
    match &decl.members[1] {
        MemberDeclaration::Property(p) => assert_eq!(p.name, "IFoo.Count"),
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn attributes_global_targeted_and_named() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "[assembly: AssemblyTitle(\"app\")] \
         class C { \
           [Obsolete(\"old\", Error = true)] \
           [field: NonSerialized] \
           int f; \
           [return: MarshalAs(1)] int M() { return 0; } \
         }",
    );
    assert_eq!(unit.attributes.len(), 1);
    assert_eq!(unit.attributes[0].target, "assembly");
    assert_eq!(unit.attributes[0].attributes[0].name, "AssemblyTitle");

    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Field(field) => {
            assert_eq!(field.attributes.len(), 2);
            let obsolete = &field.attributes[0].attributes[0];
            assert_eq!(obsolete.name, "Obsolete");
            assert_eq!(obsolete.positional_arguments.len(), 1);
            assert_eq!(obsolete.named_arguments.len(), 1);
            assert_eq!(obsolete.named_arguments[0].name, "Error");
            assert_eq!(field.attributes[1].target, "field");
        }
        other => panic!("expected field, got {:?}", other),
    }
    let m = method(decl, 1);
    assert_eq!(m.attributes[0].target, "return");
}

#[test]
fn adjacent_attribute_sections_stay_siblings() {
    let arena = Bump::new();
    let unit = parse_ok(&arena, "class C { [A] [B] int f; }");
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Field(field) => {
            assert_eq!(field.attributes.len(), 2);
            assert_eq!(field.attributes[0].attributes[0].name, "A");
            assert_eq!(field.attributes[1].attributes[0].name, "B");
        }
        other => panic!("expected field, got {:?}", other),
    }
}

#[test]
fn partial_and_nested_types() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "public partial class Outer { struct Inner { int x; } enum E { A } }",
    );
    let decl = first_type(&unit);
    assert!(decl.modifiers.contains(Modifiers::PARTIAL));
    assert!(matches!(
        &decl.members[0],
        MemberDeclaration::Type(t) if t.kind == TypeKind::Struct
    ));
    assert!(matches!(
        &decl.members[1],
        MemberDeclaration::Type(t) if t.kind == TypeKind::Enum
    ));
}

#[test]
fn parameter_modifiers() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class C { int M(ref int a, out int b, params object[] rest) { b = 0; return a; } }",
    );
    let decl = first_type(&unit);
    let m = method(decl, 0);
    assert_eq!(m.parameters[0].modifier, ParamModifier::Ref);
    assert_eq!(m.parameters[1].modifier, ParamModifier::Out);
    assert_eq!(m.parameters[2].modifier, ParamModifier::Params);
    assert_eq!(m.parameters[2].type_reference.rank_specifiers, &[1]);
}

#[test]
fn constants_and_readonly_fields() {
    let arena = Bump::new();
    let unit = parse_ok(
        &arena,
        "class C { public const int Max = 10, Min = -10; static readonly int[] table = { 1, 2 }; }",
    );
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Field(field) => {
            assert!(field.modifiers.contains(Modifiers::CONST));
            assert_eq!(field.declarators.len(), 2);
            assert!(field.declarators[1].initializer.is_some());
        }
        other => panic!("expected constant field, got {:?}", other),
    }
    match &decl.members[1] {
        MemberDeclaration::Field(field) => {
            assert!(field.modifiers.contains(Modifiers::READONLY));
            assert!(matches!(
                field.declarators[0].initializer.unwrap(),
                Expression::ArrayInitializer(_)
            ));
        }
        other => panic!("expected field, got {:?}", other),
    }
}

#[test]
fn void_pointer_member() {
    let arena = Bump::new();
    let unit = parse_ok(&arena, "unsafe class C { void* cursor; }");
    let decl = first_type(&unit);
    match &decl.members[0] {
        MemberDeclaration::Field(field) => {
            assert_eq!(field.type_reference.name, "void");
            assert_eq!(field.type_reference.pointer_nesting, 1);
        }
        other => panic!("expected field, got {:?}", other),
    }
}

#[test]
fn skeleton_mode_skips_bodies() {
    let arena = Bump::new();
    let options = rsharp_parser::ParserOptions {
        parse_method_bodies: false,
    };
    let (unit, diagnostics) = rsharp_parser::parse_with_options(
        &arena,
        "class C { int M() { int x = f(); return x; } int g; }",
        options,
    );
    assert!(diagnostics.is_empty(), "{:#?}", diagnostics.diagnostics());
    let decl = first_type(&unit);
    assert_eq!(decl.members.len(), 2);
    match &decl.members[0] {
        MemberDeclaration::Method(m) => {
            let body = m.body.as_ref().unwrap();
            assert!(body.statements.is_empty());
            assert!(body.span.start < body.span.end);
        }
        other => panic!("expected method, got {:?}", other),
    }
    assert!(matches!(&decl.members[1], MemberDeclaration::Field(_)));
}

#[test]
fn spans_are_ordered_and_nested() {
    let arena = Bump::new();
    let source = "namespace N { class C { int M(int a) { return a + 1; } } }";
    let unit = parse_ok(&arena, source);
    assert!(unit.span.start <= unit.span.end);
    let ns = match &unit.members[0] {
        NamespaceMember::Namespace(ns) => ns,
        other => panic!("expected namespace, got {:?}", other),
    };
    assert!(unit.span.encloses(&ns.span));
    let decl = match &ns.members[0] {
        NamespaceMember::Type(decl) => decl,
        other => panic!("expected type, got {:?}", other),
    };
    assert!(ns.span.encloses(&decl.span));
    let member_span = decl.members[0].span();
    assert!(decl.span.encloses(&member_span));
}
