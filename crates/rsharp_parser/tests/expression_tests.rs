//! Expression-level tests: precedence, associativity, and the lookahead
//! disambiguations (cast vs. parenthesized, generics vs. comparison,
//! shift-right reassembly, nullable suffixes).

use bumpalo::Bump;
use rsharp_ast::node::*;
use rsharp_ast::types::LiteralValue;

fn expr<'a>(arena: &'a Bump, source: &str) -> Expression<'a> {
    let (expression, diagnostics) = rsharp_parser::parse_expression(arena, source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:#?}",
        source,
        diagnostics.diagnostics()
    );
    expression
}

fn binary<'e, 'a>(e: &'e Expression<'a>) -> &'e BinaryOperatorExpression<'a> {
    match e {
        Expression::Binary(b) => b,
        other => panic!("expected binary, got {:?}", other),
    }
}

fn ident_named(e: &Expression<'_>, name: &str) -> bool {
    matches!(e, Expression::Identifier(id) if id.name == name)
}

#[test]
fn precedence_levels() {
    let arena = Bump::new();
    // a + b * c  =>  a + (b * c)
    let e = expr(&arena, "a + b * c");
    let add = binary(&e);
    assert_eq!(add.operator, BinaryOperator::Add);
    assert!(ident_named(add.left, "a"));
    assert_eq!(binary(add.right).operator, BinaryOperator::Multiply);

    // a << b + c  =>  a << (b + c)
    let e = expr(&arena, "a << b + c");
    let shift = binary(&e);
    assert_eq!(shift.operator, BinaryOperator::ShiftLeft);
    assert_eq!(binary(shift.right).operator, BinaryOperator::Add);

    // a == b & c | d  =>  ((a == b) & c) | d
    let e = expr(&arena, "a == b & c | d");
    let or = binary(&e);
    assert_eq!(or.operator, BinaryOperator::BitwiseOr);
    let and = binary(or.left);
    assert_eq!(and.operator, BinaryOperator::BitwiseAnd);
    assert_eq!(binary(and.left).operator, BinaryOperator::Equality);

    // a || b && c  =>  a || (b && c)
    let e = expr(&arena, "a || b && c");
    let or = binary(&e);
    assert_eq!(or.operator, BinaryOperator::LogicalOr);
    assert_eq!(binary(or.right).operator, BinaryOperator::LogicalAnd);
}

#[test]
fn binary_operators_are_left_associative() {
    let arena = Bump::new();
    let e = expr(&arena, "a - b - c");
    let outer = binary(&e);
    assert!(ident_named(outer.right, "c"));
    let inner = binary(outer.left);
    assert!(ident_named(inner.left, "a"));
    assert!(ident_named(inner.right, "b"));
}

#[test]
fn assignment_and_conditional_are_right_associative() {
    let arena = Bump::new();
    let e = expr(&arena, "a = b = c");
    match &e {
        Expression::Assignment(outer) => {
            assert!(ident_named(outer.left, "a"));
            assert!(matches!(outer.right, Expression::Assignment(_)));
        }
        other => panic!("expected assignment, got {:?}", other),
    }

    let e = expr(&arena, "a ? b : c ? d : e");
    match &e {
        Expression::Conditional(outer) => {
            assert!(ident_named(outer.condition, "a"));
            assert!(matches!(
                outer.false_expression,
                Expression::Conditional(_)
            ));
        }
        other => panic!("expected conditional, got {:?}", other),
    }
}

#[test]
fn compound_assignment_including_shift_right() {
    let arena = Bump::new();
    let e = expr(&arena, "x += 1");
    assert!(matches!(
        &e,
        Expression::Assignment(a) if a.operator == AssignmentOperator::Add
    ));
    let e = expr(&arena, "x <<= 1");
    assert!(matches!(
        &e,
        Expression::Assignment(a) if a.operator == AssignmentOperator::ShiftLeft
    ));
    // `>>=` arrives as `>` `>=` and is reassembled
    let e = expr(&arena, "x >>= 1");
    assert!(matches!(
        &e,
        Expression::Assignment(a) if a.operator == AssignmentOperator::ShiftRight
    ));
}

#[test]
fn shift_right_in_expressions() {
    let arena = Bump::new();
    let e = expr(&arena, "x >> y");
    let shift = binary(&e);
    assert_eq!(shift.operator, BinaryOperator::ShiftRight);
    assert!(ident_named(shift.left, "x"));
    assert!(ident_named(shift.right, "y"));

    // relational > survives next to shifts
    let e = expr(&arena, "a >> b > c");
    let rel = binary(&e);
    assert_eq!(rel.operator, BinaryOperator::GreaterThan);
    assert_eq!(binary(rel.left).operator, BinaryOperator::ShiftRight);
}

#[test]
fn nested_generic_type_closes_two_lists() {
    let arena = Bump::new();
    let source = "class C { void M() { List<Dictionary<int, string>> m = new List<Dictionary<int, string>>(); } }";
    let (unit, diagnostics) = rsharp_parser::parse(&arena, source);
    assert!(diagnostics.is_empty(), "{:#?}", diagnostics.diagnostics());
    let decl = match &unit.members[0] {
        NamespaceMember::Type(decl) => decl,
        other => panic!("expected type, got {:?}", other),
    };
    let body = match &decl.members[0] {
        MemberDeclaration::Method(m) => m.body.as_ref().unwrap(),
        other => panic!("expected method, got {:?}", other),
    };
    match &body.statements[0] {
        Statement::LocalVariable(local) => {
            let ty = &local.type_reference;
            assert_eq!(ty.name, "List");
            assert_eq!(ty.pointer_nesting, 0);
            assert!(ty.rank_specifiers.is_empty());
            assert_eq!(ty.generic_args.len(), 1);
            let dict = &ty.generic_args[0];
            assert_eq!(dict.name, "Dictionary");
            assert_eq!(dict.generic_args.len(), 2);
            assert_eq!(dict.generic_args[0].name, "int");
            assert_eq!(dict.generic_args[1].name, "string");

            match local.declarators[0].initializer.unwrap() {
                Expression::ObjectCreate(create) => {
                    assert_eq!(create.type_reference.name, "List");
                    assert_eq!(create.type_reference.generic_args.len(), 1);
                    assert!(create.arguments.is_empty());
                }
                other => panic!("expected object creation, got {:?}", other),
            }
        }
        other => panic!("expected local variable, got {:?}", other),
    }
}

#[test]
fn cast_vs_parenthesized() {
    let arena = Bump::new();
    // `(int)(a + b) + c` is a cast of the parenthesized sum, then addition
    let e = expr(&arena, "(int)(a + b) + c");
    let add = binary(&e);
    assert_eq!(add.operator, BinaryOperator::Add);
    assert!(ident_named(add.right, "c"));
    match add.left {
        Expression::Cast(cast) => {
            assert_eq!(cast.target_type.name, "int");
            match cast.expression {
                Expression::Parenthesized(paren) => {
                    assert_eq!(binary(paren.expression).operator, BinaryOperator::Add);
                }
                other => panic!("expected parenthesized, got {:?}", other),
            }
        }
        other => panic!("expected cast, got {:?}", other),
    }

    // `(a) + b` stays an addition: `+` is not a cast follower
    let e = expr(&arena, "(a) + b");
    let add = binary(&e);
    assert!(matches!(add.left, Expression::Parenthesized(_)));

    // `(T)x` is a cast: an identifier follows
    let e = expr(&arena, "(T)x");
    assert!(matches!(&e, Expression::Cast(_)));
}

#[test]
fn generic_call_vs_comparison() {
    let arena = Bump::new();
    // generic invocation
    let e = expr(&arena, "f<int, string>(x)");
    match &e {
        Expression::Invocation(call) => match call.target {
            Expression::Identifier(id) => {
                assert_eq!(id.name, "f");
                assert_eq!(id.type_arguments.len(), 2);
            }
            other => panic!("expected identifier target, got {:?}", other),
        },
        other => panic!("expected invocation, got {:?}", other),
    }

    // comparisons keep their shape
    let e = expr(&arena, "a < b");
    assert_eq!(binary(&e).operator, BinaryOperator::LessThan);

    // generic member access on a type chain
    let e = expr(&arena, "List<int>.Empty");
    match &e {
        Expression::MemberReference(member) => {
            assert_eq!(member.member_name, "Empty");
            match member.target {
                Expression::TypeRef(ty) => {
                    assert_eq!(ty.type_reference.name, "List");
                    assert_eq!(ty.type_reference.generic_args.len(), 1);
                }
                other => panic!("expected type reference, got {:?}", other),
            }
        }
        other => panic!("expected member reference, got {:?}", other),
    }

    // generic method through a receiver
    let e = expr(&arena, "box.Get<string>()");
    match &e {
        Expression::Invocation(call) => match call.target {
            Expression::MemberReference(member) => {
                assert_eq!(member.member_name, "Get");
                assert_eq!(member.type_arguments.len(), 1);
            }
            other => panic!("expected member reference, got {:?}", other),
        },
        other => panic!("expected invocation, got {:?}", other),
    }
}

#[test]
fn postfix_chains() {
    let arena = Bump::new();
    let e = expr(&arena, "a.b.c(1)[i]++");
    match &e {
        Expression::Unary(post) => {
            assert_eq!(post.operator, UnaryOperator::PostIncrement);
            match post.expression {
                Expression::Indexer(indexer) => {
                    assert!(matches!(indexer.target, Expression::Invocation(_)));
                }
                other => panic!("expected indexer, got {:?}", other),
            }
        }
        other => panic!("expected post-increment, got {:?}", other),
    }

    let e = expr(&arena, "p->next->value");
    match &e {
        Expression::PointerReference(outer) => {
            assert_eq!(outer.member_name, "value");
            assert!(matches!(outer.target, Expression::PointerReference(_)));
        }
        other => panic!("expected pointer reference, got {:?}", other),
    }
}

#[test]
fn prefix_stack_preserves_source_order() {
    let arena = Bump::new();
    // !(bool)-x : not, cast, negate, from outermost in
    let e = expr(&arena, "!(bool)-x");
    match &e {
        Expression::Unary(not) => {
            assert_eq!(not.operator, UnaryOperator::Not);
            match not.expression {
                Expression::Cast(cast) => {
                    assert_eq!(cast.target_type.name, "bool");
                    match cast.expression {
                        Expression::Unary(neg) => {
                            assert_eq!(neg.operator, UnaryOperator::Minus);
                            assert!(ident_named(neg.expression, "x"));
                        }
                        other => panic!("expected negation, got {:?}", other),
                    }
                }
                other => panic!("expected cast, got {:?}", other),
            }
        }
        other => panic!("expected not, got {:?}", other),
    }
}

#[test]
fn is_and_as_with_nullable() {
    let arena = Bump::new();
    let e = expr(&arena, "x is int?");
    match &e {
        Expression::TypeTest(test) => {
            assert_eq!(test.operator, TypeTestOperator::Is);
            assert_eq!(test.target_type.name, "System.Nullable");
            assert_eq!(test.target_type.generic_args[0].name, "int");
        }
        other => panic!("expected type test, got {:?}", other),
    }

    // the `?` belongs to the conditional here
    let e = expr(&arena, "x is int ? a : b");
    match &e {
        Expression::Conditional(cond) => {
            assert!(matches!(cond.condition, Expression::TypeTest(_)));
        }
        other => panic!("expected conditional, got {:?}", other),
    }

    let e = expr(&arena, "x as List<int>");
    match &e {
        Expression::TypeTest(test) => {
            assert_eq!(test.operator, TypeTestOperator::As);
            assert_eq!(test.target_type.name, "List");
        }
        other => panic!("expected type test, got {:?}", other),
    }
}

#[test]
fn nullable_declarations_and_void_rejection() {
    let arena = Bump::new();
    let (unit, diagnostics) = rsharp_parser::parse(&arena, "class C { int? n; }");
    assert!(diagnostics.is_empty(), "{:#?}", diagnostics.diagnostics());
    let decl = match &unit.members[0] {
        NamespaceMember::Type(decl) => decl,
        other => panic!("expected type, got {:?}", other),
    };
    match &decl.members[0] {
        MemberDeclaration::Field(field) => {
            assert_eq!(field.type_reference.name, "System.Nullable");
            assert_eq!(field.type_reference.generic_args[0].name, "int");
        }
        other => panic!("expected field, got {:?}", other),
    }

    let (_, diagnostics) = rsharp_parser::parse(&arena, "class C { void M() { f(typeof(void?)); } }");
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message_text.contains("void cannot be nullable")));
}

#[test]
fn new_expressions() {
    let arena = Bump::new();
    let e = expr(&arena, "new Point(1, 2)");
    match &e {
        Expression::ObjectCreate(create) => {
            assert_eq!(create.type_reference.name, "Point");
            assert_eq!(create.arguments.len(), 2);
        }
        other => panic!("expected object creation, got {:?}", other),
    }

    let e = expr(&arena, "new int[3, 4]");
    match &e {
        Expression::ArrayCreate(create) => {
            assert_eq!(create.arguments.len(), 2);
            assert!(create.initializer.is_none());
        }
        other => panic!("expected array creation, got {:?}", other),
    }

    let e = expr(&arena, "new int[] { 1, 2, 3 }");
    match &e {
        Expression::ArrayCreate(create) => {
            assert!(create.arguments.is_empty());
            assert_eq!(create.type_reference.rank_specifiers, &[1]);
            assert_eq!(create.initializer.as_ref().unwrap().elements.len(), 3);
        }
        other => panic!("expected array creation, got {:?}", other),
    }

    let e = expr(&arena, "new int[,] { { 1, 2 }, { 3, 4 } }");
    match &e {
        Expression::ArrayCreate(create) => {
            assert_eq!(create.type_reference.rank_specifiers, &[2]);
            let init = create.initializer.as_ref().unwrap();
            assert_eq!(init.elements.len(), 2);
            assert!(matches!(init.elements[0], Expression::ArrayInitializer(_)));
        }
        other => panic!("expected array creation, got {:?}", other),
    }
}

#[test]
fn indexing_an_array_creation_is_rejected() {
    let arena = Bump::new();
    let (_, diagnostics) = rsharp_parser::parse_expression(&arena, "new int[3][0]");
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.message_text.contains("element access")));
}

#[test]
fn anonymous_methods() {
    let arena = Bump::new();
    let e = expr(&arena, "delegate(int a, int b) { return a + b; }");
    match &e {
        Expression::AnonymousMethod(anon) => {
            assert!(anon.has_parameter_list);
            assert_eq!(anon.parameters.len(), 2);
            assert_eq!(anon.body.statements.len(), 1);
        }
        other => panic!("expected anonymous method, got {:?}", other),
    }

    let e = expr(&arena, "delegate { done = true; }");
    match &e {
        Expression::AnonymousMethod(anon) => {
            assert!(!anon.has_parameter_list);
            assert!(anon.parameters.is_empty());
        }
        other => panic!("expected anonymous method, got {:?}", other),
    }
}

#[test]
fn primary_heads() {
    let arena = Bump::new();
    assert!(matches!(expr(&arena, "this"), Expression::This(_)));
    match expr(&arena, "base.Count") {
        Expression::MemberReference(member) => {
            assert!(matches!(member.target, Expression::Base(_)));
        }
        other => panic!("expected member reference, got {:?}", other),
    }
    match expr(&arena, "typeof(List<int>)") {
        Expression::TypeOf(t) => assert_eq!(t.type_reference.name, "List"),
        other => panic!("expected typeof, got {:?}", other),
    }
    match expr(&arena, "sizeof(long)") {
        Expression::SizeOf(s) => assert_eq!(s.type_reference.name, "long"),
        other => panic!("expected sizeof, got {:?}", other),
    }
    match expr(&arena, "int.MaxValue") {
        Expression::MemberReference(member) => {
            assert_eq!(member.member_name, "MaxValue");
            assert!(matches!(member.target, Expression::TypeRef(_)));
        }
        other => panic!("expected member reference, got {:?}", other),
    }
    match expr(&arena, "global::System.Console") {
        Expression::MemberReference(member) => match member.target {
            Expression::TypeRef(ty) => assert!(ty.type_reference.is_global),
            other => panic!("expected type reference, got {:?}", other),
        },
        other => panic!("expected member reference, got {:?}", other),
    }
}

#[test]
fn literal_values() {
    let arena = Bump::new();
    match expr(&arena, "\"text\"") {
        Expression::Primitive(p) => {
            assert_eq!(p.value, LiteralValue::Str("text".to_string()));
        }
        other => panic!("expected literal, got {:?}", other),
    }
    match expr(&arena, "true") {
        Expression::Primitive(p) => assert_eq!(p.value, LiteralValue::Bool(true)),
        other => panic!("expected literal, got {:?}", other),
    }
}

#[test]
fn ref_and_out_arguments() {
    let arena = Bump::new();
    let e = expr(&arena, "int.TryParse(text, out value)");
    match &e {
        Expression::Invocation(call) => {
            assert_eq!(call.arguments.len(), 2);
            match &call.arguments[1] {
                Expression::Direction(d) => assert_eq!(d.direction, FieldDirection::Out),
                other => panic!("expected out argument, got {:?}", other),
            }
        }
        other => panic!("expected invocation, got {:?}", other),
    }
}
