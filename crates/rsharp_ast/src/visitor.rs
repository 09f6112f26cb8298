//! Read-only AST traversal.
//!
//! Implementors override the `visit_*` hooks they care about; each default
//! delegates to the matching `walk_*` function, which recurses into the
//! children in source order. Overrides that still want recursion call the
//! `walk_*` function themselves.

use crate::node::*;

pub trait Visitor<'a>: Sized {
    fn visit_compilation_unit(&mut self, unit: &CompilationUnit<'a>) {
        walk_compilation_unit(self, unit);
    }

    fn visit_using(&mut self, using: &UsingDeclaration<'a>) {
        let _ = using;
    }

    fn visit_namespace_member(&mut self, member: &NamespaceMember<'a>) {
        walk_namespace_member(self, member);
    }

    fn visit_namespace(&mut self, ns: &NamespaceDeclaration<'a>) {
        walk_namespace(self, ns);
    }

    fn visit_type_declaration(&mut self, decl: &TypeDeclaration<'a>) {
        walk_type_declaration(self, decl);
    }

    fn visit_delegate_declaration(&mut self, decl: &DelegateDeclaration<'a>) {
        walk_delegate_declaration(self, decl);
    }

    fn visit_member(&mut self, member: &MemberDeclaration<'a>) {
        walk_member(self, member);
    }

    fn visit_attribute_section(&mut self, section: &AttributeSection<'a>) {
        walk_attribute_section(self, section);
    }

    fn visit_parameter(&mut self, param: &ParameterDeclaration<'a>) {
        walk_parameter(self, param);
    }

    fn visit_type_reference(&mut self, ty: &TypeReference<'a>) {
        walk_type_reference(self, ty);
    }

    fn visit_block(&mut self, block: &Block<'a>) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        walk_expression(self, expr);
    }
}

pub fn walk_compilation_unit<'a, V: Visitor<'a>>(v: &mut V, unit: &CompilationUnit<'a>) {
    for using in unit.usings {
        v.visit_using(using);
    }
    for section in unit.attributes {
        v.visit_attribute_section(section);
    }
    for member in unit.members {
        v.visit_namespace_member(member);
    }
}

pub fn walk_namespace_member<'a, V: Visitor<'a>>(v: &mut V, member: &NamespaceMember<'a>) {
    match member {
        NamespaceMember::Namespace(ns) => v.visit_namespace(ns),
        NamespaceMember::Type(decl) => v.visit_type_declaration(decl),
        NamespaceMember::Delegate(decl) => v.visit_delegate_declaration(decl),
    }
}

pub fn walk_namespace<'a, V: Visitor<'a>>(v: &mut V, ns: &NamespaceDeclaration<'a>) {
    for using in ns.usings {
        v.visit_using(using);
    }
    for member in ns.members {
        v.visit_namespace_member(member);
    }
}

pub fn walk_type_declaration<'a, V: Visitor<'a>>(v: &mut V, decl: &TypeDeclaration<'a>) {
    for section in decl.attributes {
        v.visit_attribute_section(section);
    }
    for base in decl.base_types {
        v.visit_type_reference(base);
    }
    for clause in decl.constraints {
        for constraint in clause.constraints {
            if let Constraint::Type(ty) = constraint {
                v.visit_type_reference(ty);
            }
        }
    }
    for member in decl.members {
        v.visit_member(member);
    }
}

pub fn walk_delegate_declaration<'a, V: Visitor<'a>>(v: &mut V, decl: &DelegateDeclaration<'a>) {
    for section in decl.attributes {
        v.visit_attribute_section(section);
    }
    v.visit_type_reference(&decl.return_type);
    for param in decl.parameters {
        v.visit_parameter(param);
    }
}

pub fn walk_member<'a, V: Visitor<'a>>(v: &mut V, member: &MemberDeclaration<'a>) {
    match member {
        MemberDeclaration::Field(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            v.visit_type_reference(&n.type_reference);
            for d in n.declarators {
                if let Some(init) = d.initializer {
                    v.visit_expression(init);
                }
            }
        }
        MemberDeclaration::Property(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            v.visit_type_reference(&n.type_reference);
            for region in [&n.get_region, &n.set_region].into_iter().flatten() {
                walk_accessor(v, region);
            }
        }
        MemberDeclaration::Method(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            v.visit_type_reference(&n.return_type);
            for param in n.parameters {
                v.visit_parameter(param);
            }
            if let Some(body) = &n.body {
                v.visit_block(body);
            }
        }
        MemberDeclaration::Constructor(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            for param in n.parameters {
                v.visit_parameter(param);
            }
            if let Some(init) = &n.initializer {
                for arg in init.arguments {
                    v.visit_expression(arg);
                }
            }
            if let Some(body) = &n.body {
                v.visit_block(body);
            }
        }
        MemberDeclaration::Destructor(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            if let Some(body) = &n.body {
                v.visit_block(body);
            }
        }
        MemberDeclaration::Event(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            v.visit_type_reference(&n.type_reference);
            for d in n.declarators {
                if let Some(init) = d.initializer {
                    v.visit_expression(init);
                }
            }
            for region in [&n.add_region, &n.remove_region].into_iter().flatten() {
                walk_accessor(v, region);
            }
        }
        MemberDeclaration::Operator(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            v.visit_type_reference(&n.return_type);
            for param in n.parameters {
                v.visit_parameter(param);
            }
            if let Some(body) = &n.body {
                v.visit_block(body);
            }
        }
        MemberDeclaration::Indexer(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            v.visit_type_reference(&n.type_reference);
            for param in n.parameters {
                v.visit_parameter(param);
            }
            for region in [&n.get_region, &n.set_region].into_iter().flatten() {
                walk_accessor(v, region);
            }
        }
        MemberDeclaration::Type(n) => v.visit_type_declaration(n),
        MemberDeclaration::Delegate(n) => v.visit_delegate_declaration(n),
        MemberDeclaration::EnumMember(n) => {
            for section in n.attributes {
                v.visit_attribute_section(section);
            }
            if let Some(init) = n.initializer {
                v.visit_expression(init);
            }
        }
    }
}

fn walk_accessor<'a, V: Visitor<'a>>(v: &mut V, accessor: &AccessorDeclaration<'a>) {
    for section in accessor.attributes {
        v.visit_attribute_section(section);
    }
    if let Some(body) = &accessor.body {
        v.visit_block(body);
    }
}

pub fn walk_attribute_section<'a, V: Visitor<'a>>(v: &mut V, section: &AttributeSection<'a>) {
    for attribute in section.attributes {
        for arg in attribute.positional_arguments {
            v.visit_expression(arg);
        }
        for named in attribute.named_arguments {
            v.visit_expression(named.expression);
        }
    }
}

pub fn walk_parameter<'a, V: Visitor<'a>>(v: &mut V, param: &ParameterDeclaration<'a>) {
    for section in param.attributes {
        v.visit_attribute_section(section);
    }
    v.visit_type_reference(&param.type_reference);
}

pub fn walk_type_reference<'a, V: Visitor<'a>>(v: &mut V, ty: &TypeReference<'a>) {
    for arg in ty.generic_args {
        v.visit_type_reference(arg);
    }
}

pub fn walk_block<'a, V: Visitor<'a>>(v: &mut V, block: &Block<'a>) {
    for stmt in block.statements {
        v.visit_statement(stmt);
    }
}

pub fn walk_statement<'a, V: Visitor<'a>>(v: &mut V, stmt: &Statement<'a>) {
    match stmt {
        Statement::Block(n) => v.visit_block(n),
        Statement::Empty(_) => {}
        Statement::Expression(n) => v.visit_expression(n.expression),
        Statement::LocalVariable(n) => {
            v.visit_type_reference(&n.type_reference);
            for d in n.declarators {
                if let Some(init) = d.initializer {
                    v.visit_expression(init);
                }
            }
        }
        Statement::If(n) => {
            v.visit_expression(n.condition);
            v.visit_statement(n.true_statement);
            if let Some(false_stmt) = n.false_statement {
                v.visit_statement(false_stmt);
            }
        }
        Statement::Switch(n) => {
            v.visit_expression(n.expression);
            for section in n.sections {
                for label in section.labels {
                    if let Some(expr) = label.expression {
                        v.visit_expression(expr);
                    }
                }
                for s in section.statements {
                    v.visit_statement(s);
                }
            }
        }
        Statement::While(n) => {
            v.visit_expression(n.condition);
            v.visit_statement(n.body);
        }
        Statement::DoWhile(n) => {
            v.visit_statement(n.body);
            v.visit_expression(n.condition);
        }
        Statement::For(n) => {
            for init in n.initializers {
                v.visit_statement(init);
            }
            if let Some(cond) = n.condition {
                v.visit_expression(cond);
            }
            for iter in n.iterators {
                v.visit_statement(iter);
            }
            v.visit_statement(n.body);
        }
        Statement::Foreach(n) => {
            v.visit_type_reference(&n.type_reference);
            v.visit_expression(n.expression);
            v.visit_statement(n.body);
        }
        Statement::Break(_) | Statement::Continue(_) => {}
        Statement::Goto(n) => {
            if let GotoKind::Case(expr) = &n.kind {
                v.visit_expression(expr);
            }
        }
        Statement::Return(n) => {
            if let Some(expr) = n.expression {
                v.visit_expression(expr);
            }
        }
        Statement::Throw(n) => {
            if let Some(expr) = n.expression {
                v.visit_expression(expr);
            }
        }
        Statement::TryCatch(n) => {
            v.visit_block(&n.try_block);
            for clause in n.catches {
                if let Some(ty) = &clause.type_reference {
                    v.visit_type_reference(ty);
                }
                v.visit_block(&clause.block);
            }
            if let Some(fin) = &n.finally_block {
                v.visit_block(fin);
            }
        }
        Statement::Lock(n) => {
            v.visit_expression(n.expression);
            v.visit_statement(n.body);
        }
        Statement::Using(n) => {
            v.visit_statement(n.resource);
            v.visit_statement(n.body);
        }
        Statement::Unsafe(n) => v.visit_block(&n.block),
        Statement::Fixed(n) => {
            v.visit_type_reference(&n.type_reference);
            for d in n.declarators {
                if let Some(init) = d.initializer {
                    v.visit_expression(init);
                }
            }
            v.visit_statement(n.body);
        }
        Statement::Checked(n) => v.visit_block(&n.block),
        Statement::Unchecked(n) => v.visit_block(&n.block),
        Statement::Yield(n) => {
            if let YieldKind::Return(expr) = &n.kind {
                v.visit_expression(expr);
            }
        }
        Statement::Label(n) => v.visit_statement(n.statement),
    }
}

pub fn walk_expression<'a, V: Visitor<'a>>(v: &mut V, expr: &Expression<'a>) {
    match expr {
        Expression::Primitive(_)
        | Expression::This(_)
        | Expression::Base(_) => {}
        Expression::Direction(n) => v.visit_expression(n.expression),
        Expression::Identifier(n) => {
            for arg in n.type_arguments {
                v.visit_type_reference(arg);
            }
        }
        Expression::Parenthesized(n) => v.visit_expression(n.expression),
        Expression::TypeRef(n) => v.visit_type_reference(&n.type_reference),
        Expression::TypeOf(n) => v.visit_type_reference(&n.type_reference),
        Expression::SizeOf(n) => v.visit_type_reference(&n.type_reference),
        Expression::Checked(n) => v.visit_expression(n.expression),
        Expression::Unchecked(n) => v.visit_expression(n.expression),
        Expression::StackAlloc(n) => {
            v.visit_type_reference(&n.type_reference);
            v.visit_expression(n.expression);
        }
        Expression::AnonymousMethod(n) => {
            for param in n.parameters {
                v.visit_parameter(param);
            }
            v.visit_block(&n.body);
        }
        Expression::ObjectCreate(n) => {
            v.visit_type_reference(&n.type_reference);
            for arg in n.arguments {
                v.visit_expression(arg);
            }
        }
        Expression::ArrayCreate(n) => {
            v.visit_type_reference(&n.type_reference);
            for arg in n.arguments {
                v.visit_expression(arg);
            }
            if let Some(init) = &n.initializer {
                for e in init.elements {
                    v.visit_expression(e);
                }
            }
        }
        Expression::ArrayInitializer(n) => {
            for e in n.elements {
                v.visit_expression(e);
            }
        }
        Expression::Unary(n) => v.visit_expression(n.expression),
        Expression::Cast(n) => {
            v.visit_type_reference(&n.target_type);
            v.visit_expression(n.expression);
        }
        Expression::Binary(n) => {
            v.visit_expression(n.left);
            v.visit_expression(n.right);
        }
        Expression::TypeTest(n) => {
            v.visit_expression(n.expression);
            v.visit_type_reference(&n.target_type);
        }
        Expression::Conditional(n) => {
            v.visit_expression(n.condition);
            v.visit_expression(n.true_expression);
            v.visit_expression(n.false_expression);
        }
        Expression::Assignment(n) => {
            v.visit_expression(n.left);
            v.visit_expression(n.right);
        }
        Expression::Invocation(n) => {
            v.visit_expression(n.target);
            for arg in n.arguments {
                v.visit_expression(arg);
            }
        }
        Expression::MemberReference(n) => {
            v.visit_expression(n.target);
            for arg in n.type_arguments {
                v.visit_type_reference(arg);
            }
        }
        Expression::PointerReference(n) => v.visit_expression(n.target),
        Expression::Indexer(n) => {
            v.visit_expression(n.target);
            for idx in n.indexes {
                v.visit_expression(idx);
            }
        }
    }
}
