//! The recursive-descent parser.
//!
//! One function per nonterminal. Each production records the start
//! location of its first token, consumes tokens via `expect`/`advance`
//! (or after a predicate match), invokes child productions, and stamps its
//! end location from the last consumed token. Declarations attach to the
//! innermost open scope of the compilation-unit assembler.
//!
//! The parser never aborts on a grammar error: `expect` reports and does
//! not advance, alternative-exhausted positions report `invalid <rule>`
//! and resynchronize, and the `err_dist` throttle keeps a malformed region
//! from producing a diagnostic storm.

use bumpalo::Bump;

use rsharp_ast::node::*;
use rsharp_ast::types::LiteralValue;
use rsharp_ast::{ModifierList, Modifiers, TokenKind};
use rsharp_core::{Location, Span};
use rsharp_diagnostics::{messages, DiagnosticCollection, DiagnosticMessage};
use rsharp_lexer::Lexer;

use crate::assembler::Assembler;
use crate::token_sets;

/// Diagnostics are suppressed while fewer than this many tokens have been
/// consumed since the previous report.
const MIN_ERR_DIST: u64 = 2;

#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// When false, method-level bodies are skipped at character level and
    /// come back as empty blocks spanning their braces.
    pub parse_method_bodies: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            parse_method_bodies: true,
        }
    }
}

pub struct Parser<'a> {
    arena: &'a Bump,
    pub(crate) lexer: Lexer,
    diagnostics: DiagnosticCollection,
    asm: Assembler<'a>,
    options: ParserOptions,
    /// Tokens consumed since the last reported diagnostic.
    err_dist: u64,
    /// Total tokens consumed; used as a progress measure by loops that
    /// must not spin on malformed input.
    consumed: u64,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, lexer: Lexer) -> Self {
        Self::with_options(arena, lexer, ParserOptions::default())
    }

    pub fn with_options(arena: &'a Bump, lexer: Lexer, options: ParserOptions) -> Self {
        Self {
            arena,
            lexer,
            diagnostics: DiagnosticCollection::new(),
            asm: Assembler::new(),
            options,
            err_dist: MIN_ERR_DIST,
            consumed: 0,
        }
    }

    /// Merge lexical and syntactic diagnostics in source order.
    pub fn finish(mut self) -> DiagnosticCollection {
        let mut all = self.lexer.take_diagnostics();
        all.extend(self.diagnostics);
        all.sort();
        all
    }

    // ========================================================================
    // Token plumbing and error reporting
    // ========================================================================

    #[inline]
    fn la_kind(&self) -> TokenKind {
        self.lexer.lookahead().kind
    }

    #[inline]
    fn start_loc(&self) -> Location {
        self.lexer.lookahead().span.start
    }

    #[inline]
    fn end_loc(&self) -> Location {
        self.lexer.current().span.end
    }

    #[inline]
    fn span_from(&self, start: Location) -> Span {
        Span::new(start, self.end_loc())
    }

    fn advance(&mut self) {
        self.lexer.advance();
        self.err_dist += 1;
        self.consumed += 1;
    }

    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.la_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Report and continue; the lookahead is left in place on mismatch.
    fn expect(&mut self, kind: TokenKind) {
        if self.la_kind() == kind {
            self.advance();
        } else {
            self.syn_err(kind);
        }
    }

    fn expect_ident(&mut self) -> String {
        if self.la_kind() == TokenKind::Ident {
            let name = self.lexer.lookahead().value.clone();
            self.advance();
            name
        } else {
            self.syn_err(TokenKind::Ident);
            String::new()
        }
    }

    fn report(&mut self, location: Location, message: &DiagnosticMessage, args: &[&str]) {
        if self.err_dist >= MIN_ERR_DIST {
            self.diagnostics.report(location, message, args);
        }
        self.err_dist = 0;
    }

    fn syn_err(&mut self, kind: TokenKind) {
        let loc = self.start_loc();
        self.report(loc, &messages::TOKEN_EXPECTED, &[kind.display_text()]);
    }

    fn invalid_err(&mut self, production: &str) {
        let loc = self.start_loc();
        self.report(loc, &messages::INVALID_PRODUCTION, &[production]);
    }

    fn contextual_err(&mut self, word: &str) {
        let loc = self.start_loc();
        self.report(loc, &messages::CONTEXTUAL_KEYWORD_EXPECTED, &[word]);
    }

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    fn alloc_vec<T>(&self, values: Vec<T>) -> &'a [T] {
        if values.is_empty() {
            &[]
        } else {
            self.arena.alloc_slice_fill_iter(values)
        }
    }

    /// Comma handling for the larger lists: consume the separator, stop
    /// cleanly at the list's follow set, or report once and skip to a
    /// token that can restart an element or end the list.
    fn weak_separator(
        &mut self,
        sep: TokenKind,
        element_start: impl Fn(TokenKind) -> bool,
        list_follow: impl Fn(TokenKind) -> bool,
    ) -> bool {
        if self.la_kind() == sep {
            self.advance();
            return true;
        }
        if list_follow(self.la_kind()) {
            return false;
        }
        self.syn_err(sep);
        loop {
            let kind = self.la_kind();
            if element_start(kind) || list_follow(kind) || kind == TokenKind::Eof {
                break;
            }
            self.advance();
        }
        element_start(self.la_kind())
    }

    /// Resynchronize after an unusable declaration position.
    fn skip_to_declaration(&mut self) {
        loop {
            match self.la_kind() {
                TokenKind::Eof => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                k if token_sets::is_declaration_start(k) => return,
                _ => self.advance(),
            }
        }
    }

    fn check_modifiers(&mut self, mods: &ModifierList, allowed: Modifiers) {
        let invalid = mods.invalid_for(allowed);
        if !invalid.is_empty() {
            let names = invalid.names().join(" ");
            let loc = if mods.start.is_valid() {
                mods.start
            } else {
                self.start_loc()
            };
            self.report(loc, &messages::MODIFIER_NOT_ALLOWED, &[&names]);
        }
    }

    /// The declaration's start: its first attribute section if any, else
    /// its first modifier, else the token about to be consumed.
    fn decl_start(&self, attrs: &[AttributeSection<'a>], mods: &ModifierList) -> Location {
        if let Some(first) = attrs.first() {
            first.span.start
        } else if mods.start.is_valid() {
            mods.start
        } else {
            self.start_loc()
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// CompilationUnit = {UsingDirective} {GlobalAttributeSection}
    ///                   {NamespaceMemberDecl} EOF
    pub fn parse_unit(&mut self) -> CompilationUnit<'a> {
        let start = self.start_loc();
        self.asm.block_start();
        while self.la_kind() == TokenKind::Using {
            let using = self.parse_using_declaration();
            self.asm.add_using(using);
        }
        while self.is_global_attr_target() {
            let section = self.parse_attribute_section();
            self.asm.add_attribute_section(section);
        }
        while self.la_kind() != TokenKind::Eof {
            let before = self.consumed;
            self.parse_namespace_member_decl();
            if self.consumed == before {
                self.advance();
            }
        }
        let scope = self.asm.block_end();
        let end = self.end_loc();
        CompilationUnit {
            usings: self.alloc_vec(scope.usings),
            attributes: self.alloc_vec(scope.attributes),
            members: self.alloc_vec(scope.namespace_members),
            span: Span::new(start, end.max(start)),
        }
    }

    /// Parse a single expression (no surrounding statement).
    pub fn parse_expression_root(&mut self) -> Expression<'a> {
        self.parse_expression()
    }

    // ========================================================================
    // Using directives and attributes
    // ========================================================================

    /// UsingDirective = "using" [ident "="] Qualident ";"
    fn parse_using_declaration(&mut self) -> UsingDeclaration<'a> {
        let start = self.start_loc();
        self.expect(TokenKind::Using);
        let decl = if self.is_assignment() {
            let name = self.expect_ident();
            self.expect(TokenKind::Assign);
            let target = self.parse_type_reference(true);
            UsingDeclaration {
                name,
                alias_of: Some(target),
                span: Span::NONE,
            }
        } else {
            let name = self.parse_qualident();
            UsingDeclaration {
                name,
                alias_of: None,
                span: Span::NONE,
            }
        };
        self.expect(TokenKind::Semicolon);
        UsingDeclaration {
            span: self.span_from(start),
            ..decl
        }
    }

    fn parse_attribute_sections(&mut self) -> Vec<AttributeSection<'a>> {
        let mut sections = Vec::new();
        while self.la_kind() == TokenKind::OpenSquare {
            sections.push(self.parse_attribute_section());
        }
        sections
    }

    /// AttributeSection = "[" [target ":"] Attribute {"," Attribute} [","] "]"
    fn parse_attribute_section(&mut self) -> AttributeSection<'a> {
        let start = self.start_loc();
        let has_target = self.is_local_attr_target();
        self.expect(TokenKind::OpenSquare);
        let target = if has_target {
            let loc = self.start_loc();
            let text = match self.la_kind() {
                TokenKind::Return => "return".to_string(),
                TokenKind::Event => "event".to_string(),
                _ => self.lexer.lookahead().value.clone(),
            };
            self.advance();
            self.expect(TokenKind::Colon);
            if !token_sets::ATTRIBUTE_TARGETS.contains(&text.as_str()) {
                self.report(loc, &messages::INVALID_ATTRIBUTE_TARGET, &[&text]);
            }
            text
        } else {
            String::new()
        };
        let mut attributes = vec![self.parse_attribute()];
        while self.accept(TokenKind::Comma) {
            if self.la_kind() == TokenKind::CloseSquare {
                break;
            }
            attributes.push(self.parse_attribute());
        }
        self.expect(TokenKind::CloseSquare);
        AttributeSection {
            target,
            attributes: self.alloc_vec(attributes),
            span: self.span_from(start),
        }
    }

    /// Attribute = Qualident [AttributeArguments]
    fn parse_attribute(&mut self) -> Attribute<'a> {
        let start = self.start_loc();
        let name = self.parse_qualident();
        let mut positional = Vec::new();
        let mut named = Vec::new();
        if self.accept(TokenKind::OpenParen) {
            let mut seen_named = false;
            if self.la_kind() != TokenKind::CloseParen {
                loop {
                    if self.is_assignment() {
                        let nstart = self.start_loc();
                        let arg_name = self.expect_ident();
                        self.expect(TokenKind::Assign);
                        let expr = self.parse_expression();
                        named.push(NamedArgument {
                            name: arg_name,
                            expression: self.alloc(expr),
                            span: self.span_from(nstart),
                        });
                        seen_named = true;
                    } else {
                        if seen_named {
                            let loc = self.start_loc();
                            self.report(loc, &messages::POSITIONAL_AFTER_NAMED, &[]);
                        }
                        positional.push(self.parse_expression());
                    }
                    if !self.accept(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::CloseParen);
        }
        Attribute {
            name,
            positional_arguments: self.alloc_vec(positional),
            named_arguments: self.alloc_vec(named),
            span: self.span_from(start),
        }
    }

    // ========================================================================
    // Namespaces and type declarations
    // ========================================================================

    fn parse_namespace_member_decl(&mut self) {
        match self.la_kind() {
            TokenKind::Namespace => self.parse_namespace_decl(),
            k if k == TokenKind::OpenSquare
                || token_sets::modifier(k).is_some()
                || self.ident_is("partial")
                || matches!(
                    k,
                    TokenKind::Class
                        | TokenKind::Struct
                        | TokenKind::Interface
                        | TokenKind::Enum
                        | TokenKind::Delegate
                ) =>
            {
                let attrs = self.parse_attribute_sections();
                let mods = self.parse_modifiers();
                let start = self.decl_start(&attrs, &mods);
                if let Some(member) = self.parse_type_decl(attrs, mods, start) {
                    self.asm.add_namespace_member(member);
                }
            }
            _ => {
                self.invalid_err("NamespaceMemberDecl");
                self.skip_to_declaration();
            }
        }
    }

    /// "namespace" Qualident "{" {UsingDirective} {NamespaceMemberDecl} "}"
    fn parse_namespace_decl(&mut self) {
        let start = self.start_loc();
        self.advance();
        let name = self.parse_qualident();
        self.expect(TokenKind::OpenCurly);
        self.asm.block_start();
        while self.la_kind() == TokenKind::Using {
            let using = self.parse_using_declaration();
            self.asm.add_using(using);
        }
        while !matches!(self.la_kind(), TokenKind::CloseCurly | TokenKind::Eof) {
            let before = self.consumed;
            self.parse_namespace_member_decl();
            if self.consumed == before {
                self.advance();
            }
        }
        self.expect(TokenKind::CloseCurly);
        let scope = self.asm.block_end();
        let ns = NamespaceDeclaration {
            name,
            usings: self.alloc_vec(scope.usings),
            members: self.alloc_vec(scope.namespace_members),
            span: self.span_from(start),
        };
        self.asm.add_namespace_member(NamespaceMember::Namespace(ns));
    }

    fn parse_modifiers(&mut self) -> ModifierList {
        let mut mods = ModifierList::new();
        loop {
            let loc = self.start_loc();
            if let Some(m) = token_sets::modifier(self.la_kind()) {
                self.advance();
                if !mods.add(m, loc) {
                    self.report(loc, &messages::DUPLICATE_MODIFIER, &[m.names()[0]]);
                }
            } else if self.ident_is("partial") && self.partial_precedes_type() {
                self.advance();
                if !mods.add(Modifiers::PARTIAL, loc) {
                    self.report(loc, &messages::DUPLICATE_MODIFIER, &["partial"]);
                }
            } else {
                return mods;
            }
        }
    }

    /// `partial` counts as a modifier only directly before a type keyword.
    fn partial_precedes_type(&mut self) -> bool {
        self.lexer.start_peek();
        matches!(
            self.lexer.peek().kind,
            TokenKind::Class | TokenKind::Struct | TokenKind::Interface
        )
    }

    /// TypeDecl = class | struct | interface | enum | delegate declaration.
    fn parse_type_decl(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
    ) -> Option<NamespaceMember<'a>> {
        match self.la_kind() {
            TokenKind::Class | TokenKind::Struct | TokenKind::Interface => {
                let kind = match self.la_kind() {
                    TokenKind::Class => TypeKind::Class,
                    TokenKind::Struct => TypeKind::Struct,
                    _ => TypeKind::Interface,
                };
                let mask = if kind == TypeKind::Class {
                    Modifiers::CLASSES
                } else {
                    Modifiers::STRUCTS_INTERFACES_ENUMS_DELEGATES
                };
                self.check_modifiers(&mods, mask);
                self.advance();
                let name = self.expect_ident();
                let type_parameters = self.parse_template_parameters();
                let mut base_types = Vec::new();
                if self.accept(TokenKind::Colon) {
                    loop {
                        base_types.push(self.parse_type_reference(true));
                        if !self.accept(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let constraints = self.parse_constraint_clauses();
                self.expect(TokenKind::OpenCurly);
                self.asm.block_start();
                while !matches!(self.la_kind(), TokenKind::CloseCurly | TokenKind::Eof) {
                    let before = self.consumed;
                    self.parse_member_decl(kind);
                    if self.consumed == before {
                        self.advance();
                    }
                }
                self.expect(TokenKind::CloseCurly);
                let scope = self.asm.block_end();
                let span = self.span_from(start);
                self.accept(TokenKind::Semicolon);
                Some(NamespaceMember::Type(TypeDeclaration {
                    attributes: self.alloc_vec(attrs),
                    modifiers: mods,
                    kind,
                    name,
                    type_parameters: self.alloc_vec(type_parameters),
                    base_types: self.alloc_vec(base_types),
                    constraints: self.alloc_vec(constraints),
                    members: self.alloc_vec(scope.members),
                    span,
                }))
            }
            TokenKind::Enum => {
                self.check_modifiers(&mods, Modifiers::STRUCTS_INTERFACES_ENUMS_DELEGATES);
                self.advance();
                let name = self.expect_ident();
                let mut base_types = Vec::new();
                if self.accept(TokenKind::Colon) {
                    base_types.push(self.parse_type_reference(true));
                }
                self.expect(TokenKind::OpenCurly);
                self.asm.block_start();
                while !matches!(self.la_kind(), TokenKind::CloseCurly | TokenKind::Eof) {
                    let member_attrs = self.parse_attribute_sections();
                    let mstart = member_attrs
                        .first()
                        .map(|a| a.span.start)
                        .unwrap_or_else(|| self.start_loc());
                    let member_name = self.expect_ident();
                    let initializer = if self.accept(TokenKind::Assign) {
                        let expr = self.parse_expression();
                        Some(&*self.alloc(expr))
                    } else {
                        None
                    };
                    self.asm
                        .add_member(MemberDeclaration::EnumMember(EnumMemberDeclaration {
                            attributes: self.alloc_vec(member_attrs),
                            name: member_name,
                            initializer,
                            span: self.span_from(mstart),
                        }));
                    if !self.accept(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::CloseCurly);
                let scope = self.asm.block_end();
                let span = self.span_from(start);
                self.accept(TokenKind::Semicolon);
                Some(NamespaceMember::Type(TypeDeclaration {
                    attributes: self.alloc_vec(attrs),
                    modifiers: mods,
                    kind: TypeKind::Enum,
                    name,
                    type_parameters: &[],
                    base_types: self.alloc_vec(base_types),
                    constraints: &[],
                    members: self.alloc_vec(scope.members),
                    span,
                }))
            }
            TokenKind::Delegate => {
                self.check_modifiers(&mods, Modifiers::STRUCTS_INTERFACES_ENUMS_DELEGATES);
                self.advance();
                let return_type = self.parse_type_reference(true);
                let name = self.expect_ident();
                let type_parameters = self.parse_template_parameters();
                self.expect(TokenKind::OpenParen);
                let parameters = self.parse_parameter_list(TokenKind::CloseParen);
                self.expect(TokenKind::CloseParen);
                let constraints = self.parse_constraint_clauses();
                self.expect(TokenKind::Semicolon);
                Some(NamespaceMember::Delegate(DelegateDeclaration {
                    attributes: self.alloc_vec(attrs),
                    modifiers: mods,
                    return_type,
                    name,
                    type_parameters: self.alloc_vec(type_parameters),
                    constraints: self.alloc_vec(constraints),
                    parameters: self.alloc_vec(parameters),
                    span: self.span_from(start),
                }))
            }
            _ => {
                self.invalid_err("TypeDecl");
                self.skip_to_declaration();
                None
            }
        }
    }

    /// TemplateList = "<" TemplateParameter {"," TemplateParameter} ">"
    fn parse_template_parameters(&mut self) -> Vec<TemplateParameter<'a>> {
        let mut params = Vec::new();
        if !self.accept(TokenKind::LessThan) {
            return params;
        }
        loop {
            let attrs = self.parse_attribute_sections();
            let start = attrs
                .first()
                .map(|a| a.span.start)
                .unwrap_or_else(|| self.start_loc());
            let name = self.expect_ident();
            params.push(TemplateParameter {
                attributes: self.alloc_vec(attrs),
                name,
                span: self.span_from(start),
            });
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::GreaterThan);
        params
    }

    /// ConstraintClause = "where" ident ":" Constraint {"," Constraint}
    fn parse_constraint_clauses(&mut self) -> Vec<ConstraintClause<'a>> {
        let mut clauses = Vec::new();
        while self.ident_is("where") {
            let start = self.start_loc();
            self.advance();
            let type_parameter = self.expect_ident();
            self.expect(TokenKind::Colon);
            let mut constraints = Vec::new();
            loop {
                match self.la_kind() {
                    TokenKind::Struct => {
                        self.advance();
                        constraints.push(Constraint::Struct);
                    }
                    TokenKind::Class => {
                        self.advance();
                        constraints.push(Constraint::Class);
                    }
                    TokenKind::New => {
                        self.advance();
                        self.expect(TokenKind::OpenParen);
                        self.expect(TokenKind::CloseParen);
                        constraints.push(Constraint::New);
                    }
                    _ => constraints.push(Constraint::Type(self.parse_type_reference(true))),
                }
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
            clauses.push(ConstraintClause {
                type_parameter,
                constraints: self.alloc_vec(constraints),
                span: self.span_from(start),
            });
        }
        clauses
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn parse_member_decl(&mut self, owner: TypeKind) {
        if owner == TypeKind::Interface {
            return self.parse_interface_member_decl();
        }
        let attrs = self.parse_attribute_sections();
        let mods = self.parse_modifiers();
        let start = self.decl_start(&attrs, &mods);
        if self.la_kind() == TokenKind::BitwiseComplement && owner == TypeKind::Class {
            return self.parse_destructor(attrs, mods, start);
        }
        self.parse_struct_member_decl(attrs, mods, start);
    }

    /// StructMemberDecl: the member dispatcher shared by classes and
    /// structs (destructors are intercepted by the class path).
    fn parse_struct_member_decl(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
    ) {
        match self.la_kind() {
            TokenKind::Const => {
                let cloc = self.start_loc();
                self.advance();
                self.check_modifiers(&mods, Modifiers::CONSTANTS);
                let mut mods = mods;
                mods.add(Modifiers::CONST, cloc);
                let type_reference = self.parse_type_reference(true);
                let declarators = self.parse_variable_declarators(true);
                self.expect(TokenKind::Semicolon);
                self.asm.add_member(MemberDeclaration::Field(FieldDeclaration {
                    attributes: self.alloc_vec(attrs),
                    modifiers: mods,
                    type_reference,
                    declarators: self.alloc_vec(declarators),
                    span: self.span_from(start),
                }));
            }
            TokenKind::Event => self.parse_event_decl(attrs, mods, start),
            TokenKind::Implicit | TokenKind::Explicit => {
                self.parse_conversion_operator(attrs, mods, start)
            }
            TokenKind::Class
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::Enum
            | TokenKind::Delegate => match self.parse_type_decl(attrs, mods, start) {
                Some(NamespaceMember::Type(decl)) => {
                    self.asm.add_member(MemberDeclaration::Type(decl))
                }
                Some(NamespaceMember::Delegate(decl)) => {
                    self.asm.add_member(MemberDeclaration::Delegate(decl))
                }
                _ => {}
            },
            TokenKind::Void => {
                let vstart = self.start_loc();
                self.advance();
                let mut ty = TypeReference {
                    name: "void".to_string(),
                    is_global: false,
                    generic_args: &[],
                    rank_specifiers: &[],
                    pointer_nesting: 0,
                    span: self.span_from(vstart),
                };
                if self.la_kind() == TokenKind::Times {
                    let mut pointer = 0;
                    while self.accept(TokenKind::Times) {
                        pointer += 1;
                    }
                    ty.pointer_nesting = pointer;
                    ty.span = self.span_from(vstart);
                    self.parse_member_with_type(attrs, mods, start, ty);
                } else {
                    let name = self.parse_qualident();
                    self.parse_method_decl(attrs, mods, start, ty, name);
                }
            }
            TokenKind::Ident if self.ident_and_lpar() => {
                self.parse_constructor(attrs, mods, start)
            }
            k if k == TokenKind::Ident || k.is_simple_type_keyword() => {
                let ty = self.parse_type_reference(true);
                self.parse_member_with_type(attrs, mods, start, ty);
            }
            _ => {
                self.invalid_err("StructMemberDecl");
                self.skip_to_declaration();
            }
        }
    }

    /// A member that began with a type: an overloaded operator, an
    /// indexer, a method, a property, or a field list.
    fn parse_member_with_type(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
        ty: TypeReference<'a>,
    ) {
        match self.la_kind() {
            TokenKind::Operator => self.parse_operator_decl(attrs, mods, start, ty),
            TokenKind::This => {
                self.advance();
                self.parse_indexer_decl(attrs, mods, start, ty, None);
            }
            TokenKind::Ident => {
                let name_start = self.start_loc();
                let name = self.parse_qualident();
                if self.la_kind() == TokenKind::Dot && self.next_is(TokenKind::This) {
                    self.advance();
                    self.advance();
                    self.parse_indexer_decl(attrs, mods, start, ty, Some(name));
                } else if matches!(self.la_kind(), TokenKind::OpenParen | TokenKind::LessThan) {
                    self.parse_method_decl(attrs, mods, start, ty, name);
                } else if self.la_kind() == TokenKind::OpenCurly {
                    self.check_modifiers(&mods, Modifiers::PROPERTIES_EVENTS_METHODS);
                    let (get_region, set_region) = self.parse_accessor_pair("get", "set");
                    self.asm
                        .add_member(MemberDeclaration::Property(PropertyDeclaration {
                            attributes: self.alloc_vec(attrs),
                            modifiers: mods,
                            type_reference: ty,
                            name,
                            get_region,
                            set_region,
                            span: self.span_from(start),
                        }));
                } else {
                    self.check_modifiers(&mods, Modifiers::FIELDS);
                    let first = self.finish_variable_declarator(name_start, name, false);
                    let mut declarators = vec![first];
                    while self.accept(TokenKind::Comma) {
                        declarators.push(self.parse_variable_declarator(false));
                    }
                    self.expect(TokenKind::Semicolon);
                    self.asm.add_member(MemberDeclaration::Field(FieldDeclaration {
                        attributes: self.alloc_vec(attrs),
                        modifiers: mods,
                        type_reference: ty,
                        declarators: self.alloc_vec(declarators),
                        span: self.span_from(start),
                    }));
                }
            }
            _ => {
                self.invalid_err("StructMemberDecl");
                self.skip_to_declaration();
            }
        }
    }

    fn parse_method_decl(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
        return_type: TypeReference<'a>,
        name: String,
    ) {
        self.check_modifiers(&mods, Modifiers::PROPERTIES_EVENTS_METHODS);
        let type_parameters = self.parse_template_parameters();
        self.expect(TokenKind::OpenParen);
        let parameters = self.parse_parameter_list(TokenKind::CloseParen);
        self.expect(TokenKind::CloseParen);
        let constraints = self.parse_constraint_clauses();
        let body = self.parse_optional_body();
        self.asm.add_member(MemberDeclaration::Method(MethodDeclaration {
            attributes: self.alloc_vec(attrs),
            modifiers: mods,
            return_type,
            name,
            type_parameters: self.alloc_vec(type_parameters),
            constraints: self.alloc_vec(constraints),
            parameters: self.alloc_vec(parameters),
            body,
            span: self.span_from(start),
        }));
    }

    fn parse_constructor(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
    ) {
        let mask = if mods.contains(Modifiers::STATIC) {
            Modifiers::STATIC_CONSTRUCTORS
        } else {
            Modifiers::CONSTRUCTORS
        };
        self.check_modifiers(&mods, mask);
        let name = self.expect_ident();
        self.expect(TokenKind::OpenParen);
        let parameters = self.parse_parameter_list(TokenKind::CloseParen);
        self.expect(TokenKind::CloseParen);
        let initializer = if self.accept(TokenKind::Colon) {
            let istart = self.start_loc();
            let kind = match self.la_kind() {
                TokenKind::Base => {
                    self.advance();
                    ConstructorInitializerKind::Base
                }
                TokenKind::This => {
                    self.advance();
                    ConstructorInitializerKind::This
                }
                _ => {
                    self.syn_err(TokenKind::Base);
                    ConstructorInitializerKind::Base
                }
            };
            self.expect(TokenKind::OpenParen);
            let arguments = self.parse_argument_list(TokenKind::CloseParen);
            self.expect(TokenKind::CloseParen);
            Some(ConstructorInitializer {
                kind,
                arguments: self.alloc_vec(arguments),
                span: self.span_from(istart),
            })
        } else {
            None
        };
        let body = self.parse_optional_body();
        self.asm
            .add_member(MemberDeclaration::Constructor(ConstructorDeclaration {
                attributes: self.alloc_vec(attrs),
                modifiers: mods,
                name,
                parameters: self.alloc_vec(parameters),
                initializer,
                body,
                span: self.span_from(start),
            }));
    }

    /// "~" ident "(" ")" (Block | ";")
    fn parse_destructor(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
    ) {
        self.advance();
        self.check_modifiers(&mods, Modifiers::DESTRUCTORS);
        let name = self.expect_ident();
        self.expect(TokenKind::OpenParen);
        self.expect(TokenKind::CloseParen);
        let body = self.parse_optional_body();
        self.asm
            .add_member(MemberDeclaration::Destructor(DestructorDeclaration {
                attributes: self.alloc_vec(attrs),
                modifiers: mods,
                name,
                body,
                span: self.span_from(start),
            }));
    }

    /// "event" Type (field-like declarator list | qualident "{" add/remove "}")
    fn parse_event_decl(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
    ) {
        self.advance();
        self.check_modifiers(&mods, Modifiers::PROPERTIES_EVENTS_METHODS);
        let type_reference = self.parse_type_reference(true);
        let name_start = self.start_loc();
        let name = self.parse_qualident();
        if self.la_kind() == TokenKind::OpenCurly {
            let (add_region, remove_region) = self.parse_accessor_pair("add", "remove");
            self.asm.add_member(MemberDeclaration::Event(EventDeclaration {
                attributes: self.alloc_vec(attrs),
                modifiers: mods,
                type_reference,
                name,
                declarators: &[],
                add_region,
                remove_region,
                span: self.span_from(start),
            }));
        } else {
            let first = self.finish_variable_declarator(name_start, name, false);
            let mut declarators = vec![first];
            while self.accept(TokenKind::Comma) {
                declarators.push(self.parse_variable_declarator(false));
            }
            self.expect(TokenKind::Semicolon);
            self.asm.add_member(MemberDeclaration::Event(EventDeclaration {
                attributes: self.alloc_vec(attrs),
                modifiers: mods,
                type_reference,
                name: String::new(),
                declarators: self.alloc_vec(declarators),
                add_region: None,
                remove_region: None,
                span: self.span_from(start),
            }));
        }
    }

    /// Type "operator" OverloadableOperator "(" params ")" body
    fn parse_operator_decl(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
        return_type: TypeReference<'a>,
    ) {
        self.check_modifiers(&mods, Modifiers::OPERATORS);
        self.expect(TokenKind::Operator);
        let kind = if self.is_shift_right() {
            self.advance();
            self.advance();
            OperatorKind::OverloadShiftRight
        } else if token_sets::is_overloadable_operator(self.la_kind()) {
            let k = self.la_kind();
            self.advance();
            OperatorKind::Overload(k)
        } else {
            self.invalid_err("OverloadableOperator");
            OperatorKind::Overload(TokenKind::Plus)
        };
        self.expect(TokenKind::OpenParen);
        let parameters = self.parse_parameter_list(TokenKind::CloseParen);
        self.expect(TokenKind::CloseParen);
        let body = self.parse_optional_body();
        self.asm.add_member(MemberDeclaration::Operator(OperatorDeclaration {
            attributes: self.alloc_vec(attrs),
            modifiers: mods,
            kind,
            return_type,
            parameters: self.alloc_vec(parameters),
            body,
            span: self.span_from(start),
        }));
    }

    /// ("implicit" | "explicit") "operator" Type "(" params ")" body
    fn parse_conversion_operator(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
    ) {
        self.check_modifiers(&mods, Modifiers::OPERATORS);
        let kind = if self.la_kind() == TokenKind::Implicit {
            OperatorKind::Implicit
        } else {
            OperatorKind::Explicit
        };
        self.advance();
        self.expect(TokenKind::Operator);
        let return_type = self.parse_type_reference(true);
        self.expect(TokenKind::OpenParen);
        let parameters = self.parse_parameter_list(TokenKind::CloseParen);
        self.expect(TokenKind::CloseParen);
        let body = self.parse_optional_body();
        self.asm.add_member(MemberDeclaration::Operator(OperatorDeclaration {
            attributes: self.alloc_vec(attrs),
            modifiers: mods,
            kind,
            return_type,
            parameters: self.alloc_vec(parameters),
            body,
            span: self.span_from(start),
        }));
    }

    fn parse_indexer_decl(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
        type_reference: TypeReference<'a>,
        interface_name: Option<String>,
    ) {
        self.check_modifiers(&mods, Modifiers::INDEXERS);
        self.expect(TokenKind::OpenSquare);
        let parameters = self.parse_parameter_list(TokenKind::CloseSquare);
        self.expect(TokenKind::CloseSquare);
        let (get_region, set_region) = self.parse_accessor_pair("get", "set");
        self.asm.add_member(MemberDeclaration::Indexer(IndexerDeclaration {
            attributes: self.alloc_vec(attrs),
            modifiers: mods,
            type_reference,
            interface_name,
            parameters: self.alloc_vec(parameters),
            get_region,
            set_region,
            span: self.span_from(start),
        }));
    }

    /// AccessorDecls: both accessors optional, either order, at most one
    /// of each. Shared by get/set and add/remove regions.
    fn parse_accessor_pair(
        &mut self,
        first_name: &'static str,
        second_name: &'static str,
    ) -> (
        Option<AccessorDeclaration<'a>>,
        Option<AccessorDeclaration<'a>>,
    ) {
        self.expect(TokenKind::OpenCurly);
        let mut first = None;
        let mut second = None;
        while !matches!(self.la_kind(), TokenKind::CloseCurly | TokenKind::Eof) {
            let before = self.consumed;
            let attrs = self.parse_attribute_sections();
            let mut mods = ModifierList::new();
            loop {
                let loc = self.start_loc();
                match token_sets::modifier(self.la_kind()) {
                    Some(m) if Modifiers::ACCESSORS.contains(m) => {
                        self.advance();
                        if !mods.add(m, loc) {
                            self.report(loc, &messages::DUPLICATE_MODIFIER, &[m.names()[0]]);
                        }
                    }
                    _ => break,
                }
            }
            if self.ident_is(first_name) {
                let accessor = self.parse_accessor_region(attrs, mods);
                if first.is_some() {
                    let loc = accessor.span.start;
                    self.report(loc, &messages::DUPLICATE_ACCESSOR, &[first_name]);
                } else {
                    first = Some(accessor);
                }
            } else if self.ident_is(second_name) {
                let accessor = self.parse_accessor_region(attrs, mods);
                if second.is_some() {
                    let loc = accessor.span.start;
                    self.report(loc, &messages::DUPLICATE_ACCESSOR, &[second_name]);
                } else {
                    second = Some(accessor);
                }
            } else {
                self.contextual_err(first_name);
                if self.consumed == before {
                    self.advance();
                }
            }
        }
        self.expect(TokenKind::CloseCurly);
        (first, second)
    }

    fn parse_accessor_region(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
    ) -> AccessorDeclaration<'a> {
        let start = attrs
            .first()
            .map(|a| a.span.start)
            .unwrap_or(if mods.start.is_valid() {
                mods.start
            } else {
                self.start_loc()
            });
        self.advance();
        let body = if self.la_kind() == TokenKind::OpenCurly {
            Some(self.parse_body_block())
        } else {
            self.expect(TokenKind::Semicolon);
            None
        };
        AccessorDeclaration {
            attributes: self.alloc_vec(attrs),
            modifiers: mods,
            body,
            span: self.span_from(start),
        }
    }

    /// InterfaceMemberDecl: methods, properties, indexers and events,
    /// all bodiless; `new` is the only permitted modifier.
    fn parse_interface_member_decl(&mut self) {
        let attrs = self.parse_attribute_sections();
        let mods = self.parse_modifiers();
        self.check_modifiers(&mods, Modifiers::INTERFACE_MEMBERS);
        let start = self.decl_start(&attrs, &mods);
        match self.la_kind() {
            TokenKind::Event => {
                self.advance();
                let type_reference = self.parse_type_reference(true);
                let name_start = self.start_loc();
                let name = self.expect_ident();
                self.expect(TokenKind::Semicolon);
                let declarator = VariableDeclarator {
                    name,
                    initializer: None,
                    span: self.span_from(name_start),
                };
                self.asm.add_member(MemberDeclaration::Event(EventDeclaration {
                    attributes: self.alloc_vec(attrs),
                    modifiers: mods,
                    type_reference,
                    name: String::new(),
                    declarators: self.alloc_vec(vec![declarator]),
                    add_region: None,
                    remove_region: None,
                    span: self.span_from(start),
                }));
            }
            TokenKind::Void => {
                let vstart = self.start_loc();
                self.advance();
                let ty = TypeReference {
                    name: "void".to_string(),
                    is_global: false,
                    generic_args: &[],
                    rank_specifiers: &[],
                    pointer_nesting: 0,
                    span: self.span_from(vstart),
                };
                let name = self.expect_ident();
                self.parse_interface_method(attrs, mods, start, ty, name);
            }
            k if k == TokenKind::Ident || k.is_simple_type_keyword() => {
                let ty = self.parse_type_reference(true);
                if self.la_kind() == TokenKind::This {
                    self.advance();
                    self.parse_indexer_decl(attrs, mods, start, ty, None);
                } else {
                    let name = self.expect_ident();
                    if matches!(self.la_kind(), TokenKind::OpenParen | TokenKind::LessThan) {
                        self.parse_interface_method(attrs, mods, start, ty, name);
                    } else if self.la_kind() == TokenKind::OpenCurly {
                        let (get_region, set_region) = self.parse_accessor_pair("get", "set");
                        self.asm
                            .add_member(MemberDeclaration::Property(PropertyDeclaration {
                                attributes: self.alloc_vec(attrs),
                                modifiers: mods,
                                type_reference: ty,
                                name,
                                get_region,
                                set_region,
                                span: self.span_from(start),
                            }));
                    } else {
                        self.invalid_err("InterfaceMemberDecl");
                        self.skip_to_declaration();
                    }
                }
            }
            _ => {
                self.invalid_err("InterfaceMemberDecl");
                self.skip_to_declaration();
            }
        }
    }

    fn parse_interface_method(
        &mut self,
        attrs: Vec<AttributeSection<'a>>,
        mods: ModifierList,
        start: Location,
        return_type: TypeReference<'a>,
        name: String,
    ) {
        let type_parameters = self.parse_template_parameters();
        self.expect(TokenKind::OpenParen);
        let parameters = self.parse_parameter_list(TokenKind::CloseParen);
        self.expect(TokenKind::CloseParen);
        let constraints = self.parse_constraint_clauses();
        self.expect(TokenKind::Semicolon);
        self.asm.add_member(MemberDeclaration::Method(MethodDeclaration {
            attributes: self.alloc_vec(attrs),
            modifiers: mods,
            return_type,
            name,
            type_parameters: self.alloc_vec(type_parameters),
            constraints: self.alloc_vec(constraints),
            parameters: self.alloc_vec(parameters),
            body: None,
            span: self.span_from(start),
        }));
    }

    // ========================================================================
    // Parameters, declarators, bodies
    // ========================================================================

    fn parse_parameter_list(&mut self, closer: TokenKind) -> Vec<ParameterDeclaration<'a>> {
        let mut params = Vec::new();
        if self.la_kind() == closer {
            return params;
        }
        loop {
            params.push(self.parse_parameter());
            let element_start = |k: TokenKind| {
                matches!(
                    k,
                    TokenKind::OpenSquare
                        | TokenKind::Ref
                        | TokenKind::Out
                        | TokenKind::Params
                        | TokenKind::Ident
                        | TokenKind::Void
                ) || k.is_simple_type_keyword()
            };
            if !self.weak_separator(TokenKind::Comma, element_start, |k| k == closer) {
                break;
            }
        }
        // A params array closes the list.
        if params.len() > 1 {
            for param in &params[..params.len() - 1] {
                if param.modifier == ParamModifier::Params {
                    let loc = param.span.start;
                    self.report(loc, &messages::PARAMS_MUST_BE_LAST, &[]);
                }
            }
        }
        params
    }

    fn parse_parameter(&mut self) -> ParameterDeclaration<'a> {
        let attrs = self.parse_attribute_sections();
        let start = attrs
            .first()
            .map(|a| a.span.start)
            .unwrap_or_else(|| self.start_loc());
        let modifier = match self.la_kind() {
            TokenKind::Ref => {
                self.advance();
                ParamModifier::Ref
            }
            TokenKind::Out => {
                self.advance();
                ParamModifier::Out
            }
            TokenKind::Params => {
                self.advance();
                ParamModifier::Params
            }
            _ => ParamModifier::None,
        };
        let type_reference = self.parse_type_reference(true);
        let name = self.expect_ident();
        ParameterDeclaration {
            attributes: self.alloc_vec(attrs),
            modifier,
            type_reference,
            name,
            span: self.span_from(start),
        }
    }

    fn parse_variable_declarators(&mut self, require_init: bool) -> Vec<VariableDeclarator<'a>> {
        let mut declarators = vec![self.parse_variable_declarator(require_init)];
        while self.accept(TokenKind::Comma) {
            declarators.push(self.parse_variable_declarator(require_init));
        }
        declarators
    }

    fn parse_variable_declarator(&mut self, require_init: bool) -> VariableDeclarator<'a> {
        let start = self.start_loc();
        let name = self.expect_ident();
        self.finish_variable_declarator(start, name, require_init)
    }

    fn finish_variable_declarator(
        &mut self,
        start: Location,
        name: String,
        require_init: bool,
    ) -> VariableDeclarator<'a> {
        let initializer = if self.accept(TokenKind::Assign) {
            let expr = self.parse_variable_initializer();
            Some(&*self.alloc(expr))
        } else {
            if require_init {
                self.syn_err(TokenKind::Assign);
            }
            None
        };
        VariableDeclarator {
            name,
            initializer,
            span: self.span_from(start),
        }
    }

    /// VariableInitializer = Expr | ArrayInitializer | "stackalloc" ...
    fn parse_variable_initializer(&mut self) -> Expression<'a> {
        match self.la_kind() {
            TokenKind::OpenCurly => {
                let init = self.parse_array_initializer();
                Expression::ArrayInitializer(init)
            }
            TokenKind::Stackalloc => self.parse_stackalloc(),
            _ => self.parse_expression(),
        }
    }

    fn parse_stackalloc(&mut self) -> Expression<'a> {
        let start = self.start_loc();
        self.expect(TokenKind::Stackalloc);
        let type_reference = self.parse_nonarray_type();
        self.expect(TokenKind::OpenSquare);
        let count = self.parse_expression();
        self.expect(TokenKind::CloseSquare);
        Expression::StackAlloc(StackAllocExpression {
            type_reference,
            expression: self.alloc(count),
            span: self.span_from(start),
        })
    }

    /// A member body, or nothing for the `;` form. Honors
    /// method-skeleton mode.
    fn parse_optional_body(&mut self) -> Option<Block<'a>> {
        if self.la_kind() == TokenKind::OpenCurly {
            Some(self.parse_body_block())
        } else {
            self.expect(TokenKind::Semicolon);
            None
        }
    }

    fn parse_body_block(&mut self) -> Block<'a> {
        if !self.options.parse_method_bodies && self.la_kind() == TokenKind::OpenCurly {
            let start = self.start_loc();
            self.lexer.skip_current_block();
            self.consumed += 1;
            self.err_dist += 1;
            return Block {
                statements: &[],
                span: self.span_from(start),
            };
        }
        self.parse_block()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_block(&mut self) -> Block<'a> {
        let start = self.start_loc();
        self.expect(TokenKind::OpenCurly);
        let mut statements = Vec::new();
        while !matches!(self.la_kind(), TokenKind::CloseCurly | TokenKind::Eof) {
            let before = self.consumed;
            statements.push(self.parse_statement());
            if self.consumed == before {
                self.advance();
            }
        }
        self.expect(TokenKind::CloseCurly);
        Block {
            statements: self.alloc_vec(statements),
            span: self.span_from(start),
        }
    }

    /// Statement = label | local constant | local variable | embedded.
    fn parse_statement(&mut self) -> Statement<'a> {
        if self.is_label() {
            let start = self.start_loc();
            let label = self.expect_ident();
            self.expect(TokenKind::Colon);
            let stmt = self.parse_statement();
            return Statement::Label(LabelStatement {
                label,
                statement: self.alloc(stmt),
                span: self.span_from(start),
            });
        }
        if self.la_kind() == TokenKind::Const {
            return self.parse_local_variable(true, true);
        }
        if self.is_local_var_decl() {
            return self.parse_local_variable(true, false);
        }
        self.parse_embedded_statement()
    }

    fn parse_local_variable(&mut self, consume_semicolon: bool, constant: bool) -> Statement<'a> {
        let start = self.start_loc();
        let mut modifiers = ModifierList::new();
        if constant {
            let cloc = self.start_loc();
            self.expect(TokenKind::Const);
            modifiers.add(Modifiers::CONST, cloc);
        }
        let type_reference = self.parse_type_reference(true);
        let declarators = self.parse_variable_declarators(constant);
        if consume_semicolon {
            self.expect(TokenKind::Semicolon);
        }
        Statement::LocalVariable(LocalVariableDeclaration {
            modifiers,
            type_reference,
            declarators: self.alloc_vec(declarators),
            span: self.span_from(start),
        })
    }

    fn parse_statement_expr(&mut self) -> Statement<'a> {
        let start = self.start_loc();
        let expr = self.parse_expression();
        Statement::Expression(ExpressionStatement {
            expression: self.alloc(expr),
            span: self.span_from(start),
        })
    }

    /// EmbeddedStatement: the statement dispatcher.
    fn parse_embedded_statement(&mut self) -> Statement<'a> {
        let start = self.start_loc();
        match self.la_kind() {
            TokenKind::OpenCurly => Statement::Block(self.parse_block()),
            TokenKind::Semicolon => {
                self.advance();
                Statement::Empty(EmptyStatement {
                    span: self.span_from(start),
                })
            }
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let condition = self.parse_expression();
                self.expect(TokenKind::CloseParen);
                let true_statement = self.parse_embedded_statement();
                let false_statement = if self.accept(TokenKind::Else) {
                    let stmt = self.parse_embedded_statement();
                    Some(&*self.alloc(stmt))
                } else {
                    None
                };
                Statement::If(IfElseStatement {
                    condition: self.alloc(condition),
                    true_statement: self.alloc(true_statement),
                    false_statement,
                    span: self.span_from(start),
                })
            }
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let condition = self.parse_expression();
                self.expect(TokenKind::CloseParen);
                let body = self.parse_embedded_statement();
                Statement::While(WhileStatement {
                    condition: self.alloc(condition),
                    body: self.alloc(body),
                    span: self.span_from(start),
                })
            }
            TokenKind::Do => {
                self.advance();
                let body = self.parse_embedded_statement();
                self.expect(TokenKind::While);
                self.expect(TokenKind::OpenParen);
                let condition = self.parse_expression();
                self.expect(TokenKind::CloseParen);
                self.expect(TokenKind::Semicolon);
                Statement::DoWhile(DoWhileStatement {
                    condition: self.alloc(condition),
                    body: self.alloc(body),
                    span: self.span_from(start),
                })
            }
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Foreach => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let type_reference = self.parse_type_reference(true);
                let variable = self.expect_ident();
                self.expect(TokenKind::In);
                let expression = self.parse_expression();
                self.expect(TokenKind::CloseParen);
                let body = self.parse_embedded_statement();
                Statement::Foreach(ForeachStatement {
                    type_reference,
                    variable,
                    expression: self.alloc(expression),
                    body: self.alloc(body),
                    span: self.span_from(start),
                })
            }
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semicolon);
                Statement::Break(BreakStatement {
                    span: self.span_from(start),
                })
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semicolon);
                Statement::Continue(ContinueStatement {
                    span: self.span_from(start),
                })
            }
            TokenKind::Goto => {
                self.advance();
                let kind = match self.la_kind() {
                    TokenKind::Case => {
                        self.advance();
                        let expr = self.parse_expression();
                        GotoKind::Case(self.alloc(expr))
                    }
                    TokenKind::Default => {
                        self.advance();
                        GotoKind::Default
                    }
                    _ => GotoKind::Label(self.expect_ident()),
                };
                self.expect(TokenKind::Semicolon);
                Statement::Goto(GotoStatement {
                    kind,
                    span: self.span_from(start),
                })
            }
            TokenKind::Return => {
                self.advance();
                let expression = if self.la_kind() != TokenKind::Semicolon {
                    let expr = self.parse_expression();
                    Some(&*self.alloc(expr))
                } else {
                    None
                };
                self.expect(TokenKind::Semicolon);
                Statement::Return(ReturnStatement {
                    expression,
                    span: self.span_from(start),
                })
            }
            TokenKind::Throw => {
                self.advance();
                let expression = if self.la_kind() != TokenKind::Semicolon {
                    let expr = self.parse_expression();
                    Some(&*self.alloc(expr))
                } else {
                    None
                };
                self.expect(TokenKind::Semicolon);
                Statement::Throw(ThrowStatement {
                    expression,
                    span: self.span_from(start),
                })
            }
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Lock => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let expression = self.parse_expression();
                self.expect(TokenKind::CloseParen);
                let body = self.parse_embedded_statement();
                Statement::Lock(LockStatement {
                    expression: self.alloc(expression),
                    body: self.alloc(body),
                    span: self.span_from(start),
                })
            }
            TokenKind::Using => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let resource = if self.is_local_var_decl() {
                    self.parse_local_variable(false, false)
                } else {
                    self.parse_statement_expr()
                };
                self.expect(TokenKind::CloseParen);
                let body = self.parse_embedded_statement();
                Statement::Using(UsingStatement {
                    resource: self.alloc(resource),
                    body: self.alloc(body),
                    span: self.span_from(start),
                })
            }
            TokenKind::Unsafe => {
                self.advance();
                let block = self.parse_block();
                Statement::Unsafe(UnsafeStatement {
                    block,
                    span: self.span_from(start),
                })
            }
            TokenKind::Fixed => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let type_reference = self.parse_type_reference(true);
                if !type_reference.is_pointer() {
                    let loc = type_reference.span.start;
                    self.report(loc, &messages::FIXED_REQUIRES_POINTER, &[]);
                }
                let declarators = self.parse_variable_declarators(true);
                self.expect(TokenKind::CloseParen);
                let body = self.parse_embedded_statement();
                Statement::Fixed(FixedStatement {
                    type_reference,
                    declarators: self.alloc_vec(declarators),
                    body: self.alloc(body),
                    span: self.span_from(start),
                })
            }
            TokenKind::Checked | TokenKind::Unchecked if self.checked_or_unchecked_block() => {
                let unchecked = self.la_kind() == TokenKind::Unchecked;
                self.advance();
                let block = self.parse_block();
                if unchecked {
                    Statement::Unchecked(UncheckedStatement {
                        block,
                        span: self.span_from(start),
                    })
                } else {
                    Statement::Checked(CheckedStatement {
                        block,
                        span: self.span_from(start),
                    })
                }
            }
            TokenKind::Ident if self.is_yield_statement() => {
                self.advance();
                let kind = if self.accept(TokenKind::Return) {
                    let expr = self.parse_expression();
                    YieldKind::Return(self.alloc(expr))
                } else {
                    self.expect(TokenKind::Break);
                    YieldKind::Break
                };
                self.expect(TokenKind::Semicolon);
                Statement::Yield(YieldStatement {
                    kind,
                    span: self.span_from(start),
                })
            }
            _ => {
                let expr = self.parse_expression();
                self.expect(TokenKind::Semicolon);
                Statement::Expression(ExpressionStatement {
                    expression: self.alloc(expr),
                    span: self.span_from(start),
                })
            }
        }
    }

    fn parse_switch_statement(&mut self) -> Statement<'a> {
        let start = self.start_loc();
        self.advance();
        self.expect(TokenKind::OpenParen);
        let expression = self.parse_expression();
        self.expect(TokenKind::CloseParen);
        self.expect(TokenKind::OpenCurly);
        let mut sections = Vec::new();
        while matches!(self.la_kind(), TokenKind::Case | TokenKind::Default) {
            let section_start = self.start_loc();
            let mut labels = Vec::new();
            while matches!(self.la_kind(), TokenKind::Case | TokenKind::Default) {
                let label_start = self.start_loc();
                let expr = if self.accept(TokenKind::Case) {
                    let e = self.parse_expression();
                    Some(&*self.alloc(e))
                } else {
                    self.expect(TokenKind::Default);
                    None
                };
                self.expect(TokenKind::Colon);
                labels.push(CaseLabel {
                    expression: expr,
                    span: self.span_from(label_start),
                });
            }
            let mut statements = Vec::new();
            while !matches!(
                self.la_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::CloseCurly | TokenKind::Eof
            ) {
                let before = self.consumed;
                statements.push(self.parse_statement());
                if self.consumed == before {
                    self.advance();
                }
            }
            sections.push(SwitchSection {
                labels: self.alloc_vec(labels),
                statements: self.alloc_vec(statements),
                span: self.span_from(section_start),
            });
        }
        self.expect(TokenKind::CloseCurly);
        Statement::Switch(SwitchStatement {
            expression: self.alloc(expression),
            sections: self.alloc_vec(sections),
            span: self.span_from(start),
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let start = self.start_loc();
        self.advance();
        self.expect(TokenKind::OpenParen);
        let mut initializers = Vec::new();
        if self.la_kind() != TokenKind::Semicolon {
            if self.is_local_var_decl() {
                initializers.push(self.parse_local_variable(false, false));
            } else {
                loop {
                    initializers.push(self.parse_statement_expr());
                    if !self.accept(TokenKind::Comma) {
                        break;
                    }
                }
            }
        }
        self.expect(TokenKind::Semicolon);
        let condition = if self.la_kind() != TokenKind::Semicolon {
            let expr = self.parse_expression();
            Some(&*self.alloc(expr))
        } else {
            None
        };
        self.expect(TokenKind::Semicolon);
        let mut iterators = Vec::new();
        if self.la_kind() != TokenKind::CloseParen {
            loop {
                iterators.push(self.parse_statement_expr());
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseParen);
        let body = self.parse_embedded_statement();
        Statement::For(ForStatement {
            initializers: self.alloc_vec(initializers),
            condition,
            iterators: self.alloc_vec(iterators),
            body: self.alloc(body),
            span: self.span_from(start),
        })
    }

    fn parse_try_statement(&mut self) -> Statement<'a> {
        let start = self.start_loc();
        self.advance();
        let try_block = self.parse_block();
        let mut catches = Vec::new();
        while self.la_kind() == TokenKind::Catch {
            let clause_start = self.start_loc();
            let (type_reference, variable) = if self.is_typed_catch() {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let ty = self.parse_type_reference(true);
                let var = if self.la_kind() == TokenKind::Ident {
                    Some(self.expect_ident())
                } else {
                    None
                };
                self.expect(TokenKind::CloseParen);
                (Some(ty), var)
            } else {
                self.advance();
                (None, None)
            };
            let block = self.parse_block();
            catches.push(CatchClause {
                type_reference,
                variable,
                block,
                span: self.span_from(clause_start),
            });
        }
        let finally_block = if self.accept(TokenKind::Finally) {
            Some(self.parse_block())
        } else {
            None
        };
        if catches.is_empty() && finally_block.is_none() {
            self.syn_err(TokenKind::Catch);
        }
        Statement::TryCatch(TryCatchStatement {
            try_block,
            catches: self.alloc_vec(catches),
            finally_block,
            span: self.span_from(start),
        })
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn parse_qualident(&mut self) -> String {
        let mut name = self.expect_ident();
        while self.la_kind() == TokenKind::Dot && self.next_is(TokenKind::Ident) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident());
        }
        name
    }

    /// A type in a declared position: `?` is always a nullable suffix.
    fn parse_type_reference(&mut self, greedy_nullable: bool) -> TypeReference<'a> {
        self.parse_type_core(greedy_nullable, true)
    }

    /// A type in `is`/`as` position: `?` is a nullable suffix only when
    /// it cannot begin a conditional.
    fn parse_type_in_expression(&mut self) -> TypeReference<'a> {
        self.parse_type_core(false, true)
    }

    /// The element type of `new`: rank specifiers belong to the creation
    /// expression, not the type.
    fn parse_nonarray_type(&mut self) -> TypeReference<'a> {
        self.parse_type_core(true, false)
    }

    fn parse_type_core(&mut self, greedy_nullable: bool, collect_dims: bool) -> TypeReference<'a> {
        let start = self.start_loc();
        let mut is_global = false;
        let name;
        let mut generic_args = Vec::new();
        match self.la_kind() {
            k if k.is_simple_type_keyword() || k == TokenKind::Void => {
                name = k.keyword_text().unwrap_or_default().to_string();
                self.advance();
            }
            TokenKind::Ident => {
                if self.ident_is("global") && self.next_is(TokenKind::DoubleColon) {
                    self.advance();
                    self.advance();
                    is_global = true;
                }
                name = self.parse_qualident();
                if self.la_kind() == TokenKind::LessThan {
                    generic_args = self.parse_type_argument_list();
                }
            }
            _ => {
                self.syn_err(TokenKind::Ident);
                name = String::new();
            }
        }

        let mut ty = TypeReference {
            name,
            is_global,
            generic_args: self.alloc_vec(generic_args),
            rank_specifiers: &[],
            pointer_nesting: 0,
            span: self.span_from(start),
        };

        if self.la_kind() == TokenKind::Question && (greedy_nullable || self.is_nullable_suffix())
        {
            let qloc = self.start_loc();
            self.advance();
            if ty.name == "void" {
                self.report(qloc, &messages::VOID_CANNOT_BE_NULLABLE, &[]);
            } else {
                let inner = ty;
                ty = TypeReference {
                    name: "System.Nullable".to_string(),
                    is_global: false,
                    generic_args: self.alloc_vec(vec![inner]),
                    rank_specifiers: &[],
                    pointer_nesting: 0,
                    span: self.span_from(start),
                };
            }
        }

        let mut pointer = 0;
        let mut ranks = Vec::new();
        loop {
            if self.la_kind() == TokenKind::Times {
                self.advance();
                pointer += 1;
            } else if collect_dims && self.is_dims() {
                self.advance();
                let mut dims = 1;
                while self.accept(TokenKind::Comma) {
                    dims += 1;
                }
                self.expect(TokenKind::CloseSquare);
                ranks.push(dims);
            } else {
                break;
            }
        }
        ty.pointer_nesting = pointer;
        ty.rank_specifiers = self.alloc_vec(ranks);
        ty.span = self.span_from(start);
        ty
    }

    /// "<" Type {"," Type} ">", each `>` its own token.
    fn parse_type_argument_list(&mut self) -> Vec<TypeReference<'a>> {
        self.expect(TokenKind::LessThan);
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type_reference(true));
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::GreaterThan);
        args
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Expr = UnaryExpr (AssignmentOp Expr | binary cascade [ternary]).
    /// Assignment and the conditional are right-associative; every binary
    /// level below is left-associative with its own production.
    fn parse_expression(&mut self) -> Expression<'a> {
        let unary = self.parse_unary_expression();

        if let Some(op) = token_sets::assignment_operator(self.la_kind()) {
            let start = unary.span().start;
            self.advance();
            let right = self.parse_expression();
            let span = Span::new(start, right.span().end);
            return Expression::Assignment(AssignmentExpression {
                left: self.alloc(unary),
                operator: op,
                right: self.alloc(right),
                span,
            });
        }
        if self.is_shift_right_assign() {
            let start = unary.span().start;
            self.advance();
            self.advance();
            let right = self.parse_expression();
            let span = Span::new(start, right.span().end);
            return Expression::Assignment(AssignmentExpression {
                left: self.alloc(unary),
                operator: AssignmentOperator::ShiftRight,
                right: self.alloc(right),
                span,
            });
        }

        let expr = self.parse_conditional_or_rest(unary);
        if self.la_kind() == TokenKind::Question {
            let start = expr.span().start;
            self.advance();
            let true_expression = self.parse_expression();
            self.expect(TokenKind::Colon);
            let false_expression = self.parse_expression();
            let span = Span::new(start, false_expression.span().end);
            return Expression::Conditional(ConditionalExpression {
                condition: self.alloc(expr),
                true_expression: self.alloc(true_expression),
                false_expression: self.alloc(false_expression),
                span,
            });
        }
        expr
    }

    fn mk_binary(
        &mut self,
        op: BinaryOperator,
        left: Expression<'a>,
        right: Expression<'a>,
    ) -> Expression<'a> {
        let span = Span::new(left.span().start, right.span().end);
        Expression::Binary(BinaryOperatorExpression {
            operator: op,
            left: self.alloc(left),
            right: self.alloc(right),
            span,
        })
    }

    fn parse_conditional_or_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_conditional_and_rest(left);
        while self.la_kind() == TokenKind::LogicalOr {
            self.advance();
            let right = self.parse_unary_expression();
            let right = self.parse_conditional_and_rest(right);
            left = self.mk_binary(BinaryOperator::LogicalOr, left, right);
        }
        left
    }

    fn parse_conditional_and_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_inclusive_or_rest(left);
        while self.la_kind() == TokenKind::LogicalAnd {
            self.advance();
            let right = self.parse_unary_expression();
            let right = self.parse_inclusive_or_rest(right);
            left = self.mk_binary(BinaryOperator::LogicalAnd, left, right);
        }
        left
    }

    fn parse_inclusive_or_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_exclusive_or_rest(left);
        while self.la_kind() == TokenKind::BitwiseOr {
            self.advance();
            let right = self.parse_unary_expression();
            let right = self.parse_exclusive_or_rest(right);
            left = self.mk_binary(BinaryOperator::BitwiseOr, left, right);
        }
        left
    }

    fn parse_exclusive_or_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_and_rest(left);
        while self.la_kind() == TokenKind::Xor {
            self.advance();
            let right = self.parse_unary_expression();
            let right = self.parse_and_rest(right);
            left = self.mk_binary(BinaryOperator::ExclusiveOr, left, right);
        }
        left
    }

    fn parse_and_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_equality_rest(left);
        while self.la_kind() == TokenKind::BitwiseAnd {
            self.advance();
            let right = self.parse_unary_expression();
            let right = self.parse_equality_rest(right);
            left = self.mk_binary(BinaryOperator::BitwiseAnd, left, right);
        }
        left
    }

    fn parse_equality_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_relational_rest(left);
        while let Some(op) = token_sets::equality_operator(self.la_kind()) {
            self.advance();
            let right = self.parse_unary_expression();
            let right = self.parse_relational_rest(right);
            left = self.mk_binary(op, left, right);
        }
        left
    }

    /// Relational level, including the `is`/`as` type tests.
    fn parse_relational_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_shift_rest(left);
        loop {
            match self.la_kind() {
                TokenKind::Is | TokenKind::As => {
                    let operator = if self.la_kind() == TokenKind::Is {
                        TypeTestOperator::Is
                    } else {
                        TypeTestOperator::As
                    };
                    self.advance();
                    let target_type = self.parse_type_in_expression();
                    let span = Span::new(left.span().start, self.end_loc());
                    left = Expression::TypeTest(TypeTestExpression {
                        operator,
                        expression: self.alloc(left),
                        target_type,
                        span,
                    });
                }
                k => {
                    if let Some(op) = token_sets::relational_operator(k) {
                        self.advance();
                        let right = self.parse_unary_expression();
                        let right = self.parse_shift_rest(right);
                        left = self.mk_binary(op, left, right);
                    } else {
                        return left;
                    }
                }
            }
        }
    }

    /// Shift level: `<<` is a single token; `>>` is reassembled from two
    /// `>` tokens when the shift-right predicate fires.
    fn parse_shift_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_additive_rest(left);
        loop {
            if self.la_kind() == TokenKind::ShiftLeft {
                self.advance();
                let right = self.parse_unary_expression();
                let right = self.parse_additive_rest(right);
                left = self.mk_binary(BinaryOperator::ShiftLeft, left, right);
            } else if self.is_shift_right() {
                self.advance();
                self.advance();
                let right = self.parse_unary_expression();
                let right = self.parse_additive_rest(right);
                left = self.mk_binary(BinaryOperator::ShiftRight, left, right);
            } else {
                return left;
            }
        }
    }

    fn parse_additive_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        left = self.parse_multiplicative_rest(left);
        while let Some(op) = token_sets::additive_operator(self.la_kind()) {
            self.advance();
            let right = self.parse_unary_expression();
            let right = self.parse_multiplicative_rest(right);
            left = self.mk_binary(op, left, right);
        }
        left
    }

    fn parse_multiplicative_rest(&mut self, mut left: Expression<'a>) -> Expression<'a> {
        while let Some(op) = token_sets::multiplicative_operator(self.la_kind()) {
            self.advance();
            let right = self.parse_unary_expression();
            left = self.mk_binary(op, left, right);
        }
        left
    }

    /// UnaryExpr: prefix operators and casts share one collection so
    /// source order is preserved, then compose right-to-left around the
    /// primary.
    fn parse_unary_expression(&mut self) -> Expression<'a> {
        enum Prefix<'a> {
            Op(UnaryOperator, Location),
            Cast(TypeReference<'a>, Location),
        }
        let mut prefixes: Vec<Prefix<'a>> = Vec::new();
        loop {
            let loc = self.start_loc();
            if let Some(op) = token_sets::unary_operator(self.la_kind()) {
                self.advance();
                prefixes.push(Prefix::Op(op, loc));
            } else if self.la_kind() == TokenKind::OpenParen && self.is_type_cast() {
                self.advance();
                let ty = self.parse_type_reference(true);
                self.expect(TokenKind::CloseParen);
                prefixes.push(Prefix::Cast(ty, loc));
            } else {
                break;
            }
        }
        let mut expr = self.parse_primary_expression();
        for prefix in prefixes.into_iter().rev() {
            let end = expr.span().end;
            expr = match prefix {
                Prefix::Op(op, loc) => Expression::Unary(UnaryOperatorExpression {
                    operator: op,
                    expression: self.alloc(expr),
                    span: Span::new(loc, end),
                }),
                Prefix::Cast(ty, loc) => Expression::Cast(CastExpression {
                    target_type: ty,
                    expression: self.alloc(expr),
                    span: Span::new(loc, end),
                }),
            };
        }
        expr
    }

    /// PrimaryExpr: one head alternative, then the postfix loop.
    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let start = self.start_loc();
        let mut expr = self.parse_primary_start(start);
        loop {
            match self.la_kind() {
                TokenKind::Increment | TokenKind::Decrement => {
                    let op = if self.la_kind() == TokenKind::Increment {
                        UnaryOperator::PostIncrement
                    } else {
                        UnaryOperator::PostDecrement
                    };
                    self.advance();
                    let span = Span::new(expr.span().start, self.end_loc());
                    expr = Expression::Unary(UnaryOperatorExpression {
                        operator: op,
                        expression: self.alloc(expr),
                        span,
                    });
                }
                TokenKind::Dot => {
                    self.advance();
                    let member_name = self.expect_ident();
                    let span = Span::new(expr.span().start, self.end_loc());
                    expr = Expression::MemberReference(MemberReferenceExpression {
                        target: self.alloc(expr),
                        member_name,
                        type_arguments: &[],
                        span,
                    });
                }
                TokenKind::Pointer => {
                    self.advance();
                    let member_name = self.expect_ident();
                    let span = Span::new(expr.span().start, self.end_loc());
                    expr = Expression::PointerReference(PointerReferenceExpression {
                        target: self.alloc(expr),
                        member_name,
                        span,
                    });
                }
                TokenKind::OpenParen => {
                    self.advance();
                    let arguments = self.parse_argument_list(TokenKind::CloseParen);
                    self.expect(TokenKind::CloseParen);
                    let span = Span::new(expr.span().start, self.end_loc());
                    expr = Expression::Invocation(InvocationExpression {
                        target: self.alloc(expr),
                        arguments: self.alloc_vec(arguments),
                        span,
                    });
                }
                TokenKind::OpenSquare => {
                    if matches!(expr, Expression::ArrayCreate(_)) {
                        let loc = self.start_loc();
                        self.report(loc, &messages::NO_INDEXER_ON_ARRAY_CREATION, &[]);
                    }
                    self.advance();
                    let mut indexes = Vec::new();
                    loop {
                        indexes.push(self.parse_expression());
                        if !self.accept(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::CloseSquare);
                    let span = Span::new(expr.span().start, self.end_loc());
                    expr = Expression::Indexer(IndexerExpression {
                        target: self.alloc(expr),
                        indexes: self.alloc_vec(indexes),
                        span,
                    });
                }
                TokenKind::LessThan => {
                    let can_attach = matches!(
                        expr,
                        Expression::Identifier(_) | Expression::MemberReference(_)
                    );
                    if can_attach && self.is_generic_followed_by(TokenKind::OpenParen) {
                        // generic method group: `M<int>(...)` / `x.M<int>(...)`
                        let args = self.parse_type_argument_list();
                        let args = self.alloc_vec(args);
                        let end = self.end_loc();
                        expr = match expr {
                            Expression::Identifier(mut id) => {
                                id.type_arguments = args;
                                id.span.end = end;
                                Expression::Identifier(id)
                            }
                            Expression::MemberReference(mut m) => {
                                m.type_arguments = args;
                                m.span.end = end;
                                Expression::MemberReference(m)
                            }
                            other => other,
                        };
                    } else if self.is_generic_followed_by(TokenKind::Dot) {
                        // `Name<args>.member`: only a pure name chain can
                        // be read back as a type reference.
                        match Self::expression_as_type_chain(&expr) {
                            Some(name) => {
                                let tstart = expr.span().start;
                                let args = self.parse_type_argument_list();
                                let ty = TypeReference {
                                    name,
                                    is_global: false,
                                    generic_args: self.alloc_vec(args),
                                    rank_specifiers: &[],
                                    pointer_nesting: 0,
                                    span: Span::new(tstart, self.end_loc()),
                                };
                                expr = Expression::TypeRef(TypeReferenceExpression {
                                    span: ty.span,
                                    type_reference: ty,
                                });
                            }
                            None => break,
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        expr
    }

    /// A dotted name with no type arguments anywhere, usable as the
    /// qualifier of a generic type reference.
    fn expression_as_type_chain(expr: &Expression<'a>) -> Option<String> {
        match expr {
            Expression::Identifier(id) if id.type_arguments.is_empty() => Some(id.name.clone()),
            Expression::MemberReference(m) if m.type_arguments.is_empty() => {
                let base = Self::expression_as_type_chain(m.target)?;
                Some(format!("{}.{}", base, m.member_name))
            }
            _ => None,
        }
    }

    fn parse_primary_start(&mut self, start: Location) -> Expression<'a> {
        match self.la_kind() {
            TokenKind::Literal | TokenKind::True | TokenKind::False | TokenKind::Null => {
                let value = self
                    .lexer
                    .lookahead()
                    .literal
                    .clone()
                    .unwrap_or(LiteralValue::Null);
                self.advance();
                Expression::Primitive(PrimitiveExpression {
                    value,
                    span: self.span_from(start),
                })
            }
            TokenKind::Ident => {
                if self.ident_is("global") && self.next_is(TokenKind::DoubleColon) {
                    self.advance();
                    self.advance();
                    let name = self.expect_ident();
                    let ty = TypeReference {
                        name,
                        is_global: true,
                        generic_args: &[],
                        rank_specifiers: &[],
                        pointer_nesting: 0,
                        span: self.span_from(start),
                    };
                    return Expression::TypeRef(TypeReferenceExpression {
                        span: ty.span,
                        type_reference: ty,
                    });
                }
                let name = self.expect_ident();
                Expression::Identifier(IdentifierExpression {
                    name,
                    type_arguments: &[],
                    span: self.span_from(start),
                })
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_expression();
                self.expect(TokenKind::CloseParen);
                Expression::Parenthesized(ParenthesizedExpression {
                    expression: self.alloc(inner),
                    span: self.span_from(start),
                })
            }
            TokenKind::This => {
                self.advance();
                Expression::This(ThisReferenceExpression {
                    span: self.span_from(start),
                })
            }
            TokenKind::Base => {
                self.advance();
                Expression::Base(BaseReferenceExpression {
                    span: self.span_from(start),
                })
            }
            TokenKind::New => self.parse_object_or_array_create(),
            TokenKind::Typeof => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let type_reference = self.parse_type_reference(true);
                self.expect(TokenKind::CloseParen);
                Expression::TypeOf(TypeOfExpression {
                    type_reference,
                    span: self.span_from(start),
                })
            }
            TokenKind::Sizeof => {
                self.advance();
                self.expect(TokenKind::OpenParen);
                let type_reference = self.parse_type_reference(true);
                self.expect(TokenKind::CloseParen);
                Expression::SizeOf(SizeOfExpression {
                    type_reference,
                    span: self.span_from(start),
                })
            }
            TokenKind::Checked | TokenKind::Unchecked => {
                let unchecked = self.la_kind() == TokenKind::Unchecked;
                self.advance();
                self.expect(TokenKind::OpenParen);
                let inner = self.parse_expression();
                self.expect(TokenKind::CloseParen);
                let span = self.span_from(start);
                if unchecked {
                    Expression::Unchecked(UncheckedExpression {
                        expression: self.alloc(inner),
                        span,
                    })
                } else {
                    Expression::Checked(CheckedExpression {
                        expression: self.alloc(inner),
                        span,
                    })
                }
            }
            TokenKind::Delegate => {
                self.advance();
                let mut parameters = Vec::new();
                let has_parameter_list = self.la_kind() == TokenKind::OpenParen;
                if has_parameter_list {
                    self.advance();
                    parameters = self.parse_parameter_list(TokenKind::CloseParen);
                    self.expect(TokenKind::CloseParen);
                }
                let body = self.parse_block();
                Expression::AnonymousMethod(AnonymousMethodExpression {
                    parameters: self.alloc_vec(parameters),
                    has_parameter_list,
                    body,
                    span: self.span_from(start),
                })
            }
            TokenKind::Stackalloc => self.parse_stackalloc(),
            k if k.is_simple_type_keyword() => {
                let name = k.keyword_text().unwrap_or_default().to_string();
                self.advance();
                let ty = TypeReference {
                    name,
                    is_global: false,
                    generic_args: &[],
                    rank_specifiers: &[],
                    pointer_nesting: 0,
                    span: self.span_from(start),
                };
                Expression::TypeRef(TypeReferenceExpression {
                    span: ty.span,
                    type_reference: ty,
                })
            }
            _ => {
                self.invalid_err("PrimaryExpr");
                if !matches!(
                    self.la_kind(),
                    TokenKind::CloseParen
                        | TokenKind::CloseSquare
                        | TokenKind::CloseCurly
                        | TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::Colon
                        | TokenKind::Eof
                ) {
                    self.advance();
                }
                Expression::Identifier(IdentifierExpression {
                    name: String::new(),
                    type_arguments: &[],
                    span: Span::at(start),
                })
            }
        }
    }

    /// "new" NonArrayType: constructor call, sized array creation, or
    /// rank-specified array creation with an initializer.
    fn parse_object_or_array_create(&mut self) -> Expression<'a> {
        let start = self.start_loc();
        self.expect(TokenKind::New);
        let mut ty = self.parse_nonarray_type();
        match self.la_kind() {
            TokenKind::OpenParen => {
                self.advance();
                let arguments = self.parse_argument_list(TokenKind::CloseParen);
                self.expect(TokenKind::CloseParen);
                Expression::ObjectCreate(ObjectCreateExpression {
                    type_reference: ty,
                    arguments: self.alloc_vec(arguments),
                    span: self.span_from(start),
                })
            }
            TokenKind::OpenSquare => {
                if self.is_dims() {
                    // `new T[] { ... }` / `new T[,] { ... }`
                    let ranks = self.parse_rank_specifiers();
                    ty.rank_specifiers = self.alloc_vec(ranks);
                    ty.span.end = self.end_loc();
                    let initializer = if self.la_kind() == TokenKind::OpenCurly {
                        Some(self.parse_array_initializer())
                    } else {
                        self.syn_err(TokenKind::OpenCurly);
                        None
                    };
                    Expression::ArrayCreate(ArrayCreateExpression {
                        type_reference: ty,
                        arguments: &[],
                        initializer,
                        span: self.span_from(start),
                    })
                } else {
                    // `new T[n, m]` with optional extra ranks/initializer
                    self.advance();
                    let mut sizes = Vec::new();
                    loop {
                        sizes.push(self.parse_expression());
                        if !self.accept(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::CloseSquare);
                    if self.la_kind() == TokenKind::OpenSquare && self.is_dims() {
                        let ranks = self.parse_rank_specifiers();
                        ty.rank_specifiers = self.alloc_vec(ranks);
                        ty.span.end = self.end_loc();
                    }
                    let initializer = if self.la_kind() == TokenKind::OpenCurly {
                        Some(self.parse_array_initializer())
                    } else {
                        None
                    };
                    Expression::ArrayCreate(ArrayCreateExpression {
                        type_reference: ty,
                        arguments: self.alloc_vec(sizes),
                        initializer,
                        span: self.span_from(start),
                    })
                }
            }
            _ => {
                self.syn_err(TokenKind::OpenParen);
                Expression::ObjectCreate(ObjectCreateExpression {
                    type_reference: ty,
                    arguments: &[],
                    span: self.span_from(start),
                })
            }
        }
    }

    fn parse_rank_specifiers(&mut self) -> Vec<u32> {
        let mut ranks = Vec::new();
        while self.la_kind() == TokenKind::OpenSquare && self.is_dims() {
            self.advance();
            let mut dims = 1;
            while self.accept(TokenKind::Comma) {
                dims += 1;
            }
            self.expect(TokenKind::CloseSquare);
            ranks.push(dims);
        }
        ranks
    }

    /// ArrayInitializer = "{" [init {"," init} [","]] "}"
    fn parse_array_initializer(&mut self) -> ArrayInitializerExpression<'a> {
        let start = self.start_loc();
        self.expect(TokenKind::OpenCurly);
        let mut elements = Vec::new();
        while self.la_kind() != TokenKind::CloseCurly && self.la_kind() != TokenKind::Eof {
            let element = if self.la_kind() == TokenKind::OpenCurly {
                Expression::ArrayInitializer(self.parse_array_initializer())
            } else {
                self.parse_variable_initializer()
            };
            elements.push(element);
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::CloseCurly);
        ArrayInitializerExpression {
            elements: self.alloc_vec(elements),
            span: self.span_from(start),
        }
    }

    fn parse_argument_list(&mut self, closer: TokenKind) -> Vec<Expression<'a>> {
        let mut arguments = Vec::new();
        if self.la_kind() == closer {
            return arguments;
        }
        loop {
            arguments.push(self.parse_argument());
            let element_start = |k: TokenKind| {
                token_sets::is_expression_start(k) || matches!(k, TokenKind::Ref | TokenKind::Out)
            };
            if !self.weak_separator(TokenKind::Comma, element_start, |k| k == closer) {
                break;
            }
        }
        arguments
    }

    /// Argument = ["ref" | "out"] Expr
    fn parse_argument(&mut self) -> Expression<'a> {
        if let Some(direction) = token_sets::direction(self.la_kind()) {
            let start = self.start_loc();
            self.advance();
            let expr = self.parse_expression();
            return Expression::Direction(DirectionExpression {
                direction,
                expression: self.alloc(expr),
                span: self.span_from(start),
            });
        }
        self.parse_expression()
    }
}
