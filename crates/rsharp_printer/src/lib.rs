//! rsharp_printer: AST to text output.
//!
//! Regenerates source text from a parsed tree. The output is normalized
//! (canonical whitespace and modifier order), and printing is stable:
//! reparsing printed output and printing again yields identical text,
//! which the round-trip tests rely on.

use rsharp_ast::node::*;
use rsharp_ast::types::ModifierList;
use rsharp_ast::TokenKind;

/// Options for the printer.
pub struct PrinterOptions {
    /// Indentation string per level.
    pub indent_str: String,
    /// Newline string.
    pub new_line: String,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            indent_str: "    ".to_string(),
            new_line: "\n".to_string(),
        }
    }
}

/// The printer converts AST nodes to text.
pub struct Printer {
    output: String,
    indent_level: u32,
    options: PrinterOptions,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::with_options(PrinterOptions::default())
    }

    pub fn with_options(options: PrinterOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            indent_level: 0,
            options,
        }
    }

    pub fn print_compilation_unit(&mut self, unit: &CompilationUnit<'_>) -> String {
        self.output.clear();
        for using in unit.usings {
            self.write_indent();
            self.print_using(using);
            self.write_newline();
        }
        for section in unit.attributes {
            self.write_indent();
            self.print_attribute_section(section);
            self.write_newline();
        }
        for member in unit.members {
            self.print_namespace_member(member);
        }
        self.output.clone()
    }

    pub fn print_expression_to_string(&mut self, expr: &Expression<'_>) -> String {
        self.output.clear();
        self.print_expression(expr);
        self.output.clone()
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_newline(&mut self) {
        let nl = self.options.new_line.clone();
        self.output.push_str(&nl);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            let indent = self.options.indent_str.clone();
            self.output.push_str(&indent);
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn print_using(&mut self, using: &UsingDeclaration<'_>) {
        self.write("using ");
        self.write(&using.name);
        if let Some(target) = &using.alias_of {
            self.write(" = ");
            self.print_type(target);
        }
        self.write(";");
    }

    fn print_namespace_member(&mut self, member: &NamespaceMember<'_>) {
        match member {
            NamespaceMember::Namespace(ns) => {
                self.write_indent();
                self.write("namespace ");
                self.write(&ns.name);
                self.write_newline();
                self.write_indent();
                self.write("{");
                self.write_newline();
                self.indent_level += 1;
                for using in ns.usings {
                    self.write_indent();
                    self.print_using(using);
                    self.write_newline();
                }
                for child in ns.members {
                    self.print_namespace_member(child);
                }
                self.indent_level -= 1;
                self.write_indent();
                self.write("}");
                self.write_newline();
            }
            NamespaceMember::Type(decl) => self.print_type_declaration(decl),
            NamespaceMember::Delegate(decl) => self.print_delegate(decl),
        }
    }

    fn print_attribute_sections(&mut self, sections: &[AttributeSection<'_>]) {
        for section in sections {
            self.write_indent();
            self.print_attribute_section(section);
            self.write_newline();
        }
    }

    fn print_attribute_section(&mut self, section: &AttributeSection<'_>) {
        self.write("[");
        if !section.target.is_empty() {
            self.write(&section.target);
            self.write(": ");
        }
        for (i, attribute) in section.attributes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&attribute.name);
            if !attribute.positional_arguments.is_empty() || !attribute.named_arguments.is_empty() {
                self.write("(");
                let mut first = true;
                for arg in attribute.positional_arguments {
                    if !first {
                        self.write(", ");
                    }
                    first = false;
                    self.print_expression(arg);
                }
                for named in attribute.named_arguments {
                    if !first {
                        self.write(", ");
                    }
                    first = false;
                    self.write(&named.name);
                    self.write(" = ");
                    self.print_expression(named.expression);
                }
                self.write(")");
            }
        }
        self.write("]");
    }

    fn print_modifiers(&mut self, modifiers: &ModifierList) {
        for name in modifiers.value.names() {
            self.write(name);
            self.write(" ");
        }
    }

    fn print_type_declaration(&mut self, decl: &TypeDeclaration<'_>) {
        self.print_attribute_sections(decl.attributes);
        self.write_indent();
        self.print_modifiers(&decl.modifiers);
        self.write(match decl.kind {
            TypeKind::Class => "class ",
            TypeKind::Struct => "struct ",
            TypeKind::Interface => "interface ",
            TypeKind::Enum => "enum ",
        });
        self.write(&decl.name);
        self.print_template_parameters(decl.type_parameters);
        if !decl.base_types.is_empty() {
            self.write(" : ");
            for (i, base) in decl.base_types.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.print_type(base);
            }
        }
        self.print_constraints(decl.constraints);
        self.write_newline();
        self.write_indent();
        self.write("{");
        self.write_newline();
        self.indent_level += 1;
        if decl.kind == TypeKind::Enum {
            for (i, member) in decl.members.iter().enumerate() {
                if let MemberDeclaration::EnumMember(em) = member {
                    self.print_attribute_sections(em.attributes);
                    self.write_indent();
                    self.write(&em.name);
                    if let Some(init) = em.initializer {
                        self.write(" = ");
                        self.print_expression(init);
                    }
                    if i + 1 < decl.members.len() {
                        self.write(",");
                    }
                    self.write_newline();
                }
            }
        } else {
            for member in decl.members {
                self.print_member(member);
            }
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
        self.write_newline();
    }

    fn print_delegate(&mut self, decl: &DelegateDeclaration<'_>) {
        self.print_attribute_sections(decl.attributes);
        self.write_indent();
        self.print_modifiers(&decl.modifiers);
        self.write("delegate ");
        self.print_type(&decl.return_type);
        self.write(" ");
        self.write(&decl.name);
        self.print_template_parameters(decl.type_parameters);
        self.write("(");
        self.print_parameters(decl.parameters);
        self.write(")");
        self.print_constraints(decl.constraints);
        self.write(";");
        self.write_newline();
    }

    fn print_template_parameters(&mut self, params: &[TemplateParameter<'_>]) {
        if params.is_empty() {
            return;
        }
        self.write("<");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            for section in param.attributes {
                self.print_attribute_section(section);
                self.write(" ");
            }
            self.write(&param.name);
        }
        self.write(">");
    }

    fn print_constraints(&mut self, clauses: &[ConstraintClause<'_>]) {
        for clause in clauses {
            self.write(" where ");
            self.write(&clause.type_parameter);
            self.write(" : ");
            for (i, constraint) in clause.constraints.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                match constraint {
                    Constraint::Struct => self.write("struct"),
                    Constraint::Class => self.write("class"),
                    Constraint::New => self.write("new()"),
                    Constraint::Type(ty) => self.print_type(ty),
                }
            }
        }
    }

    fn print_member(&mut self, member: &MemberDeclaration<'_>) {
        match member {
            MemberDeclaration::Field(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                self.print_type(&n.type_reference);
                self.write(" ");
                self.print_declarators(n.declarators);
                self.write(";");
                self.write_newline();
            }
            MemberDeclaration::Property(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                self.print_type(&n.type_reference);
                self.write(" ");
                self.write(&n.name);
                self.write_newline();
                self.print_accessor_block(&n.get_region, "get", &n.set_region, "set");
            }
            MemberDeclaration::Method(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                self.print_type(&n.return_type);
                self.write(" ");
                self.write(&n.name);
                self.print_template_parameters(n.type_parameters);
                self.write("(");
                self.print_parameters(n.parameters);
                self.write(")");
                self.print_constraints(n.constraints);
                self.print_optional_body(&n.body);
            }
            MemberDeclaration::Constructor(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                self.write(&n.name);
                self.write("(");
                self.print_parameters(n.parameters);
                self.write(")");
                if let Some(init) = &n.initializer {
                    self.write(match init.kind {
                        ConstructorInitializerKind::Base => " : base(",
                        ConstructorInitializerKind::This => " : this(",
                    });
                    self.print_expression_list(init.arguments);
                    self.write(")");
                }
                self.print_optional_body(&n.body);
            }
            MemberDeclaration::Destructor(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                self.write("~");
                self.write(&n.name);
                self.write("()");
                self.print_optional_body(&n.body);
            }
            MemberDeclaration::Event(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                self.write("event ");
                self.print_type(&n.type_reference);
                self.write(" ");
                if n.declarators.is_empty() {
                    self.write(&n.name);
                    self.write_newline();
                    self.print_accessor_block(&n.add_region, "add", &n.remove_region, "remove");
                } else {
                    self.print_declarators(n.declarators);
                    self.write(";");
                    self.write_newline();
                }
            }
            MemberDeclaration::Operator(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                match n.kind {
                    OperatorKind::Implicit => {
                        self.write("implicit operator ");
                        self.print_type(&n.return_type);
                    }
                    OperatorKind::Explicit => {
                        self.write("explicit operator ");
                        self.print_type(&n.return_type);
                    }
                    OperatorKind::Overload(tok) => {
                        self.print_type(&n.return_type);
                        self.write(" operator ");
                        self.write(operator_token_text(tok));
                    }
                    OperatorKind::OverloadShiftRight => {
                        self.print_type(&n.return_type);
                        self.write(" operator >>");
                    }
                }
                self.write("(");
                self.print_parameters(n.parameters);
                self.write(")");
                self.print_optional_body(&n.body);
            }
            MemberDeclaration::Indexer(n) => {
                self.print_attribute_sections(n.attributes);
                self.write_indent();
                self.print_modifiers(&n.modifiers);
                self.print_type(&n.type_reference);
                self.write(" ");
                if let Some(interface) = &n.interface_name {
                    self.write(interface);
                    self.write(".");
                }
                self.write("this[");
                self.print_parameters(n.parameters);
                self.write("]");
                self.write_newline();
                self.print_accessor_block(&n.get_region, "get", &n.set_region, "set");
            }
            MemberDeclaration::Type(n) => self.print_type_declaration(n),
            MemberDeclaration::Delegate(n) => self.print_delegate(n),
            MemberDeclaration::EnumMember(n) => {
                // handled by the enum body printer; standalone fallback
                self.write_indent();
                self.write(&n.name);
                self.write_newline();
            }
        }
    }

    fn print_accessor_block(
        &mut self,
        first: &Option<AccessorDeclaration<'_>>,
        first_name: &str,
        second: &Option<AccessorDeclaration<'_>>,
        second_name: &str,
    ) {
        self.write_indent();
        self.write("{");
        self.write_newline();
        self.indent_level += 1;
        if let Some(accessor) = first {
            self.print_accessor(accessor, first_name);
        }
        if let Some(accessor) = second {
            self.print_accessor(accessor, second_name);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
        self.write_newline();
    }

    fn print_accessor(&mut self, accessor: &AccessorDeclaration<'_>, name: &str) {
        self.print_attribute_sections(accessor.attributes);
        self.write_indent();
        self.print_modifiers(&accessor.modifiers);
        self.write(name);
        match &accessor.body {
            Some(body) => {
                self.write(" ");
                self.print_block_inline(body);
                self.write_newline();
            }
            None => {
                self.write(";");
                self.write_newline();
            }
        }
    }

    fn print_parameters(&mut self, params: &[ParameterDeclaration<'_>]) {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            for section in param.attributes {
                self.print_attribute_section(section);
                self.write(" ");
            }
            match param.modifier {
                ParamModifier::None => {}
                ParamModifier::Ref => self.write("ref "),
                ParamModifier::Out => self.write("out "),
                ParamModifier::Params => self.write("params "),
            }
            self.print_type(&param.type_reference);
            self.write(" ");
            self.write(&param.name);
        }
    }

    fn print_declarators(&mut self, declarators: &[VariableDeclarator<'_>]) {
        for (i, declarator) in declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&declarator.name);
            if let Some(init) = declarator.initializer {
                self.write(" = ");
                self.print_expression(init);
            }
        }
    }

    fn print_optional_body(&mut self, body: &Option<Block<'_>>) {
        match body {
            Some(block) => {
                self.write_newline();
                self.print_block_statement(block);
            }
            None => {
                self.write(";");
                self.write_newline();
            }
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn print_type(&mut self, ty: &TypeReference<'_>) {
        self.print_type_core(ty);
        self.print_rank_specifiers(ty.rank_specifiers);
    }

    fn print_type_core(&mut self, ty: &TypeReference<'_>) {
        if ty.is_global {
            self.write("global::");
        }
        self.write(&ty.name);
        if !ty.generic_args.is_empty() {
            self.write("<");
            for (i, arg) in ty.generic_args.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.print_type(arg);
            }
            self.write(">");
        }
        for _ in 0..ty.pointer_nesting {
            self.write("*");
        }
    }

    fn print_rank_specifiers(&mut self, ranks: &[u32]) {
        for rank in ranks {
            self.write("[");
            for _ in 1..*rank {
                self.write(",");
            }
            self.write("]");
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn print_block_statement(&mut self, block: &Block<'_>) {
        self.write_indent();
        self.write("{");
        self.write_newline();
        self.indent_level += 1;
        for stmt in block.statements {
            self.print_statement(stmt);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
        self.write_newline();
    }

    /// A block printed after a header on the same indentation flow, used
    /// by accessors (`get { ... }`).
    fn print_block_inline(&mut self, block: &Block<'_>) {
        self.write("{");
        if block.statements.is_empty() {
            self.write(" }");
            return;
        }
        self.write_newline();
        self.indent_level += 1;
        for stmt in block.statements {
            self.print_statement(stmt);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    /// An embedded statement after a construct header: blocks open on the
    /// next line, other statements are indented one level.
    fn print_embedded(&mut self, stmt: &Statement<'_>) {
        self.write_newline();
        if let Statement::Block(block) = stmt {
            self.print_block_statement(block);
        } else {
            self.indent_level += 1;
            self.print_statement(stmt);
            self.indent_level -= 1;
        }
    }

    fn print_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::Block(block) => self.print_block_statement(block),
            Statement::Empty(_) => {
                self.write_indent();
                self.write(";");
                self.write_newline();
            }
            Statement::Expression(n) => {
                self.write_indent();
                self.print_expression(n.expression);
                self.write(";");
                self.write_newline();
            }
            Statement::LocalVariable(n) => {
                self.write_indent();
                self.print_local_variable(n);
                self.write(";");
                self.write_newline();
            }
            Statement::If(n) => {
                self.write_indent();
                self.write("if (");
                self.print_expression(n.condition);
                self.write(")");
                self.print_embedded(n.true_statement);
                if let Some(false_stmt) = n.false_statement {
                    self.write_indent();
                    self.write("else");
                    self.print_embedded(false_stmt);
                }
            }
            Statement::Switch(n) => {
                self.write_indent();
                self.write("switch (");
                self.print_expression(n.expression);
                self.write(")");
                self.write_newline();
                self.write_indent();
                self.write("{");
                self.write_newline();
                self.indent_level += 1;
                for section in n.sections {
                    for label in section.labels {
                        self.write_indent();
                        match label.expression {
                            Some(expr) => {
                                self.write("case ");
                                self.print_expression(expr);
                                self.write(":");
                            }
                            None => self.write("default:"),
                        }
                        self.write_newline();
                    }
                    self.indent_level += 1;
                    for s in section.statements {
                        self.print_statement(s);
                    }
                    self.indent_level -= 1;
                }
                self.indent_level -= 1;
                self.write_indent();
                self.write("}");
                self.write_newline();
            }
            Statement::While(n) => {
                self.write_indent();
                self.write("while (");
                self.print_expression(n.condition);
                self.write(")");
                self.print_embedded(n.body);
            }
            Statement::DoWhile(n) => {
                self.write_indent();
                self.write("do");
                self.print_embedded(n.body);
                self.write_indent();
                self.write("while (");
                self.print_expression(n.condition);
                self.write(");");
                self.write_newline();
            }
            Statement::For(n) => {
                self.write_indent();
                self.write("for (");
                for (i, init) in n.initializers.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    match init {
                        Statement::LocalVariable(decl) => self.print_local_variable(decl),
                        Statement::Expression(e) => self.print_expression(e.expression),
                        other => self.print_statement(other),
                    }
                }
                self.write("; ");
                if let Some(cond) = n.condition {
                    self.print_expression(cond);
                }
                self.write("; ");
                for (i, iter) in n.iterators.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Statement::Expression(e) = iter {
                        self.print_expression(e.expression);
                    }
                }
                self.write(")");
                self.print_embedded(n.body);
            }
            Statement::Foreach(n) => {
                self.write_indent();
                self.write("foreach (");
                self.print_type(&n.type_reference);
                self.write(" ");
                self.write(&n.variable);
                self.write(" in ");
                self.print_expression(n.expression);
                self.write(")");
                self.print_embedded(n.body);
            }
            Statement::Break(_) => {
                self.write_indent();
                self.write("break;");
                self.write_newline();
            }
            Statement::Continue(_) => {
                self.write_indent();
                self.write("continue;");
                self.write_newline();
            }
            Statement::Goto(n) => {
                self.write_indent();
                match &n.kind {
                    GotoKind::Label(label) => {
                        self.write("goto ");
                        self.write(label);
                    }
                    GotoKind::Case(expr) => {
                        self.write("goto case ");
                        self.print_expression(expr);
                    }
                    GotoKind::Default => self.write("goto default"),
                }
                self.write(";");
                self.write_newline();
            }
            Statement::Return(n) => {
                self.write_indent();
                self.write("return");
                if let Some(expr) = n.expression {
                    self.write(" ");
                    self.print_expression(expr);
                }
                self.write(";");
                self.write_newline();
            }
            Statement::Throw(n) => {
                self.write_indent();
                self.write("throw");
                if let Some(expr) = n.expression {
                    self.write(" ");
                    self.print_expression(expr);
                }
                self.write(";");
                self.write_newline();
            }
            Statement::TryCatch(n) => {
                self.write_indent();
                self.write("try");
                self.write_newline();
                self.print_block_statement(&n.try_block);
                for clause in n.catches {
                    self.write_indent();
                    self.write("catch");
                    if let Some(ty) = &clause.type_reference {
                        self.write(" (");
                        self.print_type(ty);
                        if let Some(variable) = &clause.variable {
                            self.write(" ");
                            self.write(variable);
                        }
                        self.write(")");
                    }
                    self.write_newline();
                    self.print_block_statement(&clause.block);
                }
                if let Some(fin) = &n.finally_block {
                    self.write_indent();
                    self.write("finally");
                    self.write_newline();
                    self.print_block_statement(fin);
                }
            }
            Statement::Lock(n) => {
                self.write_indent();
                self.write("lock (");
                self.print_expression(n.expression);
                self.write(")");
                self.print_embedded(n.body);
            }
            Statement::Using(n) => {
                self.write_indent();
                self.write("using (");
                match n.resource {
                    Statement::LocalVariable(decl) => self.print_local_variable(decl),
                    Statement::Expression(e) => self.print_expression(e.expression),
                    other => self.print_statement(other),
                }
                self.write(")");
                self.print_embedded(n.body);
            }
            Statement::Unsafe(n) => {
                self.write_indent();
                self.write("unsafe");
                self.write_newline();
                self.print_block_statement(&n.block);
            }
            Statement::Fixed(n) => {
                self.write_indent();
                self.write("fixed (");
                self.print_type(&n.type_reference);
                self.write(" ");
                self.print_declarators(n.declarators);
                self.write(")");
                self.print_embedded(n.body);
            }
            Statement::Checked(n) => {
                self.write_indent();
                self.write("checked");
                self.write_newline();
                self.print_block_statement(&n.block);
            }
            Statement::Unchecked(n) => {
                self.write_indent();
                self.write("unchecked");
                self.write_newline();
                self.print_block_statement(&n.block);
            }
            Statement::Yield(n) => {
                self.write_indent();
                match &n.kind {
                    YieldKind::Return(expr) => {
                        self.write("yield return ");
                        self.print_expression(expr);
                    }
                    YieldKind::Break => self.write("yield break"),
                }
                self.write(";");
                self.write_newline();
            }
            Statement::Label(n) => {
                self.write_indent();
                self.write(&n.label);
                self.write(":");
                self.write_newline();
                self.print_statement(n.statement);
            }
        }
    }

    fn print_local_variable(&mut self, decl: &LocalVariableDeclaration<'_>) {
        self.print_modifiers(&decl.modifiers);
        self.print_type(&decl.type_reference);
        self.write(" ");
        self.print_declarators(decl.declarators);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn print_expression_list(&mut self, exprs: &[Expression<'_>]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expression(expr);
        }
    }

    fn print_expression(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Primitive(n) => {
                let text = n.value.to_string();
                self.write(&text);
            }
            Expression::Direction(n) => {
                self.write(match n.direction {
                    FieldDirection::Ref => "ref ",
                    FieldDirection::Out => "out ",
                });
                self.print_expression(n.expression);
            }
            Expression::Identifier(n) => {
                self.write(&n.name);
                self.print_type_arguments(n.type_arguments);
            }
            Expression::This(_) => self.write("this"),
            Expression::Base(_) => self.write("base"),
            Expression::Parenthesized(n) => {
                self.write("(");
                self.print_expression(n.expression);
                self.write(")");
            }
            Expression::TypeRef(n) => self.print_type(&n.type_reference),
            Expression::TypeOf(n) => {
                self.write("typeof(");
                self.print_type(&n.type_reference);
                self.write(")");
            }
            Expression::SizeOf(n) => {
                self.write("sizeof(");
                self.print_type(&n.type_reference);
                self.write(")");
            }
            Expression::Checked(n) => {
                self.write("checked(");
                self.print_expression(n.expression);
                self.write(")");
            }
            Expression::Unchecked(n) => {
                self.write("unchecked(");
                self.print_expression(n.expression);
                self.write(")");
            }
            Expression::StackAlloc(n) => {
                self.write("stackalloc ");
                self.print_type_core(&n.type_reference);
                self.write("[");
                self.print_expression(n.expression);
                self.write("]");
            }
            Expression::AnonymousMethod(n) => {
                self.write("delegate");
                if n.has_parameter_list {
                    self.write(" (");
                    self.print_parameters(n.parameters);
                    self.write(")");
                }
                self.write(" ");
                self.print_block_inline(&n.body);
            }
            Expression::ObjectCreate(n) => {
                self.write("new ");
                self.print_type_core(&n.type_reference);
                self.write("(");
                self.print_expression_list(n.arguments);
                self.write(")");
            }
            Expression::ArrayCreate(n) => {
                self.write("new ");
                self.print_type_core(&n.type_reference);
                if !n.arguments.is_empty() {
                    self.write("[");
                    self.print_expression_list(n.arguments);
                    self.write("]");
                }
                self.print_rank_specifiers(n.type_reference.rank_specifiers);
                if let Some(init) = &n.initializer {
                    self.write(" ");
                    self.print_array_initializer(init);
                }
            }
            Expression::ArrayInitializer(n) => self.print_array_initializer(n),
            Expression::Unary(n) => match n.operator {
                UnaryOperator::PostIncrement => {
                    self.print_expression(n.expression);
                    self.write("++");
                }
                UnaryOperator::PostDecrement => {
                    self.print_expression(n.expression);
                    self.write("--");
                }
                op => {
                    self.write(unary_operator_text(op));
                    self.print_expression(n.expression);
                }
            },
            Expression::Cast(n) => {
                self.write("(");
                self.print_type(&n.target_type);
                self.write(")");
                self.print_expression(n.expression);
            }
            Expression::Binary(n) => {
                self.print_expression(n.left);
                self.write(" ");
                self.write(binary_operator_text(n.operator));
                self.write(" ");
                self.print_expression(n.right);
            }
            Expression::TypeTest(n) => {
                self.print_expression(n.expression);
                self.write(match n.operator {
                    TypeTestOperator::Is => " is ",
                    TypeTestOperator::As => " as ",
                });
                self.print_type(&n.target_type);
            }
            Expression::Conditional(n) => {
                self.print_expression(n.condition);
                self.write(" ? ");
                self.print_expression(n.true_expression);
                self.write(" : ");
                self.print_expression(n.false_expression);
            }
            Expression::Assignment(n) => {
                self.print_expression(n.left);
                self.write(" ");
                self.write(assignment_operator_text(n.operator));
                self.write(" ");
                self.print_expression(n.right);
            }
            Expression::Invocation(n) => {
                self.print_expression(n.target);
                self.write("(");
                self.print_expression_list(n.arguments);
                self.write(")");
            }
            Expression::MemberReference(n) => {
                self.print_expression(n.target);
                self.write(".");
                self.write(&n.member_name);
                self.print_type_arguments(n.type_arguments);
            }
            Expression::PointerReference(n) => {
                self.print_expression(n.target);
                self.write("->");
                self.write(&n.member_name);
            }
            Expression::Indexer(n) => {
                self.print_expression(n.target);
                self.write("[");
                self.print_expression_list(n.indexes);
                self.write("]");
            }
        }
    }

    fn print_type_arguments(&mut self, args: &[TypeReference<'_>]) {
        if args.is_empty() {
            return;
        }
        self.write("<");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_type(arg);
        }
        self.write(">");
    }

    fn print_array_initializer(&mut self, init: &ArrayInitializerExpression<'_>) {
        self.write("{ ");
        for (i, element) in init.elements.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expression(element);
        }
        if init.elements.is_empty() {
            self.write("}");
        } else {
            self.write(" }");
        }
    }
}

fn unary_operator_text(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Plus => "+",
        UnaryOperator::Minus => "-",
        UnaryOperator::Not => "!",
        UnaryOperator::BitNot => "~",
        UnaryOperator::Dereference => "*",
        UnaryOperator::AddressOf => "&",
        UnaryOperator::Increment => "++",
        UnaryOperator::Decrement => "--",
        UnaryOperator::PostIncrement | UnaryOperator::PostDecrement => unreachable!(),
    }
}

fn binary_operator_text(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulus => "%",
        BinaryOperator::ShiftLeft => "<<",
        BinaryOperator::ShiftRight => ">>",
        BinaryOperator::BitwiseAnd => "&",
        BinaryOperator::BitwiseOr => "|",
        BinaryOperator::ExclusiveOr => "^",
        BinaryOperator::LogicalAnd => "&&",
        BinaryOperator::LogicalOr => "||",
        BinaryOperator::Equality => "==",
        BinaryOperator::Inequality => "!=",
        BinaryOperator::LessThan => "<",
        BinaryOperator::GreaterThan => ">",
        BinaryOperator::LessThanOrEqual => "<=",
        BinaryOperator::GreaterThanOrEqual => ">=",
    }
}

fn assignment_operator_text(op: AssignmentOperator) -> &'static str {
    match op {
        AssignmentOperator::Assign => "=",
        AssignmentOperator::Add => "+=",
        AssignmentOperator::Subtract => "-=",
        AssignmentOperator::Multiply => "*=",
        AssignmentOperator::Divide => "/=",
        AssignmentOperator::Modulus => "%=",
        AssignmentOperator::ShiftLeft => "<<=",
        AssignmentOperator::ShiftRight => ">>=",
        AssignmentOperator::BitwiseAnd => "&=",
        AssignmentOperator::BitwiseOr => "|=",
        AssignmentOperator::ExclusiveOr => "^=",
    }
}

fn operator_token_text(tok: TokenKind) -> &'static str {
    tok.display_text()
}
