//! rshc: parse C# source files and report diagnostics.
//!
//! Usage:
//!   rshc [options] <file>...

use bumpalo::Bump;
use clap::Parser as ClapParser;
use rsharp_ast::node::{CompilationUnit, Expression, Statement, TypeReference};
use rsharp_ast::visitor::{self, Visitor};
use rsharp_diagnostics::{Diagnostic, DiagnosticCategory};
use rsharp_parser::ParserOptions;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "rshc", about = "rsharp - a C# parser front-end written in Rust")]
struct Cli {
    /// Source files to parse.
    #[arg(value_name = "FILE", required = true)]
    files: Vec<String>,

    /// Dump the parsed tree in debug form.
    #[arg(long)]
    ast: bool,

    /// Print the regenerated source text.
    #[arg(long)]
    emit: bool,

    /// Skip method bodies (declaration outline only).
    #[arg(long)]
    skeleton: bool,

    /// Print node statistics per file.
    #[arg(long)]
    stats: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    no_color: bool,
}

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();
    let mut had_errors = false;

    for file in &cli.files {
        let source = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("{}: {}", file, err);
                had_errors = true;
                continue;
            }
        };

        let arena = Bump::new();
        let options = ParserOptions {
            parse_method_bodies: !cli.skeleton,
        };
        let (unit, diagnostics) = rsharp_parser::parse_with_options(&arena, &source, options);

        for diagnostic in diagnostics.diagnostics() {
            print_diagnostic(file, diagnostic, cli.no_color);
        }
        if diagnostics.has_errors() {
            had_errors = true;
        }

        if cli.ast {
            println!("{:#?}", unit);
        }
        if cli.emit {
            let mut printer = rsharp_printer::Printer::new();
            print!("{}", printer.print_compilation_unit(&unit));
        }
        if cli.stats {
            print_stats(file, &unit, cli.no_color);
        }
    }

    process::exit(if had_errors { 1 } else { 0 });
}

fn print_diagnostic(file: &str, diagnostic: &Diagnostic, no_color: bool) {
    let (color, reset) = if no_color {
        ("", "")
    } else {
        match diagnostic.category {
            DiagnosticCategory::Error => (RED, RESET),
            DiagnosticCategory::Warning => (YELLOW, RESET),
        }
    };
    eprintln!(
        "{}({},{}): {}{}{} RS{:04}: {}",
        file,
        diagnostic.location.line,
        diagnostic.location.column,
        color,
        diagnostic.category,
        reset,
        diagnostic.code,
        diagnostic.message_text
    );
}

#[derive(Default)]
struct NodeCounter {
    types: usize,
    members: usize,
    statements: usize,
    expressions: usize,
}

impl<'a> Visitor<'a> for NodeCounter {
    fn visit_type_declaration(&mut self, decl: &rsharp_ast::node::TypeDeclaration<'a>) {
        self.types += 1;
        visitor::walk_type_declaration(self, decl);
    }

    fn visit_member(&mut self, member: &rsharp_ast::node::MemberDeclaration<'a>) {
        self.members += 1;
        visitor::walk_member(self, member);
    }

    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        self.statements += 1;
        visitor::walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        self.expressions += 1;
        visitor::walk_expression(self, expr);
    }

    fn visit_type_reference(&mut self, ty: &TypeReference<'a>) {
        visitor::walk_type_reference(self, ty);
    }
}

fn print_stats(file: &str, unit: &CompilationUnit<'_>, no_color: bool) {
    let mut counter = NodeCounter::default();
    counter.visit_compilation_unit(unit);
    let (color, reset) = if no_color { ("", "") } else { (CYAN, RESET) };
    println!(
        "{}{}{}: {} using(s), {} type(s), {} member(s), {} statement(s), {} expression(s)",
        color,
        file,
        reset,
        unit.usings.len(),
        counter.types,
        counter.members,
        counter.statements,
        counter.expressions
    );
}
