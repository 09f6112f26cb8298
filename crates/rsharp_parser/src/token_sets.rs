//! Constant token classifications used by the productions and predicates.

use rsharp_ast::node::{AssignmentOperator, BinaryOperator, FieldDirection, UnaryOperator};
use rsharp_ast::{Modifiers, TokenKind};

/// Tokens that may legally begin the operand of a cast, used to tell
/// `(T)x` apart from a parenthesized expression `(e)`. Mirrors the
/// language rule: `~`, `!`, `(`, an identifier, a literal, or any keyword
/// other than `as` and `is`.
pub fn is_cast_follower(kind: TokenKind) -> bool {
    match kind {
        TokenKind::Ident
        | TokenKind::Literal
        | TokenKind::OpenParen
        | TokenKind::Not
        | TokenKind::BitwiseComplement => true,
        TokenKind::As | TokenKind::Is => false,
        k => k.is_keyword(),
    }
}

/// Prefix operators collected by the unary production.
pub fn unary_operator(kind: TokenKind) -> Option<UnaryOperator> {
    Some(match kind {
        TokenKind::Plus => UnaryOperator::Plus,
        TokenKind::Minus => UnaryOperator::Minus,
        TokenKind::Not => UnaryOperator::Not,
        TokenKind::BitwiseComplement => UnaryOperator::BitNot,
        TokenKind::Times => UnaryOperator::Dereference,
        TokenKind::BitwiseAnd => UnaryOperator::AddressOf,
        TokenKind::Increment => UnaryOperator::Increment,
        TokenKind::Decrement => UnaryOperator::Decrement,
        _ => return None,
    })
}

/// Assignment operators with their own token kind. Shift-right-assign is
/// absent by construction (`>` `>=` at token level) and synthesized by the
/// expression production.
pub fn assignment_operator(kind: TokenKind) -> Option<AssignmentOperator> {
    Some(match kind {
        TokenKind::Assign => AssignmentOperator::Assign,
        TokenKind::PlusAssign => AssignmentOperator::Add,
        TokenKind::MinusAssign => AssignmentOperator::Subtract,
        TokenKind::TimesAssign => AssignmentOperator::Multiply,
        TokenKind::DivAssign => AssignmentOperator::Divide,
        TokenKind::ModAssign => AssignmentOperator::Modulus,
        TokenKind::ShiftLeftAssign => AssignmentOperator::ShiftLeft,
        TokenKind::AndAssign => AssignmentOperator::BitwiseAnd,
        TokenKind::OrAssign => AssignmentOperator::BitwiseOr,
        TokenKind::XorAssign => AssignmentOperator::ExclusiveOr,
        _ => return None,
    })
}

pub fn equality_operator(kind: TokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        TokenKind::Equal => BinaryOperator::Equality,
        TokenKind::NotEqual => BinaryOperator::Inequality,
        _ => return None,
    })
}

pub fn relational_operator(kind: TokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        TokenKind::LessThan => BinaryOperator::LessThan,
        TokenKind::GreaterThan => BinaryOperator::GreaterThan,
        TokenKind::LessEqual => BinaryOperator::LessThanOrEqual,
        TokenKind::GreaterEqual => BinaryOperator::GreaterThanOrEqual,
        _ => return None,
    })
}

pub fn additive_operator(kind: TokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        _ => return None,
    })
}

pub fn multiplicative_operator(kind: TokenKind) -> Option<BinaryOperator> {
    Some(match kind {
        TokenKind::Times => BinaryOperator::Multiply,
        TokenKind::Div => BinaryOperator::Divide,
        TokenKind::Mod => BinaryOperator::Modulus,
        _ => return None,
    })
}

/// Operator tokens that may follow the `operator` keyword. `>>`, `true`
/// and `false` are handled separately by the production.
pub fn is_overloadable_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Not
            | TokenKind::BitwiseComplement
            | TokenKind::Increment
            | TokenKind::Decrement
            | TokenKind::Times
            | TokenKind::Div
            | TokenKind::Mod
            | TokenKind::BitwiseAnd
            | TokenKind::BitwiseOr
            | TokenKind::Xor
            | TokenKind::ShiftLeft
            | TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::GreaterThan
            | TokenKind::LessThan
            | TokenKind::GreaterEqual
            | TokenKind::LessEqual
            | TokenKind::True
            | TokenKind::False
    )
}

/// Argument direction keywords.
pub fn direction(kind: TokenKind) -> Option<FieldDirection> {
    Some(match kind {
        TokenKind::Ref => FieldDirection::Ref,
        TokenKind::Out => FieldDirection::Out,
        _ => return None,
    })
}

/// Reserved-word modifiers (the contextual `partial` is handled by the
/// modifier production itself).
pub fn modifier(kind: TokenKind) -> Option<Modifiers> {
    Some(match kind {
        TokenKind::Public => Modifiers::PUBLIC,
        TokenKind::Protected => Modifiers::PROTECTED,
        TokenKind::Internal => Modifiers::INTERNAL,
        TokenKind::Private => Modifiers::PRIVATE,
        TokenKind::Static => Modifiers::STATIC,
        TokenKind::Readonly => Modifiers::READONLY,
        TokenKind::Sealed => Modifiers::SEALED,
        TokenKind::Abstract => Modifiers::ABSTRACT,
        TokenKind::Virtual => Modifiers::VIRTUAL,
        TokenKind::Override => Modifiers::OVERRIDE,
        TokenKind::Extern => Modifiers::EXTERN,
        TokenKind::New => Modifiers::NEW,
        TokenKind::Volatile => Modifiers::VOLATILE,
        TokenKind::Unsafe => Modifiers::UNSAFE,
        _ => return None,
    })
}

/// Whether a token can begin an expression. Used for nullable-suffix
/// lookahead in `is`/`as` contexts and for list recovery.
pub fn is_expression_start(kind: TokenKind) -> bool {
    match kind {
        TokenKind::Ident
        | TokenKind::Literal
        | TokenKind::OpenParen
        | TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Not
        | TokenKind::BitwiseComplement
        | TokenKind::Times
        | TokenKind::BitwiseAnd
        | TokenKind::Increment
        | TokenKind::Decrement
        | TokenKind::This
        | TokenKind::Base
        | TokenKind::New
        | TokenKind::Typeof
        | TokenKind::Sizeof
        | TokenKind::Checked
        | TokenKind::Unchecked
        | TokenKind::Delegate
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Null => true,
        k => k.is_simple_type_keyword(),
    }
}

/// Tokens that can begin a type-level or namespace-level declaration,
/// used by error recovery to find a safe resynchronization point.
pub fn is_declaration_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Namespace
            | TokenKind::Class
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::Enum
            | TokenKind::Delegate
            | TokenKind::Using
            | TokenKind::OpenSquare
            | TokenKind::Const
            | TokenKind::Event
            | TokenKind::CloseCurly
    ) || modifier(kind).is_some()
}

/// Local attribute targets, checked as a set so the membership test is a
/// real test and the set has one place to grow.
pub const ATTRIBUTE_TARGETS: &[&str] = &[
    "assembly", "field", "event", "method", "module", "param", "property", "return", "type",
];

/// Targets valid on a compilation-unit-level section.
pub const GLOBAL_ATTRIBUTE_TARGETS: &[&str] = &["assembly"];
