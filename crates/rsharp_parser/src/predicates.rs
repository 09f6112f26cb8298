//! Lookahead predicates.
//!
//! Every function here is a pure query over the token stream: it walks the
//! lexer's peek cursor (`start_peek`/`peek`) and never touches the consume
//! cursor, so several predicates can be evaluated against the same
//! lookahead token. Each one answers a single LL(1) conflict the grammar
//! cannot resolve with one token.

use rsharp_ast::TokenKind;
use rsharp_lexer::Token;

use crate::parser::Parser;
use crate::token_sets;

impl<'a> Parser<'a> {
    /// Whether the token after the lookahead has the given kind.
    pub(crate) fn next_is(&mut self, kind: TokenKind) -> bool {
        self.lexer.start_peek();
        self.lexer.peek().kind == kind
    }

    /// Whether the lookahead is the identifier with the given spelling.
    pub(crate) fn ident_is(&self, text: &str) -> bool {
        self.lexer.lookahead().is_ident(text)
    }

    /// `>` immediately followed by `>`: a shift-right in expression
    /// context, since the lexer never fuses the two tokens.
    pub(crate) fn is_shift_right(&mut self) -> bool {
        self.lexer.lookahead().kind == TokenKind::GreaterThan
            && self.next_is(TokenKind::GreaterThan)
    }

    /// `>` followed by `>=`: a shift-right-assign.
    pub(crate) fn is_shift_right_assign(&mut self) -> bool {
        self.lexer.lookahead().kind == TokenKind::GreaterThan
            && self.next_is(TokenKind::GreaterEqual)
    }

    /// `ident =`, the named-argument form in attribute arguments.
    pub(crate) fn is_assignment(&mut self) -> bool {
        self.lexer.lookahead().kind == TokenKind::Ident && self.next_is(TokenKind::Assign)
    }

    /// `ident :`, a labelled statement (`::` lexes as one token, so a
    /// qualified-alias access never matches).
    pub(crate) fn is_label(&mut self) -> bool {
        self.lexer.lookahead().kind == TokenKind::Ident && self.next_is(TokenKind::Colon)
    }

    /// At `[`: an array rank specifier `[ , , ]` rather than an indexing
    /// expression.
    pub(crate) fn is_dims(&mut self) -> bool {
        if self.lexer.lookahead().kind != TokenKind::OpenSquare {
            return false;
        }
        self.lexer.start_peek();
        let mut tok = self.lexer.peek();
        while tok.kind == TokenKind::Comma {
            tok = self.lexer.peek();
        }
        tok.kind == TokenKind::CloseSquare
    }

    /// A `*` or rank specifier follows: the lookahead continues a type.
    pub(crate) fn is_pointer_or_dims(&mut self) -> bool {
        self.lexer.lookahead().kind == TokenKind::Times || self.is_dims()
    }

    /// `yield return` / `yield break`. `yield` alone is an ordinary
    /// identifier.
    pub(crate) fn is_yield_statement(&mut self) -> bool {
        if !self.ident_is("yield") {
            return false;
        }
        self.lexer.start_peek();
        matches!(
            self.lexer.peek().kind,
            TokenKind::Return | TokenKind::Break
        )
    }

    /// `catch (`: a typed catch clause.
    pub(crate) fn is_typed_catch(&mut self) -> bool {
        self.lexer.lookahead().kind == TokenKind::Catch && self.next_is(TokenKind::OpenParen)
    }

    /// `checked {` / `unchecked {`: the statement forms. Either keyword
    /// followed by anything else is the expression form.
    pub(crate) fn checked_or_unchecked_block(&mut self) -> bool {
        matches!(
            self.lexer.lookahead().kind,
            TokenKind::Checked | TokenKind::Unchecked
        ) && self.next_is(TokenKind::OpenCurly)
    }

    /// `ident (`: a constructor declaration inside a type body.
    pub(crate) fn ident_and_lpar(&mut self) -> bool {
        self.lexer.lookahead().kind == TokenKind::Ident && self.next_is(TokenKind::OpenParen)
    }

    /// At `[`: a target-prefixed attribute section (`[target: ...]`).
    /// Any target-shaped prefix matches; the production validates the
    /// spelling against the known target set.
    pub(crate) fn is_local_attr_target(&mut self) -> bool {
        if self.lexer.lookahead().kind != TokenKind::OpenSquare {
            return false;
        }
        self.lexer.start_peek();
        let target = self.lexer.peek();
        let shaped = matches!(
            target.kind,
            TokenKind::Ident | TokenKind::Return | TokenKind::Event
        );
        shaped && self.lexer.peek().kind == TokenKind::Colon
    }

    /// At `[`: a compilation-unit-level attribute section. The accepted
    /// spellings live in `GLOBAL_ATTRIBUTE_TARGETS`.
    pub(crate) fn is_global_attr_target(&mut self) -> bool {
        if self.lexer.lookahead().kind != TokenKind::OpenSquare {
            return false;
        }
        self.lexer.start_peek();
        let target = self.lexer.peek();
        target.kind == TokenKind::Ident
            && token_sets::GLOBAL_ATTRIBUTE_TARGETS.contains(&target.value.as_str())
            && self.lexer.peek().kind == TokenKind::Colon
    }

    /// At `<`: balance `<`/`>` and report whether the token after the
    /// matching `>` is `kind`. Rejects `;`, `{`, `}` and EOF outright,
    /// which keeps the walk bounded on malformed input. This decides
    /// "generic argument list" versus "less-than comparison".
    pub(crate) fn is_generic_followed_by(&mut self, kind: TokenKind) -> bool {
        if self.lexer.lookahead().kind != TokenKind::LessThan {
            return false;
        }
        self.lexer.start_peek();
        let mut depth = 1u32;
        loop {
            let tok = self.lexer.peek();
            match tok.kind {
                TokenKind::LessThan => depth += 1,
                TokenKind::GreaterThan => {
                    depth -= 1;
                    if depth == 0 {
                        return self.lexer.peek().kind == kind;
                    }
                }
                TokenKind::Semicolon
                | TokenKind::OpenCurly
                | TokenKind::CloseCurly
                | TokenKind::Eof => return false,
                _ => {}
            }
        }
    }

    /// At `(`: is this a cast? Either the simple-type form
    /// `( typeKW [?|*|dims] )` or a parenthesized type name whose closing
    /// paren is followed by a cast-follower token.
    pub(crate) fn is_type_cast(&mut self) -> bool {
        if self.lexer.lookahead().kind != TokenKind::OpenParen {
            return false;
        }
        self.is_simple_type_cast() || self.guess_type_cast()
    }

    /// `( typeKW )`, `( typeKW ? )`, `( typeKW *` or `( typeKW [`.
    /// A type keyword followed by `.` is a member access on the keyword
    /// (`(int.MaxValue)`), not a cast.
    fn is_simple_type_cast(&mut self) -> bool {
        self.lexer.start_peek();
        let t1 = self.lexer.peek();
        if !(t1.kind.is_simple_type_keyword() || t1.kind == TokenKind::Void) {
            return false;
        }
        let t2 = self.lexer.peek();
        match t2.kind {
            TokenKind::CloseParen => true,
            TokenKind::Question => self.lexer.peek().kind == TokenKind::CloseParen,
            TokenKind::Times | TokenKind::OpenSquare => true,
            _ => false,
        }
    }

    /// `( qualified-type-shape )` followed by a cast-follower.
    fn guess_type_cast(&mut self) -> bool {
        self.lexer.start_peek();
        let first = self.lexer.peek();
        let after = match self.peek_type_shape(first) {
            Some(tok) => tok,
            None => return false,
        };
        if after.kind != TokenKind::CloseParen {
            return false;
        }
        token_sets::is_cast_follower(self.lexer.peek().kind)
    }

    /// Do the next tokens form `type-name identifier`, i.e. a local
    /// variable declaration rather than an expression statement?
    pub(crate) fn is_local_var_decl(&mut self) -> bool {
        if self.is_yield_statement() {
            return false;
        }
        let la_kind = self.lexer.lookahead().kind;
        if la_kind.is_simple_type_keyword() || la_kind == TokenKind::Void {
            // `int x` starts a declaration, `int.MaxValue` does not.
            return !self.next_is(TokenKind::Dot);
        }
        self.lexer.start_peek();
        let first = self.lexer.lookahead().clone();
        match self.peek_type_shape(first) {
            Some(after) => after.kind == TokenKind::Ident,
            None => false,
        }
    }

    /// In `is`/`as` context: treat `?` as a nullable suffix only when the
    /// token after it cannot begin an expression, so `a is T ? x : y`
    /// keeps its conditional.
    pub(crate) fn is_nullable_suffix(&mut self) -> bool {
        if self.lexer.lookahead().kind != TokenKind::Question {
            return false;
        }
        self.lexer.start_peek();
        !token_sets::is_expression_start(self.lexer.peek().kind)
    }

    // ========================================================================
    // Peek-cursor walks over type shapes
    // ========================================================================

    /// Walk a full type shape starting at `tok` (which must already have
    /// been read off the peek stream); returns the token after it.
    fn peek_type_shape(&mut self, mut tok: Token) -> Option<Token> {
        if tok.kind.is_simple_type_keyword() || tok.kind == TokenKind::Void {
            tok = self.lexer.peek();
        } else {
            tok = self.peek_qualident(tok)?;
            if tok.kind == TokenKind::LessThan {
                tok = self.peek_generic_args(tok)?;
            }
        }
        self.peek_type_suffixes(tok)
    }

    /// `ident (:: ident)? (. ident)*`; returns the token after the name.
    fn peek_qualident(&mut self, mut tok: Token) -> Option<Token> {
        if tok.kind != TokenKind::Ident {
            return None;
        }
        tok = self.lexer.peek();
        if tok.kind == TokenKind::DoubleColon {
            tok = self.lexer.peek();
            if tok.kind != TokenKind::Ident {
                return None;
            }
            tok = self.lexer.peek();
        }
        while tok.kind == TokenKind::Dot {
            tok = self.lexer.peek();
            if tok.kind != TokenKind::Ident {
                return None;
            }
            tok = self.lexer.peek();
        }
        Some(tok)
    }

    /// A balanced generic argument list starting at `<`. Unlike the
    /// expression-side balance in `is_generic_followed_by`, only tokens
    /// that can occur inside a type argument list are allowed, so
    /// `a < b && c > d` never reads as a declaration.
    fn peek_generic_args(&mut self, mut tok: Token) -> Option<Token> {
        let mut depth = 0u32;
        loop {
            match tok.kind {
                TokenKind::LessThan => depth += 1,
                TokenKind::GreaterThan => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.lexer.peek());
                    }
                }
                TokenKind::Ident
                | TokenKind::Comma
                | TokenKind::Dot
                | TokenKind::DoubleColon
                | TokenKind::Question
                | TokenKind::Times
                | TokenKind::OpenSquare
                | TokenKind::CloseSquare
                | TokenKind::Void => {}
                k if k.is_simple_type_keyword() => {}
                _ => return None,
            }
            tok = self.lexer.peek();
        }
    }

    /// `?`, `*`* and `[,*]`* suffixes; returns the token after them.
    fn peek_type_suffixes(&mut self, mut tok: Token) -> Option<Token> {
        if tok.kind == TokenKind::Question {
            tok = self.lexer.peek();
        }
        loop {
            match tok.kind {
                TokenKind::Times => tok = self.lexer.peek(),
                TokenKind::OpenSquare => {
                    tok = self.lexer.peek();
                    while tok.kind == TokenKind::Comma {
                        tok = self.lexer.peek();
                    }
                    if tok.kind != TokenKind::CloseSquare {
                        return None;
                    }
                    tok = self.lexer.peek();
                }
                _ => return Some(tok),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use bumpalo::Bump;
    use rsharp_ast::TokenKind;
    use rsharp_lexer::Lexer;

    fn parser<'a>(arena: &'a Bump, source: &str) -> Parser<'a> {
        Parser::new(arena, Lexer::new(source))
    }

    /// Predicates must not move the consume cursor.
    #[test]
    fn predicates_leave_cursor_untouched() {
        let arena = Bump::new();
        let mut p = parser(&arena, "(List<int>)x + y;");
        let before = (
            p.lexer.current().span,
            p.lexer.lookahead().span,
            p.lexer.lookahead().kind,
        );
        assert!(p.is_type_cast());
        assert!(!p.is_local_var_decl());
        assert!(!p.is_shift_right());
        let after = (
            p.lexer.current().span,
            p.lexer.lookahead().span,
            p.lexer.lookahead().kind,
        );
        assert_eq!(before, after);
    }

    #[test]
    fn type_cast_shapes() {
        let arena = Bump::new();
        assert!(parser(&arena, "(int)a").is_type_cast());
        assert!(parser(&arena, "(int?)a").is_type_cast());
        assert!(parser(&arena, "(byte*)p").is_type_cast());
        assert!(parser(&arena, "(int[])a").is_type_cast());
        assert!(parser(&arena, "(T)ident").is_type_cast());
        assert!(parser(&arena, "(Sys.Col.List)x").is_type_cast());
        assert!(parser(&arena, "(T)(x)").is_type_cast());
        // `(a) + b` is an addition, `+` is not a cast-follower.
        assert!(!parser(&arena, "(a) + b").is_type_cast());
        assert!(!parser(&arena, "(a)").is_type_cast());
        assert!(!parser(&arena, "(a, b)").is_type_cast());
        assert!(!parser(&arena, "(int.MaxValue)").is_type_cast());
        // keywords other than `as`/`is` follow casts
        assert!(parser(&arena, "(T)this").is_type_cast());
        assert!(!parser(&arena, "(x) is T").is_type_cast());
    }

    #[test]
    fn local_var_decl_shapes() {
        let arena = Bump::new();
        assert!(parser(&arena, "int x = 1;").is_local_var_decl());
        assert!(parser(&arena, "List<int> xs;").is_local_var_decl());
        assert!(parser(&arena, "a.b.C value;").is_local_var_decl());
        assert!(parser(&arena, "int[] xs;").is_local_var_decl());
        assert!(parser(&arena, "byte* p;").is_local_var_decl());
        assert!(parser(&arena, "int? n;").is_local_var_decl());
        assert!(!parser(&arena, "int.Parse(s);").is_local_var_decl());
        assert!(!parser(&arena, "a < b && c > d;").is_local_var_decl());
        assert!(!parser(&arena, "f(x);").is_local_var_decl());
        assert!(!parser(&arena, "yield return x;").is_local_var_decl());
    }

    #[test]
    fn generic_followed_by() {
        let arena = Bump::new();
        let mut p = parser(&arena, "<int, List<string>>(x)");
        assert!(p.is_generic_followed_by(TokenKind::OpenParen));
        assert!(!p.is_generic_followed_by(TokenKind::Dot));

        let mut p = parser(&arena, "<T>.Member");
        assert!(p.is_generic_followed_by(TokenKind::Dot));

        // unbalanced before a statement boundary
        let mut p = parser(&arena, "< b; c >");
        assert!(!p.is_generic_followed_by(TokenKind::OpenParen));
    }

    #[test]
    fn shift_right_and_dims() {
        let arena = Bump::new();
        assert!(parser(&arena, ">> 2").is_shift_right());
        assert!(!parser(&arena, "> 2").is_shift_right());
        assert!(parser(&arena, ">>= 2").is_shift_right_assign());
        assert!(parser(&arena, "[,,]").is_dims());
        assert!(parser(&arena, "[]").is_dims());
        assert!(!parser(&arena, "[0]").is_dims());
        assert!(parser(&arena, "* p").is_pointer_or_dims());
        assert!(parser(&arena, "[,] x").is_pointer_or_dims());
        assert!(!parser(&arena, "[i]").is_pointer_or_dims());
    }

    #[test]
    fn contextual_predicates() {
        let arena = Bump::new();
        assert!(parser(&arena, "yield return 1;").is_yield_statement());
        assert!(parser(&arena, "yield break;").is_yield_statement());
        assert!(!parser(&arena, "yield = 3;").is_yield_statement());
        assert!(parser(&arena, "checked { }").checked_or_unchecked_block());
        assert!(!parser(&arena, "checked(x)").checked_or_unchecked_block());
        assert!(parser(&arena, "[assembly: A]").is_global_attr_target());
        assert!(!parser(&arena, "[A]").is_global_attr_target());
        assert!(parser(&arena, "[return: A]").is_local_attr_target());
        assert!(parser(&arena, "[field: A]").is_local_attr_target());
        assert!(!parser(&arena, "[A(1)]").is_local_attr_target());
    }
}
