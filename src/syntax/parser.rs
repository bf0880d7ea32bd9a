//! Recursive-descent parser for the declaration level of a Go file.
//!
//! Only `type` declarations are turned into AST. Imports, constants, variables
//! and function bodies are skipped by bracket balancing, which is enough to walk
//! any well-formed file without type-checking it.

use super::ast::{
    ChanDir, CommentBlock, FieldDecl, FuncType, SourceFile, StructType, TypeDecl, TypeExpr,
    TypeParamGroup, TypeSpec,
};
use super::error::{ParseError, Position};
use super::lexer::{tokenize, CommentGroup, Token, TokenKind};

/// Parse a whole Go source file.
pub fn parse_file(path: &str, src: &str) -> Result<SourceFile, ParseError> {
    Parser::new(path, src)?.file()
}

/// Parse a lone type expression such as `map[string][]*pkg.T`.
pub fn parse_type_expr(src: &str) -> Result<TypeExpr, ParseError> {
    let mut parser = Parser::new("<type>", src)?;
    let ty = parser.parse_type()?;
    if parser.peek().kind == TokenKind::Semicolon {
        parser.advance();
    }
    if parser.peek().kind != TokenKind::Eof {
        return Err(parser.unexpected("end of type"));
    }
    Ok(ty)
}

struct Parser<'p, 'src> {
    path: &'p str,
    src: &'src str,
    tokens: Vec<Token<'src>>,
    comments: Vec<CommentGroup<'src>>,
    index: usize,
}

// One entry of a parameter list before names and types are told apart.
struct ParamEntry {
    named: bool,
    bare_ident: bool,
    variadic: bool,
    ty: TypeExpr,
}

impl<'p, 'src> Parser<'p, 'src> {
    fn new(path: &'p str, src: &'src str) -> Result<Self, ParseError> {
        let lexed = tokenize(path, src)?;
        Ok(Self {
            path,
            src,
            tokens: lexed.tokens,
            comments: lexed.comments,
            index: 0,
        })
    }

    // ---------------------------------------------------------------------
    // token cursor
    // ---------------------------------------------------------------------

    fn peek(&self) -> &Token<'src> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token<'src> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.index + n).min(last)]
    }

    fn advance(&mut self) -> Token<'src> {
        let tok = *self.peek();
        if tok.kind != TokenKind::Eof {
            self.index += 1;
        }
        tok
    }

    fn at(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> Result<Token<'src>, ParseError> {
        if self.at(text) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{text}'")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        if self.peek().kind == TokenKind::Ident {
            Ok(self.advance().text.to_string())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        if self.peek().kind == TokenKind::Semicolon {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected("';'"))
        }
    }

    fn error_at(&self, pos: Position, message: impl Into<String>) -> ParseError {
        ParseError::new(self.path, pos, message)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.peek();
        self.error_at(
            tok.pos,
            format!("expected {expected}, found {}", tok.describe()),
        )
    }

    fn is_type_start(tok: &Token<'_>) -> bool {
        match tok.kind {
            TokenKind::Ident => true,
            TokenKind::Operator => matches!(tok.text, "*" | "[" | "(" | "<-"),
            TokenKind::Keyword => {
                matches!(tok.text, "map" | "chan" | "func" | "struct" | "interface")
            }
            _ => false,
        }
    }

    // ---------------------------------------------------------------------
    // declarations
    // ---------------------------------------------------------------------

    fn file(mut self) -> Result<SourceFile, ParseError> {
        self.expect("package")?;
        let package = self.expect_ident()?;
        if self.peek().kind != TokenKind::Eof {
            self.expect_semicolon()?;
        }

        let mut type_decls = Vec::new();
        loop {
            let tok = *self.peek();
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                    continue;
                }
                TokenKind::Keyword => match tok.text {
                    "type" => type_decls.push(self.type_decl()?),
                    "func" => self.skip_func_decl()?,
                    "import" | "var" | "const" => self.skip_simple_decl()?,
                    _ => return Err(self.unexpected("declaration")),
                },
                _ => return Err(self.unexpected("declaration")),
            }
            if self.peek().kind != TokenKind::Eof {
                self.expect_semicolon()?;
            }
        }

        Ok(SourceFile {
            package,
            type_decls,
        })
    }

    fn type_decl(&mut self) -> Result<TypeDecl, ParseError> {
        let keyword_index = self.index;
        let keyword = self.expect("type")?;
        let doc = self.doc_for(keyword_index);

        let mut specs = Vec::new();
        if self.eat("(") {
            loop {
                if self.peek().kind == TokenKind::Semicolon {
                    self.advance();
                    continue;
                }
                if self.eat(")") {
                    break;
                }
                specs.push(self.type_spec()?);
                if !self.at(")") {
                    self.expect_semicolon()?;
                }
            }
        } else {
            specs.push(self.type_spec()?);
        }

        Ok(TypeDecl {
            doc,
            specs,
            pos: keyword.pos,
        })
    }

    fn type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        let pos = self.peek().pos;
        let name = self.expect_ident()?;
        let type_params = if self.at("[") && self.starts_type_params() {
            self.type_params()?
        } else {
            Vec::new()
        };
        let alias = self.eat("=");
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
            pos,
        })
    }

    // `type A [N]int` declares an array; `type A[T any] ...` declares parameters.
    fn starts_type_params(&self) -> bool {
        let first = self.peek_at(1);
        let second = self.peek_at(2);
        first.kind == TokenKind::Ident
            && match second.kind {
                TokenKind::Ident => true,
                TokenKind::Keyword => {
                    matches!(second.text, "interface" | "func" | "map" | "chan" | "struct")
                }
                TokenKind::Operator if second.text == "*" => self.pointer_constraint_follows(),
                TokenKind::Operator => {
                    matches!(second.text, "," | "[" | "~" | "(" | "<-")
                }
                _ => false,
            }
    }

    // `[P *C]` is an array length; `[P *C,]` or `[P *[]C]` declares a parameter.
    fn pointer_constraint_follows(&self) -> bool {
        let operand = self.peek_at(3);
        let type_literal = match operand.kind {
            TokenKind::Keyword => {
                matches!(operand.text, "interface" | "func" | "map" | "chan" | "struct")
            }
            TokenKind::Operator => matches!(operand.text, "*" | "[" | "~"),
            _ => false,
        };
        type_literal || self.comma_inside_brackets()
    }

    // Whether a `,` sits directly inside the `[` at the cursor.
    fn comma_inside_brackets(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            let tok = self.peek_at(n);
            match (tok.kind, tok.text) {
                (TokenKind::Eof, _) => return false,
                (TokenKind::Operator, "(" | "[" | "{") => depth += 1,
                (TokenKind::Operator, ")" | "]" | "}") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return false;
                    }
                }
                (TokenKind::Operator, ",") if depth == 1 => return true,
                _ => {}
            }
            n += 1;
        }
    }

    fn type_params(&mut self) -> Result<Vec<TypeParamGroup>, ParseError> {
        self.expect("[")?;
        let mut groups = Vec::new();
        let mut names = Vec::new();
        loop {
            names.push(self.expect_ident()?);
            if self.eat(",") {
                continue;
            }
            let constraint = self.constraint()?;
            groups.push(TypeParamGroup {
                names: std::mem::take(&mut names),
                constraint,
            });
            if !self.eat(",") || self.at("]") {
                break;
            }
        }
        self.expect("]")?;
        Ok(groups)
    }

    fn constraint(&mut self) -> Result<TypeExpr, ParseError> {
        let mut terms = vec![self.constraint_term()?];
        while self.eat("|") {
            terms.push(self.constraint_term()?);
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(TypeExpr::Union(terms))
        }
    }

    fn constraint_term(&mut self) -> Result<TypeExpr, ParseError> {
        if self.eat("~") {
            Ok(TypeExpr::Approx(Box::new(self.parse_type()?)))
        } else {
            self.parse_type()
        }
    }

    fn skip_func_decl(&mut self) -> Result<(), ParseError> {
        self.expect("func")?;
        if self.at("(") {
            self.parameters()?;
        }
        self.expect_ident()?;
        if self.at("[") {
            self.type_params()?;
        }
        self.signature()?;
        if self.at("{") {
            self.skip_balanced()?;
        }
        Ok(())
    }

    fn skip_simple_decl(&mut self) -> Result<(), ParseError> {
        self.advance();
        if self.at("(") {
            return self.skip_balanced();
        }
        while !matches!(self.peek().kind, TokenKind::Semicolon | TokenKind::Eof) {
            if matches!(self.peek().text, "(" | "[" | "{") && self.peek().kind == TokenKind::Operator
            {
                self.skip_balanced()?;
            } else if matches!(self.peek().text, ")" | "]" | "}")
                && self.peek().kind == TokenKind::Operator
            {
                return Err(self.unexpected("';'"));
            } else {
                self.advance();
            }
        }
        Ok(())
    }

    /// Skip from an opening bracket to its matching closer, inclusive.
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let mut stack: Vec<&'static str> = Vec::new();
        loop {
            let tok = self.advance();
            match (tok.kind, tok.text) {
                (TokenKind::Eof, _) => {
                    return Err(self.error_at(tok.pos, "unexpected EOF, expected closing bracket"))
                }
                (TokenKind::Operator, "(") => stack.push(")"),
                (TokenKind::Operator, "[") => stack.push("]"),
                (TokenKind::Operator, "{") => stack.push("}"),
                (TokenKind::Operator, closer @ (")" | "]" | "}")) => {
                    if stack.pop() != Some(closer) {
                        return Err(self.error_at(tok.pos, format!("unexpected '{closer}'")));
                    }
                    if stack.is_empty() {
                        return Ok(());
                    }
                }
                _ if stack.is_empty() => {
                    return Err(self.error_at(tok.pos, "expected opening bracket"));
                }
                _ => {}
            }
        }
    }

    fn doc_for(&self, token_index: usize) -> Option<CommentBlock> {
        let tok = self.tokens.get(token_index)?;
        self.comments
            .iter()
            .find(|group| {
                group.next_token == token_index
                    && !group.trailing
                    && group.end_line() + 1 == tok.pos.line
            })
            .map(|group| CommentBlock {
                comments: group.comments.iter().map(|c| c.text.to_string()).collect(),
            })
    }

    // ---------------------------------------------------------------------
    // types
    // ---------------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let tok = *self.peek();
        match tok.kind {
            TokenKind::Ident => self.named_type(),
            TokenKind::Operator => match tok.text {
                "*" => {
                    self.advance();
                    Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
                }
                "[" => {
                    self.advance();
                    if self.eat("]") {
                        return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                    }
                    let len = self.array_len()?;
                    let elem = self.parse_type()?;
                    Ok(TypeExpr::Array {
                        len,
                        elem: Box::new(elem),
                    })
                }
                "(" => {
                    self.advance();
                    let inner = self.parse_type()?;
                    self.expect(")")?;
                    Ok(TypeExpr::Paren(Box::new(inner)))
                }
                "<-" => {
                    self.advance();
                    self.expect("chan")?;
                    Ok(TypeExpr::Chan {
                        dir: ChanDir::Recv,
                        elem: Box::new(self.parse_type()?),
                    })
                }
                _ => Err(self.unexpected("type")),
            },
            TokenKind::Keyword => match tok.text {
                "map" => {
                    self.advance();
                    self.expect("[")?;
                    let key = self.parse_type()?;
                    self.expect("]")?;
                    let value = self.parse_type()?;
                    Ok(TypeExpr::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    })
                }
                "chan" => {
                    self.advance();
                    let dir = if self.eat("<-") {
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    };
                    Ok(TypeExpr::Chan {
                        dir,
                        elem: Box::new(self.parse_type()?),
                    })
                }
                "func" => {
                    self.advance();
                    Ok(TypeExpr::Func(self.signature()?))
                }
                "struct" => {
                    self.advance();
                    Ok(TypeExpr::Struct(self.struct_body()?))
                }
                "interface" => {
                    self.advance();
                    if !self.at("{") {
                        return Err(self.unexpected("'{'"));
                    }
                    self.skip_balanced()?;
                    Ok(TypeExpr::Interface)
                }
                _ => Err(self.unexpected("type")),
            },
            _ => Err(self.unexpected("type")),
        }
    }

    fn named_type(&mut self) -> Result<TypeExpr, ParseError> {
        let first = self.expect_ident()?;
        let base = if self.eat(".") {
            TypeExpr::Qualified {
                package: first,
                name: self.expect_ident()?,
            }
        } else {
            TypeExpr::Ident(first)
        };
        if !self.at("[") {
            return Ok(base);
        }

        self.advance();
        let mut args = vec![self.parse_type()?];
        while self.eat(",") {
            if self.at("]") {
                break;
            }
            args.push(self.parse_type()?);
        }
        self.expect("]")?;
        Ok(TypeExpr::Generic {
            base: Box::new(base),
            args,
        })
    }

    // Length expression of `[N]T`, taken verbatim from the source.
    fn array_len(&mut self) -> Result<String, ParseError> {
        let start = self.peek().span.start;
        let mut end = start;
        let mut depth = 0usize;
        loop {
            let tok = *self.peek();
            match (tok.kind, tok.text) {
                (TokenKind::Eof, _) => return Err(self.unexpected("']'")),
                (TokenKind::Operator, "(" | "[" | "{") => depth += 1,
                (TokenKind::Operator, "]") if depth == 0 => break,
                (TokenKind::Operator, ")" | "]" | "}") => depth = depth.saturating_sub(1),
                _ => {}
            }
            end = tok.span.end;
            self.advance();
        }
        self.expect("]")?;
        Ok(self.src[start..end].trim().to_string())
    }

    // Parameters and results following `func` or a method name.
    fn signature(&mut self) -> Result<FuncType, ParseError> {
        let (params, variadic) = self.parameters()?;
        let results = if self.at("(") {
            self.parameters()?.0
        } else if Self::is_type_start(self.peek()) {
            vec![self.parse_type()?]
        } else {
            Vec::new()
        };
        Ok(FuncType {
            params,
            variadic,
            results,
        })
    }

    /// Parse `( ... )` and return one type per declared parameter.
    fn parameters(&mut self) -> Result<(Vec<TypeExpr>, bool), ParseError> {
        let open = self.expect("(")?;
        let mut entries = Vec::new();
        loop {
            if self.eat(")") {
                break;
            }
            entries.push(self.parameter()?);
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }

        let variadic = entries.last().is_some_and(|e| e.variadic);
        if !entries.iter().any(|e| e.named) {
            return Ok((entries.into_iter().map(|e| e.ty).collect(), variadic));
        }

        // In a named list, bare identifiers are names sharing the next group's type.
        let mut types = Vec::new();
        let mut pending = 0usize;
        for entry in entries {
            if entry.named {
                for _ in 0..=pending {
                    types.push(entry.ty.clone());
                }
                pending = 0;
            } else if entry.bare_ident {
                pending += 1;
            } else {
                return Err(self.error_at(open.pos, "mixed named and unnamed parameters"));
            }
        }
        if pending > 0 {
            return Err(self.error_at(open.pos, "mixed named and unnamed parameters"));
        }
        Ok((types, variadic))
    }

    fn parameter(&mut self) -> Result<ParamEntry, ParseError> {
        let tok = *self.peek();
        if tok.kind == TokenKind::Ident {
            let next = *self.peek_at(1);
            let named = match (next.kind, next.text) {
                (TokenKind::Operator, "." | "," | ")") => false,
                (TokenKind::Operator, "[") => self.bracket_starts_array(1),
                (TokenKind::Operator, "...") => true,
                _ => Self::is_type_start(&next),
            };
            if named {
                self.advance();
                let variadic = self.eat("...");
                return Ok(ParamEntry {
                    named: true,
                    bare_ident: false,
                    variadic,
                    ty: self.parse_type()?,
                });
            }
            if next.is(",") || next.is(")") {
                self.advance();
                return Ok(ParamEntry {
                    named: false,
                    bare_ident: true,
                    variadic: false,
                    ty: TypeExpr::Ident(tok.text.to_string()),
                });
            }
        }
        let variadic = self.eat("...");
        Ok(ParamEntry {
            named: false,
            bare_ident: false,
            variadic,
            ty: self.parse_type()?,
        })
    }

    /// With `[` at lookahead `offset`, decide whether the bracket opens an
    /// array/slice type (true) or type arguments of the preceding name (false).
    fn bracket_starts_array(&self, offset: usize) -> bool {
        let mut depth = 0usize;
        let mut n = offset;
        loop {
            let tok = self.peek_at(n);
            match (tok.kind, tok.text) {
                (TokenKind::Eof, _) => return false,
                (TokenKind::Operator, "(" | "[" | "{") => depth += 1,
                (TokenKind::Operator, ")" | "]" | "}") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Self::is_type_start(self.peek_at(n + 1));
                    }
                }
                _ => {}
            }
            n += 1;
        }
    }

    fn struct_body(&mut self) -> Result<StructType, ParseError> {
        self.expect("{")?;
        let mut fields = Vec::new();
        loop {
            if self.peek().kind == TokenKind::Semicolon {
                self.advance();
                continue;
            }
            if self.eat("}") {
                break;
            }
            fields.push(self.field_decl()?);
            if !self.at("}") {
                self.expect_semicolon()?;
            }
        }
        Ok(StructType { fields })
    }

    fn field_decl(&mut self) -> Result<FieldDecl, ParseError> {
        let tok = *self.peek();
        let pos = tok.pos;
        let mut names = Vec::new();

        let embedded = if tok.is("*") {
            true
        } else if tok.kind == TokenKind::Ident {
            let next = self.peek_at(1);
            match next.kind {
                TokenKind::Semicolon | TokenKind::String => true,
                TokenKind::Operator => match next.text {
                    "." | "}" => true,
                    "[" => !self.bracket_starts_array(1),
                    _ => false,
                },
                _ => false,
            }
        } else {
            return Err(self.unexpected("field name or embedded type"));
        };

        if !embedded {
            names.push(self.expect_ident()?);
            while self.eat(",") {
                names.push(self.expect_ident()?);
            }
        }
        let ty = self.parse_type()?;
        let tag = if self.peek().kind == TokenKind::String {
            Some(self.advance().text.to_string())
        } else {
            None
        };

        Ok(FieldDecl {
            names,
            ty,
            tag,
            pos,
        })
    }
}
