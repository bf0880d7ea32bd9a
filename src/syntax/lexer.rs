//! Go tokenizer.
//!
//! `logos` splits the source into raw tokens. A second pass over that stream
//! applies Go's automatic semicolon insertion and keeps comments on the side,
//! grouped the way `go/parser` groups them so the parser can attach doc
//! comments to declarations.

use logos::Logos;

use super::error::{ParseError, Position};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
enum RawToken {
    #[token("\n")]
    Newline,

    #[token("\u{FEFF}")]
    Bom,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // Only wins when the comment never closes.
    #[token("/*")]
    UnclosedComment,

    #[token("break")]
    #[token("case")]
    #[token("chan")]
    #[token("const")]
    #[token("continue")]
    #[token("default")]
    #[token("defer")]
    #[token("else")]
    #[token("fallthrough")]
    #[token("for")]
    #[token("func")]
    #[token("go")]
    #[token("goto")]
    #[token("if")]
    #[token("import")]
    #[token("interface")]
    #[token("map")]
    #[token("package")]
    #[token("range")]
    #[token("return")]
    #[token("select")]
    #[token("struct")]
    #[token("switch")]
    #[token("type")]
    #[token("var")]
    Keyword,

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,

    #[regex(r"[0-9][0-9_]*")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"0[oO][0-7_]+")]
    Int,

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    Float,

    #[regex(r"([0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?)i")]
    Imag,

    #[regex(r"'([^'\\\n]|\\[^\n])*'")]
    Char,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"`[^`]*`")]
    String,

    #[token(";")]
    Semicolon,

    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    #[token("...")]
    #[token("&&")]
    #[token("||")]
    #[token("<-")]
    #[token("++")]
    #[token("--")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token(":=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<")]
    #[token(">>")]
    #[token("&^")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("<")]
    #[token(">")]
    #[token("=")]
    #[token("!")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token("{")]
    #[token("}")]
    #[token(",")]
    #[token(".")]
    #[token(":")]
    #[token("~")]
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    Int,
    Float,
    Imag,
    Char,
    String,
    Operator,
    /// Explicit `;` or one inserted at a newline / end of input
    Semicolon,
    Eof,
}

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Span,
    pub pos: Position,
    /// Last line the token touches; differs from `pos.line` only for raw strings
    pub end_line: usize,
}

impl Token<'_> {
    /// Operator or keyword with exactly this spelling.
    pub fn is(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Keyword) && self.text == text
    }

    /// Semicolon produced by the insertion rule rather than written in the source.
    pub fn is_auto_semicolon(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.text != ";"
    }

    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "EOF".to_string(),
            TokenKind::Semicolon if self.is_auto_semicolon() => "newline".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment<'src> {
    /// Raw text including the `//` or `/* */` delimiters
    pub text: &'src str,
    pub span: Span,
    pub pos: Position,
    pub end_line: usize,
}

/// Adjacent comments with no token between them and no blank line inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup<'src> {
    pub comments: Vec<Comment<'src>>,
    /// The group starts on a line that already holds code
    pub trailing: bool,
    /// Index of the first token after the group
    pub next_token: usize,
}

impl CommentGroup<'_> {
    pub fn start_line(&self) -> usize {
        self.comments.first().map_or(0, |c| c.pos.line)
    }

    pub fn end_line(&self) -> usize {
        self.comments.last().map_or(0, |c| c.end_line)
    }
}

#[derive(Debug, Clone)]
pub struct Lexed<'src> {
    pub tokens: Vec<Token<'src>>,
    pub comments: Vec<CommentGroup<'src>>,
}

/// Tokenize `src`. `path` is only used to label errors.
pub fn tokenize<'src>(path: &str, src: &'src str) -> Result<Lexed<'src>, ParseError> {
    let mut stream = Stream::new(path, src);
    for (raw, range) in RawToken::lexer(src).spanned() {
        let span = Span {
            start: range.start,
            end: range.end,
        };
        match raw {
            Ok(raw) => stream.accept(raw, span)?,
            Err(()) => return Err(stream.rejected(span)),
        }
    }
    Ok(stream.finish())
}

/// Byte offsets of line starts, for turning spans into positions.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(src: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    fn position(&self, offset: usize) -> Position {
        let line = self.line(offset);
        let line_start = self.starts.get(line - 1).copied().unwrap_or(0);
        Position::new(line, offset - line_start + 1)
    }
}

struct Stream<'p, 'src> {
    path: &'p str,
    src: &'src str,
    lines: LineIndex,
    tokens: Vec<Token<'src>>,
    groups: Vec<CommentGroup<'src>>,
    pending: Option<CommentGroup<'src>>,
    // Line of the most recent non-inserted token, 0 before the first one.
    last_code_line: usize,
}

impl<'p, 'src> Stream<'p, 'src> {
    fn new(path: &'p str, src: &'src str) -> Self {
        Self {
            path,
            src,
            lines: LineIndex::new(src),
            tokens: Vec::new(),
            groups: Vec::new(),
            pending: None,
            last_code_line: 0,
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.path, self.lines.position(offset), message)
    }

    fn accept(&mut self, raw: RawToken, span: Span) -> Result<(), ParseError> {
        let pos = self.lines.position(span.start);
        let kind = match raw {
            RawToken::Newline => {
                if self.needs_semicolon() {
                    self.push_semicolon(span, pos);
                }
                return Ok(());
            }
            RawToken::Bom if span.start == 0 => return Ok(()),
            RawToken::Bom => {
                return Err(self.error(span.start, "invalid BOM in the middle of the file"))
            }
            RawToken::UnclosedComment => {
                return Err(self.error(span.start, "comment not terminated"))
            }
            RawToken::LineComment => {
                self.record_comment(span, pos);
                return Ok(());
            }
            RawToken::BlockComment => {
                self.record_comment(span, pos);
                if self.lines.line(span.end) > pos.line && self.needs_semicolon() {
                    let at = Span {
                        start: span.start,
                        end: span.start,
                    };
                    self.push_semicolon(at, pos);
                }
                return Ok(());
            }
            RawToken::Keyword => TokenKind::Keyword,
            RawToken::Ident => TokenKind::Ident,
            RawToken::Int => TokenKind::Int,
            RawToken::Float => TokenKind::Float,
            RawToken::Imag => TokenKind::Imag,
            RawToken::Char => TokenKind::Char,
            RawToken::String => TokenKind::String,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Operator => TokenKind::Operator,
        };
        let end_line = self.lines.line(span.end);
        self.push(kind, span, pos, end_line);
        Ok(())
    }

    // Input `logos` could not match: an unterminated literal or a stray character.
    fn rejected(&self, span: Span) -> ParseError {
        let rest = &self.src[span.start..];
        if rest.starts_with("/*") {
            return self.error(span.start, "comment not terminated");
        }
        let message = match rest.chars().next() {
            Some('"') => "string literal not terminated".to_string(),
            Some('\'') => "rune literal not terminated".to_string(),
            Some('`') => "raw string literal not terminated".to_string(),
            Some(c) => format!("invalid character U+{:04X}", u32::from(c)),
            None => "unexpected end of input".to_string(),
        };
        self.error(span.start, message)
    }

    fn finish(mut self) -> Lexed<'src> {
        let end = self.src.len();
        let pos = self.lines.position(end);
        let at = Span { start: end, end };
        if self.needs_semicolon() {
            self.push_semicolon(at, pos);
        }
        self.push(TokenKind::Eof, at, pos, pos.line);
        self.close_group();
        Lexed {
            tokens: self.tokens,
            comments: self.groups,
        }
    }

    fn needs_semicolon(&self) -> bool {
        let Some(last) = self.tokens.last() else {
            return false;
        };
        match last.kind {
            TokenKind::Ident
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Imag
            | TokenKind::Char
            | TokenKind::String => true,
            TokenKind::Keyword => {
                matches!(last.text, "break" | "continue" | "fallthrough" | "return")
            }
            TokenKind::Operator => matches!(last.text, "++" | "--" | ")" | "]" | "}"),
            TokenKind::Semicolon | TokenKind::Eof => false,
        }
    }

    fn push(&mut self, kind: TokenKind, span: Span, pos: Position, end_line: usize) {
        self.close_group();
        if kind != TokenKind::Eof {
            self.last_code_line = end_line;
        }
        self.tokens.push(Token {
            kind,
            text: &self.src[span.start..span.end],
            span,
            pos,
            end_line,
        });
    }

    fn push_semicolon(&mut self, span: Span, pos: Position) {
        self.close_group();
        // Inserted semicolons spell as the newline they replace, or as "" at EOF.
        self.tokens.push(Token {
            kind: TokenKind::Semicolon,
            text: &self.src[span.start..span.end],
            span,
            pos,
            end_line: pos.line,
        });
    }

    fn record_comment(&mut self, span: Span, pos: Position) {
        let comment = Comment {
            text: &self.src[span.start..span.end],
            span,
            pos,
            end_line: self.lines.line(span.end),
        };
        let trailing = self.last_code_line == pos.line;
        if let Some(group) = self.pending.as_mut() {
            if !group.trailing && !trailing && pos.line <= group.end_line() + 1 {
                group.comments.push(comment);
                return;
            }
        }
        self.close_group();
        self.pending = Some(CommentGroup {
            comments: vec![comment],
            trailing,
            next_token: 0,
        });
    }

    fn close_group(&mut self) {
        if let Some(mut group) = self.pending.take() {
            group.next_token = self.tokens.len();
            self.groups.push(group);
        }
    }
}
