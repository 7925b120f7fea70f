//! Import-granularity scanner for Go source files.
//!
//! Reads the package clause and the import declarations that follow it, then
//! stops. Everything after the last import is never tokenized, so the body of
//! a file cannot cause a parse failure here.

use std::fmt;

/// Half-open byte range `[start, end)` in the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageClause {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportAlias {
    Named(String),
    /// `import . "path"`
    Dot,
    /// `import _ "path"`
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Literal exactly as written, quotes included.
    pub literal: String,
    pub span: Span,
    pub alias: Option<ImportAlias>,
}

impl ImportStatement {
    /// Unquoted import path, or `None` if the literal is not a valid string.
    pub fn path(&self) -> Option<String> {
        unquote(&self.literal)
    }
}

/// Package clause plus every import declaration of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHeader {
    pub package: PackageClause,
    pub imports: Vec<ImportStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Reports whether `name` is a legal Go identifier and not a keyword.
///
/// ASCII names are judged exactly as Go judges them. Beyond ASCII, letters and
/// digits follow the Unicode `Alphabetic` and `Numeric` properties, which
/// admit a few characters (letter numbers, other numbers, some marks) that Go
/// rejects.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !is_letter(first) {
        return false;
    }
    if !chars.all(|ch| is_letter(ch) || is_digit(ch)) {
        return false;
    }
    !KEYWORDS.contains(&name)
}

fn is_letter(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit() || ch.is_numeric()
}

/// Parse the package clause and import declarations of `src`.
pub fn parse_header(src: &[u8]) -> Result<SourceHeader, SyntaxError> {
    let mut parser = Parser {
        scanner: Scanner::new(src),
        peeked: None,
    };
    parser.header()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Str(String),
    /// Explicit `;`, or a newline or multi-line comment after a token that
    /// can end a statement.
    Semi,
    LParen,
    RParen,
    Dot,
    Other(char),
    Eof,
}

impl TokenKind {
    /// Whether a newline after this token terminates the statement.
    fn ends_statement(&self) -> bool {
        match self {
            Self::Ident(name) => {
                !KEYWORDS.contains(&name.as_str())
                    || matches!(name.as_str(), "break" | "continue" | "fallthrough" | "return")
            }
            Self::Str(_) | Self::RParen => true,
            Self::Other(ch) => matches!(ch, ']' | '}'),
            Self::Semi | Self::LParen | Self::Dot | Self::Eof => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("'{name}'"),
            Self::Str(lit) => lit.clone(),
            Self::Semi => "newline".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Dot => "'.'".to_string(),
            Self::Other(ch) => format!("'{ch}'"),
            Self::Eof => "EOF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    span: Span,
}

struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
    insert_semi: bool,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a [u8]) -> Self {
        let pos = if src.starts_with("\u{feff}".as_bytes()) {
            3
        } else {
            0
        };
        Self {
            src,
            pos,
            insert_semi: false,
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        let (line, column) = position(self.src, offset);
        SyntaxError {
            line,
            column,
            message: message.into(),
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let token = self.scan()?;
        self.insert_semi = token.kind.ends_statement();
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, SyntaxError> {
        loop {
            let start = self.pos;
            let Some(&byte) = self.src.get(start) else {
                return Ok(self.token(TokenKind::Eof, start));
            };
            match byte {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b';' => {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::Semi, start));
                }
                b'\n' => {
                    self.pos += 1;
                    if self.insert_semi {
                        return Ok(self.token(TokenKind::Semi, start));
                    }
                }
                b'/' if self.src.get(start + 1) == Some(&b'/') => {
                    // Leave the newline for the next iteration.
                    self.pos = memchr(b'\n', self.src, start).unwrap_or(self.src.len());
                }
                b'/' if self.src.get(start + 1) == Some(&b'*') => {
                    let body_start = start + 2;
                    let close = find(self.src, body_start, b"*/")
                        .ok_or_else(|| self.error(start, "comment not terminated"))?;
                    self.pos = close + 2;
                    if self.insert_semi && self.src[body_start..close].contains(&b'\n') {
                        return Ok(self.token(TokenKind::Semi, start));
                    }
                }
                b'"' => return self.interpreted_string(start),
                b'`' => return self.raw_string(start),
                b'(' => {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::LParen, start));
                }
                b')' => {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::RParen, start));
                }
                b'.' => {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::Dot, start));
                }
                _ => {
                    let (ch, width) = char_at(self.src, start)
                        .ok_or_else(|| self.error(start, "illegal UTF-8 encoding"))?;
                    if is_letter(ch) {
                        return Ok(self.identifier(start));
                    }
                    self.pos += width;
                    return Ok(self.token(TokenKind::Other(ch), start));
                }
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span {
                start,
                end: self.pos,
            },
        }
    }

    fn identifier(&mut self, start: usize) -> Token {
        while let Some((ch, width)) = char_at(self.src, self.pos) {
            if !(is_letter(ch) || is_digit(ch)) {
                break;
            }
            self.pos += width;
        }
        let name = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        self.token(TokenKind::Ident(name), start)
    }

    fn interpreted_string(&mut self, start: usize) -> Result<Token, SyntaxError> {
        let mut i = start + 1;
        loop {
            match self.src.get(i) {
                None | Some(b'\n') => {
                    return Err(self.error(start, "string literal not terminated"));
                }
                Some(b'\\') => i += 2,
                Some(b'"') => break,
                Some(_) => i += 1,
            }
        }
        self.pos = i + 1;
        self.literal(start)
    }

    fn raw_string(&mut self, start: usize) -> Result<Token, SyntaxError> {
        let close = memchr(b'`', self.src, start + 1)
            .ok_or_else(|| self.error(start, "raw string literal not terminated"))?;
        self.pos = close + 1;
        self.literal(start)
    }

    fn literal(&self, start: usize) -> Result<Token, SyntaxError> {
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| self.error(start, "illegal UTF-8 encoding in string literal"))?;
        Ok(self.token(TokenKind::Str(text.to_string()), start))
    }
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    peeked: Option<Token>,
}

impl Parser<'_> {
    fn next(&mut self) -> Result<Token, SyntaxError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scanner.next_token(),
        }
    }

    fn peek(&mut self) -> Result<&TokenKind, SyntaxError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scanner.next_token()?,
        };
        Ok(&self.peeked.insert(token).kind)
    }

    fn skip_semis(&mut self) -> Result<(), SyntaxError> {
        while *self.peek()? == TokenKind::Semi {
            self.next()?;
        }
        Ok(())
    }

    fn unexpected(&self, token: &Token, wanted: &str) -> SyntaxError {
        self.scanner.error(
            token.span.start,
            format!("expected {wanted}, found {}", token.kind.describe()),
        )
    }

    fn header(&mut self) -> Result<SourceHeader, SyntaxError> {
        self.skip_semis()?;
        let keyword = self.next()?;
        if keyword.kind != TokenKind::Ident("package".to_string()) {
            return Err(self.unexpected(&keyword, "'package'"));
        }
        let name = self.next()?;
        let package = match name.kind {
            TokenKind::Ident(ref ident) if ident == "_" => {
                return Err(self.scanner.error(name.span.start, "invalid package name _"));
            }
            TokenKind::Ident(ident) => PackageClause {
                name: ident,
                span: name.span,
            },
            _ => return Err(self.unexpected(&name, "package name")),
        };
        self.terminator(false)?;

        let mut imports = Vec::new();
        loop {
            self.skip_semis()?;
            if *self.peek()? != TokenKind::Ident("import".to_string()) {
                break;
            }
            self.next()?;
            if *self.peek()? == TokenKind::LParen {
                self.next()?;
                loop {
                    self.skip_semis()?;
                    if *self.peek()? == TokenKind::RParen {
                        self.next()?;
                        break;
                    }
                    imports.push(self.import_spec()?);
                    self.terminator(true)?;
                }
                self.terminator(false)?;
            } else {
                imports.push(self.import_spec()?);
                self.terminator(false)?;
            }
        }

        Ok(SourceHeader { package, imports })
    }

    fn import_spec(&mut self) -> Result<ImportStatement, SyntaxError> {
        let first = self.next()?;
        let (alias, path) = match first.kind {
            TokenKind::Str(_) => (None, first),
            TokenKind::Dot => (Some(ImportAlias::Dot), self.next()?),
            TokenKind::Ident(ref name) if name == "_" => (Some(ImportAlias::Blank), self.next()?),
            TokenKind::Ident(name) => (Some(ImportAlias::Named(name)), self.next()?),
            _ => return Err(self.unexpected(&first, "import path")),
        };
        match path.kind {
            TokenKind::Str(literal) => Ok(ImportStatement {
                literal,
                span: path.span,
                alias,
            }),
            _ => Err(self.unexpected(&path, "import path")),
        }
    }

    /// Require the end of a declaration; inside a group `)` also ends a spec.
    fn terminator(&mut self, in_group: bool) -> Result<(), SyntaxError> {
        match self.peek()? {
            TokenKind::Semi => {
                self.next()?;
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::RParen if in_group => Ok(()),
            _ => {
                let token = self.next()?;
                Err(self.unexpected(&token, "';' or newline"))
            }
        }
    }
}

/// Go string literal unquoting for interpreted and raw strings.
pub fn unquote(literal: &str) -> Option<String> {
    let bytes = literal.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let (open, close) = (bytes[0], bytes[bytes.len() - 1]);
    let body = &literal[1..literal.len() - 1];
    match (open, close) {
        (b'`', b'`') => {
            if body.contains('`') {
                return None;
            }
            Some(body.replace('\r', ""))
        }
        (b'"', b'"') => unescape(body),
        _ => None,
    }
}

fn unescape(body: &str) -> Option<String> {
    if !body.contains('\\') {
        if body.contains('"') || body.contains('\n') {
            return None;
        }
        return Some(body.to_string());
    }

    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\n' => return None,
            '\\' => {
                let esc = chars.next()?;
                match esc {
                    'a' => out.push(0x07),
                    'b' => out.push(0x08),
                    'f' => out.push(0x0c),
                    'n' => out.push(b'\n'),
                    'r' => out.push(b'\r'),
                    't' => out.push(b'\t'),
                    'v' => out.push(0x0b),
                    '\\' => out.push(b'\\'),
                    '"' => out.push(b'"'),
                    'x' => out.push(hex_value(&mut chars, 2)? as u8),
                    'u' => push_char(&mut out, hex_value(&mut chars, 4)?)?,
                    'U' => push_char(&mut out, hex_value(&mut chars, 8)?)?,
                    '0'..='7' => {
                        let mut value = esc.to_digit(8)?;
                        for _ in 0..2 {
                            value = value * 8 + chars.next()?.to_digit(8)?;
                        }
                        out.push(u8::try_from(value).ok()?);
                    }
                    _ => return None,
                }
            }
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8(out).ok()
}

fn hex_value(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn push_char(out: &mut Vec<u8>, value: u32) -> Option<()> {
    let ch = char::from_u32(value)?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    Some(())
}

/// Quote `s` as an interpreted Go string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => out.push_str(&format!("\\u{:04x}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// 1-based line and column (in bytes) of `offset`.
fn position(src: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let before = &src[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |idx| idx + 1);
    (line, offset - line_start + 1)
}

fn char_at(src: &[u8], pos: usize) -> Option<(char, usize)> {
    let end = (pos + 4).min(src.len());
    let chunk = src.get(pos..end)?;
    let valid = match std::str::from_utf8(chunk) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&chunk[..err.valid_up_to()]).ok()?,
    };
    let ch = valid.chars().next()?;
    Some((ch, ch.len_utf8()))
}

fn memchr(needle: u8, haystack: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|idx| from + idx)
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|idx| from + idx)
}
