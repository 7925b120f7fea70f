//! `go.mod` module statement rewriting.
//!
//! The manifest is parsed leniently: unknown verbs and half-written
//! requirements are tolerated, only lexical damage is fatal. The module
//! statement is edited in place so every other line keeps its spacing,
//! comments and order.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use super::edit::EditBuffer;
use super::go_syntax::{Span, quote, unquote};
use super::module_path::ModulePath;
use crate::error::{RelocateError, Result};

/// File name of the manifest at the module root.
pub const MANIFEST_FILE: &str = "go.mod";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            return f.write_str(&self.message);
        }
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ManifestError {}

/// Location and value of the `module` statement's path argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStmt {
    pub path: String,
    pub span: Span,
}

/// Leniently parsed manifest. Only the module statement is retained.
#[derive(Debug, Clone)]
pub struct Manifest<'a> {
    text: &'a str,
    pub module: Option<ModuleStmt>,
    pub statements: usize,
}

impl Manifest<'_> {
    /// Add the module statement, or point the existing one at `dst`.
    pub fn set_module(&self, dst: &ModulePath) -> Vec<u8> {
        let mut buf = EditBuffer::new(self.text.as_bytes());
        let path = auto_quote(dst.as_str());
        match &self.module {
            Some(stmt) => buf.replace(stmt.span.start, stmt.span.end, path),
            None => {
                let mut line = String::new();
                if !self.text.is_empty() && !self.text.ends_with('\n') {
                    line.push('\n');
                }
                line.push_str("module ");
                line.push_str(&path);
                line.push('\n');
                buf.insert(self.text.len(), line);
            }
        }
        // Edits come from our own parse of `text`, so they are always in bounds.
        buf.apply().unwrap_or_else(|_| self.text.as_bytes().to_vec())
    }
}

/// Rewrite manifest `data` so its module statement names `dst`.
pub fn rewrite_manifest(data: &[u8], file: &Path, dst: &ModulePath) -> Result<Vec<u8>> {
    let manifest =
        parse_lax(data).map_err(|err| RelocateError::parse(file, err.to_string()))?;
    debug!(
        file = %file.display(),
        existing = ?manifest.module.as_ref().map(|stmt| stmt.path.as_str()),
        statements = manifest.statements,
        "set module statement"
    );
    let edited = manifest.set_module(dst);
    Ok(format_or_keep(edited, dst))
}

/// Format the edited manifest, falling back to the edited bytes on failure.
pub fn format_or_keep(edited: Vec<u8>, dst: &ModulePath) -> Vec<u8> {
    match format_manifest(&edited, dst) {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!(err = %err, "manifest formatting failed, keeping unformatted edit");
            edited
        }
    }
}

/// Verify the edited manifest and normalize its trailing newline.
pub fn format_manifest(edited: &[u8], dst: &ModulePath) -> Result<Vec<u8>, ManifestError> {
    let manifest = parse_lax(edited)?;
    match &manifest.module {
        Some(stmt) if stmt.path == dst.as_str() => {}
        other => {
            return Err(ManifestError {
                line: 0,
                message: format!(
                    "module statement is {:?} after edit, want {:?}",
                    other.as_ref().map(|stmt| stmt.path.as_str()),
                    dst.as_str()
                ),
            });
        }
    }
    let body = manifest.text.trim_end();
    let mut out = String::with_capacity(body.len() + 1);
    out.push_str(body);
    out.push('\n');
    Ok(out.into_bytes())
}

/// Quote `path` only when a bare token could not hold it.
pub fn auto_quote(path: &str) -> String {
    if must_quote(path) {
        quote(path)
    } else {
        path.to_string()
    }
}

fn must_quote(s: &str) -> bool {
    if s.is_empty() || s.contains("//") || s.contains("/*") {
        return true;
    }
    s.chars().any(|ch| {
        ch.is_whitespace()
            || matches!(
                ch,
                '"' | '\'' | '`' | '(' | ')' | '[' | ']' | '{' | '}' | ','
            )
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Word(String),
    Quoted(String),
    LParen,
    RParen,
}

struct LineToken {
    tok: Tok,
    span: Span,
}

/// Parse a manifest, tolerating verbs and arguments it does not understand.
pub fn parse_lax(data: &[u8]) -> Result<Manifest<'_>, ManifestError> {
    let text = std::str::from_utf8(data).map_err(|err| ManifestError {
        line: line_of(data, err.valid_up_to()),
        message: "invalid UTF-8".to_string(),
    })?;

    let mut module: Option<ModuleStmt> = None;
    let mut statements = 0usize;
    let mut block: Option<(String, usize)> = None;
    let mut offset = 0usize;

    for (idx, raw_line) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let tokens = tokenize_line(raw_line, offset, line_no)?;
        offset += raw_line.len();
        let Some(first) = tokens.first() else {
            continue;
        };

        if let Some((verb, _)) = &block {
            if first.tok == Tok::RParen {
                if tokens.len() > 1 {
                    return Err(err_at(line_no, "unexpected token after ')'"));
                }
                block = None;
                continue;
            }
            statements += 1;
            if verb == "module" {
                record_module(&mut module, &tokens, line_no)?;
            }
            continue;
        }

        let verb = match &first.tok {
            Tok::Word(word) => word.clone(),
            Tok::Quoted(_) => return Err(err_at(line_no, "unexpected quoted string")),
            Tok::LParen => return Err(err_at(line_no, "unexpected '('")),
            Tok::RParen => return Err(err_at(line_no, "unexpected ')'")),
        };
        let args = &tokens[1..];
        if args.len() == 1 && args[0].tok == Tok::LParen {
            block = Some((verb, line_no));
            continue;
        }
        if args
            .iter()
            .any(|arg| matches!(arg.tok, Tok::LParen | Tok::RParen))
        {
            return Err(err_at(line_no, "unexpected parenthesis"));
        }
        statements += 1;
        if verb == "module" {
            record_module(&mut module, args, line_no)?;
        }
    }

    if let Some((verb, line)) = block {
        return Err(err_at(line, &format!("unterminated {verb} block")));
    }

    Ok(Manifest {
        text,
        module,
        statements,
    })
}

fn record_module(
    module: &mut Option<ModuleStmt>,
    args: &[LineToken],
    line_no: usize,
) -> Result<(), ManifestError> {
    if module.is_some() {
        return Err(err_at(line_no, "repeated module statement"));
    }
    let [arg] = args else {
        return Err(err_at(line_no, "usage: module module/path"));
    };
    let path = match &arg.tok {
        Tok::Word(word) => word.clone(),
        Tok::Quoted(lit) => {
            unquote(lit).ok_or_else(|| err_at(line_no, &format!("invalid quoted string {lit}")))?
        }
        _ => return Err(err_at(line_no, "usage: module module/path")),
    };
    *module = Some(ModuleStmt {
        path,
        span: arg.span,
    });
    Ok(())
}

fn tokenize_line(line: &str, base: usize, line_no: usize) -> Result<Vec<LineToken>, ManifestError> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let rest = &line[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };
        if ch.is_whitespace() {
            i += ch.len_utf8();
            continue;
        }
        if rest.starts_with("//") {
            break;
        }
        let start = i;
        let tok = match ch {
            '(' => {
                i += 1;
                Tok::LParen
            }
            ')' => {
                i += 1;
                Tok::RParen
            }
            '"' => {
                i = scan_quoted(bytes, i + 1)
                    .ok_or_else(|| err_at(line_no, "unterminated quoted string"))?;
                Tok::Quoted(line[start..i].to_string())
            }
            '`' => {
                let close = rest[1..]
                    .find('`')
                    .ok_or_else(|| err_at(line_no, "unterminated raw string"))?;
                i += close + 2;
                Tok::Quoted(line[start..i].to_string())
            }
            _ => {
                while i < bytes.len() {
                    let Some(c) = line[i..].chars().next() else {
                        break;
                    };
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '`') {
                        break;
                    }
                    if line[i..].starts_with("//") {
                        break;
                    }
                    i += c.len_utf8();
                }
                Tok::Word(line[start..i].to_string())
            }
        };
        tokens.push(LineToken {
            tok,
            span: Span {
                start: base + start,
                end: base + i,
            },
        });
    }
    Ok(tokens)
}

/// Index just past the closing quote, if the string ends on this line.
fn scan_quoted(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}

fn err_at(line: usize, message: &str) -> ManifestError {
    ManifestError {
        line,
        message: message.to_string(),
    }
}

fn line_of(data: &[u8], offset: usize) -> usize {
    data[..offset.min(data.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
