//! JavaScript minification with a JSMin-style character-pair lexer.
//!
//! The lexer walks the source once, keeping two current characters
//! (`a`, `b`) and one character of lookahead. Each step applies one of
//! three actions:
//!
//! | Action     | Effect                                             |
//! |------------|----------------------------------------------------|
//! | `KeepA`    | Emit `a`, copy `b` to `a`, fetch the next `b`      |
//! | `DeleteA`  | Copy `b` to `a`, fetch the next `b` (drops `a`)    |
//! | `DeleteAB` | Fetch the next `b` (drops `b`)                     |
//!
//! String literals and regex literals are copied verbatim. A `/` is read
//! as the start of a regex literal only after one of `( , = : [ ! & | ? { } ;`
//! or a newline; anywhere else it is division.
//!
//! Comments are removed: a line comment becomes the newline ending it,
//! a block comment becomes a single space.
//!
//! The output keeps a leading newline when the first token could join a
//! previous statement, so minified files can be concatenated safely.

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

/// Number of trailing input bytes kept for error context.
const CONTEXT_LEN: usize = 120;

/// UTF-8 byte order mark.
const BOM: &[u8] = b"\xEF\xBB\xBF";

// ============================================================================
// Errors
// ============================================================================

/// Construct left open at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unterminated {
    StringLiteral,
    RegexSet,
    RegexLiteral,
    Comment,
}

impl fmt::Display for Unterminated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::StringLiteral => "string literal",
            Self::RegexSet => "set in regular expression literal",
            Self::RegexLiteral => "regular expression literal",
            Self::Comment => "comment",
        };
        f.write_str(what)
    }
}

/// Input the lexer cannot minify.
///
/// `context` holds the last processed characters for locating the problem.
#[derive(Debug, Clone, Error)]
#[error("unterminated {kind}\n\n{context}")]
pub struct MalformedInput {
    pub kind: Unterminated,
    pub context: String,
}

// ============================================================================
// Public API
// ============================================================================

/// Minify JavaScript source.
///
/// Line endings are normalized to `\n` first. A fresh lexer is created for
/// every call, so no state leaks between files.
pub fn minify_js(source: &str) -> Result<String, MalformedInput> {
    let normalized = normalize_newlines(source);
    Lexer::new(normalized.as_bytes()).run()
}

/// Collapse `\r\n` and lone `\r` into `\n`.
fn normalize_newlines(source: &str) -> String {
    if !source.contains('\r') {
        return source.to_string();
    }
    source.replace("\r\n", "\n").replace('\r', "\n")
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    KeepA,
    DeleteA,
    DeleteAB,
}

/// Per-file lexer state. Never shared between files.
struct Lexer<'a> {
    input: &'a [u8],
    index: usize,
    a: Option<u8>,
    b: Option<u8>,
    lookahead: Option<u8>,
    /// Last byte read from input.
    x: Option<u8>,
    /// Byte read before `x`.
    y: Option<u8>,
    output: Vec<u8>,
    trail: VecDeque<u8>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            index: 0,
            a: None,
            b: None,
            lookahead: None,
            x: None,
            y: None,
            output: Vec::with_capacity(input.len()),
            trail: VecDeque::with_capacity(CONTEXT_LEN + 1),
        }
    }

    fn run(mut self) -> Result<String, MalformedInput> {
        if self.input.starts_with(BOM) {
            self.index = BOM.len();
        }

        self.a = Some(b'\n');
        self.action(Action::DeleteAB)?;

        while let Some(a) = self.a {
            let action = match a {
                b' ' => {
                    if is_word_char(self.b) {
                        Action::KeepA
                    } else {
                        Action::DeleteA
                    }
                }
                b'\n' => match self.b {
                    Some(b'{' | b'[' | b'(' | b'+' | b'-' | b'!' | b'~') => Action::KeepA,
                    Some(b' ') => Action::DeleteAB,
                    b if is_word_char(b) => Action::KeepA,
                    _ => Action::DeleteA,
                },
                _ => match self.b {
                    Some(b' ') => {
                        if is_word_char(Some(a)) {
                            Action::KeepA
                        } else {
                            Action::DeleteAB
                        }
                    }
                    Some(b'\n') => match a {
                        b'}' | b']' | b')' | b'+' | b'-' | b'"' | b'\'' => Action::KeepA,
                        _ if is_word_char(Some(a)) => Action::KeepA,
                        _ => Action::DeleteAB,
                    },
                    _ => Action::KeepA,
                },
            };
            self.action(action)?;
        }

        Ok(String::from_utf8(self.output)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    /// Apply one action. Each action falls through to the next:
    /// `KeepA` also does `DeleteA`, which also does `DeleteAB`.
    fn action(&mut self, action: Action) -> Result<(), MalformedInput> {
        if action == Action::KeepA {
            self.emit(self.a);
            // `a+ +b` must not become `a++b`
            if self.a == self.b && matches!(self.a, Some(b'+' | b'-')) && self.y != self.a {
                self.output.push(b' ');
            }
        }

        if matches!(action, Action::KeepA | Action::DeleteA) {
            self.a = self.b;
            if matches!(self.a, Some(b'\'' | b'"')) {
                self.copy_string()?;
            }
        }

        self.b = self.next()?;
        if self.b == Some(b'/') && self.a.is_some_and(precedes_regex) {
            self.copy_regex()?;
            self.b = self.next()?;
        }

        Ok(())
    }

    /// Copy a string literal opened by `a` (the quote, also held in `b`).
    ///
    /// Leaves the closing quote in `a`.
    fn copy_string(&mut self) -> Result<(), MalformedInput> {
        loop {
            self.emit(self.a);
            self.a = self.get();

            if self.a == self.b {
                return Ok(());
            }
            match self.a {
                None => return Err(self.malformed(Unterminated::StringLiteral)),
                Some(b'\\') => {
                    self.emit(self.a);
                    self.a = self.get();
                }
                Some(_) => {}
            }
        }
    }

    /// Copy a regex literal. `a` holds the preceding character, `b` the
    /// opening slash. Leaves the closing slash in `a`.
    fn copy_regex(&mut self) -> Result<(), MalformedInput> {
        self.emit(self.a);
        self.emit(self.b);

        loop {
            self.a = self.get();
            match self.a {
                Some(b'[') => self.copy_regex_set()?,
                Some(b'/') => return Ok(()),
                Some(b'\\') => {
                    self.emit(self.a);
                    self.a = self.get();
                }
                None => return Err(self.malformed(Unterminated::RegexLiteral)),
                Some(_) => {}
            }
            self.emit(self.a);
        }
    }

    /// Copy a `[...]` set inside a regex literal; it may hold an unescaped `/`.
    ///
    /// Leaves the closing `]` in `a`.
    fn copy_regex_set(&mut self) -> Result<(), MalformedInput> {
        loop {
            self.emit(self.a);
            self.a = self.get();
            match self.a {
                Some(b']') => return Ok(()),
                Some(b'\\') => {
                    self.emit(self.a);
                    self.a = self.get();
                }
                None => return Err(self.malformed(Unterminated::RegexSet)),
                Some(_) => {}
            }
        }
    }

    /// Next character with comments removed.
    fn next(&mut self) -> Result<Option<u8>, MalformedInput> {
        let c = self.get();
        if c != Some(b'/') {
            return Ok(c);
        }

        match self.peek() {
            Some(b'/') => loop {
                let c = self.get();
                if c.is_none_or(|c| c <= b'\n') {
                    return Ok(c);
                }
            },
            Some(b'*') => {
                self.get();
                loop {
                    match self.get() {
                        Some(b'*') => {
                            if self.peek() == Some(b'/') {
                                self.get();
                                return Ok(Some(b' '));
                            }
                        }
                        None => return Err(self.malformed(Unterminated::Comment)),
                        Some(_) => {}
                    }
                }
            }
            _ => Ok(c),
        }
    }

    /// Next raw character. Control characters other than `\n` become spaces.
    fn get(&mut self) -> Option<u8> {
        let c = match self.lookahead.take() {
            Some(c) => Some(c),
            None => {
                let c = self.input.get(self.index).copied();
                if let Some(byte) = c {
                    self.index += 1;
                    self.y = self.x;
                    self.x = c;
                    self.remember(byte);
                }
                c
            }
        };

        match c {
            Some(b'\r') => Some(b'\n'),
            None | Some(b'\n') => c,
            Some(c) if c >= b' ' => Some(c),
            Some(_) => Some(b' '),
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.lookahead = self.get();
        self.lookahead
    }

    #[inline]
    fn emit(&mut self, c: Option<u8>) {
        if let Some(c) = c {
            self.output.push(c);
        }
    }

    /// Keep a rolling window of processed bytes for diagnostics.
    fn remember(&mut self, c: u8) {
        if self.trail.len() == CONTEXT_LEN {
            self.trail.pop_front();
        }
        self.trail.push_back(c);
    }

    fn malformed(&self, kind: Unterminated) -> MalformedInput {
        let (front, back) = self.trail.as_slices();
        let mut bytes = Vec::with_capacity(front.len() + back.len());
        bytes.extend_from_slice(front);
        bytes.extend_from_slice(back);
        MalformedInput {
            kind,
            context: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// Letter, digit, `_`, `$`, backslash, or any byte above ASCII 126.
#[inline]
fn is_word_char(c: Option<u8>) -> bool {
    match c {
        Some(c) => c > 126 || c == b'\\' || c == b'_' || c == b'$' || c.is_ascii_alphanumeric(),
        None => false,
    }
}

/// Characters after which a `/` opens a regex literal.
#[inline]
fn precedes_regex(c: u8) -> bool {
    matches!(
        c,
        b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}' | b';' | b'\n'
    )
}

// ============================================================================
// Tests
// ============================================================================
