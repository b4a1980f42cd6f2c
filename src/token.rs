//!
//! WKT tokenizer
//!
//! Two passes over the raw text. Pass 1 rewrites the input into a
//! normalized copy: whitespace outside quotes is dropped, whitespace
//! inside quotes is collapsed to single spaces, `()` delimiters are
//! folded to `[]`, and quote/bracket balance is checked (under lenient
//! parsing, missing trailing brackets are synthesized and text beyond
//! the outermost close is ignored). Pass 2 slices the normalized copy
//! into a flat sequence of tokens, each annotated with its nesting
//! level and its index within the owning object's argument list.
//!
//! The tokenizer has no keyword table; deciding what a keyword means is
//! the dispatcher's job.
//!
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::char,
    combinator::map,
    multi::fold_many0,
    sequence::delimited,
    IResult,
};

use crate::consts::{TOKENS_MAX, WKT_MAX};
use crate::errors::{Ctx, ErrorCode, Result};
use crate::log;

/// One token of a WKT string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    level: usize,
    index: usize,
}

impl Token {
    /// Token text. Quoted strings keep their `""` escape pairs but lose
    /// the surrounding quotes.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Nesting depth, 0 for the outermost object keyword.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Position in the owning object's argument list; 0 marks an object
    /// keyword itself.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A tokenized WKT string.
#[derive(Debug, Default)]
pub struct Tokens {
    arr: Vec<Token>,
}

// Quote-delimited string; `""` pairs count as content.
fn quoted_string_inner(s: &str) -> IResult<&str, &str> {
    map(
        fold_many0(
            alt((tag("\"\""), is_not("\""))),
            || 0,
            |n, item: &str| n + item.len(),
        ),
        |len| &s[..len],
    )(s)
}

fn quoted_string(i: &str) -> IResult<&str, &str> {
    delimited(char('"'), quoted_string_inner, char('"'))(i)
}

/// Pass 1: produce the normalized copy of `wkt`.
///
/// `kwd` names the object being parsed, for error messages. `offset` is
/// the byte count of stripped leading whitespace so reported positions
/// refer to the original string.
fn normalize(wkt: &str, offset: usize, kwd: &str, ctx: &mut Ctx) -> Result<String> {
    let src = wkt.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(src.len());
    let mut in_quotes = false;
    let mut brackets = 0usize;
    let mut i = 0usize;

    if !src[0].is_ascii_alphabetic() {
        return Err(ctx.err_int(ErrorCode::InvalidSyntax, kwd, offset as i64));
    }

    while i < src.len() {
        let mut c = src[i];
        let pos = (offset + i) as i64;
        i += 1;

        if out.len() >= WKT_MAX - 1 {
            return Err(ctx.err_int(ErrorCode::TooLong, kwd, pos));
        }

        if !in_quotes {
            if c == b'(' {
                c = b'[';
            } else if c == b')' {
                c = b']';
            }
        }

        if c == b'"' {
            // "" inside quotes is one literal quote
            if in_quotes && src.get(i) == Some(&b'"') {
                out.push(c);
                out.push(c);
                i += 1;
                continue;
            }

            in_quotes = !in_quotes;
            if in_quotes {
                out.push(c);
                while i < src.len() && src[i].is_ascii_whitespace() {
                    i += 1;
                }
            } else {
                while out.last() == Some(&b' ') {
                    out.pop();
                }
                out.push(c);
                while i < src.len() && src[i].is_ascii_whitespace() {
                    i += 1;
                }
                match src.get(i) {
                    Some(b',') | Some(b']') | Some(b')') => {}
                    _ => {
                        let pos = (offset + i) as i64;
                        return Err(ctx.err_int(ErrorCode::ExpectingToken, kwd, pos));
                    }
                }
            }
            continue;
        }

        if in_quotes {
            if c.is_ascii_whitespace() {
                out.push(b' ');
                while i < src.len() && src[i].is_ascii_whitespace() {
                    i += 1;
                }
            } else {
                out.push(c);
            }
            continue;
        }

        if c.is_ascii_whitespace() {
            continue;
        }

        if c == b'[' {
            brackets += 1;
        } else if c == b']' {
            if brackets == 0 {
                if !ctx.strict {
                    // the outermost object is already closed; ignore the tail
                    break;
                }
                return Err(ctx.err_int(ErrorCode::TooManyCloseTokens, kwd, pos));
            }
            brackets -= 1;
        }

        if out.last() == Some(&b']') && c != b']' && c != b',' {
            return Err(ctx.err_int(ErrorCode::ExpectingToken, kwd, pos));
        }

        out.push(c);
    }

    if in_quotes {
        return Err(ctx.err_int(
            ErrorCode::UnbalancedQuotes,
            kwd,
            (offset + wkt.len()) as i64,
        ));
    }

    if brackets > 0 {
        if ctx.strict {
            return Err(ctx.err_int(
                ErrorCode::TooManyOpenTokens,
                kwd,
                (offset + wkt.len()) as i64,
            ));
        }
        for _ in 0..brackets {
            out.push(b']');
        }
    }

    // Only whole ASCII bytes were touched, so this cannot fail.
    String::from_utf8(out).map_err(|_| ctx.err(ErrorCode::InvalidSyntax, kwd))
}

// Isolate the next substring and return (text, delimiter, rest).
// The delimiter is one of `,` `[` `]`, or 0 at end of input.
fn split_first(i: &str) -> (&str, u8, &str) {
    if i.starts_with('"') {
        if let Ok((rest, text)) = quoted_string(i) {
            let delim = rest.as_bytes().first().copied().unwrap_or(0);
            let rest = if rest.is_empty() { rest } else { &rest[1..] };
            return (text, delim, rest);
        }
    }
    match i.find(|c| c == ',' || c == '[' || c == ']') {
        Some(n) => (&i[..n], i.as_bytes()[n], &i[n + 1..]),
        None => (i, 0, ""),
    }
}

/// Tokenize a WKT string. `kwd` names the expected object for error
/// attribution only.
pub(crate) fn tokenize(wkt: &str, kwd: &str, ctx: &mut Ctx) -> Result<Tokens> {
    let trimmed = wkt.trim_start();
    if trimmed.is_empty() {
        return Err(ctx.err(ErrorCode::EmptyString, kwd));
    }
    let offset = wkt.len() - trimmed.len();

    let buffer = normalize(trimmed, offset, kwd, ctx)?;
    log::trace!("normalized wkt: {buffer}");

    let mut arr: Vec<Token> = Vec::new();
    let mut rest = buffer.as_str();
    let mut level = 0usize;
    let mut index = 0usize;
    let mut prev_delim = 0u8;

    loop {
        let (text, delim, after) = split_first(rest);

        match delim {
            b'[' => {
                if arr.len() >= TOKENS_MAX {
                    return Err(ctx.err(ErrorCode::MaxTokensExceeded, kwd));
                }
                arr.push(Token {
                    text: text.to_string(),
                    level,
                    index: 0,
                });
                index = 1;
                level += 1;
            }
            b']' | 0 => {
                if !text.is_empty() {
                    if arr.len() >= TOKENS_MAX {
                        return Err(ctx.err(ErrorCode::MaxTokensExceeded, kwd));
                    }
                    arr.push(Token {
                        text: text.to_string(),
                        level,
                        index,
                    });
                    index += 1;
                }
                level = level.saturating_sub(1);
            }
            _ => {
                // `,`: empty entries are kept unless they trail an
                // object close
                if !text.is_empty() || prev_delim != b']' {
                    if arr.len() >= TOKENS_MAX {
                        return Err(ctx.err(ErrorCode::MaxTokensExceeded, kwd));
                    }
                    arr.push(Token {
                        text: text.to_string(),
                        level,
                        index,
                    });
                    index += 1;
                }
            }
        }

        rest = after;
        prev_delim = delim;

        if (level == 0 && !arr.is_empty()) || delim == 0 {
            break;
        }
    }

    if arr.is_empty() {
        return Err(ctx.err(ErrorCode::MissingToken, kwd));
    }

    Ok(Tokens { arr })
}

impl Tokens {
    /// Tokenize a WKT string without building objects; useful for
    /// inspecting what the reader sees.
    pub fn from_wkt(wkt: &str, strict: bool) -> Result<Tokens> {
        tokenize(wkt, "object", &mut Ctx::new(strict))
    }
}

/// Bounds of one object within the token stream.
#[derive(Debug)]
pub(crate) struct Span {
    /// First index beyond the object's closing bracket.
    pub end: usize,
    /// Number of leading positional atoms.
    pub args: usize,
}

impl Tokens {
    pub fn len(&self) -> usize {
        self.arr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arr.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&Token> {
        self.arr.get(n)
    }

    pub(crate) fn text(&self, n: usize) -> &str {
        &self.arr[n].text
    }

    /// First index past the object starting at `start`: scan forward
    /// until the nesting level drops back to the start's level.
    pub(crate) fn end_of(&self, start: usize) -> usize {
        let level = self.arr[start].level;
        let mut end = start + 1;
        while end < self.arr.len() && self.arr[end].level > level {
            end += 1;
        }
        end
    }

    /// Number of positional atoms of the object starting at `start`:
    /// the leading run of tokens one level down that are not themselves
    /// object keywords.
    pub(crate) fn arg_count(&self, start: usize) -> usize {
        let level = self.arr[start].level;
        let end = self.end_of(start);
        let mut same = 0;
        while start + same + 1 < end {
            let t = &self.arr[start + same + 1];
            if t.level != level + 1 || t.index == 0 {
                break;
            }
            same += 1;
        }
        same
    }

    /// Common per-variant preamble: locate the object's end and check
    /// its positional arity against `[min, max]`. Over-arity is only an
    /// error under strict parsing.
    pub(crate) fn span(
        &self,
        start: usize,
        kwd: &str,
        min: usize,
        max: usize,
        ctx: &mut Ctx,
    ) -> Result<Span> {
        if start >= self.arr.len() {
            return Err(ctx.err_int(ErrorCode::IndexOutOfRange, kwd, start as i64));
        }
        let end = self.end_of(start);
        let args = self.arg_count(start);
        if args < min {
            return Err(ctx.err_int(ErrorCode::InsufficientTokens, kwd, args as i64));
        }
        if args > max && ctx.strict {
            return Err(ctx.err_int(ErrorCode::TooManyTokens, kwd, args as i64));
        }
        Ok(Span { end, args })
    }
}

/// Tokenize and build one object with the default (strict, sink-less)
/// context. Backs the per-type `from_wkt` constructors.
pub(crate) fn parse_object<T>(
    wkt: &str,
    kwd: &str,
    f: impl FnOnce(&Tokens, &mut Ctx) -> Result<T>,
) -> Result<T> {
    let mut ctx = Ctx::new(true);
    let t = tokenize(wkt, kwd, &mut ctx)?;
    f(&t, &mut ctx)
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    fn toks(wkt: &str) -> Tokens {
        tokenize(wkt, "OBJECT", &mut Ctx::new(true)).unwrap()
    }

    fn code(wkt: &str, strict: bool) -> ErrorCode {
        tokenize(wkt, "OBJECT", &mut Ctx::new(strict))
            .unwrap_err()
            .code()
    }

    #[test]
    fn levels_and_indexes() {
        let t = toks(r#"FOO["foo",BAR["bar",2],baz]"#);
        let got: Vec<(&str, usize, usize)> = (0..t.len())
            .map(|i| {
                let tok = t.get(i).unwrap();
                (tok.text(), tok.level(), tok.index())
            })
            .collect();
        assert_eq!(
            got,
            vec![
                ("FOO", 0, 0),
                ("foo", 1, 1),
                ("BAR", 1, 0),
                ("bar", 2, 1),
                ("2", 2, 2),
                ("baz", 1, 2),
            ]
        );
    }

    #[test]
    fn parens_fold_to_brackets() {
        let a = toks(r#"UNIT["metre",1]"#);
        let b = toks(r#"UNIT("metre",1)"#);
        assert_eq!(a.arr, b.arr);
    }

    #[test]
    fn whitespace_folding() {
        let t = toks("UNIT [ \"  one   two \" , 1 ]");
        assert_eq!(t.text(1), "one two");
        assert_eq!(t.text(2), "1");
    }

    #[test]
    fn quote_escapes_survive() {
        let t = toks(r#"CITATION["say ""hi"" loud"]"#);
        assert_eq!(t.text(1), r#"say ""hi"" loud"#);
    }

    #[test]
    fn leading_garbage_rejected() {
        assert_eq!(code(r#"1FOO["x"]"#, true), ErrorCode::InvalidSyntax);
        assert_eq!(code("  ", true), ErrorCode::EmptyString);
    }

    #[test]
    fn balance_checks() {
        assert_eq!(code(r#"FOO["x""#, true), ErrorCode::UnbalancedQuotes);
        assert_eq!(code(r#"FOO["x",1"#, true), ErrorCode::TooManyOpenTokens);
        assert_eq!(code(r#"FOO["x",1]]"#, true), ErrorCode::TooManyCloseTokens);
        assert_eq!(code(r#"FOO["x"x]"#, true), ErrorCode::ExpectingToken);
    }

    #[test]
    fn lenient_recovery() {
        // missing close synthesized
        let t = tokenize(r#"FOO["x",1"#, "OBJECT", &mut Ctx::new(false)).unwrap();
        assert_eq!(t.len(), 3);
        // trailing garbage ignored
        let t = tokenize(r#"FOO["x",1]] rubbish"#, "OBJECT", &mut Ctx::new(false)).unwrap();
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn spans() {
        let t = toks(r#"FOO["foo",BAR["bar",2],baz]"#);
        assert_eq!(t.end_of(0), 6);
        assert_eq!(t.end_of(2), 5);
        assert_eq!(t.arg_count(0), 1);
        assert_eq!(t.arg_count(2), 2);
    }

    #[test]
    fn arity_checks() {
        let t = toks(r#"UNIT["metre",1,2,3]"#);
        let mut ctx = Ctx::new(true);
        assert_eq!(
            t.span(0, "UNIT", 2, 2, &mut ctx).unwrap_err().code(),
            ErrorCode::TooManyTokens
        );
        let mut ctx = Ctx::new(false);
        let span = t.span(0, "UNIT", 2, 2, &mut ctx).unwrap();
        assert_eq!(span.args, 3);
        let mut ctx = Ctx::new(true);
        assert_eq!(
            t.span(0, "UNIT", 5, 9, &mut ctx).unwrap_err().code(),
            ErrorCode::InsufficientTokens
        );
    }
}
