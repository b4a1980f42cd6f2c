//!
//! Serializer framework
//!
//! Output options, the capacity-bounded output writer shared by every
//! variant's emitter, and the expansion pass that re-indents a compact
//! serialization into a multi-line hierarchical form.
//!
use crate::consts::WKT_MAX;
use crate::errors::{ErrorCode, Result, WktError};
use crate::util;

/// Output options for `to_wkt`. Each flag is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WktOptions {
    /// Indent children using spaces.
    pub expand_sp: bool,
    /// Indent children using tabs.
    pub expand_tab: bool,
    /// Emit the root object's identifiers, suppress all descendants'.
    pub top_id_only: bool,
    /// Suppress every identifier.
    pub no_ids: bool,
    /// Emit `(` and `)` instead of `[` and `]`.
    pub parens: bool,
    /// Use the legacy keyword aliases and the legacy per-variant layout.
    pub old_syntax: bool,
}

impl WktOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand_sp(mut self) -> Self {
        self.expand_sp = true;
        self
    }

    pub fn expand_tab(mut self) -> Self {
        self.expand_tab = true;
        self
    }

    pub fn top_id_only(mut self) -> Self {
        self.top_id_only = true;
        self
    }

    pub fn no_ids(mut self) -> Self {
        self.no_ids = true;
        self
    }

    pub fn parens(mut self) -> Self {
        self.parens = true;
        self
    }

    pub fn old_syntax(mut self) -> Self {
        self.old_syntax = true;
        self
    }

    pub(crate) fn expand(&self) -> bool {
        self.expand_sp || self.expand_tab
    }

    /// Options passed to sub-object emitters: `top_id_only` at the root
    /// turns into `no_ids` below it.
    pub(crate) fn for_children(&self) -> WktOptions {
        WktOptions {
            no_ids: self.no_ids || self.top_id_only,
            ..*self
        }
    }

    pub(crate) fn open(&self) -> char {
        if self.parens {
            '('
        } else {
            '['
        }
    }

    pub(crate) fn close(&self) -> char {
        if self.parens {
            ')'
        } else {
            ']'
        }
    }
}

/// Bounded output buffer. Exceeding the WKT length cap is a `too long`
/// error attributed to the object being written.
pub(crate) struct WktWriter {
    buf: String,
    kwd: &'static str,
}

impl WktWriter {
    pub fn new(kwd: &'static str) -> Self {
        Self {
            buf: String::new(),
            kwd,
        }
    }

    fn check(&mut self, more: usize) -> Result<()> {
        if self.buf.len() + more >= WKT_MAX {
            Err(WktError::with_int(
                ErrorCode::TooLong,
                self.kwd,
                (self.buf.len() + more) as i64,
            ))
        } else {
            Ok(())
        }
    }

    pub fn push_str(&mut self, s: &str) -> Result<()> {
        self.check(s.len())?;
        self.buf.push_str(s);
        Ok(())
    }

    pub fn push(&mut self, c: char) -> Result<()> {
        self.check(c.len_utf8())?;
        self.buf.push(c);
        Ok(())
    }

    /// Append a quoted string, escaping embedded quotes.
    pub fn quoted(&mut self, s: &str) -> Result<()> {
        let escaped = util::escape(s);
        self.check(escaped.len() + 2)?;
        self.buf.push('"');
        self.buf.push_str(&escaped);
        self.buf.push('"');
        Ok(())
    }

    pub fn number(&mut self, d: f64) -> Result<()> {
        self.push_str(&util::fmt_double(d))
    }

    pub fn int(&mut self, n: i64) -> Result<()> {
        self.push_str(&n.to_string())
    }

    /// Append `,` followed by whatever `f` writes; if `f` writes
    /// nothing (an invisible or absent child), the comma is rolled
    /// back too.
    pub fn sub(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let mark = self.buf.len();
        self.push(',')?;
        f(self)?;
        if self.buf.len() == mark + 1 {
            self.buf.truncate(mark);
        }
        Ok(())
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Render one object: run its compact emitter, then the expansion pass
/// if requested. This runs on the outermost call only; inner emitters
/// write into the parent's writer.
pub(crate) fn render(
    kwd: &'static str,
    opts: WktOptions,
    f: impl FnOnce(&mut WktWriter) -> Result<()>,
) -> Result<String> {
    let mut w = WktWriter::new(kwd);
    f(&mut w)?;
    let compact = w.finish();
    if opts.expand() {
        Ok(expand_wkt(&compact, "", opts))
    } else {
        Ok(compact)
    }
}

/// Re-indent a compact serialization into a multi-line form.
///
/// Walks the text left to right tracking bracket depth; every `[`
/// schedules a newline, every `,` flushes the pending segment with the
/// indent unit repeated to the scheduled depth. `prefix` is prepended
/// to every output line. Delimiters inside quoted strings are treated
/// as literal text, so the result is still valid `from_wkt` input.
pub(crate) fn expand_wkt(input: &str, prefix: &str, opts: WktOptions) -> String {
    if !opts.expand() {
        return input.to_string();
    }

    let indent = if opts.expand_sp { ' ' } else { '\t' };
    let (opn, cls) = (opts.open(), opts.close());

    let mut out = String::with_capacity(input.len() * 2);
    out.push_str(prefix);

    let mut depth = 0usize;
    let mut pending = 0usize;
    let mut newline = false;
    let mut first = true;
    let mut in_quotes = false;
    let mut segment = String::new();

    for c in input.chars() {
        segment.push(c);

        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }

        if c == opn {
            depth += 1;
            newline = true;
        } else if c == cls {
            depth = depth.saturating_sub(1);
        } else if c == ',' {
            if newline {
                if pending > 0 {
                    out.push('\n');
                    out.push_str(prefix);
                    for _ in 0..pending {
                        out.push(indent);
                    }
                }
            } else if !first {
                out.push(' ');
            }
            out.push_str(&segment);
            segment.clear();
            first = false;
            newline = false;
            pending = depth;
        }
    }

    if !segment.is_empty() {
        if newline {
            if pending > 0 {
                out.push('\n');
                out.push_str(prefix);
                for _ in 0..pending {
                    out.push(indent);
                }
            }
        } else if !first {
            out.push(' ');
        }
        out.push_str(&segment);
    }

    out
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_rolls_back_empty_children() {
        let mut w = WktWriter::new("UNIT");
        w.push_str("UNIT[\"metre\",1").unwrap();
        w.sub(|_| Ok(())).unwrap();
        w.sub(|w| w.push_str("ID[\"EPSG\",\"9001\"]")).unwrap();
        w.push(']').unwrap();
        assert_eq!(w.finish(), "UNIT[\"metre\",1,ID[\"EPSG\",\"9001\"]]");
    }

    #[test]
    fn writer_caps_output() {
        let mut w = WktWriter::new("REMARK");
        let big = "x".repeat(WKT_MAX);
        let err = w.push_str(&big).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TooLong);
    }

    #[test]
    fn expand_with_spaces() {
        let wkt = "LENGTHUNIT[\"metre\",1,ID[\"EPSG\",\"9001\"]]";
        let opts = WktOptions::new().expand_sp();
        assert_eq!(
            expand_wkt(wkt, "", opts),
            "LENGTHUNIT[\"metre\", 1,\n ID[\"EPSG\", \"9001\"]]"
        );
    }

    #[test]
    fn expand_ignores_quoted_delimiters() {
        let wkt = "CITATION[\"a,b[c]d\"]";
        let opts = WktOptions::new().expand_sp();
        assert_eq!(expand_wkt(wkt, "", opts), "CITATION[\"a,b[c]d\"]");
    }

    #[test]
    fn expand_with_prefix() {
        let wkt = "A[\"x\",B[\"y\"]]";
        let opts = WktOptions::new().expand_tab();
        assert_eq!(expand_wkt(wkt, "; ", opts), "; A[\"x\",\n; \tB[\"y\"]]");
    }
}
