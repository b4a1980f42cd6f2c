//!
//! Single-text leaf objects
//!
//! Citation, URI, remark, scope, datum anchor and time origin all carry
//! one quoted string and nothing else; they differ only in keyword and
//! length cap.
//!
use crate::consts::{TEXT_MAX, TIME_MAX, UTF8_TEXT_MAX};
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::token::{parse_object, Tokens};
use crate::util;

macro_rules! text_object {
    ($(#[$doc:meta])* $name:ident, $kwd:literal, $cap:expr, $code:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            text: String,
            visible: bool,
        }

        impl $name {
            pub const KWD: &'static str = $kwd;

            pub(crate) fn is_kwd(kwd: &str) -> bool {
                kwd.eq_ignore_ascii_case(Self::KWD)
            }

            pub fn new(text: &str) -> Result<Self> {
                if text.len() >= $cap {
                    return Err(WktError::with_int($code, Self::KWD, text.len() as i64));
                }
                Ok(Self {
                    text: text.to_string(),
                    visible: true,
                })
            }

            pub fn text(&self) -> &str {
                &self.text
            }

            pub fn is_visible(&self) -> bool {
                self.visible
            }

            pub fn set_visible(&mut self, visible: bool) {
                self.visible = visible;
            }

            /// Value-level equality; identical to structural equality
            /// for a leaf carrying only text.
            pub fn compute_eq(&self, other: &Self) -> bool {
                self.text == other.text
            }

            pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
                let kwd = t.text(start);
                if !Self::is_kwd(kwd) {
                    return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
                }
                t.span(start, Self::KWD, 1, 1, ctx)?;
                let text = util::unescape(t.text(start + 1));
                Self::new(&text).map_err(|e| ctx.report(e))
            }

            pub fn from_wkt(wkt: &str) -> Result<Self> {
                parse_object(wkt, Self::KWD, |t, ctx| Self::from_tokens(t, 0, ctx))
            }

            pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
                if !self.visible {
                    return Ok(());
                }
                w.push_str(Self::KWD)?;
                w.push(opts.open())?;
                w.quoted(&self.text)?;
                w.push(opts.close())
            }

            pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
                render(Self::KWD, opts, |w| self.write_wkt(w, opts))
            }
        }
    };
}

text_object!(
    /// Citation of the authority behind an identifier.
    Citation, "CITATION", TEXT_MAX, ErrorCode::TextTooLong
);

text_object!(
    /// URI of an identifier's authority entry.
    Uri, "URI", TEXT_MAX, ErrorCode::TextTooLong
);

text_object!(
    /// Free-text remark; the one field that may carry arbitrary UTF-8.
    Remark, "REMARK", UTF8_TEXT_MAX, ErrorCode::TextTooLong
);

text_object!(
    /// Usage scope of a CRS or operation.
    Scope, "SCOPE", TEXT_MAX, ErrorCode::TextTooLong
);

text_object!(
    /// Datum anchor definition.
    Anchor, "ANCHOR", TEXT_MAX, ErrorCode::TextTooLong
);

text_object!(
    /// Origin instant of a temporal datum.
    TimeOrigin, "TIMEORIGIN", TIME_MAX, ErrorCode::TimeTooLong
);

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let c = Citation::from_wkt(r#"CITATION["ACME mapping"]"#).unwrap();
        assert_eq!(c.text(), "ACME mapping");
        assert_eq!(
            c.to_wkt(WktOptions::new()).unwrap(),
            r#"CITATION["ACME mapping"]"#
        );
    }

    #[test]
    fn escaped_quotes_recovered() {
        let c = Citation::from_wkt(r#"CITATION["say ""hi"" loud"]"#).unwrap();
        assert_eq!(c.text(), r#"say "hi" loud"#);
        let wkt = c.to_wkt(WktOptions::new()).unwrap();
        assert_eq!(wkt, r#"CITATION["say ""hi"" loud"]"#);
        assert!(Citation::from_wkt(&wkt).unwrap().compute_eq(&c));
    }

    #[test]
    fn caps_enforced() {
        let long = "x".repeat(300);
        let err = Scope::new(&long).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TextTooLong);
        let err = TimeOrigin::new(&"y".repeat(64)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TimeTooLong);
        assert!(TimeOrigin::new("2014-01-01").is_ok());
    }

    #[test]
    fn invisible_writes_nothing() {
        let mut s = Scope::new("example").unwrap();
        s.set_visible(false);
        assert_eq!(s.to_wkt(WktOptions::new()).unwrap(), "");
    }

    #[test]
    fn arity_checked() {
        let err = Anchor::from_wkt("ANCHOR[]").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientTokens);
        let err = Anchor::from_wkt(r#"ANCHOR["a","b"]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TooManyTokens);
    }
}
