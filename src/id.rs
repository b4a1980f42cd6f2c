//!
//! Identifier object
//!
//! `ID["EPSG","4326"]` in the modern syntax, `AUTHORITY["EPSG",4326]`
//! in WKT1. The code is canonicalized to a string on read regardless of
//! whether the source quoted it; old-syntax emission converts it back
//! to a bare integer.
//!
use crate::consts::{NAME_MAX, TEXT_MAX};
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::leaf::{Citation, Uri};
use crate::setof::{NaturalKey, SetOf};
use crate::token::{parse_object, Tokens};
use crate::util;

#[derive(Debug, Clone, PartialEq)]
pub struct Id {
    name: String,
    code: String,
    version: String,
    citation: Option<Citation>,
    uri: Option<Uri>,
    visible: bool,
}

impl Id {
    pub const KWD: &'static str = "ID";
    pub const OLD_KWD: &'static str = "AUTHORITY";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD) || kwd.eq_ignore_ascii_case(Self::OLD_KWD)
    }

    pub fn new(
        name: &str,
        code: &str,
        version: &str,
        citation: Option<Citation>,
        uri: Option<Uri>,
    ) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        if code.len() >= TEXT_MAX {
            return Err(WktError::with_int(
                ErrorCode::IdentifierTooLong,
                Self::KWD,
                code.len() as i64,
            ));
        }
        if version.len() >= TEXT_MAX {
            return Err(WktError::with_int(
                ErrorCode::VersionTooLong,
                Self::KWD,
                version.len() as i64,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            code: code.to_string(),
            version: version.to_string(),
            citation,
            uri,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn citation(&self) -> Option<&Citation> {
        self.citation.as_ref()
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.uri.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Value-level equality: name, code and version; citation and URI
    /// are bookkeeping.
    pub fn compute_eq(&self, other: &Self) -> bool {
        self.name == other.name && self.code == other.code && self.version == other.version
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 2, 3, ctx)?;

        let name = util::unescape(t.text(start + 1));
        let code = util::unescape(t.text(start + 2));
        let version = if span.args > 2 {
            util::unescape(t.text(start + 3))
        } else {
            String::new()
        };

        let mut citation: Option<Citation> = None;
        let mut uri: Option<Uri> = None;
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);
            if Citation::is_kwd(sub) {
                if citation.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateCitation, Self::KWD));
                } else {
                    match Citation::from_tokens(t, i, ctx) {
                        Ok(c) => citation = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Uri::is_kwd(sub) {
                if uri.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateUri, Self::KWD));
                } else {
                    match Uri::from_tokens(t, i, ctx) {
                        Ok(u) => uri = Some(u),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            }
            // anything else is an unknown sub-object; skip it
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        Self::new(&name, &code, &version, citation, uri).map_err(|e| ctx.report(e))
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, Self::KWD, |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let child = opts.for_children();

        if opts.old_syntax {
            w.push_str(Self::OLD_KWD)?;
            w.push(opts.open())?;
            w.quoted(&self.name)?;
            w.push(',')?;
            w.int(util::parse_int(&self.code).unwrap_or(0))?;
        } else {
            w.push_str(Self::KWD)?;
            w.push(opts.open())?;
            w.quoted(&self.name)?;
            w.push(',')?;
            w.quoted(&self.code)?;
            if !self.version.is_empty() {
                w.push(',')?;
                w.quoted(&self.version)?;
            }
            if let Some(citation) = &self.citation {
                w.sub(|w| citation.write_wkt(w, child))?;
            }
            if let Some(uri) = &self.uri {
                w.sub(|w| uri.write_wkt(w, child))?;
            }
        }
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

impl NaturalKey for Id {
    fn same_key(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// Emit an identifier set: each entry comma-prefixed, all suppressed by
/// `no_ids`, only the first kept under the legacy syntax.
pub(crate) fn write_ids(w: &mut WktWriter, ids: &SetOf<Id>, opts: WktOptions) -> Result<()> {
    if opts.no_ids {
        return Ok(());
    }
    let child = opts.for_children();
    for id in ids {
        w.sub(|w| id.write_wkt(w, child))?;
        if opts.old_syntax {
            break;
        }
    }
    Ok(())
}

/// Shared handling of an `ID[...]` sub-object inside any parent parse
/// loop: parse, then append with case-insensitive dedup.
pub(crate) fn collect_id(
    t: &Tokens,
    i: usize,
    ids: &mut SetOf<Id>,
    parent_kwd: &str,
    bad: &mut Option<WktError>,
    ctx: &mut Ctx,
) {
    match Id::from_tokens(t, i, ctx) {
        Ok(id) => {
            if let Err(dup) = ids.push_unique(id) {
                bad.get_or_insert(ctx.err_str(ErrorCode::DuplicateId, parent_kwd, dup.name()));
            }
        }
        Err(e) => {
            bad.get_or_insert(e);
        }
    }
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_roundtrip() {
        let id = Id::from_wkt(r#"ID["EPSG","4326"]"#).unwrap();
        assert_eq!(id.name(), "EPSG");
        assert_eq!(id.code(), "4326");
        assert_eq!(id.version(), "");
        assert_eq!(
            id.to_wkt(WktOptions::new()).unwrap(),
            r#"ID["EPSG","4326"]"#
        );
    }

    #[test]
    fn unquoted_code_is_canonicalized() {
        let id = Id::from_wkt(r#"ID["EPSG",4326]"#).unwrap();
        assert_eq!(id.code(), "4326");
        assert_eq!(
            id.to_wkt(WktOptions::new()).unwrap(),
            r#"ID["EPSG","4326"]"#
        );
    }

    #[test]
    fn old_syntax() {
        let id = Id::from_wkt(r#"AUTHORITY["EPSG","26986"]"#).unwrap();
        assert_eq!(id.code(), "26986");
        assert_eq!(
            id.to_wkt(WktOptions::new().old_syntax()).unwrap(),
            r#"AUTHORITY["EPSG",26986]"#
        );
    }

    #[test]
    fn version_and_children() {
        let id = Id::from_wkt(r#"ID["EPSG","4326","8.2",CITATION["IOGP"],URI["urn:ogc:def:crs:EPSG::4326"]]"#)
            .unwrap();
        assert_eq!(id.version(), "8.2");
        assert_eq!(id.citation().unwrap().text(), "IOGP");
        assert_eq!(
            id.to_wkt(WktOptions::new()).unwrap(),
            r#"ID["EPSG","4326","8.2",CITATION["IOGP"],URI["urn:ogc:def:crs:EPSG::4326"]]"#
        );
    }

    #[test]
    fn duplicate_citation_rejected() {
        let err = Id::from_wkt(r#"ID["EPSG","1",CITATION["a"],CITATION["b"]]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateCitation);
    }

    #[test]
    fn unknown_children_skipped() {
        let id = Id::from_wkt(r#"ID["EPSG","4326",FUTUREOBJ["x",1]]"#).unwrap();
        assert_eq!(id.code(), "4326");
    }

    #[test]
    fn compute_eq_ignores_children() {
        let a = Id::from_wkt(r#"ID["EPSG","4326",CITATION["IOGP"]]"#).unwrap();
        let b = Id::from_wkt(r#"ID["EPSG","4326"]"#).unwrap();
        assert!(a.compute_eq(&b));
        assert_ne!(a, b);
    }
}
