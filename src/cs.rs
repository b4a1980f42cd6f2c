//!
//! Coordinate system object, `CS[type,dimension]`
//!
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::util;

/// Coordinate system kinds of WKT-CRS. The keyword casing follows the
/// specification (`Cartesian` is the only capitalized one).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CsKind {
    Affine,
    Cartesian,
    Cylindrical,
    Ellipsoidal,
    Linear,
    Parametric,
    Polar,
    Spherical,
    Temporal,
    Vertical,
}

const CS_KINDS: &[(CsKind, &str)] = &[
    (CsKind::Affine, "affine"),
    (CsKind::Cartesian, "Cartesian"),
    (CsKind::Cylindrical, "cylindrical"),
    (CsKind::Ellipsoidal, "ellipsoidal"),
    (CsKind::Linear, "linear"),
    (CsKind::Parametric, "parametric"),
    (CsKind::Polar, "polar"),
    (CsKind::Spherical, "spherical"),
    (CsKind::Temporal, "temporal"),
    (CsKind::Vertical, "vertical"),
];

impl CsKind {
    pub fn kwd(&self) -> &'static str {
        CS_KINDS
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, s)| *s)
            .unwrap_or("unknown")
    }

    pub fn from_kwd(kwd: &str) -> Option<CsKind> {
        CS_KINDS
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(kwd))
            .map(|(k, _)| *k)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cs {
    kind: CsKind,
    dimension: i64,
    ids: SetOf<Id>,
    visible: bool,
}

impl Cs {
    pub const KWD: &'static str = "CS";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(kind: CsKind, dimension: i64, ids: SetOf<Id>) -> Result<Self> {
        if !(0..=3).contains(&dimension) {
            return Err(WktError::with_int(
                ErrorCode::InvalidDimension,
                Self::KWD,
                dimension,
            ));
        }
        Ok(Self {
            kind,
            dimension,
            ids,
            visible: true,
        })
    }

    pub fn kind(&self) -> CsKind {
        self.kind
    }

    pub fn dimension(&self) -> i64 {
        self.dimension
    }

    pub fn ids(&self) -> &SetOf<Id> {
        &self.ids
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn compute_eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.dimension == other.dimension
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 2, 2, ctx)?;

        let kind_kwd = t.text(start + 1);
        let kind = match CsKind::from_kwd(kind_kwd) {
            Some(k) => k,
            None => return Err(ctx.err_str(ErrorCode::InvalidCsType, Self::KWD, kind_kwd)),
        };
        let dimension = match util::parse_int(t.text(start + 2)) {
            Some(d) => d,
            None => {
                return Err(ctx.err_str(ErrorCode::InvalidDimension, Self::KWD, t.text(start + 2)))
            }
        };

        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;
        let mut i = start + 1 + span.args;
        while i < span.end {
            let next = t.end_of(i);
            if Id::is_kwd(t.text(i)) {
                collect_id(t, i, &mut ids, Self::KWD, &mut bad, ctx);
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        Self::new(kind, dimension, ids).map_err(|e| ctx.report(e))
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
        w.push_str(self.kind.kwd())?;
        w.push(',')?;
        w.int(self.dimension)?;
        write_ids(w, &self.ids, opts)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let cs = Cs::from_wkt("CS[ellipsoidal,2]").unwrap();
        assert_eq!(cs.kind(), CsKind::Ellipsoidal);
        assert_eq!(cs.dimension(), 2);
        assert_eq!(cs.to_wkt(WktOptions::new()).unwrap(), "CS[ellipsoidal,2]");
    }

    #[test]
    fn cartesian_case_is_canonical() {
        let cs = Cs::from_wkt("CS[cartesian,3]").unwrap();
        assert_eq!(cs.to_wkt(WktOptions::new()).unwrap(), "CS[Cartesian,3]");
    }

    #[test]
    fn bad_type_and_dimension() {
        let err = Cs::from_wkt("CS[octagonal,2]").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCsType);
        let err = Cs::from_wkt("CS[vertical,7]").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidDimension);
    }
}
