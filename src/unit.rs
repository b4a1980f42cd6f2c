//!
//! Unit of measure
//!
//! One object covers the six WKT unit kinds. A typed keyword
//! (`ANGLEUNIT`, `LENGTHUNIT`, ...) fixes the kind; the generic `UNIT`
//! keyword is accepted everywhere a typed one is, producing either a
//! generic unit or, where the context dictates a kind (the CRS-level
//! unit of a vertical CRS for instance), a unit of that kind.
//!
use crate::consts::NAME_MAX;
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Angle,
    Length,
    Parametric,
    Scale,
    Time,
    Generic,
}

impl UnitKind {
    /// The keyword this kind is emitted under in the modern syntax.
    pub fn kwd(&self) -> &'static str {
        match self {
            UnitKind::Angle => "ANGLEUNIT",
            UnitKind::Length => "LENGTHUNIT",
            UnitKind::Parametric => "PARAMETRICUNIT",
            UnitKind::Scale => "SCALEUNIT",
            UnitKind::Time => "TIMEUNIT",
            UnitKind::Generic => Unit::KWD,
        }
    }

    fn from_kwd(kwd: &str) -> Option<UnitKind> {
        for kind in [
            UnitKind::Angle,
            UnitKind::Length,
            UnitKind::Parametric,
            UnitKind::Scale,
            UnitKind::Time,
        ] {
            if kwd.eq_ignore_ascii_case(kind.kwd()) {
                return Some(kind);
            }
        }
        if kwd.eq_ignore_ascii_case(Unit::KWD) {
            return Some(UnitKind::Generic);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    name: String,
    kind: UnitKind,
    factor: f64,
    ids: SetOf<Id>,
    visible: bool,
}

impl Unit {
    pub const KWD: &'static str = "UNIT";

    /// Any unit keyword, typed or generic.
    pub(crate) fn is_kwd(kwd: &str) -> bool {
        UnitKind::from_kwd(kwd).is_some()
    }

    /// Keyword for one specific kind (or the generic `UNIT`).
    pub(crate) fn is_kind_kwd(kwd: &str, kind: UnitKind) -> bool {
        kwd.eq_ignore_ascii_case(kind.kwd()) || kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(name: &str, kind: UnitKind, factor: f64, ids: SetOf<Id>) -> Result<Self> {
        let kwd = kind.kwd();
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                kwd,
                name.len() as i64,
            ));
        }
        if !(factor > 0.0) {
            return Err(WktError::with_double(
                ErrorCode::InvalidUnitFactor,
                kwd,
                factor,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            kind,
            factor,
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Conversion factor to the corresponding SI base unit.
    pub fn factor(&self) -> f64 {
        self.factor
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

    /// Value-level equality: name and factor.
    pub fn compute_eq(&self, other: &Self) -> bool {
        self.name == other.name && util::eq(self.factor, other.factor)
    }

    /// Parse from tokens, taking the kind from the keyword.
    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        match UnitKind::from_kwd(kwd) {
            Some(kind) => Self::parse(t, start, kind, ctx),
            None => Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd)),
        }
    }

    /// Parse from tokens in a context that expects `kind`; a generic
    /// `UNIT` keyword adopts the expected kind.
    pub(crate) fn from_tokens_as(
        t: &Tokens,
        start: usize,
        kind: UnitKind,
        ctx: &mut Ctx,
    ) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kind_kwd(kwd, kind) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, kind.kwd(), kwd));
        }
        Self::parse(t, start, kind, ctx)
    }

    fn parse(t: &Tokens, start: usize, kind: UnitKind, ctx: &mut Ctx) -> Result<Self> {
        let kwd = kind.kwd();
        let span = t.span(start, kwd, 2, 2, ctx)?;

        let name = util::unescape(t.text(start + 1));
        let factor = match util::parse_double(t.text(start + 2)) {
            Some(f) => f,
            None => {
                return Err(ctx.err_str(ErrorCode::InvalidUnitFactor, kwd, t.text(start + 2)));
            }
        };

        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let next = t.end_of(i);
            if Id::is_kwd(t.text(i)) {
                collect_id(t, i, &mut ids, kwd, &mut bad, ctx);
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        Self::new(&name, kind, factor, ids).map_err(|e| ctx.report(e))
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, Self::KWD, |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let kwd = if opts.old_syntax {
            Self::KWD
        } else {
            self.kind.kwd()
        };
        w.push_str(kwd)?;
        w.push(opts.open())?;
        w.quoted(&self.name)?;
        w.push(',')?;
        w.number(self.factor)?;
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
    fn minimal_length_unit() {
        let u = Unit::from_wkt(r#"LENGTHUNIT["metre",1]"#).unwrap();
        assert_eq!(u.name(), "metre");
        assert_eq!(u.kind(), UnitKind::Length);
        assert_eq!(u.factor(), 1.0);
        assert_eq!(
            u.to_wkt(WktOptions::new()).unwrap(),
            r#"LENGTHUNIT["metre",1]"#
        );
    }

    #[test]
    fn generic_unit_keeps_generic_kind() {
        let u = Unit::from_wkt(r#"UNIT["degree",0.0174532925199433]"#).unwrap();
        assert_eq!(u.kind(), UnitKind::Generic);
        assert_eq!(
            u.to_wkt(WktOptions::new()).unwrap(),
            r#"UNIT["degree",0.0174532925199433]"#
        );
    }

    #[test]
    fn old_syntax_collapses_keyword() {
        let u = Unit::from_wkt(r#"ANGLEUNIT["degree",0.0174532925199433,ID["EPSG",9122]]"#).unwrap();
        assert_eq!(
            u.to_wkt(WktOptions::new().old_syntax()).unwrap(),
            r#"UNIT["degree",0.0174532925199433,AUTHORITY["EPSG",9122]]"#
        );
    }

    #[test]
    fn factor_must_be_positive() {
        let err = Unit::from_wkt(r#"SCALEUNIT["bogus",0]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUnitFactor);
        let err = Unit::from_wkt(r#"SCALEUNIT["bogus",-2]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUnitFactor);
        let err = Unit::from_wkt(r#"SCALEUNIT["bogus",x]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUnitFactor);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err =
            Unit::from_wkt(r#"LENGTHUNIT["metre",1,ID["EPSG",9001],ID["epsg",1]]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateId);
    }

    #[test]
    fn no_ids_option() {
        let u = Unit::from_wkt(r#"LENGTHUNIT["metre",1,ID["EPSG",9001]]"#).unwrap();
        assert_eq!(
            u.to_wkt(WktOptions::new().no_ids()).unwrap(),
            r#"LENGTHUNIT["metre",1]"#
        );
    }

    #[test]
    fn compute_eq_tolerates_float_noise() {
        let a = Unit::new("metre", UnitKind::Length, 0.3, SetOf::new()).unwrap();
        let b = Unit::new("metre", UnitKind::Length, 0.1 + 0.2, SetOf::new()).unwrap();
        assert!(a.compute_eq(&b));
        let c = Unit::new("metre", UnitKind::Angle, 0.3, SetOf::new()).unwrap();
        assert!(a.compute_eq(&c));
        assert_ne!(a, c);
    }
}
