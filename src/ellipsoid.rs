//!
//! Ellipsoid object
//!
//! `ELLIPSOID["WGS 84",6378137,298.257223563]`; the legacy spelling is
//! `SPHEROID`. The third value is the inverse flattening, 0 denoting a
//! sphere.
//!
use crate::consts::NAME_MAX;
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::unit::{Unit, UnitKind};
use crate::util;

#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    name: String,
    semi_major_axis: f64,
    inv_flattening: f64,
    unit: Option<Unit>,
    ids: SetOf<Id>,
    visible: bool,
}

impl Ellipsoid {
    pub const KWD: &'static str = "ELLIPSOID";
    pub const ALT_KWD: &'static str = "SPHEROID";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD) || kwd.eq_ignore_ascii_case(Self::ALT_KWD)
    }

    pub fn new(
        name: &str,
        semi_major_axis: f64,
        inv_flattening: f64,
        unit: Option<Unit>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        if !(semi_major_axis > 0.0) {
            return Err(WktError::with_double(
                ErrorCode::InvalidSemiMajorAxis,
                Self::KWD,
                semi_major_axis,
            ));
        }
        if !(inv_flattening >= 0.0) {
            return Err(WktError::with_double(
                ErrorCode::InvalidFlattening,
                Self::KWD,
                inv_flattening,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            semi_major_axis,
            inv_flattening,
            unit,
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
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

    /// Whether the inverse flattening denotes a sphere.
    pub fn is_sphere(&self) -> bool {
        self.inv_flattening == 0.0
    }

    /// Derived semi-minor axis `b = a(1 - f)`.
    pub fn semi_minor_axis(&self) -> f64 {
        if self.is_sphere() {
            self.semi_major_axis
        } else {
            self.semi_major_axis * (1.0 - 1.0 / self.inv_flattening)
        }
    }

    /// Derived first eccentricity squared `e² = 2f - f²`.
    pub fn e_squared(&self) -> f64 {
        if self.is_sphere() {
            0.0
        } else {
            let f = 1.0 / self.inv_flattening;
            2.0 * f - f * f
        }
    }

    pub fn compute_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && util::eq(self.semi_major_axis, other.semi_major_axis)
            && util::eq(self.inv_flattening, other.inv_flattening)
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 3, 3, ctx)?;

        let name = util::unescape(t.text(start + 1));
        let semi_major = match util::parse_double(t.text(start + 2)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(
                    ErrorCode::InvalidSemiMajorAxis,
                    Self::KWD,
                    t.text(start + 2),
                ))
            }
        };
        let inv_flattening = match util::parse_double(t.text(start + 3)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(
                    ErrorCode::InvalidFlattening,
                    Self::KWD,
                    t.text(start + 3),
                ))
            }
        };

        let mut unit: Option<Unit> = None;
        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);
            if Unit::is_kind_kwd(sub, UnitKind::Length) {
                if unit.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateUnit, Self::KWD));
                } else {
                    match Unit::from_tokens_as(t, i, UnitKind::Length, ctx) {
                        Ok(u) => unit = Some(u),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Id::is_kwd(sub) {
                collect_id(t, i, &mut ids, Self::KWD, &mut bad, ctx);
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        Self::new(&name, semi_major, inv_flattening, unit, ids).map_err(|e| ctx.report(e))
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, Self::KWD, |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let kwd = if opts.old_syntax {
            Self::ALT_KWD
        } else {
            Self::KWD
        };
        w.push_str(kwd)?;
        w.push(opts.open())?;
        w.quoted(&self.name)?;
        w.push(',')?;
        w.number(self.semi_major_axis)?;
        w.push(',')?;
        w.number(self.inv_flattening)?;
        if let Some(unit) = &self.unit {
            w.sub(|w| unit.write_wkt(w, opts.for_children()))?;
        }
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
    use approx::assert_relative_eq;

    #[test]
    fn spheroid_alias() {
        let e = Ellipsoid::from_wkt(r#"SPHEROID["WGS 84",6378137,298.257223563]"#).unwrap();
        assert_eq!(e.name(), "WGS 84");
        assert_eq!(e.semi_major_axis(), 6378137.0);
        assert_eq!(
            e.to_wkt(WktOptions::new()).unwrap(),
            r#"ELLIPSOID["WGS 84",6378137,298.257223563]"#
        );
        assert_eq!(
            e.to_wkt(WktOptions::new().old_syntax()).unwrap(),
            r#"SPHEROID["WGS 84",6378137,298.257223563]"#
        );
    }

    #[test]
    fn derived_values() {
        let e = Ellipsoid::from_wkt(r#"ELLIPSOID["WGS 84",6378137,298.257223563]"#).unwrap();
        assert_relative_eq!(e.semi_minor_axis(), 6356752.314245, epsilon = 1e-6);
        assert_relative_eq!(e.e_squared(), 0.00669437999014, epsilon = 1e-12);
        assert!(!e.is_sphere());

        let s = Ellipsoid::from_wkt(r#"ELLIPSOID["sphere",6371000,0]"#).unwrap();
        assert!(s.is_sphere());
        assert_eq!(s.semi_minor_axis(), 6371000.0);
        assert_eq!(s.e_squared(), 0.0);
    }

    #[test]
    fn value_checks() {
        let err = Ellipsoid::from_wkt(r#"ELLIPSOID["x",-1,298]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSemiMajorAxis);
        let err = Ellipsoid::from_wkt(r#"ELLIPSOID["x",6378137,-5]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidFlattening);
        let err = Ellipsoid::from_wkt(r#"ELLIPSOID["x",6378137]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientTokens);
    }

    #[test]
    fn with_unit_and_id() {
        let e = Ellipsoid::from_wkt(
            r#"ELLIPSOID["GRS 1980",6378137,298.257222101,LENGTHUNIT["metre",1],ID["EPSG",7019]]"#,
        )
        .unwrap();
        assert_eq!(e.unit().unwrap().kind(), UnitKind::Length);
        assert_eq!(e.ids().len(), 1);
        assert_eq!(
            e.to_wkt(WktOptions::new()).unwrap(),
            r#"ELLIPSOID["GRS 1980",6378137,298.257222101,LENGTHUNIT["metre",1],ID["EPSG","7019"]]"#
        );
    }
}
