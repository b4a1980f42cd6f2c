//!
//! Operation parameters
//!
//! Numeric parameters, parameter-file references and the operation
//! accuracy leaf.
//!
use crate::consts::{NAME_MAX, PATH_MAX};
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::setof::{NaturalKey, SetOf};
use crate::token::{parse_object, Tokens};
use crate::unit::Unit;
use crate::util;

/// Named numeric parameter, `PARAMETER["False easting",500000,...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: f64,
    unit: Option<Unit>,
    ids: SetOf<Id>,
    visible: bool,
}

impl Parameter {
    pub const KWD: &'static str = "PARAMETER";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(name: &str, value: f64, unit: Option<Unit>, ids: SetOf<Id>) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            value,
            unit,
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
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

    pub fn compute_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && util::eq(self.value, other.value)
            && match (&self.unit, &other.unit) {
                (None, None) => true,
                (Some(a), Some(b)) => a.compute_eq(b),
                _ => false,
            }
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 2, 2, ctx)?;

        let name = util::unescape(t.text(start + 1));
        let value = match util::parse_double(t.text(start + 2)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(ErrorCode::InvalidSyntax, Self::KWD, t.text(start + 2)))
            }
        };

        let mut unit: Option<Unit> = None;
        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);
            if Unit::is_kwd(sub) {
                if unit.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateUnit, Self::KWD));
                } else {
                    match Unit::from_tokens(t, i, ctx) {
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
        Self::new(&name, value, unit, ids).map_err(|e| ctx.report(e))
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
        w.quoted(&self.name)?;
        w.push(',')?;
        w.number(self.value)?;
        if !opts.old_syntax {
            if let Some(unit) = &self.unit {
                w.sub(|w| unit.write_wkt(w, opts.for_children()))?;
            }
        }
        write_ids(w, &self.ids, opts)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

impl NaturalKey for Parameter {
    fn same_key(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// Reference to a file of parameter values,
/// `PARAMETERFILE["Geoid model","EGM08.gtx"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFile {
    name: String,
    filename: String,
    ids: SetOf<Id>,
    visible: bool,
}

impl ParameterFile {
    pub const KWD: &'static str = "PARAMETERFILE";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(name: &str, filename: &str, ids: SetOf<Id>) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        if filename.is_empty() {
            return Err(WktError::new(ErrorCode::EmptyFilename, Self::KWD));
        }
        if filename.len() >= PATH_MAX {
            return Err(WktError::with_int(
                ErrorCode::FilenameTooLong,
                Self::KWD,
                filename.len() as i64,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            filename: filename.to_string(),
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> &str {
        &self.filename
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
        self.name == other.name && self.filename == other.filename
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 2, 2, ctx)?;

        let name = util::unescape(t.text(start + 1));
        let filename = util::unescape(t.text(start + 2));

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
        Self::new(&name, &filename, ids).map_err(|e| ctx.report(e))
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
        w.quoted(&self.name)?;
        w.push(',')?;
        w.quoted(&self.filename)?;
        write_ids(w, &self.ids, opts)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

impl NaturalKey for ParameterFile {
    fn same_key(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// Positional accuracy of a coordinate operation, in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationAccuracy {
    value: f64,
    visible: bool,
}

impl OperationAccuracy {
    pub const KWD: &'static str = "OPERATIONACCURACY";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(value: f64) -> Result<Self> {
        Ok(Self {
            value,
            visible: true,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn compute_eq(&self, other: &Self) -> bool {
        util::eq(self.value, other.value)
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        t.span(start, Self::KWD, 1, 1, ctx)?;
        let value = match util::parse_double(t.text(start + 1)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(ErrorCode::InvalidSyntax, Self::KWD, t.text(start + 1)))
            }
        };
        Self::new(value).map_err(|e| ctx.report(e))
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
        w.number(self.value)?;
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
    use crate::unit::UnitKind;

    #[test]
    fn parameter_roundtrip() {
        let p = Parameter::from_wkt(
            r#"PARAMETER["Latitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433]]"#,
        )
        .unwrap();
        assert_eq!(p.name(), "Latitude of natural origin");
        assert_eq!(p.value(), 0.0);
        assert_eq!(p.unit().unwrap().kind(), UnitKind::Angle);
        assert_eq!(
            p.to_wkt(WktOptions::new()).unwrap(),
            r#"PARAMETER["Latitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433]]"#
        );
    }

    #[test]
    fn old_syntax_drops_unit() {
        let p = Parameter::from_wkt(r#"PARAMETER["False easting",500000,LENGTHUNIT["metre",1]]"#)
            .unwrap();
        assert_eq!(
            p.to_wkt(WktOptions::new().old_syntax()).unwrap(),
            r#"PARAMETER["False easting",500000]"#
        );
    }

    #[test]
    fn parameter_file() {
        let p = ParameterFile::from_wkt(r#"PARAMETERFILE["Geoid model","EGM08.gtx"]"#).unwrap();
        assert_eq!(p.filename(), "EGM08.gtx");
        assert_eq!(
            p.to_wkt(WktOptions::new()).unwrap(),
            r#"PARAMETERFILE["Geoid model","EGM08.gtx"]"#
        );
        let err = ParameterFile::new("n", "", SetOf::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyFilename);
    }

    #[test]
    fn accuracy() {
        let a = OperationAccuracy::from_wkt("OPERATIONACCURACY[0.1]").unwrap();
        assert_eq!(a.value(), 0.1);
        assert_eq!(
            a.to_wkt(WktOptions::new()).unwrap(),
            "OPERATIONACCURACY[0.1]"
        );
    }

    #[test]
    fn bad_value() {
        let err = Parameter::from_wkt(r#"PARAMETER["x",notanumber]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSyntax);
    }
}
