//!
//! Map projection methods and conversions
//!
//! A conversion names a method and its parameters. The deriving
//! conversion is the parameterized form attached to a derived CRS and
//! may additionally reference parameter files. In the legacy syntax a
//! conversion is flattened into `PROJECTION[...]` plus root-level
//! `PARAMETER[...]` entries.
//!
use crate::consts::NAME_MAX;
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::param::{Parameter, ParameterFile};
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::util;

/// Operation method, `METHOD["Transverse Mercator"]`; the legacy
/// spelling is `PROJECTION`.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    name: String,
    ids: SetOf<Id>,
    visible: bool,
}

impl Method {
    pub const KWD: &'static str = "METHOD";
    pub const ALT_KWD: &'static str = "PROJECTION";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD) || kwd.eq_ignore_ascii_case(Self::ALT_KWD)
    }

    pub fn new(name: &str, ids: SetOf<Id>) -> Result<Self> {
        if name.is_empty() {
            return Err(WktError::new(ErrorCode::EmptyName, Self::KWD));
        }
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
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
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 1, 1, ctx)?;

        let name = util::unescape(t.text(start + 1));

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
        Self::new(&name, ids).map_err(|e| ctx.report(e))
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
        write_ids(w, &self.ids, opts)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

// Shared parse body for conversions. `files` selects whether
// PARAMETERFILE children are collected.
fn parse_conversion_body(
    t: &Tokens,
    start: usize,
    kwd: &'static str,
    files: bool,
    ctx: &mut Ctx,
) -> Result<(
    String,
    Method,
    SetOf<Parameter>,
    SetOf<ParameterFile>,
    SetOf<Id>,
)> {
    let span = t.span(start, kwd, 1, 1, ctx)?;

    let name = util::unescape(t.text(start + 1));

    let mut method: Option<Method> = None;
    let mut parameters: SetOf<Parameter> = SetOf::new();
    let mut param_files: SetOf<ParameterFile> = SetOf::new();
    let mut ids = SetOf::new();
    let mut bad: Option<WktError> = None;

    let mut i = start + 1 + span.args;
    while i < span.end {
        let sub = t.text(i);
        let next = t.end_of(i);
        if Method::is_kwd(sub) {
            if method.is_some() {
                bad.get_or_insert(ctx.err(ErrorCode::DuplicateMethod, kwd));
            } else {
                match Method::from_tokens(t, i, ctx) {
                    Ok(m) => method = Some(m),
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            }
        } else if ParameterFile::is_kwd(sub) {
            // must be tested before PARAMETER
            if files {
                match ParameterFile::from_tokens(t, i, ctx) {
                    Ok(p) => {
                        if let Err(dup) = param_files.push_unique(p) {
                            bad.get_or_insert(ctx.err_str(
                                ErrorCode::DuplicateParameterFile,
                                kwd,
                                dup.name(),
                            ));
                        }
                    }
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            }
        } else if Parameter::is_kwd(sub) {
            match Parameter::from_tokens(t, i, ctx) {
                Ok(p) => {
                    if let Err(dup) = parameters.push_unique(p) {
                        bad.get_or_insert(ctx.err_str(
                            ErrorCode::DuplicateParameter,
                            kwd,
                            dup.name(),
                        ));
                    }
                }
                Err(e) => {
                    bad.get_or_insert(e);
                }
            }
        } else if Id::is_kwd(sub) {
            collect_id(t, i, &mut ids, kwd, &mut bad, ctx);
        }
        i = next;
    }

    if let Some(e) = bad {
        return Err(e);
    }
    let method = match method {
        Some(m) => m,
        None => return Err(ctx.err(ErrorCode::MissingMethod, kwd)),
    };
    Ok((name, method, parameters, param_files, ids))
}

/// Map projection conversion, `CONVERSION["UTM zone 31N",METHOD[...],
/// PARAMETER[...],...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    name: String,
    method: Method,
    parameters: SetOf<Parameter>,
    ids: SetOf<Id>,
    visible: bool,
}

impl Conversion {
    pub const KWD: &'static str = "CONVERSION";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(
        name: &str,
        method: Method,
        parameters: SetOf<Parameter>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            method,
            parameters,
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn parameters(&self) -> &SetOf<Parameter> {
        &self.parameters
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
            && self.method.compute_eq(&other.method)
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(other.parameters.iter())
                .all(|(a, b)| a.compute_eq(b))
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let (name, method, parameters, _, ids) =
            parse_conversion_body(t, start, Self::KWD, false, ctx)?;
        Self::new(&name, method, parameters, ids).map_err(|e| ctx.report(e))
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
            // WKT1 layout: the method and its parameters sit directly
            // in the owning CRS, without a wrapper
            self.method.write_wkt(w, child)?;
            for p in &self.parameters {
                w.sub(|w| p.write_wkt(w, child))?;
            }
            return Ok(());
        }

        w.push_str(Self::KWD)?;
        w.push(opts.open())?;
        w.quoted(&self.name)?;
        w.sub(|w| self.method.write_wkt(w, child))?;
        for p in &self.parameters {
            w.sub(|w| p.write_wkt(w, child))?;
        }
        write_ids(w, &self.ids, opts)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

/// Deriving conversion of a derived CRS,
/// `DERIVINGCONVERSION["...",METHOD[...],...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivingConversion {
    name: String,
    method: Method,
    parameters: SetOf<Parameter>,
    param_files: SetOf<ParameterFile>,
    ids: SetOf<Id>,
    visible: bool,
}

impl DerivingConversion {
    pub const KWD: &'static str = "DERIVINGCONVERSION";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(
        name: &str,
        method: Method,
        parameters: SetOf<Parameter>,
        param_files: SetOf<ParameterFile>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            method,
            parameters,
            param_files,
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn parameters(&self) -> &SetOf<Parameter> {
        &self.parameters
    }

    pub fn param_files(&self) -> &SetOf<ParameterFile> {
        &self.param_files
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
            && self.method.compute_eq(&other.method)
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(other.parameters.iter())
                .all(|(a, b)| a.compute_eq(b))
            && self.param_files.len() == other.param_files.len()
            && self
                .param_files
                .iter()
                .zip(other.param_files.iter())
                .all(|(a, b)| a.compute_eq(b))
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let (name, method, parameters, param_files, ids) =
            parse_conversion_body(t, start, Self::KWD, true, ctx)?;
        Self::new(&name, method, parameters, param_files, ids).map_err(|e| ctx.report(e))
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, Self::KWD, |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let child = opts.for_children();
        w.push_str(Self::KWD)?;
        w.push(opts.open())?;
        w.quoted(&self.name)?;
        w.sub(|w| self.method.write_wkt(w, child))?;
        for p in &self.parameters {
            w.sub(|w| p.write_wkt(w, child))?;
        }
        for p in &self.param_files {
            w.sub(|w| p.write_wkt(w, child))?;
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

    const UTM31: &str = concat!(
        r#"CONVERSION["UTM zone 31N",METHOD["Transverse Mercator",ID["EPSG","9807"]],"#,
        r#"PARAMETER["Latitude of natural origin",0],"#,
        r#"PARAMETER["Longitude of natural origin",3],"#,
        r#"PARAMETER["Scale factor at natural origin",0.9996],"#,
        r#"PARAMETER["False easting",500000],PARAMETER["False northing",0]]"#,
    );

    #[test]
    fn conversion_roundtrip() {
        let c = Conversion::from_wkt(UTM31).unwrap();
        assert_eq!(c.name(), "UTM zone 31N");
        assert_eq!(c.method().name(), "Transverse Mercator");
        assert_eq!(c.parameters().len(), 5);
        assert_eq!(c.to_wkt(WktOptions::new()).unwrap(), UTM31);
    }

    #[test]
    fn method_required() {
        let err = Conversion::from_wkt(r#"CONVERSION["x",PARAMETER["p",1]]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingMethod);
    }

    #[test]
    fn duplicate_parameters_rejected() {
        let err = Conversion::from_wkt(
            r#"CONVERSION["x",METHOD["m"],PARAMETER["p",1],PARAMETER["P",2]]"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateParameter);
    }

    #[test]
    fn old_syntax_flattens() {
        let c = Conversion::from_wkt(
            r#"CONVERSION["c",METHOD["Transverse_Mercator"],PARAMETER["central_meridian",3]]"#,
        )
        .unwrap();
        assert_eq!(
            c.to_wkt(WktOptions::new().old_syntax()).unwrap(),
            r#"PROJECTION["Transverse_Mercator"],PARAMETER["central_meridian",3]"#
        );
    }

    #[test]
    fn deriving_conversion_with_files() {
        let wkt = concat!(
            r#"DERIVINGCONVERSION["geoid undulation",METHOD["Geographic3D to GravityRelatedHeight"],"#,
            r#"PARAMETER["EPSG code",1025],PARAMETERFILE["Geoid model","EGM08.gtx"]]"#,
        );
        let c = DerivingConversion::from_wkt(wkt).unwrap();
        assert_eq!(c.param_files().len(), 1);
        assert_eq!(c.to_wkt(WktOptions::new()).unwrap(), wkt);
    }

    #[test]
    fn projection_keyword_is_a_method() {
        let m = Method::from_wkt(r#"PROJECTION["Lambert_Conformal_Conic_2SP"]"#).unwrap();
        assert_eq!(m.name(), "Lambert_Conformal_Conic_2SP");
        assert_eq!(
            m.to_wkt(WktOptions::new().old_syntax()).unwrap(),
            r#"PROJECTION["Lambert_Conformal_Conic_2SP"]"#
        );
    }
}
