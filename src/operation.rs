//!
//! Coordinate operations
//!
//! The full coordinate operation, the abridged transformation, and the
//! bound CRS that attaches a source CRS to a target CRS through one.
//! CRS payloads are wrapped in the `SOURCECRS` / `TARGETCRS` /
//! `INTERPOLATIONCRS` pseudo-objects.
//!
use crate::consts::NAME_MAX;
use crate::conversion::Method;
use crate::crs::Crs;
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::extent::Extent;
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::leaf::{Remark, Scope};
use crate::param::{OperationAccuracy, Parameter, ParameterFile};
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::util;

const SOURCE_CRS_KWD: &str = "SOURCECRS";
const TARGET_CRS_KWD: &str = "TARGETCRS";
const INTERP_CRS_KWD: &str = "INTERPOLATIONCRS";

// Parse the CRS inside a SOURCECRS/TARGETCRS/INTERPOLATIONCRS wrapper.
fn parse_wrapped_crs(
    t: &Tokens,
    i: usize,
    missing: ErrorCode,
    kwd: &str,
    ctx: &mut Ctx,
) -> Result<Crs> {
    if t.end_of(i) <= i + 1 {
        return Err(ctx.err(missing, kwd));
    }
    Crs::from_tokens(t, i + 1, ctx)
}

fn write_wrapped_crs(
    w: &mut WktWriter,
    wrapper: &str,
    crs: &Crs,
    opts: WktOptions,
) -> Result<()> {
    w.push_str(wrapper)?;
    w.push(opts.open())?;
    crs.write_wkt(w, opts)?;
    w.push(opts.close())
}

/// A source-to-target coordinate operation,
/// `COORDINATEOPERATION["...",SOURCECRS[...],TARGETCRS[...],METHOD[...],...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateOperation {
    name: String,
    source_crs: Box<Crs>,
    target_crs: Box<Crs>,
    interp_crs: Option<Box<Crs>>,
    method: Method,
    parameters: SetOf<Parameter>,
    param_files: SetOf<ParameterFile>,
    accuracy: Option<OperationAccuracy>,
    scope: Option<Scope>,
    extents: SetOf<Extent>,
    ids: SetOf<Id>,
    remark: Option<Remark>,
    visible: bool,
}

impl CoordinateOperation {
    pub const KWD: &'static str = "COORDINATEOPERATION";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        source_crs: Crs,
        target_crs: Crs,
        interp_crs: Option<Crs>,
        method: Method,
        parameters: SetOf<Parameter>,
        param_files: SetOf<ParameterFile>,
        accuracy: Option<OperationAccuracy>,
        scope: Option<Scope>,
        extents: SetOf<Extent>,
        ids: SetOf<Id>,
        remark: Option<Remark>,
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
            source_crs: Box::new(source_crs),
            target_crs: Box::new(target_crs),
            interp_crs: interp_crs.map(Box::new),
            method,
            parameters,
            param_files,
            accuracy,
            scope,
            extents,
            ids,
            remark,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_crs(&self) -> &Crs {
        &self.source_crs
    }

    pub fn target_crs(&self) -> &Crs {
        &self.target_crs
    }

    pub fn interp_crs(&self) -> Option<&Crs> {
        self.interp_crs.as_deref()
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

    pub fn accuracy(&self) -> Option<&OperationAccuracy> {
        self.accuracy.as_ref()
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn extents(&self) -> &SetOf<Extent> {
        &self.extents
    }

    pub fn ids(&self) -> &SetOf<Id> {
        &self.ids
    }

    pub fn remark(&self) -> Option<&Remark> {
        self.remark.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn compute_eq(&self, other: &Self) -> bool {
        fn opt_eq<T>(a: &Option<T>, b: &Option<T>, f: impl Fn(&T, &T) -> bool) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(x), Some(y)) => f(x, y),
                _ => false,
            }
        }
        self.name == other.name
            && self.source_crs.compute_eq(&other.source_crs)
            && self.target_crs.compute_eq(&other.target_crs)
            && opt_eq(&self.interp_crs, &other.interp_crs, |a, b| a.compute_eq(b))
            && self.method.compute_eq(&other.method)
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(other.parameters.iter())
                .all(|(a, b)| a.compute_eq(b))
            && opt_eq(&self.accuracy, &other.accuracy, |a, b| a.compute_eq(b))
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 1, 1, ctx)?;
        let name = util::unescape(t.text(start + 1));

        let mut source_crs: Option<Crs> = None;
        let mut target_crs: Option<Crs> = None;
        let mut interp_crs: Option<Crs> = None;
        let mut method: Option<Method> = None;
        let mut parameters: SetOf<Parameter> = SetOf::new();
        let mut param_files: SetOf<ParameterFile> = SetOf::new();
        let mut accuracy: Option<OperationAccuracy> = None;
        let mut scope: Option<Scope> = None;
        let mut extents: SetOf<Extent> = SetOf::new();
        let mut ids = SetOf::new();
        let mut remark: Option<Remark> = None;
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);

            if sub.eq_ignore_ascii_case(SOURCE_CRS_KWD) {
                if source_crs.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateSourceCrs, Self::KWD));
                } else {
                    match parse_wrapped_crs(t, i, ErrorCode::MissingSourceCrs, Self::KWD, ctx) {
                        Ok(c) => source_crs = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if sub.eq_ignore_ascii_case(TARGET_CRS_KWD) {
                if target_crs.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateTargetCrs, Self::KWD));
                } else {
                    match parse_wrapped_crs(t, i, ErrorCode::MissingTargetCrs, Self::KWD, ctx) {
                        Ok(c) => target_crs = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if sub.eq_ignore_ascii_case(INTERP_CRS_KWD) {
                if interp_crs.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateInterpolationCrs, Self::KWD));
                } else {
                    match parse_wrapped_crs(t, i, ErrorCode::MissingSourceCrs, Self::KWD, ctx) {
                        Ok(c) => interp_crs = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if sub.eq_ignore_ascii_case(Method::KWD) {
                if method.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateMethod, Self::KWD));
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
                match ParameterFile::from_tokens(t, i, ctx) {
                    Ok(p) => {
                        if let Err(dup) = param_files.push_unique(p) {
                            bad.get_or_insert(ctx.err_str(
                                ErrorCode::DuplicateParameterFile,
                                Self::KWD,
                                dup.name(),
                            ));
                        }
                    }
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            } else if Parameter::is_kwd(sub) {
                match Parameter::from_tokens(t, i, ctx) {
                    Ok(p) => {
                        if let Err(dup) = parameters.push_unique(p) {
                            bad.get_or_insert(ctx.err_str(
                                ErrorCode::DuplicateParameter,
                                Self::KWD,
                                dup.name(),
                            ));
                        }
                    }
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            } else if OperationAccuracy::is_kwd(sub) {
                if accuracy.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateOperationAccuracy, Self::KWD));
                } else {
                    match OperationAccuracy::from_tokens(t, i, ctx) {
                        Ok(a) => accuracy = Some(a),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Scope::is_kwd(sub) {
                if scope.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateScope, Self::KWD));
                } else {
                    match Scope::from_tokens(t, i, ctx) {
                        Ok(s) => scope = Some(s),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Extent::is_kwd(sub) {
                match Extent::from_tokens(t, i, ctx) {
                    Ok(extent) => {
                        if let Err(dup) = extents.push_unique(extent) {
                            bad.get_or_insert(ctx.err_str(
                                ErrorCode::DuplicateExtent,
                                Self::KWD,
                                dup.kwd(),
                            ));
                        }
                    }
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            } else if Id::is_kwd(sub) {
                collect_id(t, i, &mut ids, Self::KWD, &mut bad, ctx);
            } else if Remark::is_kwd(sub) {
                if remark.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateRemark, Self::KWD));
                } else {
                    match Remark::from_tokens(t, i, ctx) {
                        Ok(r) => remark = Some(r),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        let source_crs = match source_crs {
            Some(c) => c,
            None => return Err(ctx.err(ErrorCode::MissingSourceCrs, Self::KWD)),
        };
        let target_crs = match target_crs {
            Some(c) => c,
            None => return Err(ctx.err(ErrorCode::MissingTargetCrs, Self::KWD)),
        };
        let method = match method {
            Some(m) => m,
            None => return Err(ctx.err(ErrorCode::MissingMethod, Self::KWD)),
        };

        Self::new(
            &name, source_crs, target_crs, interp_crs, method, parameters, param_files, accuracy,
            scope, extents, ids, remark,
        )
        .map_err(|e| ctx.report(e))
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
        w.sub(|w| write_wrapped_crs(w, SOURCE_CRS_KWD, &self.source_crs, child))?;
        w.sub(|w| write_wrapped_crs(w, TARGET_CRS_KWD, &self.target_crs, child))?;
        if let Some(interp) = &self.interp_crs {
            w.sub(|w| write_wrapped_crs(w, INTERP_CRS_KWD, interp, child))?;
        }
        w.sub(|w| self.method.write_wkt(w, child))?;
        for p in &self.parameters {
            w.sub(|w| p.write_wkt(w, child))?;
        }
        for p in &self.param_files {
            w.sub(|w| p.write_wkt(w, child))?;
        }
        if let Some(accuracy) = &self.accuracy {
            w.sub(|w| accuracy.write_wkt(w, child))?;
        }
        if let Some(scope) = &self.scope {
            w.sub(|w| scope.write_wkt(w, child))?;
        }
        for extent in &self.extents {
            w.sub(|w| extent.write_wkt(w, child))?;
        }
        write_ids(w, &self.ids, opts)?;
        if let Some(remark) = &self.remark {
            w.sub(|w| remark.write_wkt(w, child))?;
        }
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

/// Abridged coordinate transformation carried by a bound CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct AbridgedTransformation {
    name: String,
    method: Method,
    parameters: SetOf<Parameter>,
    param_files: SetOf<ParameterFile>,
    scope: Option<Scope>,
    extents: SetOf<Extent>,
    ids: SetOf<Id>,
    remark: Option<Remark>,
    visible: bool,
}

impl AbridgedTransformation {
    pub const KWD: &'static str = "ABRIDGEDTRANSFORMATION";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        method: Method,
        parameters: SetOf<Parameter>,
        param_files: SetOf<ParameterFile>,
        scope: Option<Scope>,
        extents: SetOf<Extent>,
        ids: SetOf<Id>,
        remark: Option<Remark>,
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
            scope,
            extents,
            ids,
            remark,
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

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn extents(&self) -> &SetOf<Extent> {
        &self.extents
    }

    pub fn ids(&self) -> &SetOf<Id> {
        &self.ids
    }

    pub fn remark(&self) -> Option<&Remark> {
        self.remark.as_ref()
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
        let span = t.span(start, Self::KWD, 1, 1, ctx)?;
        let name = util::unescape(t.text(start + 1));

        let mut method: Option<Method> = None;
        let mut parameters: SetOf<Parameter> = SetOf::new();
        let mut param_files: SetOf<ParameterFile> = SetOf::new();
        let mut scope: Option<Scope> = None;
        let mut extents: SetOf<Extent> = SetOf::new();
        let mut ids = SetOf::new();
        let mut remark: Option<Remark> = None;
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);

            if sub.eq_ignore_ascii_case(Method::KWD) {
                if method.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateMethod, Self::KWD));
                } else {
                    match Method::from_tokens(t, i, ctx) {
                        Ok(m) => method = Some(m),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if ParameterFile::is_kwd(sub) {
                match ParameterFile::from_tokens(t, i, ctx) {
                    Ok(p) => {
                        if let Err(dup) = param_files.push_unique(p) {
                            bad.get_or_insert(ctx.err_str(
                                ErrorCode::DuplicateParameterFile,
                                Self::KWD,
                                dup.name(),
                            ));
                        }
                    }
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            } else if Parameter::is_kwd(sub) {
                match Parameter::from_tokens(t, i, ctx) {
                    Ok(p) => {
                        if let Err(dup) = parameters.push_unique(p) {
                            bad.get_or_insert(ctx.err_str(
                                ErrorCode::DuplicateParameter,
                                Self::KWD,
                                dup.name(),
                            ));
                        }
                    }
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            } else if Scope::is_kwd(sub) {
                if scope.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateScope, Self::KWD));
                } else {
                    match Scope::from_tokens(t, i, ctx) {
                        Ok(s) => scope = Some(s),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Extent::is_kwd(sub) {
                match Extent::from_tokens(t, i, ctx) {
                    Ok(extent) => {
                        if let Err(dup) = extents.push_unique(extent) {
                            bad.get_or_insert(ctx.err_str(
                                ErrorCode::DuplicateExtent,
                                Self::KWD,
                                dup.kwd(),
                            ));
                        }
                    }
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            } else if Id::is_kwd(sub) {
                collect_id(t, i, &mut ids, Self::KWD, &mut bad, ctx);
            } else if Remark::is_kwd(sub) {
                if remark.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateRemark, Self::KWD));
                } else {
                    match Remark::from_tokens(t, i, ctx) {
                        Ok(r) => remark = Some(r),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        let method = match method {
            Some(m) => m,
            None => return Err(ctx.err(ErrorCode::MissingMethod, Self::KWD)),
        };

        Self::new(
            &name, method, parameters, param_files, scope, extents, ids, remark,
        )
        .map_err(|e| ctx.report(e))
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
        if let Some(scope) = &self.scope {
            w.sub(|w| scope.write_wkt(w, child))?;
        }
        for extent in &self.extents {
            w.sub(|w| extent.write_wkt(w, child))?;
        }
        write_ids(w, &self.ids, opts)?;
        if let Some(remark) = &self.remark {
            w.sub(|w| remark.write_wkt(w, child))?;
        }
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

/// A source CRS late-bound to a target CRS by an abridged
/// transformation. A bound CRS has no name of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCrs {
    source_crs: Box<Crs>,
    target_crs: Box<Crs>,
    transformation: AbridgedTransformation,
    ids: SetOf<Id>,
    remark: Option<Remark>,
    visible: bool,
}

impl BoundCrs {
    pub const KWD: &'static str = "BOUNDCRS";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(
        source_crs: Crs,
        target_crs: Crs,
        transformation: AbridgedTransformation,
        ids: SetOf<Id>,
        remark: Option<Remark>,
    ) -> Result<Self> {
        Ok(Self {
            source_crs: Box::new(source_crs),
            target_crs: Box::new(target_crs),
            transformation,
            ids,
            remark,
            visible: true,
        })
    }

    pub fn source_crs(&self) -> &Crs {
        &self.source_crs
    }

    pub fn target_crs(&self) -> &Crs {
        &self.target_crs
    }

    pub fn transformation(&self) -> &AbridgedTransformation {
        &self.transformation
    }

    pub fn ids(&self) -> &SetOf<Id> {
        &self.ids
    }

    pub fn remark(&self) -> Option<&Remark> {
        self.remark.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn compute_eq(&self, other: &Self) -> bool {
        self.source_crs.compute_eq(&other.source_crs)
            && self.target_crs.compute_eq(&other.target_crs)
            && self.transformation.compute_eq(&other.transformation)
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 0, 0, ctx)?;

        let mut source_crs: Option<Crs> = None;
        let mut target_crs: Option<Crs> = None;
        let mut transformation: Option<AbridgedTransformation> = None;
        let mut ids = SetOf::new();
        let mut remark: Option<Remark> = None;
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);

            if sub.eq_ignore_ascii_case(SOURCE_CRS_KWD) {
                if source_crs.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateSourceCrs, Self::KWD));
                } else {
                    match parse_wrapped_crs(t, i, ErrorCode::MissingSourceCrs, Self::KWD, ctx) {
                        Ok(c) => source_crs = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if sub.eq_ignore_ascii_case(TARGET_CRS_KWD) {
                if target_crs.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateTargetCrs, Self::KWD));
                } else {
                    match parse_wrapped_crs(t, i, ErrorCode::MissingTargetCrs, Self::KWD, ctx) {
                        Ok(c) => target_crs = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if AbridgedTransformation::is_kwd(sub) {
                if transformation.is_some() {
                    bad.get_or_insert(
                        ctx.err(ErrorCode::DuplicateAbridgedTransformation, Self::KWD),
                    );
                } else {
                    match AbridgedTransformation::from_tokens(t, i, ctx) {
                        Ok(a) => transformation = Some(a),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Id::is_kwd(sub) {
                collect_id(t, i, &mut ids, Self::KWD, &mut bad, ctx);
            } else if Remark::is_kwd(sub) {
                if remark.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateRemark, Self::KWD));
                } else {
                    match Remark::from_tokens(t, i, ctx) {
                        Ok(r) => remark = Some(r),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        let source_crs = match source_crs {
            Some(c) => c,
            None => return Err(ctx.err(ErrorCode::MissingSourceCrs, Self::KWD)),
        };
        let target_crs = match target_crs {
            Some(c) => c,
            None => return Err(ctx.err(ErrorCode::MissingTargetCrs, Self::KWD)),
        };
        let transformation = match transformation {
            Some(a) => a,
            None => {
                return Err(ctx.err(ErrorCode::MissingAbridgedTransformation, Self::KWD));
            }
        };

        Self::new(source_crs, target_crs, transformation, ids, remark).map_err(|e| ctx.report(e))
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
        write_wrapped_crs(w, SOURCE_CRS_KWD, &self.source_crs, child)?;
        w.sub(|w| write_wrapped_crs(w, TARGET_CRS_KWD, &self.target_crs, child))?;
        w.sub(|w| self.transformation.write_wkt(w, child))?;
        write_ids(w, &self.ids, opts)?;
        if let Some(remark) = &self.remark {
            w.sub(|w| remark.write_wkt(w, child))?;
        }
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

    const GEOG_A: &str = concat!(
        r#"GEODCRS["A",DATUM["A",ELLIPSOID["WGS 84",6378137,298.257223563]],"#,
        r#"CS[ellipsoidal,2],AXIS["latitude",north],AXIS["longitude",east],"#,
        r#"ANGLEUNIT["degree",0.0174532925199433]]"#,
    );

    const GEOG_B: &str = concat!(
        r#"GEODCRS["B",DATUM["B",ELLIPSOID["GRS 1980",6378137,298.257222101]],"#,
        r#"CS[ellipsoidal,2],AXIS["latitude",north],AXIS["longitude",east],"#,
        r#"ANGLEUNIT["degree",0.0174532925199433]]"#,
    );

    fn op_wkt() -> String {
        format!(
            concat!(
                r#"COORDINATEOPERATION["A to B",SOURCECRS[{}],TARGETCRS[{}],"#,
                r#"METHOD["Geocentric translations",ID["EPSG","1031"]],"#,
                r#"PARAMETER["X-axis translation",100],"#,
                r#"PARAMETER["Y-axis translation",200],"#,
                r#"PARAMETER["Z-axis translation",300],"#,
                r#"OPERATIONACCURACY[0.1]]"#,
            ),
            GEOG_A, GEOG_B
        )
    }

    #[test]
    fn coordinate_operation_roundtrip() {
        let wkt = op_wkt();
        let op = CoordinateOperation::from_wkt(&wkt).unwrap();
        assert_eq!(op.name(), "A to B");
        assert_eq!(op.source_crs().name(), "A");
        assert_eq!(op.target_crs().name(), "B");
        assert_eq!(op.parameters().len(), 3);
        assert_eq!(op.accuracy().unwrap().value(), 0.1);
        assert_eq!(op.to_wkt(WktOptions::new()).unwrap(), wkt);
    }

    #[test]
    fn operation_requires_both_ends() {
        let wkt = format!(r#"COORDINATEOPERATION["x",SOURCECRS[{GEOG_A}],METHOD["m"]]"#);
        let err = CoordinateOperation::from_wkt(&wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingTargetCrs);
    }

    #[test]
    fn bound_crs_roundtrip() {
        let wkt = format!(
            concat!(
                r#"BOUNDCRS[SOURCECRS[{}],TARGETCRS[{}],"#,
                r#"ABRIDGEDTRANSFORMATION["A to B (1)",METHOD["Geocentric translations"],"#,
                r#"PARAMETER["X-axis translation",100]]]"#,
            ),
            GEOG_A, GEOG_B
        );
        let bound = BoundCrs::from_wkt(&wkt).unwrap();
        assert_eq!(bound.transformation().name(), "A to B (1)");
        assert_eq!(bound.to_wkt(WktOptions::new()).unwrap(), wkt);
    }

    #[test]
    fn bound_crs_requires_transformation() {
        let wkt = format!(r#"BOUNDCRS[SOURCECRS[{GEOG_A}],TARGETCRS[{GEOG_B}]]"#);
        let err = BoundCrs::from_wkt(&wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingAbridgedTransformation);
    }

    #[test]
    fn duplicate_source_rejected() {
        let wkt = format!(
            r#"BOUNDCRS[SOURCECRS[{GEOG_A}],SOURCECRS[{GEOG_A}],TARGETCRS[{GEOG_B}],ABRIDGEDTRANSFORMATION["t",METHOD["m"]]]"#
        );
        let err = BoundCrs::from_wkt(&wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateSourceCrs);
    }
}
