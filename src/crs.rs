//!
//! Coordinate reference systems
//!
//! One object covers the whole CRS family: the seven full kinds, their
//! "base" variants nested inside derived CRSes, and the compound CRS.
//! The shared prefix (name, coordinate system, axes, unit, scope,
//! extents, identifiers, remark) lives on [`Crs`]; what anchors the CRS
//! to the world lives in [`CrsRoot`], whose variants make the datum
//! branch and the base-CRS + deriving-conversion branch mutually
//! exclusive by construction.
//!
use crate::consts::NAME_MAX;
use crate::conversion::{Conversion, DerivingConversion, Method};
use crate::cs::{Cs, CsKind};
use crate::datum::{Datum, DatumKind, PrimeMeridian};
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::extent::Extent;
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::leaf::{Remark, Scope};
use crate::param::Parameter;
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::unit::{Unit, UnitKind};
use crate::axis::{place_axis, Axis};
use crate::util;

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CrsKind {
    Geodetic,
    Projected,
    Vertical,
    Engineering,
    Image,
    Parametric,
    Temporal,
    Compound,
    BaseGeodetic,
    BaseProjected,
    BaseVertical,
    BaseEngineering,
    BaseParametric,
    BaseTemporal,
}

impl CrsKind {
    /// Primary (modern) keyword.
    pub fn kwd(&self) -> &'static str {
        match self {
            CrsKind::Geodetic => "GEODCRS",
            CrsKind::Projected => "PROJCRS",
            CrsKind::Vertical => "VERTCRS",
            CrsKind::Engineering => "ENGCRS",
            CrsKind::Image => "IMAGECRS",
            CrsKind::Parametric => "PARAMETRICCRS",
            CrsKind::Temporal => "TIMECRS",
            CrsKind::Compound => "COMPOUNDCRS",
            CrsKind::BaseGeodetic => "BASEGEODCRS",
            CrsKind::BaseProjected => "BASEPROJCRS",
            CrsKind::BaseVertical => "BASEVERTCRS",
            CrsKind::BaseEngineering => "BASEENGCRS",
            CrsKind::BaseParametric => "BASEPARAMETRICCRS",
            CrsKind::BaseTemporal => "BASETIMECRS",
        }
    }

    fn alt_kwd(&self) -> Option<&'static str> {
        match self {
            CrsKind::Geodetic => Some("GEODETICCRS"),
            CrsKind::Projected => Some("PROJECTEDCRS"),
            CrsKind::Vertical => Some("VERTICALCRS"),
            CrsKind::Engineering => Some("ENGINEERINGCRS"),
            CrsKind::BaseGeodetic => Some("BASEGEOGCRS"),
            _ => None,
        }
    }

    fn old_kwds(&self) -> &'static [&'static str] {
        match self {
            CrsKind::Geodetic => &["GEOGCS", "GEOCCS"],
            CrsKind::Projected => &["PROJCS"],
            CrsKind::Vertical => &["VERT_CS"],
            CrsKind::Engineering => &["LOCAL_CS"],
            CrsKind::Compound => &["COMPD_CS"],
            _ => &[],
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(
            self,
            CrsKind::BaseGeodetic
                | CrsKind::BaseProjected
                | CrsKind::BaseVertical
                | CrsKind::BaseEngineering
                | CrsKind::BaseParametric
                | CrsKind::BaseTemporal
        )
    }

    fn max_axes(&self) -> usize {
        match self {
            CrsKind::Geodetic | CrsKind::Engineering => 3,
            CrsKind::Projected | CrsKind::Image => 2,
            CrsKind::Vertical | CrsKind::Parametric | CrsKind::Temporal => 1,
            _ => 0,
        }
    }

    fn datum_kind(&self) -> Option<DatumKind> {
        match self {
            CrsKind::Geodetic | CrsKind::BaseGeodetic => Some(DatumKind::Geodetic),
            CrsKind::Vertical | CrsKind::BaseVertical => Some(DatumKind::Vertical),
            CrsKind::Engineering | CrsKind::BaseEngineering => Some(DatumKind::Engineering),
            CrsKind::Image => Some(DatumKind::Image),
            CrsKind::Parametric | CrsKind::BaseParametric => Some(DatumKind::Parametric),
            CrsKind::Temporal | CrsKind::BaseTemporal => Some(DatumKind::Temporal),
            _ => None,
        }
    }

    fn base_kind(&self) -> Option<CrsKind> {
        match self {
            CrsKind::Geodetic | CrsKind::Projected => Some(CrsKind::BaseGeodetic),
            CrsKind::Vertical => Some(CrsKind::BaseVertical),
            CrsKind::Engineering => Some(CrsKind::BaseEngineering),
            CrsKind::Parametric => Some(CrsKind::BaseParametric),
            CrsKind::Temporal => Some(CrsKind::BaseTemporal),
            _ => None,
        }
    }

    fn matches(&self, kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(self.kwd())
            || self
                .alt_kwd()
                .map(|alt| kwd.eq_ignore_ascii_case(alt))
                .unwrap_or(false)
            || self.old_kwds().iter().any(|old| kwd.eq_ignore_ascii_case(old))
    }
}

/// The anchoring of a CRS to the world.
#[derive(Debug, Clone, PartialEq)]
pub enum CrsRoot {
    /// A datum, plus the prime meridian for geodetic CRSes.
    Datum {
        datum: Datum,
        prime_meridian: Option<PrimeMeridian>,
    },
    /// A base CRS and the deriving conversion mapping it to this one.
    Derived {
        base: Box<Crs>,
        conversion: Box<DerivingConversion>,
    },
    /// A base geodetic CRS and a map projection (projected CRSes).
    Projection {
        base: Box<Crs>,
        conversion: Box<Conversion>,
    },
    /// The members of a compound CRS.
    Compound {
        first: Box<Crs>,
        second: Box<Crs>,
        third: Option<Box<Crs>>,
    },
}

/// The shared tail of every CRS constructor: coordinate system, axes,
/// unit and metadata.
#[derive(Debug, Clone, Default)]
pub struct CrsDetail {
    pub cs: Option<Cs>,
    pub axes: Vec<Axis>,
    pub unit: Option<Unit>,
    pub scope: Option<Scope>,
    pub extents: SetOf<Extent>,
    pub ids: SetOf<Id>,
    pub remark: Option<Remark>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    name: String,
    kind: CrsKind,
    root: CrsRoot,
    cs: Option<Cs>,
    axes: [Option<Axis>; 3],
    unit: Option<Unit>,
    scope: Option<Scope>,
    extents: SetOf<Extent>,
    ids: SetOf<Id>,
    remark: Option<Remark>,
    visible: bool,
}

impl Crs {
    pub(crate) fn is_kwd(kwd: &str) -> bool {
        Self::kind_of_kwd(kwd).is_some()
    }

    /// Map a keyword to its CRS kind; the flag marks a legacy spelling.
    pub(crate) fn kind_of_kwd(kwd: &str) -> Option<(CrsKind, bool)> {
        const KINDS: [CrsKind; 14] = [
            CrsKind::Geodetic,
            CrsKind::Projected,
            CrsKind::Vertical,
            CrsKind::Engineering,
            CrsKind::Image,
            CrsKind::Parametric,
            CrsKind::Temporal,
            CrsKind::Compound,
            CrsKind::BaseGeodetic,
            CrsKind::BaseProjected,
            CrsKind::BaseVertical,
            CrsKind::BaseEngineering,
            CrsKind::BaseParametric,
            CrsKind::BaseTemporal,
        ];
        for kind in KINDS {
            if kind.matches(kwd) {
                let old = kind.old_kwds().iter().any(|o| kwd.eq_ignore_ascii_case(o));
                return Some((kind, old));
            }
        }
        None
    }

    // ---------------------------------------------------------------
    // constructors
    // ---------------------------------------------------------------

    fn build(kind: CrsKind, name: &str, root: CrsRoot, detail: CrsDetail) -> Result<Self> {
        let kwd = kind.kwd();
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                kwd,
                name.len() as i64,
            ));
        }

        let mut axes: [Option<Axis>; 3] = [None, None, None];
        for axis in detail.axes {
            place_axis(axis, &mut axes, kind.max_axes(), kwd)?;
        }

        if kind != CrsKind::Compound && !kind.is_base() {
            let cs = detail
                .cs
                .as_ref()
                .ok_or_else(|| WktError::new(ErrorCode::MissingCs, kwd))?;
            validate_cs(kind, cs, &axes, detail.unit.as_ref(), kwd)?;
        }

        Ok(Self {
            name: name.to_string(),
            kind,
            root,
            cs: detail.cs,
            axes,
            unit: detail.unit,
            scope: detail.scope,
            extents: detail.extents,
            ids: detail.ids,
            remark: detail.remark,
            visible: true,
        })
    }

    fn datum_root(kind: CrsKind, datum: Datum, prime_meridian: Option<PrimeMeridian>) -> Result<CrsRoot> {
        match kind.datum_kind() {
            Some(expected) if datum.kind() == expected => Ok(CrsRoot::Datum {
                datum,
                prime_meridian,
            }),
            _ => Err(WktError::new(ErrorCode::MissingDatum, kind.kwd())),
        }
    }

    fn base_root(kind: CrsKind, base: Crs, conversion: DerivingConversion) -> Result<CrsRoot> {
        match kind.base_kind() {
            Some(expected) if base.kind() == expected => Ok(CrsRoot::Derived {
                base: Box::new(base),
                conversion: Box::new(conversion),
            }),
            _ => Err(WktError::new(ErrorCode::MissingBaseCrs, kind.kwd())),
        }
    }

    pub fn geodetic(
        name: &str,
        datum: Datum,
        prime_meridian: Option<PrimeMeridian>,
        detail: CrsDetail,
    ) -> Result<Self> {
        let root = Self::datum_root(CrsKind::Geodetic, datum, prime_meridian)?;
        Self::build(CrsKind::Geodetic, name, root, detail)
    }

    pub fn derived_geodetic(
        name: &str,
        base: Crs,
        conversion: DerivingConversion,
        detail: CrsDetail,
    ) -> Result<Self> {
        let root = Self::base_root(CrsKind::Geodetic, base, conversion)?;
        Self::build(CrsKind::Geodetic, name, root, detail)
    }

    pub fn projected(
        name: &str,
        base: Crs,
        conversion: Conversion,
        detail: CrsDetail,
    ) -> Result<Self> {
        if base.kind() != CrsKind::BaseGeodetic {
            return Err(WktError::new(
                ErrorCode::MissingBaseCrs,
                CrsKind::Projected.kwd(),
            ));
        }
        let root = CrsRoot::Projection {
            base: Box::new(base),
            conversion: Box::new(conversion),
        };
        Self::build(CrsKind::Projected, name, root, detail)
    }

    pub fn vertical(name: &str, datum: Datum, detail: CrsDetail) -> Result<Self> {
        let root = Self::datum_root(CrsKind::Vertical, datum, None)?;
        Self::build(CrsKind::Vertical, name, root, detail)
    }

    pub fn derived_vertical(
        name: &str,
        base: Crs,
        conversion: DerivingConversion,
        detail: CrsDetail,
    ) -> Result<Self> {
        let root = Self::base_root(CrsKind::Vertical, base, conversion)?;
        Self::build(CrsKind::Vertical, name, root, detail)
    }

    pub fn engineering(name: &str, datum: Datum, detail: CrsDetail) -> Result<Self> {
        let root = Self::datum_root(CrsKind::Engineering, datum, None)?;
        Self::build(CrsKind::Engineering, name, root, detail)
    }

    pub fn derived_engineering(
        name: &str,
        base: Crs,
        conversion: DerivingConversion,
        detail: CrsDetail,
    ) -> Result<Self> {
        let root = Self::base_root(CrsKind::Engineering, base, conversion)?;
        Self::build(CrsKind::Engineering, name, root, detail)
    }

    pub fn image(name: &str, datum: Datum, detail: CrsDetail) -> Result<Self> {
        let root = Self::datum_root(CrsKind::Image, datum, None)?;
        Self::build(CrsKind::Image, name, root, detail)
    }

    pub fn parametric(name: &str, datum: Datum, detail: CrsDetail) -> Result<Self> {
        let root = Self::datum_root(CrsKind::Parametric, datum, None)?;
        Self::build(CrsKind::Parametric, name, root, detail)
    }

    pub fn derived_parametric(
        name: &str,
        base: Crs,
        conversion: DerivingConversion,
        detail: CrsDetail,
    ) -> Result<Self> {
        let root = Self::base_root(CrsKind::Parametric, base, conversion)?;
        Self::build(CrsKind::Parametric, name, root, detail)
    }

    pub fn temporal(name: &str, datum: Datum, detail: CrsDetail) -> Result<Self> {
        let root = Self::datum_root(CrsKind::Temporal, datum, None)?;
        Self::build(CrsKind::Temporal, name, root, detail)
    }

    pub fn derived_temporal(
        name: &str,
        base: Crs,
        conversion: DerivingConversion,
        detail: CrsDetail,
    ) -> Result<Self> {
        let root = Self::base_root(CrsKind::Temporal, base, conversion)?;
        Self::build(CrsKind::Temporal, name, root, detail)
    }

    pub fn compound(
        name: &str,
        first: Crs,
        second: Crs,
        third: Option<Crs>,
        ids: SetOf<Id>,
        remark: Option<Remark>,
    ) -> Result<Self> {
        let kwd = CrsKind::Compound.kwd();
        if !matches!(
            first.kind(),
            CrsKind::Geodetic | CrsKind::Projected | CrsKind::Engineering
        ) {
            return Err(WktError::with_str(
                ErrorCode::InvalidFirstCrs,
                kwd,
                first.kind().kwd(),
            ));
        }
        if !matches!(
            second.kind(),
            CrsKind::Vertical | CrsKind::Parametric | CrsKind::Temporal | CrsKind::Engineering
        ) {
            return Err(WktError::with_str(
                ErrorCode::InvalidSecondCrs,
                kwd,
                second.kind().kwd(),
            ));
        }
        if let Some(third) = &third {
            if third.kind() != CrsKind::Temporal {
                return Err(WktError::with_str(
                    ErrorCode::InvalidThirdCrs,
                    kwd,
                    third.kind().kwd(),
                ));
            }
        }
        let root = CrsRoot::Compound {
            first: Box::new(first),
            second: Box::new(second),
            third: third.map(Box::new),
        };
        let detail = CrsDetail {
            ids,
            remark,
            ..CrsDetail::default()
        };
        Self::build(CrsKind::Compound, name, root, detail)
    }

    pub fn base_geodetic(
        name: &str,
        datum: Datum,
        prime_meridian: Option<PrimeMeridian>,
        unit: Option<Unit>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        let root = Self::datum_root(CrsKind::BaseGeodetic, datum, prime_meridian)?;
        let detail = CrsDetail {
            unit,
            ids,
            ..CrsDetail::default()
        };
        Self::build(CrsKind::BaseGeodetic, name, root, detail)
    }

    pub fn base_projected(
        name: &str,
        base: Crs,
        conversion: Conversion,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        if base.kind() != CrsKind::BaseGeodetic {
            return Err(WktError::new(
                ErrorCode::MissingBaseCrs,
                CrsKind::BaseProjected.kwd(),
            ));
        }
        let root = CrsRoot::Projection {
            base: Box::new(base),
            conversion: Box::new(conversion),
        };
        let detail = CrsDetail {
            ids,
            ..CrsDetail::default()
        };
        Self::build(CrsKind::BaseProjected, name, root, detail)
    }

    pub fn base_vertical(name: &str, datum: Datum, unit: Option<Unit>, ids: SetOf<Id>) -> Result<Self> {
        Self::base_with_datum(CrsKind::BaseVertical, name, datum, unit, ids)
    }

    pub fn base_engineering(name: &str, datum: Datum, unit: Option<Unit>, ids: SetOf<Id>) -> Result<Self> {
        Self::base_with_datum(CrsKind::BaseEngineering, name, datum, unit, ids)
    }

    pub fn base_parametric(name: &str, datum: Datum, unit: Option<Unit>, ids: SetOf<Id>) -> Result<Self> {
        Self::base_with_datum(CrsKind::BaseParametric, name, datum, unit, ids)
    }

    pub fn base_temporal(name: &str, datum: Datum, unit: Option<Unit>, ids: SetOf<Id>) -> Result<Self> {
        Self::base_with_datum(CrsKind::BaseTemporal, name, datum, unit, ids)
    }

    fn base_with_datum(
        kind: CrsKind,
        name: &str,
        datum: Datum,
        unit: Option<Unit>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        let root = Self::datum_root(kind, datum, None)?;
        let detail = CrsDetail {
            unit,
            ids,
            ..CrsDetail::default()
        };
        Self::build(kind, name, root, detail)
    }

    // ---------------------------------------------------------------
    // accessors
    // ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CrsKind {
        self.kind
    }

    pub fn root(&self) -> &CrsRoot {
        &self.root
    }

    pub fn cs(&self) -> Option<&Cs> {
        self.cs.as_ref()
    }

    /// The axis in slot `n` (0-based).
    pub fn axis(&self, n: usize) -> Option<&Axis> {
        self.axes.get(n).and_then(|a| a.as_ref())
    }

    pub fn axis_count(&self) -> usize {
        self.axes.iter().filter(|a| a.is_some()).count()
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
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

    /// The datum, when this CRS carries the datum branch.
    pub fn datum(&self) -> Option<&Datum> {
        match &self.root {
            CrsRoot::Datum { datum, .. } => Some(datum),
            _ => None,
        }
    }

    pub fn prime_meridian(&self) -> Option<&PrimeMeridian> {
        match &self.root {
            CrsRoot::Datum { prime_meridian, .. } => prime_meridian.as_ref(),
            _ => None,
        }
    }

    /// The base CRS, when this CRS carries the derived or projection
    /// branch.
    pub fn base_crs(&self) -> Option<&Crs> {
        match &self.root {
            CrsRoot::Derived { base, .. } | CrsRoot::Projection { base, .. } => Some(base),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // ---------------------------------------------------------------
    // comparison
    // ---------------------------------------------------------------

    /// Value-level equality: names, anchoring and coordinate system;
    /// scope, extents, identifiers and remarks are bookkeeping.
    pub fn compute_eq(&self, other: &Self) -> bool {
        fn opt_eq<T>(a: &Option<T>, b: &Option<T>, f: impl Fn(&T, &T) -> bool) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(x), Some(y)) => f(x, y),
                _ => false,
            }
        }

        if self.kind != other.kind || self.name != other.name {
            return false;
        }
        let roots = match (&self.root, &other.root) {
            (
                CrsRoot::Datum {
                    datum: d1,
                    prime_meridian: p1,
                },
                CrsRoot::Datum {
                    datum: d2,
                    prime_meridian: p2,
                },
            ) => d1.compute_eq(d2) && opt_eq(p1, p2, |a, b| a.compute_eq(b)),
            (
                CrsRoot::Derived {
                    base: b1,
                    conversion: c1,
                },
                CrsRoot::Derived {
                    base: b2,
                    conversion: c2,
                },
            ) => b1.compute_eq(b2) && c1.compute_eq(c2),
            (
                CrsRoot::Projection {
                    base: b1,
                    conversion: c1,
                },
                CrsRoot::Projection {
                    base: b2,
                    conversion: c2,
                },
            ) => b1.compute_eq(b2) && c1.compute_eq(c2),
            (
                CrsRoot::Compound {
                    first: f1,
                    second: s1,
                    third: t1,
                },
                CrsRoot::Compound {
                    first: f2,
                    second: s2,
                    third: t2,
                },
            ) => {
                f1.compute_eq(f2)
                    && s1.compute_eq(s2)
                    && opt_eq(t1, t2, |a, b| a.compute_eq(b))
            }
            _ => false,
        };
        roots
            && opt_eq(&self.cs, &other.cs, Cs::compute_eq)
            && self
                .axes
                .iter()
                .zip(other.axes.iter())
                .all(|(a, b)| opt_eq(a, b, Axis::compute_eq))
            && opt_eq(&self.unit, &other.unit, Unit::compute_eq)
    }

    // ---------------------------------------------------------------
    // parsing
    // ---------------------------------------------------------------

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        match Self::kind_of_kwd(kwd) {
            Some((CrsKind::Compound, _)) => Self::parse_compound(t, start, ctx),
            Some((kind, true)) => Self::parse_old(kind, t, start, ctx),
            Some((kind, false)) if kind.is_base() => Self::parse_base(kind, t, start, ctx),
            Some((kind, false)) => Self::parse_full(kind, t, start, ctx),
            None => Err(ctx.err_str(ErrorCode::InvalidKeyword, "crs", kwd)),
        }
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, "crs", |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    // A modern full CRS of any non-compound kind.
    fn parse_full(kind: CrsKind, t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = kind.kwd();
        let span = t.span(start, kwd, 1, 1, ctx)?;
        let name = util::unescape(t.text(start + 1));

        let mut datum: Option<Datum> = None;
        let mut prime_meridian: Option<PrimeMeridian> = None;
        let mut base: Option<Crs> = None;
        let mut conversion: Option<Conversion> = None;
        let mut deriving: Option<DerivingConversion> = None;
        let mut detail = CrsDetail::default();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);

            if kind
                .datum_kind()
                .map(|dk| Datum::is_kind_kwd(sub, dk))
                .unwrap_or(false)
            {
                if datum.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateDatum, kwd));
                } else {
                    match Datum::from_tokens(t, i, ctx) {
                        Ok(d) => datum = Some(d),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == CrsKind::Geodetic && PrimeMeridian::is_kwd(sub) {
                if prime_meridian.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicatePrimeMeridian, kwd));
                } else {
                    match PrimeMeridian::from_tokens(t, i, ctx) {
                        Ok(p) => prime_meridian = Some(p),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind
                .base_kind()
                .map(|bk| bk.matches(sub))
                .unwrap_or(false)
            {
                if base.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateBaseCrs, kwd));
                } else {
                    match Self::from_tokens(t, i, ctx) {
                        Ok(b) => base = Some(b),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == CrsKind::Projected && Conversion::is_kwd(sub) {
                if conversion.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateConversion, kwd));
                } else {
                    match Conversion::from_tokens(t, i, ctx) {
                        Ok(c) => conversion = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind != CrsKind::Projected && DerivingConversion::is_kwd(sub) {
                if deriving.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateConversion, kwd));
                } else {
                    match DerivingConversion::from_tokens(t, i, ctx) {
                        Ok(c) => deriving = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else {
                Self::parse_common_child(kind, t, i, kwd, &mut detail, &mut bad, ctx);
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }

        let root = match kind {
            CrsKind::Projected => {
                let base = match base {
                    Some(b) => b,
                    None => return Err(ctx.err(ErrorCode::MissingBaseCrs, kwd)),
                };
                let conversion = match conversion {
                    Some(c) => c,
                    None => return Err(ctx.err(ErrorCode::MissingConversion, kwd)),
                };
                CrsRoot::Projection {
                    base: Box::new(base),
                    conversion: Box::new(conversion),
                }
            }
            _ => match base {
                Some(b) => {
                    let conversion = match deriving {
                        Some(c) => c,
                        None => return Err(ctx.err(ErrorCode::MissingConversion, kwd)),
                    };
                    CrsRoot::Derived {
                        base: Box::new(b),
                        conversion: Box::new(conversion),
                    }
                }
                None => {
                    let datum = match datum {
                        Some(d) => d,
                        None => return Err(ctx.err(ErrorCode::MissingDatum, kwd)),
                    };
                    CrsRoot::Datum {
                        datum,
                        prime_meridian,
                    }
                }
            },
        };

        Self::build(kind, &name, root, detail).map_err(|e| ctx.report(e))
    }

    // Children shared by every CRS kind: CS, axes, unit, scope,
    // extents, identifiers, remark. Unknown sub-objects are skipped.
    #[allow(clippy::too_many_arguments)]
    fn parse_common_child(
        kind: CrsKind,
        t: &Tokens,
        i: usize,
        kwd: &'static str,
        detail: &mut CrsDetail,
        bad: &mut Option<WktError>,
        ctx: &mut Ctx,
    ) {
        let sub = t.text(i);
        if Cs::is_kwd(sub) {
            if detail.cs.is_some() {
                bad.get_or_insert(ctx.err(ErrorCode::DuplicateCs, kwd));
            } else {
                match Cs::from_tokens(t, i, ctx) {
                    Ok(cs) => detail.cs = Some(cs),
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            }
        } else if Axis::is_kwd(sub) {
            match Axis::from_tokens(t, i, ctx) {
                Ok(axis) => detail.axes.push(axis),
                Err(e) => {
                    bad.get_or_insert(e);
                }
            }
        } else if crs_unit_kwd(kind, sub) {
            if detail.unit.is_some() {
                bad.get_or_insert(ctx.err(ErrorCode::DuplicateUnit, kwd));
            } else {
                match parse_crs_unit(kind, t, i, ctx) {
                    Ok(u) => detail.unit = Some(u),
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            }
        } else if Scope::is_kwd(sub) {
            if detail.scope.is_some() {
                bad.get_or_insert(ctx.err(ErrorCode::DuplicateScope, kwd));
            } else {
                match Scope::from_tokens(t, i, ctx) {
                    Ok(s) => detail.scope = Some(s),
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            }
        } else if Extent::is_kwd(sub) {
            match Extent::from_tokens(t, i, ctx) {
                Ok(extent) => {
                    if let Err(dup) = detail.extents.push_unique(extent) {
                        bad.get_or_insert(ctx.err_str(ErrorCode::DuplicateExtent, kwd, dup.kwd()));
                    }
                }
                Err(e) => {
                    bad.get_or_insert(e);
                }
            }
        } else if Id::is_kwd(sub) {
            collect_id(t, i, &mut detail.ids, kwd, bad, ctx);
        } else if Remark::is_kwd(sub) {
            if detail.remark.is_some() {
                bad.get_or_insert(ctx.err(ErrorCode::DuplicateRemark, kwd));
            } else {
                match Remark::from_tokens(t, i, ctx) {
                    Ok(r) => detail.remark = Some(r),
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            }
        }
    }

    // A base CRS nested inside a derived CRS (or standalone).
    fn parse_base(kind: CrsKind, t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = kind.kwd();
        let span = t.span(start, kwd, 1, 1, ctx)?;
        let name = util::unescape(t.text(start + 1));

        let mut datum: Option<Datum> = None;
        let mut prime_meridian: Option<PrimeMeridian> = None;
        let mut base: Option<Crs> = None;
        let mut conversion: Option<Conversion> = None;
        let mut unit: Option<Unit> = None;
        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);

            if kind
                .datum_kind()
                .map(|dk| Datum::is_kind_kwd(sub, dk))
                .unwrap_or(false)
            {
                if datum.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateDatum, kwd));
                } else {
                    match Datum::from_tokens(t, i, ctx) {
                        Ok(d) => datum = Some(d),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == CrsKind::BaseGeodetic && PrimeMeridian::is_kwd(sub) {
                if prime_meridian.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicatePrimeMeridian, kwd));
                } else {
                    match PrimeMeridian::from_tokens(t, i, ctx) {
                        Ok(p) => prime_meridian = Some(p),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == CrsKind::BaseProjected && CrsKind::BaseGeodetic.matches(sub) {
                if base.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateBaseCrs, kwd));
                } else {
                    match Self::from_tokens(t, i, ctx) {
                        Ok(b) => base = Some(b),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == CrsKind::BaseProjected && Conversion::is_kwd(sub) {
                if conversion.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateConversion, kwd));
                } else {
                    match Conversion::from_tokens(t, i, ctx) {
                        Ok(c) => conversion = Some(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if crs_unit_kwd(kind, sub) {
                if unit.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateUnit, kwd));
                } else {
                    match parse_crs_unit(kind, t, i, ctx) {
                        Ok(u) => unit = Some(u),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
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

        if kind == CrsKind::BaseProjected {
            let base = match base {
                Some(b) => b,
                None => return Err(ctx.err(ErrorCode::MissingBaseCrs, kwd)),
            };
            let conversion = match conversion {
                Some(c) => c,
                None => return Err(ctx.err(ErrorCode::MissingConversion, kwd)),
            };
            return Self::base_projected(&name, base, conversion, ids).map_err(|e| ctx.report(e));
        }

        let datum = match datum {
            Some(d) => d,
            None => return Err(ctx.err(ErrorCode::MissingDatum, kwd)),
        };
        if kind == CrsKind::BaseGeodetic {
            Self::base_geodetic(&name, datum, prime_meridian, unit, ids).map_err(|e| ctx.report(e))
        } else {
            Self::base_with_datum(kind, &name, datum, unit, ids).map_err(|e| ctx.report(e))
        }
    }

    // Compound CRS, modern or legacy; members are assigned in order of
    // appearance.
    fn parse_compound(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = CrsKind::Compound.kwd();
        let span = t.span(start, kwd, 1, 1, ctx)?;
        let name = util::unescape(t.text(start + 1));

        let mut members: Vec<Crs> = Vec::new();
        let mut ids = SetOf::new();
        let mut remark: Option<Remark> = None;
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);

            if Self::is_kwd(sub) {
                if members.len() >= 3 {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateThirdCrs, kwd));
                } else {
                    match Self::from_tokens(t, i, ctx) {
                        Ok(c) => members.push(c),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Id::is_kwd(sub) {
                collect_id(t, i, &mut ids, kwd, &mut bad, ctx);
            } else if Remark::is_kwd(sub) {
                if remark.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateRemark, kwd));
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

        let mut members = members.into_iter();
        let first = match members.next() {
            Some(c) => c,
            None => return Err(ctx.err(ErrorCode::MissingFirstCrs, kwd)),
        };
        let second = match members.next() {
            Some(c) => c,
            None => return Err(ctx.err(ErrorCode::MissingSecondCrs, kwd)),
        };
        let third = members.next();

        Self::compound(&name, first, second, third, ids, remark).map_err(|e| ctx.report(e))
    }

    // Legacy (WKT1) full CRS forms. The legacy syntax has no CS object,
    // so a pseudo-CS is synthesized from the CRS kind and axis count.
    fn parse_old(kind: CrsKind, t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = kind.kwd();
        let geoccs = t.text(start).eq_ignore_ascii_case("GEOCCS");
        let span = t.span(start, kwd, 1, 1, ctx)?;
        let name = util::unescape(t.text(start + 1));

        let mut datum: Option<Datum> = None;
        let mut prime_meridian: Option<PrimeMeridian> = None;
        let mut base: Option<Crs> = None;
        let mut method: Option<Method> = None;
        let mut parameters: SetOf<Parameter> = SetOf::new();
        let mut axes: Vec<Axis> = Vec::new();
        let mut unit: Option<Unit> = None;
        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);

            if kind == CrsKind::Projected && CrsKind::Geodetic.matches(sub) {
                if base.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateBaseCrs, kwd));
                } else {
                    match Self::from_tokens(t, i, ctx) {
                        Ok(b) => base = Some(b),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind != CrsKind::Projected
                && kind
                    .datum_kind()
                    .map(|dk| Datum::is_kind_kwd(sub, dk))
                    .unwrap_or(false)
            {
                if datum.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateDatum, kwd));
                } else {
                    match Datum::from_tokens(t, i, ctx) {
                        Ok(d) => datum = Some(d),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == CrsKind::Geodetic && PrimeMeridian::is_kwd(sub) {
                if prime_meridian.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicatePrimeMeridian, kwd));
                } else {
                    match PrimeMeridian::from_tokens(t, i, ctx) {
                        Ok(p) => prime_meridian = Some(p),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == CrsKind::Projected && Method::is_kwd(sub) {
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
            } else if kind == CrsKind::Projected && Parameter::is_kwd(sub) {
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
            } else if Axis::is_kwd(sub) {
                match Axis::from_tokens(t, i, ctx) {
                    Ok(a) => axes.push(a),
                    Err(e) => {
                        bad.get_or_insert(e);
                    }
                }
            } else if Unit::is_kwd(sub) {
                if unit.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateUnit, kwd));
                } else {
                    let parsed = match kind {
                        CrsKind::Geodetic if !geoccs => Unit::from_tokens(t, i, ctx),
                        _ => Unit::from_tokens_as(t, i, UnitKind::Length, ctx),
                    };
                    match parsed {
                        Ok(u) => unit = Some(u),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Id::is_kwd(sub) {
                collect_id(t, i, &mut ids, kwd, &mut bad, ctx);
            }
            // TOWGS84, EXTENSION and friends are skipped
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }

        let axis_count = axes.len();
        let cs = match kind {
            CrsKind::Geodetic if geoccs => Cs::new(CsKind::Cartesian, 3, SetOf::new()),
            CrsKind::Geodetic => Cs::new(CsKind::Ellipsoidal, axis_count.max(2) as i64, SetOf::new()),
            CrsKind::Projected => Cs::new(CsKind::Cartesian, 2, SetOf::new()),
            CrsKind::Vertical => Cs::new(CsKind::Vertical, 1, SetOf::new()),
            _ => Cs::new(CsKind::Cartesian, axis_count.clamp(2, 3) as i64, SetOf::new()),
        }
        .map_err(|e| ctx.report(e))?;

        let detail = CrsDetail {
            cs: Some(cs),
            axes,
            unit,
            ids,
            ..CrsDetail::default()
        };

        let root = if kind == CrsKind::Projected {
            let base = match base {
                Some(b) => b.demote_to_base(CrsKind::BaseGeodetic),
                None => return Err(ctx.err(ErrorCode::MissingBaseCrs, kwd)),
            };
            let method = match method {
                Some(m) => m,
                None => return Err(ctx.err(ErrorCode::MissingConversion, kwd)),
            };
            let conv_name = method.name().to_string();
            let conversion = Conversion::new(&conv_name, method, parameters, SetOf::new())
                .map_err(|e| ctx.report(e))?;
            CrsRoot::Projection {
                base: Box::new(base),
                conversion: Box::new(conversion),
            }
        } else {
            let datum = match datum {
                Some(d) => d,
                None => return Err(ctx.err(ErrorCode::MissingDatum, kwd)),
            };
            CrsRoot::Datum {
                datum,
                prime_meridian,
            }
        };

        Self::build(kind, &name, root, detail).map_err(|e| ctx.report(e))
    }

    // Re-tag a full CRS as the base variant nested in a derived CRS,
    // dropping the parts a base CRS does not carry.
    fn demote_to_base(mut self, base_kind: CrsKind) -> Crs {
        self.kind = base_kind;
        self.cs = None;
        self.axes = [None, None, None];
        self.scope = None;
        self.extents = SetOf::new();
        self.remark = None;
        self
    }

    // ---------------------------------------------------------------
    // serialization
    // ---------------------------------------------------------------

    fn emit_kwd(&self, old: bool) -> &'static str {
        if !old {
            return self.kind.kwd();
        }
        match self.kind {
            CrsKind::Geodetic | CrsKind::BaseGeodetic => {
                if self.cs.as_ref().map(Cs::kind) == Some(CsKind::Cartesian) {
                    "GEOCCS"
                } else {
                    "GEOGCS"
                }
            }
            CrsKind::Projected => "PROJCS",
            CrsKind::Vertical => "VERT_CS",
            CrsKind::Engineering => "LOCAL_CS",
            CrsKind::Compound => "COMPD_CS",
            _ => self.kind.kwd(),
        }
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let child = opts.for_children();
        let old = opts.old_syntax;

        w.push_str(self.emit_kwd(old))?;
        w.push(opts.open())?;
        w.quoted(&self.name)?;

        match &self.root {
            CrsRoot::Compound {
                first,
                second,
                third,
            } => {
                w.sub(|w| first.write_wkt(w, child))?;
                w.sub(|w| second.write_wkt(w, child))?;
                if let Some(third) = third {
                    w.sub(|w| third.write_wkt(w, child))?;
                }
            }
            CrsRoot::Datum {
                datum,
                prime_meridian,
            } => {
                w.sub(|w| datum.write_wkt(w, child))?;
                if let Some(pm) = prime_meridian {
                    w.sub(|w| pm.write_wkt(w, child))?;
                }
            }
            CrsRoot::Derived { base, conversion } => {
                if !old {
                    w.sub(|w| base.write_wkt(w, child))?;
                    w.sub(|w| conversion.write_wkt(w, child))?;
                }
            }
            CrsRoot::Projection { base, conversion } => {
                w.sub(|w| base.write_wkt(w, child))?;
                w.sub(|w| conversion.write_wkt(w, child))?;
            }
        }

        if !matches!(self.root, CrsRoot::Compound { .. }) {
            if !old {
                if let Some(cs) = &self.cs {
                    w.sub(|w| cs.write_wkt(w, child))?;
                }
            }
            for axis in self.axes.iter().flatten() {
                w.sub(|w| axis.write_wkt(w, child))?;
            }
            if let Some(unit) = &self.unit {
                w.sub(|w| unit.write_wkt(w, child))?;
            }
            if !old {
                if let Some(scope) = &self.scope {
                    w.sub(|w| scope.write_wkt(w, child))?;
                }
                for extent in &self.extents {
                    w.sub(|w| extent.write_wkt(w, child))?;
                }
            }
        }

        write_ids(w, &self.ids, opts)?;

        if !old {
            if let Some(remark) = &self.remark {
                w.sub(|w| remark.write_wkt(w, child))?;
            }
        }
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render("crs", opts, |w| self.write_wkt(w, opts))
    }
}

// Which unit keywords a CRS kind accepts at its own level, and how the
// generic `UNIT` keyword is typed there.
fn crs_unit_kwd(kind: CrsKind, kwd: &str) -> bool {
    match kind {
        CrsKind::Geodetic | CrsKind::BaseGeodetic | CrsKind::Image => Unit::is_kwd(kwd),
        CrsKind::Projected
        | CrsKind::Vertical
        | CrsKind::Engineering
        | CrsKind::BaseVertical
        | CrsKind::BaseEngineering => Unit::is_kind_kwd(kwd, UnitKind::Length),
        CrsKind::Parametric | CrsKind::BaseParametric => {
            Unit::is_kind_kwd(kwd, UnitKind::Parametric)
        }
        CrsKind::Temporal | CrsKind::BaseTemporal => Unit::is_kind_kwd(kwd, UnitKind::Time),
        CrsKind::Compound | CrsKind::BaseProjected => false,
    }
}

fn parse_crs_unit(kind: CrsKind, t: &Tokens, i: usize, ctx: &mut Ctx) -> Result<Unit> {
    match kind {
        CrsKind::Geodetic | CrsKind::BaseGeodetic | CrsKind::Image => Unit::from_tokens(t, i, ctx),
        CrsKind::Projected
        | CrsKind::Vertical
        | CrsKind::Engineering
        | CrsKind::BaseVertical
        | CrsKind::BaseEngineering => Unit::from_tokens_as(t, i, UnitKind::Length, ctx),
        CrsKind::Parametric | CrsKind::BaseParametric => {
            Unit::from_tokens_as(t, i, UnitKind::Parametric, ctx)
        }
        CrsKind::Temporal | CrsKind::BaseTemporal => {
            Unit::from_tokens_as(t, i, UnitKind::Time, ctx)
        }
        CrsKind::Compound | CrsKind::BaseProjected => Unit::from_tokens(t, i, ctx),
    }
}

// Permitted CS kind / dimension combinations per CRS kind, plus unit
// consistency: the CRS-level unit is the default for axes that omit
// one, and a typed unit must match the kind the CRS/CS combination
// implies. Generic units match anything.
fn validate_cs(
    kind: CrsKind,
    cs: &Cs,
    axes: &[Option<Axis>; 3],
    unit: Option<&Unit>,
    kwd: &str,
) -> Result<()> {
    let cs_kind = cs.kind();
    let dim = cs.dimension();

    let dims_ok: &[i64] = match (kind, cs_kind) {
        (CrsKind::Geodetic, CsKind::Cartesian | CsKind::Spherical) => &[3],
        (CrsKind::Geodetic, CsKind::Ellipsoidal) => &[2, 3],
        (CrsKind::Projected, CsKind::Cartesian) => &[2],
        (CrsKind::Vertical, CsKind::Vertical) => &[1],
        (CrsKind::Engineering, CsKind::Affine | CsKind::Cartesian) => &[2, 3],
        (CrsKind::Engineering, CsKind::Cylindrical | CsKind::Spherical) => &[3],
        (CrsKind::Engineering, CsKind::Linear) => &[1],
        (CrsKind::Engineering, CsKind::Polar) => &[2],
        (CrsKind::Image, CsKind::Affine | CsKind::Cartesian) => &[2],
        (CrsKind::Temporal, CsKind::Temporal) => &[1],
        (CrsKind::Parametric, CsKind::Parametric) => &[1],
        _ => {
            return Err(WktError::with_str(
                ErrorCode::InvalidCsType,
                kwd,
                cs_kind.kwd(),
            ))
        }
    };
    if !dims_ok.contains(&dim) {
        return Err(WktError::with_int(ErrorCode::InvalidDimension, kwd, dim));
    }

    let expected = |slot: usize| -> Option<UnitKind> {
        match (kind, cs_kind) {
            (CrsKind::Projected | CrsKind::Vertical, _) => Some(UnitKind::Length),
            (CrsKind::Parametric, _) => Some(UnitKind::Parametric),
            (CrsKind::Temporal, _) => Some(UnitKind::Time),
            (CrsKind::Geodetic, CsKind::Cartesian) => Some(UnitKind::Length),
            // the third axis of a 3D ellipsoidal system is a height
            (CrsKind::Geodetic, CsKind::Ellipsoidal) => {
                if slot == 2 {
                    Some(UnitKind::Length)
                } else {
                    Some(UnitKind::Angle)
                }
            }
            (CrsKind::Engineering, CsKind::Affine | CsKind::Cartesian | CsKind::Linear) => {
                Some(UnitKind::Length)
            }
            _ => None,
        }
    };

    let unit_ok = |exp: Option<UnitKind>, u: &Unit| -> bool {
        match exp {
            Some(e) => u.kind() == UnitKind::Generic || u.kind() == e,
            None => true,
        }
    };

    if let Some(u) = unit {
        if !unit_ok(expected(0), u) {
            return Err(WktError::with_str(ErrorCode::MismatchedUnits, kwd, u.name()));
        }
    }
    for (slot, axis) in axes.iter().enumerate() {
        if let Some(u) = axis.as_ref().and_then(Axis::unit) {
            if !unit_ok(expected(slot), u) {
                return Err(WktError::with_str(ErrorCode::MismatchedUnits, kwd, u.name()));
            }
        }
    }

    Ok(())
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisDirection;

    const WGS84_2D: &str = concat!(
        r#"GEODCRS["WGS 84",DATUM["World Geodetic System 1984","#,
        r#"ELLIPSOID["WGS 84",6378137,298.257223563]],CS[ellipsoidal,2],"#,
        r#"AXIS["latitude (lat)",north],AXIS["longitude (lon)",east],"#,
        r#"ANGLEUNIT["degree",0.0174532925199433]]"#,
    );

    #[test]
    fn geodetic_roundtrip() {
        let crs = Crs::from_wkt(WGS84_2D).unwrap();
        assert_eq!(crs.kind(), CrsKind::Geodetic);
        assert_eq!(crs.name(), "WGS 84");
        assert_eq!(crs.axis_count(), 2);
        assert_eq!(crs.datum().unwrap().ellipsoid().unwrap().name(), "WGS 84");
        assert_eq!(crs.to_wkt(WktOptions::new()).unwrap(), WGS84_2D);
    }

    #[test]
    fn axis_placement_by_order() {
        let wkt = concat!(
            r#"GEODCRS["X",DATUM["D",ELLIPSOID["E",6378137,298.257223563]],"#,
            r#"CS[ellipsoidal,2],AXIS["(lon)",east,ORDER[2]],AXIS["(lat)",north,ORDER[1]],"#,
            r#"ANGLEUNIT["degree",0.0174532925199433]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        assert_eq!(crs.axis(0).unwrap().direction(), AxisDirection::North);
        assert_eq!(crs.axis(1).unwrap().direction(), AxisDirection::East);
        // emission lists slots in order
        let out = crs.to_wkt(WktOptions::new()).unwrap();
        let lat = out.find("(lat)").unwrap();
        let lon = out.find("(lon)").unwrap();
        assert!(lat < lon);
    }

    #[test]
    fn colliding_orders_rejected() {
        let wkt = concat!(
            r#"GEODCRS["X",DATUM["D",ELLIPSOID["E",6378137,298.257223563]],"#,
            r#"CS[ellipsoidal,2],AXIS["(lon)",east,ORDER[1]],AXIS["(lat)",north,ORDER[1]]]"#,
        );
        let err = Crs::from_wkt(wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AxisAlreadyUsed);
    }

    #[test]
    fn projected_roundtrip() {
        let wkt = concat!(
            r#"PROJCRS["WGS 84 / UTM zone 31N","#,
            r#"BASEGEODCRS["WGS 84",DATUM["World Geodetic System 1984","#,
            r#"ELLIPSOID["WGS 84",6378137,298.257223563]]],"#,
            r#"CONVERSION["UTM zone 31N",METHOD["Transverse Mercator",ID["EPSG","9807"]],"#,
            r#"PARAMETER["Latitude of natural origin",0],"#,
            r#"PARAMETER["Longitude of natural origin",3],"#,
            r#"PARAMETER["Scale factor at natural origin",0.9996],"#,
            r#"PARAMETER["False easting",500000],PARAMETER["False northing",0]],"#,
            r#"CS[Cartesian,2],AXIS["(E)",east,ORDER[1]],AXIS["(N)",north,ORDER[2]],"#,
            r#"LENGTHUNIT["metre",1],ID["EPSG","32631"]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        assert_eq!(crs.kind(), CrsKind::Projected);
        assert_eq!(crs.base_crs().unwrap().kind(), CrsKind::BaseGeodetic);
        assert_eq!(crs.to_wkt(WktOptions::new()).unwrap(), wkt);
    }

    #[test]
    fn projected_requires_conversion() {
        let wkt = concat!(
            r#"PROJCRS["x",BASEGEODCRS["b",DATUM["D",ELLIPSOID["E",6378137,298.3]]],"#,
            r#"CS[Cartesian,2]]"#,
        );
        let err = Crs::from_wkt(wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingConversion);
    }

    #[test]
    fn vertical_derived_branch() {
        let wkt = concat!(
            r#"VERTCRS["EGM2008 geoid height","#,
            r#"BASEVERTCRS["EGM2008 geoid",VDATUM["EGM2008 geoid"]],"#,
            r#"DERIVINGCONVERSION["vertical offset",METHOD["Vertical Offset"],"#,
            r#"PARAMETER["Vertical Offset",0.015]],"#,
            r#"CS[vertical,1],AXIS["gravity-related height (H)",up],LENGTHUNIT["metre",1]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        assert_eq!(crs.kind(), CrsKind::Vertical);
        assert!(matches!(crs.root(), CrsRoot::Derived { .. }));
        assert_eq!(crs.to_wkt(WktOptions::new()).unwrap(), wkt);
    }

    #[test]
    fn cs_table_enforced() {
        // vertical CRS with an ellipsoidal CS
        let wkt = r#"VERTCRS["x",VDATUM["d"],CS[ellipsoidal,2],AXIS["h",up]]"#;
        let err = Crs::from_wkt(wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCsType);

        // geodetic Cartesian must be 3D
        let wkt = r#"GEODCRS["x",DATUM["d",ELLIPSOID["e",6378137,298.3]],CS[Cartesian,2]]"#;
        let err = Crs::from_wkt(wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidDimension);
    }

    #[test]
    fn mismatched_units_rejected() {
        let wkt = concat!(
            r#"VERTCRS["x",VDATUM["d"],CS[vertical,1],"#,
            r#"AXIS["h",up,ANGLEUNIT["degree",0.017]]]"#,
        );
        let err = Crs::from_wkt(wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MismatchedUnits);
    }

    #[test]
    fn missing_cs_rejected() {
        let err = Crs::from_wkt(r#"VERTCRS["x",VDATUM["d"]]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingCs);
    }

    #[test]
    fn wkt1_geogcs() {
        let wkt = concat!(
            r#"GEOGCS["NAD83",DATUM["North_American_Datum_1983","#,
            r#"SPHEROID["GRS 1980",6378137,298.257222101]],"#,
            r#"PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],"#,
            r#"AUTHORITY["EPSG","4269"]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        assert_eq!(crs.kind(), CrsKind::Geodetic);
        assert_eq!(crs.cs().unwrap().kind(), CsKind::Ellipsoidal);
        assert_eq!(crs.cs().unwrap().dimension(), 2);
        assert_eq!(crs.ids().get(0).unwrap().code(), "4269");
        // emitted back in the legacy layout; the code becomes a bare
        // integer
        assert_eq!(
            crs.to_wkt(WktOptions::new().old_syntax()).unwrap(),
            concat!(
                r#"GEOGCS["NAD83",DATUM["North_American_Datum_1983","#,
                r#"SPHEROID["GRS 1980",6378137,298.257222101]],"#,
                r#"PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],"#,
                r#"AUTHORITY["EPSG",4269]]"#,
            )
        );
    }

    #[test]
    fn wkt1_projcs() {
        let wkt = concat!(
            r#"PROJCS["NAD83 / Massachusetts Mainland",GEOGCS["NAD83","#,
            r#"DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101]],"#,
            r#"PRIMEM["Greenwich",0],UNIT["degree",0.01745329251994328]],"#,
            r#"PROJECTION["Lambert_Conformal_Conic_2SP"],"#,
            r#"PARAMETER["standard_parallel_1",42.68333333333333],"#,
            r#"PARAMETER["central_meridian",-71.5],"#,
            r#"UNIT["metre",1],AXIS["X",EAST],AXIS["Y",NORTH],AUTHORITY["EPSG","26986"]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        assert_eq!(crs.kind(), CrsKind::Projected);
        let base = crs.base_crs().unwrap();
        assert_eq!(base.kind(), CrsKind::BaseGeodetic);
        assert_eq!(base.datum().unwrap().ellipsoid().unwrap().name(), "GRS 1980");
        match crs.root() {
            CrsRoot::Projection { conversion, .. } => {
                assert_eq!(conversion.method().name(), "Lambert_Conformal_Conic_2SP");
                assert_eq!(conversion.parameters().len(), 2);
            }
            _ => panic!("expected projection root"),
        }
        assert_eq!(crs.axis(0).unwrap().direction(), AxisDirection::East);
    }

    #[test]
    fn wkt1_vert_cs() {
        let wkt = concat!(
            r#"VERT_CS["Newlyn",VERT_DATUM["Ordnance Datum Newlyn",2005],"#,
            r#"UNIT["metre",1],AXIS["Up",UP],AUTHORITY["EPSG","5701"]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        assert_eq!(crs.kind(), CrsKind::Vertical);
        assert_eq!(crs.cs().unwrap().kind(), CsKind::Vertical);
        assert_eq!(crs.datum().unwrap().kind(), DatumKind::Vertical);
    }

    #[test]
    fn compound_roundtrip() {
        let wkt = concat!(
            r#"COMPOUNDCRS["NAD83 + NAVD88","#,
            r#"GEODCRS["NAD83",DATUM["North American Datum 1983","#,
            r#"ELLIPSOID["GRS 1980",6378137,298.257222101]],CS[ellipsoidal,2],"#,
            r#"AXIS["latitude",north],AXIS["longitude",east],"#,
            r#"ANGLEUNIT["degree",0.0174532925199433]],"#,
            r#"VERTCRS["NAVD88",VDATUM["North American Vertical Datum 1988"],"#,
            r#"CS[vertical,1],AXIS["gravity-related height (H)",up],LENGTHUNIT["metre",1]]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        assert_eq!(crs.kind(), CrsKind::Compound);
        assert_eq!(crs.to_wkt(WktOptions::new()).unwrap(), wkt);
    }

    #[test]
    fn compound_member_kinds_checked() {
        let vert = r#"VERTCRS["v",VDATUM["d"],CS[vertical,1],AXIS["h",up]]"#;
        let wkt = format!(r#"COMPOUNDCRS["x",{vert},{vert}]"#);
        let err = Crs::from_wkt(&wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidFirstCrs);
    }

    #[test]
    fn compound_rejects_fourth_member() {
        let geod = concat!(
            r#"GEODCRS["g",DATUM["d",ELLIPSOID["e",6378137,298.3]],CS[ellipsoidal,2],"#,
            r#"AXIS["latitude",north],AXIS["longitude",east]]"#,
        );
        let vert = r#"VERTCRS["v",VDATUM["d"],CS[vertical,1],AXIS["h",up]]"#;
        let time = concat!(
            r#"TIMECRS["t",TDATUM["origin"],CS[temporal,1],AXIS["time",future],"#,
            r#"TIMEUNIT["day",86400]]"#,
        );
        let wkt = format!(r#"COMPOUNDCRS["x",{geod},{vert},{time},{time}]"#);
        let err = Crs::from_wkt(&wkt).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateThirdCrs);
    }

    #[test]
    fn old_syntax_suppresses_modern_children() {
        let wkt = concat!(
            r#"VERTCRS["Newlyn",VDATUM["Ordnance Datum Newlyn"],CS[vertical,1],"#,
            r#"AXIS["gravity-related height (H)",up],LENGTHUNIT["metre",1],"#,
            r#"SCOPE["Geodesy."],AREA["UK mainland"],ID["EPSG","5701"],REMARK["note"]]"#,
        );
        let crs = Crs::from_wkt(wkt).unwrap();
        let old = crs.to_wkt(WktOptions::new().old_syntax()).unwrap();
        assert_eq!(
            old,
            concat!(
                r#"VERT_CS["Newlyn",VERT_DATUM["Ordnance Datum Newlyn"],"#,
                r#"AXIS["gravity-related height (H)",up],"#,
                r#"UNIT["metre",1],AUTHORITY["EPSG",5701]]"#,
            )
        );
    }

    #[test]
    fn compute_eq_ignores_bookkeeping() {
        let a = Crs::from_wkt(WGS84_2D).unwrap();
        let with_meta = format!(
            "{},{}",
            &WGS84_2D[..WGS84_2D.len() - 1],
            r#"SCOPE["Horizontal component of 3D system."],ID["EPSG","4326"]]"#
        );
        let b = Crs::from_wkt(&with_meta).unwrap();
        assert!(a.compute_eq(&b));
        assert_ne!(a, b);
    }
}
