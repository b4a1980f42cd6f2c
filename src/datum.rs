//!
//! Datum family and prime meridian
//!
//! One datum object covers the six datum kinds. A geodetic datum adds
//! the required ellipsoid, an image datum the pixel-in-cell convention,
//! a temporal datum its origin instant; every kind may carry an anchor.
//!
use crate::consts::NAME_MAX;
use crate::ellipsoid::Ellipsoid;
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::leaf::{Anchor, TimeOrigin};
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::unit::{Unit, UnitKind};
use crate::util;

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DatumKind {
    Geodetic,
    Engineering,
    Image,
    Parametric,
    Temporal,
    Vertical,
}

impl DatumKind {
    /// Primary (modern) keyword.
    pub fn kwd(&self) -> &'static str {
        match self {
            DatumKind::Geodetic => "DATUM",
            DatumKind::Engineering => "EDATUM",
            DatumKind::Image => "IDATUM",
            DatumKind::Parametric => "PDATUM",
            DatumKind::Temporal => "TDATUM",
            DatumKind::Vertical => "VDATUM",
        }
    }

    /// Spelled-out alternate keyword.
    pub fn alt_kwd(&self) -> &'static str {
        match self {
            DatumKind::Geodetic => "GEODETICDATUM",
            DatumKind::Engineering => "ENGINEERINGDATUM",
            DatumKind::Image => "IMAGEDATUM",
            DatumKind::Parametric => "PARAMETRICDATUM",
            DatumKind::Temporal => "TIMEDATUM",
            DatumKind::Vertical => "VERTICALDATUM",
        }
    }

    /// Legacy (WKT1) keyword where one exists.
    pub fn old_kwd(&self) -> Option<&'static str> {
        match self {
            DatumKind::Geodetic => Some("DATUM"),
            DatumKind::Engineering => Some("LOCAL_DATUM"),
            DatumKind::Vertical => Some("VERT_DATUM"),
            _ => None,
        }
    }

    fn matches(&self, kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(self.kwd())
            || kwd.eq_ignore_ascii_case(self.alt_kwd())
            || self
                .old_kwd()
                .map(|old| kwd.eq_ignore_ascii_case(old))
                .unwrap_or(false)
    }
}

/// Whether integer image coordinates name the center or a corner of
/// each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelInCell {
    Center,
    Corner,
}

impl PixelInCell {
    pub fn kwd(&self) -> &'static str {
        match self {
            PixelInCell::Center => "center",
            PixelInCell::Corner => "corner",
        }
    }

    pub fn from_kwd(kwd: &str) -> Option<PixelInCell> {
        if kwd.eq_ignore_ascii_case("center") || kwd.eq_ignore_ascii_case("centre") {
            Some(PixelInCell::Center)
        } else if kwd.eq_ignore_ascii_case("corner") {
            Some(PixelInCell::Corner)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    name: String,
    kind: DatumKind,
    anchor: Option<Anchor>,
    ellipsoid: Option<Box<Ellipsoid>>,
    pixel_in_cell: Option<PixelInCell>,
    time_origin: Option<TimeOrigin>,
    ids: SetOf<Id>,
    visible: bool,
}

impl Datum {
    /// Any datum keyword, of any kind or channel.
    pub(crate) fn is_kwd(kwd: &str) -> bool {
        Self::kind_of_kwd(kwd).is_some()
    }

    pub(crate) fn kind_of_kwd(kwd: &str) -> Option<DatumKind> {
        [
            DatumKind::Geodetic,
            DatumKind::Engineering,
            DatumKind::Image,
            DatumKind::Parametric,
            DatumKind::Temporal,
            DatumKind::Vertical,
        ]
        .into_iter()
        .find(|k| k.matches(kwd))
    }

    pub(crate) fn is_kind_kwd(kwd: &str, kind: DatumKind) -> bool {
        kind.matches(kwd)
    }

    fn build(
        kind: DatumKind,
        name: &str,
        anchor: Option<Anchor>,
        ellipsoid: Option<Ellipsoid>,
        pixel_in_cell: Option<PixelInCell>,
        time_origin: Option<TimeOrigin>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                kind.kwd(),
                name.len() as i64,
            ));
        }
        if kind == DatumKind::Geodetic && ellipsoid.is_none() {
            return Err(WktError::new(ErrorCode::MissingEllipsoid, kind.kwd()));
        }
        Ok(Self {
            name: name.to_string(),
            kind,
            anchor,
            ellipsoid: ellipsoid.map(Box::new),
            pixel_in_cell,
            time_origin,
            ids,
            visible: true,
        })
    }

    pub fn geodetic(
        name: &str,
        ellipsoid: Ellipsoid,
        anchor: Option<Anchor>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        Self::build(
            DatumKind::Geodetic,
            name,
            anchor,
            Some(ellipsoid),
            None,
            None,
            ids,
        )
    }

    pub fn engineering(name: &str, anchor: Option<Anchor>, ids: SetOf<Id>) -> Result<Self> {
        Self::build(DatumKind::Engineering, name, anchor, None, None, None, ids)
    }

    pub fn image(
        name: &str,
        pixel_in_cell: PixelInCell,
        anchor: Option<Anchor>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        Self::build(
            DatumKind::Image,
            name,
            anchor,
            None,
            Some(pixel_in_cell),
            None,
            ids,
        )
    }

    pub fn parametric(name: &str, anchor: Option<Anchor>, ids: SetOf<Id>) -> Result<Self> {
        Self::build(DatumKind::Parametric, name, anchor, None, None, None, ids)
    }

    pub fn temporal(
        name: &str,
        time_origin: Option<TimeOrigin>,
        anchor: Option<Anchor>,
        ids: SetOf<Id>,
    ) -> Result<Self> {
        Self::build(
            DatumKind::Temporal,
            name,
            anchor,
            None,
            None,
            time_origin,
            ids,
        )
    }

    pub fn vertical(name: &str, anchor: Option<Anchor>, ids: SetOf<Id>) -> Result<Self> {
        Self::build(DatumKind::Vertical, name, anchor, None, None, None, ids)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DatumKind {
        self.kind
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn ellipsoid(&self) -> Option<&Ellipsoid> {
        self.ellipsoid.as_deref()
    }

    pub fn pixel_in_cell(&self) -> Option<PixelInCell> {
        self.pixel_in_cell
    }

    pub fn time_origin(&self) -> Option<&TimeOrigin> {
        self.time_origin.as_ref()
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
        self.kind == other.kind
            && self.name == other.name
            && self.pixel_in_cell == other.pixel_in_cell
            && match (&self.ellipsoid, &other.ellipsoid) {
                (None, None) => true,
                (Some(a), Some(b)) => a.compute_eq(b),
                _ => false,
            }
            && match (&self.time_origin, &other.time_origin) {
                (None, None) => true,
                (Some(a), Some(b)) => a.compute_eq(b),
                _ => false,
            }
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        match Self::kind_of_kwd(kwd) {
            Some(kind) => Self::parse(t, start, kind, ctx),
            None => Err(ctx.err_str(ErrorCode::InvalidKeyword, "datum", kwd)),
        }
    }

    pub(crate) fn parse(
        t: &Tokens,
        start: usize,
        kind: DatumKind,
        ctx: &mut Ctx,
    ) -> Result<Self> {
        let kwd = kind.kwd();
        let is_legacy = kind
            .old_kwd()
            .map(|old| t.text(start).eq_ignore_ascii_case(old) && old != kind.kwd())
            .unwrap_or(false);

        // legacy vertical/local datums carry a numeric type code after
        // the name; it is accepted and discarded
        let (min, max) = match kind {
            DatumKind::Image => (2, 2),
            _ if is_legacy => (1, 2),
            _ => (1, 1),
        };
        let span = t.span(start, kwd, min, max, ctx)?;

        let name = util::unescape(t.text(start + 1));
        let pixel_in_cell = if kind == DatumKind::Image {
            let pix = t.text(start + 2);
            match PixelInCell::from_kwd(pix) {
                Some(p) => Some(p),
                None => return Err(ctx.err_str(ErrorCode::InvalidPixelType, kwd, pix)),
            }
        } else {
            None
        };

        let mut anchor: Option<Anchor> = None;
        let mut ellipsoid: Option<Ellipsoid> = None;
        let mut time_origin: Option<TimeOrigin> = None;
        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);
            if kind == DatumKind::Geodetic && Ellipsoid::is_kwd(sub) {
                if ellipsoid.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateEllipsoid, kwd));
                } else {
                    match Ellipsoid::from_tokens(t, i, ctx) {
                        Ok(e) => ellipsoid = Some(e),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if kind == DatumKind::Temporal && TimeOrigin::is_kwd(sub) {
                if time_origin.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateTimeOrigin, kwd));
                } else {
                    match TimeOrigin::from_tokens(t, i, ctx) {
                        Ok(o) => time_origin = Some(o),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Anchor::is_kwd(sub) {
                if anchor.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateAnchor, kwd));
                } else {
                    match Anchor::from_tokens(t, i, ctx) {
                        Ok(a) => anchor = Some(a),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Id::is_kwd(sub) {
                collect_id(t, i, &mut ids, kwd, &mut bad, ctx);
            }
            // anything else (TOWGS84 for instance) is skipped
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        Self::build(kind, &name, anchor, ellipsoid, pixel_in_cell, time_origin, ids)
            .map_err(|e| ctx.report(e))
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, "datum", |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let child = opts.for_children();
        let kwd = if opts.old_syntax {
            self.kind.old_kwd().unwrap_or_else(|| self.kind.kwd())
        } else {
            self.kind.kwd()
        };
        w.push_str(kwd)?;
        w.push(opts.open())?;
        w.quoted(&self.name)?;
        if let Some(pixel) = self.pixel_in_cell {
            w.push(',')?;
            w.push_str(pixel.kwd())?;
        }
        if let Some(ellipsoid) = &self.ellipsoid {
            w.sub(|w| ellipsoid.write_wkt(w, child))?;
        }
        if !opts.old_syntax {
            if let Some(origin) = &self.time_origin {
                w.sub(|w| origin.write_wkt(w, child))?;
            }
            if let Some(anchor) = &self.anchor {
                w.sub(|w| anchor.write_wkt(w, child))?;
            }
        }
        write_ids(w, &self.ids, opts)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render("datum", opts, |w| self.write_wkt(w, opts))
    }
}

/// Prime meridian, `PRIMEM["Greenwich",0]` with an optional angle unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimeMeridian {
    name: String,
    longitude: f64,
    unit: Option<Unit>,
    ids: SetOf<Id>,
    visible: bool,
}

impl PrimeMeridian {
    pub const KWD: &'static str = "PRIMEM";
    pub const ALT_KWD: &'static str = "PRIMEMERIDIAN";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD) || kwd.eq_ignore_ascii_case(Self::ALT_KWD)
    }

    pub fn new(name: &str, longitude: f64, unit: Option<Unit>, ids: SetOf<Id>) -> Result<Self> {
        if name.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::NameTooLong,
                Self::KWD,
                name.len() as i64,
            ));
        }
        if !(-360.0..=360.0).contains(&longitude) {
            return Err(WktError::with_double(
                ErrorCode::InvalidLongitude,
                Self::KWD,
                longitude,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            longitude,
            unit,
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
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
            && util::eq(self.longitude, other.longitude)
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
        let longitude = match util::parse_double(t.text(start + 2)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(ErrorCode::InvalidLongitude, Self::KWD, t.text(start + 2)))
            }
        };

        let mut unit: Option<Unit> = None;
        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);
            if Unit::is_kind_kwd(sub, UnitKind::Angle) {
                if unit.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateUnit, Self::KWD));
                } else {
                    match Unit::from_tokens_as(t, i, UnitKind::Angle, ctx) {
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
        Self::new(&name, longitude, unit, ids).map_err(|e| ctx.report(e))
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
        w.number(self.longitude)?;
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
