//!
//! Usage extents
//!
//! Area description, geographic bounding box, vertical range and time
//! range. A CRS or operation owns at most one extent of each kind.
//!
use crate::consts::{TEXT_MAX, TIME_MAX};
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::setof::NaturalKey;
use crate::token::{parse_object, Tokens};
use crate::unit::{Unit, UnitKind};
use crate::util;

/// Area description extent, `AREA["..."]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaExtent {
    text: String,
    visible: bool,
}

impl AreaExtent {
    pub const KWD: &'static str = "AREA";

    pub fn new(text: &str) -> Result<Self> {
        if text.len() >= TEXT_MAX {
            return Err(WktError::with_int(
                ErrorCode::TextTooLong,
                Self::KWD,
                text.len() as i64,
            ));
        }
        Ok(Self {
            text: text.to_string(),
            visible: true,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        t.span(start, Self::KWD, 1, 1, ctx)?;
        let text = util::unescape(t.text(start + 1));
        Self::new(&text).map_err(|e| ctx.report(e))
    }

    fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        w.push_str(Self::KWD)?;
        w.push(opts.open())?;
        w.quoted(&self.text)?;
        w.push(opts.close())
    }
}

/// Geographic bounding box, `BBOX[ll_lat,ll_lon,ur_lat,ur_lon]`, in
/// decimal degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct BboxExtent {
    ll_lat: f64,
    ll_lon: f64,
    ur_lat: f64,
    ur_lon: f64,
    visible: bool,
}

impl BboxExtent {
    pub const KWD: &'static str = "BBOX";

    pub fn new(ll_lat: f64, ll_lon: f64, ur_lat: f64, ur_lon: f64) -> Result<Self> {
        for lat in [ll_lat, ur_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(WktError::with_double(
                    ErrorCode::InvalidLatitude,
                    Self::KWD,
                    lat,
                ));
            }
        }
        for lon in [ll_lon, ur_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(WktError::with_double(
                    ErrorCode::InvalidLongitude,
                    Self::KWD,
                    lon,
                ));
            }
        }
        Ok(Self {
            ll_lat,
            ll_lon,
            ur_lat,
            ur_lon,
            visible: true,
        })
    }

    pub fn ll_lat(&self) -> f64 {
        self.ll_lat
    }

    pub fn ll_lon(&self) -> f64 {
        self.ll_lon
    }

    pub fn ur_lat(&self) -> f64 {
        self.ur_lat
    }

    pub fn ur_lon(&self) -> f64 {
        self.ur_lon
    }

    fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        t.span(start, Self::KWD, 4, 4, ctx)?;
        let mut vals = [0.0f64; 4];
        for (n, val) in vals.iter_mut().enumerate() {
            let s = t.text(start + 1 + n);
            *val = match util::parse_double(s) {
                Some(d) => d,
                None => {
                    let code = if n % 2 == 0 {
                        ErrorCode::InvalidLatitude
                    } else {
                        ErrorCode::InvalidLongitude
                    };
                    return Err(ctx.err_str(code, Self::KWD, s));
                }
            };
        }
        Self::new(vals[0], vals[1], vals[2], vals[3]).map_err(|e| ctx.report(e))
    }

    fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        w.push_str(Self::KWD)?;
        w.push(opts.open())?;
        w.number(self.ll_lat)?;
        w.push(',')?;
        w.number(self.ll_lon)?;
        w.push(',')?;
        w.number(self.ur_lat)?;
        w.push(',')?;
        w.number(self.ur_lon)?;
        w.push(opts.close())
    }
}

/// Vertical range, `VERTICALEXTENT[min,max]` with an optional length
/// unit.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalExtent {
    min_height: f64,
    max_height: f64,
    unit: Option<Unit>,
    visible: bool,
}

impl VerticalExtent {
    pub const KWD: &'static str = "VERTICALEXTENT";

    pub fn new(min_height: f64, max_height: f64, unit: Option<Unit>) -> Result<Self> {
        Ok(Self {
            min_height,
            max_height,
            unit,
            visible: true,
        })
    }

    pub fn min_height(&self) -> f64 {
        self.min_height
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let span = t.span(start, Self::KWD, 2, 2, ctx)?;

        let mut vals = [0.0f64; 2];
        for (n, val) in vals.iter_mut().enumerate() {
            let s = t.text(start + 1 + n);
            *val = match util::parse_double(s) {
                Some(d) => d,
                None => return Err(ctx.err_str(ErrorCode::InvalidSyntax, Self::KWD, s)),
            };
        }

        let mut unit: Option<Unit> = None;
        let mut bad: Option<WktError> = None;
        let mut i = start + 1 + span.args;
        while i < span.end {
            let next = t.end_of(i);
            if Unit::is_kind_kwd(t.text(i), UnitKind::Length) {
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
            }
            i = next;
        }

        if let Some(e) = bad {
            return Err(e);
        }
        Self::new(vals[0], vals[1], unit).map_err(|e| ctx.report(e))
    }

    fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        w.push_str(Self::KWD)?;
        w.push(opts.open())?;
        w.number(self.min_height)?;
        w.push(',')?;
        w.number(self.max_height)?;
        if let Some(unit) = &self.unit {
            w.sub(|w| unit.write_wkt(w, opts.for_children()))?;
        }
        w.push(opts.close())
    }
}

/// Time range, `TIMEEXTENT[start,end]`. The bounds are kept as the
/// source text; this library does not interpret date-time strings.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeExtent {
    start: String,
    end: String,
    visible: bool,
}

impl TimeExtent {
    pub const KWD: &'static str = "TIMEEXTENT";

    pub fn new(start: &str, end: &str) -> Result<Self> {
        for s in [start, end] {
            if s.len() >= TIME_MAX {
                return Err(WktError::with_int(
                    ErrorCode::TimeTooLong,
                    Self::KWD,
                    s.len() as i64,
                ));
            }
        }
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
            visible: true,
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        t.span(start, Self::KWD, 2, 2, ctx)?;
        let begin = util::unescape(t.text(start + 1));
        let end = util::unescape(t.text(start + 2));
        Self::new(&begin, &end).map_err(|e| ctx.report(e))
    }

    fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        w.push_str(Self::KWD)?;
        w.push(opts.open())?;
        w.quoted(&self.start)?;
        w.push(',')?;
        w.quoted(&self.end)?;
        w.push(opts.close())
    }
}

/// Any of the four extent kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Extent {
    Area(AreaExtent),
    Bbox(BboxExtent),
    Vertical(VerticalExtent),
    Time(TimeExtent),
}

impl Extent {
    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(AreaExtent::KWD)
            || kwd.eq_ignore_ascii_case(BboxExtent::KWD)
            || kwd.eq_ignore_ascii_case(VerticalExtent::KWD)
            || kwd.eq_ignore_ascii_case(TimeExtent::KWD)
    }

    pub fn kwd(&self) -> &'static str {
        match self {
            Extent::Area(_) => AreaExtent::KWD,
            Extent::Bbox(_) => BboxExtent::KWD,
            Extent::Vertical(_) => VerticalExtent::KWD,
            Extent::Time(_) => TimeExtent::KWD,
        }
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if kwd.eq_ignore_ascii_case(AreaExtent::KWD) {
            AreaExtent::from_tokens(t, start, ctx).map(Extent::Area)
        } else if kwd.eq_ignore_ascii_case(BboxExtent::KWD) {
            BboxExtent::from_tokens(t, start, ctx).map(Extent::Bbox)
        } else if kwd.eq_ignore_ascii_case(VerticalExtent::KWD) {
            VerticalExtent::from_tokens(t, start, ctx).map(Extent::Vertical)
        } else if kwd.eq_ignore_ascii_case(TimeExtent::KWD) {
            TimeExtent::from_tokens(t, start, ctx).map(Extent::Time)
        } else {
            Err(ctx.err_str(ErrorCode::InvalidKeyword, "extent", kwd))
        }
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, "extent", |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Extent::Area(x) => x.visible,
            Extent::Bbox(x) => x.visible,
            Extent::Vertical(x) => x.visible,
            Extent::Time(x) => x.visible,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Extent::Area(x) => x.visible = visible,
            Extent::Bbox(x) => x.visible = visible,
            Extent::Vertical(x) => x.visible = visible,
            Extent::Time(x) => x.visible = visible,
        }
    }

    pub fn compute_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Extent::Area(a), Extent::Area(b)) => a.text == b.text,
            (Extent::Bbox(a), Extent::Bbox(b)) => {
                util::eq(a.ll_lat, b.ll_lat)
                    && util::eq(a.ll_lon, b.ll_lon)
                    && util::eq(a.ur_lat, b.ur_lat)
                    && util::eq(a.ur_lon, b.ur_lon)
            }
            (Extent::Vertical(a), Extent::Vertical(b)) => {
                util::eq(a.min_height, b.min_height)
                    && util::eq(a.max_height, b.max_height)
                    && match (&a.unit, &b.unit) {
                        (None, None) => true,
                        (Some(x), Some(y)) => x.compute_eq(y),
                        _ => false,
                    }
            }
            (Extent::Time(a), Extent::Time(b)) => a.start == b.start && a.end == b.end,
            _ => false,
        }
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        if !self.is_visible() {
            return Ok(());
        }
        match self {
            Extent::Area(x) => x.write_wkt(w, opts),
            Extent::Bbox(x) => x.write_wkt(w, opts),
            Extent::Vertical(x) => x.write_wkt(w, opts),
            Extent::Time(x) => x.write_wkt(w, opts),
        }
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render("extent", opts, |w| self.write_wkt(w, opts))
    }
}

impl NaturalKey for Extent {
    /// One extent of each kind per collection.
    fn same_key(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_roundtrip() {
        let e = Extent::from_wkt(r#"AREA["Finland onshore"]"#).unwrap();
        assert_eq!(
            e.to_wkt(WktOptions::new()).unwrap(),
            r#"AREA["Finland onshore"]"#
        );
    }

    #[test]
    fn bbox_validation() {
        let e = Extent::from_wkt("BBOX[51.3,-10.9,61.3,2.9]").unwrap();
        assert_eq!(e.to_wkt(WktOptions::new()).unwrap(), "BBOX[51.3,-10.9,61.3,2.9]");

        let err = Extent::from_wkt("BBOX[91,0,10,10]").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLatitude);
        let err = Extent::from_wkt("BBOX[10,-190,20,10]").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLongitude);
        let err = Extent::from_wkt("BBOX[10,0,20]").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientTokens);
    }

    #[test]
    fn vertical_with_unit() {
        let e = Extent::from_wkt(r#"VERTICALEXTENT[-1000,0,LENGTHUNIT["metre",1]]"#).unwrap();
        assert_eq!(
            e.to_wkt(WktOptions::new()).unwrap(),
            r#"VERTICALEXTENT[-1000,0,LENGTHUNIT["metre",1]]"#
        );
        // generic UNIT is adopted as a length unit here
        let e = Extent::from_wkt(r#"VERTICALEXTENT[-1000,0,UNIT["metre",1]]"#).unwrap();
        assert_eq!(
            e.to_wkt(WktOptions::new()).unwrap(),
            r#"VERTICALEXTENT[-1000,0,LENGTHUNIT["metre",1]]"#
        );
    }

    #[test]
    fn time_extent() {
        let e = Extent::from_wkt(r#"TIMEEXTENT["2013-01-01","2013-12-31"]"#).unwrap();
        assert_eq!(
            e.to_wkt(WktOptions::new()).unwrap(),
            r#"TIMEEXTENT["2013-01-01","2013-12-31"]"#
        );
    }

    #[test]
    fn dedup_by_kind() {
        use crate::setof::SetOf;
        let mut extents: SetOf<Extent> = SetOf::new();
        extents
            .push_unique(Extent::from_wkt(r#"AREA["a"]"#).unwrap())
            .unwrap();
        extents
            .push_unique(Extent::from_wkt("BBOX[0,0,1,1]").unwrap())
            .unwrap();
        assert!(extents
            .push_unique(Extent::from_wkt(r#"AREA["b"]"#).unwrap())
            .is_err());
    }
}
