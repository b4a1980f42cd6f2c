//!
//! Top-level object universe
//!
//! [`WktObject`] is the sum of every concrete WKT object; [`ObjKind`]
//! is its authoritative variant tag, one value per concrete kind. The
//! top-level dispatcher routes an opening keyword to the matching
//! constructor; callers discriminate the result via the tag.
//!
use crate::axis::{Axis, Bearing, Meridian, Order};
use crate::conversion::{Conversion, DerivingConversion, Method};
use crate::crs::{Crs, CrsKind};
use crate::cs::Cs;
use crate::datum::{Datum, DatumKind, PrimeMeridian};
use crate::ellipsoid::Ellipsoid;
use crate::errors::{Ctx, ErrorCode, Result};
use crate::extent::Extent;
use crate::format::{render, WktOptions, WktWriter};
use crate::id::Id;
use crate::leaf::{Anchor, Citation, Remark, Scope, TimeOrigin, Uri};
use crate::operation::{AbridgedTransformation, BoundCrs, CoordinateOperation};
use crate::param::{OperationAccuracy, Parameter, ParameterFile};
use crate::token::{parse_object, Tokens};
use crate::unit::{Unit, UnitKind};

/// Variant tag of the object universe.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ObjKind {
    Citation,
    Uri,
    Id,
    Unit,
    AngleUnit,
    LengthUnit,
    ScaleUnit,
    TimeUnit,
    ParametricUnit,
    Scope,
    AreaExtent,
    BboxExtent,
    VerticalExtent,
    TimeExtent,
    Remark,
    Parameter,
    ParameterFile,
    Ellipsoid,
    Anchor,
    TimeOrigin,
    GeodeticDatum,
    EngineeringDatum,
    ImageDatum,
    ParametricDatum,
    TemporalDatum,
    VerticalDatum,
    PrimeMeridian,
    Order,
    Meridian,
    Bearing,
    Axis,
    Cs,
    Conversion,
    DerivingConversion,
    Method,
    GeodeticCrs,
    ProjectedCrs,
    VerticalCrs,
    EngineeringCrs,
    ImageCrs,
    ParametricCrs,
    TemporalCrs,
    CompoundCrs,
    BaseGeodeticCrs,
    BaseProjectedCrs,
    BaseVerticalCrs,
    BaseEngineeringCrs,
    BaseParametricCrs,
    BaseTemporalCrs,
    OperationAccuracy,
    CoordinateOperation,
    BoundCrs,
    AbridgedTransformation,
}

/// Any parsed WKT object.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum WktObject {
    Citation(Citation),
    Uri(Uri),
    Id(Id),
    Unit(Unit),
    Scope(Scope),
    Extent(Extent),
    Remark(Remark),
    Parameter(Parameter),
    ParameterFile(ParameterFile),
    Ellipsoid(Ellipsoid),
    Anchor(Anchor),
    TimeOrigin(TimeOrigin),
    Datum(Datum),
    PrimeMeridian(PrimeMeridian),
    Order(Order),
    Meridian(Meridian),
    Bearing(Bearing),
    Axis(Axis),
    Cs(Cs),
    Conversion(Conversion),
    DerivingConversion(DerivingConversion),
    Method(Method),
    Crs(Crs),
    OperationAccuracy(OperationAccuracy),
    CoordinateOperation(CoordinateOperation),
    BoundCrs(BoundCrs),
    AbridgedTransformation(AbridgedTransformation),
}

impl WktObject {
    /// The authoritative variant tag.
    pub fn kind(&self) -> ObjKind {
        match self {
            WktObject::Citation(_) => ObjKind::Citation,
            WktObject::Uri(_) => ObjKind::Uri,
            WktObject::Id(_) => ObjKind::Id,
            WktObject::Unit(u) => match u.kind() {
                UnitKind::Angle => ObjKind::AngleUnit,
                UnitKind::Length => ObjKind::LengthUnit,
                UnitKind::Scale => ObjKind::ScaleUnit,
                UnitKind::Time => ObjKind::TimeUnit,
                UnitKind::Parametric => ObjKind::ParametricUnit,
                UnitKind::Generic => ObjKind::Unit,
            },
            WktObject::Scope(_) => ObjKind::Scope,
            WktObject::Extent(e) => match e {
                Extent::Area(_) => ObjKind::AreaExtent,
                Extent::Bbox(_) => ObjKind::BboxExtent,
                Extent::Vertical(_) => ObjKind::VerticalExtent,
                Extent::Time(_) => ObjKind::TimeExtent,
            },
            WktObject::Remark(_) => ObjKind::Remark,
            WktObject::Parameter(_) => ObjKind::Parameter,
            WktObject::ParameterFile(_) => ObjKind::ParameterFile,
            WktObject::Ellipsoid(_) => ObjKind::Ellipsoid,
            WktObject::Anchor(_) => ObjKind::Anchor,
            WktObject::TimeOrigin(_) => ObjKind::TimeOrigin,
            WktObject::Datum(d) => match d.kind() {
                DatumKind::Geodetic => ObjKind::GeodeticDatum,
                DatumKind::Engineering => ObjKind::EngineeringDatum,
                DatumKind::Image => ObjKind::ImageDatum,
                DatumKind::Parametric => ObjKind::ParametricDatum,
                DatumKind::Temporal => ObjKind::TemporalDatum,
                DatumKind::Vertical => ObjKind::VerticalDatum,
            },
            WktObject::PrimeMeridian(_) => ObjKind::PrimeMeridian,
            WktObject::Order(_) => ObjKind::Order,
            WktObject::Meridian(_) => ObjKind::Meridian,
            WktObject::Bearing(_) => ObjKind::Bearing,
            WktObject::Axis(_) => ObjKind::Axis,
            WktObject::Cs(_) => ObjKind::Cs,
            WktObject::Conversion(_) => ObjKind::Conversion,
            WktObject::DerivingConversion(_) => ObjKind::DerivingConversion,
            WktObject::Method(_) => ObjKind::Method,
            WktObject::Crs(c) => match c.kind() {
                CrsKind::Geodetic => ObjKind::GeodeticCrs,
                CrsKind::Projected => ObjKind::ProjectedCrs,
                CrsKind::Vertical => ObjKind::VerticalCrs,
                CrsKind::Engineering => ObjKind::EngineeringCrs,
                CrsKind::Image => ObjKind::ImageCrs,
                CrsKind::Parametric => ObjKind::ParametricCrs,
                CrsKind::Temporal => ObjKind::TemporalCrs,
                CrsKind::Compound => ObjKind::CompoundCrs,
                CrsKind::BaseGeodetic => ObjKind::BaseGeodeticCrs,
                CrsKind::BaseProjected => ObjKind::BaseProjectedCrs,
                CrsKind::BaseVertical => ObjKind::BaseVerticalCrs,
                CrsKind::BaseEngineering => ObjKind::BaseEngineeringCrs,
                CrsKind::BaseParametric => ObjKind::BaseParametricCrs,
                CrsKind::BaseTemporal => ObjKind::BaseTemporalCrs,
            },
            WktObject::OperationAccuracy(_) => ObjKind::OperationAccuracy,
            WktObject::CoordinateOperation(_) => ObjKind::CoordinateOperation,
            WktObject::BoundCrs(_) => ObjKind::BoundCrs,
            WktObject::AbridgedTransformation(_) => ObjKind::AbridgedTransformation,
        }
    }

    /// The object's name, for the kinds that carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            WktObject::Id(x) => Some(x.name()),
            WktObject::Unit(x) => Some(x.name()),
            WktObject::Parameter(x) => Some(x.name()),
            WktObject::ParameterFile(x) => Some(x.name()),
            WktObject::Ellipsoid(x) => Some(x.name()),
            WktObject::Datum(x) => Some(x.name()),
            WktObject::PrimeMeridian(x) => Some(x.name()),
            WktObject::Axis(x) => Some(x.name()),
            WktObject::Conversion(x) => Some(x.name()),
            WktObject::DerivingConversion(x) => Some(x.name()),
            WktObject::Method(x) => Some(x.name()),
            WktObject::Crs(x) => Some(x.name()),
            WktObject::CoordinateOperation(x) => Some(x.name()),
            WktObject::AbridgedTransformation(x) => Some(x.name()),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            WktObject::Citation(x) => x.is_visible(),
            WktObject::Uri(x) => x.is_visible(),
            WktObject::Id(x) => x.is_visible(),
            WktObject::Unit(x) => x.is_visible(),
            WktObject::Scope(x) => x.is_visible(),
            WktObject::Extent(x) => x.is_visible(),
            WktObject::Remark(x) => x.is_visible(),
            WktObject::Parameter(x) => x.is_visible(),
            WktObject::ParameterFile(x) => x.is_visible(),
            WktObject::Ellipsoid(x) => x.is_visible(),
            WktObject::Anchor(x) => x.is_visible(),
            WktObject::TimeOrigin(x) => x.is_visible(),
            WktObject::Datum(x) => x.is_visible(),
            WktObject::PrimeMeridian(x) => x.is_visible(),
            WktObject::Order(x) => x.is_visible(),
            WktObject::Meridian(x) => x.is_visible(),
            WktObject::Bearing(x) => x.is_visible(),
            WktObject::Axis(x) => x.is_visible(),
            WktObject::Cs(x) => x.is_visible(),
            WktObject::Conversion(x) => x.is_visible(),
            WktObject::DerivingConversion(x) => x.is_visible(),
            WktObject::Method(x) => x.is_visible(),
            WktObject::Crs(x) => x.is_visible(),
            WktObject::OperationAccuracy(x) => x.is_visible(),
            WktObject::CoordinateOperation(x) => x.is_visible(),
            WktObject::BoundCrs(x) => x.is_visible(),
            WktObject::AbridgedTransformation(x) => x.is_visible(),
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            WktObject::Citation(x) => x.set_visible(visible),
            WktObject::Uri(x) => x.set_visible(visible),
            WktObject::Id(x) => x.set_visible(visible),
            WktObject::Unit(x) => x.set_visible(visible),
            WktObject::Scope(x) => x.set_visible(visible),
            WktObject::Extent(x) => x.set_visible(visible),
            WktObject::Remark(x) => x.set_visible(visible),
            WktObject::Parameter(x) => x.set_visible(visible),
            WktObject::ParameterFile(x) => x.set_visible(visible),
            WktObject::Ellipsoid(x) => x.set_visible(visible),
            WktObject::Anchor(x) => x.set_visible(visible),
            WktObject::TimeOrigin(x) => x.set_visible(visible),
            WktObject::Datum(x) => x.set_visible(visible),
            WktObject::PrimeMeridian(x) => x.set_visible(visible),
            WktObject::Order(x) => x.set_visible(visible),
            WktObject::Meridian(x) => x.set_visible(visible),
            WktObject::Bearing(x) => x.set_visible(visible),
            WktObject::Axis(x) => x.set_visible(visible),
            WktObject::Cs(x) => x.set_visible(visible),
            WktObject::Conversion(x) => x.set_visible(visible),
            WktObject::DerivingConversion(x) => x.set_visible(visible),
            WktObject::Method(x) => x.set_visible(visible),
            WktObject::Crs(x) => x.set_visible(visible),
            WktObject::OperationAccuracy(x) => x.set_visible(visible),
            WktObject::CoordinateOperation(x) => x.set_visible(visible),
            WktObject::BoundCrs(x) => x.set_visible(visible),
            WktObject::AbridgedTransformation(x) => x.set_visible(visible),
        }
    }

    /// Value-level equality across the universe: false for objects of
    /// different kinds.
    pub fn compute_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (WktObject::Citation(a), WktObject::Citation(b)) => a.compute_eq(b),
            (WktObject::Uri(a), WktObject::Uri(b)) => a.compute_eq(b),
            (WktObject::Id(a), WktObject::Id(b)) => a.compute_eq(b),
            (WktObject::Unit(a), WktObject::Unit(b)) => a.compute_eq(b),
            (WktObject::Scope(a), WktObject::Scope(b)) => a.compute_eq(b),
            (WktObject::Extent(a), WktObject::Extent(b)) => a.compute_eq(b),
            (WktObject::Remark(a), WktObject::Remark(b)) => a.compute_eq(b),
            (WktObject::Parameter(a), WktObject::Parameter(b)) => a.compute_eq(b),
            (WktObject::ParameterFile(a), WktObject::ParameterFile(b)) => a.compute_eq(b),
            (WktObject::Ellipsoid(a), WktObject::Ellipsoid(b)) => a.compute_eq(b),
            (WktObject::Anchor(a), WktObject::Anchor(b)) => a.compute_eq(b),
            (WktObject::TimeOrigin(a), WktObject::TimeOrigin(b)) => a.compute_eq(b),
            (WktObject::Datum(a), WktObject::Datum(b)) => a.compute_eq(b),
            (WktObject::PrimeMeridian(a), WktObject::PrimeMeridian(b)) => a.compute_eq(b),
            (WktObject::Order(a), WktObject::Order(b)) => a == b,
            (WktObject::Meridian(a), WktObject::Meridian(b)) => a.compute_eq(b),
            (WktObject::Bearing(a), WktObject::Bearing(b)) => a.compute_eq(b),
            (WktObject::Axis(a), WktObject::Axis(b)) => a.compute_eq(b),
            (WktObject::Cs(a), WktObject::Cs(b)) => a.compute_eq(b),
            (WktObject::Conversion(a), WktObject::Conversion(b)) => a.compute_eq(b),
            (WktObject::DerivingConversion(a), WktObject::DerivingConversion(b)) => {
                a.compute_eq(b)
            }
            (WktObject::Method(a), WktObject::Method(b)) => a.compute_eq(b),
            (WktObject::Crs(a), WktObject::Crs(b)) => a.compute_eq(b),
            (WktObject::OperationAccuracy(a), WktObject::OperationAccuracy(b)) => a.compute_eq(b),
            (WktObject::CoordinateOperation(a), WktObject::CoordinateOperation(b)) => {
                a.compute_eq(b)
            }
            (WktObject::BoundCrs(a), WktObject::BoundCrs(b)) => a.compute_eq(b),
            (WktObject::AbridgedTransformation(a), WktObject::AbridgedTransformation(b)) => {
                a.compute_eq(b)
            }
            _ => false,
        }
    }

    /// Route an opening keyword to the matching constructor.
    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);

        if Crs::is_kwd(kwd) {
            return Crs::from_tokens(t, start, ctx).map(WktObject::Crs);
        }
        if BoundCrs::is_kwd(kwd) {
            return BoundCrs::from_tokens(t, start, ctx).map(WktObject::BoundCrs);
        }
        if CoordinateOperation::is_kwd(kwd) {
            return CoordinateOperation::from_tokens(t, start, ctx)
                .map(WktObject::CoordinateOperation);
        }
        if AbridgedTransformation::is_kwd(kwd) {
            return AbridgedTransformation::from_tokens(t, start, ctx)
                .map(WktObject::AbridgedTransformation);
        }
        if Datum::is_kwd(kwd) {
            return Datum::from_tokens(t, start, ctx).map(WktObject::Datum);
        }
        if Unit::is_kwd(kwd) {
            return Unit::from_tokens(t, start, ctx).map(WktObject::Unit);
        }
        if Extent::is_kwd(kwd) {
            return Extent::from_tokens(t, start, ctx).map(WktObject::Extent);
        }
        if Ellipsoid::is_kwd(kwd) {
            return Ellipsoid::from_tokens(t, start, ctx).map(WktObject::Ellipsoid);
        }
        if PrimeMeridian::is_kwd(kwd) {
            return PrimeMeridian::from_tokens(t, start, ctx).map(WktObject::PrimeMeridian);
        }
        if Conversion::is_kwd(kwd) {
            return Conversion::from_tokens(t, start, ctx).map(WktObject::Conversion);
        }
        if DerivingConversion::is_kwd(kwd) {
            return DerivingConversion::from_tokens(t, start, ctx)
                .map(WktObject::DerivingConversion);
        }
        if Method::is_kwd(kwd) {
            return Method::from_tokens(t, start, ctx).map(WktObject::Method);
        }
        if ParameterFile::is_kwd(kwd) {
            return ParameterFile::from_tokens(t, start, ctx).map(WktObject::ParameterFile);
        }
        if Parameter::is_kwd(kwd) {
            return Parameter::from_tokens(t, start, ctx).map(WktObject::Parameter);
        }
        if OperationAccuracy::is_kwd(kwd) {
            return OperationAccuracy::from_tokens(t, start, ctx).map(WktObject::OperationAccuracy);
        }
        if Cs::is_kwd(kwd) {
            return Cs::from_tokens(t, start, ctx).map(WktObject::Cs);
        }
        if Axis::is_kwd(kwd) {
            return Axis::from_tokens(t, start, ctx).map(WktObject::Axis);
        }
        if Order::is_kwd(kwd) {
            return Order::from_tokens(t, start, ctx).map(WktObject::Order);
        }
        if Meridian::is_kwd(kwd) {
            return Meridian::from_tokens(t, start, ctx).map(WktObject::Meridian);
        }
        if Bearing::is_kwd(kwd) {
            return Bearing::from_tokens(t, start, ctx).map(WktObject::Bearing);
        }
        if Id::is_kwd(kwd) {
            return Id::from_tokens(t, start, ctx).map(WktObject::Id);
        }
        if Citation::is_kwd(kwd) {
            return Citation::from_tokens(t, start, ctx).map(WktObject::Citation);
        }
        if Uri::is_kwd(kwd) {
            return Uri::from_tokens(t, start, ctx).map(WktObject::Uri);
        }
        if Scope::is_kwd(kwd) {
            return Scope::from_tokens(t, start, ctx).map(WktObject::Scope);
        }
        if Remark::is_kwd(kwd) {
            return Remark::from_tokens(t, start, ctx).map(WktObject::Remark);
        }
        if Anchor::is_kwd(kwd) {
            return Anchor::from_tokens(t, start, ctx).map(WktObject::Anchor);
        }
        if TimeOrigin::is_kwd(kwd) {
            return TimeOrigin::from_tokens(t, start, ctx).map(WktObject::TimeOrigin);
        }

        Err(ctx.err_str(ErrorCode::UnknownKeyword, "object", kwd))
    }

    /// Parse any supported object from WKT text, strictly.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        parse_object(wkt, "object", |t, ctx| Self::from_tokens(t, 0, ctx))
    }

    pub(crate) fn write_wkt(&self, w: &mut WktWriter, opts: WktOptions) -> Result<()> {
        match self {
            WktObject::Citation(x) => x.write_wkt(w, opts),
            WktObject::Uri(x) => x.write_wkt(w, opts),
            WktObject::Id(x) => x.write_wkt(w, opts),
            WktObject::Unit(x) => x.write_wkt(w, opts),
            WktObject::Scope(x) => x.write_wkt(w, opts),
            WktObject::Extent(x) => x.write_wkt(w, opts),
            WktObject::Remark(x) => x.write_wkt(w, opts),
            WktObject::Parameter(x) => x.write_wkt(w, opts),
            WktObject::ParameterFile(x) => x.write_wkt(w, opts),
            WktObject::Ellipsoid(x) => x.write_wkt(w, opts),
            WktObject::Anchor(x) => x.write_wkt(w, opts),
            WktObject::TimeOrigin(x) => x.write_wkt(w, opts),
            WktObject::Datum(x) => x.write_wkt(w, opts),
            WktObject::PrimeMeridian(x) => x.write_wkt(w, opts),
            WktObject::Order(x) => x.write_wkt(w, opts),
            WktObject::Meridian(x) => x.write_wkt(w, opts),
            WktObject::Bearing(x) => x.write_wkt(w, opts),
            WktObject::Axis(x) => x.write_wkt(w, opts),
            WktObject::Cs(x) => x.write_wkt(w, opts),
            WktObject::Conversion(x) => x.write_wkt(w, opts),
            WktObject::DerivingConversion(x) => x.write_wkt(w, opts),
            WktObject::Method(x) => x.write_wkt(w, opts),
            WktObject::Crs(x) => x.write_wkt(w, opts),
            WktObject::OperationAccuracy(x) => x.write_wkt(w, opts),
            WktObject::CoordinateOperation(x) => x.write_wkt(w, opts),
            WktObject::BoundCrs(x) => x.write_wkt(w, opts),
            WktObject::AbridgedTransformation(x) => x.write_wkt(w, opts),
        }
    }

    /// Serialize with the given options.
    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render("object", opts, |w| self.write_wkt(w, opts))
    }
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_keyword() {
        let obj = WktObject::from_wkt(r#"LENGTHUNIT["metre",1]"#).unwrap();
        assert_eq!(obj.kind(), ObjKind::LengthUnit);
        assert_eq!(obj.name(), Some("metre"));

        let obj = WktObject::from_wkt(r#"SPHEROID["WGS 84",6378137,298.257223563]"#).unwrap();
        assert_eq!(obj.kind(), ObjKind::Ellipsoid);

        let obj = WktObject::from_wkt(r#"AUTHORITY["EPSG","9001"]"#).unwrap();
        assert_eq!(obj.kind(), ObjKind::Id);

        let obj = WktObject::from_wkt(r#"PROJECTION["Mercator"]"#).unwrap();
        assert_eq!(obj.kind(), ObjKind::Method);

        let obj = WktObject::from_wkt(r#"VDATUM["Newlyn"]"#).unwrap();
        assert_eq!(obj.kind(), ObjKind::VerticalDatum);
    }

    #[test]
    fn unknown_keyword() {
        let err = WktObject::from_wkt(r#"FROBNICATOR["x"]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownKeyword);
        assert_eq!(err.message(), "object: unknown keyword: FROBNICATOR");
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let a = WktObject::from_wkt(r#"lengthunit["metre",1]"#).unwrap();
        let b = WktObject::from_wkt(r#"LENGTHUNIT["metre",1]"#).unwrap();
        assert!(a.compute_eq(&b));
    }

    #[test]
    fn cross_kind_compute_eq_is_false() {
        let a = WktObject::from_wkt(r#"SCOPE["x"]"#).unwrap();
        let b = WktObject::from_wkt(r#"REMARK["x"]"#).unwrap();
        assert!(!a.compute_eq(&b));
    }

    #[test]
    fn crs_kinds_get_distinct_tags() {
        let wkt = concat!(
            r#"GEODCRS["WGS 84",DATUM["D",ELLIPSOID["E",6378137,298.257223563]],"#,
            r#"CS[ellipsoidal,2],AXIS["latitude",north],AXIS["longitude",east]]"#,
        );
        let obj = WktObject::from_wkt(wkt).unwrap();
        assert_eq!(obj.kind(), ObjKind::GeodeticCrs);
    }
}
