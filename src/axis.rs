//!
//! Coordinate system axes
//!
//! The axis object with its direction vocabulary, plus the three small
//! axis qualifiers: bearing, meridian and explicit order.
//!
use crate::consts::NAME_MAX;
use crate::errors::{Ctx, ErrorCode, Result, WktError};
use crate::format::{render, WktOptions, WktWriter};
use crate::id::{collect_id, write_ids, Id};
use crate::setof::SetOf;
use crate::token::{parse_object, Tokens};
use crate::unit::{Unit, UnitKind};
use crate::util;

/// Axis direction vocabulary of WKT-CRS.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AxisDirection {
    North,
    NorthNorthEast,
    NorthEast,
    EastNorthEast,
    East,
    EastSouthEast,
    SouthEast,
    SouthSouthEast,
    South,
    SouthWest,
    WestSouthWest,
    West,
    WestNorthWest,
    NorthWest,
    NorthNorthWest,
    GeocentricX,
    GeocentricY,
    GeocentricZ,
    Up,
    Down,
    Forward,
    Aft,
    Starboard,
    Port,
    Clockwise,
    CounterClockwise,
    ColumnPositive,
    ColumnNegative,
    RowPositive,
    RowNegative,
    DisplayRight,
    DisplayLeft,
    DisplayUp,
    DisplayDown,
    Future,
    Past,
    Towards,
    AwayFrom,
    Unspecified,
}

const AXIS_DIRECTIONS: &[(AxisDirection, &str)] = &[
    (AxisDirection::North, "north"),
    (AxisDirection::NorthNorthEast, "northNorthEast"),
    (AxisDirection::NorthEast, "northEast"),
    (AxisDirection::EastNorthEast, "eastNorthEast"),
    (AxisDirection::East, "east"),
    (AxisDirection::EastSouthEast, "eastSouthEast"),
    (AxisDirection::SouthEast, "southEast"),
    (AxisDirection::SouthSouthEast, "southSouthEast"),
    (AxisDirection::South, "south"),
    (AxisDirection::SouthWest, "southWest"),
    (AxisDirection::WestSouthWest, "westSouthWest"),
    (AxisDirection::West, "west"),
    (AxisDirection::WestNorthWest, "westNorthWest"),
    (AxisDirection::NorthWest, "northWest"),
    (AxisDirection::NorthNorthWest, "northNorthWest"),
    (AxisDirection::GeocentricX, "geocentricX"),
    (AxisDirection::GeocentricY, "geocentricY"),
    (AxisDirection::GeocentricZ, "geocentricZ"),
    (AxisDirection::Up, "up"),
    (AxisDirection::Down, "down"),
    (AxisDirection::Forward, "forward"),
    (AxisDirection::Aft, "aft"),
    (AxisDirection::Starboard, "starboard"),
    (AxisDirection::Port, "port"),
    (AxisDirection::Clockwise, "clockwise"),
    (AxisDirection::CounterClockwise, "counterClockwise"),
    (AxisDirection::ColumnPositive, "columnPositive"),
    (AxisDirection::ColumnNegative, "columnNegative"),
    (AxisDirection::RowPositive, "rowPositive"),
    (AxisDirection::RowNegative, "rowNegative"),
    (AxisDirection::DisplayRight, "displayRight"),
    (AxisDirection::DisplayLeft, "displayLeft"),
    (AxisDirection::DisplayUp, "displayUp"),
    (AxisDirection::DisplayDown, "displayDown"),
    (AxisDirection::Future, "future"),
    (AxisDirection::Past, "past"),
    (AxisDirection::Towards, "towards"),
    (AxisDirection::AwayFrom, "awayFrom"),
    (AxisDirection::Unspecified, "unspecified"),
];

impl AxisDirection {
    /// Canonical (output) spelling.
    pub fn kwd(&self) -> &'static str {
        AXIS_DIRECTIONS
            .iter()
            .find(|(d, _)| d == self)
            .map(|(_, k)| *k)
            .unwrap_or("unspecified")
    }

    /// Case-insensitive lookup.
    pub fn from_kwd(kwd: &str) -> Option<AxisDirection> {
        AXIS_DIRECTIONS
            .iter()
            .find(|(_, k)| k.eq_ignore_ascii_case(kwd))
            .map(|(d, _)| *d)
    }
}

/// Bearing of a polar-system axis, `BEARING[value]` in degrees with an
/// optional angle unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Bearing {
    value: f64,
    unit: Option<Unit>,
    visible: bool,
}

impl Bearing {
    pub const KWD: &'static str = "BEARING";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(value: f64, unit: Option<Unit>) -> Result<Self> {
        if !(-360.0..=360.0).contains(&value) {
            return Err(WktError::with_double(
                ErrorCode::InvalidBearingValue,
                Self::KWD,
                value,
            ));
        }
        Ok(Self {
            value,
            unit,
            visible: true,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
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
        let span = t.span(start, Self::KWD, 1, 1, ctx)?;
        let value = match util::parse_double(t.text(start + 1)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(
                    ErrorCode::InvalidBearingValue,
                    Self::KWD,
                    t.text(start + 1),
                ))
            }
        };
        let unit = angle_unit_child(t, start + 1 + span.args, span.end, Self::KWD, ctx)?;
        Self::new(value, unit).map_err(|e| ctx.report(e))
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
        if let Some(unit) = &self.unit {
            w.sub(|w| unit.write_wkt(w, opts.for_children()))?;
        }
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

/// Meridian a vertical axis direction refers to, `MERIDIAN[value,unit]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Meridian {
    value: f64,
    unit: Option<Unit>,
    visible: bool,
}

impl Meridian {
    pub const KWD: &'static str = "MERIDIAN";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(value: f64, unit: Option<Unit>) -> Result<Self> {
        if !(-180.0..=180.0).contains(&value) {
            return Err(WktError::with_double(
                ErrorCode::InvalidMeridianValue,
                Self::KWD,
                value,
            ));
        }
        Ok(Self {
            value,
            unit,
            visible: true,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
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
        let span = t.span(start, Self::KWD, 1, 1, ctx)?;
        let value = match util::parse_double(t.text(start + 1)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(
                    ErrorCode::InvalidMeridianValue,
                    Self::KWD,
                    t.text(start + 1),
                ))
            }
        };
        let unit = angle_unit_child(t, start + 1 + span.args, span.end, Self::KWD, ctx)?;
        Self::new(value, unit).map_err(|e| ctx.report(e))
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
        if let Some(unit) = &self.unit {
            w.sub(|w| unit.write_wkt(w, opts.for_children()))?;
        }
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

// Scan an object tail for a single optional angle unit.
fn angle_unit_child(
    t: &Tokens,
    mut i: usize,
    end: usize,
    kwd: &str,
    ctx: &mut Ctx,
) -> Result<Option<Unit>> {
    let mut unit: Option<Unit> = None;
    while i < end {
        let next = t.end_of(i);
        if Unit::is_kind_kwd(t.text(i), UnitKind::Angle) {
            if unit.is_some() {
                return Err(ctx.err(ErrorCode::DuplicateUnit, kwd));
            }
            unit = Some(Unit::from_tokens_as(t, i, UnitKind::Angle, ctx)?);
        }
        i = next;
    }
    Ok(unit)
}

/// Explicit 1-based axis slot assignment, `ORDER[n]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    value: i64,
    visible: bool,
}

impl Order {
    pub const KWD: &'static str = "ORDER";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    pub fn new(value: i64) -> Result<Self> {
        if !(1..=3).contains(&value) {
            return Err(WktError::with_int(
                ErrorCode::InvalidOrderValue,
                Self::KWD,
                value,
            ));
        }
        Ok(Self {
            value,
            visible: true,
        })
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        t.span(start, Self::KWD, 1, 1, ctx)?;
        let value = match util::parse_int(t.text(start + 1)) {
            Some(v) => v,
            None => {
                return Err(ctx.err_str(
                    ErrorCode::InvalidOrderValue,
                    Self::KWD,
                    t.text(start + 1),
                ))
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
        w.int(self.value)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

/// Coordinate system axis.
///
/// The quoted axis name may carry an abbreviation: `"name"`,
/// `"name (abbr)"` or `"(abbr)"`; the two parts are stored separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    name: String,
    abbr: String,
    direction: AxisDirection,
    bearing: Option<Bearing>,
    meridian: Option<Meridian>,
    order: Option<Order>,
    unit: Option<Unit>,
    ids: SetOf<Id>,
    visible: bool,
}

impl Axis {
    pub const KWD: &'static str = "AXIS";

    pub(crate) fn is_kwd(kwd: &str) -> bool {
        kwd.eq_ignore_ascii_case(Self::KWD)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        abbr: &str,
        direction: AxisDirection,
        bearing: Option<Bearing>,
        meridian: Option<Meridian>,
        order: Option<Order>,
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
        if abbr.len() >= NAME_MAX {
            return Err(WktError::with_int(
                ErrorCode::AbbreviationTooLong,
                Self::KWD,
                abbr.len() as i64,
            ));
        }
        Ok(Self {
            name: name.to_string(),
            abbr: abbr.to_string(),
            direction,
            bearing,
            meridian,
            order,
            unit,
            ids,
            visible: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abbr(&self) -> &str {
        &self.abbr
    }

    pub fn direction(&self) -> AxisDirection {
        self.direction
    }

    pub fn bearing(&self) -> Option<&Bearing> {
        self.bearing.as_ref()
    }

    pub fn meridian(&self) -> Option<&Meridian> {
        self.meridian.as_ref()
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
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

    /// Name and abbreviation recombined the way they are written.
    pub fn name_and_abbr(&self) -> String {
        match (self.name.is_empty(), self.abbr.is_empty()) {
            (false, false) => format!("{} ({})", self.name, self.abbr),
            (false, true) => self.name.clone(),
            (true, false) => format!("({})", self.abbr),
            (true, true) => String::new(),
        }
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
            && self.direction == other.direction
            && opt_eq(&self.bearing, &other.bearing, Bearing::compute_eq)
            && opt_eq(&self.meridian, &other.meridian, Meridian::compute_eq)
            && self.order == other.order
            && opt_eq(&self.unit, &other.unit, Unit::compute_eq)
    }

    pub(crate) fn from_tokens(t: &Tokens, start: usize, ctx: &mut Ctx) -> Result<Self> {
        let kwd = t.text(start);
        if !Self::is_kwd(kwd) {
            return Err(ctx.err_str(ErrorCode::InvalidKeyword, Self::KWD, kwd));
        }
        let span = t.span(start, Self::KWD, 2, 2, ctx)?;

        let raw_name = util::unescape(t.text(start + 1));
        let (name, abbr) = split_name_abbr(&raw_name);

        let dir_kwd = t.text(start + 2);
        let direction = match AxisDirection::from_kwd(dir_kwd) {
            Some(d) => d,
            None => {
                return Err(ctx.err_str(ErrorCode::InvalidAxisDirection, Self::KWD, dir_kwd));
            }
        };

        let mut bearing: Option<Bearing> = None;
        let mut meridian: Option<Meridian> = None;
        let mut order: Option<Order> = None;
        let mut unit: Option<Unit> = None;
        let mut ids = SetOf::new();
        let mut bad: Option<WktError> = None;

        let mut i = start + 1 + span.args;
        while i < span.end {
            let sub = t.text(i);
            let next = t.end_of(i);
            if Bearing::is_kwd(sub) {
                if bearing.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateBearing, Self::KWD));
                } else {
                    match Bearing::from_tokens(t, i, ctx) {
                        Ok(b) => bearing = Some(b),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Meridian::is_kwd(sub) {
                if meridian.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateMeridian, Self::KWD));
                } else {
                    match Meridian::from_tokens(t, i, ctx) {
                        Ok(m) => meridian = Some(m),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Order::is_kwd(sub) {
                if order.is_some() {
                    bad.get_or_insert(ctx.err(ErrorCode::DuplicateOrder, Self::KWD));
                } else {
                    match Order::from_tokens(t, i, ctx) {
                        Ok(o) => order = Some(o),
                        Err(e) => {
                            bad.get_or_insert(e);
                        }
                    }
                }
            } else if Unit::is_kwd(sub) {
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
        Self::new(&name, &abbr, direction, bearing, meridian, order, unit, ids)
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
        w.quoted(&self.name_and_abbr())?;
        w.push(',')?;
        w.push_str(self.direction.kwd())?;
        if let Some(bearing) = &self.bearing {
            w.sub(|w| bearing.write_wkt(w, child))?;
        }
        if let Some(meridian) = &self.meridian {
            w.sub(|w| meridian.write_wkt(w, child))?;
        }
        if let Some(order) = &self.order {
            w.sub(|w| order.write_wkt(w, child))?;
        }
        if let Some(unit) = &self.unit {
            w.sub(|w| unit.write_wkt(w, child))?;
        }
        write_ids(w, &self.ids, opts)?;
        w.push(opts.close())
    }

    pub fn to_wkt(&self, opts: WktOptions) -> Result<String> {
        render(Self::KWD, opts, |w| self.write_wkt(w, opts))
    }
}

fn split_name_abbr(raw: &str) -> (String, String) {
    match raw.find('(') {
        Some(n) => {
            let name = raw[..n].trim().to_string();
            let tail = &raw[n + 1..];
            let abbr = match tail.find(')') {
                Some(m) => tail[..m].trim().to_string(),
                None => tail.trim().to_string(),
            };
            (name, abbr)
        }
        None => (raw.trim().to_string(), String::new()),
    }
}

/// Assign an axis to its slot: honoring an explicit `ORDER[n]` if
/// present, first-empty-slot otherwise. `max_axes` is the slot count
/// the owning CRS kind allows.
pub(crate) fn place_axis(
    axis: Axis,
    slots: &mut [Option<Axis>; 3],
    max_axes: usize,
    kwd: &str,
) -> Result<()> {
    match axis.order().map(Order::value) {
        None => {
            for slot in slots.iter_mut().take(max_axes) {
                if slot.is_none() {
                    *slot = Some(axis);
                    return Ok(());
                }
            }
            Err(WktError::new(ErrorCode::TooManyAxes, kwd))
        }
        Some(n) => {
            if n as usize > max_axes {
                return Err(WktError::with_int(ErrorCode::OrderOutOfRange, kwd, n));
            }
            let slot = &mut slots[(n - 1) as usize];
            if slot.is_some() {
                return Err(WktError::with_int(ErrorCode::AxisAlreadyUsed, kwd, n));
            }
            *slot = Some(axis);
            Ok(())
        }
    }
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_table() {
        assert_eq!(AxisDirection::from_kwd("EAST"), Some(AxisDirection::East));
        assert_eq!(
            AxisDirection::from_kwd("northnortheast"),
            Some(AxisDirection::NorthNorthEast)
        );
        assert_eq!(AxisDirection::NorthNorthEast.kwd(), "northNorthEast");
        assert_eq!(AxisDirection::from_kwd("sideways"), None);
    }

    #[test]
    fn axis_roundtrip() {
        let a = Axis::from_wkt(r#"AXIS["latitude (lat)",north,ORDER[1]]"#).unwrap();
        assert_eq!(a.name(), "latitude");
        assert_eq!(a.abbr(), "lat");
        assert_eq!(a.direction(), AxisDirection::North);
        assert_eq!(a.order().unwrap().value(), 1);
        assert_eq!(
            a.to_wkt(WktOptions::new()).unwrap(),
            r#"AXIS["latitude (lat)",north,ORDER[1]]"#
        );
    }

    #[test]
    fn abbr_only_axis() {
        let a = Axis::from_wkt(r#"AXIS["(lon)",east]"#).unwrap();
        assert_eq!(a.name(), "");
        assert_eq!(a.abbr(), "lon");
        assert_eq!(a.to_wkt(WktOptions::new()).unwrap(), r#"AXIS["(lon)",east]"#);
    }

    #[test]
    fn axis_with_unit() {
        let a = Axis::from_wkt(r#"AXIS["x",east,LENGTHUNIT["metre",1]]"#).unwrap();
        assert_eq!(a.unit().unwrap().name(), "metre");
        assert_eq!(
            a.to_wkt(WktOptions::new()).unwrap(),
            r#"AXIS["x",east,LENGTHUNIT["metre",1]]"#
        );
    }

    #[test]
    fn bad_direction() {
        let err = Axis::from_wkt(r#"AXIS["x",sideways]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidAxisDirection);
    }

    #[test]
    fn duplicate_order_rejected() {
        let err = Axis::from_wkt(r#"AXIS["x",east,ORDER[1],ORDER[2]]"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateOrder);
    }

    #[test]
    fn order_value_range() {
        let err = Order::new(0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidOrderValue);
        let err = Order::new(4).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidOrderValue);
    }

    #[test]
    fn meridian_and_bearing_ranges() {
        assert!(Bearing::new(235.0, None).is_ok());
        assert_eq!(
            Bearing::new(361.0, None).unwrap_err().code(),
            ErrorCode::InvalidBearingValue
        );
        assert!(Meridian::new(-180.0, None).is_ok());
        assert_eq!(
            Meridian::new(200.0, None).unwrap_err().code(),
            ErrorCode::InvalidMeridianValue
        );
    }

    #[test]
    fn placement() {
        let mut slots: [Option<Axis>; 3] = [None, None, None];
        let lon = Axis::from_wkt(r#"AXIS["(lon)",east,ORDER[2]]"#).unwrap();
        let lat = Axis::from_wkt(r#"AXIS["(lat)",north,ORDER[1]]"#).unwrap();
        place_axis(lon, &mut slots, 2, "GEODCRS").unwrap();
        place_axis(lat, &mut slots, 2, "GEODCRS").unwrap();
        assert_eq!(slots[0].as_ref().unwrap().abbr(), "lat");
        assert_eq!(slots[1].as_ref().unwrap().abbr(), "lon");

        let dup = Axis::from_wkt(r#"AXIS["x",east,ORDER[1]]"#).unwrap();
        let err = place_axis(dup, &mut slots, 2, "GEODCRS").unwrap_err();
        assert_eq!(err.code(), ErrorCode::AxisAlreadyUsed);

        let third = Axis::from_wkt(r#"AXIS["z",up,ORDER[3]]"#).unwrap();
        let err = place_axis(third, &mut slots, 2, "GEODCRS").unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrderOutOfRange);

        let extra = Axis::from_wkt(r#"AXIS["y",north]"#).unwrap();
        let err = place_axis(extra, &mut slots, 2, "GEODCRS").unwrap_err();
        assert_eq!(err.code(), ErrorCode::TooManyAxes);
    }
}
