//!
//! # OGC WKT CRS reader and writer
//!
//! Parse the Well-Known Text representation of coordinate reference
//! systems and coordinate operations (ISO 19162 / OGC 12-063r5) into a
//! typed object tree, inspect or compare it, and regenerate canonical
//! text — in the modern bracketed syntax or the legacy WKT1 syntax
//! (OGC 01-009).
//!
//! Both `[...]` and `(...)` delimiters are accepted on input, keywords
//! are case-insensitive, and quoted strings escape embedded quotes by
//! doubling them. Legacy spellings (`GEOGCS`, `PROJCS`, `SPHEROID`,
//! `AUTHORITY`, ...) parse into the same model as their modern
//! counterparts.
//!
//! Example:
//! ```
//! use ogcwkt::{from_wkt, ObjKind, WktOptions};
//!
//! let obj = from_wkt(r#"SPHEROID["WGS 84",6378137,298.257223563]"#).unwrap();
//! assert_eq!(obj.kind(), ObjKind::Ellipsoid);
//!
//! // canonical modern emission
//! assert_eq!(
//!     obj.to_wkt(WktOptions::new()).unwrap(),
//!     r#"ELLIPSOID["WGS 84",6378137,298.257223563]"#,
//! );
//!
//! // legacy emission restores the WKT1 form
//! assert_eq!(
//!     obj.to_wkt(WktOptions::new().old_syntax()).unwrap(),
//!     r#"SPHEROID["WGS 84",6378137,298.257223563]"#,
//! );
//! ```
//!
mod axis;
mod consts;
mod conversion;
mod crs;
mod cs;
mod datum;
mod ellipsoid;
mod errors;
mod extent;
mod format;
mod id;
mod leaf;
mod obj;
mod operation;
mod param;
mod setof;
mod token;
mod unit;
mod util;

pub use axis::{Axis, AxisDirection, Bearing, Meridian, Order};
pub use consts::{NAME_MAX, PATH_MAX, TEXT_MAX, TIME_MAX, TOKENS_MAX, WKT_MAX};
pub use conversion::{Conversion, DerivingConversion, Method};
pub use crs::{Crs, CrsDetail, CrsKind, CrsRoot};
pub use cs::{Cs, CsKind};
pub use datum::{Datum, DatumKind, PixelInCell, PrimeMeridian};
pub use ellipsoid::Ellipsoid;
pub use errors::{ErrorCode, ErrorSink, Result, WktError};
pub use extent::{AreaExtent, BboxExtent, Extent, TimeExtent, VerticalExtent};
pub use format::WktOptions;
pub use id::Id;
pub use leaf::{Anchor, Citation, Remark, Scope, TimeOrigin, Uri};
pub use obj::{ObjKind, WktObject};
pub use operation::{AbridgedTransformation, BoundCrs, CoordinateOperation};
pub use param::{OperationAccuracy, Parameter, ParameterFile};
pub use setof::{NaturalKey, SetOf};
pub use token::{Token, Tokens};
pub use unit::{Unit, UnitKind};

use errors::Ctx;

/// Configurable parser: the strict-parsing flag and an optional error
/// sink, threaded through every constructor the parse touches.
///
/// Under lenient parsing, missing trailing close-brackets are
/// synthesized, text beyond the outermost close is ignored, and extra
/// positional tokens are dropped instead of raising errors.
///
/// Example:
/// ```
/// use ogcwkt::Parser;
///
/// let mut parser = Parser::new().strict(false);
/// let obj = parser.parse(r#"LENGTHUNIT["metre",1.0]] extra rubbish"#).unwrap();
/// assert_eq!(obj.name(), Some("metre"));
/// ```
pub struct Parser<'a> {
    strict: bool,
    sink: Option<Box<dyn FnMut(&WktError) + 'a>>,
}

impl<'a> Default for Parser<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Parser<'a> {
    /// A strict parser with no sink.
    pub fn new() -> Self {
        Self {
            strict: true,
            sink: None,
        }
    }

    /// Turn strict parsing on or off.
    pub fn strict(mut self, on_off: bool) -> Self {
        self.strict = on_off;
        self
    }

    /// Register a callback that receives every reported error, in
    /// addition to the error returned to the caller.
    pub fn on_error(mut self, sink: impl FnMut(&WktError) + 'a) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Parse any supported object.
    pub fn parse(&mut self, wkt: &str) -> Result<WktObject> {
        let mut ctx = match self.sink.as_mut() {
            Some(sink) => Ctx::with_sink(self.strict, sink.as_mut()),
            None => Ctx::new(self.strict),
        };
        let t = token::tokenize(wkt, "object", &mut ctx)?;
        WktObject::from_tokens(&t, 0, &mut ctx)
    }

    /// Parse, requiring a coordinate reference system.
    pub fn parse_crs(&mut self, wkt: &str) -> Result<Crs> {
        let mut ctx = match self.sink.as_mut() {
            Some(sink) => Ctx::with_sink(self.strict, sink.as_mut()),
            None => Ctx::new(self.strict),
        };
        let t = token::tokenize(wkt, "crs", &mut ctx)?;
        Crs::from_tokens(&t, 0, &mut ctx)
    }
}

/// Parse any supported object, strictly and without a sink.
pub fn from_wkt(wkt: &str) -> Result<WktObject> {
    Parser::new().parse(wkt)
}

// log for logging (optional).
#[cfg(feature = "logging")]
use log;

#[cfg(not(feature = "logging"))]
mod log {
    // Use __XXX__ to prevent 'ambiguous name' error
    // when exporting
    macro_rules! __trace__    ( ($($tt:tt)*) => {{}} );
    macro_rules! __debug__    ( ($($tt:tt)*) => {{}} );
    macro_rules! __error__    ( ($($tt:tt)*) => {{}} );
    macro_rules! __info__     ( ($($tt:tt)*) => {{}} );
    macro_rules! __warn__     ( ($($tt:tt)*) => {{}} );

    #[allow(unused_imports)]
    pub(crate) use {
        __debug__ as debug, __error__ as error, __info__ as info, __trace__ as trace,
        __warn__ as warn,
    };
}

#[cfg(test)]
mod tests;
