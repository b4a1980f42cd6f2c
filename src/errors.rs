//!
//! Crate errors
//!
//! Every failure is reported as a [`WktError`] carrying a code from the
//! flat [`ErrorCode`] taxonomy plus a formatted message of the form
//! `"<owning-keyword-lowercased>: <description>[: <argument>]"`.
//!

use crate::log;
use crate::util;

/// Flat enumeration of every failure the reader and the constructors
/// can produce.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Reserved; allocation failure aborts in Rust and is never reported.
    NoMemory,

    // tokenizer failures
    EmptyString,
    ExpectingToken,
    InsufficientTokens,
    InvalidKeyword,
    InvalidEscape,
    InvalidSyntax,
    MaxTokensExceeded,
    MissingToken,
    TooLong,
    UnbalancedQuotes,
    TooManyOpenTokens,
    TooManyCloseTokens,
    UnknownKeyword,

    // duplicate sub-object failures
    DuplicateAbridgedTransformation,
    DuplicateAnchor,
    DuplicateBaseCrs,
    DuplicateBearing,
    DuplicateCitation,
    DuplicateConversion,
    DuplicateCs,
    DuplicateDatum,
    DuplicateEllipsoid,
    DuplicateExtent,
    DuplicateFirstCrs,
    DuplicateId,
    DuplicateInterpolationCrs,
    DuplicateMeridian,
    DuplicateMethod,
    DuplicateOperationAccuracy,
    DuplicateOrder,
    DuplicateParameter,
    DuplicateParameterFile,
    DuplicatePrimeMeridian,
    DuplicateRemark,
    DuplicateScope,
    DuplicateSecondCrs,
    DuplicateSourceCrs,
    DuplicateTargetCrs,
    DuplicateThirdCrs,
    DuplicateTimeCrs,
    DuplicateTimeOrigin,
    DuplicateUnit,
    DuplicateUri,

    // axis failures
    TooManyAxes,
    OrderOutOfRange,
    AxisAlreadyUsed,

    // other token-level failures
    TooManyTokens,
    IndexOutOfRange,

    // invalid value failures
    InvalidAxisDirection,
    InvalidBearingValue,
    InvalidCsType,
    InvalidDimension,
    InvalidFirstCrs,
    InvalidFlattening,
    InvalidLatitude,
    InvalidLongitude,
    InvalidMeridianValue,
    InvalidOrderValue,
    InvalidPixelType,
    InvalidSecondCrs,
    InvalidSemiMajorAxis,
    InvalidThirdCrs,
    InvalidUnitFactor,

    // missing required-child failures
    MissingAbridgedTransformation,
    MissingBaseCrs,
    MissingConversion,
    MissingCs,
    MissingDatum,
    MissingEllipsoid,
    MissingFirstCrs,
    MissingMethod,
    MissingSecondCrs,
    MissingSourceCrs,
    MissingTargetCrs,
    MissingUnit,

    // other failures
    EmptyFilename,
    EmptyName,
    MismatchedUnits,
    AbbreviationTooLong,
    FilenameTooLong,
    IdentifierTooLong,
    NameTooLong,
    TextTooLong,
    TimeTooLong,
    VersionTooLong,
}

impl ErrorCode {
    /// Human-readable description, used to build error messages.
    pub fn as_str(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            NoMemory => "no memory",

            EmptyString => "empty string",
            ExpectingToken => "expecting , or ]",
            InsufficientTokens => "insufficient tokens",
            InvalidKeyword => "invalid keyword",
            InvalidEscape => "invalid escape sequence",
            InvalidSyntax => "invalid syntax",
            MaxTokensExceeded => "max tokens exceeded",
            MissingToken => "missing token",
            TooLong => "string too long",
            UnbalancedQuotes => "unbalanced quotes",
            TooManyOpenTokens => "too many open tokens",
            TooManyCloseTokens => "too many close tokens",
            UnknownKeyword => "unknown keyword",

            DuplicateAbridgedTransformation => "duplicate abridged transformation",
            DuplicateAnchor => "duplicate anchor",
            DuplicateBaseCrs => "duplicate base crs",
            DuplicateBearing => "duplicate bearing",
            DuplicateCitation => "duplicate citation",
            DuplicateConversion => "duplicate conversion",
            DuplicateCs => "duplicate cs",
            DuplicateDatum => "duplicate datum",
            DuplicateEllipsoid => "duplicate ellipsoid",
            DuplicateExtent => "duplicate extent",
            DuplicateFirstCrs => "duplicate first crs",
            DuplicateId => "duplicate id",
            DuplicateInterpolationCrs => "duplicate interpolation crs",
            DuplicateMeridian => "duplicate meridian",
            DuplicateMethod => "duplicate method",
            DuplicateOperationAccuracy => "duplicate operation accuracy",
            DuplicateOrder => "duplicate order",
            DuplicateParameter => "duplicate parameter",
            DuplicateParameterFile => "duplicate parameter file",
            DuplicatePrimeMeridian => "duplicate prime meridian",
            DuplicateRemark => "duplicate remark",
            DuplicateScope => "duplicate scope",
            DuplicateSecondCrs => "duplicate second crs",
            DuplicateSourceCrs => "duplicate source crs",
            DuplicateTargetCrs => "duplicate target crs",
            DuplicateThirdCrs => "duplicate third crs",
            DuplicateTimeCrs => "duplicate time crs",
            DuplicateTimeOrigin => "duplicate time origin",
            DuplicateUnit => "duplicate unit",
            DuplicateUri => "duplicate uri",

            TooManyAxes => "too many axes",
            OrderOutOfRange => "axis order out of range",
            AxisAlreadyUsed => "axis order already used",

            TooManyTokens => "too many tokens",
            IndexOutOfRange => "index out of range",

            InvalidAxisDirection => "invalid axis direction",
            InvalidBearingValue => "invalid bearing value",
            InvalidCsType => "invalid cs type",
            InvalidDimension => "invalid dimension",
            InvalidFirstCrs => "invalid first crs",
            InvalidFlattening => "invalid flattening",
            InvalidLatitude => "invalid latitude",
            InvalidLongitude => "invalid longitude",
            InvalidMeridianValue => "invalid meridian value",
            InvalidOrderValue => "invalid order value",
            InvalidPixelType => "invalid pixel type",
            InvalidSecondCrs => "invalid second crs",
            InvalidSemiMajorAxis => "invalid semi-major axis",
            InvalidThirdCrs => "invalid third crs",
            InvalidUnitFactor => "invalid unit factor",

            MissingAbridgedTransformation => "missing abridged transformation",
            MissingBaseCrs => "missing base crs",
            MissingConversion => "missing conversion",
            MissingCs => "missing cs",
            MissingDatum => "missing datum",
            MissingEllipsoid => "missing ellipsoid",
            MissingFirstCrs => "missing first crs",
            MissingMethod => "missing method",
            MissingSecondCrs => "missing second crs",
            MissingSourceCrs => "missing source crs",
            MissingTargetCrs => "missing target crs",
            MissingUnit => "missing unit",

            EmptyFilename => "empty filename",
            EmptyName => "empty name",
            MismatchedUnits => "mismatched units",
            AbbreviationTooLong => "abbreviation too long",
            FilenameTooLong => "filename too long",
            IdentifierTooLong => "identifier too long",
            NameTooLong => "name too long",
            TextTooLong => "text too long",
            TimeTooLong => "time too long",
            VersionTooLong => "version too long",
        }
    }
}

/// A parse or construction failure: a code plus a formatted message.
///
/// The numeric code is intended for programmatic handling, the message
/// for logs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct WktError {
    code: ErrorCode,
    message: String,
}

impl WktError {
    /// Error with no argument: `"unit: invalid unit factor"`.
    pub fn new(code: ErrorCode, kwd: &str) -> Self {
        Self {
            code,
            message: Self::prefix(code, kwd),
        }
    }

    /// Error with a string argument.
    pub fn with_str(code: ErrorCode, kwd: &str, arg: &str) -> Self {
        Self {
            code,
            message: format!("{}: {arg}", Self::prefix(code, kwd)),
        }
    }

    /// Error with an integer argument.
    pub fn with_int(code: ErrorCode, kwd: &str, arg: i64) -> Self {
        Self {
            code,
            message: format!("{}: {arg}", Self::prefix(code, kwd)),
        }
    }

    /// Error with a double argument.
    pub fn with_double(code: ErrorCode, kwd: &str, arg: f64) -> Self {
        Self {
            code,
            message: format!("{}: {}", Self::prefix(code, kwd), util::fmt_double(arg)),
        }
    }

    fn prefix(code: ErrorCode, kwd: &str) -> String {
        if kwd.is_empty() {
            code.as_str().to_string()
        } else {
            format!("{}: {}", kwd.to_ascii_lowercase(), code.as_str())
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T, E = WktError> = std::result::Result<T, E>;

/// Callback invoked for every reported error, in addition to the error
/// being returned to the caller. Registered on [`crate::Parser`].
pub type ErrorSink<'a> = dyn FnMut(&WktError) + 'a;

/// Parse context threaded through every `from_tokens` constructor:
/// the strict-parsing flag plus the optional error sink.
pub(crate) struct Ctx<'a, 'b> {
    pub strict: bool,
    pub sink: Option<&'a mut ErrorSink<'b>>,
}

impl<'a, 'b> Ctx<'a, 'b> {
    pub fn new(strict: bool) -> Self {
        Self { strict, sink: None }
    }

    pub fn with_sink(strict: bool, sink: &'a mut ErrorSink<'b>) -> Self {
        Self {
            strict,
            sink: Some(sink),
        }
    }

    /// Route an error through the sink and the log before it propagates.
    pub fn report(&mut self, err: WktError) -> WktError {
        log::error!("{err}");
        if let Some(sink) = self.sink.as_mut() {
            sink(&err);
        }
        err
    }

    pub fn err(&mut self, code: ErrorCode, kwd: &str) -> WktError {
        self.report(WktError::new(code, kwd))
    }

    pub fn err_str(&mut self, code: ErrorCode, kwd: &str, arg: &str) -> WktError {
        self.report(WktError::with_str(code, kwd, arg))
    }

    pub fn err_int(&mut self, code: ErrorCode, kwd: &str, arg: i64) -> WktError {
        self.report(WktError::with_int(code, kwd, arg))
    }
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_format() {
        let e = WktError::new(ErrorCode::InvalidUnitFactor, "LENGTHUNIT");
        assert_eq!(e.message(), "lengthunit: invalid unit factor");
        assert_eq!(e.code(), ErrorCode::InvalidUnitFactor);

        let e = WktError::with_str(ErrorCode::UnknownKeyword, "OBJECT", "FOO");
        assert_eq!(e.message(), "object: unknown keyword: FOO");

        let e = WktError::with_int(ErrorCode::InvalidDimension, "CS", 7);
        assert_eq!(e.message(), "cs: invalid dimension: 7");

        let e = WktError::with_double(ErrorCode::InvalidUnitFactor, "UNIT", -1.5);
        assert_eq!(e.message(), "unit: invalid unit factor: -1.5");
    }

    #[test]
    fn sink_sees_reported_errors() {
        let mut seen = Vec::new();
        let mut sink = |e: &WktError| seen.push(e.code());
        let mut ctx = Ctx::with_sink(true, &mut sink);
        let _ = ctx.err(ErrorCode::EmptyString, "OBJECT");
        let _ = ctx.err_int(ErrorCode::TooManyTokens, "UNIT", 4);
        drop(ctx);
        assert_eq!(seen, vec![ErrorCode::EmptyString, ErrorCode::TooManyTokens]);
    }
}
