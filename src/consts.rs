//!
//! Crate-wide limits and numeric tolerances
//!
//! All lengths are in bytes and count the field after unescaping.
//!

/// Maximum length of a WKT string, on input and output.
pub const WKT_MAX: usize = 1024 * 4;

/// Maximum number of tokens in a WKT string.
pub const TOKENS_MAX: usize = 512;

/// Maximum length of a name field.
pub const NAME_MAX: usize = 80;

/// Maximum length of a text field.
pub const TEXT_MAX: usize = 256;

/// Maximum length of a time string.
pub const TIME_MAX: usize = 64;

/// Maximum length of a filename field.
pub const PATH_MAX: usize = 256;

/// UTF-8 text may expand up to 3x when escaped for output.
pub const UTF8_TEXT_MAX: usize = TEXT_MAX * 3;

// 2^(-48)
pub(crate) const EPS_48: f64 = 3.55271367880050092935562e-15;

/// Default tolerance for the compute-equality comparisons.
pub const EPS: f64 = EPS_48;
