//! Utility module with colorcraft's errors.
//!
//! Each failure kind gets its own small enum with a hand-written [`Display`]
//! and [`std::error::Error`] implementation, the same idiom the teacher crate
//! uses for `ColorFormatError` and `ThemeError`. [`Error`] unifies them for
//! call sites that can fail in more than one way.

use std::fmt;

/// A name or value conflict in one of the [`crate::Registry`] tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// A color-type, color-base, color-function, color-space, or fit-method
    /// name is already registered.
    NameAlreadyUsed(String),
    /// The given name is not registered in any table.
    Unregistered(String),
    /// A named color's RGB triple is already registered under a different
    /// name.
    RgbAlreadyNamed(String),
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameAlreadyUsed(name) => write!(f, "name `{name}` already used"),
            Self::Unregistered(name) => write!(f, "`{name}` is not registered"),
            Self::RgbAlreadyNamed(name) => write!(f, "RGB value already registered as `{name}`"),
        }
    }
}

impl std::error::Error for RegistrationError {}

// --------------------------------------------------------------------------------------------------------------------

/// A malformed registration: wrong shape, invalid matrix, bad component
/// names, or an unresolved bridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A `ColorModelConverter`'s `bridge` does not name a registered model.
    UnresolvedBridge(String),
    /// A model declares itself as its own bridge.
    SelfBridge(String),
    /// A component is named the reserved word `none`.
    ReservedComponentName,
    /// Two components share a name.
    DuplicateComponentName(String),
    /// Component `index` values are not unique and contiguous across `0..3`.
    BadComponentIndices,
    /// A `color-space` matrix is not 3 by 3.
    BadMatrixShape,
    /// An invalid `precision` option (e.g. negative where unsigned expected).
    InvalidPrecision,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedBridge(name) => {
                write!(f, "bridge `{name}` is not a registered model")
            }
            Self::SelfBridge(name) => write!(f, "model `{name}` cannot bridge to itself"),
            Self::ReservedComponentName => f.write_str("component name `none` is reserved"),
            Self::DuplicateComponentName(name) => {
                write!(f, "component name `{name}` is used more than once")
            }
            Self::BadComponentIndices => {
                f.write_str("component indices must be unique and contiguous across 0..3")
            }
            Self::BadMatrixShape => f.write_str("color-space matrix must be 3 by 3"),
            Self::InvalidPrecision => f.write_str("precision must be a non-negative integer"),
        }
    }
}

impl std::error::Error for ValidationError {}

// --------------------------------------------------------------------------------------------------------------------

/// A malformed color string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// No registered color type recognized the string.
    UnsupportedFormat,
    /// An unexpected character at the given byte offset.
    UnexpectedCharacter { offset: usize, found: char },
    /// The function call has the wrong number of component tokens.
    BadTokenCount { expected: usize, found: usize },
    /// Components mix percentages and bare numbers where the grammar
    /// requires them to be uniform.
    InconsistentUnits,
    /// An invalid numeric literal.
    MalformedNumber(String),
    /// A balanced `(...)` expression never closes.
    UnbalancedParens,
    /// A `/` alpha separator with no alpha token after it.
    MissingAlpha,
    /// A construct (e.g. `%` or an angle unit inside `calc()`) that is
    /// disallowed in the legacy or relative syntax it appeared in.
    DisallowedConstruct(&'static str),
    /// An identifier that is not a component of the active model and not a
    /// bound origin-color component.
    UnknownIdentifier(String),
    /// A `color(<space> ...)` whose space name is not registered.
    UnknownColorSpace(String),
    /// The reserved token `none` appeared where it is forbidden (legacy
    /// comma syntax).
    NoneForbidden,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat => f.write_str("unsupported or invalid color format"),
            Self::UnexpectedCharacter { offset, found } => {
                write!(f, "unexpected character `{found}` at offset {offset}")
            }
            Self::BadTokenCount { expected, found } => {
                write!(f, "expected {expected} component tokens, found {found}")
            }
            Self::InconsistentUnits => {
                f.write_str("components must be all percentages or all bare numbers")
            }
            Self::MalformedNumber(s) => write!(f, "malformed numeric literal `{s}`"),
            Self::UnbalancedParens => f.write_str("unbalanced parentheses"),
            Self::MissingAlpha => f.write_str("missing alpha component after `/`"),
            Self::DisallowedConstruct(what) => write!(f, "{what} is not allowed here"),
            Self::UnknownIdentifier(name) => write!(f, "unknown identifier `{name}`"),
            Self::UnknownColorSpace(name) => write!(f, "unknown color space `{name}`"),
            Self::NoneForbidden => f.write_str("`none` is not allowed in legacy syntax"),
        }
    }
}

impl std::error::Error for ParseError {}

// --------------------------------------------------------------------------------------------------------------------

/// A `calc()` expression that failed to evaluate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalcError {
    /// An identifier that is neither a constant nor an origin-color
    /// component.
    UnknownIdentifier(String),
    /// A function name that is not one of the supported math functions.
    UnknownFunction(String),
    /// Tokens remain after a complete expression was parsed.
    TrailingTokens,
    /// A numeric literal could not be parsed.
    MalformedNumber(String),
    /// Mismatched `(`/`)`.
    MismatchedParens,
    /// A `%` or angle unit appeared inside a relative-color `calc()` where it
    /// is disallowed.
    UnitInRelativeCalc,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIdentifier(name) => write!(f, "unknown identifier `{name}` in calc()"),
            Self::UnknownFunction(name) => write!(f, "unknown function `{name}` in calc()"),
            Self::TrailingTokens => f.write_str("extra tokens after calc() expression"),
            Self::MalformedNumber(s) => write!(f, "malformed numeric literal `{s}` in calc()"),
            Self::MismatchedParens => f.write_str("mismatched parentheses in calc()"),
            Self::UnitInRelativeCalc => {
                f.write_str("% and angle units are not allowed inside this calc()")
            }
        }
    }
}

impl std::error::Error for CalcError {}

// --------------------------------------------------------------------------------------------------------------------

/// A lookup into the registry or conversion graph that failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupError {
    /// No model, space, or fit method with this name is registered.
    UnknownName(String),
    /// The conversion graph has no path between the two given models.
    NoPathFound { from: String, to: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownName(name) => write!(f, "`{name}` is not registered"),
            Self::NoPathFound { from, to } => write!(f, "no path found from `{from}` to `{to}`"),
        }
    }
}

impl std::error::Error for LookupError {}

// --------------------------------------------------------------------------------------------------------------------

/// An out-of-range or non-finite numeric value where a finite, in-range one
/// is required (e.g. a negative `precision`, a non-finite matrix entry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumericError {
    /// A value was expected to be finite (no NaN, no infinity).
    NotFinite(&'static str),
    /// A value fell outside its required range.
    OutOfRange {
        what: &'static str,
        min: String,
        max: String,
    },
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinite(what) => write!(f, "{what} must be finite"),
            Self::OutOfRange { what, min, max } => {
                write!(f, "{what} must be between {min} and {max}")
            }
        }
    }
}

impl std::error::Error for NumericError {}

// --------------------------------------------------------------------------------------------------------------------

/// The union of colorcraft's error kinds.
///
/// Every fallible public operation returns `Result<T, Error>`. Call sites
/// that only ever produce one kind of error may match on that variant
/// directly; `?` converts any of the per-kind errors into this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Registration(RegistrationError),
    Validation(ValidationError),
    Parse(ParseError),
    Calc(CalcError),
    Lookup(LookupError),
    Numeric(NumericError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration(e) => e.fmt(f),
            Self::Validation(e) => e.fmt(f),
            Self::Parse(e) => e.fmt(f),
            Self::Calc(e) => e.fmt(f),
            Self::Lookup(e) => e.fmt(f),
            Self::Numeric(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registration(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Calc(e) => Some(e),
            Self::Lookup(e) => Some(e),
            Self::Numeric(e) => Some(e),
        }
    }
}

impl From<RegistrationError> for Error {
    fn from(e: RegistrationError) -> Self {
        Self::Registration(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<CalcError> for Error {
    fn from(e: CalcError) -> Self {
        Self::Calc(e)
    }
}

impl From<LookupError> for Error {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

impl From<NumericError> for Error {
    fn from(e: NumericError) -> Self {
        Self::Numeric(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_display_delegates_to_variant() {
        let err: Error = RegistrationError::NameAlreadyUsed("oklch".to_owned()).into();
        assert_eq!(err.to_string(), "name `oklch` already used");

        let err: Error = LookupError::NoPathFound {
            from: "rgb".to_owned(),
            to: "oklch".to_owned(),
        }
        .into();
        assert_eq!(err.to_string(), "no path found from `rgb` to `oklch`");
    }

    #[test]
    fn error_source_is_populated() {
        use std::error::Error as _;
        let err: Error = ParseError::UnbalancedParens.into();
        assert!(err.source().is_some(), "Error must expose its inner cause");
    }
}
