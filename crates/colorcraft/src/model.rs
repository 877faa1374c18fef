//! The shapes a registered model, color space, or color-dispatchable
//! converter takes.
//!
//! The set of *models* is open — new ones arrive through
//! [`crate::Registry::register_color_function`] and
//! [`crate::Registry::register_color_space`] — but the set of *shapes* a
//! converter can take is closed, so [`ColorConverter`] is a tagged enum
//! rather than a trait object, the same choice the teacher crate makes for
//! its closed `ColorSpace` enum.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, ValidationError};
use crate::Float;

/// A pure, thread-safe `[Float; 3] -> [Float; 3]` transform.
///
/// Built-ins wrap a plain `fn` item; converters registered at runtime wrap a
/// closure. Both coerce into this alias without the caller needing to care
/// which.
pub type Transform = Arc<dyn Fn(&[Float; 3]) -> [Float; 3] + Send + Sync>;

/// Wrap a plain function pointer as a [`Transform`].
pub fn transform(f: fn(&[Float; 3]) -> [Float; 3]) -> Transform {
    Arc::new(f)
}

// --------------------------------------------------------------------------------------------------------------------

/// What kind of value a component holds, and therefore how the parser and
/// formatter treat it.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    /// A bounded or unbounded numeric range.
    Range { min: Float, max: Float },
    /// An angle, implicitly ranged `0..360` and wrapping at the boundary.
    Angle,
    /// A percentage, implicitly ranged `0..100`.
    Percentage,
}

impl ValueKind {
    /// The numeric range this kind implies, for clamping and percent
    /// remapping.
    pub fn range(&self) -> (Float, Float) {
        match self {
            Self::Range { min, max } => (*min, *max),
            Self::Angle => (0.0, 360.0),
            Self::Percentage => (0.0, 100.0),
        }
    }

    /// Whether this kind is the hue-carrying `angle` kind.
    pub fn is_angle(&self) -> bool {
        matches!(self, Self::Angle)
    }

    /// Whether this kind is a `percentage`.
    pub fn is_percentage(&self) -> bool {
        matches!(self, Self::Percentage)
    }
}

/// An immutable description of one of a model's three non-alpha components.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDefinition {
    /// Position in the model's coordinate vector, `0..3`.
    pub index: usize,
    pub value_kind: ValueKind,
    /// Rounding precision in decimal digits; `None` means "do not round".
    pub precision: Option<u32>,
}

impl ComponentDefinition {
    pub fn new(index: usize, value_kind: ValueKind, precision: Option<u32>) -> Self {
        Self {
            index,
            value_kind,
            precision,
        }
    }

    /// Clamp `value` into this component's range, wrapping angles modulo 360
    /// instead of clamping them.
    pub fn clamp(&self, value: Float) -> Float {
        if self.value_kind.is_angle() {
            value.rem_euclid(360.0)
        } else {
            let (min, max) = self.value_kind.range();
            value.clamp(min, max)
        }
    }

    /// Map `none`/NaN/+∞/−∞ to 0/0/max/min, per spec: the earliest boundary
    /// that knows the component's range.
    pub fn normalize(&self, value: Float) -> Float {
        if value.is_nan() {
            0.0
        } else if value == Float::INFINITY {
            self.value_kind.range().1
        } else if value == Float::NEG_INFINITY {
            self.value_kind.range().0
        } else {
            value
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// Where a model's coordinates must ultimately land to be "in gamut".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetGamut {
    /// No gamut constraint applies (e.g. `lab`, `oklch`, `xyz`).
    Unbounded,
    /// The name of a registered color space whose component ranges define
    /// the gamut.
    Named(String),
}

impl TargetGamut {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A registered model: its three named, ordered components, its declared
/// bridge model, and the pure conversions to and from that bridge.
#[derive(Clone)]
pub struct ColorModelConverter {
    /// Ordered `name -> definition` pairs; order is the model's declared
    /// component order (not necessarily index order, though built-ins keep
    /// them aligned).
    pub components: Vec<(String, ComponentDefinition)>,
    /// Name of this model's single bridge neighbor in the conversion graph.
    pub bridge: String,
    pub to_bridge: Transform,
    pub from_bridge: Transform,
    pub target_gamut: TargetGamut,
    pub supports_legacy: bool,
    /// The legacy alpha-variant function name (e.g. `rgba` for `rgb`).
    pub alpha_variant: Option<String>,
}

impl fmt::Debug for ColorModelConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorModelConverter")
            .field("components", &self.components)
            .field("bridge", &self.bridge)
            .field("target_gamut", &self.target_gamut)
            .field("supports_legacy", &self.supports_legacy)
            .field("alpha_variant", &self.alpha_variant)
            .finish_non_exhaustive()
    }
}

impl ColorModelConverter {
    /// Look up a component definition by name (case-sensitive; callers
    /// lower-case first, per registry contract).
    pub fn component(&self, name: &str) -> Option<&ComponentDefinition> {
        self.components.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// The component whose `value_kind` is `angle`, if this model has one
    /// (used by `mix` to select the hue-interpolation rule).
    pub fn hue_component(&self) -> Option<(&str, &ComponentDefinition)> {
        self.components
            .iter()
            .find(|(_, d)| d.value_kind.is_angle())
            .map(|(n, d)| (n.as_str(), d))
    }

    /// Validate the local shape invariants: no component named `none`, no
    /// duplicate names, and indices unique and contiguous across `0..3`.
    ///
    /// This does not check that `bridge` names a registered model, nor that
    /// it differs from this model's own name — both require the name this
    /// converter is being registered under, which only the registry knows.
    pub fn validate(&self) -> Result<(), Error> {
        if self.components.len() != 3 {
            return Err(ValidationError::BadComponentIndices.into());
        }

        let mut seen_names = std::collections::HashSet::new();
        let mut seen_indices = [false; 3];
        for (name, def) in &self.components {
            if name == "none" {
                return Err(ValidationError::ReservedComponentName.into());
            }
            if !seen_names.insert(name.clone()) {
                return Err(ValidationError::DuplicateComponentName(name.clone()).into());
            }
            if def.index >= 3 || seen_indices[def.index] {
                return Err(ValidationError::BadComponentIndices.into());
            }
            seen_indices[def.index] = true;
        }

        Ok(())
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A `color(<space> ...)` converter: a [`ColorModelConverter`] plus the 3x3
/// matrices and optional transfer functions it is composed from.
///
/// [`crate::Registry::register_color_space`] folds this into a plain
/// [`ColorModelConverter`] (composing matrix and transfer function into
/// single `to_bridge`/`from_bridge` closures) before installing it, so the
/// conversion graph never needs to know a model originated as a color space.
pub struct ColorSpaceConverter {
    pub bridge: String,
    pub to_bridge_matrix: [[Float; 3]; 3],
    pub from_bridge_matrix: [[Float; 3]; 3],
    /// Defaults to the identity transform.
    pub to_linear: Option<Transform>,
    /// Defaults to the identity transform.
    pub from_linear: Option<Transform>,
    /// Defaults to `Named(<own name>)`; pass `Unbounded` for XYZ variants.
    pub target_gamut: TargetGamut,
}

impl ColorSpaceConverter {
    /// Validate that both matrices are finite 3x3 matrices.
    pub fn validate(&self) -> Result<(), Error> {
        for row in self.to_bridge_matrix.iter().chain(self.from_bridge_matrix.iter()) {
            if row.len() != 3 || row.iter().any(|v| !v.is_finite()) {
                return Err(ValidationError::BadMatrixShape.into());
            }
        }
        Ok(())
    }

    /// Compose this color space's matrix and transfer function into a
    /// [`ColorModelConverter`] with standard `r`, `g`, `b` (or `x`, `y`, `z`
    /// for unbounded XYZ-like spaces) components in `[0, 1]`, precision 5.
    pub fn into_model_converter(self, own_name: &str) -> Result<ColorModelConverter, Error> {
        self.validate()?;

        let to_linear = self.to_linear.unwrap_or_else(identity_transform);
        let from_linear = self.from_linear.unwrap_or_else(identity_transform);
        let to_bridge_matrix = self.to_bridge_matrix;
        let from_bridge_matrix = self.from_bridge_matrix;

        let to_bridge: Transform = Arc::new(move |value: &[Float; 3]| {
            let linear = to_linear(value);
            crate::core::math::multiply(&to_bridge_matrix, &linear)
        });
        let from_bridge: Transform = Arc::new(move |value: &[Float; 3]| {
            let linear = crate::core::math::multiply(&from_bridge_matrix, value);
            from_linear(&linear)
        });

        let target_gamut = match &self.target_gamut {
            TargetGamut::Unbounded => TargetGamut::Unbounded,
            TargetGamut::Named(name) if name.is_empty() => TargetGamut::named(own_name),
            TargetGamut::Named(name) => TargetGamut::named(name.clone()),
        };

        let components = ["r", "g", "b"]
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                (
                    name.to_owned(),
                    ComponentDefinition::new(
                        index,
                        ValueKind::Range {
                            min: 0.0,
                            max: 1.0,
                        },
                        Some(5),
                    ),
                )
            })
            .collect();

        Ok(ColorModelConverter {
            components,
            bridge: self.bridge,
            to_bridge,
            from_bridge,
            target_gamut,
            supports_legacy: false,
            alpha_variant: None,
        })
    }
}

fn identity_transform() -> Transform {
    Arc::new(|value: &[Float; 3]| *value)
}

// --------------------------------------------------------------------------------------------------------------------

/// Parsed component tokens plus alpha, prior to normalization/clamping: what
/// a color-converter's `parse` produces.
pub type ParsedColor = [Float; 4];

/// Formatting knobs threaded through `to`/`to_string` down to a converter's
/// `format`.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatOptions {
    pub legacy: bool,
    /// Name of a registered fit method.
    pub fit: String,
    /// `None` uses each component's own precision.
    pub precision: Option<u32>,
    pub units: bool,
}

impl FormatOptions {
    pub fn new(fit: impl Into<String>) -> Self {
        Self {
            legacy: false,
            fit: fit.into(),
            precision: None,
            units: false,
        }
    }
}

type PredicateFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;
type ParseFn = Arc<dyn Fn(&str) -> Result<ParsedColor, Error> + Send + Sync>;
type FormatFn = Arc<dyn Fn(&ParsedColor, &FormatOptions) -> Result<String, Error> + Send + Sync>;

/// What the parser dispatches on for every entry in the color-types and
/// color-bases tables.
///
/// `Basic` covers converters the parser can recognize and construct from but
/// never needs to format back out verbatim (e.g. `currentcolor`, which
/// always formats through its bridge model instead). `Full` additionally
/// carries `from_bridge` and `format`, required together per spec: a
/// converter either offers both directions or neither.
#[derive(Clone)]
pub enum ColorConverter {
    Basic {
        is_valid: PredicateFn,
        bridge: String,
        to_bridge: Transform,
        parse: ParseFn,
    },
    Full {
        is_valid: PredicateFn,
        bridge: String,
        to_bridge: Transform,
        parse: ParseFn,
        from_bridge: Transform,
        format: FormatFn,
    },
}

impl fmt::Debug for ColorConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { bridge, .. } => f
                .debug_struct("ColorConverter::Basic")
                .field("bridge", bridge)
                .finish_non_exhaustive(),
            Self::Full { bridge, .. } => f
                .debug_struct("ColorConverter::Full")
                .field("bridge", bridge)
                .finish_non_exhaustive(),
        }
    }
}

impl ColorConverter {
    pub fn is_valid(&self, input: &str) -> bool {
        match self {
            Self::Basic { is_valid, .. } | Self::Full { is_valid, .. } => is_valid(input),
        }
    }

    pub fn bridge(&self) -> &str {
        match self {
            Self::Basic { bridge, .. } | Self::Full { bridge, .. } => bridge,
        }
    }

    pub fn to_bridge(&self, coords: &[Float; 3]) -> [Float; 3] {
        match self {
            Self::Basic { to_bridge, .. } | Self::Full { to_bridge, .. } => to_bridge(coords),
        }
    }

    pub fn parse(&self, input: &str) -> Result<ParsedColor, Error> {
        match self {
            Self::Basic { parse, .. } | Self::Full { parse, .. } => parse(input),
        }
    }

    /// Build a `ColorConverter::Full` that simply wraps a
    /// [`ColorModelConverter`]'s own parser/formatter, the shape
    /// `register_color_function`/`register_color_space` install for every
    /// model name (see `crate::registry`).
    pub fn from_model(
        is_valid: PredicateFn,
        bridge: String,
        to_bridge: Transform,
        from_bridge: Transform,
        parse: ParseFn,
        format: FormatFn,
    ) -> Self {
        Self::Full {
            is_valid,
            bridge,
            to_bridge,
            parse,
            from_bridge,
            format,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn rgb_model() -> ColorModelConverter {
        ColorModelConverter {
            components: vec![
                (
                    "r".to_owned(),
                    ComponentDefinition::new(0, ValueKind::Range { min: 0.0, max: 255.0 }, Some(0)),
                ),
                (
                    "g".to_owned(),
                    ComponentDefinition::new(1, ValueKind::Range { min: 0.0, max: 255.0 }, Some(0)),
                ),
                (
                    "b".to_owned(),
                    ComponentDefinition::new(2, ValueKind::Range { min: 0.0, max: 255.0 }, Some(0)),
                ),
            ],
            bridge: "xyz-d65".to_owned(),
            to_bridge: transform(|v| *v),
            from_bridge: transform(|v| *v),
            target_gamut: TargetGamut::named("srgb"),
            supports_legacy: true,
            alpha_variant: Some("rgba".to_owned()),
        }
    }

    #[test]
    fn validate_accepts_well_formed_model() {
        assert!(rgb_model().validate().is_ok());
    }

    #[test]
    fn validate_rejects_reserved_component_name() {
        let mut model = rgb_model();
        model.components[0].0 = "none".to_owned();
        assert!(matches!(
            model.validate(),
            Err(Error::Validation(ValidationError::ReservedComponentName))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_component_name() {
        let mut model = rgb_model();
        model.components[1].0 = "r".to_owned();
        assert!(matches!(
            model.validate(),
            Err(Error::Validation(ValidationError::DuplicateComponentName(_)))
        ));
    }

    #[test]
    fn component_normalize_maps_none_nan_and_infinities() {
        let def = ComponentDefinition::new(0, ValueKind::Range { min: 0.0, max: 255.0 }, Some(0));
        assert_eq!(def.normalize(Float::NAN), 0.0);
        assert_eq!(def.normalize(Float::INFINITY), 255.0);
        assert_eq!(def.normalize(Float::NEG_INFINITY), 0.0);
        assert_eq!(def.normalize(100.0), 100.0);
    }

    #[test]
    fn hue_component_finds_angle_kind() {
        let hsl = ColorModelConverter {
            components: vec![
                ("h".to_owned(), ComponentDefinition::new(0, ValueKind::Angle, Some(1))),
                (
                    "s".to_owned(),
                    ComponentDefinition::new(1, ValueKind::Percentage, Some(1)),
                ),
                (
                    "l".to_owned(),
                    ComponentDefinition::new(2, ValueKind::Percentage, Some(1)),
                ),
            ],
            bridge: "rgb".to_owned(),
            to_bridge: transform(|v| *v),
            from_bridge: transform(|v| *v),
            target_gamut: TargetGamut::Unbounded,
            supports_legacy: true,
            alpha_variant: Some("hsla".to_owned()),
        };
        assert_eq!(hsl.hue_component().map(|(n, _)| n), Some("h"));
        assert_eq!(rgb_model().hue_component().map(|(n, _)| n), None);
    }
}
