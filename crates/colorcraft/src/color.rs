//! [`Color`], the object every other module in this crate ultimately serves:
//! a model name plus four coordinates (three components and alpha).
//!
//! Grounded in the shape of the teacher's own `Color` (`src/object.rs`): a
//! thin, cheaply cloned value type wrapping coordinates plus a discriminator
//! for how to interpret them, with conversion, mixing, gamut, and difference
//! methods hung off it. The teacher closes that discriminator over a
//! compile-time `ColorSpace` enum; this crate opens it into a registered
//! model name so the same `Color` type works for both built-in and
//! runtime-registered models.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::difference::{self, Easing, HueInterpolation};
use crate::error::{Error, LookupError, ParseError};
use crate::model::{ColorConverter, FormatOptions};
use crate::registry::Registry;
use crate::Float;

/// A color: a registered model name plus `[c1, c2, c3, alpha]`.
///
/// Coordinates are stored exactly as parsed or computed; they are neither
/// clamped into gamut nor rounded until a caller asks for that explicitly,
/// via [`Color::in_gamut`]/[`Color::fit`] or the `fit` option on
/// [`Color::to`].
#[derive(Clone, Debug, PartialEq)]
pub struct Color {
    model: String,
    pub(crate) coords: [Float; 4],
}

/// Parameters for [`Color::random`].
#[derive(Clone, Debug)]
pub struct RandomOptions {
    /// The model new coordinates are sampled in. Defaults to `"oklch"`.
    pub model: String,
    /// If set, resample (via rejection) until the color also lies in this
    /// gamut. `None` accepts whatever the model's own range produces.
    pub within: Option<String>,
    /// Alpha is always sampled uniformly over `0.0..=1.0` unless this pins
    /// it to a fixed value.
    pub alpha: Option<Float>,
}

impl Default for RandomOptions {
    fn default() -> Self {
        Self {
            model: "oklch".to_owned(),
            within: None,
            alpha: None,
        }
    }
}

/// Parameters for [`Color::mix`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixOptions {
    /// How far toward `other` to move, clamped into `[0.0, 1.0]`.
    pub amount: Float,
    /// Hue interpolation strategy for models with an angle component.
    pub hue: HueInterpolation,
    /// Shaping curve applied to `amount` before the gamma correction.
    pub easing: Easing,
    /// `t' = ease(amount)^(1/gamma)`.
    pub gamma: Float,
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            amount: 0.5,
            hue: HueInterpolation::Shorter,
            easing: Easing::Linear,
            gamma: 1.0,
        }
    }
}

impl Color {
    /// Construct a color directly from a model name and coordinates, with no
    /// validation beyond confirming the model is registered.
    pub fn new(registry: &Registry, model: impl Into<String>, coords: [Float; 4]) -> Result<Self, Error> {
        let model = model.into();
        if !registry.has_model(&model) {
            return Err(LookupError::UnknownName(model).into());
        }
        Ok(Self { model, coords })
    }

    /// Parse a color from its textual representation against the global
    /// registry, trying `color(<space> ...)` first (its bridge is only
    /// known once the space name inside the call is read, so it cannot be
    /// a registered [`crate::ColorConverter`] like every other color type),
    /// then every registered color type in registration order.
    pub fn from(input: &str) -> Result<Self, Error> {
        Self::from_registry(crate::registry::registry(), input)
    }

    /// As [`Color::from`], but against an explicit registry (used by tests
    /// and anyone running more than one registry instance).
    pub fn from_registry(registry: &Registry, input: &str) -> Result<Self, Error> {
        let cleaned = crate::expr::clean(input);

        if cleaned.starts_with("color(") {
            let (space, coords) = crate::parse::parse_color_function(registry, &cleaned)?;
            return Ok(Self { model: space, coords });
        }

        if cleaned.starts_with("color-mix(") {
            let (model, coords) = crate::bases::parse_color_mix(registry, &cleaned)?;
            return Ok(Self { model, coords });
        }

        for (name, converter) in registry.color_types_in_order() {
            if converter.is_valid(&cleaned) {
                let coords = converter.parse(&cleaned)?;
                let bridge = converter.bridge().to_owned();
                // Color types whose converter targets a bridge model other
                // than themselves (e.g. `hex-color` bridging straight to
                // `rgb`) report coordinates in that bridge model.
                let model = if registry.has_model(&name) { name } else { bridge };
                return Ok(Self { model, coords });
            }
        }

        Err(ParseError::UnsupportedFormat.into())
    }

    /// Whether `input` parses as a color against the global registry,
    /// optionally narrowing the scan to one named type (`"color"` or
    /// `"color-mix"` for the two dynamic forms, or any name registered via
    /// [`Registry::register_color_type`]). With no type given, this is
    /// equivalent to `Color::from(input).is_ok()`.
    pub fn is_valid(input: &str, type_name: Option<&str>) -> bool {
        Self::is_valid_in(crate::registry::registry(), input, type_name)
    }

    fn is_valid_in(registry: &Registry, input: &str, type_name: Option<&str>) -> bool {
        let cleaned = crate::expr::clean(input);
        match type_name {
            None => Self::from_registry(registry, input).is_ok(),
            Some("color") => {
                cleaned.starts_with("color(") && crate::parse::parse_color_function(registry, &cleaned).is_ok()
            }
            Some("color-mix") => {
                cleaned.starts_with("color-mix(") && crate::bases::parse_color_mix(registry, &cleaned).is_ok()
            }
            Some(name) => match registry.color_type(name) {
                Some(converter) => converter.is_valid(&cleaned) && converter.parse(&cleaned).is_ok(),
                None => false,
            },
        }
    }

    /// Identify which registered color type `input` matches, scanning in the
    /// same order as [`Color::from`].
    ///
    /// Non-strict mode returns the first type whose `is_valid` accepts the
    /// cleaned input. Strict mode additionally performs that candidate's
    /// full parse and construction round-trip, and only accepts it if the
    /// round-trip succeeds — it does not keep scanning the remaining types
    /// if the round-trip fails, mirroring `Color::from`'s own first-match
    /// behavior.
    pub fn of_type(input: &str, strict: bool) -> Result<String, Error> {
        Self::of_type_in(crate::registry::registry(), input, strict)
    }

    fn of_type_in(registry: &Registry, input: &str, strict: bool) -> Result<String, Error> {
        let cleaned = crate::expr::clean(input);

        if cleaned.starts_with("color(") {
            return if !strict || crate::parse::parse_color_function(registry, &cleaned).is_ok() {
                Ok("color".to_owned())
            } else {
                Err(ParseError::UnsupportedFormat.into())
            };
        }

        if cleaned.starts_with("color-mix(") {
            return if !strict || crate::bases::parse_color_mix(registry, &cleaned).is_ok() {
                Ok("color-mix".to_owned())
            } else {
                Err(ParseError::UnsupportedFormat.into())
            };
        }

        for (name, converter) in registry.color_types_in_order() {
            if converter.is_valid(&cleaned) {
                return if !strict || converter.parse(&cleaned).is_ok() {
                    Ok(name)
                } else {
                    Err(ParseError::UnsupportedFormat.into())
                };
            }
        }

        Err(ParseError::UnsupportedFormat.into())
    }

    /// The name of the model this color's coordinates are expressed in.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// This color's four raw coordinates, `[c1, c2, c3, alpha]`.
    pub fn to_array(&self) -> [Float; 4] {
        self.coords
    }

    /// This color's three named components plus `"alpha"`, as an object.
    pub fn to_object(&self, registry: &Registry) -> Result<std::collections::HashMap<String, Float>, Error> {
        let model = registry.model(&self.model)?;
        let mut out = std::collections::HashMap::with_capacity(4);
        for (name, def) in &model.components {
            out.insert(name.clone(), self.coords[def.index]);
        }
        out.insert("alpha".to_owned(), self.coords[3]);
        Ok(out)
    }

    /// Sample a uniformly random color, per `options`.
    pub fn random(registry: &Registry, options: &RandomOptions) -> Result<Self, Error> {
        let model = registry.model(&options.model)?;
        let mut rng = rand::rng();
        let mut coords = [0.0; 4];

        loop {
            for (_, def) in &model.components {
                let (min, max) = def.value_kind.range();
                let sampler = Uniform::new_inclusive(min, max).map_err(|_| {
                    crate::error::NumericError::OutOfRange {
                        what: "random sample range",
                        min: format!("{min}"),
                        max: format!("{max}"),
                    }
                })?;
                coords[def.index] = sampler.sample(&mut rng);
            }
            coords[3] = options.alpha.unwrap_or_else(|| rng.random_range(0.0..=1.0));

            let candidate = Self {
                model: options.model.clone(),
                coords,
            };

            match &options.within {
                None => return Ok(candidate),
                Some(gamut) => {
                    if candidate.in_gamut(registry, Some(gamut))? {
                        return Ok(candidate);
                    }
                }
            }
        }
    }

    /// Convert into `model_name`, returning a new [`Color`].
    pub fn in_model(&self, registry: &Registry, model_name: &str) -> Result<Self, Error> {
        if self.model == model_name {
            return Ok(self.clone());
        }
        let [c1, c2, c3] = crate::graph::convert(
            registry,
            &self.model,
            model_name,
            [self.coords[0], self.coords[1], self.coords[2]],
        )?;
        Ok(Self {
            model: model_name.to_owned(),
            coords: [c1, c2, c3, self.coords[3]],
        })
    }

    /// Convert into `model_name` and format the result, fitting into gamut
    /// per `options.fit` along the way.
    ///
    /// `model_name` may also name a specialised color base (`hex-color`,
    /// `named-color`, ...) rather than a registered model: those converters
    /// carry their own `format`, invoked on this color's coordinates once
    /// converted into the converter's declared bridge.
    pub fn to(&self, registry: &Registry, model_name: &str, options: &FormatOptions) -> Result<String, Error> {
        if registry.has_model(model_name) {
            let converted = self.in_model(registry, model_name)?;
            let model = registry.model(model_name)?;
            let is_space = matches!(model.target_gamut, crate::model::TargetGamut::Named(ref n) if n == model_name)
                && model.components.iter().all(|(n, _)| n == "r" || n == "g" || n == "b");
            return crate::parse::format_model(registry, model_name, &model, &converted.coords, options, is_space);
        }

        let converter = registry
            .color_type(model_name)
            .ok_or_else(|| LookupError::UnknownName(model_name.to_owned()))?;
        match converter {
            ColorConverter::Full {
                bridge,
                from_bridge,
                format,
                ..
            } => {
                let converted = self.in_model(registry, &bridge)?;
                let fitted = crate::gamut::fit(
                    registry,
                    &bridge,
                    [converted.coords[0], converted.coords[1], converted.coords[2]],
                    &options.fit,
                    options.precision,
                )?;
                let own = from_bridge(&fitted);
                format(&[own[0], own[1], own[2], converted.coords[3]], options)
            }
            ColorConverter::Basic { .. } => Err(ParseError::UnsupportedFormat.into()),
        }
    }

    /// Format this color in its own model, with default options (`fit =
    /// "css-gamut-map"`).
    pub fn to_default_string(&self, registry: &Registry) -> Result<String, Error> {
        self.to(registry, &self.model, &FormatOptions::new("css-gamut-map"))
    }

    /// Return a copy with `component` (one of the model's own component
    /// names, or `"alpha"`) replaced by `value`.
    pub fn with(&self, registry: &Registry, component: &str, value: Float) -> Result<Self, Error> {
        let mut coords = self.coords;
        if component == "alpha" {
            coords[3] = value.clamp(0.0, 1.0);
        } else {
            let model = registry.model(&self.model)?;
            let def = model
                .component(component)
                .ok_or_else(|| LookupError::UnknownName(component.to_owned()))?;
            coords[def.index] = value;
        }
        Ok(Self {
            model: self.model.clone(),
            coords,
        })
    }

    /// Whether this color lies inside `gamut` (defaults to its own model's
    /// declared target gamut).
    pub fn in_gamut(&self, registry: &Registry, gamut: Option<&str>) -> Result<bool, Error> {
        match gamut {
            Some(name) => {
                let converted = self.in_model(registry, name)?;
                crate::gamut::in_gamut(registry, name, [converted.coords[0], converted.coords[1], converted.coords[2]])
            }
            None => crate::gamut::in_gamut(registry, &self.model, [self.coords[0], self.coords[1], self.coords[2]]),
        }
    }

    /// Whether this color lies inside `gamut_name`; an ergonomic alias for
    /// `in_gamut(registry, Some(gamut_name))`.
    pub fn within(&self, registry: &Registry, gamut_name: &str) -> Result<bool, Error> {
        self.in_gamut(registry, Some(gamut_name))
    }

    /// Fit this color's coordinates into `gamut_name` using `method`,
    /// returning a new color still expressed in this color's own model.
    pub fn fit(&self, registry: &Registry, method: &str) -> Result<Self, Error> {
        let fitted = crate::gamut::fit(
            registry,
            &self.model,
            [self.coords[0], self.coords[1], self.coords[2]],
            method,
            None,
        )?;
        Ok(Self {
            model: self.model.clone(),
            coords: [fitted[0], fitted[1], fitted[2], self.coords[3]],
        })
    }

    /// Mix this color with `other`, interpolating in `interpolation_model`.
    ///
    /// `options.amount` is clamped into `[0.0, 1.0]` (`0.0` is entirely this
    /// color, `1.0` is entirely `other`); at either exact endpoint, the
    /// corresponding input color is converted into `interpolation_model`
    /// and returned as-is, bypassing easing, gamma, and premultiplication
    /// entirely. Otherwise the amount is eased
    /// and gamma-corrected into `t' = ease(amount)^(1/gamma)`, the hue
    /// component (if any) is interpolated per `options.hue` without
    /// premultiplication, and if either input's alpha is below `1.0` the
    /// remaining components are mixed in premultiplied form; if the
    /// resulting alpha is exactly zero, those components are zeroed instead
    /// of dividing by it.
    pub fn mix(
        &self,
        registry: &Registry,
        other: &Self,
        interpolation_model: &str,
        options: &MixOptions,
    ) -> Result<Self, Error> {
        let t = options.amount.clamp(0.0, 1.0);
        if t == 0.0 {
            return self.in_model(registry, interpolation_model);
        }
        if t == 1.0 {
            return other.in_model(registry, interpolation_model);
        }

        let model = registry.model(interpolation_model)?;
        let is_polar = model.hue_component().is_some();
        let hue_index = model.hue_component().map(|(_, def)| def.index);

        let a = self.in_model(registry, interpolation_model)?;
        let b = other.in_model(registry, interpolation_model)?;

        let mut ca = [a.coords[0], a.coords[1], a.coords[2]];
        let mut cb = [b.coords[0], b.coords[1], b.coords[2]];
        difference::normalize_nan(is_polar, &mut ca);
        difference::normalize_nan(is_polar, &mut cb);

        if let Some(index) = hue_index {
            let [h1, h2] = difference::prepare_hue_interpolation(options.hue, ca[index], cb[index]);
            ca[index] = h1;
            cb[index] = h2;
        }

        let eased = options.easing.apply(t);
        let t_prime = if options.gamma == 1.0 { eased } else { eased.powf(options.gamma.recip()) };

        let alpha1 = a.coords[3];
        let alpha2 = b.coords[3];

        let (mixed, alpha) = if alpha1 < 1.0 || alpha2 < 1.0 {
            let alpha_out = alpha1 * (1.0 - t_prime) + alpha2 * t_prime;
            let mut out = [0.0; 3];
            for i in 0..3 {
                out[i] = if Some(i) == hue_index {
                    ca[i] + t_prime * (cb[i] - ca[i])
                } else if alpha_out == 0.0 {
                    0.0
                } else {
                    (ca[i] * alpha1 * (1.0 - t_prime) + cb[i] * alpha2 * t_prime) / alpha_out
                };
            }
            (out, alpha_out)
        } else {
            (difference::interpolate(t_prime, &ca, &cb), 1.0)
        };

        Ok(Self {
            model: interpolation_model.to_owned(),
            coords: [mixed[0], mixed[1], mixed[2], alpha],
        })
    }

    /// Whether two colors are equal after converting `other` into this
    /// color's model and comparing rounded coordinates.
    pub fn equals(&self, registry: &Registry, other: &Self) -> Result<bool, Error> {
        let other_here = other.in_model(registry, &self.model)?;
        let round = |v: Float| (v * 1e10).round();
        Ok((0..4).all(|i| round(self.coords[i]) == round(other_here.coords[i])))
    }

    /// WCAG 2.1 contrast ratio between this color and `other`, both
    /// converted into sRGB first.
    pub fn contrast(&self, registry: &Registry, other: &Self) -> Result<Float, Error> {
        let a = self.in_model(registry, "srgb")?;
        let b = other.in_model(registry, "srgb")?;
        difference::wcag_contrast(registry, [a.coords[0], a.coords[1], a.coords[2]], [b.coords[0], b.coords[1], b.coords[2]])
    }

    /// ΔEOK: Euclidean distance in Oklab, scaled by 100 as is conventional.
    pub fn delta_e_ok(&self, registry: &Registry, other: &Self) -> Result<Float, Error> {
        let a = self.in_model(registry, "oklab")?;
        let b = other.in_model(registry, "oklab")?;
        Ok(difference::delta_e_ok(
            &[a.coords[0], a.coords[1], a.coords[2]],
            &[b.coords[0], b.coords[1], b.coords[2]],
        ) * 100.0)
    }

    /// CIE76 ΔE, computed in CIE Lab.
    pub fn delta_e76(&self, registry: &Registry, other: &Self) -> Result<Float, Error> {
        let a = self.in_model(registry, "lab")?;
        let b = other.in_model(registry, "lab")?;
        Ok(difference::delta_e76(
            &[a.coords[0], a.coords[1], a.coords[2]],
            &[b.coords[0], b.coords[1], b.coords[2]],
        ))
    }

    /// CIE94 ΔE, computed in CIE Lab.
    pub fn delta_e94(&self, registry: &Registry, other: &Self) -> Result<Float, Error> {
        let a = self.in_model(registry, "lab")?;
        let b = other.in_model(registry, "lab")?;
        Ok(difference::delta_e94(
            &[a.coords[0], a.coords[1], a.coords[2]],
            &[b.coords[0], b.coords[1], b.coords[2]],
        ))
    }

    /// CIEDE2000 ΔE, computed in CIE Lab.
    pub fn delta_e2000(&self, registry: &Registry, other: &Self) -> Result<Float, Error> {
        let a = self.in_model(registry, "lab")?;
        let b = other.in_model(registry, "lab")?;
        Ok(difference::delta_e2000(
            &[a.coords[0], a.coords[1], a.coords[2]],
            &[b.coords[0], b.coords[1], b.coords[2]],
        ))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_default_string(crate::registry::registry()) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}({:?})", self.model, self.coords),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::registry;

    #[test]
    fn parses_hex_and_converts_to_rgb() {
        let color = Color::from("#ff5733").unwrap();
        let rgb = color.in_model(registry(), "rgb").unwrap();
        assert!((rgb.coords[0] - 255.0).abs() < 1e-6);
        assert!((rgb.coords[1] - 87.0).abs() < 1e-6);
        assert!((rgb.coords[2] - 51.0).abs() < 1e-6);
    }

    #[test]
    fn formats_rgb_modern_syntax() {
        let color = Color::from("#ff5733").unwrap();
        let registry = registry();
        let text = color.to(registry, "rgb", &FormatOptions::new("none")).unwrap();
        assert_eq!(text, "rgb(255 87 51)");
    }

    #[test]
    fn is_valid_with_no_type_matches_is_valid_with_no_args() {
        assert!(Color::is_valid("#ff5733", None));
        assert!(!Color::is_valid("not-a-color", None));
    }

    #[test]
    fn is_valid_narrows_the_scan_to_the_named_type() {
        assert!(Color::is_valid("#ff5733", Some("hex-color")));
        assert!(!Color::is_valid("#ff5733", Some("named-color")));
        assert!(Color::is_valid("color(display-p3 1 0 0)", Some("color")));
        assert!(!Color::is_valid("color(display-p3 1 0 0)", Some("hex-color")));
    }

    #[test]
    fn is_valid_with_an_unregistered_type_name_is_false() {
        assert!(!Color::is_valid("#ff5733", Some("not-a-type")));
    }

    #[test]
    fn of_type_identifies_the_matching_type() {
        assert_eq!(Color::of_type("#ff5733", false).unwrap(), "hex-color");
        assert_eq!(Color::of_type("color(display-p3 1 0 0)", false).unwrap(), "color");
        assert_eq!(
            Color::of_type("color-mix(in hsl, hsl(0 100 50) 30%, hsl(120 100 50) 50%)", false).unwrap(),
            "color-mix"
        );
        assert!(Color::of_type("not-a-color", false).is_err());
    }

    #[test]
    fn mix_interpolates_hue_shorter() {
        let registry = registry();
        let a = Color::from("hsl(10 100% 50%)").unwrap();
        let b = Color::from("hsl(350 100% 50%)").unwrap();
        let options = MixOptions {
            hue: HueInterpolation::Shorter,
            ..Default::default()
        };
        let mixed = a.mix(registry, &b, "hsl", &options).unwrap();
        assert!((mixed.coords[0] - 0.0).abs() < 1e-6 || (mixed.coords[0] - 360.0).abs() < 1e-6);
    }

    #[test]
    fn mix_endpoints_equal_the_respective_input() {
        let registry = registry();
        let a = Color::from("hsl(10 100% 50%)").unwrap();
        let b = Color::from("hsl(350 100% 50%)").unwrap();

        let at_zero = a.mix(registry, &b, "hsl", &MixOptions { amount: 0.0, ..Default::default() }).unwrap();
        assert!(at_zero.equals(registry, &a).unwrap());

        let at_one = a.mix(registry, &b, "hsl", &MixOptions { amount: 1.0, ..Default::default() }).unwrap();
        assert!(at_one.equals(registry, &b).unwrap());
    }

    #[test]
    fn mix_premultiplies_alpha_when_either_input_is_translucent() {
        let registry = registry();
        let transparent_red = Color::from("rgb(255 0 0 / 0)").unwrap();
        let opaque_blue = Color::from("rgb(0 0 255)").unwrap();
        let mixed = transparent_red
            .mix(registry, &opaque_blue, "rgb", &MixOptions { amount: 0.5, ..Default::default() })
            .unwrap();
        // alpha' = 0*0.5 + 1*0.5 = 0.5; premultiplied non-hue channels are
        // entirely opaque_blue's contribution since transparent_red's own
        // weight (alpha * (1 - t)) is zero.
        assert!((mixed.coords[3] - 0.5).abs() < 1e-9);
        assert!((mixed.coords[0] - 0.0).abs() < 1e-6);
        assert!((mixed.coords[2] - 255.0).abs() < 1e-6);
    }

    #[test]
    fn contrast_of_black_and_white_is_near_21() {
        let registry = registry();
        let black = Color::from("#000000").unwrap();
        let white = Color::from("#ffffff").unwrap();
        let ratio = black.contrast(registry, &white).unwrap();
        assert!((ratio - 21.0).abs() < 0.01);
    }

    #[test]
    fn equals_after_round_trip_through_another_model() {
        let registry = registry();
        let a = Color::from("rgb(255 87 51)").unwrap();
        let b = a.in_model(registry, "oklch").unwrap().in_model(registry, "rgb").unwrap();
        assert!(a.equals(registry, &b).unwrap());
    }

    #[test]
    fn random_within_srgb_stays_in_gamut() {
        let registry = registry();
        let options = RandomOptions {
            model: "srgb".to_owned(),
            within: Some("srgb".to_owned()),
            alpha: Some(1.0),
        };
        let color = Color::random(registry, &options).unwrap();
        assert!(color.in_gamut(registry, None).unwrap());
    }
}
