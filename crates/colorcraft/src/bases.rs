//! Specialised color bases: notations that parse into `rgb` but are not
//! themselves registered models — hex, named colors, `transparent`,
//! `currentcolor`, `<system-color>`, `color-mix()`, `device-cmyk()`,
//! `light-dark()`, and `contrast-color()`.
//!
//! Grounded in the teacher's `core::string::parse_css` prefix dispatch for
//! the simple literal/hex cases, and in `parse::parse_color_function` for
//! the function-call cases that need their own tokenizing (their bridge, or
//! in `color-mix`'s case their entire weighting arithmetic, is not a fixed
//! property of a registered `ColorModelConverter`).

use std::sync::Arc;

use crate::color::Color;
use crate::difference::HueInterpolation;
use crate::error::{Error, LookupError, ParseError};
use crate::expr;
use crate::model::{transform, ColorConverter, ComponentDefinition, FormatOptions, ValueKind};
use crate::parse::{strip_call, tokenize_arguments};
use crate::registry::Registry;
use crate::Float;

pub(crate) fn install(registry: &Registry) {
    install_hex_color(registry);
    install_named_color(registry);
    install_transparent(registry);
    install_currentcolor(registry);
    install_system_color(registry);
    install_device_cmyk(registry);
    install_contrast_color(registry);
    install_light_dark(registry);
}

fn round_channel(value: Float) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn hex_pair(value: u8) -> String {
    format!("{value:02X}")
}

// -- hex-color ---------------------------------------------------------------------------------

fn is_hex_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn parse_hex_color(input: &str) -> Result<[Float; 4], Error> {
    let digits = input.strip_prefix('#').ok_or(ParseError::UnsupportedFormat)?;
    if !is_hex_digits(digits) {
        return Err(ParseError::UnsupportedFormat.into());
    }

    let expand = |c: char| -> u8 { u8::from_str_radix(&format!("{c}{c}"), 16).unwrap_or(0) };
    let byte = |pair: &str| -> u8 { u8::from_str_radix(pair, 16).unwrap_or(0) };

    let chars: Vec<char> = digits.chars().collect();
    match chars.len() {
        3 => Ok([
            expand(chars[0]) as Float,
            expand(chars[1]) as Float,
            expand(chars[2]) as Float,
            1.0,
        ]),
        4 => Ok([
            expand(chars[0]) as Float,
            expand(chars[1]) as Float,
            expand(chars[2]) as Float,
            expand(chars[3]) as Float / 255.0,
        ]),
        6 => Ok([
            byte(&digits[0..2]) as Float,
            byte(&digits[2..4]) as Float,
            byte(&digits[4..6]) as Float,
            1.0,
        ]),
        8 => Ok([
            byte(&digits[0..2]) as Float,
            byte(&digits[2..4]) as Float,
            byte(&digits[4..6]) as Float,
            byte(&digits[6..8]) as Float / 255.0,
        ]),
        _ => Err(ParseError::UnsupportedFormat.into()),
    }
}

fn install_hex_color(registry: &Registry) {
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> =
        Arc::new(|input: &str| parse_hex_color(&expr::clean(input)).is_ok());
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> =
        Arc::new(|input: &str| parse_hex_color(&expr::clean(input)));
    let format: Arc<dyn Fn(&[Float; 4], &FormatOptions) -> Result<String, Error> + Send + Sync> =
        Arc::new(|coords: &[Float; 4], _options: &FormatOptions| {
            let [r, g, b, a] = *coords;
            let mut out = format!(
                "#{}{}{}",
                hex_pair(round_channel(r)),
                hex_pair(round_channel(g)),
                hex_pair(round_channel(b))
            );
            if a < 1.0 {
                out.push_str(&hex_pair(round_channel(a.clamp(0.0, 1.0) * 255.0)));
            }
            Ok(out)
        });

    let converter = ColorConverter::Full {
        is_valid,
        bridge: "rgb".to_owned(),
        to_bridge: transform(|v| *v),
        parse,
        from_bridge: transform(|v| *v),
        format,
    };
    registry
        .register_color_base("hex-color", converter.clone())
        .expect("hex-color registers exactly once at bootstrap");
    registry
        .register_color_type("hex-color", converter)
        .expect("hex-color registers exactly once at bootstrap");
}

// -- named-color ---------------------------------------------------------------------------------

fn install_named_color(registry: &Registry) {
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> =
        Arc::new(|input: &str| crate::registry::registry().named_color_rgb(input).is_some());
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> = Arc::new(|input: &str| {
        crate::registry::registry()
            .named_color_rgb(input)
            .map(|[r, g, b]| [r as Float, g as Float, b as Float, 1.0])
            .ok_or_else(|| LookupError::UnknownName(input.to_owned()).into())
    });
    let format: Arc<dyn Fn(&[Float; 4], &FormatOptions) -> Result<String, Error> + Send + Sync> =
        Arc::new(|coords: &[Float; 4], _options: &FormatOptions| {
            let [r, g, b, _] = *coords;
            let rgb = [round_channel(r), round_channel(g), round_channel(b)];
            crate::registry::registry()
                .name_for_rgb(rgb)
                .ok_or(ParseError::UnsupportedFormat.into())
        });

    let converter = ColorConverter::Full {
        is_valid,
        bridge: "rgb".to_owned(),
        to_bridge: transform(|v| *v),
        parse,
        from_bridge: transform(|v| *v),
        format,
    };
    registry
        .register_color_base("named-color", converter.clone())
        .expect("named-color registers exactly once at bootstrap");
    registry
        .register_color_type("named-color", converter)
        .expect("named-color registers exactly once at bootstrap");
}

// -- transparent / currentcolor -------------------------------------------------------------------

fn install_literal(registry: &Registry, name: &'static str, coords: [Float; 4]) {
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> = Arc::new(move |input: &str| expr::clean(input) == name);
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> = Arc::new(move |input: &str| {
        if expr::clean(input) == name {
            Ok(coords)
        } else {
            Err(ParseError::UnsupportedFormat.into())
        }
    });

    let converter = ColorConverter::Basic {
        is_valid,
        bridge: "rgb".to_owned(),
        to_bridge: transform(|v| *v),
        parse,
    };
    registry
        .register_color_base(name, converter.clone())
        .unwrap_or_else(|_| panic!("{name} registers exactly once at bootstrap"));
    registry
        .register_color_type(name, converter)
        .unwrap_or_else(|_| panic!("{name} registers exactly once at bootstrap"));
}

fn install_transparent(registry: &Registry) {
    install_literal(registry, "transparent", [0.0, 0.0, 0.0, 0.0]);
}

fn install_currentcolor(registry: &Registry) {
    install_literal(registry, "currentcolor", [0.0, 0.0, 0.0, 1.0]);
}

// -- <system-color> --------------------------------------------------------------------------------

fn install_system_color(registry: &Registry) {
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> = Arc::new(|input: &str| {
        crate::config::configuration().system_colors.contains_key(&expr::clean(input))
    });
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> = Arc::new(|input: &str| {
        let cleaned = expr::clean(input);
        let config = crate::config::configuration();
        let pair = config
            .system_colors
            .get(&cleaned)
            .ok_or_else(|| LookupError::UnknownName(cleaned.clone()))?;
        let [r, g, b] = pair[config.theme.index()];
        Ok([r as Float, g as Float, b as Float, 1.0])
    });

    let converter = ColorConverter::Basic {
        is_valid,
        bridge: "rgb".to_owned(),
        to_bridge: transform(|v| *v),
        parse,
    };
    registry
        .register_color_type("system-color", converter)
        .expect("system-color registers exactly once at bootstrap");
}

// -- device-cmyk() -----------------------------------------------------------------------------

fn cmyk_component(index: usize) -> ComponentDefinition {
    ComponentDefinition::new(index, ValueKind::Range { min: 0.0, max: 1.0 }, Some(3))
}

fn parse_cmyk_token(token: &str) -> Result<Float, Error> {
    let empty = std::collections::HashMap::new();
    crate::parse::evaluate_component(token, &cmyk_component(0), &empty, false, false)
}

fn parse_device_cmyk(input: &str) -> Result<[Float; 4], Error> {
    let cleaned = expr::clean(input);
    let inner = strip_call(&cleaned, "device-cmyk").ok_or(ParseError::UnsupportedFormat)?;
    let tokens = tokenize_arguments(inner);

    let groups: Vec<Vec<String>> = tokens
        .split(|t| t == ",")
        .map(|g| g.to_vec())
        .filter(|g| !g.is_empty())
        .collect();

    // `device-cmyk(c, m, y, k[, a])`: every component its own comma group.
    let main_tokens: Vec<String> = if groups.len() >= 4 && groups[0].len() == 1 && groups[1].len() == 1 {
        let mut flat = vec![groups[0][0].clone(), groups[1][0].clone(), groups[2][0].clone(), groups[3][0].clone()];
        if groups.len() >= 5 && groups[4].len() == 1 {
            flat.push(groups[4][0].clone());
        }
        flat
    } else {
        // `device-cmyk(c m y k [/ a])[, <fallback>]`: first comma group carries
        // the whole space-separated clause, a trailing group (if any) is an
        // ICC-profile-less fallback color this naive converter ignores.
        groups.first().cloned().unwrap_or_default()
    };

    let (c, m, y, k, alpha_token) = match main_tokens.as_slice() {
        [c, m, y, k] => (c, m, y, k, None),
        [c, m, y, k, slash, a] if slash == "/" => (c, m, y, k, Some(a)),
        [c, m, y, k, a] => (c, m, y, k, Some(a)),
        other => {
            return Err(ParseError::BadTokenCount {
                expected: 4,
                found: other.len(),
            }
            .into())
        }
    };

    let c = parse_cmyk_token(c)?;
    let m = parse_cmyk_token(m)?;
    let y = parse_cmyk_token(y)?;
    let k = parse_cmyk_token(k)?;
    let alpha = match alpha_token {
        Some(token) => parse_cmyk_token(token)?.clamp(0.0, 1.0),
        None => 1.0,
    };

    let naive = |component: Float| -> Float { 255.0 * (1.0 - (component * (1.0 - k) + k).min(1.0)) };
    Ok([naive(c), naive(m), naive(y), alpha])
}

fn install_device_cmyk(registry: &Registry) {
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> = Arc::new(|input: &str| parse_device_cmyk(input).is_ok());
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> = Arc::new(parse_device_cmyk);
    let format: Arc<dyn Fn(&[Float; 4], &FormatOptions) -> Result<String, Error> + Send + Sync> =
        Arc::new(|coords: &[Float; 4], _options: &FormatOptions| {
            let [r, g, b, a] = *coords;
            let (rf, gf, bf) = (r / 255.0, g / 255.0, b / 255.0);
            let k = 1.0 - rf.max(gf).max(bf);
            let channel = |value: Float| -> Float {
                if k >= 1.0 {
                    0.0
                } else {
                    (1.0 - value - k) / (1.0 - k)
                }
            };
            let (c, m, y) = (channel(rf), channel(gf), channel(bf));
            let fmt3 = |v: Float| format!("{:.3}", v.clamp(0.0, 1.0));
            let rgb_fallback = format!("rgb({} {} {})", round_channel(r), round_channel(g), round_channel(b));
            Ok(if a < 1.0 {
                format!(
                    "device-cmyk({} {} {} {} / {}, {})",
                    fmt3(c),
                    fmt3(m),
                    fmt3(y),
                    fmt3(k),
                    fmt3(a),
                    rgb_fallback
                )
            } else {
                format!("device-cmyk({} {} {} {}, {})", fmt3(c), fmt3(m), fmt3(y), fmt3(k), rgb_fallback)
            })
        });

    let converter = ColorConverter::Full {
        is_valid,
        bridge: "rgb".to_owned(),
        to_bridge: transform(|v| *v),
        parse,
        from_bridge: transform(|v| *v),
        format,
    };
    registry
        .register_color_base("device-cmyk", converter.clone())
        .expect("device-cmyk registers exactly once at bootstrap");
    registry
        .register_color_type("device-cmyk", converter)
        .expect("device-cmyk registers exactly once at bootstrap");
}

// -- contrast-color() --------------------------------------------------------------------------

fn parse_contrast_color(input: &str) -> Result<[Float; 4], Error> {
    let cleaned = expr::clean(input);
    let inner = strip_call(&cleaned, "contrast-color").ok_or(ParseError::UnsupportedFormat)?;
    let origin = Color::from(inner)?;
    let registry = crate::registry::registry();
    let xyz = origin.in_model(registry, "xyz-d65")?;
    let luminance = xyz.to_array()[1];
    Ok(if luminance > 0.5 {
        [0.0, 0.0, 0.0, 1.0]
    } else {
        [255.0, 255.0, 255.0, 1.0]
    })
}

fn install_contrast_color(registry: &Registry) {
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> = Arc::new(|input: &str| parse_contrast_color(input).is_ok());
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> = Arc::new(parse_contrast_color);

    let converter = ColorConverter::Basic {
        is_valid,
        bridge: "rgb".to_owned(),
        to_bridge: transform(|v| *v),
        parse,
    };
    registry
        .register_color_type("contrast-color", converter)
        .expect("contrast-color registers exactly once at bootstrap");
}

// -- light-dark() -------------------------------------------------------------------------------

fn split_two_args(inner: &str) -> Result<(String, String), Error> {
    let tokens = tokenize_arguments(inner);
    let groups: Vec<Vec<String>> = tokens.split(|t| t == ",").map(|g| g.to_vec()).collect();
    if groups.len() != 2 {
        return Err(ParseError::BadTokenCount {
            expected: 2,
            found: groups.len(),
        }
        .into());
    }
    Ok((groups[0].join(" "), groups[1].join(" ")))
}

fn parse_light_dark(input: &str) -> Result<[Float; 4], Error> {
    let cleaned = expr::clean(input);
    let inner = strip_call(&cleaned, "light-dark").ok_or(ParseError::UnsupportedFormat)?;
    let (light_text, dark_text) = split_two_args(inner)?;
    let registry = crate::registry::registry();
    let config = crate::config::configuration();

    let chosen = if config.theme.index() == 0 { &light_text } else { &dark_text };
    let color = Color::from_registry(registry, chosen)?;
    let rgb = color.in_model(registry, "rgb")?;
    Ok(rgb.to_array())
}

fn install_light_dark(registry: &Registry) {
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> = Arc::new(|input: &str| parse_light_dark(input).is_ok());
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> = Arc::new(parse_light_dark);

    let converter = ColorConverter::Basic {
        is_valid,
        bridge: "rgb".to_owned(),
        to_bridge: transform(|v| *v),
        parse,
    };
    registry
        .register_color_type("light-dark", converter)
        .expect("light-dark registers exactly once at bootstrap");
}

// -- color-mix() ----------------------------------------------------------------------------------

fn parse_hue_method(token: &str) -> Result<HueInterpolation, Error> {
    match token {
        "shorter" => Ok(HueInterpolation::Shorter),
        "longer" => Ok(HueInterpolation::Longer),
        "increasing" => Ok(HueInterpolation::Increasing),
        "decreasing" => Ok(HueInterpolation::Decreasing),
        other => Err(ParseError::UnknownIdentifier(other.to_owned()).into()),
    }
}

fn parse_percentage(token: &str) -> Result<Float, Error> {
    let digits = token.strip_suffix('%').ok_or(ParseError::UnsupportedFormat)?;
    digits
        .parse::<Float>()
        .map(|v| v / 100.0)
        .map_err(|_| ParseError::MalformedNumber(token.to_owned()).into())
}

/// Parse `color-mix(in <model>[ <hue-method> hue], <c1>[ <p1>%], <c2>[
/// <p2>%])`, delegating the actual interpolation to [`Color::mix`].
///
/// Not a registered [`ColorConverter`]: the mix happens in whichever model
/// the `in` clause names, so — like `color()` — its bridge is only known
/// once the call's contents are read.
pub(crate) fn parse_color_mix(registry: &Registry, input: &str) -> Result<(String, [Float; 4]), Error> {
    let inner = strip_call(input, "color-mix").ok_or(ParseError::UnsupportedFormat)?;
    let tokens = tokenize_arguments(inner);
    let groups: Vec<Vec<String>> = tokens.split(|t| t == ",").map(|g| g.to_vec()).collect();

    let [clause, first, second]: [Vec<String>; 3] = groups
        .try_into()
        .map_err(|groups: Vec<Vec<String>>| ParseError::BadTokenCount {
            expected: 3,
            found: groups.len(),
        })?;

    if clause.first().map(String::as_str) != Some("in") || clause.len() < 2 {
        return Err(ParseError::UnsupportedFormat.into());
    }
    let model_name = clause[1].clone();
    let hue_strategy = match clause.len() {
        2 => HueInterpolation::Shorter,
        4 if clause[3] == "hue" => parse_hue_method(&clause[2])?,
        _ => return Err(ParseError::UnsupportedFormat.into()),
    };

    let (text1, weight1) = split_color_and_weight(&first)?;
    let (text2, weight2) = split_color_and_weight(&second)?;

    let (p1, p2) = match (weight1, weight2) {
        (Some(p1), Some(p2)) => (p1, p2),
        (Some(p1), None) => (p1, 1.0 - p1),
        (None, Some(p2)) => (1.0 - p2, p2),
        (None, None) => (0.5, 0.5),
    };
    let sum = p1 + p2;
    if sum <= 0.0 {
        return Err(ParseError::DisallowedConstruct("color-mix weights must sum to more than 0%").into());
    }
    let alpha_multiplier = sum.min(1.0);
    let fraction = p2 / sum;

    let color1 = Color::from_registry(registry, &text1)?;
    let color2 = Color::from_registry(registry, &text2)?;
    let mix_options = crate::color::MixOptions {
        amount: fraction,
        hue: hue_strategy,
        ..Default::default()
    };
    let mixed = color1.mix(registry, &color2, &model_name, &mix_options)?;

    let mut coords = mixed.to_array();
    coords[3] *= alpha_multiplier;
    Ok((model_name, coords))
}

fn split_color_and_weight(group: &[String]) -> Result<(String, Option<Float>), Error> {
    match group {
        [] => Err(ParseError::UnsupportedFormat.into()),
        [color] => Ok((color.clone(), None)),
        [color, weight] => Ok((color.clone(), Some(parse_percentage(weight)?))),
        _ => Err(ParseError::UnsupportedFormat.into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::registry;

    #[test]
    fn hex_color_round_trips_through_rgb() {
        let color = Color::from("#FF5733").unwrap();
        assert_eq!(color.model(), "rgb");
        let options = FormatOptions::new("css-gamut-map");
        assert_eq!(color.to(registry(), "hex-color", &options).unwrap(), "#FF5733");
    }

    #[test]
    fn hex_color_short_form_digit_doubles() {
        let color = Color::from("#f53").unwrap();
        assert_eq!(color.to_array()[0], 255.0);
        assert_eq!(color.to_array()[1], 85.0);
        assert_eq!(color.to_array()[2], 51.0);
    }

    #[test]
    fn named_color_formats_back_to_its_registered_name() {
        let registry = registry();
        registry.register_named_color("dusk mint", [123, 167, 151]).unwrap();
        let color = Color::from_registry(registry, "rgb(123 167 151)").unwrap();
        let options = FormatOptions::new("css-gamut-map");
        assert_eq!(color.to(registry, "named-color", &options).unwrap(), "duskmint");
    }

    #[test]
    fn transparent_parses_to_zero_alpha_black() {
        let color = Color::from("transparent").unwrap();
        assert_eq!(color.to_array(), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn device_cmyk_produces_rgb_fallback() {
        let color = Color::from("device-cmyk(0 0 0 0)").unwrap();
        assert_eq!(color.to_array(), [255.0, 255.0, 255.0, 1.0]);
    }

    #[test]
    fn contrast_color_picks_white_for_black_background() {
        let color = Color::from("contrast-color(#000000)").unwrap();
        assert_eq!(color.to_array(), [255.0, 255.0, 255.0, 1.0]);
    }

    #[test]
    fn color_mix_blends_hsl_with_partial_weights() {
        let registry = registry();
        let (model, coords) =
            parse_color_mix(registry, "color-mix(in hsl, hsl(0 100 50) 30%, hsl(120 100 50) 50%)").unwrap();
        assert_eq!(model, "hsl");
        assert!((coords[0] - 75.0).abs() < 1e-6);
        assert!((coords[3] - 0.8).abs() < 1e-6);
    }
}
