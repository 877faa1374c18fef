//! The function-shape parser: legacy comma, modern whitespace, `from`-
//! relative, and `color(space ...)` forms, plus the formatter every
//! registered model shares.
//!
//! Grounded in the teacher's `core::string` dispatch-by-prefix idiom (match
//! on a leading literal, then hand off to a focused sub-parser) and, for
//! tokenizing conventions around balanced sub-expressions, the retrieval
//! pack's other CSS color parsers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::calc::{self, CalcContext};
use crate::error::{Error, ParseError};
use crate::expr;
use crate::model::{ColorConverter, ColorModelConverter, ComponentDefinition, FormatOptions, ValueKind};
use crate::registry::Registry;
use crate::Float;

/// Split a function's parenthesized inner payload into tokens: `,` and `/`
/// are their own tokens; everything else is a maximal run up to the next
/// top-level space/comma/slash, with any `(...)` suffix consumed whole so
/// that `calc(a + b)` or a nested `color(...)` stays one token.
pub(crate) fn tokenize_arguments(input: &str) -> Vec<String> {
    let bytes = input.as_bytes();
    let mut i = 0;
    let mut tokens = Vec::new();

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b',' => {
                tokens.push(",".to_owned());
                i += 1;
            }
            b'/' => {
                tokens.push("/".to_owned());
                i += 1;
            }
            _ => {
                let start = i;
                while i < bytes.len() && !matches!(bytes[i], b' ' | b',' | b'/') {
                    if bytes[i] == b'(' {
                        let mut depth = 0usize;
                        while i < bytes.len() {
                            match bytes[i] {
                                b'(' => depth += 1,
                                b')' => {
                                    depth -= 1;
                                    if depth == 0 {
                                        i += 1;
                                        break;
                                    }
                                }
                                _ => {}
                            }
                            i += 1;
                        }
                    } else {
                        i += 1;
                    }
                }
                tokens.push(input[start..i].to_owned());
            }
        }
    }

    tokens
}

/// Strip the outer `name(` / `)` from a cleaned function string, returning
/// the inner payload. `name` must match case-insensitively (the input is
/// already lower-cased by `expr::clean`).
pub(crate) fn strip_call<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    let prefix = format!("{name}(");
    if input.starts_with(&prefix) && input.ends_with(')') {
        Some(&input[prefix.len()..input.len() - 1])
    } else {
        None
    }
}

/// Parse a bare numeric literal, a percentage, or a unit-suffixed angle,
/// independent of `calc()`.
fn parse_plain_number(token: &str, def: &ComponentDefinition, relative: bool) -> Result<Float, Error> {
    if let Some(digits) = token.strip_suffix('%') {
        if relative && def.value_kind.is_angle() {
            return Err(ParseError::DisallowedConstruct("percentage in relative angle component").into());
        }
        let value: Float = digits
            .parse()
            .map_err(|_| ParseError::MalformedNumber(token.to_owned()))?;
        return Ok(if def.value_kind.is_percentage() {
            value
        } else {
            calc::remap_percent(value, def.value_kind.range())
        });
    }

    for (unit, factor_kind) in [("deg", 0), ("grad", 1), ("turn", 2), ("rad", 3)] {
        if let Some(digits) = token.strip_suffix(unit) {
            if digits.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+') && !digits.is_empty() {
                let value: Float = digits
                    .parse()
                    .map_err(|_| ParseError::MalformedNumber(token.to_owned()))?;
                return Ok(match factor_kind {
                    0 => value,
                    1 => value * 0.9,
                    2 => value * 360.0,
                    _ => value.to_degrees(),
                });
            }
        }
    }

    token
        .parse::<Float>()
        .map_err(|_| ParseError::MalformedNumber(token.to_owned()).into())
}

/// Evaluate one component token against its definition, per spec §4.4.
pub fn evaluate_component(
    token: &str,
    def: &ComponentDefinition,
    origin: &HashMap<String, Float>,
    relative: bool,
    legacy: bool,
) -> Result<Float, Error> {
    if token == "none" {
        if legacy {
            return Err(ParseError::NoneForbidden.into());
        }
        return Ok(0.0);
    }

    if let Some(value) = origin.get(token) {
        return Ok(*value);
    }

    if let Some(inner) = token.strip_prefix("calc(").and_then(|s| s.strip_suffix(')')) {
        let ctx = CalcContext {
            variables: origin,
            range: def.value_kind.range(),
            is_percentage_component: def.value_kind.is_percentage(),
            disallow_units: relative,
        };
        return calc::evaluate(inner, &ctx);
    }

    if legacy && def.value_kind.is_percentage() && !token.ends_with('%') {
        return Err(ParseError::DisallowedConstruct("bare number for a percentage component in legacy syntax").into());
    }

    parse_plain_number(token, def, relative)
}

/// The three non-alpha component slots plus an optional alpha slot, and
/// whatever `from`-relative context applied, extracted from one function
/// call's tokens.
struct CallShape<'a> {
    origin: HashMap<String, Float>,
    relative: bool,
    legacy: bool,
    component_tokens: [&'a str; 3],
    alpha_token: Option<&'a str>,
}

fn split_call_shape<'a>(
    tokens: &'a [String],
    registry: &Registry,
    model_name: &str,
) -> Result<CallShape<'a>, Error> {
    let mut rest = tokens;
    let mut origin = HashMap::new();
    let mut relative = false;

    if rest.first().map(String::as_str) == Some("from") {
        relative = true;
        let origin_token = rest.get(1).ok_or(ParseError::BadTokenCount {
            expected: 2,
            found: rest.len(),
        })?;
        let origin_color = crate::color::Color::from(origin_token)?;
        let in_model = origin_color.in_model(registry, model_name)?;
        let model = registry.model(model_name)?;
        for (name, def) in &model.components {
            origin.insert(name.clone(), in_model.coords[def.index]);
        }
        origin.insert("alpha".to_owned(), in_model.coords[3]);
        rest = &rest[2..];
    }

    let legacy = rest.len() >= 2 && rest[1] == ",";

    let (component_tokens, alpha_token) = if legacy {
        if rest.len() == 5 {
            (
                [rest[0].as_str(), rest[2].as_str(), rest[4].as_str()],
                None,
            )
        } else if rest.len() == 7 && rest[5] == "," {
            (
                [rest[0].as_str(), rest[2].as_str(), rest[4].as_str()],
                Some(rest[6].as_str()),
            )
        } else {
            return Err(ParseError::BadTokenCount {
                expected: 5,
                found: rest.len(),
            }
            .into());
        }
    } else if rest.len() == 3 {
        ([rest[0].as_str(), rest[1].as_str(), rest[2].as_str()], None)
    } else if rest.len() == 5 && rest[3] == "/" {
        (
            [rest[0].as_str(), rest[1].as_str(), rest[2].as_str()],
            Some(rest[4].as_str()),
        )
    } else {
        return Err(ParseError::BadTokenCount {
            expected: 3,
            found: rest.len(),
        }
        .into());
    };

    if legacy {
        let model = registry.model(model_name)?;
        let plain_component_names: Vec<&str> = model
            .components
            .iter()
            .filter(|(_, def)| !def.value_kind.is_angle() && !def.value_kind.is_percentage())
            .map(|(n, _)| n.as_str())
            .collect();
        let is_percent = |token: &str| token.ends_with('%');
        let relevant: Vec<bool> = model
            .components
            .iter()
            .zip(component_tokens.iter())
            .filter(|((name, _), _)| plain_component_names.contains(&name.as_str()))
            .map(|(_, token)| is_percent(token))
            .collect();
        if relevant.iter().any(|v| *v) && relevant.iter().any(|v| !*v) {
            return Err(ParseError::InconsistentUnits.into());
        }
    }

    Ok(CallShape {
        origin,
        relative,
        legacy,
        component_tokens,
        alpha_token,
    })
}

/// Parse `input`, which must already be `expr::clean`-ed, as an invocation
/// of `model_name` (or its `alpha_variant`), returning `[c1, c2, c3, alpha]`.
pub fn parse_model_function(
    registry: &Registry,
    model_name: &str,
    model: &ColorModelConverter,
    input: &str,
) -> Result<[Float; 4], Error> {
    let inner = strip_call(input, model_name)
        .or_else(|| model.alpha_variant.as_deref().and_then(|alt| strip_call(input, alt)))
        .ok_or(ParseError::UnsupportedFormat)?;

    let tokens = tokenize_arguments(inner);
    let shape = split_call_shape(&tokens, registry, model_name)?;

    if shape.legacy && !model.supports_legacy {
        return Err(ParseError::DisallowedConstruct("legacy comma syntax for this model").into());
    }

    let mut coords = [0.0; 4];
    coords[3] = 1.0;

    for (name, def) in &model.components {
        let token = shape.component_tokens[def.index];
        let value = evaluate_component(token, def, &shape.origin, shape.relative, shape.legacy)?;
        coords[def.index] = def.normalize(value);
        let _ = name;
    }

    if let Some(token) = shape.alpha_token {
        let alpha_def = ComponentDefinition::new(3, ValueKind::Range { min: 0.0, max: 1.0 }, Some(3));
        let value = evaluate_component(token, &alpha_def, &shape.origin, shape.relative, shape.legacy)?;
        coords[3] = alpha_def.normalize(value).clamp(0.0, 1.0);
    }

    Ok(coords)
}

/// Parse `color(<space> c1 c2 c3 [/ a])` or
/// `color(from <origin> <space> c1 c2 c3 [/ a])`, resolving `<space>`
/// against the registry. Handled directly by `Color::from` rather than
/// through the color-types table: a `ColorConverter` entry's `bridge` is
/// fixed at registration time, but `color()`'s bridge depends on which
/// space name appears inside the call, so there is no single static
/// `ColorConverter` that could represent it.
pub fn parse_color_function(registry: &Registry, input: &str) -> Result<(String, [Float; 4]), Error> {
    let inner = strip_call(input, "color").ok_or(ParseError::UnsupportedFormat)?;
    let mut tokens = tokenize_arguments(inner);

    let mut origin = HashMap::new();
    let mut relative = false;
    let mut space_name = None;

    if tokens.first().map(String::as_str) == Some("from") {
        relative = true;
        if tokens.len() < 3 {
            return Err(ParseError::BadTokenCount {
                expected: 3,
                found: tokens.len(),
            }
            .into());
        }
        let origin_token = tokens[1].clone();
        let name = tokens[2].clone();
        let origin_color = crate::color::Color::from(&origin_token)?;
        let in_space = origin_color.in_model(registry, &name)?;
        let model = registry.model(&name)?;
        for (component_name, def) in &model.components {
            origin.insert(component_name.clone(), in_space.coords[def.index]);
        }
        origin.insert("alpha".to_owned(), in_space.coords[3]);
        tokens = tokens[3..].to_vec();
        space_name = Some(name);
    }

    let space_name = match space_name {
        Some(name) => name,
        None => {
            if tokens.is_empty() {
                return Err(ParseError::BadTokenCount { expected: 1, found: 0 }.into());
            }
            tokens.remove(0)
        }
    };

    parse_color_function_components(registry, &space_name, &tokens, &origin, relative)
}

fn parse_color_function_components(
    registry: &Registry,
    space_name: &str,
    component_and_alpha_tokens: &[String],
    origin: &HashMap<String, Float>,
    relative: bool,
) -> Result<(String, [Float; 4]), Error> {
    let model = registry
        .model(space_name)
        .map_err(|_| ParseError::UnknownColorSpace(space_name.to_owned()))?;

    let (component_tokens, alpha_token): ([&str; 3], Option<&str>) = match component_and_alpha_tokens.len() {
        3 => (
            [
                component_and_alpha_tokens[0].as_str(),
                component_and_alpha_tokens[1].as_str(),
                component_and_alpha_tokens[2].as_str(),
            ],
            None,
        ),
        5 if component_and_alpha_tokens[3] == "/" => (
            [
                component_and_alpha_tokens[0].as_str(),
                component_and_alpha_tokens[1].as_str(),
                component_and_alpha_tokens[2].as_str(),
            ],
            Some(component_and_alpha_tokens[4].as_str()),
        ),
        n => {
            return Err(ParseError::BadTokenCount {
                expected: 3,
                found: n,
            }
            .into())
        }
    };

    let mut coords = [0.0; 4];
    coords[3] = 1.0;
    for (name, def) in &model.components {
        let token = component_tokens[def.index];
        let value = evaluate_component(token, def, origin, relative, false)?;
        coords[def.index] = def.normalize(value);
        let _ = name;
    }
    if let Some(token) = alpha_token {
        let alpha_def = ComponentDefinition::new(3, ValueKind::Range { min: 0.0, max: 1.0 }, Some(3));
        let value = evaluate_component(token, &alpha_def, origin, relative, false)?;
        coords[3] = alpha_def.normalize(value).clamp(0.0, 1.0);
    }

    Ok((space_name.to_owned(), coords))
}

// --------------------------------------------------------------------------------------------------------------------

fn round_to(value: Float, digits: u32) -> Float {
    let factor = (10.0 as Float).powi(digits as i32);
    (value * factor).round() / factor
}

/// Format `coords` (already fit into gamut) as `model_name`'s preferred
/// shape: `color(<name> ...)` if it is a color space, `<alpha_variant>(...)`
/// or `<name>(...)` with commas if legacy was requested and is supported,
/// else modern whitespace.
pub fn format_model(
    registry: &Registry,
    model_name: &str,
    model: &ColorModelConverter,
    coords: &[Float; 4],
    options: &FormatOptions,
    is_color_space: bool,
) -> Result<String, Error> {
    let fitted = crate::gamut::fit(registry, model_name, [coords[0], coords[1], coords[2]], &options.fit, options.precision)?;
    let alpha = (coords[3].clamp(0.0, 1.0) * 1000.0).round() / 1000.0;

    let mut rendered = Vec::with_capacity(3);
    for (_, def) in &model.components {
        let digits = options.precision.or(def.precision).unwrap_or(3);
        let value = round_to(fitted[def.index], digits);
        let mut text = format_number(value);
        if options.units || (options.legacy && def.value_kind.is_percentage()) {
            if def.value_kind.is_percentage() {
                text.push('%');
            } else if def.value_kind.is_angle() {
                text.push_str("deg");
            }
        }
        rendered.push(text);
    }

    let include_alpha = alpha < 1.0;

    if is_color_space {
        let body = rendered.join(" ");
        return Ok(if include_alpha {
            format!("color({model_name} {body} / {})", format_number(alpha))
        } else {
            format!("color({model_name} {body})")
        });
    }

    if options.legacy && model.supports_legacy {
        let name = if include_alpha {
            model.alpha_variant.as_deref().unwrap_or(model_name)
        } else {
            model_name
        };
        let body = rendered.join(", ");
        return Ok(if include_alpha {
            format!("{name}({body}, {})", format_number(alpha))
        } else {
            format!("{name}({body})")
        });
    }

    let body = rendered.join(" ");
    Ok(if include_alpha {
        format!("{model_name}({body} / {})", format_number(alpha))
    } else {
        format!("{model_name}({body})")
    })
}

fn format_number(value: Float) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let mut text = format!("{value}");
        if let Some(dot) = text.find('.') {
            while text.ends_with('0') && text.len() > dot + 2 {
                text.pop();
            }
        }
        text
    }
}

/// Build the [`ColorConverter`] `register_color_function`/
/// `register_color_space` install alongside a model: its `is_valid` tries
/// the full parse; `parse`/`format` delegate to this module's shared
/// component-evaluation and formatting logic.
pub fn build_converter(name: &str, model: &ColorModelConverter) -> ColorConverter {
    let name_owned = name.to_owned();
    let model_for_parse = model.clone();
    let name_for_parse = name_owned.clone();
    let parse: Arc<dyn Fn(&str) -> Result<[Float; 4], Error> + Send + Sync> = Arc::new(move |input: &str| {
        parse_model_function(crate::registry::registry(), &name_for_parse, &model_for_parse, input)
    });

    let model_for_valid = model.clone();
    let name_for_valid = name_owned.clone();
    let parse_for_valid = Arc::clone(&parse);
    let is_valid: Arc<dyn Fn(&str) -> bool + Send + Sync> = Arc::new(move |input: &str| {
        let cleaned = expr::clean(input);
        let _ = (&model_for_valid, &name_for_valid);
        parse_for_valid(&cleaned).is_ok()
    });

    let model_for_format = model.clone();
    let name_for_format = name_owned.clone();
    let format: Arc<dyn Fn(&[Float; 4], &FormatOptions) -> Result<String, Error> + Send + Sync> =
        Arc::new(move |coords: &[Float; 4], options: &FormatOptions| {
            let is_space = matches!(model_for_format.components.first(), Some((n, _)) if n == "r")
                && model_for_format.components.len() == 3
                && model_for_format
                    .components
                    .iter()
                    .all(|(_, d)| matches!(d.value_kind, ValueKind::Range { min, max } if min == 0.0 && max == 1.0));
            format_model(
                crate::registry::registry(),
                &name_for_format,
                &model_for_format,
                coords,
                options,
                is_space,
            )
        });

    ColorConverter::Full {
        is_valid,
        bridge: model.bridge.clone(),
        to_bridge: model.to_bridge.clone(),
        parse,
        from_bridge: model.from_bridge.clone(),
        format,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::registry;

    #[test]
    fn tokenizes_modern_and_calc_arguments() {
        let tokens = tokenize_arguments("from #ff0000 calc(r * 0.5) calc(g + 50) calc(b + 75)");
        assert_eq!(
            tokens,
            vec![
                "from".to_owned(),
                "#ff0000".to_owned(),
                "calc(r * 0.5)".to_owned(),
                "calc(g + 50)".to_owned(),
                "calc(b + 75)".to_owned(),
            ]
        );
    }

    #[test]
    fn parses_modern_rgb() {
        let registry = registry();
        let model = registry.model("rgb").unwrap();
        let coords = parse_model_function(registry, "rgb", &model, "rgb(255 87 51)").unwrap();
        assert_eq!(coords, [255.0, 87.0, 51.0, 1.0]);
    }

    #[test]
    fn parses_legacy_rgba_with_alpha() {
        let registry = registry();
        let model = registry.model("rgb").unwrap();
        let coords = parse_model_function(registry, "rgb", &model, "rgba(255, 87, 51, 0.5)").unwrap();
        assert_eq!(coords, [255.0, 87.0, 51.0, 0.5]);
    }

    #[test]
    fn rejects_legacy_percent_number_mix() {
        let registry = registry();
        let model = registry.model("rgb").unwrap();
        let err = parse_model_function(registry, "rgb", &model, "rgb(100%, 87, 51)").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InconsistentUnits)));
    }

    #[test]
    fn parses_relative_calc_from_hex_origin() {
        let registry = registry();
        let model = registry.model("rgb").unwrap();
        let coords = parse_model_function(
            registry,
            "rgb",
            &model,
            "rgb(from #ff0000 calc(r * 0.5) calc(g + 50) calc(b + 75))",
        )
        .unwrap();
        assert!((coords[0] - 127.5).abs() < 1e-9);
        assert!((coords[1] - 50.0).abs() < 1e-9);
        assert!((coords[2] - 75.0).abs() < 1e-9);
    }

    #[test]
    fn parses_color_space_function() {
        let registry = registry();
        let (space, coords) = parse_color_function(registry, "color(display-p3 1 0 0)").unwrap();
        assert_eq!(space, "display-p3");
        assert_eq!(coords, [1.0, 0.0, 0.0, 1.0]);
    }
}
