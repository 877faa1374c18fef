//! Gamut fitting: `none`, `clip`, `chroma-reduction`, `css-gamut-map`, and
//! the registration hook for user-defined fit methods.
//!
//! The chroma-reduction and CSS gamut-mapping bisections are lifted from the
//! teacher's `core::gamut::to_gamut`, generalized from a fixed `ColorSpace`
//! enum to an arbitrary registered model's declared `target_gamut`.

use crate::error::{Error, LookupError};
use crate::model::TargetGamut;
use crate::registry::{FitFn, Registry};
use crate::Float;

/// Whether `coords`, expressed in `model`, lie inside that model's declared
/// target gamut (always true when the gamut is "unbounded").
pub fn in_gamut(registry: &Registry, model_name: &str, coords: [Float; 3]) -> Result<bool, Error> {
    let model = registry.model(model_name)?;
    match &model.target_gamut {
        TargetGamut::Unbounded => Ok(true),
        TargetGamut::Named(gamut_name) => {
            let gamut_coords = crate::graph::convert(registry, model_name, gamut_name, coords)?;
            let gamut_model = registry.model(gamut_name)?;
            Ok(gamut_model
                .components
                .iter()
                .enumerate()
                .all(|(i, (_, def))| within_range(def, gamut_coords[i])))
        }
    }
}

fn within_range(def: &crate::model::ComponentDefinition, value: Float) -> bool {
    let (min, max) = def.value_kind.range();
    if def.value_kind.is_angle() {
        true
    } else {
        value >= min - 1e-5 && value <= max + 1e-5
    }
}

/// Per-component clamp into `model`'s own range; angles wrap modulo 360.
pub fn clip(registry: &Registry, model_name: &str, coords: [Float; 3]) -> Result<[Float; 3], Error> {
    let model = registry.model(model_name)?;
    let mut out = coords;
    for (_, def) in &model.components {
        out[def.index] = def.clamp(out[def.index]);
    }
    Ok(out)
}

/// `fit(coords, model, {method, precision})`: dispatch to `none`, `clip`, or
/// a registered fit method, then round to `precision`, else the component's
/// own precision, else 3.
pub fn fit(
    registry: &Registry,
    model_name: &str,
    coords: [Float; 3],
    method: &str,
    precision: Option<u32>,
) -> Result<[Float; 3], Error> {
    let adjusted = match method {
        "none" => coords,
        "clip" => clip(registry, model_name, coords)?,
        name => {
            let method_fn = registry
                .fit_method(name)
                .ok_or_else(|| LookupError::UnknownName(name.to_owned()))?;
            method_fn(registry, model_name, coords)?
        }
    };

    let model = registry.model(model_name)?;
    let mut out = adjusted;
    for (_, def) in &model.components {
        let digits = precision.or(def.precision).unwrap_or(3);
        out[def.index] = round_to(out[def.index], digits);
    }
    Ok(out)
}

fn round_to(value: Float, digits: u32) -> Float {
    let factor = (10.0 as Float).powi(digits as i32);
    (value * factor).round() / factor
}

fn delta_e_ok(a: &[Float; 3], b: &[Float; 3]) -> Float {
    let dl = a[0] - b[0];
    let da = a[1] - b[1];
    let db = a[2] - b[2];
    (dl * dl + da * da + db * db).sqrt() * 100.0
}

/// Bisect chroma in OKLCH until the clipped projection is within ΔEOK 2 of
/// the unclipped seed, or the gamut boundary itself is found.
pub fn chroma_reduction(registry: &Registry, model_name: &str, coords: [Float; 3]) -> Result<[Float; 3], Error> {
    let model = registry.model(model_name)?;
    if matches!(model.target_gamut, TargetGamut::Unbounded) {
        return Ok(coords);
    }
    if in_gamut(registry, model_name, coords)? {
        return Ok(coords);
    }

    let oklch = crate::graph::convert(registry, model_name, "oklch", coords)?;
    let [l, c, h] = oklch;
    let l = l.clamp(0.0, 1.0);

    let mut low = 0.0;
    let mut high = c.max(0.0);
    let mut best = clip(
        registry,
        model_name,
        crate::graph::convert(registry, "oklch", model_name, [l, 0.0, h])?,
    )?;

    for _ in 0..24 {
        let mid = (low + high) / 2.0;
        let candidate_oklch = [l, mid, h];
        let candidate = crate::graph::convert(registry, "oklch", model_name, candidate_oklch)?;

        if in_gamut(registry, model_name, candidate)? {
            low = mid;
            best = candidate;
            continue;
        }

        let clipped = clip(registry, model_name, candidate)?;
        let clipped_oklch = crate::graph::convert(registry, model_name, "oklch", clipped)?;
        if delta_e_ok(&candidate_oklch, &clipped_oklch) < 2.0 {
            return Ok(clipped);
        }
        high = mid;
    }

    Ok(best)
}

const JND: Float = 0.02;
const EPSILON: Float = 1e-4;

/// W3C CSS Color 4 §13.2 gamut-mapping algorithm.
pub fn css_gamut_map(registry: &Registry, model_name: &str, coords: [Float; 3]) -> Result<[Float; 3], Error> {
    let model = registry.model(model_name)?;
    if matches!(model.target_gamut, TargetGamut::Unbounded) {
        return Ok(coords);
    }

    let oklch_seed = crate::graph::convert(registry, model_name, "oklch", coords)?;
    let [l, c, h] = oklch_seed;

    if l >= 1.0 {
        return crate::graph::convert(registry, "oklab", model_name, [1.0, 0.0, 0.0]);
    }
    if l <= 0.0 {
        return crate::graph::convert(registry, "oklab", model_name, [0.0, 0.0, 0.0]);
    }
    if in_gamut(registry, model_name, coords)? {
        return Ok(coords);
    }

    let initial_clip = clip(registry, model_name, coords)?;
    let initial_clip_oklch = crate::graph::convert(registry, model_name, "oklch", initial_clip)?;
    if delta_e_ok(&oklch_seed, &initial_clip_oklch) < JND {
        return Ok(initial_clip);
    }

    let mut low = 0.0;
    let mut high = c;
    let mut min_delta_e = Float::INFINITY;
    let mut best = initial_clip;

    while (high - low) > EPSILON {
        let mid = (low + high) / 2.0;
        let candidate = crate::graph::convert(registry, "oklch", model_name, [l, mid, h])?;

        if in_gamut(registry, model_name, candidate)? {
            low = mid;
            continue;
        }

        let clipped = clip(registry, model_name, candidate)?;
        let clipped_oklch = crate::graph::convert(registry, model_name, "oklch", clipped)?;
        let delta = delta_e_ok(&[l, mid, h], &clipped_oklch);

        if delta < JND {
            if (JND - delta) < EPSILON {
                return Ok(clipped);
            }
            low = mid;
        } else if delta < min_delta_e {
            min_delta_e = delta;
            best = clipped;
            high = mid;
        } else {
            high = mid;
        }
    }

    Ok(best)
}

/// Install the built-in fit methods (`chroma-reduction`, `css-gamut-map`)
/// as registered [`FitFn`] entries. `none` and `clip` are handled as fast
/// paths directly in [`fit`] and need no table entry.
pub fn install(registry: &Registry) {
    let chroma: FitFn = std::sync::Arc::new(|registry, model, coords| chroma_reduction(registry, model, coords));
    let css_map: FitFn = std::sync::Arc::new(|registry, model, coords| css_gamut_map(registry, model, coords));
    registry
        .register_fit_method("chroma-reduction", chroma)
        .expect("chroma-reduction registers exactly once during builtins::install");
    registry
        .register_fit_method("css-gamut-map", css_map)
        .expect("css-gamut-map registers exactly once during builtins::install");
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::registry;

    #[test]
    fn clip_clamps_into_range_and_wraps_hue() {
        let registry = registry();
        let clipped = clip(registry, "rgb", [-10.0, 300.0, 128.0]).unwrap();
        assert_eq!(clipped, [0.0, 255.0, 128.0]);

        let wrapped = clip(registry, "hsl", [370.0, 50.0, 50.0]).unwrap();
        assert!((wrapped[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn in_gamut_is_true_for_unbounded_models() {
        let registry = registry();
        assert!(in_gamut(registry, "oklch", [2.0, 5.0, 999.0]).unwrap());
    }

    #[test]
    fn chroma_reduction_returns_in_gamut_coordinates() {
        let registry = registry();
        let oversaturated = crate::graph::convert(registry, "display-p3", "srgb", [1.0, 0.0, 0.0]).unwrap();
        let fitted = chroma_reduction(registry, "srgb", oversaturated).unwrap();
        assert!(in_gamut(registry, "srgb", fitted).unwrap());
    }

    #[test]
    fn css_gamut_map_returns_in_gamut_coordinates() {
        let registry = registry();
        let oversaturated = crate::graph::convert(registry, "display-p3", "srgb", [1.0, 0.0, 0.0]).unwrap();
        let fitted = css_gamut_map(registry, "srgb", oversaturated).unwrap();
        assert!(in_gamut(registry, "srgb", fitted).unwrap());
    }
}
